use std::{path::PathBuf, process::ExitCode, time::Duration};

use clap::{Parser, Subcommand};
use list::{ListOptions, handle_list};
use program::{ProgramOptions, handle_programming};
use stlinkman::{ToolConfig, error::StLinkResult};

mod list;
mod program;

#[derive(Parser, Debug, Clone)]
#[command(version, long_about = None)]
struct Cli {
    /// Path to the ST-LINK command-line utility
    #[clap(long, global = true, default_value = "ST-LINK_CLI.exe")]
    tool: PathBuf,

    /// Kill the utility if it runs longer than this many seconds
    #[clap(long, global = true)]
    timeout: Option<u64>,

    /// Log debug output
    #[clap(short, long, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
enum Command {
    /// List attached probes and their serial ports
    #[command(name = "list", alias = "l")]
    List(ListOptions),

    /// Program target device through a probe
    #[command(name = "program", alias = "p")]
    Program(ProgramOptions),
}

fn main() -> StLinkResult<ExitCode> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt().with_max_level(level).init();

    let config = ToolConfig {
        program: cli.tool,
        timeout: cli.timeout.map(Duration::from_secs),
    };

    match cli.command {
        Command::List(opts) => handle_list(config, opts),
        Command::Program(opts) => handle_programming(config, opts),
    }
}
