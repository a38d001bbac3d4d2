use std::{path::PathBuf, process::ExitCode};

use clap::Parser;
use stlinkman::{Programmer, ToolConfig, error::StLinkResult};

#[derive(Parser, Debug, Clone)]
pub(crate) struct ProgramOptions {
    /// Firmware (Intel HEX)
    #[clap(short, long)]
    firmware: PathBuf,

    /// Probe index as shown by `list`
    #[clap(short, long, default_value_t = 0)]
    probe: u32,

    /// Skip parsing the hex file before flashing
    #[clap(long, default_value_t = false)]
    no_validate: bool,

    #[clap(long, default_value_t = false)]
    no_progress: bool,
}

pub(crate) fn handle_programming(
    config: ToolConfig,
    opts: ProgramOptions,
) -> StLinkResult<ExitCode> {
    let mut programmer = Programmer::new(config);

    programmer.probe(opts.probe);
    programmer.progress_bar(!opts.no_progress);
    programmer.validate_firmware(!opts.no_validate);

    let report = programmer.program_hex_file(&opts.firmware)?;
    println!("{} {}", report.status, report.checksum_or_zero());

    if report.is_successful() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}
