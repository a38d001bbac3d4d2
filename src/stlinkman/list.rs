use std::process::ExitCode;

use clap::Parser;
use stlinkman::{SerialPortInventory, ToolConfig, VendorTool, error::StLinkResult};

#[derive(Parser, Debug, Clone)]
pub(crate) struct ListOptions {
    /// Only list probes, skip the serial port lookup
    #[clap(long, default_value_t = false)]
    no_ports: bool,

    /// Substring identifying ST-LINK ports in the device description (STLink if unset)
    #[clap(long)]
    description: Option<String>,
}

pub(crate) fn handle_list(config: ToolConfig, opts: ListOptions) -> StLinkResult<ExitCode> {
    let tool = VendorTool::new(config);

    if opts.no_ports {
        return match stlinkman::list_probes(&tool) {
            Ok(probes) => {
                for probe in probes {
                    println!("probe {}: {}", probe.probe, probe.serial_number);
                }
                Ok(ExitCode::SUCCESS)
            }
            Err(e) => {
                tracing::warn!("{}", e);
                Ok(ExitCode::FAILURE)
            }
        };
    }

    let inventory = match &opts.description {
        Some(description) => SerialPortInventory::with_description(description),
        None => SerialPortInventory::new(),
    };
    let pairs = stlinkman::find_all(&tool, &inventory);
    if pairs.is_empty() {
        return Ok(ExitCode::FAILURE);
    }

    for pair in pairs {
        println!("probe {} -> {}", pair.probe, pair.port);
    }

    Ok(ExitCode::SUCCESS)
}
