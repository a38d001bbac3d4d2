use std::path::Path;

pub use discovery::{ProbePort, correlate, discover, find_all, list_probes};
use error::StLinkResult;
pub use flash::{Firmware, flash};
pub use inventory::{DeviceInventory, PortRecord, SerialPortInventory};
pub use parse::{FlashReport, FlashStatus, ProbeRecord};
pub use tool::{CommandRunner, ToolConfig, ToolOutput, VendorTool};
use tracing::info;

pub(crate) mod constants;
pub mod discovery;
pub mod error;
pub mod flash;
pub mod inventory;
pub mod parse;
pub mod tool;
pub(crate) mod util;

pub struct Programmer {
    runner: Box<dyn CommandRunner>,
    probe: u32,
    validate: bool,
    progress_bar_enable: bool,
}

impl Programmer {
    pub fn new(config: ToolConfig) -> Self {
        Self::from_runner(Box::new(VendorTool::new(config)))
    }

    /// Use a custom runner in place of the vendor executable
    pub fn from_runner(runner: Box<dyn CommandRunner>) -> Self {
        Programmer {
            runner,
            probe: 0,
            validate: true,
            progress_bar_enable: false,
        }
    }

    /// Probe index as listed by the vendor tool. Defaults to 0.
    pub fn probe(&mut self, probe: u32) {
        self.probe = probe;
    }

    pub fn progress_bar(&mut self, enable: bool) {
        self.progress_bar_enable = enable;
    }

    /// Parse the hex file before handing it to the vendor tool
    pub fn validate_firmware(&mut self, enable: bool) {
        self.validate = enable;
    }

    /// Program board with provided intelhex file from file path
    pub fn program_hex_file(&self, file_path: &Path) -> StLinkResult<FlashReport> {
        if self.validate {
            let firmware = Firmware::from_hex_file(file_path)?;
            info!(
                "{} holds {} bytes of data",
                file_path.display(),
                firmware.data_bytes
            );
        }

        let spinner = self
            .progress_bar_enable
            .then(|| util::create_spinner("Programming..."));

        let report = flash(self.runner.as_ref(), file_path, self.probe);

        if let Some(spinner) = spinner {
            match &report {
                Ok(report) => spinner.finish_with_message(format!("Programming {}", report.status)),
                Err(_) => spinner.abandon(),
            }
        }

        report
    }
}
