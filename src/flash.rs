use std::{fs, path::Path};

use ihex::{Reader, Record};
use tracing::{debug, info, warn};

use crate::error::{StLinkError, StLinkResult};
use crate::parse::{FlashReport, parse_flash_output};
use crate::tool::{CommandRunner, flash_args};

/// Program `firmware` through probe `probe` and report what the tool said.
///
/// The tool's exit status is only logged: a failed run is detected by the
/// absence of the success markers in its output.
pub fn flash(
    runner: &dyn CommandRunner,
    firmware: &Path,
    probe: u32,
) -> StLinkResult<FlashReport> {
    info!("Flashing {} through probe {}", firmware.display(), probe);
    let output = runner.run(&flash_args(firmware, probe))?;

    if !output.success() {
        warn!("Vendor tool exited with {:?}", output.status);
    }

    let report = parse_flash_output(&output.lines);
    info!(
        "Programming {}, checksum {}",
        report.status,
        report.checksum_or_zero()
    );
    Ok(report)
}

/// Summary of an Intel HEX image that parsed cleanly
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Firmware {
    pub records: usize,
    pub data_bytes: usize,
}

impl Firmware {
    pub fn from_hex_file(file_path: &Path) -> StLinkResult<Self> {
        let hex_content = fs::read_to_string(file_path).map_err(|e| {
            StLinkError::Firmware(format!("Failed to read {}: {}", file_path.display(), e))
        })?;
        Self::from_hex_str(&hex_content)
    }

    /// Check that `hex_content` is Intel HEX with at least one data record
    pub fn from_hex_str(hex_content: &str) -> StLinkResult<Self> {
        let mut records = 0;
        let mut data_bytes = 0;

        for record in Reader::new(hex_content) {
            match record {
                Ok(Record::Data { value, .. }) => {
                    records += 1;
                    data_bytes += value.len();
                }
                Ok(_) => records += 1,
                Err(e) => {
                    return Err(StLinkError::Firmware(format!(
                        "Failed parsing record in hex file {:?}",
                        e
                    )));
                }
            }
        }

        if data_bytes == 0 {
            return Err(StLinkError::Firmware(
                "Hex file contains no data records".to_owned(),
            ));
        }

        debug!("Firmware has {} records, {} data bytes", records, data_bytes);
        Ok(Firmware {
            records,
            data_bytes,
        })
    }
}
