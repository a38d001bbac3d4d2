//! Parsers for the text printed by the vendor command-line tool.
//!
//! Everything here is tied to the exact wording of `ST-LINK_CLI.exe`. Keep
//! the matching in this module so a change in the tool's output only
//! touches these functions and their tests.

use std::{fmt, sync::LazyLock};

use regex::Regex;
use tracing::{debug, trace};

use crate::constants::{
    CHECKSUM_WORD_INDEX, MEMORY_PROGRAMMED, NO_DEVICES_MARKER, PROBE_HEADER,
    PROGRAMMING_COMPLETE, VERIFICATION_OK,
};

static PROBE_INDEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^ST-LINK Probe\s*(\d+)\s*:").expect("probe index pattern is valid")
});

static SERIAL_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"SN\s*:\s*([A-Za-z0-9]+)").expect("serial number pattern is valid")
});

/// A probe as listed by `ST-LINK_CLI.exe -List`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeRecord {
    /// Index assigned by the vendor tool, used as `ID=<probe>` when connecting
    pub probe: u32,
    pub serial_number: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashStatus {
    Successful,
    Failed,
}

impl fmt::Display for FlashStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlashStatus::Successful => f.write_str("successful"),
            FlashStatus::Failed => f.write_str("failed"),
        }
    }
}

/// Outcome of a programming run as reported by the vendor tool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlashReport {
    pub status: FlashStatus,
    /// Only present when `status` is `Successful`
    pub checksum: Option<String>,
}

impl FlashReport {
    pub fn failed() -> Self {
        FlashReport {
            status: FlashStatus::Failed,
            checksum: None,
        }
    }

    pub fn is_successful(&self) -> bool {
        self.status == FlashStatus::Successful
    }

    /// Checksum token, or `"0"` when programming did not succeed
    pub fn checksum_or_zero(&self) -> &str {
        self.checksum.as_deref().unwrap_or("0")
    }
}

/// Extract probe index and serial number pairs from the `-List` output.
///
/// The index sits on the `ST-LINK Probe N :` header and the serial number on
/// the line right after it. Headers without a readable serial are skipped.
pub fn parse_probe_list<S: AsRef<str>>(lines: &[S]) -> Vec<ProbeRecord> {
    let mut probes = Vec::new();

    for (i, line) in lines.iter().enumerate() {
        let line = line.as_ref().trim();
        if !line.starts_with(PROBE_HEADER) {
            continue;
        }

        let Some(probe) = PROBE_INDEX
            .captures(line)
            .and_then(|c| c[1].parse::<u32>().ok())
        else {
            debug!("Unreadable probe header {:?}", line);
            continue;
        };

        let serial_number = lines
            .get(i + 1)
            .and_then(|next| SERIAL_NUMBER.captures(next.as_ref()))
            .map(|c| c[1].to_owned());

        match serial_number {
            Some(serial_number) => {
                trace!("Probe {} has serial number {}", probe, serial_number);
                probes.push(ProbeRecord {
                    probe,
                    serial_number,
                });
            }
            None => debug!("Probe {} listed without a serial number", probe),
        }
    }

    probes
}

/// Whether the `-List` output explicitly says nothing is attached
pub fn reports_no_devices<S: AsRef<str>>(lines: &[S]) -> bool {
    lines
        .iter()
        .any(|line| line.as_ref().contains(NO_DEVICES_MARKER))
}

/// Look for the programming success sequence and pull out the checksum.
///
/// Success is `Memory programmed...`, `Verification...OK`,
/// `Programming Complete.` on consecutive lines followed by the checksum
/// line. Anything else, including an empty capture, is a failure.
pub fn parse_flash_output<S: AsRef<str>>(lines: &[S]) -> FlashReport {
    let report = lines.windows(4).find_map(|window| {
        let [programmed, verified, complete, checksum] = window else {
            return None;
        };

        let sequence_found = programmed.as_ref().trim().starts_with(MEMORY_PROGRAMMED)
            && verified.as_ref().trim() == VERIFICATION_OK
            && complete.as_ref().trim() == PROGRAMMING_COMPLETE;
        if !sequence_found {
            return None;
        }

        checksum_token(checksum.as_ref()).map(|checksum| FlashReport {
            status: FlashStatus::Successful,
            checksum: Some(checksum.to_owned()),
        })
    });

    report.unwrap_or_else(FlashReport::failed)
}

fn checksum_token(line: &str) -> Option<&str> {
    let words: Vec<&str> = line.split_whitespace().collect();
    words
        .get(CHECKSUM_WORD_INDEX)
        .or_else(|| words.last())
        .copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIST_OUTPUT: &[&str] = &[
        "STM32 ST-LINK CLI v3.6.0.0",
        "STM32 ST-LINK Command Line Interface",
        "",
        "===== ST-LINK Probe List =====",
        "",
        "ST-LINK Probe 0 :",
        "     ST-LINK SN   : 066DFF485750717867174227",
        "     ST-LINK FW   : V2J37M26",
        "",
        "ST-LINK Probe 1 :",
        "     ST-LINK SN   : 0670FF555051897267063341",
        "     ST-LINK FW   : V2J37M26",
        "-----------------------------------------------------",
    ];

    #[test]
    fn test_parse_probe_list() {
        let probes = parse_probe_list(LIST_OUTPUT);

        assert_eq!(
            probes,
            vec![
                ProbeRecord {
                    probe: 0,
                    serial_number: "066DFF485750717867174227".to_string(),
                },
                ProbeRecord {
                    probe: 1,
                    serial_number: "0670FF555051897267063341".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_probe_header_without_serial_is_skipped() {
        let probes = parse_probe_list(&["ST-LINK Probe 3 :", "     ST-LINK FW   : V2J37M26"]);
        assert!(probes.is_empty());

        // Header on the last line has no following line at all
        let probes = parse_probe_list(&["ST-LINK Probe 4 :"]);
        assert!(probes.is_empty());
    }

    #[test]
    fn test_compact_header_and_serial() {
        let probes = parse_probe_list(&["ST-LINK Probe 2:", "SN: 48FF6E066772"]);
        assert_eq!(probes[0].probe, 2);
        assert_eq!(probes[0].serial_number, "48FF6E066772");
    }

    #[test]
    fn test_reports_no_devices() {
        let output = ["STM32 ST-LINK CLI v3.6.0.0", "No ST-LINK detected!"];
        assert!(reports_no_devices(&output));
        assert!(parse_probe_list(&output).is_empty());
        assert!(!reports_no_devices(LIST_OUTPUT));
    }

    #[test]
    fn test_flash_success_sequence() {
        let report = parse_flash_output(&[
            "Memory programmed",
            "Verification...OK",
            "Programming Complete.",
            "Checksum : 0xABCD1234",
        ]);

        assert_eq!(report.status, FlashStatus::Successful);
        assert_eq!(report.checksum.as_deref(), Some("0xABCD1234"));
        assert_eq!(report.status.to_string(), "successful");
    }

    #[test]
    fn test_flash_checksum_at_fourth_word() {
        let report = parse_flash_output(&[
            "Flash Programming:",
            "Memory programmed in 1s and 234ms.\r",
            "Verification...OK\r",
            "Programming Complete.\r",
            "Flash memory checksum: 0x00A1B2C3 (file)\r",
        ]);

        assert!(report.is_successful());
        assert_eq!(report.checksum_or_zero(), "0x00A1B2C3");
    }

    #[test]
    fn test_flash_error_output_fails() {
        let report = parse_flash_output(&[
            "ST-LINK SN : 066DFF485750717867174227",
            "Unable to connect to ST-LINK!",
        ]);

        assert_eq!(report, FlashReport::failed());
        assert_eq!(report.checksum_or_zero(), "0");
        assert_eq!(report.status.to_string(), "failed");
    }

    #[test]
    fn test_flash_broken_sequence_fails() {
        let report = parse_flash_output(&[
            "Memory programmed",
            "Verification...FAILED",
            "Programming Complete.",
            "Checksum : 0xABCD1234",
        ]);
        assert_eq!(report.status, FlashStatus::Failed);

        // Sequence present but the checksum line is missing
        let report = parse_flash_output(&[
            "Memory programmed",
            "Verification...OK",
            "Programming Complete.",
        ]);
        assert_eq!(report.status, FlashStatus::Failed);

        let empty: [&str; 0] = [];
        assert_eq!(parse_flash_output(&empty), FlashReport::failed());
    }
}
