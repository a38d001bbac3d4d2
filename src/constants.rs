pub(crate) const DEFAULT_TOOL: &str = "ST-LINK_CLI.exe";
pub(crate) const LIST_FLAG: &str = "-List";

/// Matches the Windows device description
/// "STMicroelectronics STLink Virtual COM Port" as well as the
/// "STM32 STLink" product string reported by udev.
pub(crate) const DEFAULT_PORT_DESCRIPTION: &str = "STLink";

pub(crate) const PROBE_HEADER: &str = "ST-LINK Probe";
pub(crate) const NO_DEVICES_MARKER: &str = "No ST-LINK detected";

pub(crate) const MEMORY_PROGRAMMED: &str = "Memory programmed";
pub(crate) const VERIFICATION_OK: &str = "Verification...OK";
pub(crate) const PROGRAMMING_COMPLETE: &str = "Programming Complete.";
pub(crate) const CHECKSUM_WORD_INDEX: usize = 3;

pub(crate) const CHILD_POLL_INTERVAL_MS: u64 = 20;
pub(crate) const SPINNER_TICK_MS: u64 = 100;
