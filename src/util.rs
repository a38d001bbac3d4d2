use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use crate::constants::SPINNER_TICK_MS;

/// Spinner for blocking vendor tool runs, which report no progress of their own
pub(crate) fn create_spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();

    pb.set_style(
        ProgressStyle::default_spinner()
            .template("[{spinner:.green} {elapsed_precise}] {msg}")
            .expect("Failed to create spinner"),
    );
    pb.set_message(msg.to_owned());
    pb.enable_steady_tick(Duration::from_millis(SPINNER_TICK_MS));

    pb
}
