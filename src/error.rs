use std::{path::PathBuf, time::Duration};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StLinkError {
    #[error("Vendor tool not found: {0:?}. Put it next to the binary or add it to PATH")]
    ToolNotFound(PathBuf),

    #[error("No ST-LINK probe detected")]
    NoDevices,

    #[error("Tool invocation error: {0}")]
    Invocation(String),

    #[error("Vendor tool did not exit within {0:?}")]
    Timeout(Duration),

    #[error("Device enumeration error: {0}")]
    Enumeration(String),

    #[error("Firmware error: {0}")]
    Firmware(String),
}

pub type StLinkResult<T> = std::result::Result<T, StLinkError>;
