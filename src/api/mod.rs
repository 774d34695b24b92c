//! REST collaborator: persistence and presence endpoints consumed by the
//! synchronization core.

pub mod client;
pub mod contracts;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("server returned status {status}")]
    Status { status: u16 },
    #[error("channel id {channel_id} is not numeric")]
    InvalidChannelId { channel_id: String },
}

/// Returns the api module name for smoke checks.
pub fn module_name() -> &'static str {
    "api"
}
