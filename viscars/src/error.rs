//! High-level error types

use viscars_core::DeviceError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Core protocol error: {0}")]
    Core(#[from] viscars_core::Error),

    #[error("Transport error: {0}")]
    Transport(#[from] viscars_transport::Error),

    #[error("Type error: {0}")]
    Types(#[from] viscars_types::Error),

    #[error("Bus not connected")]
    NotConnected,

    #[error("Camera returned error: {0}")]
    Device(DeviceError),

    #[error("Unexpected reply: {0}")]
    UnexpectedReply(String),
}

impl Error {
    /// Check if this error is the per-read wait bound expiring
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Transport(viscars_transport::Error::ReadTimeout))
    }

    /// Check if this error means inbound bytes could not be decoded
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::Core(e) if e.is_malformed())
    }
}
