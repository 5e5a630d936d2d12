//! Transport errors

use std::io;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Not connected")]
    NotConnected,

    #[error("Already connected")]
    AlreadyConnected,

    #[error("Failed to open {path}: {source}")]
    OpenFailed {
        path: String,
        source: tokio_serial::Error,
    },

    #[error("Read timeout")]
    ReadTimeout,

    #[error("Connection closed by the device side")]
    ConnectionClosed,

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}
