use thiserror::Error;

use specter_proto::error::ProtoError;

/// Errors surfaced by the relay binary and transport loop.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config parse failed: {0}")]
    Config(#[from] toml::de::Error),

    #[error(transparent)]
    Proto(#[from] ProtoError),
}
