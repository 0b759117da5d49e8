//! Errors of the snapshot library.

use thiserror::Error;

use crate::upid::UpidError;

/// Errors surfaced while decoding or querying a snapshot.
#[derive(Debug, Error)]
pub enum StateError {
    /// The snapshot document is not valid JSON or does not match the model.
    /// Malformed `pid` fields end up here too.
    #[error("decode state: {0}")]
    Decode(#[from] serde_json::Error),
    /// The snapshot could not be read.
    #[error("read state: {0}")]
    Io(#[from] std::io::Error),
    /// A peer identifier outside of the decoded `pid` fields failed to parse.
    #[error("invalid pid: {0}")]
    Upid(#[from] UpidError),
}
