//! Errors surfaced by the studio handle

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StudioError {
    #[error("Failed to read {}: {source}", path.display())]
    ReadUpload {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Studio runtime has stopped")]
    RuntimeStopped,
    #[error("Timed out waiting for the studio")]
    Timeout,
}

pub type StudioResult<T> = Result<T, StudioError>;
