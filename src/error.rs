//! Centralized error type for the longplay umbrella crate.
//!
//! Wraps subsystem errors so `?` propagates naturally across crate boundaries.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] longplay_core::Error),

    #[error("Invalid track id {0:?}: {1}")]
    InvalidTrackId(String, uuid::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// The underlying subsystem error, if any.
    pub fn core(&self) -> Option<&longplay_core::Error> {
        match self {
            Error::Core(e) => Some(e),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
