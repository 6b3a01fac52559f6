use std::fmt;

use thiserror::Error;

/// Lookup miss carrying the key that was asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{0} not found")]
pub struct KeyNotFound<Q>(pub Q);

impl<Q> KeyNotFound<Q> {
    pub fn key(&self) -> &Q {
        &self.0
    }
}

/// Errors raised by table construction, plus owned lookup misses.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// No entry in the resolved bucket matched the key.
    #[error("{0} not found")]
    KeyNotFound(String),

    #[error("bucket count must be positive, got {0}")]
    InvalidBucketCount(usize),
}

impl<Q: fmt::Display + ?Sized> From<KeyNotFound<&Q>> for Error {
    fn from(missing: KeyNotFound<&Q>) -> Self {
        Error::KeyNotFound(missing.0.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
