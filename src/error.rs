//! Error types for freshbox
//!
//! Install task actions return `anyhow::Result` so the full context chain
//! lands in the install log. Startup and session plumbing use
//! [`FreshboxError`].

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FreshboxError {
    /// Filesystem or terminal IO
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Settings that cannot be resolved, such as a missing home directory
    #[error("Configuration error: {0}")]
    Config(String),

    /// Shared wizard state that can no longer be used
    #[error("State error: {0}")]
    State(String),
}

pub type Result<T> = std::result::Result<T, FreshboxError>;

impl FreshboxError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn state(msg: impl Into<String>) -> Self {
        Self::State(msg.into())
    }
}
