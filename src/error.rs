use std::io;

use thiserror::Error;

use crate::config::ConfigError;

/// Failures that can escape the frame loop. None of them are recoverable;
/// `main` logs them and exits.
#[derive(Error, Debug)]
pub enum GameError {
    #[error("terminal I/O failed: {0}")]
    Io(#[from] io::Error),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("panicked: {0}")]
    Panicked(String),
}
