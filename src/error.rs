use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SignalError {
    /// Empty or malformed observation sequences, and invalid parameters.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("config error: {0}")]
    Config(#[from] ConfigError),
}

/// Unreadable or unparsable run config file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reading {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parsing {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl SignalError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        SignalError::InvalidInput(msg.into())
    }

    /// Prefix an input error with the source it came from.
    pub fn in_source(self, source: impl std::fmt::Display) -> Self {
        match self {
            SignalError::InvalidInput(msg) => SignalError::InvalidInput(format!("{source}: {msg}")),
            other => other,
        }
    }

    pub fn is_invalid_input(&self) -> bool {
        matches!(self, SignalError::InvalidInput(_))
    }
}

pub type Result<T> = std::result::Result<T, SignalError>;
