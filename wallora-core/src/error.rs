use std::path::PathBuf;

/// Broad category of a failed bridge call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    MissingInput,
    FileNotFound,
    DecodeFailed,
    InvalidTarget,
    InvalidArguments,
    Platform,
}

#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("Path and imageBytes are both null")]
    MissingInput,

    #[error("Image file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("Failed to decode {origin}: {reason}")]
    DecodeFailed { origin: String, reason: String },

    #[error("Invalid screen option: {0}")]
    InvalidTarget(i64),

    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("{0}")]
    Platform(String),
}

impl BridgeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            BridgeError::MissingInput => ErrorKind::MissingInput,
            BridgeError::FileNotFound(_) => ErrorKind::FileNotFound,
            BridgeError::DecodeFailed { .. } => ErrorKind::DecodeFailed,
            BridgeError::InvalidTarget(_) => ErrorKind::InvalidTarget,
            BridgeError::InvalidArguments(_) => ErrorKind::InvalidArguments,
            BridgeError::Platform(_) => ErrorKind::Platform,
        }
    }

    pub(crate) fn decode(origin: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        BridgeError::DecodeFailed {
            origin: origin.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn platform(step: &str, reason: impl std::fmt::Display) -> Self {
        BridgeError::Platform(format!("{}: {}", step, reason))
    }
}

pub type Result<T> = std::result::Result<T, BridgeError>;
