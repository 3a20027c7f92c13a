//! Common error types for the emotion mirror

use thiserror::Error;

/// Common result type for emotion mirror operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error kinds shared by the pipeline and its consumers
#[derive(Error, Debug)]
pub enum Error {
    /// Classifier rejected the image (I/O or model error)
    #[error("Classifier failure: {0}")]
    ClassifierFailure(String),

    /// Classifier output is missing or duplicating labels, or carries a bad confidence
    #[error("Invalid score set: {0}")]
    InvalidScoreSet(String),

    /// Bias report submitted with no completed session to reference
    #[error("No active session: {0}")]
    NoActiveSession(String),

    /// Image submitted while another analysis is still in flight
    #[error("Analysis already in progress")]
    ReentrantAnalysis,

    /// Report form submitted without selecting the actual emotion
    #[error("Actual emotion not selected")]
    MissingActualLabel,

    /// Image blob is not an `image/*` payload
    #[error("Invalid image: {0}")]
    InvalidImage(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// True for the failures that abort an analysis and are shown to the user
    pub fn is_analysis_failure(&self) -> bool {
        matches!(self, Error::ClassifierFailure(_) | Error::InvalidScoreSet(_))
    }
}
