//! Error kinds surfaced by every wizard step.

use thiserror::Error;

/// Errors produced by the wizard steps.
///
/// The three kinds are kept apart so the endpoint boundary can map them to
/// distinct status codes and decide which ones may fall back to defaults.
#[derive(Debug, Error)]
pub enum WizardError {
    /// Missing or malformed required input.
    #[error("{0}")]
    Validation(String),

    /// Network failure or non-2xx answer from a remote service.
    #[error("upstream error: {0}")]
    Upstream(String),

    /// A response arrived but did not have the expected structure.
    #[error("unexpected response shape: {0}")]
    Shape(String),
}

impl WizardError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn upstream(message: impl Into<String>) -> Self {
        Self::Upstream(message.into())
    }

    pub fn shape(message: impl Into<String>) -> Self {
        Self::Shape(message.into())
    }
}

impl From<reqwest::Error> for WizardError {
    fn from(error: reqwest::Error) -> Self {
        Self::Upstream(error.to_string())
    }
}

pub type WizardResult<T> = Result<T, WizardError>;
