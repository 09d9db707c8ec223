use thiserror::Error;

pub const VALIDATION_MESSAGE: &str = "Please enter a product idea!";
pub const TRANSPORT_MESSAGE: &str =
    "Something went wrong. The generation service may be unreachable or misconfigured. Please try again.";
pub const AUTH_MESSAGE: &str = "Unauthorized: API key is missing or invalid.";

/// Every failure the page can show. All of them end up as one message string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AppError {
    #[error("{}", VALIDATION_MESSAGE)]
    Validation,
    #[error("{}", TRANSPORT_MESSAGE)]
    Transport,
    #[error("{}", AUTH_MESSAGE)]
    Auth,
    #[error("{0}")]
    GenerationFailed(String),
    #[error("Copy failed: {0}")]
    CopyFailed(String),
}

impl AppError {
    pub fn user_message(&self) -> String {
        self.to_string()
    }
}
