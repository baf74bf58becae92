use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("HTTP error! status: {status} - {message}")]
    Http { status: u16, message: String },

    #[error("{0}")]
    Application(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("No valid questions could be generated from the AI response")]
    EmptyQuiz,

    #[error("{0}")]
    Validation(String),

    #[error("No pending signup found. Please request OTP first.")]
    NoPendingSignup,

    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl AppError {
    /// Message for a notification, preferring what the backend said.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Http { message, .. } if !message.is_empty() => message.clone(),
            AppError::Network(_) => "Network error. Please check your connection and try again."
                .to_string(),
            other => other.to_string(),
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        AppError::Parse(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
