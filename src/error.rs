use reqwest::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Session expired")]
    Unauthorized,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("API error {status}: {message}")]
    Api { status: StatusCode, message: String },

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl ClientError {
    /// Build the error for a non-success response, keeping the body text the
    /// backend sent as the message.
    pub fn from_status(status: StatusCode, body: String) -> Self {
        let message = if body.trim().is_empty() {
            format!("HTTP error! status: {}", status.as_u16())
        } else {
            body.trim().to_string()
        };

        match status {
            StatusCode::UNAUTHORIZED => ClientError::Unauthorized,
            StatusCode::NOT_FOUND => ClientError::NotFound(message),
            StatusCode::CONFLICT => ClientError::Conflict(message),
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                ClientError::Validation(message)
            }
            _ => ClientError::Api { status, message },
        }
    }

    /// Short text suitable for a transient, auto-dismissed message.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Unauthorized => "Your session has expired. Please sign in again.".into(),
            ClientError::NotFound(msg)
            | ClientError::Conflict(msg)
            | ClientError::Validation(msg)
            | ClientError::InvalidState(msg) => msg.clone(),
            ClientError::Api { .. } | ClientError::Decode(_) | ClientError::Internal(_) => {
                "Something went wrong. Please try again.".into()
            }
            ClientError::Transport(_) => "Could not reach the server. Please try again.".into(),
            ClientError::Config(msg) => msg.clone(),
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, ClientError::Transport(_))
    }
}

impl From<validator::ValidationErrors> for ClientError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ClientError::Validation(errors.to_string())
    }
}

pub type ClientResult<T> = Result<T, ClientError>;
