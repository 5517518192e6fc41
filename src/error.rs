use thiserror::Error;

#[derive(Debug, Error)]
pub enum ThinkerError {
    #[error("{0}")]
    InvalidArgument(String),
    #[error("Unable to locate GEMINI_API_KEY in environment or .env file.")]
    CredentialNotFound,
    #[error("HTTP request failed: {0}")]
    Transport(String),
    #[error("Gemini API responded with HTTP status {status}: {body}")]
    HttpStatus { status: u16, body: String },
    #[error("{0}")]
    MalformedResponse(String),
    #[error("{0}")]
    Io(String),
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl ThinkerError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidArgument(_) => "E001_INVALID_ARGUMENT",
            Self::CredentialNotFound => "E002_CREDENTIAL_NOT_FOUND",
            Self::Transport(_) => "E003_TRANSPORT",
            Self::HttpStatus { .. } => "E004_HTTP_STATUS",
            Self::MalformedResponse(_) => "E005_MALFORMED_RESPONSE",
            Self::Io(_) => "E006_IO",
            Self::Config(_) => "E007_CONFIG",
        }
    }
}

impl From<reqwest::Error> for ThinkerError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.without_url().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::ThinkerError;

    #[test]
    fn http_status_display_names_the_code_and_body() {
        let err = ThinkerError::HttpStatus {
            status: 500,
            body: "{\"error\":\"boom\"}".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Gemini API responded with HTTP status 500: {\"error\":\"boom\"}"
        );
        assert_eq!(err.code(), "E004_HTTP_STATUS");
    }
}
