use thiserror::Error;

/// Application-wide error type
#[derive(Debug, Error)]
pub enum AppError {
    #[error("input error: {0}")]
    Input(#[from] InputError),

    #[error("authentication failed: {0}")]
    Auth(#[from] AuthError),

    #[error("api error: {0}")]
    Api(#[from] ApiError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors in the inputs supplied to the CLI
#[derive(Debug, Error)]
pub enum InputError {
    #[error("app identifier cannot be empty")]
    EmptyAppId,

    #[error("failed to read private key file {path}: {source}")]
    KeyRead {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Errors while building and signing the app assertion
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("failed to parse private key: {0}")]
    KeyParse(#[source] jsonwebtoken::errors::Error),

    #[error("failed to sign assertion: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),

    #[error("failed to serialize assertion segment: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Errors from the two authority round-trips
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("authority returned status {status}: {body}")]
    Authority {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("no matching installation found")]
    NoInstallationFound,

    #[error("unexpected response shape: {0}")]
    Parse(#[source] reqwest::Error),

    #[error("request timed out")]
    Timeout(#[source] reqwest::Error),

    #[error("request failed: {0}")]
    Request(#[source] reqwest::Error),
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Timeout(err)
        } else if err.is_decode() {
            ApiError::Parse(err)
        } else {
            ApiError::Request(err)
        }
    }
}

impl ApiError {
    /// Get a user-friendly error message for common HTTP status codes
    pub fn user_friendly_message(&self) -> String {
        match self {
            ApiError::Authority { status, .. } => match status.as_u16() {
                401 => "unauthorized - the app assertion was rejected, check the app id and private key".to_string(),
                403 => "forbidden - the app lacks permission for this operation".to_string(),
                404 => "not found - the installation does not exist or the app cannot see it".to_string(),
                429 => "rate limited - too many requests, please try again later".to_string(),
                500..=599 => "server error - the authority is temporarily unavailable".to_string(),
                _ => format!("api error - authority returned status {status}"),
            },
            ApiError::NoInstallationFound => {
                "no installation found - install the app on an account first".to_string()
            }
            ApiError::Timeout(_) => {
                "request timeout - the authority did not respond in time".to_string()
            }
            ApiError::Request(e) => {
                let error_str = e.to_string().to_lowercase();
                if error_str.contains("connection refused") {
                    "connection refused - is the api url reachable?".to_string()
                } else if error_str.contains("dns") || error_str.contains("name resolution") {
                    "DNS error - could not resolve the authority hostname".to_string()
                } else {
                    format!("network error - {e}")
                }
            }
            _ => self.to_string(),
        }
    }
}

/// Convenience type for Results
pub type Result<T> = std::result::Result<T, AppError>;
