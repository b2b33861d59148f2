use crate::data::FetchError;

/// Exit code for configuration, argument, and local I/O failures.
pub const EXIT_CONFIG: u8 = 2;
/// Exit code for a rejected or expired API key.
pub const EXIT_AUTH: u8 = 3;
/// Exit code for network, server, and response-shape failures.
pub const EXIT_FETCH: u8 = 4;
/// Exit code when the endpoint rate-limits the request.
pub const EXIT_RATE_LIMITED: u8 = 5;

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::new(EXIT_CONFIG, message)
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<FetchError> for AppError {
    fn from(err: FetchError) -> Self {
        let exit_code = match &err {
            FetchError::Validation(_) => EXIT_CONFIG,
            FetchError::Unauthorized => EXIT_AUTH,
            FetchError::RateLimited => EXIT_RATE_LIMITED,
            FetchError::Server(_) | FetchError::Network(_) | FetchError::MalformedResponse(_) => {
                EXIT_FETCH
            }
        };
        Self::new(exit_code, err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
