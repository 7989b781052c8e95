// src/error.rs
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Request failed with status {0}")]
    Status(u16),

    /// Application-level failure reported in the `error` field of a response body.
    #[error("{0}")]
    Api(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Please enter a valid CID: {0}")]
    InvalidCid(String),

    #[error("{0}")]
    Validation(String),
}

impl Error {
    /// Errors the user caused and should see, as opposed to background noise.
    pub fn is_user_facing(&self) -> bool {
        matches!(self, Error::Api(_) | Error::InvalidCid(_) | Error::Validation(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_displays_backend_message() {
        let err = Error::Api("Group name already exists".to_string());
        assert_eq!(err.to_string(), "Group name already exists");
        assert!(err.is_user_facing());
    }

    #[test]
    fn test_status_error_is_background() {
        assert!(!Error::Status(502).is_user_facing());
    }
}
