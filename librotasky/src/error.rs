//! Error types for Rotasky

use thiserror::Error;

pub type Result<T> = std::result::Result<T, RotaskyError>;

#[derive(Error, Debug)]
pub enum RotaskyError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Platform error: {0}")]
    Platform(#[from] PlatformError),

    #[error("No content available to post")]
    NoContent,
}

impl RotaskyError {
    /// Returns the appropriate exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            RotaskyError::NoContent => 3,
            RotaskyError::Platform(PlatformError::Authentication(_)) => 2,
            RotaskyError::Platform(_) => 1,
            RotaskyError::Config(_) => 1,
            RotaskyError::Storage(_) => 1,
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Missing credential: set the {0} environment variable")]
    MissingCredential(String),
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse state document: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Error, Debug, Clone)]
pub enum PlatformError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Content validation failed: {0}")]
    Validation(String),

    #[error("Posting failed: {0}")]
    Posting(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Rate limit exceeded: {0}")]
    RateLimit(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_code_no_content() {
        assert_eq!(RotaskyError::NoContent.exit_code(), 3);
    }

    #[test]
    fn test_exit_code_authentication_error() {
        let error = RotaskyError::Platform(PlatformError::Authentication("bad app password".into()));
        assert_eq!(error.exit_code(), 2);
    }

    #[test]
    fn test_exit_code_other_platform_errors() {
        for platform_error in [
            PlatformError::Validation("too long".into()),
            PlatformError::Posting("record rejected".into()),
            PlatformError::Network("connection refused".into()),
            PlatformError::RateLimit("slow down".into()),
        ] {
            let error = RotaskyError::Platform(platform_error);
            assert_eq!(error.exit_code(), 1);
        }
    }

    #[test]
    fn test_exit_code_config_error() {
        let error = RotaskyError::Config(ConfigError::MissingCredential("BLUESKY_HANDLE".into()));
        assert_eq!(error.exit_code(), 1);
    }

    #[test]
    fn test_exit_code_storage_error() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let error = RotaskyError::Storage(StorageError::Io(io));
        assert_eq!(error.exit_code(), 1);
    }

    #[test]
    fn test_missing_credential_message_names_the_variable() {
        let error = ConfigError::MissingCredential("BLUESKY_PASSWORD".into());
        let message = format!("{}", error);
        assert!(message.contains("BLUESKY_PASSWORD"));
        assert!(message.contains("environment variable"));
    }

    #[test]
    fn test_error_conversion_from_platform_error() {
        let platform_error = PlatformError::Posting("relay down".into());
        let error: RotaskyError = platform_error.into();
        assert!(matches!(error, RotaskyError::Platform(_)));
    }

    #[test]
    fn test_no_content_message() {
        assert_eq!(
            format!("{}", RotaskyError::NoContent),
            "No content available to post"
        );
    }
}
