//! Configuration-specific error types.

use std::path::PathBuf;

/// Errors that can occur during configuration operations.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Configuration file does not exist
    #[error("Configuration file not found at {0}")]
    FileNotFound(PathBuf),

    /// No credentials section in the configuration
    #[error("Credentials not set")]
    CredentialsNotSet,

    /// Failed to find home directory
    #[error("Failed to find home directory")]
    HomeDirectoryNotFound,

    /// Failed to load configuration file
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to deserialize configuration
    #[error("Failed to deserialize configuration: {0}")]
    DeserializationFailed(String),

    /// A configured domain could not be turned into a link pattern
    #[error("Invalid link pattern for {domain}: {message}")]
    InvalidPattern { domain: String, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let error = ConfigError::CredentialsNotSet;
        assert!(error.to_string().contains("Credentials not set"));

        let error = ConfigError::HomeDirectoryNotFound;
        assert!(error.to_string().contains("home directory"));

        let error = ConfigError::DeserializationFailed("test".to_string());
        assert!(error.to_string().contains("test"));
    }

    #[test]
    fn test_config_error_with_path() {
        let error = ConfigError::FileNotFound(PathBuf::from("/test/path/config.yml"));
        let error_str = error.to_string();
        assert!(error_str.contains("/test/path"));
    }
}
