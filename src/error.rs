use thiserror::Error;

/// Mixer-level errors using thiserror for structured error handling.
///
/// None of these are fatal: the mixer logs them and keeps servicing
/// subsequent requests. They can be chained with anyhow in the binary.

#[derive(Error, Debug)]
pub enum MixerError {
    #[error("Invalid registration: {0}")]
    Validation(#[from] ValidationError),

    #[error("Sound not found: {0}")]
    NotFound(String),

    #[error("No active audio listener")]
    NoActiveListener,

    #[error("Source pool exhausted ({capacity} sources in use)")]
    PoolExhausted { capacity: usize },

    #[error("Source handle is stale or was never issued")]
    InvalidHandle,

    #[error("Audio backend failure")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("Failed to decode audio clip: {name}")]
    Decode {
        name: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Rejections raised while validating a registration batch.
///
/// A batch containing any of these is rejected as a whole.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Theme #{index} has an unplayable ambient sound")]
    UnplayableAmbient { index: usize },

    #[error("Theme #{index} has an empty name")]
    EmptyThemeName { index: usize },

    #[error("Theme with name {0} already exists")]
    DuplicateTheme(String),

    #[error("Sound with id {0} already exists")]
    DuplicateSound(String),

    #[error("Sound {0} has no clips")]
    EmptySoundEntry(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration from {path}")]
    LoadFailed {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Failed to save configuration to {path}")]
    SaveFailed {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to create config directory: {path}")]
    DirectoryCreationFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Platform config directory is unavailable")]
    NoConfigDir,
}

pub type MixerResult<T> = Result<T, MixerError>;

/// Type alias for application Results using anyhow for context chaining
pub type AppResult<T> = anyhow::Result<T>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_error_display() {
        let err = MixerError::NotFound("Ambient/Forest".to_string());
        assert_eq!(err.to_string(), "Sound not found: Ambient/Forest");

        let err = ValidationError::DuplicateTheme("Indoor".to_string());
        assert_eq!(err.to_string(), "Theme with name Indoor already exists");

        let err = MixerError::PoolExhausted { capacity: 4 };
        assert_eq!(err.to_string(), "Source pool exhausted (4 sources in use)");
    }

    #[test]
    fn test_validation_converts_into_mixer_error() {
        let err: MixerError = ValidationError::EmptySoundEntry("Steps".to_string()).into();
        assert!(matches!(err, MixerError::Validation(ValidationError::EmptySoundEntry(_))));
        assert_eq!(err.to_string(), "Invalid registration: Sound Steps has no clips");
    }

    #[test]
    fn test_error_source_chain() {
        use std::io;

        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let config_err = ConfigError::LoadFailed {
            path: "/test/mixer.json".to_string(),
            source: Box::new(io_err),
        };

        assert!(config_err.source().is_some());
        assert_eq!(
            config_err.to_string(),
            "Failed to load configuration from /test/mixer.json"
        );
    }
}
