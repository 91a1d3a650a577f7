//! Centralized error types for the game.
//!
//! Configuration problems are reported through [`ConfigError`]; the components that own the
//! offending section log them and disable themselves instead of failing the whole game.

/// Main error type for the game.
///
/// This is the primary error type that should be used in public APIs.
#[derive(thiserror::Error, Debug)]
pub enum GameError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("SDL error: {0}")]
    Sdl(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),
}

/// Errors raised while loading or validating [`GameConfig`](crate::config::GameConfig).
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] Box<figment::Error>),

    #[error("{component}: {field} must be positive, got {value}")]
    NonPositive {
        component: &'static str,
        field: &'static str,
        value: f32,
    },

    #[error("{component}: {field} must not be negative, got {value}")]
    Negative {
        component: &'static str,
        field: &'static str,
        value: f32,
    },

    #[error("{component}: no {what} assigned")]
    Missing { component: &'static str, what: &'static str },

    #[error("{component}: {field} range is inverted ({min} > {max})")]
    InvertedRange {
        component: &'static str,
        field: &'static str,
        min: f32,
        max: f32,
    },
}

impl From<figment::Error> for ConfigError {
    fn from(error: figment::Error) -> Self {
        ConfigError::Load(Box::new(error))
    }
}

/// Result type for game operations.
pub type GameResult<T> = Result<T, GameError>;
