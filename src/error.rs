//! Error types for configuration loading and session control.
//!
//! The per-tick simulation never fails: degenerate inputs are absorbed by the
//! policies documented on each operation.  Errors only surface at the edges,
//! when balance data is loaded or when the host commits an upgrade the session
//! did not ask for.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use horde_survival::config::GameConfig;
//!
//! fn startup() -> Result<(), horde_survival::error::ConfigError> {
//!     let config = GameConfig::load("assets/balance.toml")?;
//!     config.validate()?;
//!     Ok(())
//! }
//! ```

use std::fmt;

/// Failure to produce a usable [`crate::config::GameConfig`].
#[derive(Debug)]
pub enum ConfigError {
    /// The file exists but could not be read.
    Io {
        path: String,
        source: std::io::Error,
    },

    /// The file is not valid TOML or does not match the config schema.
    Parse {
        path: String,
        source: toml::de::Error,
    },

    /// A value parsed correctly but is outside the range the simulation accepts.
    Invalid {
        /// Dotted path of the offending field (for logging).
        field: &'static str,
        /// Human-readable description of the accepted range.
        reason: &'static str,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io { path, source } => {
                write!(f, "failed to read balance config '{}': {}", path, source)
            }
            ConfigError::Parse { path, source } => {
                write!(f, "failed to parse balance config '{}': {}", path, source)
            }
            ConfigError::Invalid { field, reason } => {
                write!(f, "invalid balance value '{}': {}", field, reason)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io { source, .. } => Some(source),
            ConfigError::Parse { source, .. } => Some(source),
            ConfigError::Invalid { .. } => None,
        }
    }
}

/// Misuse of the session's upgrade-selection handshake.
#[derive(Debug, Clone, PartialEq)]
pub enum SimError {
    /// An upgrade was committed while the session was not waiting for one.
    NoPendingUpgrade,

    /// The committed choice is not among the options currently offered.
    ChoiceNotOffered {
        /// Display id of the rejected choice.
        choice: String,
    },
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimError::NoPendingUpgrade => {
                write!(f, "no upgrade selection is pending")
            }
            SimError::ChoiceNotOffered { choice } => {
                write!(f, "upgrade '{}' was not among the offered options", choice)
            }
        }
    }
}

impl std::error::Error for SimError {}

/// Convenience alias: a `Result` using `ConfigError` as the error type.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Convenience alias: a `Result` using `SimError` as the error type.
pub type SimResult<T> = Result<T, SimError>;
