//! Error types for dispatch, engine submission and configuration
//!
//! None of these are ever thrown across the dispatch boundary. Engine
//! failures become recorded state, misuse becomes a logged diagnostic, and
//! only configuration loading hands a `Result` back to the caller.

use std::path::PathBuf;

use thiserror::Error;

use crate::action::ActionId;

/// Failure reported by the engine for a single submission.
///
/// Kept `Clone` so the same error can be recorded on the dispatch state,
/// handed to observers, and reported to the engine's error channel.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// The engine processed the action and refused it.
    #[error("engine rejected the action: {0}")]
    Rejected(String),

    /// The engine went away before answering.
    #[error("engine disconnected before answering")]
    Disconnected,

    /// The engine did not answer before its deadline.
    #[error("engine did not answer within {0:?}")]
    TimedOut(std::time::Duration),
}

impl EngineError {
    /// Shorthand for a rejection with a message.
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected(message.into())
    }
}

/// Developer-facing misuse of the dispatch API.
///
/// Reported through tracing and observers, never raised into the render
/// path.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MisuseError {
    /// `dispatch` was called on a handle with no bound action key.
    #[error("dispatch called on a control with no bound action")]
    UnboundDispatch,

    /// The payload could not be converted for submission.
    #[error("payload for {action} could not be serialized: {reason}")]
    Payload {
        /// Action the payload was meant for.
        action: ActionId,
        /// Serializer message.
        reason: String,
    },

    /// `dispatch` was called outside a tokio runtime.
    #[error("dispatch for {0} called outside a tokio runtime")]
    NoRuntime(ActionId),
}

/// Errors loading a [`RelayConfig`](crate::config::RelayConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config from {path}: {source}")]
    Read {
        /// Path that was read.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The config text was not valid JSON for the config shape.
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    /// An activation key string could not be parsed.
    #[error("invalid activation key {0:?}")]
    InvalidKey(String),

    /// A value was out of its accepted range.
    #[error("invalid config value for {field}: {reason}")]
    Invalid {
        /// Offending field, as spelled in the config file.
        field: &'static str,
        /// What was wrong with it.
        reason: &'static str,
    },
}
