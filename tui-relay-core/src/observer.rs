//! Observers for dispatch lifecycle events
//!
//! Observers see every transition the dispatcher makes, in the order it
//! makes them. They are for logging and diagnostics; they cannot veto or
//! alter a dispatch.

use crate::action::ActionId;
use crate::error::{EngineError, MisuseError};

/// Why a dispatch did not reach the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// The action was already in flight.
    AlreadyInFlight,
    /// The control had no bound action.
    Unbound,
}

/// Hook trait for dispatch lifecycle events
///
/// Implement this to add logging, metrics, or test recording on top of the
/// dispatcher. All methods default to doing nothing.
pub trait DispatchObserver: Send + Sync {
    /// Called after the action was marked in flight and handed to the engine.
    fn submitted(&self, _action: &ActionId) {}

    /// Called when a dispatch was dropped without reaching the engine.
    fn ignored(&self, _action: Option<&ActionId>, _reason: IgnoreReason) {}

    /// Called after the action returned to idle.
    fn settled(&self, _action: &ActionId, _outcome: Result<(), &EngineError>) {}

    /// Called for developer-facing misuse.
    fn misuse(&self, _error: &MisuseError) {}
}

/// An observer that does nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl DispatchObserver for NoopObserver {}

/// Observer that logs dispatch lifecycle events through `tracing`
#[derive(Debug, Clone)]
pub struct LoggingObserver {
    /// Whether to log submissions and successful settlements
    pub log_success: bool,
}

impl Default for LoggingObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl LoggingObserver {
    /// Log failures and ignored dispatches only.
    pub fn new() -> Self {
        Self { log_success: false }
    }

    /// Log every transition.
    pub fn verbose() -> Self {
        Self { log_success: true }
    }
}

impl DispatchObserver for LoggingObserver {
    fn submitted(&self, action: &ActionId) {
        if self.log_success {
            tracing::debug!(action = %action, "Action submitted");
        }
    }

    fn ignored(&self, action: Option<&ActionId>, reason: IgnoreReason) {
        match (action, reason) {
            (Some(action), IgnoreReason::AlreadyInFlight) => {
                tracing::debug!(action = %action, "Duplicate dispatch ignored");
            }
            (_, reason) => {
                tracing::debug!(?reason, "Dispatch ignored");
            }
        }
    }

    fn settled(&self, action: &ActionId, outcome: Result<(), &EngineError>) {
        match outcome {
            Ok(()) if self.log_success => {
                tracing::debug!(action = %action, "Action settled");
            }
            Ok(()) => {}
            Err(error) => {
                tracing::warn!(action = %action, error = %error, "Action failed");
            }
        }
    }

    fn misuse(&self, error: &MisuseError) {
        tracing::error!(error = %error, "Dispatch misuse");
    }
}

/// Compose multiple observers into one
#[derive(Default)]
pub struct ComposedObserver {
    observers: Vec<Box<dyn DispatchObserver>>,
}

impl std::fmt::Debug for ComposedObserver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComposedObserver")
            .field("observers_count", &self.observers.len())
            .finish()
    }
}

impl ComposedObserver {
    /// Create an empty composition
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an observer; observers are called in insertion order
    pub fn with(mut self, observer: impl DispatchObserver + 'static) -> Self {
        self.observers.push(Box::new(observer));
        self
    }
}

impl DispatchObserver for ComposedObserver {
    fn submitted(&self, action: &ActionId) {
        for observer in &self.observers {
            observer.submitted(action);
        }
    }

    fn ignored(&self, action: Option<&ActionId>, reason: IgnoreReason) {
        for observer in &self.observers {
            observer.ignored(action, reason);
        }
    }

    fn settled(&self, action: &ActionId, outcome: Result<(), &EngineError>) {
        for observer in &self.observers {
            observer.settled(action, outcome);
        }
    }

    fn misuse(&self, error: &MisuseError) {
        for observer in &self.observers {
            observer.misuse(error);
        }
    }
}
