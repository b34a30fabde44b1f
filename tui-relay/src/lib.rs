//! tui-relay: action dispatch with per-action concurrency guards for Rust TUI apps
//!
//! Controls never talk to the engine directly. They hold an
//! [`ActionHandle`] bound to a typed [`ActionKey`], read loading/disabled
//! state from it while rendering, and call `dispatch` on activation. The
//! [`Dispatcher`] guarantees that one action is never in flight twice and
//! tells every control sharing a key when it starts and stops.
//!
//! Before dispatching, a control marks the [`Event`] so containers above it
//! (a ripple, a highlighted card) can react to the same gesture.
//!
//! # Example
//! ```ignore
//! use tui_relay::prelude::*;
//!
//! #[derive(ActionKeys)]
//! #[action_keys(scope = "report")]
//! struct ReportKeys {
//!     refresh: ActionKey<()>,
//!     rename: ActionKey<String>,
//! }
//!
//! let keys = ReportKeys::create();
//! let (engine, inbox) = ChannelEngine::new();
//! let (dispatcher, settlements) = Dispatcher::new(engine);
//!
//! let refresh = dispatcher.bind(Some(&keys.refresh));
//! refresh.dispatch(());
//! assert!(refresh.is_loading());
//! ```

// Re-export everything from core
pub use tui_relay_core::*;

// Re-export derive macros
pub use tui_relay_macros::ActionKeys;

/// Prelude for convenient imports
pub mod prelude {
    // Actions
    pub use tui_relay_core::{ActionId, ActionKey, ActionKeySet};

    // Dispatch
    pub use tui_relay_core::{
        ActionHandle, ActionState, ChannelEngine, DispatchObserver, DispatchOutcome, Dispatcher,
        Engine, EngineError, EngineInbox, LoggingObserver, MisuseError, PendingSubmission,
        Settlement, Settlements, Submission, Subscription,
    };

    // Event system
    pub use tui_relay_core::{
        bubble_through, process_raw_event, spawn_event_poller, BubbleListener, BubbleMarker,
        Component, ElementId, Event, EventBus, EventContext, EventKind, RawEvent,
    };

    // Keys and config
    pub use tui_relay_core::{
        format_key_for_display, parse_key_string, ActivationKeys, RelayConfig, RippleConfig,
    };

    // Runtime
    pub use tui_relay_core::{EventOutcome, RelayApp, RelayRuntime};

    // Derive macros
    pub use tui_relay_macros::ActionKeys;

    // Ratatui re-exports
    pub use tui_relay_core::{Color, Frame, Line, Modifier, Rect, Span, Style, Text};
}
