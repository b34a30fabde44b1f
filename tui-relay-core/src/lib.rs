//! Core types for tui-relay
//!
//! This crate routes user intent from terminal UI components to an external
//! engine, with a per-action concurrency guard and click bubbling.
//!
//! # Core Concepts
//!
//! - **ActionKey**: typed, stable identifier for a logical action
//! - **Dispatcher**: per-action state (idle / in flight / last error),
//!   subscriptions, and the route to the engine
//! - **Engine**: whatever consumes submitted actions
//! - **Event / BubbleMarker**: a gesture marked by the control that handled
//!   it, visible to every ancestor afterwards
//! - **RelayRuntime**: the loop tying terminal events, settlements and ticks
//!   together
//!
//! # Basic Example
//!
//! ```ignore
//! use tui_relay_core::prelude::*;
//!
//! let (engine, mut inbox) = ChannelEngine::new();
//! let (dispatcher, settlements) = Dispatcher::new(engine);
//!
//! tokio::spawn(async move {
//!     while let Some(pending) = inbox.recv().await {
//!         tracing::info!(action = %pending.action(), "engine got action");
//!         pending.succeed();
//!     }
//! });
//!
//! let save: ActionKey<()> = ActionKey::named("save");
//! let button = dispatcher.bind(Some(&save));
//! button.dispatch(());
//! assert!(button.is_loading());
//!
//! let mut runtime = RelayRuntime::new(dispatcher, settlements);
//! runtime.run(&mut terminal, &mut app).await?;
//! ```

pub mod action;
pub mod bubble;
pub mod bus;
pub mod component;
pub mod config;
pub mod dispatcher;
pub mod engine;
pub mod error;
pub mod event;
pub mod keys;
pub mod observer;
pub mod runtime;
pub mod testing;

// Action exports
pub use action::{ActionId, ActionKey, ActionKeySet, ANONYMOUS_PREFIX};

// Dispatch exports
pub use dispatcher::{
    ActionHandle, ActionState, DispatchOutcome, DispatchStatus, Dispatcher, Settlement,
    Settlements, SubscriberId, Subscription,
};
pub use engine::{ChannelEngine, Engine, EngineInbox, PendingSubmission, SubmitFuture, Submission};
pub use error::{ConfigError, EngineError, MisuseError};
pub use observer::{ComposedObserver, DispatchObserver, IgnoreReason, LoggingObserver, NoopObserver};

// Event system exports
pub use bubble::{bubble_through, BubbleListener, BubbleMarker, GestureId};
pub use bus::{process_raw_event, raw_from_terminal, spawn_event_poller, EventBus, RawEvent};
pub use component::Component;
pub use event::{ElementId, Event, EventContext, EventKind};

// Config and key exports
pub use config::{RelayConfig, RippleConfig};
pub use keys::{format_key_for_display, parse_key_string, ActivationKeys};

// Runtime exports
pub use runtime::{EventOutcome, PollerConfig, RelayApp, RelayRuntime};

// Re-export ratatui types for convenience
pub use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    Frame,
};

// Testing exports
pub use testing::{
    buffer_to_string_plain, char_key, click, click_event, ctrl_key, key, key_event,
    DispatchHarness, Observed, RecordingObserver, RenderHarness,
};

#[cfg(feature = "testing-time")]
pub use testing::{advance_time, pause_time, resume_time};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::action::{ActionId, ActionKey, ActionKeySet};
    pub use crate::bubble::{bubble_through, BubbleListener, BubbleMarker};
    pub use crate::bus::{EventBus, RawEvent};
    pub use crate::component::Component;
    pub use crate::config::RelayConfig;
    pub use crate::dispatcher::{
        ActionHandle, ActionState, DispatchOutcome, Dispatcher, Settlement, Settlements,
        Subscription,
    };
    pub use crate::engine::{ChannelEngine, Engine, EngineInbox, Submission};
    pub use crate::error::{EngineError, MisuseError};
    pub use crate::event::{ElementId, Event, EventContext, EventKind};
    pub use crate::keys::ActivationKeys;
    pub use crate::observer::{DispatchObserver, LoggingObserver};
    pub use crate::runtime::{EventOutcome, RelayApp, RelayRuntime};

    // Re-export ratatui types
    pub use ratatui::{
        layout::Rect,
        style::{Color, Modifier, Style},
        text::{Line, Span, Text},
        Frame,
    };
}
