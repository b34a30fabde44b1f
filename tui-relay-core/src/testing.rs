//! Test utilities for tui-relay applications
//!
//! - [`key`], [`char_key`], [`ctrl_key`], [`click`]: event constructors
//! - [`RenderHarness`]: render into a ratatui `TestBackend` and read the
//!   buffer back as text
//! - [`DispatchHarness`]: a dispatcher wired to a [`ChannelEngine`] whose
//!   submissions the test answers by hand
//! - `assert_submitted!` and friends for checking what reached the engine
//!
//! # Example
//!
//! ```ignore
//! use tui_relay::testing::DispatchHarness;
//!
//! let mut harness = DispatchHarness::new();
//! let save = harness.bind(&ActionKey::<()>::named("save"));
//!
//! save.dispatch(());
//! assert_submitted!(harness.submissions(), "save");
//!
//! harness.succeed_next();
//! harness.settle_next().await;
//! assert!(!save.is_loading());
//! ```

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crossterm::event::{
    KeyCode, KeyEvent, KeyEventKind, KeyEventState, KeyModifiers, MouseButton, MouseEvent,
    MouseEventKind,
};
use ratatui::backend::TestBackend;
use ratatui::buffer::Buffer;
use ratatui::{Frame, Terminal};

use crate::action::{ActionId, ActionKey};
use crate::dispatcher::{ActionHandle, Dispatcher, Settlements};
use crate::engine::{ChannelEngine, EngineInbox, PendingSubmission, Submission};
use crate::error::{EngineError, MisuseError};
use crate::event::{Event, EventContext, EventKind};
use crate::keys::parse_key_string;
use crate::observer::{ComposedObserver, DispatchObserver, IgnoreReason, LoggingObserver};

/// Create a `KeyEvent` from a key string.
///
/// This is a convenience wrapper around [`parse_key_string`] that panics
/// if the key string is invalid, making it suitable for use in tests.
///
/// # Examples
///
/// ```
/// use tui_relay_core::testing::key;
/// use crossterm::event::{KeyCode, KeyModifiers};
///
/// let k = key("ctrl+p");
/// assert_eq!(k.code, KeyCode::Char('p'));
/// assert!(k.modifiers.contains(KeyModifiers::CONTROL));
/// ```
///
/// # Panics
///
/// Panics if the key string cannot be parsed.
pub fn key(s: &str) -> KeyEvent {
    parse_key_string(s).unwrap_or_else(|| panic!("Invalid key string: {:?}", s))
}

/// Create a `KeyEvent` for a character with no modifiers.
pub fn char_key(c: char) -> KeyEvent {
    KeyEvent {
        code: KeyCode::Char(c),
        modifiers: KeyModifiers::empty(),
        kind: KeyEventKind::Press,
        state: KeyEventState::empty(),
    }
}

/// Create a `KeyEvent` for a character with Ctrl modifier.
pub fn ctrl_key(c: char) -> KeyEvent {
    KeyEvent {
        code: KeyCode::Char(c),
        modifiers: KeyModifiers::CONTROL,
        kind: KeyEventKind::Press,
        state: KeyEventState::empty(),
    }
}

/// A left-button press at `(column, row)`.
pub fn click(column: u16, row: u16) -> EventKind {
    EventKind::Mouse(MouseEvent {
        kind: MouseEventKind::Down(MouseButton::Left),
        column,
        row,
        modifiers: KeyModifiers::NONE,
    })
}

/// An `Event` for a key string, with an empty context.
pub fn key_event(s: &str) -> Event {
    Event::new(EventKind::Key(key(s)), EventContext::default())
}

/// An `Event` for a left click, with `context` as the element tree.
pub fn click_event(column: u16, row: u16, context: EventContext) -> Event {
    Event::new(click(column, row), context)
}

/// Convert a buffer to plain text, one line per row, trailing spaces
/// trimmed.
pub fn buffer_to_string_plain(buffer: &Buffer) -> String {
    let area = buffer.area;
    let mut lines = Vec::with_capacity(area.height as usize);
    for y in area.top()..area.bottom() {
        let mut line = String::new();
        for x in area.left()..area.right() {
            if let Some(cell) = buffer.cell((x, y)) {
                line.push_str(cell.symbol());
            }
        }
        lines.push(line.trim_end().to_string());
    }
    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    lines.join("\n")
}

/// Renders into an in-memory terminal.
pub struct RenderHarness {
    terminal: Terminal<TestBackend>,
}

impl RenderHarness {
    /// Create a harness with a `width` x `height` terminal.
    ///
    /// # Panics
    ///
    /// Panics if the test backend cannot be created.
    pub fn new(width: u16, height: u16) -> Self {
        let terminal = Terminal::new(TestBackend::new(width, height))
            .unwrap_or_else(|e| panic!("test terminal: {e}"));
        Self { terminal }
    }

    /// Draw one frame and return the resulting buffer.
    pub fn render(&mut self, draw: impl FnOnce(&mut Frame)) -> &Buffer {
        self.terminal
            .draw(draw)
            .unwrap_or_else(|e| panic!("test draw: {e}"));
        self.terminal.backend().buffer()
    }

    /// Draw one frame and return it as plain text.
    pub fn render_to_string_plain(&mut self, draw: impl FnOnce(&mut Frame)) -> String {
        buffer_to_string_plain(self.render(draw))
    }

    /// The buffer of the last frame.
    pub fn buffer(&self) -> &Buffer {
        self.terminal.backend().buffer()
    }
}

/// One observer callback, as recorded by [`RecordingObserver`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Observed {
    Submitted(ActionId),
    Ignored(Option<ActionId>, IgnoreReason),
    Settled(ActionId, Result<(), EngineError>),
    Misuse(MisuseError),
}

/// Observer that records every callback for later assertions.
#[derive(Debug, Clone, Default)]
pub struct RecordingObserver {
    log: Arc<Mutex<Vec<Observed>>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take everything recorded so far.
    pub fn take(&self) -> Vec<Observed> {
        std::mem::take(&mut *self.lock())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Observed>> {
        self.log
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn push(&self, observed: Observed) {
        self.lock().push(observed);
    }
}

impl DispatchObserver for RecordingObserver {
    fn submitted(&self, action: &ActionId) {
        self.push(Observed::Submitted(action.clone()));
    }

    fn ignored(&self, action: Option<&ActionId>, reason: IgnoreReason) {
        self.push(Observed::Ignored(action.cloned(), reason));
    }

    fn settled(&self, action: &ActionId, outcome: Result<(), &EngineError>) {
        self.push(Observed::Settled(action.clone(), outcome.map_err(Clone::clone)));
    }

    fn misuse(&self, error: &MisuseError) {
        self.push(Observed::Misuse(error.clone()));
    }
}

/// A dispatcher connected to an engine the test answers by hand.
///
/// Submissions are answered in the order they were made. Settlements are
/// applied only when the test asks, so the in-flight window can be
/// inspected.
pub struct DispatchHarness {
    /// The dispatcher under test.
    pub dispatcher: Dispatcher,
    settlements: Settlements,
    inbox: EngineInbox,
    pending: VecDeque<PendingSubmission>,
    history: Vec<Submission>,
    observer: RecordingObserver,
}

impl Default for DispatchHarness {
    fn default() -> Self {
        Self::new()
    }
}

impl DispatchHarness {
    pub fn new() -> Self {
        Self::with_engine(ChannelEngine::new())
    }

    /// Use an existing channel engine, e.g. one with a deadline.
    pub fn with_engine((engine, inbox): (ChannelEngine, EngineInbox)) -> Self {
        let observer = RecordingObserver::new();
        let (dispatcher, settlements) = Dispatcher::with_observer(
            engine,
            ComposedObserver::new()
                .with(observer.clone())
                .with(LoggingObserver::verbose()),
        );
        Self {
            dispatcher,
            settlements,
            inbox,
            pending: VecDeque::new(),
            history: Vec::new(),
            observer,
        }
    }

    /// Bind a handle to `key`.
    pub fn bind<T>(&self, key: &ActionKey<T>) -> ActionHandle<T> {
        self.dispatcher.bind(Some(key))
    }

    /// Bind a handle with no key.
    pub fn bind_none<T>(&self) -> ActionHandle<T> {
        self.dispatcher.bind(None)
    }

    fn collect(&mut self) {
        for pending in self.inbox.drain() {
            self.history.push(pending.submission().clone());
            self.pending.push_back(pending);
        }
    }

    /// Every submission the engine has received, oldest first.
    pub fn submissions(&mut self) -> &[Submission] {
        self.collect();
        &self.history
    }

    /// Submissions not yet answered.
    pub fn pending_count(&mut self) -> usize {
        self.collect();
        self.pending.len()
    }

    /// Answer the oldest pending submission with `outcome`.
    ///
    /// Returns the answered action, or `None` if nothing was pending.
    pub fn answer_next(&mut self, outcome: Result<(), EngineError>) -> Option<ActionId> {
        self.collect();
        let pending = self.pending.pop_front()?;
        let action = pending.action().clone();
        pending.respond(outcome);
        Some(action)
    }

    pub fn succeed_next(&mut self) -> Option<ActionId> {
        self.answer_next(Ok(()))
    }

    pub fn fail_next(&mut self, message: &str) -> Option<ActionId> {
        self.answer_next(Err(EngineError::rejected(message)))
    }

    /// Wait for the next settlement and apply it.
    pub async fn settle_next(&mut self) -> Option<ActionId> {
        let settlement = self.settlements.recv().await?;
        let action = settlement.action().clone();
        self.dispatcher.settle(settlement);
        Some(action)
    }

    /// Answer the oldest submission with success and apply the settlement.
    pub async fn resolve_next(&mut self) -> Option<ActionId> {
        self.succeed_next()?;
        self.settle_next().await
    }

    /// Answer the oldest submission with a rejection and apply the
    /// settlement.
    pub async fn reject_next(&mut self, message: &str) -> Option<ActionId> {
        self.fail_next(message)?;
        self.settle_next().await
    }

    /// Take the observer callbacks recorded so far.
    pub fn observed(&self) -> Vec<Observed> {
        self.observer.take()
    }
}

/// Assert that an action with the given id reached the engine.
///
/// # Example
///
/// ```ignore
/// assert_submitted!(harness.submissions(), "toolbar/save");
/// ```
#[macro_export]
macro_rules! assert_submitted {
    ($submissions:expr, $id:expr) => {{
        let submissions = &$submissions;
        assert!(
            submissions.iter().any(|s| s.action.as_str() == $id),
            "Expected `{}` to be submitted, but got: {:?}",
            $id,
            submissions
                .iter()
                .map(|s| s.action.as_str())
                .collect::<Vec<_>>()
        );
    }};
}

/// Assert that no action with the given id reached the engine.
#[macro_export]
macro_rules! assert_not_submitted {
    ($submissions:expr, $id:expr) => {{
        let submissions = &$submissions;
        assert!(
            !submissions.iter().any(|s| s.action.as_str() == $id),
            "Expected `{}` NOT to be submitted, but it was",
            $id
        );
    }};
}

/// Count submissions of the given action id.
#[macro_export]
macro_rules! count_submitted {
    ($submissions:expr, $id:expr) => {
        $submissions
            .iter()
            .filter(|s| s.action.as_str() == $id)
            .count()
    };
}

// ============================================================================
// Time Control (requires testing-time feature)
// ============================================================================

/// Pause tokio time for deterministic ripple and deadline tests.
///
/// # Panics
///
/// Panics if called outside a current-thread tokio runtime.
#[cfg(feature = "testing-time")]
pub fn pause_time() {
    tokio::time::pause();
}

/// Resume tokio time after pausing.
#[cfg(feature = "testing-time")]
pub fn resume_time() {
    tokio::time::resume();
}

/// Advance paused tokio time by `duration`.
#[cfg(feature = "testing-time")]
pub async fn advance_time(duration: std::time::Duration) {
    tokio::time::advance(duration).await;
}
