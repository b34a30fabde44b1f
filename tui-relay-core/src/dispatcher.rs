//! Action registry and dispatcher with a per-action concurrency guard
//!
//! The [`Dispatcher`] owns one [`ActionState`] per action identifier that is
//! either in flight or watched by at least one subscriber. Components ask it
//! for an [`ActionHandle`] bound to their key, read loading/disabled state
//! from the handle during render, subscribe on mount, and call
//! [`ActionHandle::dispatch`] on activation.
//!
//! # Lifecycle of a dispatch
//!
//! 1. `dispatch` finds the key idle, flips it to in flight and notifies every
//!    subscriber before returning.
//! 2. The engine future runs on a spawned task. Its outcome comes back as a
//!    [`Settlement`] on the [`Settlements`] channel.
//! 3. The UI loop hands the settlement to [`Dispatcher::settle`], which flips
//!    the key back to idle, records or clears the error, and notifies again.
//!
//! A second `dispatch` for a key that is in flight returns
//! [`DispatchOutcome::AlreadyInFlight`] and does nothing else.
//!
//! # Example
//!
//! ```ignore
//! let (engine, inbox) = ChannelEngine::new();
//! let (dispatcher, mut settlements) = Dispatcher::new(engine);
//!
//! let save: ActionKey<()> = ActionKey::named("save");
//! let handle = dispatcher.bind(Some(&save));
//! let _mounted = handle.subscribe(|state| tracing::debug!(?state, "save changed"));
//!
//! handle.dispatch(());
//! assert!(handle.is_loading());
//!
//! while let Some(settlement) = settlements.recv().await {
//!     dispatcher.settle(settlement);
//! }
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use serde::Serialize;
use serde_json::Value;
use tokio::runtime::Handle;
use tokio::sync::mpsc;

use crate::action::{ActionId, ActionKey};
use crate::engine::{Engine, Submission};
use crate::error::{EngineError, MisuseError};
use crate::observer::{DispatchObserver, IgnoreReason, LoggingObserver};

/// Whether an action is currently being processed by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DispatchStatus {
    /// Nothing in flight.
    #[default]
    Idle,
    /// Submitted and waiting for the engine.
    InFlight,
}

/// Observable state of one action.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ActionState {
    /// Current status.
    pub status: DispatchStatus,
    /// Error from the most recent failed dispatch, cleared by a success.
    pub last_error: Option<EngineError>,
}

impl ActionState {
    /// Whether the action is in flight.
    pub fn is_loading(&self) -> bool {
        self.status == DispatchStatus::InFlight
    }
}

/// What happened to a single `dispatch` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The action went to the engine.
    Submitted,
    /// The action was already in flight; nothing was sent.
    AlreadyInFlight,
    /// The control has no bound action; nothing was sent.
    Unbound,
    /// The dispatch API was misused; nothing was sent.
    Misuse(MisuseError),
}

impl DispatchOutcome {
    /// Whether the engine received the action.
    pub fn is_submitted(&self) -> bool {
        matches!(self, DispatchOutcome::Submitted)
    }
}

/// Outcome of one engine submission, to be applied on the UI loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settlement {
    action: ActionId,
    ticket: u64,
    outcome: Result<(), EngineError>,
}

impl Settlement {
    /// The action that settled.
    pub fn action(&self) -> &ActionId {
        &self.action
    }

    /// What the engine answered.
    pub fn outcome(&self) -> Result<(), &EngineError> {
        self.outcome.as_ref().map(|_| ())
    }
}

/// Receiving side for settlements produced by a [`Dispatcher`].
#[derive(Debug)]
pub struct Settlements {
    rx: mpsc::UnboundedReceiver<Settlement>,
}

impl Settlements {
    /// Wait for the next settlement.
    pub async fn recv(&mut self) -> Option<Settlement> {
        self.rx.recv().await
    }

    /// Take a settlement if one is already queued.
    pub fn try_recv(&mut self) -> Option<Settlement> {
        self.rx.try_recv().ok()
    }
}

/// Identifies one subscriber within the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(u64);

type Listener = Arc<dyn Fn(&ActionState) + Send + Sync>;

#[derive(Default)]
struct Entry {
    state: ActionState,
    ticket: Option<u64>,
    listeners: HashMap<SubscriberId, Listener>,
}

impl Entry {
    fn listeners(&self) -> Vec<Listener> {
        self.listeners.values().cloned().collect()
    }

    /// Unwatched, idle and with no error left to report.
    fn is_collectable(&self) -> bool {
        self.listeners.is_empty() && self.state == ActionState::default()
    }
}

#[derive(Default)]
struct Registry {
    entries: HashMap<ActionId, Entry>,
    next_subscriber: u64,
    next_ticket: u64,
}

struct Shared {
    registry: Mutex<Registry>,
    engine: Arc<dyn Engine>,
    observer: Box<dyn DispatchObserver>,
    settle_tx: mpsc::UnboundedSender<Settlement>,
}

impl Shared {
    fn registry(&self) -> MutexGuard<'_, Registry> {
        // Listeners never run under the lock, so a poisoned registry still
        // holds consistent data.
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn unsubscribe(&self, action: &ActionId, subscriber: SubscriberId) {
        let mut registry = self.registry();
        let collect = match registry.entries.get_mut(action) {
            Some(entry) => {
                entry.listeners.remove(&subscriber);
                entry.is_collectable()
            }
            None => false,
        };
        if collect {
            registry.entries.remove(action);
        }
    }
}

/// Registry of action states plus the route to the engine.
///
/// Cheap to clone; every clone refers to the same registry. Pass it down
/// the component tree instead of keeping it in a global.
#[derive(Clone)]
pub struct Dispatcher {
    shared: Arc<Shared>,
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("tracked", &self.tracked())
            .field("in_flight", &self.in_flight())
            .finish()
    }
}

impl Dispatcher {
    /// Create a dispatcher that logs through [`LoggingObserver`].
    pub fn new(engine: impl Engine) -> (Self, Settlements) {
        Self::with_observer(engine, LoggingObserver::new())
    }

    /// Create a dispatcher with a custom observer.
    pub fn with_observer(
        engine: impl Engine,
        observer: impl DispatchObserver + 'static,
    ) -> (Self, Settlements) {
        Self::from_parts(Arc::new(engine), Box::new(observer))
    }

    /// Create a dispatcher from an already shared engine.
    pub fn from_parts(
        engine: Arc<dyn Engine>,
        observer: Box<dyn DispatchObserver>,
    ) -> (Self, Settlements) {
        let (settle_tx, rx) = mpsc::unbounded_channel();
        let shared = Shared {
            registry: Mutex::new(Registry::default()),
            engine,
            observer,
            settle_tx,
        };
        (
            Self {
                shared: Arc::new(shared),
            },
            Settlements { rx },
        )
    }

    /// Bind a handle to `key`; `None` yields a structurally disabled handle.
    pub fn bind<T>(&self, key: Option<&ActionKey<T>>) -> ActionHandle<T> {
        ActionHandle {
            dispatcher: self.clone(),
            key: key.cloned(),
        }
    }

    /// Current state of an action. Untracked actions are idle.
    pub fn state(&self, action: &ActionId) -> ActionState {
        self.shared
            .registry()
            .entries
            .get(action)
            .map(|entry| entry.state.clone())
            .unwrap_or_default()
    }

    /// Register a listener for an action's state changes.
    ///
    /// The listener stays registered until the returned [`Subscription`] is
    /// dropped.
    pub fn subscribe(
        &self,
        action: &ActionId,
        listener: impl Fn(&ActionState) + Send + Sync + 'static,
    ) -> Subscription {
        let mut registry = self.shared.registry();
        let registry = &mut *registry;
        registry.next_subscriber += 1;
        let id = SubscriberId(registry.next_subscriber);
        registry
            .entries
            .entry(action.clone())
            .or_default()
            .listeners
            .insert(id, Arc::new(listener));

        Subscription {
            shared: Arc::downgrade(&self.shared),
            action: action.clone(),
            id,
        }
    }

    /// Number of subscribers currently watching an action.
    pub fn subscriber_count(&self, action: &ActionId) -> usize {
        self.shared
            .registry()
            .entries
            .get(action)
            .map(|entry| entry.listeners.len())
            .unwrap_or(0)
    }

    /// Identifiers of every action currently in flight, sorted.
    pub fn in_flight(&self) -> Vec<ActionId> {
        let mut ids: Vec<_> = self
            .shared
            .registry()
            .entries
            .iter()
            .filter(|(_, entry)| entry.state.is_loading())
            .map(|(id, _)| id.clone())
            .collect();
        ids.sort();
        ids
    }

    /// Number of action states currently retained.
    pub fn tracked(&self) -> usize {
        self.shared.registry().entries.len()
    }

    fn dispatch_value(
        &self,
        action: &ActionId,
        debug_symbol: Option<&str>,
        payload: Value,
    ) -> DispatchOutcome {
        let Ok(runtime) = Handle::try_current() else {
            return self.misuse(MisuseError::NoRuntime(action.clone()));
        };

        let claimed = {
            let mut guard = self.shared.registry();
            let registry = &mut *guard;
            let entry = registry.entries.entry(action.clone()).or_default();
            if entry.state.is_loading() {
                None
            } else {
                registry.next_ticket += 1;
                let ticket = registry.next_ticket;
                entry.state.status = DispatchStatus::InFlight;
                entry.ticket = Some(ticket);
                Some((ticket, entry.listeners(), entry.state.clone()))
            }
        };
        let Some((ticket, listeners, state)) = claimed else {
            self.shared
                .observer
                .ignored(Some(action), IgnoreReason::AlreadyInFlight);
            return DispatchOutcome::AlreadyInFlight;
        };

        notify(&listeners, &state);

        let future = self.shared.engine.submit(Submission {
            action: action.clone(),
            debug_symbol: debug_symbol.map(str::to_owned),
            payload,
        });
        self.shared.observer.submitted(action);

        let settle_tx = self.shared.settle_tx.clone();
        let action = action.clone();
        runtime.spawn(async move {
            let outcome = future.await;
            // The receiver is gone only when the UI loop has shut down.
            let _ = settle_tx.send(Settlement {
                action,
                ticket,
                outcome,
            });
        });

        DispatchOutcome::Submitted
    }

    /// Apply a settlement produced by an earlier dispatch.
    ///
    /// Returns `true` when the action's state changed and the UI should
    /// re-render.
    pub fn settle(&self, settlement: Settlement) -> bool {
        let Settlement {
            action,
            ticket,
            outcome,
        } = settlement;

        let (listeners, state) = {
            let mut registry = self.shared.registry();
            let Some(entry) = registry.entries.get_mut(&action) else {
                tracing::warn!(action = %action, "Settlement for untracked action dropped");
                return false;
            };
            if entry.ticket != Some(ticket) {
                tracing::warn!(action = %action, ticket, "Stale settlement dropped");
                return false;
            }

            entry.ticket = None;
            entry.state.status = DispatchStatus::Idle;
            entry.state.last_error = outcome.as_ref().err().cloned();

            let listeners = entry.listeners();
            let state = entry.state.clone();
            if entry.is_collectable() {
                registry.entries.remove(&action);
            }
            (listeners, state)
        };

        notify(&listeners, &state);

        if let Err(error) = &outcome {
            self.shared.engine.report_error(&action, error);
        }
        self.shared.observer.settled(&action, outcome.as_ref().map(|_| ()));
        true
    }

    fn misuse(&self, error: MisuseError) -> DispatchOutcome {
        self.shared.observer.misuse(&error);
        DispatchOutcome::Misuse(error)
    }
}

fn notify(listeners: &[Listener], state: &ActionState) {
    for listener in listeners {
        listener(state);
    }
}

/// Keeps a listener registered; dropping it unsubscribes.
///
/// Dropping the last subscription of an idle action releases its state. If
/// the action is in flight, the state is kept until it settles. A recorded
/// error is kept until a later dispatch of the action succeeds.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    shared: Weak<Shared>,
    action: ActionId,
    id: SubscriberId,
}

impl Subscription {
    /// The action this subscription watches.
    pub fn action(&self) -> &ActionId {
        &self.action
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("action", &self.action)
            .field("id", &self.id)
            .finish()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(shared) = self.shared.upgrade() {
            shared.unsubscribe(&self.action, self.id);
        }
    }
}

/// A control's view of one action: state queries plus `dispatch`.
pub struct ActionHandle<T> {
    dispatcher: Dispatcher,
    key: Option<ActionKey<T>>,
}

impl<T> Clone for ActionHandle<T> {
    fn clone(&self) -> Self {
        Self {
            dispatcher: self.dispatcher.clone(),
            key: self.key.clone(),
        }
    }
}

impl<T> fmt::Debug for ActionHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionHandle")
            .field("key", &self.key)
            .field("state", &self.state())
            .finish()
    }
}

impl<T> ActionHandle<T> {
    /// The bound key, if any.
    pub fn key(&self) -> Option<&ActionKey<T>> {
        self.key.as_ref()
    }

    /// Whether a key is bound.
    pub fn is_bound(&self) -> bool {
        self.key.is_some()
    }

    /// Current state of the bound action; idle when unbound.
    pub fn state(&self) -> ActionState {
        match &self.key {
            Some(key) => self.dispatcher.state(key.id()),
            None => ActionState::default(),
        }
    }

    /// Whether the bound action is in flight.
    pub fn is_loading(&self) -> bool {
        self.state().is_loading()
    }

    /// Whether the control should refuse interaction: no bound action, or
    /// the action is in flight.
    pub fn is_disabled(&self) -> bool {
        !self.is_bound() || self.is_loading()
    }

    /// Error from the bound action's most recent failed dispatch.
    pub fn last_error(&self) -> Option<EngineError> {
        self.state().last_error
    }

    /// Subscribe to state changes of the bound action.
    ///
    /// Returns `None` for an unbound handle, which never changes state.
    pub fn subscribe(
        &self,
        listener: impl Fn(&ActionState) + Send + Sync + 'static,
    ) -> Option<Subscription> {
        self.key
            .as_ref()
            .map(|key| self.dispatcher.subscribe(key.id(), listener))
    }
}

impl<T: Serialize> ActionHandle<T> {
    /// Dispatch the bound action with `payload`.
    ///
    /// Never fails loudly: duplicates, unbound handles and misuse are
    /// reported through the returned outcome and the observer.
    pub fn dispatch(&self, payload: T) -> DispatchOutcome {
        let Some(key) = &self.key else {
            self.dispatcher
                .shared
                .observer
                .ignored(None, IgnoreReason::Unbound);
            self.dispatcher.misuse(MisuseError::UnboundDispatch);
            return DispatchOutcome::Unbound;
        };

        match serde_json::to_value(payload) {
            Ok(value) => self
                .dispatcher
                .dispatch_value(key.id(), key.debug_symbol(), value),
            Err(err) => self.dispatcher.misuse(MisuseError::Payload {
                action: key.id().clone(),
                reason: err.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{ChannelEngine, EngineInbox, SubmitFuture};
    use crate::observer::NoopObserver;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn setup() -> (Dispatcher, Settlements, EngineInbox) {
        let (engine, inbox) = ChannelEngine::new();
        let (dispatcher, settlements) = Dispatcher::with_observer(engine, NoopObserver);
        (dispatcher, settlements, inbox)
    }

    fn recorder() -> (
        Arc<Mutex<Vec<bool>>>,
        impl Fn(&ActionState) + Send + Sync + 'static,
    ) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        (seen, move |state: &ActionState| {
            sink.lock().unwrap().push(state.is_loading())
        })
    }

    #[tokio::test]
    async fn dispatch_goes_in_flight_then_settles() {
        let (dispatcher, mut settlements, mut inbox) = setup();
        let key: ActionKey<()> = ActionKey::named("k1");
        let handle = dispatcher.bind(Some(&key));

        assert!(!handle.is_loading());
        assert!(!handle.is_disabled());

        assert_eq!(handle.dispatch(()), DispatchOutcome::Submitted);
        assert!(handle.is_loading());
        assert!(handle.is_disabled());

        let pending = inbox.try_recv().expect("submitted");
        assert_eq!(pending.action().as_str(), "k1");
        assert_eq!(pending.payload(), &Value::Null);
        pending.succeed();

        let settlement = settlements.recv().await.expect("settlement");
        assert!(dispatcher.settle(settlement));
        assert!(!handle.is_loading());
        assert_eq!(handle.last_error(), None);
    }

    #[tokio::test]
    async fn second_dispatch_while_in_flight_is_dropped() {
        let (dispatcher, mut settlements, mut inbox) = setup();
        let key: ActionKey<()> = ActionKey::named("k1");
        let first = dispatcher.bind(Some(&key));
        let second = dispatcher.bind(Some(&ActionKey::<()>::named("k1")));

        assert!(first.dispatch(()).is_submitted());
        assert_eq!(first.dispatch(()), DispatchOutcome::AlreadyInFlight);
        assert_eq!(second.dispatch(()), DispatchOutcome::AlreadyInFlight);

        let pending = inbox.drain();
        assert_eq!(pending.len(), 1);

        for p in pending {
            p.succeed();
        }
        let settlement = settlements.recv().await.unwrap();
        dispatcher.settle(settlement);

        assert!(second.dispatch(()).is_submitted());
        assert_eq!(inbox.drain().len(), 1);
    }

    #[tokio::test]
    async fn every_subscriber_sees_both_transitions() {
        let (dispatcher, mut settlements, mut inbox) = setup();
        let key: ActionKey<()> = ActionKey::named("shared");
        let handle = dispatcher.bind(Some(&key));

        let mut subs = Vec::new();
        let mut logs = Vec::new();
        for _ in 0..4 {
            let (seen, listener) = recorder();
            subs.push(handle.subscribe(listener).unwrap());
            logs.push(seen);
        }

        handle.dispatch(());
        for log in &logs {
            assert_eq!(*log.lock().unwrap(), vec![true]);
        }

        inbox.try_recv().unwrap().fail(EngineError::rejected("boom"));
        dispatcher.settle(settlements.recv().await.unwrap());
        for log in &logs {
            assert_eq!(*log.lock().unwrap(), vec![true, false]);
        }
        assert_eq!(dispatcher.subscriber_count(key.id()), 4);
    }

    #[tokio::test]
    async fn failure_is_recorded_and_retry_allowed() {
        let (dispatcher, mut settlements, mut inbox) = setup();
        let key: ActionKey<()> = ActionKey::named("k2");
        let handle = dispatcher.bind(Some(&key));
        let _mounted = handle.subscribe(|_| {});

        handle.dispatch(());
        inbox
            .try_recv()
            .unwrap()
            .fail(EngineError::rejected("offline"));
        dispatcher.settle(settlements.recv().await.unwrap());

        assert!(!handle.is_loading());
        assert!(!handle.is_disabled());
        assert_eq!(handle.last_error(), Some(EngineError::rejected("offline")));

        assert!(handle.dispatch(()).is_submitted());
        inbox.try_recv().unwrap().succeed();
        dispatcher.settle(settlements.recv().await.unwrap());
        assert_eq!(handle.last_error(), None);
    }

    #[tokio::test]
    async fn unbound_handle_is_disabled_noop() {
        let (dispatcher, _settlements, mut inbox) = setup();
        let handle: ActionHandle<String> = dispatcher.bind(None);

        assert!(handle.is_disabled());
        assert!(!handle.is_loading());
        assert!(handle.subscribe(|_| {}).is_none());
        for payload in ["", "x", "hello"] {
            assert_eq!(
                handle.dispatch(payload.to_string()),
                DispatchOutcome::Unbound
            );
        }
        assert!(inbox.try_recv().is_none());
        assert_eq!(dispatcher.tracked(), 0);
    }

    #[tokio::test]
    async fn late_subscriber_sees_loading() {
        let (dispatcher, _settlements, _inbox) = setup();
        let key: ActionKey<()> = ActionKey::named("k1");
        dispatcher.bind(Some(&key)).dispatch(());

        let late = dispatcher.bind(Some(&key));
        let _mounted = late.subscribe(|_| {});
        assert!(late.is_loading());
        assert!(late.is_disabled());
    }

    #[tokio::test]
    async fn state_outlives_last_subscriber_while_in_flight() {
        let (dispatcher, mut settlements, mut inbox) = setup();
        let key: ActionKey<()> = ActionKey::named("k1");
        let handle = dispatcher.bind(Some(&key));

        let mounted = handle.subscribe(|_| {}).unwrap();
        handle.dispatch(());
        drop(mounted);
        assert_eq!(dispatcher.tracked(), 1);

        let (seen, listener) = recorder();
        let remounted = handle.subscribe(listener).unwrap();
        assert!(handle.is_loading());

        inbox.try_recv().unwrap().succeed();
        dispatcher.settle(settlements.recv().await.unwrap());
        assert_eq!(*seen.lock().unwrap(), vec![false]);

        drop(remounted);
        assert_eq!(dispatcher.tracked(), 0);
    }

    #[tokio::test]
    async fn unwatched_state_is_collected_after_settling() {
        let (dispatcher, mut settlements, mut inbox) = setup();
        let key: ActionKey<u32> = ActionKey::named("count");
        dispatcher.bind(Some(&key)).dispatch(7);
        assert_eq!(dispatcher.in_flight(), vec![ActionId::new("count")]);
        assert_eq!(inbox.try_recv().unwrap().payload(), &serde_json::json!(7));

        // the pending submission was dropped unanswered
        let settlement = settlements.recv().await.unwrap();
        assert_eq!(settlement.outcome(), Err(&EngineError::Disconnected));
        dispatcher.settle(settlement);
        assert!(dispatcher.in_flight().is_empty());
        assert_eq!(dispatcher.tracked(), 1);

        dispatcher.bind(Some(&key)).dispatch(8);
        inbox.try_recv().unwrap().succeed();
        dispatcher.settle(settlements.recv().await.unwrap());
        assert_eq!(dispatcher.tracked(), 0);
    }

    #[tokio::test]
    async fn unwatched_failure_stays_recorded() {
        let (dispatcher, mut settlements, mut inbox) = setup();
        let key: ActionKey<()> = ActionKey::named("k2");
        let handle = dispatcher.bind(Some(&key));

        handle.dispatch(());
        inbox
            .try_recv()
            .unwrap()
            .fail(EngineError::rejected("offline"));
        dispatcher.settle(settlements.recv().await.unwrap());

        assert_eq!(dispatcher.subscriber_count(key.id()), 0);
        assert!(!handle.is_disabled());
        assert_eq!(handle.last_error(), Some(EngineError::rejected("offline")));

        // unsubscribing does not release an unreported error either
        drop(handle.subscribe(|_| {}));
        assert_eq!(handle.last_error(), Some(EngineError::rejected("offline")));
    }

    #[tokio::test]
    async fn stale_settlement_is_ignored() {
        let (dispatcher, _settlements, _inbox) = setup();
        let key: ActionKey<()> = ActionKey::named("k1");
        let handle = dispatcher.bind(Some(&key));
        handle.dispatch(());

        let stale = Settlement {
            action: key.id().clone(),
            ticket: 999,
            outcome: Ok(()),
        };
        assert!(!dispatcher.settle(stale));
        assert!(handle.is_loading());
    }

    #[test]
    fn dispatch_without_runtime_is_misuse() {
        let (dispatcher, _settlements, _inbox) = setup();
        let key: ActionKey<()> = ActionKey::named("k1");
        let handle = dispatcher.bind(Some(&key));

        assert_eq!(
            handle.dispatch(()),
            DispatchOutcome::Misuse(MisuseError::NoRuntime(ActionId::new("k1")))
        );
        assert!(!handle.is_loading());
    }

    struct Reporting {
        inner: ChannelEngine,
        reported: Arc<AtomicUsize>,
    }

    impl Engine for Reporting {
        fn submit(&self, submission: Submission) -> SubmitFuture {
            self.inner.submit(submission)
        }

        fn report_error(&self, _action: &ActionId, _error: &EngineError) {
            self.reported.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn failures_reach_engine_error_channel() {
        let (inner, mut inbox) = ChannelEngine::new();
        let reported = Arc::new(AtomicUsize::new(0));
        let engine = Reporting {
            inner,
            reported: reported.clone(),
        };
        let (dispatcher, mut settlements) = Dispatcher::with_observer(engine, NoopObserver);
        let handle = dispatcher.bind(Some(&ActionKey::<()>::named("k")));

        handle.dispatch(());
        inbox.try_recv().unwrap().fail(EngineError::rejected("no"));
        dispatcher.settle(settlements.recv().await.unwrap());
        assert_eq!(reported.load(Ordering::SeqCst), 1);

        handle.dispatch(());
        inbox.try_recv().unwrap().succeed();
        dispatcher.settle(settlements.recv().await.unwrap());
        assert_eq!(reported.load(Ordering::SeqCst), 1);
    }
}
