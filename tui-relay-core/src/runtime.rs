//! Runtime loop: terminal events, settlements and ticks on one task.
//!
//! The loop owns the [`Settlements`] receiver, so every dispatcher
//! notification caused by an engine answer fires on the same task that
//! renders.

use std::io;
use std::time::Duration;

use ratatui::backend::Backend;
use ratatui::{Frame, Terminal};
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::bus::{process_raw_event, spawn_event_poller, EventBus, RawEvent};
use crate::config::RelayConfig;
use crate::dispatcher::{Dispatcher, Settlement, Settlements};
use crate::event::{Event, EventKind};

/// Configuration for the event poller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollerConfig {
    /// Timeout passed to each `crossterm::event::poll` call.
    pub poll_timeout: Duration,
    /// Sleep between poll cycles.
    pub loop_sleep: Duration,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            poll_timeout: Duration::from_millis(10),
            loop_sleep: Duration::from_millis(16),
        }
    }
}

/// What handling one event amounted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EventOutcome {
    /// Whether some component consumed the event.
    pub handled: bool,
    /// Whether to re-render.
    pub needs_render: bool,
}

impl EventOutcome {
    /// Not consumed, no render.
    pub fn ignored() -> Self {
        Self::default()
    }

    /// Not consumed, but request a render.
    pub fn needs_render() -> Self {
        Self {
            handled: false,
            needs_render: true,
        }
    }

    /// Consumed; consuming always re-renders.
    pub fn handled() -> Self {
        Self {
            handled: true,
            needs_render: true,
        }
    }

    /// Mark that a render is needed.
    pub fn with_render(mut self) -> Self {
        self.needs_render = true;
        self
    }

    /// Combine the outcomes of two handlers for the same event.
    pub fn merge(self, other: EventOutcome) -> Self {
        Self {
            handled: self.handled || other.handled,
            needs_render: self.needs_render || other.needs_render,
        }
    }
}

impl From<bool> for EventOutcome {
    fn from(handled: bool) -> Self {
        if handled {
            Self::handled()
        } else {
            Self::ignored()
        }
    }
}

/// Application driven by [`RelayRuntime`].
pub trait RelayApp {
    /// Draw the UI and register rendered elements on `bus`.
    fn render(&mut self, frame: &mut Frame, bus: &mut EventBus);

    /// Route one event through the component tree.
    fn handle_event(&mut self, event: &mut Event, bus: &mut EventBus) -> EventOutcome;

    /// Called after the dispatcher applied a settlement.
    #[allow(unused_variables)]
    fn settled(&mut self, settlement: &Settlement) {}

    /// Whether `event` should stop the loop. Defaults to ctrl+c / ctrl+q.
    fn should_quit(&self, event: &Event) -> bool {
        event.kind.is_quit()
    }
}

/// Event/settlement/tick loop bound to one [`Dispatcher`].
pub struct RelayRuntime {
    dispatcher: Dispatcher,
    settlements: Settlements,
    bus: EventBus,
    poller_config: PollerConfig,
    tick_interval: Duration,
    should_render: bool,
}

impl RelayRuntime {
    /// Create a runtime from a dispatcher and its settlement receiver.
    pub fn new(dispatcher: Dispatcher, settlements: Settlements) -> Self {
        Self {
            dispatcher,
            settlements,
            bus: EventBus::new(),
            poller_config: PollerConfig::default(),
            tick_interval: Duration::from_millis(80),
            should_render: true,
        }
    }

    /// Apply poller and tick settings from a loaded config.
    pub fn with_config(self, config: &RelayConfig) -> Self {
        self.with_event_poller(config.poller())
            .with_tick_interval(config.tick_interval())
    }

    /// Configure event polling behavior.
    pub fn with_event_poller(mut self, config: PollerConfig) -> Self {
        self.poller_config = config;
        self
    }

    /// Configure the tick interval. Zero is clamped to one millisecond.
    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval.max(Duration::from_millis(1));
        self
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut EventBus {
        &mut self.bus
    }

    /// Run against the real terminal until the app asks to quit.
    pub async fn run<B, A>(&mut self, terminal: &mut Terminal<B>, app: &mut A) -> io::Result<()>
    where
        B: Backend,
        A: RelayApp,
    {
        let (event_tx, event_rx) = mpsc::unbounded_channel::<RawEvent>();
        let cancel_token = CancellationToken::new();
        let _handle = spawn_event_poller(
            event_tx,
            self.poller_config.poll_timeout,
            self.poller_config.loop_sleep,
            cancel_token.clone(),
        );

        let result = self.run_with_events(terminal, app, event_rx).await;
        cancel_token.cancel();
        result
    }

    /// Run with raw events from `events` instead of the terminal.
    ///
    /// Stops when the app asks to quit or the event source closes.
    pub async fn run_with_events<B, A>(
        &mut self,
        terminal: &mut Terminal<B>,
        app: &mut A,
        mut events: mpsc::UnboundedReceiver<RawEvent>,
    ) -> io::Result<()>
    where
        B: Backend,
        A: RelayApp,
    {
        let mut ticks = tokio::time::interval(self.tick_interval);
        ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tracing::info!(tick = ?self.tick_interval, "Relay runtime started");

        loop {
            if self.should_render {
                self.render(terminal, app)?;
            }

            tokio::select! {
                raw = events.recv() => {
                    let Some(raw) = raw else {
                        tracing::debug!("Event source closed");
                        break;
                    };
                    if self.process_event(app, process_raw_event(raw)) {
                        break;
                    }
                }

                Some(settlement) = self.settlements.recv() => {
                    self.process_settlement(app, settlement);
                }

                _ = ticks.tick() => {
                    self.process_event(app, EventKind::Tick);
                }
            }
        }

        tracing::info!("Relay runtime stopped");
        Ok(())
    }

    /// Draw one frame.
    pub fn render<B, A>(&mut self, terminal: &mut Terminal<B>, app: &mut A) -> io::Result<()>
    where
        B: Backend,
        A: RelayApp,
    {
        let bus = &mut self.bus;
        bus.begin_render();
        terminal.draw(|frame| app.render(frame, bus))?;
        self.should_render = false;
        Ok(())
    }

    /// Route one event to the app. Returns `true` when the app asked to quit.
    pub fn process_event<A: RelayApp>(&mut self, app: &mut A, kind: EventKind) -> bool {
        let is_tick = matches!(kind, EventKind::Tick);
        let mut event = self.bus.create_event(kind);
        if app.should_quit(&event) {
            tracing::info!("Quit requested");
            return true;
        }

        let outcome = app.handle_event(&mut event, &mut self.bus);
        if let Some(marker) = event.marker() {
            tracing::debug!(
                gesture = marker.gesture.0,
                source = marker.source.0,
                "Gesture handled"
            );
        }

        // spinners advance while anything is in flight
        let animating = is_tick && !self.dispatcher.in_flight().is_empty();
        if outcome.needs_render || animating || matches!(event.kind, EventKind::Resize(..)) {
            self.should_render = true;
        }
        false
    }

    /// Apply a settlement and let the app react to it.
    pub fn process_settlement<A: RelayApp>(&mut self, app: &mut A, settlement: Settlement) {
        let observed = settlement.clone();
        if self.dispatcher.settle(settlement) {
            app.settled(&observed);
            self.should_render = true;
        }
    }

    /// Apply every settlement that is already queued.
    pub fn drain_settlements<A: RelayApp>(&mut self, app: &mut A) -> usize {
        let mut applied = 0;
        while let Some(settlement) = self.settlements.try_recv() {
            self.process_settlement(app, settlement);
            applied += 1;
        }
        applied
    }

    /// Whether the next loop iteration will draw.
    pub fn needs_render(&self) -> bool {
        self.should_render
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::ActionKey;
    use crate::dispatcher::ActionHandle;
    use crate::engine::ChannelEngine;
    use crate::event::ElementId;
    use crate::observer::NoopObserver;
    use crate::testing::{buffer_to_string_plain, click, key};
    use ratatui::backend::TestBackend;
    use ratatui::layout::Rect;
    use ratatui::widgets::Paragraph;

    struct OneButton {
        handle: ActionHandle<()>,
        area: Rect,
        settled: usize,
    }

    impl RelayApp for OneButton {
        fn render(&mut self, frame: &mut Frame, bus: &mut EventBus) {
            self.area = Rect::new(0, 0, 10, 1);
            bus.register(ElementId(1), self.area, None);
            let text = if self.handle.is_loading() { "busy" } else { "go" };
            frame.render_widget(Paragraph::new(text), self.area);
        }

        fn handle_event(&mut self, event: &mut Event, _bus: &mut EventBus) -> EventOutcome {
            if event.kind.is_click_in(self.area) {
                event.mark(ElementId(1), self.area);
                self.handle.dispatch(());
                return EventOutcome::handled();
            }
            EventOutcome::ignored()
        }

        fn settled(&mut self, _settlement: &Settlement) {
            self.settled += 1;
        }
    }

    #[tokio::test]
    async fn click_dispatch_settle_render() {
        let (engine, mut inbox) = ChannelEngine::new();
        let (dispatcher, settlements) = Dispatcher::with_observer(engine, NoopObserver);
        let key_go: ActionKey<()> = ActionKey::named("go");
        let mut app = OneButton {
            handle: dispatcher.bind(Some(&key_go)),
            area: Rect::default(),
            settled: 0,
        };
        let mut runtime = RelayRuntime::new(dispatcher, settlements);
        let mut terminal = Terminal::new(TestBackend::new(10, 1)).unwrap();

        runtime.render(&mut terminal, &mut app).unwrap();
        assert!(!runtime.needs_render());
        assert_eq!(buffer_to_string_plain(terminal.backend().buffer()), "go");

        assert!(!runtime.process_event(&mut app, click(1, 0)));
        assert!(runtime.needs_render());
        runtime.render(&mut terminal, &mut app).unwrap();
        assert_eq!(buffer_to_string_plain(terminal.backend().buffer()), "busy");

        inbox.recv().await.unwrap().succeed();
        tokio::task::yield_now().await;
        // the settlement task may need another turn
        while runtime.drain_settlements(&mut app) == 0 {
            tokio::task::yield_now().await;
        }
        assert_eq!(app.settled, 1);
        runtime.render(&mut terminal, &mut app).unwrap();
        assert_eq!(buffer_to_string_plain(terminal.backend().buffer()), "go");
    }

    #[tokio::test]
    async fn loop_stops_on_quit_chord() {
        let (engine, _inbox) = ChannelEngine::new();
        let (dispatcher, settlements) = Dispatcher::with_observer(engine, NoopObserver);
        let mut app = OneButton {
            handle: dispatcher.bind(None),
            area: Rect::default(),
            settled: 0,
        };
        let mut runtime =
            RelayRuntime::new(dispatcher, settlements).with_tick_interval(Duration::from_secs(60));
        let mut terminal = Terminal::new(TestBackend::new(10, 1)).unwrap();

        let (tx, rx) = mpsc::unbounded_channel();
        tx.send(RawEvent::Key(key("ctrl+q"))).unwrap();
        runtime
            .run_with_events(&mut terminal, &mut app, rx)
            .await
            .unwrap();
    }

    #[test]
    fn outcome_merge() {
        let merged = EventOutcome::ignored().merge(EventOutcome::needs_render());
        assert!(!merged.handled);
        assert!(merged.needs_render);
        assert_eq!(EventOutcome::from(true), EventOutcome::handled());
    }
}
