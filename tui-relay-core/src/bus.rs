//! Terminal event polling and event construction

use crate::event::{ElementId, Event, EventContext, EventKind};
use crossterm::event::{self, KeyEventKind, MouseEventKind};
use ratatui::layout::Rect;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Raw event from crossterm before processing
#[derive(Debug)]
pub enum RawEvent {
    Key(crossterm::event::KeyEvent),
    Mouse(crossterm::event::MouseEvent),
    Resize(u16, u16),
}

/// Owns the [`EventContext`] and stamps each raw event into an [`Event`].
///
/// The render pass registers elements here; the next raw event is then
/// turned into an `Event` carrying a snapshot of that tree and a fresh
/// gesture id.
#[derive(Debug, Default)]
pub struct EventBus {
    context: EventContext,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get reference to context
    pub fn context(&self) -> &EventContext {
        &self.context
    }

    /// Get mutable reference to context
    pub fn context_mut(&mut self) -> &mut EventContext {
        &mut self.context
    }

    /// Forget the element tree; call before each render pass.
    pub fn begin_render(&mut self) {
        self.context.clear_elements();
    }

    /// Record an element rendered during the current pass.
    pub fn register(&mut self, element: ElementId, area: Rect, parent: Option<ElementId>) {
        self.context.register(element, area, parent);
    }

    /// Build an event for `kind` with the current context.
    pub fn create_event(&mut self, kind: EventKind) -> Event {
        match &kind {
            EventKind::Mouse(mouse) => {
                self.context.mouse_position = Some((mouse.column, mouse.row));
            }
            EventKind::Scroll { column, row, .. } => {
                self.context.mouse_position = Some((*column, *row));
            }
            _ => {}
        }
        Event::new(kind, self.context.clone())
    }

    /// Move focus to the next (or previous) element in `order`, wrapping.
    ///
    /// With nothing focused, focuses the first (or last) element.
    pub fn cycle_focus(&mut self, order: &[ElementId], forward: bool) -> Option<ElementId> {
        if order.is_empty() {
            return None;
        }
        let current = self
            .context
            .focused
            .and_then(|f| order.iter().position(|&id| id == f));
        let next = match (current, forward) {
            (None, true) => 0,
            (None, false) => order.len() - 1,
            (Some(i), true) => (i + 1) % order.len(),
            (Some(i), false) => (i + order.len() - 1) % order.len(),
        };
        let focused = order[next];
        self.context.set_focus(Some(focused));
        debug!(element = focused.0, "Focus moved");
        Some(focused)
    }
}

/// Raw events read per wake-up before yielding back to the runtime.
const POLL_BATCH: usize = 20;

/// Keep the terminal events the relay reacts to.
///
/// Key releases, focus changes and pastes are dropped.
pub fn raw_from_terminal(evt: event::Event) -> Option<RawEvent> {
    match evt {
        event::Event::Key(key) if key.kind == KeyEventKind::Release => None,
        event::Event::Key(key) => Some(RawEvent::Key(key)),
        event::Event::Mouse(mouse) => Some(RawEvent::Mouse(mouse)),
        event::Event::Resize(w, h) => Some(RawEvent::Resize(w, h)),
        _ => None,
    }
}

/// Forward up to one batch of pending terminal events.
///
/// Returns `false` once the receiving side is gone.
fn forward_batch(tx: &mpsc::UnboundedSender<RawEvent>, poll_timeout: Duration) -> bool {
    for _ in 0..POLL_BATCH {
        if !event::poll(poll_timeout).unwrap_or(false) {
            break;
        }
        let Some(raw) = event::read().ok().and_then(raw_from_terminal) else {
            continue;
        };
        if tx.send(raw).is_err() {
            return false;
        }
    }
    true
}

/// Spawn the task that reads the terminal and feeds the runtime.
///
/// Every `loop_sleep` it forwards a batch of events through `tx`, each
/// `poll` waiting at most `poll_timeout`. On cancellation the terminal
/// buffer is drained so no input leaks into the shell after exit.
pub fn spawn_event_poller(
    tx: mpsc::UnboundedSender<RawEvent>,
    poll_timeout: Duration,
    loop_sleep: Duration,
    cancel_token: CancellationToken,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = cancel_token.cancelled() => {
                    while event::poll(Duration::ZERO).unwrap_or(false) {
                        let _ = event::read();
                    }
                    info!("Event poller stopped");
                    return;
                }
                _ = tokio::time::sleep(loop_sleep) => {
                    if !forward_batch(&tx, poll_timeout) {
                        debug!("Runtime gone, event poller exiting");
                        return;
                    }
                }
            }
        }
    })
}

/// Turn a raw terminal event into the [`EventKind`] components see.
///
/// Wheel motion becomes [`EventKind::Scroll`] with a signed delta; every
/// other mouse event passes through for click hit-testing.
pub fn process_raw_event(raw: RawEvent) -> EventKind {
    match raw {
        RawEvent::Key(key) => EventKind::Key(key),
        RawEvent::Mouse(mouse) => {
            let delta = match mouse.kind {
                MouseEventKind::ScrollDown => 1,
                MouseEventKind::ScrollUp => -1,
                _ => return EventKind::Mouse(mouse),
            };
            EventKind::Scroll {
                column: mouse.column,
                row: mouse.row,
                delta,
            }
        }
        RawEvent::Resize(w, h) => EventKind::Resize(w, h),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{click, key};
    use crossterm::event::{KeyCode, KeyModifiers, MouseButton, MouseEvent};

    #[test]
    fn events_get_fresh_gestures_and_tree_snapshot() {
        let mut bus = EventBus::new();
        bus.begin_render();
        bus.register(ElementId(1), Rect::new(0, 0, 10, 1), None);

        let first = bus.create_event(click(2, 0));
        let second = bus.create_event(click(2, 0));
        assert_ne!(first.gesture(), second.gesture());
        assert_eq!(first.context.element_at(2, 0), Some(ElementId(1)));
        assert_eq!(bus.context().mouse_position, Some((2, 0)));

        bus.begin_render();
        let third = bus.create_event(click(2, 0));
        assert_eq!(third.context.element_at(2, 0), None);
        // the earlier snapshot is unaffected
        assert_eq!(first.context.element_at(2, 0), Some(ElementId(1)));
    }

    #[test]
    fn focus_cycles_and_wraps() {
        let mut bus = EventBus::new();
        let order = [ElementId(1), ElementId(2), ElementId(3)];

        assert_eq!(bus.cycle_focus(&order, true), Some(ElementId(1)));
        assert_eq!(bus.cycle_focus(&order, true), Some(ElementId(2)));
        assert_eq!(bus.cycle_focus(&order, false), Some(ElementId(1)));
        assert_eq!(bus.cycle_focus(&order, false), Some(ElementId(3)));
        assert!(bus.context().is_focused(ElementId(3)));
        assert_eq!(bus.cycle_focus(&[], true), None);
    }

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> RawEvent {
        RawEvent::Mouse(MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        })
    }

    #[test]
    fn terminal_click_reaches_ancestors_with_its_position() {
        let mut bus = EventBus::new();
        bus.begin_render();
        bus.register(ElementId(1), Rect::new(0, 0, 40, 10), None);
        bus.register(ElementId(2), Rect::new(4, 2, 8, 1), Some(ElementId(1)));

        let raw = raw_from_terminal(event::Event::Mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: 6,
            row: 2,
            modifiers: KeyModifiers::NONE,
        }))
        .unwrap();
        let mut event = bus.create_event(process_raw_event(raw));
        let target = event.context.element_at(6, 2).unwrap();
        assert_eq!(target, ElementId(2));

        assert!(event.mark(target, Rect::new(4, 2, 8, 1)));
        let marker = event.marker().unwrap();
        assert_eq!((marker.column, marker.row), (6, 2));
        assert_eq!(
            event.ancestor_path(),
            vec![(ElementId(1), Rect::new(0, 0, 40, 10))]
        );
    }

    #[test]
    fn key_releases_never_become_gestures() {
        let mut release = key("enter");
        release.kind = KeyEventKind::Release;
        assert!(raw_from_terminal(event::Event::Key(release)).is_none());
        assert!(raw_from_terminal(event::Event::FocusGained).is_none());

        let pressed = raw_from_terminal(event::Event::Key(key("enter"))).unwrap();
        let mut bus = EventBus::new();
        let event = bus.create_event(process_raw_event(pressed));
        assert!(matches!(event.kind, EventKind::Key(k) if k.code == KeyCode::Enter));
        assert!(!event.is_marked());
    }

    #[test]
    fn wheel_scrolls_and_tracks_the_pointer() {
        let mut bus = EventBus::new();
        let up = bus.create_event(process_raw_event(mouse(MouseEventKind::ScrollUp, 3, 7)));
        assert!(matches!(
            up.kind,
            EventKind::Scroll { column: 3, row: 7, delta: -1 }
        ));
        assert_eq!(bus.context().mouse_position, Some((3, 7)));

        // scrolling is not an activation
        assert_eq!(up.kind.click_position(), None);
        assert!(matches!(
            process_raw_event(RawEvent::Resize(80, 24)),
            EventKind::Resize(80, 24)
        ));
    }
}
