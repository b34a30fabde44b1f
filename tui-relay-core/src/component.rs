//! Component trait for UI elements driven by typed events

use ratatui::{layout::Rect, Frame};

use crate::event::Event;
use crate::runtime::EventOutcome;

/// A UI element that renders from props and reacts to events
///
/// Components follow these rules:
/// 1. Props contain the read-only data needed for rendering, including any
///    bound [`ActionHandle`](crate::dispatcher::ActionHandle)
/// 2. `handle_event` never mutates application data directly; user intent
///    leaves through `ActionHandle::dispatch`
/// 3. `render` is a function of props plus internal UI state (cursor,
///    last rendered area, animation frame)
///
/// # Events and bubbling
///
/// The target receives `&mut Event` so it can [`mark`](Event::mark) the
/// gesture before dispatching. Containers above it receive the same event
/// as `&Event` afterwards, through
/// [`BubbleListener`](crate::bubble::BubbleListener).
///
/// # Example
///
/// ```ignore
/// struct Save { id: ElementId, area: Rect }
///
/// struct SaveProps<'a> {
///     action: &'a ActionHandle<()>,
///     is_focused: bool,
/// }
///
/// impl Component for Save {
///     type Props<'a> = SaveProps<'a>;
///
///     fn handle_event(&mut self, event: &mut Event, props: SaveProps<'_>) -> EventOutcome {
///         if props.action.is_disabled() || !event.kind.is_click_in(self.area) {
///             return EventOutcome::ignored();
///         }
///         event.mark(self.id, self.area);
///         props.action.dispatch(());
///         EventOutcome::handled()
///     }
///
///     fn render(&mut self, frame: &mut Frame, area: Rect, props: SaveProps<'_>) {
///         self.area = area;
///         let label = if props.action.is_loading() { "Saving" } else { "Save" };
///         frame.render_widget(Paragraph::new(label), area);
///     }
/// }
/// ```
pub trait Component {
    /// Data required to render the component (read-only)
    type Props<'a>;

    /// Handle an event addressed to this component.
    ///
    /// Default implementation ignores every event (render-only components).
    #[allow(unused_variables)]
    fn handle_event(&mut self, event: &mut Event, props: Self::Props<'_>) -> EventOutcome {
        EventOutcome::ignored()
    }

    /// Render the component to the frame
    fn render(&mut self, frame: &mut Frame, area: Rect, props: Self::Props<'_>);
}
