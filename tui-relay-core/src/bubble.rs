//! Bubble markers: letting ancestors see which descendant was activated
//!
//! A control that handles an activation marks the [`Event`] before it
//! dispatches its action. Containers that sit above it (a ripple, a card
//! that highlights itself) then receive the marker through
//! [`bubble_through`] or [`Event::ancestor_path`], after the target handler
//! has finished. Ancestors only ever get `&Event`, so they can react but
//! cannot re-mark or re-dispatch.

use ratatui::layout::Rect;

use crate::event::{ElementId, Event};

/// Identifies one user gesture (one raw terminal event).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GestureId(pub u64);

/// Metadata attached to an event by the innermost control that handled it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BubbleMarker {
    /// Gesture the marker belongs to.
    pub gesture: GestureId,
    /// The control that was activated.
    pub source: ElementId,
    /// Where that control was rendered.
    pub source_area: Rect,
    /// Column of the activation point.
    pub column: u16,
    /// Row of the activation point.
    pub row: u16,
}

impl BubbleMarker {
    /// Activation point relative to `area`'s top-left corner.
    ///
    /// Returns `None` when the point lies outside `area`.
    pub fn offset_in(&self, area: Rect) -> Option<(u16, u16)> {
        if !self.is_within(area) {
            return None;
        }
        Some((self.column - area.x, self.row - area.y))
    }

    /// Whether the activation point lies inside `area`.
    pub fn is_within(&self, area: Rect) -> bool {
        self.column >= area.x
            && self.column < area.x.saturating_add(area.width)
            && self.row >= area.y
            && self.row < area.y.saturating_add(area.height)
    }
}

/// Something above a control that wants to know when the control fired.
pub trait BubbleListener {
    /// Called once per marked event, with the listener's own area.
    fn on_bubble(&mut self, area: Rect, marker: &BubbleMarker);
}

/// Deliver an event's marker to a chain of ancestors, innermost first.
///
/// Does nothing when the event is unmarked. Returns how many listeners
/// observed the marker.
pub fn bubble_through(event: &Event, ancestors: &mut [(Rect, &mut dyn BubbleListener)]) -> usize {
    let Some(marker) = event.marker() else {
        return 0;
    };
    for (area, listener) in ancestors.iter_mut() {
        listener.on_bubble(*area, marker);
    }
    ancestors.len()
}
