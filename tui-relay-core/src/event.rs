//! Event types, element tree and per-gesture bubble marking

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::bubble::{BubbleMarker, GestureId};

static NEXT_GESTURE: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for a rendered element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub u32);

/// The actual event payload
#[derive(Debug, Clone)]
pub enum EventKind {
    /// Keyboard event
    Key(KeyEvent),
    /// Mouse click/drag events
    Mouse(MouseEvent),
    /// Scroll event with position and delta
    Scroll { column: u16, row: u16, delta: isize },
    /// Terminal resize
    Resize(u16, u16),
    /// Periodic tick for spinners and ripples
    Tick,
}

impl EventKind {
    /// Position of a left-button press, if this is one.
    pub fn click_position(&self) -> Option<(u16, u16)> {
        match self {
            EventKind::Mouse(MouseEvent {
                kind: MouseEventKind::Down(MouseButton::Left),
                column,
                row,
                ..
            }) => Some((*column, *row)),
            _ => None,
        }
    }

    /// Whether this is a left-button press inside `area`.
    pub fn is_click_in(&self, area: Rect) -> bool {
        self.click_position()
            .map(|(x, y)| contains(area, x, y))
            .unwrap_or(false)
    }

    /// Whether this is a quit chord (ctrl+c / ctrl+q).
    pub fn is_quit(&self) -> bool {
        match self {
            EventKind::Key(key) => {
                key.modifiers.contains(KeyModifiers::CONTROL)
                    && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('q'))
            }
            _ => false,
        }
    }
}

fn contains(area: Rect, x: u16, y: u16) -> bool {
    x >= area.x
        && x < area.x.saturating_add(area.width)
        && y >= area.y
        && y < area.y.saturating_add(area.height)
}

/// Context passed with every event
///
/// Components register their element, area and parent while rendering; the
/// context then answers hit tests and ancestor queries for the next event.
#[derive(Debug, Clone, Default)]
pub struct EventContext {
    /// Currently focused element
    pub focused: Option<ElementId>,
    /// Current mouse position (if known)
    pub mouse_position: Option<(u16, u16)>,
    /// Element areas for hit-testing
    pub element_areas: HashMap<ElementId, Rect>,
    /// Parent links of the element tree
    pub parents: HashMap<ElementId, ElementId>,
}

impl EventContext {
    /// Create a new event context
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget the element tree before a new render pass.
    pub fn clear_elements(&mut self) {
        self.element_areas.clear();
        self.parents.clear();
    }

    /// Record where an element was rendered and which element contains it.
    pub fn register(&mut self, element: ElementId, area: Rect, parent: Option<ElementId>) {
        self.element_areas.insert(element, area);
        match parent {
            Some(parent) => {
                self.parents.insert(element, parent);
            }
            None => {
                self.parents.remove(&element);
            }
        }
    }

    /// Check if an element is focused
    pub fn is_focused(&self, element: ElementId) -> bool {
        self.focused == Some(element)
    }

    /// Set the focused element
    pub fn set_focus(&mut self, element: Option<ElementId>) {
        self.focused = element;
    }

    /// Check if a point is within an element's area
    pub fn point_in_element(&self, element: ElementId, x: u16, y: u16) -> bool {
        self.element_areas
            .get(&element)
            .map(|area| contains(*area, x, y))
            .unwrap_or(false)
    }

    /// Ancestors of an element, nearest first.
    pub fn ancestors_of(&self, element: ElementId) -> Vec<ElementId> {
        let mut chain = Vec::new();
        let mut current = element;
        while let Some(&parent) = self.parents.get(&current) {
            // Guard against a cycle introduced by a bad registration.
            if parent == element || chain.contains(&parent) {
                break;
            }
            chain.push(parent);
            current = parent;
        }
        chain
    }

    fn depth(&self, element: ElementId) -> usize {
        self.ancestors_of(element).len()
    }

    /// The innermost element at a point.
    pub fn element_at(&self, x: u16, y: u16) -> Option<ElementId> {
        self.element_areas
            .iter()
            .filter(|(_, area)| contains(**area, x, y))
            .map(|(&id, _)| id)
            .max_by_key(|&id| (self.depth(id), std::cmp::Reverse(id)))
    }
}

/// An event with its context and, once a control handled it, a bubble marker
#[derive(Debug, Clone)]
pub struct Event {
    /// The event payload
    pub kind: EventKind,
    /// Context at the time of the event
    pub context: EventContext,
    gesture: GestureId,
    marker: Option<BubbleMarker>,
}

impl Event {
    /// Create a new event; every event is its own gesture.
    pub fn new(kind: EventKind, context: EventContext) -> Self {
        Self {
            kind,
            context,
            gesture: GestureId(NEXT_GESTURE.fetch_add(1, Ordering::Relaxed)),
            marker: None,
        }
    }

    /// The gesture this event represents.
    pub fn gesture(&self) -> GestureId {
        self.gesture
    }

    /// Attach the bubble marker for this gesture.
    ///
    /// The activation point is the click position for mouse events and the
    /// center of `area` otherwise. Only the first call per event takes
    /// effect; later calls are refused and return `false`.
    pub fn mark(&mut self, source: ElementId, area: Rect) -> bool {
        if let Some(existing) = &self.marker {
            tracing::debug!(
                gesture = self.gesture.0,
                marked_by = existing.source.0,
                refused = source.0,
                "Event already marked"
            );
            return false;
        }

        let (column, row) = self.kind.click_position().unwrap_or((
            area.x + area.width / 2,
            area.y + area.height / 2,
        ));
        self.marker = Some(BubbleMarker {
            gesture: self.gesture,
            source,
            source_area: area,
            column,
            row,
        });
        true
    }

    /// The bubble marker, if a control marked this event.
    pub fn marker(&self) -> Option<&BubbleMarker> {
        self.marker.as_ref()
    }

    /// Whether a control marked this event.
    pub fn is_marked(&self) -> bool {
        self.marker.is_some()
    }

    /// Registered ancestors of the marking control with their areas,
    /// nearest first. Empty when unmarked.
    pub fn ancestor_path(&self) -> Vec<(ElementId, Rect)> {
        let Some(marker) = &self.marker else {
            return Vec::new();
        };
        self.context
            .ancestors_of(marker.source)
            .into_iter()
            .filter_map(|id| self.context.element_areas.get(&id).map(|area| (id, *area)))
            .collect()
    }
}
