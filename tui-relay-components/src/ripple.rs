//! Ripple container reacting to clicks in its descendants

use ratatui::{layout::Rect, Frame};
use tokio::time::Instant;
use tui_relay_core::{
    BubbleListener, BubbleMarker, Component, ElementId, Event, EventBus, EventKind, EventOutcome,
    GestureId, RippleConfig,
};

use crate::color::{get_color, ColorName};

#[derive(Debug, Clone, Copy)]
struct Ring {
    gesture: GestureId,
    origin: (u16, u16),
    started: Instant,
}

/// Props for Ripple component
pub struct RippleProps {
    pub color: ColorName,
}

/// Expanding rings drawn over a container's area
///
/// The ripple never handles input itself. It learns about activations from
/// bubble markers ([`BubbleListener`]) and draws a ring anchored at the
/// activation point, relative to its own area. Render it after the content
/// it decorates; rings only tint backgrounds.
pub struct Ripple {
    id: Option<ElementId>,
    area: Rect,
    config: RippleConfig,
    rings: Vec<Ring>,
}

impl Ripple {
    pub fn new(config: RippleConfig) -> Self {
        Self {
            id: None,
            area: Rect::default(),
            config,
            rings: Vec::new(),
        }
    }

    pub fn with_id(mut self, id: ElementId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn area(&self) -> Rect {
        self.area
    }

    pub fn register(&self, bus: &mut EventBus, parent: Option<ElementId>) {
        if let Some(id) = self.id {
            bus.register(id, self.area, parent);
        }
    }

    /// Whether any ring is still expanding.
    pub fn is_animating(&self) -> bool {
        !self.rings.is_empty()
    }

    /// Origins of the live rings, relative to the container.
    pub fn origins(&self) -> Vec<(u16, u16)> {
        self.rings.iter().map(|r| r.origin).collect()
    }

    /// Drop finished rings. Returns whether any are left.
    pub fn prune(&mut self) -> bool {
        let duration = self.config.duration();
        self.rings.retain(|ring| ring.started.elapsed() < duration);
        self.is_animating()
    }

    fn progress(&self, ring: &Ring) -> f32 {
        let total = self.config.duration().as_secs_f32();
        if total <= 0.0 {
            return 1.0;
        }
        (ring.started.elapsed().as_secs_f32() / total).min(1.0)
    }
}

impl BubbleListener for Ripple {
    fn on_bubble(&mut self, area: Rect, marker: &BubbleMarker) {
        if self.rings.iter().any(|r| r.gesture == marker.gesture) {
            return;
        }
        let Some(origin) = marker.offset_in(area) else {
            return;
        };
        tracing::trace!(gesture = marker.gesture.0, ?origin, "Ripple started");
        self.rings.push(Ring {
            gesture: marker.gesture,
            origin,
            started: Instant::now(),
        });
    }
}

impl Component for Ripple {
    type Props<'a> = RippleProps;

    fn handle_event(&mut self, event: &mut Event, _props: Self::Props<'_>) -> EventOutcome {
        if !matches!(event.kind, EventKind::Tick) || !self.is_animating() {
            return EventOutcome::ignored();
        }
        self.prune();
        // one more frame to erase the last ring
        EventOutcome::needs_render()
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, props: Self::Props<'_>) {
        self.area = area;
        let steps = self.config.steps.max(1) as f32;

        let buf = frame.buffer_mut();
        for ring in &self.rings {
            let progress = self.progress(ring);
            if progress >= 1.0 {
                continue;
            }
            let radius = (progress * steps).floor() * 2.0;
            let shade = 300 + (progress * 500.0) as u16;
            let color = get_color(props.color, shade);

            let ox = area.x + ring.origin.0;
            let oy = area.y + ring.origin.1;
            for y in area.top()..area.bottom() {
                for x in area.left()..area.right() {
                    // cells are roughly twice as tall as wide
                    let dx = (x as f32 - ox as f32) / 2.0;
                    let dy = y as f32 - oy as f32;
                    let distance = (dx * dx + dy * dy).sqrt();
                    if (distance - radius).abs() < 0.5 {
                        buf[(x, y)].set_bg(color);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::style::Color;
    use std::time::Duration;
    use tui_relay_core::testing::{click, RenderHarness};
    use tui_relay_core::{bubble_through, EventContext};

    fn marked_click(x: u16, y: u16) -> Event {
        let mut event = Event::new(click(x, y), EventContext::default());
        event.mark(ElementId(1), Rect::new(x, y, 1, 1));
        event
    }

    #[tokio::test(start_paused = true)]
    async fn ring_starts_at_click_and_fades() {
        let mut ripple = Ripple::new(RippleConfig::default());
        let area = Rect::new(10, 2, 30, 8);
        let event = marked_click(22, 5);

        bubble_through(&event, &mut [(area, &mut ripple)]);
        bubble_through(&event, &mut [(area, &mut ripple)]);
        assert_eq!(ripple.origins(), vec![(12, 3)]);

        let mut screen = RenderHarness::new(50, 12);
        let buffer = screen.render(|frame| ripple.render(frame, area, RippleProps { color: ColorName::Teal }));
        assert_ne!(buffer[(22, 5)].bg, Color::Reset);
        assert_eq!(buffer[(10, 2)].bg, Color::Reset);

        tokio::time::advance(Duration::from_millis(100)).await;
        let mut tick = Event::new(EventKind::Tick, EventContext::default());
        assert!(ripple.handle_event(&mut tick, RippleProps { color: ColorName::Teal }).needs_render);
        assert!(ripple.is_animating());

        tokio::time::advance(Duration::from_millis(400)).await;
        let mut tick = Event::new(EventKind::Tick, EventContext::default());
        assert!(ripple.handle_event(&mut tick, RippleProps { color: ColorName::Teal }).needs_render);
        assert!(!ripple.is_animating());

        let mut tick = Event::new(EventKind::Tick, EventContext::default());
        assert!(!ripple.handle_event(&mut tick, RippleProps { color: ColorName::Teal }).needs_render);
    }

    #[tokio::test(start_paused = true)]
    async fn clicks_outside_the_container_are_ignored() {
        let mut ripple = Ripple::new(RippleConfig::default());
        let event = marked_click(1, 1);
        bubble_through(&event, &mut [(Rect::new(10, 10, 5, 5), &mut ripple)]);
        assert!(!ripple.is_animating());

        let unmarked = Event::new(click(12, 12), EventContext::default());
        bubble_through(&unmarked, &mut [(Rect::new(10, 10, 5, 5), &mut ripple)]);
        assert!(!ripple.is_animating());
    }
}
