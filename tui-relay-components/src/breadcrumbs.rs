//! Breadcrumb trail with optionally clickable crumbs

use crossterm::event::KeyCode;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use tui_relay_core::{
    ActionHandle, ActivationKeys, Component, ElementId, Event, EventBus, EventKind, EventOutcome,
};

use crate::color::{get_color, ColorName, ControlState, SPINNER_FRAMES};
use crate::watch::Watch;

const SEPARATOR: &str = " › ";

/// One crumb; crumbs without an action render as plain text.
#[derive(Clone, Copy)]
pub struct Crumb<'a> {
    pub id: ElementId,
    pub label: &'a str,
    pub action: Option<&'a ActionHandle<()>>,
}

/// Props for Breadcrumbs component
pub struct BreadcrumbsProps<'a> {
    pub crumbs: &'a [Crumb<'a>],
    pub color: ColorName,
    /// Whether the trail has keyboard focus
    pub is_focused: bool,
    pub activation: &'a ActivationKeys,
}

/// A horizontal trail of crumbs
///
/// Left/Right move the keyboard selection between clickable crumbs while the
/// trail is focused. Clicking a crumb, or pressing an activation key on the
/// selected one, marks the event and dispatches the crumb's action.
#[derive(Default)]
pub struct Breadcrumbs {
    id: Option<ElementId>,
    area: Rect,
    crumb_areas: Vec<(ElementId, Rect)>,
    selected: usize,
    spinner: usize,
    watches: Vec<(ElementId, Watch)>,
}

impl Breadcrumbs {
    pub fn new(id: ElementId) -> Self {
        Self {
            id: Some(id),
            ..Self::default()
        }
    }

    /// Index of the crumb selected for keyboard activation.
    pub fn selected(&self) -> usize {
        self.selected
    }

    /// Register the trail and each crumb from the last render.
    pub fn register(&self, bus: &mut EventBus, parent: Option<ElementId>) {
        let parent = match self.id {
            Some(id) => {
                bus.register(id, self.area, parent);
                Some(id)
            }
            None => parent,
        };
        for (id, area) in &self.crumb_areas {
            bus.register(*id, *area, parent);
        }
    }

    /// Keep one subscription per clickable crumb.
    fn follow(&mut self, crumbs: &[Crumb<'_>]) {
        let mut old = std::mem::take(&mut self.watches);
        for crumb in crumbs {
            let Some(action) = crumb.action else {
                continue;
            };
            let mut watch = match old.iter().position(|(id, _)| *id == crumb.id) {
                Some(pos) => old.swap_remove(pos).1,
                None => Watch::default(),
            };
            watch.follow(action);
            self.watches.push((crumb.id, watch));
        }
    }

    fn take_changed(&self) -> bool {
        self.watches
            .iter()
            .map(|(_, watch)| watch.take_changed())
            .fold(false, |any, changed| any || changed)
    }

    fn area_of(&self, id: ElementId) -> Option<Rect> {
        self.crumb_areas
            .iter()
            .find(|(crumb, _)| *crumb == id)
            .map(|(_, area)| *area)
    }

    fn activate(&self, event: &mut Event, crumb: &Crumb<'_>) -> EventOutcome {
        let Some(action) = crumb.action else {
            return EventOutcome::ignored();
        };
        if action.is_disabled() {
            return EventOutcome {
                handled: true,
                needs_render: false,
            };
        }
        let area = self.area_of(crumb.id).unwrap_or(self.area);
        event.mark(crumb.id, area);
        let outcome = action.dispatch(());
        tracing::debug!(crumb = crumb.label, ?outcome, "Crumb activated");
        EventOutcome::handled()
    }

    fn step(&mut self, crumbs: &[Crumb<'_>], forward: bool) -> bool {
        let clickable: Vec<usize> = crumbs
            .iter()
            .enumerate()
            .filter(|(_, c)| c.action.is_some())
            .map(|(i, _)| i)
            .collect();
        let next = if forward {
            clickable.iter().find(|&&i| i > self.selected)
        } else {
            clickable.iter().rev().find(|&&i| i < self.selected)
        };
        match next {
            Some(&i) => {
                self.selected = i;
                true
            }
            None => false,
        }
    }
}

impl Component for Breadcrumbs {
    type Props<'a> = BreadcrumbsProps<'a>;

    fn handle_event(&mut self, event: &mut Event, props: Self::Props<'_>) -> EventOutcome {
        if props.crumbs.is_empty() {
            return EventOutcome::ignored();
        }
        self.selected = self.selected.min(props.crumbs.len() - 1);
        self.follow(props.crumbs);

        match &event.kind {
            EventKind::Tick => {
                let changed = self.take_changed();
                let loading = props
                    .crumbs
                    .iter()
                    .any(|c| c.action.is_some_and(|a| a.is_loading()));
                if loading {
                    self.spinner = self.spinner.wrapping_add(1);
                    return EventOutcome::needs_render();
                }
                if changed {
                    return EventOutcome::needs_render();
                }
                EventOutcome::ignored()
            }
            EventKind::Key(key) if props.is_focused => match key.code {
                KeyCode::Left => self.step(props.crumbs, false).into(),
                KeyCode::Right => self.step(props.crumbs, true).into(),
                _ if props.activation.matches(key) => {
                    let crumb = props.crumbs[self.selected];
                    self.activate(event, &crumb)
                }
                _ => EventOutcome::ignored(),
            },
            kind => {
                let Some((x, y)) = kind.click_position() else {
                    return EventOutcome::ignored();
                };
                let hit = props.crumbs.iter().position(|c| {
                    self.area_of(c.id).is_some_and(|a| {
                        x >= a.x && x < a.x + a.width && y >= a.y && y < a.y + a.height
                    })
                });
                match hit {
                    Some(i) => {
                        let crumb = props.crumbs[i];
                        if crumb.action.is_some() {
                            self.selected = i;
                        }
                        self.activate(event, &crumb)
                    }
                    None => EventOutcome::ignored(),
                }
            }
        }
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, props: Self::Props<'_>) {
        self.area = area;
        self.crumb_areas.clear();
        self.follow(props.crumbs);

        let mut spans = Vec::new();
        let mut x = area.x;
        let last = props.crumbs.len().saturating_sub(1);
        for (i, crumb) in props.crumbs.iter().enumerate() {
            if i > 0 {
                spans.push(Span::styled(
                    SEPARATOR,
                    Style::default().fg(get_color(ColorName::Gray, 500)),
                ));
                x = x.saturating_add(Line::from(SEPARATOR).width() as u16);
            }

            let text = match crumb.action {
                Some(action) if action.is_loading() => format!(
                    "{} {}",
                    SPINNER_FRAMES[self.spinner % SPINNER_FRAMES.len()],
                    crumb.label
                ),
                _ => crumb.label.to_string(),
            };

            let style = match crumb.action {
                Some(action) => {
                    let focused = props.is_focused && i == self.selected;
                    let state = ControlState::of(action, focused);
                    let mut style = Style::default()
                        .fg(get_color(props.color, 300))
                        .add_modifier(Modifier::UNDERLINED);
                    if state.contains(ControlState::DISABLED) {
                        style = style.add_modifier(Modifier::DIM);
                    }
                    if state.contains(ControlState::FOCUSED) {
                        style = style.add_modifier(Modifier::REVERSED);
                    }
                    style
                }
                None if i == last => Style::default().add_modifier(Modifier::BOLD),
                None => Style::default().fg(get_color(ColorName::Gray, 300)),
            };

            let width = Line::from(text.as_str()).width() as u16;
            let visible = width.min(area.right().saturating_sub(x));
            self.crumb_areas
                .push((crumb.id, Rect::new(x, area.y, visible, area.height.min(1))));
            x = x.saturating_add(width);
            spans.push(Span::styled(text, style));
        }

        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tui_relay_core::testing::{click_event, key_event, DispatchHarness, RenderHarness};
    use tui_relay_core::{ActionKey, EventContext};

    fn render(trail: &mut Breadcrumbs, crumbs: &[Crumb<'_>]) -> String {
        let keys = ActivationKeys::default();
        let mut harness = RenderHarness::new(40, 1);
        harness.render_to_string_plain(|frame| {
            trail.render(
                frame,
                Rect::new(0, 0, 40, 1),
                BreadcrumbsProps {
                    crumbs,
                    color: ColorName::Blue,
                    is_focused: false,
                    activation: &keys,
                },
            )
        })
    }

    #[tokio::test]
    async fn clicking_a_crumb_dispatches_its_action() {
        let mut harness = DispatchHarness::new();
        let home = harness.bind(&ActionKey::<()>::named("nav/home"));
        let crumbs = [
            Crumb { id: ElementId(10), label: "Home", action: Some(&home) },
            Crumb { id: ElementId(11), label: "Settings", action: None },
        ];
        let mut trail = Breadcrumbs::new(ElementId(1));
        assert_eq!(render(&mut trail, &crumbs), "Home › Settings");

        let keys = ActivationKeys::default();
        let props = || BreadcrumbsProps {
            crumbs: &crumbs,
            color: ColorName::Blue,
            is_focused: false,
            activation: &keys,
        };

        // plain crumb: nothing happens
        let mut event = click_event(9, 0, EventContext::default());
        assert!(!trail.handle_event(&mut event, props()).handled);

        let mut event = click_event(1, 0, EventContext::default());
        assert!(trail.handle_event(&mut event, props()).handled);
        assert_eq!(event.marker().map(|m| m.source), Some(ElementId(10)));
        assert_eq!(harness.submissions()[0].action.as_str(), "nav/home");
        assert!(render(&mut trail, &crumbs).starts_with(SPINNER_FRAMES[0]));
    }

    #[tokio::test]
    async fn keyboard_moves_between_clickable_crumbs() {
        let mut harness = DispatchHarness::new();
        let a = harness.bind(&ActionKey::<()>::named("a"));
        let c = harness.bind(&ActionKey::<()>::named("c"));
        let crumbs = [
            Crumb { id: ElementId(1), label: "A", action: Some(&a) },
            Crumb { id: ElementId(2), label: "B", action: None },
            Crumb { id: ElementId(3), label: "C", action: Some(&c) },
        ];
        let mut trail = Breadcrumbs::default();
        render(&mut trail, &crumbs);
        let keys = ActivationKeys::default();

        let mut right = key_event("right");
        trail.handle_event(
            &mut right,
            BreadcrumbsProps { crumbs: &crumbs, color: ColorName::Gray, is_focused: true, activation: &keys },
        );
        assert_eq!(trail.selected(), 2);

        let mut enter = key_event("enter");
        trail.handle_event(
            &mut enter,
            BreadcrumbsProps { crumbs: &crumbs, color: ColorName::Gray, is_focused: true, activation: &keys },
        );
        assert_eq!(harness.submissions()[0].action.as_str(), "c");
        assert!(c.is_loading());
        assert!(!a.is_loading());
    }

    #[tokio::test]
    async fn only_clickable_crumbs_are_watched() {
        let harness = DispatchHarness::new();
        let home = ActionKey::<()>::named("nav/home");
        let home_handle = harness.bind(&home);
        let crumbs = [
            Crumb { id: ElementId(10), label: "Home", action: Some(&home_handle) },
            Crumb { id: ElementId(11), label: "Here", action: None },
        ];
        let mut trail = Breadcrumbs::new(ElementId(1));
        render(&mut trail, &crumbs);
        render(&mut trail, &crumbs);
        assert_eq!(harness.dispatcher.subscriber_count(home.id()), 1);

        render(&mut trail, &crumbs[1..]);
        assert_eq!(harness.dispatcher.subscriber_count(home.id()), 0);
    }
}
