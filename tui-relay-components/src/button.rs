//! Button bound to an action

use std::marker::PhantomData;

use ratatui::{
    layout::{Alignment, Rect},
    text::Line,
    widgets::{Block, Paragraph},
    Frame,
};
use serde::Serialize;
use tui_relay_core::{
    ActionHandle, ActivationKeys, Component, ElementId, Event, EventBus, EventKind, EventOutcome,
};

use crate::color::{control_style, ColorName, ControlState, Icon, SPINNER_FRAMES};
use crate::watch::Watch;

/// Props for Button component
pub struct ButtonProps<'a, T> {
    pub label: &'a str,
    pub color: ColorName,
    pub icon: Option<Icon>,
    /// Action dispatched on activation
    pub action: &'a ActionHandle<T>,
    /// Payload sent with every dispatch
    pub payload: &'a T,
    /// Whether this component has focus
    pub is_focused: bool,
    /// Keys that activate the button while focused
    pub activation: &'a ActivationKeys,
}

/// A clickable button
///
/// Activates on a left click inside its last rendered area, or on an
/// activation key while focused. Activation marks the event for bubbling,
/// then dispatches the bound action with the fixed payload. While the action
/// is in flight the label is replaced by a spinner and further activations
/// are swallowed.
///
/// A rendered button stays subscribed to its action until it is dropped.
pub struct Button<T = ()> {
    id: ElementId,
    area: Rect,
    spinner: usize,
    watch: Watch,
    _payload: PhantomData<fn(T)>,
}

impl<T> Button<T> {
    pub fn new(id: ElementId) -> Self {
        Self {
            id,
            area: Rect::default(),
            spinner: 0,
            watch: Watch::default(),
            _payload: PhantomData,
        }
    }

    pub fn id(&self) -> ElementId {
        self.id
    }

    /// Area from the last render.
    pub fn area(&self) -> Rect {
        self.area
    }

    /// Register the last rendered area under `parent`.
    pub fn register(&self, bus: &mut EventBus, parent: Option<ElementId>) {
        bus.register(self.id, self.area, parent);
    }

    /// Columns needed to show `label` (and `icon`) with padding.
    pub fn width(label: &str, icon: Option<Icon>) -> u16 {
        let icon = if icon.is_some() { 2 } else { 0 };
        Line::from(label).width() as u16 + icon + 4
    }

    fn content(&self, label: &str, icon: Option<Icon>, loading: bool) -> String {
        if loading {
            return format!("{} {}", SPINNER_FRAMES[self.spinner % SPINNER_FRAMES.len()], label);
        }
        match icon {
            Some(icon) => format!("{} {}", icon.glyph(), label),
            None => label.to_string(),
        }
    }
}

fn is_activation(event: &Event, area: Rect, is_focused: bool, keys: &ActivationKeys) -> bool {
    match &event.kind {
        EventKind::Key(key) => is_focused && keys.matches(key),
        kind => kind.is_click_in(area),
    }
}

impl<T: Serialize + Clone + 'static> Component for Button<T> {
    type Props<'a> = ButtonProps<'a, T>;

    fn handle_event(&mut self, event: &mut Event, props: Self::Props<'_>) -> EventOutcome {
        self.watch.follow(props.action);
        if matches!(event.kind, EventKind::Tick) {
            let changed = self.watch.take_changed();
            if props.action.is_loading() {
                self.spinner = self.spinner.wrapping_add(1);
                return EventOutcome::needs_render();
            }
            self.spinner = 0;
            return if changed {
                EventOutcome::needs_render()
            } else {
                EventOutcome::ignored()
            };
        }

        if !is_activation(event, self.area, props.is_focused, props.activation) {
            return EventOutcome::ignored();
        }

        if props.action.is_disabled() {
            tracing::debug!(element = self.id.0, "Activation of disabled button swallowed");
            return EventOutcome {
                handled: true,
                needs_render: false,
            };
        }

        event.mark(self.id, self.area);
        let outcome = props.action.dispatch(props.payload.clone());
        tracing::debug!(element = self.id.0, label = props.label, ?outcome, "Button activated");
        EventOutcome::handled()
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, props: Self::Props<'_>) {
        self.area = area;
        self.watch.follow(props.action);
        let state = ControlState::of(props.action, props.is_focused);
        let style = control_style(props.color, state);

        frame.render_widget(Block::default().style(style), area);

        let row = Rect {
            y: area.y + area.height / 2,
            height: area.height.min(1),
            ..area
        };
        let text = self.content(props.label, props.icon, state.contains(ControlState::LOADING));
        frame.render_widget(
            Paragraph::new(text).style(style).alignment(Alignment::Center),
            row,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tui_relay_core::testing::{click_event, key_event, DispatchHarness, RenderHarness};
    use tui_relay_core::{ActionKey, DispatchOutcome, EventContext};

    fn props<'a>(
        action: &'a ActionHandle<()>,
        keys: &'a ActivationKeys,
        is_focused: bool,
    ) -> ButtonProps<'a, ()> {
        ButtonProps {
            label: "Save",
            color: ColorName::Blue,
            icon: None,
            action,
            payload: &(),
            is_focused,
            activation: keys,
        }
    }

    fn rendered(button: &mut Button<()>, action: &ActionHandle<()>) -> String {
        let keys = ActivationKeys::default();
        let mut harness = RenderHarness::new(12, 1);
        harness.render_to_string_plain(|frame| {
            button.render(frame, Rect::new(0, 0, 12, 1), props(action, &keys, false))
        })
    }

    #[tokio::test]
    async fn click_marks_then_dispatches() {
        let mut harness = DispatchHarness::new();
        let save = harness.bind(&ActionKey::<()>::named("k1"));
        let keys = ActivationKeys::default();
        let mut button = Button::new(ElementId(7));
        assert_eq!(rendered(&mut button, &save).trim(), "Save");

        let mut event = click_event(3, 0, EventContext::default());
        let outcome = button.handle_event(&mut event, props(&save, &keys, false));

        assert!(outcome.handled);
        assert_eq!(event.marker().map(|m| m.source), Some(ElementId(7)));
        assert!(save.is_loading());
        assert_eq!(harness.submissions().len(), 1);
        assert!(rendered(&mut button, &save).contains(SPINNER_FRAMES[0]));

        harness.resolve_next().await;
        assert_eq!(rendered(&mut button, &save).trim(), "Save");
    }

    #[tokio::test]
    async fn click_outside_is_ignored() {
        let mut harness = DispatchHarness::new();
        let save = harness.bind(&ActionKey::<()>::named("k1"));
        let keys = ActivationKeys::default();
        let mut button = Button::new(ElementId(7));
        rendered(&mut button, &save);

        let mut event = click_event(30, 0, EventContext::default());
        assert!(!button.handle_event(&mut event, props(&save, &keys, false)).handled);
        assert!(!event.is_marked());
        assert_eq!(harness.pending_count(), 0);
    }

    #[tokio::test]
    async fn enter_activates_only_when_focused() {
        let mut harness = DispatchHarness::new();
        let save = harness.bind(&ActionKey::<()>::named("k1"));
        let keys = ActivationKeys::default();
        let mut button = Button::new(ElementId(1));
        rendered(&mut button, &save);

        let mut event = key_event("enter");
        assert!(!button.handle_event(&mut event, props(&save, &keys, false)).handled);

        let mut event = key_event("enter");
        assert!(button.handle_event(&mut event, props(&save, &keys, true)).handled);
        // keyboard activation anchors at the button center
        assert_eq!(event.marker().map(|m| (m.column, m.row)), Some((6, 0)));
        assert_eq!(harness.pending_count(), 1);
    }

    #[tokio::test]
    async fn unbound_button_is_inert() {
        let harness = DispatchHarness::new();
        let none = harness.bind_none::<()>();
        let keys = ActivationKeys::default();
        let mut button = Button::new(ElementId(1));
        rendered(&mut button, &none);

        let mut event = click_event(1, 0, EventContext::default());
        let outcome = button.handle_event(&mut event, props(&none, &keys, false));
        assert!(outcome.handled);
        assert!(!outcome.needs_render);
        assert!(!event.is_marked());
        assert_eq!(none.dispatch(()), DispatchOutcome::Unbound);
    }

    #[tokio::test]
    async fn spinner_advances_on_tick_while_loading() {
        let harness = DispatchHarness::new();
        let save = harness.bind(&ActionKey::<()>::named("k1"));
        let keys = ActivationKeys::default();
        let mut button = Button::new(ElementId(1));

        let mut tick = Event::new(EventKind::Tick, EventContext::default());
        assert!(!button.handle_event(&mut tick, props(&save, &keys, false)).needs_render);

        save.dispatch(());
        let mut tick = Event::new(EventKind::Tick, EventContext::default());
        assert!(button.handle_event(&mut tick, props(&save, &keys, false)).needs_render);
        assert!(rendered(&mut button, &save).contains(SPINNER_FRAMES[1]));
    }

    #[tokio::test]
    async fn mounted_button_subscribes_until_dropped() {
        let mut harness = DispatchHarness::new();
        let key = ActionKey::<()>::named("k1");
        let save = harness.bind(&key);
        let keys = ActivationKeys::default();
        let mut button = Button::new(ElementId(1));
        rendered(&mut button, &save);
        assert_eq!(harness.dispatcher.subscriber_count(key.id()), 1);

        let mut event = click_event(1, 0, EventContext::default());
        button.handle_event(&mut event, props(&save, &keys, false));
        harness.resolve_next().await;

        // the settle notification asks for one more frame
        let mut tick = Event::new(EventKind::Tick, EventContext::default());
        assert!(button.handle_event(&mut tick, props(&save, &keys, false)).needs_render);
        let mut tick = Event::new(EventKind::Tick, EventContext::default());
        assert!(!button.handle_event(&mut tick, props(&save, &keys, false)).needs_render);

        drop(button);
        assert_eq!(harness.dispatcher.subscriber_count(key.id()), 0);
        assert_eq!(harness.dispatcher.tracked(), 0);
    }

    #[tokio::test]
    async fn state_survives_unmount_while_in_flight() {
        let mut harness = DispatchHarness::new();
        let key = ActionKey::<()>::named("k1");
        let save = harness.bind(&key);
        let keys = ActivationKeys::default();
        let mut button = Button::new(ElementId(1));
        rendered(&mut button, &save);

        let mut event = click_event(1, 0, EventContext::default());
        button.handle_event(&mut event, props(&save, &keys, false));
        drop(button);
        assert_eq!(harness.dispatcher.in_flight(), vec![key.id().clone()]);

        let mut remounted = Button::new(ElementId(1));
        assert!(rendered(&mut remounted, &save).contains(SPINNER_FRAMES[0]));
        harness.resolve_next().await;
        assert_eq!(rendered(&mut remounted, &save).trim(), "Save");
    }
}
