//! Editable label that submits its new text as an action payload

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    widgets::Paragraph,
    Frame,
};
use tui_relay_core::{
    ActionHandle, ActivationKeys, Component, ElementId, Event, EventBus, EventKind, EventOutcome,
};

use crate::color::{get_color, ColorName, ControlState, Icon, SPINNER_FRAMES};
use crate::watch::Watch;

/// Single-line edit buffer with a byte-indexed cursor
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineEditor {
    value: String,
    cursor: usize,
}

impl LineEditor {
    /// Start editing `value` with the cursor at the end.
    pub fn new(value: &str) -> Self {
        Self {
            value: value.to_string(),
            cursor: value.len(),
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Cursor position in columns.
    pub fn cursor_column(&self) -> u16 {
        self.value[..self.cursor].chars().count() as u16
    }

    fn prev_boundary(&self) -> usize {
        self.value[..self.cursor]
            .char_indices()
            .last()
            .map(|(i, _)| i)
            .unwrap_or(0)
    }

    fn next_boundary(&self) -> usize {
        self.value[self.cursor..]
            .chars()
            .next()
            .map(|c| self.cursor + c.len_utf8())
            .unwrap_or(self.cursor)
    }

    /// Apply an editing key. Returns whether the buffer or cursor changed.
    pub fn apply(&mut self, key: &KeyEvent) -> bool {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return match key.code {
                KeyCode::Char('a') => {
                    self.cursor = 0;
                    true
                }
                KeyCode::Char('e') => {
                    self.cursor = self.value.len();
                    true
                }
                KeyCode::Char('u') => {
                    self.value.clear();
                    self.cursor = 0;
                    true
                }
                _ => false,
            };
        }

        match key.code {
            KeyCode::Char(c) => {
                self.value.insert(self.cursor, c);
                self.cursor += c.len_utf8();
                true
            }
            KeyCode::Backspace if self.cursor > 0 => {
                let start = self.prev_boundary();
                self.value.replace_range(start..self.cursor, "");
                self.cursor = start;
                true
            }
            KeyCode::Delete if self.cursor < self.value.len() => {
                let end = self.next_boundary();
                self.value.replace_range(self.cursor..end, "");
                true
            }
            KeyCode::Left if self.cursor > 0 => {
                self.cursor = self.prev_boundary();
                true
            }
            KeyCode::Right if self.cursor < self.value.len() => {
                self.cursor = self.next_boundary();
                true
            }
            KeyCode::Home => {
                self.cursor = 0;
                true
            }
            KeyCode::End => {
                self.cursor = self.value.len();
                true
            }
            _ => false,
        }
    }
}

/// Props for Label component
pub struct LabelProps<'a> {
    /// Current text, as known to the application.
    pub text: &'a str,
    pub placeholder: &'a str,
    pub color: ColorName,
    /// Action receiving the edited text
    pub action: &'a ActionHandle<String>,
    pub is_focused: bool,
    pub activation: &'a ActivationKeys,
}

/// Text that turns into an input on activation
///
/// Activation (click, or an activation key while focused) enters edit mode.
/// Enter submits: the event is marked and the edited text dispatched as the
/// payload. Esc, or a click elsewhere, cancels. While the submission is in
/// flight the submitted text is shown dimmed with a spinner.
#[derive(Default)]
pub struct Label {
    id: Option<ElementId>,
    area: Rect,
    editor: Option<LineEditor>,
    submitted: Option<String>,
    spinner: usize,
    watch: Watch,
}

impl Label {
    pub fn new(id: ElementId) -> Self {
        Self {
            id: Some(id),
            ..Self::default()
        }
    }

    pub fn is_editing(&self) -> bool {
        self.editor.is_some()
    }

    /// Current draft while editing.
    pub fn draft(&self) -> Option<&str> {
        self.editor.as_ref().map(LineEditor::value)
    }

    pub fn register(&self, bus: &mut EventBus, parent: Option<ElementId>) {
        if let Some(id) = self.id {
            bus.register(id, self.area, parent);
        }
    }

    fn submit(&mut self, event: &mut Event, action: &ActionHandle<String>) -> EventOutcome {
        // the draft stays open until the action can take it
        if action.is_disabled() {
            tracing::debug!(loading = action.is_loading(), "Label submit refused");
            return EventOutcome {
                handled: true,
                needs_render: false,
            };
        }
        let Some(editor) = self.editor.take() else {
            return EventOutcome::ignored();
        };
        let text = editor.value().to_string();
        if let Some(id) = self.id {
            event.mark(id, self.area);
        }
        let outcome = action.dispatch(text.clone());
        tracing::debug!(?outcome, len = text.len(), "Label submitted");
        if outcome.is_submitted() {
            self.submitted = Some(text);
        }
        EventOutcome::handled()
    }
}

impl Component for Label {
    type Props<'a> = LabelProps<'a>;

    fn handle_event(&mut self, event: &mut Event, props: Self::Props<'_>) -> EventOutcome {
        self.watch.follow(props.action);
        let loading = props.action.is_loading();
        if !loading {
            self.submitted = None;
        }

        if let EventKind::Tick = event.kind {
            let changed = self.watch.take_changed();
            if loading {
                self.spinner = self.spinner.wrapping_add(1);
                return EventOutcome::needs_render();
            }
            return if changed {
                EventOutcome::needs_render()
            } else {
                EventOutcome::ignored()
            };
        }

        let clicked_inside = event.kind.is_click_in(self.area);

        if self.editor.is_some() {
            let pressed = match &event.kind {
                EventKind::Key(key) => Some(*key),
                _ => None,
            };
            return match pressed {
                Some(key) if key.code == KeyCode::Enter => self.submit(event, props.action),
                Some(key) if key.code == KeyCode::Esc => {
                    self.editor = None;
                    EventOutcome::handled()
                }
                Some(key) => EventOutcome {
                    handled: true,
                    needs_render: self.editor.as_mut().is_some_and(|e| e.apply(&key)),
                },
                None if event.kind.click_position().is_some() && !clicked_inside => {
                    self.editor = None;
                    EventOutcome::needs_render()
                }
                None => EventOutcome::ignored(),
            };
        }

        let activated = match &event.kind {
            EventKind::Key(key) => props.is_focused && props.activation.matches(key),
            _ => clicked_inside,
        };
        if !activated {
            return EventOutcome::ignored();
        }
        if props.action.is_disabled() {
            return EventOutcome {
                handled: true,
                needs_render: false,
            };
        }
        self.editor = Some(LineEditor::new(props.text));
        EventOutcome::handled()
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, props: Self::Props<'_>) {
        self.area = area;
        self.watch.follow(props.action);
        let state = ControlState::of(props.action, props.is_focused);

        if let Some(editor) = &self.editor {
            let style = Style::default()
                .fg(get_color(ColorName::Gray, 50))
                .bg(get_color(ColorName::Gray, 800));
            frame.render_widget(Paragraph::new(editor.value()).style(style), area);
            let x = area.x + editor.cursor_column();
            if x < area.right() {
                frame.set_cursor_position((x, area.y));
            }
            return;
        }

        let (text, style) = match (&self.submitted, props.action.is_loading()) {
            (Some(pending), true) => (
                format!(
                    "{} {}",
                    SPINNER_FRAMES[self.spinner % SPINNER_FRAMES.len()],
                    pending
                ),
                Style::default()
                    .fg(get_color(props.color, 300))
                    .add_modifier(Modifier::DIM),
            ),
            _ if props.text.is_empty() => (
                props.placeholder.to_string(),
                Style::default().fg(get_color(ColorName::Gray, 500)),
            ),
            _ => {
                let mut style = Style::default().fg(get_color(props.color, 200));
                if state.contains(ControlState::FOCUSED) {
                    style = style.add_modifier(Modifier::UNDERLINED);
                }
                let text = if state.contains(ControlState::FOCUSED) && !state.contains(ControlState::DISABLED) {
                    format!("{} {}", props.text, Icon::Edit.glyph())
                } else {
                    props.text.to_string()
                };
                (text, style)
            }
        };
        frame.render_widget(Paragraph::new(text).style(style), area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tui_relay_core::testing::{
        char_key, click_event, key, key_event, DispatchHarness, RenderHarness,
    };
    use tui_relay_core::{ActionKey, EventContext};

    fn edit_keys(label: &mut Label, action: &ActionHandle<String>, keys: &[KeyEvent]) {
        let activation = ActivationKeys::default();
        for k in keys {
            let mut event = Event::new(EventKind::Key(*k), EventContext::default());
            label.handle_event(
                &mut event,
                LabelProps {
                    text: "Draft",
                    placeholder: "",
                    color: ColorName::Blue,
                    action,
                    is_focused: true,
                    activation: &activation,
                },
            );
        }
    }

    #[test]
    fn editor_handles_multibyte() {
        let mut editor = LineEditor::new("héllo");
        assert_eq!(editor.cursor_column(), 5);
        editor.apply(&key("left"));
        editor.apply(&key("left"));
        editor.apply(&key("left"));
        editor.apply(&key("backspace"));
        assert_eq!(editor.value(), "hllo");
        assert_eq!(editor.cursor(), 1);
        editor.apply(&key("delete"));
        assert_eq!(editor.value(), "hlo");
        editor.apply(&key("ctrl+u"));
        assert_eq!(editor.value(), "");
        assert!(!editor.apply(&key("backspace")));
    }

    #[tokio::test]
    async fn edit_and_submit_dispatches_text() {
        let mut harness = DispatchHarness::new();
        let rename = harness.bind(&ActionKey::<String>::named("doc/rename"));
        let mut label = Label::new(ElementId(5));

        edit_keys(&mut label, &rename, &[key("enter")]);
        assert_eq!(label.draft(), Some("Draft"));

        edit_keys(
            &mut label,
            &rename,
            &[key("backspace"), char_key('!'), key("enter")],
        );
        assert!(!label.is_editing());
        assert_eq!(harness.submissions()[0].payload, serde_json::json!("Draf!"));
        assert!(rename.is_loading());

        let mut screen = RenderHarness::new(20, 1);
        let activation = ActivationKeys::default();
        let text = screen.render_to_string_plain(|frame| {
            label.render(
                frame,
                frame.area(),
                LabelProps {
                    text: "Draft",
                    placeholder: "",
                    color: ColorName::Blue,
                    action: &rename,
                    is_focused: false,
                    activation: &activation,
                },
            )
        });
        assert!(text.ends_with("Draf!"));

        harness.reject_next("read only").await;
        assert!(rename.last_error().is_some());
    }

    #[tokio::test]
    async fn escape_and_outside_click_cancel() {
        let mut harness = DispatchHarness::new();
        let rename = harness.bind(&ActionKey::<String>::named("doc/rename"));
        let mut label = Label::new(ElementId(5));

        edit_keys(&mut label, &rename, &[key("enter"), char_key('x'), key("esc")]);
        assert!(!label.is_editing());

        edit_keys(&mut label, &rename, &[key("enter")]);
        let activation = ActivationKeys::default();
        let mut event = click_event(50, 9, EventContext::default());
        label.handle_event(
            &mut event,
            LabelProps {
                text: "Draft",
                placeholder: "",
                color: ColorName::Blue,
                action: &rename,
                is_focused: true,
                activation: &activation,
            },
        );
        assert!(!label.is_editing());
        assert_eq!(harness.pending_count(), 0);
    }

    #[tokio::test]
    async fn unbound_label_is_read_only() {
        let harness = DispatchHarness::new();
        let none = harness.bind_none::<String>();
        let mut label = Label::new(ElementId(5));
        edit_keys(&mut label, &none, &[key("enter")]);
        assert!(!label.is_editing());
    }

    #[tokio::test]
    async fn enter_waits_while_shared_key_is_in_flight() {
        let mut harness = DispatchHarness::new();
        let rename_key = ActionKey::<String>::named("doc/rename");
        let rename = harness.bind(&rename_key);
        let toolbar = harness.bind(&rename_key);
        let mut label = Label::new(ElementId(5));

        edit_keys(&mut label, &rename, &[key("enter"), char_key('?')]);
        assert!(toolbar.dispatch("Other".to_string()).is_submitted());

        let activation = ActivationKeys::default();
        let mut enter = key_event("enter");
        let outcome = label.handle_event(
            &mut enter,
            LabelProps {
                text: "Draft",
                placeholder: "",
                color: ColorName::Blue,
                action: &rename,
                is_focused: true,
                activation: &activation,
            },
        );
        assert!(outcome.handled);
        assert!(!enter.is_marked());
        assert_eq!(label.draft(), Some("Draft?"));
        assert_eq!(harness.submissions().len(), 1);

        harness.resolve_next().await;
        edit_keys(&mut label, &rename, &[key("enter")]);
        assert!(!label.is_editing());
        assert_eq!(harness.submissions()[1].payload, serde_json::json!("Draft?"));
    }
}
