//! The report page: a header over a centered body wrapped in a ripple

use crossterm::event::KeyCode;
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::Style,
    widgets::Paragraph,
    Frame,
};
use tui_relay::prelude::*;
use tui_relay_components::{
    get_color, Button, ButtonProps, Center, CenterLayout, ColorName, Crumb, Header, HeaderItem,
    HeaderProps, Label, LabelProps, PageDescription, Ripple, RippleProps,
};

use crate::engine::AcceptedPayloads;

const HEADER_ID: ElementId = ElementId(1);
const CRUMBS_ID: ElementId = ElementId(2);
const RIPPLE_ID: ElementId = ElementId(3);
const CRUMB_BASE: u32 = 100;
const ITEM_BASE: u32 = 200;
const LABEL_BASE: u32 = 300;
const BUTTON_BASE: u32 = 400;

fn element(base: u32, index: usize) -> ElementId {
    ElementId(base + index as u32)
}

pub struct DemoApp {
    page: PageDescription,
    activation: ActivationKeys,
    layout: CenterLayout,
    header: Header,
    ripple: Ripple,
    labels: Vec<Label>,
    buttons: Vec<Button<()>>,
    crumb_actions: Vec<ActionHandle<()>>,
    item_actions: Vec<ActionHandle<()>>,
    label_actions: Vec<ActionHandle<String>>,
    button_actions: Vec<ActionHandle<()>>,
    label_texts: Vec<String>,
    accepted: AcceptedPayloads,
    status: String,
}

impl DemoApp {
    pub fn new(
        dispatcher: &Dispatcher,
        page: PageDescription,
        activation: ActivationKeys,
        ripple: RippleConfig,
        accepted: AcceptedPayloads,
    ) -> Self {
        let crumb_actions = page
            .header
            .crumbs
            .iter()
            .map(|crumb| dispatcher.bind(crumb.action.as_ref()))
            .collect();
        let item_actions = page
            .header
            .items
            .iter()
            .map(|item| dispatcher.bind(item.action.as_ref()))
            .collect();
        let label_actions = page
            .labels
            .iter()
            .map(|label| dispatcher.bind(label.action.as_ref()))
            .collect();
        let button_actions = page
            .buttons
            .iter()
            .map(|button| dispatcher.bind(button.action.as_ref()))
            .collect();

        let body_height = (page.labels.len() + 4) as u16;
        let status = controls_hint(&activation);
        Self {
            layout: CenterLayout::new(3, Center::new(48, body_height).with_background(ColorName::Gray)),
            header: Header::new(HEADER_ID, CRUMBS_ID),
            ripple: Ripple::new(ripple).with_id(RIPPLE_ID),
            labels: (0..page.labels.len())
                .map(|i| Label::new(element(LABEL_BASE, i)))
                .collect(),
            buttons: (0..page.buttons.len())
                .map(|i| Button::new(element(BUTTON_BASE, i)))
                .collect(),
            label_texts: page.labels.iter().map(|l| l.text.clone()).collect(),
            crumb_actions,
            item_actions,
            label_actions,
            button_actions,
            page,
            activation,
            accepted,
            status,
        }
    }

    fn focus_order(&self) -> Vec<ElementId> {
        let crumbs = crumbs(&self.page, &self.crumb_actions);
        let items = items(&self.page, &self.item_actions);
        let props = header_props(&self.page, &crumbs, &items, None, &self.activation);
        let mut order = self.header.focus_order(&props);
        order.extend((0..self.labels.len()).map(|i| element(LABEL_BASE, i)));
        order.extend((0..self.buttons.len()).map(|i| element(BUTTON_BASE, i)));
        order
    }

    fn is_editing(&self) -> bool {
        self.labels.iter().any(Label::is_editing)
    }
}

fn controls_hint(activation: &ActivationKeys) -> String {
    format!(
        "{} to move focus, {} or click to activate, {} to quit",
        format_key_for_display("tab"),
        activation.display(),
        format_key_for_display("ctrl+q"),
    )
}

fn crumbs<'a>(page: &'a PageDescription, actions: &'a [ActionHandle<()>]) -> Vec<Crumb<'a>> {
    page.header
        .crumbs
        .iter()
        .zip(actions)
        .enumerate()
        .map(|(i, (crumb, action))| Crumb {
            id: element(CRUMB_BASE, i),
            label: &crumb.label,
            action: action.is_bound().then_some(action),
        })
        .collect()
}

fn items<'a>(page: &'a PageDescription, actions: &'a [ActionHandle<()>]) -> Vec<HeaderItem<'a>> {
    page.header
        .items
        .iter()
        .zip(actions)
        .enumerate()
        .map(|(i, (item, action))| HeaderItem {
            id: element(ITEM_BASE, i),
            label: &item.label,
            icon: item.icon,
            color: item.color,
            action,
        })
        .collect()
}

fn header_props<'a>(
    page: &'a PageDescription,
    crumbs: &'a [Crumb<'a>],
    items: &'a [HeaderItem<'a>],
    focus: Option<ElementId>,
    activation: &'a ActivationKeys,
) -> HeaderProps<'a> {
    HeaderProps {
        title: &page.header.title,
        crumbs,
        items,
        color: page.header.color,
        focus,
        activation,
    }
}

impl RelayApp for DemoApp {
    fn render(&mut self, frame: &mut Frame, bus: &mut EventBus) {
        let focus = bus.context().focused;
        let [page_area, status_area] =
            Layout::vertical([Constraint::Min(0), Constraint::Length(1)]).areas(frame.area());
        let areas = self.layout.render(frame, page_area);

        let crumbs = crumbs(&self.page, &self.crumb_actions);
        let items = items(&self.page, &self.item_actions);
        self.header.render(
            frame,
            areas.header,
            header_props(&self.page, &crumbs, &items, focus, &self.activation),
        );

        let body = areas.body.inner(ratatui::layout::Margin::new(2, 1));
        let mut rows = Layout::vertical(
            std::iter::repeat(Constraint::Length(1))
                .take(self.labels.len())
                .chain([Constraint::Length(1), Constraint::Length(1)]),
        )
        .split(body)
        .to_vec();
        let button_row = rows.pop().unwrap_or_default();

        for (i, label) in self.labels.iter_mut().enumerate() {
            let description = &self.page.labels[i];
            label.render(
                frame,
                rows[i],
                LabelProps {
                    text: &self.label_texts[i],
                    placeholder: &description.placeholder,
                    color: description.color,
                    action: &self.label_actions[i],
                    is_focused: focus == Some(element(LABEL_BASE, i)),
                    activation: &self.activation,
                },
            );
        }

        let widths: Vec<u16> = self
            .page
            .buttons
            .iter()
            .map(|b| Button::<()>::width(&b.label, b.icon))
            .collect();
        let mut x = button_row.x;
        for (i, button) in self.buttons.iter_mut().enumerate() {
            let description = &self.page.buttons[i];
            let width = widths[i].min(button_row.right().saturating_sub(x));
            button.render(
                frame,
                Rect::new(x, button_row.y, width, 1),
                ButtonProps {
                    label: &description.label,
                    color: description.color,
                    icon: description.icon,
                    action: &self.button_actions[i],
                    payload: &(),
                    is_focused: focus == Some(element(BUTTON_BASE, i)),
                    activation: &self.activation,
                },
            );
            x = x.saturating_add(width + 1);
        }

        self.ripple.render(frame, areas.body, RippleProps { color: ColorName::Teal });

        frame.render_widget(
            Paragraph::new(self.status.as_str())
                .style(Style::default().fg(get_color(ColorName::Gray, 400))),
            status_area,
        );

        self.header.register(bus, None);
        self.ripple.register(bus, None);
        for label in &self.labels {
            label.register(bus, Some(RIPPLE_ID));
        }
        for button in &self.buttons {
            button.register(bus, Some(RIPPLE_ID));
        }
    }

    fn handle_event(&mut self, event: &mut Event, bus: &mut EventBus) -> EventOutcome {
        if let EventKind::Key(key) = &event.kind {
            if matches!(key.code, KeyCode::Tab | KeyCode::BackTab) && !self.is_editing() {
                let order = self.focus_order();
                bus.cycle_focus(&order, key.code == KeyCode::Tab);
                return EventOutcome::handled();
            }
        }

        let is_tick = matches!(event.kind, EventKind::Tick);
        let focus = event.context.focused;

        let crumbs = crumbs(&self.page, &self.crumb_actions);
        let items = items(&self.page, &self.item_actions);
        let mut outcome = self.header.handle_event(
            event,
            header_props(&self.page, &crumbs, &items, focus, &self.activation),
        );

        for (i, label) in self.labels.iter_mut().enumerate() {
            if outcome.handled && !is_tick {
                break;
            }
            let description = &self.page.labels[i];
            outcome = outcome.merge(label.handle_event(
                event,
                LabelProps {
                    text: &self.label_texts[i],
                    placeholder: &description.placeholder,
                    color: description.color,
                    action: &self.label_actions[i],
                    is_focused: focus == Some(element(LABEL_BASE, i)),
                    activation: &self.activation,
                },
            ));
        }

        for (i, button) in self.buttons.iter_mut().enumerate() {
            if outcome.handled && !is_tick {
                break;
            }
            let description = &self.page.buttons[i];
            outcome = outcome.merge(button.handle_event(
                event,
                ButtonProps {
                    label: &description.label,
                    color: description.color,
                    icon: description.icon,
                    action: &self.button_actions[i],
                    payload: &(),
                    is_focused: focus == Some(element(BUTTON_BASE, i)),
                    activation: &self.activation,
                },
            ));
        }

        outcome = outcome.merge(
            self.ripple
                .handle_event(event, RippleProps { color: ColorName::Teal }),
        );

        for (id, area) in event.ancestor_path() {
            if id == RIPPLE_ID && bubble_through(event, &mut [(area, &mut self.ripple)]) > 0 {
                outcome = outcome.with_render();
            }
        }
        outcome
    }

    fn settled(&mut self, settlement: &Settlement) {
        let action = settlement.action();
        self.status = match settlement.outcome() {
            Ok(()) => format!("✓ {action}"),
            Err(error) => format!("✗ {action}: {error}"),
        };

        if settlement.outcome().is_err() {
            return;
        }
        for (i, handle) in self.label_actions.iter().enumerate() {
            if handle.key().map(ActionKey::id) != Some(action) {
                continue;
            }
            if let Some(text) = self.accepted.get(action).and_then(|v| v.as_str().map(str::to_owned)) {
                self.label_texts[i] = text;
            }
        }
    }
}
