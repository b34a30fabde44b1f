//! Page header: title, breadcrumbs and right-aligned action items

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use tui_relay_core::{
    ActionHandle, ActivationKeys, Component, ElementId, Event, EventBus, EventKind, EventOutcome,
};

use crate::breadcrumbs::{Breadcrumbs, BreadcrumbsProps, Crumb};
use crate::button::{Button, ButtonProps};
use crate::color::{get_color, ColorName, Icon};

/// An action button shown on the right of the header.
#[derive(Clone, Copy)]
pub struct HeaderItem<'a> {
    pub id: ElementId,
    pub label: &'a str,
    pub icon: Option<Icon>,
    pub color: ColorName,
    pub action: &'a ActionHandle<()>,
}

/// Props for Header component
pub struct HeaderProps<'a> {
    pub title: &'a str,
    pub crumbs: &'a [Crumb<'a>],
    pub items: &'a [HeaderItem<'a>],
    pub color: ColorName,
    /// Focused element, compared against the trail and each item.
    pub focus: Option<ElementId>,
    pub activation: &'a ActivationKeys,
}

pub struct Header {
    id: ElementId,
    area: Rect,
    crumbs: Breadcrumbs,
    crumbs_id: ElementId,
    items: Vec<Button<()>>,
}

impl Header {
    /// `crumbs_id` identifies the breadcrumb trail inside the header.
    pub fn new(id: ElementId, crumbs_id: ElementId) -> Self {
        Self {
            id,
            area: Rect::default(),
            crumbs: Breadcrumbs::new(crumbs_id),
            crumbs_id,
            items: Vec::new(),
        }
    }

    pub fn id(&self) -> ElementId {
        self.id
    }

    pub fn area(&self) -> Rect {
        self.area
    }

    /// Focusable elements in tab order: the trail, then each item.
    pub fn focus_order(&self, props: &HeaderProps<'_>) -> Vec<ElementId> {
        let mut order = Vec::new();
        if props.crumbs.iter().any(|c| c.action.is_some()) {
            order.push(self.crumbs_id);
        }
        order.extend(props.items.iter().map(|item| item.id));
        order
    }

    /// Register the header, its trail and its items from the last render.
    pub fn register(&self, bus: &mut EventBus, parent: Option<ElementId>) {
        bus.register(self.id, self.area, parent);
        self.crumbs.register(bus, Some(self.id));
        for item in &self.items {
            item.register(bus, Some(self.id));
        }
    }

    fn sync_items(&mut self, items: &[HeaderItem<'_>]) {
        if self.items.len() == items.len()
            && self.items.iter().zip(items).all(|(b, i)| b.id() == i.id)
        {
            return;
        }
        let mut old = std::mem::take(&mut self.items);
        self.items = items
            .iter()
            .map(|item| match old.iter().position(|b| b.id() == item.id) {
                Some(pos) => old.swap_remove(pos),
                None => Button::new(item.id),
            })
            .collect();
    }
}

fn item_props<'a>(
    item: &HeaderItem<'a>,
    focus: Option<ElementId>,
    activation: &'a ActivationKeys,
) -> ButtonProps<'a, ()> {
    ButtonProps {
        label: item.label,
        color: item.color,
        icon: item.icon,
        action: item.action,
        payload: &(),
        is_focused: focus == Some(item.id),
        activation,
    }
}

impl Component for Header {
    type Props<'a> = HeaderProps<'a>;

    fn handle_event(&mut self, event: &mut Event, props: Self::Props<'_>) -> EventOutcome {
        self.sync_items(props.items);
        let is_tick = matches!(event.kind, EventKind::Tick);

        let mut outcome = self.crumbs.handle_event(
            event,
            BreadcrumbsProps {
                crumbs: props.crumbs,
                color: props.color,
                is_focused: props.focus == Some(self.crumbs_id),
                activation: props.activation,
            },
        );

        for (button, item) in self.items.iter_mut().zip(props.items) {
            if outcome.handled && !is_tick {
                break;
            }
            outcome = outcome.merge(button.handle_event(
                event,
                item_props(item, props.focus, props.activation),
            ));
        }
        outcome
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, props: Self::Props<'_>) {
        self.area = area;
        self.sync_items(props.items);

        let block = Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Style::default().fg(get_color(ColorName::Gray, 700)));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let [top, trail] = Layout::vertical([Constraint::Length(1), Constraint::Length(1)])
            .areas(inner);

        let widths: Vec<u16> = props
            .items
            .iter()
            .map(|item| Button::<()>::width(item.label, item.icon))
            .collect();
        let items_width: u16 = widths.iter().sum::<u16>() + widths.len().saturating_sub(1) as u16;
        let items_width = items_width.min(top.width);

        let title_area = Rect {
            width: top.width.saturating_sub(items_width),
            ..top
        };
        frame.render_widget(
            Paragraph::new(props.title).style(
                Style::default()
                    .fg(get_color(props.color, 200))
                    .add_modifier(Modifier::BOLD),
            ),
            title_area,
        );

        let mut x = top.right().saturating_sub(items_width);
        for ((button, item), width) in self.items.iter_mut().zip(props.items).zip(&widths) {
            let width = (*width).min(top.right().saturating_sub(x));
            let slot = Rect::new(x, top.y, width, top.height);
            button.render(frame, slot, item_props(item, props.focus, props.activation));
            x = x.saturating_add(width + 1);
        }

        self.crumbs.render(
            frame,
            trail,
            BreadcrumbsProps {
                crumbs: props.crumbs,
                color: props.color,
                is_focused: props.focus == Some(self.crumbs_id),
                activation: props.activation,
            },
        );
    }
}
