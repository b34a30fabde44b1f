//! Centering helpers: a centered box, and a header-over-centered-body page

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    style::Color,
    widgets::Widget,
    Frame,
};

use crate::color::{get_color, ColorName};

/// Calculate a centered rectangle within an area, keeping a one-cell margin.
pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width.saturating_sub(2));
    let height = height.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

/// Fills an area with a background color
struct BgFill(Color);

impl Widget for BgFill {
    fn render(self, area: Rect, buf: &mut Buffer) {
        for y in area.top()..area.bottom() {
            for x in area.left()..area.right() {
                buf[(x, y)].set_bg(self.0).set_symbol(" ");
            }
        }
    }
}

/// A fixed-size box centered in whatever area it is given.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Center {
    pub width: u16,
    pub height: u16,
    /// Background fill for the box.
    pub background: Option<ColorName>,
}

impl Center {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            background: None,
        }
    }

    pub fn with_background(mut self, color: ColorName) -> Self {
        self.background = Some(color);
        self
    }

    /// Where the box lands inside `outer`.
    pub fn area(&self, outer: Rect) -> Rect {
        centered_rect(self.width, self.height, outer)
    }

    /// Paint the box background and return its area for content.
    pub fn render(&self, frame: &mut Frame, outer: Rect) -> Rect {
        let inner = self.area(outer);
        if let Some(color) = self.background {
            frame.render_widget(BgFill(get_color(color, 900)), inner);
        }
        inner
    }
}

/// Areas produced by [`CenterLayout::split`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CenterAreas {
    pub header: Rect,
    pub body: Rect,
}

/// A page with a full-width header above a centered body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CenterLayout {
    pub header_height: u16,
    pub body: Center,
}

impl CenterLayout {
    pub fn new(header_height: u16, body: Center) -> Self {
        Self {
            header_height,
            body,
        }
    }

    pub fn split(&self, area: Rect) -> CenterAreas {
        let [header, rest] =
            Layout::vertical([Constraint::Length(self.header_height), Constraint::Min(0)])
                .areas(area);
        CenterAreas {
            header,
            body: self.body.area(rest),
        }
    }

    /// Split `area` and paint the body background.
    pub fn render(&self, frame: &mut Frame, area: Rect) -> CenterAreas {
        let areas = self.split(area);
        if let Some(color) = self.body.background {
            frame.render_widget(BgFill(get_color(color, 900)), areas.body);
        }
        areas
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::widgets::Paragraph;
    use tui_relay_core::testing::RenderHarness;

    #[test]
    fn test_centered_rect() {
        let centered = centered_rect(40, 10, Rect::new(0, 0, 80, 24));
        assert_eq!(centered, Rect::new(20, 7, 40, 10));
    }

    #[test]
    fn test_centered_rect_clamps_to_area() {
        let centered = centered_rect(100, 50, Rect::new(0, 0, 30, 10));
        assert_eq!((centered.width, centered.height), (28, 8));
    }

    #[test]
    fn layout_puts_body_below_header() {
        let layout = CenterLayout::new(3, Center::new(20, 4));
        let areas = layout.split(Rect::new(0, 0, 60, 23));
        assert_eq!(areas.header, Rect::new(0, 0, 60, 3));
        assert_eq!(areas.body, Rect::new(20, 11, 20, 4));
    }

    #[test]
    fn center_renders_content_in_the_middle() {
        let mut harness = RenderHarness::new(20, 5);
        let text = harness.render_to_string_plain(|frame| {
            let inner = Center::new(6, 1)
                .with_background(ColorName::Indigo)
                .render(frame, frame.area());
            frame.render_widget(Paragraph::new("middle"), inner);
        });
        assert_eq!(text.lines().nth(2), Some("       middle"));
    }
}
