//! Fixed palette, icon glyphs and control styling

use bitflags::bitflags;
use ratatui::style::{Color, Modifier, Style};
use serde::{Deserialize, Serialize};
use tui_relay_core::ActionHandle;

/// Named palette colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorName {
    #[default]
    Gray,
    Red,
    Orange,
    Yellow,
    Green,
    Teal,
    Blue,
    Indigo,
    Purple,
    Pink,
}

impl ColorName {
    fn base(self) -> (u8, u8, u8) {
        match self {
            ColorName::Gray => (107, 114, 128),
            ColorName::Red => (239, 68, 68),
            ColorName::Orange => (249, 115, 22),
            ColorName::Yellow => (234, 179, 8),
            ColorName::Green => (34, 197, 94),
            ColorName::Teal => (20, 184, 166),
            ColorName::Blue => (59, 130, 246),
            ColorName::Indigo => (99, 102, 241),
            ColorName::Purple => (168, 85, 247),
            ColorName::Pink => (236, 72, 153),
        }
    }
}

/// Lightness step, 50 (lightest) to 950 (darkest); 500 is the base color.
pub type Shade = u16;

fn mix(channel: u8, target: u8, t: f32) -> u8 {
    let c = channel as f32;
    (c + (target as f32 - c) * t).round() as u8
}

/// Resolve a palette color at a shade.
///
/// Shades are clamped to 50..=950. Lighter shades blend toward white,
/// darker ones toward black.
pub fn get_color(name: ColorName, shade: Shade) -> Color {
    let shade = shade.clamp(50, 950);
    let (r, g, b) = name.base();
    let (target, t) = if shade < 500 {
        (255, (500 - shade) as f32 / 500.0 * 0.9)
    } else {
        (0, (shade - 500) as f32 / 500.0 * 0.8)
    };
    Color::Rgb(mix(r, target, t), mix(g, target, t), mix(b, target, t))
}

/// Icons available to buttons and header items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Icon {
    Plus,
    Close,
    Check,
    Refresh,
    Trash,
    Edit,
    Home,
    Back,
    Forward,
    Star,
    Play,
    Stop,
    Save,
    #[serde(other)]
    Unknown,
}

impl Icon {
    /// Single-column glyph for the icon.
    pub fn glyph(self) -> char {
        match self {
            Icon::Plus => '+',
            Icon::Close => '×',
            Icon::Check => '✓',
            Icon::Refresh => '↻',
            Icon::Trash => '✗',
            Icon::Edit => '✎',
            Icon::Home => '⌂',
            Icon::Back => '←',
            Icon::Forward => '→',
            Icon::Star => '★',
            Icon::Play => '▶',
            Icon::Stop => '■',
            Icon::Save => '↓',
            Icon::Unknown => '•',
        }
    }
}

/// Braille spinner frames shown while an action is in flight.
pub const SPINNER_FRAMES: [char; 8] = ['⣾', '⣽', '⣻', '⢿', '⡿', '⣟', '⣯', '⣷'];

bitflags! {
    /// Visual state of an interactive control.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ControlState: u8 {
        const FOCUSED = 1 << 0;
        const LOADING = 1 << 1;
        const DISABLED = 1 << 2;
        const ERROR = 1 << 3;
    }
}

impl ControlState {
    /// State of a control bound through `handle`.
    pub fn of<T>(handle: &ActionHandle<T>, focused: bool) -> Self {
        let state = handle.state();
        let mut flags = ControlState::empty();
        flags.set(ControlState::FOCUSED, focused);
        flags.set(ControlState::LOADING, state.is_loading());
        flags.set(ControlState::DISABLED, !handle.is_bound() || state.is_loading());
        flags.set(ControlState::ERROR, state.last_error.is_some());
        flags
    }
}

/// Style for a control drawn in `color` in the given state.
pub fn control_style(color: ColorName, state: ControlState) -> Style {
    if state.contains(ControlState::LOADING) {
        return Style::default()
            .fg(get_color(color, 200))
            .bg(get_color(color, 800));
    }
    if state.contains(ControlState::DISABLED) {
        return Style::default()
            .fg(get_color(ColorName::Gray, 500))
            .add_modifier(Modifier::DIM);
    }

    let mut style = Style::default()
        .fg(get_color(color, 50))
        .bg(get_color(color, 600));
    if state.contains(ControlState::ERROR) {
        style = style.bg(get_color(ColorName::Red, 700));
    }
    if state.contains(ControlState::FOCUSED) {
        style = style
            .bg(get_color(color, 400))
            .add_modifier(Modifier::BOLD);
    }
    style
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rgb(c: Color) -> (u8, u8, u8) {
        match c {
            Color::Rgb(r, g, b) => (r, g, b),
            other => panic!("expected rgb, got {other:?}"),
        }
    }

    #[test]
    fn base_shade_is_identity() {
        assert_eq!(get_color(ColorName::Blue, 500), Color::Rgb(59, 130, 246));
    }

    #[test]
    fn shades_get_lighter_and_darker() {
        let light = rgb(get_color(ColorName::Green, 100));
        let base = rgb(get_color(ColorName::Green, 500));
        let dark = rgb(get_color(ColorName::Green, 900));
        assert!(light.0 >= base.0 && light.1 >= base.1 && light.2 >= base.2);
        assert!(dark.0 <= base.0 && dark.1 <= base.1 && dark.2 <= base.2);
        assert_eq!(get_color(ColorName::Red, 0), get_color(ColorName::Red, 50));
        assert_eq!(get_color(ColorName::Red, 5000), get_color(ColorName::Red, 950));
    }

    #[test]
    fn unknown_icons_deserialize() {
        let icon: Icon = serde_json::from_str("\"refresh\"").unwrap();
        assert_eq!(icon.glyph(), '↻');
        let icon: Icon = serde_json::from_str("\"rocket\"").unwrap();
        assert_eq!(icon, Icon::Unknown);
    }

    #[test]
    fn disabled_wins_over_focus() {
        let style = control_style(
            ColorName::Blue,
            ControlState::DISABLED | ControlState::FOCUSED,
        );
        assert!(style.add_modifier.contains(Modifier::DIM));
        assert!(!style.add_modifier.contains(Modifier::BOLD));
    }
}
