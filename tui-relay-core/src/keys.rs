//! Key chord parsing and activation-key matching

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyEventState, KeyModifiers};

/// Parse a key chord such as `"enter"`, `"space"`, `"ctrl+s"` or `"f5"`.
///
/// Returns `None` for empty strings, unknown key names and unknown
/// modifiers.
pub fn parse_key_string(key_str: &str) -> Option<KeyEvent> {
    let key_str = key_str.trim().to_lowercase();
    if key_str.is_empty() {
        return None;
    }

    let mut parts: Vec<&str> = key_str.split('+').map(str::trim).collect();
    // "ctrl++" names the plus key itself
    if key_str.ends_with("++") {
        parts.truncate(parts.len().saturating_sub(2));
        parts.push("+");
    }
    let key_part = parts.pop()?;

    let mut modifiers = KeyModifiers::empty();
    for part in parts {
        modifiers |= match part {
            "ctrl" | "control" => KeyModifiers::CONTROL,
            "shift" => KeyModifiers::SHIFT,
            "alt" | "meta" => KeyModifiers::ALT,
            _ => return None,
        };
    }

    let code = match key_part {
        "esc" | "escape" => KeyCode::Esc,
        "enter" | "return" => KeyCode::Enter,
        "space" => KeyCode::Char(' '),
        "tab" if modifiers.contains(KeyModifiers::SHIFT) => KeyCode::BackTab,
        "tab" => KeyCode::Tab,
        "backtab" => {
            modifiers |= KeyModifiers::SHIFT;
            KeyCode::BackTab
        }
        "backspace" => KeyCode::Backspace,
        "delete" | "del" => KeyCode::Delete,
        "up" => KeyCode::Up,
        "down" => KeyCode::Down,
        "left" => KeyCode::Left,
        "right" => KeyCode::Right,
        "home" => KeyCode::Home,
        "end" => KeyCode::End,
        f if f.len() > 1 && f.starts_with('f') => {
            let n: u8 = f[1..].parse().ok()?;
            if !(1..=12).contains(&n) {
                return None;
            }
            KeyCode::F(n)
        }
        c => {
            let mut chars = c.chars();
            let ch = chars.next()?;
            if chars.next().is_some() {
                return None;
            }
            KeyCode::Char(ch)
        }
    };

    Some(KeyEvent {
        code,
        modifiers,
        kind: KeyEventKind::Press,
        state: KeyEventState::empty(),
    })
}

/// Short human label for a key chord (`"ctrl+s"` -> `"^S"`).
pub fn format_key_for_display(key_str: &str) -> String {
    match parse_key_string(key_str) {
        Some(key) => chord_label(&key),
        None => key_str.to_string(),
    }
}

fn chord_label(key: &KeyEvent) -> String {
    let mut label = String::new();
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        label.push('^');
    }
    if key.modifiers.contains(KeyModifiers::ALT) {
        label.push_str("Alt+");
    }
    if key.modifiers.contains(KeyModifiers::SHIFT) && key.code != KeyCode::BackTab {
        label.push_str("Shift+");
    }

    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char(' ') => label.push_str("Space"),
        KeyCode::Char(c) if ctrl => label.extend(c.to_uppercase()),
        KeyCode::Char(c) => label.push(c),
        KeyCode::Enter => label.push_str("Enter"),
        KeyCode::Esc => label.push_str("Esc"),
        KeyCode::Tab => label.push_str("Tab"),
        KeyCode::BackTab => label.push_str("Shift+Tab"),
        KeyCode::F(n) => label.push_str(&format!("F{n}")),
        other => label.push_str(&format!("{other:?}")),
    }
    label
}

/// Whether two key events name the same chord, ignoring kind and state.
///
/// Shift is ignored for character keys, since terminals report it
/// inconsistently for shifted characters.
pub fn same_chord(a: &KeyEvent, b: &KeyEvent) -> bool {
    if a.code != b.code {
        return false;
    }
    match a.code {
        KeyCode::Char(_) => {
            let mask = KeyModifiers::CONTROL | KeyModifiers::ALT;
            (a.modifiers & mask) == (b.modifiers & mask)
        }
        _ => a.modifiers == b.modifiers,
    }
}

/// The set of chords that activate a focused control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivationKeys {
    chords: Vec<KeyEvent>,
}

impl Default for ActivationKeys {
    fn default() -> Self {
        Self {
            chords: vec![
                KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE),
                KeyEvent::new(KeyCode::Char(' '), KeyModifiers::NONE),
            ],
        }
    }
}

impl ActivationKeys {
    /// Build from chord strings, failing on the first that does not parse.
    pub fn parse<S: AsRef<str>>(keys: &[S]) -> Result<Self, crate::error::ConfigError> {
        let chords = keys
            .iter()
            .map(|k| {
                parse_key_string(k.as_ref())
                    .ok_or_else(|| crate::error::ConfigError::InvalidKey(k.as_ref().to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { chords })
    }

    /// Whether `key` is one of the activation chords.
    pub fn matches(&self, key: &KeyEvent) -> bool {
        key.kind != KeyEventKind::Release && self.chords.iter().any(|c| same_chord(c, key))
    }

    /// Chords as a hint for the user, e.g. `"Enter/Space"`.
    pub fn display(&self) -> String {
        self.chords
            .iter()
            .map(chord_label)
            .collect::<Vec<_>>()
            .join("/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_and_modified_keys() {
        let k = parse_key_string("q").unwrap();
        assert_eq!(k.code, KeyCode::Char('q'));
        assert!(k.modifiers.is_empty());

        let k = parse_key_string("Ctrl+S").unwrap();
        assert_eq!(k.code, KeyCode::Char('s'));
        assert!(k.modifiers.contains(KeyModifiers::CONTROL));

        assert_eq!(parse_key_string("space").unwrap().code, KeyCode::Char(' '));
        assert_eq!(parse_key_string("shift+tab").unwrap().code, KeyCode::BackTab);
        assert_eq!(parse_key_string("f12").unwrap().code, KeyCode::F(12));
        assert_eq!(parse_key_string("ctrl++").unwrap().code, KeyCode::Char('+'));
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_key_string("").is_none());
        assert!(parse_key_string("hyper+x").is_none());
        assert!(parse_key_string("f13").is_none());
        assert!(parse_key_string("nope").is_none());
    }

    #[test]
    fn display_labels() {
        assert_eq!(format_key_for_display("ctrl+s"), "^S");
        assert_eq!(format_key_for_display("space"), "Space");
        assert_eq!(format_key_for_display("enter"), "Enter");
        assert_eq!(format_key_for_display("???"), "???");
        assert_eq!(ActivationKeys::default().display(), "Enter/Space");
        assert_eq!(
            ActivationKeys::parse(&["ctrl+s", "f2"]).unwrap().display(),
            "^S/F2"
        );
    }

    #[test]
    fn activation_matching() {
        let keys = ActivationKeys::default();
        assert!(keys.matches(&KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE)));
        assert!(!keys.matches(&KeyEvent::new(KeyCode::Char('x'), KeyModifiers::NONE)));

        let keys = ActivationKeys::parse(&["ctrl+s"]).unwrap();
        assert!(keys.matches(&parse_key_string("ctrl+s").unwrap()));
        assert!(!keys.matches(&KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE)));

        assert!(ActivationKeys::parse(&["enter", "bogus"]).is_err());
    }
}
