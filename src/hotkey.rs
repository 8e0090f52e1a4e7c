/// A logical key independent of any windowing backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// Printable character; letters are stored uppercased.
    Char(char),
    Space,
    Tab,
    Enter,
    Escape,
    Backspace,
    Delete,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    F(u8),
}

/// A key press as delivered by the front end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeyEvent {
    pub key: Option<Key>,
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
    pub meta: bool,
    /// The press belongs to an in-progress text composition (IME).
    pub composing: bool,
}

impl KeyEvent {
    pub fn plain(key: Key) -> Self {
        Self {
            key: Some(key),
            ..Self::default()
        }
    }

    pub fn with_ctrl(key: Key) -> Self {
        Self {
            key: Some(key),
            ctrl: true,
            ..Self::default()
        }
    }

    pub fn with_meta(key: Key) -> Self {
        Self {
            key: Some(key),
            meta: true,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hotkey {
    pub key: Key,
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
    pub meta: bool,
    /// Either Ctrl or Meta satisfies the modifier (`CmdOrCtrl`).
    pub primary: bool,
}

impl Default for Hotkey {
    fn default() -> Self {
        Self {
            key: Key::Char('K'),
            ctrl: false,
            shift: false,
            alt: false,
            meta: false,
            primary: true,
        }
    }
}

impl Hotkey {
    /// Whether `event` triggers this hotkey. Composition events never do.
    pub fn matches(&self, event: &KeyEvent) -> bool {
        if event.composing {
            return false;
        }
        let Some(key) = event.key else {
            return false;
        };
        if key != self.key || event.shift != self.shift || event.alt != self.alt {
            return false;
        }
        if self.primary {
            event.ctrl || event.meta
        } else {
            event.ctrl == self.ctrl && event.meta == self.meta
        }
    }
}

/// Parse a hotkey string like "CmdOrCtrl+K" or "Ctrl+Shift+Space".
pub fn parse_hotkey(s: &str) -> Option<Hotkey> {
    let mut ctrl = false;
    let mut shift = false;
    let mut alt = false;
    let mut meta = false;
    let mut primary = false;
    let mut key: Option<Key> = None;

    for part in s.split('+') {
        let upper = part.trim().to_ascii_uppercase();
        match upper.as_str() {
            "CTRL" | "CONTROL" => ctrl = true,
            "SHIFT" => shift = true,
            "ALT" | "OPTION" => alt = true,
            "META" | "CMD" | "COMMAND" | "SUPER" | "WIN" => meta = true,
            "CMDORCTRL" | "COMMANDORCONTROL" | "MOD" => primary = true,
            "" => {}
            _ => {
                if key.is_some() {
                    return None;
                }
                key = Some(parse_key(&upper)?);
            }
        }
    }

    key.map(|key| Hotkey {
        key,
        ctrl,
        shift,
        alt,
        meta,
        primary,
    })
}

pub fn parse_key(upper: &str) -> Option<Key> {
    match upper {
        "SPACE" => Some(Key::Space),
        "TAB" => Some(Key::Tab),
        "ENTER" | "RETURN" => Some(Key::Enter),
        "ESC" | "ESCAPE" => Some(Key::Escape),
        "DELETE" => Some(Key::Delete),
        "BACKSPACE" => Some(Key::Backspace),
        "LEFT" | "LEFTARROW" => Some(Key::ArrowLeft),
        "RIGHT" | "RIGHTARROW" => Some(Key::ArrowRight),
        "UP" | "UPARROW" => Some(Key::ArrowUp),
        "DOWN" | "DOWNARROW" => Some(Key::ArrowDown),
        _ if upper.len() > 1 && upper.starts_with('F') => match upper[1..].parse::<u8>().ok() {
            Some(n @ 1..=12) => Some(Key::F(n)),
            _ => None,
        },
        _ => {
            let mut chars = upper.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) if c.is_ascii_alphanumeric() => Some(Key::Char(c)),
                _ => None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_cmd_or_ctrl_k() {
        assert_eq!(parse_hotkey("CmdOrCtrl+K"), Some(Hotkey::default()));
    }

    #[test]
    fn primary_accepts_ctrl_or_meta() {
        let hk = Hotkey::default();
        assert!(hk.matches(&KeyEvent::with_ctrl(Key::Char('K'))));
        assert!(hk.matches(&KeyEvent::with_meta(Key::Char('K'))));
        assert!(!hk.matches(&KeyEvent::plain(Key::Char('K'))));
    }

    #[test]
    fn explicit_ctrl_rejects_meta() {
        let hk = parse_hotkey("Ctrl+K").unwrap();
        assert!(hk.matches(&KeyEvent::with_ctrl(Key::Char('K'))));
        assert!(!hk.matches(&KeyEvent::with_meta(Key::Char('K'))));
    }
}
