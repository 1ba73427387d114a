//! Key chord translation for the find panel.
//!
//! Chords are written Emacs-style: `C-f`, `M-x`, `S-F3`, `C-S-r`, `Enter`.
//! The presentation layer turns whatever key events it has into a
//! [`KeyChord`] and asks [`Keybindings::translate`] for a [`FindCommand`].

use crate::find::FindCommand;
use std::collections::HashMap;
use std::fmt;

const MAX_CHORDS_PER_ACTION: usize = 8;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    Char(char),
    Enter,
    Esc,
    Tab,
    F(u8),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct KeyChord {
    pub key: Key,
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
}

impl KeyChord {
    pub fn plain(key: Key) -> Self {
        KeyChord {
            key,
            ctrl: false,
            alt: false,
            shift: false,
        }
    }

    pub fn ctrl(key: Key) -> Self {
        KeyChord {
            ctrl: true,
            ..Self::plain(key)
        }
    }

    pub fn shift(key: Key) -> Self {
        KeyChord {
            shift: true,
            ..Self::plain(key)
        }
    }

    /// Parse a chord such as `C-f`, `S-F3`, `ctrl-shift-r` or `Enter`.
    ///
    /// Letters are case-folded; an upper-case letter does not imply shift.
    pub fn parse(input: &str) -> Result<KeyChord, String> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err("empty key".to_string());
        }
        if let Some(ch) = parse_single_char(trimmed) {
            return Ok(KeyChord::plain(Key::Char(ch.to_ascii_lowercase())));
        }

        let (modifiers, key_part) = if let Some(mod_str) = trimmed.strip_suffix("--") {
            if mod_str.is_empty() {
                return Err("missing modifier before '-'".to_string());
            }
            (mod_str, "-")
        } else {
            match trimmed.rsplit_once('-') {
                Some((mod_str, key_part)) => (mod_str, key_part),
                None => ("", trimmed),
            }
        };

        let mut chord = KeyChord::plain(parse_key(key_part)?);
        if !modifiers.is_empty() {
            for part in modifiers.split('-') {
                let raw = part.trim();
                let flag = match raw.to_ascii_lowercase().as_str() {
                    "c" | "ctrl" | "control" => &mut chord.ctrl,
                    "m" | "alt" | "meta" => &mut chord.alt,
                    "s" | "shift" => &mut chord.shift,
                    "" => return Err("empty modifier segment".to_string()),
                    _ => return Err(format!("unknown modifier '{}'", raw)),
                };
                if *flag {
                    return Err(format!("duplicate modifier '{}'", raw));
                }
                *flag = true;
            }
        }
        Ok(chord)
    }
}

fn parse_single_char(input: &str) -> Option<char> {
    let mut chars = input.chars();
    let ch = chars.next()?;
    chars.next().is_none().then_some(ch)
}

fn parse_key(input: &str) -> Result<Key, String> {
    let trimmed = input.trim();
    if let Some(ch) = parse_single_char(trimmed) {
        return Ok(Key::Char(ch.to_ascii_lowercase()));
    }
    let norm = trimmed.to_ascii_lowercase();
    match norm.as_str() {
        "enter" | "ret" | "return" => Ok(Key::Enter),
        "esc" | "escape" => Ok(Key::Esc),
        "tab" => Ok(Key::Tab),
        "space" | "spc" => Ok(Key::Char(' ')),
        _ => match norm.strip_prefix('f').and_then(|n| n.parse::<u8>().ok()) {
            Some(n @ 1..=24) => Ok(Key::F(n)),
            _ => Err(format!("unknown key '{}'", input)),
        },
    }
}

impl fmt::Display for KeyChord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ctrl {
            write!(f, "C-")?;
        }
        if self.alt {
            write!(f, "M-")?;
        }
        if self.shift {
            write!(f, "S-")?;
        }
        match self.key {
            Key::Char(' ') => write!(f, "Space"),
            Key::Char(c) => write!(f, "{}", c),
            Key::Enter => write!(f, "Enter"),
            Key::Esc => write!(f, "Esc"),
            Key::Tab => write!(f, "Tab"),
            Key::F(n) => write!(f, "F{}", n),
        }
    }
}

/// Find panel actions a key can be bound to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FindAction {
    Toggle,
    Next,
    Previous,
    ReplaceCurrent,
    ReplaceAll,
}

impl FindAction {
    pub const ALL: [FindAction; 5] = [
        FindAction::Toggle,
        FindAction::Next,
        FindAction::Previous,
        FindAction::ReplaceCurrent,
        FindAction::ReplaceAll,
    ];

    pub fn name(self) -> &'static str {
        match self {
            FindAction::Toggle => "toggle-find",
            FindAction::Next => "find-next",
            FindAction::Previous => "find-previous",
            FindAction::ReplaceCurrent => "replace-current",
            FindAction::ReplaceAll => "replace-all",
        }
    }

    /// Accepts the hyphenated names and their underscore spellings.
    pub fn from_name(input: &str) -> Option<FindAction> {
        let norm = input.trim().to_ascii_lowercase().replace('_', "-");
        FindAction::ALL.into_iter().find(|action| action.name() == norm)
    }

    pub fn into_command(self) -> FindCommand {
        match self {
            FindAction::Toggle => FindCommand::ToggleVisibility,
            FindAction::Next => FindCommand::Next,
            FindAction::Previous => FindCommand::Previous,
            FindAction::ReplaceCurrent => FindCommand::ReplaceCurrent,
            FindAction::ReplaceAll => FindCommand::ReplaceAll,
        }
    }
}

/// Chord to action table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Keybindings {
    bindings: HashMap<KeyChord, FindAction>,
}

impl Default for Keybindings {
    fn default() -> Self {
        let bindings = [
            (KeyChord::ctrl(Key::Char('f')), FindAction::Toggle),
            (KeyChord::plain(Key::F(3)), FindAction::Next),
            (KeyChord::plain(Key::Enter), FindAction::Next),
            (KeyChord::shift(Key::F(3)), FindAction::Previous),
            (KeyChord::ctrl(Key::Char('r')), FindAction::ReplaceCurrent),
            (
                KeyChord {
                    shift: true,
                    ..KeyChord::ctrl(Key::Char('r'))
                },
                FindAction::ReplaceAll,
            ),
        ]
        .into_iter()
        .collect();
        Keybindings { bindings }
    }
}

impl Keybindings {
    /// Build from a config table of action name to chords (whitespace
    /// separated). Each configured action replaces the default chords for
    /// that action; malformed entries are skipped with a warning.
    pub fn from_map(raw: &HashMap<String, String>) -> (Keybindings, Vec<String>) {
        let mut keybindings = Keybindings::default();
        let mut warnings: Vec<String> = Vec::new();

        // Sorted so warnings and overrides are deterministic
        let mut entries: Vec<(&String, &String)> = raw.iter().collect();
        entries.sort();

        for (action_str, chords_str) in entries {
            let Some(action) = FindAction::from_name(action_str) else {
                warnings.push(format!("Invalid action '{}' in [keys]", action_str));
                continue;
            };
            let chords: Vec<&str> = chords_str.split_whitespace().collect();
            if chords.is_empty() {
                warnings.push(format!("No key given for '{}'", action.name()));
                continue;
            }
            if chords.len() > MAX_CHORDS_PER_ACTION {
                warnings.push(format!(
                    "Too many keys for '{}': {} (max {})",
                    action.name(),
                    chords.len(),
                    MAX_CHORDS_PER_ACTION
                ));
                continue;
            }

            let mut parsed = Vec::with_capacity(chords.len());
            for chord_str in chords {
                match KeyChord::parse(chord_str) {
                    Ok(chord) => parsed.push(chord),
                    Err(err) => warnings.push(format!(
                        "Invalid key '{}' for '{}': {}",
                        chord_str,
                        action.name(),
                        err
                    )),
                }
            }
            if parsed.is_empty() {
                continue;
            }

            keybindings.bindings.retain(|_, bound| *bound != action);
            for chord in parsed {
                if let Some(previous) = keybindings.bindings.insert(chord, action)
                    && previous != action
                {
                    warnings.push(format!(
                        "Key '{}' rebound from '{}' to '{}'",
                        chord,
                        previous.name(),
                        action.name()
                    ));
                }
            }
        }

        for warning in &warnings {
            tracing::warn!("{}", warning);
        }
        (keybindings, warnings)
    }

    pub fn action_for(&self, chord: &KeyChord) -> Option<FindAction> {
        self.bindings.get(chord).copied()
    }

    /// Translate a chord into a find command. Unbound chords yield `None`.
    pub fn translate(&self, chord: &KeyChord) -> Option<FindCommand> {
        self.action_for(chord).map(FindAction::into_command)
    }

    /// Chords bound to an action, in display order.
    pub fn chords_for(&self, action: FindAction) -> Vec<KeyChord> {
        let mut chords: Vec<KeyChord> = self
            .bindings
            .iter()
            .filter(|(_, bound)| **bound == action)
            .map(|(chord, _)| *chord)
            .collect();
        chords.sort_by_key(|chord| chord.to_string());
        chords
    }
}
