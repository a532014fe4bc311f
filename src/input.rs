use std::collections::VecDeque;

use crate::constants::BRIDGE_KEY;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyEvent {
    pub at_ms: u64,
    pub key: String,
}

pub trait InputSource {
    fn next_event(&mut self) -> Option<KeyEvent>;
}

#[derive(Clone, Debug, Default)]
pub struct ScriptedInput {
    events: VecDeque<KeyEvent>,
}

impl ScriptedInput {
    pub fn new(events: Vec<KeyEvent>) -> Self {
        Self {
            events: events.into(),
        }
    }

    pub fn evenly_spaced<S: AsRef<str>>(keys: &[S], step_ms: u64) -> Self {
        let events = keys
            .iter()
            .enumerate()
            .map(|(idx, raw)| KeyEvent {
                at_ms: (idx as u64 + 1) * step_ms,
                key: normalize_key(raw.as_ref()).unwrap_or_else(|| raw.as_ref().to_string()),
            })
            .collect();
        Self::new(events)
    }

    pub fn remaining(&self) -> usize {
        self.events.len()
    }
}

impl InputSource for ScriptedInput {
    fn next_event(&mut self) -> Option<KeyEvent> {
        self.events.pop_front()
    }
}

pub fn normalize_key(raw: &str) -> Option<String> {
    if raw == " " {
        return Some(BRIDGE_KEY.to_string());
    }
    let trimmed = raw.trim();
    let named = match trimmed.to_ascii_lowercase().as_str() {
        "space" | "spc" | "bridge" => Some(BRIDGE_KEY),
        "enter" | "return" | "ret" => Some("Enter"),
        "backspace" | "bksp" | "bs" => Some("Backspace"),
        "tab" => Some("Tab"),
        "capslock" | "caps" => Some("CapsLock"),
        "shift" | "lshift" | "shiftleft" | "shift_l" => Some("ShiftLeft"),
        "rshift" | "shiftright" | "shift_r" => Some("ShiftRight"),
        _ => None,
    };
    if let Some(name) = named {
        return Some(name.to_string());
    }
    let mut chars = trimmed.chars();
    match (chars.next(), chars.next()) {
        (Some(ch), None) if !ch.is_whitespace() => Some(ch.to_ascii_uppercase().to_string()),
        _ => None,
    }
}
