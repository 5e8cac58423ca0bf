use crate::config::KeyBindingConfig;
use crate::internal::navigation::Action;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::collections::HashMap;

/// Which screen a key press arrives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyBindingContext {
    Global,
    TopLevel,
    Topic,
}

/// Maps key events to actions
#[derive(Debug, Clone, Default)]
pub struct KeyBindingMap {
    global: HashMap<KeyEvent, Action>,
    top_level: HashMap<KeyEvent, Action>,
    topic: HashMap<KeyEvent, Action>,
}

impl KeyBindingMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the action for a key event in a specific context.
    /// Context bindings win over global ones.
    pub fn get_action(&self, key: &KeyEvent, context: KeyBindingContext) -> Option<Action> {
        // Incoming events carry kind/state flags that bindings never set
        let key = KeyEvent::new(key.code, key.modifiers);

        if let Some(action) = self.map(context).get(&key) {
            return Some(*action);
        }
        self.global.get(&key).copied()
    }

    pub fn add_binding(&mut self, context: KeyBindingContext, key: KeyEvent, action: Action) {
        self.map_mut(context).insert(key, action);
    }

    /// Merge custom keybindings from configuration. Unparseable keys are skipped.
    pub fn merge_config(&mut self, config: &KeyBindingConfig) {
        let mut merge = |ctx: KeyBindingContext, bindings: &HashMap<String, Action>| {
            for (key_str, action) in bindings {
                if let Some(key_event) = parse_key_str(key_str) {
                    self.add_binding(ctx, key_event, *action);
                } else {
                    tracing::warn!("Invalid key string in config: {}", key_str);
                }
            }
        };

        merge(KeyBindingContext::Global, &config.global);
        merge(KeyBindingContext::TopLevel, &config.top_level);
        merge(KeyBindingContext::Topic, &config.topic);
    }

    fn map(&self, context: KeyBindingContext) -> &HashMap<KeyEvent, Action> {
        match context {
            KeyBindingContext::Global => &self.global,
            KeyBindingContext::TopLevel => &self.top_level,
            KeyBindingContext::Topic => &self.topic,
        }
    }

    fn map_mut(&mut self, context: KeyBindingContext) -> &mut HashMap<KeyEvent, Action> {
        match context {
            KeyBindingContext::Global => &mut self.global,
            KeyBindingContext::TopLevel => &mut self.top_level,
            KeyBindingContext::Topic => &mut self.topic,
        }
    }
}

/// Parse a key string into a KeyEvent
/// Supported formats:
/// - Single char: "j", "k", "1"
/// - Special keys: "Enter", "Space", "Tab", "Esc", "Up", "Down", "Left", "Right", ...
/// - With modifiers: "Ctrl+C", "Alt+x", "Shift+Tab"
///
/// A letter after Ctrl or Alt is matched in lower case unless Shift is also given,
/// since that is what the terminal reports for the chord.
pub fn parse_key_str(key_str: &str) -> Option<KeyEvent> {
    let parts: Vec<&str> = key_str.split('+').collect();
    let (key_part, modifier_parts) = parts.split_last()?;

    let mut modifiers = KeyModifiers::empty();
    for modifier in modifier_parts {
        match modifier.to_lowercase().as_str() {
            "ctrl" => modifiers |= KeyModifiers::CONTROL,
            "shift" => modifiers |= KeyModifiers::SHIFT,
            "alt" => modifiers |= KeyModifiers::ALT,
            _ => return None,
        }
    }

    let code = match *key_part {
        "Enter" => KeyCode::Enter,
        "Space" => KeyCode::Char(' '),
        "Tab" => KeyCode::Tab,
        "Esc" => KeyCode::Esc,
        "Up" => KeyCode::Up,
        "Down" => KeyCode::Down,
        "Left" => KeyCode::Left,
        "Right" => KeyCode::Right,
        "Backspace" => KeyCode::Backspace,
        "Delete" => KeyCode::Delete,
        "Home" => KeyCode::Home,
        "End" => KeyCode::End,
        "PageUp" => KeyCode::PageUp,
        "PageDown" => KeyCode::PageDown,
        s => {
            let mut chars = s.chars();
            let c = chars.next()?;
            if chars.next().is_some() {
                return None;
            }
            let chord = modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT);
            match chord && !modifiers.contains(KeyModifiers::SHIFT) {
                true => KeyCode::Char(c.to_ascii_lowercase()),
                false => KeyCode::Char(c),
            }
        }
    };

    Some(KeyEvent::new(code, modifiers))
}
