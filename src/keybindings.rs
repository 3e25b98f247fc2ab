//! Customizable keybindings for the annotation viewer.
//!
//! Keys are matched case-insensitively: `L` and `l` trigger the same action.

use serde::{Deserialize, Serialize};

/// A key as reported by the host window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Key {
    Escape,
    Delete,
    Backspace,
    Enter,
    /// A printable character
    Char(char),
}

impl Key {
    /// Lowercase character keys so matching ignores case.
    pub fn normalized(self) -> Self {
        match self {
            Key::Char(c) => Key::Char(c.to_ascii_lowercase()),
            other => other,
        }
    }
}

/// What a key press does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyAction {
    /// Cancel the active draw/resize, else clear the selection
    Cancel,
    /// Delete the selected box
    DeleteSelected,
    ViewMode,
    DrawMode,
    EditMode,
    /// Ask the host to open the label editor for the selected box
    EditLabel,
}

impl KeyAction {
    /// Get the display name for this action.
    pub fn name(&self) -> &'static str {
        match self {
            KeyAction::Cancel => "Cancel",
            KeyAction::DeleteSelected => "Delete selected",
            KeyAction::ViewMode => "View mode",
            KeyAction::DrawMode => "Draw mode",
            KeyAction::EditMode => "Edit mode",
            KeyAction::EditLabel => "Edit label",
        }
    }

    /// Get all actions.
    pub fn all() -> &'static [KeyAction] {
        &[
            KeyAction::Cancel,
            KeyAction::DeleteSelected,
            KeyAction::ViewMode,
            KeyAction::DrawMode,
            KeyAction::EditMode,
            KeyAction::EditLabel,
        ]
    }
}

/// Keybinding configuration.
///
/// Each action may have several keys; a key should map to one action only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    pub cancel: Vec<Key>,
    pub delete_selected: Vec<Key>,
    pub view_mode: Vec<Key>,
    pub draw_mode: Vec<Key>,
    pub edit_mode: Vec<Key>,
    pub edit_label: Vec<Key>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            cancel: vec![Key::Escape],
            delete_selected: vec![Key::Delete, Key::Backspace],
            view_mode: vec![Key::Char('v')],
            draw_mode: vec![Key::Char('d')],
            edit_mode: vec![Key::Char('e')],
            edit_label: vec![Key::Char('l')],
        }
    }
}

impl KeyBindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keys bound to `action`.
    pub fn keys_for(&self, action: KeyAction) -> &[Key] {
        match action {
            KeyAction::Cancel => &self.cancel,
            KeyAction::DeleteSelected => &self.delete_selected,
            KeyAction::ViewMode => &self.view_mode,
            KeyAction::DrawMode => &self.draw_mode,
            KeyAction::EditMode => &self.edit_mode,
            KeyAction::EditLabel => &self.edit_label,
        }
    }

    fn keys_for_mut(&mut self, action: KeyAction) -> &mut Vec<Key> {
        match action {
            KeyAction::Cancel => &mut self.cancel,
            KeyAction::DeleteSelected => &mut self.delete_selected,
            KeyAction::ViewMode => &mut self.view_mode,
            KeyAction::DrawMode => &mut self.draw_mode,
            KeyAction::EditMode => &mut self.edit_mode,
            KeyAction::EditLabel => &mut self.edit_label,
        }
    }

    /// Get the action that corresponds to a key press, if any.
    pub fn action_for_key(&self, key: Key) -> Option<KeyAction> {
        let key = key.normalized();
        KeyAction::all()
            .iter()
            .copied()
            .find(|action| self.keys_for(*action).iter().any(|k| k.normalized() == key))
    }

    /// Replace the keys of an action.
    pub fn set_keys(&mut self, action: KeyAction, keys: Vec<Key>) {
        *self.keys_for_mut(action) = keys;
    }

    /// Check if a key is already used by another action.
    /// Returns the name of that action, if any.
    pub fn key_conflict(&self, key: Key, exclude: Option<KeyAction>) -> Option<&'static str> {
        let key = key.normalized();
        KeyAction::all()
            .iter()
            .filter(|action| Some(**action) != exclude)
            .find(|action| self.keys_for(**action).iter().any(|k| k.normalized() == key))
            .map(|action| action.name())
    }
}

/// Convert a key to a display string.
pub fn key_to_string(key: Key) -> String {
    match key {
        Key::Escape => "Esc".to_string(),
        Key::Delete => "Delete".to_string(),
        Key::Backspace => "Backspace".to_string(),
        Key::Enter => "Enter".to_string(),
        Key::Char(' ') => "Space".to_string(),
        Key::Char(c) => c.to_ascii_uppercase().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_bindings() {
        let bindings = KeyBindings::new();
        assert_eq!(bindings.action_for_key(Key::Escape), Some(KeyAction::Cancel));
        assert_eq!(bindings.action_for_key(Key::Delete), Some(KeyAction::DeleteSelected));
        assert_eq!(bindings.action_for_key(Key::Backspace), Some(KeyAction::DeleteSelected));
        assert_eq!(bindings.action_for_key(Key::Char('d')), Some(KeyAction::DrawMode));
        assert_eq!(bindings.action_for_key(Key::Char('x')), None);
    }

    #[test]
    fn test_case_insensitive() {
        let bindings = KeyBindings::new();
        assert_eq!(bindings.action_for_key(Key::Char('L')), Some(KeyAction::EditLabel));
        assert_eq!(bindings.action_for_key(Key::Char('l')), Some(KeyAction::EditLabel));
    }

    #[test]
    fn test_rebind_and_conflict() {
        let mut bindings = KeyBindings::new();
        assert_eq!(bindings.key_conflict(Key::Char('E'), None), Some("Edit mode"));
        assert_eq!(bindings.key_conflict(Key::Char('e'), Some(KeyAction::EditMode)), None);

        bindings.set_keys(KeyAction::EditMode, vec![Key::Char('r')]);
        assert_eq!(bindings.action_for_key(Key::Char('e')), None);
        assert_eq!(bindings.action_for_key(Key::Char('r')), Some(KeyAction::EditMode));
    }

    #[test]
    fn test_serde() {
        let json = serde_json::to_string(&Key::Char('v')).unwrap();
        assert_eq!(json, r#"{"char":"v"}"#);
        assert_eq!(serde_json::to_string(&Key::Escape).unwrap(), r#""escape""#);

        let partial: KeyBindings = serde_json::from_str(r#"{"cancel":["enter"]}"#).unwrap();
        assert_eq!(partial.cancel, vec![Key::Enter]);
        assert_eq!(partial.draw_mode, vec![Key::Char('d')]);
    }

    #[test]
    fn test_key_to_string() {
        assert_eq!(key_to_string(Key::Char('l')), "L");
        assert_eq!(key_to_string(Key::Escape), "Esc");
    }
}
