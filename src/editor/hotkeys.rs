//! Keyboard shortcuts: one table `(key, mode) -> command`.
//!
//! Keys are egui key names (`format!("{:?}", egui::Key)`), optionally prefixed
//! with `Ctrl+` / `Shift+` / `Alt+`. The text-focus guard runs before lookup:
//! while a text field has focus only `Escape` gets through.

use super::selection::ModeClass;
use std::collections::HashMap;

/// Step for the arrow-key seek, seconds.
pub const SEEK_STEP: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EditorCommand {
    Cancel,
    RequestDelete,
    ConfirmDelete,
    TogglePlay,
    AddAtPlayhead,
    EditSelected,
    ZoomIn,
    ZoomOut,
    ResetZoom,
    SeekBy(f64),
}

pub struct HotkeyHandler {
    bindings: HashMap<(ModeClass, String), EditorCommand>,
}

impl Default for HotkeyHandler {
    fn default() -> Self {
        let mut h = Self::new();
        h.setup_default_bindings();
        h
    }
}

impl HotkeyHandler {
    /// Empty table.
    pub fn new() -> Self {
        Self {
            bindings: HashMap::new(),
        }
    }

    pub fn add_binding(&mut self, mode: ModeClass, key: &str, command: EditorCommand) {
        self.bindings.insert((mode, key.to_string()), command);
    }

    pub fn setup_default_bindings(&mut self) {
        use EditorCommand::*;
        use ModeClass::*;

        for mode in [Editing, Adding, Confirming] {
            self.add_binding(mode, "Escape", Cancel);
        }
        self.add_binding(Confirming, "Enter", ConfirmDelete);

        self.add_binding(Browsing, "Delete", RequestDelete);
        self.add_binding(Browsing, "Backspace", RequestDelete);
        self.add_binding(Browsing, "Space", TogglePlay);
        self.add_binding(Browsing, "A", AddAtPlayhead);
        self.add_binding(Browsing, "E", EditSelected);
        self.add_binding(Browsing, "Enter", EditSelected);
        self.add_binding(Browsing, "Plus", ZoomIn);
        self.add_binding(Browsing, "Equals", ZoomIn);
        self.add_binding(Browsing, "Minus", ZoomOut);
        self.add_binding(Browsing, "Num0", ResetZoom);
        self.add_binding(Browsing, "ArrowLeft", SeekBy(-SEEK_STEP));
        self.add_binding(Browsing, "ArrowRight", SeekBy(SEEK_STEP));
    }

    /// Look up a bare or combo key for `mode`, honoring the text-focus guard.
    pub fn handle_key(&self, key: &str, mode: ModeClass, text_focus: bool) -> Option<EditorCommand> {
        if text_focus && key != "Escape" {
            return None;
        }
        self.bindings.get(&(mode, key.to_string())).copied()
    }

    /// Combo lookup first, then the bare key when only Shift is held
    /// (`+` arrives as Shift+Plus on most layouts).
    pub fn handle_key_with_modifiers(
        &self,
        key: &str,
        ctrl: bool,
        shift: bool,
        alt: bool,
        mode: ModeClass,
        text_focus: bool,
    ) -> Option<EditorCommand> {
        let mut key_combo = String::new();
        if ctrl {
            key_combo.push_str("Ctrl+");
        }
        if shift {
            key_combo.push_str("Shift+");
        }
        if alt {
            key_combo.push_str("Alt+");
        }
        key_combo.push_str(key);

        if let Some(cmd) = self.handle_key(&key_combo, mode, text_focus) {
            return Some(cmd);
        }
        if !ctrl && !alt {
            return self.handle_key(key, mode, text_focus);
        }
        None
    }
}
