//! Keyboard routing - egui key presses to editor hotkeys.

use eframe::egui;
use log::trace;

use crate::app::CuelineApp;

impl CuelineApp {
    /// Forward this frame's key presses to the editor.
    ///
    /// Text fields keep their keys; the editor's focus guard still lets
    /// Escape through so forms can be cancelled mid-typing.
    pub fn handle_keyboard_input(&mut self, ctx: &egui::Context) {
        self.editor.set_text_focus(ctx.wants_keyboard_input());

        let presses: Vec<(egui::Key, egui::Modifiers)> = ctx.input(|i| {
            i.events
                .iter()
                .filter_map(|event| match event {
                    egui::Event::Key {
                        key,
                        pressed: true,
                        modifiers,
                        ..
                    } => Some((*key, *modifiers)),
                    _ => None,
                })
                .collect()
        });

        for (key, modifiers) in presses {
            let name = key_name(key);
            if let Some(cmd) = self
                .editor
                .handle_key(&name, modifiers.command, modifiers.shift, modifiers.alt)
            {
                trace!("Key {} handled as {:?}", name, cmd);
            }
        }
    }
}

/// Hotkey table name for an egui key.
pub(crate) fn key_name(key: egui::Key) -> String {
    format!("{:?}", key)
}
