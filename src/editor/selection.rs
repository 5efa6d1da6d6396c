//! Selection and editing state machine.
//!
//! ```text
//!            hover            click           double-click / E
//!   idle ----------> hovered ------> selected -----------------> editing
//!     ^                                 |  Delete                   |
//!     |                                 v                           |
//!     +----------- confirming delete <--+        Escape             |
//!     +-------------------------------------------------------------+
//!
//!   adding (choose type -> enter fields) is exclusive with editing.
//! ```
//!
//! Hover is orthogonal: timeline markers and sidebar rows write the same
//! `hovered` id so both views highlight together.

use crate::entities::InteractionId;

/// Two-step add flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddStep {
    ChooseType,
    EnterFields,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum EditorMode {
    #[default]
    Idle,
    Editing(InteractionId),
    Adding(AddStep),
    ConfirmingDelete(InteractionId),
}

/// Coarse mode used as the hotkey table key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModeClass {
    Browsing,
    Editing,
    Adding,
    Confirming,
}

impl EditorMode {
    pub fn class(&self) -> ModeClass {
        match self {
            EditorMode::Idle => ModeClass::Browsing,
            EditorMode::Editing(_) => ModeClass::Editing,
            EditorMode::Adding(_) => ModeClass::Adding,
            EditorMode::ConfirmingDelete(_) => ModeClass::Confirming,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionState {
    pub hovered: Option<InteractionId>,
    pub selected: Option<InteractionId>,
    pub mode: EditorMode,
}

impl SelectionState {
    pub fn mode_class(&self) -> ModeClass {
        self.mode.class()
    }

    /// Any form or confirmation open.
    pub fn is_modal(&self) -> bool {
        self.mode != EditorMode::Idle
    }

    pub fn is_hovered(&self, id: &InteractionId) -> bool {
        self.hovered.as_ref() == Some(id)
    }

    pub fn is_selected(&self, id: &InteractionId) -> bool {
        self.selected.as_ref() == Some(id)
    }

    pub fn editing_id(&self) -> Option<&InteractionId> {
        match &self.mode {
            EditorMode::Editing(id) => Some(id),
            _ => None,
        }
    }

    pub fn hover(&mut self, id: Option<InteractionId>) {
        self.hovered = id;
    }

    /// Plain selection; never opens the form. Ignored while a form or
    /// confirmation is open.
    pub fn select(&mut self, id: InteractionId) -> bool {
        if self.is_modal() {
            return false;
        }
        self.selected = Some(id);
        true
    }

    /// Promote to editing. Any add flow in progress is abandoned.
    pub fn begin_edit(&mut self, id: InteractionId) {
        self.selected = Some(id.clone());
        self.mode = EditorMode::Editing(id);
    }

    /// Start the add flow. Abandons any edit in progress.
    pub fn begin_add(&mut self) {
        self.mode = EditorMode::Adding(AddStep::ChooseType);
    }

    pub fn set_add_step(&mut self, step: AddStep) {
        if matches!(self.mode, EditorMode::Adding(_)) {
            self.mode = EditorMode::Adding(step);
        }
    }

    /// Delete key: only from plain selection.
    pub fn request_delete(&mut self) -> Option<InteractionId> {
        if self.mode != EditorMode::Idle {
            return None;
        }
        let id = self.selected.clone()?;
        self.mode = EditorMode::ConfirmingDelete(id.clone());
        Some(id)
    }

    /// Id awaiting delete confirmation, leaving the confirmation state.
    pub fn take_delete_confirmation(&mut self) -> Option<InteractionId> {
        match std::mem::take(&mut self.mode) {
            EditorMode::ConfirmingDelete(id) => Some(id),
            other => {
                self.mode = other;
                None
            }
        }
    }

    /// Escape: back to idle, selection kept. Returns the mode left.
    pub fn cancel(&mut self) -> EditorMode {
        std::mem::take(&mut self.mode)
    }

    /// Drop every reference to an id that no longer exists.
    pub fn forget(&mut self, id: &InteractionId) {
        if self.hovered.as_ref() == Some(id) {
            self.hovered = None;
        }
        if self.selected.as_ref() == Some(id) {
            self.selected = None;
        }
        let stale = match &self.mode {
            EditorMode::Editing(m) | EditorMode::ConfirmingDelete(m) => m == id,
            _ => false,
        };
        if stale {
            self.mode = EditorMode::Idle;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> InteractionId {
        s.into()
    }

    #[test]
    fn test_select_does_not_edit() {
        let mut s = SelectionState::default();
        s.hover(Some(id("1")));
        assert!(s.select(id("1")));
        assert_eq!(s.mode, EditorMode::Idle);
        s.begin_edit(id("1"));
        assert_eq!(s.mode_class(), ModeClass::Editing);
        // Escape keeps the selection
        assert_eq!(s.cancel(), EditorMode::Editing(id("1")));
        assert_eq!(s.selected, Some(id("1")));
    }

    #[test]
    fn test_delete_only_from_idle_selection() {
        let mut s = SelectionState::default();
        assert!(s.request_delete().is_none());
        s.select(id("2"));
        s.begin_edit(id("2"));
        assert!(s.request_delete().is_none());
        s.cancel();
        assert_eq!(s.request_delete(), Some(id("2")));
        assert_eq!(s.mode_class(), ModeClass::Confirming);
        assert_eq!(s.take_delete_confirmation(), Some(id("2")));
        assert_eq!(s.mode, EditorMode::Idle);
    }

    #[test]
    fn test_add_and_edit_exclusive() {
        let mut s = SelectionState::default();
        s.begin_add();
        s.set_add_step(AddStep::EnterFields);
        assert_eq!(s.mode, EditorMode::Adding(AddStep::EnterFields));
        assert!(!s.select(id("1")));
        s.begin_edit(id("1"));
        assert_eq!(s.mode, EditorMode::Editing(id("1")));
        s.set_add_step(AddStep::ChooseType);
        assert_eq!(s.mode, EditorMode::Editing(id("1")));
    }

    #[test]
    fn test_forget_clears_references() {
        let mut s = SelectionState::default();
        s.hover(Some(id("3")));
        s.begin_edit(id("3"));
        s.forget(&id("3"));
        assert_eq!(s, SelectionState::default());
    }
}
