//! Editor events.
//!
//! Intents come from widgets (sidebar, form, toolbar) and are applied by
//! `Editor::handle_event`. Notifications are emitted by the editor after the
//! fact; observers subscribe to them.

use super::hotkeys::EditorCommand;
use crate::entities::{Interaction, InteractionId, InteractionKind};
use crate::sync::SyncOp;
use uuid::Uuid;

// === Intents ===

#[derive(Clone, Debug)]
pub struct CommandEvent(pub EditorCommand);

#[derive(Clone, Debug)]
pub struct SelectInteractionEvent(pub InteractionId);

#[derive(Clone, Debug)]
pub struct HoverInteractionEvent(pub Option<InteractionId>);

#[derive(Clone, Debug)]
pub struct EditInteractionEvent(pub InteractionId);

/// Select and ask for delete confirmation.
#[derive(Clone, Debug)]
pub struct DeleteInteractionEvent(pub InteractionId);

#[derive(Clone, Debug)]
pub struct ToggleEnabledEvent(pub InteractionId);

/// Seek the video to an interaction's trigger time.
#[derive(Clone, Debug)]
pub struct JumpToInteractionEvent(pub InteractionId);

#[derive(Clone, Debug)]
pub struct ChooseTypeEvent(pub InteractionKind);

#[derive(Clone, Debug)]
pub struct BackToTypeEvent;

/// Form content changed.
#[derive(Clone, Debug)]
pub struct DraftChangedEvent(pub Box<Interaction>);

#[derive(Clone, Debug)]
pub struct SaveFormEvent;

#[derive(Clone, Debug)]
pub struct ProceedAnywayEvent;

#[derive(Clone, Debug)]
pub struct CancelWarningsEvent;

#[derive(Clone, Debug)]
pub struct CloseFormEvent;

#[derive(Clone, Debug)]
pub struct RetryVideoEvent;

#[derive(Clone, Debug)]
pub struct ReloadInteractionsEvent;

#[derive(Clone, Debug)]
pub struct DismissToastEvent(pub Uuid);

// === Notifications ===

#[derive(Clone, Debug, PartialEq)]
pub struct SeekEvent {
    pub time: f64,
}

/// Local position change during a drag (not yet persisted).
#[derive(Clone, Debug, PartialEq)]
pub struct InteractionMovedEvent {
    pub id: InteractionId,
    pub time: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct InteractionSavedEvent {
    pub id: InteractionId,
    pub op: SyncOp,
}

#[derive(Clone, Debug, PartialEq)]
pub struct InteractionDeletedEvent {
    pub id: InteractionId,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SyncFailedEvent {
    pub op: SyncOp,
    pub id: Option<InteractionId>,
    pub message: String,
    pub rolled_back: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ZoomChangedEvent {
    pub zoom: f64,
    pub viewport_start: f64,
}
