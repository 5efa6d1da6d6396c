//! UI Widgets - egui renderers over editor state
//!
//! Each widget reads state and communicates back via EventBus

pub mod form_ui;
pub mod preview;
pub mod sidebar;
pub mod status;
pub mod timeline;
