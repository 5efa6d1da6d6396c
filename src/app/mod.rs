//! Application module - CuelineApp and related functionality.
//!
//! This module organizes the editor shell into focused submodules:
//! - `events` - keyboard translation into editor hotkeys
//! - `tabs` - dock tab rendering and the TabViewer wrapper
//! - `run` - the eframe::App frame loop and persistence

mod events;
mod run;
mod tabs;

pub use tabs::DockTabs;

use crate::config::EditorSettings;
use crate::core::event_bus::EventBus;
use crate::editor::Editor;
use crate::server::StoreServer;
use crate::widgets::status::StatusBar;
use crate::widgets::timeline::TimelineConfig;

use egui_dock::{DockState, NodeIndex};
use log::debug;

/// Dock tab identifiers for the main UI layout.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum DockTab {
    Preview,
    Timeline,
    Interactions,
}

/// UI state that survives restarts (stored under `eframe::APP_KEY`).
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AppLayout {
    pub dock_state: DockState<DockTab>,
    pub follow_playhead: bool,
}

impl Default for AppLayout {
    fn default() -> Self {
        Self {
            dock_state: CuelineApp::default_dock_state(),
            follow_playhead: true,
        }
    }
}

/// Main application state.
pub struct CuelineApp {
    pub(crate) editor: Editor,
    /// Clone of the editor's bus, so widgets can dispatch while the editor is borrowed
    pub(crate) event_bus: EventBus,
    pub(crate) layout: AppLayout,
    pub(crate) timeline_config: TimelineConfig,
    pub(crate) status_bar: StatusBar,
    pub(crate) settings: EditorSettings,
    /// Dev store server, kept alive for the app's lifetime
    _server: Option<StoreServer>,
}

impl CuelineApp {
    pub fn new(editor: Editor, settings: EditorSettings, layout: AppLayout, server: Option<StoreServer>) -> Self {
        let event_bus = editor.bus().clone();
        let mut app = Self {
            editor,
            event_bus,
            layout,
            timeline_config: TimelineConfig::default(),
            status_bar: StatusBar::new(),
            settings,
            _server: server,
        };
        app.editor.timeline.follow_playhead = app.layout.follow_playhead;
        debug!("App created for webinar {}", app.settings.webinar);
        app
    }

    /// Preview on top, timeline below, interactions list on the right.
    pub fn default_dock_state() -> DockState<DockTab> {
        let mut dock_state = DockState::new(vec![DockTab::Preview]);
        let [preview, _timeline] =
            dock_state
                .main_surface_mut()
                .split_below(NodeIndex::root(), 0.6, vec![DockTab::Timeline]);
        let _ = dock_state
            .main_surface_mut()
            .split_right(preview, 0.65, vec![DockTab::Interactions]);
        dock_state
    }

    pub fn editor(&self) -> &Editor {
        &self.editor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_layout_has_all_tabs() {
        let layout = AppLayout::default();
        for tab in [DockTab::Preview, DockTab::Timeline, DockTab::Interactions] {
            assert!(layout.dock_state.find_tab(&tab).is_some(), "{:?}", tab);
        }
        assert!(layout.follow_playhead);
    }

    #[test]
    fn test_layout_survives_json() {
        let json = serde_json::to_string(&AppLayout::default()).unwrap();
        let back: AppLayout = serde_json::from_str(&json).unwrap();
        assert!(back.dock_state.find_tab(&DockTab::Interactions).is_some());
    }
}
