//! Tab rendering methods for CuelineApp.
//!
//! Contains render_*_tab methods for each dock panel:
//! - Preview: stand-in video frame with active overlays
//! - Timeline: transport/zoom toolbar, ruler, marker strip, minimap
//! - Interactions: sorted list with row actions
//!
//! Also includes DockTabs wrapper for egui_dock TabViewer.

use eframe::egui;
use egui_dock::TabViewer;

use crate::app::{CuelineApp, DockTab};
use crate::core::playback::VideoHost;
use crate::widgets;

impl CuelineApp {
    /// Render preview tab. Widgets never touch the editor; they dispatch.
    pub fn render_preview_tab(&mut self, ui: &mut egui::Ui) {
        let bus = &self.event_bus;
        widgets::preview::render_preview(
            ui,
            self.editor.list(),
            self.editor.current_time(),
            &self.editor.video.status(),
            |evt| bus.emit_boxed(evt),
        );
    }

    /// Render timeline tab with toolbar on top.
    pub fn render_timeline_tab(&mut self, ui: &mut egui::Ui) {
        let bus = &self.event_bus;
        let config = &self.timeline_config;
        let (view, state) = self.editor.timeline_parts();

        widgets::timeline::render_toolbar(ui, state, &view, |evt| bus.emit_boxed(evt));
        ui.separator();
        let actions = widgets::timeline::render_timeline(ui, &view, config, state, |evt| bus.emit_boxed(evt));
        if actions.hovered {
            ui.ctx().set_cursor_icon(egui::CursorIcon::Crosshair);
        }
    }

    /// Render the interactions list.
    pub fn render_interactions_tab(&mut self, ui: &mut egui::Ui) {
        let bus = &self.event_bus;
        let syncing = self.editor.pipeline().in_flight() > 0;
        widgets::sidebar::render_sidebar(
            ui,
            self.editor.list(),
            self.editor.selection(),
            syncing,
            |evt| bus.emit_boxed(evt),
        );
    }

    /// Windows and overlays drawn above the dock: form, delete prompt, toasts.
    pub fn render_overlays(&mut self, ctx: &egui::Context) {
        let bus = &self.event_bus;
        if let Some(form) = self.editor.form() {
            widgets::form_ui::render_form(ctx, form, self.editor.video_duration(), |evt| bus.emit_boxed(evt));
        }
        widgets::sidebar::render_delete_confirmation(ctx, self.editor.list(), self.editor.selection(), |evt| {
            bus.emit_boxed(evt)
        });
        widgets::status::render_toasts(ctx, self.editor.notifications(), std::time::Instant::now(), |evt| {
            bus.emit_boxed(evt)
        });
    }
}

/// Wrapper for egui_dock TabViewer implementation
pub struct DockTabs<'a> {
    pub app: &'a mut CuelineApp,
}

impl<'a> TabViewer for DockTabs<'a> {
    type Tab = DockTab;

    fn title(&mut self, tab: &mut DockTab) -> egui::WidgetText {
        match tab {
            DockTab::Preview => "Preview".into(),
            DockTab::Timeline => "Timeline".into(),
            DockTab::Interactions => format!("Interactions ({})", self.app.editor.list().len()).into(),
        }
    }

    fn ui(&mut self, ui: &mut egui::Ui, tab: &mut DockTab) {
        match tab {
            DockTab::Preview => self.app.render_preview_tab(ui),
            DockTab::Timeline => self.app.render_timeline_tab(ui),
            DockTab::Interactions => self.app.render_interactions_tab(ui),
        }
    }
}
