//! Main application loop - eframe::App implementation.
//!
//! Contains the core update() method that runs each frame:
//! - Keyboard routing and event processing
//! - Editor tick (playback clock, debounced moves, store completions)
//! - UI rendering (status bar, dock panels, overlays)
//! - State persistence

use std::time::{Duration, Instant};

use eframe::{egui, glow};
use egui_dock::DockArea;
use log::{debug, info, trace};

use crate::app::{CuelineApp, DockTab, DockTabs};
use crate::core::playback::VideoHost;
use crate::widgets::status::StatusInfo;

impl CuelineApp {
    fn status_info(&self) -> StatusInfo {
        let pipeline = self.editor.pipeline();
        StatusInfo {
            webinar: self.settings.webinar.clone(),
            api_url: self.settings.api_url.clone(),
            count: self.editor.list().len(),
            in_flight: pipeline.in_flight(),
            pending_moves: pipeline.has_pending_moves(),
            zoom: self.editor.timeline.viewport.zoom(),
            playback: self.editor.video.status(),
        }
    }

    /// Reopen tabs the user closed; the editor has no menu to bring them back.
    fn restore_missing_tabs(&mut self) {
        for tab in [DockTab::Preview, DockTab::Timeline, DockTab::Interactions] {
            if self.layout.dock_state.find_tab(&tab).is_none() {
                debug!("Restoring closed tab {:?}", tab);
                self.layout.dock_state.push_to_focused_leaf(tab);
            }
        }
    }

    /// Schedule the next frame: continuous while playing or syncing,
    /// otherwise just in time for the next debounced move.
    fn schedule_repaint(&self, ctx: &egui::Context, now: Instant) {
        let pipeline = self.editor.pipeline();
        if self.editor.video.is_playing() || pipeline.in_flight() > 0 {
            ctx.request_repaint();
        } else if let Some(deadline) = pipeline.next_move_deadline() {
            ctx.request_repaint_after(deadline.saturating_duration_since(now) + Duration::from_millis(1));
        }
    }
}

impl eframe::App for CuelineApp {
    /// Main frame update - called every frame by eframe.
    ///
    /// Flow:
    /// 1. Route key presses (hotkeys become editor commands directly)
    /// 2. Apply intents dispatched by widgets last frame
    /// 3. Tick the editor
    /// 4. Render status bar, dock and overlays
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_keyboard_input(ctx);

        let handled = self.editor.handle_events();
        if handled > 0 {
            trace!("Handled {} UI event(s)", handled);
        }

        let now = Instant::now();
        self.editor.tick(now);

        // Status bar (bottom panel)
        let info = self.status_info();
        self.status_bar.render(ctx, &info);

        egui::CentralPanel::default().show(ctx, |ui| {
            self.restore_missing_tabs();
            let dock_style = egui_dock::Style::from_egui(ctx.style().as_ref());
            let mut dock_state = std::mem::replace(&mut self.layout.dock_state, CuelineApp::default_dock_state());
            {
                let mut tabs = DockTabs { app: self };
                DockArea::new(&mut dock_state).style(dock_style).show_inside(ui, &mut tabs);
            }
            self.layout.dock_state = dock_state;
        });

        self.render_overlays(ctx);

        // Widgets dispatched during rendering; handle them next frame
        if self.event_bus.queue_len() > 0 {
            ctx.request_repaint();
        }
        self.schedule_repaint(ctx, now);
    }

    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        self.layout.follow_playhead = self.editor.timeline.follow_playhead;
        if let Ok(json) = serde_json::to_string(&self.layout) {
            storage.set_string(eframe::APP_KEY, json);
            debug!("Layout saved (follow playhead: {})", self.layout.follow_playhead);
        }
    }

    fn on_exit(&mut self, _gl: Option<&glow::Context>) {
        // Pending drags would otherwise be lost
        self.editor.flush();
        let deadline = Instant::now() + Duration::from_secs(2);
        while self.editor.pipeline().in_flight() > 0 && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(20));
            self.editor.sync();
        }
        info!("Editor closed ({} store call(s) unfinished)", self.editor.pipeline().in_flight());
    }
}
