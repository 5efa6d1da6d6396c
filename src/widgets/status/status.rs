use crate::core::event_bus::BoxedEvent;
use crate::core::notifications::{Notifications, ToastLevel};
use crate::core::playback::PlaybackStatus;
use crate::editor::editor_events::DismissToastEvent;
use eframe::egui::{self, Color32, RichText};
use std::time::Instant;

/// Snapshot of what the status bar shows this frame.
#[derive(Debug, Clone, Default)]
pub struct StatusInfo {
    pub webinar: String,
    pub api_url: String,
    pub count: usize,
    pub in_flight: usize,
    pub pending_moves: bool,
    pub zoom: f64,
    pub playback: PlaybackStatus,
}

/// Status bar component
pub struct StatusBar {
    pub current_message: String,
}

impl Default for StatusBar {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusBar {
    pub fn new() -> Self {
        Self {
            current_message: String::new(),
        }
    }

    /// Render status bar at bottom of screen
    pub fn render(&self, ctx: &egui::Context, info: &StatusInfo) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.monospace(format!("Webinar: {}", info.webinar));
                ui.separator();
                ui.monospace(&info.api_url);
                ui.separator();
                ui.monospace(format!("{} interactions", info.count));
                ui.separator();

                // Sync state
                if info.in_flight > 0 {
                    ui.spinner();
                    ui.monospace(format!("Saving ({})", info.in_flight));
                } else if info.pending_moves {
                    ui.monospace("Move pending...");
                } else {
                    ui.monospace("Saved");
                }
                ui.separator();

                ui.monospace(format!("Zoom {:.0}x", info.zoom));
                ui.separator();

                match &info.playback {
                    PlaybackStatus::Loading => {
                        ui.monospace("Video: loading");
                    }
                    PlaybackStatus::Ready => {
                        ui.monospace("Video: ready");
                    }
                    PlaybackStatus::Failed(msg) => {
                        ui.label(RichText::new(format!("Video: {}", msg)).color(Color32::from_rgb(230, 90, 90)));
                    }
                }

                if !self.current_message.is_empty() {
                    ui.separator();
                    ui.monospace(&self.current_message);
                }
            });
        });
    }
}

fn level_color(level: ToastLevel) -> Color32 {
    match level {
        ToastLevel::Info => Color32::from_rgb(120, 170, 230),
        ToastLevel::Success => Color32::from_rgb(100, 200, 120),
        ToastLevel::Warning => Color32::from_rgb(230, 190, 70),
        ToastLevel::Error => Color32::from_rgb(230, 90, 90),
    }
}

/// Stack of toasts in the top-right corner, newest last.
pub fn render_toasts(ctx: &egui::Context, notifications: &Notifications, now: Instant, mut dispatch: impl FnMut(BoxedEvent)) {
    if notifications.is_empty() {
        return;
    }
    let ttl = notifications.ttl().as_secs_f32().max(0.001);

    egui::Area::new(egui::Id::new("toasts"))
        .anchor(egui::Align2::RIGHT_TOP, egui::vec2(-12.0, 36.0))
        .order(egui::Order::Foreground)
        .show(ctx, |ui| {
            for toast in notifications.iter() {
                let fade = 1.0 - (toast.age(now).as_secs_f32() / ttl).clamp(0.0, 1.0) * 0.5;
                egui::Frame::popup(ui.style())
                    .stroke(egui::Stroke::new(1.0, level_color(toast.level).gamma_multiply(fade)))
                    .show(ui, |ui| {
                        ui.set_max_width(320.0);
                        ui.horizontal(|ui| {
                            ui.label(RichText::new(&toast.message).color(level_color(toast.level)));
                            if ui.small_button("✖").clicked() {
                                dispatch(Box::new(DismissToastEvent(toast.id)));
                            }
                        });
                    });
                ui.add_space(4.0);
            }
        });

    // Keep repainting so toasts expire without input
    ctx.request_repaint_after(std::time::Duration::from_millis(250));
}
