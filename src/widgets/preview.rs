//! Preview panel - a stand-in video frame with the overlays visible at the
//! playhead, placed by their screen position.

use crate::core::event_bus::BoxedEvent;
use crate::core::playback::PlaybackStatus;
use crate::editor::editor_events::RetryVideoEvent;
use crate::entities::{InteractionList, ScreenPosition};
use crate::utils::time::format_time;
use crate::widgets::timeline::timeline_helpers::kind_color;
use eframe::egui::{self, Align2, Color32, FontId, Pos2, Rect, Sense, Stroke, Ui, Vec2};

const ASPECT: f32 = 16.0 / 9.0;

fn anchor(position: ScreenPosition) -> Align2 {
    match position {
        ScreenPosition::TopLeft => Align2::LEFT_TOP,
        ScreenPosition::TopCenter => Align2::CENTER_TOP,
        ScreenPosition::TopRight => Align2::RIGHT_TOP,
        ScreenPosition::Center => Align2::CENTER_CENTER,
        ScreenPosition::BottomLeft => Align2::LEFT_BOTTOM,
        ScreenPosition::BottomCenter => Align2::CENTER_BOTTOM,
        ScreenPosition::BottomRight => Align2::RIGHT_BOTTOM,
    }
}

pub fn render_preview(
    ui: &mut Ui,
    list: &InteractionList,
    current_time: f64,
    status: &PlaybackStatus,
    mut dispatch: impl FnMut(BoxedEvent),
) {
    let avail = ui.available_size();
    let width = avail.x.min(avail.y * ASPECT).max(64.0);
    let (rect, _) = ui.allocate_exact_size(Vec2::new(width, width / ASPECT), Sense::hover());
    let painter = ui.painter_at(rect);
    painter.rect_filled(rect, 4.0, Color32::from_gray(16));

    match status {
        PlaybackStatus::Loading => {
            painter.text(rect.center(), Align2::CENTER_CENTER, "Loading video...", FontId::proportional(14.0), Color32::GRAY);
            return;
        }
        PlaybackStatus::Failed(msg) => {
            painter.text(
                rect.center() - Vec2::new(0.0, 14.0),
                Align2::CENTER_CENTER,
                format!("Video failed to load: {}", msg),
                FontId::proportional(14.0),
                Color32::from_rgb(230, 90, 90),
            );
            let button_rect = Rect::from_center_size(rect.center() + Vec2::new(0.0, 16.0), Vec2::new(80.0, 24.0));
            if ui.put(button_rect, egui::Button::new("Retry")).clicked() {
                dispatch(Box::new(RetryVideoEvent));
            }
            return;
        }
        PlaybackStatus::Ready => {}
    }

    painter.text(
        rect.left_bottom() + Vec2::new(8.0, -8.0),
        Align2::LEFT_BOTTOM,
        format_time(current_time),
        FontId::monospace(12.0),
        Color32::from_gray(160),
    );

    let inner = rect.shrink(16.0);
    let card = Vec2::new((inner.width() * 0.35).min(260.0), 44.0);
    for interaction in list.active_at(current_time) {
        let align = anchor(interaction.position);
        let pos = Pos2::new(
            inner.min.x + inner.width() * align.x().to_factor(),
            inner.min.y + inner.height() * align.y().to_factor(),
        );
        let card_rect = align.anchor_size(pos, card);
        let color = kind_color(interaction.kind());
        painter.rect_filled(card_rect, 6.0, Color32::from_black_alpha(200));
        painter.rect_stroke(card_rect, 6.0, Stroke::new(1.5, color), egui::StrokeKind::Inside);
        painter.text(
            card_rect.left_top() + Vec2::new(8.0, 6.0),
            Align2::LEFT_TOP,
            format!("{} {}", interaction.kind().glyph(), interaction.kind().label()),
            FontId::proportional(10.0),
            color,
        );
        painter.text(
            card_rect.left_bottom() + Vec2::new(8.0, -6.0),
            Align2::LEFT_BOTTOM,
            &interaction.title,
            FontId::proportional(13.0),
            Color32::WHITE,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anchor_covers_every_position() {
        assert_eq!(anchor(ScreenPosition::default()), Align2::RIGHT_BOTTOM);
        for pos in ScreenPosition::ALL {
            let a = anchor(pos);
            assert!((0.0..=1.0).contains(&a.x().to_factor()));
        }
    }
}
