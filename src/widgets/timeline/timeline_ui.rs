//! Interaction timeline - UI rendering
//!
//! Layout, top to bottom:
//! - toolbar: play/pause, time readout, zoom, follow, "add at playhead"
//! - ruler with labelled ticks
//! - marker strip (one glyph per interaction at its trigger time)
//! - minimap over the full duration
//!
//! # Interactions
//!
//! - **Click empty strip**: seek
//! - **Press marker**: select + start drag (no seek)
//! - **Drag marker**: move locally, persisted after the drag settles
//! - **Double-click marker**: open the edit form
//! - **Horizontal scroll**: pan the zoomed window
//! - **Minimap click**: recenter and seek
//!
//! Nothing here mutates editor state: egui input is hit-tested into
//! `PointerInput`s and dispatched as events, which the editor feeds to the
//! gesture engine (gestures.rs) on the next poll.

use super::gestures::{MARKER_HIT_RADIUS_PX, PointerInput, marker_at, visible_markers};
use super::timeline_events::{
    MinimapClickEvent, TimelineFollowChangedEvent, TimelinePointerEvent, TimelineScrollEvent,
};
use super::timeline_helpers::{Minimap, dimmed, kind_color, ticks};
use super::{TimelineConfig, TimelineState};
use crate::core::event_bus::BoxedEvent;
use crate::editor::SelectionState;
use crate::editor::editor_events::CommandEvent;
use crate::editor::hotkeys::EditorCommand;
use crate::entities::{InteractionId, InteractionList};
use crate::utils::time::{format_time, format_time_precise};
use eframe::egui::{self, Align2, Color32, FontId, Pos2, Rect, Sense, Stroke, Ui, Vec2};

const PLAYHEAD_COLOR: Color32 = Color32::from_rgb(255, 220, 100);

/// What the app needs back from one render.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimelineActions {
    /// Pointer is over the timeline (hotkey routing)
    pub hovered: bool,
}

/// Read-only inputs for one frame.
pub struct TimelineView<'a> {
    pub list: &'a InteractionList,
    pub selection: &'a SelectionState,
    pub current_time: f64,
    pub playing: bool,
}

/// Render timeline toolbar (transport controls, zoom, follow, add)
pub fn render_toolbar(ui: &mut Ui, state: &TimelineState, view: &TimelineView, mut dispatch: impl FnMut(BoxedEvent)) {
    ui.horizontal(|ui| {
        let play_icon = if view.playing { "⏸" } else { "▶" };
        if ui.button(play_icon).on_hover_text("Play/Pause (Space)").clicked() {
            dispatch(Box::new(CommandEvent(EditorCommand::TogglePlay)));
        }

        ui.monospace(format!(
            "{} / {}",
            format_time(view.current_time),
            format_time(state.viewport.video_duration())
        ));

        ui.separator();

        ui.label("Zoom:");
        if ui.button("−").on_hover_text("Zoom out (-)").clicked() {
            dispatch(Box::new(CommandEvent(EditorCommand::ZoomOut)));
        }
        ui.monospace(format!("{:>4.0}x", state.viewport.zoom()));
        if ui.button("+").on_hover_text("Zoom in (+)").clicked() {
            dispatch(Box::new(CommandEvent(EditorCommand::ZoomIn)));
        }
        if ui.button("Reset").on_hover_text("Reset zoom (0)").clicked() {
            dispatch(Box::new(CommandEvent(EditorCommand::ResetZoom)));
        }

        let mut follow = state.follow_playhead;
        if ui.checkbox(&mut follow, "Follow").on_hover_text("Keep the playhead in view while playing").changed() {
            dispatch(Box::new(TimelineFollowChangedEvent(follow)));
        }

        ui.separator();

        let can_add = !state.viewport.is_degenerate() && !view.selection.is_modal();
        if ui
            .add_enabled(can_add, egui::Button::new("+ Add at playhead"))
            .on_hover_text("Add an interaction at the current time (A)")
            .clicked()
        {
            dispatch(Box::new(CommandEvent(EditorCommand::AddAtPlayhead)));
        }
    });
}

/// Render ruler, marker strip and minimap.
pub fn render_timeline(
    ui: &mut Ui,
    view: &TimelineView,
    config: &TimelineConfig,
    state: &mut TimelineState,
    mut dispatch: impl FnMut(BoxedEvent),
) -> TimelineActions {
    let tab_rect = ui.max_rect();
    let width = ui.available_width().max(1.0);
    state.last_strip_width = width;

    if state.viewport.is_degenerate() {
        let (rect, _) = ui.allocate_exact_size(
            Vec2::new(width, config.ruler_height + config.strip_height),
            Sense::hover(),
        );
        ui.painter().text(
            rect.center(),
            Align2::CENTER_CENTER,
            "Waiting for video metadata...",
            FontId::proportional(13.0),
            ui.visuals().weak_text_color(),
        );
        return TimelineActions::default();
    }

    let ruler_rect = draw_ruler(ui, state, config, width);
    let strip_rect = draw_strip(ui, view, state, config, width, &mut dispatch);

    // Playhead across ruler + strip
    let vp = state.viewport;
    if vp.contains(view.current_time) {
        let x = strip_rect.min.x + vp.time_to_pixel(view.current_time, width as f64) as f32;
        let painter = ui.painter();
        painter.line_segment(
            [Pos2::new(x, ruler_rect.min.y), Pos2::new(x, strip_rect.max.y)],
            (2.0, PLAYHEAD_COLOR),
        );
        let triangle_size = 8.0;
        let top_y = ruler_rect.min.y;
        painter.add(egui::Shape::convex_polygon(
            vec![
                Pos2::new(x, top_y + triangle_size),
                Pos2::new(x - triangle_size / 2.0, top_y),
                Pos2::new(x + triangle_size / 2.0, top_y),
            ],
            PLAYHEAD_COLOR,
            Stroke::NONE,
        ));
    }

    ui.add_space(4.0);
    draw_minimap(ui, view, state, config, width, &mut dispatch);

    let hovered = ui
        .ctx()
        .pointer_hover_pos()
        .is_some_and(|p| tab_rect.contains(p));
    TimelineActions { hovered }
}

fn draw_ruler(ui: &mut Ui, state: &TimelineState, config: &TimelineConfig, width: f32) -> Rect {
    let (rect, _) = ui.allocate_exact_size(Vec2::new(width, config.ruler_height), Sense::hover());
    let painter = ui.painter_at(rect);
    painter.rect_filled(rect, 0.0, ui.visuals().extreme_bg_color);

    let text_color = ui.visuals().text_color();
    for t in ticks(&state.viewport) {
        let x = rect.min.x + state.viewport.time_to_pixel(t, width as f64) as f32;
        painter.line_segment(
            [Pos2::new(x, rect.max.y - 6.0), Pos2::new(x, rect.max.y)],
            Stroke::new(1.0, text_color),
        );
        if config.show_time_labels {
            painter.text(
                Pos2::new(x + 2.0, rect.min.y + 2.0),
                Align2::LEFT_TOP,
                format_time(t),
                FontId::monospace(10.0),
                text_color,
            );
        }
    }
    rect
}

fn draw_strip(
    ui: &mut Ui,
    view: &TimelineView,
    state: &TimelineState,
    config: &TimelineConfig,
    width: f32,
    dispatch: &mut impl FnMut(BoxedEvent),
) -> Rect {
    let (response, painter) = ui.allocate_painter(Vec2::new(width, config.strip_height), Sense::click_and_drag());
    let rect = response.rect;
    let vp = state.viewport;
    let w = width as f64;
    painter.rect_filled(rect, 2.0, ui.visuals().faint_bg_color);

    let pointer = |input: PointerInput| -> BoxedEvent { Box::new(TimelinePointerEvent { input, width: w }) };
    let hit_at = |pos: Pos2| -> Option<InteractionId> {
        marker_at(view.list, &vp, (pos.x - rect.min.x) as f64, w, MARKER_HIT_RADIUS_PX)
    };

    // Hover enter/exit against the marker hit on the previous frame
    let hit = response.hover_pos().and_then(hit_at);
    let memory_id = response.id.with("hovered_marker");
    let last_hit: Option<InteractionId> = ui.memory(|m| m.data.get_temp::<Option<InteractionId>>(memory_id)).flatten();
    if !state.gestures.is_dragging() && hit != last_hit {
        if let Some(id) = last_hit {
            dispatch(pointer(PointerInput::MarkerExit { id }));
        }
        if let Some(id) = hit.clone() {
            dispatch(pointer(PointerInput::MarkerEnter { id }));
        }
        ui.memory_mut(|m| m.data.insert_temp(memory_id, hit.clone()));
    }

    let (pressed, released, press_origin) =
        ui.input(|i| (i.pointer.primary_pressed(), i.pointer.primary_released(), i.pointer.press_origin()));

    // Press on a marker starts a drag session
    if pressed
        && let Some(origin) = press_origin
        && rect.contains(origin)
        && let Some(id) = hit_at(origin)
        && let Some(time) = view.list.get(&id).map(|i| i.trigger_time)
    {
        dispatch(pointer(PointerInput::MarkerDown { id, time }));
    }

    if state.gestures.is_dragging() {
        match ui.ctx().pointer_interact_pos() {
            Some(pos) if rect.expand(config.marker_radius).contains(pos) => {
                if ui.input(|i| i.pointer.delta() != Vec2::ZERO) {
                    dispatch(pointer(PointerInput::Move { x: (pos.x - rect.min.x) as f64 }));
                }
            }
            _ => dispatch(pointer(PointerInput::Leave)),
        }
    } else if response.hovered() && ui.input(|i| i.pointer.delta() != Vec2::ZERO) {
        // Plain movement clears a swallowed click
        if let Some(pos) = response.hover_pos() {
            dispatch(pointer(PointerInput::Move { x: (pos.x - rect.min.x) as f64 }));
        }
    }

    if released {
        dispatch(pointer(PointerInput::Up));
    }

    if response.double_clicked()
        && let Some(id) = response.interact_pointer_pos().and_then(hit_at)
    {
        dispatch(pointer(PointerInput::MarkerDoubleClick { id }));
    } else if response.clicked()
        && let Some(pos) = response.interact_pointer_pos()
    {
        dispatch(pointer(PointerInput::StripClick { x: (pos.x - rect.min.x) as f64 }));
    }

    // Scroll wheel horizontal pan
    if response.hovered() {
        let scroll = ui.ctx().input(|i| i.smooth_scroll_delta);
        let dx = if scroll.x.abs() > 0.0 { scroll.x } else { scroll.y };
        if dx.abs() > 0.0 && vp.zoom() > super::MIN_ZOOM {
            let seconds = -(dx as f64) / w * vp.viewport_duration();
            dispatch(Box::new(TimelineScrollEvent(seconds)));
        }
    }

    // Markers
    let dragged = state.gestures.drag_session().map(|s| s.interaction_id.clone());
    let cy = rect.center().y;
    for interaction in visible_markers(view.list, &vp) {
        let x = rect.min.x + vp.time_to_pixel(interaction.trigger_time, w) as f32;
        let center = Pos2::new(x, cy);
        let base = kind_color(interaction.kind());
        let fill = if interaction.enabled { base } else { dimmed(base) };
        painter.circle_filled(center, config.marker_radius, fill);

        let id = interaction.id.as_ref();
        let selected = id.is_some_and(|id| view.selection.is_selected(id));
        let hovered = id.is_some_and(|id| view.selection.is_hovered(id));
        if selected {
            painter.circle_stroke(center, config.marker_radius + 3.0, Stroke::new(2.0, Color32::WHITE));
        } else if hovered {
            painter.circle_stroke(center, config.marker_radius + 2.0, Stroke::new(1.0, Color32::LIGHT_GRAY));
        }
        painter.text(
            center,
            Align2::CENTER_CENTER,
            interaction.kind().glyph(),
            FontId::proportional(config.marker_radius * 1.4),
            Color32::BLACK,
        );

        if id.is_some() && id == dragged.as_ref() {
            painter.text(
                Pos2::new(x, rect.min.y + 2.0),
                Align2::CENTER_TOP,
                format_time_precise(interaction.trigger_time),
                FontId::monospace(10.0),
                PLAYHEAD_COLOR,
            );
        } else if hovered {
            painter.text(
                Pos2::new(x, rect.max.y - 2.0),
                Align2::CENTER_BOTTOM,
                &interaction.title,
                FontId::proportional(11.0),
                ui.visuals().text_color(),
            );
        }
    }

    rect
}

fn draw_minimap(
    ui: &mut Ui,
    view: &TimelineView,
    state: &TimelineState,
    config: &TimelineConfig,
    width: f32,
    dispatch: &mut impl FnMut(BoxedEvent),
) {
    let (response, painter) = ui.allocate_painter(Vec2::new(width, config.minimap_height), Sense::click());
    let rect = response.rect;
    let minimap = Minimap::new(state.viewport.video_duration());
    painter.rect_filled(rect, 2.0, ui.visuals().extreme_bg_color);

    for interaction in view.list.iter() {
        let x = rect.min.x + minimap.time_to_fraction(interaction.trigger_time) as f32 * width;
        let color = kind_color(interaction.kind());
        let color = if interaction.enabled { color } else { dimmed(color) };
        painter.line_segment([Pos2::new(x, rect.min.y + 2.0), Pos2::new(x, rect.max.y - 2.0)], (2.0, color));
    }

    if let Some((start, span)) = minimap.viewport_rect(&state.viewport) {
        let window = Rect::from_min_size(
            Pos2::new(rect.min.x + start as f32 * width, rect.min.y),
            Vec2::new((span as f32 * width).max(2.0), rect.height()),
        );
        painter.rect_stroke(window, 1.0, Stroke::new(1.0, Color32::WHITE), egui::StrokeKind::Inside);
    }

    let x = rect.min.x + minimap.time_to_fraction(view.current_time) as f32 * width;
    painter.line_segment([Pos2::new(x, rect.min.y), Pos2::new(x, rect.max.y)], (1.0, PLAYHEAD_COLOR));

    if response.clicked()
        && let Some(pos) = response.interact_pointer_pos()
    {
        let fraction = ((pos.x - rect.min.x) / width) as f64;
        dispatch(Box::new(MinimapClickEvent(fraction)));
    }
}
