//! Interactions panel - sorted list with per-row actions
//!
//! Rows follow the list order (trigger time). Hovering a row highlights its
//! marker on the timeline and the other way round. Also hosts the delete
//! confirmation dialog, since deletes start here or from the keyboard.

use crate::core::event_bus::BoxedEvent;
use crate::editor::editor_events::{
    CommandEvent, DeleteInteractionEvent, EditInteractionEvent, HoverInteractionEvent,
    JumpToInteractionEvent, ReloadInteractionsEvent, SelectInteractionEvent, ToggleEnabledEvent,
};
use crate::editor::{EditorCommand, EditorMode, SelectionState};
use crate::entities::{InteractionId, InteractionList};
use crate::utils::time::format_time;
use crate::widgets::timeline::timeline_helpers::{dimmed, kind_color};
use eframe::egui::{self, Color32, RichText, Sense, Ui};

/// Render the interaction list.
pub fn render_sidebar(
    ui: &mut Ui,
    list: &InteractionList,
    selection: &SelectionState,
    syncing: bool,
    mut dispatch: impl FnMut(BoxedEvent),
) {
    ui.horizontal(|ui| {
        ui.heading(format!("Interactions ({})", list.len()));
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if ui.button("⟳").on_hover_text("Reload from server").clicked() {
                dispatch(Box::new(ReloadInteractionsEvent));
            }
            if syncing {
                ui.spinner();
            }
        });
    });
    ui.separator();

    if list.is_empty() {
        ui.label(RichText::new("No interactions yet. Press A to add one at the playhead.").weak());
        return;
    }

    let modal = selection.is_modal();
    let mut row_hovered: Option<InteractionId> = None;

    egui::ScrollArea::vertical()
        .id_salt("interactions_sidebar")
        .auto_shrink([false, false])
        .show(ui, |ui| {
            for interaction in list.iter() {
                // Drafts never reach the list; rows without id are skipped
                let Some(id) = interaction.id.clone() else {
                    continue;
                };
                let selected = selection.is_selected(&id);
                let highlighted = selected || selection.is_hovered(&id);

                let frame = egui::Frame::new()
                    .inner_margin(egui::Margin::symmetric(6, 3))
                    .corner_radius(3.0)
                    .fill(if highlighted {
                        ui.visuals().selection.bg_fill.gamma_multiply(if selected { 0.6 } else { 0.3 })
                    } else {
                        Color32::TRANSPARENT
                    });

                let inner = frame.show(ui, |ui| {
                    ui.horizontal(|ui| {
                        let color = kind_color(interaction.kind());
                        let color = if interaction.enabled { color } else { dimmed(color) };
                        ui.label(RichText::new(interaction.kind().glyph()).color(color).strong());
                        ui.monospace(format_time(interaction.trigger_time));

                        let title = RichText::new(&interaction.title);
                        ui.label(if interaction.enabled { title } else { title.weak().strikethrough() })
                            .on_hover_text(interaction.kind().label());

                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            ui.add_enabled_ui(!modal, |ui| {
                                if ui.small_button("🗑").on_hover_text("Delete").clicked() {
                                    dispatch(Box::new(DeleteInteractionEvent(id.clone())));
                                }
                                if ui.small_button("✎").on_hover_text("Edit").clicked() {
                                    dispatch(Box::new(EditInteractionEvent(id.clone())));
                                }
                                if ui.small_button("⤵").on_hover_text("Jump to").clicked() {
                                    dispatch(Box::new(JumpToInteractionEvent(id.clone())));
                                }
                                let mut enabled = interaction.enabled;
                                if ui.checkbox(&mut enabled, "").on_hover_text("Enabled").changed() {
                                    dispatch(Box::new(ToggleEnabledEvent(id.clone())));
                                }
                            });
                        });
                    });
                });

                let response = ui.interact(inner.response.rect, ui.id().with(&id), Sense::click());
                if response.hovered() {
                    row_hovered = Some(id.clone());
                }
                if response.clicked() && !modal {
                    dispatch(Box::new(SelectInteractionEvent(id.clone())));
                }
                if response.double_clicked() && !modal {
                    dispatch(Box::new(EditInteractionEvent(id)));
                }
            }
        });

    // Report hover changes once, not every frame
    let memory_id = ui.id().with("sidebar_hovered");
    let last: Option<InteractionId> = ui
        .memory(|m| m.data.get_temp::<Option<InteractionId>>(memory_id))
        .flatten();
    if row_hovered != last {
        dispatch(Box::new(HoverInteractionEvent(row_hovered.clone())));
        ui.memory_mut(|m| m.data.insert_temp(memory_id, row_hovered));
    }
}

/// Modal confirmation while the editor waits for a delete decision.
pub fn render_delete_confirmation(
    ctx: &egui::Context,
    list: &InteractionList,
    selection: &SelectionState,
    mut dispatch: impl FnMut(BoxedEvent),
) {
    let EditorMode::ConfirmingDelete(id) = &selection.mode else {
        return;
    };
    let title = list.get(id).map(|i| i.title.as_str()).unwrap_or("this interaction");

    egui::Window::new("Delete interaction")
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
        .show(ctx, |ui| {
            ui.label(format!("Delete \"{}\"? This cannot be undone.", title));
            ui.add_space(8.0);
            ui.horizontal(|ui| {
                if ui
                    .button(RichText::new("Delete").color(Color32::from_rgb(230, 90, 90)))
                    .on_hover_text("Enter")
                    .clicked()
                {
                    dispatch(Box::new(CommandEvent(EditorCommand::ConfirmDelete)));
                }
                if ui.button("Cancel").on_hover_text("Esc").clicked() {
                    dispatch(Box::new(CommandEvent(EditorCommand::Cancel)));
                }
            });
        });
}
