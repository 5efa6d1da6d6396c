//! Add/edit form window
//!
//! Edits a copy of the draft; any change is dispatched as a
//! `DraftChangedEvent` and the editor revalidates. Errors render in red and
//! disable Save. Warnings render in yellow; saving with warnings opens the
//! "proceed anyway" step.

use crate::core::event_bus::BoxedEvent;
use crate::editor::editor_events::{
    BackToTypeEvent, CancelWarningsEvent, ChooseTypeEvent, CloseFormEvent, DraftChangedEvent,
    ProceedAnywayEvent, SaveFormEvent,
};
use crate::editor::{AddStep, FormState};
use crate::entities::{Interaction, InteractionConfig, InteractionKind, ScreenPosition};
use crate::widgets::timeline::timeline_helpers::kind_color;
use eframe::egui::{self, Color32, RichText, Ui};

const ERROR_COLOR: Color32 = Color32::from_rgb(230, 90, 90);
const WARNING_COLOR: Color32 = Color32::from_rgb(230, 190, 70);

/// Render the form window if one is open.
pub fn render_form(ctx: &egui::Context, form: &FormState, video_duration: f64, mut dispatch: impl FnMut(BoxedEvent)) {
    let title = if form.is_add() { "Add interaction" } else { "Edit interaction" };
    let mut open = true;

    egui::Window::new(title)
        .id(egui::Id::new("interaction_form"))
        .collapsible(false)
        .resizable(true)
        .default_width(380.0)
        .open(&mut open)
        .show(ctx, |ui| match form.step {
            AddStep::ChooseType => render_type_picker(ui, &mut dispatch),
            AddStep::EnterFields => {
                let mut draft = form.draft.clone();
                if render_fields(ui, &mut draft, video_duration) {
                    dispatch(Box::new(DraftChangedEvent(Box::new(draft))));
                }
                ui.separator();
                render_report(ui, form);
                ui.separator();
                render_buttons(ui, form, &mut dispatch);
            }
        });

    if !open {
        dispatch(Box::new(CloseFormEvent));
    }
}

fn render_type_picker(ui: &mut Ui, dispatch: &mut impl FnMut(BoxedEvent)) {
    ui.label("Choose a type:");
    ui.add_space(4.0);
    egui::Grid::new("type_picker").num_columns(2).spacing([8.0, 6.0]).show(ui, |ui| {
        for (i, kind) in InteractionKind::ALL.iter().enumerate() {
            let text = RichText::new(format!("{}  {}", kind.glyph(), kind.label())).color(kind_color(*kind));
            if ui.add_sized([160.0, 28.0], egui::Button::new(text)).clicked() {
                dispatch(Box::new(ChooseTypeEvent(*kind)));
            }
            if i % 2 == 1 {
                ui.end_row();
            }
        }
    });
    ui.add_space(8.0);
    if ui.button("Cancel").clicked() {
        dispatch(Box::new(CloseFormEvent));
    }
}

/// Common fields plus the type's config. Returns true if anything changed.
fn render_fields(ui: &mut Ui, draft: &mut Interaction, video_duration: f64) -> bool {
    let mut changed = false;

    egui::Grid::new("form_common").num_columns(2).spacing([8.0, 6.0]).show(ui, |ui| {
        ui.label("Type");
        ui.label(RichText::new(draft.kind().label()).color(kind_color(draft.kind())));
        ui.end_row();

        ui.label("Title");
        changed |= ui.text_edit_singleline(&mut draft.title).changed();
        ui.end_row();

        ui.label("Trigger (s)");
        let max = if video_duration > 0.0 { video_duration } else { f64::MAX };
        changed |= ui
            .add(egui::DragValue::new(&mut draft.trigger_time).range(0.0..=max).speed(0.5).fixed_decimals(1))
            .changed();
        ui.end_row();

        ui.label("Duration");
        ui.horizontal(|ui| {
            let mut limited = draft.duration.is_some();
            if ui.checkbox(&mut limited, "").on_hover_text("Off: shown until dismissed").changed() {
                draft.duration = if limited { Some(10.0) } else { None };
                changed = true;
            }
            if let Some(d) = draft.duration.as_mut() {
                changed |= ui.add(egui::DragValue::new(d).speed(0.5).suffix(" s")).changed();
            }
        });
        ui.end_row();

        ui.label("Position");
        let before = draft.position;
        egui::ComboBox::from_id_salt("form_position")
            .selected_text(draft.position.label())
            .show_ui(ui, |ui| {
                for pos in ScreenPosition::ALL {
                    ui.selectable_value(&mut draft.position, pos, pos.label());
                }
            });
        changed |= draft.position != before;
        ui.end_row();
    });

    ui.horizontal_wrapped(|ui| {
        changed |= ui.checkbox(&mut draft.pause_video, "Pause video").changed();
        changed |= ui.checkbox(&mut draft.required, "Required").changed();
        changed |= ui.checkbox(&mut draft.show_on_replay, "Show on replay").changed();
        changed |= ui.checkbox(&mut draft.enabled, "Enabled").changed();
    });

    ui.separator();
    changed |= render_config(ui, &mut draft.config);
    changed
}

fn render_options(ui: &mut Ui, options: &mut Vec<String>, mut correct: Option<&mut Vec<usize>>) -> bool {
    let mut changed = false;
    let mut remove: Option<usize> = None;
    for (i, option) in options.iter_mut().enumerate() {
        ui.horizontal(|ui| {
            if let Some(correct) = correct.as_deref_mut() {
                let mut is_correct = correct.contains(&i);
                if ui.checkbox(&mut is_correct, "").on_hover_text("Correct answer").changed() {
                    if is_correct {
                        correct.push(i);
                        correct.sort_unstable();
                    } else {
                        correct.retain(|c| *c != i);
                    }
                    changed = true;
                }
            }
            changed |= ui
                .add(egui::TextEdit::singleline(option).hint_text(format!("Option {}", i + 1)))
                .changed();
            if ui.small_button("✖").clicked() {
                remove = Some(i);
            }
        });
    }
    if let Some(i) = remove {
        options.remove(i);
        if let Some(correct) = correct {
            // Keep indices pointing at the same options
            correct.retain(|c| *c != i);
            for c in correct.iter_mut() {
                if *c > i {
                    *c -= 1;
                }
            }
        }
        changed = true;
    }
    if ui.button("+ Option").clicked() {
        options.push(String::new());
        changed = true;
    }
    changed
}

fn labelled(ui: &mut Ui, label: &str, value: &mut String) -> bool {
    ui.horizontal(|ui| {
        ui.label(label);
        ui.text_edit_singleline(value).changed()
    })
    .inner
}

fn render_config(ui: &mut Ui, config: &mut InteractionConfig) -> bool {
    match config {
        InteractionConfig::Poll(c) => {
            let mut changed = ui.checkbox(&mut c.allow_multiple, "Allow multiple answers").changed();
            changed |= render_options(ui, &mut c.options, None);
            changed
        }
        InteractionConfig::Quiz(c) => render_options(ui, &mut c.options, Some(&mut c.correct_answers)),
        InteractionConfig::Cta(c) => {
            let mut changed = labelled(ui, "Button text", &mut c.button_text);
            changed |= labelled(ui, "Button URL", &mut c.button_url);
            changed
        }
        InteractionConfig::Download(c) => {
            let mut changed = labelled(ui, "File URL", &mut c.file_url);
            changed |= labelled(ui, "File name", &mut c.file_name);
            changed
        }
        InteractionConfig::Question(c) => labelled(ui, "Placeholder", &mut c.placeholder),
        InteractionConfig::Feedback(c) => {
            ui.horizontal(|ui| {
                ui.label("Max rating");
                ui.add(egui::DragValue::new(&mut c.max_rating).range(1..=10)).changed()
            })
            .inner
        }
        InteractionConfig::ContactForm(c) => {
            let mut text = c.fields.join(", ");
            let changed = labelled(ui, "Fields", &mut text);
            if changed {
                c.fields = text
                    .split(',')
                    .map(|f| f.trim().to_string())
                    .filter(|f| !f.is_empty())
                    .collect();
            }
            changed
        }
        InteractionConfig::Tip(c) => {
            ui.label("Body");
            ui.text_edit_multiline(&mut c.body).changed()
        }
        InteractionConfig::SpecialOffer(c) => {
            let mut changed = labelled(ui, "Headline", &mut c.headline);
            changed |= labelled(ui, "Button text", &mut c.button_text);
            changed |= labelled(ui, "Button URL", &mut c.button_url);
            ui.horizontal(|ui| {
                let mut countdown = c.expires_in.is_some();
                if ui.checkbox(&mut countdown, "Countdown").changed() {
                    c.expires_in = if countdown { Some(60.0) } else { None };
                    changed = true;
                }
                if let Some(s) = c.expires_in.as_mut() {
                    changed |= ui.add(egui::DragValue::new(s).range(1.0..=86_400.0).suffix(" s")).changed();
                }
            });
            changed
        }
        InteractionConfig::Pause(c) => labelled(ui, "Message", &mut c.message),
    }
}

fn render_report(ui: &mut Ui, form: &FormState) {
    if form.report.is_clean() {
        ui.label(RichText::new("✔ Ready to save").weak());
        return;
    }
    for error in &form.report.errors {
        ui.label(RichText::new(format!("✖ {}", error)).color(ERROR_COLOR));
    }
    for warning in &form.report.warnings {
        ui.label(RichText::new(format!("⚠ {}", warning)).color(WARNING_COLOR));
    }
}

fn render_buttons(ui: &mut Ui, form: &FormState, dispatch: &mut impl FnMut(BoxedEvent)) {
    if form.confirming {
        ui.label(RichText::new("Save despite the warnings above?").color(WARNING_COLOR));
        ui.horizontal(|ui| {
            if ui.button("Proceed anyway").clicked() {
                dispatch(Box::new(ProceedAnywayEvent));
            }
            if ui.button("Cancel").on_hover_text("Esc").clicked() {
                dispatch(Box::new(CancelWarningsEvent));
            }
        });
        return;
    }

    ui.horizontal(|ui| {
        let save = ui
            .add_enabled(!form.report.is_blocked(), egui::Button::new("Save"))
            .on_disabled_hover_text("Fix the errors above first");
        if save.clicked() {
            dispatch(Box::new(SaveFormEvent));
        }
        if form.is_add() && ui.button("◀ Type").clicked() {
            dispatch(Box::new(BackToTypeEvent));
        }
        if ui.button("Cancel").on_hover_text("Esc").clicked() {
            dispatch(Box::new(CloseFormEvent));
        }
    });
}
