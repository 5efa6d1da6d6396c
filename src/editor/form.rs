//! Add/edit form state.
//!
//! The form owns a detached draft. Every change re-runs validation against the
//! current list; saving goes through [`FormState::request_save`], which refuses
//! on errors and asks for explicit confirmation on warnings. Dropping the form
//! drops its report with it, so messages never outlive the session.

use super::selection::AddStep;
use crate::entities::{Interaction, InteractionConfig, InteractionId, InteractionKind};
use crate::validation::{ConflictRules, ValidationReport};

#[derive(Debug, Clone, PartialEq)]
pub enum FormTarget {
    Add,
    Edit(InteractionId),
}

/// What the caller should do after a save request.
#[derive(Debug, Clone, PartialEq)]
pub enum SaveDecision {
    /// Errors present; nothing to do.
    Blocked,
    /// Warnings present; show them with "proceed anyway" / cancel.
    Confirm(Vec<String>),
    Create(Interaction),
    Update(Interaction),
}

#[derive(Debug, Clone)]
pub struct FormState {
    pub target: FormTarget,
    pub step: AddStep,
    pub draft: Interaction,
    pub report: ValidationReport,
    /// Warnings shown, waiting for "proceed anyway".
    pub confirming: bool,
}

impl FormState {
    /// New add flow at `trigger_time`, starting with type selection.
    pub fn add(trigger_time: f64) -> Self {
        let draft = Interaction::draft(
            InteractionConfig::default_for(InteractionKind::Poll),
            trigger_time,
            "",
        );
        Self {
            target: FormTarget::Add,
            step: AddStep::ChooseType,
            draft,
            report: ValidationReport::default(),
            confirming: false,
        }
    }

    /// Edit an existing record. `None` for a draft without id.
    pub fn edit(interaction: &Interaction) -> Option<Self> {
        let id = interaction.id.clone()?;
        Some(Self {
            target: FormTarget::Edit(id),
            step: AddStep::EnterFields,
            draft: interaction.clone(),
            report: ValidationReport::default(),
            confirming: false,
        })
    }

    pub fn is_add(&self) -> bool {
        self.target == FormTarget::Add
    }

    /// Type selection done; the draft gets that type's default config.
    pub fn choose_type(&mut self, kind: InteractionKind) {
        self.draft.change_kind(kind);
        if self.draft.title.trim().is_empty() {
            self.draft.title = kind.label().to_string();
        }
        self.step = AddStep::EnterFields;
        self.confirming = false;
    }

    pub fn back_to_type(&mut self) {
        if self.is_add() {
            self.step = AddStep::ChooseType;
            self.confirming = false;
        }
    }

    pub fn revalidate(&mut self, existing: &[Interaction], video_duration: f64, rules: &ConflictRules) {
        self.report = ValidationReport::check(&self.draft, existing, video_duration, rules);
    }

    /// Replace the draft and revalidate. Any pending warning confirmation is
    /// withdrawn: the user confirmed a different candidate.
    pub fn set_draft(
        &mut self,
        mut draft: Interaction,
        existing: &[Interaction],
        video_duration: f64,
        rules: &ConflictRules,
    ) {
        // The form edits fields, not identity
        draft.id = match &self.target {
            FormTarget::Add => None,
            FormTarget::Edit(id) => Some(id.clone()),
        };
        self.draft = draft;
        self.confirming = false;
        self.revalidate(existing, video_duration, rules);
    }

    pub fn update_draft<F: FnOnce(&mut Interaction)>(
        &mut self,
        f: F,
        existing: &[Interaction],
        video_duration: f64,
        rules: &ConflictRules,
    ) {
        let mut draft = self.draft.clone();
        f(&mut draft);
        self.set_draft(draft, existing, video_duration, rules);
    }

    fn ready(&self) -> SaveDecision {
        match &self.target {
            FormTarget::Add => SaveDecision::Create(self.draft.clone()),
            FormTarget::Edit(_) => SaveDecision::Update(self.draft.clone()),
        }
    }

    /// Save button.
    pub fn request_save(&mut self) -> SaveDecision {
        if self.step == AddStep::ChooseType || self.report.is_blocked() {
            return SaveDecision::Blocked;
        }
        if self.report.needs_confirmation() {
            self.confirming = true;
            return SaveDecision::Confirm(self.report.warnings.clone());
        }
        self.ready()
    }

    /// "Proceed anyway" on the warning dialog.
    pub fn proceed_anyway(&mut self) -> SaveDecision {
        if !self.confirming || self.report.is_blocked() {
            return SaveDecision::Blocked;
        }
        self.confirming = false;
        self.ready()
    }

    pub fn cancel_confirmation(&mut self) {
        self.confirming = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::PollConfig;

    fn rules() -> ConflictRules {
        ConflictRules::default()
    }

    fn existing() -> Vec<Interaction> {
        let mut tip = Interaction::draft(InteractionConfig::default_for(InteractionKind::Tip), 100.0, "tip");
        tip.id = Some("1".into());
        vec![tip]
    }

    #[test]
    fn test_add_flow_requires_type_then_fields() {
        let mut f = FormState::add(30.0);
        assert_eq!(f.request_save(), SaveDecision::Blocked);

        f.choose_type(InteractionKind::Poll);
        assert_eq!(f.step, AddStep::EnterFields);
        f.update_draft(
            |d| {
                d.title = "Quick check".into();
                d.config = InteractionConfig::Poll(PollConfig {
                    options: vec!["A".into(), "B".into()],
                    allow_multiple: false,
                });
            },
            &existing(),
            600.0,
            &rules(),
        );
        assert!(f.report.is_clean(), "{:?}", f.report);
        assert!(matches!(f.request_save(), SaveDecision::Create(d) if d.trigger_time == 30.0));
    }

    #[test]
    fn test_errors_block_without_override() {
        let mut f = FormState::add(30.0);
        f.choose_type(InteractionKind::Poll);
        f.revalidate(&existing(), 600.0, &rules());
        assert!(f.report.is_blocked());
        assert_eq!(f.request_save(), SaveDecision::Blocked);
        assert_eq!(f.proceed_anyway(), SaveDecision::Blocked);
    }

    #[test]
    fn test_warnings_need_confirmation() {
        let list = existing();
        let mut f = FormState::add(102.0);
        f.choose_type(InteractionKind::Tip);
        f.revalidate(&list, 600.0, &rules());
        assert!(f.report.needs_confirmation());

        let SaveDecision::Confirm(warnings) = f.request_save() else {
            panic!("expected confirmation");
        };
        assert!(!warnings.is_empty());
        assert!(f.confirming);

        // Editing the draft withdraws the confirmation
        f.update_draft(|d| d.trigger_time = 103.0, &list, 600.0, &rules());
        assert!(!f.confirming);
        assert_eq!(f.proceed_anyway(), SaveDecision::Blocked);

        f.request_save();
        assert!(matches!(f.proceed_anyway(), SaveDecision::Create(_)));
    }

    #[test]
    fn test_edit_keeps_identity() {
        let list = existing();
        let mut f = FormState::edit(&list[0]).unwrap();
        f.update_draft(|d| d.id = None, &list, 600.0, &rules());
        assert_eq!(f.draft.id, Some("1".into()));
        // Own id is excluded from collisions
        assert!(f.report.is_clean(), "{:?}", f.report);
        assert!(matches!(f.request_save(), SaveDecision::Update(_)));
    }
}
