//! Interaction - a time-triggered overlay pinned to the webinar video.
//!
//! The wire format keeps the store's `type` + free-form `config` pair, but in
//! memory the configuration is a sum type: the variant *is* the type, so a
//! POLL can never carry CTA fields. Conversion happens once, at the serde
//! boundary (`WireInteraction`).
//!
//! # Wire shape
//!
//! ```json
//! {
//!   "id": "42",
//!   "type": "POLL",
//!   "triggerTime": 30.0,
//!   "duration": null,
//!   "title": "Quick check",
//!   "config": { "options": ["A", "B"], "allowMultiple": false },
//!   "pauseVideo": false,
//!   "required": false,
//!   "showOnReplay": true,
//!   "enabled": true,
//!   "position": "BOTTOM_RIGHT"
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Store-assigned identifier. Stores hand out either strings or integers;
/// both are kept as their string form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct InteractionId(pub String);

impl InteractionId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InteractionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for InteractionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for InteractionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl<'de> Deserialize<'de> for InteractionId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Str(String),
            Int(i64),
        }
        Ok(match RawId::deserialize(deserializer)? {
            RawId::Str(s) => Self(s),
            RawId::Int(n) => Self(n.to_string()),
        })
    }
}

/// Closed set of interaction types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InteractionKind {
    Poll,
    Quiz,
    Cta,
    Download,
    Question,
    Feedback,
    ContactForm,
    Tip,
    SpecialOffer,
    Pause,
}

impl InteractionKind {
    pub const ALL: [InteractionKind; 10] = [
        InteractionKind::Poll,
        InteractionKind::Quiz,
        InteractionKind::Cta,
        InteractionKind::Download,
        InteractionKind::Question,
        InteractionKind::Feedback,
        InteractionKind::ContactForm,
        InteractionKind::Tip,
        InteractionKind::SpecialOffer,
        InteractionKind::Pause,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            InteractionKind::Poll => "Poll",
            InteractionKind::Quiz => "Quiz",
            InteractionKind::Cta => "Call to action",
            InteractionKind::Download => "Download",
            InteractionKind::Question => "Question",
            InteractionKind::Feedback => "Feedback",
            InteractionKind::ContactForm => "Contact form",
            InteractionKind::Tip => "Tip",
            InteractionKind::SpecialOffer => "Special offer",
            InteractionKind::Pause => "Pause",
        }
    }

    /// Marker glyph used on the timeline strip and in the sidebar.
    pub fn glyph(&self) -> &'static str {
        match self {
            InteractionKind::Poll => "▤",
            InteractionKind::Quiz => "?",
            InteractionKind::Cta => "➜",
            InteractionKind::Download => "⬇",
            InteractionKind::Question => "✎",
            InteractionKind::Feedback => "★",
            InteractionKind::ContactForm => "✉",
            InteractionKind::Tip => "i",
            InteractionKind::SpecialOffer => "%",
            InteractionKind::Pause => "⏸",
        }
    }
}

impl fmt::Display for InteractionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// On-screen anchor point of the overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScreenPosition {
    TopLeft,
    TopCenter,
    TopRight,
    Center,
    BottomLeft,
    BottomCenter,
    #[default]
    BottomRight,
}

impl ScreenPosition {
    pub const ALL: [ScreenPosition; 7] = [
        ScreenPosition::TopLeft,
        ScreenPosition::TopCenter,
        ScreenPosition::TopRight,
        ScreenPosition::Center,
        ScreenPosition::BottomLeft,
        ScreenPosition::BottomCenter,
        ScreenPosition::BottomRight,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ScreenPosition::TopLeft => "Top left",
            ScreenPosition::TopCenter => "Top center",
            ScreenPosition::TopRight => "Top right",
            ScreenPosition::Center => "Center",
            ScreenPosition::BottomLeft => "Bottom left",
            ScreenPosition::BottomCenter => "Bottom center",
            ScreenPosition::BottomRight => "Bottom right",
        }
    }
}

// ===== Per-type configuration payloads =====

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PollConfig {
    pub options: Vec<String>,
    pub allow_multiple: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct QuizConfig {
    pub options: Vec<String>,
    /// Indices into `options`.
    pub correct_answers: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CtaConfig {
    pub button_text: String,
    pub button_url: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DownloadConfig {
    pub file_url: String,
    pub file_name: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct QuestionConfig {
    pub placeholder: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FeedbackConfig {
    pub max_rating: u8,
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        Self { max_rating: 5 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ContactFormConfig {
    pub fields: Vec<String>,
}

impl Default for ContactFormConfig {
    fn default() -> Self {
        Self {
            fields: vec!["name".to_string(), "email".to_string()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TipConfig {
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SpecialOfferConfig {
    pub headline: String,
    pub button_text: String,
    pub button_url: String,
    /// Countdown in seconds shown on the offer, if any.
    pub expires_in: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PauseConfig {
    pub message: String,
}

/// Type-specific configuration. The variant determines the interaction type.
#[derive(Debug, Clone, PartialEq)]
pub enum InteractionConfig {
    Poll(PollConfig),
    Quiz(QuizConfig),
    Cta(CtaConfig),
    Download(DownloadConfig),
    Question(QuestionConfig),
    Feedback(FeedbackConfig),
    ContactForm(ContactFormConfig),
    Tip(TipConfig),
    SpecialOffer(SpecialOfferConfig),
    Pause(PauseConfig),
}

impl InteractionConfig {
    pub fn kind(&self) -> InteractionKind {
        match self {
            InteractionConfig::Poll(_) => InteractionKind::Poll,
            InteractionConfig::Quiz(_) => InteractionKind::Quiz,
            InteractionConfig::Cta(_) => InteractionKind::Cta,
            InteractionConfig::Download(_) => InteractionKind::Download,
            InteractionConfig::Question(_) => InteractionKind::Question,
            InteractionConfig::Feedback(_) => InteractionKind::Feedback,
            InteractionConfig::ContactForm(_) => InteractionKind::ContactForm,
            InteractionConfig::Tip(_) => InteractionKind::Tip,
            InteractionConfig::SpecialOffer(_) => InteractionKind::SpecialOffer,
            InteractionConfig::Pause(_) => InteractionKind::Pause,
        }
    }

    /// Seed configuration offered by the add flow after picking a type.
    pub fn default_for(kind: InteractionKind) -> Self {
        match kind {
            InteractionKind::Poll => InteractionConfig::Poll(PollConfig {
                options: vec![String::new(), String::new()],
                allow_multiple: false,
            }),
            InteractionKind::Quiz => InteractionConfig::Quiz(QuizConfig {
                options: vec![String::new(), String::new()],
                correct_answers: vec![0],
            }),
            InteractionKind::Cta => InteractionConfig::Cta(CtaConfig {
                button_text: "Learn more".to_string(),
                button_url: String::new(),
            }),
            InteractionKind::Download => InteractionConfig::Download(DownloadConfig::default()),
            InteractionKind::Question => InteractionConfig::Question(QuestionConfig {
                placeholder: "Type your question...".to_string(),
            }),
            InteractionKind::Feedback => InteractionConfig::Feedback(FeedbackConfig::default()),
            InteractionKind::ContactForm => {
                InteractionConfig::ContactForm(ContactFormConfig::default())
            }
            InteractionKind::Tip => InteractionConfig::Tip(TipConfig::default()),
            InteractionKind::SpecialOffer => {
                InteractionConfig::SpecialOffer(SpecialOfferConfig::default())
            }
            InteractionKind::Pause => InteractionConfig::Pause(PauseConfig::default()),
        }
    }

    /// Answer options for POLL/QUIZ, `None` for other types.
    pub fn options(&self) -> Option<&[String]> {
        match self {
            InteractionConfig::Poll(c) => Some(&c.options),
            InteractionConfig::Quiz(c) => Some(&c.options),
            _ => None,
        }
    }

    pub fn options_mut(&mut self) -> Option<&mut Vec<String>> {
        match self {
            InteractionConfig::Poll(c) => Some(&mut c.options),
            InteractionConfig::Quiz(c) => Some(&mut c.options),
            _ => None,
        }
    }

    fn to_value(&self) -> serde_json::Value {
        let value = match self {
            InteractionConfig::Poll(c) => serde_json::to_value(c),
            InteractionConfig::Quiz(c) => serde_json::to_value(c),
            InteractionConfig::Cta(c) => serde_json::to_value(c),
            InteractionConfig::Download(c) => serde_json::to_value(c),
            InteractionConfig::Question(c) => serde_json::to_value(c),
            InteractionConfig::Feedback(c) => serde_json::to_value(c),
            InteractionConfig::ContactForm(c) => serde_json::to_value(c),
            InteractionConfig::Tip(c) => serde_json::to_value(c),
            InteractionConfig::SpecialOffer(c) => serde_json::to_value(c),
            InteractionConfig::Pause(c) => serde_json::to_value(c),
        };
        // Plain structs of strings/numbers always serialize
        value.unwrap_or(serde_json::Value::Null)
    }

    fn from_value(
        kind: InteractionKind,
        value: serde_json::Value,
    ) -> Result<Self, serde_json::Error> {
        // Stores send `null` or `{}` for types without extra fields
        let value = if value.is_null() {
            serde_json::Value::Object(Default::default())
        } else {
            value
        };
        Ok(match kind {
            InteractionKind::Poll => InteractionConfig::Poll(serde_json::from_value(value)?),
            InteractionKind::Quiz => InteractionConfig::Quiz(serde_json::from_value(value)?),
            InteractionKind::Cta => InteractionConfig::Cta(serde_json::from_value(value)?),
            InteractionKind::Download => {
                InteractionConfig::Download(serde_json::from_value(value)?)
            }
            InteractionKind::Question => {
                InteractionConfig::Question(serde_json::from_value(value)?)
            }
            InteractionKind::Feedback => {
                InteractionConfig::Feedback(serde_json::from_value(value)?)
            }
            InteractionKind::ContactForm => {
                InteractionConfig::ContactForm(serde_json::from_value(value)?)
            }
            InteractionKind::Tip => InteractionConfig::Tip(serde_json::from_value(value)?),
            InteractionKind::SpecialOffer => {
                InteractionConfig::SpecialOffer(serde_json::from_value(value)?)
            }
            InteractionKind::Pause => InteractionConfig::Pause(serde_json::from_value(value)?),
        })
    }
}

/// A time-triggered interactive element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "WireInteraction", try_from = "WireInteraction")]
pub struct Interaction {
    /// `None` until the store has accepted the draft.
    pub id: Option<InteractionId>,
    pub config: InteractionConfig,
    /// Seconds into the video.
    pub trigger_time: f64,
    /// Seconds on screen; `None` = until dismissed.
    pub duration: Option<f64>,
    pub title: String,
    pub pause_video: bool,
    pub required: bool,
    pub show_on_replay: bool,
    pub enabled: bool,
    pub position: ScreenPosition,
}

impl Interaction {
    /// New unsaved draft with default flags.
    pub fn draft(config: InteractionConfig, trigger_time: f64, title: impl Into<String>) -> Self {
        let pause_video = matches!(config, InteractionConfig::Pause(_));
        Self {
            id: None,
            config,
            trigger_time,
            duration: None,
            title: title.into(),
            pause_video,
            required: false,
            show_on_replay: true,
            enabled: true,
            position: ScreenPosition::default(),
        }
    }

    pub fn kind(&self) -> InteractionKind {
        self.config.kind()
    }

    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    /// End of the visibility window, `None` when shown until dismissed.
    pub fn end_time(&self) -> Option<f64> {
        self.duration.map(|d| self.trigger_time + d)
    }

    /// True when this interaction should be on screen at playback time `t`.
    pub fn is_visible_at(&self, t: f64) -> bool {
        if !self.enabled || t < self.trigger_time {
            return false;
        }
        match self.end_time() {
            Some(end) => t < end,
            None => true,
        }
    }

    /// PAUSE interactions always stop playback; others only when flagged.
    pub fn pauses_playback(&self) -> bool {
        self.pause_video || self.kind() == InteractionKind::Pause
    }

    /// Swap to another type, reseeding the config but keeping shared fields.
    pub fn change_kind(&mut self, kind: InteractionKind) {
        if self.kind() != kind {
            self.config = InteractionConfig::default_for(kind);
            if kind == InteractionKind::Pause {
                self.pause_video = true;
            }
        }
    }
}

/// Partial update body (`PATCH`). Only set fields are sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger_time: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

impl InteractionPatch {
    pub fn trigger_time(t: f64) -> Self {
        Self {
            trigger_time: Some(t),
            ..Default::default()
        }
    }

    pub fn enabled(enabled: bool) -> Self {
        Self {
            enabled: Some(enabled),
            ..Default::default()
        }
    }

    pub fn apply_to(&self, interaction: &mut Interaction) {
        if let Some(t) = self.trigger_time {
            interaction.trigger_time = t;
        }
        if let Some(enabled) = self.enabled {
            interaction.enabled = enabled;
        }
    }
}

// ===== Wire format =====

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireInteraction {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<InteractionId>,
    #[serde(rename = "type")]
    kind: InteractionKind,
    trigger_time: f64,
    #[serde(default)]
    duration: Option<f64>,
    #[serde(default)]
    title: String,
    #[serde(default)]
    config: serde_json::Value,
    #[serde(default)]
    pause_video: bool,
    #[serde(default)]
    required: bool,
    #[serde(default = "default_true")]
    show_on_replay: bool,
    #[serde(default = "default_true")]
    enabled: bool,
    #[serde(default)]
    position: ScreenPosition,
}

impl From<Interaction> for WireInteraction {
    fn from(i: Interaction) -> Self {
        Self {
            id: i.id,
            kind: i.config.kind(),
            trigger_time: i.trigger_time,
            duration: i.duration,
            title: i.title,
            config: i.config.to_value(),
            pause_video: i.pause_video,
            required: i.required,
            show_on_replay: i.show_on_replay,
            enabled: i.enabled,
            position: i.position,
        }
    }
}

impl TryFrom<WireInteraction> for Interaction {
    type Error = String;

    fn try_from(w: WireInteraction) -> Result<Self, Self::Error> {
        let config = InteractionConfig::from_value(w.kind, w.config)
            .map_err(|e| format!("invalid {} config: {}", w.kind.label(), e))?;
        Ok(Self {
            id: w.id,
            config,
            trigger_time: w.trigger_time,
            duration: w.duration,
            title: w.title,
            pause_video: w.pause_video,
            required: w.required,
            show_on_replay: w.show_on_replay,
            enabled: w.enabled,
            position: w.position,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_shape_uses_type_and_config() {
        let mut poll = Interaction::draft(
            InteractionConfig::Poll(PollConfig {
                options: vec!["A".into(), "B".into()],
                allow_multiple: false,
            }),
            30.0,
            "Quick check",
        );
        poll.id = Some("7".into());

        let json = serde_json::to_value(&poll).unwrap();
        assert_eq!(json["type"], "POLL");
        assert_eq!(json["triggerTime"], 30.0);
        assert_eq!(json["config"]["options"][1], "B");
        assert_eq!(json["position"], "BOTTOM_RIGHT");
        assert!(json["duration"].is_null());
    }

    #[test]
    fn test_numeric_id_and_missing_config() {
        let json = r#"{"id": 12, "type": "PAUSE", "triggerTime": 5, "title": "Break"}"#;
        let i: Interaction = serde_json::from_str(json).unwrap();
        assert_eq!(i.id, Some(InteractionId::from("12")));
        assert_eq!(i.kind(), InteractionKind::Pause);
        assert!(i.enabled);
        assert!(i.show_on_replay);
    }

    #[test]
    fn test_config_shape_mismatch_rejected() {
        let json = r#"{"type": "QUIZ", "triggerTime": 5, "title": "Q", "config": {"options": "nope"}}"#;
        assert!(serde_json::from_str::<Interaction>(json).is_err());
    }

    #[test]
    fn test_visibility_window() {
        let mut tip = Interaction::draft(InteractionConfig::default_for(InteractionKind::Tip), 10.0, "Tip");
        tip.duration = Some(5.0);
        assert!(!tip.is_visible_at(9.9));
        assert!(tip.is_visible_at(10.0));
        assert!(tip.is_visible_at(14.9));
        assert!(!tip.is_visible_at(15.0));

        tip.duration = None;
        assert!(tip.is_visible_at(500.0));

        tip.enabled = false;
        assert!(!tip.is_visible_at(12.0));
    }

    #[test]
    fn test_change_kind_reseeds_config() {
        let mut i = Interaction::draft(InteractionConfig::default_for(InteractionKind::Cta), 0.0, "x");
        i.change_kind(InteractionKind::Pause);
        assert_eq!(i.kind(), InteractionKind::Pause);
        assert!(i.pauses_playback());
        assert_eq!(i.title, "x");
    }

    #[test]
    fn test_patch_only_serializes_set_fields() {
        let patch = InteractionPatch::trigger_time(15.0);
        let json = serde_json::to_string(&patch).unwrap();
        assert_eq!(json, r#"{"triggerTime":15.0}"#);
    }
}
