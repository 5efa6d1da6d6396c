//! Candidate validation and timing-conflict detection.
//!
//! Two pure checks run on every edit of the open add/edit form:
//!
//! - [`validate`] - blocking errors. A candidate with errors cannot be saved
//!   and there is no override.
//! - [`detect_conflicts`] - non-blocking warnings (timing heuristics). Saving
//!   with warnings goes through an explicit "save anyway" confirmation.
//!
//! Neither touches the network or the notification area; results live only
//! in the form state and are dropped when the form closes.

use crate::entities::{Interaction, InteractionConfig};
use crate::utils::time::format_time as format_seconds;
use once_cell::sync::Lazy;
use regex::Regex;

/// Default window (seconds) inside which two enabled interactions collide.
pub const DEFAULT_COLLISION_TOLERANCE: f64 = 5.0;

/// Default minimum spacing (seconds) between two video-pausing interactions.
pub const DEFAULT_PAUSE_SPACING: f64 = 10.0;

static HTTP_URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^https?://[^\s/?#]+\.[^\s/?#]+(?:[/?#]\S*)?$").expect("valid regex"));

/// Heuristic thresholds for [`detect_conflicts`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConflictRules {
    pub collision_tolerance: f64,
    pub pause_spacing: f64,
}

impl Default for ConflictRules {
    fn default() -> Self {
        Self {
            collision_tolerance: DEFAULT_COLLISION_TOLERANCE,
            pause_spacing: DEFAULT_PAUSE_SPACING,
        }
    }
}

/// Errors and warnings for one candidate, recomputed on every change.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn check(
        candidate: &Interaction,
        existing: &[Interaction],
        video_duration: f64,
        rules: &ConflictRules,
    ) -> Self {
        let mut warnings = detect_conflicts(candidate, existing, rules);
        warnings.extend(overrun_warning(candidate, video_duration));
        Self {
            errors: validate(candidate, video_duration),
            warnings,
        }
    }

    /// Save must be refused.
    pub fn is_blocked(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Save needs a "proceed anyway" confirmation.
    pub fn needs_confirmation(&self) -> bool {
        self.errors.is_empty() && !self.warnings.is_empty()
    }

    pub fn is_clean(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty()
    }
}

fn is_http_url(s: &str) -> bool {
    HTTP_URL.is_match(s.trim())
}

fn non_empty_count(options: &[String]) -> usize {
    options.iter().filter(|o| !o.trim().is_empty()).count()
}

/// Blocking checks. Empty result = savable.
///
/// A `video_duration` of zero or less means the length is not known yet; the
/// upper bound on the trigger time is skipped until it is.
pub fn validate(candidate: &Interaction, video_duration: f64) -> Vec<String> {
    let mut errors = Vec::new();

    if candidate.title.trim().is_empty() {
        errors.push("Title is required".to_string());
    }

    let t = candidate.trigger_time;
    if !t.is_finite() {
        errors.push("Trigger time must be a number".to_string());
    } else if t < 0.0 {
        errors.push("Trigger time cannot be negative".to_string());
    } else if video_duration > 0.0 && t > video_duration {
        errors.push(format!(
            "Trigger time {} is past the end of the video ({})",
            format_seconds(t),
            format_seconds(video_duration)
        ));
    }

    if let Some(d) = candidate.duration {
        if !d.is_finite() || d <= 0.0 {
            errors.push("Display duration must be greater than zero".to_string());
        }
    }

    match &candidate.config {
        InteractionConfig::Poll(c) => {
            if non_empty_count(&c.options) < 2 {
                errors.push("A poll needs at least 2 options".to_string());
            }
        }
        InteractionConfig::Quiz(c) => {
            if non_empty_count(&c.options) < 2 {
                errors.push("A quiz needs at least 2 options".to_string());
            }
            if c.correct_answers.is_empty() {
                errors.push("Mark at least one correct answer".to_string());
            } else if c.correct_answers.iter().any(|&idx| {
                c.options
                    .get(idx)
                    .map(|o| o.trim().is_empty())
                    .unwrap_or(true)
            }) {
                errors.push("A correct answer points to an empty or missing option".to_string());
            }
        }
        InteractionConfig::Cta(c) => {
            check_button(&c.button_text, &c.button_url, &mut errors);
        }
        InteractionConfig::SpecialOffer(c) => {
            if c.headline.trim().is_empty() {
                errors.push("Offer headline is required".to_string());
            }
            check_button(&c.button_text, &c.button_url, &mut errors);
            if let Some(exp) = c.expires_in {
                if !exp.is_finite() || exp <= 0.0 {
                    errors.push("Offer countdown must be greater than zero".to_string());
                }
            }
        }
        InteractionConfig::Download(c) => {
            if c.file_url.trim().is_empty() {
                errors.push("Download file is required".to_string());
            } else if !is_http_url(&c.file_url) {
                errors.push("Download link must be an http(s) URL".to_string());
            }
        }
        InteractionConfig::Feedback(c) => {
            if !(1..=10).contains(&c.max_rating) {
                errors.push("Rating scale must be between 1 and 10".to_string());
            }
        }
        InteractionConfig::ContactForm(c) => {
            if c.fields.iter().all(|f| f.trim().is_empty()) {
                errors.push("A contact form needs at least one field".to_string());
            }
        }
        InteractionConfig::Question(_) | InteractionConfig::Tip(_) | InteractionConfig::Pause(_) => {}
    }

    errors
}

fn check_button(text: &str, url: &str, errors: &mut Vec<String>) {
    if text.trim().is_empty() {
        errors.push("Button text is required".to_string());
    }
    if url.trim().is_empty() {
        errors.push("Button link is required".to_string());
    } else if !is_http_url(url) {
        errors.push("Button link must be an http(s) URL".to_string());
    }
}

/// Non-blocking timing heuristics against the rest of the set.
///
/// The candidate itself (same id) is skipped, so re-validating an existing
/// interaction never collides with its own stored copy.
pub fn detect_conflicts(
    candidate: &Interaction,
    existing: &[Interaction],
    rules: &ConflictRules,
) -> Vec<String> {
    let mut warnings = Vec::new();
    if !candidate.trigger_time.is_finite() {
        return warnings;
    }

    let others = existing.iter().filter(|other| match (&candidate.id, &other.id) {
        (Some(a), Some(b)) => a != b,
        _ => true,
    });

    for other in others {
        if !other.enabled {
            continue;
        }
        let gap = (other.trigger_time - candidate.trigger_time).abs();

        if gap <= rules.collision_tolerance {
            warnings.push(format!(
                "\"{}\" ({}) triggers at {}, within {}s of this one",
                other.title,
                other.kind().label(),
                format_seconds(other.trigger_time),
                rules.collision_tolerance
            ));
        }

        if candidate.pauses_playback() && other.pauses_playback() && gap <= rules.pause_spacing {
            warnings.push(format!(
                "Video would pause twice in {:.1}s (\"{}\" at {})",
                gap,
                other.title,
                format_seconds(other.trigger_time)
            ));
        }
    }

    warnings
}

/// Warn when a timed overlay would still be up after the video ends.
fn overrun_warning(candidate: &Interaction, video_duration: f64) -> Option<String> {
    let end = candidate.end_time()?;
    if video_duration > 0.0 && end.is_finite() && candidate.trigger_time <= video_duration && end > video_duration {
        Some(format!(
            "Shown until {}, after the video ends at {}",
            format_seconds(end),
            format_seconds(video_duration)
        ))
    } else {
        None
    }
}
