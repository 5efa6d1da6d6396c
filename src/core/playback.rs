//! Host video element.
//!
//! The editor only needs a clock and transport controls from the video: current
//! time, duration once metadata is in, play/pause/seek. [`VideoHost`] is that
//! seam; [`PlaybackState`] is the built-in wall-clock host the app shell and
//! tests drive.
//!
//! # Timing model
//!
//! `update(now)` advances `current_time` by the wall time since the previous
//! update while playing. Reaching the end stops playback at `duration`.
//! Nothing advances before metadata has delivered a positive duration.

use log::{info, trace, warn};
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Load state of the video element.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum PlaybackStatus {
    #[default]
    Loading,
    Ready,
    Failed(String),
}

/// What the editor reads from and sends to the video.
pub trait VideoHost {
    fn current_time(&self) -> f64;
    /// `None` until metadata has loaded.
    fn duration(&self) -> Option<f64>;
    fn is_playing(&self) -> bool;
    fn play(&mut self);
    fn pause(&mut self);
    /// Seek, clamped to the video.
    fn seek(&mut self, t: f64);
    fn status(&self) -> PlaybackStatus;

    /// Advance the clock to `now`. Returns the new time when it moved.
    /// Hosts with their own clock leave this alone.
    fn update(&mut self, _now: Instant) -> Option<f64> {
        None
    }

    /// Reload after a failure.
    fn retry(&mut self) {}

    fn toggle_play(&mut self) {
        if self.is_playing() {
            self.pause();
        } else {
            self.play();
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackState {
    current_time: f64,
    duration: Option<f64>,
    #[serde(skip)]
    playing: bool,
    /// Playback speed multiplier
    rate: f64,
    #[serde(skip)]
    status: PlaybackStatus,
    #[serde(skip)]
    last_tick: Option<Instant>,
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self {
            current_time: 0.0,
            duration: None,
            playing: false,
            rate: 1.0,
            status: PlaybackStatus::Loading,
            last_tick: None,
        }
    }
}

impl PlaybackState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Host with metadata already loaded.
    pub fn with_duration(duration: f64) -> Self {
        let mut state = Self::new();
        state.set_duration(duration);
        state
    }

    /// Metadata arrived. Non-positive or non-finite durations are a load failure.
    pub fn set_duration(&mut self, duration: f64) {
        if duration.is_finite() && duration > 0.0 {
            info!("Video ready: {:.1}s", duration);
            self.duration = Some(duration);
            self.status = PlaybackStatus::Ready;
            self.current_time = self.current_time.clamp(0.0, duration);
        } else {
            self.fail(format!("invalid duration {}", duration));
        }
    }

    pub fn fail(&mut self, message: impl Into<String>) {
        let message = message.into();
        warn!("Video failed to load: {}", message);
        self.playing = false;
        self.last_tick = None;
        self.status = PlaybackStatus::Failed(message);
    }

    /// Back to `Loading` after a failure; metadata must arrive again.
    pub fn reload(&mut self) {
        if matches!(self.status, PlaybackStatus::Failed(_)) {
            info!("Retrying video load");
            self.status = PlaybackStatus::Loading;
            self.duration = None;
        }
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    pub fn set_rate(&mut self, rate: f64) {
        if rate.is_finite() && rate > 0.0 {
            self.rate = rate;
        }
    }

    /// Wall-clock advance while playing.
    pub fn advance(&mut self, now: Instant) -> Option<f64> {
        if !self.playing {
            return None;
        }
        let duration = self.duration?;
        let Some(last) = self.last_tick.replace(now) else {
            return None;
        };
        let dt = now.saturating_duration_since(last).as_secs_f64() * self.rate;
        if dt <= 0.0 {
            return None;
        }

        let next = self.current_time + dt;
        if next >= duration {
            trace!("Reached end of video, stopping");
            self.current_time = duration;
            self.playing = false;
            self.last_tick = None;
        } else {
            self.current_time = next;
        }
        Some(self.current_time)
    }
}

impl VideoHost for PlaybackState {
    fn current_time(&self) -> f64 {
        self.current_time
    }

    fn duration(&self) -> Option<f64> {
        self.duration
    }

    fn is_playing(&self) -> bool {
        self.playing
    }

    fn play(&mut self) {
        let Some(duration) = self.duration else {
            return;
        };
        if self.current_time >= duration {
            self.current_time = 0.0;
        }
        if !self.playing {
            trace!("Playback started at {:.2}s", self.current_time);
            self.playing = true;
            self.last_tick = Some(Instant::now());
        }
    }

    fn pause(&mut self) {
        if self.playing {
            trace!("Playback paused at {:.2}s", self.current_time);
            self.playing = false;
            self.last_tick = None;
        }
    }

    fn seek(&mut self, t: f64) {
        let max = self.duration.unwrap_or(0.0);
        self.current_time = if t.is_finite() { t.clamp(0.0, max) } else { 0.0 };
    }

    fn status(&self) -> PlaybackStatus {
        self.status.clone()
    }

    fn update(&mut self, now: Instant) -> Option<f64> {
        self.advance(now)
    }

    fn retry(&mut self) {
        self.reload();
    }
}
