//! Timeline widget - state and configuration.
//! Shared by the strip/minimap renderers and the editor. Data flow: UI input
//! goes through `MarkerGestures` (gestures.rs) which emits actions; the editor
//! applies them to `TimelineState` (zoom/scroll) and the interaction list.
//! Renderers read `TimelineConfig`/`TimelineState` to draw markers and ticks.
//!
//! # Viewport
//!
//! The visible window is `[viewport_start, viewport_start + duration / zoom]`.
//! Zoom changes recenter on the playhead; the window never leaves
//! `[0, video_duration]`.

use super::gestures::MarkerGestures;
use crate::utils::time::clamp_range;
use serde::{Deserialize, Serialize};

pub const MIN_ZOOM: f64 = 1.0;
pub const MAX_ZOOM: f64 = 20.0;
/// Multiplier applied by one zoom-in/zoom-out step.
pub const ZOOM_STEP: f64 = 2.0;

/// Configuration for timeline widget
#[derive(Clone, Debug)]
pub struct TimelineConfig {
    pub strip_height: f32,
    pub ruler_height: f32,
    pub minimap_height: f32,
    pub marker_radius: f32,
    pub show_time_labels: bool,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            strip_height: 48.0,
            ruler_height: 20.0,
            minimap_height: 14.0,
            marker_radius: 7.0,
            show_time_labels: true,
        }
    }
}

/// Visible time window over a video of known duration.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    zoom: f64,
    viewport_start: f64,
    #[serde(skip)]
    video_duration: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            zoom: MIN_ZOOM,
            viewport_start: 0.0,
            video_duration: 0.0,
        }
    }
}

impl Viewport {
    pub fn new(video_duration: f64) -> Self {
        let mut vp = Self::default();
        vp.set_duration(video_duration);
        vp
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn viewport_start(&self) -> f64 {
        self.viewport_start
    }

    pub fn video_duration(&self) -> f64 {
        self.video_duration
    }

    pub fn viewport_duration(&self) -> f64 {
        self.video_duration / self.zoom
    }

    pub fn viewport_end(&self) -> f64 {
        self.viewport_start + self.viewport_duration()
    }

    /// Nothing can be mapped until metadata delivered a positive duration.
    pub fn is_degenerate(&self) -> bool {
        self.video_duration <= 0.0
    }

    /// Update duration (metadata load). Keeps zoom, re-clamps the window.
    pub fn set_duration(&mut self, video_duration: f64) {
        self.video_duration = if video_duration.is_finite() && video_duration > 0.0 {
            video_duration
        } else {
            0.0
        };
        self.clamp_start();
    }

    fn max_start(&self) -> f64 {
        (self.video_duration - self.viewport_duration()).max(0.0)
    }

    fn clamp_start(&mut self) {
        if self.zoom <= MIN_ZOOM {
            self.viewport_start = 0.0;
        } else {
            self.viewport_start = clamp_range(self.viewport_start, 0.0, self.max_start());
        }
    }

    /// Set zoom and recenter the window on `current_time`.
    /// Returns true if zoom or window changed.
    pub fn set_zoom(&mut self, zoom: f64, current_time: f64) -> bool {
        let before = *self;
        let zoom = if zoom.is_finite() { zoom } else { MIN_ZOOM };
        self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        if self.zoom <= MIN_ZOOM {
            self.viewport_start = 0.0;
        } else {
            self.center_on(current_time);
        }
        *self != before
    }

    pub fn zoom_in(&mut self, current_time: f64) -> bool {
        self.set_zoom(self.zoom * ZOOM_STEP, current_time)
    }

    pub fn zoom_out(&mut self, current_time: f64) -> bool {
        self.set_zoom(self.zoom / ZOOM_STEP, current_time)
    }

    pub fn reset_zoom(&mut self) -> bool {
        self.set_zoom(MIN_ZOOM, 0.0)
    }

    /// Put `time` in the middle of the window (clamped to the video).
    pub fn center_on(&mut self, time: f64) {
        let t = if time.is_finite() { time } else { 0.0 };
        self.viewport_start = clamp_range(t - self.viewport_duration() / 2.0, 0.0, self.max_start());
    }

    /// Follow-the-playhead: while playing, recenter once the playhead leaves
    /// the window. Returns true if the window scrolled.
    pub fn follow_playhead(&mut self, current_time: f64, playing: bool) -> bool {
        if !playing || self.zoom <= MIN_ZOOM || self.is_degenerate() || self.contains(current_time) {
            return false;
        }
        self.center_on(current_time);
        true
    }

    /// Shift the window by `dt` seconds (wheel/drag scrolling).
    pub fn scroll_by(&mut self, dt: f64) {
        if self.zoom > MIN_ZOOM && dt.is_finite() {
            self.viewport_start = clamp_range(self.viewport_start + dt, 0.0, self.max_start());
        }
    }

    pub fn contains(&self, t: f64) -> bool {
        t >= self.viewport_start && t <= self.viewport_end()
    }

    /// Horizontal fraction (0..=1) of `t` inside the window, `None` outside.
    pub fn time_to_fraction(&self, t: f64) -> Option<f64> {
        let vd = self.viewport_duration();
        if vd <= 0.0 || !self.contains(t) {
            return None;
        }
        Some((t - self.viewport_start) / vd)
    }

    /// Inverse mapping, clamped to `[0, video_duration]`.
    pub fn fraction_to_time(&self, fraction: f64) -> f64 {
        if self.is_degenerate() || !fraction.is_finite() {
            return 0.0;
        }
        clamp_range(
            self.viewport_start + fraction * self.viewport_duration(),
            0.0,
            self.video_duration,
        )
    }

    /// Pointer offset (pixels from the strip's left edge) to time.
    pub fn pixel_to_time(&self, x: f64, width: f64) -> f64 {
        if width <= 0.0 {
            return self.viewport_start;
        }
        self.fraction_to_time(x / width)
    }

    /// Time to pixel offset; unclamped so callers can cull off-screen items.
    pub fn time_to_pixel(&self, t: f64, width: f64) -> f64 {
        let vd = self.viewport_duration();
        if vd <= 0.0 {
            return 0.0;
        }
        (t - self.viewport_start) / vd * width
    }
}

/// Timeline state (persistent between frames)
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineState {
    pub viewport: Viewport,
    /// Recenter on the playhead while playing.
    pub follow_playhead: bool,
    /// Active pointer gesture (drag session lives here)
    #[serde(skip)]
    pub gestures: MarkerGestures,
    /// Strip width seen by the last render, for keyboard zoom/scroll math
    #[serde(skip)]
    pub last_strip_width: f32,
}

impl TimelineState {
    pub fn new(video_duration: f64) -> Self {
        Self {
            viewport: Viewport::new(video_duration),
            follow_playhead: true,
            gestures: MarkerGestures::default(),
            last_strip_width: 0.0,
        }
    }

    /// Per-playback-tick update; returns true if the window scrolled.
    pub fn on_time_update(&mut self, current_time: f64, playing: bool) -> bool {
        self.follow_playhead && self.viewport.follow_playhead(current_time, playing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_zoom_10x_centered() {
        let mut vp = Viewport::new(600.0);
        vp.set_zoom(10.0, 300.0);
        assert!((vp.viewport_duration() - 60.0).abs() < EPS);
        assert!((vp.viewport_start() - 270.0).abs() < EPS);
        assert!((vp.viewport_end() - 330.0).abs() < EPS);
    }

    #[test]
    fn test_zoom_clamped_at_edges() {
        let mut vp = Viewport::new(600.0);
        vp.set_zoom(10.0, 10.0);
        assert_eq!(vp.viewport_start(), 0.0);
        assert!((vp.viewport_end() - 60.0).abs() < EPS);

        vp.set_zoom(10.0, 595.0);
        assert!((vp.viewport_start() - 540.0).abs() < EPS);
        assert!((vp.viewport_end() - 600.0).abs() < EPS);
    }

    #[test]
    fn test_zoom_in_keeps_playhead_visible() {
        for duration in [1.0, 37.5, 600.0, 7200.0] {
            for step in 0..=20 {
                let current = duration * step as f64 / 20.0;
                let mut vp = Viewport::new(duration);
                for _ in 0..6 {
                    vp.zoom_in(current);
                    assert!(vp.zoom() <= MAX_ZOOM);
                    assert!(vp.viewport_start() >= 0.0);
                    assert!(vp.viewport_end() <= duration + EPS);
                    assert!(
                        current >= vp.viewport_start() - EPS && current <= vp.viewport_end() + EPS,
                        "t={} not in [{}, {}] at zoom {}",
                        current,
                        vp.viewport_start(),
                        vp.viewport_end(),
                        vp.zoom()
                    );
                }
            }
        }
    }

    #[test]
    fn test_zoom_bounds_and_reset() {
        let mut vp = Viewport::new(600.0);
        vp.set_zoom(100.0, 300.0);
        assert_eq!(vp.zoom(), MAX_ZOOM);
        vp.set_zoom(0.2, 300.0);
        assert_eq!(vp.zoom(), MIN_ZOOM);
        assert_eq!(vp.viewport_start(), 0.0);

        vp.set_zoom(4.0, 500.0);
        assert!(vp.viewport_start() > 0.0);
        vp.zoom_out(500.0);
        vp.zoom_out(500.0);
        assert_eq!(vp.zoom(), MIN_ZOOM);
        assert_eq!(vp.viewport_start(), 0.0);
    }

    #[test]
    fn test_fraction_round_trip() {
        let mut vp = Viewport::new(600.0);
        vp.set_zoom(7.0, 123.0);
        let (start, vd) = (vp.viewport_start(), vp.viewport_duration());
        let end = vp.viewport_end();
        for i in 0..=100 {
            let t = start + vd * (i as f64 / 100.0);
            let f = vp.time_to_fraction(t).unwrap();
            assert!((0.0..=1.0).contains(&f));
            assert!((vp.fraction_to_time(f) - t).abs() < 1e-6);
        }
        assert!(vp.time_to_fraction(start - 1.0).is_none());
        assert!(vp.time_to_fraction(end + 1.0).is_none());
    }

    #[test]
    fn test_pixel_to_time_clamps() {
        let vp = Viewport::new(600.0);
        assert_eq!(vp.pixel_to_time(-50.0, 1000.0), 0.0);
        assert_eq!(vp.pixel_to_time(1500.0, 1000.0), 600.0);
        assert!((vp.pixel_to_time(250.0, 1000.0) - 150.0).abs() < EPS);
    }

    #[test]
    fn test_follow_playhead() {
        let mut vp = Viewport::new(600.0);
        vp.set_zoom(10.0, 30.0);
        assert!(!vp.follow_playhead(45.0, true));
        assert!(!vp.follow_playhead(200.0, false));
        assert!(vp.follow_playhead(200.0, true));
        assert!(vp.contains(200.0));
        assert!((vp.viewport_start() - 170.0).abs() < EPS);
    }

    #[test]
    fn test_degenerate_duration() {
        let mut vp = Viewport::new(0.0);
        assert!(vp.is_degenerate());
        assert_eq!(vp.fraction_to_time(0.5), 0.0);
        assert!(vp.time_to_fraction(0.0).is_none());
        vp.set_duration(f64::NAN);
        assert!(vp.is_degenerate());
        vp.set_duration(120.0);
        assert_eq!(vp.viewport_end(), 120.0);
    }

    #[test]
    fn test_duration_shrink_reclamps_window() {
        let mut vp = Viewport::new(600.0);
        vp.set_zoom(10.0, 580.0);
        vp.set_duration(300.0);
        assert!(vp.viewport_end() <= 300.0 + EPS);
    }
}
