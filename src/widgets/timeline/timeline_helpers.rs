//! Timeline helpers: tick spacing, minimap mapping and small drawing utilities.
use super::Viewport;
use crate::entities::InteractionKind;
use crate::utils::time::clamp_range;
use eframe::egui::Color32;

/// Tick spacing table keyed by visible duration: (longer than, tick seconds).
/// First matching row wins; anything <= 30s uses 5s ticks.
const TICK_TABLE: &[(f64, f64)] = &[
    (3600.0, 600.0),
    (1800.0, 300.0),
    (600.0, 120.0),
    (300.0, 60.0),
    (120.0, 30.0),
    (60.0, 15.0),
    (30.0, 10.0),
];
const MIN_TICK: f64 = 5.0;

/// Labelled tick interval for a visible window of `viewport_duration` seconds.
pub fn tick_interval(viewport_duration: f64) -> f64 {
    TICK_TABLE
        .iter()
        .find(|(longer_than, _)| viewport_duration > *longer_than)
        .map(|(_, step)| *step)
        .unwrap_or(MIN_TICK)
}

/// Tick times inside the viewport, aligned to multiples of the interval.
pub fn ticks(viewport: &Viewport) -> Vec<f64> {
    if viewport.is_degenerate() {
        return Vec::new();
    }
    let step = tick_interval(viewport.viewport_duration());
    let first = (viewport.viewport_start() / step).ceil() * step;
    let end = viewport.viewport_end();

    let mut out = Vec::new();
    let mut i = 0u32;
    loop {
        let t = first + step * i as f64;
        if t > end + 1e-9 {
            break;
        }
        out.push(t);
        i += 1;
    }
    out
}

/// Full-duration overview strip. Unaffected by the main viewport's zoom.
#[derive(Clone, Copy, Debug)]
pub struct Minimap {
    pub video_duration: f64,
}

impl Minimap {
    pub fn new(video_duration: f64) -> Self {
        Self { video_duration }
    }

    pub fn time_to_fraction(&self, t: f64) -> f64 {
        if self.video_duration <= 0.0 {
            return 0.0;
        }
        clamp_range(t / self.video_duration, 0.0, 1.0)
    }

    pub fn fraction_to_time(&self, fraction: f64) -> f64 {
        if self.video_duration <= 0.0 || !fraction.is_finite() {
            return 0.0;
        }
        clamp_range(fraction * self.video_duration, 0.0, self.video_duration)
    }

    /// `(start_fraction, width_fraction)` of the main window, only when zoomed.
    pub fn viewport_rect(&self, viewport: &Viewport) -> Option<(f64, f64)> {
        if viewport.zoom() <= super::MIN_ZOOM || self.video_duration <= 0.0 {
            return None;
        }
        Some((
            self.time_to_fraction(viewport.viewport_start()),
            viewport.viewport_duration() / self.video_duration,
        ))
    }

    /// Click on the minimap: recenter the main window and return the seek time.
    pub fn click(&self, fraction: f64, viewport: &mut Viewport) -> f64 {
        let t = self.fraction_to_time(fraction);
        viewport.center_on(t);
        t
    }
}

/// Marker color per interaction type.
pub fn kind_color(kind: InteractionKind) -> Color32 {
    match kind {
        InteractionKind::Poll => Color32::from_rgb(80, 160, 240),
        InteractionKind::Quiz => Color32::from_rgb(150, 110, 230),
        InteractionKind::Cta => Color32::from_rgb(240, 140, 60),
        InteractionKind::Download => Color32::from_rgb(80, 200, 120),
        InteractionKind::Question => Color32::from_rgb(90, 200, 200),
        InteractionKind::Feedback => Color32::from_rgb(240, 200, 70),
        InteractionKind::ContactForm => Color32::from_rgb(200, 120, 180),
        InteractionKind::Tip => Color32::from_rgb(160, 160, 160),
        InteractionKind::SpecialOffer => Color32::from_rgb(230, 80, 90),
        InteractionKind::Pause => Color32::from_rgb(220, 220, 220),
    }
}

/// Dim a color for disabled markers.
pub fn dimmed(c: Color32) -> Color32 {
    Color32::from_rgba_unmultiplied(c.r(), c.g(), c.b(), 90)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_table() {
        assert_eq!(tick_interval(7200.0), 600.0);
        assert_eq!(tick_interval(3600.0), 300.0);
        assert_eq!(tick_interval(900.0), 120.0);
        assert_eq!(tick_interval(600.0), 60.0);
        assert_eq!(tick_interval(90.0), 15.0);
        assert_eq!(tick_interval(45.0), 10.0);
        assert_eq!(tick_interval(30.0), 5.0);
        assert_eq!(tick_interval(2.0), 5.0);
    }

    #[test]
    fn test_ticks_inside_window() {
        let mut vp = Viewport::new(600.0);
        vp.set_zoom(10.0, 300.0); // 270..330, 60s window -> 10s ticks
        let t = ticks(&vp);
        assert_eq!(t, vec![270.0, 280.0, 290.0, 300.0, 310.0, 320.0, 330.0]);

        let full = ticks(&Viewport::new(600.0)); // 600s -> 60s ticks
        assert_eq!(full.len(), 11);
        assert_eq!(full[0], 0.0);
        assert_eq!(*full.last().unwrap(), 600.0);
    }

    #[test]
    fn test_minimap_ignores_zoom() {
        let mut vp = Viewport::new(600.0);
        let mm = Minimap::new(600.0);
        assert!(mm.viewport_rect(&vp).is_none());

        vp.set_zoom(10.0, 300.0);
        assert_eq!(mm.time_to_fraction(300.0), 0.5);
        let (start, width) = mm.viewport_rect(&vp).unwrap();
        assert!((start - 0.45).abs() < 1e-9);
        assert!((width - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_minimap_click_recenters() {
        let mut vp = Viewport::new(600.0);
        vp.set_zoom(10.0, 0.0);
        let mm = Minimap::new(600.0);
        let t = mm.click(0.75, &mut vp);
        assert_eq!(t, 450.0);
        assert!((vp.viewport_start() - 420.0).abs() < 1e-9);
    }
}
