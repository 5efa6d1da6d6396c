//! Utility functions and constants
//!
//! **Used by**: validation messages, timeline ruler labels, sidebar rows

/// Time formatting and float helpers
pub mod time {
    /// Format seconds as `m:ss`, or `h:mm:ss` past an hour.
    pub fn format_time(t: f64) -> String {
        if !t.is_finite() {
            return "--:--".to_string();
        }
        let total = t.max(0.0).floor() as u64;
        let (h, m, s) = (total / 3600, (total % 3600) / 60, total % 60);
        if h > 0 {
            format!("{}:{:02}:{:02}", h, m, s)
        } else {
            format!("{}:{:02}", m, s)
        }
    }

    /// Same as [`format_time`] with tenths, for drag readouts.
    pub fn format_time_precise(t: f64) -> String {
        if !t.is_finite() {
            return "--:--.-".to_string();
        }
        let tenths = ((t.max(0.0) * 10.0).round() as u64) % 10;
        format!("{}.{}", format_time(t), tenths)
    }

    /// Clamp that tolerates an inverted range (returns `lo`).
    pub fn clamp_range(v: f64, lo: f64, hi: f64) -> f64 {
        if hi < lo { lo } else { v.clamp(lo, hi) }
    }
}

#[cfg(test)]
mod tests {
    use super::time::*;

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(0.0), "0:00");
        assert_eq!(format_time(65.7), "1:05");
        assert_eq!(format_time(3725.0), "1:02:05");
        assert_eq!(format_time(f64::NAN), "--:--");
    }

    #[test]
    fn test_format_time_precise() {
        assert_eq!(format_time_precise(12.34), "0:12.3");
    }

    #[test]
    fn test_clamp_range_inverted() {
        assert_eq!(clamp_range(5.0, 0.0, 10.0), 5.0);
        assert_eq!(clamp_range(5.0, 3.0, 1.0), 3.0);
    }
}
