//! Timeline widget events.

use super::gestures::PointerInput;

/// Hit-tested pointer input on the strip; `width` is the strip width in px.
#[derive(Clone, Debug)]
pub struct TimelinePointerEvent {
    pub input: PointerInput,
    pub width: f64,
}

/// Click on the minimap at a fraction of the full duration.
#[derive(Clone, Debug)]
pub struct MinimapClickEvent(pub f64);

/// Horizontal scroll of the zoomed window, seconds.
#[derive(Clone, Debug)]
pub struct TimelineScrollEvent(pub f64);

#[derive(Clone, Debug)]
pub struct TimelineFollowChangedEvent(pub bool);
