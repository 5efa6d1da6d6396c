//! Timeline widget - interaction markers over the video duration
//!
//! Zoomable strip with one marker per interaction, a tick ruler and a
//! full-duration minimap.

pub mod gestures;
mod timeline;
pub mod timeline_events;
pub mod timeline_helpers;
mod timeline_ui;

pub use gestures::{DragSession, GestureAction, MarkerGestures, PointerInput};
pub use timeline::{MAX_ZOOM, MIN_ZOOM, TimelineConfig, TimelineState, Viewport, ZOOM_STEP};
pub use timeline_ui::{TimelineActions, TimelineView, render_timeline, render_toolbar};
