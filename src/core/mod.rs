//! Core engine modules - events, workers, debounce queue, playback clock,
//! notifications.
//!
//! Nothing here depends on egui.

pub mod debounced_writer;
pub mod event_bus;
pub mod notifications;
pub mod playback;
pub mod workers;

pub use debounced_writer::DebouncedWriter;
pub use event_bus::EventBus;
pub use notifications::{Notifications, Toast, ToastLevel};
pub use playback::{PlaybackState, PlaybackStatus, VideoHost};
pub use workers::{InlineRunner, JobRunner, Workers};
