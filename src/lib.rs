//! CUELINE - webinar interaction timeline editor library
//!
//! Re-exports all modules for use by binary targets.

// Core engine (events, workers, debounce, playback clock)
pub mod core;

// App modules
pub mod app;
pub mod cli;
pub mod config;
pub mod editor;
pub mod entities;
pub mod server;
pub mod sync;
pub mod utils;
pub mod validation;
pub mod widgets;

// Re-export commonly used types from core
pub use core::event_bus::{BoxedEvent, EventBus, downcast_event};
pub use core::notifications::Notifications;
pub use core::playback::{PlaybackState, VideoHost};

pub use editor::Editor;
pub use entities::{Interaction, InteractionId, InteractionKind, InteractionList};
pub use sync::{HttpStore, InteractionStore, MemoryStore, SyncPipeline};
