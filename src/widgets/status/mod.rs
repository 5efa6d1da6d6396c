//! Status bar and toast overlay.

mod status;

pub use status::{StatusBar, StatusInfo, render_toasts};
