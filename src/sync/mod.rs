//! Persistence: store boundary and the optimistic pipeline in front of it.

pub mod pipeline;
pub mod store;

pub use pipeline::{SyncOp, SyncOutcome, SyncPipeline};
pub use store::{HttpStore, InteractionStore, MemoryStore, StoreCall, StoreError};
