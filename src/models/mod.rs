//! Data models for Labsite

pub mod push;
pub mod snapshot;
pub mod visit;

// Re-export commonly used types
pub use push::{PushSubscription, SubscriptionKeys, SubscriptionMap};
pub use snapshot::{Snapshot, SnapshotEntry};
pub use visit::VisitRecord;
