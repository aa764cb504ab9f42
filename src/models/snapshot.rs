//! Dashboard snapshot models

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One dated export of the dashboard section records.
///
/// A section whose key is absent from the store is recorded as an explicit
/// JSON null, never omitted.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Snapshot {
    /// Calendar day of the capture, laboratory-local time
    pub date: String,
    #[schema(value_type = Object)]
    pub sections: BTreeMap<String, serde_json::Value>,
}

/// Index entry for one stored snapshot, newest first
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SnapshotEntry {
    pub date: String,
    /// Size of the serialized snapshot, in bytes
    pub size: u64,
    /// Whether the run was triggered by the scheduler (as opposed to an
    /// operator from the dashboard)
    pub auto: bool,
}
