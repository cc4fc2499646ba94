//! Run identity
//!
//! Every reconcile run is stamped with a UUIDv4 and a start time so audit
//! entries from different runs over the same catalog can be told apart.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Fresh run identifier
pub fn new_run_id() -> Uuid {
    Uuid::new_v4()
}

/// Current UTC time for audit stamps
pub fn now() -> DateTime<Utc> {
    Utc::now()
}
