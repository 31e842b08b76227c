//! Human-readable case identifiers.

use chrono::Utc;
use std::sync::atomic::{AtomicI64, Ordering};

/// Prefix for every generated case id.
pub const CASE_ID_PREFIX: &str = "CP-";

/// Generates `CP-<unix millis>` identifiers.
///
/// Values are strictly increasing within a process: when two cases are
/// created in the same millisecond the second one gets the previous value + 1.
#[derive(Debug, Default)]
pub struct CaseIdGenerator {
    last: AtomicI64,
}

impl CaseIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next identifier.
    pub fn next_id(&self) -> String {
        let now = Utc::now().timestamp_millis();
        let previous = self
            .last
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                Some(now.max(last + 1))
            })
            .unwrap_or_else(|last| last);
        format!("{}{}", CASE_ID_PREFIX, now.max(previous + 1))
    }
}
