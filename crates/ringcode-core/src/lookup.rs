//! Caller to code resolution

use std::sync::Arc;

use tracing::{debug, warn};

use crate::number::{normalize, same_target};
use crate::registry::{AssignmentRecord, AssignmentRegistry};

/// Resolves caller identifiers against the assignment registry.
///
/// Lookup never fails: an unreadable registry is logged and treated as having
/// no assignment for the caller.
#[derive(Clone)]
pub struct AssignmentLookup {
    registry: Arc<dyn AssignmentRegistry>,
}

impl AssignmentLookup {
    pub fn new(registry: Arc<dyn AssignmentRegistry>) -> Self {
        Self { registry }
    }

    /// Code assigned to the caller, if any
    pub async fn resolve(&self, caller: &str) -> Option<String> {
        self.resolve_record(caller).await.map(|record| record.code)
    }

    /// First active record whose number designates the same target as the
    /// caller, in registry order
    pub async fn resolve_record(&self, caller: &str) -> Option<AssignmentRecord> {
        let caller = normalize(caller);
        if caller.is_empty() {
            debug!("caller identifier has no digits, skipping lookup");
            return None;
        }

        let records = match self.registry.active_assignments().await {
            Ok(records) => records,
            Err(e) => {
                warn!(error = %e, "assignment lookup failed");
                return None;
            }
        };

        let found = records
            .into_iter()
            .filter(|record| record.active)
            .find(|record| same_target(&caller, &normalize(&record.number)));

        match &found {
            Some(record) => debug!(caller = %caller, id = record.id, "caller matched assignment"),
            None => debug!(caller = %caller, "no assignment for caller"),
        }
        found
    }
}

impl std::fmt::Debug for AssignmentLookup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssignmentLookup").finish_non_exhaustive()
    }
}
