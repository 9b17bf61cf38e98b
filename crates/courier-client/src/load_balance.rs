use std::collections::{BTreeSet, HashMap};
use std::sync::{Mutex, PoisonError};

/// Policy choosing one address when discovery returns several.
///
/// Only consulted with two or more candidates. Returning `None` makes the
/// call fail with an empty-address error.
pub trait LoadBalance: Send + Sync {
    fn route(&self, service_key: &str, addresses: &BTreeSet<String>) -> Option<String>;
}

/// Round-robin over the ordered candidate set, one cursor per service key.
#[derive(Debug, Default)]
pub struct RoundRobin {
    cursors: Mutex<HashMap<String, usize>>,
}

impl RoundRobin {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of service keys this policy has routed for.
    pub fn service_count(&self) -> usize {
        self.cursors
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl LoadBalance for RoundRobin {
    fn route(&self, service_key: &str, addresses: &BTreeSet<String>) -> Option<String> {
        if addresses.is_empty() {
            return None;
        }

        let index = {
            let mut cursors = self.cursors.lock().unwrap_or_else(PoisonError::into_inner);
            let cursor = cursors.entry(service_key.to_string()).or_insert(0);
            let index = *cursor % addresses.len();
            *cursor = cursor.wrapping_add(1);
            index
        };

        addresses.iter().nth(index).cloned()
    }
}
