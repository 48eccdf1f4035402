// Per-machine ordering of working-directory groups.

use arc_swap::ArcSwap;
use std::collections::BTreeMap;
use std::sync::Arc;

use super::ordering::{sort_by_stored, HasCwdRoot};
use super::storage::KeyValueStorage;
use crate::error::{report, DiagnosticHook, StoreError};

pub const CWD_GROUP_ORDER_KEY: &str = "blkcat:cwdGroupOrder";

/// machine id -> ordered cwd roots
pub type GroupOrderMap = BTreeMap<String, Vec<String>>;

pub struct CwdGroupOrder {
    order: ArcSwap<GroupOrderMap>,
    storage: Arc<dyn KeyValueStorage>,
    diagnostics: Option<DiagnosticHook>,
}

impl CwdGroupOrder {
    pub fn new(storage: Arc<dyn KeyValueStorage>) -> Self {
        Self::with_diagnostics(storage, None)
    }

    pub fn with_diagnostics(
        storage: Arc<dyn KeyValueStorage>,
        diagnostics: Option<DiagnosticHook>,
    ) -> Self {
        let initial = match load_map(storage.as_ref()) {
            Ok(map) => map,
            Err(e) => {
                report(diagnostics.as_ref(), "CwdGroupOrder", &e);
                GroupOrderMap::new()
            }
        };

        Self {
            order: ArcSwap::from_pointee(initial),
            storage,
            diagnostics,
        }
    }

    pub fn ordered_groups<T: HasCwdRoot>(&self, machine_id: &str, groups: Vec<T>) -> Vec<T> {
        let order = self.order.load();
        match order.get(machine_id) {
            Some(saved) => sort_by_stored(groups, saved, |g| g.cwd_root()),
            None => groups,
        }
    }

    /// Replaces one machine's entry; other machines keep theirs.
    pub fn set_group_order(&self, machine_id: &str, cwd_roots: Vec<String>) {
        self.order.rcu(|current| {
            let mut next = GroupOrderMap::clone(current);
            next.insert(machine_id.to_string(), cwd_roots.clone());
            next
        });

        let snapshot = self.order.load_full();
        let persisted = serde_json::to_string(snapshot.as_ref())
            .map_err(|e| StoreError::storage(e.to_string()))
            .and_then(|json| self.storage.set_item(CWD_GROUP_ORDER_KEY, &json));
        if let Err(e) = persisted {
            report(self.diagnostics.as_ref(), "CwdGroupOrder", &e);
        }
    }
}

fn load_map(storage: &dyn KeyValueStorage) -> crate::error::Result<GroupOrderMap> {
    match storage.get_item(CWD_GROUP_ORDER_KEY)? {
        Some(raw) if !raw.is_empty() => {
            serde_json::from_str(&raw).map_err(|e| StoreError::storage(e.to_string()))
        }
        _ => Ok(GroupOrderMap::new()),
    }
}
