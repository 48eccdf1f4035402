// User labels for working-directory groups, keyed "machineId:cwdRoot".

use arc_swap::ArcSwap;
use std::collections::BTreeMap;
use std::sync::Arc;

use super::storage::KeyValueStorage;
use crate::error::{report, DiagnosticHook, StoreError};

pub const GROUP_NAMES_KEY: &str = "blkcat:groupNames";

pub struct GroupNames {
    names: ArcSwap<BTreeMap<String, String>>,
    storage: Arc<dyn KeyValueStorage>,
    diagnostics: Option<DiagnosticHook>,
}

impl GroupNames {
    pub fn new(storage: Arc<dyn KeyValueStorage>) -> Self {
        Self::with_diagnostics(storage, None)
    }

    pub fn with_diagnostics(
        storage: Arc<dyn KeyValueStorage>,
        diagnostics: Option<DiagnosticHook>,
    ) -> Self {
        let initial = match load_names(storage.as_ref()) {
            Ok(names) => names,
            Err(e) => {
                report(diagnostics.as_ref(), "GroupNames", &e);
                BTreeMap::new()
            }
        };

        Self {
            names: ArcSwap::from_pointee(initial),
            storage,
            diagnostics,
        }
    }

    pub fn group_name(&self, machine_id: &str, cwd_root: &str, default: &str) -> String {
        match self.names.load().get(&group_key(machine_id, cwd_root)) {
            Some(name) if !name.is_empty() => name.clone(),
            _ => default.to_string(),
        }
    }

    /// An empty name removes the label.
    pub fn set_group_name(&self, machine_id: &str, cwd_root: &str, name: &str) {
        let key = group_key(machine_id, cwd_root);
        self.names.rcu(|current| {
            let mut next = BTreeMap::clone(current);
            if name.is_empty() {
                next.remove(&key);
            } else {
                next.insert(key.clone(), name.to_string());
            }
            next
        });

        let snapshot = self.names.load_full();
        let persisted = serde_json::to_string(snapshot.as_ref())
            .map_err(|e| StoreError::storage(e.to_string()))
            .and_then(|json| self.storage.set_item(GROUP_NAMES_KEY, &json));
        if let Err(e) = persisted {
            report(self.diagnostics.as_ref(), "GroupNames", &e);
        }
    }
}

fn group_key(machine_id: &str, cwd_root: &str) -> String {
    format!("{}:{}", machine_id, cwd_root)
}

fn load_names(storage: &dyn KeyValueStorage) -> crate::error::Result<BTreeMap<String, String>> {
    match storage.get_item(GROUP_NAMES_KEY)? {
        Some(raw) if !raw.is_empty() => {
            serde_json::from_str(&raw).map_err(|e| StoreError::storage(e.to_string()))
        }
        _ => Ok(BTreeMap::new()),
    }
}
