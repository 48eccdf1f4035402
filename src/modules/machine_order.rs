// Machine display order: in-memory repository plus a storage adapter.

use arc_swap::ArcSwap;
use std::sync::Arc;

use super::ordering::{sort_by_stored, HasMachineId};
use super::storage::KeyValueStorage;
use crate::error::{report, DiagnosticHook, StoreError};

pub const MACHINE_ORDER_KEY: &str = "blkcat:machineOrder";

/// Current ordered id list. Readers get a snapshot and never block a writer.
#[derive(Default)]
pub struct OrderRepository {
    order: ArcSwap<Vec<String>>,
}

impl OrderRepository {
    pub fn new(initial: Vec<String>) -> Self {
        Self {
            order: ArcSwap::from_pointee(initial),
        }
    }

    pub fn get(&self) -> Arc<Vec<String>> {
        self.order.load_full()
    }

    pub fn replace(&self, order: Vec<String>) {
        self.order.store(Arc::new(order));
    }
}

pub struct MachineOrder {
    repository: OrderRepository,
    storage: Arc<dyn KeyValueStorage>,
    diagnostics: Option<DiagnosticHook>,
}

impl MachineOrder {
    pub fn new(storage: Arc<dyn KeyValueStorage>) -> Self {
        Self::with_diagnostics(storage, None)
    }

    /// Reads the saved order once; any failure starts from an empty order.
    pub fn with_diagnostics(
        storage: Arc<dyn KeyValueStorage>,
        diagnostics: Option<DiagnosticHook>,
    ) -> Self {
        let initial = match load_order(storage.as_ref()) {
            Ok(order) => order,
            Err(e) => {
                report(diagnostics.as_ref(), "MachineOrder", &e);
                Vec::new()
            }
        };

        Self {
            repository: OrderRepository::new(initial),
            storage,
            diagnostics,
        }
    }

    pub fn order(&self) -> Arc<Vec<String>> {
        self.repository.get()
    }

    pub fn ordered_machines<T: HasMachineId>(&self, machines: Vec<T>) -> Vec<T> {
        let order = self.repository.get();
        sort_by_stored(machines, &order, |m| m.machine_id())
    }

    /// Reads the order back from storage, bypassing the in-memory copy.
    pub fn persisted_order(&self) -> crate::error::Result<Vec<String>> {
        load_order(self.storage.as_ref())
    }

    /// Updates memory first; a failed write is reported and otherwise ignored.
    pub fn set_machine_order(&self, machine_ids: Vec<String>) {
        let json = serde_json::to_string(&machine_ids);
        self.repository.replace(machine_ids);

        let persisted = json
            .map_err(|e| StoreError::storage(e.to_string()))
            .and_then(|json| self.storage.set_item(MACHINE_ORDER_KEY, &json));
        if let Err(e) = persisted {
            report(self.diagnostics.as_ref(), "MachineOrder", &e);
        }
    }
}

fn load_order(storage: &dyn KeyValueStorage) -> crate::error::Result<Vec<String>> {
    match storage.get_item(MACHINE_ORDER_KEY)? {
        Some(raw) if !raw.is_empty() => {
            serde_json::from_str(&raw).map_err(|e| StoreError::storage(e.to_string()))
        }
        _ => Ok(Vec::new()),
    }
}
