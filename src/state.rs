// Preference state that lives in key-value storage rather than the config files.
// The web client keeps these in browser local storage; elsewhere they share one backend.

use std::sync::Arc;

use crate::error::DiagnosticHook;
use crate::modules::cwd_group_order::CwdGroupOrder;
use crate::modules::group_names::GroupNames;
use crate::modules::machine_order::MachineOrder;
use crate::modules::storage::KeyValueStorage;

pub struct Preferences {
    pub machine_order: MachineOrder,
    pub cwd_group_order: CwdGroupOrder,
    pub group_names: GroupNames,
}

impl Preferences {
    pub fn new(storage: Arc<dyn KeyValueStorage>, diagnostics: Option<DiagnosticHook>) -> Self {
        Self {
            machine_order: MachineOrder::with_diagnostics(storage.clone(), diagnostics.clone()),
            cwd_group_order: CwdGroupOrder::with_diagnostics(storage.clone(), diagnostics.clone()),
            group_names: GroupNames::with_diagnostics(storage, diagnostics),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::cwd_group_order::CWD_GROUP_ORDER_KEY;
    use crate::modules::machine_order::MACHINE_ORDER_KEY;
    use crate::modules::storage::FileStorage;
    use tempfile::TempDir;

    #[test]
    fn test_components_share_one_file() {
        let dir = TempDir::new().unwrap();
        let storage = Arc::new(FileStorage::new(dir.path().join("local-storage.json")));
        let prefs = Preferences::new(storage.clone(), None);

        prefs.machine_order.set_machine_order(vec!["m2".to_string(), "m1".to_string()]);
        prefs.cwd_group_order.set_group_order("m1", vec!["/srv".to_string()]);

        assert_eq!(
            storage.get_item(MACHINE_ORDER_KEY).unwrap().as_deref(),
            Some(r#"["m2","m1"]"#)
        );
        assert!(storage.get_item(CWD_GROUP_ORDER_KEY).unwrap().is_some());

        let reopened = Preferences::new(storage, None);
        assert_eq!(*reopened.machine_order.order(), vec!["m2".to_string(), "m1".to_string()]);
    }

    #[test]
    fn test_corrupt_file_surfaces_through_persisted_order() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("local-storage.json");
        std::fs::write(&path, "not json").unwrap();
        let prefs = Preferences::new(Arc::new(FileStorage::new(&path)), None);

        prefs.machine_order.set_machine_order(vec!["m1".to_string()]);

        assert_eq!(*prefs.machine_order.order(), vec!["m1".to_string()]);
        assert!(prefs.machine_order.persisted_order().is_err());
    }
}
