use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::{report, DiagnosticHook, Result, StoreError};
use crate::json_file;

const FILE_NAME: &str = "display-names.json";

/// User-chosen labels for machines and sessions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayNames {
    pub machines: BTreeMap<String, String>,
    pub sessions: BTreeMap<String, String>,
}

impl DisplayNames {
    /// Label for a machine, or the machine id when none is set.
    pub fn machine_name<'a>(&'a self, machine_id: &'a str) -> &'a str {
        match self.machines.get(machine_id) {
            Some(name) if !name.is_empty() => name,
            _ => machine_id,
        }
    }

    pub fn session_name<'a>(&'a self, machine_id: &str, session_id: &str, default: &'a str) -> &'a str {
        match self.sessions.get(&session_key(machine_id, session_id)) {
            Some(name) if !name.is_empty() => name,
            _ => default,
        }
    }

    /// An empty name clears the label.
    pub fn set_machine_name(&mut self, machine_id: &str, name: &str) {
        if name.is_empty() {
            self.machines.remove(machine_id);
        } else {
            self.machines.insert(machine_id.to_string(), name.to_string());
        }
    }

    pub fn set_session_name(&mut self, machine_id: &str, session_id: &str, name: &str) {
        let key = session_key(machine_id, session_id);
        if name.is_empty() {
            self.sessions.remove(&key);
        } else {
            self.sessions.insert(key, name.to_string());
        }
    }

    /// Collects a description of every field that had to fall back into `problems`.
    fn from_value(value: &Value, problems: &mut Vec<String>) -> Self {
        if !value.is_object() {
            problems.push("top level is not an object".to_string());
        }
        Self {
            machines: string_map(value.get("machines"), "machines", problems),
            sessions: string_map(value.get("sessions"), "sessions", problems),
        }
    }
}

fn session_key(machine_id: &str, session_id: &str) -> String {
    format!("{}:{}", machine_id, session_id)
}

// Non-object fields fall back to empty; non-string entries are skipped.
fn string_map(field: Option<&Value>, name: &str, problems: &mut Vec<String>) -> BTreeMap<String, String> {
    let map = match field {
        Some(Value::Object(map)) => map,
        Some(_) => {
            problems.push(format!("`{}` is not an object", name));
            return BTreeMap::new();
        }
        None => {
            problems.push(format!("`{}` is missing", name));
            return BTreeMap::new();
        }
    };

    let labels: BTreeMap<String, String> = map
        .iter()
        .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
        .collect();
    if labels.len() != map.len() {
        problems.push(format!(
            "`{}` has {} non-string labels",
            name,
            map.len() - labels.len()
        ));
    }
    labels
}

pub struct DisplayNamesStore {
    path: PathBuf,
    diagnostics: Option<DiagnosticHook>,
}

impl DisplayNamesStore {
    pub fn new(config_dir: &Path) -> Self {
        Self {
            path: config_dir.join(FILE_NAME),
            diagnostics: None,
        }
    }

    pub fn with_diagnostics(mut self, hook: DiagnosticHook) -> Self {
        self.diagnostics = Some(hook);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Never fails: a missing or unreadable file yields empty maps.
    pub async fn load(&self) -> DisplayNames {
        match json_file::read_json(&self.path).await {
            Ok(Some(value)) => {
                let mut problems = Vec::new();
                let names = DisplayNames::from_value(&value, &mut problems);
                if !problems.is_empty() {
                    let e = StoreError::shape(&self.path, problems.join("; "));
                    report(self.diagnostics.as_ref(), "DisplayNames", &e);
                }
                log::debug!(
                    "[DisplayNames] Loaded {} machine and {} session labels",
                    names.machines.len(),
                    names.sessions.len()
                );
                names
            }
            Ok(None) => DisplayNames::default(),
            Err(e) => {
                report(self.diagnostics.as_ref(), "DisplayNames", &e);
                DisplayNames::default()
            }
        }
    }

    pub async fn save(&self, names: &DisplayNames) -> Result<()> {
        json_file::write_pretty(&self.path, names).await?;
        log::debug!("[DisplayNames] Saved to {:?}", self.path);
        Ok(())
    }
}
