use serde::Serialize;
use serde_json::Value;
use std::path::{Path, PathBuf};

use crate::error::{report, DiagnosticHook, Result, StoreError};
use crate::json_file;

const FILE_NAME: &str = "agents.json";

#[derive(Serialize)]
struct AgentsFile<'a> {
    agents: &'a [String],
}

/// Agent addresses added at runtime, restored on the next start.
pub struct AgentsStore {
    path: PathBuf,
    diagnostics: Option<DiagnosticHook>,
}

impl AgentsStore {
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

    pub async fn load(&self) -> Vec<String> {
        let value = match json_file::read_json(&self.path).await {
            Ok(Some(value)) => value,
            Ok(None) => return Vec::new(),
            Err(e) => {
                report(self.diagnostics.as_ref(), "Agents", &e);
                return Vec::new();
            }
        };

        let Some(entries) = value.get("agents").and_then(Value::as_array) else {
            let e = StoreError::shape(&self.path, "`agents` is not an array");
            report(self.diagnostics.as_ref(), "Agents", &e);
            return Vec::new();
        };

        let agents: Vec<String> = entries
            .iter()
            .filter_map(|a| a.as_str().map(str::to_string))
            .collect();
        if agents.len() != entries.len() {
            let e = StoreError::shape(
                &self.path,
                format!("dropped {} non-string addresses", entries.len() - agents.len()),
            );
            report(self.diagnostics.as_ref(), "Agents", &e);
        }
        agents
    }

    pub async fn save(&self, addresses: &[String]) -> Result<()> {
        json_file::write_pretty(&self.path, &AgentsFile { agents: addresses }).await?;
        log::debug!("[Agents] Saved {} addresses", addresses.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::test_support::counting_hook;
    use std::sync::atomic::Ordering;
    use tempfile::TempDir;

    fn write_file(dir: &TempDir, contents: &str) {
        std::fs::write(dir.path().join(FILE_NAME), contents).unwrap();
    }

    #[tokio::test]
    async fn test_missing_file_loads_empty() {
        let dir = TempDir::new().unwrap();
        assert!(AgentsStore::new(dir.path()).load().await.is_empty());
    }

    #[tokio::test]
    async fn test_non_string_entries_are_dropped() {
        let dir = TempDir::new().unwrap();
        write_file(&dir, r#"{"agents": ["host-a:4000", 42, null, "host-b:4000"]}"#);
        let (hook, count) = counting_hook();

        let agents = AgentsStore::new(dir.path()).with_diagnostics(hook).load().await;

        assert_eq!(agents, vec!["host-a:4000", "host-b:4000"]);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_corrupt_file_loads_empty_and_reports() {
        let dir = TempDir::new().unwrap();
        write_file(&dir, "{\"agents\": [");
        let (hook, count) = counting_hook();

        let agents = AgentsStore::new(dir.path()).with_diagnostics(hook).load().await;

        assert!(agents.is_empty());
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_agents_not_an_array_reports() {
        let dir = TempDir::new().unwrap();
        write_file(&dir, r#"{"agents": "host-a:4000"}"#);
        let (hook, count) = counting_hook();

        let agents = AgentsStore::new(dir.path()).with_diagnostics(hook).load().await;

        assert!(agents.is_empty());
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_save_then_load_round_trips() {
        let dir = TempDir::new().unwrap();
        let store = AgentsStore::new(dir.path());
        let addresses = vec!["10.0.0.2:4000".to_string(), "pi.local:4000".to_string()];

        store.save(&addresses).await.unwrap();

        assert_eq!(store.load().await, addresses);
    }
}
