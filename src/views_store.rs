use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

use crate::error::{report, DiagnosticHook, Result, StoreError};
use crate::json_file;

const FILE_NAME: &str = "views.json";

/// A saved, named arrangement of panes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct View {
    pub id: String,
    pub name: String,
    pub panes: Vec<Value>,
    /// Fields this crate does not interpret, kept so a load/save cycle is lossless.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl View {
    pub fn new(id: impl Into<String>, name: impl Into<String>, panes: Vec<Value>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            panes,
            extra: Map::new(),
        }
    }

    fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        let id = obj.get("id")?.as_str()?;
        let name = obj.get("name")?.as_str()?;
        let panes = obj.get("panes")?.as_array()?;

        let extra = obj
            .iter()
            .filter(|(k, _)| !matches!(k.as_str(), "id" | "name" | "panes"))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        Some(Self {
            id: id.to_string(),
            name: name.to_string(),
            panes: panes.clone(),
            extra,
        })
    }
}

#[derive(Serialize)]
struct ViewsFile<'a> {
    views: &'a [View],
}

pub struct ViewsStore {
    path: PathBuf,
    diagnostics: Option<DiagnosticHook>,
}

impl ViewsStore {
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

    /// Invalid entries are dropped one by one; any other problem yields an empty list.
    pub async fn load(&self) -> Vec<View> {
        let value = match json_file::read_json(&self.path).await {
            Ok(Some(value)) => value,
            Ok(None) => return Vec::new(),
            Err(e) => {
                report(self.diagnostics.as_ref(), "Views", &e);
                return Vec::new();
            }
        };

        let Some(entries) = value.get("views").and_then(Value::as_array) else {
            let e = StoreError::shape(&self.path, "`views` is not an array");
            report(self.diagnostics.as_ref(), "Views", &e);
            return Vec::new();
        };

        let views: Vec<View> = entries.iter().filter_map(View::from_value).collect();
        if views.len() != entries.len() {
            let e = StoreError::shape(
                &self.path,
                format!("dropped {} invalid views", entries.len() - views.len()),
            );
            report(self.diagnostics.as_ref(), "Views", &e);
        }
        views
    }

    pub async fn save(&self, views: &[View]) -> Result<()> {
        json_file::write_pretty(&self.path, &ViewsFile { views }).await?;
        log::debug!("[Views] Saved {} views", views.len());
        Ok(())
    }
}
