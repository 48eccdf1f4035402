use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::agents_store::AgentsStore;
use crate::display_names_store::DisplayNamesStore;
use crate::error::{report, Result, StoreError};
use crate::json_file;
use crate::views_store::ViewsStore;

pub const ENV_CONFIG_DIR: &str = "BLKCAT_CONFIG_DIR";

const CONFIG_DIR_NAME: &str = ".blkcat";
const SERVER_CONFIG_FILE: &str = "server.json";
const LOCAL_STORAGE_FILE: &str = "local-storage.json";
const DEFAULT_PORT: u16 = 3000;

/// Where the per-user configuration files live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub config_dir: PathBuf,
}

impl StoreConfig {
    pub fn new(config_dir: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: config_dir.into(),
        }
    }

    /// Explicit override, then `BLKCAT_CONFIG_DIR`, then `~/.blkcat`.
    pub fn resolve(override_dir: Option<PathBuf>) -> Result<Self> {
        Self::resolve_with(override_dir, |key| std::env::var(key).ok(), dirs::home_dir)
    }

    fn resolve_with(
        override_dir: Option<PathBuf>,
        env: impl Fn(&str) -> Option<String>,
        home_dir: impl FnOnce() -> Option<PathBuf>,
    ) -> Result<Self> {
        if let Some(dir) = override_dir {
            return Ok(Self::new(dir));
        }
        if let Some(dir) = env(ENV_CONFIG_DIR).filter(|d| !d.is_empty()) {
            return Ok(Self::new(dir));
        }
        let home = home_dir().ok_or(StoreError::NoHomeDir)?;
        Ok(Self::new(home.join(CONFIG_DIR_NAME)))
    }

    pub fn display_names(&self) -> DisplayNamesStore {
        DisplayNamesStore::new(&self.config_dir)
    }

    pub fn views(&self) -> ViewsStore {
        ViewsStore::new(&self.config_dir)
    }

    pub fn agents(&self) -> AgentsStore {
        AgentsStore::new(&self.config_dir)
    }

    /// Backing file for the on-disk local storage used outside a browser.
    pub fn local_storage_path(&self) -> PathBuf {
        self.config_dir.join(LOCAL_STORAGE_FILE)
    }
}

/// `server.json` merged with `BLKCAT_*` environment overrides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerConfig {
    pub port: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub static_dir: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skills_dir: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agents: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notify_command: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notify_env: Option<BTreeMap<String, String>>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            hostname: None,
            static_dir: None,
            skills_dir: None,
            agents: None,
            notify_command: None,
            notify_env: None,
        }
    }
}

impl ServerConfig {
    pub async fn load(config_dir: &Path) -> Self {
        Self::load_with(config_dir, |key| std::env::var(key).ok()).await
    }

    pub async fn load_with(config_dir: &Path, env: impl Fn(&str) -> Option<String>) -> Self {
        let path = config_dir.join(SERVER_CONFIG_FILE);
        let file = match json_file::read_json(&path).await {
            Ok(Some(Value::Object(map))) => map,
            Ok(_) => Map::new(),
            Err(e) => {
                report(None, "ServerConfig", &e);
                Map::new()
            }
        };

        let port = env("BLKCAT_PORT")
            .or_else(|| port_field(file.get("port")))
            .and_then(|p| p.trim().parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);

        let agents = match env("BLKCAT_AGENTS") {
            Some(list) => Some(
                list.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect(),
            ),
            None => string_array(file.get("agents")),
        };

        Self {
            port,
            hostname: env("BLKCAT_HOST").or_else(|| string_field(file.get("hostname"))),
            static_dir: env("BLKCAT_STATIC_DIR").or_else(|| string_field(file.get("staticDir"))),
            skills_dir: env("BLKCAT_SKILLS_DIR").or_else(|| string_field(file.get("skillsDir"))),
            agents,
            notify_command: env("BLKCAT_NOTIFY_CMD")
                .or_else(|| string_field(file.get("notifyCommand"))),
            notify_env: string_record(file.get("notifyEnv")),
        }
    }
}

fn string_field(value: Option<&Value>) -> Option<String> {
    value.and_then(Value::as_str).map(str::to_string)
}

// Numbers are accepted as well as strings; a bare `"port": 4100` is the common way to write it.
fn port_field(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn string_array(value: Option<&Value>) -> Option<Vec<String>> {
    let items: Vec<String> = value?
        .as_array()?
        .iter()
        .filter_map(|v| v.as_str().map(str::to_string))
        .collect();
    (!items.is_empty()).then_some(items)
}

fn string_record(value: Option<&Value>) -> Option<BTreeMap<String, String>> {
    let record: BTreeMap<String, String> = value?
        .as_object()?
        .iter()
        .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
        .collect();
    (!record.is_empty()).then_some(record)
}
