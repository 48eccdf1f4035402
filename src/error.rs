use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to access {}: {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid JSON in {}: {}", .path.display(), .source)]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("unexpected shape in {}: {}", .path.display(), .detail)]
    Shape { path: PathBuf, detail: String },
    #[error("storage error: {0}")]
    Storage(String),
    #[error("home directory is not available")]
    NoHomeDir,
}

impl StoreError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }

    pub fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Json { path: path.into(), source }
    }

    pub fn shape(path: impl Into<PathBuf>, detail: impl Into<String>) -> Self {
        Self::Shape {
            path: path.into(),
            detail: detail.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage(message.into())
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// Observer for failures that are absorbed into a default value.
pub type DiagnosticHook = Arc<dyn Fn(&StoreError) + Send + Sync>;

/// Logs a swallowed failure and forwards it to the hook, if one is attached.
pub(crate) fn report(hook: Option<&DiagnosticHook>, context: &str, error: &StoreError) {
    log::warn!("[{}] {}, using defaults", context, error);
    if let Some(hook) = hook {
        hook(error);
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// A hook plus the number of times it fired.
    pub fn counting_hook() -> (DiagnosticHook, Arc<AtomicUsize>) {
        let count = Arc::new(AtomicUsize::new(0));
        let counter = count.clone();
        let hook: DiagnosticHook = Arc::new(move |_: &StoreError| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        (hook, count)
    }
}
