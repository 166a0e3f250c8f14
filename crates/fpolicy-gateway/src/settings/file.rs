use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::sync::Mutex;

use fpolicy_core::error::{FpolicyError, Result};
use fpolicy_core::SettingsSnapshot;

use super::SettingsProvider;

/// JSON file store. Read on every call; writes go through a temp file and a
/// rename so readers never observe a partial file.
#[derive(Debug)]
pub struct FileProvider {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl SettingsProvider for FileProvider {
    async fn get_option(&self) -> Result<SettingsSnapshot> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(s) => s,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(SettingsSnapshot::new()),
            Err(e) => {
                return Err(FpolicyError::Internal(format!(
                    "read settings {} failed: {e}",
                    self.path.display()
                )))
            }
        };

        match serde_json::from_str::<serde_json::Value>(&raw) {
            Ok(v) => Ok(SettingsSnapshot::sanitize(v)),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "settings file is not valid json; using empty settings");
                Ok(SettingsSnapshot::new())
            }
        }
    }

    async fn replace(&self, snapshot: SettingsSnapshot) -> Result<()> {
        let body = serde_json::to_vec_pretty(&snapshot)
            .map_err(|e| FpolicyError::Internal(format!("encode settings failed: {e}")))?;

        let _g = self.write_lock.lock().await;
        let tmp = self.tmp_path();
        tokio::fs::write(&tmp, body)
            .await
            .map_err(|e| FpolicyError::Internal(format!("write {} failed: {e}", tmp.display())))?;
        tokio::fs::rename(&tmp, &self.path).await.map_err(|e| {
            FpolicyError::Internal(format!("rename to {} failed: {e}", self.path.display()))
        })?;

        tracing::info!(path = %self.path.display(), entries = snapshot.len(), "settings written");
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "file"
    }
}
