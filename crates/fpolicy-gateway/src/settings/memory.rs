use std::sync::RwLock;

use async_trait::async_trait;

use fpolicy_core::error::{FpolicyError, Result};
use fpolicy_core::SettingsSnapshot;

use super::SettingsProvider;

/// In-process snapshot, lost on restart.
#[derive(Debug, Default)]
pub struct MemoryProvider {
    inner: RwLock<SettingsSnapshot>,
}

impl MemoryProvider {
    pub fn new(initial: SettingsSnapshot) -> Self {
        Self {
            inner: RwLock::new(initial),
        }
    }
}

#[async_trait]
impl SettingsProvider for MemoryProvider {
    async fn get_option(&self) -> Result<SettingsSnapshot> {
        // Poisoned lock means a writer panicked; surface it, the caller falls back.
        self.inner
            .read()
            .map(|g| g.clone())
            .map_err(|_| FpolicyError::Internal("settings lock poisoned".into()))
    }

    async fn replace(&self, snapshot: SettingsSnapshot) -> Result<()> {
        let mut g = self
            .inner
            .write()
            .map_err(|_| FpolicyError::Internal("settings lock poisoned".into()))?;
        *g = snapshot;
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
