//! Settings providers.
//!
//! A provider owns the stored snapshot. The header middleware reads it fresh
//! for every response; the admin surface replaces it wholesale.

pub mod file;
pub mod memory;

use std::sync::Arc;

use async_trait::async_trait;

use fpolicy_core::error::{FpolicyError, Result};
use fpolicy_core::SettingsSnapshot;

use crate::config::{SettingsBackend, SettingsSection};

pub use file::FileProvider;
pub use memory::MemoryProvider;

/// Storage seam for the administrator's overrides.
#[async_trait]
pub trait SettingsProvider: Send + Sync + 'static {
    /// Current stored overrides. Non-mapping storage is already coerced to `{}`.
    async fn get_option(&self) -> Result<SettingsSnapshot>;

    /// Replace the whole snapshot.
    async fn replace(&self, snapshot: SettingsSnapshot) -> Result<()>;

    /// Backend name for logs and metrics.
    fn backend(&self) -> &'static str;
}

/// Build the provider described by config.
pub fn from_config(section: &SettingsSection) -> Result<Arc<dyn SettingsProvider>> {
    match (section.backend, section.path.as_deref()) {
        (SettingsBackend::File, Some(path)) if !path.is_empty() => {
            Ok(Arc::new(FileProvider::new(path)))
        }
        (SettingsBackend::File, _) => Err(FpolicyError::BadRequest(
            "settings.path is required for the file backend".into(),
        )),
        (SettingsBackend::Memory, _) => Ok(Arc::new(MemoryProvider::new(section.initial.clone()))),
    }
}
