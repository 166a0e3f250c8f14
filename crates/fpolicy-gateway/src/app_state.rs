//! Shared application state for the fpolicy gateway.
//!
//! Holds the compiled catalog (built once at startup), the settings provider
//! and the metrics registry. Startup errors are returned, never panicked.

use std::sync::Arc;

use fpolicy_core::error::Result;
use fpolicy_core::{Catalog, SettingsSnapshot};

use crate::config::GatewayConfig;
use crate::obs::metrics::GatewayMetrics;
use crate::settings::{self, SettingsProvider};

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    cfg: GatewayConfig,
    catalog: Catalog,
    provider: Arc<dyn SettingsProvider>,
    metrics: GatewayMetrics,
}

impl AppState {
    /// Build application state with the provider described by config.
    pub fn new(cfg: GatewayConfig) -> Result<Self> {
        cfg.validate()?;
        let provider = settings::from_config(&cfg.settings)?;
        Self::with_provider(cfg, provider)
    }

    /// Build application state around an explicit provider.
    pub fn with_provider(cfg: GatewayConfig, provider: Arc<dyn SettingsProvider>) -> Result<Self> {
        cfg.validate()?;
        let catalog = cfg.catalog.build()?;
        if catalog.is_empty() {
            tracing::warn!("feature catalog is empty; no Feature-Policy header will be sent");
        }
        tracing::info!(
            features = catalog.len(),
            backend = provider.backend(),
            "feature catalog compiled"
        );

        Ok(Self {
            inner: Arc::new(AppStateInner {
                cfg,
                catalog,
                provider,
                metrics: GatewayMetrics::default(),
            }),
        })
    }

    pub fn cfg(&self) -> &GatewayConfig {
        &self.inner.cfg
    }

    pub fn catalog(&self) -> &Catalog {
        &self.inner.catalog
    }

    pub fn provider(&self) -> &Arc<dyn SettingsProvider> {
        &self.inner.provider
    }

    pub fn metrics(&self) -> &GatewayMetrics {
        &self.inner.metrics
    }

    /// Current snapshot. Provider failures degrade to `{}` so that every
    /// feature reverts to its default instead of losing the header.
    pub async fn load_settings(&self) -> SettingsSnapshot {
        match self.inner.provider.get_option().await {
            Ok(s) => s,
            Err(e) => {
                self.inner.metrics.provider_errors.inc(&[("backend", self.inner.provider.backend())]);
                tracing::warn!(error = %e, "settings provider failed; using catalog defaults");
                SettingsSnapshot::new()
            }
        }
    }

    /// Persist a new snapshot.
    pub async fn store_settings(&self, snapshot: SettingsSnapshot, source: &str) -> Result<()> {
        let entries = snapshot.len();
        self.inner.provider.replace(snapshot).await?;
        self.inner.metrics.settings_updates.inc(&[("source", source)]);
        tracing::info!(source, entries, "feature policy settings replaced");
        Ok(())
    }

    pub fn set_draining(&self) {
        self.inner.metrics.set_draining();
    }

    pub fn is_draining(&self) -> bool {
        self.inner.metrics.is_draining()
    }
}
