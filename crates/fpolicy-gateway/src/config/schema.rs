use std::collections::BTreeMap;
use std::net::SocketAddr;

use serde::Deserialize;

use fpolicy_core::error::{FpolicyError, Result};
use fpolicy_core::{Catalog, Origin, SettingsSnapshot};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    pub version: u32,

    #[serde(default)]
    pub gateway: GatewaySection,

    #[serde(default)]
    pub header: HeaderSection,

    #[serde(default)]
    pub catalog: CatalogSection,

    #[serde(default)]
    pub settings: SettingsSection,

    #[serde(default)]
    pub admin: AdminSection,
}

impl GatewayConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(FpolicyError::UnsupportedVersion);
        }

        self.gateway.validate()?;
        self.settings.validate()?;
        self.admin.validate()?;
        self.catalog.build()?; // names must resolve against the built-in set

        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewaySection {
    #[serde(default = "default_listen")]
    pub listen: String,
}

impl Default for GatewaySection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
        }
    }
}

impl GatewaySection {
    pub fn validate(&self) -> Result<()> {
        self.listen_addr().map(|_| ())
    }

    pub fn listen_addr(&self) -> Result<SocketAddr> {
        self.listen.parse().map_err(|_| {
            FpolicyError::BadRequest(format!(
                "gateway.listen must be a valid SocketAddr: {}",
                self.listen
            ))
        })
    }
}

fn default_listen() -> String {
    "0.0.0.0:8080".into()
}

/// How the header interacts with one already set by a handler.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeaderMode {
    #[default]
    IfNotPresent,
    Overriding,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HeaderSection {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub mode: HeaderMode,
}

impl Default for HeaderSection {
    fn default() -> Self {
        Self {
            enabled: true,
            mode: HeaderMode::default(),
        }
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogSection {
    /// Subset of built-in feature names. Absent means all.
    #[serde(default)]
    pub features: Option<Vec<String>>,
    /// Per-feature default origin replacements.
    #[serde(default)]
    pub defaults: BTreeMap<String, Origin>,
}

impl CatalogSection {
    /// Compile the catalog this section describes.
    pub fn build(&self) -> Result<Catalog> {
        let mut catalog = Catalog::builtin();
        if let Some(names) = &self.features {
            catalog = catalog.restrict_to(names).map_err(|e| {
                FpolicyError::BadRequest(format!("catalog.features: {e}"))
            })?;
        }
        for (name, origin) in &self.defaults {
            catalog = catalog.with_default(name, *origin).map_err(|e| {
                FpolicyError::BadRequest(format!("catalog.defaults: {e}"))
            })?;
        }
        Ok(catalog)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettingsBackend {
    #[default]
    Memory,
    File,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SettingsSection {
    #[serde(default)]
    pub backend: SettingsBackend,
    /// JSON file holding the snapshot (file backend only).
    #[serde(default)]
    pub path: Option<String>,
    /// Starting snapshot for the memory backend.
    #[serde(default)]
    pub initial: SettingsSnapshot,
}

impl SettingsSection {
    pub fn validate(&self) -> Result<()> {
        match self.backend {
            SettingsBackend::File if self.path.as_deref().map_or(true, str::is_empty) => Err(
                FpolicyError::BadRequest("settings.path is required for the file backend".into()),
            ),
            SettingsBackend::File if !self.initial.is_empty() => Err(FpolicyError::BadRequest(
                "settings.initial is only valid for the memory backend".into(),
            )),
            _ => Ok(()),
        }
    }
}

/// Write surfaces (admin form, `PUT /v1/settings`). Off unless enabled.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AdminSection {
    #[serde(default)]
    pub enabled: bool,
    /// Shared secret: `Authorization: Bearer <token>` or the form's `_token` field.
    #[serde(default)]
    pub token: Option<String>,
}

impl AdminSection {
    pub fn validate(&self) -> Result<()> {
        if self.enabled && self.token.as_deref().map_or(true, str::is_empty) {
            return Err(FpolicyError::BadRequest(
                "admin.token is required when admin is enabled".into(),
            ));
        }
        Ok(())
    }

    /// Whether `presented` matches the configured token.
    pub fn accepts(&self, presented: Option<&str>) -> bool {
        match (self.token.as_deref(), presented) {
            (Some(expected), Some(got)) if !expected.is_empty() => {
                constant_time_eq(expected.as_bytes(), got.as_bytes())
            }
            _ => false,
        }
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
