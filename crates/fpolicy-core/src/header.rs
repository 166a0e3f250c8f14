//! `Feature-Policy` directive builder.
//!
//! Pure function of `{catalog, settings}`. Per-feature failures fall back to
//! the default origin and never abort the build.

use serde::Serialize;

use crate::catalog::{Catalog, Feature};
use crate::origin::Origin;
use crate::settings::SettingsSnapshot;

/// Response header carrying the directive.
pub const HEADER_NAME: &str = "Feature-Policy";

/// Where a resolved origin came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OverrideSource {
    Default,
    Override,
    /// A stored override was present but unusable.
    MalformedOverride,
}

/// A feature together with its effective origin.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedFeature<'a> {
    pub feature: &'a Feature,
    pub origin: Origin,
    pub source: OverrideSource,
}

impl ResolvedFeature<'_> {
    /// `<name> <token>`
    pub fn clause(&self) -> String {
        format!("{} {}", self.feature.name, self.origin.as_token())
    }
}

/// Resolve every catalog feature, in catalog order.
pub fn resolve<'a>(catalog: &'a Catalog, settings: &SettingsSnapshot) -> Vec<ResolvedFeature<'a>> {
    catalog
        .get_all()
        .iter()
        .map(|feature| match settings.override_for(&feature.name) {
            Ok(Some(origin)) => ResolvedFeature {
                feature,
                origin,
                source: OverrideSource::Override,
            },
            Ok(None) => ResolvedFeature {
                feature,
                origin: feature.default_origin,
                source: OverrideSource::Default,
            },
            Err(e) => {
                tracing::debug!(error = %e, "falling back to default origin");
                ResolvedFeature {
                    feature,
                    origin: feature.default_origin,
                    source: OverrideSource::MalformedOverride,
                }
            }
        })
        .collect()
}

/// Build the directive string. Empty only when the catalog is empty.
pub fn build(catalog: &Catalog, settings: &SettingsSnapshot) -> String {
    join(&resolve(catalog, settings))
}

/// Join already-resolved features into a directive string.
pub fn join(resolved: &[ResolvedFeature<'_>]) -> String {
    resolved
        .iter()
        .map(ResolvedFeature::clause)
        .collect::<Vec<_>>()
        .join("; ")
}
