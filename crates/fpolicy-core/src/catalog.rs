//! Feature catalog.
//!
//! The catalog is built once at startup and is read-only afterwards. Its
//! order is the serialization order of the directive and the layout order of
//! the admin form.

use std::collections::HashSet;

use serde::Serialize;

use crate::error::{FpolicyError, Result};
use crate::origin::Origin;

/// A restrictable browser feature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Feature {
    /// Stable identifier as it appears in the header (e.g. `camera`).
    pub name: String,
    /// Display title.
    pub title: String,
    /// Origin used when no override is stored.
    pub default_origin: Origin,
}

impl Feature {
    pub fn new(name: impl Into<String>, title: impl Into<String>, default_origin: Origin) -> Self {
        Self {
            name: name.into(),
            title: title.into(),
            default_origin,
        }
    }
}

const BUILTIN: &[(&str, &str, Origin)] = &[
    ("accelerometer", "Accelerometer", Origin::SelfOrigin),
    ("ambient-light-sensor", "Ambient Light Sensor", Origin::SelfOrigin),
    ("autoplay", "Autoplay", Origin::SelfOrigin),
    ("camera", "Camera", Origin::SelfOrigin),
    ("document-domain", "Document Domain", Origin::Any),
    ("encrypted-media", "Encrypted Media", Origin::SelfOrigin),
    ("fullscreen", "Fullscreen", Origin::SelfOrigin),
    ("geolocation", "Geolocation", Origin::SelfOrigin),
    ("gyroscope", "Gyroscope", Origin::SelfOrigin),
    ("magnetometer", "Magnetometer", Origin::SelfOrigin),
    ("microphone", "Microphone", Origin::SelfOrigin),
    ("midi", "MIDI", Origin::SelfOrigin),
    ("payment", "Payment", Origin::SelfOrigin),
    ("picture-in-picture", "Picture-in-Picture", Origin::Any),
    ("speaker", "Speaker", Origin::SelfOrigin),
    ("sync-xhr", "Synchronous XHR", Origin::Any),
    ("usb", "USB", Origin::SelfOrigin),
    ("vr", "VR", Origin::SelfOrigin),
];

/// Ordered, immutable set of supported features.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    features: Vec<Feature>,
}

impl Catalog {
    /// Build a catalog from an ordered list. Names must be unique and non-empty.
    pub fn new(features: Vec<Feature>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(features.len());
        for f in &features {
            if f.name.is_empty() {
                return Err(FpolicyError::BadRequest("feature name must not be empty".into()));
            }
            if !seen.insert(f.name.as_str()) {
                return Err(FpolicyError::BadRequest(format!(
                    "duplicate feature in catalog: {}",
                    f.name
                )));
            }
        }
        Ok(Self { features })
    }

    /// The built-in feature set with the draft default allowlists.
    pub fn builtin() -> Self {
        Self {
            features: BUILTIN
                .iter()
                .map(|(name, title, origin)| Feature::new(*name, *title, *origin))
                .collect(),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// All features in display/serialization order.
    pub fn get_all(&self) -> &[Feature] {
        &self.features
    }

    /// Lookup by identifier.
    pub fn get(&self, name: &str) -> Result<&Feature> {
        self.features
            .iter()
            .find(|f| f.name == name)
            .ok_or_else(|| FpolicyError::NotFound(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.features.iter().any(|f| f.name == name)
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Keep only the named features (in catalog order). Unknown names fail.
    pub fn restrict_to(self, names: &[String]) -> Result<Self> {
        for n in names {
            self.get(n)?;
        }
        let features = self
            .features
            .into_iter()
            .filter(|f| names.iter().any(|n| n == &f.name))
            .collect();
        Ok(Self { features })
    }

    /// Replace the default origin of one feature.
    pub fn with_default(mut self, name: &str, origin: Origin) -> Result<Self> {
        let feature = self
            .features
            .iter_mut()
            .find(|f| f.name == name)
            .ok_or_else(|| FpolicyError::NotFound(name.to_string()))?;
        feature.default_origin = origin;
        Ok(self)
    }
}
