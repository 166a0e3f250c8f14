//! fpolicy core: the feature catalog, origin tokens, settings snapshots and
//! the `Feature-Policy` directive builder.
//!
//! This crate carries no transport or runtime dependencies. The gateway crate
//! (or any other host) supplies a settings snapshot and attaches the built
//! directive to its responses.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here. Malformed settings
//! never abort a build; they fall back to the feature's default origin.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod admin;
pub mod catalog;
pub mod error;
pub mod header;
pub mod origin;
pub mod settings;

/// Shared result type.
pub use error::{FpolicyError, Result};

pub use catalog::{Catalog, Feature};
pub use header::{build, join, resolve, OverrideSource, ResolvedFeature, HEADER_NAME};
pub use origin::Origin;
pub use settings::SettingsSnapshot;
