//! fpolicy gateway library entry.
//!
//! Wires the config loader, settings providers, the `Feature-Policy` response
//! middleware, the admin screen and the JSON settings API into an axum
//! router. Consumed by the binary (`main.rs`) and by integration tests.

pub mod app_state;
pub mod config;
pub mod obs;
pub mod ops;
pub mod router;
pub mod settings;
pub mod transport;
