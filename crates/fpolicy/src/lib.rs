//! Top-level facade crate for fpolicy.
//!
//! Re-exports core types and the gateway library so users can depend on a single crate.

pub mod core {
    pub use fpolicy_core::*;
}

pub mod gateway {
    pub use fpolicy_gateway::*;
}
