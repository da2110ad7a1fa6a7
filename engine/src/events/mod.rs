//! Upstream event types consumed by the engine
//!
//! See `types.rs` for the event definitions; the audit log the engine
//! produces lives in `models::event`.

pub mod types;

pub use types::UpstreamEvent;
