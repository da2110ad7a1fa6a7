//! Engine facade - the Payment Manager pipeline
//!
//! Implements the staged mutation pipeline over per-deal state.
//!
//! See `manager.rs` for full implementation.

pub mod manager;

// Re-export main types for convenience
pub use manager::{CommissionEngine, EngineError, PaymentView, SplitView};
