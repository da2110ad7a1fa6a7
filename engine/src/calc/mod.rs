//! Derivation Calculator
//!
//! Pure, stateless arithmetic for the recalculation pipeline:
//! - Even distribution of a deal's fee over its payment schedule
//! - Percentage-to-dollar conversions (half-up to the cent)
//! - Largest-remainder allocation of category pools over broker weights
//! - Per-payment component derivation (referral fee, AGCI, pools)
//!
//! # Critical Invariants
//!
//! 1. All money values are i64 (cents); no floats in money math
//! 2. `distribute_evenly` sums exactly to its total (remainder to the last
//!    slot)
//! 3. `allocate_by_weights` sums exactly to the rounded pool share the
//!    weights claim
//!
//! # Example
//!
//! ```rust
//! use commission_engine_core_rs::calc::{derive_components, distribute_evenly};
//! use commission_engine_core_rs::models::DealInputs;
//!
//! let inputs = DealInputs::new(3_000_000, 3);
//! let amounts = distribute_evenly(inputs.fee, inputs.number_of_payments);
//! assert_eq!(amounts, vec![1_000_000, 1_000_000, 1_000_000]);
//!
//! let components = derive_components(amounts[0], &inputs);
//! assert_eq!(components.agci, 1_000_000);
//! ```

pub mod derivation;
pub mod money;

// Re-export public API
pub use derivation::{derive_components, PaymentComponents};
pub use money::{allocate_by_weights, apply_bps, distribute_evenly, round_half_up};
