//! Per-broker payment split rows
//!
//! One row per (payment, broker), written wholesale by the split propagator
//! and never edited independently. The percentage fields are a snapshot of
//! the commission template at propagation time, not a live reference, so a
//! later template edit is visible only after the next propagation.
//!
//! CRITICAL: All money values are i64 (cents)

use serde::{Deserialize, Serialize};

/// A broker's share of one payment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentSplit {
    /// Payment this row belongs to
    pub payment_id: String,

    /// Broker receiving the share
    pub broker_id: String,

    /// Origination percentage snapshot (bps)
    pub origination_bps: i64,

    /// Site percentage snapshot (bps)
    pub site_bps: i64,

    /// Deal percentage snapshot (bps)
    pub deal_bps: i64,

    /// Broker's dollar share of the payment (i64 cents)
    pub amount: i64,
}
