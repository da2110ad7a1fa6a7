//! Upstream change events
//!
//! The engine's write surface: everything a collaborator (CRM forms,
//! migration jobs, API handlers) can ask the engine to do arrives as one of
//! these events. Each event is self-contained and JSON-serializable so the
//! host can queue, log and replay them.
//!
//! # Design Principles
//!
//! 1. **Money is i64**: all monetary values are integer cents
//! 2. **Percentages are i64 bps**: two-decimal-place percent precision
//! 3. **Self-contained**: events include all data needed for execution
//! 4. **Partial updates**: a deal change carries only the fields that moved

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An upstream change request for the engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UpstreamEvent {
    /// Deal-level inputs changed
    ///
    /// Any subset of fields may be present; absent fields are unchanged.
    DealChange {
        deal_id: String,
        #[serde(default)]
        fee: Option<i64>, // Integer cents
        #[serde(default)]
        number_of_payments: Option<u32>,
        #[serde(default)]
        referral_fee_bps: Option<i64>,
        #[serde(default)]
        house_bps: Option<i64>,
        #[serde(default)]
        origination_bps: Option<i64>,
        #[serde(default)]
        site_bps: Option<i64>,
        #[serde(default)]
        deal_bps: Option<i64>,
    },

    /// Pin a payment's amount
    SetOverride {
        payment_id: String,
        amount: i64, // Integer cents
        actor: String,
        at: DateTime<Utc>,
    },

    /// Remove a payment's pin and recompute
    ClearOverride { payment_id: String },

    /// Insert or replace a broker's template row
    TemplateUpsert {
        deal_id: String,
        broker_id: String,
        origination_bps: i64,
        site_bps: i64,
        deal_bps: i64,
    },

    /// Remove a broker's template row
    TemplateRemove { deal_id: String, broker_id: String },
}
