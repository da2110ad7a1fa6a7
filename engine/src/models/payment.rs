//! Payment model
//!
//! Represents one scheduled disbursement of a deal's fee.
//! Each payment has:
//! - A stable 1-based sequence within its deal
//! - Amount and AGCI (i64 cents), authoritative for everything downstream
//! - An amount source: derived by the engine, or pinned by a user override
//! - A lifecycle: active, or archived when the schedule shrinks past it
//!
//! Archived payments are never physically deleted; they keep their override
//! state so a later schedule grow resurfaces them exactly as they were.
//!
//! CRITICAL: All money values are i64 (cents)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Where a payment's amount came from
///
/// Overrides are a tagged state rather than a flag plus nullable audit
/// columns, so an audit stamp cannot exist without the pin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum AmountSource {
    /// Amount was computed by the engine and may be recomputed at any time
    Derived,

    /// Amount was manually pinned and is excluded from recomputation
    Overridden {
        /// Who pinned the amount
        actor: String,
        /// When the pin was written (host-supplied)
        at: DateTime<Utc>,
    },
}

/// Payment lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lifecycle {
    /// Payment is part of the current schedule
    Active,

    /// Schedule shrank past this sequence; kept for audit and possible
    /// reactivation
    Archived,
}

/// One scheduled disbursement of a deal's fee
///
/// # Example
/// ```
/// use commission_engine_core_rs::models::Payment;
///
/// let payment = Payment::new("deal-1".to_string(), 1, 1_000_000, 1_000_000);
/// assert_eq!(payment.sequence(), 1);
/// assert!(payment.is_active());
/// assert!(!payment.is_overridden());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    /// Unique payment identifier (UUID)
    id: String,

    /// Owning deal
    deal_id: String,

    /// Stable ordering key, 1..=number_of_payments
    sequence: u32,

    /// Disbursement amount (i64 cents), the authoritative value
    amount: i64,

    /// Adjusted gross commission income for this payment (i64 cents)
    agci: i64,

    /// Derived or pinned
    source: AmountSource,

    /// Active or archived
    lifecycle: Lifecycle,
}

impl Payment {
    /// Create a new active, derived payment
    pub fn new(deal_id: String, sequence: u32, amount: i64, agci: i64) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            deal_id,
            sequence,
            amount,
            agci,
            source: AmountSource::Derived,
            lifecycle: Lifecycle::Active,
        }
    }

    /// Restore a payment from persisted fields
    ///
    /// Used when the host loads stored rows back into the engine; every
    /// field is preserved, including the ID, override state and lifecycle.
    pub fn from_snapshot(
        id: String,
        deal_id: String,
        sequence: u32,
        amount: i64,
        agci: i64,
        source: AmountSource,
        lifecycle: Lifecycle,
    ) -> Self {
        Self {
            id,
            deal_id,
            sequence,
            amount,
            agci,
            source,
            lifecycle,
        }
    }

    /// Get payment ID
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Get owning deal ID
    pub fn deal_id(&self) -> &str {
        &self.deal_id
    }

    /// Get sequence (1-based, stable)
    pub fn sequence(&self) -> u32 {
        self.sequence
    }

    /// Get the stored amount (i64 cents)
    pub fn amount(&self) -> i64 {
        self.amount
    }

    /// Get the stored AGCI (i64 cents)
    pub fn agci(&self) -> i64 {
        self.agci
    }

    /// Get the amount source
    pub fn source(&self) -> &AmountSource {
        &self.source
    }

    /// Check if the amount is pinned by an override
    pub fn is_overridden(&self) -> bool {
        matches!(self.source, AmountSource::Overridden { .. })
    }

    /// Who pinned the amount, if overridden
    pub fn overridden_by(&self) -> Option<&str> {
        match &self.source {
            AmountSource::Overridden { actor, .. } => Some(actor),
            AmountSource::Derived => None,
        }
    }

    /// When the amount was pinned, if overridden
    pub fn overridden_at(&self) -> Option<DateTime<Utc>> {
        match &self.source {
            AmountSource::Overridden { at, .. } => Some(*at),
            AmountSource::Derived => None,
        }
    }

    /// Check if the payment is part of the current schedule
    pub fn is_active(&self) -> bool {
        matches!(self.lifecycle, Lifecycle::Active)
    }

    /// Check if the payment has been archived
    pub fn is_archived(&self) -> bool {
        matches!(self.lifecycle, Lifecycle::Archived)
    }

    /// Write a recomputed amount and AGCI
    ///
    /// Only the recompute path calls this, and only for active payments
    /// whose amount is not pinned. The pin is the single source of truth for
    /// "is this value allowed to change automatically".
    pub fn set_derived_amount(&mut self, amount: i64, agci: i64) {
        debug_assert!(!self.is_overridden(), "recompute must skip pinned payments");
        debug_assert!(self.is_active(), "recompute must skip archived payments");
        self.amount = amount;
        self.agci = agci;
    }

    /// Pin the amount with an override
    ///
    /// Sets the pin and writes the new amount and AGCI in one step; there is
    /// no intermediate state where the pin exists but the old amount is
    /// still live. Re-pinning an already overridden payment replaces the
    /// amount and the audit stamp.
    pub fn pin(&mut self, amount: i64, agci: i64, actor: String, at: DateTime<Utc>) {
        debug_assert!(self.is_active(), "only active payments can be overridden");
        self.amount = amount;
        self.agci = agci;
        self.source = AmountSource::Overridden { actor, at };
    }

    /// Remove the pin, keeping the current amount
    ///
    /// Does not recompute; the caller is expected to run the deal recompute
    /// afterwards. Returns `true` if a pin was present.
    pub fn unpin(&mut self) -> bool {
        if self.is_overridden() {
            self.source = AmountSource::Derived;
            true
        } else {
            false
        }
    }

    /// Archive the payment (schedule shrank past its sequence)
    ///
    /// Override state is deliberately left intact so a reactivated payment
    /// resurfaces with its prior pin.
    pub fn archive(&mut self) {
        self.lifecycle = Lifecycle::Archived;
    }

    /// Reactivate an archived payment (schedule grew back over its sequence)
    pub fn reactivate(&mut self) {
        self.lifecycle = Lifecycle::Active;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_payment() -> Payment {
        Payment::new("deal-1".to_string(), 1, 1_000_000, 950_000)
    }

    #[test]
    fn test_new_payment_is_active_and_derived() {
        let payment = sample_payment();
        assert!(payment.is_active());
        assert!(!payment.is_overridden());
        assert_eq!(payment.amount(), 1_000_000);
        assert_eq!(payment.agci(), 950_000);
    }

    #[test]
    fn test_pin_writes_amount_and_stamp_together() {
        let mut payment = sample_payment();
        let at = Utc::now();

        payment.pin(1_050_050, 1_050_050, "user-7".to_string(), at);

        assert!(payment.is_overridden());
        assert_eq!(payment.amount(), 1_050_050);
        assert_eq!(payment.agci(), 1_050_050);
        assert_eq!(payment.overridden_by(), Some("user-7"));
        assert_eq!(payment.overridden_at(), Some(at));
    }

    #[test]
    fn test_unpin_keeps_amount() {
        let mut payment = sample_payment();
        payment.pin(1_050_050, 1_050_050, "user-7".to_string(), Utc::now());

        assert!(payment.unpin());
        assert!(!payment.is_overridden());
        assert_eq!(payment.amount(), 1_050_050);
        assert_eq!(payment.overridden_by(), None);
        assert_eq!(payment.overridden_at(), None);
    }

    #[test]
    fn test_unpin_without_pin_is_noop() {
        let mut payment = sample_payment();
        assert!(!payment.unpin());
        assert!(!payment.is_overridden());
    }

    #[test]
    fn test_archive_preserves_override() {
        let mut payment = sample_payment();
        payment.pin(500_000, 500_000, "user-7".to_string(), Utc::now());

        payment.archive();
        assert!(payment.is_archived());
        assert!(payment.is_overridden());

        payment.reactivate();
        assert!(payment.is_active());
        assert!(payment.is_overridden());
        assert_eq!(payment.amount(), 500_000);
    }

    #[test]
    fn test_repin_replaces_stamp() {
        let mut payment = sample_payment();
        payment.pin(100, 100, "first".to_string(), Utc::now());
        let later = Utc::now();
        payment.pin(200, 200, "second".to_string(), later);

        assert_eq!(payment.amount(), 200);
        assert_eq!(payment.overridden_by(), Some("second"));
        assert_eq!(payment.overridden_at(), Some(later));
    }
}
