//! Deal state
//!
//! Represents the complete engine-owned state of one deal: its commission
//! inputs, the payment schedule, the broker template set, and the split
//! rows per payment.
//!
//! Deals are independent of each other; the engine holds one `DealState`
//! per deal and every mutation is scoped to a single deal, so cross-deal
//! operations never interleave.
//!
//! # Critical Invariants
//!
//! 1. **Sequence Uniqueness**: Each sequence appears exactly once per deal
//! 2. **Fee Conservation**: Active amounts sum to the fee whenever at least
//!    one active payment is unpinned (the recompute restores this after
//!    every schedule or fee change)
//! 3. **Split Validity**: Every split row references a payment in this deal

use crate::models::deal::DealInputs;
use crate::models::payment::Payment;
use crate::models::split::PaymentSplit;
use crate::models::template::TemplateSet;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Complete engine state for one deal
///
/// # Example
///
/// ```rust
/// use commission_engine_core_rs::models::{DealInputs, DealState, Payment};
///
/// let mut state = DealState::new("deal-1".to_string(), DealInputs::new(3_000_000, 3));
/// state.insert_payment(Payment::new("deal-1".to_string(), 1, 1_000_000, 1_000_000));
/// assert_eq!(state.num_payments(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DealState {
    /// Deal identifier (owned by the host CRM)
    deal_id: String,

    /// Current upstream parameters
    inputs: DealInputs,

    /// All payments, active and archived, ordered by sequence
    payments: Vec<Payment>,

    /// Broker split templates for this deal
    templates: TemplateSet,

    /// Split rows, indexed by payment ID
    splits: HashMap<String, Vec<PaymentSplit>>,
}

impl DealState {
    /// Create a deal with no payments yet
    pub fn new(deal_id: String, inputs: DealInputs) -> Self {
        Self {
            deal_id,
            inputs,
            payments: Vec::new(),
            templates: TemplateSet::new(),
            splits: HashMap::new(),
        }
    }

    /// Get the deal ID
    pub fn deal_id(&self) -> &str {
        &self.deal_id
    }

    /// Get the current inputs
    pub fn inputs(&self) -> &DealInputs {
        &self.inputs
    }

    /// Replace the inputs (caller validates first)
    pub fn set_inputs(&mut self, inputs: DealInputs) {
        self.inputs = inputs;
    }

    /// All payments, active and archived, ordered by sequence
    pub fn payments(&self) -> &[Payment] {
        &self.payments
    }

    /// Mutable access to all payments, ordered by sequence
    pub fn payments_mut(&mut self) -> &mut [Payment] {
        &mut self.payments
    }

    /// Active payments in sequence order
    pub fn active_payments(&self) -> impl Iterator<Item = &Payment> {
        self.payments.iter().filter(|p| p.is_active())
    }

    /// Get a payment by ID
    pub fn payment_by_id(&self, payment_id: &str) -> Option<&Payment> {
        self.payments.iter().find(|p| p.id() == payment_id)
    }

    /// Get a mutable payment by ID
    pub fn payment_by_id_mut(&mut self, payment_id: &str) -> Option<&mut Payment> {
        self.payments.iter_mut().find(|p| p.id() == payment_id)
    }

    /// Get a payment by sequence
    pub fn payment_by_sequence(&self, sequence: u32) -> Option<&Payment> {
        self.payments.iter().find(|p| p.sequence() == sequence)
    }

    /// Get a mutable payment by sequence
    pub fn payment_by_sequence_mut(&mut self, sequence: u32) -> Option<&mut Payment> {
        self.payments.iter_mut().find(|p| p.sequence() == sequence)
    }

    /// Add a payment, keeping sequence order
    ///
    /// # Panics
    ///
    /// Panics if the sequence already exists in this deal (duplicate
    /// schedule slot)
    pub fn insert_payment(&mut self, payment: Payment) {
        assert!(
            self.payment_by_sequence(payment.sequence()).is_none(),
            "Sequence {} already exists in deal {}",
            payment.sequence(),
            self.deal_id
        );
        let idx = self
            .payments
            .partition_point(|p| p.sequence() < payment.sequence());
        self.payments.insert(idx, payment);
    }

    /// Highest sequence ever scheduled for this deal (0 when empty)
    pub fn max_sequence(&self) -> u32 {
        self.payments.last().map(|p| p.sequence()).unwrap_or(0)
    }

    /// Number of payments, active and archived
    pub fn num_payments(&self) -> usize {
        self.payments.len()
    }

    /// Get the template set
    pub fn templates(&self) -> &TemplateSet {
        &self.templates
    }

    /// Get mutable access to the template set
    pub fn templates_mut(&mut self) -> &mut TemplateSet {
        &mut self.templates
    }

    /// Split rows for a payment (empty if never propagated)
    pub fn splits_for(&self, payment_id: &str) -> &[PaymentSplit] {
        self.splits
            .get(payment_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Replace a payment's split rows wholesale
    pub fn set_splits(&mut self, payment_id: String, rows: Vec<PaymentSplit>) {
        self.splits.insert(payment_id, rows);
    }

    /// Sum of active payment amounts (for invariant checking)
    pub fn active_amount_total(&self) -> i64 {
        self.active_payments().map(|p| p.amount()).sum()
    }

    /// Sum of active, overridden payment amounts
    pub fn overridden_active_total(&self) -> i64 {
        self.active_payments()
            .filter(|p| p.is_overridden())
            .map(|p| p.amount())
            .sum()
    }
}
