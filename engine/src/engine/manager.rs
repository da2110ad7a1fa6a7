//! Payment Manager and engine facade
//!
//! The single write path for everything that touches a deal's payments.
//! Upstream changes (fee, schedule length, percentages), override requests
//! and template edits all flow through here as one explicit, ordered
//! pipeline:
//!
//! ```text
//! For each upstream event:
//! 1. Stage a copy of the deal's state
//! 2. Resize the schedule (archive / reactivate / create payments)
//! 3. Recompute derived amounts (pinned payments untouched)
//! 4. Propagate splits for every payment that actually changed
//! 5. Commit the staged state, or drop it wholesale on any error
//! ```
//!
//! The stage-then-commit shape is what makes a failed invariant check
//! harmless: nothing partially applies, matching a per-deal serializable
//! transaction in the host's storage layer. The `&mut self` write surface
//! is the single-writer-per-deal discipline; deals are independent entries
//! in the map and never affect each other.
//!
//! # Recompute Rule
//!
//! Derived amounts redistribute `fee - sum(pinned active amounts)` evenly
//! over the active unpinned payments, remainder to the last such sequence.
//! With at least one unpinned active payment, active amounts therefore
//! always sum exactly to the fee; pinned payments keep their amount to the
//! cent.

use crate::calc::{derive_components, distribute_evenly};
use crate::events::UpstreamEvent;
use crate::models::deal::{DealInputs, InputError};
use crate::models::event::{EngineEvent, EngineEventLog};
use crate::models::payment::Payment;
use crate::models::state::DealState;
use crate::models::template::{CommissionTemplate, TemplateError};
use crate::overrides::{self, OverrideError};
use crate::propagation::{self, PropagationError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use thiserror::Error;
use tracing::debug;

/// Errors surfaced by the engine facade
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("deal {deal_id} not found")]
    DealNotFound { deal_id: String },

    #[error("deal {deal_id} is already registered")]
    DealAlreadyRegistered { deal_id: String },

    #[error("payment {payment_id} not found")]
    PaymentNotFound { payment_id: String },

    #[error("invalid input: {0}")]
    Input(#[from] InputError),

    #[error("template error: {0}")]
    Template(#[from] TemplateError),

    #[error("override error: {0}")]
    Override(#[from] OverrideError),

    #[error("propagation error: {0}")]
    Propagation(#[from] PropagationError),
}

/// Read model for one active payment
///
/// Exposes the stored authoritative values; consumers must never recompute
/// amounts client-side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentView {
    pub payment_id: String,
    pub sequence: u32,
    pub payment_amount: i64,
    pub agci: i64,
    pub is_overridden: bool,
}

impl PaymentView {
    fn from_payment(payment: &Payment) -> Self {
        Self {
            payment_id: payment.id().to_string(),
            sequence: payment.sequence(),
            payment_amount: payment.amount(),
            agci: payment.agci(),
            is_overridden: payment.is_overridden(),
        }
    }
}

/// Read model for one split row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitView {
    pub broker_id: String,
    pub amount: i64,
}

/// The commission and payment recalculation engine
///
/// Owns the per-deal state and applies upstream events through the staged
/// pipeline described in the module docs.
///
/// # Example
///
/// ```rust
/// use commission_engine_core_rs::engine::CommissionEngine;
/// use commission_engine_core_rs::models::DealInputs;
///
/// let mut engine = CommissionEngine::new();
/// engine
///     .register_deal("deal-1", DealInputs::new(3_000_000, 3))
///     .unwrap();
///
/// let payments = engine.active_payments("deal-1").unwrap();
/// assert_eq!(payments.len(), 3);
/// assert_eq!(payments[0].payment_amount, 1_000_000);
/// ```
#[derive(Debug, Default)]
pub struct CommissionEngine {
    /// Per-deal state, independent entries
    deals: HashMap<String, DealState>,

    /// Audit log of every applied mutation
    event_log: EngineEventLog,
}

impl CommissionEngine {
    /// Create an empty engine
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild an engine from persisted deal states
    ///
    /// The event log starts empty; history older than the snapshot lives in
    /// the host's storage.
    pub fn from_snapshot(deals: Vec<DealState>) -> Self {
        Self {
            deals: deals
                .into_iter()
                .map(|d| (d.deal_id().to_string(), d))
                .collect(),
            event_log: EngineEventLog::new(),
        }
    }

    /// Register a deal and build its initial schedule and splits
    pub fn register_deal(
        &mut self,
        deal_id: &str,
        inputs: DealInputs,
    ) -> Result<Vec<EngineEvent>, EngineError> {
        inputs.validate()?;
        if self.deals.contains_key(deal_id) {
            return Err(EngineError::DealAlreadyRegistered {
                deal_id: deal_id.to_string(),
            });
        }

        let mut staged = DealState::new(deal_id.to_string(), inputs);
        let mut events = Vec::new();
        let mut dirty = Vec::new();
        let mut created = HashSet::new();

        Self::resize_schedule(&mut staged, &mut events, &mut dirty, &mut created);
        Self::recompute_amounts(&mut staged, &created, &mut events, &mut dirty);
        Self::propagate_dirty(&mut staged, &dirty, &mut events)?;

        self.commit(staged, events)
    }

    /// Apply one upstream change event
    ///
    /// Returns the audit events describing what actually changed. On error
    /// the stored state is exactly as it was before the call.
    pub fn apply(&mut self, event: UpstreamEvent) -> Result<Vec<EngineEvent>, EngineError> {
        match event {
            UpstreamEvent::DealChange {
                deal_id,
                fee,
                number_of_payments,
                referral_fee_bps,
                house_bps,
                origination_bps,
                site_bps,
                deal_bps,
            } => self.apply_deal_change(
                &deal_id,
                fee,
                number_of_payments,
                referral_fee_bps,
                house_bps,
                origination_bps,
                site_bps,
                deal_bps,
            ),
            UpstreamEvent::SetOverride {
                payment_id,
                amount,
                actor,
                at,
            } => self.apply_set_override(&payment_id, amount, &actor, at),
            UpstreamEvent::ClearOverride { payment_id } => self.apply_clear_override(&payment_id),
            UpstreamEvent::TemplateUpsert {
                deal_id,
                broker_id,
                origination_bps,
                site_bps,
                deal_bps,
            } => self.apply_template_upsert(
                &deal_id,
                CommissionTemplate {
                    broker_id,
                    origination_bps,
                    site_bps,
                    deal_bps,
                },
            ),
            UpstreamEvent::TemplateRemove { deal_id, broker_id } => {
                self.apply_template_remove(&deal_id, &broker_id)
            }
        }
    }

    /// List a deal's active payments in sequence order
    pub fn active_payments(&self, deal_id: &str) -> Result<Vec<PaymentView>, EngineError> {
        let deal = self.deal_or_err(deal_id)?;
        Ok(deal.active_payments().map(PaymentView::from_payment).collect())
    }

    /// List the stored split rows for a payment
    pub fn splits_for_payment(&self, payment_id: &str) -> Result<Vec<SplitView>, EngineError> {
        for deal in self.deals.values() {
            if deal.payment_by_id(payment_id).is_some() {
                return Ok(deal
                    .splits_for(payment_id)
                    .iter()
                    .map(|s| SplitView {
                        broker_id: s.broker_id.clone(),
                        amount: s.amount,
                    })
                    .collect());
            }
        }
        Err(EngineError::PaymentNotFound {
            payment_id: payment_id.to_string(),
        })
    }

    /// Get a deal's full state (host snapshotting, tests)
    pub fn deal(&self, deal_id: &str) -> Option<&DealState> {
        self.deals.get(deal_id)
    }

    /// Iterate all deal states
    pub fn deals(&self) -> impl Iterator<Item = &DealState> {
        self.deals.values()
    }

    /// Number of registered deals
    pub fn num_deals(&self) -> usize {
        self.deals.len()
    }

    /// The audit log of applied mutations
    pub fn event_log(&self) -> &EngineEventLog {
        &self.event_log
    }

    // ========================================================================
    // Event handlers
    // ========================================================================

    #[allow(clippy::too_many_arguments)]
    fn apply_deal_change(
        &mut self,
        deal_id: &str,
        fee: Option<i64>,
        number_of_payments: Option<u32>,
        referral_fee_bps: Option<i64>,
        house_bps: Option<i64>,
        origination_bps: Option<i64>,
        site_bps: Option<i64>,
        deal_bps: Option<i64>,
    ) -> Result<Vec<EngineEvent>, EngineError> {
        let mut staged = self.deal_or_err(deal_id)?.clone();

        let old_inputs = staged.inputs().clone();
        let mut new_inputs = old_inputs.clone();
        if let Some(v) = fee {
            new_inputs.fee = v;
        }
        if let Some(v) = number_of_payments {
            new_inputs.number_of_payments = v;
        }
        if let Some(v) = referral_fee_bps {
            new_inputs.referral_fee_bps = v;
        }
        if let Some(v) = house_bps {
            new_inputs.house_bps = v;
        }
        if let Some(v) = origination_bps {
            new_inputs.origination_bps = v;
        }
        if let Some(v) = site_bps {
            new_inputs.site_bps = v;
        }
        if let Some(v) = deal_bps {
            new_inputs.deal_bps = v;
        }
        new_inputs.validate()?;

        // A pool percentage change reshapes every active payment's splits,
        // including pinned payments whose amounts do not move
        let pools_reshaped = new_inputs.origination_bps != old_inputs.origination_bps
            || new_inputs.site_bps != old_inputs.site_bps
            || new_inputs.deal_bps != old_inputs.deal_bps;

        staged.set_inputs(new_inputs);

        let mut events = Vec::new();
        let mut dirty = Vec::new();
        let mut created = HashSet::new();

        Self::resize_schedule(&mut staged, &mut events, &mut dirty, &mut created);
        Self::recompute_amounts(&mut staged, &created, &mut events, &mut dirty);
        if pools_reshaped {
            dirty.extend(staged.active_payments().map(|p| p.id().to_string()));
        }
        Self::propagate_dirty(&mut staged, &dirty, &mut events)?;

        self.commit(staged, events)
    }

    fn apply_set_override(
        &mut self,
        payment_id: &str,
        amount: i64,
        actor: &str,
        at: DateTime<Utc>,
    ) -> Result<Vec<EngineEvent>, EngineError> {
        let mut staged = self.deal_of_payment(payment_id)?.clone();

        overrides::set_override(&mut staged, payment_id, amount, actor, at)?;

        let mut events = vec![EngineEvent::OverrideSet {
            deal_id: staged.deal_id().to_string(),
            payment_id: payment_id.to_string(),
            amount,
            actor: actor.to_string(),
        }];

        // The pin changed this payment's stored amount; its splits follow.
        // Other payments are deliberately left alone until the next
        // recompute-triggering change.
        Self::propagate_dirty(&mut staged, &[payment_id.to_string()], &mut events)?;

        self.commit(staged, events)
    }

    fn apply_clear_override(&mut self, payment_id: &str) -> Result<Vec<EngineEvent>, EngineError> {
        let mut staged = self.deal_of_payment(payment_id)?.clone();

        let cleared = overrides::clear_override(&mut staged, payment_id)?;

        let mut events = Vec::new();
        if cleared {
            events.push(EngineEvent::OverrideCleared {
                deal_id: staged.deal_id().to_string(),
                payment_id: payment_id.to_string(),
            });
        }

        // The freed payment rejoins the distribution alongside every other
        // unpinned payment, as if the pin had never been set
        let mut dirty = Vec::new();
        let created = HashSet::new();
        Self::recompute_amounts(&mut staged, &created, &mut events, &mut dirty);
        Self::propagate_dirty(&mut staged, &dirty, &mut events)?;

        self.commit(staged, events)
    }

    fn apply_template_upsert(
        &mut self,
        deal_id: &str,
        row: CommissionTemplate,
    ) -> Result<Vec<EngineEvent>, EngineError> {
        let mut staged = self.deal_or_err(deal_id)?.clone();

        let broker_id = row.broker_id.clone();
        staged.templates_mut().upsert(row)?;

        let mut events = vec![EngineEvent::TemplateUpserted {
            deal_id: deal_id.to_string(),
            broker_id,
        }];

        // A template edit retroactively reshapes every active payment's
        // splits; only payment amounts are protected by overrides
        let dirty: Vec<String> = staged.active_payments().map(|p| p.id().to_string()).collect();
        Self::propagate_dirty(&mut staged, &dirty, &mut events)?;

        self.commit(staged, events)
    }

    fn apply_template_remove(
        &mut self,
        deal_id: &str,
        broker_id: &str,
    ) -> Result<Vec<EngineEvent>, EngineError> {
        let mut staged = self.deal_or_err(deal_id)?.clone();

        staged.templates_mut().remove(broker_id)?;

        let mut events = vec![EngineEvent::TemplateRemoved {
            deal_id: deal_id.to_string(),
            broker_id: broker_id.to_string(),
        }];

        let dirty: Vec<String> = staged.active_payments().map(|p| p.id().to_string()).collect();
        Self::propagate_dirty(&mut staged, &dirty, &mut events)?;

        self.commit(staged, events)
    }

    // ========================================================================
    // Pipeline stages
    // ========================================================================

    /// Align the payment rows with `number_of_payments`.
    ///
    /// Sequences past the target are archived; archived sequences inside the
    /// target are reactivated (override state intact); missing sequences are
    /// created as zero-amount placeholders that the recompute stage fills in.
    fn resize_schedule(
        staged: &mut DealState,
        events: &mut Vec<EngineEvent>,
        dirty: &mut Vec<String>,
        created: &mut HashSet<String>,
    ) {
        let target = staged.inputs().number_of_payments;
        let deal_id = staged.deal_id().to_string();

        for payment in staged.payments_mut().iter_mut() {
            if payment.sequence() > target && payment.is_active() {
                payment.archive();
                events.push(EngineEvent::PaymentArchived {
                    deal_id: deal_id.clone(),
                    payment_id: payment.id().to_string(),
                    sequence: payment.sequence(),
                });
            } else if payment.sequence() <= target && payment.is_archived() {
                payment.reactivate();
                events.push(EngineEvent::PaymentReactivated {
                    deal_id: deal_id.clone(),
                    payment_id: payment.id().to_string(),
                    sequence: payment.sequence(),
                });
                // Reactivated payments re-propagate even when pinned: their
                // splits may be stale relative to the current template
                dirty.push(payment.id().to_string());
            }
        }

        for sequence in staged.max_sequence() + 1..=target {
            let payment = Payment::new(deal_id.clone(), sequence, 0, 0);
            created.insert(payment.id().to_string());
            staged.insert_payment(payment);
        }
    }

    /// Redistribute the fee over the active unpinned payments.
    ///
    /// Pinned payments are skipped entirely; their amount and AGCI stay
    /// untouched. With no unpinned active payment there is nothing to
    /// recompute and the fee sum cannot be restored; the pins win.
    fn recompute_amounts(
        staged: &mut DealState,
        created: &HashSet<String>,
        events: &mut Vec<EngineEvent>,
        dirty: &mut Vec<String>,
    ) {
        let inputs = staged.inputs().clone();
        let deal_id = staged.deal_id().to_string();

        let unpinned = staged
            .active_payments()
            .filter(|p| !p.is_overridden())
            .count();
        if unpinned == 0 {
            debug!(deal_id = %deal_id, "every active payment is pinned, skipping recompute");
            return;
        }

        let distributable = inputs.fee - staged.overridden_active_total();
        let amounts = distribute_evenly(distributable, unpinned as u32);
        debug!(
            deal_id = %deal_id,
            distributable, unpinned, "recomputing derived payment amounts"
        );

        for (payment, new_amount) in staged
            .payments_mut()
            .iter_mut()
            .filter(|p| p.is_active() && !p.is_overridden())
            .zip(amounts)
        {
            let agci = derive_components(new_amount, &inputs).agci;
            let is_new = created.contains(payment.id());
            if payment.amount() == new_amount && payment.agci() == agci && !is_new {
                continue;
            }

            let old_amount = payment.amount();
            payment.set_derived_amount(new_amount, agci);

            if is_new {
                events.push(EngineEvent::created(payment));
            } else {
                events.push(EngineEvent::PaymentRecomputed {
                    deal_id: deal_id.clone(),
                    payment_id: payment.id().to_string(),
                    sequence: payment.sequence(),
                    old_amount,
                    new_amount,
                    agci,
                });
            }
            dirty.push(payment.id().to_string());
        }
    }

    /// Rewrite split rows for every dirty payment.
    ///
    /// Duplicates are propagated once; archived ids are skipped (their rows
    /// stay as audit history until reactivation re-propagates them).
    fn propagate_dirty(
        staged: &mut DealState,
        dirty: &[String],
        events: &mut Vec<EngineEvent>,
    ) -> Result<(), PropagationError> {
        let deal_id = staged.deal_id().to_string();
        let mut seen = HashSet::new();

        for payment_id in dirty {
            if !seen.insert(payment_id.clone()) {
                continue;
            }
            let rows = match staged.payment_by_id(payment_id) {
                Some(payment) if payment.is_active() => {
                    propagation::propagate(payment, staged.inputs(), staged.templates())?
                }
                _ => continue,
            };

            events.push(EngineEvent::SplitsPropagated {
                deal_id: deal_id.clone(),
                payment_id: payment_id.clone(),
                broker_count: rows.len(),
                total_amount: rows.iter().map(|s| s.amount).sum(),
            });
            staged.set_splits(payment_id.clone(), rows);
        }
        Ok(())
    }

    // ========================================================================
    // Plumbing
    // ========================================================================

    fn deal_or_err(&self, deal_id: &str) -> Result<&DealState, EngineError> {
        self.deals.get(deal_id).ok_or_else(|| EngineError::DealNotFound {
            deal_id: deal_id.to_string(),
        })
    }

    fn deal_of_payment(&self, payment_id: &str) -> Result<&DealState, EngineError> {
        self.deals
            .values()
            .find(|d| d.payment_by_id(payment_id).is_some())
            .ok_or_else(|| EngineError::PaymentNotFound {
                payment_id: payment_id.to_string(),
            })
    }

    /// Commit a staged deal state and its audit events
    fn commit(
        &mut self,
        staged: DealState,
        events: Vec<EngineEvent>,
    ) -> Result<Vec<EngineEvent>, EngineError> {
        self.event_log.extend(events.iter().cloned());
        self.deals.insert(staged.deal_id().to_string(), staged);
        Ok(events)
    }
}
