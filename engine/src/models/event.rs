//! Audit event log
//!
//! Every applied mutation emits events describing exactly what changed.
//! Events enable:
//! - Auditing (who pinned what, when a schedule shrank, what recomputed)
//! - Debugging (understand what a single upstream change cascaded into)
//! - Host-side change feeds (persist only what actually moved)
//!
//! # Event Types
//!
//! Events are categorized by pipeline stage:
//! - **Schedule**: payment created / reactivated / archived
//! - **Recompute**: a derived amount moved
//! - **Override**: a pin was set or cleared
//! - **Template**: a broker row was upserted or removed
//! - **Propagation**: a payment's split rows were rewritten

use crate::models::payment::Payment;

/// Engine event capturing one applied state change.
///
/// Events are logged in the order they occur within a mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// A new payment joined the schedule
    PaymentCreated {
        deal_id: String,
        payment_id: String,
        sequence: u32,
        amount: i64,
        agci: i64,
    },

    /// An archived payment rejoined the schedule
    PaymentReactivated {
        deal_id: String,
        payment_id: String,
        sequence: u32,
    },

    /// The schedule shrank past this payment
    PaymentArchived {
        deal_id: String,
        payment_id: String,
        sequence: u32,
    },

    /// A derived amount was recomputed
    PaymentRecomputed {
        deal_id: String,
        payment_id: String,
        sequence: u32,
        old_amount: i64,
        new_amount: i64,
        agci: i64,
    },

    /// A payment amount was manually pinned
    OverrideSet {
        deal_id: String,
        payment_id: String,
        amount: i64,
        actor: String,
    },

    /// A pin was removed
    OverrideCleared {
        deal_id: String,
        payment_id: String,
    },

    /// A broker's template row was inserted or replaced
    TemplateUpserted {
        deal_id: String,
        broker_id: String,
    },

    /// A broker's template row was removed
    TemplateRemoved {
        deal_id: String,
        broker_id: String,
    },

    /// A payment's split rows were rewritten
    SplitsPropagated {
        deal_id: String,
        payment_id: String,
        broker_count: usize,
        total_amount: i64,
    },
}

impl EngineEvent {
    /// Get a short description of the event type
    pub fn event_type(&self) -> &'static str {
        match self {
            EngineEvent::PaymentCreated { .. } => "PaymentCreated",
            EngineEvent::PaymentReactivated { .. } => "PaymentReactivated",
            EngineEvent::PaymentArchived { .. } => "PaymentArchived",
            EngineEvent::PaymentRecomputed { .. } => "PaymentRecomputed",
            EngineEvent::OverrideSet { .. } => "OverrideSet",
            EngineEvent::OverrideCleared { .. } => "OverrideCleared",
            EngineEvent::TemplateUpserted { .. } => "TemplateUpserted",
            EngineEvent::TemplateRemoved { .. } => "TemplateRemoved",
            EngineEvent::SplitsPropagated { .. } => "SplitsPropagated",
        }
    }

    /// Get the deal this event belongs to
    pub fn deal_id(&self) -> &str {
        match self {
            EngineEvent::PaymentCreated { deal_id, .. } => deal_id,
            EngineEvent::PaymentReactivated { deal_id, .. } => deal_id,
            EngineEvent::PaymentArchived { deal_id, .. } => deal_id,
            EngineEvent::PaymentRecomputed { deal_id, .. } => deal_id,
            EngineEvent::OverrideSet { deal_id, .. } => deal_id,
            EngineEvent::OverrideCleared { deal_id, .. } => deal_id,
            EngineEvent::TemplateUpserted { deal_id, .. } => deal_id,
            EngineEvent::TemplateRemoved { deal_id, .. } => deal_id,
            EngineEvent::SplitsPropagated { deal_id, .. } => deal_id,
        }
    }

    /// Get the payment ID if the event relates to a specific payment
    pub fn payment_id(&self) -> Option<&str> {
        match self {
            EngineEvent::PaymentCreated { payment_id, .. } => Some(payment_id),
            EngineEvent::PaymentReactivated { payment_id, .. } => Some(payment_id),
            EngineEvent::PaymentArchived { payment_id, .. } => Some(payment_id),
            EngineEvent::PaymentRecomputed { payment_id, .. } => Some(payment_id),
            EngineEvent::OverrideSet { payment_id, .. } => Some(payment_id),
            EngineEvent::OverrideCleared { payment_id, .. } => Some(payment_id),
            EngineEvent::SplitsPropagated { payment_id, .. } => Some(payment_id),
            _ => None,
        }
    }

    /// Build a created event from a payment
    pub(crate) fn created(payment: &Payment) -> Self {
        EngineEvent::PaymentCreated {
            deal_id: payment.deal_id().to_string(),
            payment_id: payment.id().to_string(),
            sequence: payment.sequence(),
            amount: payment.amount(),
            agci: payment.agci(),
        }
    }
}

/// Append-only log of applied engine events.
///
/// A simple wrapper around Vec<EngineEvent> with convenience queries.
#[derive(Debug, Clone, Default)]
pub struct EngineEventLog {
    events: Vec<EngineEvent>,
}

impl EngineEventLog {
    /// Create a new empty event log
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Add an event to the log
    pub fn log(&mut self, event: EngineEvent) {
        self.events.push(event);
    }

    /// Append a batch of events in order
    pub fn extend(&mut self, events: impl IntoIterator<Item = EngineEvent>) {
        self.events.extend(events);
    }

    /// Get the number of events logged
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Check if the log is empty
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Get all events
    pub fn events(&self) -> &[EngineEvent] {
        &self.events
    }

    /// Get events for a specific deal
    pub fn events_for_deal(&self, deal_id: &str) -> Vec<&EngineEvent> {
        self.events.iter().filter(|e| e.deal_id() == deal_id).collect()
    }

    /// Get events for a specific payment
    pub fn events_for_payment(&self, payment_id: &str) -> Vec<&EngineEvent> {
        self.events
            .iter()
            .filter(|e| e.payment_id() == Some(payment_id))
            .collect()
    }

    /// Get events of a specific type
    pub fn events_of_type(&self, event_type: &str) -> Vec<&EngineEvent> {
        self.events
            .iter()
            .filter(|e| e.event_type() == event_type)
            .collect()
    }

    /// Clear all events
    pub fn clear(&mut self) {
        self.events.clear();
    }
}
