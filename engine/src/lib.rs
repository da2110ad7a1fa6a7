//! Commission Engine Core - Rust Engine
//!
//! Commission and payment recalculation for a brokerage CRM. The engine
//! derives per-payment dollar amounts and per-broker splits from a deal's
//! fee and percentage fields and keeps those derived values consistent as
//! upstream inputs change. A user can pin an individual payment's amount so
//! it survives recalculation while everything around it still auto-updates.
//!
//! # Architecture
//!
//! - **models**: Domain types (DealInputs, Payment, PaymentSplit, templates,
//!   per-deal state, audit events)
//! - **calc**: Derivation calculator (pure integer money math)
//! - **overrides**: Override ledger (pin / unpin, audit stamps)
//! - **propagation**: Split propagator (stored amount -> broker split rows)
//! - **engine**: Payment manager facade (staged event pipeline)
//! - **events**: Upstream change events consumed from the host
//!
//! # Critical Invariants
//!
//! 1. All money values are i64 (cents); percentages are i64 basis points
//! 2. Active payment amounts sum exactly to the deal fee whenever at least
//!    one active payment is unpinned
//! 3. A pinned payment's amount and AGCI never change except by an explicit
//!    override request
//! 4. Splits always derive from the stored payment amount, never from a
//!    fresh recalculation

// Module declarations
pub mod calc;
pub mod engine;
pub mod events;
pub mod models;
pub mod overrides;
pub mod propagation;

// Re-exports for convenience
pub use calc::{derive_components, distribute_evenly, PaymentComponents};
pub use engine::{CommissionEngine, EngineError, PaymentView, SplitView};
pub use events::UpstreamEvent;
pub use models::{
    deal::{DealInputs, InputError},
    event::{EngineEvent, EngineEventLog},
    payment::{AmountSource, Lifecycle, Payment},
    split::PaymentSplit,
    state::DealState,
    template::{CommissionTemplate, TemplateError, TemplateSet},
};
pub use overrides::OverrideError;
pub use propagation::PropagationError;
