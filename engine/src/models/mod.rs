//! Domain models for the commission engine

pub mod deal;
pub mod event;
pub mod payment;
pub mod split;
pub mod state;
pub mod template;

// Re-exports
pub use deal::{DealInputs, InputError, FULL_PERCENT_BPS};
pub use event::{EngineEvent, EngineEventLog};
pub use payment::{AmountSource, Lifecycle, Payment};
pub use split::PaymentSplit;
pub use state::DealState;
pub use template::{CommissionTemplate, TemplateError, TemplateSet};
