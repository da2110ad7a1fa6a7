//! Deal-level commission inputs
//!
//! A deal carries the upstream parameters every derived value flows from:
//! the total fee, the payment schedule length, and the percentage fields
//! (referral, house, origination, site, deal).
//!
//! CRITICAL: All money values are i64 (cents). All percentages are i64
//! basis points (1 bp = 0.01%), which gives exactly the two-decimal-place
//! percentage precision commission agreements are written with.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 100% expressed in basis points.
pub const FULL_PERCENT_BPS: i64 = 10_000;

/// Errors for malformed deal inputs
///
/// Inputs are rejected before any derived value is written.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("number_of_payments must be positive")]
    NonPositivePaymentCount,

    #[error("fee must not be negative, got {fee}")]
    NegativeFee { fee: i64 },

    #[error("{field} must be between 0% and 100%, got {bps} bps")]
    PercentOutOfRange { field: &'static str, bps: i64 },
}

/// Commission parameters of a single deal
///
/// Owned by the host CRM; the engine reads these fields and reacts to their
/// changes. `origination_bps`, `site_bps` and `deal_bps` size the category
/// pools that broker splits are carved from; `referral_fee_bps` is taken off
/// the top of each payment before anything else.
///
/// # Example
/// ```
/// use commission_engine_core_rs::models::DealInputs;
///
/// let inputs = DealInputs {
///     fee: 3_000_000, // $30,000.00 in cents
///     number_of_payments: 3,
///     referral_fee_bps: 0,
///     house_bps: 0,
///     origination_bps: 5_000, // 50%
///     site_bps: 0,
///     deal_bps: 5_000, // 50%
/// };
/// assert!(inputs.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DealInputs {
    /// Total commission for the deal (i64 cents)
    pub fee: i64,

    /// Number of scheduled disbursements (must be positive)
    pub number_of_payments: u32,

    /// Referral fee taken off each payment's gross amount (bps)
    pub referral_fee_bps: i64,

    /// House share of AGCI (bps)
    pub house_bps: i64,

    /// Origination pool share of AGCI (bps)
    pub origination_bps: i64,

    /// Site pool share of AGCI (bps)
    pub site_bps: i64,

    /// Deal pool share of AGCI (bps)
    pub deal_bps: i64,
}

impl DealInputs {
    /// Create inputs with the given fee and schedule length, all percentages zero
    pub fn new(fee: i64, number_of_payments: u32) -> Self {
        Self {
            fee,
            number_of_payments,
            referral_fee_bps: 0,
            house_bps: 0,
            origination_bps: 0,
            site_bps: 0,
            deal_bps: 0,
        }
    }

    /// Validate every field
    ///
    /// # Returns
    /// - `Ok(())` when the inputs are usable for derivation
    /// - `Err(InputError)` naming the first offending field
    pub fn validate(&self) -> Result<(), InputError> {
        if self.number_of_payments == 0 {
            return Err(InputError::NonPositivePaymentCount);
        }
        if self.fee < 0 {
            return Err(InputError::NegativeFee { fee: self.fee });
        }
        for (field, bps) in [
            ("referral_fee_percent", self.referral_fee_bps),
            ("house_percent", self.house_bps),
            ("origination_percent", self.origination_bps),
            ("site_percent", self.site_bps),
            ("deal_percent", self.deal_bps),
        ] {
            if !(0..=FULL_PERCENT_BPS).contains(&bps) {
                return Err(InputError::PercentOutOfRange { field, bps });
            }
        }
        Ok(())
    }

    /// Sum of the three category pool percentages (bps)
    ///
    /// When this is exactly 100%, the category pools together cover AGCI and
    /// split reconciliation applies.
    pub fn category_total_bps(&self) -> i64 {
        self.origination_bps + self.site_bps + self.deal_bps
    }
}
