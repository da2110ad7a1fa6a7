//! Payment component derivation
//!
//! Pure functions computing the dollar components of a single payment from
//! its gross amount and the deal's percentage fields. No state; the payment
//! manager and the split propagator call in here and write the results.
//!
//! Derivation order:
//!
//! ```text
//! gross (payment share of fee)
//!   -> referral fee  = gross * referral_fee_percent
//!   -> AGCI          = gross - referral fee
//!   -> house         = AGCI * house_percent
//!   -> category pools (origination / site / deal) = AGCI * category percent
//! ```
//!
//! Every conversion rounds half-up to the cent.

use crate::calc::money::apply_bps;
use crate::models::deal::DealInputs;

/// Dollar components derived from one payment's gross amount.
///
/// All values are i64 cents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaymentComponents {
    /// The payment's gross commission income
    pub gross: i64,

    /// Referral fee taken off the top
    pub referral_fee: i64,

    /// Adjusted gross commission income (gross minus referral fee)
    pub agci: i64,

    /// House share of AGCI
    pub house: i64,

    /// Origination pool (AGCI * origination_percent)
    pub origination_pool: i64,

    /// Site pool (AGCI * site_percent)
    pub site_pool: i64,

    /// Deal pool (AGCI * deal_percent)
    pub deal_pool: i64,
}

/// Derive the dollar components of a payment from its gross amount.
///
/// `inputs` must already be validated; this function only does arithmetic.
///
/// # Example
/// ```
/// use commission_engine_core_rs::calc::derive_components;
/// use commission_engine_core_rs::models::DealInputs;
///
/// let mut inputs = DealInputs::new(3_000_000, 3);
/// inputs.referral_fee_bps = 500; // 5%
///
/// let components = derive_components(1_000_000, &inputs);
/// assert_eq!(components.referral_fee, 50_000);
/// assert_eq!(components.agci, 950_000);
/// ```
pub fn derive_components(gross: i64, inputs: &DealInputs) -> PaymentComponents {
    let referral_fee = apply_bps(gross, inputs.referral_fee_bps);
    let agci = gross - referral_fee;
    PaymentComponents {
        gross,
        referral_fee,
        agci,
        house: apply_bps(agci, inputs.house_bps),
        origination_pool: apply_bps(agci, inputs.origination_bps),
        site_pool: apply_bps(agci, inputs.site_bps),
        deal_pool: apply_bps(agci, inputs.deal_bps),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs_with(referral: i64, house: i64, origination: i64, site: i64, deal: i64) -> DealInputs {
        DealInputs {
            fee: 3_000_000,
            number_of_payments: 3,
            referral_fee_bps: referral,
            house_bps: house,
            origination_bps: origination,
            site_bps: site,
            deal_bps: deal,
        }
    }

    #[test]
    fn test_no_referral_agci_equals_gross() {
        let inputs = inputs_with(0, 0, 5_000, 0, 5_000);
        let c = derive_components(1_050_050, &inputs);
        assert_eq!(c.referral_fee, 0);
        assert_eq!(c.agci, 1_050_050);
        assert_eq!(c.deal_pool, 525_025);
    }

    #[test]
    fn test_referral_comes_off_the_top() {
        let inputs = inputs_with(1_000, 0, 0, 0, 10_000);
        let c = derive_components(1_000_000, &inputs);
        assert_eq!(c.referral_fee, 100_000);
        assert_eq!(c.agci, 900_000);
        // Pools size off AGCI, not gross
        assert_eq!(c.deal_pool, 900_000);
    }

    #[test]
    fn test_rounding_half_up_on_each_conversion() {
        // 3.33% referral on $1.00 = 3.33 cents -> 3
        let inputs = inputs_with(333, 0, 0, 0, 0);
        let c = derive_components(100, &inputs);
        assert_eq!(c.referral_fee, 3);
        assert_eq!(c.agci, 97);

        // 5% referral on $0.10 = 0.5 cents -> 1
        let inputs = inputs_with(500, 0, 0, 0, 0);
        let c = derive_components(10, &inputs);
        assert_eq!(c.referral_fee, 1);
        assert_eq!(c.agci, 9);
    }

    #[test]
    fn test_house_is_informational_share_of_agci() {
        let inputs = inputs_with(0, 1_000, 5_000, 0, 5_000);
        let c = derive_components(1_000_000, &inputs);
        assert_eq!(c.house, 100_000);
        // House does not shrink the category pools
        assert_eq!(c.origination_pool + c.deal_pool, 1_000_000);
    }

    #[test]
    fn test_zero_gross() {
        let inputs = inputs_with(500, 1_000, 5_000, 2_000, 3_000);
        let c = derive_components(0, &inputs);
        assert_eq!(c.referral_fee, 0);
        assert_eq!(c.agci, 0);
        assert_eq!(c.origination_pool, 0);
    }
}
