//! Commission split templates
//!
//! Per-broker percentage allocations of a deal's commission, independent of
//! any specific payment. Templates are edited by users; the engine reads
//! them at propagation time and snapshots the percentages onto each split
//! row.
//!
//! # Critical Invariant
//!
//! For a given deal, the sum of each percentage column across all brokers
//! must not exceed 100%. The invariant is enforced on every write; a write
//! that would break it is rejected and the stored set is left unchanged.

use crate::models::deal::FULL_PERCENT_BPS;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors for template writes
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemplateError {
    #[error("{field} must be between 0% and 100%, got {bps} bps")]
    PercentOutOfRange { field: &'static str, bps: i64 },

    #[error("{category} splits would total {total_bps} bps across brokers, exceeding 100%")]
    CategoryOverAllocated {
        category: &'static str,
        total_bps: i64,
    },

    #[error("no template row for broker {broker_id}")]
    UnknownBroker { broker_id: String },
}

/// One broker's percentage allocation for a deal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommissionTemplate {
    /// Broker this row belongs to
    pub broker_id: String,

    /// Share of the origination pool (bps)
    pub origination_bps: i64,

    /// Share of the site pool (bps)
    pub site_bps: i64,

    /// Share of the deal pool (bps)
    pub deal_bps: i64,
}

impl CommissionTemplate {
    /// Validate the three percentage fields individually
    pub fn validate(&self) -> Result<(), TemplateError> {
        for (field, bps) in [
            ("split_origination_percent", self.origination_bps),
            ("split_site_percent", self.site_bps),
            ("split_deal_percent", self.deal_bps),
        ] {
            if !(0..=FULL_PERCENT_BPS).contains(&bps) {
                return Err(TemplateError::PercentOutOfRange { field, bps });
            }
        }
        Ok(())
    }
}

/// All template rows of one deal
///
/// # Example
/// ```
/// use commission_engine_core_rs::models::{CommissionTemplate, TemplateSet};
///
/// let mut templates = TemplateSet::new();
/// templates
///     .upsert(CommissionTemplate {
///         broker_id: "broker-1".to_string(),
///         origination_bps: 6_000,
///         site_bps: 0,
///         deal_bps: 5_000,
///     })
///     .unwrap();
/// assert_eq!(templates.len(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateSet {
    rows: Vec<CommissionTemplate>,
}

impl TemplateSet {
    /// Create an empty template set
    pub fn new() -> Self {
        Self { rows: Vec::new() }
    }

    /// Insert or replace the row for a broker
    ///
    /// Rejected with `CategoryOverAllocated` when the resulting set would
    /// push any category over 100%; the stored rows are unchanged in that
    /// case.
    pub fn upsert(&mut self, row: CommissionTemplate) -> Result<(), TemplateError> {
        row.validate()?;

        let mut candidate = self.rows.clone();
        match candidate.iter_mut().find(|r| r.broker_id == row.broker_id) {
            Some(existing) => *existing = row,
            None => candidate.push(row),
        }
        Self::check_category_totals(&candidate)?;

        self.rows = candidate;
        Ok(())
    }

    /// Remove a broker's row
    pub fn remove(&mut self, broker_id: &str) -> Result<CommissionTemplate, TemplateError> {
        match self.rows.iter().position(|r| r.broker_id == broker_id) {
            Some(idx) => Ok(self.rows.remove(idx)),
            None => Err(TemplateError::UnknownBroker {
                broker_id: broker_id.to_string(),
            }),
        }
    }

    /// Get a broker's row
    pub fn get(&self, broker_id: &str) -> Option<&CommissionTemplate> {
        self.rows.iter().find(|r| r.broker_id == broker_id)
    }

    /// All rows, in insertion order
    pub fn rows(&self) -> &[CommissionTemplate] {
        &self.rows
    }

    /// Number of broker rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if the set has no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Sum of origination percentages across brokers (bps)
    pub fn origination_total_bps(&self) -> i64 {
        self.rows.iter().map(|r| r.origination_bps).sum()
    }

    /// Sum of site percentages across brokers (bps)
    pub fn site_total_bps(&self) -> i64 {
        self.rows.iter().map(|r| r.site_bps).sum()
    }

    /// Sum of deal percentages across brokers (bps)
    pub fn deal_total_bps(&self) -> i64 {
        self.rows.iter().map(|r| r.deal_bps).sum()
    }

    /// Check if every category is allocated to exactly 100%
    ///
    /// Split reconciliation against AGCI only applies to fully allocated
    /// sets; partially allocated sets legitimately sum to less.
    pub fn is_fully_allocated(&self) -> bool {
        self.origination_total_bps() == FULL_PERCENT_BPS
            && self.site_total_bps() == FULL_PERCENT_BPS
            && self.deal_total_bps() == FULL_PERCENT_BPS
    }

    /// Verify the per-category ceiling over a row set
    pub(crate) fn check_category_totals(rows: &[CommissionTemplate]) -> Result<(), TemplateError> {
        for (category, total_bps) in [
            (
                "origination",
                rows.iter().map(|r| r.origination_bps).sum::<i64>(),
            ),
            ("site", rows.iter().map(|r| r.site_bps).sum::<i64>()),
            ("deal", rows.iter().map(|r| r.deal_bps).sum::<i64>()),
        ] {
            if total_bps > FULL_PERCENT_BPS {
                return Err(TemplateError::CategoryOverAllocated {
                    category,
                    total_bps,
                });
            }
        }
        Ok(())
    }

    /// Re-run the per-category ceiling against the stored rows
    ///
    /// Always passes for sets built through `upsert`; the propagator calls
    /// this before deriving splits so a set restored from a bad snapshot is
    /// surfaced instead of silently clamped.
    pub fn verify(&self) -> Result<(), TemplateError> {
        Self::check_category_totals(&self.rows)
    }
}
