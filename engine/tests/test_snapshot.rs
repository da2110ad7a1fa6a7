//! Snapshot and restore tests
//!
//! The host persists deal state (e.g. to Postgres) and loads it back on
//! startup. Restoration must preserve every stored value bit-for-bit:
//! amounts, override pins, audit stamps, lifecycle, splits.

use chrono::Utc;
use commission_engine_core_rs::engine::CommissionEngine;
use commission_engine_core_rs::models::{
    AmountSource, DealInputs, DealState, Lifecycle, Payment,
};
use commission_engine_core_rs::UpstreamEvent;

fn inputs_all_deal(fee: i64, n: u32) -> DealInputs {
    let mut inputs = DealInputs::new(fee, n);
    inputs.deal_bps = 10_000;
    inputs
}

fn populated_engine() -> CommissionEngine {
    let mut engine = CommissionEngine::new();
    engine
        .register_deal("deal-1", inputs_all_deal(3_000_000, 3))
        .unwrap();
    engine
        .apply(UpstreamEvent::TemplateUpsert {
            deal_id: "deal-1".to_string(),
            broker_id: "b1".to_string(),
            origination_bps: 0,
            site_bps: 0,
            deal_bps: 5_000,
        })
        .unwrap();

    let pid = engine.active_payments("deal-1").unwrap()[1].payment_id.clone();
    engine
        .apply(UpstreamEvent::SetOverride {
            payment_id: pid,
            amount: 1_050_050,
            actor: "user-7".to_string(),
            at: Utc::now(),
        })
        .unwrap();
    // Archive the third payment so the snapshot carries a mixed lifecycle
    engine
        .apply(UpstreamEvent::DealChange {
            deal_id: "deal-1".to_string(),
            fee: None,
            number_of_payments: Some(2),
            referral_fee_bps: None,
            house_bps: None,
            origination_bps: None,
            site_bps: None,
            deal_bps: None,
        })
        .unwrap();
    engine
}

#[test]
fn test_deal_state_json_roundtrip() {
    let engine = populated_engine();
    let deal = engine.deal("deal-1").unwrap();

    let json = serde_json::to_string(deal).unwrap();
    let restored: DealState = serde_json::from_str(&json).unwrap();

    assert_eq!(&restored, deal);
}

#[test]
fn test_engine_restored_from_snapshot_serves_identical_views() {
    let engine = populated_engine();

    let deals: Vec<DealState> = engine.deals().cloned().collect();
    let restored = CommissionEngine::from_snapshot(deals);

    assert_eq!(
        restored.active_payments("deal-1").unwrap(),
        engine.active_payments("deal-1").unwrap()
    );

    let pid = engine.active_payments("deal-1").unwrap()[1].payment_id.clone();
    assert_eq!(
        restored.splits_for_payment(&pid).unwrap(),
        engine.splits_for_payment(&pid).unwrap()
    );
}

#[test]
fn test_restored_engine_keeps_recalculating() {
    let engine = populated_engine();
    let deals: Vec<DealState> = engine.deals().cloned().collect();
    let mut restored = CommissionEngine::from_snapshot(deals);

    restored
        .apply(UpstreamEvent::DealChange {
            deal_id: "deal-1".to_string(),
            fee: Some(3_500_000),
            number_of_payments: None,
            referral_fee_bps: None,
            house_bps: None,
            origination_bps: None,
            site_bps: None,
            deal_bps: None,
        })
        .unwrap();

    let payments = restored.active_payments("deal-1").unwrap();
    // The pin restored from the snapshot still protects payment #2
    let pinned = payments.iter().find(|p| p.is_overridden).unwrap();
    assert_eq!(pinned.payment_amount, 1_050_050);
    assert_eq!(
        payments.iter().map(|p| p.payment_amount).sum::<i64>(),
        3_500_000
    );
}

#[test]
fn test_payment_from_snapshot_preserves_fields() {
    let at = Utc::now();
    let payment = Payment::from_snapshot(
        "pmt-42".to_string(),
        "deal-1".to_string(),
        2,
        1_050_050,
        1_050_050,
        AmountSource::Overridden {
            actor: "user-7".to_string(),
            at,
        },
        Lifecycle::Archived,
    );

    assert_eq!(payment.id(), "pmt-42");
    assert_eq!(payment.sequence(), 2);
    assert_eq!(payment.amount(), 1_050_050);
    assert!(payment.is_overridden());
    assert_eq!(payment.overridden_at(), Some(at));
    assert!(payment.is_archived());
}

#[test]
fn test_payment_json_preserves_override_stamp() {
    let mut payment = Payment::new("deal-1".to_string(), 1, 1_000_000, 1_000_000);
    payment.pin(
        1_050_050,
        1_050_050,
        "user-7".to_string(),
        "2024-03-01T12:00:00Z".parse().unwrap(),
    );

    let json = serde_json::to_string(&payment).unwrap();
    let restored: Payment = serde_json::from_str(&json).unwrap();

    assert_eq!(restored, payment);
    assert_eq!(restored.overridden_by(), Some("user-7"));
}
