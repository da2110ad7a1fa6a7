//! Split propagation tests
//!
//! Splits always derive from the payment's *stored* amount, so an override
//! is honored by the split rows, and the template percentages are a
//! snapshot taken at propagation time.

use chrono::Utc;
use commission_engine_core_rs::engine::CommissionEngine;
use commission_engine_core_rs::models::DealInputs;
use commission_engine_core_rs::UpstreamEvent;

fn inputs_all_deal(fee: i64, n: u32) -> DealInputs {
    let mut inputs = DealInputs::new(fee, n);
    inputs.deal_bps = 10_000; // the whole AGCI flows through the deal pool
    inputs
}

fn template_upsert(deal_id: &str, broker_id: &str, origination: i64, site: i64, deal: i64) -> UpstreamEvent {
    UpstreamEvent::TemplateUpsert {
        deal_id: deal_id.to_string(),
        broker_id: broker_id.to_string(),
        origination_bps: origination,
        site_bps: site,
        deal_bps: deal,
    }
}

#[test]
fn test_splits_reflect_override_not_derived_amount() {
    // Broker with 50% of the deal pool; payment pinned to $10,500.50 with
    // no referral fee, so AGCI is $10,500.50 and the split is $5,250.25,
    // not the pre-override $5,000.00
    let mut engine = CommissionEngine::new();
    engine
        .register_deal("deal-1", inputs_all_deal(3_000_000, 3))
        .unwrap();
    engine
        .apply(template_upsert("deal-1", "broker-b", 0, 0, 5_000))
        .unwrap();

    let pid = engine.active_payments("deal-1").unwrap()[1].payment_id.clone();
    engine
        .apply(UpstreamEvent::SetOverride {
            payment_id: pid.clone(),
            amount: 1_050_050,
            actor: "user-7".to_string(),
            at: Utc::now(),
        })
        .unwrap();

    let splits = engine.splits_for_payment(&pid).unwrap();
    assert_eq!(splits.len(), 1);
    assert_eq!(splits[0].broker_id, "broker-b");
    assert_eq!(splits[0].amount, 525_025);
}

#[test]
fn test_propagation_on_fee_change_only_rewrites_moved_payments() {
    let mut engine = CommissionEngine::new();
    engine
        .register_deal("deal-1", inputs_all_deal(3_000_000, 3))
        .unwrap();
    engine
        .apply(template_upsert("deal-1", "broker-b", 0, 0, 5_000))
        .unwrap();

    let pid = engine.active_payments("deal-1").unwrap()[1].payment_id.clone();
    engine
        .apply(UpstreamEvent::SetOverride {
            payment_id: pid.clone(),
            amount: 1_050_050,
            actor: "user-7".to_string(),
            at: Utc::now(),
        })
        .unwrap();

    let events = engine
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

    // Two unpinned payments moved and re-propagated; the pinned one did not
    let propagated: Vec<_> = events
        .iter()
        .filter(|e| e.event_type() == "SplitsPropagated")
        .collect();
    assert_eq!(propagated.len(), 2);
    assert!(propagated.iter().all(|e| e.payment_id() != Some(pid.as_str())));

    // The pinned payment's split still reflects its override
    let splits = engine.splits_for_payment(&pid).unwrap();
    assert_eq!(splits[0].amount, 525_025);
}

#[test]
fn test_split_rows_snapshot_template_percentages() {
    let mut engine = CommissionEngine::new();
    engine
        .register_deal("deal-1", inputs_all_deal(3_000_000, 1))
        .unwrap();
    engine
        .apply(template_upsert("deal-1", "broker-b", 0, 0, 4_000))
        .unwrap();

    let pid = engine.active_payments("deal-1").unwrap()[0].payment_id.clone();
    let deal = engine.deal("deal-1").unwrap();
    let rows = deal.splits_for(&pid);
    assert_eq!(rows[0].deal_bps, 4_000);
    assert_eq!(rows[0].amount, 1_200_000); // 40% of $30,000
}

#[test]
fn test_pool_percentage_change_reshapes_pinned_splits() {
    // Overrides protect the amount, not the split breakdown: moving the
    // deal-level pool percentages rewrites every active payment's splits
    let mut engine = CommissionEngine::new();
    let mut inputs = DealInputs::new(3_000_000, 1);
    inputs.origination_bps = 5_000;
    inputs.deal_bps = 5_000;
    engine.register_deal("deal-1", inputs).unwrap();
    engine
        .apply(template_upsert("deal-1", "broker-b", 10_000, 0, 10_000))
        .unwrap();

    let pid = engine.active_payments("deal-1").unwrap()[0].payment_id.clone();
    engine
        .apply(UpstreamEvent::SetOverride {
            payment_id: pid.clone(),
            amount: 1_000_000,
            actor: "user-7".to_string(),
            at: Utc::now(),
        })
        .unwrap();
    assert_eq!(engine.splits_for_payment(&pid).unwrap()[0].amount, 1_000_000);

    engine
        .apply(UpstreamEvent::DealChange {
            deal_id: "deal-1".to_string(),
            fee: None,
            number_of_payments: None,
            referral_fee_bps: None,
            house_bps: None,
            origination_bps: Some(2_000),
            site_bps: None,
            deal_bps: Some(5_000),
        })
        .unwrap();

    // Amount pinned at $10,000.00; broker takes 100% of both pools, now
    // 20% + 50% of AGCI
    let payments = engine.active_payments("deal-1").unwrap();
    assert_eq!(payments[0].payment_amount, 1_000_000);
    assert_eq!(engine.splits_for_payment(&pid).unwrap()[0].amount, 700_000);
}

#[test]
fn test_multi_broker_allocation_sums_exactly() {
    let mut engine = CommissionEngine::new();
    let mut inputs = DealInputs::new(1_000_001, 1); // odd cent on purpose
    inputs.origination_bps = 3_300;
    inputs.site_bps = 3_300;
    inputs.deal_bps = 3_400;
    engine.register_deal("deal-1", inputs).unwrap();

    engine
        .apply(template_upsert("deal-1", "b1", 3_333, 5_000, 2_500))
        .unwrap();
    engine
        .apply(template_upsert("deal-1", "b2", 3_333, 2_500, 2_500))
        .unwrap();
    engine
        .apply(template_upsert("deal-1", "b3", 3_334, 2_500, 5_000))
        .unwrap();

    let pid = engine.active_payments("deal-1").unwrap()[0].payment_id.clone();
    let payment = &engine.active_payments("deal-1").unwrap()[0];
    let splits = engine.splits_for_payment(&pid).unwrap();

    let total: i64 = splits.iter().map(|s| s.amount).sum();
    assert!((total - payment.agci).abs() <= 1, "splits must reconcile to AGCI");
}

#[test]
fn test_no_templates_means_no_split_rows() {
    let mut engine = CommissionEngine::new();
    engine
        .register_deal("deal-1", inputs_all_deal(3_000_000, 2))
        .unwrap();

    let pid = engine.active_payments("deal-1").unwrap()[0].payment_id.clone();
    assert!(engine.splits_for_payment(&pid).unwrap().is_empty());
}
