//! Integration tests for the opportunity model.

use std::collections::HashMap;

use curopt::domain::error::DomainError;
use curopt::domain::{
    build_opportunities, build_user_opportunities, Deployment, DeploymentId, CURATOR_SHARE,
    EARNINGS_PER_100K_QUERIES, WEEKS_PER_YEAR,
};

const WEI: u128 = 1_000_000_000_000_000_000;

fn deployment(id: &str, signal_grt: u64, signalled_grt: u64) -> Deployment {
    Deployment {
        id: DeploymentId::from(id),
        signal_amount_wei: signal_grt as u128 * WEI,
        signalled_tokens_wei: signalled_grt as u128 * WEI,
    }
}

fn usage(entries: &[(&str, u64)]) -> HashMap<DeploymentId, u64> {
    entries
        .iter()
        .map(|(id, count)| (DeploymentId::from(*id), *count))
        .collect()
}

#[test]
fn derives_metrics_from_weekly_usage() {
    let deployments = vec![deployment("QmA", 1000, 10_000)];
    let weekly = usage(&[("QmA", 19_230)]);

    let opps = build_opportunities(&deployments, &weekly, 0.1).unwrap();
    let opp = &opps[0];

    let annual = 19_230 * WEEKS_PER_YEAR;
    assert_eq!(opp.annual_queries(), annual);
    assert_eq!(opp.weekly_queries(), 19_230);

    let gross = annual as f64 / 100_000.0 * EARNINGS_PER_100K_QUERIES;
    assert!((opp.total_earnings() - gross).abs() < 1e-9);
    assert!((opp.curator_share() - gross * CURATOR_SHARE).abs() < 1e-9);

    // portion owned = 0.1, apr = earnings / (1000 * 0.1) * 100
    let earnings = gross * CURATOR_SHARE * 0.1;
    assert!((opp.estimated_earnings() - earnings).abs() < 1e-9);
    assert!((opp.apr() - earnings / 100.0 * 100.0).abs() < 1e-9);
}

#[test]
fn build_is_idempotent() {
    let deployments = vec![
        deployment("QmA", 1000, 10_000),
        deployment("QmB", 2000, 20_000),
        deployment("QmC", 500, 5000),
    ];
    let weekly = usage(&[("QmA", 19_230), ("QmB", 38_460), ("QmC", 9615)]);

    let first = build_opportunities(&deployments, &weekly, 0.1).unwrap();
    let second = build_opportunities(&deployments, &weekly, 0.1).unwrap();

    assert_eq!(first.len(), second.len());
    for (a, b) in first.iter().zip(second.iter()) {
        assert_eq!(a.id(), b.id());
        assert_eq!(a.apr().to_bits(), b.apr().to_bits());
        assert_eq!(
            a.estimated_earnings().to_bits(),
            b.estimated_earnings().to_bits()
        );
        assert_eq!(a.signal_amount().to_bits(), b.signal_amount().to_bits());
    }
}

#[test]
fn zero_signal_deployments_are_filtered() {
    let deployments = vec![deployment("QmZero", 0, 5000), deployment("QmLive", 100, 5000)];
    let weekly = usage(&[("QmZero", 1000), ("QmLive", 1000)]);

    let opps = build_opportunities(&deployments, &weekly, 0.1).unwrap();
    assert_eq!(opps.len(), 1);
    assert_eq!(opps[0].id().as_str(), "QmLive");
}

#[test]
fn deployments_without_usage_are_excluded() {
    let deployments = vec![deployment("QmSeen", 1000, 10_000), deployment("QmDark", 1000, 10_000)];
    let weekly = usage(&[("QmSeen", 5000)]);

    let opps = build_opportunities(&deployments, &weekly, 0.1).unwrap();
    assert_eq!(opps.len(), 1);
    assert_eq!(opps[0].id().as_str(), "QmSeen");
}

#[test]
fn ordering_is_descending_with_stable_ties() {
    // QmA and QmB have identical APR; QmHot beats both. Ties keep input order.
    let deployments = vec![
        deployment("QmA", 1000, 10_000),
        deployment("QmB", 2000, 20_000),
        deployment("QmHot", 1000, 10_000),
    ];
    let weekly = usage(&[("QmA", 10_000), ("QmB", 20_000), ("QmHot", 50_000)]);

    let opps = build_opportunities(&deployments, &weekly, 0.1).unwrap();
    let ids: Vec<&str> = opps.iter().map(|o| o.id().as_str()).collect();
    assert_eq!(ids, vec!["QmHot", "QmA", "QmB"]);
}

#[test]
fn non_positive_price_fails_before_any_computation() {
    let deployments = vec![deployment("QmA", 1000, 10_000)];
    let weekly = usage(&[("QmA", 1000)]);

    assert!(matches!(
        build_opportunities(&deployments, &weekly, 0.0),
        Err(DomainError::NonPositivePrice { .. })
    ));
    assert!(matches!(
        build_opportunities(&deployments, &weekly, -0.5),
        Err(DomainError::NonPositivePrice { .. })
    ));
}

#[test]
fn user_view_reports_held_positions_only() {
    let deployments = vec![
        deployment("QmA", 1000, 10_000),
        deployment("QmB", 2000, 20_000),
    ];
    let weekly = usage(&[("QmA", 19_230), ("QmB", 38_460)]);
    let opps = build_opportunities(&deployments, &weekly, 0.1).unwrap();

    let signals = HashMap::from([(DeploymentId::from("QmB"), 500.0)]);
    let positions = build_user_opportunities(&signals, &opps, 0.1).unwrap();

    assert_eq!(positions.len(), 1);
    let position = &positions[0];
    assert_eq!(position.id().as_str(), "QmB");
    assert!((position.portion_owned() - 500.0 / 20_000.0).abs() < 1e-12);
    // earnings = curator pool * portion; apr over the user's own stake
    let pool = 38_460.0 * 52.0 / 100_000.0 * 4.0 * 0.1;
    let earnings = pool * (500.0 / 20_000.0);
    assert!((position.estimated_earnings() - earnings).abs() < 1e-9);
    assert!((position.apr() - earnings / (500.0 * 0.1) * 100.0).abs() < 1e-9);
}
