use approx::assert_abs_diff_eq;
use ethena_engine::engine::delta_neutral::{
    aggregate_positions, calculate_counterparty_risk, calculate_delta, calculate_funding_payment,
    calculate_hedge_ratio, calculate_liquidation_price, calculate_optimal_allocation,
    calculate_rebalance_amount, estimate_slippage, is_delta_neutral, needs_rebalance,
    DEFAULT_BASE_SLIPPAGE, DEFAULT_DELTA_TOLERANCE, DEFAULT_MAINTENANCE_MARGIN,
};
use ethena_engine::engine::{ExchangeCapacity, ExchangeExposure, RebalanceAction};
use ethena_engine::{EngineConfig, EngineError, Position, Side};

fn position(side: Side, size: f64, entry: f64, current: f64) -> Position {
    Position {
        size,
        side,
        entry_price: entry,
        current_price: current,
        leverage: 1.0,
    }
}

fn exposure(exchange: &str, size: f64) -> ExchangeExposure {
    ExchangeExposure {
        exchange: exchange.to_string(),
        size,
    }
}

#[test]
fn test_hedged_book_end_to_end() {
    let positions = vec![
        position(Side::Long, 2.0, 3000.0, 3100.0),
        position(Side::Short, 2.0, 3000.0, 3100.0),
    ];
    let summary = aggregate_positions(&positions);
    assert_eq!(summary.total_long, 6200.0);
    assert_eq!(summary.total_short, 6200.0);
    assert_eq!(summary.net_position, 0.0);
    assert_eq!(summary.weighted_entry_price, 3000.0);
    assert_eq!(summary.aggregate_pnl, 0.0);

    let spot: f64 = positions[0].exposure_value();
    let perp: f64 = positions[1].exposure_value();
    let delta = calculate_delta(spot, perp);
    assert_eq!(delta, 0.0);
    assert!(is_delta_neutral(delta, DEFAULT_DELTA_TOLERANCE));
    assert_eq!(calculate_hedge_ratio(perp, spot), 1.0);
    assert_eq!(
        calculate_rebalance_amount(spot, perp, 0.0).action,
        RebalanceAction::None
    );
}

#[test]
fn test_under_hedged_book_needs_more_short() {
    let plan = calculate_rebalance_amount(1000.0, -500.0, 0.0);
    assert_eq!(plan.action, RebalanceAction::IncreaseShort);
    assert_eq!(plan.amount, 500.0);
    assert_eq!(plan.target_perp_value, -1000.0);

    let policy = EngineConfig::default().rebalance_policy();
    let check = needs_rebalance(plan.current_delta, Some(60), &policy);
    assert!(check.needed);
}

#[test]
fn test_nonzero_target_delta() {
    // Keep 10% net long: perp should sit at -900.
    let plan = calculate_rebalance_amount(1000.0, -1000.0, 0.1);
    assert_abs_diff_eq!(plan.target_perp_value, -900.0, epsilon = 1e-9);
    assert_eq!(plan.action, RebalanceAction::DecreaseShort);
    assert_abs_diff_eq!(plan.amount, 100.0, epsilon = 1e-9);
}

#[test]
fn test_zero_spot_is_degenerate_not_error() {
    assert_eq!(calculate_delta(0.0, -1000.0), 0.0);
    assert_eq!(calculate_hedge_ratio(1000.0, 0.0), 0.0);
    assert_eq!(estimate_slippage(1000.0, 0.0, DEFAULT_BASE_SLIPPAGE), 1.0);
}

#[test]
fn test_liquidation_closer_with_leverage() {
    let entry = 2500.0;
    let liq = |leverage: f64, side: Side| {
        calculate_liquidation_price(entry, leverage, side, DEFAULT_MAINTENANCE_MARGIN).unwrap()
    };

    let (low, high) = (liq(2.0, Side::Long), liq(20.0, Side::Long));
    assert!((entry - high).abs() < (entry - low).abs());

    let (low, high) = (liq(2.0, Side::Short), liq(20.0, Side::Short));
    assert!(high > entry && low > high);
}

#[test]
fn test_liquidation_rejects_bad_leverage() {
    for leverage in [0.0, -3.0, f64::NAN, f64::INFINITY] {
        match calculate_liquidation_price(100.0, leverage, Side::Long, 0.005) {
            Err(EngineError::InvalidArgument(_)) => {}
            other => panic!("Expected InvalidArgument for {}, got {:?}", leverage, other),
        }
    }
}

#[test]
fn test_counterparty_concentration_bounds() {
    let single = calculate_counterparty_risk(&[exposure("binance", -1000.0)]);
    assert_eq!(single.concentration, 1.0);
    assert_eq!(single.exposures[0].percentage, 100.0);

    let even = calculate_counterparty_risk(&[
        exposure("binance", -250.0),
        exposure("bybit", -250.0),
        exposure("okx", 250.0),
        exposure("deribit", -250.0),
    ]);
    assert_abs_diff_eq!(even.concentration, 0.25, epsilon = 1e-12);
    // Equal shares: the alphabetically first venue is reported.
    assert_eq!(even.largest_exposure.as_deref(), Some("binance"));
}

#[test]
fn test_allocation_is_single_pass_greedy() {
    let exchanges = vec![
        ExchangeCapacity {
            exchange: "binance".into(),
            liquidity: 600.0,
            max_position: 10_000.0,
        },
        ExchangeCapacity {
            exchange: "bybit".into(),
            liquidity: 300.0,
            max_position: 50.0,
        },
        ExchangeCapacity {
            exchange: "okx".into(),
            liquidity: 100.0,
            max_position: 10_000.0,
        },
    ];
    let allocations = calculate_optimal_allocation(1000.0, &exchanges);
    let amounts: Vec<f64> = allocations.iter().map(|a| a.amount).collect();
    assert_eq!(amounts, vec![600.0, 50.0, 100.0]);
    let total: f64 = amounts.iter().sum();
    assert!(total < 1000.0);
}

#[test]
fn test_allocation_respects_remaining() {
    let exchanges = vec![
        ExchangeCapacity {
            exchange: "a".into(),
            liquidity: 1.0,
            max_position: 1_000.0,
        },
        ExchangeCapacity {
            exchange: "b".into(),
            liquidity: 1.0,
            max_position: 1_000.0,
        },
    ];
    let allocations = calculate_optimal_allocation(100.0, &exchanges);
    assert_eq!(allocations[0].amount, 50.0);
    assert_eq!(allocations[1].amount, 50.0);
}

#[test]
fn test_rebalance_time_trigger() {
    let policy = EngineConfig::default().rebalance_policy();
    assert!(!needs_rebalance(0.0, None, &policy).needed);
    assert!(!needs_rebalance(0.0, Some(86_400), &policy).needed);
    assert!(needs_rebalance(0.0, Some(86_401), &policy).needed);
}

#[test]
fn test_funding_flows_by_side() {
    assert_eq!(calculate_funding_payment(10_000.0, 0.0001, Side::Short), 1.0);
    assert_eq!(calculate_funding_payment(10_000.0, -0.0001, Side::Short), -1.0);
    assert_eq!(calculate_funding_payment(10_000.0, 0.0001, Side::Long), -1.0);
}

#[test]
fn test_aggregate_pnl_and_weighted_entry() {
    let positions = vec![
        position(Side::Long, 1.0, 100.0, 120.0),
        position(Side::Long, 3.0, 200.0, 120.0),
        position(Side::Short, 2.0, 150.0, 120.0),
    ];
    let summary = aggregate_positions(&positions);
    assert_eq!(summary.total_long, 480.0);
    assert_eq!(summary.total_short, 240.0);
    assert_eq!(summary.net_position, 240.0);
    // (100*1 + 200*3 + 150*2) / 6
    assert_abs_diff_eq!(summary.weighted_entry_price, 1000.0 / 6.0, epsilon = 1e-9);
    // 20 - 240 + 60
    assert_eq!(summary.aggregate_pnl, -160.0);

    let empty = aggregate_positions(&[]);
    assert_eq!(empty.weighted_entry_price, 0.0);
}

#[test]
fn test_rebalance_plan_json() {
    let plan = calculate_rebalance_amount(1000.0, -500.0, 0.0);
    let json = serde_json::to_value(&plan).unwrap();
    assert_eq!(json["action"], "increase_short");
    assert_eq!(json["amount"], 500.0);
    assert!(json.get("targetPerpValue").is_some());
}
