//! End-to-end engine tests: crossing → ledger → orchestrator.

use chrono::{NaiveDate, NaiveDateTime};
use tradelab_core::domain::{Candle, Fill};
use tradelab_core::engine::{
    DrawdownMode, NoCommission, OrderBatch, Position, Tester, TradeLedger,
};
use tradelab_core::series::CandleSeries;

fn ts(h: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, 1)
        .unwrap()
        .and_hms_opt(h, 0, 0)
        .unwrap()
}

fn candle(h: u32, open: f64, high: f64, low: f64, close: f64) -> Candle {
    Candle {
        timestamp: ts(h),
        open,
        high,
        low,
        close,
        volume: 1000.0,
    }
}

fn order(h: u32, security: &str, volume: f64, price: f64, commission: f64) -> Fill {
    Fill {
        time: ts(h),
        security: security.into(),
        volume,
        price,
        commission,
        comment: String::new(),
    }
}

// ── Gap fill semantics ───────────────────────────────────────────────

#[test]
fn stop_gapped_through_fills_at_open_not_trigger() {
    let mut pos = Position::new("SBER", 105.0, 0.01, Box::new(NoCommission));
    let mut ledger = TradeLedger::new();
    ledger
        .apply_fill(&order(9, "SBER", 10.0, 105.0, 0.0))
        .unwrap();
    pos.submit_stop(-10.0, 100.0, "stop loss").unwrap();

    let fills = pos
        .on_candle(&candle(10, 90.0, 92.0, 88.0, 91.0), &mut ledger)
        .unwrap();
    assert_eq!(fills.len(), 1);
    assert_eq!(fills[0].price, 90.0);
    // Realized through the gap: (90 - 105) * 10.
    assert!((ledger.done_profit() - (-150.0)).abs() < 1e-9);
}

#[test]
fn same_stop_swept_intrabar_fills_at_trigger() {
    let mut pos = Position::new("SBER", 105.0, 0.01, Box::new(NoCommission));
    let mut ledger = TradeLedger::new();
    ledger
        .apply_fill(&order(9, "SBER", 10.0, 105.0, 0.0))
        .unwrap();
    pos.submit_stop(-10.0, 100.0, "stop loss").unwrap();

    let fills = pos
        .on_candle(&candle(10, 105.0, 106.0, 98.0, 99.0), &mut ledger)
        .unwrap();
    assert_eq!(fills.len(), 1);
    assert_eq!(fills[0].price, 100.0);
    assert!((ledger.done_profit() - (-50.0)).abs() < 1e-9);
}

// ── Idempotent mark-to-market ────────────────────────────────────────

#[test]
fn candles_without_orders_never_change_trade_count() {
    let mut pos = Position::new("SBER", 100.0, 0.01, Box::new(NoCommission));
    let mut ledger = TradeLedger::new();
    ledger
        .apply_fill(&order(9, "SBER", 5.0, 100.0, 0.0))
        .unwrap();

    for h in 10..15 {
        let c = candle(h, 100.0, 102.0, 98.0, 101.0);
        let fills = pos.on_candle(&c, &mut ledger).unwrap();
        assert!(fills.is_empty());
        assert_eq!(ledger.active_trades().count(), 1);
        assert_eq!(ledger.done_trades().len(), 0);
    }
    let trade = ledger.active_trade("SBER").unwrap();
    assert_eq!(trade.bars_held, 5);
    assert_eq!(trade.last_price, 101.0);
}

// ── Direction flip ───────────────────────────────────────────────────

#[test]
fn flip_realizes_prorated_commission() {
    let mut ledger = TradeLedger::new();
    ledger
        .apply_fill(&order(10, "SBER", 10.0, 50.0, 0.0))
        .unwrap();
    ledger
        .apply_fill(&order(11, "SBER", -15.0, 60.0, 3.0))
        .unwrap();

    let closed = &ledger.done_trades()[0];
    // (60 - 50) * 10 minus 10/15 of the 3.0 commission.
    assert!((closed.profit() - 98.0).abs() < 1e-9);

    let reopened = ledger.active_trade("SBER").unwrap();
    assert_eq!(reopened.volume(), -5.0);
    assert!((reopened.commission - 1.0).abs() < 1e-9);
}

// ── Orchestrated replay ──────────────────────────────────────────────

fn flat_series(security: &str, closes: &[(u32, f64)]) -> CandleSeries {
    let mut s = CandleSeries::new(security);
    for &(h, close) in closes {
        s.push(candle(h, close, close, close, close)).unwrap();
    }
    s
}

#[test]
fn two_instrument_replay_summary() {
    let mut tester = Tester::new(10_000.0, DrawdownMode::FixedCapital).unwrap();
    tester
        .add_series(flat_series("SBER", &[(10, 250.0), (11, 255.0), (12, 252.0)]))
        .unwrap();
    tester
        .add_series(flat_series("GAZP", &[(10, 160.0), (11, 158.0), (12, 161.0)]))
        .unwrap();

    tester
        .add_orders(
            OrderBatch::new(vec![
                order(10, "SBER", 10.0, 250.0, 2.0),
                order(10, "GAZP", -20.0, 160.0, 2.0),
                order(12, "SBER", -10.0, 252.0, 2.0),
                order(12, "GAZP", 20.0, 161.0, 2.0),
            ])
            .unwrap(),
        )
        .unwrap();

    let summary = tester.run().unwrap();
    // SBER: +20 - 4 commission; GAZP: -20 - 4 commission.
    assert!((summary.net_profit - (16.0 - 24.0)).abs() < 1e-9);
    assert_eq!(summary.trades, 2);
    assert_eq!(summary.long_trades, 1);
    assert_eq!(summary.short_trades, 1);
    assert_eq!(summary.winning_trades, 1);
    assert_eq!(summary.losing_trades, 1);
    assert!((summary.total_commission - 8.0).abs() < 1e-9);
    let expected_turnover = 2500.0 + 3200.0 + 2520.0 + 3220.0;
    assert!((summary.turnover - expected_turnover).abs() < 1e-9);

    // Equity never dipped below its running peak by more than the GAZP leg.
    assert!(summary.max_drawdown_pct < 0.0);
}

#[test]
fn merged_batches_replay_in_timestamp_order() {
    let mut tester = Tester::new(1_000.0, DrawdownMode::FixedCapital).unwrap();
    tester
        .add_series(flat_series("SBER", &[(10, 100.0), (11, 101.0), (12, 103.0)]))
        .unwrap();

    // Two strategy legs submitted as separate batches.
    tester
        .add_orders(OrderBatch::new(vec![order(10, "SBER", 2.0, 100.0, 0.0)]).unwrap())
        .unwrap();
    tester
        .add_orders(
            OrderBatch::new(vec![
                order(11, "SBER", 1.0, 101.0, 0.0),
                order(12, "SBER", -3.0, 103.0, 0.0),
            ])
            .unwrap(),
        )
        .unwrap();

    let summary = tester.run().unwrap();
    // 2*(103-100) + 1*(103-101) realized.
    assert!((summary.net_profit - 8.0).abs() < 1e-9);
    assert_eq!(summary.trades, 1);
}
