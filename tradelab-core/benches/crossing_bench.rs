//! Benchmark the order-crossing hot loop.

use chrono::{Duration, NaiveDate};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tradelab_core::domain::Candle;
use tradelab_core::engine::{NoCommission, Position, TradeLedger};

fn synthetic_candles(n: usize) -> Vec<Candle> {
    let start = NaiveDate::from_ymd_opt(2024, 1, 2)
        .unwrap()
        .and_hms_opt(10, 0, 0)
        .unwrap();
    (0..n)
        .map(|i| {
            let base = 100.0 + (i as f64 * 0.7).sin() * 5.0;
            Candle {
                timestamp: start + Duration::minutes(i as i64),
                open: base,
                high: base + 1.5,
                low: base - 1.5,
                close: base + ((i % 3) as f64 - 1.0),
                volume: 1000.0,
            }
        })
        .collect()
}

fn bench_on_candle(c: &mut Criterion) {
    let candles = synthetic_candles(10_000);

    c.bench_function("on_candle_no_orders", |b| {
        b.iter(|| {
            let mut pos = Position::new("SBER", 100.0, 0.01, Box::new(NoCommission));
            let mut ledger = TradeLedger::new();
            for candle in &candles {
                black_box(pos.on_candle(candle, &mut ledger).unwrap());
            }
        })
    });

    c.bench_function("on_candle_resting_orders", |b| {
        b.iter(|| {
            let mut pos = Position::new("SBER", 100.0, 0.01, Box::new(NoCommission));
            let mut ledger = TradeLedger::new();
            for (i, candle) in candles.iter().enumerate() {
                if pos.orders().is_empty() && i % 5 == 0 {
                    let _ = pos.submit_limit(1.0, pos.price() - 1.0, "bench");
                }
                black_box(pos.on_candle(candle, &mut ledger).unwrap());
            }
        })
    });
}

criterion_group!(benches, bench_on_candle);
criterion_main!(benches);
