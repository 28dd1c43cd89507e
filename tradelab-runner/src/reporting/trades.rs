//! Trade tape export — one line per trade, closed trades first.

use anyhow::Result;
use std::io::Write;

use tradelab_core::domain::Trade;

pub fn write_trades<'a, W, I>(mut sink: W, trades: I) -> Result<()>
where
    W: Write,
    I: IntoIterator<Item = &'a Trade>,
{
    writeln!(
        sink,
        "Security;Direction;Status;EntryDate;EntryTime;EntryPrice;ExitDate;ExitTime;ExitPrice;\
         Profit;Profit,%;Volume;Value;Bars;Commission"
    )?;

    for trade in trades {
        let direction = if trade.is_long() { "Long" } else { "Short" };
        let status = if trade.is_done() { "Done" } else { "Active" };
        writeln!(
            sink,
            "{};{};{};{};{};{:.4};{};{};{:.4};{:.4};{:.4};{:.0};{:.4};{};{:.4}",
            trade.security,
            direction,
            status,
            trade.entry_time.format("%d.%m.%Y"),
            trade.entry_time.format("%H:%M:%S"),
            trade.avg_entry_price(),
            trade.last_time.format("%d.%m.%Y"),
            trade.last_time.format("%H:%M:%S"),
            trade.last_price,
            trade.profit(),
            trade.profit_pct(),
            trade.scale_in_volume.abs(),
            trade.entry_value(),
            trade.bars_held,
            trade.commission,
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};
    use tradelab_core::domain::Fill;
    use tradelab_core::engine::TradeLedger;

    fn ts(h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    fn fill(h: u32, volume: f64, price: f64) -> Fill {
        Fill {
            time: ts(h),
            security: "SBER".into(),
            volume,
            price,
            commission: 1.0,
            comment: String::new(),
        }
    }

    #[test]
    fn closed_and_open_trades_exported() {
        let mut ledger = TradeLedger::new();
        ledger.apply_fill(&fill(10, 10.0, 100.0)).unwrap();
        ledger.apply_fill(&fill(11, -10.0, 110.0)).unwrap();
        ledger.apply_fill(&fill(12, -5.0, 110.0)).unwrap();

        let mut out = Vec::new();
        write_trades(&mut out, ledger.all_trades()).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Security;Direction;Status"));
        assert!(lines[1].starts_with("SBER;Long;Done;01.03.2024;10:00:00;100.0000"));
        assert!(lines[2].starts_with("SBER;Short;Active;01.03.2024;12:00:00"));
    }
}
