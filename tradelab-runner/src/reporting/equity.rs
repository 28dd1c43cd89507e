//! Equity curve export.
//!
//! Rows are `DD.MM.YYYY;HH:MM:SS;` plus fixed 4-decimal percentages of the
//! supplied reference capital, one per synchronized tick. The capital-used
//! column is optional and switches the header variant.

use anyhow::{bail, Result};
use std::io::Write;

use tradelab_core::series::EquityCurve;

pub fn write_equity<W: Write>(
    mut sink: W,
    curve: &EquityCurve,
    reference_capital: f64,
    with_capital_used: bool,
) -> Result<()> {
    if reference_capital <= 0.0 {
        bail!("reference capital must be positive (got {reference_capital})");
    }

    if with_capital_used {
        writeln!(sink, "Date;Time;Equity,%;CapitalUsed,%")?;
    } else {
        writeln!(sink, "Date;Time;Equity,%")?;
    }

    for point in curve.iter() {
        let date = point.time.format("%d.%m.%Y");
        let time = point.time.format("%H:%M:%S");
        let equity_pct = point.equity / reference_capital * 100.0;
        if with_capital_used {
            let capital_pct = point.capital_used / reference_capital * 100.0;
            writeln!(sink, "{date};{time};{equity_pct:.4};{capital_pct:.4}")?;
        } else {
            writeln!(sink, "{date};{time};{equity_pct:.4}")?;
        }
    }
    Ok(())
}
