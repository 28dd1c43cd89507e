//! TradeLab CLI — order-tape replay and walk-forward composition.
//!
//! Commands:
//! - `run` — replay an order tape against candle series from a TOML config,
//!   export equity/trades/summary artifacts, print the summary block
//! - `walk-forward` — compose candidate equity curves into one continuous
//!   out-of-sample curve using a named selector

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::fs::File;
use std::path::{Path, PathBuf};

use tradelab_core::engine::{OrderBatch, Tester};
use tradelab_core::fingerprint::RunFingerprint;
use tradelab_core::series::{CandleSeries, EquityCurve};
use tradelab_runner::reporting::{
    write_equity, write_summary_json, write_trades, ReportArtifact,
};
use tradelab_runner::selectors;
use tradelab_runner::walk_forward::{compose, EquityMatrix, WalkForwardIndices};
use tradelab_runner::RunConfig;

#[derive(Parser)]
#[command(
    name = "tradelab",
    about = "TradeLab CLI — order-tape replay and walk-forward composition"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay an order tape against candle series and export the results.
    Run {
        /// Path to a TOML run configuration.
        #[arg(long)]
        config: PathBuf,
    },
    /// Compose candidate equity curves into one out-of-sample curve.
    WalkForward {
        /// `;`-delimited matrix: Date;Time;<curve id>...
        #[arg(long)]
        equities: PathBuf,

        /// Windows as optFrom:optTo:tradeFrom:tradeTo, comma separated.
        #[arg(long)]
        windows: String,

        /// Selector: net-profit, profit-drawdown, trend-slope, best-triple.
        #[arg(long, default_value = "net-profit")]
        selector: String,

        /// Top-K curves for the ranking selectors.
        #[arg(long, default_value_t = 3)]
        top: usize,

        /// Reference capital for the percent export.
        #[arg(long, default_value_t = 100.0)]
        reference_capital: f64,

        /// Output path for the composed curve.
        #[arg(long)]
        out: PathBuf,
    },
}

fn main() -> Result<()> {
    match Cli::parse().command {
        Commands::Run { config } => run_replay(&config),
        Commands::WalkForward {
            equities,
            windows,
            selector,
            top,
            reference_capital,
            out,
        } => run_walk_forward(&equities, &windows, &selector, top, reference_capital, &out),
    }
}

fn run_replay(config_path: &Path) -> Result<()> {
    let config = RunConfig::from_toml_path(config_path)
        .with_context(|| format!("loading config {}", config_path.display()))?;

    let mut series = Vec::new();
    for entry in &config.candles {
        let loaded = CandleSeries::from_csv_path(&entry.security, &entry.path)
            .with_context(|| format!("loading candles {}", entry.path.display()))?;
        series.push(loaded);
    }

    let mut orders = OrderBatch::empty();
    for path in &config.orders {
        let batch = OrderBatch::from_csv_path(path)
            .with_context(|| format!("loading orders {}", path.display()))?;
        orders = orders.merge(batch)?;
    }

    let config_json = serde_json::to_string(&config)?;
    let fingerprint = RunFingerprint::compute(&config_json, &series, &orders);

    let mut tester = Tester::new(config.initial_capital, config.drawdown_mode)?;
    for s in series {
        tester.add_series(s)?;
    }
    tester.add_orders(orders)?;
    let summary = tester.run()?;

    std::fs::create_dir_all(&config.output_dir)
        .with_context(|| format!("creating {}", config.output_dir.display()))?;

    let equity_path = config.output_dir.join("equity.csv");
    write_equity(
        File::create(&equity_path)?,
        tester.equity_curve(),
        config.reference_capital(),
        config.export_capital_used,
    )
    .with_context(|| format!("writing {}", equity_path.display()))?;

    let trades_path = config.output_dir.join("trades.csv");
    write_trades(File::create(&trades_path)?, tester.ledger().all_trades())
        .with_context(|| format!("writing {}", trades_path.display()))?;

    let summary_path = config.output_dir.join("summary.json");
    let artifact = ReportArtifact {
        summary: summary.clone(),
        fingerprint: fingerprint.clone(),
    };
    write_summary_json(File::create(&summary_path)?, &artifact)
        .with_context(|| format!("writing {}", summary_path.display()))?;

    println!("Run {}", fingerprint.run_id);
    println!("{summary}");
    println!("Artifacts in {}", config.output_dir.display());
    Ok(())
}

fn run_walk_forward(
    equities: &Path,
    windows_arg: &str,
    selector_name: &str,
    top: usize,
    reference_capital: f64,
    out: &Path,
) -> Result<()> {
    let file = File::open(equities)
        .with_context(|| format!("opening equity matrix {}", equities.display()))?;
    let matrix = EquityMatrix::from_csv_reader(file)
        .with_context(|| format!("loading equity matrix {}", equities.display()))?;

    let windows = parse_windows(windows_arg)?;
    let Some(selector) = selectors::by_name(selector_name, top) else {
        bail!(
            "unknown selector '{selector_name}' \
             (expected net-profit, profit-drawdown, trend-slope, or best-triple)"
        );
    };

    let composed = compose(&matrix, &windows, selector.as_ref())?;

    let mut curve = EquityCurve::new();
    for (&time, &value) in matrix.timestamps().iter().zip(&composed) {
        curve.push(time, value, 0.0);
    }
    write_equity(File::create(out)?, &curve, reference_capital, false)
        .with_context(|| format!("writing {}", out.display()))?;

    println!(
        "Composed {} candidate curves over {} windows with {} -> {}",
        matrix.curve_count(),
        windows.len(),
        selector.name(),
        out.display()
    );
    Ok(())
}

/// Parse `optFrom:optTo:tradeFrom:tradeTo[,...]`.
fn parse_windows(raw: &str) -> Result<Vec<WalkForwardIndices>> {
    let mut windows = Vec::new();
    for part in raw.split(',').filter(|p| !p.trim().is_empty()) {
        let fields: Vec<&str> = part.trim().split(':').collect();
        if fields.len() != 4 {
            bail!("window '{part}' must have four ':'-separated indices");
        }
        let mut parsed = [0usize; 4];
        for (slot, field) in parsed.iter_mut().zip(&fields) {
            *slot = field
                .parse()
                .with_context(|| format!("bad window index '{field}' in '{part}'"))?;
        }
        windows.push(WalkForwardIndices::new(
            parsed[0], parsed[1], parsed[2], parsed[3],
        )?);
    }
    if windows.is_empty() {
        bail!("no walk-forward windows given");
    }
    Ok(windows)
}
