pub mod dividends;

use std::path::PathBuf;

use clap::Parser;
use dividends::{dividends, DividendsArgs};

use crate::services::{parsers::DecimalConvention, shared::constants::DEFAULT_OUTPUT_PATH};

/// Fetches the dividend history of a B3 ticker from Fundamentus, exports it
/// and charts it.
#[derive(Parser, Debug)]
#[command(name = "proventos", version)]
struct Args {
    /// Ticker symbol, e.g. BBSE3 (case-insensitive)
    ticker: String,
    /// Where the semicolon separated table is written
    #[arg(short, long, default_value = DEFAULT_OUTPUT_PATH)]
    out: PathBuf,
    /// How gross values like 1.234,50 are read; overrides PROVENTOS_DECIMAL_CONVENTION
    #[arg(long, value_enum)]
    decimal_convention: Option<DecimalConvention>,
    /// Skip drawing the charts
    #[arg(long)]
    no_charts: bool,
}

pub async fn cli() -> anyhow::Result<()> {
    let args = Args::parse();
    dividends(DividendsArgs {
        ticker: args.ticker,
        out: args.out,
        decimal_convention: args.decimal_convention,
        charts: !args.no_charts,
    })
    .await
}
