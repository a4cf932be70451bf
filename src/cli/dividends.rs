use std::{io, path::PathBuf};

use anyhow::Context;
use owo_colors::{OwoColorize, Style};
use tabled::Table;

use crate::services::{
    charts::{ChartSink, NoChartSink, TerminalChartSink},
    parsers::DecimalConvention,
    pipeline::{Pipeline, PipelineContext, RunSummary},
    shared::util::format_brl,
    sinks::CsvTableSink,
};

pub struct DividendsArgs {
    pub ticker: String,
    pub out: PathBuf,
    pub decimal_convention: Option<DecimalConvention>,
    pub charts: bool,
}

pub async fn dividends(args: DividendsArgs) -> anyhow::Result<()> {
    let mut ctx = PipelineContext::new(&args.ticker, args.out)?.with_env_overrides()?;
    if let Some(convention) = args.decimal_convention {
        ctx = ctx.with_decimal_convention(convention);
    }

    let mut table_sink = CsvTableSink::new(&ctx.output_path);
    let mut terminal_charts = TerminalChartSink::new(io::stdout());
    let mut no_charts = NoChartSink;
    let chart_sink: &mut dyn ChartSink = if args.charts {
        &mut terminal_charts
    } else {
        &mut no_charts
    };

    let mut pipeline = Pipeline::new(ctx, &mut table_sink, chart_sink);
    let summary = pipeline
        .run()
        .await
        .with_context(|| format!("Couldn't collect dividends for {}", args.ticker.to_uppercase()))?;

    print_summary(&summary, &table_sink);
    Ok(())
}

fn print_summary(summary: &RunSummary, table_sink: &CsvTableSink) {
    let highlight = Style::new().black().on_white().bold();

    if !summary.table_found {
        println!(
            "No dividend table found for {}, nothing exported.",
            summary.ticker.style(highlight)
        );
        return;
    }

    println!("\n");
    println!("{}", Table::new(&summary.records));
    println!("====");
    println!(
        "{} records for {} written to {}",
        summary.records.len(),
        summary.ticker.style(highlight),
        table_sink.path().display()
    );
    if summary.report.placeholder_rows_dropped > 0 {
        println!(
            "{} announced payments without a payment date were left out",
            summary.report.placeholder_rows_dropped
        );
    }
    if summary.report.missing_payment_dates > 0 {
        println!(
            "{} records have an unreadable payment date and are not charted",
            summary.report.missing_payment_dates
        );
    }
    println!(
        "Total per share over complete years: {}",
        format_brl(summary.charted_annual_total).style(highlight)
    );
}
