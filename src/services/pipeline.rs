use std::{path::PathBuf, time::Duration};

use reqwest::header::HeaderMap;
use rust_decimal::Decimal;
use tracing::info;

use super::{
    charts::{annual_chart, payments_chart, ChartSink},
    errors::ProventosError,
    extractor::extract_rows,
    market_data::fundamentus::{browser_headers, fetch_proventos_page, DEFAULT_BASE_URL},
    normalizer::normalize,
    parsers::DecimalConvention,
    shared::{constants::DEFAULT_TIMEOUT_SECS, env::get_env_variable},
    sinks::TableSink,
};
use crate::models::dividend::{DividendRecord, NormalizationReport};

/// Everything one run needs, built once up front.
#[derive(Debug, Clone)]
pub struct PipelineContext {
    pub ticker: String,
    pub output_path: PathBuf,
    pub decimal_convention: DecimalConvention,
    pub base_url: String,
    pub timeout: Duration,
    pub headers: HeaderMap,
}

impl PipelineContext {
    pub fn new(ticker: &str, output_path: impl Into<PathBuf>) -> Result<Self, ProventosError> {
        let ticker = ticker.trim();
        if ticker.is_empty() || !ticker.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(ProventosError::InvalidTicker(ticker.to_string()));
        }
        Ok(PipelineContext {
            ticker: ticker.to_uppercase(),
            output_path: output_path.into(),
            decimal_convention: DecimalConvention::default(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            headers: browser_headers(),
        })
    }

    /// Applies `PROVENTOS_BASE_URL`, `PROVENTOS_TIMEOUT_SECS` and
    /// `PROVENTOS_DECIMAL_CONVENTION` when they are set.
    pub fn with_env_overrides(mut self) -> Result<Self, ProventosError> {
        if let Some(base_url) = get_env_variable("PROVENTOS_BASE_URL") {
            self.base_url = base_url;
        }
        if let Some(timeout) = get_env_variable("PROVENTOS_TIMEOUT_SECS") {
            let secs = timeout.trim().parse::<u64>().map_err(|_| {
                ProventosError::Configuration(format!(
                    "PROVENTOS_TIMEOUT_SECS must be a whole number of seconds, got '{timeout}'"
                ))
            })?;
            self.timeout = Duration::from_secs(secs);
        }
        if let Some(convention) = get_env_variable("PROVENTOS_DECIMAL_CONVENTION") {
            self.decimal_convention = convention.parse().map_err(|_| {
                ProventosError::Configuration(format!(
                    "PROVENTOS_DECIMAL_CONVENTION must be strip-thousands or decimal-comma-only, got '{convention}'"
                ))
            })?;
        }
        Ok(self)
    }

    pub fn with_decimal_convention(mut self, convention: DecimalConvention) -> Self {
        self.decimal_convention = convention;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub ticker: String,
    /// False when the page had no dividend table; nothing was written then.
    pub table_found: bool,
    pub records: Vec<DividendRecord>,
    pub report: NormalizationReport,
    pub charted_annual_total: Decimal,
}

impl RunSummary {
    fn empty(ticker: &str) -> Self {
        RunSummary {
            ticker: ticker.to_string(),
            table_found: false,
            records: vec![],
            report: NormalizationReport::default(),
            charted_annual_total: Decimal::ZERO,
        }
    }
}

/// fetch → extract → normalize → {table, charts}. Either every stage
/// succeeds or the run stops at the first fatal error with nothing written
/// by the stages after it.
pub struct Pipeline<'s> {
    ctx: PipelineContext,
    table_sink: &'s mut dyn TableSink,
    chart_sink: &'s mut dyn ChartSink,
}

impl<'s> Pipeline<'s> {
    pub fn new(
        ctx: PipelineContext,
        table_sink: &'s mut dyn TableSink,
        chart_sink: &'s mut dyn ChartSink,
    ) -> Self {
        Pipeline {
            ctx,
            table_sink,
            chart_sink,
        }
    }

    pub async fn run(&mut self) -> Result<RunSummary, ProventosError> {
        let page = fetch_proventos_page(&self.ctx).await?;
        self.process_page(&page)
    }

    /// Everything after the fetch, on an already downloaded page.
    pub fn process_page(&mut self, html: &str) -> Result<RunSummary, ProventosError> {
        let ticker = self.ctx.ticker.as_str();

        let Some(rows) = extract_rows(html)? else {
            info!(target: "extract", "No dividend data for {}, nothing to export", ticker);
            return Ok(RunSummary::empty(ticker));
        };

        let normalized = normalize(rows, ticker, self.ctx.decimal_convention)?;
        info!(
            target: "normalize",
            "{}: {} records, {} rows without payment date dropped",
            ticker,
            normalized.records.len(),
            normalized.report.placeholder_rows_dropped
        );

        self.table_sink.write_table(&normalized.records)?;
        self.chart_sink
            .render(&payments_chart(ticker, &normalized.records))?;
        self.chart_sink
            .render(&annual_chart(ticker, normalized.charted_annual()))?;

        let charted_annual_total: Decimal = normalized
            .charted_annual()
            .iter()
            .map(|aggregate| aggregate.total)
            .sum();

        Ok(RunSummary {
            ticker: ticker.to_string(),
            table_found: true,
            records: normalized.records,
            report: normalized.report,
            charted_annual_total,
        })
    }
}
