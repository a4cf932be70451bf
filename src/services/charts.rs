use std::io::Write;

use owo_colors::{OwoColorize, Style};
use rust_decimal::{prelude::ToPrimitive, Decimal};

use super::{errors::ProventosError, shared::util::format_brl};
use crate::models::dividend::{AnnualAggregate, DividendRecord};

const PLOT_WIDTH: usize = 48;

#[derive(Debug, Clone, PartialEq)]
pub struct ChartPoint {
    pub x: String,
    pub y: Decimal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub label: String,
    pub points: Vec<ChartPoint>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineChart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub series: Vec<Series>,
}

/// Anything that can show a line chart. Rendering is the end of the line:
/// nothing is handed back to the pipeline.
pub trait ChartSink {
    fn render(&mut self, chart: &LineChart) -> Result<(), ProventosError>;
}

/// Value per share against payment date, oldest payment first. Records
/// without a payment date have no place on the x axis and are skipped.
pub fn payments_chart(ticker: &str, records: &[DividendRecord]) -> LineChart {
    let mut dated: Vec<_> = records
        .iter()
        .filter_map(|record| record.payment_date.map(|date| (date, record.value_per_share)))
        .collect();
    dated.sort_by_key(|(date, _)| *date);

    LineChart {
        title: format!("PROVENTOS RECEBIDOS POR {ticker}"),
        x_label: "ANO".to_string(),
        y_label: "VALOR (R$)".to_string(),
        series: vec![Series {
            label: ticker.to_string(),
            points: dated
                .into_iter()
                .map(|(date, value)| ChartPoint {
                    x: date.format("%d/%m/%Y").to_string(),
                    y: value,
                })
                .collect(),
        }],
    }
}

pub fn annual_chart(ticker: &str, annual: &[AnnualAggregate]) -> LineChart {
    LineChart {
        title: format!("PROVENTOS ANUAIS RECEBIDOS POR {ticker}"),
        x_label: "ANO".to_string(),
        y_label: "VALOR (R$)".to_string(),
        series: vec![Series {
            label: ticker.to_string(),
            points: annual
                .iter()
                .map(|aggregate| ChartPoint {
                    x: aggregate.year.to_string(),
                    y: aggregate.total,
                })
                .collect(),
        }],
    }
}

/// Draws charts as text, one line per point with the x axis running down the
/// screen.
pub struct TerminalChartSink<W: Write> {
    out: W,
    colored: bool,
}

impl<W: Write> TerminalChartSink<W> {
    pub fn new(out: W) -> Self {
        TerminalChartSink { out, colored: true }
    }

    pub fn plain(mut self) -> Self {
        self.colored = false;
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn paint(&self, text: &str, style: Style) -> String {
        if self.colored {
            text.style(style).to_string()
        } else {
            text.to_string()
        }
    }

    fn draw(&mut self, chart: &LineChart) -> std::io::Result<()> {
        let title = self.paint(&chart.title, Style::new().bold());
        let y_label = self.paint(&chart.y_label, Style::new().dimmed());
        writeln!(self.out)?;
        writeln!(self.out, "{title}")?;
        writeln!(self.out, "{y_label}")?;

        for series in &chart.series {
            let legend = self.paint(&format!("● {}", series.label), Style::new().cyan());
            writeln!(self.out, "{legend}")?;

            if series.points.is_empty() {
                writeln!(self.out, "  (no data)")?;
                continue;
            }

            let x_width = series.points.iter().map(|p| p.x.chars().count()).max().unwrap_or(0);
            let min = series.points.iter().map(|p| p.y).min().unwrap_or(Decimal::ZERO);
            let max = series.points.iter().map(|p| p.y).max().unwrap_or(Decimal::ZERO);

            for point in &series.points {
                let column = scale(point.y, min, max);
                let marker = self.paint("●", Style::new().cyan());
                writeln!(
                    self.out,
                    "  {:>x_width$} │{}{}{} {}",
                    point.x,
                    " ".repeat(column),
                    marker,
                    " ".repeat(PLOT_WIDTH - column),
                    format_brl(point.y),
                )?;
            }
            writeln!(self.out, "  {:>x_width$} └{}", "", "─".repeat(PLOT_WIDTH + 1))?;
        }

        let x_label = self.paint(&chart.x_label, Style::new().dimmed());
        writeln!(self.out, "  {x_label}")?;
        self.out.flush()
    }
}

impl<W: Write> ChartSink for TerminalChartSink<W> {
    fn render(&mut self, chart: &LineChart) -> Result<(), ProventosError> {
        self.draw(chart).map_err(|source| ProventosError::Chart {
            title: chart.title.clone(),
            source,
        })
    }
}

/// Used for `--no-charts`.
pub struct NoChartSink;

impl ChartSink for NoChartSink {
    fn render(&mut self, _chart: &LineChart) -> Result<(), ProventosError> {
        Ok(())
    }
}

fn scale(value: Decimal, min: Decimal, max: Decimal) -> usize {
    let Some(span) = max.checked_sub(min) else {
        return PLOT_WIDTH / 2;
    };
    if span.is_zero() {
        return PLOT_WIDTH / 2;
    }
    let position = (value - min) / span * Decimal::from(PLOT_WIDTH);
    position.round().to_usize().unwrap_or(0).min(PLOT_WIDTH)
}
