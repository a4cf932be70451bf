use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Serialize, Serializer};
use tabled::Tabled;

/// Column labels of the exported table, in their fixed order.
pub const COLUMNS: [&str; 5] = [
    "TICKET",
    "DATA COM",
    "DATA PAGAMENTO",
    "VALOR",
    "TIPO PROVENTO",
];

/// One row of the source table, as text, in source column order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDividendRow {
    pub record_date: String,
    pub gross_value: String,
    pub payment_type: String,
    pub payment_date: String,
    pub quantity: String,
}

/// Ex/announcement date. The source is allowed to carry dates we can't read,
/// those are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordDate {
    Parsed(NaiveDate),
    Unparsed(String),
}

impl fmt::Display for RecordDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordDate::Parsed(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            RecordDate::Unparsed(raw) => f.write_str(raw),
        }
    }
}

impl Serialize for RecordDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

// Field order mirrors COLUMNS.
#[derive(Debug, Clone, PartialEq, Serialize, Tabled)]
pub struct DividendRecord {
    #[tabled(rename = "TICKET")]
    pub ticker: String,
    #[tabled(rename = "DATA COM")]
    pub record_date: RecordDate,
    #[tabled(rename = "DATA PAGAMENTO", display_with = "display_payment_date")]
    pub payment_date: Option<NaiveDate>,
    #[tabled(rename = "VALOR")]
    pub value_per_share: Decimal,
    #[tabled(rename = "TIPO PROVENTO")]
    pub payment_type: String,
}

fn display_payment_date(date: &Option<NaiveDate>) -> String {
    match date {
        Some(date) => date.format("%Y-%m-%d").to_string(),
        None => "-".to_string(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnnualAggregate {
    pub year: i32,
    pub total: Decimal,
}

/// Counters for the rows the normalizer dropped or only partially parsed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalizationReport {
    pub rows_in: usize,
    pub placeholder_rows_dropped: usize,
    pub unparsed_record_dates: usize,
    pub missing_payment_dates: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedDividends {
    pub records: Vec<DividendRecord>,
    /// Every year bucket, oldest first, including the latest one.
    pub annual: Vec<AnnualAggregate>,
    pub report: NormalizationReport,
}

impl NormalizedDividends {
    /// The annual series without its latest bucket, which is usually a
    /// year still in progress.
    pub fn charted_annual(&self) -> &[AnnualAggregate] {
        match self.annual.split_last() {
            Some((_, complete_years)) => complete_years,
            None => &[],
        }
    }
}
