use std::{fmt, str::FromStr};

use chrono::NaiveDate;
use clap::ValueEnum;
use rust_decimal::Decimal;

/// Date format used by every date column of the source table.
pub const SOURCE_DATE_FORMAT: &str = "%d/%m/%Y";

/// What the source shows in the payment date column when no date was set.
pub const PAYMENT_DATE_PLACEHOLDER: &str = "-";

/// How gross values written as `1.234,50` are turned into a decimal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum DecimalConvention {
    /// Drop every `.` thousands separator, then read `,` as the decimal point.
    #[default]
    StripThousands,
    /// Only read `,` as the decimal point. Any `.` in the value is rejected,
    /// so `1.234,50` and `1.234` both fail.
    DecimalCommaOnly,
}

impl DecimalConvention {
    pub fn normalize(&self, raw: &str) -> String {
        let trimmed = raw.trim();
        match self {
            DecimalConvention::StripThousands => trimmed.replace('.', "").replace(',', "."),
            DecimalConvention::DecimalCommaOnly => trimmed.replace(',', "."),
        }
    }
}

impl fmt::Display for DecimalConvention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecimalConvention::StripThousands => f.write_str("strip-thousands"),
            DecimalConvention::DecimalCommaOnly => f.write_str("decimal-comma-only"),
        }
    }
}

impl FromStr for DecimalConvention {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        <DecimalConvention as ValueEnum>::from_str(s, true)
    }
}

pub fn parse_source_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), SOURCE_DATE_FORMAT).ok()
}

pub fn parse_locale_decimal(raw: &str, convention: DecimalConvention) -> Option<Decimal> {
    if convention == DecimalConvention::DecimalCommaOnly && raw.contains('.') {
        return None;
    }
    Decimal::from_str(&convention.normalize(raw)).ok()
}

pub fn parse_quantity(raw: &str) -> Option<i64> {
    raw.trim().parse::<i64>().ok()
}
