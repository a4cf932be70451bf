use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use tracing::{debug, warn};

use super::{
    errors::ProventosError,
    parsers::{
        parse_locale_decimal, parse_quantity, parse_source_date, DecimalConvention,
        PAYMENT_DATE_PLACEHOLDER,
    },
};
use crate::models::dividend::{
    AnnualAggregate, DividendRecord, NormalizationReport, NormalizedDividends, RawDividendRow,
    RecordDate,
};

struct DatedRow {
    row: usize,
    raw: RawDividendRow,
    record_date: RecordDate,
    payment_date: Option<NaiveDate>,
}

/// Turns raw source rows into the final dividend table.
///
/// Every stage runs over the whole table before the next starts, so the
/// placeholder filter always runs before anything is coerced. Date problems
/// are recovered per row; quantity and value problems end the run.
pub fn normalize<I>(
    rows: I,
    ticker: &str,
    convention: DecimalConvention,
) -> Result<NormalizedDividends, ProventosError>
where
    I: IntoIterator<Item = RawDividendRow>,
{
    let ticker = ticker.to_uppercase();
    let mut report = NormalizationReport::default();

    let mut kept = Vec::new();
    for (index, raw) in rows.into_iter().enumerate() {
        report.rows_in += 1;
        if raw.payment_date == PAYMENT_DATE_PLACEHOLDER {
            debug!(target: "normalize", "Row {} has no payment date, dropping", index + 1);
            report.placeholder_rows_dropped += 1;
            continue;
        }
        kept.push((index + 1, raw));
    }

    let mut dated = Vec::with_capacity(kept.len());
    for (row, raw) in kept {
        let record_date = match parse_source_date(&raw.record_date) {
            Some(date) => RecordDate::Parsed(date),
            None => {
                debug!(target: "normalize", "Row {}: keeping record date '{}' as text", row, raw.record_date);
                report.unparsed_record_dates += 1;
                RecordDate::Unparsed(raw.record_date.clone())
            }
        };
        let payment_date = parse_source_date(&raw.payment_date);
        if payment_date.is_none() {
            warn!(target: "normalize", "Row {}: unreadable payment date '{}'", row, raw.payment_date);
            report.missing_payment_dates += 1;
        }
        dated.push(DatedRow {
            row,
            raw,
            record_date,
            payment_date,
        });
    }

    let mut with_quantity = Vec::with_capacity(dated.len());
    for row in dated {
        let quantity =
            parse_quantity(&row.raw.quantity).ok_or_else(|| ProventosError::InvalidQuantity {
                row: row.row,
                raw: row.raw.quantity.clone(),
            })?;
        with_quantity.push((row, quantity));
    }

    let mut with_gross = Vec::with_capacity(with_quantity.len());
    for (row, quantity) in with_quantity {
        let gross = parse_locale_decimal(&row.raw.gross_value, convention).ok_or_else(|| {
            ProventosError::InvalidValue {
                row: row.row,
                raw: row.raw.gross_value.clone(),
                convention,
            }
        })?;
        with_gross.push((row, quantity, gross));
    }

    let mut with_value = Vec::with_capacity(with_gross.len());
    for (row, quantity, gross) in with_gross {
        let value_per_share = per_share(&row, quantity, gross)?;
        with_value.push((row, value_per_share));
    }

    let records: Vec<DividendRecord> = with_value
        .into_iter()
        .map(|(row, value_per_share)| DividendRecord {
            ticker: ticker.clone(),
            record_date: row.record_date,
            payment_date: row.payment_date,
            value_per_share,
            payment_type: row.raw.payment_type.to_uppercase(),
        })
        .collect();

    let annual = annual_totals(&records);

    Ok(NormalizedDividends {
        records,
        annual,
        report,
    })
}

fn per_share(row: &DatedRow, quantity: i64, gross: Decimal) -> Result<Decimal, ProventosError> {
    match quantity {
        0 => Err(ProventosError::ZeroQuantity {
            row: row.row,
            raw: row.raw.quantity.clone(),
        }),
        q if q < 0 => Err(ProventosError::InvalidQuantity {
            row: row.row,
            raw: row.raw.quantity.clone(),
        }),
        q => Ok((gross / Decimal::from(q)).normalize()),
    }
}

/// Sums value per share by payment year, oldest first. Years between the
/// first and last payment with nothing paid show up as zero. Records without
/// a payment date are left out.
pub fn annual_totals(records: &[DividendRecord]) -> Vec<AnnualAggregate> {
    let mut totals: BTreeMap<i32, Decimal> = BTreeMap::new();
    for record in records {
        if let Some(date) = record.payment_date {
            *totals.entry(date.year()).or_insert(Decimal::ZERO) += record.value_per_share;
        }
    }

    let (Some(&first), Some(&last)) = (totals.keys().next(), totals.keys().next_back()) else {
        return vec![];
    };

    (first..=last)
        .map(|year| AnnualAggregate {
            year,
            total: totals.get(&year).copied().unwrap_or(Decimal::ZERO),
        })
        .collect()
}
