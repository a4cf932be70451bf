use std::iter::{Fuse, FusedIterator};

use deunicode::deunicode;
use once_cell::sync::Lazy;
use scraper::{element_ref::Select, ElementRef, Html, Selector};
use tracing::{debug, info};

use super::errors::ProventosError;
use crate::models::dividend::RawDividendRow;

/// Position of every field in a source row, with the header label the page
/// shows above it.
pub struct SourceColumn {
    pub field: &'static str,
    pub label: &'static str,
}

pub const SOURCE_COLUMNS: [SourceColumn; 5] = [
    SourceColumn { field: "record_date", label: "Data" },
    SourceColumn { field: "gross_value", label: "Valor" },
    SourceColumn { field: "payment_type", label: "Tipo" },
    SourceColumn { field: "payment_date", label: "Data de Pagamento" },
    SourceColumn { field: "quantity", label: "Por quantas ações" },
];

static TABLE: Lazy<Selector> = Lazy::new(|| Selector::parse("table").expect("valid selector"));
static ROW: Lazy<Selector> = Lazy::new(|| Selector::parse("tr").expect("valid selector"));
static HEADER_CELL: Lazy<Selector> = Lazy::new(|| Selector::parse("th").expect("valid selector"));
static CELL: Lazy<Selector> = Lazy::new(|| Selector::parse("td").expect("valid selector"));

/// The dividend table is the first (and on the source page, only) table.
pub fn locate_table(document: &Html) -> Option<ElementRef<'_>> {
    document.select(&TABLE).next()
}

/// Lazily walks the rows of a located table. Rows without `<td>` cells
/// (headers, separators) are skipped.
pub struct RowExtractor<'a> {
    rows: Fuse<Select<'a, 'static>>,
    data_rows: usize,
}

impl<'a> RowExtractor<'a> {
    /// Checks the header row, if the table has one, against `SOURCE_COLUMNS`.
    pub fn new(table: ElementRef<'a>) -> Result<Self, ProventosError> {
        let header = table
            .select(&ROW)
            .map(|row| row.select(&HEADER_CELL).map(cell_text).collect::<Vec<_>>())
            .find(|labels| !labels.is_empty());

        match header {
            Some(labels) => validate_header(&labels)?,
            None => debug!(target: "extract", "Table has no header row, skipping layout check"),
        }

        Ok(RowExtractor {
            rows: table.select(&ROW).fuse(),
            data_rows: 0,
        })
    }
}

impl Iterator for RowExtractor<'_> {
    type Item = Result<RawDividendRow, ProventosError>;

    fn next(&mut self) -> Option<Self::Item> {
        for row in self.rows.by_ref() {
            let cells: Vec<String> = row.select(&CELL).map(cell_text).collect();
            if cells.is_empty() {
                continue;
            }
            self.data_rows += 1;
            return Some(raw_row(self.data_rows, cells));
        }
        None
    }
}

// A scraper `Select` starts over from the first row once exhausted.
impl FusedIterator for RowExtractor<'_> {}

/// Parses a fetched page and collects its dividend rows. `None` means the
/// page has no table at all.
pub fn extract_rows(html: &str) -> Result<Option<Vec<RawDividendRow>>, ProventosError> {
    let document = Html::parse_document(html);
    let Some(table) = locate_table(&document) else {
        info!(target: "extract", "No dividend table found on page");
        return Ok(None);
    };
    let rows = RowExtractor::new(table)?.collect::<Result<Vec<_>, _>>()?;
    debug!(target: "extract", "Extracted {} rows", rows.len());
    Ok(Some(rows))
}

fn raw_row(row: usize, cells: Vec<String>) -> Result<RawDividendRow, ProventosError> {
    let cell_count = cells.len();
    let mut cells = cells.into_iter();
    match (
        cells.next(),
        cells.next(),
        cells.next(),
        cells.next(),
        cells.next(),
    ) {
        (
            Some(record_date),
            Some(gross_value),
            Some(payment_type),
            Some(payment_date),
            Some(quantity),
        ) => Ok(RawDividendRow {
            record_date,
            gross_value,
            payment_type,
            payment_date,
            quantity,
        }),
        _ => Err(ProventosError::ShortRow {
            row,
            cells: cell_count,
            expected: SOURCE_COLUMNS.len(),
        }),
    }
}

fn validate_header(labels: &[String]) -> Result<(), ProventosError> {
    for (position, column) in SOURCE_COLUMNS.iter().enumerate() {
        let found = labels.get(position).map(String::as_str).unwrap_or("");
        if fold_label(found) != fold_label(column.label) {
            return Err(ProventosError::LayoutMismatch {
                position,
                field: column.field,
                expected: column.label,
                found: found.to_string(),
            });
        }
    }
    Ok(())
}

fn fold_label(label: &str) -> String {
    deunicode(label)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn cell_text(cell: ElementRef<'_>) -> String {
    cell.text().collect::<String>().trim().to_string()
}
