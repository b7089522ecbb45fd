//! Bulk asset import: header resolution, row mapping, and report
//! aggregation.
//!
//! File decoding (delimited text, spreadsheet) lives in the api crate;
//! this module is pure. Rows are independent: a bad row contributes one
//! error string and never affects its neighbours.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::CoreError;
use crate::registry::CreateAssetFields;
use crate::status::AssetStatus;

// ---------------------------------------------------------------------------
// Column vocabulary
// ---------------------------------------------------------------------------

/// Expected header names, matched case-insensitively after trimming.
pub mod columns {
    pub const NAME: &str = "asset name";
    pub const CATEGORY: &str = "category";
    pub const SUBCATEGORY: &str = "subcategory";
    pub const TYPE: &str = "type";
    pub const LOCATION: &str = "location";
    pub const STATUS: &str = "status";
    pub const SERIAL_NUMBER: &str = "serial number";
    pub const PURCHASE_DATE: &str = "purchase date";
    pub const PURCHASE_PRICE: &str = "purchase price";
    pub const WARRANTY: &str = "warranty";
    pub const ASSIGNED_TO: &str = "assigned to";
}

/// Columns that must be present in the header row.
pub const REQUIRED_COLUMNS: &[&str] = &[
    columns::NAME,
    columns::CATEGORY,
    columns::TYPE,
    columns::LOCATION,
];

/// Columns that are recognised but optional.
pub const OPTIONAL_COLUMNS: &[&str] = &[
    columns::SUBCATEGORY,
    columns::STATUS,
    columns::SERIAL_NUMBER,
    columns::PURCHASE_DATE,
    columns::PURCHASE_PRICE,
    columns::WARRANTY,
    columns::ASSIGNED_TO,
];

/// Date formats accepted in the purchase date column.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y"];

// ---------------------------------------------------------------------------
// Header resolution
// ---------------------------------------------------------------------------

/// Maps recognised column names to their position in the header row.
#[derive(Debug, Clone)]
pub struct HeaderMap {
    indices: HashMap<&'static str, usize>,
}

impl HeaderMap {
    /// Resolve a header row against the expected column vocabulary.
    ///
    /// Missing required columns are a validation error (a structural
    /// problem with the file, not a row-level one). Unrecognised columns
    /// are ignored.
    pub fn resolve(headers: &[String]) -> Result<Self, CoreError> {
        let mut indices = HashMap::new();

        for (idx, header) in headers.iter().enumerate() {
            let normalized = header.trim().to_lowercase();
            for known in REQUIRED_COLUMNS.iter().chain(OPTIONAL_COLUMNS) {
                if normalized == *known {
                    indices.entry(*known).or_insert(idx);
                }
            }
        }

        let missing: Vec<&str> = REQUIRED_COLUMNS
            .iter()
            .filter(|c| !indices.contains_key(**c))
            .copied()
            .collect();
        if !missing.is_empty() {
            return Err(CoreError::Validation(format!(
                "Import file is missing required columns: {}",
                missing.join(", ")
            )));
        }

        Ok(Self { indices })
    }

    /// Fetch the trimmed cell value for a column, `None` when blank or the
    /// column is absent.
    fn value<'a>(&self, record: &'a [String], column: &'static str) -> Option<&'a str> {
        self.indices
            .get(column)
            .and_then(|idx| record.get(*idx))
            .map(|cell| cell.trim())
            .filter(|cell| !cell.is_empty())
    }
}

// ---------------------------------------------------------------------------
// Row mapping
// ---------------------------------------------------------------------------

/// A data row mapped to creation fields plus the optional "Assigned To"
/// username, still unresolved against the user directory.
#[derive(Debug, Clone)]
pub struct ImportedRow {
    pub fields: CreateAssetFields,
    pub assigned_to: Option<String>,
}

/// Map one data record to creation fields.
///
/// Returns a plain message on failure; the caller prefixes it with the
/// row position when adding it to the report.
pub fn map_row(map: &HeaderMap, record: &[String]) -> Result<ImportedRow, String> {
    let mut fields = CreateAssetFields::default();

    for (column, target) in [
        (columns::NAME, &mut fields.name),
        (columns::TYPE, &mut fields.asset_type),
        (columns::LOCATION, &mut fields.location),
    ] {
        match map.value(record, column) {
            Some(value) => *target = value.to_string(),
            None => return Err(format!("missing value in required column '{column}'")),
        }
    }

    fields.category = match map.value(record, columns::CATEGORY) {
        Some(value) => Some(value.to_string()),
        None => {
            return Err(format!(
                "missing value in required column '{}'",
                columns::CATEGORY
            ))
        }
    };

    fields.subcategory = map
        .value(record, columns::SUBCATEGORY)
        .map(str::to_string);
    fields.serial_number = map
        .value(record, columns::SERIAL_NUMBER)
        .map(str::to_string);
    fields.warranty = map.value(record, columns::WARRANTY).map(str::to_string);

    if let Some(raw) = map.value(record, columns::STATUS) {
        let status = AssetStatus::parse(raw).map_err(|err| err.to_string())?;
        fields.status = Some(status.as_str().to_string());
    }

    if let Some(raw) = map.value(record, columns::PURCHASE_DATE) {
        fields.purchase_date = Some(parse_date(raw)?);
    }

    if let Some(raw) = map.value(record, columns::PURCHASE_PRICE) {
        fields.purchase_price = Some(parse_price(raw)?);
    }

    let assigned_to = map
        .value(record, columns::ASSIGNED_TO)
        .map(str::to_string);

    Ok(ImportedRow {
        fields,
        assigned_to,
    })
}

fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            return Ok(date);
        }
    }
    Err(format!(
        "invalid purchase date '{raw}' (expected YYYY-MM-DD)"
    ))
}

fn parse_price(raw: &str) -> Result<f64, String> {
    let cleaned = raw.trim_start_matches('$').replace(',', "");
    cleaned
        .parse::<f64>()
        .map_err(|_| format!("invalid purchase price '{raw}'"))
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// Per-file outcome summary returned by the import endpoint.
#[derive(Debug, Default, Clone, Serialize)]
pub struct ImportReport {
    pub processed: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub errors: Vec<String>,
}

impl ImportReport {
    /// Record a successfully imported row.
    pub fn success(&mut self) {
        self.processed += 1;
        self.succeeded += 1;
    }

    /// Record a failed row with its 1-based position.
    pub fn failure(&mut self, row: usize, message: impl AsRef<str>) {
        self.processed += 1;
        self.failed += 1;
        self.errors.push(format!("Row {row}: {}", message.as_ref()));
    }

    /// Record a soft warning (the row still succeeds).
    pub fn warning(&mut self, row: usize, message: impl AsRef<str>) {
        self.errors.push(format!("Row {row}: {}", message.as_ref()));
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
