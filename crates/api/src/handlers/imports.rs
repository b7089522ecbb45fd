//! Handler for bulk asset import.
//!
//! Accepts one uploaded tabular file (delimited text or spreadsheet),
//! decodes it into a header row plus data records, and drives the
//! per-row creation loop. Rows are independent: one row's failure is
//! reported and never aborts the rest. Only a structurally unreadable
//! file is a top-level error.

use std::io::Cursor;

use axum::extract::{Multipart, State};
use axum::response::IntoResponse;
use axum::Json;
use calamine::{Data, Reader, Xlsx};
use chrono::Utc;
use stockroom_core::import::{self, HeaderMap, ImportReport};
use stockroom_core::registry;
use stockroom_core::types::DbId;
use stockroom_db::repositories::UserRepo;

use crate::error::{AppError, AppResult};
use crate::handlers::assets::insert_asset;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/assets/import
///
/// Bulk-create assets from an uploaded `.csv` or `.xlsx` file. Admin
/// only. Always returns a per-row report; an unresolvable "Assigned To"
/// username downgrades to a warning and the asset is created unassigned.
pub async fn import_assets(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    let field = multipart
        .next_field()
        .await
        .map_err(|err| AppError::BadRequest(format!("Invalid multipart upload: {err}")))?
        .ok_or_else(|| AppError::BadRequest("No file uploaded".into()))?;

    let filename = field.file_name().unwrap_or_default().to_lowercase();
    let data = field
        .bytes()
        .await
        .map_err(|err| AppError::BadRequest(format!("Failed to read upload: {err}")))?;

    let (headers, records) = decode_table(&filename, &data)?;
    let header_map = HeaderMap::resolve(&headers).map_err(AppError::Core)?;

    let mut report = ImportReport::default();

    for (index, record) in records.iter().enumerate() {
        let row = index + 1;

        // Fully blank records (common trailing spreadsheet rows) are
        // skipped without counting.
        if record.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }

        let mapped = match import::map_row(&header_map, record) {
            Ok(mapped) => mapped,
            Err(message) => {
                report.failure(row, message);
                continue;
            }
        };

        let mut custodian: Option<(DbId, String)> = None;
        if let Some(ref username) = mapped.assigned_to {
            match UserRepo::find_by_username(&state.pool, username).await {
                Ok(Some(user)) => custodian = Some((user.id, user.username)),
                Ok(None) => report.warning(
                    row,
                    format!("unknown user '{username}', asset created unassigned"),
                ),
                Err(err) => {
                    report.failure(row, format!("user lookup failed: {err}"));
                    continue;
                }
            }
        }

        let fields = match registry::validate_create(&mapped.fields, custodian, Utc::now()) {
            Ok(fields) => fields,
            Err(err) => {
                report.failure(row, err.to_string());
                continue;
            }
        };

        match insert_asset(&state, &admin, fields).await {
            Ok(_) => report.success(),
            Err(err) => report.failure(row, err.to_string()),
        }
    }

    tracing::info!(
        processed = report.processed,
        succeeded = report.succeeded,
        failed = report.failed,
        user_id = admin.user_id,
        "Bulk import finished",
    );

    Ok(Json(DataResponse { data: report }))
}

// ---------------------------------------------------------------------------
// File decoding
// ---------------------------------------------------------------------------

/// Decode an uploaded file into a header row plus data records.
///
/// Dispatches on the file extension: `.csv` through the csv reader,
/// `.xlsx` through calamine. Anything else is rejected.
fn decode_table(filename: &str, data: &[u8]) -> AppResult<(Vec<String>, Vec<Vec<String>>)> {
    if filename.ends_with(".xlsx") {
        decode_xlsx(data)
    } else if filename.ends_with(".csv") {
        decode_csv(data)
    } else {
        Err(AppError::BadRequest(
            "Unsupported import file type; expected .csv or .xlsx".into(),
        ))
    }
}

fn decode_csv(data: &[u8]) -> AppResult<(Vec<String>, Vec<Vec<String>>)> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(data);

    let headers = reader
        .headers()
        .map_err(|err| AppError::BadRequest(format!("Unreadable import file: {err}")))?
        .iter()
        .map(str::to_string)
        .collect();

    let mut records = Vec::new();
    for result in reader.records() {
        let record =
            result.map_err(|err| AppError::BadRequest(format!("Unreadable import file: {err}")))?;
        records.push(record.iter().map(str::to_string).collect());
    }

    Ok((headers, records))
}

fn decode_xlsx(data: &[u8]) -> AppResult<(Vec<String>, Vec<Vec<String>>)> {
    let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(data))
        .map_err(|err| AppError::BadRequest(format!("Unreadable spreadsheet: {err}")))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| AppError::BadRequest("Spreadsheet has no sheets".into()))?
        .map_err(|err| AppError::BadRequest(format!("Unreadable spreadsheet: {err}")))?;

    let mut rows = range.rows();
    let headers = rows
        .next()
        .ok_or_else(|| AppError::BadRequest("Spreadsheet is empty".into()))?
        .iter()
        .map(cell_to_string)
        .collect();

    let records = rows
        .map(|row| row.iter().map(cell_to_string).collect())
        .collect();

    Ok((headers, records))
}

/// Render a spreadsheet cell the way the row mapper expects text.
///
/// Whole-number floats drop the trailing `.0` (spreadsheets store most
/// numbers as floats); date cells render as ISO dates.
fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(f) if f.fract() == 0.0 => format!("{}", *f as i64),
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(|d| d.date().to_string())
            .unwrap_or_default(),
        other => other.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    const CSV: &[u8] = b"Asset Name,Category,Type,Location,Assigned To\n\
        Dell Laptop,IT Equipment,Laptop,Floor 1,jdoe\n\
        \"Projector, HD\",AV,Projector,Room 2,\n";

    #[test]
    fn decodes_csv_headers_and_records() {
        let (headers, records) = decode_table("assets.csv", CSV).unwrap();
        assert_eq!(
            headers,
            vec!["Asset Name", "Category", "Type", "Location", "Assigned To"]
        );
        assert_eq!(records.len(), 2);
        assert_eq!(records[0][0], "Dell Laptop");
        // Quoted field with embedded comma survives decoding.
        assert_eq!(records[1][0], "Projector, HD");
        assert_eq!(records[1][4], "");
    }

    #[test]
    fn decoded_csv_feeds_the_row_mapper() {
        let (headers, records) = decode_table("assets.csv", CSV).unwrap();
        let map = HeaderMap::resolve(&headers).unwrap();
        let row = import::map_row(&map, &records[0]).unwrap();
        assert_eq!(row.fields.name, "Dell Laptop");
        assert_eq!(row.assigned_to.as_deref(), Some("jdoe"));
    }

    #[test]
    fn unsupported_extension_rejected() {
        let err = decode_table("assets.pdf", CSV).unwrap_err();
        assert_matches!(err, AppError::BadRequest(_));
    }

    #[test]
    fn unreadable_xlsx_rejected() {
        let err = decode_table("assets.xlsx", b"not a zip archive").unwrap_err();
        assert_matches!(err, AppError::BadRequest(_));
    }

    #[test]
    fn float_cells_render_without_trailing_zero() {
        assert_eq!(cell_to_string(&Data::Float(850.0)), "850");
        assert_eq!(cell_to_string(&Data::Float(849.99)), "849.99");
        assert_eq!(cell_to_string(&Data::Empty), "");
    }
}
