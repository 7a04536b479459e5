use std::io::Cursor;
use std::path::Path;

use calamine::{Data, Reader};
use chrono::{NaiveDate, NaiveDateTime};
use sha2::{Digest, Sha256};
use zip::ZipArchive;

use crate::error::Result;
use crate::models::{CellValue, RawRow};
use crate::styles;

/// Rows of the active sheet, plus the name of that sheet.
#[derive(Debug, Clone)]
pub struct SourceSheet {
    pub name: String,
    pub rows: Vec<RawRow>,
}

pub fn excel_serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    // Excel epoch is 1899-12-30 (accounting for the 1900 leap year bug)
    let base = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let days = serial.trunc() as i64;
    let seconds = ((serial - serial.trunc()) * 86_400.0).round() as i64;
    base.checked_add_signed(chrono::Duration::days(days))?
        .checked_add_signed(chrono::Duration::seconds(seconds))
}

fn parse_iso_datetime(raw: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

fn to_cell(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Float(f) => CellValue::Number(*f),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => match excel_serial_to_datetime(dt.as_f64()) {
            Some(value) => CellValue::DateTime(value),
            None => CellValue::Number(dt.as_f64()),
        },
        Data::DateTimeIso(s) => match parse_iso_datetime(s) {
            Some(value) => CellValue::DateTime(value),
            None => CellValue::Text(s.clone()),
        },
        Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(_) => CellValue::Empty,
    }
}

/// Read the active sheet of an xlsx workbook held in memory. Values come from
/// calamine, bold flags from the workbook's style parts.
pub fn read_workbook(bytes: &[u8]) -> Result<SourceSheet> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;
    let active = styles::active_sheet(&mut archive)?;
    let bold = styles::read_bold_cells(&mut archive, &active)?;

    let mut workbook = calamine::open_workbook_auto_from_rs(Cursor::new(bytes))?;
    let range = workbook.worksheet_range(&active.name)?;

    let mut rows = Vec::new();
    if let Some((last_row, last_col)) = range.end() {
        let width = last_col as usize + 1;
        for r in 0..=last_row {
            let mut row = RawRow {
                cells: Vec::with_capacity(width),
                bold: Vec::with_capacity(width),
            };
            for c in 0..=last_col {
                row.cells.push(range.get_value((r, c)).map(to_cell).unwrap_or_default());
                row.bold.push(bold.contains(&(r, c)));
            }
            rows.push(row);
        }
    }

    tracing::debug!(sheet = %active.name, rows = rows.len(), bold_cells = bold.len(), "read source sheet");
    Ok(SourceSheet { name: active.name, rows })
}

pub fn checksum(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Read a workbook from disk, returning its active sheet and SHA-256.
pub fn read_file(file_path: &Path) -> Result<(SourceSheet, String)> {
    let bytes = std::fs::read(file_path)?;
    let sheet = read_workbook(&bytes)?;
    Ok((sheet, checksum(&bytes)))
}
