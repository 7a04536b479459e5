use std::collections::HashMap;

use regex::Regex;

use crate::error::{DaybookError, Result};
use crate::models::{CellValue, RawRow};

pub const PARTICULARS: &str = "Particulars";

/// Header names the DayBook export must carry, in the order they are checked.
pub const REQUIRED_COLUMNS: &[&str] = &[
    "Date",
    "Particulars",
    "Quantity",
    "Rate",
    "Value",
    "Gross Total",
    "Round Off",
    "Voucher Type",
    "Voucher No.",
    "Voucher Ref. No.",
    "GSTIN/UIN",
    "Narration",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaxKind {
    Cgst,
    Sgst,
    Igst,
}

/// Where each field of the DayBook lives. Built once per run.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnRoles {
    /// Zero-based index of the header row within the sheet.
    pub header_row: usize,
    pub date: usize,
    pub particulars: usize,
    pub quantity: usize,
    pub rate: usize,
    pub value: usize,
    pub gross_total: usize,
    pub round_off: usize,
    pub voucher_type: usize,
    pub voucher_no: usize,
    pub voucher_ref: usize,
    pub gstin: usize,
    pub narration: usize,
    pub cgst: Vec<usize>,
    pub sgst: Vec<usize>,
    pub igst: Vec<usize>,
}

impl ColumnRoles {
    pub fn tax_columns(&self, kind: TaxKind) -> &[usize] {
        match kind {
            TaxKind::Cgst => &self.cgst,
            TaxKind::Sgst => &self.sgst,
            TaxKind::Igst => &self.igst,
        }
    }
}

/// Lowercase a header and drop everything that is not a letter.
pub fn normalize(name: &str) -> String {
    let re = Regex::new(r"[^a-z]").expect("static pattern");
    re.replace_all(&name.to_lowercase(), "").into_owned()
}

/// Which tax family a header belongs to, tested CGST, then SGST, then IGST.
pub fn classify_tax_column(name: &str) -> Option<TaxKind> {
    let norm = normalize(name);
    if norm.contains("cgst") {
        Some(TaxKind::Cgst)
    } else if norm.contains("sgst") {
        Some(TaxKind::Sgst)
    } else if norm.contains("igst") {
        Some(TaxKind::Igst)
    } else {
        None
    }
}

fn header_text(cell: &CellValue) -> Option<String> {
    cell.as_text()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// First row holding a cell whose trimmed text is exactly "Particulars".
pub fn find_header_row(rows: &[RawRow]) -> Result<usize> {
    rows.iter()
        .position(|row| {
            row.cells
                .iter()
                .any(|c| matches!(c, CellValue::Text(s) if s.trim() == PARTICULARS))
        })
        .ok_or(DaybookError::MissingHeader)
}

/// Header name → column index. A repeated name keeps its last position.
pub fn header_map(header: &RawRow) -> HashMap<String, usize> {
    header
        .cells
        .iter()
        .enumerate()
        .filter_map(|(idx, cell)| header_text(cell).map(|name| (name, idx)))
        .collect()
}

/// Locate the header row and assign every column its role.
pub fn classify(rows: &[RawRow]) -> Result<ColumnRoles> {
    let header_row = find_header_row(rows)?;
    let map = header_map(&rows[header_row]);

    let require = |name: &str| -> Result<usize> {
        map.get(name)
            .copied()
            .ok_or_else(|| DaybookError::MissingColumn(name.to_string()))
    };
    for name in REQUIRED_COLUMNS {
        require(name)?;
    }

    let mut tax: Vec<(usize, TaxKind)> = map
        .iter()
        .filter_map(|(name, &idx)| classify_tax_column(name).map(|kind| (idx, kind)))
        .collect();
    tax.sort_by_key(|(idx, _)| *idx);
    let pick = |kind: TaxKind| -> Vec<usize> {
        tax.iter().filter(|(_, k)| *k == kind).map(|(idx, _)| *idx).collect()
    };

    let roles = ColumnRoles {
        header_row,
        date: require("Date")?,
        particulars: require("Particulars")?,
        quantity: require("Quantity")?,
        rate: require("Rate")?,
        value: require("Value")?,
        gross_total: require("Gross Total")?,
        round_off: require("Round Off")?,
        voucher_type: require("Voucher Type")?,
        voucher_no: require("Voucher No.")?,
        voucher_ref: require("Voucher Ref. No.")?,
        gstin: require("GSTIN/UIN")?,
        narration: require("Narration")?,
        cgst: pick(TaxKind::Cgst),
        sgst: pick(TaxKind::Sgst),
        igst: pick(TaxKind::Igst),
    };
    tracing::info!(
        header_row = header_row + 1,
        cgst = roles.cgst.len(),
        sgst = roles.sgst.len(),
        igst = roles.igst.len(),
        "classified DayBook columns"
    );
    Ok(roles)
}
