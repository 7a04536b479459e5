use std::rc::Rc;

use crate::allocator::allocate;
use crate::columns::{ColumnRoles, TaxKind};
use crate::models::{CellValue, GroupContext, LedgerDate, LineItem, RawRow};
use crate::reconciler::close_group;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKind {
    GroupStart,
    Subtotal,
    Blank,
    LineItem,
}

pub fn classify_row(row: &RawRow, roles: &ColumnRoles) -> RowKind {
    if row.is_bold(roles.particulars) {
        RowKind::GroupStart
    } else if row.is_bold(roles.quantity) {
        RowKind::Subtotal
    } else if row.is_blank() {
        RowKind::Blank
    } else {
        RowKind::LineItem
    }
}

/// Split a Rate cell into its number and unit. `"5/KGS"` carries both; a
/// bare number has no unit.
pub fn parse_rate(cell: &CellValue) -> (f64, Option<String>) {
    if let CellValue::Text(raw) = cell {
        if let Some((rate, uqc)) = raw.split_once('/') {
            let rate = CellValue::Text(rate.to_string()).as_number();
            let uqc = uqc.trim();
            return (rate, (!uqc.is_empty()).then(|| uqc.to_string()));
        }
    }
    (cell.as_number(), None)
}

fn sum_columns(row: &RawRow, roles: &ColumnRoles, kind: TaxKind) -> f64 {
    roles
        .tax_columns(kind)
        .iter()
        .map(|&idx| row.cell(idx).as_number())
        .sum()
}

/// Read the invoice-level figures of a group-start row.
pub fn read_group_context(row: &RawRow, roles: &ColumnRoles) -> GroupContext {
    GroupContext {
        date: LedgerDate::from_cell(row.cell(roles.date)),
        party: row.cell(roles.particulars).as_text(),
        voucher_type: row.cell(roles.voucher_type).as_text(),
        voucher_no: row.cell(roles.voucher_no).as_text(),
        voucher_ref: row.cell(roles.voucher_ref).as_text(),
        gstin: row.cell(roles.gstin).as_text(),
        narration: row.cell(roles.narration).as_text(),
        expected_taxable: row.cell(roles.value).as_number(),
        expected_gross: row.cell(roles.gross_total).as_number(),
        cgst: sum_columns(row, roles, TaxKind::Cgst),
        sgst: sum_columns(row, roles, TaxKind::Sgst),
        igst: sum_columns(row, roles, TaxKind::Igst),
        round_off: row.cell(roles.round_off).as_number(),
    }
}

/// Everything one pass over the sheet produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reconstruction {
    pub lines: Vec<LineItem>,
    pub groups: usize,
    pub mismatched_groups: usize,
    pub subtotal_rows: usize,
    /// Line rows seen before any group had started.
    pub orphan_rows: usize,
}

struct OpenGroup {
    context: Rc<GroupContext>,
    lines: Vec<LineItem>,
}

impl Reconstruction {
    fn close(&mut self, group: OpenGroup) {
        let (lines, result) = close_group(&group.context, group.lines);
        if result.is_some_and(|r| !r.is_matched()) {
            self.mismatched_groups += 1;
        }
        self.lines.extend(lines);
    }
}

/// Rebuild line items from the rows below the header row.
///
/// A bold Particulars cell opens a new voucher group and a bold Quantity cell
/// marks a subtotal row. Rows with no content are skipped. Anything else is a
/// line of the open group. Lines are buffered per group and only released once
/// the group has been reconciled.
pub fn reconstruct(rows: &[RawRow], roles: &ColumnRoles) -> Reconstruction {
    let mut out = Reconstruction::default();
    let mut open: Option<OpenGroup> = None;

    for row in rows.iter().skip(roles.header_row + 1) {
        match classify_row(row, roles) {
            RowKind::GroupStart => {
                if let Some(group) = open.take() {
                    out.close(group);
                }
                out.groups += 1;
                open = Some(OpenGroup {
                    context: Rc::new(read_group_context(row, roles)),
                    lines: Vec::new(),
                });
            }
            RowKind::Subtotal => out.subtotal_rows += 1,
            RowKind::Blank => {}
            RowKind::LineItem => {
                let Some(group) = open.as_mut() else {
                    out.orphan_rows += 1;
                    tracing::warn!("line row before the first voucher group, skipped");
                    continue;
                };
                let (rate, uqc) = parse_rate(row.cell(roles.rate));
                let quantity = row.cell(roles.quantity).as_number();
                let stock_item = row.cell(roles.particulars).as_text();
                group.lines.push(allocate(&group.context, stock_item, quantity, rate, uqc));
            }
        }
    }
    if let Some(group) = open.take() {
        out.close(group);
    }

    tracing::info!(
        groups = out.groups,
        lines = out.lines.len(),
        mismatched = out.mismatched_groups,
        subtotals = out.subtotal_rows,
        "reconstructed DayBook"
    );
    out
}
