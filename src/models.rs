use std::fmt;
use std::rc::Rc;

use chrono::{NaiveDate, NaiveDateTime};

/// A single cell as read from the source sheet.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    DateTime(NaiveDateTime),
}

impl CellValue {
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Numeric reading of the cell. Text that does not parse and every
    /// non-numeric cell read as 0.0.
    pub fn as_number(&self) -> f64 {
        match self {
            Self::Number(n) => *n,
            Self::Bool(b) => f64::from(u8::from(*b)),
            Self::Text(s) => s.trim().parse().unwrap_or_else(|_| {
                tracing::debug!(value = %s, "non-numeric text read as 0");
                0.0
            }),
            Self::Empty | Self::DateTime(_) => 0.0,
        }
    }

    /// Verbatim text rendering, `None` for empty cells.
    pub fn as_text(&self) -> Option<String> {
        match self {
            Self::Empty => None,
            Self::Text(s) if s.is_empty() => None,
            Self::Text(s) => Some(s.clone()),
            Self::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => Some(format!("{}", *n as i64)),
            Self::Number(n) => Some(n.to_string()),
            Self::Bool(b) => Some(if *b { "TRUE" } else { "FALSE" }.to_string()),
            Self::DateTime(dt) => Some(dt.format("%Y-%m-%d %H:%M:%S").to_string()),
        }
    }
}

/// One row of the source sheet: values plus the bold flag of each cell.
#[derive(Debug, Clone, Default)]
pub struct RawRow {
    pub cells: Vec<CellValue>,
    pub bold: Vec<bool>,
}

impl RawRow {
    pub fn cell(&self, idx: usize) -> &CellValue {
        static EMPTY: CellValue = CellValue::Empty;
        self.cells.get(idx).unwrap_or(&EMPTY)
    }

    pub fn is_bold(&self, idx: usize) -> bool {
        self.bold.get(idx).copied().unwrap_or(false)
    }

    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(CellValue::is_empty)
    }
}

/// A ledger date. Timestamps are reduced to the calendar day; dates the
/// source kept as text stay verbatim.
#[derive(Debug, Clone, PartialEq)]
pub enum LedgerDate {
    Date(NaiveDate),
    Text(String),
}

impl LedgerDate {
    pub fn from_cell(cell: &CellValue) -> Option<Self> {
        match cell {
            CellValue::DateTime(dt) => Some(Self::Date(dt.date())),
            other => other.as_text().map(Self::Text),
        }
    }
}

impl fmt::Display for LedgerDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// Invoice-level figures read from a group-start row. Built once per group
/// and shared by every line of that group.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GroupContext {
    pub date: Option<LedgerDate>,
    pub party: Option<String>,
    pub voucher_type: Option<String>,
    pub voucher_no: Option<String>,
    pub voucher_ref: Option<String>,
    pub gstin: Option<String>,
    pub narration: Option<String>,
    pub expected_taxable: f64,
    pub expected_gross: f64,
    pub cgst: f64,
    pub sgst: f64,
    pub igst: f64,
    pub round_off: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Matched,
    NotMatched,
}

impl Verdict {
    pub fn from_match(matched: bool) -> Self {
        if matched {
            Self::Matched
        } else {
            Self::NotMatched
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Matched => "Matched",
            Self::NotMatched => "Not Matched",
        }
    }
}

/// Control-total verdicts for one closed group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reconciliation {
    pub taxable: Verdict,
    pub invoice: Verdict,
}

impl Reconciliation {
    pub fn is_matched(&self) -> bool {
        self.taxable == Verdict::Matched && self.invoice == Verdict::Matched
    }
}

/// One reconstructed invoice line of the cleaned ledger.
#[derive(Debug, Clone, PartialEq)]
pub struct LineItem {
    pub context: Rc<GroupContext>,
    pub stock_item: Option<String>,
    pub quantity: f64,
    pub rate: f64,
    pub uqc: Option<String>,
    pub taxable_value: f64,
    pub cgst: f64,
    pub sgst: f64,
    pub igst: f64,
    pub total_tax: f64,
    pub round_off: f64,
    pub tax_rate: f64,
    pub invoice_value: f64,
    pub reconciliation: Option<Reconciliation>,
}

/// One row of the Tally import ledger.
#[derive(Debug, Clone, PartialEq)]
pub struct TallyLine {
    pub date: Option<LedgerDate>,
    pub voucher_type: Option<String>,
    pub voucher_no: Option<String>,
    pub voucher_ref: Option<String>,
    pub party: Option<String>,
    pub gstin: Option<String>,
    pub stock_item: Option<String>,
    pub quantity: f64,
    pub rate: f64,
    pub taxable_value: f64,
    pub cgst: f64,
    pub sgst: f64,
    pub igst: f64,
    pub tax_rate: f64,
    pub invoice_value: f64,
}
