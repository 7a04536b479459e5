use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};

use crate::models::{LedgerDate, LineItem, TallyLine};

// ---------------------------------------------------------------------------
// Ledger rows that can be summarised
// ---------------------------------------------------------------------------

pub trait LedgerRow {
    fn date(&self) -> Option<&LedgerDate>;
    fn cgst(&self) -> f64;
    fn sgst(&self) -> f64;
    fn igst(&self) -> f64;
    fn taxable_value(&self) -> f64;
    fn invoice_value(&self) -> f64;
}

impl LedgerRow for LineItem {
    fn date(&self) -> Option<&LedgerDate> {
        self.context.date.as_ref()
    }
    fn cgst(&self) -> f64 {
        self.cgst
    }
    fn sgst(&self) -> f64 {
        self.sgst
    }
    fn igst(&self) -> f64 {
        self.igst
    }
    fn taxable_value(&self) -> f64 {
        self.taxable_value
    }
    fn invoice_value(&self) -> f64 {
        self.invoice_value
    }
}

impl LedgerRow for TallyLine {
    fn date(&self) -> Option<&LedgerDate> {
        self.date.as_ref()
    }
    fn cgst(&self) -> f64 {
        self.cgst
    }
    fn sgst(&self) -> f64 {
        self.sgst
    }
    fn igst(&self) -> f64 {
        self.igst
    }
    fn taxable_value(&self) -> f64 {
        self.taxable_value
    }
    fn invoice_value(&self) -> f64 {
        self.invoice_value
    }
}

// ---------------------------------------------------------------------------
// Dates
// ---------------------------------------------------------------------------

const TEXT_DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d-%m-%Y", "%d/%m/%Y", "%d-%b-%y", "%d-%b-%Y", "%d.%m.%Y"];

/// Calendar day of a ledger date; text dates are tried against the formats
/// DayBook exports use. `None` when nothing fits.
pub fn calendar_date(date: &LedgerDate) -> Option<NaiveDate> {
    match date {
        LedgerDate::Date(d) => Some(*d),
        LedgerDate::Text(raw) => {
            let raw = raw.trim();
            TEXT_DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        }
    }
}

pub fn month_key(date: NaiveDate) -> String {
    format!("{:04}-{:02}", date.year(), date.month())
}

// ---------------------------------------------------------------------------
// Monthly summary
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Default)]
pub struct MonthlySummary {
    pub month: String,
    pub cgst: f64,
    pub sgst: f64,
    pub igst: f64,
    pub taxable_value: f64,
    pub invoice_value: f64,
}

/// Sum the tax and value columns per calendar month, oldest month first.
/// Rows without a readable date are left out.
pub fn monthly_summary<T: LedgerRow>(rows: &[T]) -> Vec<MonthlySummary> {
    let mut months: BTreeMap<String, MonthlySummary> = BTreeMap::new();
    let mut undated = 0usize;
    for row in rows {
        let Some(day) = row.date().and_then(calendar_date) else {
            undated += 1;
            continue;
        };
        let key = month_key(day);
        let entry = months.entry(key.clone()).or_insert_with(|| MonthlySummary {
            month: key,
            ..Default::default()
        });
        entry.cgst += row.cgst();
        entry.sgst += row.sgst();
        entry.igst += row.igst();
        entry.taxable_value += row.taxable_value();
        entry.invoice_value += row.invoice_value();
    }
    if undated > 0 {
        tracing::warn!(rows = undated, "rows without a readable date left out of the monthly summary");
    }
    months.into_values().collect()
}

/// Grand total across all months, labelled "Total".
pub fn total(summary: &[MonthlySummary]) -> MonthlySummary {
    summary.iter().fold(
        MonthlySummary {
            month: "Total".to_string(),
            ..Default::default()
        },
        |mut acc, m| {
            acc.cgst += m.cgst;
            acc.sgst += m.sgst;
            acc.igst += m.igst;
            acc.taxable_value += m.taxable_value;
            acc.invoice_value += m.invoice_value;
            acc
        },
    )
}
