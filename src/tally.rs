use crate::allocator::round2;
use crate::error::{DaybookError, Result};
use crate::models::{LineItem, TallyLine};

pub const DEFAULT_REDUCTION_PERCENT: u32 = 20;
pub const DEFAULT_HOME_STATE: &str = "33";
pub const CASH_PARTY: &str = "Cash";

/// Per-run knobs of the re-rating pass.
#[derive(Debug, Clone, PartialEq)]
pub struct RunOptions {
    /// Value reduction applied to lines without a GSTIN, 0..=100.
    pub reduction_percent: u32,
    /// State code that marks an intra-state GSTIN.
    pub home_state_code: String,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            reduction_percent: DEFAULT_REDUCTION_PERCENT,
            home_state_code: DEFAULT_HOME_STATE.to_string(),
        }
    }
}

/// Reject a reduction outside 0..=100 or a state code that is not two digits.
pub fn validate(reduction_percent: u32, home_state_code: &str) -> Result<()> {
    if reduction_percent > 100 {
        return Err(DaybookError::InvalidReduction(reduction_percent));
    }
    if home_state_code.len() != 2 || !home_state_code.bytes().all(|b| b.is_ascii_digit()) {
        return Err(DaybookError::InvalidHomeState(home_state_code.to_string()));
    }
    Ok(())
}

impl RunOptions {
    pub fn new(reduction_percent: u32, home_state_code: impl Into<String>) -> Result<Self> {
        let home_state_code = home_state_code.into();
        validate(reduction_percent, &home_state_code)?;
        Ok(Self {
            reduction_percent,
            home_state_code,
        })
    }

    pub fn factor(&self) -> f64 {
        f64::from(100 - self.reduction_percent.min(100)) / 100.0
    }
}

/// Whether the voucher narration marks a GST-registered sale.
pub fn mentions_gst(narration: Option<&str>) -> bool {
    narration
        .map(|n| n.to_lowercase().replace(' ', "").contains("gst"))
        .unwrap_or(false)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TaxSplit {
    pub cgst: f64,
    pub sgst: f64,
    pub igst: f64,
}

/// Split the tax on `taxable_value` by jurisdiction: no GSTIN or a GSTIN whose
/// state prefix equals the home code pays CGST + SGST, any other state pays IGST.
pub fn split_tax(taxable_value: f64, tax_rate: f64, gstin: Option<&str>, home_state_code: &str) -> TaxSplit {
    let intra_state = match gstin {
        None => true,
        Some(g) => g.trim().get(..2) == Some(home_state_code),
    };
    if intra_state {
        let half = round2((taxable_value * (tax_rate / 100.0)) / 2.0);
        TaxSplit { cgst: half, sgst: half, igst: 0.0 }
    } else {
        TaxSplit {
            cgst: 0.0,
            sgst: 0.0,
            igst: round2(taxable_value * (tax_rate / 100.0)),
        }
    }
}

pub fn rerate_line(line: &LineItem, options: &RunOptions) -> TallyLine {
    let ctx = &line.context;
    let (party, gstin) = if mentions_gst(ctx.narration.as_deref()) {
        let gstin = ctx.gstin.clone().filter(|g| !g.trim().is_empty());
        (ctx.party.clone(), gstin)
    } else {
        (Some(CASH_PARTY.to_string()), None)
    };

    let (mut quantity, mut rate) = (line.quantity, line.rate);
    if gstin.is_none() {
        let factor = options.factor();
        quantity = round2(quantity * factor);
        rate = round2(rate * factor);
    }

    let taxable_value = round2(quantity * rate);
    let tax = split_tax(taxable_value, line.tax_rate, gstin.as_deref(), &options.home_state_code);
    let invoice_value = round2(taxable_value + tax.cgst + tax.sgst + tax.igst);

    TallyLine {
        date: ctx.date.clone(),
        voucher_type: ctx.voucher_type.clone(),
        voucher_no: ctx.voucher_no.clone(),
        voucher_ref: ctx.voucher_ref.clone(),
        party,
        gstin,
        stock_item: line.stock_item.clone(),
        quantity,
        rate,
        taxable_value,
        cgst: tax.cgst,
        sgst: tax.sgst,
        igst: tax.igst,
        tax_rate: line.tax_rate,
        invoice_value,
    }
}

/// One Tally line per cleaned line, in the same order.
pub fn rerate(lines: &[LineItem], options: &RunOptions) -> Vec<TallyLine> {
    let out: Vec<TallyLine> = lines.iter().map(|l| rerate_line(l, options)).collect();
    let cash = out.iter().filter(|l| l.gstin.is_none()).count();
    tracing::info!(
        lines = out.len(),
        cash_lines = cash,
        reduction = options.reduction_percent,
        home_state = %options.home_state_code,
        "re-rated ledger for Tally"
    );
    out
}
