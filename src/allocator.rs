use std::rc::Rc;

use crate::models::{GroupContext, LineItem};

/// Round to two decimals the way the source ledgers were produced: the
/// correctly rounded decimal nearest to the binary value, not `x * 100`.
pub fn round2(value: f64) -> f64 {
    if !value.is_finite() {
        return value;
    }
    format!("{value:.2}").parse().unwrap_or(value)
}

/// Share of the group's stated taxable value carried by one line.
pub fn share(taxable_value: f64, expected_taxable: f64) -> f64 {
    if expected_taxable == 0.0 {
        0.0
    } else {
        taxable_value / expected_taxable
    }
}

/// Build a line item, apportioning the group's tax and round-off by the
/// line's share of the group taxable value. Every figure is rounded as it
/// is produced.
pub fn allocate(
    context: &Rc<GroupContext>,
    stock_item: Option<String>,
    quantity: f64,
    rate: f64,
    uqc: Option<String>,
) -> LineItem {
    let taxable_value = round2(quantity * rate);
    let ratio = share(taxable_value, context.expected_taxable);

    let cgst = round2(ratio * context.cgst);
    let sgst = round2(ratio * context.sgst);
    let igst = round2(ratio * context.igst);
    let round_off = round2(ratio * context.round_off);

    let total_tax = cgst + sgst + igst;
    let tax_rate = if taxable_value != 0.0 {
        round2((total_tax / taxable_value) * 100.0)
    } else {
        0.0
    };
    let invoice_value = round2(taxable_value + total_tax + round_off);

    LineItem {
        context: Rc::clone(context),
        stock_item,
        quantity,
        rate,
        uqc,
        taxable_value,
        cgst,
        sgst,
        igst,
        total_tax,
        round_off,
        tax_rate,
        invoice_value,
        reconciliation: None,
    }
}
