use crate::allocator::round2;
use crate::models::{GroupContext, LineItem, Reconciliation, Verdict};

/// Compare a closed group's reconstructed totals with the totals the
/// report states for it. `None` when the group produced no lines.
pub fn reconcile(context: &GroupContext, lines: &[LineItem]) -> Option<Reconciliation> {
    if lines.is_empty() {
        return None;
    }
    let taxable: f64 = lines.iter().map(|l| l.taxable_value).sum();
    let invoice: f64 = lines.iter().map(|l| l.invoice_value).sum();

    Some(Reconciliation {
        taxable: Verdict::from_match(round2(taxable) == round2(context.expected_taxable)),
        invoice: Verdict::from_match(round2(invoice) == round2(context.expected_gross)),
    })
}

/// Reconcile a closed group and stamp the verdicts on each of its lines.
pub fn close_group(context: &GroupContext, mut lines: Vec<LineItem>) -> (Vec<LineItem>, Option<Reconciliation>) {
    let result = reconcile(context, &lines);
    if let Some(result) = result {
        for line in &mut lines {
            line.reconciliation = Some(result);
        }
        if !result.is_matched() {
            tracing::warn!(
                party = context.party.as_deref().unwrap_or(""),
                voucher_no = context.voucher_no.as_deref().unwrap_or(""),
                taxable = result.taxable.label(),
                invoice = result.invoice.label(),
                "group totals do not match the report"
            );
        }
    }
    (lines, result)
}
