use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::cli::{resolve_settings, run_options};
use crate::error::Result;
use crate::export::SUMMARY_HEADERS;
use crate::fmt::rupees;
use crate::processor::{process_file, ProcessOutput};
use crate::reports::{total, MonthlySummary};

pub fn run(config: Option<&str>, file: &str, reduction: Option<u32>, home_state: Option<String>) -> Result<()> {
    let settings = resolve_settings(config, reduction, home_state, None);
    let options = run_options(&settings)?;
    let out = process_file(std::path::Path::new(file), &options)?;
    println!("{}", format_report(&out, options.reduction_percent));
    Ok(())
}

/// Both monthly dashboards and the reconciliation tally, ready for stdout.
pub fn format_report(out: &ProcessOutput, reduction_percent: u32) -> String {
    format!(
        "{}\n\n{}\n\n{}",
        format_monthly("DayBook (cleaned)", &out.cleaned_summary),
        format_monthly(&format!("File to Tally ({reduction_percent}% reduction)"), &out.tally_summary),
        format_stats(out),
    )
}

pub fn format_monthly(title: &str, summary: &[MonthlySummary]) -> String {
    if summary.is_empty() {
        return format!("{title}\nNo dated rows.");
    }

    let mut table = Table::new();
    table.set_header(SUMMARY_HEADERS.to_vec());
    let totals = total(summary);
    for m in summary.iter().chain(std::iter::once(&totals)) {
        let month = if m.month == totals.month {
            m.month.bold().to_string()
        } else {
            m.month.clone()
        };
        table.add_row(vec![
            Cell::new(month),
            Cell::new(rupees(m.cgst)),
            Cell::new(rupees(m.sgst)),
            Cell::new(rupees(m.igst)),
            Cell::new(rupees(m.taxable_value)),
            Cell::new(rupees(m.invoice_value)),
        ]);
    }
    format!("{title}\n{table}")
}

pub fn format_stats(out: &ProcessOutput) -> String {
    let s = &out.stats;
    let mismatched = if s.mismatched_groups == 0 {
        "0".green().to_string()
    } else {
        s.mismatched_groups.to_string().red().to_string()
    };

    let mut table = Table::new();
    table.set_header(vec!["Vouchers", "Line items", "Not matched", "Subtotal rows", "Skipped rows"]);
    table.add_row(vec![
        Cell::new(s.groups),
        Cell::new(s.lines),
        Cell::new(mismatched),
        Cell::new(s.subtotal_rows),
        Cell::new(s.orphan_rows),
    ]);
    format!("Reconciliation\n{table}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processor::{fixtures, process_rows};
    use crate::reader::read_workbook;
    use crate::tally::RunOptions;

    fn sample_output() -> ProcessOutput {
        colored::control::set_override(false);
        let sheet = read_workbook(&fixtures::sample()).unwrap();
        process_rows(&sheet.rows, &RunOptions::default()).unwrap()
    }

    #[test]
    fn test_monthly_table_has_total_row() {
        let out = sample_output();
        let text = format_monthly("DayBook (cleaned)", &out.cleaned_summary);
        assert!(text.starts_with("DayBook (cleaned)\n"));
        assert!(text.contains("2024-04"));
        assert!(text.contains("2024-05"));
        assert!(text.contains("Total"));
        assert!(text.contains("₹2,000.00"));
    }

    #[test]
    fn test_empty_summary() {
        assert_eq!(format_monthly("Tally", &[]), "Tally\nNo dated rows.");
    }

    #[test]
    fn test_report_names_reduction_and_mismatches() {
        let out = sample_output();
        let text = format_report(&out, 20);
        assert!(text.contains("File to Tally (20% reduction)"));
        assert!(text.contains("Reconciliation"));
        assert!(text.contains("Not matched"));
    }
}
