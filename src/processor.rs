use std::path::Path;

use crate::columns;
use crate::error::Result;
use crate::export;
use crate::models::{LineItem, RawRow, TallyLine};
use crate::reader;
use crate::reconstruct::reconstruct;
use crate::reports::{monthly_summary, MonthlySummary};
use crate::tally::{rerate, RunOptions};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunStats {
    pub groups: usize,
    pub lines: usize,
    pub mismatched_groups: usize,
    pub subtotal_rows: usize,
    pub orphan_rows: usize,
}

/// Every artifact of one run, held in memory.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessOutput {
    pub cleaned: Vec<LineItem>,
    pub tally: Vec<TallyLine>,
    pub cleaned_summary: Vec<MonthlySummary>,
    pub tally_summary: Vec<MonthlySummary>,
    pub stats: RunStats,
    pub checksum: Option<String>,
}

/// Serialized workbooks of one run.
pub struct Workbooks {
    pub cleaned: Vec<u8>,
    pub tally: Vec<u8>,
    pub dashboard: Vec<u8>,
}

/// Run the whole pipeline over rows already read from a sheet.
pub fn process_rows(rows: &[RawRow], options: &RunOptions) -> Result<ProcessOutput> {
    let roles = columns::classify(rows)?;
    let rebuilt = reconstruct(rows, &roles);
    let tally = rerate(&rebuilt.lines, options);

    let stats = RunStats {
        groups: rebuilt.groups,
        lines: rebuilt.lines.len(),
        mismatched_groups: rebuilt.mismatched_groups,
        subtotal_rows: rebuilt.subtotal_rows,
        orphan_rows: rebuilt.orphan_rows,
    };
    Ok(ProcessOutput {
        cleaned_summary: monthly_summary(&rebuilt.lines),
        tally_summary: monthly_summary(&tally),
        cleaned: rebuilt.lines,
        tally,
        stats,
        checksum: None,
    })
}

/// Read a DayBook workbook from disk and run the pipeline over its active sheet.
pub fn process_file(file_path: &Path, options: &RunOptions) -> Result<ProcessOutput> {
    let (sheet, checksum) = reader::read_file(file_path)?;
    tracing::info!(file = %file_path.display(), sheet = %sheet.name, sha256 = %checksum, "processing DayBook");
    let mut output = process_rows(&sheet.rows, options)?;
    output.checksum = Some(checksum);
    Ok(output)
}

impl ProcessOutput {
    pub fn workbooks(&self) -> Result<Workbooks> {
        Ok(Workbooks {
            cleaned: export::cleaned_workbook(&self.cleaned)?,
            tally: export::tally_workbook(&self.tally)?,
            dashboard: export::dashboard_workbook(&self.cleaned_summary, &self.tally_summary)?,
        })
    }
}
