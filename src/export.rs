use rust_xlsxwriter::{Color, DocProperties, ExcelDateTime, Format, Workbook, Worksheet};

use crate::error::Result;
use crate::models::{LedgerDate, LineItem, TallyLine, Verdict};
use crate::reports::MonthlySummary;

pub const CLEANED_SHEET: &str = "Cleaned_Data";
pub const TALLY_SHEET: &str = "File_to_Tally";
pub const DASHBOARD_CLEANED_SHEET: &str = "DayBook_Cleaned";
pub const DASHBOARD_TALLY_SHEET: &str = "File_to_Tally";

pub const CLEANED_FILE: &str = "DayBook_Cleaned.xlsx";
pub const TALLY_FILE: &str = "File_to_Tally.xlsx";
pub const DASHBOARD_FILE: &str = "Monthly_GST_Dashboard.xlsx";

pub const CLEANED_HEADERS: [&str; 21] = [
    "Date",
    "Party Name",
    "Stock Item",
    "Voucher Type",
    "Voucher No",
    "Voucher Ref No",
    "GSTIN/UIN",
    "Narration",
    "Quantity",
    "Rate",
    "UQC",
    "Taxable Value",
    "CGST",
    "SGST",
    "IGST",
    "Total Tax",
    "Round Off",
    "Tax Rate",
    "Invoice Value",
    "Result- Taxable Value",
    "Result- Invoice Value",
];

pub const TALLY_HEADERS: [&str; 15] = [
    "Date",
    "Voucher Type",
    "Voucher No",
    "Voucher Ref No",
    "Party Name",
    "GSTIN/UIN",
    "Stock Item",
    "Quantity",
    "Rate",
    "Taxable Value",
    "CGST",
    "SGST",
    "IGST",
    "Tax Rate",
    "Invoice Value",
];

pub const SUMMARY_HEADERS: [&str; 6] = ["Month", "CGST", "SGST", "IGST", "Taxable Value", "Invoice Value"];

const MATCHED_FILL: u32 = 0x90EE90;
const NOT_MATCHED_FILL: u32 = 0xFF7F7F;

/// Cell formats shared by every sheet of one workbook.
struct Formats {
    date: Format,
    matched: Format,
    not_matched: Format,
}

impl Formats {
    fn new() -> Self {
        Self {
            date: Format::new().set_num_format("yyyy-mm-dd"),
            matched: Format::new().set_background_color(Color::RGB(MATCHED_FILL)),
            not_matched: Format::new().set_background_color(Color::RGB(NOT_MATCHED_FILL)),
        }
    }

    fn verdict(&self, verdict: Verdict) -> &Format {
        match verdict {
            Verdict::Matched => &self.matched,
            Verdict::NotMatched => &self.not_matched,
        }
    }
}

// ---------------------------------------------------------------------------
// Cell helpers
// ---------------------------------------------------------------------------

fn write_headers(ws: &mut Worksheet, headers: &[&str]) -> Result<()> {
    for (col, name) in headers.iter().enumerate() {
        ws.write_string(0, col as u16, *name)?;
    }
    Ok(())
}

fn write_text(ws: &mut Worksheet, row: u32, col: u16, value: Option<&str>) -> Result<()> {
    if let Some(v) = value {
        ws.write_string(row, col, v)?;
    }
    Ok(())
}

fn write_date(ws: &mut Worksheet, row: u32, col: u16, date: Option<&LedgerDate>, formats: &Formats) -> Result<()> {
    match date {
        Some(LedgerDate::Date(d)) => {
            use chrono::Datelike;
            match ExcelDateTime::from_ymd(d.year() as u16, d.month() as u8, d.day() as u8) {
                Ok(dt) => {
                    ws.write_datetime_with_format(row, col, &dt, &formats.date)?;
                }
                // Outside Excel's date range; keep the text form.
                Err(_) => {
                    ws.write_string(row, col, d.format("%Y-%m-%d").to_string())?;
                }
            }
        }
        Some(LedgerDate::Text(s)) => {
            ws.write_string(row, col, s)?;
        }
        None => {}
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Workbooks
// ---------------------------------------------------------------------------

pub fn write_cleaned_sheet(ws: &mut Worksheet, lines: &[LineItem]) -> Result<()> {
    let formats = Formats::new();
    ws.set_name(CLEANED_SHEET)?;
    write_headers(ws, &CLEANED_HEADERS)?;

    for (i, line) in lines.iter().enumerate() {
        let row = i as u32 + 1;
        let ctx = &line.context;
        write_date(ws, row, 0, ctx.date.as_ref(), &formats)?;
        write_text(ws, row, 1, ctx.party.as_deref())?;
        write_text(ws, row, 2, line.stock_item.as_deref())?;
        write_text(ws, row, 3, ctx.voucher_type.as_deref())?;
        write_text(ws, row, 4, ctx.voucher_no.as_deref())?;
        write_text(ws, row, 5, ctx.voucher_ref.as_deref())?;
        write_text(ws, row, 6, ctx.gstin.as_deref())?;
        write_text(ws, row, 7, ctx.narration.as_deref())?;
        ws.write_number(row, 8, line.quantity)?;
        ws.write_number(row, 9, line.rate)?;
        write_text(ws, row, 10, line.uqc.as_deref())?;
        let figures = [
            line.taxable_value,
            line.cgst,
            line.sgst,
            line.igst,
            line.total_tax,
            line.round_off,
            line.tax_rate,
            line.invoice_value,
        ];
        for (offset, value) in figures.iter().enumerate() {
            ws.write_number(row, 11 + offset as u16, *value)?;
        }
        if let Some(result) = line.reconciliation {
            ws.write_string_with_format(row, 19, result.taxable.label(), formats.verdict(result.taxable))?;
            ws.write_string_with_format(row, 20, result.invoice.label(), formats.verdict(result.invoice))?;
        }
    }
    Ok(())
}

pub fn write_tally_sheet(ws: &mut Worksheet, lines: &[TallyLine]) -> Result<()> {
    let formats = Formats::new();
    ws.set_name(TALLY_SHEET)?;
    write_headers(ws, &TALLY_HEADERS)?;

    for (i, line) in lines.iter().enumerate() {
        let row = i as u32 + 1;
        write_date(ws, row, 0, line.date.as_ref(), &formats)?;
        write_text(ws, row, 1, line.voucher_type.as_deref())?;
        write_text(ws, row, 2, line.voucher_no.as_deref())?;
        write_text(ws, row, 3, line.voucher_ref.as_deref())?;
        write_text(ws, row, 4, line.party.as_deref())?;
        write_text(ws, row, 5, line.gstin.as_deref())?;
        write_text(ws, row, 6, line.stock_item.as_deref())?;
        let figures = [
            line.quantity,
            line.rate,
            line.taxable_value,
            line.cgst,
            line.sgst,
            line.igst,
            line.tax_rate,
            line.invoice_value,
        ];
        for (offset, value) in figures.iter().enumerate() {
            ws.write_number(row, 7 + offset as u16, *value)?;
        }
    }
    Ok(())
}

pub fn write_summary_sheet(ws: &mut Worksheet, name: &str, summary: &[MonthlySummary]) -> Result<()> {
    ws.set_name(name)?;
    write_headers(ws, &SUMMARY_HEADERS)?;
    for (i, m) in summary.iter().enumerate() {
        let row = i as u32 + 1;
        ws.write_string(row, 0, &m.month)?;
        for (offset, value) in [m.cgst, m.sgst, m.igst, m.taxable_value, m.invoice_value].iter().enumerate() {
            ws.write_number(row, 1 + offset as u16, *value)?;
        }
    }
    Ok(())
}

/// A workbook whose document properties carry a fixed creation time, so the
/// same ledger always serializes to the same bytes.
fn new_workbook() -> Result<Workbook> {
    let created = ExcelDateTime::from_ymd(2000, 1, 1)?;
    let mut wb = Workbook::new();
    wb.set_properties(&DocProperties::new().set_creation_datetime(&created));
    Ok(wb)
}

pub fn cleaned_workbook(lines: &[LineItem]) -> Result<Vec<u8>> {
    let mut wb = new_workbook()?;
    write_cleaned_sheet(wb.add_worksheet(), lines)?;
    Ok(wb.save_to_buffer()?)
}

pub fn tally_workbook(lines: &[TallyLine]) -> Result<Vec<u8>> {
    let mut wb = new_workbook()?;
    write_tally_sheet(wb.add_worksheet(), lines)?;
    Ok(wb.save_to_buffer()?)
}

pub fn dashboard_workbook(cleaned: &[MonthlySummary], tally: &[MonthlySummary]) -> Result<Vec<u8>> {
    let mut wb = new_workbook()?;
    write_summary_sheet(wb.add_worksheet(), DASHBOARD_CLEANED_SHEET, cleaned)?;
    write_summary_sheet(wb.add_worksheet(), DASHBOARD_TALLY_SHEET, tally)?;
    Ok(wb.save_to_buffer()?)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::rc::Rc;

    use calamine::{Data, Reader};
    use chrono::NaiveDate;

    use super::*;
    use crate::models::{GroupContext, Reconciliation};

    fn sheet_rows(bytes: Vec<u8>, sheet: &str) -> Vec<Vec<Data>> {
        let mut wb = calamine::open_workbook_auto_from_rs(Cursor::new(bytes)).unwrap();
        let range = wb.worksheet_range(sheet).unwrap();
        range.rows().map(|r| r.to_vec()).collect()
    }

    fn cleaned_line(verdict: Verdict) -> LineItem {
        LineItem {
            context: Rc::new(GroupContext {
                date: Some(LedgerDate::Date(NaiveDate::from_ymd_opt(2024, 4, 1).unwrap())),
                party: Some("Acme Traders".to_string()),
                voucher_no: Some("101".to_string()),
                narration: Some("GST sale".to_string()),
                ..Default::default()
            }),
            stock_item: Some("Widget".to_string()),
            quantity: 6.0,
            rate: 100.0,
            uqc: Some("NOS".to_string()),
            taxable_value: 600.0,
            cgst: 54.0,
            sgst: 54.0,
            igst: 0.0,
            total_tax: 108.0,
            round_off: 0.0,
            tax_rate: 18.0,
            invoice_value: 708.0,
            reconciliation: Some(Reconciliation { taxable: verdict, invoice: Verdict::NotMatched }),
        }
    }

    #[test]
    fn test_cleaned_workbook_layout() {
        let bytes = cleaned_workbook(&[cleaned_line(Verdict::Matched)]).unwrap();
        let rows = sheet_rows(bytes, CLEANED_SHEET);
        assert_eq!(rows.len(), 2);
        let header: Vec<String> = rows[0].iter().map(|c| c.to_string()).collect();
        assert_eq!(header, CLEANED_HEADERS.to_vec());
        assert_eq!(rows[1][1], Data::String("Acme Traders".to_string()));
        assert_eq!(rows[1][10], Data::String("NOS".to_string()));
        assert_eq!(rows[1][12], Data::Float(54.0));
        assert_eq!(rows[1][19], Data::String("Matched".to_string()));
        assert_eq!(rows[1][20], Data::String("Not Matched".to_string()));
        assert!(matches!(rows[1][0], Data::DateTime(_)));
    }

    #[test]
    fn test_verdict_cells_are_filled() {
        let bytes = cleaned_workbook(&[cleaned_line(Verdict::Matched)]).unwrap();
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut styles = String::new();
        std::io::Read::read_to_string(&mut archive.by_name("xl/styles.xml").unwrap(), &mut styles).unwrap();
        assert!(styles.contains("FF90EE90"));
        assert!(styles.contains("FFFF7F7F"));
    }

    #[test]
    fn test_tally_workbook_layout() {
        let line = TallyLine {
            date: Some(LedgerDate::Text("1-Apr-24".to_string())),
            voucher_type: Some("Sales".to_string()),
            voucher_no: Some("7".to_string()),
            voucher_ref: None,
            party: Some("Cash".to_string()),
            gstin: None,
            stock_item: Some("Widget".to_string()),
            quantity: 8.0,
            rate: 80.0,
            taxable_value: 640.0,
            cgst: 57.6,
            sgst: 57.6,
            igst: 0.0,
            tax_rate: 18.0,
            invoice_value: 755.2,
        };
        let rows = sheet_rows(tally_workbook(&[line]).unwrap(), TALLY_SHEET);
        let header: Vec<String> = rows[0].iter().map(|c| c.to_string()).collect();
        assert_eq!(header, TALLY_HEADERS.to_vec());
        assert_eq!(rows[1][0], Data::String("1-Apr-24".to_string()));
        assert_eq!(rows[1][4], Data::String("Cash".to_string()));
        assert_eq!(rows[1][5], Data::Empty);
        assert_eq!(rows[1][10], Data::Float(57.6));
        assert_eq!(rows[1][14], Data::Float(755.2));
    }

    #[test]
    fn test_dashboard_has_both_sheets() {
        let month = MonthlySummary {
            month: "2024-04".to_string(),
            cgst: 9.0,
            sgst: 9.0,
            igst: 0.0,
            taxable_value: 100.0,
            invoice_value: 118.0,
        };
        let bytes = dashboard_workbook(&[month.clone()], &[]).unwrap();
        let cleaned = sheet_rows(bytes.clone(), DASHBOARD_CLEANED_SHEET);
        assert_eq!(cleaned[1][0], Data::String("2024-04".to_string()));
        assert_eq!(cleaned[1][5], Data::Float(118.0));
        let tally = sheet_rows(bytes, DASHBOARD_TALLY_SHEET);
        assert_eq!(tally.len(), 1);
    }

    #[test]
    fn test_workbooks_do_not_embed_the_clock() {
        let lines = [cleaned_line(Verdict::NotMatched)];
        let first = (cleaned_workbook(&lines).unwrap(), tally_workbook(&[]).unwrap(), dashboard_workbook(&[], &[]).unwrap());
        std::thread::sleep(std::time::Duration::from_millis(1100));
        let second = (cleaned_workbook(&lines).unwrap(), tally_workbook(&[]).unwrap(), dashboard_workbook(&[], &[]).unwrap());
        assert_eq!(first.0, second.0);
        assert_eq!(first.1, second.1);
        assert_eq!(first.2, second.2);
    }
}
