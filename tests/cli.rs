use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use rust_xlsxwriter::{ExcelDateTime, Format, Workbook};

const HEADER: &[&str] = &[
    "Date", "Particulars", "Voucher Type", "Voucher No.", "Voucher Ref. No.", "GSTIN/UIN",
    "Narration", "Quantity", "Rate", "Value", "CGST @9%", "SGST @9%", "IGST @18%",
    "Round Off", "Gross Total",
];

/// One intra-state GST voucher with two stock lines and its subtotal row.
fn write_daybook(path: &Path) {
    let mut wb = Workbook::new();
    let bold = Format::new().set_bold();
    let date_fmt = Format::new().set_num_format("d-mmm-yy");
    let ws = wb.add_worksheet();
    ws.write_string(0, 0, "Day Book").unwrap();
    for (col, name) in HEADER.iter().enumerate() {
        ws.write_string_with_format(2, col as u16, *name, &bold).unwrap();
    }
    let date = ExcelDateTime::from_ymd(2024, 4, 1).unwrap();
    ws.write_datetime_with_format(3, 0, &date, &date_fmt).unwrap();
    ws.write_string_with_format(3, 1, "Acme Traders", &bold).unwrap();
    ws.write_string(3, 2, "Sales").unwrap();
    ws.write_string(3, 3, "101").unwrap();
    ws.write_string(3, 5, "33AAAAA0000A1Z5").unwrap();
    ws.write_string(3, 6, "Regular GST Sale").unwrap();
    for (col, value) in [(9, 1000.0), (10, 90.0), (11, 90.0), (12, 0.0), (13, 0.0), (14, 1180.0)] {
        ws.write_number(3, col, value).unwrap();
    }
    ws.write_string(4, 1, "Widget").unwrap();
    ws.write_number(4, 7, 6.0).unwrap();
    ws.write_string(4, 8, "100/NOS").unwrap();
    ws.write_string(5, 1, "Gadget").unwrap();
    ws.write_number(5, 7, 4.0).unwrap();
    ws.write_number(5, 8, 100.0).unwrap();
    ws.write_number_with_format(6, 7, 10.0, &bold).unwrap();
    wb.save(path).unwrap();
}

fn daybook_tally(config: &Path) -> Command {
    let mut cmd = Command::cargo_bin("daybook-tally").unwrap();
    cmd.arg("--config").arg(config).env("RUST_LOG", "warn");
    cmd
}

#[test]
fn process_writes_three_workbooks() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("daybook.xlsx");
    write_daybook(&input);
    let out_dir = dir.path().join("out");

    daybook_tally(&dir.path().join("settings.json"))
        .arg("process")
        .arg(&input)
        .arg("--output-dir")
        .arg(&out_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote"))
        .stdout(predicate::str::contains("2024-04"))
        .stdout(predicate::str::contains("Total"));

    for name in ["DayBook_Cleaned.xlsx", "File_to_Tally.xlsx", "Monthly_GST_Dashboard.xlsx"] {
        assert!(out_dir.join(name).exists(), "{name} was not written");
    }
}

#[test]
fn summary_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("daybook.xlsx");
    write_daybook(&input);

    daybook_tally(&dir.path().join("settings.json"))
        .current_dir(dir.path())
        .arg("summary")
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("File to Tally (20% reduction)"));

    assert!(!dir.path().join("File_to_Tally.xlsx").exists());
}

#[test]
fn init_saves_settings_used_by_later_runs() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("settings.json");

    daybook_tally(&config)
        .args(["init", "--home-state", "27", "--reduction", "35"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Saved settings"));

    let saved = std::fs::read_to_string(&config).unwrap();
    assert!(saved.contains("\"home_state_code\": \"27\""));
    assert!(saved.contains("\"reduction_percent\": 35"));

    let input = dir.path().join("daybook.xlsx");
    write_daybook(&input);
    daybook_tally(&config)
        .arg("summary")
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("File to Tally (35% reduction)"));
}

#[test]
fn reduction_out_of_range_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    daybook_tally(&dir.path().join("settings.json"))
        .args(["summary", "whatever.xlsx", "--reduction", "101"])
        .assert()
        .failure();
}

#[test]
fn missing_header_reports_error() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("empty.xlsx");
    let mut wb = Workbook::new();
    wb.add_worksheet().write_string(0, 0, "Nothing here").unwrap();
    wb.save(&input).unwrap();

    daybook_tally(&dir.path().join("settings.json"))
        .arg("summary")
        .arg(&input)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Error: No header row"));
}

#[test]
fn malformed_home_state_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("daybook.xlsx");
    write_daybook(&input);

    daybook_tally(&dir.path().join("settings.json"))
        .arg("summary")
        .arg(&input)
        .args(["--home-state", "2"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Home state code must be two digits"));
}
