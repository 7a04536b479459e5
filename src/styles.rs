use std::collections::{HashMap, HashSet};
use std::io::{Read, Seek};

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use zip::ZipArchive;

use crate::error::{DaybookError, Result};

/// The sheet a reader should treat as the active one.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveSheet {
    pub name: String,
    /// Archive path of the worksheet part, e.g. `xl/worksheets/sheet1.xml`.
    pub part: String,
}

/// Zero-based (row, column) coordinates of every bold cell in a sheet.
pub type BoldCells = HashSet<(u32, u32)>;

fn read_part<R: Read + Seek>(archive: &mut ZipArchive<R>, name: &str) -> Result<Option<String>> {
    let mut file = match archive.by_name(name) {
        Ok(f) => f,
        Err(zip::result::ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let mut xml = String::new();
    file.read_to_string(&mut xml)?;
    Ok(Some(xml))
}

fn attr(e: &BytesStart, key: &[u8]) -> Result<Option<String>> {
    for a in e.attributes().flatten() {
        if a.key.local_name().as_ref() == key {
            let value = a
                .unescape_value()
                .map_err(|err| DaybookError::Workbook(format!("bad attribute value: {err}")))?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

/// Resolve the active worksheet from `xl/workbook.xml` and its relationships.
pub fn active_sheet<R: Read + Seek>(archive: &mut ZipArchive<R>) -> Result<ActiveSheet> {
    let workbook = read_part(archive, "xl/workbook.xml")?
        .ok_or_else(|| DaybookError::Workbook("xl/workbook.xml is missing".to_string()))?;

    let mut active_tab = 0usize;
    let mut sheets: Vec<(String, String)> = Vec::new();
    let mut reader = Reader::from_str(&workbook);
    loop {
        match reader.read_event()? {
            Event::Start(ref e) | Event::Empty(ref e) => match e.local_name().as_ref() {
                b"workbookView" => {
                    if let Some(tab) = attr(e, b"activeTab")? {
                        active_tab = tab.parse().unwrap_or(0);
                    }
                }
                b"sheet" => {
                    let name = attr(e, b"name")?.unwrap_or_default();
                    let rel_id = attr(e, b"id")?.unwrap_or_default();
                    sheets.push((name, rel_id));
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    let (name, rel_id) = sheets
        .get(active_tab)
        .or_else(|| sheets.first())
        .cloned()
        .ok_or_else(|| DaybookError::Workbook("workbook has no sheets".to_string()))?;

    let rels = read_part(archive, "xl/_rels/workbook.xml.rels")?.unwrap_or_default();
    let mut targets: HashMap<String, String> = HashMap::new();
    let mut reader = Reader::from_str(&rels);
    loop {
        match reader.read_event()? {
            Event::Start(ref e) | Event::Empty(ref e) if e.local_name().as_ref() == b"Relationship" => {
                if let (Some(id), Some(target)) = (attr(e, b"Id")?, attr(e, b"Target")?) {
                    targets.insert(id, target);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    let target = targets
        .get(&rel_id)
        .ok_or_else(|| DaybookError::Workbook(format!("no worksheet part for sheet '{name}'")))?;
    let part = match target.strip_prefix('/') {
        Some(absolute) => absolute.to_string(),
        None => format!("xl/{target}"),
    };
    Ok(ActiveSheet { name, part })
}

/// Parse `xl/styles.xml` into one flag per `cellXfs` entry: true when the
/// entry's font is bold.
pub fn bold_formats(styles_xml: &str) -> Result<Vec<bool>> {
    let mut fonts: Vec<bool> = Vec::new();
    let mut xf_fonts: Vec<usize> = Vec::new();
    let mut in_fonts = false;
    let mut in_font = false;
    let mut in_cell_xfs = false;

    let mut reader = Reader::from_str(styles_xml);
    loop {
        let event = reader.read_event()?;
        let is_start = matches!(event, Event::Start(_));
        match event {
            Event::Start(ref e) | Event::Empty(ref e) => match e.local_name().as_ref() {
                b"fonts" => in_fonts = is_start,
                b"cellXfs" => in_cell_xfs = is_start,
                b"font" if in_fonts => {
                    fonts.push(false);
                    in_font = is_start;
                }
                b"b" if in_font => {
                    let on = !matches!(attr(e, b"val")?.as_deref(), Some("0") | Some("false"));
                    if let Some(last) = fonts.last_mut() {
                        *last = on;
                    }
                }
                b"xf" if in_cell_xfs => {
                    let font_id = attr(e, b"fontId")?.and_then(|v| v.parse().ok()).unwrap_or(0);
                    xf_fonts.push(font_id);
                }
                _ => {}
            },
            Event::End(ref e) => match e.local_name().as_ref() {
                b"fonts" => in_fonts = false,
                b"font" => in_font = false,
                b"cellXfs" => in_cell_xfs = false,
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(xf_fonts
        .into_iter()
        .map(|font| fonts.get(font).copied().unwrap_or(false))
        .collect())
}

/// Split an A1-style reference into zero-based (row, column).
pub fn parse_cell_ref(reference: &str) -> Option<(u32, u32)> {
    let split = reference.find(|c: char| c.is_ascii_digit())?;
    let (letters, digits) = reference.split_at(split);
    if letters.is_empty() {
        return None;
    }
    let mut col: u32 = 0;
    for c in letters.chars() {
        if !c.is_ascii_alphabetic() {
            return None;
        }
        col = col * 26 + (c.to_ascii_uppercase() as u32 - 'A' as u32 + 1);
    }
    let row: u32 = digits.parse().ok()?;
    if row == 0 {
        return None;
    }
    Some((row - 1, col - 1))
}

/// Collect the coordinates of every cell whose style index is bold.
pub fn bold_cells(sheet_xml: &str, bold_xfs: &[bool]) -> Result<BoldCells> {
    let mut cells = BoldCells::new();
    let mut row: u32 = 0;
    let mut next_col: u32 = 0;
    let mut seen_row = false;

    let mut reader = Reader::from_str(sheet_xml);
    loop {
        match reader.read_event()? {
            Event::Start(ref e) | Event::Empty(ref e) => match e.local_name().as_ref() {
                b"row" => {
                    row = match attr(e, b"r")?.and_then(|r| r.parse::<u32>().ok()) {
                        Some(r) if r > 0 => r - 1,
                        _ if seen_row => row + 1,
                        _ => 0,
                    };
                    seen_row = true;
                    next_col = 0;
                }
                b"c" => {
                    let (r, c) = match attr(e, b"r")?.as_deref().and_then(parse_cell_ref) {
                        Some(pos) => pos,
                        None => (row, next_col),
                    };
                    next_col = c + 1;
                    let style: usize = attr(e, b"s")?.and_then(|s| s.parse().ok()).unwrap_or(0);
                    if bold_xfs.get(style).copied().unwrap_or(false) {
                        cells.insert((r, c));
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(cells)
}

/// Bold cells of the active sheet of an xlsx archive. calamine exposes values
/// only, so fonts are resolved from the parts: worksheet `<c s="..">` →
/// `cellXfs` entry → `fonts` entry → `<b/>`.
pub fn read_bold_cells<R: Read + Seek>(archive: &mut ZipArchive<R>, sheet: &ActiveSheet) -> Result<BoldCells> {
    let Some(styles) = read_part(archive, "xl/styles.xml")? else {
        return Ok(BoldCells::new());
    };
    let bold_xfs = bold_formats(&styles)?;
    let sheet_xml = read_part(archive, &sheet.part)?
        .ok_or_else(|| DaybookError::Workbook(format!("worksheet part {} is missing", sheet.part)))?;
    bold_cells(&sheet_xml, &bold_xfs)
}
