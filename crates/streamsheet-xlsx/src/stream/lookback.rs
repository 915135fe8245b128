//! Reading back a row that was already streamed into the buffer

use std::io::BufRead;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use streamsheet_core::{CellAddress, Workbook};

use crate::error::{XlsxError, XlsxResult};

/// A `<c>` element decoded from the buffer
#[derive(Debug, Default)]
struct RawCell {
    reference: Option<String>,
    cell_type: Option<String>,
    style: u32,
    value: String,
    inline: String,
}

/// Scan `reader` for row `row` (1-based) and return the display text of
/// `width` cells starting at column `first_col` (0-based).
///
/// Positions without a `<c>` element come back as empty strings. A row that
/// was never written yields an empty vector.
pub(crate) fn read_row<R: BufRead>(
    reader: R,
    workbook: &Workbook,
    row: u32,
    first_col: u16,
    width: usize,
) -> XlsxResult<Vec<String>> {
    let mut xml_reader = Reader::from_reader(reader);
    xml_reader.trim_text(false);

    let mut buf = Vec::new();
    let mut found = false;
    let mut values = Vec::new();
    let mut cell: Option<RawCell> = None;
    let mut in_value = false;
    let mut in_inline_text = false;

    loop {
        match xml_reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"row" if !found => {
                    if row_number(&e)? == Some(row) {
                        found = true;
                        values = vec![String::new(); width];
                    }
                }
                b"c" if found => cell = Some(cell_attrs(&e)?),
                b"v" if cell.is_some() => in_value = true,
                b"t" if cell.is_some() => in_inline_text = true,
                _ => {}
            },
            Ok(Event::Empty(e)) => match e.name().as_ref() {
                b"row" if !found => {
                    if row_number(&e)? == Some(row) {
                        return Ok(vec![String::new(); width]);
                    }
                }
                b"c" if found => {
                    let raw = cell_attrs(&e)?;
                    place(workbook, raw, first_col, &mut values)?;
                }
                _ => {}
            },
            Ok(Event::Text(e)) if in_value || in_inline_text => {
                let text = e.unescape()?;
                if let Some(cell) = cell.as_mut() {
                    if in_value {
                        cell.value.push_str(&text);
                    } else {
                        cell.inline.push_str(&text);
                    }
                }
            }
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"v" => in_value = false,
                b"t" => in_inline_text = false,
                b"c" => {
                    if let Some(raw) = cell.take() {
                        place(workbook, raw, first_col, &mut values)?;
                    }
                }
                b"row" if found => return Ok(values),
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(e.into()),
            _ => {}
        }
        buf.clear();
    }

    Ok(values)
}

fn row_number(e: &BytesStart<'_>) -> XlsxResult<Option<u32>> {
    for attr in e.attributes().flatten() {
        if attr.key.as_ref() == b"r" {
            let value = attr.unescape_value()?;
            return value
                .parse::<u32>()
                .map(Some)
                .map_err(|_| XlsxError::Parse(format!("invalid row number: {}", value)));
        }
    }
    Ok(None)
}

fn cell_attrs(e: &BytesStart<'_>) -> XlsxResult<RawCell> {
    let mut cell = RawCell::default();
    for attr in e.attributes().flatten() {
        match attr.key.as_ref() {
            b"r" => cell.reference = Some(attr.unescape_value()?.into_owned()),
            b"t" => cell.cell_type = Some(attr.unescape_value()?.into_owned()),
            b"s" => {
                let value = attr.unescape_value()?;
                cell.style = value
                    .parse()
                    .map_err(|_| XlsxError::Parse(format!("invalid style id: {}", value)))?;
            }
            _ => {}
        }
    }
    Ok(cell)
}

fn place(workbook: &Workbook, raw: RawCell, first_col: u16, values: &mut [String]) -> XlsxResult<()> {
    let Some(reference) = raw.reference.as_deref() else {
        return Ok(());
    };
    let col = CellAddress::parse(reference)?.col;
    let Some(offset) = col.checked_sub(first_col) else {
        return Ok(());
    };
    if let Some(slot) = values.get_mut(offset as usize) {
        *slot = display_value(workbook, &raw)?;
    }
    Ok(())
}

/// Text a reader would show for the cell
fn display_value(workbook: &Workbook, raw: &RawCell) -> XlsxResult<String> {
    match raw.cell_type.as_deref() {
        Some("s") => {
            let index: u32 = raw
                .value
                .trim()
                .parse()
                .map_err(|_| XlsxError::Parse(format!("invalid shared string index: {}", raw.value)))?;
            workbook
                .shared_strings()
                .get(index)
                .map(str::to_string)
                .ok_or_else(|| XlsxError::Parse(format!("shared string {} does not exist", index)))
        }
        Some("inlineStr") => Ok(raw.inline.clone()),
        Some("b") => Ok(if raw.value.trim() == "1" { "TRUE" } else { "FALSE" }.to_string()),
        Some("str") | Some("e") | Some("d") => Ok(raw.value.clone()),
        _ => {
            let Ok(number) = raw.value.trim().parse::<f64>() else {
                return Ok(raw.value.clone());
            };
            let format = workbook
                .style(raw.style)
                .map(|style| style.number_format.clone())
                .unwrap_or_default();
            Ok(format.format_value(number, workbook.settings().date_1904))
        }
    }
}
