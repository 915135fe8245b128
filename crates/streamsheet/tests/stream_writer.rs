//! End-to-end tests for streaming a worksheet and packaging the workbook

use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use std::io::{Cursor, Read};
use streamsheet::prelude::*;
use streamsheet::{Error, SheetSection};

const SHEET1: &str = "xl/worksheets/sheet1.xml";

fn sheet_xml(workbook: &Workbook, path: &str) -> String {
    let bytes = workbook.part(path).unwrap().to_vec().unwrap();
    String::from_utf8(bytes).unwrap()
}

fn sheet_data(xml: &str) -> &str {
    let start = xml.find("<sheetData>").unwrap() + "<sheetData>".len();
    let end = xml.find("</sheetData>").unwrap();
    &xml[start..end]
}

#[test]
fn test_basic_scenario() {
    let mut workbook = Workbook::new();
    let mut stream = workbook.stream_writer("Sheet1").unwrap();
    stream
        .write_row("A1", [Cell::new("Data")], None)
        .unwrap();
    stream
        .write_row("A2", [1, 2, 3], Some(RowOptions::new().height(20.0)))
        .unwrap();
    stream.flush().unwrap();

    let xml = sheet_xml(&workbook, SHEET1);
    assert_eq!(xml.matches("<row r=\"1\">").count(), 1);
    assert_eq!(xml.matches("<row r=\"2\" ht=\"20\" customHeight=\"1\">").count(), 1);
    assert_eq!(xml.matches("<sheetData>").count(), 1);
    assert_eq!(xml.matches("</worksheet>").count(), 1);
    assert!(xml.ends_with("</worksheet>"));
    assert_eq!(
        sheet_data(&xml),
        concat!(
            "<row r=\"1\"><c r=\"A1\" t=\"str\"><v>Data</v></c></row>",
            "<row r=\"2\" ht=\"20\" customHeight=\"1\">",
            "<c r=\"A2\"><v>1</v></c><c r=\"B2\"><v>2</v></c><c r=\"C2\"><v>3</v></c></row>"
        )
    );
    assert!(!workbook.is_streaming(SHEET1));
}

#[test]
fn test_document_layout() {
    let mut workbook = Workbook::new();
    {
        let ws = workbook.worksheet_mut(0).unwrap();
        ws.set_raw_section(SheetSection::HeaderFooter, "<headerFooter><oddHeader>Top</oddHeader></headerFooter>");
    }
    let mut stream = workbook.stream_writer("Sheet1").unwrap();
    stream.set_column_width(2, 1, 12.5).unwrap();
    stream.set_panes(Panes::freeze(1, 0)).unwrap();
    stream.write_row("A1", ["a"], None).unwrap();
    stream.merge_cell("B3", "A2").unwrap();
    stream.insert_page_break("A10").unwrap();
    stream.flush().unwrap();

    let xml = sheet_xml(&workbook, SHEET1);
    let order = [
        "<worksheet ",
        "<sheetViews>",
        "<cols><col min=\"1\" max=\"2\" width=\"12.5\" customWidth=\"1\"/></cols>",
        "<sheetData>",
        "</sheetData>",
        "<mergeCells count=\"1\"><mergeCell ref=\"A2:B3\"/></mergeCells>",
        "<headerFooter>",
        "<rowBreaks count=\"1\" manualBreakCount=\"1\"><brk id=\"9\" max=\"16383\" man=\"1\"/></rowBreaks>",
        "</worksheet>",
    ];
    let positions: Vec<usize> = order.iter().map(|s| xml.find(s).unwrap()).collect();
    let mut sorted = positions.clone();
    sorted.sort_unstable();
    assert_eq!(positions, sorted);
    assert!(xml.contains("state=\"frozen\""));
}

#[test]
fn test_null_values_are_skipped() {
    let mut workbook = Workbook::new();
    let mut stream = workbook.stream_writer("Sheet1").unwrap();
    stream
        .write_row("A1", [Some(1), None, Some(3)], None)
        .unwrap();
    stream.flush().unwrap();

    let xml = sheet_xml(&workbook, SHEET1);
    assert_eq!(
        sheet_data(&xml),
        "<row r=\"1\"><c r=\"A1\"><v>1</v></c><c r=\"C1\"><v>3</v></c></row>"
    );
    assert!(!xml.contains("r=\"B1\""));
}

#[test]
fn test_rows_must_ascend() {
    let mut workbook = Workbook::new();
    let mut stream = workbook.stream_writer("Sheet1").unwrap();
    stream.write_row("A2", [1], None).unwrap();
    let before = stream.bytes_written();

    for cell in ["A2", "A1"] {
        let err = stream.write_row(cell, [9], None).unwrap_err();
        assert!(matches!(err, XlsxError::RowOrder { .. }));
    }
    assert_eq!(stream.bytes_written(), before);
    assert_eq!(stream.last_row(), 2);

    stream.write_row("A3", [1], None).unwrap();
    stream.flush().unwrap();
}

#[test]
fn test_rejected_row_options_keep_cursor() {
    let mut workbook = Workbook::new();
    let mut stream = workbook.stream_writer("Sheet1").unwrap();
    let err = stream
        .write_row("A1", [1], Some(RowOptions::new().height(500.0)))
        .unwrap_err();
    assert!(matches!(err, XlsxError::RowHeight(_)));
    let err = stream
        .write_row("A1", [1], Some(RowOptions::new().outline_level(8)))
        .unwrap_err();
    assert!(matches!(err, XlsxError::OutlineLevel(8)));

    stream.write_row("A1", [1], None).unwrap();
    stream.flush().unwrap();
}

#[test]
fn test_encoding_error_closes_row() {
    let mut workbook = Workbook::new();
    let mut stream = workbook.stream_writer("Sheet1").unwrap();
    let err = stream
        .write_row("A1", [CellInput::from(1), CellInput::Float(f64::NAN)], None)
        .unwrap_err();
    assert!(matches!(err, XlsxError::NonFiniteNumber(_)));
    stream.write_row("A2", [2], None).unwrap();
    stream.flush().unwrap();

    let xml = sheet_xml(&workbook, SHEET1);
    assert_eq!(
        sheet_data(&xml),
        "<row r=\"1\"><c r=\"A1\"><v>1</v></c></row><row r=\"2\"><c r=\"A2\"><v>2</v></c></row>"
    );
}

#[test]
fn test_setup_after_first_row_fails() {
    let mut workbook = Workbook::new();
    let mut stream = workbook.stream_writer("Sheet1").unwrap();
    assert!(matches!(
        stream.set_column_width(0, 1, 10.0),
        Err(XlsxError::ColumnNumber(0))
    ));
    assert!(matches!(
        stream.set_column_width(1, 16_385, 10.0),
        Err(XlsxError::ColumnNumber(16_385))
    ));
    assert!(matches!(
        stream.set_column_width(1, 1, 256.0),
        Err(XlsxError::ColumnWidth(_))
    ));

    stream.write_row("A1", [1], None).unwrap();
    assert!(matches!(
        stream.set_column_width(1, 1, 10.0),
        Err(XlsxError::SheetDataStarted(_))
    ));
    assert!(matches!(
        stream.set_panes(Panes::freeze(1, 1)),
        Err(XlsxError::SheetDataStarted(_))
    ));
    stream.flush().unwrap();
}

#[test]
fn test_flush_without_rows() {
    let mut workbook = Workbook::new();
    let stream = workbook.stream_writer("Sheet1").unwrap();
    stream.flush().unwrap();

    let xml = sheet_xml(&workbook, SHEET1);
    assert!(xml.contains("<sheetData></sheetData>"));
    assert!(xml.ends_with("</worksheet>"));
}

#[test]
fn test_merge_count_matches_calls() {
    let mut workbook = Workbook::new();
    let mut stream = workbook.stream_writer("Sheet1").unwrap();
    for row in 1..=5 {
        stream.merge_cell(&format!("A{}", row), &format!("C{}", row)).unwrap();
    }
    assert!(stream.merge_cell("A0", "B1").is_err());
    stream.flush().unwrap();

    let xml = sheet_xml(&workbook, SHEET1);
    assert!(xml.contains("<mergeCells count=\"5\">"));
    assert_eq!(xml.matches("<mergeCell ref=").count(), 5);
}

#[test]
fn test_writer_creation_errors() {
    let mut workbook = Workbook::new();
    assert!(matches!(
        workbook.stream_writer("Missing").unwrap_err(),
        XlsxError::Core(Error::SheetNotFound(_))
    ));
    assert!(matches!(
        workbook.stream_writer("Bad[name]").unwrap_err(),
        XlsxError::Core(Error::InvalidSheetName(_))
    ));

    let stream = workbook.stream_writer("Sheet1").unwrap();
    drop(stream);
    assert!(matches!(
        workbook.stream_writer("Sheet1").unwrap_err(),
        XlsxError::Core(Error::StreamActive(_))
    ));
    assert!(workbook.cancel_stream(SHEET1));
    workbook.stream_writer("Sheet1").unwrap().flush().unwrap();
}

#[test]
fn test_abort_discards_stream() {
    let mut workbook = Workbook::new();
    let mut stream = workbook.stream_writer("Sheet1").unwrap();
    stream.write_row("A1", ["gone"], None).unwrap();
    stream.abort().unwrap();

    assert!(!workbook.is_streaming(SHEET1));
    assert!(workbook.part(SHEET1).is_none());

    let mut out = Cursor::new(Vec::new());
    workbook.save_to(&mut out).unwrap();
}

#[test]
fn test_row_style_and_dates() {
    let mut workbook = Workbook::new();
    let highlight = workbook.add_style(Style::new().fill_color(Color::YELLOW));
    let when = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();

    let mut stream = workbook.stream_writer("Sheet1").unwrap();
    stream
        .write_row(
            "B1",
            [
                CellInput::from("x"),
                CellInput::from(Cell::new(2).with_style(0)),
            ],
            Some(RowOptions::new().style_id(highlight).hidden(true)),
        )
        .unwrap();
    stream.write_row("A2", [when], None).unwrap();
    stream.flush().unwrap();

    let xml = sheet_xml(&workbook, SHEET1);
    assert_eq!(
        sheet_data(&xml),
        concat!(
            "<row r=\"1\" s=\"1\" customFormat=\"1\" hidden=\"1\">",
            "<c r=\"B1\" s=\"1\" t=\"str\"><v>x</v></c><c r=\"C1\"><v>2</v></c></row>",
            "<row r=\"2\"><c r=\"A2\" s=\"2\"><v>44927</v></c></row>"
        )
    );
    assert_eq!(
        workbook.style(2).unwrap().number_format,
        NumberFormat::BuiltIn(22)
    );
}

#[test]
fn test_1904_date_system() {
    let mut workbook = Workbook::new();
    workbook.settings_mut().date_1904 = true;
    let when = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();

    let mut stream = workbook.stream_writer("Sheet1").unwrap();
    stream.write_row("A1", [when], None).unwrap();
    stream.flush().unwrap();

    let xml = sheet_xml(&workbook, SHEET1);
    assert!(xml.contains("<c r=\"A1\" s=\"1\"><v>43465</v></c>"));
}

#[test]
fn test_two_sheets_stream_one_after_another() {
    let mut workbook = Workbook::new();
    workbook.add_worksheet_with_name("Second").unwrap();

    let mut first = workbook.stream_writer("Sheet1").unwrap();
    first.write_row("A1", ["one"], None).unwrap();
    first.flush().unwrap();

    let mut second = workbook.stream_writer("second").unwrap();
    second.write_row("A1", ["two"], None).unwrap();
    second.flush().unwrap();

    let mut out = Cursor::new(Vec::new());
    workbook.save_to(&mut out).unwrap();

    let mut archive = zip::ZipArchive::new(Cursor::new(out.into_inner())).unwrap();
    let mut xml = String::new();
    archive
        .by_name("xl/worksheets/sheet2.xml")
        .unwrap()
        .read_to_string(&mut xml)
        .unwrap();
    assert!(xml.contains("<v>two</v>"));
}

#[test]
fn test_save_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("streamed.xlsx");

    let mut workbook = Workbook::new();
    let mut stream = workbook.stream_writer("Sheet1").unwrap();
    stream.write_row("A1", ["saved"], None).unwrap();
    stream.flush().unwrap();
    workbook.save(&path).unwrap();

    assert!(path.exists());
    assert!(workbook.save(dir.path().join("out.ods")).is_err());
}
