//! # streamsheet
//!
//! Write Excel worksheets with hundreds of thousands of rows without holding
//! them in memory.
//!
//! A [`StreamWriter`] appends rows to a worksheet part that lives in memory
//! until it grows past a threshold and then continues in a temporary file.
//! Once flushed, the part is stored in the [`Workbook`] and packaged by
//! [`XlsxWriter`] together with styles, shared strings and tables.
//!
//! ## Example
//!
//! ```rust
//! use streamsheet::prelude::*;
//!
//! let mut workbook = Workbook::new();
//! let bold = workbook.add_style(Style::new().bold(true));
//!
//! let mut stream = workbook.stream_writer("Sheet1").unwrap();
//! stream.set_panes(Panes::freeze(1, 0)).unwrap();
//! stream
//!     .write_row("A1", ["Name", "Score"], Some(RowOptions::new().style_id(bold)))
//!     .unwrap();
//! stream
//!     .write_row("A2", [CellInput::from("Ann"), CellInput::from(91.5)], None)
//!     .unwrap();
//! stream.add_table(TableOptions::new("A1:B2").name("Scores")).unwrap();
//! stream.flush().unwrap();
//!
//! let mut bytes = std::io::Cursor::new(Vec::new());
//! workbook.save_to(&mut bytes).unwrap();
//! ```

pub mod prelude;

pub use streamsheet_core::{
    datetime_to_serial, duration_to_serial, serial_to_datetime, Alignment, CellAddress,
    CellRange, Color, Error, FillStyle, FontStyle, FontVerticalAlign, HorizontalAlignment,
    NumberFormat, PageMargins, PageOrientation, PageSetup, PaneState, Panes, Part, PatternType,
    PrintOptions, Result, RichTextRun, Selection, SheetFormat, SheetProtection, SheetSection,
    SheetView, Style, StylePool, Underline, VerticalAlignment, Workbook, WorkbookSettings,
    Worksheet, MAX_COLS, MAX_ROWS, MAX_SHEET_NAME_LEN,
};

pub use streamsheet_xlsx::stream::{
    MAX_CELL_CHARS, MAX_COLUMN_WIDTH, MAX_FONT_SIZE, MAX_OUTLINE_LEVEL, MAX_ROW_HEIGHT,
    MAX_TABLE_NAME_LEN,
};
pub use streamsheet_xlsx::{
    Cell, CellInput, RowOptions, StreamOptions, StreamWriter, TableOptions, XlsxError,
    XlsxResult, XlsxWriter,
};

use std::io::{Seek, Write};
use std::path::Path;

/// Extension trait for Workbook to add streaming and file output
pub trait WorkbookExt {
    /// Save the workbook to an `.xlsx` file
    fn save<P: AsRef<Path>>(&self, path: P) -> Result<()>;

    /// Write the workbook as `.xlsx` into any seekable writer
    fn save_to<W: Write + Seek>(&self, writer: W) -> XlsxResult<()>;

    /// Start streaming the named sheet with default options
    fn stream_writer(&mut self, sheet: &str) -> XlsxResult<StreamWriter<'_>>;

    /// Start streaming the named sheet
    fn stream_writer_with_options(
        &mut self,
        sheet: &str,
        options: StreamOptions,
    ) -> XlsxResult<StreamWriter<'_>>;
}

impl WorkbookExt for Workbook {
    fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());

        match extension.as_deref() {
            Some("xlsx") => {
                XlsxWriter::write_file(self, path).map_err(|e| Error::other(e.to_string()))
            }
            _ => Err(Error::other(format!(
                "Unsupported file format: {}",
                path.display()
            ))),
        }
    }

    fn save_to<W: Write + Seek>(&self, writer: W) -> XlsxResult<()> {
        XlsxWriter::write(self, writer)
    }

    fn stream_writer(&mut self, sheet: &str) -> XlsxResult<StreamWriter<'_>> {
        StreamWriter::new(self, sheet)
    }

    fn stream_writer_with_options(
        &mut self,
        sheet: &str,
        options: StreamOptions,
    ) -> XlsxResult<StreamWriter<'_>> {
        StreamWriter::with_options(self, sheet, options)
    }
}
