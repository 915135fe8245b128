//! # streamsheet-core
//!
//! Document model for the streamsheet workbook writer.
//!
//! This crate holds everything the streaming worksheet writer needs from the
//! surrounding document:
//! - [`CellAddress`] and [`CellRange`] - A1-style addressing
//! - [`Style`] and [`StylePool`] - workbook-wide, deduplicated cell styles
//! - [`SharedStrings`] - the shared string table
//! - [`Workbook`] - sheets, settings, package parts, relationships and the
//!   registry of sheets that are currently being streamed
//! - [`Worksheet`] - the structural snapshot of a sheet (views, breaks,
//!   protection, page layout) serialized around streamed row data
//!
//! ## Example
//!
//! ```rust
//! use streamsheet_core::{Style, Workbook};
//!
//! let mut workbook = Workbook::new();
//! workbook.add_worksheet_with_name("Data").unwrap();
//!
//! let bold = workbook.add_style(Style::new().bold(true));
//! assert_eq!(bold, 1);
//! assert_eq!(workbook.sheet_path(1).unwrap(), "xl/worksheets/sheet2.xml");
//! ```

pub mod cell;
pub mod error;
pub mod package;
pub mod style;
pub mod workbook;
pub mod worksheet;

pub use cell::{
    datetime_to_serial, duration_to_serial, serial_to_datetime, CellAddress, CellRange,
    RichTextRun, SharedStrings,
};
pub use error::{Error, Result};
pub use package::{ContentTypeOverride, Part, PartSource, Relationship};
pub use workbook::{check_sheet_name, TableEntry, Workbook, WorkbookSettings};
pub use worksheet::{
    Break, PageMargins, PageOrientation, PageSetup, PaneState, Panes, PrintOptions, Selection,
    SheetFormat, SheetProtection, SheetSection, SheetView, Worksheet,
};

pub use style::{
    Alignment, Color, FillStyle, FontStyle, FontVerticalAlign, HorizontalAlignment, NumberFormat,
    PatternType, Style, StylePool, Underline, VerticalAlignment,
};

/// Maximum number of rows in a worksheet (Excel limit)
pub const MAX_ROWS: u32 = 1_048_576;

/// Maximum number of columns in a worksheet (Excel limit)
pub const MAX_COLS: u16 = 16_384;

/// Maximum length of a sheet name
pub const MAX_SHEET_NAME_LEN: usize = 31;
