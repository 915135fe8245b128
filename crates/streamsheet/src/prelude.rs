//! Prelude module - common imports for streamsheet users
//!
//! ```rust
//! use streamsheet::prelude::*;
//! ```

pub use crate::{
    Cell, CellAddress, CellInput, CellRange, Color, FontStyle, NumberFormat, Panes,
    RichTextRun, RowOptions, StreamOptions, StreamWriter, Style, TableOptions, Workbook,
    WorkbookExt, WorkbookSettings, XlsxError, XlsxResult, XlsxWriter,
};
