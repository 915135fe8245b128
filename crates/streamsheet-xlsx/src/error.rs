//! XLSX error types

use thiserror::Error;

/// Result type for XLSX operations
pub type XlsxResult<T> = std::result::Result<T, XlsxError>;

/// Errors that can occur while streaming or packaging a workbook
#[derive(Debug, Error)]
pub enum XlsxError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// ZIP error
    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// XML error
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Core error (addresses, sheet names, registries)
    #[error("Core error: {0}")]
    Core(#[from] streamsheet_core::Error),

    /// Parse error while reading back buffered XML
    #[error("Parse error: {0}")]
    Parse(String),

    /// Rows must be written in strictly ascending order
    #[error("row {row} has already been written; rows must be written in ascending order")]
    RowOrder { row: u32 },

    /// Operation only allowed before the first row is written
    #[error("{0} must be called before the first row is written")]
    SheetDataStarted(&'static str),

    /// Column number outside 1..=16384
    #[error("column number {0} is out of range")]
    ColumnNumber(u32),

    /// Column width above the maximum
    #[error("column width {0} exceeds the maximum of 255")]
    ColumnWidth(f64),

    /// Row height above the maximum
    #[error("row height {0} exceeds the maximum of 409 points")]
    RowHeight(f64),

    /// Outline level above the maximum
    #[error("outline level {0} exceeds the maximum of 7")]
    OutlineLevel(u8),

    /// NaN or infinite number
    #[error("cannot write non-finite number {0}")]
    NonFiniteNumber(f64),

    /// Rich text longer than a cell may hold
    #[error("cell text of {0} characters exceeds the limit of 32767")]
    CellTextLength(usize),

    /// Rich text run font size above the maximum
    #[error("font size {0} exceeds the maximum of 409")]
    FontSize(f64),

    /// A stream writer may register one table
    #[error("a table has already been added to this stream")]
    TableAlreadyAdded,

    /// Table name does not follow naming rules
    #[error("invalid table name: {0}")]
    TableName(String),

    /// Table name already used in the workbook
    #[error("table name already exists: {0}")]
    DuplicateTableName(String),

    /// Worksheet stream was never flushed
    #[error("worksheet {0} is still being streamed; flush or abort it before saving")]
    StreamIncomplete(String),
}
