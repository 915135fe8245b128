//! Cell-level building blocks
//!
//! - [`CellAddress`] / [`CellRange`] - A1-style locations
//! - [`SharedStrings`] - the workbook's shared string table
//! - [`RichTextRun`] - one formatted run of an inline rich string
//! - [`datetime_to_serial`] / [`serial_to_datetime`] - date serial numbers

mod address;
mod datetime;
mod rich_text;
mod shared_strings;

pub use address::{CellAddress, CellRange};
pub use datetime::{datetime_to_serial, duration_to_serial, serial_to_datetime};
pub use rich_text::RichTextRun;
pub use shared_strings::SharedStrings;
