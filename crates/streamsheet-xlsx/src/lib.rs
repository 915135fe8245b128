//! # streamsheet-xlsx
//!
//! Streaming worksheet writer and XLSX packaging for streamsheet.
//!
//! [`StreamWriter`] produces one worksheet part row by row, spilling to a
//! temporary file once the buffered XML grows past a threshold.
//! [`XlsxWriter`] packages a [`Workbook`](streamsheet_core::Workbook),
//! including finished streams, into a `.xlsx` archive.

pub mod error;
pub mod sections;
pub mod stream;
pub mod writer;

mod styles;
mod xml;

pub use error::{XlsxError, XlsxResult};
pub use stream::{Cell, CellInput, RowOptions, StreamOptions, StreamWriter, TableOptions};
pub use writer::XlsxWriter;
