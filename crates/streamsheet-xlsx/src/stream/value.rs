//! Values accepted by [`StreamWriter::write_row`](super::StreamWriter::write_row)

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use streamsheet_core::RichTextRun;

/// One input value for a streamed cell
#[derive(Debug, Clone, PartialEq)]
pub enum CellInput {
    /// Nothing is written for this column
    Null,
    Int(i64),
    UInt(u64),
    Float(f64),
    /// Written with the shortest representation of the `f32` itself
    Float32(f32),
    String(String),
    /// Raw text bytes; invalid UTF-8 is replaced
    Bytes(Vec<u8>),
    Bool(bool),
    Duration(Duration),
    DateTime(NaiveDateTime),
    RichText(Vec<RichTextRun>),
    /// A value with an explicit style and formula
    Cell(Cell),
    /// Any other value, written as its textual representation
    Display(String),
}

impl CellInput {
    /// Wrap anything printable as text
    pub fn display<T: std::fmt::Display + ?Sized>(value: &T) -> Self {
        CellInput::Display(value.to_string())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellInput::Null)
    }
}

/// A cell value with its own style id and optional formula
///
/// The style id replaces any style inherited from the row.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub style_id: u32,
    pub formula: Option<String>,
    pub value: Box<CellInput>,
}

impl Cell {
    pub fn new<V: Into<CellInput>>(value: V) -> Self {
        Self {
            style_id: 0,
            formula: None,
            value: Box::new(value.into()),
        }
    }

    /// A formula cell without a cached value
    pub fn formula<S: Into<String>>(formula: S) -> Self {
        Self {
            style_id: 0,
            formula: Some(formula.into()),
            value: Box::new(CellInput::Null),
        }
    }

    pub fn with_style(mut self, style_id: u32) -> Self {
        self.style_id = style_id;
        self
    }

    pub fn with_formula<S: Into<String>>(mut self, formula: S) -> Self {
        self.formula = Some(formula.into());
        self
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            style_id: 0,
            formula: None,
            value: Box::new(CellInput::Null),
        }
    }
}

macro_rules! from_signed {
    ($($t:ty),*) => {
        $(impl From<$t> for CellInput {
            fn from(v: $t) -> Self {
                CellInput::Int(v as i64)
            }
        })*
    };
}

macro_rules! from_unsigned {
    ($($t:ty),*) => {
        $(impl From<$t> for CellInput {
            fn from(v: $t) -> Self {
                CellInput::UInt(v as u64)
            }
        })*
    };
}

from_signed!(i8, i16, i32, i64, isize);
from_unsigned!(u8, u16, u32, u64, usize);

impl From<f64> for CellInput {
    fn from(v: f64) -> Self {
        CellInput::Float(v)
    }
}

impl From<f32> for CellInput {
    fn from(v: f32) -> Self {
        CellInput::Float32(v)
    }
}

impl From<bool> for CellInput {
    fn from(v: bool) -> Self {
        CellInput::Bool(v)
    }
}

impl From<&str> for CellInput {
    fn from(v: &str) -> Self {
        CellInput::String(v.to_string())
    }
}

impl From<String> for CellInput {
    fn from(v: String) -> Self {
        CellInput::String(v)
    }
}

impl From<&String> for CellInput {
    fn from(v: &String) -> Self {
        CellInput::String(v.clone())
    }
}

impl From<Vec<u8>> for CellInput {
    fn from(v: Vec<u8>) -> Self {
        CellInput::Bytes(v)
    }
}

impl From<&[u8]> for CellInput {
    fn from(v: &[u8]) -> Self {
        CellInput::Bytes(v.to_vec())
    }
}

impl From<Duration> for CellInput {
    fn from(v: Duration) -> Self {
        CellInput::Duration(v)
    }
}

impl From<NaiveDateTime> for CellInput {
    fn from(v: NaiveDateTime) -> Self {
        CellInput::DateTime(v)
    }
}

impl From<NaiveDate> for CellInput {
    fn from(v: NaiveDate) -> Self {
        CellInput::DateTime(v.and_time(NaiveTime::default()))
    }
}

/// Zoned timestamps are written as their local wall-clock time
impl<Tz: TimeZone> From<DateTime<Tz>> for CellInput {
    fn from(v: DateTime<Tz>) -> Self {
        CellInput::DateTime(v.naive_local())
    }
}

impl From<Vec<RichTextRun>> for CellInput {
    fn from(v: Vec<RichTextRun>) -> Self {
        CellInput::RichText(v)
    }
}

impl From<Cell> for CellInput {
    fn from(v: Cell) -> Self {
        CellInput::Cell(v)
    }
}

impl<T: Into<CellInput>> From<Option<T>> for CellInput {
    fn from(v: Option<T>) -> Self {
        v.map_or(CellInput::Null, Into::into)
    }
}

impl From<()> for CellInput {
    fn from(_: ()) -> Self {
        CellInput::Null
    }
}
