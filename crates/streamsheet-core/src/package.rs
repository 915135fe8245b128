//! Package-level bookkeeping: parts, relationships and content types
//!
//! A workbook keeps every part that does not come from its own model (for
//! example a streamed worksheet or a table definition) in a path-keyed map.
//! The packaging writer copies those parts into the archive verbatim.

use std::fmt;
use std::io::{self, Write};

/// A part whose bytes live outside the workbook, e.g. in a temporary file
pub trait PartSource: Send + fmt::Debug {
    /// Copy the complete part into `out`, returning the number of bytes written
    fn write_to(&self, out: &mut dyn Write) -> io::Result<u64>;

    /// Total size of the part in bytes
    fn len(&self) -> u64;

    /// True when the part is empty
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The content of one package part
#[derive(Debug)]
pub enum Part {
    /// Bytes held in memory
    Bytes(Vec<u8>),
    /// Bytes produced by an external source
    Source(Box<dyn PartSource>),
}

impl Part {
    /// Copy the part into `out`
    pub fn write_to(&self, out: &mut dyn Write) -> io::Result<u64> {
        match self {
            Part::Bytes(bytes) => {
                out.write_all(bytes)?;
                Ok(bytes.len() as u64)
            }
            Part::Source(source) => source.write_to(out),
        }
    }

    /// Size of the part in bytes
    pub fn len(&self) -> u64 {
        match self {
            Part::Bytes(bytes) => bytes.len() as u64,
            Part::Source(source) => source.len(),
        }
    }

    /// True when the part is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Read the whole part into memory
    pub fn to_vec(&self) -> io::Result<Vec<u8>> {
        let mut out = Vec::with_capacity(self.len() as usize);
        self.write_to(&mut out)?;
        Ok(out)
    }
}

impl From<Vec<u8>> for Part {
    fn from(bytes: Vec<u8>) -> Self {
        Part::Bytes(bytes)
    }
}

impl From<String> for Part {
    fn from(text: String) -> Self {
        Part::Bytes(text.into_bytes())
    }
}

/// One entry of a `.rels` part
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    /// Numeric part of the `rId`
    pub id: u32,
    /// Relationship type URI
    pub rel_type: String,
    /// Target, relative to the source part's folder
    pub target: String,
}

impl Relationship {
    /// The `Id` attribute, e.g. `rId3`
    pub fn r_id(&self) -> String {
        format!("rId{}", self.id)
    }
}

impl fmt::Display for Relationship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.r_id(), self.target)
    }
}

/// An `<Override>` entry of `[Content_Types].xml`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentTypeOverride {
    /// Absolute part name, e.g. `/xl/tables/table1.xml`
    pub part_name: String,
    pub content_type: String,
}

/// Path of the relationships part that belongs to `part_path`
///
/// ```
/// use streamsheet_core::package::rels_path_for;
///
/// assert_eq!(
///     rels_path_for("xl/worksheets/sheet1.xml"),
///     "xl/worksheets/_rels/sheet1.xml.rels"
/// );
/// ```
pub fn rels_path_for(part_path: &str) -> String {
    match part_path.rsplit_once('/') {
        Some((dir, file)) => format!("{}/_rels/{}.rels", dir, file),
        None => format!("_rels/{}.rels", part_path),
    }
}
