//! Workbook type - the document that owns sheets, styles and package parts

use std::collections::{BTreeMap, BTreeSet};

use crate::cell::SharedStrings;
use crate::error::{Error, Result};
use crate::package::{rels_path_for, ContentTypeOverride, Part, Relationship};
use crate::style::{Style, StylePool};
use crate::worksheet::Worksheet;
use crate::MAX_SHEET_NAME_LEN;

/// A workbook (spreadsheet document)
///
/// Besides its worksheets the workbook is the registry for everything that
/// is shared across sheets: styles, shared strings, table names, extra
/// package parts with their relationships and content types, and the set
/// of sheets that currently have an open stream.
#[derive(Debug)]
pub struct Workbook {
    worksheets: Vec<Worksheet>,
    next_part_id: u32,
    settings: WorkbookSettings,
    active_sheet: usize,
    styles: StylePool,
    shared_strings: SharedStrings,
    parts: BTreeMap<String, Part>,
    relationships: BTreeMap<String, Vec<Relationship>>,
    content_types: Vec<ContentTypeOverride>,
    tables: Vec<TableEntry>,
    streams: BTreeSet<String>,
}

/// A table registered somewhere in the workbook
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableEntry {
    pub id: u32,
    pub name: String,
    /// Path of the worksheet part that owns the table
    pub sheet_path: String,
}

impl Workbook {
    /// Create a new workbook with one worksheet named `Sheet1`
    pub fn new() -> Self {
        let mut wb = Self::empty();
        wb.worksheets.push(Worksheet::new("Sheet1", 1));
        wb.next_part_id = 2;
        wb
    }

    /// Create an empty workbook with no worksheets
    pub fn empty() -> Self {
        Self {
            worksheets: Vec::new(),
            next_part_id: 1,
            settings: WorkbookSettings::default(),
            active_sheet: 0,
            styles: StylePool::new(),
            shared_strings: SharedStrings::new(),
            parts: BTreeMap::new(),
            relationships: BTreeMap::new(),
            content_types: Vec::new(),
            tables: Vec::new(),
            streams: BTreeSet::new(),
        }
    }

    // ==================== Sheets ====================

    pub fn sheet_count(&self) -> usize {
        self.worksheets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.worksheets.is_empty()
    }

    pub fn worksheet(&self, index: usize) -> Option<&Worksheet> {
        self.worksheets.get(index)
    }

    pub fn worksheet_mut(&mut self, index: usize) -> Option<&mut Worksheet> {
        self.worksheets.get_mut(index)
    }

    /// Index of a worksheet, matching the name case-insensitively
    pub fn sheet_index(&self, name: &str) -> Option<usize> {
        let wanted = name.to_lowercase();
        self.worksheets
            .iter()
            .position(|ws| ws.name().to_lowercase() == wanted)
    }

    pub fn worksheet_by_name(&self, name: &str) -> Option<&Worksheet> {
        self.sheet_index(name).and_then(|i| self.worksheets.get(i))
    }

    pub fn worksheets(&self) -> impl Iterator<Item = &Worksheet> {
        self.worksheets.iter()
    }

    /// Package path of the worksheet at `index`
    pub fn sheet_path(&self, index: usize) -> Result<String> {
        self.worksheets
            .get(index)
            .map(Worksheet::path)
            .ok_or(Error::SheetOutOfBounds(index, self.worksheets.len()))
    }

    /// Add a worksheet with a generated `SheetN` name
    pub fn add_worksheet(&mut self) -> Result<usize> {
        let mut n = self.worksheets.len() + 1;
        loop {
            let name = format!("Sheet{}", n);
            if self.sheet_index(&name).is_none() {
                return self.add_worksheet_with_name(&name);
            }
            n += 1;
        }
    }

    /// Add a worksheet with the given name
    pub fn add_worksheet_with_name(&mut self, name: &str) -> Result<usize> {
        check_sheet_name(name)?;
        if self.sheet_index(name).is_some() {
            return Err(Error::DuplicateSheetName(name.into()));
        }

        let index = self.worksheets.len();
        self.worksheets.push(Worksheet::new(name, self.next_part_id));
        self.next_part_id += 1;
        Ok(index)
    }

    /// Rename a worksheet; its part path does not change
    pub fn rename_worksheet(&mut self, index: usize, new_name: &str) -> Result<()> {
        if index >= self.worksheets.len() {
            return Err(Error::SheetOutOfBounds(index, self.worksheets.len()));
        }
        check_sheet_name(new_name)?;
        if matches!(self.sheet_index(new_name), Some(i) if i != index) {
            return Err(Error::DuplicateSheetName(new_name.into()));
        }
        self.worksheets[index].set_name(new_name);
        Ok(())
    }

    pub fn active_sheet(&self) -> usize {
        self.active_sheet
    }

    pub fn set_active_sheet(&mut self, index: usize) -> Result<()> {
        if index >= self.worksheets.len() {
            return Err(Error::SheetOutOfBounds(index, self.worksheets.len()));
        }
        self.active_sheet = index;
        Ok(())
    }

    pub fn settings(&self) -> &WorkbookSettings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut WorkbookSettings {
        &mut self.settings
    }

    // ==================== Styles and strings ====================

    /// Register a style, returning the id cells use to reference it
    pub fn add_style(&mut self, style: Style) -> u32 {
        self.styles.get_or_insert(style)
    }

    pub fn style(&self, id: u32) -> Option<&Style> {
        self.styles.get(id)
    }

    pub fn style_pool(&self) -> &StylePool {
        &self.styles
    }

    pub fn shared_strings(&self) -> &SharedStrings {
        &self.shared_strings
    }

    pub fn shared_strings_mut(&mut self) -> &mut SharedStrings {
        &mut self.shared_strings
    }

    // ==================== Tables ====================

    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    /// Check whether a table name is taken anywhere in the workbook
    pub fn has_table_name(&self, name: &str) -> bool {
        let wanted = name.to_lowercase();
        self.tables.iter().any(|t| t.name.to_lowercase() == wanted)
    }

    /// Record a table, returning its workbook-wide id
    pub fn register_table(&mut self, name: impl Into<String>, sheet_path: impl Into<String>) -> u32 {
        let id = self.tables.len() as u32 + 1;
        self.tables.push(TableEntry {
            id,
            name: name.into(),
            sheet_path: sheet_path.into(),
        });
        id
    }

    pub fn tables(&self) -> &[TableEntry] {
        &self.tables
    }

    // ==================== Package parts ====================

    /// Store a part under its package path, replacing any previous content
    pub fn save_part<P: Into<Part>>(&mut self, path: &str, part: P) -> Result<()> {
        if path.is_empty() || path.starts_with('/') {
            return Err(Error::InvalidPart(path.into()));
        }
        self.parts.insert(path.to_string(), part.into());
        Ok(())
    }

    pub fn part(&self, path: &str) -> Option<&Part> {
        self.parts.get(path)
    }

    /// All stored parts in path order
    pub fn parts(&self) -> impl Iterator<Item = (&str, &Part)> {
        self.parts.iter().map(|(path, part)| (path.as_str(), part))
    }

    /// Add a relationship from `source_part` to `target`, returning the
    /// numeric part of the new `rId`
    pub fn add_relationship(&mut self, source_part: &str, rel_type: &str, target: &str) -> u32 {
        let rels = self
            .relationships
            .entry(rels_path_for(source_part))
            .or_default();
        let id = rels.iter().map(|r| r.id).max().unwrap_or(0) + 1;
        rels.push(Relationship {
            id,
            rel_type: rel_type.to_string(),
            target: target.to_string(),
        });
        id
    }

    /// Relationships stored for a source part
    pub fn relationships(&self, source_part: &str) -> &[Relationship] {
        self.relationships
            .get(&rels_path_for(source_part))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Every relationships part keyed by its `.rels` path
    pub fn relationship_parts(&self) -> impl Iterator<Item = (&str, &[Relationship])> {
        self.relationships
            .iter()
            .map(|(path, rels)| (path.as_str(), rels.as_slice()))
    }

    /// Declare the content type of a part; repeated calls for the same part
    /// replace the earlier entry
    pub fn add_content_type_override(&mut self, part_name: &str, content_type: &str) {
        let part_name = if part_name.starts_with('/') {
            part_name.to_string()
        } else {
            format!("/{}", part_name)
        };
        self.content_types.retain(|o| o.part_name != part_name);
        self.content_types.push(ContentTypeOverride {
            part_name,
            content_type: content_type.to_string(),
        });
    }

    pub fn content_type_overrides(&self) -> &[ContentTypeOverride] {
        &self.content_types
    }

    // ==================== Stream registry ====================

    /// Mark a sheet part as being streamed
    ///
    /// A sheet can be streamed once; after [`Workbook::finish_stream`] its
    /// part, tables and snapshot belong to the finished stream.
    pub fn begin_stream(&mut self, sheet_path: &str) -> Result<()> {
        if self.parts.contains_key(sheet_path) {
            return Err(Error::AlreadyStreamed(sheet_path.into()));
        }
        if !self.streams.insert(sheet_path.to_string()) {
            return Err(Error::StreamActive(sheet_path.into()));
        }
        Ok(())
    }

    /// Store the finished worksheet part, close its stream and drop the
    /// structural snapshot that has now been serialized
    pub fn finish_stream(&mut self, index: usize, part: Part) -> Result<()> {
        let path = self.sheet_path(index)?;
        self.parts.insert(path.clone(), part);
        self.streams.remove(&path);
        if let Some(ws) = self.worksheets.get_mut(index) {
            ws.clear_structure();
        }
        Ok(())
    }

    /// Forget an abandoned stream. Returns `false` if none was open.
    pub fn cancel_stream(&mut self, sheet_path: &str) -> bool {
        self.streams.remove(sheet_path)
    }

    pub fn is_streaming(&self, sheet_path: &str) -> bool {
        self.streams.contains(sheet_path)
    }

    /// Paths of sheets with an open stream
    pub fn active_streams(&self) -> impl Iterator<Item = &str> {
        self.streams.iter().map(String::as_str)
    }
}

impl Default for Workbook {
    fn default() -> Self {
        Self::new()
    }
}

/// Validate a sheet name without looking at existing sheets
pub fn check_sheet_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::InvalidSheetName("Sheet name cannot be empty".into()));
    }
    if name.chars().count() > MAX_SHEET_NAME_LEN {
        return Err(Error::InvalidSheetName(format!(
            "Sheet name too long (max {} characters)",
            MAX_SHEET_NAME_LEN
        )));
    }

    const INVALID_CHARS: &[char] = &[':', '\\', '/', '?', '*', '[', ']'];
    if let Some(c) = name.chars().find(|c| INVALID_CHARS.contains(c)) {
        return Err(Error::InvalidSheetName(format!(
            "Sheet name cannot contain '{}'",
            c
        )));
    }
    if name.starts_with('\'') || name.ends_with('\'') {
        return Err(Error::InvalidSheetName(
            "Sheet name cannot start or end with an apostrophe".into(),
        ));
    }
    Ok(())
}

/// Workbook-level settings
#[derive(Debug, Clone, Default)]
pub struct WorkbookSettings {
    /// Date system: false = 1900, true = 1904
    pub date_1904: bool,
    /// Ask the application to recalculate formulas when the file is opened
    pub full_calc_on_load: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_workbook() {
        let wb = Workbook::new();
        assert_eq!(wb.sheet_count(), 1);
        assert_eq!(wb.worksheet(0).unwrap().name(), "Sheet1");
        assert_eq!(wb.sheet_path(0).unwrap(), "xl/worksheets/sheet1.xml");
    }

    #[test]
    fn test_add_worksheets() {
        let mut wb = Workbook::new();
        assert_eq!(wb.add_worksheet().unwrap(), 1);
        assert_eq!(wb.worksheet(1).unwrap().name(), "Sheet2");

        let idx = wb.add_worksheet_with_name("Data").unwrap();
        assert_eq!(wb.sheet_path(idx).unwrap(), "xl/worksheets/sheet3.xml");
    }

    #[test]
    fn test_sheet_name_rules() {
        let mut wb = Workbook::new();
        assert!(matches!(
            wb.add_worksheet_with_name("SHEET1"),
            Err(Error::DuplicateSheetName(_))
        ));
        assert!(wb.add_worksheet_with_name("").is_err());
        assert!(wb.add_worksheet_with_name("Sheet/1").is_err());
        assert!(wb.add_worksheet_with_name("Sheet[1]").is_err());
        assert!(wb.add_worksheet_with_name("'quoted'").is_err());
        assert!(wb
            .add_worksheet_with_name(&"A".repeat(MAX_SHEET_NAME_LEN + 1))
            .is_err());
    }

    #[test]
    fn test_sheet_lookup_is_case_insensitive() {
        let mut wb = Workbook::new();
        wb.add_worksheet_with_name("Data").unwrap();
        assert_eq!(wb.sheet_index("data"), Some(1));
        assert!(wb.worksheet_by_name("Missing").is_none());
    }

    #[test]
    fn test_rename_keeps_path() {
        let mut wb = Workbook::new();
        wb.rename_worksheet(0, "Summary").unwrap();
        assert_eq!(wb.worksheet(0).unwrap().name(), "Summary");
        assert_eq!(wb.sheet_path(0).unwrap(), "xl/worksheets/sheet1.xml");
    }

    #[test]
    fn test_relationship_ids_are_per_source() {
        let mut wb = Workbook::new();
        let sheet = "xl/worksheets/sheet1.xml";
        assert_eq!(wb.add_relationship(sheet, "t", "../tables/table1.xml"), 1);
        assert_eq!(wb.add_relationship(sheet, "t", "../tables/table2.xml"), 2);
        assert_eq!(wb.add_relationship("xl/worksheets/sheet2.xml", "t", "x"), 1);

        let rels = wb.relationships(sheet);
        assert_eq!(rels.len(), 2);
        assert_eq!(rels[1].r_id(), "rId2");
    }

    #[test]
    fn test_stream_registry() {
        let mut wb = Workbook::new();
        let path = wb.sheet_path(0).unwrap();

        wb.begin_stream(&path).unwrap();
        assert!(matches!(wb.begin_stream(&path), Err(Error::StreamActive(_))));
        assert!(wb.is_streaming(&path));

        wb.finish_stream(0, Part::Bytes(b"<worksheet/>".to_vec()))
            .unwrap();
        assert!(!wb.is_streaming(&path));
        assert_eq!(wb.part(&path).unwrap().len(), 12);
        assert!(!wb.cancel_stream(&path));

        assert!(matches!(wb.begin_stream(&path), Err(Error::AlreadyStreamed(_))));
        assert!(!wb.is_streaming(&path));
    }

    #[test]
    fn test_content_type_overrides_replace() {
        let mut wb = Workbook::new();
        wb.add_content_type_override("xl/tables/table1.xml", "a");
        wb.add_content_type_override("/xl/tables/table1.xml", "b");
        assert_eq!(wb.content_type_overrides().len(), 1);
        assert_eq!(wb.content_type_overrides()[0].content_type, "b");
        assert_eq!(wb.content_type_overrides()[0].part_name, "/xl/tables/table1.xml");
    }

    #[test]
    fn test_table_names() {
        let mut wb = Workbook::new();
        assert_eq!(wb.register_table("Sales", "xl/worksheets/sheet1.xml"), 1);
        assert!(wb.has_table_name("SALES"));
        assert_eq!(wb.table_count(), 1);
    }
}
