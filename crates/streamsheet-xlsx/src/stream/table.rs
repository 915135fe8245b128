//! Table definitions for streamed sheets

use streamsheet_core::{CellAddress, CellRange};

use crate::error::{XlsxError, XlsxResult};
use crate::xml::{bool_attr, escape_xml};

/// Longest accepted table name
pub const MAX_TABLE_NAME_LEN: usize = 255;

pub(crate) const TABLE_REL_TYPE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/table";
pub(crate) const TABLE_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.table+xml";

/// Settings for [`StreamWriter::add_table`](super::StreamWriter::add_table)
#[derive(Debug, Clone, PartialEq)]
pub struct TableOptions {
    /// Range covering the header row and the data, e.g. `A1:C10`
    pub range: String,
    /// Defaults to `Table{id}`
    pub name: Option<String>,
    /// Table style, e.g. `TableStyleMedium2`
    pub style_name: Option<String>,
    pub show_first_column: bool,
    pub show_last_column: bool,
    /// Banded rows; shown unless disabled
    pub show_row_stripes: Option<bool>,
    pub show_column_stripes: bool,
}

impl TableOptions {
    pub fn new<S: Into<String>>(range: S) -> Self {
        Self {
            range: range.into(),
            name: None,
            style_name: None,
            show_first_column: false,
            show_last_column: false,
            show_row_stripes: None,
            show_column_stripes: false,
        }
    }

    pub fn name<S: Into<String>>(mut self, name: S) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn style_name<S: Into<String>>(mut self, style: S) -> Self {
        self.style_name = Some(style.into());
        self
    }

    pub fn show_first_column(mut self, show: bool) -> Self {
        self.show_first_column = show;
        self
    }

    pub fn show_last_column(mut self, show: bool) -> Self {
        self.show_last_column = show;
        self
    }

    pub fn show_row_stripes(mut self, show: bool) -> Self {
        self.show_row_stripes = Some(show);
        self
    }

    pub fn show_column_stripes(mut self, show: bool) -> Self {
        self.show_column_stripes = show;
        self
    }
}

/// Parse and normalize a table range. Single-row ranges grow by one row so
/// the table has at least one data row.
pub(crate) fn table_range(range: &str) -> XlsxResult<CellRange> {
    let mut range = CellRange::parse(range)?;
    if range.start.row == range.end.row {
        range.end = CellAddress::from_numbers(range.end.column_number(), range.end.row_number() + 1)?;
    }
    Ok(range)
}

/// Validate a table name against Excel's naming rules
pub(crate) fn check_table_name(name: &str) -> XlsxResult<()> {
    let invalid = || XlsxError::TableName(name.to_string());
    if name.is_empty() || name.chars().count() > MAX_TABLE_NAME_LEN {
        return Err(invalid());
    }
    let mut chars = name.chars();
    let first_ok = chars
        .next()
        .map_or(false, |c| c.is_alphabetic() || c == '_' || c == '\\');
    if !first_ok || !chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '.' | '\\')) {
        return Err(invalid());
    }
    if CellAddress::parse(name).is_ok() || is_r1c1_reference(name) {
        return Err(invalid());
    }
    Ok(())
}

/// `R`, `C`, `R1`, `C2`, `R1C1` and friends
fn is_r1c1_reference(name: &str) -> bool {
    let upper = name.to_ascii_uppercase();
    let rest = upper.strip_prefix('R').unwrap_or(&upper);
    let rest = rest.trim_start_matches(|c: char| c.is_ascii_digit());
    let rest = match rest.strip_prefix('C') {
        Some(cols) => cols.trim_start_matches(|c: char| c.is_ascii_digit()),
        None if rest.len() < upper.len() => rest,
        None => return false,
    };
    rest.is_empty()
}

/// Column names for a table; blank headers become `Column{n}`
pub(crate) fn column_names(headers: &[String], width: usize) -> Vec<String> {
    (0..width)
        .map(|i| match headers.get(i).map(String::as_str) {
            Some(text) if !text.is_empty() => text.to_string(),
            _ => format!("Column{}", i + 1),
        })
        .collect()
}

/// Render `xl/tables/table{id}.xml`
pub(crate) fn table_xml(
    id: u32,
    name: &str,
    range: &CellRange,
    columns: &[String],
    options: &TableOptions,
) -> String {
    let reference = range.to_ref_string();
    let name = escape_xml(name);
    let mut xml = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<table xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" id="{id}" name="{name}" displayName="{name}" ref="{reference}"><autoFilter ref="{reference}"/>"#
    );

    xml.push_str(&format!("<tableColumns count=\"{}\">", columns.len()));
    for (i, column) in columns.iter().enumerate() {
        xml.push_str(&format!(
            "<tableColumn id=\"{}\" name=\"{}\"/>",
            i + 1,
            escape_xml(column)
        ));
    }
    xml.push_str("</tableColumns>");

    xml.push_str("<tableStyleInfo");
    if let Some(style) = options.style_name.as_deref().filter(|s| !s.is_empty()) {
        xml.push_str(&format!(" name=\"{}\"", escape_xml(style)));
    }
    xml.push_str(&format!(
        " showFirstColumn=\"{}\" showLastColumn=\"{}\" showRowStripes=\"{}\" showColumnStripes=\"{}\"/>",
        bool_attr(options.show_first_column),
        bool_attr(options.show_last_column),
        bool_attr(options.show_row_stripes.unwrap_or(true)),
        bool_attr(options.show_column_stripes),
    ));
    xml.push_str("</table>");
    xml
}

/// `<tableParts>` block pointing at the table relationship
pub(crate) fn table_parts_xml(r_id: u32) -> String {
    format!(
        "<tableParts count=\"1\"><tablePart r:id=\"rId{}\"/></tableParts>",
        r_id
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_table_range_normalization() {
        assert_eq!(table_range("C3:A1").unwrap().to_ref_string(), "A1:C3");
        assert_eq!(table_range("A1:C1").unwrap().to_ref_string(), "A1:C2");
        assert!(table_range("A0:B2").is_err());
    }

    #[test]
    fn test_table_names() {
        for name in ["Sales", "_data", "\\x", "Q1.Totals", "Table_2024", "Résumé"] {
            assert!(check_table_name(name).is_ok(), "{name}");
        }
        let too_long = "T".repeat(MAX_TABLE_NAME_LEN + 1);
        for name in ["", "1st", "has space", "a-b", "A1", "xfd100", "R", "c", "R1C1", "R2", &too_long] {
            assert!(
                matches!(check_table_name(name), Err(XlsxError::TableName(_))),
                "{name}"
            );
        }
    }

    #[test]
    fn test_column_names() {
        let headers = vec!["Name".to_string(), String::new()];
        assert_eq!(column_names(&headers, 3), vec!["Name", "Column2", "Column3"]);
    }

    #[test]
    fn test_table_xml() {
        let range = CellRange::parse("A1:B3").unwrap();
        let columns = vec!["Name".to_string(), "A&B".to_string()];
        let xml = table_xml(1, "Table1", &range, &columns, &TableOptions::new("A1:B3"));
        assert!(xml.contains(
            "id=\"1\" name=\"Table1\" displayName=\"Table1\" ref=\"A1:B3\"><autoFilter ref=\"A1:B3\"/>"
        ));
        assert!(xml.contains(
            "<tableColumns count=\"2\"><tableColumn id=\"1\" name=\"Name\"/><tableColumn id=\"2\" name=\"A&amp;B\"/></tableColumns>"
        ));
        assert!(xml.ends_with(
            "<tableStyleInfo showFirstColumn=\"0\" showLastColumn=\"0\" showRowStripes=\"1\" showColumnStripes=\"0\"/></table>"
        ));

        let styled = TableOptions::new("A1:B3")
            .style_name("TableStyleMedium2")
            .show_row_stripes(false);
        let xml = table_xml(2, "T", &range, &columns, &styled);
        assert!(xml.contains("<tableStyleInfo name=\"TableStyleMedium2\" showFirstColumn=\"0\" showLastColumn=\"0\" showRowStripes=\"0\""));
    }
}
