//! Cell value encoding into `<c>` elements

use streamsheet_core::{datetime_to_serial, duration_to_serial, RichTextRun, Style, Workbook};

use super::value::CellInput;
use crate::error::{XlsxError, XlsxResult};
use crate::styles::write_font_props;
use crate::xml::{needs_space_preserve, push_escaped};

/// Longest text a cell can hold
pub const MAX_CELL_CHARS: usize = 32_767;

/// Largest font size accepted in rich text runs
pub const MAX_FONT_SIZE: f64 = 409.0;

/// Built-in `m/d/yy h:mm`, assigned to unstyled timestamps
const DEFAULT_DATE_FORMAT: u32 = 22;

/// A `<c>` element ready to be written
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct CellXml {
    pub reference: String,
    pub style: u32,
    pub cell_type: Option<&'static str>,
    pub formula: Option<String>,
    pub value: Option<String>,
    /// Inner markup of `<is>`
    pub inline: Option<String>,
    pub preserve_space: bool,
}

impl CellXml {
    fn set_text(&mut self, text: &str) {
        let text = truncate_chars(text, MAX_CELL_CHARS);
        self.cell_type = Some("str");
        self.preserve_space = needs_space_preserve(text);
        self.value = Some(text.to_string());
    }

    fn set_number(&mut self, number: String) {
        self.cell_type = None;
        self.value = Some(number);
    }

    /// Append the element to `out`
    pub fn write_to(&self, out: &mut String) {
        out.push_str("<c");
        if self.preserve_space {
            out.push_str(" xml:space=\"preserve\"");
        }
        out.push_str(" r=\"");
        out.push_str(&self.reference);
        out.push('"');
        if self.style != 0 {
            out.push_str(&format!(" s=\"{}\"", self.style));
        }
        if let Some(t) = self.cell_type {
            out.push_str(" t=\"");
            out.push_str(t);
            out.push('"');
        }
        out.push('>');
        if let Some(formula) = &self.formula {
            out.push_str("<f>");
            push_escaped(out, formula);
            out.push_str("</f>");
        }
        if let Some(value) = &self.value {
            out.push_str("<v>");
            push_escaped(out, value);
            out.push_str("</v>");
        }
        if let Some(inline) = &self.inline {
            out.push_str("<is>");
            out.push_str(inline);
            out.push_str("</is>");
        }
        out.push_str("</c>");
    }
}

/// Encode one input value. Returns `None` for [`CellInput::Null`], which
/// produces no element at all.
///
/// `row_style` is inherited unless the value is a [`Cell`](super::Cell)
/// carrying its own style. Unstyled timestamps get a date style registered
/// in `workbook`.
pub(crate) fn encode_cell(
    workbook: &mut Workbook,
    reference: String,
    row_style: u32,
    input: &CellInput,
) -> XlsxResult<Option<CellXml>> {
    if input.is_null() {
        return Ok(None);
    }
    let mut cell = CellXml {
        reference,
        style: row_style,
        ..CellXml::default()
    };

    let mut input = input;
    if let CellInput::Cell(explicit) = input {
        cell.style = explicit.style_id;
        if let Some(formula) = explicit.formula.as_deref().filter(|f| !f.is_empty()) {
            cell.formula = Some(formula.to_string());
            cell.cell_type = Some("str");
        }
        input = explicit.value.as_ref();
    }

    set_value(workbook, &mut cell, input)?;
    Ok(Some(cell))
}

fn set_value(workbook: &mut Workbook, cell: &mut CellXml, input: &CellInput) -> XlsxResult<()> {
    match input {
        CellInput::Null => {}
        CellInput::Int(v) => cell.set_number(v.to_string()),
        CellInput::UInt(v) => cell.set_number(v.to_string()),
        CellInput::Float(v) => cell.set_number(format_float(*v)?),
        CellInput::Float32(v) => {
            if !v.is_finite() {
                return Err(XlsxError::NonFiniteNumber(*v as f64));
            }
            cell.set_number(v.to_string());
        }
        CellInput::String(s) | CellInput::Display(s) => cell.set_text(s),
        CellInput::Bytes(bytes) => cell.set_text(&String::from_utf8_lossy(bytes)),
        CellInput::Bool(b) => {
            cell.cell_type = Some("b");
            cell.value = Some(if *b { "1" } else { "0" }.to_string());
        }
        CellInput::Duration(d) => cell.set_number(format_float(duration_to_serial(*d))?),
        CellInput::DateTime(dt) => {
            match datetime_to_serial(*dt, workbook.settings().date_1904) {
                Some(serial) => {
                    cell.set_number(format_float(serial)?);
                    if cell.style == 0 {
                        cell.style = workbook
                            .add_style(Style::new().number_format_id(DEFAULT_DATE_FORMAT));
                    }
                }
                None => {
                    let text = dt.format("%Y-%m-%dT%H:%M:%S%.fZ").to_string();
                    cell.cell_type = Some("inlineStr");
                    cell.value = None;
                    cell.inline = Some(inline_text(&text));
                }
            }
        }
        CellInput::RichText(runs) => {
            cell.cell_type = Some("inlineStr");
            cell.value = None;
            cell.inline = Some(rich_text_xml(runs)?);
        }
        // A nested explicit cell only contributes its value
        CellInput::Cell(inner) => set_value(workbook, cell, &inner.value)?,
    }
    Ok(())
}

fn format_float(value: f64) -> XlsxResult<String> {
    if !value.is_finite() {
        return Err(XlsxError::NonFiniteNumber(value));
    }
    Ok(value.to_string())
}

fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

fn push_text_element(out: &mut String, text: &str) {
    if needs_space_preserve(text) {
        out.push_str("<t xml:space=\"preserve\">");
    } else {
        out.push_str("<t>");
    }
    push_escaped(out, text);
    out.push_str("</t>");
}

fn inline_text(text: &str) -> String {
    let mut out = String::new();
    push_text_element(&mut out, text);
    out
}

fn rich_text_xml(runs: &[RichTextRun]) -> XlsxResult<String> {
    let total: usize = runs.iter().map(|run| run.text.chars().count()).sum();
    if total > MAX_CELL_CHARS {
        return Err(XlsxError::CellTextLength(total));
    }

    let mut out = String::new();
    for run in runs {
        out.push_str("<r>");
        if let Some(font) = &run.font {
            if font.size > MAX_FONT_SIZE {
                return Err(XlsxError::FontSize(font.size));
            }
            out.push_str("<rPr>");
            out.push_str(&write_font_props(font, "rFont"));
            out.push_str("</rPr>");
        }
        push_text_element(&mut out, &run.text);
        out.push_str("</r>");
    }
    Ok(out)
}
