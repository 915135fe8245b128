//! Serialization of the worksheet structure that surrounds row data
//!
//! Every child of `<worksheet>` is rendered either from the verbatim XML
//! stored on the [`Worksheet`] or from its typed fields. Sections that only
//! a writer knows about (`cols`, `sheetData`, `mergeCells`, `tableParts`)
//! render empty unless raw XML was stored for them.

use streamsheet_core::{Break, PageOrientation, SheetSection, Worksheet};

use crate::styles::write_color;

/// XML declaration and `<worksheet>` start tag
pub const WORKSHEET_HEADER: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    "\n",
    r#"<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">"#
);

/// Render every section from `first` to `last` inclusive, in schema order
pub fn render_span(ws: &Worksheet, first: SheetSection, last: SheetSection) -> String {
    let mut xml = String::new();
    for section in SheetSection::span(first, last) {
        xml.push_str(&render_section(ws, section));
    }
    xml
}

/// Render one section; an empty string means the section is absent
pub fn render_section(ws: &Worksheet, section: SheetSection) -> String {
    if let Some(raw) = ws.raw_section(section) {
        return raw.to_string();
    }
    match section {
        SheetSection::SheetPr => sheet_pr(ws),
        SheetSection::Dimension => ws
            .dimension()
            .map(|range| format!("<dimension ref=\"{}\"/>", range))
            .unwrap_or_default(),
        SheetSection::SheetViews => sheet_views(ws),
        SheetSection::SheetFormatPr => sheet_format_pr(ws),
        SheetSection::SheetProtection => sheet_protection(ws),
        SheetSection::PrintOptions => print_options(ws),
        SheetSection::PageMargins => ws
            .page_margins()
            .map(|m| {
                format!(
                    "<pageMargins left=\"{}\" right=\"{}\" top=\"{}\" bottom=\"{}\" header=\"{}\" footer=\"{}\"/>",
                    m.left, m.right, m.top, m.bottom, m.header, m.footer
                )
            })
            .unwrap_or_default(),
        SheetSection::PageSetup => page_setup(ws),
        SheetSection::RowBreaks => breaks("rowBreaks", ws.row_breaks()),
        SheetSection::ColBreaks => breaks("colBreaks", ws.col_breaks()),
        _ => String::new(),
    }
}

/// A complete worksheet part for a sheet that was never streamed
pub fn render_worksheet(ws: &Worksheet) -> String {
    let mut xml = String::from(WORKSHEET_HEADER);
    xml.push_str(&render_span(ws, SheetSection::SheetPr, SheetSection::Cols));
    match ws.raw_section(SheetSection::SheetData) {
        Some(raw) => xml.push_str(raw),
        None => xml.push_str("<sheetData/>"),
    }
    xml.push_str(&render_span(ws, SheetSection::SheetCalcPr, SheetSection::ExtLst));
    xml.push_str("</worksheet>");
    xml
}

fn sheet_pr(ws: &Worksheet) -> String {
    match ws.tab_color() {
        Some(color) => format!("<sheetPr>{}</sheetPr>", write_color("tabColor", &color)),
        None => String::new(),
    }
}

fn sheet_views(ws: &Worksheet) -> String {
    let view = ws.view();
    let mut xml = String::from("<sheetViews><sheetView");
    if view.tab_selected {
        xml.push_str(" tabSelected=\"1\"");
    }
    if !view.show_grid_lines {
        xml.push_str(" showGridLines=\"0\"");
    }
    if view.right_to_left {
        xml.push_str(" rightToLeft=\"1\"");
    }
    if let Some(zoom) = view.zoom_scale {
        xml.push_str(&format!(" zoomScale=\"{}\"", zoom));
    }
    xml.push_str(" workbookViewId=\"0\"");

    let Some(panes) = &view.panes else {
        xml.push_str("/></sheetViews>");
        return xml;
    };
    xml.push('>');

    xml.push_str("<pane");
    if panes.x_split != 0.0 {
        xml.push_str(&format!(" xSplit=\"{}\"", panes.x_split));
    }
    if panes.y_split != 0.0 {
        xml.push_str(&format!(" ySplit=\"{}\"", panes.y_split));
    }
    if let Some(cell) = panes.top_left_cell {
        xml.push_str(&format!(" topLeftCell=\"{}\"", cell));
    }
    if let Some(pane) = panes.active_pane {
        xml.push_str(&format!(" activePane=\"{}\"", pane.as_str()));
    }
    if panes.freeze {
        xml.push_str(" state=\"frozen\"");
    } else if panes.split {
        xml.push_str(" state=\"split\"");
    }
    xml.push_str("/>");

    for selection in &panes.selections {
        xml.push_str("<selection");
        if let Some(pane) = selection.pane {
            xml.push_str(&format!(" pane=\"{}\"", pane.as_str()));
        }
        if let Some(cell) = selection.active_cell {
            xml.push_str(&format!(" activeCell=\"{}\"", cell));
        }
        if let Some(sqref) = selection.sqref {
            xml.push_str(&format!(" sqref=\"{}\"", sqref));
        }
        xml.push_str("/>");
    }
    xml.push_str("</sheetView></sheetViews>");
    xml
}

fn sheet_format_pr(ws: &Worksheet) -> String {
    let Some(format) = ws.format() else {
        return String::new();
    };
    let mut xml = String::from("<sheetFormatPr");
    if let Some(width) = format.default_col_width {
        xml.push_str(&format!(" defaultColWidth=\"{}\"", width));
    }
    xml.push_str(&format!(" defaultRowHeight=\"{}\"", format.default_row_height));
    if format.outline_level_row > 0 {
        xml.push_str(&format!(" outlineLevelRow=\"{}\"", format.outline_level_row));
    }
    if format.outline_level_col > 0 {
        xml.push_str(&format!(" outlineLevelCol=\"{}\"", format.outline_level_col));
    }
    xml.push_str("/>");
    xml
}

fn sheet_protection(ws: &Worksheet) -> String {
    let Some(p) = ws.protection() else {
        return String::new();
    };
    let mut xml = String::from("<sheetProtection");
    if let Some(hash) = p.password_hash {
        xml.push_str(&format!(" password=\"{:04X}\"", hash));
    }
    xml.push_str(" sheet=\"1\" objects=\"1\" scenarios=\"1\"");
    // Edit actions default to locked, selection defaults to allowed
    let unlocked = [
        ("formatCells", p.format_cells),
        ("formatColumns", p.format_columns),
        ("formatRows", p.format_rows),
        ("insertRows", p.insert_rows),
        ("deleteRows", p.delete_rows),
        ("sort", p.sort),
        ("autoFilter", p.auto_filter),
    ];
    for (name, allowed) in unlocked {
        if allowed {
            xml.push_str(&format!(" {}=\"0\"", name));
        }
    }
    if !p.select_locked_cells {
        xml.push_str(" selectLockedCells=\"1\"");
    }
    if !p.select_unlocked_cells {
        xml.push_str(" selectUnlockedCells=\"1\"");
    }
    xml.push_str("/>");
    xml
}

fn print_options(ws: &Worksheet) -> String {
    let Some(o) = ws.print_options() else {
        return String::new();
    };
    let mut xml = String::from("<printOptions");
    if o.horizontal_centered {
        xml.push_str(" horizontalCentered=\"1\"");
    }
    if o.vertical_centered {
        xml.push_str(" verticalCentered=\"1\"");
    }
    if o.headings {
        xml.push_str(" headings=\"1\"");
    }
    if o.grid_lines {
        xml.push_str(" gridLines=\"1\"");
    }
    xml.push_str("/>");
    xml
}

fn page_setup(ws: &Worksheet) -> String {
    let Some(setup) = ws.page_setup() else {
        return String::new();
    };
    let mut xml = format!("<pageSetup paperSize=\"{}\"", setup.paper_size);
    if setup.scale != 100 {
        xml.push_str(&format!(" scale=\"{}\"", setup.scale));
    }
    if let Some(w) = setup.fit_to_width {
        xml.push_str(&format!(" fitToWidth=\"{}\"", w));
    }
    if let Some(h) = setup.fit_to_height {
        xml.push_str(&format!(" fitToHeight=\"{}\"", h));
    }
    let orientation = match setup.orientation {
        PageOrientation::Portrait => "portrait",
        PageOrientation::Landscape => "landscape",
    };
    xml.push_str(&format!(" orientation=\"{}\"/>", orientation));
    xml
}

fn breaks(tag: &str, list: &[Break]) -> String {
    if list.is_empty() {
        return String::new();
    }
    let manual = list.iter().filter(|b| b.manual).count();
    let mut xml = format!(
        "<{} count=\"{}\" manualBreakCount=\"{}\">",
        tag,
        list.len(),
        manual
    );
    for b in list {
        xml.push_str(&format!("<brk id=\"{}\" max=\"{}\"", b.id, b.max));
        if b.manual {
            xml.push_str(" man=\"1\"");
        }
        xml.push_str("/>");
    }
    xml.push_str(&format!("</{}>", tag));
    xml
}
