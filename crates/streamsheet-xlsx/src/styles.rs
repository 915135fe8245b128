//! styles.xml generation from the workbook's style pool

use std::collections::HashMap;

use crate::xml::escape_xml;
use streamsheet_core::style::{
    Alignment, Color, FillStyle, FontStyle, NumberFormat, PatternType, StylePool,
};

/// First id available to custom number formats
const FIRST_CUSTOM_NUMFMT_ID: u32 = 164;

#[derive(Debug, Clone, Copy)]
struct ResolvedXfIds {
    font_id: u32,
    fill_id: u32,
    num_fmt_id: u32,
}

/// Render `xl/styles.xml`. Style ids from the pool are used as `cellXfs`
/// positions unchanged.
pub(crate) fn to_styles_xml(pool: &StylePool) -> String {
    let mut fonts: Vec<FontStyle> = vec![FontStyle::default()];
    let mut font_ids: HashMap<FontStyle, u32> = HashMap::from([(FontStyle::default(), 0)]);

    // The first two fills are fixed: none and gray125
    let mut fills: Vec<FillStyle> = vec![
        FillStyle::None,
        FillStyle::pattern(PatternType::Gray125, Color::Auto, Color::Auto),
    ];
    let mut fill_ids: HashMap<FillStyle, u32> = HashMap::from([(FillStyle::None, 0)]);

    let mut numfmts: Vec<(u32, String)> = Vec::new();
    let mut numfmt_ids: HashMap<String, u32> = HashMap::new();

    let mut resolved = Vec::with_capacity(pool.len());
    for (_, style) in pool.iter() {
        let font_id = *font_ids.entry(style.font.clone()).or_insert_with(|| {
            fonts.push(style.font.clone());
            fonts.len() as u32 - 1
        });

        let fill_id = *fill_ids.entry(style.fill.clone()).or_insert_with(|| {
            fills.push(style.fill.clone());
            fills.len() as u32 - 1
        });

        let num_fmt_id = match &style.number_format {
            NumberFormat::Custom(code) => *numfmt_ids.entry(code.clone()).or_insert_with(|| {
                let id = FIRST_CUSTOM_NUMFMT_ID + numfmts.len() as u32;
                numfmts.push((id, code.clone()));
                id
            }),
            other => other.builtin_id().unwrap_or(0),
        };

        resolved.push(ResolvedXfIds {
            font_id,
            fill_id,
            num_fmt_id,
        });
    }

    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">"#,
    );

    if !numfmts.is_empty() {
        xml.push_str(&format!("<numFmts count=\"{}\">", numfmts.len()));
        for (id, code) in &numfmts {
            xml.push_str(&format!(
                "<numFmt numFmtId=\"{}\" formatCode=\"{}\"/>",
                id,
                escape_xml(code)
            ));
        }
        xml.push_str("</numFmts>");
    }

    xml.push_str(&format!("<fonts count=\"{}\">", fonts.len()));
    for font in &fonts {
        xml.push_str("<font>");
        xml.push_str(&write_font_props(font, "name"));
        xml.push_str("</font>");
    }
    xml.push_str("</fonts>");

    xml.push_str(&format!("<fills count=\"{}\">", fills.len()));
    for fill in &fills {
        xml.push_str(&write_fill(fill));
    }
    xml.push_str("</fills>");

    xml.push_str(
        r#"<borders count="1"><border><left/><right/><top/><bottom/><diagonal/></border></borders><cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs>"#,
    );

    xml.push_str(&format!("<cellXfs count=\"{}\">", resolved.len()));
    for ((_, style), ids) in pool.iter().zip(&resolved) {
        xml.push_str(&write_xf(&style.font, &style.fill, &style.alignment, *ids));
    }
    xml.push_str("</cellXfs>");

    xml.push_str(
        r#"<cellStyles count="1"><cellStyle name="Normal" xfId="0" builtinId="0"/></cellStyles><dxfs count="0"/><tableStyles count="0" defaultTableStyle="TableStyleMedium9" defaultPivotStyle="PivotStyleLight16"/></styleSheet>"#,
    );
    xml
}

/// Write a `<color>`-like element
pub(crate) fn write_color(tag: &str, color: &Color) -> String {
    match color {
        Color::Auto => format!("<{tag} auto=\"1\"/>"),
        Color::Rgb { .. } | Color::Argb { .. } => format!(
            "<{tag} rgb=\"{}\"/>",
            color.to_argb_hex().unwrap_or_default()
        ),
        Color::Indexed(i) => format!("<{tag} indexed=\"{}\"/>", i),
        Color::Theme { index, tint: 0 } => format!("<{tag} theme=\"{}\"/>", index),
        Color::Theme { index, tint } => format!(
            "<{tag} theme=\"{}\" tint=\"{}\"/>",
            index,
            *tint as f64 / 100.0
        ),
    }
}

/// Font child elements in schema order. Cell fonts name the family with
/// `<name>`, rich text runs with `<rFont>`.
pub(crate) fn write_font_props(font: &FontStyle, name_tag: &str) -> String {
    let mut s = String::new();
    if font.bold {
        s.push_str("<b/>");
    }
    if font.italic {
        s.push_str("<i/>");
    }
    if font.strikethrough {
        s.push_str("<strike/>");
    }
    match font.underline.as_str() {
        None => {}
        Some("single") => s.push_str("<u/>"),
        Some(val) => s.push_str(&format!("<u val=\"{}\"/>", val)),
    }
    if font.vertical_align.as_str() != "baseline" {
        s.push_str(&format!(
            "<vertAlign val=\"{}\"/>",
            font.vertical_align.as_str()
        ));
    }
    s.push_str(&format!("<sz val=\"{}\"/>", font.size));
    if !font.color.is_auto() {
        s.push_str(&write_color("color", &font.color));
    }
    s.push_str(&format!("<{} val=\"{}\"/>", name_tag, escape_xml(&font.name)));
    s
}

fn write_fill(fill: &FillStyle) -> String {
    match fill {
        FillStyle::None => "<fill><patternFill patternType=\"none\"/></fill>".to_string(),
        FillStyle::Solid { color } => format!(
            "<fill><patternFill patternType=\"solid\">{}<bgColor indexed=\"64\"/></patternFill></fill>",
            write_color("fgColor", color)
        ),
        FillStyle::Pattern {
            pattern,
            foreground,
            background,
        } => {
            let mut s = format!("<fill><patternFill patternType=\"{}\"", pattern.as_str());
            if foreground.is_auto() && background.is_auto() {
                s.push_str("/></fill>");
                return s;
            }
            s.push('>');
            if !foreground.is_auto() {
                s.push_str(&write_color("fgColor", foreground));
            }
            if !background.is_auto() {
                s.push_str(&write_color("bgColor", background));
            }
            s.push_str("</patternFill></fill>");
            s
        }
    }
}

fn write_alignment(al: &Alignment) -> String {
    if al.is_default() {
        return String::new();
    }
    let default = Alignment::default();
    let mut s = String::from("<alignment");
    if al.horizontal != default.horizontal {
        s.push_str(&format!(" horizontal=\"{}\"", al.horizontal.as_str()));
    }
    if al.vertical != default.vertical {
        s.push_str(&format!(" vertical=\"{}\"", al.vertical.as_str()));
    }
    if al.rotation != 0 {
        s.push_str(&format!(" textRotation=\"{}\"", al.rotation));
    }
    if al.wrap_text {
        s.push_str(" wrapText=\"1\"");
    }
    if al.indent != 0 {
        s.push_str(&format!(" indent=\"{}\"", al.indent));
    }
    if al.shrink_to_fit {
        s.push_str(" shrinkToFit=\"1\"");
    }
    s.push_str("/>");
    s
}

fn write_xf(font: &FontStyle, fill: &FillStyle, alignment: &Alignment, ids: ResolvedXfIds) -> String {
    let mut attrs = String::new();
    if ids.num_fmt_id != 0 {
        attrs.push_str(" applyNumberFormat=\"1\"");
    }
    if ids.font_id != 0 || *font != FontStyle::default() {
        attrs.push_str(" applyFont=\"1\"");
    }
    if !fill.is_none() {
        attrs.push_str(" applyFill=\"1\"");
    }
    let alignment_xml = write_alignment(alignment);
    if !alignment_xml.is_empty() {
        attrs.push_str(" applyAlignment=\"1\"");
    }

    let open = format!(
        "<xf numFmtId=\"{}\" fontId=\"{}\" fillId=\"{}\" borderId=\"0\" xfId=\"0\"{}",
        ids.num_fmt_id, ids.font_id, ids.fill_id, attrs
    );
    if alignment_xml.is_empty() {
        format!("{}/>", open)
    } else {
        format!("{}>{}</xf>", open, alignment_xml)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use streamsheet_core::Style;

    #[test]
    fn test_default_pool() {
        let xml = to_styles_xml(&StylePool::new());
        assert!(xml.contains("<fills count=\"2\">"));
        assert!(xml.contains("<cellXfs count=\"1\"><xf numFmtId=\"0\" fontId=\"0\" fillId=\"0\" borderId=\"0\" xfId=\"0\"/></cellXfs>"));
        assert!(!xml.contains("<numFmts"));
    }

    #[test]
    fn test_builtin_and_custom_formats() {
        let mut pool = StylePool::new();
        pool.get_or_insert(Style::new().number_format_id(22));
        pool.get_or_insert(Style::new().number_format("0.000"));

        let xml = to_styles_xml(&pool);
        assert!(xml.contains("<numFmts count=\"1\"><numFmt numFmtId=\"164\" formatCode=\"0.000\"/></numFmts>"));
        assert!(xml.contains("<xf numFmtId=\"22\" fontId=\"0\" fillId=\"0\" borderId=\"0\" xfId=\"0\" applyNumberFormat=\"1\"/>"));
        assert!(xml.contains("<cellXfs count=\"3\">"));
    }

    #[test]
    fn test_fonts_and_fills_are_shared() {
        let mut pool = StylePool::new();
        pool.get_or_insert(Style::new().bold(true));
        pool.get_or_insert(Style::new().bold(true).fill_color(Color::YELLOW));

        let xml = to_styles_xml(&pool);
        assert!(xml.contains("<fonts count=\"2\">"));
        assert!(xml.contains("<fills count=\"3\">"));
        assert!(xml.contains("<fgColor rgb=\"FFFFFF00\"/>"));
    }
}
