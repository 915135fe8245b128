//! XLSX package writer

use std::fs::File;
use std::io::{Seek, Write};
use std::path::Path;

use log::debug;
use streamsheet_core::{SharedStrings, Workbook};

use crate::error::{XlsxError, XlsxResult};
use crate::sections::render_worksheet;
use crate::styles::to_styles_xml;
use crate::xml::{escape_xml, needs_space_preserve, push_escaped};

const REL_WORKSHEET: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet";
const REL_STYLES: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles";
const REL_SHARED_STRINGS: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/sharedStrings";

/// XLSX file writer
pub struct XlsxWriter;

impl XlsxWriter {
    /// Write a workbook to a file path
    pub fn write_file<P: AsRef<Path>>(workbook: &Workbook, path: P) -> XlsxResult<()> {
        Self::check_streams(workbook)?;
        let file = File::create(path)?;
        Self::write(workbook, file)
    }

    /// Write a workbook to a writer
    ///
    /// Fails with [`XlsxError::StreamIncomplete`] while any worksheet still
    /// has an open stream.
    pub fn write<W: Write + Seek>(workbook: &Workbook, writer: W) -> XlsxResult<()> {
        Self::check_streams(workbook)?;
        let mut zip = zip::ZipWriter::new(writer);

        Self::write_content_types(&mut zip, workbook)?;
        Self::write_root_rels(&mut zip)?;
        Self::write_workbook_xml(&mut zip, workbook)?;
        Self::write_workbook_rels(&mut zip, workbook)?;
        Self::write_styles_xml(&mut zip, workbook)?;
        if !workbook.shared_strings().is_empty() {
            Self::write_shared_strings(&mut zip, workbook.shared_strings())?;
        }

        for sheet in workbook.worksheets() {
            let path = sheet.path();
            let options = zip::write::SimpleFileOptions::default();
            zip.start_file(path.as_str(), options)?;
            match workbook.part(&path) {
                Some(part) => {
                    part.write_to(&mut zip)?;
                }
                None => zip.write_all(render_worksheet(sheet).as_bytes())?,
            }
        }

        // Tables and anything else stored by path
        for (path, part) in workbook.parts() {
            if Self::is_sheet_path(workbook, path) {
                continue;
            }
            let options = zip::write::SimpleFileOptions::default();
            zip.start_file(path, options)?;
            part.write_to(&mut zip)?;
        }

        for (rels_path, rels) in workbook.relationship_parts() {
            let options = zip::write::SimpleFileOptions::default();
            zip.start_file(rels_path, options)?;
            let mut content = String::from(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
            );
            for rel in rels {
                content.push_str(&format!(
                    r#"<Relationship Id="{}" Type="{}" Target="{}"/>"#,
                    rel.r_id(),
                    escape_xml(&rel.rel_type),
                    escape_xml(&rel.target)
                ));
            }
            content.push_str("</Relationships>");
            zip.write_all(content.as_bytes())?;
        }

        zip.finish()?;
        debug!("packaged workbook with {} sheets", workbook.sheet_count());
        Ok(())
    }

    fn check_streams(workbook: &Workbook) -> XlsxResult<()> {
        match workbook.active_streams().next() {
            Some(path) => Err(XlsxError::StreamIncomplete(path.to_string())),
            None => Ok(()),
        }
    }

    fn is_sheet_path(workbook: &Workbook, path: &str) -> bool {
        workbook.worksheets().any(|ws| ws.path() == path)
    }

    fn write_content_types<W: Write + Seek>(
        zip: &mut zip::ZipWriter<W>,
        workbook: &Workbook,
    ) -> XlsxResult<()> {
        let options = zip::write::SimpleFileOptions::default();
        zip.start_file("[Content_Types].xml", options)?;

        let mut content = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
    <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
    <Default Extension="xml" ContentType="application/xml"/>
    <Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>
    <Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/>"#,
        );

        if !workbook.shared_strings().is_empty() {
            content.push_str(
                r#"
    <Override PartName="/xl/sharedStrings.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sharedStrings+xml"/>"#,
            );
        }

        for sheet in workbook.worksheets() {
            content.push_str(&format!(
                r#"
    <Override PartName="/{}" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#,
                sheet.path()
            ));
        }

        for entry in workbook.content_type_overrides() {
            content.push_str(&format!(
                r#"
    <Override PartName="{}" ContentType="{}"/>"#,
                escape_xml(&entry.part_name),
                escape_xml(&entry.content_type)
            ));
        }

        content.push_str("\n</Types>");

        zip.write_all(content.as_bytes())?;
        Ok(())
    }

    fn write_root_rels<W: Write + Seek>(zip: &mut zip::ZipWriter<W>) -> XlsxResult<()> {
        let options = zip::write::SimpleFileOptions::default();
        zip.start_file("_rels/.rels", options)?;

        let content = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
    <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>
</Relationships>"#;

        zip.write_all(content.as_bytes())?;
        Ok(())
    }

    fn write_workbook_xml<W: Write + Seek>(
        zip: &mut zip::ZipWriter<W>,
        workbook: &Workbook,
    ) -> XlsxResult<()> {
        let options = zip::write::SimpleFileOptions::default();
        zip.start_file("xl/workbook.xml", options)?;

        let mut content = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">"#,
        );

        let settings = workbook.settings();
        if settings.date_1904 {
            content.push_str(r#"<workbookPr date1904="1"/>"#);
        }
        content.push_str(&format!(
            r#"<bookViews><workbookView activeTab="{}"/></bookViews><sheets>"#,
            workbook.active_sheet()
        ));

        for (i, sheet) in workbook.worksheets().enumerate() {
            let state = if sheet.is_visible() { "" } else { r#" state="hidden""# };
            content.push_str(&format!(
                r#"<sheet name="{}" sheetId="{}"{} r:id="rId{}"/>"#,
                escape_xml(sheet.name()),
                sheet.part_id(),
                state,
                i + 1
            ));
        }
        content.push_str("</sheets>");

        if settings.full_calc_on_load {
            content.push_str(r#"<calcPr fullCalcOnLoad="1"/>"#);
        }
        content.push_str("</workbook>");

        zip.write_all(content.as_bytes())?;
        Ok(())
    }

    fn write_workbook_rels<W: Write + Seek>(
        zip: &mut zip::ZipWriter<W>,
        workbook: &Workbook,
    ) -> XlsxResult<()> {
        let options = zip::write::SimpleFileOptions::default();
        zip.start_file("xl/_rels/workbook.xml.rels", options)?;

        let mut content = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
        );

        for (i, sheet) in workbook.worksheets().enumerate() {
            content.push_str(&format!(
                r#"
    <Relationship Id="rId{}" Type="{}" Target="worksheets/sheet{}.xml"/>"#,
                i + 1,
                REL_WORKSHEET,
                sheet.part_id()
            ));
        }

        let mut next_id = workbook.sheet_count() + 1;
        content.push_str(&format!(
            r#"
    <Relationship Id="rId{}" Type="{}" Target="styles.xml"/>"#,
            next_id, REL_STYLES
        ));
        if !workbook.shared_strings().is_empty() {
            next_id += 1;
            content.push_str(&format!(
                r#"
    <Relationship Id="rId{}" Type="{}" Target="sharedStrings.xml"/>"#,
                next_id, REL_SHARED_STRINGS
            ));
        }

        content.push_str("\n</Relationships>");

        zip.write_all(content.as_bytes())?;
        Ok(())
    }

    fn write_styles_xml<W: Write + Seek>(
        zip: &mut zip::ZipWriter<W>,
        workbook: &Workbook,
    ) -> XlsxResult<()> {
        let options = zip::write::SimpleFileOptions::default();
        zip.start_file("xl/styles.xml", options)?;
        let xml = to_styles_xml(workbook.style_pool());
        zip.write_all(xml.as_bytes())?;
        Ok(())
    }

    fn write_shared_strings<W: Write + Seek>(
        zip: &mut zip::ZipWriter<W>,
        strings: &SharedStrings,
    ) -> XlsxResult<()> {
        let options = zip::write::SimpleFileOptions::default();
        zip.start_file("xl/sharedStrings.xml", options)?;

        let mut content = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" count="{0}" uniqueCount="{0}">"#,
            strings.len()
        );
        for s in strings.iter() {
            if needs_space_preserve(s) {
                content.push_str(r#"<si><t xml:space="preserve">"#);
            } else {
                content.push_str("<si><t>");
            }
            push_escaped(&mut content, s);
            content.push_str("</t></si>");
        }
        content.push_str("</sst>");

        zip.write_all(content.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::StreamWriter;
    use std::io::{Cursor, Read};

    fn package(workbook: &Workbook) -> zip::ZipArchive<Cursor<Vec<u8>>> {
        let mut out = Cursor::new(Vec::new());
        XlsxWriter::write(workbook, &mut out).unwrap();
        zip::ZipArchive::new(Cursor::new(out.into_inner())).unwrap()
    }

    fn read(archive: &mut zip::ZipArchive<Cursor<Vec<u8>>>, name: &str) -> String {
        let mut content = String::new();
        archive
            .by_name(name)
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        content
    }

    #[test]
    fn test_empty_workbook_parts() {
        let workbook = Workbook::new();
        let mut archive = package(&workbook);
        let sheet = read(&mut archive, "xl/worksheets/sheet1.xml");
        assert!(sheet.contains("<sheetData/>"));
        assert!(archive.by_name("xl/styles.xml").is_ok());
        assert!(archive.by_name("xl/sharedStrings.xml").is_err());

        let wb = read(&mut archive, "xl/workbook.xml");
        assert!(wb.contains(r#"<sheet name="Sheet1" sheetId="1" r:id="rId1"/>"#));
        assert!(!wb.contains("date1904"));
    }

    #[test]
    fn test_workbook_settings() {
        let mut workbook = Workbook::new();
        workbook.settings_mut().date_1904 = true;
        workbook.add_worksheet_with_name("Hidden & Co").unwrap();
        workbook.worksheet_mut(1).unwrap().set_visible(false);
        workbook.shared_strings_mut().intern(" padded");

        let mut archive = package(&workbook);
        let wb = read(&mut archive, "xl/workbook.xml");
        assert!(wb.contains(r#"<workbookPr date1904="1"/>"#));
        assert!(wb.contains(r#"<sheet name="Hidden &amp; Co" sheetId="2" state="hidden" r:id="rId2"/>"#));

        let sst = read(&mut archive, "xl/sharedStrings.xml");
        assert!(sst.contains(r#"<si><t xml:space="preserve"> padded</t></si>"#));
        let rels = read(&mut archive, "xl/_rels/workbook.xml.rels");
        assert!(rels.contains(r#"Id="rId4" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/sharedStrings""#));
    }

    #[test]
    fn test_refuses_open_stream() {
        let mut workbook = Workbook::new();
        let stream = StreamWriter::new(&mut workbook, "Sheet1").unwrap();
        drop(stream);

        let mut out = Cursor::new(Vec::new());
        let err = XlsxWriter::write(&workbook, &mut out).unwrap_err();
        assert!(matches!(err, XlsxError::StreamIncomplete(path) if path == "xl/worksheets/sheet1.xml"));

        assert!(workbook.cancel_stream("xl/worksheets/sheet1.xml"));
        assert!(XlsxWriter::write(&workbook, &mut out).is_ok());
    }

    #[test]
    fn test_streamed_sheet_and_table_are_packaged() {
        let mut workbook = Workbook::new();
        let mut stream = StreamWriter::new(&mut workbook, "Sheet1").unwrap();
        stream.write_row("A1", ["Name", "Age"], None).unwrap();
        stream.write_row("A2", ["Ann", "41"], None).unwrap();
        stream.add_table(crate::TableOptions::new("A1:B2")).unwrap();
        stream.flush().unwrap();

        let mut archive = package(&workbook);
        let sheet = read(&mut archive, "xl/worksheets/sheet1.xml");
        assert!(sheet.contains(r#"<row r="1"><c r="A1" t="str"><v>Name</v></c>"#));
        assert!(sheet.ends_with(r#"<tableParts count="1"><tablePart r:id="rId1"/></tableParts></worksheet>"#));

        let table = read(&mut archive, "xl/tables/table1.xml");
        assert!(table.contains(r#"<tableColumn id="2" name="Age"/>"#));
        let rels = read(&mut archive, "xl/worksheets/_rels/sheet1.xml.rels");
        assert!(rels.contains(r#"Target="../tables/table1.xml""#));
        let types = read(&mut archive, "[Content_Types].xml");
        assert!(types.contains(r#"<Override PartName="/xl/tables/table1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.table+xml"/>"#));
    }
}
