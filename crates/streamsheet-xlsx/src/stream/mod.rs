//! Streaming worksheet writer
//!
//! A [`StreamWriter`] writes one worksheet part row by row. Rows go straight
//! into a [`SpillBuffer`], which moves to a temporary file once it grows past
//! [`StreamOptions::chunk_size`], so memory use stays bounded no matter how
//! many rows are written.
//!
//! The part is assembled in schema order:
//!
//! 1. at creation: the XML header, `sheetPr` and `dimension`
//! 2. before the first row: `sheetViews`, `sheetFormatPr`, the column
//!    widths set on the writer and `<sheetData>`
//! 3. rows
//! 4. at [`StreamWriter::flush`]: everything after `sheetData`, with the
//!    writer's merged cells and table part in their slots
//!
//! ```no_run
//! use streamsheet_core::Workbook;
//! use streamsheet_xlsx::{CellInput, RowOptions, StreamWriter, XlsxWriter};
//!
//! let mut workbook = Workbook::new();
//! let mut stream = StreamWriter::new(&mut workbook, "Sheet1")?;
//! stream.set_column_width(1, 3, 20.0)?;
//! stream.write_row("A1", ["Name", "Qty"], None)?;
//! for row in 2..=100_000u32 {
//!     let cell = format!("A{}", row);
//!     let values = [CellInput::from(format!("item {}", row)), CellInput::from(row)];
//!     stream.write_row(&cell, values, None)?;
//! }
//! stream.write_row("A100001", ["Total"], Some(RowOptions::new().height(20.0)))?;
//! stream.flush()?;
//!
//! XlsxWriter::write_file(&workbook, "large.xlsx")?;
//! # Ok::<(), streamsheet_xlsx::XlsxError>(())
//! ```

mod encode;
mod lookback;
mod row;
mod spill;
mod table;
mod value;

pub use encode::{MAX_CELL_CHARS, MAX_FONT_SIZE};
pub use row::{RowOptions, MAX_OUTLINE_LEVEL, MAX_ROW_HEIGHT};
pub use spill::{SpillBuffer, SpillReader, DEFAULT_CHUNK_SIZE};
pub use table::{TableOptions, MAX_TABLE_NAME_LEN};
pub use value::{Cell, CellInput};

use std::io::BufReader;
use std::path::PathBuf;

use log::debug;
use streamsheet_core::{
    check_sheet_name, CellAddress, CellRange, Error, Panes, SheetSection, Workbook, Worksheet,
    MAX_COLS,
};

use crate::error::{XlsxError, XlsxResult};
use crate::sections::{render_section, render_span, WORKSHEET_HEADER};

/// Widest column Excel accepts, in characters
pub const MAX_COLUMN_WIDTH: f64 = 255.0;

/// Stream writer configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamOptions {
    /// Bytes kept in memory before the buffer moves to a temporary file
    pub chunk_size: usize,
    /// Directory for the temporary file; the system default when `None`
    pub temp_dir: Option<PathBuf>,
}

impl Default for StreamOptions {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            temp_dir: None,
        }
    }
}

impl StreamOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn temp_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.temp_dir = Some(dir.into());
        self
    }
}

/// Writes one worksheet of a [`Workbook`] row by row
///
/// The writer borrows the workbook for its whole lifetime. [`flush`]
/// stores the finished part in the workbook; [`abort`] discards it.
/// A writer dropped without either leaves the sheet marked as streaming,
/// and packaging the workbook fails until
/// [`Workbook::cancel_stream`] is called.
///
/// [`flush`]: StreamWriter::flush
/// [`abort`]: StreamWriter::abort
#[derive(Debug)]
pub struct StreamWriter<'a> {
    workbook: &'a mut Workbook,
    sheet_index: usize,
    sheet_path: String,
    buffer: SpillBuffer,
    last_row: u32,
    sheet_data_opened: bool,
    cols: String,
    merge_cells: String,
    merge_count: usize,
    table_parts: Option<String>,
}

impl<'a> StreamWriter<'a> {
    /// Start streaming the sheet named `sheet` with default options
    pub fn new(workbook: &'a mut Workbook, sheet: &str) -> XlsxResult<Self> {
        Self::with_options(workbook, sheet, StreamOptions::default())
    }

    /// Start streaming the sheet named `sheet`
    ///
    /// Fails if the name is invalid, the sheet does not exist, another
    /// stream for it is still open or it was already streamed.
    pub fn with_options(
        workbook: &'a mut Workbook,
        sheet: &str,
        options: StreamOptions,
    ) -> XlsxResult<Self> {
        check_sheet_name(sheet)?;
        let sheet_index = workbook
            .sheet_index(sheet)
            .ok_or_else(|| Error::SheetNotFound(sheet.to_string()))?;
        let sheet_path = workbook.sheet_path(sheet_index)?;
        workbook.begin_stream(&sheet_path)?;

        let mut writer = Self {
            workbook,
            sheet_index,
            sheet_path,
            buffer: SpillBuffer::new(options.chunk_size, options.temp_dir),
            last_row: 0,
            sheet_data_opened: false,
            cols: String::new(),
            merge_cells: String::new(),
            merge_count: 0,
            table_parts: None,
        };

        let head = render_span(
            writer.worksheet()?,
            SheetSection::SheetPr,
            SheetSection::Dimension,
        );
        writer.buffer.write_str(WORKSHEET_HEADER);
        writer.buffer.write_str(&head);

        debug!(
            "streaming worksheet '{}' into {}",
            sheet, writer.sheet_path
        );
        Ok(writer)
    }

    /// Package path of the worksheet being written
    pub fn sheet_path(&self) -> &str {
        &self.sheet_path
    }

    /// Last row number written, 0 before the first row
    pub fn last_row(&self) -> u32 {
        self.last_row
    }

    /// Bytes produced so far
    pub fn bytes_written(&self) -> u64 {
        self.buffer.len()
    }

    /// Set the width of columns `min..=max` (1-based). Must be called
    /// before the first row.
    pub fn set_column_width(&mut self, min: u32, max: u32, width: f64) -> XlsxResult<()> {
        if self.sheet_data_opened {
            return Err(XlsxError::SheetDataStarted("set_column_width"));
        }
        for col in [min, max] {
            if col < 1 || col > MAX_COLS as u32 {
                return Err(XlsxError::ColumnNumber(col));
            }
        }
        if !(width.is_finite() && (0.0..=MAX_COLUMN_WIDTH).contains(&width)) {
            return Err(XlsxError::ColumnWidth(width));
        }
        let (min, max) = if min > max { (max, min) } else { (min, max) };
        self.cols.push_str(&format!(
            "<col min=\"{}\" max=\"{}\" width=\"{}\" customWidth=\"1\"/>",
            min, max, width
        ));
        Ok(())
    }

    /// Freeze or split panes. Must be called before the first row.
    pub fn set_panes(&mut self, panes: Panes) -> XlsxResult<()> {
        if self.sheet_data_opened {
            return Err(XlsxError::SheetDataStarted("set_panes"));
        }
        self.worksheet_mut()?.set_panes(panes);
        Ok(())
    }

    /// Insert a manual page break above and left of `cell`
    pub fn insert_page_break(&mut self, cell: &str) -> XlsxResult<()> {
        let addr = CellAddress::parse(cell)?;
        self.worksheet_mut()?.insert_page_break(addr);
        Ok(())
    }

    /// Write `values` into consecutive columns starting at `cell`
    ///
    /// The row number of `cell` must be greater than that of every row
    /// written before. [`CellInput::Null`] values leave their column empty.
    pub fn write_row<I, V>(
        &mut self,
        cell: &str,
        values: I,
        options: Option<RowOptions>,
    ) -> XlsxResult<()>
    where
        I: IntoIterator<Item = V>,
        V: Into<CellInput>,
    {
        let start = CellAddress::parse(cell)?;
        let row = start.row_number();
        if row <= self.last_row {
            return Err(XlsxError::RowOrder { row });
        }
        let options = options.unwrap_or_default();
        options.validate()?;

        self.last_row = row;
        self.open_sheet_data()?;

        let mut xml = format!("<row r=\"{}\"{}>", row, options.attrs());
        let result = self.write_cells(&mut xml, start, options.style_id, values);
        xml.push_str("</row>");
        self.buffer.write_str(&xml);
        result?;

        self.buffer.sync()?;
        Ok(())
    }

    fn write_cells<I, V>(
        &mut self,
        xml: &mut String,
        start: CellAddress,
        row_style: u32,
        values: I,
    ) -> XlsxResult<()>
    where
        I: IntoIterator<Item = V>,
        V: Into<CellInput>,
    {
        for (offset, value) in values.into_iter().enumerate() {
            let value = value.into();
            if value.is_null() {
                continue;
            }
            let col = start.col as usize + offset;
            if col >= MAX_COLS as usize {
                return Err(XlsxError::ColumnNumber(col as u32 + 1));
            }
            let reference = CellAddress::new(start.row, col as u16).to_a1_string();
            if let Some(cell) = encode::encode_cell(self.workbook, reference, row_style, &value)? {
                cell.write_to(xml);
            }
        }
        Ok(())
    }

    /// Merge the cells between two corners
    pub fn merge_cell(&mut self, top_left: &str, bottom_right: &str) -> XlsxResult<()> {
        let range = CellRange::new(
            CellAddress::parse(top_left)?,
            CellAddress::parse(bottom_right)?,
        );
        self.merge_cells.push_str(&format!(
            "<mergeCell ref=\"{}\"/>",
            range.to_ref_string()
        ));
        self.merge_count += 1;
        Ok(())
    }

    /// Turn a range whose first row was already written into a table
    ///
    /// Header names are read back from the streamed first row. Only one
    /// table can be added per writer.
    pub fn add_table(&mut self, options: TableOptions) -> XlsxResult<()> {
        if self.table_parts.is_some() {
            return Err(XlsxError::TableAlreadyAdded);
        }
        let range = table::table_range(&options.range)?;

        let id = self.workbook.table_count() as u32 + 1;
        let name = match options.name.as_deref().filter(|n| !n.is_empty()) {
            Some(name) => {
                table::check_table_name(name)?;
                name.to_string()
            }
            None => format!("Table{}", id),
        };
        if self.workbook.has_table_name(&name) {
            return Err(XlsxError::DuplicateTableName(name));
        }

        let width = range.col_count() as usize;
        let headers = {
            let reader = BufReader::new(self.buffer.reader()?);
            lookback::read_row(
                reader,
                self.workbook,
                range.start.row_number(),
                range.start.col,
                width,
            )?
        };
        let columns = table::column_names(&headers, width);
        let xml = table::table_xml(id, &name, &range, &columns, &options);

        let part_path = format!("xl/tables/table{}.xml", id);
        self.workbook.save_part(&part_path, xml)?;
        self.workbook.register_table(name.as_str(), self.sheet_path.as_str());
        self.workbook
            .add_content_type_override(&part_path, table::TABLE_CONTENT_TYPE);
        let r_id = self.workbook.add_relationship(
            &self.sheet_path,
            table::TABLE_REL_TYPE,
            &format!("../tables/table{}.xml", id),
        );
        self.table_parts = Some(table::table_parts_xml(r_id));

        debug!("registered table '{}' over {} as {}", name, range.to_ref_string(), part_path);
        Ok(())
    }

    /// Finish the worksheet and store it in the workbook
    pub fn flush(mut self) -> XlsxResult<()> {
        self.open_sheet_data()?;

        let mut tail = String::from("</sheetData>");
        {
            let ws = self.worksheet()?;
            tail.push_str(&render_span(
                ws,
                SheetSection::SheetCalcPr,
                SheetSection::CustomSheetViews,
            ));
            if self.merge_count > 0 {
                tail.push_str(&format!("<mergeCells count=\"{}\">", self.merge_count));
                tail.push_str(&self.merge_cells);
                tail.push_str("</mergeCells>");
            }
            tail.push_str(&render_span(
                ws,
                SheetSection::PhoneticPr,
                SheetSection::WebPublishItems,
            ));
            if let Some(table_parts) = &self.table_parts {
                tail.push_str(table_parts);
            }
            tail.push_str(&render_section(ws, SheetSection::ExtLst));
        }
        tail.push_str("</worksheet>");
        self.buffer.write_str(&tail);

        let StreamWriter {
            workbook,
            sheet_index,
            sheet_path,
            buffer,
            ..
        } = self;
        let part = buffer.into_part()?;
        let len = part.len();
        workbook.finish_stream(sheet_index, part)?;

        debug!("flushed worksheet {} ({} bytes)", sheet_path, len);
        Ok(())
    }

    /// Discard everything written and close the stream
    pub fn abort(mut self) -> XlsxResult<()> {
        self.workbook.cancel_stream(&self.sheet_path);
        self.buffer.close()?;
        debug!("aborted stream for {}", self.sheet_path);
        Ok(())
    }

    /// Write the sections preceding `sheetData` and open it, once
    fn open_sheet_data(&mut self) -> XlsxResult<()> {
        if self.sheet_data_opened {
            return Ok(());
        }
        let mut xml = render_span(
            self.worksheet()?,
            SheetSection::SheetViews,
            SheetSection::SheetFormatPr,
        );
        if !self.cols.is_empty() {
            xml.push_str("<cols>");
            xml.push_str(&self.cols);
            xml.push_str("</cols>");
        }
        xml.push_str("<sheetData>");
        self.buffer.write_str(&xml);
        self.sheet_data_opened = true;
        Ok(())
    }

    fn worksheet(&self) -> XlsxResult<&Worksheet> {
        let count = self.workbook.sheet_count();
        self.workbook
            .worksheet(self.sheet_index)
            .ok_or_else(|| Error::SheetOutOfBounds(self.sheet_index, count).into())
    }

    fn worksheet_mut(&mut self) -> XlsxResult<&mut Worksheet> {
        let count = self.workbook.sheet_count();
        self.workbook
            .worksheet_mut(self.sheet_index)
            .ok_or_else(|| Error::SheetOutOfBounds(self.sheet_index, count).into())
    }
}
