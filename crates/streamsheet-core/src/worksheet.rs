//! Worksheet structural snapshot
//!
//! Row data of a streamed sheet never lives here. A [`Worksheet`] only keeps
//! the structural fields that surround `<sheetData>` in the worksheet part:
//! views and panes, page breaks, protection, page layout, plus verbatim XML
//! for any section that has no typed model.

use std::collections::BTreeMap;

use crate::cell::{CellAddress, CellRange};
use crate::style::Color;
use crate::{MAX_COLS, MAX_ROWS};

/// Child elements of `<worksheet>`, in the order the schema requires
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SheetSection {
    SheetPr,
    Dimension,
    SheetViews,
    SheetFormatPr,
    Cols,
    SheetData,
    SheetCalcPr,
    SheetProtection,
    ProtectedRanges,
    Scenarios,
    AutoFilter,
    SortState,
    DataConsolidate,
    CustomSheetViews,
    MergeCells,
    PhoneticPr,
    ConditionalFormatting,
    DataValidations,
    Hyperlinks,
    PrintOptions,
    PageMargins,
    PageSetup,
    HeaderFooter,
    RowBreaks,
    ColBreaks,
    CustomProperties,
    CellWatches,
    IgnoredErrors,
    SmartTags,
    Drawing,
    LegacyDrawing,
    LegacyDrawingHF,
    DrawingHF,
    Picture,
    OleObjects,
    Controls,
    WebPublishItems,
    TableParts,
    ExtLst,
}

impl SheetSection {
    /// Every section in schema order
    pub const ALL: [SheetSection; 39] = [
        SheetSection::SheetPr,
        SheetSection::Dimension,
        SheetSection::SheetViews,
        SheetSection::SheetFormatPr,
        SheetSection::Cols,
        SheetSection::SheetData,
        SheetSection::SheetCalcPr,
        SheetSection::SheetProtection,
        SheetSection::ProtectedRanges,
        SheetSection::Scenarios,
        SheetSection::AutoFilter,
        SheetSection::SortState,
        SheetSection::DataConsolidate,
        SheetSection::CustomSheetViews,
        SheetSection::MergeCells,
        SheetSection::PhoneticPr,
        SheetSection::ConditionalFormatting,
        SheetSection::DataValidations,
        SheetSection::Hyperlinks,
        SheetSection::PrintOptions,
        SheetSection::PageMargins,
        SheetSection::PageSetup,
        SheetSection::HeaderFooter,
        SheetSection::RowBreaks,
        SheetSection::ColBreaks,
        SheetSection::CustomProperties,
        SheetSection::CellWatches,
        SheetSection::IgnoredErrors,
        SheetSection::SmartTags,
        SheetSection::Drawing,
        SheetSection::LegacyDrawing,
        SheetSection::LegacyDrawingHF,
        SheetSection::DrawingHF,
        SheetSection::Picture,
        SheetSection::OleObjects,
        SheetSection::Controls,
        SheetSection::WebPublishItems,
        SheetSection::TableParts,
        SheetSection::ExtLst,
    ];

    /// Sections from `first` to `last`, both inclusive
    pub fn span(first: SheetSection, last: SheetSection) -> impl Iterator<Item = SheetSection> {
        Self::ALL
            .into_iter()
            .filter(move |s| *s >= first && *s <= last)
    }

    /// Element name of the section
    pub fn tag(self) -> &'static str {
        match self {
            SheetSection::SheetPr => "sheetPr",
            SheetSection::Dimension => "dimension",
            SheetSection::SheetViews => "sheetViews",
            SheetSection::SheetFormatPr => "sheetFormatPr",
            SheetSection::Cols => "cols",
            SheetSection::SheetData => "sheetData",
            SheetSection::SheetCalcPr => "sheetCalcPr",
            SheetSection::SheetProtection => "sheetProtection",
            SheetSection::ProtectedRanges => "protectedRanges",
            SheetSection::Scenarios => "scenarios",
            SheetSection::AutoFilter => "autoFilter",
            SheetSection::SortState => "sortState",
            SheetSection::DataConsolidate => "dataConsolidate",
            SheetSection::CustomSheetViews => "customSheetViews",
            SheetSection::MergeCells => "mergeCells",
            SheetSection::PhoneticPr => "phoneticPr",
            SheetSection::ConditionalFormatting => "conditionalFormatting",
            SheetSection::DataValidations => "dataValidations",
            SheetSection::Hyperlinks => "hyperlinks",
            SheetSection::PrintOptions => "printOptions",
            SheetSection::PageMargins => "pageMargins",
            SheetSection::PageSetup => "pageSetup",
            SheetSection::HeaderFooter => "headerFooter",
            SheetSection::RowBreaks => "rowBreaks",
            SheetSection::ColBreaks => "colBreaks",
            SheetSection::CustomProperties => "customProperties",
            SheetSection::CellWatches => "cellWatches",
            SheetSection::IgnoredErrors => "ignoredErrors",
            SheetSection::SmartTags => "smartTags",
            SheetSection::Drawing => "drawing",
            SheetSection::LegacyDrawing => "legacyDrawing",
            SheetSection::LegacyDrawingHF => "legacyDrawingHF",
            SheetSection::DrawingHF => "drawingHF",
            SheetSection::Picture => "picture",
            SheetSection::OleObjects => "oleObjects",
            SheetSection::Controls => "controls",
            SheetSection::WebPublishItems => "webPublishItems",
            SheetSection::TableParts => "tableParts",
            SheetSection::ExtLst => "extLst",
        }
    }
}

/// A worksheet's structural state
#[derive(Debug, Clone)]
pub struct Worksheet {
    name: String,
    part_id: u32,
    visible: bool,
    tab_color: Option<Color>,
    dimension: Option<CellRange>,
    view: SheetView,
    format: Option<SheetFormat>,
    protection: Option<SheetProtection>,
    print_options: Option<PrintOptions>,
    page_margins: Option<PageMargins>,
    page_setup: Option<PageSetup>,
    row_breaks: Vec<Break>,
    col_breaks: Vec<Break>,
    raw: BTreeMap<SheetSection, String>,
}

impl Worksheet {
    /// Create an empty worksheet stored as `xl/worksheets/sheet{part_id}.xml`
    pub(crate) fn new<S: Into<String>>(name: S, part_id: u32) -> Self {
        Self {
            name: name.into(),
            part_id,
            visible: true,
            tab_color: None,
            dimension: None,
            view: SheetView::default(),
            format: None,
            protection: None,
            print_options: None,
            page_margins: None,
            page_setup: None,
            row_breaks: Vec::new(),
            col_breaks: Vec::new(),
            raw: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn set_name<S: Into<String>>(&mut self, name: S) {
        self.name = name.into();
    }

    /// Number used in the sheet's part name
    pub fn part_id(&self) -> u32 {
        self.part_id
    }

    /// Package path of the worksheet part
    pub fn path(&self) -> String {
        format!("xl/worksheets/sheet{}.xml", self.part_id)
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// Whether the sheet tab is selected when the file opens
    pub fn is_selected(&self) -> bool {
        self.view.tab_selected
    }

    pub fn set_selected(&mut self, selected: bool) {
        self.view.tab_selected = selected;
    }

    pub fn tab_color(&self) -> Option<Color> {
        self.tab_color
    }

    pub fn set_tab_color(&mut self, color: Option<Color>) {
        self.tab_color = color;
    }

    pub fn dimension(&self) -> Option<CellRange> {
        self.dimension
    }

    /// Set the used-range hint written as `<dimension ref="..."/>`
    pub fn set_dimension(&mut self, range: Option<CellRange>) {
        self.dimension = range;
    }

    pub fn view(&self) -> &SheetView {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut SheetView {
        &mut self.view
    }

    pub fn panes(&self) -> Option<&Panes> {
        self.view.panes.as_ref()
    }

    /// Configure frozen or split panes. Panes that are neither frozen nor
    /// split remove any existing pane.
    pub fn set_panes(&mut self, panes: Panes) {
        self.view.panes = if panes.freeze || panes.split {
            Some(panes)
        } else {
            None
        };
    }

    pub fn format(&self) -> Option<&SheetFormat> {
        self.format.as_ref()
    }

    pub fn set_format(&mut self, format: Option<SheetFormat>) {
        self.format = format;
    }

    pub fn protection(&self) -> Option<&SheetProtection> {
        self.protection.as_ref()
    }

    pub fn set_protection(&mut self, protection: Option<SheetProtection>) {
        self.protection = protection;
    }

    pub fn print_options(&self) -> Option<&PrintOptions> {
        self.print_options.as_ref()
    }

    pub fn set_print_options(&mut self, options: Option<PrintOptions>) {
        self.print_options = options;
    }

    pub fn page_margins(&self) -> Option<&PageMargins> {
        self.page_margins.as_ref()
    }

    pub fn set_page_margins(&mut self, margins: Option<PageMargins>) {
        self.page_margins = margins;
    }

    pub fn page_setup(&self) -> Option<&PageSetup> {
        self.page_setup.as_ref()
    }

    pub fn set_page_setup(&mut self, setup: Option<PageSetup>) {
        self.page_setup = setup;
    }

    pub fn row_breaks(&self) -> &[Break] {
        &self.row_breaks
    }

    pub fn col_breaks(&self) -> &[Break] {
        &self.col_breaks
    }

    /// Insert a manual page break before `cell`: a row break above its row
    /// and a column break left of its column. The first row and column
    /// never get a break, and existing breaks are not duplicated.
    pub fn insert_page_break(&mut self, cell: CellAddress) {
        if cell.row > 0 {
            add_break(&mut self.row_breaks, cell.row, MAX_COLS as u32 - 1);
        }
        if cell.col > 0 {
            add_break(&mut self.col_breaks, cell.col as u32, MAX_ROWS - 1);
        }
    }

    /// Verbatim XML stored for a section, if any
    pub fn raw_section(&self, section: SheetSection) -> Option<&str> {
        self.raw.get(&section).map(String::as_str)
    }

    /// Store verbatim XML for a section; it replaces the typed rendering
    /// of that section wherever the worksheet is serialized.
    pub fn set_raw_section<S: Into<String>>(&mut self, section: SheetSection, xml: S) {
        self.raw.insert(section, xml.into());
    }

    pub fn remove_raw_section(&mut self, section: SheetSection) -> Option<String> {
        self.raw.remove(&section)
    }

    /// Drop all structural state, keeping only the sheet's identity
    pub fn clear_structure(&mut self) {
        let mut cleared = Self::new(std::mem::take(&mut self.name), self.part_id);
        cleared.visible = self.visible;
        cleared.view.tab_selected = self.view.tab_selected;
        *self = cleared;
    }
}

fn add_break(breaks: &mut Vec<Break>, id: u32, max: u32) {
    if breaks.iter().any(|b| b.id == id) {
        return;
    }
    breaks.push(Break {
        id,
        max,
        manual: true,
    });
    breaks.sort_by_key(|b| b.id);
}

/// `<sheetView>` settings
#[derive(Debug, Clone, PartialEq)]
pub struct SheetView {
    pub tab_selected: bool,
    pub show_grid_lines: bool,
    pub right_to_left: bool,
    /// Zoom in percent
    pub zoom_scale: Option<u16>,
    pub panes: Option<Panes>,
}

impl Default for SheetView {
    fn default() -> Self {
        Self {
            tab_selected: false,
            show_grid_lines: true,
            right_to_left: false,
            zoom_scale: None,
            panes: None,
        }
    }
}

/// Frozen or split panes
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Panes {
    pub freeze: bool,
    pub split: bool,
    /// Columns left of the split (frozen) or horizontal split position in twips
    pub x_split: f64,
    /// Rows above the split (frozen) or vertical split position in twips
    pub y_split: f64,
    /// First visible cell of the bottom-right pane
    pub top_left_cell: Option<CellAddress>,
    pub active_pane: Option<PaneState>,
    pub selections: Vec<Selection>,
}

impl Panes {
    /// Freeze the first `rows` rows and `cols` columns
    ///
    /// ```
    /// use streamsheet_core::{CellAddress, PaneState, Panes};
    ///
    /// let panes = Panes::freeze(1, 0);
    /// assert_eq!(panes.top_left_cell, Some(CellAddress::new(1, 0)));
    /// assert_eq!(panes.active_pane, Some(PaneState::BottomLeft));
    /// ```
    pub fn freeze(rows: u32, cols: u16) -> Self {
        let top_left = CellAddress::new(rows, cols);
        let pane = match (rows > 0, cols > 0) {
            (true, true) => Some(PaneState::BottomRight),
            (true, false) => Some(PaneState::BottomLeft),
            (false, true) => Some(PaneState::TopRight),
            (false, false) => None,
        };
        Self {
            freeze: rows > 0 || cols > 0,
            split: false,
            x_split: cols as f64,
            y_split: rows as f64,
            top_left_cell: Some(top_left),
            active_pane: pane,
            selections: vec![Selection {
                pane,
                active_cell: Some(top_left),
                sqref: Some(CellRange::new(top_left, top_left)),
            }],
        }
    }
}

/// Pane identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaneState {
    BottomLeft,
    BottomRight,
    TopLeft,
    TopRight,
}

impl PaneState {
    pub fn as_str(self) -> &'static str {
        match self {
            PaneState::BottomLeft => "bottomLeft",
            PaneState::BottomRight => "bottomRight",
            PaneState::TopLeft => "topLeft",
            PaneState::TopRight => "topRight",
        }
    }
}

/// A `<selection>` inside a sheet view
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Selection {
    pub pane: Option<PaneState>,
    pub active_cell: Option<CellAddress>,
    pub sqref: Option<CellRange>,
}

/// `<sheetFormatPr>` defaults
#[derive(Debug, Clone, PartialEq)]
pub struct SheetFormat {
    pub default_row_height: f64,
    pub default_col_width: Option<f64>,
    pub outline_level_row: u8,
    pub outline_level_col: u8,
}

impl Default for SheetFormat {
    fn default() -> Self {
        Self {
            default_row_height: 15.0,
            default_col_width: None,
            outline_level_row: 0,
            outline_level_col: 0,
        }
    }
}

/// Sheet protection settings; `true` flags allow the action while the
/// sheet is protected
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SheetProtection {
    /// Legacy 16-bit password hash
    pub password_hash: Option<u16>,
    pub select_locked_cells: bool,
    pub select_unlocked_cells: bool,
    pub format_cells: bool,
    pub format_columns: bool,
    pub format_rows: bool,
    pub insert_rows: bool,
    pub delete_rows: bool,
    pub sort: bool,
    pub auto_filter: bool,
}

/// `<printOptions>`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PrintOptions {
    pub grid_lines: bool,
    pub headings: bool,
    pub horizontal_centered: bool,
    pub vertical_centered: bool,
}

/// `<pageMargins>` in inches
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageMargins {
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
    pub header: f64,
    pub footer: f64,
}

impl Default for PageMargins {
    fn default() -> Self {
        Self {
            left: 0.7,
            right: 0.7,
            top: 0.75,
            bottom: 0.75,
            header: 0.3,
            footer: 0.3,
        }
    }
}

/// `<pageSetup>`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSetup {
    /// Paper size code (1 = Letter, 9 = A4)
    pub paper_size: u8,
    pub orientation: PageOrientation,
    /// Scale percentage (10-400)
    pub scale: u16,
    pub fit_to_width: Option<u16>,
    pub fit_to_height: Option<u16>,
}

impl Default for PageSetup {
    fn default() -> Self {
        Self {
            paper_size: 1,
            orientation: PageOrientation::Portrait,
            scale: 100,
            fit_to_width: None,
            fit_to_height: None,
        }
    }
}

/// Page orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageOrientation {
    #[default]
    Portrait,
    Landscape,
}

/// A row or column page break
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Break {
    /// 0-based index of the row/column the break follows
    pub id: u32,
    /// Last column (row breaks) or row (column breaks) the break spans
    pub max: u32,
    /// Inserted manually
    pub manual: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_section_span_is_inclusive() {
        let tags: Vec<_> = SheetSection::span(SheetSection::SheetPr, SheetSection::Dimension)
            .map(SheetSection::tag)
            .collect();
        assert_eq!(tags, vec!["sheetPr", "dimension"]);

        let count = SheetSection::span(SheetSection::PhoneticPr, SheetSection::WebPublishItems)
            .count();
        assert_eq!(count, 22);
    }

    #[test]
    fn test_insert_page_break() {
        let mut ws = Worksheet::new("Sheet1", 1);
        ws.insert_page_break(CellAddress::parse("A1").unwrap());
        assert!(ws.row_breaks().is_empty());
        assert!(ws.col_breaks().is_empty());

        ws.insert_page_break(CellAddress::parse("C5").unwrap());
        ws.insert_page_break(CellAddress::parse("C5").unwrap());
        ws.insert_page_break(CellAddress::parse("A2").unwrap());

        assert_eq!(
            ws.row_breaks(),
            &[
                Break { id: 1, max: 16_383, manual: true },
                Break { id: 4, max: 16_383, manual: true },
            ]
        );
        assert_eq!(
            ws.col_breaks(),
            &[Break { id: 2, max: 1_048_575, manual: true }]
        );
    }

    #[test]
    fn test_set_panes_without_freeze_or_split_clears() {
        let mut ws = Worksheet::new("Sheet1", 1);
        ws.set_panes(Panes::freeze(2, 1));
        assert_eq!(ws.panes().map(|p| p.x_split), Some(1.0));

        ws.set_panes(Panes::default());
        assert!(ws.panes().is_none());
    }

    #[test]
    fn test_clear_structure_keeps_identity() {
        let mut ws = Worksheet::new("Report", 3);
        ws.set_selected(true);
        ws.set_tab_color(Some(Color::RED));
        ws.insert_page_break(CellAddress::new(4, 0));
        ws.set_raw_section(SheetSection::HeaderFooter, "<headerFooter/>");

        ws.clear_structure();

        assert_eq!(ws.name(), "Report");
        assert_eq!(ws.path(), "xl/worksheets/sheet3.xml");
        assert!(ws.is_selected());
        assert!(ws.tab_color().is_none());
        assert!(ws.row_breaks().is_empty());
        assert!(ws.raw_section(SheetSection::HeaderFooter).is_none());
    }
}
