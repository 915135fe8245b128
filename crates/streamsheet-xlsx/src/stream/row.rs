//! `<row>` attributes

use crate::error::{XlsxError, XlsxResult};

/// Tallest row Excel accepts, in points
pub const MAX_ROW_HEIGHT: f64 = 409.0;

/// Deepest row outline level
pub const MAX_OUTLINE_LEVEL: u8 = 7;

/// Per-row settings for [`StreamWriter::write_row`](super::StreamWriter::write_row)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RowOptions {
    /// Row height in points
    pub height: Option<f64>,
    pub hidden: bool,
    /// Style id applied to the row and inherited by its cells
    pub style_id: u32,
    pub outline_level: u8,
}

impl RowOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn height(mut self, height: f64) -> Self {
        self.height = Some(height);
        self
    }

    pub fn hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }

    pub fn style_id(mut self, style_id: u32) -> Self {
        self.style_id = style_id;
        self
    }

    pub fn outline_level(mut self, level: u8) -> Self {
        self.outline_level = level;
        self
    }

    pub(crate) fn validate(&self) -> XlsxResult<()> {
        if let Some(height) = self.height {
            if !(height.is_finite() && height <= MAX_ROW_HEIGHT) {
                return Err(XlsxError::RowHeight(height));
            }
        }
        if self.outline_level > MAX_OUTLINE_LEVEL {
            return Err(XlsxError::OutlineLevel(self.outline_level));
        }
        Ok(())
    }

    /// Attributes after `r`, each with a leading space
    pub(crate) fn attrs(&self) -> String {
        let mut attrs = String::new();
        if self.style_id > 0 {
            attrs.push_str(&format!(" s=\"{}\" customFormat=\"1\"", self.style_id));
        }
        if let Some(height) = self.height.filter(|h| *h > 0.0) {
            attrs.push_str(&format!(" ht=\"{}\" customHeight=\"1\"", height));
        }
        if self.outline_level > 0 {
            attrs.push_str(&format!(" outlineLevel=\"{}\"", self.outline_level));
        }
        if self.hidden {
            attrs.push_str(" hidden=\"1\"");
        }
        attrs
    }
}
