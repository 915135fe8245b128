//! Rich text runs

use crate::style::FontStyle;

/// One run of a rich inline string: a piece of text with optional font
/// properties. A run without a font inherits the cell's formatting.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RichTextRun {
    /// Run text
    pub text: String,
    /// Run font, if any
    pub font: Option<FontStyle>,
}

impl RichTextRun {
    /// Create a run with no explicit formatting
    pub fn new<S: Into<String>>(text: S) -> Self {
        Self {
            text: text.into(),
            font: None,
        }
    }

    /// Create a run with its own font
    pub fn with_font<S: Into<String>>(text: S, font: FontStyle) -> Self {
        Self {
            text: text.into(),
            font: Some(font),
        }
    }
}
