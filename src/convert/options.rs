//! Conversion options shared by both directions.

use crate::common::encoding::DEFAULT_CODE_PAGE;
use serde::{Deserialize, Serialize};

/// Conversion options.
///
/// # Example
///
/// ```rust
/// use xaml_rtf::convert::ConvertOptions;
///
/// let options = ConvertOptions::default().with_strict(true).with_code_page(1251);
/// assert!(options.strict);
/// assert_eq!(options.code_page, 1251);
/// assert_eq!(options.max_depth, 1024);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertOptions {
    /// Reject unknown XAML elements and attributes, and known attributes
    /// with values RTF cannot express, with `InvalidParameter`
    pub strict: bool,
    /// ANSI code page of generated RTF (`\ansicpgN`)
    pub code_page: u32,
    /// Font 0 of generated RTF when the root element names none
    pub default_font: String,
    /// Document font size in half-points when RTF does not set one
    pub default_font_size: i32,
    /// Deepest RTF group nesting accepted
    pub max_depth: usize,
    /// Convert pictures; when off they are dropped in both directions
    pub embed_images: bool,
    /// Width in twips of table columns without a `Width`
    pub default_column_width: i32,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            strict: false,
            code_page: DEFAULT_CODE_PAGE,
            default_font: "Times New Roman".to_string(),
            default_font_size: 24, // 12pt
            max_depth: 1024,
            embed_images: true,
            default_column_width: 2880, // 2 inches
        }
    }
}

impl ConvertOptions {
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn with_code_page(mut self, code_page: u32) -> Self {
        self.code_page = code_page;
        self
    }

    pub fn with_default_font(mut self, name: impl Into<String>) -> Self {
        self.default_font = name.into();
        self
    }

    pub fn with_default_font_size(mut self, half_points: i32) -> Self {
        self.default_font_size = half_points;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_embed_images(mut self, embed: bool) -> Self {
        self.embed_images = embed;
        self
    }

    pub fn with_default_column_width(mut self, twips: i32) -> Self {
        self.default_column_width = twips;
        self
    }
}
