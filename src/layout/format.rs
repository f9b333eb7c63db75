//! Page formats, dimensions and the page-count arithmetic built on them

use crate::error::{PaginationError, Result};
use crate::layout::config::{get_page_layout_dimensions, PageConfig};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Page size in layout pixels (96 per inch)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawDimensions")]
pub struct PageDimensions {
    pub width: f64,
    pub height: f64,
}

#[derive(Deserialize)]
struct RawDimensions {
    width: f64,
    height: f64,
}

impl TryFrom<RawDimensions> for PageDimensions {
    type Error = PaginationError;

    fn try_from(raw: RawDimensions) -> Result<Self> {
        Self::new(raw.width, raw.height)
    }
}

impl PageDimensions {
    /// Create custom dimensions, rejecting negative or non-finite sizes
    pub fn new(width: f64, height: f64) -> Result<Self> {
        if !width.is_finite() || !height.is_finite() || width < 0.0 || height < 0.0 {
            return Err(PaginationError::InvalidDimensions { width, height });
        }
        Ok(Self { width, height })
    }

    /// Same size with width and height exchanged
    pub fn swapped(self) -> Self {
        Self {
            width: self.height,
            height: self.width,
        }
    }
}

/// Page margins in layout pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageMargins {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl PageMargins {
    /// Same margin on all four sides
    pub const fn uniform(px: f64) -> Self {
        Self {
            top: px,
            right: px,
            bottom: px,
            left: px,
        }
    }

    pub fn horizontal(&self) -> f64 {
        self.left + self.right
    }

    pub fn vertical(&self) -> f64 {
        self.top + self.bottom
    }
}

/// Margin used on every side when the page uses custom dimensions
pub const CUSTOM_DEFAULT_MARGIN: f64 = 96.0;

// 8.5 x 11 in
const LETTER_DIMENSIONS: PageDimensions = PageDimensions {
    width: 816.0,
    height: 1056.0,
};

// 8.5 x 14 in
const LEGAL_DIMENSIONS: PageDimensions = PageDimensions {
    width: 816.0,
    height: 1344.0,
};

// 21 x 29.7 cm
const A4_DIMENSIONS: PageDimensions = PageDimensions {
    width: 794.0,
    height: 1123.0,
};

// 1 in for the US sizes, 2.54 cm for A4; both land on 96 px
const LETTER_MARGINS: PageMargins = PageMargins::uniform(96.0);
const LEGAL_MARGINS: PageMargins = PageMargins::uniform(96.0);
const A4_MARGINS: PageMargins = PageMargins::uniform(96.0);

/// Supported named paper sizes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum PageFormat {
    A4,
    #[default]
    Letter,
    Legal,
}

impl PageFormat {
    pub const ALL: [PageFormat; 3] = [PageFormat::A4, PageFormat::Letter, PageFormat::Legal];

    /// Canonical portrait dimensions
    pub fn dimensions(self) -> PageDimensions {
        match self {
            PageFormat::A4 => A4_DIMENSIONS,
            PageFormat::Letter => LETTER_DIMENSIONS,
            PageFormat::Legal => LEGAL_DIMENSIONS,
        }
    }

    /// Default margins for this format
    pub fn default_margins(self) -> PageMargins {
        match self {
            PageFormat::A4 => A4_MARGINS,
            PageFormat::Letter => LETTER_MARGINS,
            PageFormat::Legal => LEGAL_MARGINS,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            PageFormat::A4 => "A4",
            PageFormat::Letter => "Letter",
            PageFormat::Legal => "Legal",
        }
    }
}

impl fmt::Display for PageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PageFormat {
    type Err = PaginationError;

    fn from_str(s: &str) -> Result<Self> {
        PageFormat::ALL
            .into_iter()
            .find(|format| format.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| PaginationError::UnknownFormat(s.to_string()))
    }
}

impl TryFrom<String> for PageFormat {
    type Error = PaginationError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

/// Page orientation; landscape swaps width and height at read time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageOrientation {
    #[default]
    Portrait,
    Landscape,
}

impl FromStr for PageOrientation {
    type Err = PaginationError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "portrait" => Ok(PageOrientation::Portrait),
            "landscape" => Ok(PageOrientation::Landscape),
            _ => Err(PaginationError::UnknownOrientation(s.to_string())),
        }
    }
}

/// Either a named format or explicit page dimensions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FormatSpec {
    Named(PageFormat),
    Custom(PageDimensions),
}

impl Default for FormatSpec {
    fn default() -> Self {
        FormatSpec::Named(PageFormat::default())
    }
}

impl From<PageFormat> for FormatSpec {
    fn from(format: PageFormat) -> Self {
        FormatSpec::Named(format)
    }
}

impl From<PageDimensions> for FormatSpec {
    fn from(dimensions: PageDimensions) -> Self {
        FormatSpec::Custom(dimensions)
    }
}

impl FromStr for FormatSpec {
    type Err = PaginationError;

    fn from_str(s: &str) -> Result<Self> {
        s.parse().map(FormatSpec::Named)
    }
}

/// Page dimensions for a format, swapped for landscape.
///
/// Always returns a fresh value; named formats and custom sizes are
/// treated identically.
pub fn get_page_dimensions(format: FormatSpec, orientation: PageOrientation) -> PageDimensions {
    let dimensions = match format {
        FormatSpec::Named(named) => named.dimensions(),
        FormatSpec::Custom(custom) => custom,
    };

    match orientation {
        PageOrientation::Portrait => dimensions,
        PageOrientation::Landscape => dimensions.swapped(),
    }
}

/// Default margins for a named format
pub fn get_default_margins(format: PageFormat) -> PageMargins {
    format.default_margins()
}

/// Page size minus margins. Results may be negative when margins exceed
/// the page; callers decide how to treat that.
pub fn get_writable_area(dimensions: PageDimensions, margins: &PageMargins) -> PageDimensions {
    PageDimensions {
        width: dimensions.width - margins.horizontal(),
        height: dimensions.height - margins.vertical(),
    }
}

/// Pages needed for `content_height` pixels of flowed content
pub fn calculate_page_count(content_height: f64, config: &PageConfig) -> usize {
    let writable = get_page_layout_dimensions(config).content.height;
    page_count_for(content_height, writable)
}

pub(crate) fn page_count_for(content_height: f64, writable_height: f64) -> usize {
    if writable_height <= 0.0 {
        return 1;
    }
    let pages = (content_height / writable_height).ceil();
    if pages.is_finite() && pages > 1.0 {
        pages as usize
    } else {
        1
    }
}

/// Content-coordinate offsets of the boundaries between `page_count` pages
pub fn get_page_break_positions(page_count: usize, config: &PageConfig) -> Vec<f64> {
    if page_count <= 1 {
        return Vec::new();
    }
    let writable = get_page_layout_dimensions(config).content.height;
    (1..page_count).map(|i| i as f64 * writable).collect()
}
