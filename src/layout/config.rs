//! Page configuration and the derived layout dimensions

use crate::layout::format::{
    get_page_dimensions, get_writable_area, FormatSpec, PageDimensions, PageMargins,
    PageOrientation, CUSTOM_DEFAULT_MARGIN,
};
use serde::{Deserialize, Serialize};

/// Partial margin override; unset sides keep their resolved default
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MarginOverrides {
    pub top: Option<f64>,
    pub right: Option<f64>,
    pub bottom: Option<f64>,
    pub left: Option<f64>,
}

impl MarginOverrides {
    pub fn top(px: f64) -> Self {
        Self {
            top: Some(px),
            ..Self::default()
        }
    }

    /// Overlay these overrides on resolved margins
    pub fn apply_to(&self, margins: PageMargins) -> PageMargins {
        PageMargins {
            top: self.top.unwrap_or(margins.top),
            right: self.right.unwrap_or(margins.right),
            bottom: self.bottom.unwrap_or(margins.bottom),
            left: self.left.unwrap_or(margins.left),
        }
    }

    /// Merge `newer` on top of `self`, field by field
    pub fn merge(&self, newer: &MarginOverrides) -> MarginOverrides {
        MarginOverrides {
            top: newer.top.or(self.top),
            right: newer.right.or(self.right),
            bottom: newer.bottom.or(self.bottom),
            left: newer.left.or(self.left),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.top.is_none() && self.right.is_none() && self.bottom.is_none() && self.left.is_none()
    }
}

/// Normalized page configuration.
///
/// Treated as an immutable value: every change builds a new config so
/// consumers can detect changes with `==`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageConfig {
    pub format: FormatSpec,
    pub orientation: PageOrientation,
    pub margins: PageMargins,
}

impl Default for PageConfig {
    fn default() -> Self {
        create_page_config(FormatSpec::default(), PageOrientation::default(), None)
    }
}

impl PageConfig {
    /// New config with a different format; margins re-resolve from the
    /// new format's defaults before `overrides` are applied
    pub fn with_format(
        &self,
        format: impl Into<FormatSpec>,
        overrides: Option<MarginOverrides>,
    ) -> Self {
        create_page_config(format, self.orientation, overrides)
    }

    /// New config with a different orientation
    pub fn with_orientation(&self, orientation: PageOrientation) -> Self {
        Self {
            orientation,
            ..*self
        }
    }

    /// New config with some margins replaced
    pub fn with_margins(&self, overrides: &MarginOverrides) -> Self {
        Self {
            margins: overrides.apply_to(self.margins),
            ..*self
        }
    }
}

/// Margins a format starts with before overrides
fn resolve_default_margins(format: FormatSpec) -> PageMargins {
    match format {
        FormatSpec::Named(named) => named.default_margins(),
        FormatSpec::Custom(_) => PageMargins::uniform(CUSTOM_DEFAULT_MARGIN),
    }
}

/// Build a configuration from a format, orientation and optional partial
/// margin overrides
pub fn create_page_config(
    format: impl Into<FormatSpec>,
    orientation: PageOrientation,
    margin_overrides: Option<MarginOverrides>,
) -> PageConfig {
    let format = format.into();
    let defaults = resolve_default_margins(format);
    let margins = match margin_overrides {
        Some(overrides) => overrides.apply_to(defaults),
        None => defaults,
    };

    PageConfig {
        format,
        orientation,
        margins,
    }
}

/// Page dimensions after the orientation swap
pub fn get_effective_dimensions(config: &PageConfig) -> PageDimensions {
    get_page_dimensions(config.format, config.orientation)
}

/// Derived page geometry. Everything downstream reads page and content
/// sizes from here.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageLayoutDimensions {
    pub page: PageDimensions,
    pub content: PageDimensions,
    pub margins: PageMargins,
    pub aspect_ratio: f64,
}

impl PageLayoutDimensions {
    /// Height of the furniture between two pages' content areas:
    /// bottom margin, gap, next top margin
    pub fn furniture_height(&self, gap: f64) -> f64 {
        self.margins.bottom + gap + self.margins.top
    }

    /// Visual distance between the tops of two consecutive content areas
    pub fn page_stride(&self, gap: f64) -> f64 {
        self.content.height + self.furniture_height(gap)
    }
}

/// Compose effective dimensions and writable area into one record
pub fn get_page_layout_dimensions(config: &PageConfig) -> PageLayoutDimensions {
    let page = get_effective_dimensions(config);
    let content = get_writable_area(page, &config.margins);

    PageLayoutDimensions {
        page,
        content,
        margins: config.margins,
        aspect_ratio: page.width / page.height,
    }
}
