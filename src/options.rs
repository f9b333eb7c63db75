//! User-facing pagination options

use crate::error::Result;
use crate::layout::breaks::DEFAULT_WRITE_THRESHOLD;
use crate::layout::{
    create_page_config, FormatSpec, MarginOverrides, PageConfig, PageOrientation,
    DEFAULT_MAX_ITERATIONS, DEFAULT_MIN_CONTENT_HEIGHT,
};
use serde::{Deserialize, Serialize};

/// Default gap between pages in pixels
pub const DEFAULT_PAGE_GAP: f64 = 50.0;

/// Default word between the current and total page numbers
pub const DEFAULT_PAGE_NUMBER_SEPARATOR: &str = "of";

/// Everything a host can configure. Every field is optional in JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PaginationOptions {
    pub format: FormatSpec,
    pub orientation: PageOrientation,
    /// Partial margin overrides on top of the format defaults
    pub margins: MarginOverrides,
    /// Gap between pages in pixels
    pub page_gap: f64,
    pub show_page_numbers: bool,
    pub page_number_separator: String,
    /// Marker spacing changes below this many pixels are not written
    pub break_write_threshold: f64,
    /// Bound on page-count solver iterations
    pub max_solver_iterations: usize,
    /// Content height assumed when the document has no measurable content
    pub min_content_height: f64,
}

impl Default for PaginationOptions {
    fn default() -> Self {
        Self {
            format: FormatSpec::default(),
            orientation: PageOrientation::default(),
            margins: MarginOverrides::default(),
            page_gap: DEFAULT_PAGE_GAP,
            show_page_numbers: true,
            page_number_separator: DEFAULT_PAGE_NUMBER_SEPARATOR.to_string(),
            break_write_threshold: DEFAULT_WRITE_THRESHOLD,
            max_solver_iterations: DEFAULT_MAX_ITERATIONS,
            min_content_height: DEFAULT_MIN_CONTENT_HEIGHT,
        }
    }
}

impl PaginationOptions {
    /// Parse options from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Initial page configuration described by these options
    pub fn page_config(&self) -> PageConfig {
        let overrides = (!self.margins.is_empty()).then_some(self.margins);
        create_page_config(self.format, self.orientation, overrides)
    }

    /// Gap clamped to a usable value
    pub fn page_gap(&self) -> f64 {
        if self.page_gap.is_finite() {
            self.page_gap.max(0.0)
        } else {
            DEFAULT_PAGE_GAP
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PaginationError;
    use crate::layout::{PageDimensions, PageFormat};

    #[test]
    fn test_defaults() {
        let options = PaginationOptions::default();
        assert_eq!(options.page_config(), PageConfig::default());
        assert_eq!(options.page_gap(), 50.0);
        assert!(options.show_page_numbers);
        assert_eq!(options.max_solver_iterations, 5);
    }

    #[test]
    fn test_from_partial_json() {
        let options = PaginationOptions::from_json(
            r#"{"format":"a4","orientation":"landscape","margins":{"top":40},"pageGap":24}"#,
        )
        .unwrap();
        assert_eq!(options.format, FormatSpec::Named(PageFormat::A4));
        assert_eq!(options.orientation, PageOrientation::Landscape);
        assert_eq!(options.page_gap(), 24.0);

        let config = options.page_config();
        assert_eq!(config.margins.top, 40.0);
        assert_eq!(config.margins.left, 96.0);
        assert_eq!(options.page_number_separator, "of");
    }

    #[test]
    fn test_custom_format_json() {
        let options =
            PaginationOptions::from_json(r#"{"format":{"width":500,"height":700}}"#).unwrap();
        assert_eq!(
            options.format,
            FormatSpec::Custom(PageDimensions::new(500.0, 700.0).unwrap())
        );
    }

    #[test]
    fn test_unknown_format_fails_fast() {
        let err = PaginationOptions::from_json(r#"{"format":"Folio"}"#).unwrap_err();
        assert!(matches!(err, PaginationError::InvalidOptions(_)));
    }

    #[test]
    fn test_negative_gap_is_clamped() {
        let options = PaginationOptions {
            page_gap: -10.0,
            ..PaginationOptions::default()
        };
        assert_eq!(options.page_gap(), 0.0);
    }
}
