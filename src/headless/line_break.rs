//! Greedy line breaking for headless text blocks

use unicode_linebreak::{linebreaks, BreakOpportunity};
use unicode_segmentation::UnicodeSegmentation;

/// Fixed-pitch text metrics
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextMetrics {
    /// Advance of one grapheme cluster
    pub char_width: f64,
    pub line_height: f64,
}

impl Default for TextMetrics {
    fn default() -> Self {
        // 16px text at 1.25 line height, ~0.5em average advance
        Self {
            char_width: 8.0,
            line_height: 20.0,
        }
    }
}

/// Line breaker
#[derive(Debug, Clone, Default)]
pub struct LineBreaker {
    metrics: TextMetrics,
}

impl LineBreaker {
    pub fn new(metrics: TextMetrics) -> Self {
        Self { metrics }
    }

    pub fn metrics(&self) -> &TextMetrics {
        &self.metrics
    }

    /// Width of a run, ignoring control characters
    fn width(&self, text: &str) -> f64 {
        let clusters = text
            .graphemes(true)
            .filter(|g| !g.chars().all(char::is_control))
            .count();
        clusters as f64 * self.metrics.char_width
    }

    /// Number of lines `text` occupies at `max_width`
    pub fn line_count(&self, text: &str, max_width: f64) -> usize {
        if text.is_empty() {
            // Empty paragraph still has one line
            return 1;
        }

        let mut lines = 1;
        let mut x = 0.0;
        let mut start = 0;

        for (end, opportunity) in linebreaks(text) {
            let segment = &text[start..end];
            let visible = self.width(segment.trim_end());
            let advance = self.width(segment);

            // Soft wrap before this segment
            if x > 0.0 && x + visible > max_width {
                lines += 1;
                x = 0.0;
            }

            // Emergency wrap inside a segment wider than the line
            if max_width > 0.0 && visible > max_width {
                let extra = (visible / max_width).ceil() as usize - 1;
                lines += extra;
                x = advance - extra as f64 * max_width;
            } else {
                x += advance;
            }

            if opportunity == BreakOpportunity::Mandatory && end < text.len() {
                lines += 1;
                x = 0.0;
            }
            start = end;
        }

        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_breaker() -> LineBreaker {
        LineBreaker::new(TextMetrics {
            char_width: 8.0,
            line_height: 10.0,
        })
    }

    #[test]
    fn test_empty_paragraph() {
        assert_eq!(test_breaker().line_count("", 100.0), 1);
    }

    #[test]
    fn test_single_line() {
        assert_eq!(test_breaker().line_count("Hello", 100.0), 1);
    }

    #[test]
    fn test_line_wrap() {
        // With 8px per char, 40px width = 5 chars per line
        assert_eq!(test_breaker().line_count("Hello World", 40.0), 2);
    }

    #[test]
    fn test_explicit_newline() {
        assert_eq!(test_breaker().line_count("Hello\nWorld", 1000.0), 2);
    }

    #[test]
    fn test_long_word_wraps_by_width() {
        // 20 chars at 8px = 160px in 40px lines
        assert_eq!(test_breaker().line_count("abcdefghijklmnopqrst", 40.0), 4);
    }
}
