//! Manual page break marker element contract
//!
//! A manual break is an atomic block with no content. It serializes to a
//! `div` tagged with `data-type="page-break"` and is recognized on import
//! by that attribute or by one of the known class names.

/// Attribute carrying the marker type
pub const MARKER_TYPE_ATTRIBUTE: &str = "data-type";

/// Value of [`MARKER_TYPE_ATTRIBUTE`] for manual breaks
pub const MARKER_TYPE_VALUE: &str = "page-break";

/// Class written on serialized markers
pub const MARKER_CLASS: &str = "pf-manual-break";

/// Class names accepted on import
pub const RECOGNIZED_MARKER_CLASSES: [&str; 2] = ["page-break", MARKER_CLASS];

/// Serialized form of a manual break
pub fn marker_html() -> String {
    format!(
        "<div {}=\"{}\" class=\"{}\" contenteditable=\"false\"></div>",
        MARKER_TYPE_ATTRIBUTE, MARKER_TYPE_VALUE, MARKER_CLASS
    )
}

/// Whether an element with these attributes is a manual break marker
pub fn is_marker_element<'a, I>(attributes: I) -> bool
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    attributes.into_iter().any(|(name, value)| {
        if name.eq_ignore_ascii_case(MARKER_TYPE_ATTRIBUTE) {
            value.trim() == MARKER_TYPE_VALUE
        } else if name.eq_ignore_ascii_case("class") {
            value
                .split_ascii_whitespace()
                .any(|class| RECOGNIZED_MARKER_CLASSES.contains(&class))
        } else {
            false
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_by_attribute() {
        assert!(is_marker_element([("data-type", "page-break")]));
        assert!(!is_marker_element([("data-type", "paragraph")]));
    }

    #[test]
    fn test_matches_by_class() {
        assert!(is_marker_element([("class", "note page-break")]));
        assert!(is_marker_element([("class", "pf-manual-break")]));
        assert!(!is_marker_element([("class", "page-breaker")]));
        assert!(!is_marker_element(std::iter::empty()));
    }

    #[test]
    fn test_serialized_marker_is_recognized() {
        let html = marker_html();
        assert!(html.contains("data-type=\"page-break\""));
        assert!(is_marker_element([
            ("data-type", MARKER_TYPE_VALUE),
            ("class", MARKER_CLASS),
        ]));
    }
}
