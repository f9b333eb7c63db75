//! Physical unit conversions at the fixed CSS reference resolution

/// Layout pixels per physical inch
pub const PX_PER_INCH: f64 = 96.0;

/// Layout pixels per centimeter (96 / 2.54)
pub const PX_PER_CM: f64 = 37.795275591;

/// Convert inches to whole layout pixels
pub fn inches_to_px(inches: f64) -> f64 {
    (inches * PX_PER_INCH).round()
}

/// Convert centimeters to whole layout pixels
pub fn cm_to_px(cm: f64) -> f64 {
    (cm * PX_PER_CM).round()
}

/// Convert pixels back to inches (exact, no rounding)
pub fn px_to_inches(px: f64) -> f64 {
    px / PX_PER_INCH
}

/// Convert pixels back to centimeters (exact, no rounding)
pub fn px_to_cm(px: f64) -> f64 {
    px / PX_PER_CM
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inches_round_to_whole_pixels() {
        assert_eq!(inches_to_px(1.0), 96.0);
        assert_eq!(inches_to_px(8.5), 816.0);
        assert_eq!(inches_to_px(0.01), 1.0);
    }

    #[test]
    fn test_cm_round_to_whole_pixels() {
        assert_eq!(cm_to_px(2.54), 96.0);
        assert_eq!(cm_to_px(21.0), 794.0);
        assert_eq!(cm_to_px(29.7), 1123.0);
    }

    #[test]
    fn test_inverse_is_exact() {
        assert_eq!(px_to_inches(48.0), 0.5);
        assert_eq!(px_to_inches(1.0), 1.0 / 96.0);
        assert!((px_to_cm(96.0) - 2.54).abs() < 1e-9);
    }
}
