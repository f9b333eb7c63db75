//! The stylesheet injected once per session

use crate::surface::StyleHost;
use tracing::debug;

/// Key of the injected stylesheet; at most one exists per host
pub const STYLESHEET_ID: &str = "page-flow-pagination";

/// Rules for the furniture classes and manual break markers
pub const PAGINATION_CSS: &str = "\
.pf-overlays{position:relative;width:0;height:0;}
.pf-first-page-header,.pf-last-page-footer,.pf-last-page-filler,.pf-page-break,.pf-break-spacer{user-select:none;-webkit-user-select:none;pointer-events:none;}
.pf-page-break{display:flex;flex-direction:column;}
.pf-page-footer{display:flex;align-items:flex-end;justify-content:flex-end;}
.pf-page-gap{background:var(--pf-gap-color,#e5e7eb);}
.pf-page-number{font-size:10px;opacity:0.6;}
.pf-manual-break,[data-type=\"page-break\"]{display:block;height:0;overflow:hidden;}
";

/// Insert the stylesheet unless the host already has it.
/// Returns whether an insert happened.
pub fn ensure_stylesheet<H: StyleHost + ?Sized>(host: &mut H) -> bool {
    if host.has_stylesheet(STYLESHEET_ID) {
        return false;
    }
    debug!("Injecting pagination stylesheet");
    host.insert_stylesheet(STYLESHEET_ID, PAGINATION_CSS);
    true
}

/// Remove the stylesheet if present
pub fn release_stylesheet<H: StyleHost + ?Sized>(host: &mut H) {
    if host.has_stylesheet(STYLESHEET_ID) {
        debug!("Removing pagination stylesheet");
        host.remove_stylesheet(STYLESHEET_ID);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustc_hash::FxHashMap;

    #[derive(Default)]
    struct Sheets(FxHashMap<String, String>, usize);

    impl StyleHost for Sheets {
        fn has_stylesheet(&self, id: &str) -> bool {
            self.0.contains_key(id)
        }

        fn insert_stylesheet(&mut self, id: &str, css: &str) {
            self.1 += 1;
            self.0.insert(id.to_string(), css.to_string());
        }

        fn remove_stylesheet(&mut self, id: &str) {
            self.0.remove(id);
        }
    }

    #[test]
    fn test_stylesheet_is_acquired_once() {
        let mut sheets = Sheets::default();
        assert!(ensure_stylesheet(&mut sheets));
        assert!(!ensure_stylesheet(&mut sheets));
        assert_eq!(sheets.1, 1);
        assert_eq!(sheets.0.len(), 1);

        release_stylesheet(&mut sheets);
        assert!(sheets.0.is_empty());
        release_stylesheet(&mut sheets);
    }
}
