//! Render output: page furniture and the session stylesheet

mod cache;
mod overlay;
pub mod styles;

pub use cache::OverlayCache;
pub use overlay::{
    default_page_label, LabelFormatter, OverlayBlock, OverlayHtml, OverlayKey, OverlayRenderer,
    OverlaySet,
};
