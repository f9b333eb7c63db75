//! Page-Flow: paginated page geometry for a continuous rich-text view
//!
//! The document stays one continuous flow. This crate draws the illusion
//! of discrete pages around it:
//! - Paper formats, orientation and margins in 96-DPI pixels
//! - Trailing-space compensation so manual breaks land on page boundaries
//! - A page-count solver that strips rendered furniture from measurements
//! - Floated headers, footers and gaps between pages
//! - A frame-coalesced render loop that settles without oscillating

pub mod controller;
pub mod error;
pub mod headless;
pub mod layout;
pub mod options;
pub mod render;
pub mod surface;
pub mod wasm;

// Re-export WASM types for direct use
pub use wasm::WasmPaginator;

// Re-export primary types
pub use controller::{ChangeOrigin, LoopState, PassGuard, PassReport, PaginationController, Trigger};
pub use error::{PaginationError, Result};
pub use layout::{
    calculate_page_count, create_page_config, get_page_break_positions, get_page_layout_dimensions,
    FormatSpec, MarginOverrides, PageConfig, PageDimensions, PageFormat, PageLayoutDimensions,
    PageMargins, PageOrientation, PaginationStorage,
};
pub use options::PaginationOptions;
pub use render::{OverlayBlock, OverlaySet};
pub use surface::{FrameHandle, FrameScheduler, NodeId, PaginationSurface, StyleHost};

/// Viewport rectangle
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }
}
