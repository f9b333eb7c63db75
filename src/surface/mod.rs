//! Host contracts: what the pagination engine needs from the rendered view
//!
//! The engine never touches a document model. It reads rendered geometry,
//! writes a handful of style values, and asks for frame callbacks. Hosts
//! implement these traits over whatever projection they render (a browser
//! DOM through the wasm bridge, or the headless flow in tests).

pub mod marker;

use crate::render::OverlaySet;
use crate::Rect;

/// Opaque handle to a rendered element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u64);

/// What a top-level child of the container is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeRole {
    /// Ordinary editable content (including manual break markers)
    Content,
    /// Container holding the floated break overlays
    OverlayContainer,
    FirstPageHeader,
    LastPageFooter,
    /// Anything explicitly marked non-editable or structural
    Structural,
}

impl NodeRole {
    /// Pagination furniture is excluded from content measurement
    pub fn is_furniture(self) -> bool {
        !matches!(self, NodeRole::Content)
    }
}

/// A top-level child of the paginated container, in document order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChildNode {
    pub id: NodeId,
    pub role: NodeRole,
}

impl ChildNode {
    pub fn new(id: NodeId, role: NodeRole) -> Self {
        Self { id, role }
    }
}

/// Where a go-to-page command should scroll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollTarget {
    DocumentStart,
    /// The overlay marking the boundary after page `n` (1-based)
    PageBoundary(usize),
}

/// The rendered view the engine measures and writes to.
///
/// Geometry is reported in the surface's visual (possibly scaled)
/// coordinates. `None` means "not measurable right now"; the engine treats
/// it as zero and lets the next frame correct itself.
pub trait PaginationSurface {
    /// Bounding box of the paginated container
    fn container_rect(&self) -> Option<Rect>;

    /// Top-level children in document order
    fn children(&self) -> Vec<ChildNode>;

    /// Bounding box of any element
    fn node_rect(&self, node: NodeId) -> Option<Rect>;

    /// Manual break markers in document order
    fn break_markers(&self) -> Vec<NodeId>;

    /// Current trailing space of a marker, unscaled
    fn marker_spacing(&self, marker: NodeId) -> f64;

    /// Replace the trailing space of a marker, unscaled
    fn set_marker_spacing(&mut self, marker: NodeId, px: f64);

    /// Reserve scroll height on the container, unscaled
    fn set_min_height(&mut self, px: f64);

    /// Swap in a new set of page furniture
    fn replace_overlays(&mut self, overlays: &OverlaySet);

    fn scroll_to(&mut self, target: ScrollTarget);

    /// Uniform visual scale applied to the container (1.0 = none)
    fn scale(&self) -> f64 {
        1.0
    }
}

/// Host-side stylesheet registry. Stylesheets are keyed so acquisition can
/// be idempotent.
pub trait StyleHost {
    fn has_stylesheet(&self, id: &str) -> bool;

    fn insert_stylesheet(&mut self, id: &str, css: &str);

    fn remove_stylesheet(&mut self, id: &str);
}

/// Handle for a pending frame callback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(pub u64);

/// Once-per-frame scheduling primitive.
///
/// The host calls the controller's `on_frame` with the handle when the
/// frame fires.
pub trait FrameScheduler {
    fn request_frame(&mut self) -> FrameHandle;

    fn cancel_frame(&mut self, handle: FrameHandle);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_furniture_roles() {
        assert!(!NodeRole::Content.is_furniture());
        assert!(NodeRole::OverlayContainer.is_furniture());
        assert!(NodeRole::FirstPageHeader.is_furniture());
        assert!(NodeRole::LastPageFooter.is_furniture());
        assert!(NodeRole::Structural.is_furniture());
    }
}
