//! Headless rendering surface
//!
//! A deterministic stand-in for a browser view: blocks flow top to bottom,
//! text wraps at the content width, break blocks from the current overlay
//! set float on the page boundaries and push any line that would overlap
//! them further down, and a uniform scale is applied to everything it
//! reports. Used by tests, benchmarks and the CLI.

mod line_break;

pub use line_break::{LineBreaker, TextMetrics};

use crate::controller::{ChangeOrigin, PassGuard, PassReport, PaginationController};
use crate::render::{OverlayBlock, OverlaySet};
use crate::surface::{
    ChildNode, FrameHandle, FrameScheduler, NodeId, NodeRole, PaginationSurface, ScrollTarget,
    StyleHost,
};
use crate::Rect;
use rustc_hash::FxHashMap;
use tracing::trace;

const HEADER_NODE: NodeId = NodeId(u64::MAX);
const OVERLAY_NODE: NodeId = NodeId(u64::MAX - 1);
const FOOTER_NODE: NodeId = NodeId(u64::MAX - 2);

/// Content of a headless block
#[derive(Debug, Clone, PartialEq)]
pub enum HeadlessBlock {
    /// Wrapped text; lines flow around furniture individually
    Text(String),
    /// Atomic block of fixed height (an image, a table row)
    Fixed(f64),
    /// Manual page break marker
    Break,
    /// Non-editable block that is not counted as content
    Structural(f64),
}

#[derive(Debug, Clone)]
struct Node {
    id: NodeId,
    block: HeadlessBlock,
    /// Line heights for text, a single entry for atomic blocks
    lines: Vec<f64>,
}

/// Laid-out position of one node, unscaled, relative to the content origin
#[derive(Debug, Clone, Copy, PartialEq)]
struct Placed {
    top: f64,
    bottom: f64,
}

/// In-memory block flow implementing the surface contracts
#[derive(Debug)]
pub struct HeadlessSurface {
    content_width: f64,
    page_width: f64,
    breaker: LineBreaker,
    nodes: Vec<Node>,
    next_id: u64,
    spacing: FxHashMap<NodeId, f64>,
    overlays: Option<OverlaySet>,
    scale: f64,
    /// Viewport position of the container top
    origin_y: f64,
    min_height: f64,
    last_scroll: Option<ScrollTarget>,
    stylesheets: FxHashMap<String, String>,
    guard: Option<PassGuard>,
    changes: Vec<ChangeOrigin>,
}

impl HeadlessSurface {
    /// New surface whose text wraps at `content_width`
    pub fn new(page_width: f64, content_width: f64) -> Self {
        Self {
            content_width,
            page_width,
            breaker: LineBreaker::default(),
            nodes: Vec::new(),
            next_id: 1,
            spacing: FxHashMap::default(),
            overlays: None,
            scale: 1.0,
            origin_y: 0.0,
            min_height: 0.0,
            last_scroll: None,
            stylesheets: FxHashMap::default(),
            guard: None,
            changes: Vec::new(),
        }
    }

    /// Render everything at `scale` (e.g. 0.5 on a narrow viewport)
    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    /// Put the container at `y` in viewport coordinates
    pub fn with_origin(mut self, y: f64) -> Self {
        self.origin_y = y;
        self
    }

    /// Tag document changes made during a pagination pass
    pub fn watch_passes(&mut self, guard: PassGuard) {
        self.guard = Some(guard);
    }

    pub fn push_paragraph(&mut self, text: impl Into<String>) -> NodeId {
        self.push(HeadlessBlock::Text(text.into()))
    }

    pub fn push_fixed(&mut self, height: f64) -> NodeId {
        self.push(HeadlessBlock::Fixed(height))
    }

    pub fn push_break(&mut self) -> NodeId {
        self.push(HeadlessBlock::Break)
    }

    pub fn push_structural(&mut self, height: f64) -> NodeId {
        self.push(HeadlessBlock::Structural(height))
    }

    pub fn push(&mut self, block: HeadlessBlock) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        let lines = self.measure(&block);
        self.nodes.push(Node { id, block, lines });
        self.record_change();
        id
    }

    pub fn overlays(&self) -> Option<&OverlaySet> {
        self.overlays.as_ref()
    }

    pub fn min_height(&self) -> f64 {
        self.min_height
    }

    pub fn last_scroll(&self) -> Option<ScrollTarget> {
        self.last_scroll
    }

    pub fn stylesheet(&self, id: &str) -> Option<&str> {
        self.stylesheets.get(id).map(String::as_str)
    }

    /// Document changes observed since the last call
    pub fn take_changes(&mut self) -> Vec<ChangeOrigin> {
        std::mem::take(&mut self.changes)
    }

    fn record_change(&mut self) {
        let origin = self
            .guard
            .as_ref()
            .map(PassGuard::origin)
            .unwrap_or(ChangeOrigin::Host);
        self.changes.push(origin);
    }

    fn measure(&self, block: &HeadlessBlock) -> Vec<f64> {
        match block {
            HeadlessBlock::Text(text) => {
                let count = self.breaker.line_count(text, self.content_width);
                vec![self.breaker.metrics().line_height; count]
            }
            HeadlessBlock::Fixed(height) | HeadlessBlock::Structural(height) => {
                vec![height.max(0.0)]
            }
            HeadlessBlock::Break => vec![0.0],
        }
    }

    fn header_height(&self) -> f64 {
        self.overlays.as_ref().map(OverlaySet::header_height).unwrap_or(0.0)
    }

    /// Lay out every node. Lines that would overlap a furniture band move
    /// below it. A line already at the top of a page stays there even if it
    /// runs into the next band, so blocks taller than a page spill over
    /// instead of being pushed down forever.
    fn flow(&self) -> (Vec<Placed>, f64) {
        let bands = self
            .overlays
            .as_ref()
            .map(OverlaySet::break_bands)
            .unwrap_or_default();

        let clear = |mut y: f64, height: f64| {
            let mut page_top = 0.0;
            for &(start, end) in &bands {
                let overlaps = if height > 0.0 {
                    y < end && y + height > start
                } else {
                    y >= start && y < end
                };
                if overlaps {
                    if y <= page_top {
                        break;
                    }
                    y = end;
                }
                page_top = end;
            }
            y
        };

        let mut y = 0.0;
        let mut placed = Vec::with_capacity(self.nodes.len());
        for node in &self.nodes {
            let mut top = None;
            for &height in &node.lines {
                y = clear(y, height);
                top.get_or_insert(y);
                y += height;
            }
            placed.push(Placed {
                top: top.unwrap_or(y),
                bottom: y,
            });
            if node.block == HeadlessBlock::Break {
                y += self.spacing.get(&node.id).copied().unwrap_or(0.0);
            }
        }

        (placed, y)
    }

    /// Unscaled content-origin rect to scaled viewport rect
    fn to_visual(&self, top: f64, height: f64, width: f64) -> Rect {
        Rect::new(
            0.0,
            self.origin_y + (self.header_height() + top) * self.scale,
            width * self.scale,
            height * self.scale,
        )
    }

    fn footer_height(&self) -> f64 {
        self.overlays
            .as_ref()
            .map(|set| {
                set.blocks
                    .iter()
                    .filter(|block| {
                        matches!(
                            block,
                            OverlayBlock::LastPageFiller { .. }
                                | OverlayBlock::LastPageFooter { .. }
                        )
                    })
                    .map(|block| block.height())
                    .sum()
            })
            .unwrap_or(0.0)
    }
}

impl PaginationSurface for HeadlessSurface {
    fn container_rect(&self) -> Option<Rect> {
        let (_, end) = self.flow();
        let height = (self.header_height() + end + self.footer_height()).max(self.min_height);
        Some(Rect::new(
            0.0,
            self.origin_y,
            self.page_width * self.scale,
            height * self.scale,
        ))
    }

    fn children(&self) -> Vec<ChildNode> {
        let mut children = Vec::with_capacity(self.nodes.len() + 3);
        if self.overlays.is_some() {
            children.push(ChildNode::new(HEADER_NODE, NodeRole::FirstPageHeader));
            children.push(ChildNode::new(OVERLAY_NODE, NodeRole::OverlayContainer));
        }
        children.extend(self.nodes.iter().map(|node| {
            let role = match node.block {
                HeadlessBlock::Structural(_) => NodeRole::Structural,
                _ => NodeRole::Content,
            };
            ChildNode::new(node.id, role)
        }));
        if self.overlays.is_some() {
            children.push(ChildNode::new(FOOTER_NODE, NodeRole::LastPageFooter));
        }
        children
    }

    fn node_rect(&self, node: NodeId) -> Option<Rect> {
        let (placed, end) = self.flow();
        match node {
            HEADER_NODE => Some(Rect::new(
                0.0,
                self.origin_y,
                self.page_width * self.scale,
                self.header_height() * self.scale,
            )),
            OVERLAY_NODE => Some(self.to_visual(0.0, 0.0, self.page_width)),
            FOOTER_NODE => Some(self.to_visual(end, self.footer_height(), self.page_width)),
            _ => {
                let index = self.nodes.iter().position(|n| n.id == node)?;
                let place = placed[index];
                Some(self.to_visual(place.top, place.bottom - place.top, self.content_width))
            }
        }
    }

    fn break_markers(&self) -> Vec<NodeId> {
        self.nodes
            .iter()
            .filter(|node| node.block == HeadlessBlock::Break)
            .map(|node| node.id)
            .collect()
    }

    fn marker_spacing(&self, marker: NodeId) -> f64 {
        self.spacing.get(&marker).copied().unwrap_or(0.0)
    }

    fn set_marker_spacing(&mut self, marker: NodeId, px: f64) {
        trace!("Headless marker {:?} spacing = {}", marker, px);
        self.spacing.insert(marker, px);
        self.record_change();
    }

    fn set_min_height(&mut self, px: f64) {
        self.min_height = px;
    }

    fn replace_overlays(&mut self, overlays: &OverlaySet) {
        self.overlays = Some(overlays.clone());
    }

    fn scroll_to(&mut self, target: ScrollTarget) {
        self.last_scroll = Some(target);
    }

    fn scale(&self) -> f64 {
        self.scale
    }
}

impl StyleHost for HeadlessSurface {
    fn has_stylesheet(&self, id: &str) -> bool {
        self.stylesheets.contains_key(id)
    }

    fn insert_stylesheet(&mut self, id: &str, css: &str) {
        self.stylesheets.insert(id.to_string(), css.to_string());
    }

    fn remove_stylesheet(&mut self, id: &str) {
        self.stylesheets.remove(id);
    }
}

/// Scheduler whose frames fire only when the caller says so
#[derive(Debug, Default)]
pub struct ManualScheduler {
    next: u64,
    pending: Option<FrameHandle>,
    requested: usize,
    cancelled: Vec<FrameHandle>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> Option<FrameHandle> {
        self.pending
    }

    /// Hand out the pending frame, as the display would when it fires
    pub fn take_pending(&mut self) -> Option<FrameHandle> {
        self.pending.take()
    }

    /// Frames requested so far
    pub fn requested(&self) -> usize {
        self.requested
    }

    pub fn cancelled(&self) -> &[FrameHandle] {
        &self.cancelled
    }
}

impl FrameScheduler for ManualScheduler {
    fn request_frame(&mut self) -> FrameHandle {
        self.next += 1;
        self.requested += 1;
        let handle = FrameHandle(self.next);
        self.pending = Some(handle);
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        if self.pending == Some(handle) {
            self.pending = None;
        }
        self.cancelled.push(handle);
    }
}

impl<S> PaginationController<S, ManualScheduler>
where
    S: PaginationSurface + StyleHost,
{
    /// Fire pending frames until none is left or `max_frames` ran.
    /// Returns the report of every pass that ran.
    pub fn run_pending_frames(&mut self, max_frames: usize) -> Vec<PassReport> {
        let mut reports = Vec::new();
        for _ in 0..max_frames {
            let Some(handle) = self.scheduler_mut().take_pending() else {
                break;
            };
            if let Some(report) = self.on_frame(handle) {
                reports.push(report);
            }
        }
        reports
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{get_page_layout_dimensions, PageConfig};
    use crate::render::{OverlayKey, OverlayRenderer};

    fn surface() -> HeadlessSurface {
        HeadlessSurface::new(816.0, 624.0)
    }

    fn overlays(page_count: usize) -> OverlaySet {
        let config = PageConfig::default();
        OverlayRenderer::new(get_page_layout_dimensions(&config), 50.0).build(OverlayKey {
            page_count,
            config,
            gap: 50.0,
            measured_content_height: 0.0,
        })
    }

    #[test]
    fn test_blocks_flow_in_order() {
        let mut surface = surface();
        let a = surface.push_fixed(100.0);
        let b = surface.push_paragraph("Hello");

        assert_eq!(surface.node_rect(a), Some(Rect::new(0.0, 0.0, 624.0, 100.0)));
        assert_eq!(surface.node_rect(b), Some(Rect::new(0.0, 100.0, 624.0, 20.0)));
        assert_eq!(surface.node_rect(NodeId(999)), None);
    }

    #[test]
    fn test_lines_move_below_furniture() {
        let mut surface = surface();
        surface.replace_overlays(&overlays(2));
        let first = surface.push_fixed(850.0);
        let text = surface.push_paragraph("one\ntwo");

        // Header offsets everything by 96
        assert_eq!(surface.node_rect(first).unwrap().y, 96.0);
        // 850..870 would cross the band starting at 864
        let rect = surface.node_rect(text).unwrap();
        assert_eq!(rect.y, 96.0 + 1106.0);
        assert_eq!(rect.height, 40.0);
    }

    #[test]
    fn test_block_taller_than_a_page_spills_over() {
        let mut surface = surface();
        surface.replace_overlays(&overlays(3));
        let first = surface.push_fixed(900.0);
        let short = surface.push_fixed(500.0);
        let second = surface.push_fixed(900.0);

        // Already at a page top: stays and runs into the band
        assert_eq!(surface.node_rect(first).unwrap().y, 96.0);
        assert_eq!(surface.node_rect(short).unwrap().y, 96.0 + 1106.0);
        // Moves to the next page top once, then overlaps the band below
        let rect = surface.node_rect(second).unwrap();
        assert_eq!(rect.y, 96.0 + 2212.0);
        assert_eq!(rect.bottom(), 96.0 + 3112.0);
    }

    #[test]
    fn test_break_spacing_pushes_following_content() {
        let mut surface = surface();
        surface.push_fixed(200.0);
        let marker = surface.push_break();
        let after = surface.push_fixed(10.0);

        surface.set_marker_spacing(marker, 300.0);
        assert_eq!(surface.marker_spacing(marker), 300.0);
        assert_eq!(surface.node_rect(after).unwrap().y, 500.0);
        assert_eq!(surface.break_markers(), vec![marker]);
    }

    #[test]
    fn test_scale_and_origin() {
        let mut surface = surface().with_scale(0.5).with_origin(40.0);
        let a = surface.push_fixed(100.0);
        let b = surface.push_fixed(100.0);

        assert_eq!(surface.node_rect(a).unwrap().y, 40.0);
        assert_eq!(surface.node_rect(b).unwrap().y, 90.0);
        assert_eq!(surface.node_rect(b).unwrap().height, 50.0);
    }

    #[test]
    fn test_children_roles() {
        let mut surface = surface();
        surface.push_fixed(10.0);
        surface.push_structural(10.0);
        surface.replace_overlays(&overlays(1));

        let roles: Vec<NodeRole> = surface.children().iter().map(|c| c.role).collect();
        assert_eq!(
            roles,
            vec![
                NodeRole::FirstPageHeader,
                NodeRole::OverlayContainer,
                NodeRole::Content,
                NodeRole::Structural,
                NodeRole::LastPageFooter,
            ]
        );
    }

    #[test]
    fn test_changes_are_tagged_by_guard() {
        let mut surface = surface();
        let guard = PassGuard::default();
        surface.watch_passes(guard.clone());
        let marker = surface.push_break();
        assert_eq!(surface.take_changes(), vec![ChangeOrigin::Host]);

        surface.set_marker_spacing(marker, 5.0);
        assert_eq!(surface.take_changes(), vec![ChangeOrigin::Host]);
        assert!(surface.take_changes().is_empty());
        assert!(!guard.is_active());
    }

    #[test]
    fn test_manual_scheduler() {
        let mut scheduler = ManualScheduler::new();
        let first = scheduler.request_frame();
        let second = scheduler.request_frame();
        assert_ne!(first, second);
        assert_eq!(scheduler.pending(), Some(second));

        scheduler.cancel_frame(second);
        assert_eq!(scheduler.pending(), None);
        assert_eq!(scheduler.cancelled(), &[second]);
        assert_eq!(scheduler.requested(), 2);
    }
}
