//! Trailing-space compensation for manual page breaks
//!
//! Manual breaks never split the document. Instead each break marker gets
//! enough trailing space that whatever follows it starts at the top of the
//! next page. Markers are processed once, in document order; the space
//! decided for earlier markers shifts later ones before the view has had a
//! chance to reflow, so that shift is carried along explicitly.

use crate::layout::config::PageLayoutDimensions;
use crate::surface::{NodeId, PaginationSurface};
use smallvec::SmallVec;
use tracing::{debug, trace};

/// Writes smaller than this are skipped (pixels)
pub const DEFAULT_WRITE_THRESHOLD: f64 = 1.0;

/// A marker's measured position, unscaled, relative to the top of the
/// first page's content area
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerSample {
    pub node: NodeId,
    pub offset: f64,
    pub current_spacing: f64,
}

/// Trailing space to write on one marker
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpacingWrite {
    pub node: NodeId,
    pub previous: f64,
    pub spacing: f64,
}

/// Outcome of one compensation pass
#[derive(Debug, Clone, PartialEq)]
pub struct BreakPlan {
    /// Fewest pages the markers force (at least 1)
    pub min_pages: usize,
    /// Spacing each marker should have, in marker order
    pub desired: SmallVec<[f64; 8]>,
    /// Only the changes worth applying
    pub writes: SmallVec<[SpacingWrite; 8]>,
}

impl Default for BreakPlan {
    fn default() -> Self {
        Self {
            min_pages: 1,
            desired: SmallVec::new(),
            writes: SmallVec::new(),
        }
    }
}

/// Decide trailing space for every marker.
///
/// Pure: works only on the sampled geometry.
pub fn plan_break_spacing(
    samples: &[MarkerSample],
    layout: &PageLayoutDimensions,
    gap: f64,
    write_threshold: f64,
) -> BreakPlan {
    let content_height = layout.content.height;
    if content_height <= 0.0 {
        return BreakPlan::default();
    }

    let furniture = layout.furniture_height(gap);
    let stride = content_height + furniture;

    let mut plan = BreakPlan::default();
    let mut shift = 0.0;

    for sample in samples {
        let visual = (sample.offset + shift).max(0.0);

        // Strip the furniture of every page already passed
        let pages_passed = (visual / stride).floor();
        let content_offset = visual - pages_passed * furniture;

        let within_page = content_offset % content_height;
        let remaining = if within_page == 0.0 {
            content_height
        } else {
            content_height - within_page
        };
        let desired = remaining.ceil();

        let required = ((content_offset + desired) / content_height).floor() as usize + 1;
        plan.min_pages = plan.min_pages.max(required);

        trace!(
            "Break marker {:?}: visual {:.2}, content {:.2}, spacing {} -> {}, needs {} pages",
            sample.node,
            visual,
            content_offset,
            sample.current_spacing,
            desired,
            required
        );

        plan.desired.push(desired);

        let delta = desired - sample.current_spacing;
        if delta.abs() >= write_threshold {
            plan.writes.push(SpacingWrite {
                node: sample.node,
                previous: sample.current_spacing,
                spacing: desired,
            });
            shift += delta;
        }
    }

    plan
}

/// Measures markers on a surface and applies the planned spacing
#[derive(Debug, Clone, Copy)]
pub struct BreakCompensator {
    write_threshold: f64,
}

impl Default for BreakCompensator {
    fn default() -> Self {
        Self::new(DEFAULT_WRITE_THRESHOLD)
    }
}

impl BreakCompensator {
    pub fn new(write_threshold: f64) -> Self {
        Self {
            write_threshold: write_threshold.max(0.0),
        }
    }

    pub fn write_threshold(&self) -> f64 {
        self.write_threshold
    }

    /// Sample every marker's position in content coordinates
    pub fn sample<S: PaginationSurface + ?Sized>(
        surface: &S,
        layout: &PageLayoutDimensions,
        scale: f64,
    ) -> Vec<MarkerSample> {
        let container_top = surface.container_rect().map(|r| r.y).unwrap_or(0.0);

        surface
            .break_markers()
            .into_iter()
            .map(|node| {
                let top = surface.node_rect(node).map(|r| r.y).unwrap_or(container_top);
                MarkerSample {
                    node,
                    offset: (top - container_top) / scale - layout.margins.top,
                    current_spacing: surface.marker_spacing(node),
                }
            })
            .collect()
    }

    /// Run one compensation pass and apply the resulting writes.
    /// Returns the plan, whose `min_pages` feeds the page-count solver.
    pub fn compensate<S: PaginationSurface + ?Sized>(
        &self,
        surface: &mut S,
        layout: &PageLayoutDimensions,
        gap: f64,
        scale: f64,
    ) -> BreakPlan {
        let samples = Self::sample(surface, layout, scale);
        let plan = plan_break_spacing(&samples, layout, gap, self.write_threshold);

        for write in &plan.writes {
            surface.set_marker_spacing(write.node, write.spacing);
        }

        if !samples.is_empty() {
            debug!(
                "Compensated {} break markers ({} writes), minimum {} pages",
                samples.len(),
                plan.writes.len(),
                plan.min_pages
            );
        }

        plan
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::config::{get_page_layout_dimensions, PageConfig};

    const GAP: f64 = 50.0;

    fn letter() -> PageLayoutDimensions {
        get_page_layout_dimensions(&PageConfig::default())
    }

    fn sample(node: u64, offset: f64, current_spacing: f64) -> MarkerSample {
        MarkerSample {
            node: NodeId(node),
            offset,
            current_spacing,
        }
    }

    #[test]
    fn test_no_markers_needs_one_page() {
        let plan = plan_break_spacing(&[], &letter(), GAP, 1.0);
        assert_eq!(plan.min_pages, 1);
        assert!(plan.writes.is_empty());
    }

    #[test]
    fn test_marker_pushes_to_next_page() {
        let plan = plan_break_spacing(&[sample(1, 200.0, 0.0)], &letter(), GAP, 1.0);
        assert_eq!(plan.desired.as_slice(), &[664.0]);
        assert_eq!(plan.min_pages, 2);
        assert_eq!(
            plan.writes.as_slice(),
            &[SpacingWrite {
                node: NodeId(1),
                previous: 0.0,
                spacing: 664.0
            }]
        );
    }

    #[test]
    fn test_marker_on_boundary_forces_blank_page() {
        let plan = plan_break_spacing(&[sample(1, 864.0, 0.0)], &letter(), GAP, 1.0);
        assert_eq!(plan.desired.as_slice(), &[864.0]);
        assert_eq!(plan.min_pages, 3);
    }

    #[test]
    fn test_marker_at_document_start() {
        let plan = plan_break_spacing(&[sample(1, 0.0, 0.0)], &letter(), GAP, 1.0);
        assert_eq!(plan.desired.as_slice(), &[864.0]);
        assert_eq!(plan.min_pages, 2);
    }

    #[test]
    fn test_spacing_rounds_up_to_whole_pixels() {
        let plan = plan_break_spacing(&[sample(1, 100.25, 0.0)], &letter(), GAP, 1.0);
        assert_eq!(plan.desired.as_slice(), &[764.0]);
    }

    #[test]
    fn test_furniture_is_removed_on_later_pages() {
        // 100px into the content of page 2: one stride (864 + 242) plus 100
        let plan = plan_break_spacing(&[sample(1, 1106.0 + 100.0, 0.0)], &letter(), GAP, 1.0);
        assert_eq!(plan.desired.as_slice(), &[764.0]);
        assert_eq!(plan.min_pages, 3);
    }

    #[test]
    fn test_earlier_marker_shift_carries_forward() {
        // Both markers measured before any spacing exists. The first gets
        // 664px, which moves the second from 300 to 964 visually: past the
        // first boundary but inside the furniture band
        let plan = plan_break_spacing(
            &[sample(1, 200.0, 0.0), sample(2, 300.0, 0.0)],
            &letter(),
            GAP,
            1.0,
        );
        assert_eq!(plan.desired[0], 664.0);
        // 964 visual is 100px into page 2's content when read as content-only
        assert_eq!(plan.desired[1], 764.0);
        assert_eq!(plan.min_pages, 3);
        assert_eq!(plan.writes.len(), 2);
    }

    #[test]
    fn test_sub_pixel_changes_are_not_written() {
        let plan = plan_break_spacing(&[sample(1, 200.0, 663.5)], &letter(), GAP, 1.0);
        assert_eq!(plan.desired.as_slice(), &[664.0]);
        assert!(plan.writes.is_empty());

        let strict = plan_break_spacing(&[sample(1, 200.0, 663.5)], &letter(), GAP, 0.25);
        assert_eq!(strict.writes.len(), 1);
    }

    #[test]
    fn test_stable_when_spacing_already_applied() {
        let plan = plan_break_spacing(&[sample(1, 200.0, 664.0)], &letter(), GAP, 1.0);
        assert!(plan.writes.is_empty());
        assert_eq!(plan.min_pages, 2);
    }

    #[test]
    fn test_degenerate_content_height() {
        let mut layout = letter();
        layout.content.height = 0.0;
        let plan = plan_break_spacing(&[sample(1, 200.0, 0.0)], &layout, GAP, 1.0);
        assert_eq!(plan, BreakPlan::default());
    }

    #[test]
    fn test_negative_offset_clamps_to_zero() {
        let plan = plan_break_spacing(&[sample(1, -40.0, 0.0)], &letter(), GAP, 1.0);
        assert_eq!(plan.desired.as_slice(), &[864.0]);
    }
}
