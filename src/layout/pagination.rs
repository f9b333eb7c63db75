//! Page-count solver and the per-session pagination record
//!
//! The rendered content span already contains the furniture (footer, gap,
//! header) of every boundary drawn inside it, and how many boundaries are
//! drawn depends on the page count being solved for. The solver untangles
//! that with a short fixed-point iteration.

use crate::layout::config::{get_page_layout_dimensions, PageConfig, PageLayoutDimensions};
use crate::layout::format::{get_page_break_positions, page_count_for};
use crate::surface::PaginationSurface;
use tracing::{debug, trace, warn};

/// Content height assumed for a document with no measurable children
pub const DEFAULT_MIN_CONTENT_HEIGHT: f64 = 20.0;

/// Iteration bound for the page-count fixed point
pub const DEFAULT_MAX_ITERATIONS: usize = 5;

/// Visual span of the in-flow content, unscaled.
///
/// Furniture children are skipped. Missing geometry reads as zero.
pub fn measure_content_span<S: PaginationSurface + ?Sized>(
    surface: &S,
    scale: f64,
    min_content_height: f64,
) -> f64 {
    let children = surface.children();
    let mut content = children.iter().filter(|child| !child.role.is_furniture());

    let Some(first) = content.next() else {
        trace!("No content children, assuming {}px", min_content_height);
        return min_content_height;
    };
    let last = content.last().unwrap_or(first);

    let top = surface.node_rect(first.id).unwrap_or_default().y;
    let bottom = surface.node_rect(last.id).unwrap_or_default().bottom();

    (bottom - top).max(0.0) / scale
}

/// Result of solving for the page count
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageCountSolution {
    /// Final page count, including the manual-break minimum
    pub page_count: usize,
    /// Content height with all furniture removed
    pub content_height: f64,
    /// Fixed-point iterations performed
    pub iterations: usize,
    /// False when the iteration bound was hit and the closed-form
    /// estimate was used instead
    pub converged: bool,
}

/// Solve `N = ceil((span - (N - 1) * furniture) / content)`.
///
/// `seed` is the previously known page count. `min_pages` is the floor
/// forced by manual breaks.
pub fn solve_page_count(
    span: f64,
    layout: &PageLayoutDimensions,
    gap: f64,
    seed: usize,
    min_pages: usize,
    max_iterations: usize,
) -> PageCountSolution {
    let content = layout.content.height;
    if content <= 0.0 {
        return PageCountSolution {
            page_count: min_pages.max(1),
            content_height: span.max(0.0),
            iterations: 0,
            converged: true,
        };
    }

    let furniture = layout.furniture_height(gap);
    let strip = |pages: usize| span - (pages.saturating_sub(1)) as f64 * furniture;

    let mut pages = seed.max(1);
    let mut iterations = 0;
    let mut converged = false;

    while iterations < max_iterations {
        iterations += 1;
        let next = page_count_for(strip(pages), content);
        trace!("Solver iteration {}: {} -> {} pages", iterations, pages, next);
        if next == pages {
            converged = true;
            break;
        }
        pages = next;
    }

    if !converged {
        let estimate = page_count_for(span + furniture, content + furniture);
        warn!(
            "Page count did not settle after {} iterations (last {}), using estimate {}",
            iterations, pages, estimate
        );
        pages = estimate;
    }

    PageCountSolution {
        page_count: pages.max(min_pages).max(1),
        content_height: strip(pages).max(0.0),
        iterations,
        converged,
    }
}

/// Scroll height the container must reserve for `page_count` pages
pub fn container_min_height(layout: &PageLayoutDimensions, gap: f64, page_count: usize) -> f64 {
    let pages = page_count.max(1) as f64;
    pages * layout.content.height + (pages - 1.0) * gap + layout.margins.top + layout.margins.bottom
}

/// What changed when a solution was committed
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageCountChange {
    pub previous_page_count: usize,
    pub page_count: usize,
    pub measured_content_height: f64,
}

impl PageCountChange {
    pub fn page_count_changed(&self) -> bool {
        self.previous_page_count != self.page_count
    }
}

/// Pagination state for one editing session
#[derive(Debug, Clone)]
pub struct PaginationStorage {
    page_config: PageConfig,
    page_count: usize,
    measured_content_height: f64,
    /// Config the stored results were solved against
    solved_config: Option<PageConfig>,
}

impl PaginationStorage {
    pub fn new(page_config: PageConfig) -> Self {
        Self {
            page_config,
            page_count: 1,
            measured_content_height: 0.0,
            solved_config: None,
        }
    }

    pub fn page_config(&self) -> &PageConfig {
        &self.page_config
    }

    pub fn page_count(&self) -> usize {
        self.page_count
    }

    pub fn measured_content_height(&self) -> f64 {
        self.measured_content_height
    }

    pub fn layout_dimensions(&self) -> PageLayoutDimensions {
        get_page_layout_dimensions(&self.page_config)
    }

    /// Boundaries between the current pages, in content coordinates
    pub fn page_break_positions(&self) -> Vec<f64> {
        get_page_break_positions(self.page_count, &self.page_config)
    }

    /// Install a new configuration wholesale
    pub(crate) fn replace_config(&mut self, page_config: PageConfig) {
        self.page_config = page_config;
    }

    /// Store a solution. Returns `None` when nothing differs from what is
    /// already stored.
    pub(crate) fn commit(&mut self, solution: &PageCountSolution) -> Option<PageCountChange> {
        let unchanged = solution.page_count == self.page_count
            && solution.content_height == self.measured_content_height
            && self.solved_config.as_ref() == Some(&self.page_config);
        if unchanged {
            return None;
        }

        let change = PageCountChange {
            previous_page_count: self.page_count,
            page_count: solution.page_count,
            measured_content_height: solution.content_height,
        };

        self.page_count = solution.page_count;
        self.measured_content_height = solution.content_height;
        self.solved_config = Some(self.page_config);

        debug!(
            "Pagination updated: {} -> {} pages, content {:.1}px",
            change.previous_page_count, change.page_count, change.measured_content_height
        );

        Some(change)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::config::create_page_config;
    use crate::layout::format::{PageFormat, PageOrientation};

    const GAP: f64 = 50.0;

    fn letter() -> PageLayoutDimensions {
        get_page_layout_dimensions(&PageConfig::default())
    }

    #[test]
    fn test_single_page() {
        let solution = solve_page_count(400.0, &letter(), GAP, 1, 1, DEFAULT_MAX_ITERATIONS);
        assert_eq!(solution.page_count, 1);
        assert_eq!(solution.content_height, 400.0);
        assert!(solution.converged);
    }

    #[test]
    fn test_furniture_is_stripped() {
        // Two full pages of content plus one rendered boundary
        let span = 864.0 * 2.0 + 242.0;
        let solution = solve_page_count(span, &letter(), GAP, 2, 1, DEFAULT_MAX_ITERATIONS);
        assert_eq!(solution.page_count, 2);
        assert_eq!(solution.content_height, 1728.0);
        assert!(solution.converged);
    }

    #[test]
    fn test_seed_does_not_change_settled_answer() {
        let span = 864.0 * 2.0 + 242.0 + 300.0;
        for seed in [1, 2, 3, 4] {
            let solution = solve_page_count(span, &letter(), GAP, seed, 1, 20);
            assert_eq!(solution.page_count, 3, "seed {}", seed);
        }
    }

    #[test]
    fn test_manual_break_minimum_wins() {
        let solution = solve_page_count(100.0, &letter(), GAP, 1, 3, DEFAULT_MAX_ITERATIONS);
        assert_eq!(solution.page_count, 3);
        assert_eq!(solution.content_height, 100.0);
    }

    #[test]
    fn test_oscillation_falls_back_to_estimate() {
        // Span without any rendered furniture yet: iterating flips 2 <-> 1
        let solution = solve_page_count(1064.0, &letter(), GAP, 1, 1, DEFAULT_MAX_ITERATIONS);
        assert!(!solution.converged);
        assert_eq!(solution.iterations, DEFAULT_MAX_ITERATIONS);
        // ceil((1064 + 242) / (864 + 242)) = 2
        assert_eq!(solution.page_count, 2);
        assert_eq!(solution.content_height, 1064.0 - 242.0);
    }

    #[test]
    fn test_zero_iterations_uses_estimate() {
        let solution = solve_page_count(864.0 * 3.0 + 484.0, &letter(), GAP, 1, 1, 0);
        assert!(!solution.converged);
        assert_eq!(solution.page_count, 3);
    }

    #[test]
    fn test_degenerate_content_height() {
        let tiny = create_page_config(
            crate::layout::format::PageDimensions::new(200.0, 100.0).unwrap(),
            PageOrientation::Portrait,
            None,
        );
        let solution = solve_page_count(5000.0, &get_page_layout_dimensions(&tiny), GAP, 4, 2, 5);
        assert_eq!(solution.page_count, 2);
    }

    #[test]
    fn test_container_min_height() {
        assert_eq!(container_min_height(&letter(), GAP, 1), 864.0 + 192.0);
        assert_eq!(container_min_height(&letter(), GAP, 3), 3.0 * 864.0 + 100.0 + 192.0);
        assert_eq!(container_min_height(&letter(), GAP, 0), 864.0 + 192.0);
    }

    #[test]
    fn test_storage_commit_is_idempotent() {
        let mut storage = PaginationStorage::new(PageConfig::default());
        assert_eq!(storage.page_count(), 1);

        let solution = solve_page_count(2000.0, &storage.layout_dimensions(), GAP, 1, 1, 20);
        let change = storage.commit(&solution).expect("first commit changes storage");
        assert_eq!(change.previous_page_count, 1);
        assert!(change.page_count_changed());

        assert!(storage.commit(&solution).is_none());
        assert_eq!(storage.page_count(), solution.page_count);
    }

    #[test]
    fn test_storage_config_change_forces_commit() {
        let mut storage = PaginationStorage::new(PageConfig::default());
        let solution = solve_page_count(100.0, &storage.layout_dimensions(), GAP, 1, 1, 5);
        assert!(storage.commit(&solution).is_some());

        storage.replace_config(create_page_config(
            PageFormat::A4,
            PageOrientation::Portrait,
            None,
        ));
        let change = storage.commit(&solution).expect("config changed");
        assert!(!change.page_count_changed());
        assert!(storage.commit(&solution).is_none());
    }

    #[test]
    fn test_storage_break_positions_follow_page_count() {
        let mut storage = PaginationStorage::new(PageConfig::default());
        assert!(storage.page_break_positions().is_empty());

        let solution = PageCountSolution {
            page_count: 3,
            content_height: 2000.0,
            iterations: 1,
            converged: true,
        };
        storage.commit(&solution);
        assert_eq!(storage.page_break_positions(), vec![864.0, 1728.0]);
    }
}
