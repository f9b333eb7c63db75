//! Page geometry: formats, configuration, break compensation and the
//! page-count solver

pub mod breaks;
pub mod config;
pub mod format;
mod pagination;
pub mod units;

pub use breaks::{plan_break_spacing, BreakCompensator, BreakPlan, MarkerSample, SpacingWrite};
pub use config::{
    create_page_config, get_effective_dimensions, get_page_layout_dimensions, MarginOverrides,
    PageConfig, PageLayoutDimensions,
};
pub use format::{
    calculate_page_count, get_default_margins, get_page_break_positions, get_page_dimensions,
    get_writable_area, FormatSpec, PageDimensions, PageFormat, PageMargins, PageOrientation,
};
pub use pagination::{
    container_min_height, measure_content_span, solve_page_count, PageCountChange,
    PageCountSolution, PaginationStorage, DEFAULT_MAX_ITERATIONS, DEFAULT_MIN_CONTENT_HEIGHT,
};
