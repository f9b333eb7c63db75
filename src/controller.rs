//! Frame-driven render loop tying the pagination pieces together
//!
//! Every relevant notification schedules (or reschedules) a single frame
//! callback. When the frame fires the controller runs break compensation
//! followed by the page-count solver, then publishes whatever changed.

use crate::layout::{
    container_min_height, measure_content_span, solve_page_count, BreakCompensator, FormatSpec,
    MarginOverrides, PageConfig, PageCountChange, PageCountSolution, PageLayoutDimensions,
    PageOrientation, PaginationStorage,
};
use crate::options::PaginationOptions;
use crate::render::styles::{ensure_stylesheet, release_stylesheet};
use crate::render::{default_page_label, LabelFormatter, OverlayCache, OverlayKey, OverlayRenderer};
use crate::surface::{FrameHandle, FrameScheduler, PaginationSurface, ScrollTarget, StyleHost};
use std::cell::Cell;
use std::rc::Rc;
use tracing::{debug, trace, warn};

/// Upper bound on follow-up frames scheduled after one external trigger
pub const MAX_SETTLE_FRAMES: usize = 16;

/// Where a document change came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeOrigin {
    /// The user or the host editor
    Host,
    /// Side effect of a pagination pass (marker spacing, furniture)
    Pagination,
}

/// Events that make the current pagination stale
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    ViewInitialized,
    DocumentChanged(ChangeOrigin),
    ConfigChanged,
    /// The previous pass moved content or furniture
    LayoutInvalidated,
}

/// Scheduling state of the render loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Idle,
    Scheduled(FrameHandle),
}

/// Shared flag raised while a pagination pass is running.
///
/// Hosts hold a clone and consult it when their document reports a change,
/// so changes caused by the pass can be tagged [`ChangeOrigin::Pagination`].
#[derive(Debug, Clone, Default)]
pub struct PassGuard(Rc<Cell<bool>>);

impl PassGuard {
    pub fn is_active(&self) -> bool {
        self.0.get()
    }

    /// Origin to report for a document change observed right now
    pub fn origin(&self) -> ChangeOrigin {
        if self.is_active() {
            ChangeOrigin::Pagination
        } else {
            ChangeOrigin::Host
        }
    }

    fn enter(&self) -> PassScope<'_> {
        self.0.set(true);
        PassScope(self)
    }
}

struct PassScope<'a>(&'a PassGuard);

impl Drop for PassScope<'_> {
    fn drop(&mut self) {
        self.0 .0.set(false);
    }
}

/// Summary of one compensation + solve pass
#[derive(Debug, Clone, PartialEq)]
pub struct PassReport {
    /// Pages forced by manual breaks
    pub min_pages: usize,
    /// Marker spacing values written
    pub marker_writes: usize,
    /// Unscaled content span that was measured
    pub span: f64,
    pub solution: PageCountSolution,
    /// `None` when storage already matched the solution
    pub change: Option<PageCountChange>,
    pub overlays_rebuilt: bool,
}

/// Progress of the follow-up frames since the last external trigger
#[derive(Debug, Clone, Copy, Default)]
struct Settling {
    /// Follow-up frames scheduled so far
    frames: usize,
    /// Consecutive follow-ups whose new pages are explained by furniture
    /// the previous pass drew
    runaway: usize,
    last_span: Option<f64>,
}

/// Callback for page count changes
pub type PageCountListener = Box<dyn FnMut(&PageCountChange)>;

/// Pagination session bound to one rendered view
pub struct PaginationController<S, F>
where
    S: PaginationSurface + StyleHost,
    F: FrameScheduler,
{
    surface: S,
    scheduler: F,
    options: PaginationOptions,
    /// Margins the user set explicitly; survive format switches
    margin_overrides: MarginOverrides,
    storage: PaginationStorage,
    compensator: BreakCompensator,
    overlays: OverlayCache,
    formatter: Option<Box<LabelFormatter>>,
    listener: Option<PageCountListener>,
    state: LoopState,
    settling: Settling,
    guard: PassGuard,
    attached: bool,
}

impl<S, F> PaginationController<S, F>
where
    S: PaginationSurface + StyleHost,
    F: FrameScheduler,
{
    pub fn new(surface: S, scheduler: F, options: PaginationOptions) -> Self {
        let storage = PaginationStorage::new(options.page_config());
        Self {
            surface,
            scheduler,
            margin_overrides: options.margins,
            storage,
            compensator: BreakCompensator::new(options.break_write_threshold),
            overlays: OverlayCache::new(),
            formatter: None,
            listener: None,
            state: LoopState::Idle,
            settling: Settling::default(),
            guard: PassGuard::default(),
            attached: false,
            options,
        }
    }

    /// Use a custom page label instead of `"{current} {separator} {total}"`
    pub fn with_page_number_formatter(
        mut self,
        formatter: impl Fn(usize, usize) -> String + 'static,
    ) -> Self {
        self.formatter = Some(Box::new(formatter));
        self
    }

    /// Called whenever the page count changes
    pub fn on_page_count_change(
        mut self,
        listener: impl FnMut(&PageCountChange) + 'static,
    ) -> Self {
        self.set_page_count_listener(listener);
        self
    }

    /// Replace the page count listener of a running session
    pub fn set_page_count_listener(&mut self, listener: impl FnMut(&PageCountChange) + 'static) {
        self.listener = Some(Box::new(listener));
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn scheduler(&self) -> &F {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut F {
        &mut self.scheduler
    }

    pub fn storage(&self) -> &PaginationStorage {
        &self.storage
    }

    pub fn options(&self) -> &PaginationOptions {
        &self.options
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn page_count(&self) -> usize {
        self.storage.page_count()
    }

    /// Current page geometry
    pub fn layout_dimensions(&self) -> PageLayoutDimensions {
        self.storage.layout_dimensions()
    }

    /// Guard hosts use to tag changes made by a running pass
    pub fn pass_guard(&self) -> PassGuard {
        self.guard.clone()
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Start the session: inject the stylesheet, draw first-page furniture
    /// and schedule the first measurement
    pub fn attach(&mut self) {
        if self.attached {
            return;
        }
        self.attached = true;
        ensure_stylesheet(&mut self.surface);
        self.overlays.invalidate();
        self.refresh_overlays();
        self.notify(Trigger::ViewInitialized);
    }

    /// Cancel pending work and release the stylesheet
    pub fn detach(&mut self) {
        if let LoopState::Scheduled(handle) = self.state {
            self.scheduler.cancel_frame(handle);
            self.state = LoopState::Idle;
        }
        if self.attached {
            release_stylesheet(&mut self.surface);
            self.attached = false;
        }
    }

    /// Something changed; make sure a frame is coming. Does nothing while
    /// detached.
    pub fn notify(&mut self, trigger: Trigger) {
        if !self.attached {
            trace!("Ignoring {:?} while detached", trigger);
            return;
        }
        if self.guard.is_active() || trigger == Trigger::DocumentChanged(ChangeOrigin::Pagination) {
            trace!("Ignoring {:?} raised by the pagination pass", trigger);
            return;
        }
        if trigger != Trigger::LayoutInvalidated {
            self.settling = Settling::default();
        }

        if let LoopState::Scheduled(pending) = self.state {
            self.scheduler.cancel_frame(pending);
        }
        let handle = self.scheduler.request_frame();
        trace!("{:?}: frame {:?} scheduled", trigger, handle);
        self.state = LoopState::Scheduled(handle);
    }

    /// Frame callback. Stale handles and frames after `detach` are ignored.
    ///
    /// A pass that wrote spacing or furniture measured a layout that no
    /// longer exists, so another frame follows until a pass changes nothing.
    /// Follow-ups stop early when pages keep appearing only because of the
    /// furniture drawn for them.
    pub fn on_frame(&mut self, handle: FrameHandle) -> Option<PassReport> {
        if !self.attached || self.state != LoopState::Scheduled(handle) {
            trace!("Ignoring stale frame {:?}", handle);
            return None;
        }
        self.state = LoopState::Idle;

        let report = self.run_pass();
        let follow_up = self.settling.frames > 0;
        if follow_up && self.grew_from_own_furniture(&report) {
            self.settling.runaway += 1;
        } else {
            self.settling.runaway = 0;
        }
        self.settling.last_span = Some(report.span);

        if report.marker_writes == 0 && !report.overlays_rebuilt {
            return Some(report);
        }
        if self.settling.runaway >= 2 || self.settling.frames >= MAX_SETTLE_FRAMES {
            warn!(
                "Layout did not settle after {} follow-up frames, stopping at {} pages",
                self.settling.frames,
                self.storage.page_count()
            );
            return Some(report);
        }
        self.settling.frames += 1;
        self.notify(Trigger::LayoutInvalidated);
        Some(report)
    }

    /// Whether the pass added pages while the span grew by at least the
    /// furniture of those pages
    fn grew_from_own_furniture(&self, report: &PassReport) -> bool {
        let (Some(change), Some(last_span)) = (report.change, self.settling.last_span) else {
            return false;
        };
        let added = change.page_count.saturating_sub(change.previous_page_count);
        if added == 0 {
            return false;
        }
        let furniture = self
            .storage
            .layout_dimensions()
            .furniture_height(self.options.page_gap());
        report.span - last_span >= added as f64 * furniture - 0.5
    }

    /// Compensate manual breaks and solve the page count once, right now
    pub fn run_pass(&mut self) -> PassReport {
        let guard = self.guard.clone();
        let _scope = guard.enter();

        let layout = self.storage.layout_dimensions();
        let gap = self.options.page_gap();
        let scale = match self.surface.scale() {
            scale if scale.is_finite() && scale > 0.0 => scale,
            _ => 1.0,
        };

        let plan = self.compensator.compensate(&mut self.surface, &layout, gap, scale);
        let span = measure_content_span(&self.surface, scale, self.options.min_content_height);
        let solution = solve_page_count(
            span,
            &layout,
            gap,
            self.storage.page_count(),
            plan.min_pages,
            self.options.max_solver_iterations,
        );

        let change = self.storage.commit(&solution);
        let mut overlays_rebuilt = false;

        if let Some(change) = &change {
            if change.page_count_changed() {
                if let Some(listener) = self.listener.as_mut() {
                    listener(change);
                }
            }
            overlays_rebuilt = self.refresh_overlays();
            self.surface
                .set_min_height(container_min_height(&layout, gap, change.page_count));
        }

        PassReport {
            min_pages: plan.min_pages,
            marker_writes: plan.writes.len(),
            span,
            solution,
            change,
            overlays_rebuilt,
        }
    }

    /// Switch paper size, keeping orientation and explicit margin overrides
    pub fn set_format(&mut self, format: impl Into<FormatSpec>) {
        let overrides = (!self.margin_overrides.is_empty()).then_some(self.margin_overrides);
        let config = self.storage.page_config().with_format(format, overrides);
        self.replace_config(config);
    }

    pub fn set_orientation(&mut self, orientation: PageOrientation) {
        let config = self.storage.page_config().with_orientation(orientation);
        self.replace_config(config);
    }

    /// Merge margin overrides into the current ones
    pub fn set_margins(&mut self, overrides: MarginOverrides) {
        self.margin_overrides = self.margin_overrides.merge(&overrides);
        let config = self.storage.page_config().with_margins(&overrides);
        self.replace_config(config);
    }

    pub fn set_page_gap(&mut self, gap: f64) {
        if gap == self.options.page_gap {
            return;
        }
        self.options.page_gap = gap;
        self.notify(Trigger::ConfigChanged);
    }

    /// Scroll to the start of page `page` (1-based). Out-of-range pages do
    /// nothing.
    pub fn go_to_page(&mut self, page: usize) {
        if page <= 1 {
            self.surface.scroll_to(ScrollTarget::DocumentStart);
        } else if page <= self.storage.page_count() {
            self.surface.scroll_to(ScrollTarget::PageBoundary(page - 1));
        } else {
            trace!(
                "Page {} is past the last page ({})",
                page,
                self.storage.page_count()
            );
        }
    }

    fn replace_config(&mut self, config: PageConfig) {
        if &config == self.storage.page_config() {
            return;
        }
        debug!("Page configuration changed: {:?}", config);
        self.storage.replace_config(config);
        self.notify(Trigger::ConfigChanged);
    }

    fn overlay_key(&self) -> OverlayKey {
        OverlayKey {
            page_count: self.storage.page_count(),
            config: *self.storage.page_config(),
            gap: self.options.page_gap(),
            measured_content_height: self.storage.measured_content_height(),
        }
    }

    /// Rebuild furniture if its key changed. Returns whether it did.
    fn refresh_overlays(&mut self) -> bool {
        let key = self.overlay_key();
        let layout = self.storage.layout_dimensions();
        let separator = self.options.page_number_separator.clone();
        let default_label = move |current: usize, total: usize| {
            default_page_label(current, total, &separator)
        };

        let labels: Option<&LabelFormatter> = if !self.options.show_page_numbers {
            None
        } else if let Some(formatter) = self.formatter.as_deref() {
            Some(formatter)
        } else {
            Some(&default_label as &LabelFormatter)
        };

        let mut renderer = OverlayRenderer::new(layout, key.gap);
        if let Some(labels) = labels {
            renderer = renderer.with_labels(labels);
        }

        match self.overlays.refresh(key, |key| renderer.build(key)) {
            Some(set) => {
                debug!("Rebuilt page furniture for {} pages", set.page_count());
                self.surface.replace_overlays(set);
                true
            }
            None => false,
        }
    }
}

impl<S, F> Drop for PaginationController<S, F>
where
    S: PaginationSurface + StyleHost,
    F: FrameScheduler,
{
    fn drop(&mut self) {
        self.detach();
    }
}
