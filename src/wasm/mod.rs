//! WASM bindings for the paginator
//!
//! The browser side hands over a plain host object. Geometry is read and
//! written through its methods:
//!
//! ```text
//! containerRect() -> {x, y, width, height} | null
//! children() -> [{id, role}]       role: content | overlays | header | footer | structural
//! nodeRect(id) -> rect | null
//! breakMarkers() -> [id]
//! markerSpacing(id) -> number
//! setMarkerSpacing(id, px)
//! setMinHeight(px)
//! replaceOverlays(headerHtml, breaksHtml, footerHtml)
//! scrollTo(kind, page)             kind: start | boundary
//! scale() -> number
//! hasStylesheet(id) / insertStylesheet(id, css) / removeStylesheet(id)
//! requestFrame() -> number / cancelFrame(number)
//! ```
//!
//! Host callbacks must not call back into the paginator synchronously.

use crate::controller::{ChangeOrigin, PaginationController, PassReport, Trigger};
use crate::layout::{
    calculate_page_count, create_page_config, FormatSpec, MarginOverrides, PageDimensions,
    PageOrientation,
};
use crate::options::PaginationOptions;
use crate::render::styles::PAGINATION_CSS;
use crate::render::OverlaySet;
use crate::surface::marker::marker_html;
use crate::surface::{
    ChildNode, FrameHandle, FrameScheduler, NodeId, NodeRole, PaginationSurface, ScrollTarget,
    StyleHost,
};
use crate::Rect;
use js_sys::{Array, Function, Reflect};
use serde::{Deserialize, Serialize};
use tracing::warn;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

/// Initialize panic hook for better error messages
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Call `name` on the host object. Missing methods and thrown exceptions
/// read as `None`.
fn call(host: &JsValue, name: &str, args: &[JsValue]) -> Option<JsValue> {
    let method = Reflect::get(host, &JsValue::from_str(name))
        .ok()?
        .dyn_into::<Function>()
        .ok()?;
    let array: Array = args.iter().collect();
    match method.apply(host, &array) {
        Ok(value) => Some(value),
        Err(err) => {
            warn!("Host method {} threw: {:?}", name, err);
            None
        }
    }
}

fn field(value: &JsValue, name: &str) -> Option<f64> {
    Reflect::get(value, &JsValue::from_str(name)).ok()?.as_f64()
}

fn read_rect(value: JsValue) -> Option<Rect> {
    if value.is_null() || value.is_undefined() {
        return None;
    }
    Some(Rect::new(
        field(&value, "x").unwrap_or(0.0),
        field(&value, "y")?,
        field(&value, "width").unwrap_or(0.0),
        field(&value, "height").unwrap_or(0.0),
    ))
}

fn read_role(value: &JsValue) -> NodeRole {
    let role = Reflect::get(value, &JsValue::from_str("role"))
        .ok()
        .and_then(|role| role.as_string());
    match role.as_deref() {
        Some("overlays") => NodeRole::OverlayContainer,
        Some("header") => NodeRole::FirstPageHeader,
        Some("footer") => NodeRole::LastPageFooter,
        Some("structural") => NodeRole::Structural,
        _ => NodeRole::Content,
    }
}

fn node_value(node: NodeId) -> JsValue {
    JsValue::from_f64(node.0 as f64)
}

fn read_node(value: &JsValue) -> Option<NodeId> {
    value.as_f64().map(|id| NodeId(id as u64))
}

/// Surface backed by a browser host object
pub struct JsSurface {
    host: JsValue,
}

impl JsSurface {
    pub fn new(host: JsValue) -> Self {
        Self { host }
    }
}

impl PaginationSurface for JsSurface {
    fn container_rect(&self) -> Option<Rect> {
        read_rect(call(&self.host, "containerRect", &[])?)
    }

    fn children(&self) -> Vec<ChildNode> {
        let Some(children) = call(&self.host, "children", &[]) else {
            return Vec::new();
        };
        Array::from(&children)
            .iter()
            .filter_map(|child| {
                let id = Reflect::get(&child, &JsValue::from_str("id")).ok()?;
                Some(ChildNode::new(read_node(&id)?, read_role(&child)))
            })
            .collect()
    }

    fn node_rect(&self, node: NodeId) -> Option<Rect> {
        read_rect(call(&self.host, "nodeRect", &[node_value(node)])?)
    }

    fn break_markers(&self) -> Vec<NodeId> {
        call(&self.host, "breakMarkers", &[])
            .map(|markers| Array::from(&markers).iter().filter_map(|id| read_node(&id)).collect())
            .unwrap_or_default()
    }

    fn marker_spacing(&self, marker: NodeId) -> f64 {
        call(&self.host, "markerSpacing", &[node_value(marker)])
            .and_then(|value| value.as_f64())
            .unwrap_or(0.0)
    }

    fn set_marker_spacing(&mut self, marker: NodeId, px: f64) {
        call(
            &self.host,
            "setMarkerSpacing",
            &[node_value(marker), JsValue::from_f64(px)],
        );
    }

    fn set_min_height(&mut self, px: f64) {
        call(&self.host, "setMinHeight", &[JsValue::from_f64(px)]);
    }

    fn replace_overlays(&mut self, overlays: &OverlaySet) {
        let html = overlays.to_html();
        call(
            &self.host,
            "replaceOverlays",
            &[
                JsValue::from_str(&html.header),
                JsValue::from_str(&html.breaks),
                JsValue::from_str(&html.footer),
            ],
        );
    }

    fn scroll_to(&mut self, target: ScrollTarget) {
        let args = match target {
            ScrollTarget::DocumentStart => [JsValue::from_str("start"), JsValue::NULL],
            ScrollTarget::PageBoundary(page) => {
                [JsValue::from_str("boundary"), JsValue::from_f64(page as f64)]
            }
        };
        call(&self.host, "scrollTo", &args);
    }

    fn scale(&self) -> f64 {
        call(&self.host, "scale", &[])
            .and_then(|value| value.as_f64())
            .unwrap_or(1.0)
    }
}

impl StyleHost for JsSurface {
    fn has_stylesheet(&self, id: &str) -> bool {
        call(&self.host, "hasStylesheet", &[JsValue::from_str(id)])
            .map(|value| value.is_truthy())
            .unwrap_or(false)
    }

    fn insert_stylesheet(&mut self, id: &str, css: &str) {
        call(
            &self.host,
            "insertStylesheet",
            &[JsValue::from_str(id), JsValue::from_str(css)],
        );
    }

    fn remove_stylesheet(&mut self, id: &str) {
        call(&self.host, "removeStylesheet", &[JsValue::from_str(id)]);
    }
}

/// Frame scheduler backed by the host's `requestFrame`/`cancelFrame`
pub struct JsScheduler {
    host: JsValue,
}

impl FrameScheduler for JsScheduler {
    fn request_frame(&mut self) -> FrameHandle {
        let id = call(&self.host, "requestFrame", &[])
            .and_then(|value| value.as_f64())
            .unwrap_or(0.0);
        FrameHandle(id as u64)
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        call(&self.host, "cancelFrame", &[JsValue::from_f64(handle.0 as f64)]);
    }
}

/// Serializable pass summary for JS
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PassSummary {
    pub page_count: usize,
    pub min_pages: usize,
    pub marker_writes: usize,
    pub content_height: f64,
    pub iterations: usize,
    pub converged: bool,
    pub changed: bool,
}

impl From<&PassReport> for PassSummary {
    fn from(report: &PassReport) -> Self {
        Self {
            page_count: report.solution.page_count,
            min_pages: report.min_pages,
            marker_writes: report.marker_writes,
            content_height: report.solution.content_height,
            iterations: report.solution.iterations,
            converged: report.solution.converged,
            changed: report.change.is_some(),
        }
    }
}

/// WASM-exposed pagination session
#[wasm_bindgen]
pub struct WasmPaginator {
    controller: PaginationController<JsSurface, JsScheduler>,
}

#[wasm_bindgen]
impl WasmPaginator {
    /// Create a session over `host` with options given as JSON (may be
    /// empty)
    #[wasm_bindgen(constructor)]
    pub fn new(host: JsValue, options_json: &str) -> Result<WasmPaginator, JsError> {
        let options = if options_json.trim().is_empty() {
            PaginationOptions::default()
        } else {
            PaginationOptions::from_json(options_json)?
        };

        let surface = JsSurface::new(host.clone());
        let scheduler = JsScheduler { host };
        Ok(Self {
            controller: PaginationController::new(surface, scheduler, options),
        })
    }

    /// Inject the stylesheet, draw first-page furniture, schedule a frame
    pub fn attach(&mut self) {
        self.controller.attach();
    }

    /// Cancel pending work and remove the stylesheet
    pub fn detach(&mut self) {
        self.controller.detach();
    }

    /// Call `callback(previous, current)` whenever the page count changes
    #[wasm_bindgen(js_name = onPageCountChange)]
    pub fn on_page_count_change(&mut self, callback: Function) {
        self.controller.set_page_count_listener(move |change| {
            let _ = callback.call2(
                &JsValue::NULL,
                &JsValue::from_f64(change.previous_page_count as f64),
                &JsValue::from_f64(change.page_count as f64),
            );
        });
    }

    /// The document changed. `fromPagination` marks echoes of the
    /// paginator's own writes, which are ignored.
    #[wasm_bindgen(js_name = notifyDocumentChanged)]
    pub fn notify_document_changed(&mut self, from_pagination: bool) {
        let origin = if from_pagination {
            ChangeOrigin::Pagination
        } else {
            ChangeOrigin::Host
        };
        self.controller.notify(Trigger::DocumentChanged(origin));
    }

    /// Frame callback. Returns a JSON pass summary, or `undefined` when the
    /// handle was stale.
    #[wasm_bindgen(js_name = onFrame)]
    pub fn on_frame(&mut self, handle: f64) -> Result<Option<String>, JsError> {
        match self.controller.on_frame(FrameHandle(handle as u64)) {
            Some(report) => Ok(Some(serde_json::to_string(&PassSummary::from(&report))?)),
            None => Ok(None),
        }
    }

    /// Switch to a named format (`"A4"`, `"Letter"`, `"Legal"`)
    #[wasm_bindgen(js_name = setFormat)]
    pub fn set_format(&mut self, format: &str) -> Result<(), JsError> {
        let format: FormatSpec = format.parse()?;
        self.controller.set_format(format);
        Ok(())
    }

    /// Switch to a custom page size in pixels
    #[wasm_bindgen(js_name = setCustomFormat)]
    pub fn set_custom_format(&mut self, width: f64, height: f64) -> Result<(), JsError> {
        self.controller.set_format(PageDimensions::new(width, height)?);
        Ok(())
    }

    #[wasm_bindgen(js_name = setOrientation)]
    pub fn set_orientation(&mut self, orientation: &str) -> Result<(), JsError> {
        let orientation: PageOrientation = orientation.parse()?;
        self.controller.set_orientation(orientation);
        Ok(())
    }

    /// Merge partial margins given as JSON, e.g. `{"top": 48}`
    #[wasm_bindgen(js_name = setMargins)]
    pub fn set_margins(&mut self, margins_json: &str) -> Result<(), JsError> {
        let overrides: MarginOverrides = serde_json::from_str(margins_json)?;
        self.controller.set_margins(overrides);
        Ok(())
    }

    #[wasm_bindgen(js_name = setPageGap)]
    pub fn set_page_gap(&mut self, gap: f64) {
        self.controller.set_page_gap(gap);
    }

    /// Scroll to the start of a 1-based page
    #[wasm_bindgen(js_name = goToPage)]
    pub fn go_to_page(&mut self, page: usize) {
        self.controller.go_to_page(page);
    }

    #[wasm_bindgen(js_name = getPageCount)]
    pub fn get_page_count(&self) -> usize {
        self.controller.page_count()
    }

    #[wasm_bindgen(js_name = getMeasuredContentHeight)]
    pub fn get_measured_content_height(&self) -> f64 {
        self.controller.storage().measured_content_height()
    }

    /// Page, content and margin geometry as JSON
    #[wasm_bindgen(js_name = getLayoutDimensions)]
    pub fn get_layout_dimensions(&self) -> Result<String, JsError> {
        Ok(serde_json::to_string(&self.controller.layout_dimensions())?)
    }

    /// Current page configuration as JSON
    #[wasm_bindgen(js_name = getPageConfig)]
    pub fn get_page_config(&self) -> Result<String, JsError> {
        Ok(serde_json::to_string(self.controller.storage().page_config())?)
    }

    #[wasm_bindgen(js_name = getPageBreakPositions)]
    pub fn get_page_break_positions(&self) -> Vec<f64> {
        self.controller.storage().page_break_positions()
    }
}

/// Pages needed for `content_height` pixels on a named format
#[wasm_bindgen(js_name = calculatePageCount)]
pub fn calculate_page_count_js(
    content_height: f64,
    format: &str,
    orientation: &str,
) -> Result<usize, JsError> {
    let format: FormatSpec = format.parse()?;
    let orientation: PageOrientation = orientation.parse()?;
    let config = create_page_config(format, orientation, None);
    Ok(calculate_page_count(content_height, &config))
}

/// Content-coordinate boundaries between `page_count` pages on a named
/// format
#[wasm_bindgen(js_name = getPageBreakPositions)]
pub fn get_page_break_positions_js(
    page_count: usize,
    format: &str,
    orientation: &str,
) -> Result<Vec<f64>, JsError> {
    let format: FormatSpec = format.parse()?;
    let orientation: PageOrientation = orientation.parse()?;
    let config = create_page_config(format, orientation, None);
    Ok(crate::layout::get_page_break_positions(page_count, &config))
}

/// Markup for inserting a manual page break
#[wasm_bindgen(js_name = pageBreakHtml)]
pub fn page_break_html() -> String {
    marker_html()
}

/// The pagination stylesheet, for hosts that inject styles themselves
#[wasm_bindgen(js_name = paginationCss)]
pub fn pagination_css() -> String {
    PAGINATION_CSS.to_string()
}
