//! Page furniture: headers, footers and the gaps between pages
//!
//! Furniture is laid out in normal flow next to the content. Break blocks
//! are floated behind zero-height spacers whose top margins land them on
//! the page boundaries, so content lines flow around them without the
//! document ever being split.

use crate::layout::{PageConfig, PageLayoutDimensions};
use std::fmt::Write;

/// Formats a page label from (current page, total pages)
pub type LabelFormatter = dyn Fn(usize, usize) -> String;

/// Default page label: `"{current} {separator} {total}"`
pub fn default_page_label(current: usize, total: usize, separator: &str) -> String {
    format!("{} {} {}", current, separator, total)
}

/// Inputs that determine the overlay set; equal keys need no rebuild
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayKey {
    pub page_count: usize,
    pub config: PageConfig,
    pub gap: f64,
    pub measured_content_height: f64,
}

/// One furniture block
#[derive(Debug, Clone, PartialEq)]
pub enum OverlayBlock {
    /// Top margin of the first page
    FirstPageHeader { width: f64, height: f64 },
    /// Zero-height float pushing the next break block down to a boundary
    BreakSpacer { page: usize, margin_top: f64 },
    /// Footer of `page`, the gap, and the header of the page after it.
    /// `offset` is the boundary position measured from the top of the first
    /// page's content area.
    PageBreak {
        page: usize,
        offset: f64,
        width: f64,
        footer_height: f64,
        gap: f64,
        header_height: f64,
        label: Option<String>,
    },
    /// Blank space completing a partially filled last page
    LastPageFiller { height: f64 },
    /// Bottom margin of the last page
    LastPageFooter {
        width: f64,
        height: f64,
        label: Option<String>,
    },
}

impl OverlayBlock {
    /// Height the block occupies in flow
    pub fn height(&self) -> f64 {
        match self {
            OverlayBlock::FirstPageHeader { height, .. } => *height,
            OverlayBlock::BreakSpacer { .. } => 0.0,
            OverlayBlock::PageBreak {
                footer_height,
                gap,
                header_height,
                ..
            } => footer_height + gap + header_height,
            OverlayBlock::LastPageFiller { height } => *height,
            OverlayBlock::LastPageFooter { height, .. } => *height,
        }
    }

    pub fn class_name(&self) -> &'static str {
        match self {
            OverlayBlock::FirstPageHeader { .. } => "pf-first-page-header",
            OverlayBlock::BreakSpacer { .. } => "pf-break-spacer",
            OverlayBlock::PageBreak { .. } => "pf-page-break",
            OverlayBlock::LastPageFiller { .. } => "pf-last-page-filler",
            OverlayBlock::LastPageFooter { .. } => "pf-last-page-footer",
        }
    }
}

/// The complete furniture for one pagination state
#[derive(Debug, Clone, PartialEq)]
pub struct OverlaySet {
    pub key: OverlayKey,
    pub blocks: Vec<OverlayBlock>,
}

/// HTML fragments for DOM hosts: the header goes before the content, the
/// breaks container floats beside it, the footer goes after it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayHtml {
    pub header: String,
    pub breaks: String,
    pub footer: String,
}

impl OverlaySet {
    pub fn page_count(&self) -> usize {
        self.key.page_count
    }

    /// Height of the first-page header
    pub fn header_height(&self) -> f64 {
        self.blocks
            .iter()
            .find_map(|block| match block {
                OverlayBlock::FirstPageHeader { height, .. } => Some(*height),
                _ => None,
            })
            .unwrap_or(0.0)
    }

    /// Vertical bands occupied by break blocks, `(start, end)` from the top
    /// of the first page's content area
    pub fn break_bands(&self) -> Vec<(f64, f64)> {
        self.blocks
            .iter()
            .filter_map(|block| match block {
                OverlayBlock::PageBreak { offset, .. } => Some((*offset, offset + block.height())),
                _ => None,
            })
            .collect()
    }

    pub fn to_html(&self) -> OverlayHtml {
        let mut html = OverlayHtml {
            header: String::new(),
            breaks: String::from(
                "<div class=\"pf-overlays\" data-pagination-furniture=\"overlays\" contenteditable=\"false\" aria-hidden=\"true\">",
            ),
            footer: String::new(),
        };

        for block in &self.blocks {
            match block {
                OverlayBlock::FirstPageHeader { width, height } => {
                    let style = format!("width:{}px;height:{}px", width, height);
                    open_block(&mut html.header, block, &style);
                    html.header.push_str("</div>");
                }
                OverlayBlock::BreakSpacer { margin_top, .. } => {
                    let style = format!(
                        "float:left;clear:both;width:100%;height:0;margin-top:{}px",
                        margin_top
                    );
                    open_block(&mut html.breaks, block, &style);
                    html.breaks.push_str("</div>");
                }
                OverlayBlock::PageBreak {
                    width,
                    footer_height,
                    gap,
                    header_height,
                    label,
                    ..
                } => {
                    open_block(
                        &mut html.breaks,
                        block,
                        &format!("float:left;clear:both;width:{}px", width),
                    );
                    let _ = write!(
                        html.breaks,
                        "<div class=\"pf-page-footer\" style=\"height:{}px\">",
                        footer_height
                    );
                    push_label(&mut html.breaks, label.as_deref());
                    let _ = write!(
                        html.breaks,
                        "</div><div class=\"pf-page-gap\" style=\"height:{}px\"></div><div class=\"pf-page-header\" style=\"height:{}px\"></div></div>",
                        gap, header_height
                    );
                }
                OverlayBlock::LastPageFiller { height } => {
                    open_block(&mut html.footer, block, &format!("height:{}px", height));
                    html.footer.push_str("</div>");
                }
                OverlayBlock::LastPageFooter { width, height, label } => {
                    let style = format!("width:{}px;height:{}px", width, height);
                    open_block(&mut html.footer, block, &style);
                    push_label(&mut html.footer, label.as_deref());
                    html.footer.push_str("</div>");
                }
            }
        }

        html.breaks.push_str("</div>");
        html
    }
}

fn open_block(out: &mut String, block: &OverlayBlock, style: &str) {
    let _ = write!(
        out,
        "<div class=\"{}\" data-pagination-furniture=\"true\" contenteditable=\"false\" style=\"{};user-select:none;pointer-events:none\">",
        block.class_name(),
        style
    );
}

fn push_label(out: &mut String, label: Option<&str>) {
    if let Some(label) = label {
        out.push_str("<span class=\"pf-page-number\">");
        escape_into(out, label);
        out.push_str("</span>");
    }
}

fn escape_into(out: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
}

/// Builds overlay sets from the derived page geometry
pub struct OverlayRenderer<'a> {
    layout: PageLayoutDimensions,
    gap: f64,
    labels: Option<&'a LabelFormatter>,
}

impl<'a> OverlayRenderer<'a> {
    pub fn new(layout: PageLayoutDimensions, gap: f64) -> Self {
        Self {
            layout,
            gap,
            labels: None,
        }
    }

    /// Attach page labels to footers
    pub fn with_labels(mut self, formatter: &'a LabelFormatter) -> Self {
        self.labels = Some(formatter);
        self
    }

    pub fn build(&self, key: OverlayKey) -> OverlaySet {
        let layout = &self.layout;
        let page_count = key.page_count.max(1);
        let content_height = layout.content.height;
        let furniture = layout.furniture_height(self.gap);
        let label = |current: usize| self.labels.map(|format| format(current, page_count));

        let mut blocks = Vec::with_capacity(2 * page_count + 2);
        blocks.push(OverlayBlock::FirstPageHeader {
            width: layout.page.width,
            height: layout.margins.top,
        });

        let mut previous_end = 0.0;
        for page in 1..page_count {
            let offset = page as f64 * content_height + (page - 1) as f64 * furniture;
            blocks.push(OverlayBlock::BreakSpacer {
                page,
                margin_top: offset - previous_end,
            });
            blocks.push(OverlayBlock::PageBreak {
                page,
                offset,
                width: layout.page.width,
                footer_height: layout.margins.bottom,
                gap: self.gap,
                header_height: layout.margins.top,
                label: label(page),
            });
            previous_end = offset + furniture;
        }

        let on_last_page = key.measured_content_height - (page_count - 1) as f64 * content_height;
        if on_last_page < content_height {
            blocks.push(OverlayBlock::LastPageFiller {
                height: content_height - on_last_page.max(0.0),
            });
        }

        blocks.push(OverlayBlock::LastPageFooter {
            width: layout.page.width,
            height: layout.margins.bottom,
            label: label(page_count),
        });

        OverlaySet { key, blocks }
    }
}
