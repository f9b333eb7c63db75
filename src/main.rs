//! Page-Flow CLI (for testing purposes only)
//! The main interface is through WASM bindings.
//!
//! Usage: page-flow [FORMAT] [ORIENTATION] [CONTENT_HEIGHT]

use page_flow::headless::{HeadlessSurface, ManualScheduler};
use page_flow::layout::{calculate_page_count, get_page_break_positions, PageFormat};
use page_flow::{
    create_page_config, get_page_layout_dimensions, FormatSpec, PageOrientation,
    PaginationController, PaginationOptions,
};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let format = args
        .first()
        .map(|s| s.parse::<FormatSpec>())
        .transpose()?
        .unwrap_or_default();
    let orientation = args
        .get(1)
        .map(|s| s.parse::<PageOrientation>())
        .transpose()?
        .unwrap_or_default();
    let content_height = args
        .get(2)
        .map(|s| s.parse::<f64>())
        .transpose()?
        .unwrap_or(2000.0);

    println!("Page-Flow Pagination Engine");
    println!("===========================");
    println!();
    println!("Formats (96 DPI):");
    for format in PageFormat::ALL {
        let size = format.dimensions();
        println!("  {:<8} {:>6} x {:<6}", format.name(), size.width, size.height);
    }
    println!();

    let config = create_page_config(format, orientation, None);
    let layout = get_page_layout_dimensions(&config);
    println!("Layout: {}", serde_json::to_string_pretty(&layout)?);

    let page_count = calculate_page_count(content_height, &config);
    println!("{}px of content -> {} pages", content_height, page_count);
    println!("Breaks at: {:?}", get_page_break_positions(page_count, &config));
    println!();

    // Settle a small document with one manual break
    let mut surface = HeadlessSurface::new(layout.page.width, layout.content.width);
    for i in 0..12 {
        surface.push_paragraph(format!(
            "Paragraph {} has enough words in it to wrap across a couple of lines on the page.",
            i + 1
        ));
    }
    surface.push_break();
    surface.push_paragraph("This paragraph starts on a fresh page.");

    let options = PaginationOptions {
        format,
        orientation,
        ..PaginationOptions::default()
    };
    let mut controller = PaginationController::new(surface, ManualScheduler::new(), options);
    controller.attach();
    for (frame, report) in controller.run_pending_frames(16).iter().enumerate() {
        println!(
            "Frame {}: {} pages (min {}), {} marker writes, content {:.0}px, converged {}",
            frame + 1,
            report.solution.page_count,
            report.min_pages,
            report.marker_writes,
            report.solution.content_height,
            report.solution.converged
        );
    }
    println!("Settled at {} pages", controller.page_count());

    Ok(())
}
