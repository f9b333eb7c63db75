//! Benchmarks for the pagination engine

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use page_flow::headless::{HeadlessSurface, ManualScheduler};
use page_flow::layout::{
    get_page_layout_dimensions, plan_break_spacing, solve_page_count, MarkerSample, PageConfig,
    DEFAULT_MAX_ITERATIONS,
};
use page_flow::render::{default_page_label, OverlayKey, OverlayRenderer};
use page_flow::{NodeId, PaginationController, PaginationOptions};

const GAP: f64 = 50.0;

fn bench_solve_page_count(c: &mut Criterion) {
    let layout = get_page_layout_dimensions(&PageConfig::default());
    c.bench_function("solve_page_count", |b| {
        b.iter(|| {
            black_box(solve_page_count(
                black_box(48_000.0),
                &layout,
                GAP,
                1,
                1,
                DEFAULT_MAX_ITERATIONS,
            ))
        });
    });
}

fn bench_plan_break_spacing(c: &mut Criterion) {
    let layout = get_page_layout_dimensions(&PageConfig::default());
    let samples: Vec<MarkerSample> = (0..100)
        .map(|i| MarkerSample {
            node: NodeId(i),
            offset: i as f64 * 1106.0 + 300.0,
            current_spacing: 0.0,
        })
        .collect();

    c.bench_function("plan_break_spacing_100_markers", |b| {
        b.iter(|| black_box(plan_break_spacing(black_box(&samples), &layout, GAP, 1.0)));
    });
}

fn bench_build_overlays(c: &mut Criterion) {
    let config = PageConfig::default();
    let layout = get_page_layout_dimensions(&config);
    let labels = |current: usize, total: usize| default_page_label(current, total, "of");
    let renderer = OverlayRenderer::new(layout, GAP).with_labels(&labels);
    let key = OverlayKey {
        page_count: 200,
        config,
        gap: GAP,
        measured_content_height: 199.5 * 864.0,
    };

    c.bench_function("build_overlays_200_pages", |b| {
        b.iter(|| black_box(renderer.build(black_box(key)).to_html()));
    });
}

fn bench_settle_document(c: &mut Criterion) {
    c.bench_function("settle_headless_document", |b| {
        b.iter(|| {
            let mut surface = HeadlessSurface::new(816.0, 624.0);
            for i in 0..200 {
                surface.push_paragraph(format!(
                    "Paragraph {} contains enough text to span multiple lines and test the line breaking algorithm.",
                    i
                ));
                if i % 50 == 49 {
                    surface.push_break();
                }
            }
            let mut controller = PaginationController::new(
                surface,
                ManualScheduler::new(),
                PaginationOptions::default(),
            );
            controller.attach();
            controller.run_pending_frames(16);
            black_box(controller.page_count())
        });
    });
}

criterion_group!(
    benches,
    bench_solve_page_count,
    bench_plan_break_spacing,
    bench_build_overlays,
    bench_settle_document,
);

criterion_main!(benches);
