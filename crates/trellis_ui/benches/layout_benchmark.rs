//! Benchmarks for layout hot paths.
//!
//! Run with: cargo bench --package trellis_ui --bench layout_benchmark

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use trellis_core::{Edges, LayoutParameters, Length, Orientation, PixelRect, SimpleRotation, Vec2};
use trellis_ui::nine_slice::NineSlice;
use trellis_ui::view::handle;
use trellis_ui::widget::{Lane, Spacer};
use trellis_ui::{Sprite, Texture, View, ViewHandle};

fn grid(rows: usize, columns: usize) -> ViewHandle {
    let rows = (0..rows)
        .map(|_| {
            let cells = (0..columns)
                .map(|_| handle(Spacer::new(LayoutParameters::fixed_size(24.0, 24.0))))
                .collect();
            handle(Lane::new(Orientation::Horizontal).with_children(cells))
        })
        .collect();
    handle(
        Lane::new(Orientation::Vertical)
            .with_layout(LayoutParameters::new(Length::Stretch, Length::Content))
            .with_children(rows),
    )
}

fn benchmark_lane_measure(c: &mut Criterion) {
    let mut group = c.benchmark_group("lane_measure");

    for (rows, columns) in [(4, 8), (16, 16), (64, 32)] {
        let root = grid(rows, columns);
        group.throughput(Throughput::Elements((rows * columns) as u64));
        group.bench_function(format!("{rows}x{columns}"), |b| {
            // Alternating widths defeat the measure cache so every pass is a full layout.
            let mut wide = false;
            b.iter(|| {
                wide = !wide;
                let width = if wide { 1920.0 } else { 1280.0 };
                black_box(root.borrow_mut().measure(Vec2::new(width, 1080.0)))
            });
        });
    }

    group.finish();
}

fn benchmark_lane_cached_measure(c: &mut Criterion) {
    let root = grid(64, 32);
    root.borrow_mut().measure(Vec2::new(1920.0, 1080.0));

    c.bench_function("lane_measure_cached", |b| {
        b.iter(|| black_box(root.borrow_mut().measure(Vec2::new(1920.0, 1080.0))));
    });
}

fn benchmark_nine_slice_layout(c: &mut Criterion) {
    let texture = Texture::new(1, 64, 64);
    let sprite =
        Sprite::from_rect(texture, PixelRect::new(0, 0, 32, 32)).with_fixed_edges(Edges::all(6));
    let mut slice = NineSlice::new(sprite);

    let mut group = c.benchmark_group("nine_slice_layout");
    group.bench_function("unrotated", |b| {
        let mut size = 0;
        b.iter(|| {
            size = (size + 1) % 256;
            slice.layout(PixelRect::new(0, 0, 64 + size, 48 + size), SimpleRotation::None);
            black_box(slice.destination_grid());
        });
    });
    group.bench_function("rotated_quarter", |b| {
        let mut size = 0;
        b.iter(|| {
            size = (size + 1) % 256;
            let destination = PixelRect::new(0, 0, 64 + size, 48 + size);
            slice.layout(destination, SimpleRotation::QuarterClockwise);
            black_box(slice.destination_grid());
        });
    });
    group.finish();
}

criterion_group!(
    benches,
    benchmark_lane_measure,
    benchmark_lane_cached_measure,
    benchmark_nine_slice_layout
);
criterion_main!(benches);
