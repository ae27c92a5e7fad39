use voxel_tiles_core::prelude::*;
use voxel_tiles_render::prelude::*;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use utilities::data_sets::{gray_ramp, sphere_volume};

fn clip_quad_against_cell(c: &mut Criterion) {
    let cell = Extent3i::from_min_and_shape(Point3i::ZERO, Point3i::fill(32));
    let clipper = SliceClipper::new(&cell, Point3f::fill(32.0));
    let quad = [
        PointN([-10.0, -5.0, 12.0]),
        PointN([40.0, -5.0, 20.0]),
        PointN([40.0, 45.0, 20.0]),
        PointN([-10.0, 45.0, 12.0]),
    ];

    c.bench_function("clip_quad_against_cell", |b| {
        b.iter(|| black_box(clipper.clip(&quad)))
    });
}

fn clip_and_composite_plane(c: &mut Criterion) {
    let mut group = c.benchmark_group("clip_and_composite_plane");
    let (source, _) = sphere_volume(128, 200, 0);
    let map = gray_ramp();
    let camera = Camera::perspective(PointN([0.0, 0.0, -200.0]), PointN([0.0, 0.0, 1.0]));
    let plane = CuttingGeometry::Plane {
        normal: PointN([0.3, 0.2, 1.0]),
        distance: 4.0,
    };
    for cube_size in [16, 32, 64].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(cube_size), cube_size, |b, &cube_size| {
            let mut config = RenderConfig::default();
            config.cube_cache.cube_shape = Point3i::fill(cube_size);
            let mut context = RenderContext::new(config, HardwareLimits::default());
            // Build every cube outside of the measurement.
            context.clip_and_composite(&plane, &source, &map, &camera);

            b.iter(|| black_box(context.clip_and_composite(&plane, &source, &map, &camera).len()))
        });
    }
    group.finish();
}

fn view_aligned_pass(c: &mut Criterion) {
    let (source, _) = sphere_volume(64, 200, 0);
    let map = gray_ramp();
    let camera = Camera::orthographic(PointN([-100.0, -100.0, -100.0]), PointN([1.0, 1.0, 1.0]));
    let mut config = RenderConfig::default();
    config.cube_cache.cube_shape = Point3i::fill(16);
    let mut context = RenderContext::new(config, HardwareLimits::default());

    c.bench_function("view_aligned_pass", |b| {
        b.iter(|| {
            black_box(
                context
                    .render_view_aligned(&source, &map, &camera, 128, |_, _| AbortCode::Continue)
                    .len(),
            )
        })
    });
}

criterion_group!(
    benches,
    clip_quad_against_cell,
    clip_and_composite_plane,
    view_aligned_pass
);
criterion_main!(benches);
