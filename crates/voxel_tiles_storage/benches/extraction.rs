use voxel_tiles_core::prelude::*;
use voxel_tiles_storage::prelude::{extract_block, ColorMapper, VersionId, VoxelFormat};

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use utilities::data_sets::{counting_volume, gray_ramp};

fn extract_cube(c: &mut Criterion) {
    let mut group = c.benchmark_group("extract_cube");
    let source = counting_volume(Point3i::fill(256));
    for size in CELL_SIZES.iter() {
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            let cell = Extent3i::from_min_and_shape(Point3i::fill(7), Point3i::fill(size));
            b.iter(|| black_box(extract_block(&source, &cell)));
        });
    }
    group.finish();
}

fn map_rgba(c: &mut Criterion) {
    bench_mapper(c, "map_rgba", ColorMapper::default());
}

fn map_paletted(c: &mut Criterion) {
    bench_mapper(c, "map_paletted", ColorMapper::paletted());
}

fn bench_mapper(c: &mut Criterion, name: &str, mapper: ColorMapper) {
    let mut group = c.benchmark_group(name);
    let map = gray_ramp();
    for size in CELL_SIZES.iter() {
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            b.iter_with_setup(
                || {
                    let source = counting_volume(Point3i::fill(size));
                    let cell = Extent3i::from_min_and_shape(Point3i::ZERO, Point3i::fill(size));

                    extract_block(&source, &cell)
                },
                |raw| {
                    black_box(mapper.map(
                        &raw,
                        VoxelFormat::U8,
                        Point3i::fill(size),
                        &map,
                        VersionId::next(),
                    ));
                },
            );
        });
    }
    group.finish();
}

criterion_group!(benches, extract_cube, map_rgba, map_paletted);
criterion_main!(benches);

const CELL_SIZES: [i32; 3] = [16, 32, 64];
