use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use glam::IVec3;
use voxmap_core::{BlockId, WorldPos};
use voxmap_map::VoxelMap;

fn column_of(size: i32) -> impl Iterator<Item = WorldPos> {
    (0..size).flat_map(move |x| {
        (0..size).flat_map(move |z| (0..(x + z) % 16 + 1).map(move |y| WorldPos::new(x, y, z)))
    })
}

fn filled(size: i32) -> VoxelMap {
    let mut map = VoxelMap::new(IVec3::ZERO, 1023).unwrap();
    for pos in column_of(size) {
        map.set(pos, BlockId::STONE).unwrap();
    }
    map
}

fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert");
    for size in [16, 32, 64] {
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            b.iter(|| black_box(filled(size)));
        });
    }
    group.finish();
}

fn bench_get(c: &mut Criterion) {
    let map = filled(32);
    let keys: Vec<_> = column_of(32).collect();
    c.bench_function("get_hit", |b| {
        b.iter(|| {
            for &pos in &keys {
                black_box(map.get(pos));
            }
        });
    });
    c.bench_function("get_miss", |b| {
        b.iter(|| {
            for &pos in &keys {
                black_box(map.get(WorldPos::new(pos.x, pos.y + 32, pos.z)));
            }
        });
    });
}

fn bench_iter_and_clone(c: &mut Criterion) {
    let map = filled(32);
    c.bench_function("iter", |b| b.iter(|| black_box(map.iter().count())));
    c.bench_function("clone", |b| b.iter(|| black_box(map.clone())));
}

criterion_group!(benches, bench_insert, bench_get, bench_iter_and_clone);
criterion_main!(benches);
