use std::sync::Arc;
use std::time::Duration;

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use tread_blocks::BlockRegistry;
use tread_geom::BlockPos;
use tread_nav::{NavConfig, Pathfinder};
use tread_world::{ChunkCoord, GridWorld, WorldDims, WorldGenMode};

fn hills(chunks: i32) -> (GridWorld, Vec<ChunkCoord>) {
    let world = GridWorld::new(
        WorldDims::new(16, 16, 48),
        Arc::new(BlockRegistry::with_defaults()),
        0xC0FFEE,
        WorldGenMode::Hills {
            base: 12,
            amplitude: 6,
            frequency: 0.03,
        },
    );
    let coords = (0..chunks)
        .flat_map(|cz| (0..chunks).map(move |cx| ChunkCoord::new(cx, cz)))
        .collect();
    (world, coords)
}

fn surface(world: &GridWorld, x: i32, z: i32) -> BlockPos {
    BlockPos::new(x, world.terrain_height(x, z).unwrap_or(0), z)
}

fn bench_rebuild(c: &mut Criterion) {
    let mut group = c.benchmark_group("rebuild_regions");
    group.measurement_time(Duration::from_secs(5));
    let (world, coords) = hills(4);
    group.bench_function("hills_4x4_chunks", |b| {
        b.iter(|| {
            let mut pf = Pathfinder::new(WorldDims::new(16, 16, 48), NavConfig::default());
            black_box(pf.rebuild_regions(&world, &coords));
        })
    });
    group.finish();
}

fn bench_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("find_path");
    let (world, coords) = hills(6);
    let start = surface(&world, 2, 2);
    let target = surface(&world, 90, 85);
    for (name, hierarchical) in [("hierarchical", true), ("flat", false)] {
        let cfg = NavConfig {
            hierarchical,
            ..NavConfig::default()
        };
        let mut pf = Pathfinder::new(WorldDims::new(16, 16, 48), cfg);
        pf.rebuild_regions(&world, &coords);
        let (s, t) = (pf.block_at(start), pf.block_at(target));
        group.bench_function(format!("hills_6x6_{name}"), |b| {
            b.iter(|| black_box(pf.find_path(t, s)))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_rebuild, bench_search);
criterion_main!(benches);
