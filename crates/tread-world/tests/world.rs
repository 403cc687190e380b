use std::sync::{Arc, Mutex};

use tread_blocks::{Block, BlockRegistry};
use tread_geom::BlockPos;
use tread_world::{BlockSource, ChunkCoord, GridWorld, WorldDims, WorldGenMode, WorldListener};

#[derive(Default)]
struct Recorder {
    changes: Mutex<Vec<(BlockPos, Block, Block)>>,
    ready: Mutex<Vec<ChunkCoord>>,
    unloaded: Mutex<Vec<ChunkCoord>>,
}

impl WorldListener for Recorder {
    fn on_block_changed(&self, pos: BlockPos, new: Block, old: Block) {
        self.changes.lock().unwrap().push((pos, new, old));
    }

    fn on_chunk_ready(&self, coord: ChunkCoord) {
        self.ready.lock().unwrap().push(coord);
    }

    fn on_chunk_unloaded(&self, coord: ChunkCoord) {
        self.unloaded.lock().unwrap().push(coord);
    }
}

fn flat_world() -> GridWorld {
    GridWorld::new(
        WorldDims::new(8, 8, 16),
        Arc::new(BlockRegistry::with_defaults()),
        7,
        WorldGenMode::Flat { thickness: 2 },
    )
}

#[test]
fn flat_terrain_has_grass_on_stone() {
    let world = flat_world();
    let reg = world.registry();
    let p = BlockPos::new(-3, 0, 11);
    assert_eq!(world.block_at(p), reg.block_by_name("stone").unwrap());
    assert_eq!(world.block_at(p.with_y(1)), reg.block_by_name("grass").unwrap());
    assert_eq!(world.block_at(p.with_y(2)), Block::AIR);
    assert_eq!(world.block_at(p.with_y(-1)), Block::AIR);
    assert_eq!(world.block_at(p.with_y(16)), Block::AIR);
}

#[test]
fn edits_notify_listeners_with_old_and_new() {
    let world = flat_world();
    let rec = Arc::new(Recorder::default());
    world.register_listener(rec.clone());
    let p = BlockPos::new(1, 1, 1);
    let grass = world.block_at(p);
    world.set_block(p, Block::AIR);
    // Setting the same block again is not a change.
    world.set_block(p, Block::AIR);
    // Out of height range is ignored.
    world.set_block(BlockPos::new(0, 99, 0), Block::new(1));
    let changes = rec.changes.lock().unwrap().clone();
    assert_eq!(changes, vec![(p, Block::AIR, grass)]);
    assert_eq!(world.block_at(p), Block::AIR);
    assert_eq!(world.edit_stats().block_edits, 1);
}

#[test]
fn load_and_unload_are_announced() {
    let world = flat_world();
    let rec = Arc::new(Recorder::default());
    world.register_listener(rec.clone());
    world.load_area(0, 0, 2, 1);
    assert!(world.is_loaded(ChunkCoord::new(1, 0)));
    assert!(!world.is_loaded(ChunkCoord::new(2, 0)));
    world.unload_chunk(ChunkCoord::new(1, 0));
    world.unload_chunk(ChunkCoord::new(5, 5));
    assert_eq!(
        *rec.ready.lock().unwrap(),
        vec![ChunkCoord::new(0, 0), ChunkCoord::new(1, 0)]
    );
    assert_eq!(*rec.unloaded.lock().unwrap(), vec![ChunkCoord::new(1, 0)]);
    assert_eq!(world.loaded_chunks(), vec![ChunkCoord::new(0, 0)]);
}

#[test]
fn layered_maps_paint_stone_at_origin() {
    let world = GridWorld::from_layers(
        WorldDims::new(4, 4, 4),
        Arc::new(BlockRegistry::with_defaults()),
        BlockPos::new(10, 0, -2),
        &["X  |   ", "   | X "],
    );
    assert_eq!(world.block_at(BlockPos::new(10, 0, -2)), world.ground_block());
    assert_eq!(world.block_at(BlockPos::new(11, 1, -1)), world.ground_block());
    assert_eq!(world.block_at(BlockPos::new(11, 0, -1)), Block::AIR);
}

#[test]
fn hills_stay_inside_world_height() {
    let world = GridWorld::new(
        WorldDims::new(16, 16, 32),
        Arc::new(BlockRegistry::with_defaults()),
        42,
        WorldGenMode::Hills {
            base: 28,
            amplitude: 10,
            frequency: 0.05,
        },
    );
    for x in -40..40 {
        for z in -40..40 {
            let h = world.terrain_height(x, z).unwrap();
            assert!((0..32).contains(&h));
            assert!(!world.is_penetrable(world.block_at(BlockPos::new(x, h, z))));
        }
    }
}
