use std::sync::Arc;

use proptest::prelude::*;
use tread_blocks::{Block, BlockRegistry};
use tread_chunk::ChunkBuf;
use tread_geom::BlockPos;
use tread_world::{BlockSource, ChunkCoord, GridWorld, WorldDims, WorldGenMode};

fn dim() -> impl Strategy<Value = usize> {
    1usize..=8
}

fn small_i32() -> impl Strategy<Value = i32> {
    -1_000_000i32..=1_000_000
}

proptest! {
    // idx maps each (x,y,z) within bounds to unique in-range indices
    #[test]
    fn idx_is_unique_and_in_range(cx in small_i32(), cz in small_i32(), sx in dim(), sy in dim(), sz in dim()) {
        let expect = sx*sy*sz;
        let buf = ChunkBuf::from_blocks_local(ChunkCoord::new(cx, cz), sx, sy, sz, vec![Block::AIR; expect]);

        let mut seen = vec![false; expect];
        for y in 0..sy { for z in 0..sz { for x in 0..sx {
            let i = buf.idx(x,y,z);
            prop_assert!(i < expect);
            prop_assert!(!seen[i]);
            seen[i] = true;
        }}}
        prop_assert!(seen.into_iter().all(|b| b));
    }

    // contains_world agrees with get_world on inside and outside samples
    #[test]
    fn contains_world_and_get_world_agree(cx in -1000i32..1000, cz in -1000i32..1000, sx in dim(), sy in dim(), sz in dim()) {
        let expect = sx*sy*sz;
        let blocks = (0..expect).map(|i| Block::new((i % 65535) as u16)).collect();
        let buf = ChunkBuf::from_blocks_local(ChunkCoord::new(cx, cz), sx, sy, sz, blocks);

        let x0 = cx * sx as i32;
        let z0 = cz * sz as i32;
        let candidates = vec![
            (x0,               0,            z0),
            (x0 + sx as i32-1, sy as i32-1,  z0 + sz as i32-1),
            (x0 - 1,           0,            z0),
            (x0 + sx as i32,   0,            z0),
            (x0,              -1,            z0),
            (x0,               sy as i32,    z0),
            (x0,               0,            z0 - 1),
            (x0,               0,            z0 + sz as i32),
        ];
        for (wx,wy,wz) in candidates {
            let inside = wy >= 0 && wy < sy as i32 && wx >= x0 && wx < x0 + sx as i32 && wz >= z0 && wz < z0 + sz as i32;
            prop_assert_eq!(buf.contains_world(wx,wy,wz), inside);
            match buf.get_world(wx,wy,wz) {
                None => prop_assert!(!inside),
                Some(b) => {
                    prop_assert!(inside);
                    prop_assert_eq!(b, buf.get_local((wx - x0) as usize, wy as usize, (wz - z0) as usize));
                }
            }
        }
    }

    // from_blocks_local always yields exactly sx*sy*sz blocks
    #[test]
    fn from_blocks_local_resizes(sx in dim(), sy in dim(), sz in dim()) {
        let expect = sx*sy*sz;
        let wrong_len = expect.saturating_sub(1);
        let buf = ChunkBuf::from_blocks_local(ChunkCoord::default(), sx, sy, sz, vec![Block::AIR; wrong_len]);
        prop_assert_eq!(buf.blocks.len(), expect);
    }
}

#[test]
fn snapshot_copies_world_blocks() {
    let world = GridWorld::new(
        WorldDims::new(4, 4, 6),
        Arc::new(BlockRegistry::with_defaults()),
        0,
        WorldGenMode::Flat { thickness: 2 },
    );
    world.set_block(BlockPos::new(-3, 4, 5), world.ground_block());
    let buf = ChunkBuf::snapshot(&world, ChunkCoord::new(-1, 1));
    assert_eq!((buf.sx, buf.sy, buf.sz), (4, 6, 4));
    assert!(buf.has_non_air());
    for (wx, wy, wz) in [(-4, 0, 4), (-1, 1, 7), (-3, 4, 5), (-3, 5, 5), (-2, 2, 6)] {
        let p = BlockPos::new(wx, wy, wz);
        assert_eq!(buf.get_world(wx, wy, wz), Some(world.block_at(p)));
    }
    assert_eq!(buf.get_world(0, 0, 4), None);
}
