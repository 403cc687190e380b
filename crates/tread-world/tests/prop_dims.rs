use proptest::prelude::*;
use tread_geom::BlockPos;
use tread_world::WorldDims;

fn dim() -> impl Strategy<Value = usize> {
    1usize..=32
}

fn coord() -> impl Strategy<Value = i32> {
    -1_000_000i32..=1_000_000
}

proptest! {
    // chunk origin + local offset reconstructs the world position
    #[test]
    fn chunk_and_local_reconstruct_position(sx in dim(), sz in dim(), x in coord(), z in coord()) {
        let dims = WorldDims::new(sx, sz, 8);
        let p = BlockPos::new(x, 3, z);
        let c = dims.chunk_of(p);
        let (lx, lz) = dims.local_xz(p);
        prop_assert!(lx < sx && lz < sz);
        let (ox, oz) = dims.origin(c);
        prop_assert_eq!(ox + lx as i32, x);
        prop_assert_eq!(oz + lz as i32, z);
    }
}
