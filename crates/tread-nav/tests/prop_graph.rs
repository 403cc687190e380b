use std::collections::{BTreeSet, VecDeque};
use std::sync::Arc;

use proptest::prelude::*;
use tread_blocks::{Block, BlockRegistry};
use tread_geom::BlockPos;
use tread_nav::{BlockRef, NavConfig, Pathfinder, SearchOutcome};
use tread_world::{ChunkCoord, GridWorld, WorldDims, WorldGenMode};

const SIDE: i32 = 8;

/// Per column: ground height (or none) and an optional bridge three cells above it.
fn columns() -> impl Strategy<Value = Vec<(Option<u8>, bool)>> {
    prop::collection::vec((prop::option::weighted(0.85, 0u8..3), prop::bool::weighted(0.1)), (SIDE * SIDE) as usize)
}

fn build(cols: &[(Option<u8>, bool)], cfg: NavConfig) -> Pathfinder {
    let dims = WorldDims::new(4, 4, 8);
    let w = GridWorld::new(dims, Arc::new(BlockRegistry::with_defaults()), 0, WorldGenMode::Empty);
    let stone = Block::new(1);
    for (i, &(h, bridge)) in cols.iter().enumerate() {
        let (x, z) = (i as i32 % SIDE, i as i32 / SIDE);
        if let Some(h) = h {
            for y in 0..=i32::from(h) {
                w.set_block(BlockPos::new(x, y, z), stone);
            }
            if bridge {
                w.set_block(BlockPos::new(x, i32::from(h) + 3, z), stone);
            }
        }
    }
    let mut pf = Pathfinder::new(dims, cfg);
    let coords = [
        ChunkCoord::new(0, 0),
        ChunkCoord::new(1, 0),
        ChunkCoord::new(0, 1),
        ChunkCoord::new(1, 1),
    ];
    pf.rebuild_regions(&w, &coords);
    pf
}

fn all_blocks(pf: &Pathfinder) -> Vec<BlockRef> {
    let mut out: Vec<BlockRef> = pf
        .graph()
        .regions()
        .flat_map(|r| (0..r.blocks().len() as u32).map(move |i| r.block_ref(i)))
        .collect();
    out.sort();
    out
}

fn reachable(pf: &Pathfinder, start: BlockRef) -> BTreeSet<BlockRef> {
    let mut seen = BTreeSet::from([start]);
    let mut queue = VecDeque::from([start]);
    while let Some(b) = queue.pop_front() {
        for (_, n) in pf.block(b).into_iter().flat_map(|blk| blk.linked()) {
            if seen.insert(n) {
                queue.push_back(n);
            }
        }
    }
    seen
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    // every link has a partner pointing back along the opposite direction
    #[test]
    fn links_are_symmetric(cols in columns(), diagonal in any::<bool>()) {
        let pf = build(&cols, NavConfig { diagonal, ..NavConfig::default() });
        for b in all_blocks(&pf) {
            let blk = pf.block(b).expect("live block");
            for (dir, n) in blk.linked() {
                let other = pf.block(n).expect("link target is live");
                prop_assert_eq!(other.direction_to(b), Some(dir.opposite()));
                prop_assert!((other.pos.y - blk.pos.y).abs() <= 1);
            }
        }
    }

    // floors partition each region into its connected components
    #[test]
    fn floors_are_connected_components(cols in columns()) {
        let pf = build(&cols, NavConfig::default());
        for region in pf.graph().regions() {
            let mut owner = vec![None; region.blocks().len()];
            for floor in region.floors() {
                prop_assert!(!floor.blocks().is_empty());
                for &i in floor.blocks() {
                    prop_assert!(owner[i as usize].is_none());
                    owner[i as usize] = Some(floor.id());
                }
            }
            for (i, blk) in region.blocks().iter().enumerate() {
                prop_assert_eq!(owner[i], Some(blk.floor));
                for (_, n) in blk.linked().filter(|(_, n)| n.region == region.id()) {
                    prop_assert_eq!(region.blocks()[n.index as usize].floor, blk.floor);
                }
            }
            for floor in region.floors() {
                let seed = region.block_ref(floor.blocks()[0]);
                let mut seen = BTreeSet::from([seed.index]);
                let mut queue = VecDeque::from([seed.index]);
                while let Some(i) = queue.pop_front() {
                    for (_, n) in region.blocks()[i as usize].linked() {
                        if n.region == region.id() && seen.insert(n.index) {
                            queue.push_back(n.index);
                        }
                    }
                }
                let members: BTreeSet<u32> = floor.blocks().iter().copied().collect();
                prop_assert_eq!(seen, members);
            }
        }
    }

    // every entrance run lies on its floor and holds its abstract block
    #[test]
    fn entrances_stay_on_their_floor(cols in columns()) {
        let pf = build(&cols, NavConfig::default());
        for region in pf.graph().regions() {
            for floor in region.floors() {
                for e in floor.entrances() {
                    prop_assert!(!e.run.is_empty());
                    prop_assert!(e.run.contains(&e.abstract_block));
                    prop_assert!(e.run.iter().all(|b| floor.contains(*b)));
                    prop_assert!(floor.neighbor_floors().any(|f| f == e.neighbor));
                }
            }
        }
    }

    // the search finds a linked path exactly when one exists
    #[test]
    fn search_agrees_with_reachability(cols in columns(), a in any::<prop::sample::Index>(), b in any::<prop::sample::Index>()) {
        let mut pf = build(&cols, NavConfig::default());
        let blocks = all_blocks(&pf);
        prop_assume!(!blocks.is_empty());
        let start = blocks[a.index(blocks.len())];
        let target = blocks[b.index(blocks.len())];
        let expect = reachable(&pf, start).contains(&target);

        let res = pf.find_path(Some(target), Some(start)).expect("search");
        prop_assert_eq!(res.outcome == SearchOutcome::Found, expect);
        if expect {
            let steps = res.path.steps();
            prop_assert_eq!(steps.first().copied(), Some(target));
            prop_assert_eq!(steps.last().copied(), Some(start));
            for pair in steps.windows(2) {
                prop_assert!(pf.block(pair[0]).expect("live block").has_neighbor(pair[1]));
            }
        } else {
            prop_assert_eq!(res.outcome, SearchOutcome::Unreachable);
        }
    }
}
