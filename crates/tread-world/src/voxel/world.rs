use std::collections::HashSet;
use std::sync::{Arc, RwLock};

use fastnoise_lite::{FastNoiseLite, NoiseType};
use tread_blocks::{Block, BlockRegistry};
use tread_geom::BlockPos;

use super::ascii::parse_layers;
use super::chunk_coord::{ChunkCoord, WorldDims};
use super::edits::EditStore;
use super::source::{BlockSource, WorldListener};

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum WorldGenMode {
    /// Nothing but air until edited.
    Empty,
    Flat {
        thickness: i32,
    },
    Hills {
        base: i32,
        amplitude: i32,
        frequency: f32,
    },
}

/// In-memory world: generated base terrain plus an edit overlay.
///
/// Edits and chunk load/unload are reported to registered listeners after the
/// world's own state is updated; no lock is held while listeners run.
pub struct GridWorld {
    dims: WorldDims,
    seed: i32,
    mode: WorldGenMode,
    reg: Arc<BlockRegistry>,
    ground: Block,
    surface: Block,
    terrain: Option<FastNoiseLite>,
    edits: RwLock<EditStore>,
    loaded: RwLock<HashSet<ChunkCoord>>,
    listeners: RwLock<Vec<Arc<dyn WorldListener>>>,
}

impl GridWorld {
    pub fn new(dims: WorldDims, reg: Arc<BlockRegistry>, seed: i32, mode: WorldGenMode) -> Self {
        let ground = reg.block_by_name("stone").unwrap_or(Block::new(1));
        let surface = reg.block_by_name("grass").unwrap_or(ground);
        let terrain = match mode {
            WorldGenMode::Hills { frequency, .. } => {
                let mut noise = FastNoiseLite::with_seed(seed);
                noise.set_noise_type(Some(NoiseType::OpenSimplex2));
                noise.set_frequency(Some(frequency));
                Some(noise)
            }
            _ => None,
        };
        Self {
            dims,
            seed,
            mode,
            reg,
            ground,
            surface,
            terrain,
            edits: RwLock::new(EditStore::new(dims)),
            loaded: RwLock::new(HashSet::new()),
            listeners: RwLock::new(Vec::new()),
        }
    }

    /// Empty world with `rows` (see [`parse_layers`]) painted in stone at `origin`.
    pub fn from_layers(
        dims: WorldDims,
        reg: Arc<BlockRegistry>,
        origin: BlockPos,
        rows: &[&str],
    ) -> Self {
        let world = Self::new(dims, reg, 0, WorldGenMode::Empty);
        world.paint_layers(origin, rows);
        world
    }

    /// Sets every `X` cell of `rows` to stone without notifying listeners.
    pub fn paint_layers(&self, origin: BlockPos, rows: &[&str]) {
        if let Ok(mut edits) = self.edits.write() {
            for cell in parse_layers(rows) {
                edits.set(
                    origin.offset(cell.x, cell.y, cell.z),
                    self.ground,
                );
            }
        }
    }

    #[inline]
    pub fn seed(&self) -> i32 {
        self.seed
    }

    #[inline]
    pub fn mode(&self) -> WorldGenMode {
        self.mode
    }

    pub fn ground_block(&self) -> Block {
        self.ground
    }

    pub fn register_listener(&self, listener: Arc<dyn WorldListener>) {
        if let Ok(mut ls) = self.listeners.write() {
            ls.push(listener);
        }
    }

    fn listeners(&self) -> Vec<Arc<dyn WorldListener>> {
        self.listeners
            .read()
            .map(|ls| ls.clone())
            .unwrap_or_default()
    }

    /// Surface height of the generated terrain at a column, or `None` if the column is empty.
    pub fn terrain_height(&self, x: i32, z: i32) -> Option<i32> {
        let top = self.dims.height as i32 - 1;
        match self.mode {
            WorldGenMode::Empty => None,
            WorldGenMode::Flat { thickness } => {
                if thickness <= 0 {
                    None
                } else {
                    Some((thickness - 1).min(top))
                }
            }
            WorldGenMode::Hills {
                base, amplitude, ..
            } => {
                let n = self
                    .terrain
                    .as_ref()
                    .map(|t| t.get_noise_2d(x as f32, z as f32))
                    .unwrap_or(0.0);
                let h = base + (n * amplitude as f32).round() as i32;
                Some(h.clamp(0, top))
            }
        }
    }

    fn generated_block(&self, pos: BlockPos) -> Block {
        match self.terrain_height(pos.x, pos.z) {
            Some(h) if pos.y < h => self.ground,
            Some(h) if pos.y == h => self.surface,
            _ => Block::AIR,
        }
    }

    /// Replaces the block at `pos` and notifies listeners if it changed.
    pub fn set_block(&self, pos: BlockPos, block: Block) {
        if !self.dims.contains_y(pos.y) {
            return;
        }
        let old = self.block_at(pos);
        if old == block {
            return;
        }
        if let Ok(mut edits) = self.edits.write() {
            edits.set(pos, block);
        }
        log::trace!(target: "world", "block {} changed {:?} -> {:?}", pos, old, block);
        for l in self.listeners() {
            l.on_block_changed(pos, block, old);
        }
    }

    /// Marks the chunk loaded and announces it.
    pub fn load_chunk(&self, coord: ChunkCoord) {
        if let Ok(mut loaded) = self.loaded.write() {
            loaded.insert(coord);
        }
        for l in self.listeners() {
            l.on_chunk_ready(coord);
        }
    }

    /// Loads every chunk in `[cx0, cx1) x [cz0, cz1)` in row order.
    pub fn load_area(&self, cx0: i32, cz0: i32, cx1: i32, cz1: i32) {
        for cz in cz0..cz1 {
            for cx in cx0..cx1 {
                self.load_chunk(ChunkCoord::new(cx, cz));
            }
        }
    }

    pub fn unload_chunk(&self, coord: ChunkCoord) {
        let was_loaded = self
            .loaded
            .write()
            .map(|mut loaded| loaded.remove(&coord))
            .unwrap_or(false);
        if was_loaded {
            for l in self.listeners() {
                l.on_chunk_unloaded(coord);
            }
        }
    }

    pub fn loaded_chunks(&self) -> Vec<ChunkCoord> {
        let mut out: Vec<ChunkCoord> = self
            .loaded
            .read()
            .map(|l| l.iter().copied().collect())
            .unwrap_or_default();
        out.sort();
        out
    }

    pub fn edit_stats(&self) -> super::edits::EditStoreStats {
        self.edits.read().map(|e| e.stats()).unwrap_or_default()
    }
}

impl BlockSource for GridWorld {
    fn dims(&self) -> WorldDims {
        self.dims
    }

    fn registry(&self) -> &BlockRegistry {
        &self.reg
    }

    fn block_at(&self, pos: BlockPos) -> Block {
        if !self.dims.contains_y(pos.y) {
            return Block::AIR;
        }
        if let Some(b) = self.edits.read().ok().and_then(|e| e.get(pos)) {
            return b;
        }
        self.generated_block(pos)
    }

    fn is_loaded(&self, coord: ChunkCoord) -> bool {
        self.loaded
            .read()
            .map(|l| l.contains(&coord))
            .unwrap_or(false)
    }
}
