//! Walkable surfaces, floors and entrances over chunked voxels, and the hierarchical A* that searches them.
#![forbid(unsafe_code)]

pub mod arena;
pub mod config;
mod contour;
pub mod direction;
pub mod floor;
pub mod graph;
pub mod hastar;
pub mod path;
pub mod path_cache;
pub mod pathfinder;
pub mod region;
pub mod snapshot;
pub mod walkable;

pub use arena::{Arena, Index};
pub use config::NavConfig;
pub use direction::{Direction, Side};
pub use floor::{Entrance, Floor};
pub use graph::NavGraph;
pub use hastar::{HAStar, SearchError, SearchOutcome, SearchStats};
pub use path::Path;
pub use path_cache::{PathCache, PathCacheStats, PathCaches};
pub use pathfinder::{Pathfinder, SearchResult};
pub use region::{BlockRef, FloorRef, Neighbors, RegionId, RegionMap, WalkableBlock};
pub use snapshot::{NavSnapshot, RegionSurface, probe_column};
pub use walkable::{PassMask, WalkableSurfaceFinder};
