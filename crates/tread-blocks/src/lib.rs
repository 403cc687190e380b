//! Block ids and the registry of block types an agent can stand on or pass through.
#![forbid(unsafe_code)]

pub mod config;
pub mod registry;
pub mod types;

pub use registry::{BlockRegistry, BlockType};
pub use types::{Block, BlockId};
