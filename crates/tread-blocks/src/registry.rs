use std::collections::HashMap;
use std::error::Error;
use std::fs;
use std::path::Path;

use super::config::{BlockDef, BlocksConfig};
use super::types::{Block, BlockId};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockType {
    pub id: BlockId,
    pub name: String,
    pub solid: bool,
    pub penetrable: bool,
}

#[derive(Default, Clone, Debug)]
pub struct BlockRegistry {
    pub blocks: Vec<Option<BlockType>>,
    pub by_name: HashMap<String, BlockId>,
    pub unknown_block_id: Option<BlockId>,
}

impl BlockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Air, a few ground types, water and glass.
    pub fn with_defaults() -> Self {
        let def = |name: &str, solid: bool, penetrable: bool| BlockDef {
            name: name.to_string(),
            id: None,
            solid: Some(solid),
            penetrable: Some(penetrable),
        };
        let cfg = BlocksConfig {
            blocks: vec![
                def("air", false, true),
                def("stone", true, false),
                def("dirt", true, false),
                def("grass", true, false),
                def("water", false, false),
                def("glass", true, false),
            ],
            unknown_block: None,
        };
        // Built from a fixed table with unique ids and names.
        match Self::from_config(cfg) {
            Ok(reg) => reg,
            Err(_) => Self::default(),
        }
    }

    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, Box<dyn Error>> {
        let s = fs::read_to_string(path)?;
        Self::from_toml_str(&s)
    }

    pub fn from_toml_str(s: &str) -> Result<Self, Box<dyn Error>> {
        let cfg: BlocksConfig = toml::from_str(s)?;
        Self::from_config(cfg)
    }

    pub fn from_config(cfg: BlocksConfig) -> Result<Self, Box<dyn Error>> {
        let mut reg = BlockRegistry::new();
        for def in cfg.blocks {
            let id = def.id.unwrap_or(reg.blocks.len() as BlockId);
            if reg.by_name.contains_key(&def.name) {
                return Err(format!("duplicate block name '{}'", def.name).into());
            }
            let slot = id as usize;
            if reg.blocks.len() <= slot {
                reg.blocks.resize(slot + 1, None);
            }
            if let Some(existing) = &reg.blocks[slot] {
                return Err(format!(
                    "block id {} used by both '{}' and '{}'",
                    id, existing.name, def.name
                )
                .into());
            }
            let solid = def.solid.unwrap_or(true);
            let penetrable = def.penetrable.unwrap_or(!solid);
            reg.by_name.insert(def.name.clone(), id);
            reg.blocks[slot] = Some(BlockType {
                id,
                name: def.name,
                solid,
                penetrable,
            });
        }
        if let Some(name) = cfg.unknown_block {
            match reg.by_name.get(&name) {
                Some(id) => reg.unknown_block_id = Some(*id),
                None => return Err(format!("unknown_block '{}' is not defined", name).into()),
            }
        }
        Ok(reg)
    }

    #[inline]
    pub fn get(&self, id: BlockId) -> Option<&BlockType> {
        self.blocks.get(id as usize).and_then(|t| t.as_ref())
    }

    pub fn id_by_name(&self, name: &str) -> Option<BlockId> {
        self.by_name.get(name).copied()
    }

    pub fn block_by_name(&self, name: &str) -> Option<Block> {
        self.id_by_name(name).map(Block::new)
    }

    fn resolve(&self, block: Block) -> Option<&BlockType> {
        self.get(block.id)
            .or_else(|| self.unknown_block_id.and_then(|id| self.get(id)))
    }

    /// Whether an agent can stand on top of `block`. Unregistered ids count as solid.
    #[inline]
    pub fn is_solid(&self, block: Block) -> bool {
        self.resolve(block).map(|t| t.solid).unwrap_or(true)
    }

    /// Whether an agent can occupy the cell. Unregistered ids are obstacles.
    #[inline]
    pub fn is_penetrable(&self, block: Block) -> bool {
        self.resolve(block).map(|t| t.penetrable).unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}
