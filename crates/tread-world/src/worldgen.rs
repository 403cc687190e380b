use serde::Deserialize;
use std::error::Error;
use std::fs;
use std::path::Path;

use crate::voxel::{WorldDims, WorldGenMode};

#[derive(Clone, Debug, Deserialize)]
pub struct WorldConfig {
    #[serde(default = "default_chunk_size")]
    pub chunk_size_x: usize,
    #[serde(default = "default_chunk_size")]
    pub chunk_size_z: usize,
    #[serde(default = "default_height")]
    pub height: usize,
    #[serde(default = "default_chunks")]
    pub chunks_x: usize,
    #[serde(default = "default_chunks")]
    pub chunks_z: usize,
    #[serde(default = "default_seed")]
    pub seed: i32,
    #[serde(default = "default_mode")]
    pub mode: Mode,
    #[serde(default)]
    pub flat: Flat,
    #[serde(default)]
    pub hills: Hills,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            chunk_size_x: default_chunk_size(),
            chunk_size_z: default_chunk_size(),
            height: default_height(),
            chunks_x: default_chunks(),
            chunks_z: default_chunks(),
            seed: default_seed(),
            mode: default_mode(),
            flat: Flat::default(),
            hills: Hills::default(),
        }
    }
}

impl WorldConfig {
    pub fn dims(&self) -> WorldDims {
        WorldDims::new(
            self.chunk_size_x.max(1),
            self.chunk_size_z.max(1),
            self.height.max(1),
        )
    }

    pub fn gen_mode(&self) -> WorldGenMode {
        match self.mode {
            Mode::Empty => WorldGenMode::Empty,
            Mode::Flat => WorldGenMode::Flat {
                thickness: self.flat.thickness,
            },
            Mode::Hills => WorldGenMode::Hills {
                base: self.hills.base,
                amplitude: self.hills.amplitude,
                frequency: self.hills.frequency,
            },
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Empty,
    Flat,
    Hills,
}

fn default_mode() -> Mode {
    Mode::Hills
}
fn default_chunk_size() -> usize {
    16
}
fn default_height() -> usize {
    64
}
fn default_chunks() -> usize {
    6
}
fn default_seed() -> i32 {
    1337
}

#[derive(Clone, Debug, Deserialize)]
pub struct Flat {
    #[serde(default = "default_flat_thickness")]
    pub thickness: i32,
}
fn default_flat_thickness() -> i32 {
    1
}
impl Default for Flat {
    fn default() -> Self {
        Self { thickness: 1 }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Hills {
    #[serde(default = "default_hills_base")]
    pub base: i32,
    #[serde(default = "default_hills_amplitude")]
    pub amplitude: i32,
    #[serde(default = "default_hills_frequency")]
    pub frequency: f32,
}
fn default_hills_base() -> i32 {
    20
}
fn default_hills_amplitude() -> i32 {
    6
}
fn default_hills_frequency() -> f32 {
    0.02
}
impl Default for Hills {
    fn default() -> Self {
        Self {
            base: default_hills_base(),
            amplitude: default_hills_amplitude(),
            frequency: default_hills_frequency(),
        }
    }
}

pub fn load_config_from_path(path: &Path) -> Result<WorldConfig, Box<dyn Error>> {
    let s = fs::read_to_string(path)?;
    let cfg: WorldConfig = toml::from_str(&s)?;
    Ok(cfg)
}
