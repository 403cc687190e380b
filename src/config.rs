use std::error::Error;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use tread_nav::NavConfig;
use tread_runtime::SystemConfig;
use tread_world::WorldConfig;

/// Contents of `tread.toml`.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub world: WorldConfig,
    #[serde(default)]
    pub nav: NavConfig,
    #[serde(default)]
    pub system: SystemConfig,
}

impl AppConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, Box<dyn Error>> {
        Ok(toml::from_str(s)?)
    }

    pub fn load(path: &Path) -> Result<Self, Box<dyn Error>> {
        let s = fs::read_to_string(path)?;
        Self::from_toml_str(&s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tread_world::worldgen::Mode;

    #[test]
    fn sections_are_optional() {
        let cfg = AppConfig::from_toml_str("[nav]\nmax_step = 2\n").expect("parse");
        assert_eq!(cfg.nav.max_step, 2);
        assert_eq!(cfg.nav.agent_height, 2);
        assert_eq!(cfg.system, SystemConfig::default());
        assert_eq!(cfg.world.mode, Mode::Hills);
    }

    #[test]
    fn shipped_config_parses() {
        let cfg = AppConfig::from_toml_str(include_str!("../config/tread.toml")).expect("parse");
        assert_eq!(cfg.world.chunks_x, 6);
        assert!(cfg.nav.hierarchical);
        assert_eq!(cfg.system.request_queue, 100);
    }

    #[test]
    fn shipped_blocks_parse() {
        let reg = tread_blocks::BlockRegistry::from_toml_str(include_str!("../config/blocks.toml"))
            .expect("parse");
        let water = reg.block_by_name("water").expect("water");
        assert!(!reg.is_solid(water));
        assert!(!reg.is_penetrable(water));
        let tall = reg.block_by_name("tall_grass").expect("tall grass");
        assert!(reg.is_penetrable(tall));
    }
}
