use serde::Deserialize;

/// Agent shape and search limits.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct NavConfig {
    /// Clear cells an agent needs above the block it stands on.
    #[serde(default = "default_agent_height")]
    pub agent_height: i32,
    /// Largest height change of a single move.
    #[serde(default = "default_max_step")]
    pub max_step: i32,
    /// Link diagonal neighbors as well as cardinal ones.
    #[serde(default = "default_true")]
    pub diagonal: bool,
    /// Jump between entrances on floors away from the start and target.
    #[serde(default = "default_true")]
    pub hierarchical: bool,
    /// Search nodes allocated before a search gives up.
    #[serde(default = "default_max_nodes")]
    pub max_nodes: usize,
    #[serde(default = "default_resolve_below")]
    pub resolve_below: i32,
    #[serde(default = "default_resolve_above")]
    pub resolve_above: i32,
}

fn default_agent_height() -> i32 {
    2
}
fn default_max_step() -> i32 {
    1
}
fn default_true() -> bool {
    true
}
fn default_max_nodes() -> usize {
    64 * 1024
}
fn default_resolve_below() -> i32 {
    16
}
fn default_resolve_above() -> i32 {
    2
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            agent_height: default_agent_height(),
            max_step: default_max_step(),
            diagonal: true,
            hierarchical: true,
            max_nodes: default_max_nodes(),
            resolve_below: default_resolve_below(),
            resolve_above: default_resolve_above(),
        }
    }
}

impl NavConfig {
    /// Directions neighbor links are built along.
    pub fn directions(&self) -> &'static [crate::direction::Direction] {
        if self.diagonal {
            &crate::direction::Direction::ALL
        } else {
            &crate::direction::Direction::CARDINAL
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::direction::Direction;

    #[test]
    fn missing_fields_take_defaults() {
        let cfg: NavConfig = toml::from_str("max_step = 2\ndiagonal = false").expect("parse");
        assert_eq!(cfg.max_step, 2);
        assert!(!cfg.diagonal);
        assert_eq!(cfg.agent_height, 2);
        assert_eq!(cfg.max_nodes, 64 * 1024);
        assert!(cfg.hierarchical);
        assert_eq!(cfg.directions(), &Direction::CARDINAL[..]);
    }

    #[test]
    fn empty_table_is_the_default() {
        let cfg: NavConfig = toml::from_str("").expect("parse");
        assert_eq!(cfg, NavConfig::default());
        assert_eq!(cfg.directions(), &Direction::ALL[..]);
    }
}
