use serde::Deserialize;

#[derive(Clone, Debug, Default, Deserialize)]
pub struct BlocksConfig {
    #[serde(default)]
    pub blocks: Vec<BlockDef>,
    /// Name of the type reported for ids with no registered type.
    #[serde(default)]
    pub unknown_block: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct BlockDef {
    pub name: String,
    #[serde(default)]
    pub id: Option<u16>,
    /// Supports an agent standing on top. Defaults to true.
    #[serde(default)]
    pub solid: Option<bool>,
    /// An agent can occupy the cell. Defaults to `!solid`.
    #[serde(default)]
    pub penetrable: Option<bool>,
}
