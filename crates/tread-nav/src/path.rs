use crate::region::BlockRef;

/// Result of a search between two walkable blocks.
#[derive(Clone, Debug, PartialEq)]
pub enum Path {
    /// Blocks from the target back to the start, both included.
    Found { steps: Vec<BlockRef>, cost: f32 },
    /// No path exists (or the search gave up).
    Invalid,
}

impl Path {
    #[inline]
    pub fn is_valid(&self) -> bool {
        matches!(self, Path::Found { .. })
    }

    pub fn steps(&self) -> &[BlockRef] {
        match self {
            Path::Found { steps, .. } => steps,
            Path::Invalid => &[],
        }
    }

    pub fn cost(&self) -> Option<f32> {
        match self {
            Path::Found { cost, .. } => Some(*cost),
            Path::Invalid => None,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.steps().len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.steps().is_empty()
    }

    pub fn target(&self) -> Option<BlockRef> {
        self.steps().first().copied()
    }

    pub fn start(&self) -> Option<BlockRef> {
        self.steps().last().copied()
    }

    /// Steps in walking order, start first.
    pub fn walk_order(&self) -> impl Iterator<Item = BlockRef> + '_ {
        self.steps().iter().rev().copied()
    }

    pub(crate) fn touches_region(&self, region: crate::region::RegionId) -> bool {
        self.steps().iter().any(|b| b.region == region)
    }
}
