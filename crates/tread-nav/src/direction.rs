use core::f32::consts::SQRT_2;

/// Horizontal move directions. North is -z, east is +x.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

impl Direction {
    pub const ALL: [Direction; 8] = [
        Direction::North,
        Direction::NorthEast,
        Direction::East,
        Direction::SouthEast,
        Direction::South,
        Direction::SouthWest,
        Direction::West,
        Direction::NorthWest,
    ];

    pub const CARDINAL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    #[inline]
    pub fn from_index(i: usize) -> Direction {
        Self::ALL[i % 8]
    }

    /// `(dx, dz)` of one step.
    #[inline]
    pub fn offset(self) -> (i32, i32) {
        match self {
            Direction::North => (0, -1),
            Direction::NorthEast => (1, -1),
            Direction::East => (1, 0),
            Direction::SouthEast => (1, 1),
            Direction::South => (0, 1),
            Direction::SouthWest => (-1, 1),
            Direction::West => (-1, 0),
            Direction::NorthWest => (-1, -1),
        }
    }

    pub fn from_offset(dx: i32, dz: i32) -> Option<Direction> {
        Self::ALL.into_iter().find(|d| d.offset() == (dx, dz))
    }

    #[inline]
    pub fn is_diagonal(self) -> bool {
        self.index() % 2 == 1
    }

    #[inline]
    pub fn opposite(self) -> Direction {
        Self::from_index(self.index() + 4)
    }

    #[inline]
    pub fn step_cost(self) -> f32 {
        if self.is_diagonal() { SQRT_2 } else { 1.0 }
    }
}

/// Edge of a chunk column shared with one of its four side neighbors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Side {
    North,
    East,
    South,
    West,
}

impl Side {
    pub const ALL: [Side; 4] = [Side::North, Side::East, Side::South, Side::West];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    #[inline]
    pub fn opposite(self) -> Side {
        Self::ALL[(self.index() + 2) % 4]
    }

    /// Chunk offset `(dcx, dcz)` of the neighbor across this side.
    #[inline]
    pub fn chunk_offset(self) -> (i32, i32) {
        match self {
            Side::North => (0, -1),
            Side::East => (1, 0),
            Side::South => (0, 1),
            Side::West => (-1, 0),
        }
    }

    /// Local `(x, z)` border columns along this side of an `sx` by `sz`
    /// region, in clockwise order.
    pub fn border(self, sx: usize, sz: usize) -> Vec<(usize, usize)> {
        if sx == 0 || sz == 0 {
            return Vec::new();
        }
        match self {
            Side::North => (0..sx).map(|x| (x, 0)).collect(),
            Side::East => (0..sz).map(|z| (sx - 1, z)).collect(),
            Side::South => (0..sx).rev().map(|x| (x, sz - 1)).collect(),
            Side::West => (0..sz).rev().map(|z| (0, z)).collect(),
        }
    }

    /// Side crossed by a step from local column `(lx, lz)` along `dir`.
    /// `None` when the step stays inside or leaves through a corner.
    pub fn crossed_by(lx: usize, lz: usize, dir: Direction, sx: usize, sz: usize) -> Option<Side> {
        let (dx, dz) = dir.offset();
        let tx = lx as i64 + dx as i64;
        let tz = lz as i64 + dz as i64;
        let out_x = tx < 0 || tx >= sx as i64;
        let out_z = tz < 0 || tz >= sz as i64;
        match (out_x, out_z) {
            (true, true) | (false, false) => None,
            (false, true) if tz < 0 => Some(Side::North),
            (false, true) => Some(Side::South),
            (true, false) if tx < 0 => Some(Side::West),
            (true, false) => Some(Side::East),
        }
    }
}
