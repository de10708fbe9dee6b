//! Tile identity in the standard quadtree numbering.
//!
//! A [`TileId`] names one tile by zoom `level` and `x`/`y` column/row. The
//! renderer distinguishes the *native* tile (whose vector data was fetched)
//! from the *requested* tile (the one actually being drawn), which may be a
//! descendant of the native tile at a deeper level.

use std::fmt;
use std::str::FromStr;

/// Maximum zoom level accepted when parsing tile ids.
pub const MAX_LEVEL: u8 = 30;

/// Errors produced when parsing a tile id from text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TileIdError {
    /// Input did not have the `level/x/y` shape.
    #[error("invalid tile id '{0}': expected level/x/y")]
    Malformed(String),

    /// Zoom level exceeds [`MAX_LEVEL`].
    #[error("invalid zoom level {0}: must be at most 30")]
    InvalidLevel(u8),

    /// Column or row is outside the grid for the level.
    #[error("tile {x}/{y} is outside the grid at level {level}")]
    OutOfGrid { level: u8, x: u32, y: u32 },
}

/// A tile address: zoom depth plus column and row.
///
/// # Example
///
/// ```
/// use vectorstyle::coord::TileId;
///
/// let native = TileId::new(3, 4, 2);
/// let child = TileId::new(4, 9, 5);
/// assert!(child.is_descendant_of(&native));
/// assert_eq!(child.to_string(), "4/9/5");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileId {
    /// Zoom depth.
    pub level: u8,
    /// Column, increasing eastward.
    pub x: u32,
    /// Row, increasing southward.
    pub y: u32,
}

impl TileId {
    /// Create a tile id.
    pub fn new(level: u8, x: u32, y: u32) -> Self {
        Self { level, x, y }
    }

    /// Number of tiles along one axis at this level.
    pub fn grid_size(&self) -> u64 {
        1u64 << self.level
    }

    /// Returns the ancestor of this tile at `level`, or `None` when `level`
    /// is deeper than this tile.
    pub fn ancestor_at(&self, level: u8) -> Option<TileId> {
        if level > self.level {
            return None;
        }
        let shift = self.level - level;
        Some(TileId {
            level,
            x: self.x.checked_shr(shift as u32).unwrap_or(0),
            y: self.y.checked_shr(shift as u32).unwrap_or(0),
        })
    }

    /// True when this tile lies inside `other` (a tile is its own descendant).
    pub fn is_descendant_of(&self, other: &TileId) -> bool {
        self.ancestor_at(other.level) == Some(*other)
    }
}

impl fmt::Display for TileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.level, self.x, self.y)
    }
}

impl FromStr for TileId {
    type Err = TileIdError;

    /// Parses `level/x/y`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.trim().split('/').collect();
        if parts.len() != 3 {
            return Err(TileIdError::Malformed(s.to_string()));
        }

        let parse = |p: &str| p.parse::<u32>().map_err(|_| TileIdError::Malformed(s.to_string()));
        let level = parse(parts[0])?;
        let x = parse(parts[1])?;
        let y = parse(parts[2])?;

        let level = u8::try_from(level).map_err(|_| TileIdError::Malformed(s.to_string()))?;
        if level > MAX_LEVEL {
            return Err(TileIdError::InvalidLevel(level));
        }

        let tile = TileId::new(level, x, y);
        if x as u64 >= tile.grid_size() || y as u64 >= tile.grid_size() {
            return Err(TileIdError::OutOfGrid { level, x, y });
        }
        Ok(tile)
    }
}
