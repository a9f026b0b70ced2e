//! The passability grid the player walks on.
//!
//! The map is an immutable `width x height` grid of [`Tile`]s stored in
//! row-major order. Positions outside the grid have no tile, which callers
//! treat the same as impassable.

use runequest_types::{Position, Tile};

use crate::error::WorldError;

/// Width of the default Lumbridge map.
pub const LUMBRIDGE_WIDTH: u32 = 20;

/// Height of the default Lumbridge map.
pub const LUMBRIDGE_HEIGHT: u32 = 20;

/// Thickness of the water border around the Lumbridge map.
const LUMBRIDGE_BORDER: u32 = 2;

/// Column and row of the crossing paths on the Lumbridge map.
const LUMBRIDGE_PATH: u32 = 10;

/// Immutable tile grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileMap {
    /// Number of columns.
    width: u32,
    /// Number of rows.
    height: u32,
    /// Row-major tiles, `width * height` entries.
    tiles: Vec<Tile>,
}

impl TileMap {
    /// Build a map from row-major tiles.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::InvalidMap`] if either dimension is zero or the
    /// tile count does not equal `width * height`.
    pub fn new(width: u32, height: u32, tiles: Vec<Tile>) -> Result<Self, WorldError> {
        if width == 0 || height == 0 {
            return Err(WorldError::InvalidMap {
                reason: format!("dimensions must be non-zero (got {width}x{height})"),
            });
        }
        let expected = usize::try_from(u64::from(width).saturating_mul(u64::from(height)))
            .map_err(|_err| WorldError::InvalidMap {
                reason: "map too large for this platform".to_owned(),
            })?;
        if tiles.len() != expected {
            return Err(WorldError::InvalidMap {
                reason: format!("expected {expected} tiles, got {}", tiles.len()),
            });
        }
        Ok(Self {
            width,
            height,
            tiles,
        })
    }

    /// Build a map from rows of numeric tile codes (`0` grass, `1` water,
    /// `2` path).
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::InvalidMap`] if the rows are empty or ragged.
    pub fn from_codes(rows: &[Vec<u8>]) -> Result<Self, WorldError> {
        let width = rows.first().map_or(0, Vec::len);
        if let Some(bad) = rows.iter().position(|row| row.len() != width) {
            return Err(WorldError::InvalidMap {
                reason: format!("row {bad} has a different width than row 0"),
            });
        }
        let to_u32 = |n: usize| {
            u32::try_from(n).map_err(|_err| WorldError::InvalidMap {
                reason: "map dimension exceeds u32".to_owned(),
            })
        };
        let tiles = rows
            .iter()
            .flat_map(|row| row.iter().map(|&code| Tile::from_code(code)))
            .collect();
        Self::new(to_u32(width)?, to_u32(rows.len())?, tiles)
    }

    /// The default 20x20 Lumbridge map: a two-tile water border, a cross of
    /// paths through column 10 and row 10, and grass everywhere else.
    pub fn lumbridge() -> Self {
        let mut tiles = Vec::new();
        for y in 0..LUMBRIDGE_HEIGHT {
            for x in 0..LUMBRIDGE_WIDTH {
                let far_edge = LUMBRIDGE_WIDTH.saturating_sub(LUMBRIDGE_BORDER);
                let far_row = LUMBRIDGE_HEIGHT.saturating_sub(LUMBRIDGE_BORDER);
                let tile = if x < LUMBRIDGE_BORDER
                    || x >= far_edge
                    || y < LUMBRIDGE_BORDER
                    || y >= far_row
                {
                    Tile::Water
                } else if x == LUMBRIDGE_PATH || y == LUMBRIDGE_PATH {
                    Tile::Path
                } else {
                    Tile::Grass
                };
                tiles.push(tile);
            }
        }
        Self {
            width: LUMBRIDGE_WIDTH,
            height: LUMBRIDGE_HEIGHT,
            tiles,
        }
    }

    /// Number of columns.
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of rows.
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Return the tile at `pos`, or `None` when `pos` is outside the grid.
    pub fn tile(&self, pos: Position) -> Option<Tile> {
        let x = u32::try_from(pos.x).ok()?;
        let y = u32::try_from(pos.y).ok()?;
        if x >= self.width || y >= self.height {
            return None;
        }
        let index = u64::from(y)
            .checked_mul(u64::from(self.width))?
            .checked_add(u64::from(x))?;
        self.tiles.get(usize::try_from(index).ok()?).copied()
    }

    /// Whether `pos` is inside the grid and walkable.
    pub fn is_walkable(&self, pos: Position) -> bool {
        self.tile(pos).is_some_and(Tile::is_walkable)
    }

    /// Every position a respawning entity may be placed on, row-major.
    pub fn spawnable_positions(&self) -> Vec<Position> {
        let mut positions = Vec::new();
        let mut cells = self.tiles.iter();
        for y in 0..self.height {
            for x in 0..self.width {
                let Some(tile) = cells.next() else {
                    return positions;
                };
                if tile.is_spawnable() {
                    if let (Ok(px), Ok(py)) = (i32::try_from(x), i32::try_from(y)) {
                        positions.push(Position::new(px, py));
                    }
                }
            }
        }
        positions
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn lumbridge_border_is_water() {
        let map = TileMap::lumbridge();
        assert_eq!(map.tile(Position::new(0, 0)), Some(Tile::Water));
        assert_eq!(map.tile(Position::new(1, 5)), Some(Tile::Water));
        assert_eq!(map.tile(Position::new(18, 5)), Some(Tile::Water));
        assert_eq!(map.tile(Position::new(5, 19)), Some(Tile::Water));
    }

    #[test]
    fn lumbridge_paths_cross_at_ten() {
        let map = TileMap::lumbridge();
        assert_eq!(map.tile(Position::new(10, 4)), Some(Tile::Path));
        assert_eq!(map.tile(Position::new(4, 10)), Some(Tile::Path));
        assert_eq!(map.tile(Position::new(5, 5)), Some(Tile::Grass));
    }

    #[test]
    fn out_of_bounds_has_no_tile() {
        let map = TileMap::lumbridge();
        assert_eq!(map.tile(Position::new(-1, 0)), None);
        assert_eq!(map.tile(Position::new(20, 0)), None);
        assert!(!map.is_walkable(Position::new(0, 20)));
    }

    #[test]
    fn spawnable_positions_are_grass_only() {
        let map = TileMap::lumbridge();
        let spots = map.spawnable_positions();
        // 16x16 interior minus the two crossing paths (16 + 16 - 1).
        assert_eq!(spots.len(), 16 * 16 - 31);
        assert!(spots.iter().all(|&p| map.tile(p) == Some(Tile::Grass)));
    }

    #[test]
    fn from_codes_rejects_ragged_rows() {
        let rows = vec![vec![0, 0], vec![0]];
        assert!(TileMap::from_codes(&rows).is_err());
    }

    #[test]
    fn from_codes_builds_grid() {
        let rows = vec![vec![1, 1, 1], vec![1, 0, 2]];
        let map = TileMap::from_codes(&rows).unwrap();
        assert_eq!(map.width(), 3);
        assert_eq!(map.height(), 2);
        assert_eq!(map.tile(Position::new(1, 1)), Some(Tile::Grass));
        assert_eq!(map.tile(Position::new(2, 1)), Some(Tile::Path));
        assert_eq!(map.spawnable_positions(), vec![Position::new(1, 1)]);
    }

    #[test]
    fn all_water_map_has_no_spawn_points() {
        let map = TileMap::new(2, 2, vec![Tile::Water; 4]).unwrap();
        assert!(map.spawnable_positions().is_empty());
    }

    #[test]
    fn new_rejects_wrong_tile_count() {
        assert!(TileMap::new(3, 3, vec![Tile::Grass; 8]).is_err());
        assert!(TileMap::new(0, 3, Vec::new()).is_err());
    }
}
