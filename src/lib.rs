//! Minesweeper board engine: mine placement, adjacency counting, cascading
//! reveal, chord reveal, and first-click safety.
//!
//! The crate owns board state only. Rendering, input handling, and frame
//! timing live in the caller, which submits coordinate commands
//! ([`MinefieldEngine::reveal`], [`MinefieldEngine::chord_reveal`],
//! [`MinefieldEngine::toggle_flag`]) and reads back per-cell
//! [`CellSnapshot`]s plus the derived [`GameStatus`].

use core::ops::{BitOr, Index};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

pub use engine::*;
pub use error::*;
pub use generator::*;
pub use tile::*;
pub use types::*;

mod engine;
mod error;
mod generator;
mod tile;
mod types;

/// Validated board parameters. The entire external configuration surface.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    width: Coord,
    height: Coord,
    mines: CellCount,
}

impl GameConfig {
    /// 9x9, 10 mines.
    pub const SMALL: Self = Self::new_unchecked(9, 9, 10);
    /// 16x16, 40 mines.
    pub const MEDIUM: Self = Self::new_unchecked(16, 16, 40);
    /// 30x16, 99 mines.
    pub const LARGE: Self = Self::new_unchecked(30, 16, 99);

    pub const fn new_unchecked(width: Coord, height: Coord, mines: CellCount) -> Self {
        Self {
            width,
            height,
            mines,
        }
    }

    /// Validates `width > 0`, `height > 0`, `0 <= mines < width * height`.
    pub fn new(width: Coord, height: Coord, mines: CellCount) -> Result<Self> {
        if width == 0 || height == 0 || mines >= mult(width, height) {
            return Err(GameError::InvalidConfig {
                width,
                height,
                mines,
            });
        }
        Ok(Self::new_unchecked(width, height, mines))
    }

    pub const fn width(&self) -> Coord {
        self.width
    }

    pub const fn height(&self) -> Coord {
        self.height
    }

    pub const fn mines(&self) -> CellCount {
        self.mines
    }

    pub const fn total_cells(&self) -> CellCount {
        mult(self.width, self.height)
    }

    pub const fn safe_cells(&self) -> CellCount {
        self.total_cells() - self.mines
    }

    /// Grid dimensions as `(rows, cols)`, matching the `Array2` layout.
    pub(crate) const fn dims(&self) -> Coord2 {
        (self.height, self.width)
    }

    pub fn validate_coords(&self, coords: Coord2) -> Result<Coord2> {
        if coords.0 < self.height && coords.1 < self.width {
            Ok(coords)
        } else {
            Err(GameError::OutOfBounds(coords))
        }
    }
}

/// The fixed set of mine coordinates for one game instance.
///
/// Stored as a boolean mask over the grid with a cached mine count.
/// Immutable once a game has fixed it; replaced wholesale on reset or
/// during the first-click layout search.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MineLayout {
    mine_mask: Array2<bool>,
    mine_count: CellCount,
}

impl MineLayout {
    pub fn from_mine_mask(mine_mask: Array2<bool>) -> Self {
        let mine_count = mine_mask
            .iter()
            .filter(|&&is_mine| is_mine)
            .count()
            .try_into()
            .unwrap();
        Self {
            mine_mask,
            mine_count,
        }
    }

    pub fn from_mine_coords(width: Coord, height: Coord, mine_coords: &[Coord2]) -> Result<Self> {
        let mut mine_mask: Array2<bool> = Array2::default((height, width).to_nd_index());

        for &coords in mine_coords {
            if coords.0 >= height || coords.1 >= width {
                return Err(GameError::OutOfBounds(coords));
            }
            mine_mask[coords.to_nd_index()] = true;
        }

        Ok(Self::from_mine_mask(mine_mask))
    }

    pub fn game_config(&self) -> GameConfig {
        let (height, width) = self.dims();
        GameConfig::new_unchecked(width, height, self.mine_count)
    }

    /// Grid dimensions as `(rows, cols)`.
    pub fn dims(&self) -> Coord2 {
        let dim = self.mine_mask.dim();
        (dim.0.try_into().unwrap(), dim.1.try_into().unwrap())
    }

    pub fn total_cells(&self) -> CellCount {
        self.mine_mask.len().try_into().unwrap()
    }

    pub fn safe_cell_count(&self) -> CellCount {
        self.total_cells() - self.mine_count
    }

    pub fn mine_count(&self) -> CellCount {
        self.mine_count
    }

    pub fn contains_mine(&self, coords: Coord2) -> bool {
        self[coords]
    }

    /// Number of mine-containing cells among the up-to-8 neighbors.
    pub fn adjacent_mine_count(&self, coords: Coord2) -> u8 {
        self.mine_mask
            .iter_neighbors(coords)
            .filter(|&pos| self[pos])
            .count()
            .try_into()
            .unwrap()
    }

    /// Derived value of a cell: the mine sentinel or its neighbor count.
    pub fn value_at(&self, coords: Coord2) -> CellContent {
        if self[coords] {
            CellContent::Mine
        } else {
            CellContent::Count(self.adjacent_mine_count(coords))
        }
    }

    pub fn iter_mines(&self) -> impl Iterator<Item = Coord2> + '_ {
        self.mine_mask
            .indexed_iter()
            .filter(|&(_, &is_mine)| is_mine)
            .map(|((row, col), _)| (row as Coord, col as Coord))
    }

    pub(crate) fn iter_neighbors(&self, coords: Coord2) -> NeighborIter {
        self.mine_mask.iter_neighbors(coords)
    }
}

impl Index<Coord2> for MineLayout {
    type Output = bool;

    fn index(&self, (row, col): Coord2) -> &Self::Output {
        &self.mine_mask[(row as usize, col as usize)]
    }
}

/// Outcome of toggling a flag.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FlagOutcome {
    NoChange,
    Placed,
    Removed,
}

impl FlagOutcome {
    /// Flag-counter delta for the caller: +1, -1, or 0.
    pub const fn delta(self) -> i8 {
        match self {
            Self::NoChange => 0,
            Self::Placed => 1,
            Self::Removed => -1,
        }
    }
}

/// Outcome of a reveal or chord-reveal command.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RevealResult {
    /// The command had no effect.
    Unchanged,
    /// A single numbered cell was revealed.
    RevealedOne,
    /// A cascade revealed this many cells.
    RevealedMany(CellCount),
    /// A mine was revealed. Terminal.
    Exploded,
}

impl RevealResult {
    pub const fn has_update(self) -> bool {
        !matches!(self, Self::Unchanged)
    }

    pub const fn revealed_cells(self) -> CellCount {
        match self {
            Self::Unchanged | Self::Exploded => 0,
            Self::RevealedOne => 1,
            Self::RevealedMany(count) => count,
        }
    }
}

/// Used to merge per-neighbor outcomes when chord-revealing.
impl BitOr for RevealResult {
    type Output = RevealResult;

    fn bitor(self, rhs: Self) -> Self::Output {
        use RevealResult::*;
        match (self, rhs) {
            (Exploded, _) | (_, Exploded) => Exploded,
            (Unchanged, other) | (other, Unchanged) => other,
            (a, b) => RevealedMany(a.revealed_cells() + b.revealed_cells()),
        }
    }
}

/// Derived game status, never stored as an independent source of truth.
///
/// Transitions are one-way: `InProgress -> Lost` on revealing a mine,
/// `InProgress -> Won` on revealing the last safe cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    InProgress,
    Won,
    Lost,
}

impl GameStatus {
    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}
