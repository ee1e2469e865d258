use serde::{Deserialize, Serialize};

/// Canonical per-cell state stored by the engine.
///
/// `Revealed` carries the adjacent-mine count and is terminal: a revealed
/// cell never returns to `Hidden` or `Flagged`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellState {
    Hidden,
    Flagged,
    Revealed(u8),
}

impl CellState {
    pub const fn is_revealed(self) -> bool {
        matches!(self, Self::Revealed(_))
    }

    pub const fn is_flagged(self) -> bool {
        matches!(self, Self::Flagged)
    }
}

impl Default for CellState {
    fn default() -> Self {
        Self::Hidden
    }
}

/// What a revealed cell displays: the mine sentinel or an adjacent-mine
/// count in `0..=8`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellContent {
    Mine,
    Count(u8),
}

impl CellContent {
    pub const fn is_mine(self) -> bool {
        matches!(self, Self::Mine)
    }
}

/// Read-only view of one cell, as handed to the render layer.
///
/// `content` is present for revealed cells and, once the game is lost,
/// for every mine cell so the whole field can be shown.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellSnapshot {
    pub is_revealed: bool,
    pub is_flagged: bool,
    pub content: Option<CellContent>,
}
