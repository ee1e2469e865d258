use thiserror::Error;

use crate::{CellCount, Coord, Coord2};

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("invalid board configuration: {width}x{height} with {mines} mines")]
    InvalidConfig {
        width: Coord,
        height: Coord,
        mines: CellCount,
    },
    #[error("coordinates {0:?} are outside the board")]
    OutOfBounds(Coord2),
}

pub type Result<T> = core::result::Result<T, GameError>;
