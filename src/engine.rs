use chrono::prelude::*;
use ndarray::Array2;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};

use crate::*;

/// Owns one board: grid dimensions, mine layout, per-cell state.
///
/// The layout stays unfixed until the first reveal command runs the
/// safe-start search, so the first click can never land on a mine at
/// reasonable mine density. Callers submit coordinate commands and read
/// back [`CellSnapshot`]s; all calls are synchronous and single-threaded.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MinefieldEngine {
    config: GameConfig,
    // The RNG stream is not serialized; a restored game normally has its
    // layout fixed already and never draws again until reset.
    #[serde(skip, default = "restored_rng")]
    rng: SmallRng,
    layout: Option<MineLayout>,
    board: Array2<CellState>,
    revealed_count: CellCount,
    flagged_count: CellCount,
    triggered_mine: Option<Coord2>,
    started_at: Option<DateTime<Utc>>,
    ended_at: Option<DateTime<Utc>>,
}

fn restored_rng() -> SmallRng {
    SmallRng::seed_from_u64(0)
}

impl MinefieldEngine {
    /// Creates a board with a deferred mine layout. `config` comes from
    /// [`GameConfig::new`], so dimensions and mine count are already valid.
    pub fn new(config: GameConfig, seed: u64) -> Self {
        Self {
            config,
            rng: SmallRng::seed_from_u64(seed),
            layout: None,
            board: Array2::default(config.dims().to_nd_index()),
            revealed_count: 0,
            flagged_count: 0,
            triggered_mine: None,
            started_at: None,
            ended_at: None,
        }
    }

    /// Creates a board over a pre-built layout, skipping the first-click
    /// safety search. Used for replays and fixed test boards.
    pub fn from_layout(layout: MineLayout) -> Self {
        let config = layout.game_config();
        let mut engine = Self::new(config, 0);
        engine.layout = Some(layout);
        engine
    }

    /// Discards the layout and every cell state; the next reveal fixes a
    /// fresh layout from the ongoing RNG stream.
    pub fn reset(&mut self) {
        log::debug!("board reset to {:?}", self.config);
        self.layout = None;
        self.board = Array2::default(self.config.dims().to_nd_index());
        self.revealed_count = 0;
        self.flagged_count = 0;
        self.triggered_mine = None;
        self.started_at = None;
        self.ended_at = None;
    }

    pub fn config(&self) -> GameConfig {
        self.config
    }

    pub fn width(&self) -> Coord {
        self.config.width()
    }

    pub fn height(&self) -> Coord {
        self.config.height()
    }

    pub fn total_mines(&self) -> CellCount {
        self.config.mines()
    }

    /// How many mines have not been flagged yet. Negative when overflagged.
    pub fn mines_left(&self) -> i64 {
        i64::from(self.config.mines()) - i64::from(self.flagged_count)
    }

    pub fn flags_placed(&self) -> CellCount {
        self.flagged_count
    }

    /// The mine that ended the game, if one was revealed.
    pub fn triggered_mine(&self) -> Option<Coord2> {
        self.triggered_mine
    }

    /// Derived status, recomputed from cell state on every call: `Lost` if a
    /// mine cell is revealed, `Won` once every safe cell is, else `InProgress`.
    pub fn status(&self) -> GameStatus {
        if self.triggered_mine.is_some() {
            GameStatus::Lost
        } else if self.revealed_count == self.config.safe_cells() {
            GameStatus::Won
        } else {
            GameStatus::InProgress
        }
    }

    pub fn is_finished(&self) -> bool {
        self.status().is_finished()
    }

    /// Seconds from the first effective reveal to now, frozen at the end
    /// instant once the game is won or lost. Zero before the first reveal.
    pub fn elapsed_secs(&self) -> u32 {
        if let Some(started_at) = self.started_at {
            (self.ended_at.unwrap_or_else(Utc::now) - started_at)
                .num_seconds()
                .max(0) as u32
        } else {
            0
        }
    }

    /// Read-only view of one cell. After a loss every mine cell carries
    /// [`CellContent::Mine`] so the caller can show the whole field.
    pub fn cell_at(&self, coords: Coord2) -> Result<CellSnapshot> {
        let coords = self.config.validate_coords(coords)?;
        Ok(self.snapshot_unchecked(coords))
    }

    /// Iterates every cell in row-major order with its snapshot.
    pub fn cells(&self) -> impl Iterator<Item = (Coord2, CellSnapshot)> + '_ {
        let (rows, cols) = self.config.dims();
        (0..rows)
            .flat_map(move |row| (0..cols).map(move |col| (row, col)))
            .map(|coords| (coords, self.snapshot_unchecked(coords)))
    }

    fn snapshot_unchecked(&self, coords: Coord2) -> CellSnapshot {
        let state = self.board[coords.to_nd_index()];
        let exploded_here = self.triggered_mine == Some(coords);

        let content = match state {
            CellState::Revealed(count) => Some(CellContent::Count(count)),
            _ if exploded_here => Some(CellContent::Mine),
            _ if self.triggered_mine.is_some() && self.mine_at(coords) => Some(CellContent::Mine),
            _ => None,
        };

        CellSnapshot {
            is_revealed: state.is_revealed() || exploded_here,
            is_flagged: state.is_flagged(),
            content,
        }
    }

    /// Toggles `Hidden <-> Flagged`. No-op on revealed cells and after the
    /// game has ended.
    pub fn toggle_flag(&mut self, coords: Coord2) -> Result<FlagOutcome> {
        use CellState::*;

        let coords = self.config.validate_coords(coords)?;
        if self.is_finished() {
            return Ok(FlagOutcome::NoChange);
        }

        Ok(match self.board[coords.to_nd_index()] {
            Hidden => {
                self.board[coords.to_nd_index()] = Flagged;
                self.flagged_count += 1;
                FlagOutcome::Placed
            }
            Flagged => {
                self.board[coords.to_nd_index()] = Hidden;
                self.flagged_count -= 1;
                FlagOutcome::Removed
            }
            Revealed(_) => FlagOutcome::NoChange,
        })
    }

    /// Reveals a hidden cell, cascading through its zero-region when the
    /// cell has no adjacent mines. Revealed and flagged cells are silent
    /// no-ops, as is any command after the game has ended.
    ///
    /// The first effective reveal on a board with no fixed layout first runs
    /// the safe-start search of [`generate_safe_layout`].
    pub fn reveal(&mut self, coords: Coord2) -> Result<RevealResult> {
        let coords = self.config.validate_coords(coords)?;
        if self.is_finished() {
            return Ok(RevealResult::Unchanged);
        }
        if !matches!(self.board[coords.to_nd_index()], CellState::Hidden) {
            return Ok(RevealResult::Unchanged);
        }

        if self.layout.is_none() {
            self.fix_layout(coords);
        }
        Ok(self.reveal_single_cell(coords))
    }

    /// Explicit form of the first-click command: fixes a layout that is safe
    /// at `coords` and performs the opening cascade. Behaves exactly like
    /// [`MinefieldEngine::reveal`] once a layout exists.
    pub fn first_safe_reveal(&mut self, coords: Coord2) -> Result<RevealResult> {
        self.reveal(coords)
    }

    /// Reveals every unflagged, unrevealed neighbor of a revealed numbered
    /// cell whose flagged-neighbor count equals its value. Trusts the flags:
    /// a wrongly placed flag makes this explode. Halts at the first mine hit.
    pub fn chord_reveal(&mut self, coords: Coord2) -> Result<RevealResult> {
        let coords = self.config.validate_coords(coords)?;
        if self.is_finished() {
            return Ok(RevealResult::Unchanged);
        }

        let CellState::Revealed(count) = self.board[coords.to_nd_index()] else {
            return Ok(RevealResult::Unchanged);
        };
        if count == 0 || count != self.count_flagged_neighbors(coords) {
            return Ok(RevealResult::Unchanged);
        }

        let mut result = RevealResult::Unchanged;
        for neighbor in self.board.iter_neighbors(coords) {
            if !matches!(self.board[neighbor.to_nd_index()], CellState::Hidden) {
                continue;
            }
            result = result | self.reveal_single_cell(neighbor);
            if self.is_finished() {
                break;
            }
        }
        Ok(result)
    }

    fn fix_layout(&mut self, coords: Coord2) {
        let layout = generate_safe_layout(&self.config, coords, &mut self.rng);
        log::debug!(
            "layout fixed at first click {:?}: {} mines on {:?}",
            coords,
            layout.mine_count(),
            layout.dims()
        );
        self.layout = Some(layout);
    }

    fn mine_at(&self, coords: Coord2) -> bool {
        self.layout
            .as_ref()
            .is_some_and(|layout| layout.contains_mine(coords))
    }

    fn adjacent_mines(&self, coords: Coord2) -> u8 {
        self.layout
            .as_ref()
            .map_or(0, |layout| layout.adjacent_mine_count(coords))
    }

    fn count_flagged_neighbors(&self, coords: Coord2) -> u8 {
        self.board
            .iter_neighbors(coords)
            .filter(|&pos| self.board[pos.to_nd_index()] == CellState::Flagged)
            .count()
            .try_into()
            .unwrap()
    }

    /// Reveals one hidden cell and flood-fills its zero-region with an
    /// explicit worklist, so arbitrarily large boards cannot overflow the
    /// call stack. Flagged cells stop the cascade.
    fn reveal_single_cell(&mut self, coords: Coord2) -> RevealResult {
        if self.mine_at(coords) {
            self.mark_started();
            self.triggered_mine = Some(coords);
            self.mark_ended();
            return RevealResult::Exploded;
        }

        self.mark_started();
        let count = self.adjacent_mines(coords);
        self.board[coords.to_nd_index()] = CellState::Revealed(count);
        self.revealed_count += 1;
        log::trace!("revealed {:?}, adjacent mines: {}", coords, count);

        let result = if count == 0 {
            let mut opened: CellCount = 1;
            let mut visited = HashSet::from([coords]);
            let mut to_visit: VecDeque<Coord2> = self
                .board
                .iter_neighbors(coords)
                .filter(|&pos| matches!(self.board[pos.to_nd_index()], CellState::Hidden))
                .collect();

            while let Some(visit_coords) = to_visit.pop_front() {
                if !visited.insert(visit_coords) {
                    continue;
                }

                // flags are a hard stop, even over logically safe cells
                if !matches!(self.board[visit_coords.to_nd_index()], CellState::Hidden) {
                    continue;
                }

                let visit_count = self.adjacent_mines(visit_coords);
                self.board[visit_coords.to_nd_index()] = CellState::Revealed(visit_count);
                self.revealed_count += 1;
                opened += 1;
                log::trace!(
                    "cascade revealed {:?}, adjacent mines: {}",
                    visit_coords,
                    visit_count
                );

                // numbered cells border the region but do not propagate
                if visit_count == 0 {
                    to_visit.extend(
                        self.board
                            .iter_neighbors(visit_coords)
                            .filter(|&pos| {
                                matches!(self.board[pos.to_nd_index()], CellState::Hidden)
                            })
                            .filter(|pos| !visited.contains(pos)),
                    );
                }
            }

            RevealResult::RevealedMany(opened)
        } else {
            RevealResult::RevealedOne
        };

        if self.revealed_count == self.config.safe_cells() {
            self.mark_ended();
        }
        result
    }

    fn mark_started(&mut self) {
        if self.started_at.is_none() {
            let now = Utc::now();
            log::debug!("game started at {}", now);
            self.started_at = Some(now);
        }
    }

    fn mark_ended(&mut self) {
        if self.ended_at.is_none() {
            let now = Utc::now();
            log::debug!("game ended at {}, status {:?}", now, self.status());
            self.ended_at = Some(now);
        }
    }
}
