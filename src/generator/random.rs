use super::*;
use ndarray::Array2;
use rand::seq::SliceRandom;

/// Rejection sampling: draw coordinates until `mines` distinct cells are
/// marked. Expected O(mines) draws below half density.
pub(crate) fn place_by_rejection<R: Rng + ?Sized>(config: &GameConfig, rng: &mut R) -> MineLayout {
    let mut mine_mask: Array2<bool> = Array2::default(config.dims().to_nd_index());
    let mut placed: CellCount = 0;

    while placed < config.mines() {
        let row = rng.random_range(0..config.height());
        let col = rng.random_range(0..config.width());
        let cell = &mut mine_mask[(row, col).to_nd_index()];
        if !*cell {
            *cell = true;
            placed += 1;
        }
    }

    MineLayout::from_mine_mask(mine_mask)
}

/// Shuffles the full coordinate list and takes the first `mines` entries.
/// Terminates at any density, used when rejection sampling would degrade.
pub(crate) fn place_by_shuffle<R: Rng + ?Sized>(config: &GameConfig, rng: &mut R) -> MineLayout {
    let mut coords = all_coords(config);
    coords.shuffle(rng);
    mask_from_prefix(config, &coords, config.mines())
}

/// Shuffle-based placement that keeps `start` and its whole neighborhood
/// mine-free, so the cell at `start` is guaranteed to have value zero.
/// Returns `None` when the remaining cells cannot hold all mines.
pub(crate) fn place_excluding_start<R: Rng + ?Sized>(
    config: &GameConfig,
    start: Coord2,
    rng: &mut R,
) -> Option<MineLayout> {
    let mut coords = all_coords(config);
    coords.retain(|&pos| !in_closed_neighborhood(pos, start));

    let available: CellCount = coords.len().try_into().unwrap();
    if config.mines() > available {
        return None;
    }

    coords.shuffle(rng);
    Some(mask_from_prefix(config, &coords, config.mines()))
}

fn all_coords(config: &GameConfig) -> Vec<Coord2> {
    (0..config.height())
        .flat_map(|row| (0..config.width()).map(move |col| (row, col)))
        .collect()
}

fn mask_from_prefix(config: &GameConfig, coords: &[Coord2], mines: CellCount) -> MineLayout {
    let mut mine_mask: Array2<bool> = Array2::default(config.dims().to_nd_index());
    for &pos in &coords[..mines as usize] {
        mine_mask[pos.to_nd_index()] = true;
    }
    MineLayout::from_mine_mask(mine_mask)
}

fn in_closed_neighborhood((row_a, col_a): Coord2, (row_b, col_b): Coord2) -> bool {
    row_a.abs_diff(row_b) <= 1 && col_a.abs_diff(col_b) <= 1
}
