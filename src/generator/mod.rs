use crate::*;
use rand::Rng;

pub use random::*;

mod random;

/// Attempt cap for the regenerate-and-test search in [`generate_safe_layout`].
pub const MAX_SAFE_ATTEMPTS: u32 = 300;

/// Below this mine density the first click must open a zero cell whenever the
/// board allows one at all. Expressed as `mines / total < 1/4`.
pub(crate) fn is_reasonable_density(config: &GameConfig) -> bool {
    (config.mines() as u64) * 4 < config.total_cells() as u64
}

/// At or above half density rejection sampling degrades, so placement
/// switches to shuffling the full coordinate list.
pub(crate) fn is_high_density(config: &GameConfig) -> bool {
    (config.mines() as u64) * 2 >= config.total_cells() as u64
}

/// Generates a uniform random layout with exactly `config.mines()` distinct
/// in-bounds mines. Pure function of the RNG stream.
pub fn generate_layout<R: Rng + ?Sized>(config: &GameConfig, rng: &mut R) -> MineLayout {
    if is_high_density(config) {
        place_by_shuffle(config, rng)
    } else {
        place_by_rejection(config, rng)
    }
}

/// Regenerates layouts until the cell at `start` has value zero.
///
/// At reasonable density the search never settles for an unsafe start: after
/// [`MAX_SAFE_ATTEMPTS`] rejections it falls back to shuffling mines into the
/// board with `start`'s closed neighborhood excluded, which terminates and
/// yields a zero start whenever `mines <= cells - neighborhood`. At high
/// density the 300th attempt is accepted as-is, so the first click may land
/// on a number or even a mine.
pub fn generate_safe_layout<R: Rng + ?Sized>(
    config: &GameConfig,
    start: Coord2,
    rng: &mut R,
) -> MineLayout {
    let mut layout = generate_layout(config, rng);
    for attempt in 1..MAX_SAFE_ATTEMPTS {
        if layout.value_at(start) == CellContent::Count(0) {
            log::debug!("safe layout found after {} attempt(s)", attempt);
            return layout;
        }
        layout = generate_layout(config, rng);
    }

    if layout.value_at(start) == CellContent::Count(0) {
        return layout;
    }

    if is_reasonable_density(config) {
        if let Some(fallback) = place_excluding_start(config, start, rng) {
            log::warn!(
                "rejection search exhausted {} attempts, used exclusion fallback",
                MAX_SAFE_ATTEMPTS
            );
            return fallback;
        }
    }

    log::warn!(
        "no zero-valued start found at {:?} within {} attempts, accepting last layout",
        start,
        MAX_SAFE_ATTEMPTS
    );
    layout
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn assert_exact_mines(layout: &MineLayout, config: &GameConfig) {
        assert_eq!(layout.dims(), config.dims());
        assert_eq!(layout.mine_count(), config.mines());
        let counted: CellCount = layout.iter_mines().count().try_into().unwrap();
        assert_eq!(counted, config.mines());
    }

    #[test]
    fn rejection_placement_has_exact_mine_count() {
        let config = GameConfig::SMALL;
        for seed in 0..20 {
            let mut rng = SmallRng::seed_from_u64(seed);
            assert_exact_mines(&generate_layout(&config, &mut rng), &config);
        }
    }

    #[test]
    fn shuffle_placement_handles_high_density() {
        let config = GameConfig::new(4, 4, 12).unwrap();
        assert!(is_high_density(&config));
        for seed in 0..20 {
            let mut rng = SmallRng::seed_from_u64(seed);
            assert_exact_mines(&generate_layout(&config, &mut rng), &config);
        }
    }

    #[test]
    fn zero_mine_layout_is_empty() {
        let config = GameConfig::new(5, 3, 0).unwrap();
        let mut rng = SmallRng::seed_from_u64(0);
        let layout = generate_layout(&config, &mut rng);
        assert_eq!(layout.mine_count(), 0);
        assert_eq!(layout.iter_mines().count(), 0);
    }

    #[test]
    fn safe_layout_always_opens_zero_at_reasonable_density() {
        let config = GameConfig::SMALL;
        assert!(is_reasonable_density(&config));
        for seed in 0..50 {
            let mut rng = SmallRng::seed_from_u64(seed);
            let layout = generate_safe_layout(&config, (4, 4), &mut rng);
            assert_exact_mines(&layout, &config);
            assert_eq!(layout.value_at((4, 4)), CellContent::Count(0));
        }
    }

    #[test]
    fn safe_layout_at_corner_start() {
        let config = GameConfig::MEDIUM;
        let mut rng = SmallRng::seed_from_u64(7);
        let layout = generate_safe_layout(&config, (0, 0), &mut rng);
        assert_eq!(layout.value_at((0, 0)), CellContent::Count(0));
    }

    #[test]
    fn safe_layout_accepts_unsafe_start_at_extreme_density() {
        // 7 mines on 3x3 leaves no room for a zero cell anywhere
        let config = GameConfig::new(3, 3, 7).unwrap();
        let mut rng = SmallRng::seed_from_u64(3);
        let layout = generate_safe_layout(&config, (1, 1), &mut rng);
        assert_exact_mines(&layout, &config);
    }

    #[test]
    fn exclusion_fallback_keeps_neighborhood_clear() {
        let config = GameConfig::new(20, 20, 99).unwrap();
        assert!(is_reasonable_density(&config));
        let start = (10, 10);
        let mut rng = SmallRng::seed_from_u64(11);

        let layout = place_excluding_start(&config, start, &mut rng).unwrap();

        assert_exact_mines(&layout, &config);
        assert_eq!(layout.value_at(start), CellContent::Count(0));
    }

    #[test]
    fn exclusion_fallback_refuses_overfull_boards() {
        // reasonable density threshold does not apply here, call it directly:
        // 8 mines on 3x3 cannot avoid the whole center neighborhood
        let config = GameConfig::new(3, 3, 8).unwrap();
        let mut rng = SmallRng::seed_from_u64(0);
        assert!(place_excluding_start(&config, (1, 1), &mut rng).is_none());
    }
}
