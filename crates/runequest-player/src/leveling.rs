//! Experience-to-level model.
//!
//! A precomputed table of 99 entries holds the experience needed to
//! *complete* each level. Entry `i` (level `i + 1`) costs
//!
//! ```text
//! floor(0.25 * floor(L + 300 * 2^(L / 7)))      where L = i + 1
//! ```
//!
//! Cumulative thresholds are running sums of the table. A player with `xp`
//! experience is at the greatest level `L` such that the cumulative cost of
//! levels `1..L` does not exceed `xp`, capped at [`MAX_LEVEL`].
//!
//! Completing level 1 costs 83 experience, so 83 xp is level 2.
//!
//! [`level_info`] is pure: the table is built once on first use and never
//! mutated afterwards.

use std::sync::LazyLock;

/// Highest attainable level.
pub const MAX_LEVEL: u32 = 99;

/// Number of entries in the cost table.
const TABLE_LEN: usize = 99;

/// Per-level completion cost, index `i` is level `i + 1`.
static LEVEL_COSTS: LazyLock<[u64; TABLE_LEN]> = LazyLock::new(|| {
    let mut costs = [0_u64; TABLE_LEN];
    let mut level: u32 = 1;
    for cost in &mut costs {
        *cost = level_cost(level);
        level = level.saturating_add(1);
    }
    costs
});

/// Experience needed to complete `level`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn level_cost(level: u32) -> u64 {
    let l = f64::from(level);
    let inner = (l + 300.0 * 2_f64.powf(l / 7.0)).floor();
    // Values stay well below 2^53 for levels up to 99; both floors are
    // non-negative.
    (0.25 * inner).floor() as u64
}

/// Where a given amount of experience sits on the level curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LevelInfo {
    /// Current level, `1..=99`.
    pub level: u32,
    /// Experience earned since reaching `level`.
    pub xp_into_level: u64,
    /// Experience needed to complete `level`.
    pub xp_required_for_next_level: u64,
    /// Progress through the current level, `0.0..=100.0`. Always 100 at the
    /// maximum level.
    pub progress_percent: f64,
}

/// Map accumulated experience to its level and progress.
pub fn level_info(xp: u64) -> LevelInfo {
    let mut level: u32 = 1;
    let mut level_start: u64 = 0;
    let mut cost: u64 = LEVEL_COSTS.first().copied().unwrap_or(0);

    for &next_cost in LEVEL_COSTS.iter().skip(1) {
        if level >= MAX_LEVEL {
            break;
        }
        let completed_at = level_start.saturating_add(cost);
        if xp < completed_at {
            break;
        }
        level = level.saturating_add(1);
        level_start = completed_at;
        cost = next_cost;
    }

    let xp_into_level = xp.saturating_sub(level_start);
    let progress_percent = if level >= MAX_LEVEL || cost == 0 {
        100.0
    } else {
        (ratio(xp_into_level, cost) * 100.0).clamp(0.0, 100.0)
    };

    LevelInfo {
        level,
        xp_into_level,
        xp_required_for_next_level: cost,
        progress_percent,
    }
}

/// Convenience wrapper returning only the level.
pub fn level_for(xp: u64) -> u32 {
    level_info(xp).level
}

/// Total experience needed to reach `level` from zero.
///
/// Returns 0 for levels at or below 1 and saturates at [`MAX_LEVEL`].
pub fn xp_for_level(level: u32) -> u64 {
    let completed = usize::try_from(level.min(MAX_LEVEL).saturating_sub(1)).unwrap_or(0);
    LEVEL_COSTS
        .iter()
        .take(completed)
        .fold(0_u64, |total, &cost| total.saturating_add(cost))
}

/// `numerator / denominator` as a float.
#[allow(clippy::cast_precision_loss)]
fn ratio(numerator: u64, denominator: u64) -> f64 {
    // Both operands are bounded by the largest table entry (~1.6M), far
    // inside the exactly representable range of f64.
    numerator as f64 / denominator as f64
}
