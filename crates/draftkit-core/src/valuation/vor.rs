// Value Over Replacement Player (VORP).
//
// Each position gets a replacement baseline: the points of the last player
// who would start league-wide once dedicated slots and FLEX slots are
// filled. A player's VORP is the player's points minus that baseline.

use std::collections::BTreeMap;

use tracing::debug;

use crate::config::{LeagueShape, RuleSet};
use crate::player::{RankedPlayer, ScoredPlayer};
use crate::position::Position;
use crate::valuation::round2;

/// Replacement count and baseline for one position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReplacementLevel {
    /// Dedicated starters league-wide (`starters_per_team * teams`).
    pub starters: usize,
    /// FLEX slots this position fills from the pooled ranking.
    pub flex_share: usize,
    /// Players at this position in the pool.
    pub pool_size: usize,
    /// Points of the replacement player; 0 for an empty position.
    pub baseline: f64,
}

impl ReplacementLevel {
    pub fn count(&self) -> usize {
        self.starters + self.flex_share
    }
}

fn by_points_desc(a: &ScoredPlayer, b: &ScoredPlayer) -> std::cmp::Ordering {
    b.points.total_cmp(&a.points)
}

// ---------------------------------------------------------------------------
// Replacement level computation
// ---------------------------------------------------------------------------

/// Determine the replacement baseline for every position.
///
/// Algorithm:
/// 1. Base count per position = starters per team * number of teams.
/// 2. Pool every FLEX-eligible player, sort by points descending, and take
///    the top `FLEX * teams`. Each position's share of that top group is
///    added to its count, so FLEX goes to whichever position has the best
///    remaining talent rather than a fixed split.
/// 3. Within each position sorted by points descending, the baseline is the
///    points at index `count - 1`, clamped to the list. Empty positions
///    get a baseline of 0.
///
/// Sorts are stable: equal points keep input order.
pub fn determine_replacement_levels(
    players: &[ScoredPlayer],
    league: &LeagueShape,
) -> BTreeMap<Position, ReplacementLevel> {
    // Points per position, best first.
    let mut by_position: BTreeMap<Position, Vec<&ScoredPlayer>> = BTreeMap::new();
    for p in players {
        by_position.entry(p.position).or_default().push(p);
    }
    for list in by_position.values_mut() {
        list.sort_by(|a, b| by_points_desc(a, b));
    }

    // FLEX spillover from the pooled ranking.
    let mut flex_pool: Vec<&ScoredPlayer> = players
        .iter()
        .filter(|p| league.is_flex_eligible(p.position))
        .collect();
    flex_pool.sort_by(|a, b| by_points_desc(a, b));

    let mut flex_share: BTreeMap<Position, usize> = BTreeMap::new();
    for p in flex_pool.iter().take(league.flex_slots()) {
        *flex_share.entry(p.position).or_default() += 1;
    }

    Position::ALL
        .iter()
        .map(|&pos| {
            let list = by_position.get(&pos).map(Vec::as_slice).unwrap_or(&[]);
            let starters = league.roster.starters(pos) * league.teams;
            let flex = flex_share.get(&pos).copied().unwrap_or(0);
            let count = starters + flex;

            let baseline = if list.is_empty() {
                0.0
            } else {
                let idx = count.saturating_sub(1).min(list.len() - 1);
                list[idx].points
            };

            (
                pos,
                ReplacementLevel {
                    starters,
                    flex_share: flex,
                    pool_size: list.len(),
                    baseline,
                },
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Pipeline entry point
// ---------------------------------------------------------------------------

/// Rank every player and attach replacement points and VORP, computing the
/// replacement levels from the same pool.
pub fn compute_vorp(players: Vec<ScoredPlayer>, rules: &RuleSet) -> Vec<RankedPlayer> {
    let levels = determine_replacement_levels(&players, &rules.league);
    rank_against_levels(players, &levels)
}

/// Rank players against precomputed replacement levels.
///
/// 1. Order all players by points descending (stable); that order is
///    `overall_rank`. Overall rank is a points ranking, not a VORP ranking.
/// 2. `pos_rank` counts within each position in the same order.
/// 3. `repl_pts` is the position's baseline (0 when the position has no
///    level), and `vorp = round2(points - repl_pts)`.
///
/// Output is ordered by `overall_rank`.
pub fn rank_against_levels(
    mut players: Vec<ScoredPlayer>,
    levels: &BTreeMap<Position, ReplacementLevel>,
) -> Vec<RankedPlayer> {
    for (pos, level) in levels {
        debug!(
            "{pos}: pool {} / replacement count {} ({} starters + {} flex) / baseline {:.2}",
            level.pool_size,
            level.count(),
            level.starters,
            level.flex_share,
            level.baseline
        );
    }

    players.sort_by(by_points_desc);

    let mut next_pos_rank: BTreeMap<Position, usize> = BTreeMap::new();
    players
        .into_iter()
        .enumerate()
        .map(|(i, player)| {
            let pos_rank = next_pos_rank.entry(player.position).or_insert(0);
            *pos_rank += 1;

            let repl_pts = levels
                .get(&player.position)
                .map(|l| l.baseline)
                .unwrap_or(0.0);
            RankedPlayer {
                vorp: round2(player.points - repl_pts),
                repl_pts,
                pos_rank: *pos_rank,
                overall_rank: i + 1,
                player,
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
