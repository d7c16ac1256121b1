// Multi-season blended projections.
//
// Offense is score-then-blend: each qualifying season is scored, turned into
// points per game, and the per-game rates are blended. Defense and kickers
// are blend-then-score: per-game stat lines are blended column by column,
// projected to a full season, and only then scored. The two orders differ
// for defense because the points-allowed band is not linear.

use std::collections::{BTreeMap, HashMap};

use tracing::debug;

use crate::config::{BlendParams, RuleSet};
use crate::player::{ProjectionSource, ScoredPlayer};
use crate::position::Position;
use crate::stats::{
    resolve_bye, ByeWeeks, DefenseStats, KickerStats, OffenseStats, Roster, StatLine,
    WeeklyStats,
};
use crate::valuation::round2;
use crate::valuation::season::{defense_identity, totals_by, SeasonTotals};

/// Running weighted sum over the seasons an entity qualified in.
#[derive(Debug, Clone, Default)]
struct WeightedAcc<T> {
    sum: T,
    weight_mass: f64,
    /// Games played across the qualifying seasons.
    games: u32,
}

/// Per-entity, per-season totals that pass the games threshold, most recent
/// season first.
fn qualifying_seasons<'a, S, F>(
    rows: &'a [WeeklyStats<S>],
    params: &'a BlendParams,
    key: F,
) -> impl Iterator<Item = (f64, BTreeMap<String, SeasonTotals<S>>)> + 'a
where
    S: StatLine + 'a,
    F: Fn(&WeeklyStats<S>) -> String + Copy + 'a,
{
    params.year_weights().map(move |(year, weight)| {
        let mut totals = totals_by(rows.iter().filter(|r| r.season == year), key);
        totals.retain(|_, t| t.games > 0 && t.games >= params.min_games());
        (weight, totals)
    })
}

// ---------------------------------------------------------------------------
// Offense (score-then-blend)
// ---------------------------------------------------------------------------

/// Blend per-game fantasy points across seasons for rostered QB/RB/WR/TE.
///
/// Algorithm:
/// 1. For each season, sum each player's rows and count games.
/// 2. Drop player-seasons below `min_games`.
/// 3. Score each remaining season and divide by games for ppg.
/// 4. `weighted_ppg = sum(ppg * w) / sum(w)` over that player's qualifying
///    seasons only, so missing seasons do not dilute the rate.
/// 5. `points = weighted_ppg * games_in_season`.
///
/// Players with no qualifying season are left out. Output is in roster order.
pub fn blend_offense(
    rows: &[WeeklyStats<OffenseStats>],
    roster: &Roster,
    rules: &RuleSet,
    params: &BlendParams,
    byes: Option<&ByeWeeks>,
) -> Vec<ScoredPlayer> {
    let mut acc: HashMap<String, WeightedAcc<f64>> = HashMap::new();

    for (weight, totals) in qualifying_seasons(rows, params, |r| r.entity_id.clone()) {
        for (id, t) in totals {
            let ppg = t.stats.score(rules) / t.games as f64;
            let entry = acc.entry(id).or_default();
            entry.sum += ppg * weight;
            entry.weight_mass += weight;
            entry.games += t.games;
        }
    }

    let gis = params.games_in_season() as f64;
    let players: Vec<ScoredPlayer> = roster
        .iter()
        .filter_map(|entry| {
            let pos = entry.position.filter(|p| p.is_offense())?;
            let a = acc.get(&entry.player_id)?;
            if a.weight_mass <= 0.0 {
                return None;
            }
            let weighted_ppg = a.sum / a.weight_mass;
            Some(ScoredPlayer {
                player_id: entry.player_id.clone(),
                name: entry.name.clone(),
                position: pos,
                team: entry.team.clone(),
                points: round2(weighted_ppg * gis),
                bye: resolve_bye(byes, &entry.team),
                ppg: Some(round2(weighted_ppg)),
                games: Some(a.games),
                source: ProjectionSource::Blend,
                override_note: None,
            })
        })
        .collect();

    debug!(
        "blended {} offense players over seasons {:?}",
        players.len(),
        params.years()
    );
    players
}

// ---------------------------------------------------------------------------
// Defense and kickers (blend-then-score)
// ---------------------------------------------------------------------------

/// Blend per-game stat lines and project them to a full season.
fn blend_lines<S, F>(
    rows: &[WeeklyStats<S>],
    params: &BlendParams,
    key: F,
) -> BTreeMap<String, (S, u32)>
where
    S: StatLine,
    F: Fn(&WeeklyStats<S>) -> String + Copy,
{
    let mut acc: BTreeMap<String, WeightedAcc<S>> = BTreeMap::new();

    for (weight, totals) in qualifying_seasons(rows, params, key) {
        for (id, t) in totals {
            let entry = acc.entry(id).or_default();
            entry.sum.accumulate(&t.per_game().scaled(weight));
            entry.weight_mass += weight;
            entry.games += t.games;
        }
    }

    let gis = params.games_in_season() as f64;
    acc.into_iter()
        .filter(|(_, a)| a.weight_mass > 0.0)
        .map(|(id, a)| (id, (a.sum.scaled(gis / a.weight_mass), a.games)))
        .collect()
}

#[allow(clippy::too_many_arguments)]
fn blended_record(
    player_id: String,
    name: String,
    position: Position,
    team: String,
    points: f64,
    games: u32,
    params: &BlendParams,
    byes: Option<&ByeWeeks>,
) -> ScoredPlayer {
    let ppg = round2(points / params.games_in_season() as f64);
    ScoredPlayer {
        bye: resolve_bye(byes, &team),
        player_id,
        name,
        position,
        team,
        points,
        ppg: Some(ppg),
        games: Some(games),
        source: ProjectionSource::Blend,
        override_note: None,
    }
}

/// Blended team defenses, ordered by team.
pub fn blend_defense(
    rows: &[WeeklyStats<DefenseStats>],
    rules: &RuleSet,
    params: &BlendParams,
    byes: Option<&ByeWeeks>,
) -> Vec<ScoredPlayer> {
    blend_lines(rows, params, |r| r.team.clone())
        .into_iter()
        .map(|(team, (line, games))| {
            let (id, name) = defense_identity(&team);
            let points = line.score(rules);
            blended_record(id, name, Position::Dst, team, points, games, params, byes)
        })
        .collect()
}

/// Blended kickers for rostered kickers, in roster order.
pub fn blend_kickers(
    rows: &[WeeklyStats<KickerStats>],
    roster: &Roster,
    rules: &RuleSet,
    params: &BlendParams,
    byes: Option<&ByeWeeks>,
) -> Vec<ScoredPlayer> {
    let blended = blend_lines(rows, params, |r| r.entity_id.clone());

    roster
        .iter()
        .filter(|e| e.position == Some(Position::K))
        .filter_map(|entry| {
            let (line, games) = blended.get(&entry.player_id)?;
            Some(blended_record(
                entry.player_id.clone(),
                entry.name.clone(),
                Position::K,
                entry.team.clone(),
                line.score(rules),
                *games,
                params,
                byes,
            ))
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
