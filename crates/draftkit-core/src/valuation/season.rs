// Single-season aggregation: weekly rows -> one scored record per entity.

use std::collections::BTreeMap;

use tracing::debug;

use crate::config::RuleSet;
use crate::player::{ProjectionSource, ScoredPlayer};
use crate::position::Position;
use crate::stats::{
    resolve_bye, ByeWeeks, DefenseStats, KickerStats, OffenseStats, Roster, RosterEntry,
    StatLine, WeeklyStats,
};

/// Summed stats and the number of rows (games) that contributed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeasonTotals<S> {
    pub stats: S,
    pub games: u32,
}

impl<S: StatLine> SeasonTotals<S> {
    /// Average stat line per game played.
    pub fn per_game(&self) -> S {
        if self.games == 0 {
            return S::default();
        }
        self.stats.scaled(1.0 / self.games as f64)
    }

    fn qualifies(&self, min_games: Option<u32>) -> bool {
        min_games.map_or(true, |m| self.games >= m)
    }
}

/// Sum rows into per-key totals. Every row counts as one game.
pub fn totals_by<'a, S, K, I, F>(rows: I, key: F) -> BTreeMap<K, SeasonTotals<S>>
where
    S: StatLine + 'a,
    K: Ord,
    I: IntoIterator<Item = &'a WeeklyStats<S>>,
    F: Fn(&WeeklyStats<S>) -> K,
{
    let mut totals: BTreeMap<K, SeasonTotals<S>> = BTreeMap::new();
    for row in rows {
        let entry = totals.entry(key(row)).or_default();
        entry.stats.accumulate(&row.stats);
        entry.games += 1;
    }
    totals
}

/// Identity record for a team defense.
pub fn defense_identity(team: &str) -> (String, String) {
    (format!("DEF-{team}"), format!("{team} D/ST"))
}

fn season_record(
    player_id: String,
    name: String,
    position: Position,
    team: String,
    points: f64,
    games: u32,
    byes: Option<&ByeWeeks>,
) -> ScoredPlayer {
    let ppg = (games > 0).then(|| crate::valuation::round2(points / games as f64));
    ScoredPlayer {
        bye: resolve_bye(byes, &team),
        player_id,
        name,
        position,
        team,
        points,
        ppg,
        games: Some(games),
        source: ProjectionSource::Computed,
        override_note: None,
    }
}

fn roster_record(
    entry: &RosterEntry,
    position: Position,
    points: f64,
    games: u32,
    byes: Option<&ByeWeeks>,
) -> ScoredPlayer {
    season_record(
        entry.player_id.clone(),
        entry.name.clone(),
        position,
        entry.team.clone(),
        points,
        games,
        byes,
    )
}

// ---------------------------------------------------------------------------
// Offense
// ---------------------------------------------------------------------------

/// Season totals for every rostered QB/RB/WR/TE, in roster order.
///
/// The roster is authoritative for identity. Rostered players without any
/// rows score 0 with 0 games; entities missing from the roster are dropped.
pub fn aggregate_offense(
    rows: &[WeeklyStats<OffenseStats>],
    roster: &Roster,
    rules: &RuleSet,
    min_games: Option<u32>,
    byes: Option<&ByeWeeks>,
) -> Vec<ScoredPlayer> {
    let totals = totals_by(rows, |r| r.entity_id.clone());
    let empty = SeasonTotals::default();

    let players: Vec<ScoredPlayer> = roster
        .iter()
        .filter_map(|entry| {
            let pos = entry.position.filter(|p| p.is_offense())?;
            let t = totals.get(&entry.player_id).unwrap_or(&empty);
            if !t.qualifies(min_games) {
                return None;
            }
            Some(roster_record(entry, pos, t.stats.score(rules), t.games, byes))
        })
        .collect();

    debug!(
        "aggregated {} offense players from {} rows",
        players.len(),
        rows.len()
    );
    players
}

// ---------------------------------------------------------------------------
// Defense
// ---------------------------------------------------------------------------

/// Season totals per (team, season), ordered by team then season.
///
/// The line is scored on summed totals, so the points-allowed band applies to
/// the season total.
pub fn aggregate_defense(
    rows: &[WeeklyStats<DefenseStats>],
    rules: &RuleSet,
    min_games: Option<u32>,
    byes: Option<&ByeWeeks>,
) -> Vec<ScoredPlayer> {
    totals_by(rows, |r| (r.team.clone(), r.season))
        .into_iter()
        .filter(|(_, t)| t.qualifies(min_games))
        .map(|((team, _season), t)| {
            let (id, name) = defense_identity(&team);
            season_record(
                id,
                name,
                Position::Dst,
                team,
                t.stats.score(rules),
                t.games,
                byes,
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Kickers
// ---------------------------------------------------------------------------

/// Season totals per (kicker, season) for rostered kickers, in roster order.
pub fn aggregate_kickers(
    rows: &[WeeklyStats<KickerStats>],
    roster: &Roster,
    rules: &RuleSet,
    min_games: Option<u32>,
    byes: Option<&ByeWeeks>,
) -> Vec<ScoredPlayer> {
    let totals = totals_by(rows, |r| (r.entity_id.clone(), r.season));

    let mut players = Vec::new();
    for entry in roster.iter().filter(|e| e.position == Some(Position::K)) {
        let range = (entry.player_id.clone(), i32::MIN)..=(entry.player_id.clone(), i32::MAX);
        for (_, t) in totals.range(range) {
            if t.qualifies(min_games) {
                players.push(roster_record(
                    entry,
                    Position::K,
                    t.stats.score(rules),
                    t.games,
                    byes,
                ));
            }
        }
    }
    players
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
