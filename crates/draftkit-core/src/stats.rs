// Typed weekly stat rows, roster identity and bye weeks.
//
// Every stat field is an `f64` that defaults to 0. Missing columns are
// resolved once when rows are built, so scoring never has to guess.

use std::collections::HashMap;

use crate::config::RuleSet;
use crate::position::Position;
use crate::valuation::scoring;

// ---------------------------------------------------------------------------
// Stat line trait
// ---------------------------------------------------------------------------

/// Operations shared by every stat line type so that season aggregation and
/// multi-year blending can be written once.
pub trait StatLine: Clone + Default {
    /// Add every stat of `other` into `self`.
    fn accumulate(&mut self, other: &Self);

    /// Return a copy with every stat multiplied by `factor`.
    fn scaled(&self, factor: f64) -> Self;

    /// Fantasy points for this line under the given rule set.
    fn score(&self, rules: &RuleSet) -> f64;
}

/// Implements `StatLine` field by field for a plain struct of `f64` stats.
macro_rules! impl_stat_line {
    ($ty:ident, $scorer:path, [$($field:ident),+ $(,)?]) => {
        impl StatLine for $ty {
            fn accumulate(&mut self, other: &Self) {
                $(self.$field += other.$field;)+
            }

            fn scaled(&self, factor: f64) -> Self {
                $ty {
                    $($field: self.$field * factor,)+
                }
            }

            fn score(&self, rules: &RuleSet) -> f64 {
                $scorer(self, rules)
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Stat lines
// ---------------------------------------------------------------------------

/// Counting stats for an individual offensive player.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OffenseStats {
    pub passing_yards: f64,
    pub passing_tds: f64,
    pub interceptions: f64,
    pub rushing_yards: f64,
    pub rushing_tds: f64,
    pub receptions: f64,
    pub receiving_yards: f64,
    pub receiving_tds: f64,
    pub two_point_conversions: f64,
    pub fumbles_lost: f64,
}

impl_stat_line!(
    OffenseStats,
    scoring::score_offense_line,
    [
        passing_yards,
        passing_tds,
        interceptions,
        rushing_yards,
        rushing_tds,
        receptions,
        receiving_yards,
        receiving_tds,
        two_point_conversions,
        fumbles_lost,
    ]
);

/// Team defense / special teams stats.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DefenseStats {
    pub sacks: f64,
    pub interceptions: f64,
    pub fumble_recoveries: f64,
    pub defensive_tds: f64,
    pub safeties: f64,
    pub blocked_kicks: f64,
    pub points_allowed: f64,
}

impl_stat_line!(
    DefenseStats,
    scoring::score_defense_line,
    [
        sacks,
        interceptions,
        fumble_recoveries,
        defensive_tds,
        safeties,
        blocked_kicks,
        points_allowed,
    ]
);

/// Kicker stats. Field goals are split by distance bucket; sources that only
/// report a total land in `fg_made_unbucketed` and are scored at the flat rate.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KickerStats {
    pub fg_0_39: f64,
    pub fg_40_49: f64,
    pub fg_50_plus: f64,
    pub fg_made_unbucketed: f64,
    pub xp_made: f64,
    pub fg_miss: f64,
    pub xp_miss: f64,
}

impl_stat_line!(
    KickerStats,
    scoring::score_kicker_line,
    [
        fg_0_39,
        fg_40_49,
        fg_50_plus,
        fg_made_unbucketed,
        xp_made,
        fg_miss,
        xp_miss,
    ]
);

// ---------------------------------------------------------------------------
// Weekly rows
// ---------------------------------------------------------------------------

/// One entity-week of stats. For defenses `entity_id` is the team abbreviation.
#[derive(Debug, Clone, PartialEq)]
pub struct WeeklyStats<S> {
    pub entity_id: String,
    pub team: String,
    pub season: i32,
    pub week: u32,
    pub stats: S,
}

// ---------------------------------------------------------------------------
// Roster
// ---------------------------------------------------------------------------

/// Identity fields for one player. `position` is `None` for positions the
/// engine does not rank.
#[derive(Debug, Clone, PartialEq)]
pub struct RosterEntry {
    pub player_id: String,
    pub name: String,
    pub position: Option<Position>,
    pub team: String,
}

/// Roster table keyed by player id, in file order. The first row for a
/// given id wins.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    entries: Vec<RosterEntry>,
    index: HashMap<String, usize>,
}

impl Roster {
    pub fn new(entries: impl IntoIterator<Item = RosterEntry>) -> Self {
        let mut roster = Roster::default();
        for entry in entries {
            if roster.index.contains_key(&entry.player_id) {
                continue;
            }
            roster
                .index
                .insert(entry.player_id.clone(), roster.entries.len());
            roster.entries.push(entry);
        }
        roster
    }

    pub fn get(&self, player_id: &str) -> Option<&RosterEntry> {
        self.index.get(player_id).map(|&i| &self.entries[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &RosterEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Bye weeks
// ---------------------------------------------------------------------------

/// Team abbreviation -> bye week. Team codes are matched case-insensitively.
#[derive(Debug, Clone, Default)]
pub struct ByeWeeks(HashMap<String, u32>);

fn team_key(team: &str) -> String {
    team.trim().to_uppercase()
}

impl ByeWeeks {
    pub fn new(map: HashMap<String, u32>) -> Self {
        map.into_iter().collect()
    }

    /// Bye week for `team`, or 0 when the team is not mapped.
    pub fn week_for(&self, team: &str) -> u32 {
        self.0.get(&team_key(team)).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, u32)> for ByeWeeks {
    fn from_iter<I: IntoIterator<Item = (String, u32)>>(iter: I) -> Self {
        ByeWeeks(
            iter.into_iter()
                .map(|(team, week)| (team_key(&team), week))
                .collect(),
        )
    }
}

/// Bye for an output record: absent without a map, 0 for unmapped teams.
pub fn resolve_bye(byes: Option<&ByeWeeks>, team: &str) -> Option<u32> {
    byes.map(|b| b.week_for(team))
}
