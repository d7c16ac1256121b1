// Manual point overrides.
//
// Overrides replace a player's projected points after scoring and before
// VORP, so manual corrections move replacement baselines and ranks too.

use std::collections::HashMap;
use std::fmt;

use tracing::info;

use crate::player::{ProjectionSource, ScoredPlayer};
use crate::position::Position;

/// Points above this are flagged as implausible for a single season.
pub const MAX_PLAUSIBLE_POINTS: f64 = 500.0;

/// One row of the override table. `points` is always finite; rows that are
/// not are rejected at load time.
#[derive(Debug, Clone, PartialEq)]
pub struct OverrideEntry {
    pub player_id: String,
    pub name: String,
    pub position: Option<Position>,
    pub team: String,
    pub points: f64,
    pub note: Option<String>,
}

/// Non-fatal problems found when checking overrides against the player pool.
#[derive(Debug, Clone, PartialEq)]
pub enum OverrideWarning {
    NotFound {
        player_id: String,
        name: String,
    },
    PositionMismatch {
        player_id: String,
        override_pos: Option<Position>,
        actual: Position,
    },
    TeamMismatch {
        player_id: String,
        override_team: String,
        actual: String,
    },
    NegativePoints {
        player_id: String,
        points: f64,
    },
    ImplausiblePoints {
        player_id: String,
        points: f64,
    },
}

impl fmt::Display for OverrideWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OverrideWarning::NotFound { player_id, name } => {
                write!(f, "{player_id} ({name}): not found in projections")
            }
            OverrideWarning::PositionMismatch {
                player_id,
                override_pos,
                actual,
            } => {
                let given = override_pos.map_or("?", |p| p.display_str());
                write!(f, "{player_id}: position {given} does not match {actual}")
            }
            OverrideWarning::TeamMismatch {
                player_id,
                override_team,
                actual,
            } => write!(f, "{player_id}: team {override_team} does not match {actual}"),
            OverrideWarning::NegativePoints { player_id, points } => {
                write!(f, "{player_id}: negative points {points:.2}")
            }
            OverrideWarning::ImplausiblePoints { player_id, points } => write!(
                f,
                "{player_id}: {points:.2} points exceeds {MAX_PLAUSIBLE_POINTS}"
            ),
        }
    }
}

/// Result of checking an override table against the player pool.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OverrideReport {
    pub override_count: usize,
    pub matched: usize,
    pub warnings: Vec<OverrideWarning>,
}

impl OverrideReport {
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// Latest entry per player id.
fn index_overrides(overrides: &[OverrideEntry]) -> HashMap<&str, &OverrideEntry> {
    overrides
        .iter()
        .map(|o| (o.player_id.as_str(), o))
        .collect()
}

/// Replace points for every player with an override.
///
/// Matching is by player id; when an id appears more than once the last row
/// wins. Overrides for ids not in `players` are ignored here and reported by
/// [`validate_overrides`].
pub fn apply_overrides(players: Vec<ScoredPlayer>, overrides: &[OverrideEntry]) -> Vec<ScoredPlayer> {
    if overrides.is_empty() {
        return players;
    }
    let by_id = index_overrides(overrides);

    let mut applied = 0usize;
    let players: Vec<ScoredPlayer> = players
        .into_iter()
        .map(|mut p| {
            if let Some(o) = by_id.get(p.player_id.as_str()) {
                info!(
                    "override {} ({}): {:.2} -> {:.2}",
                    p.player_id, p.name, p.points, o.points
                );
                p.points = o.points;
                p.source = ProjectionSource::Override;
                p.override_note = o.note.clone();
                applied += 1;
            }
            p
        })
        .collect();

    info!("applied {applied} of {} overrides", by_id.len());
    players
}

/// Check overrides against the player pool without changing anything.
pub fn validate_overrides(overrides: &[OverrideEntry], players: &[ScoredPlayer]) -> OverrideReport {
    let by_id: HashMap<&str, &ScoredPlayer> = players
        .iter()
        .map(|p| (p.player_id.as_str(), p))
        .collect();

    let mut report = OverrideReport {
        override_count: overrides.len(),
        ..Default::default()
    };

    for o in overrides {
        match by_id.get(o.player_id.as_str()) {
            None => report.warnings.push(OverrideWarning::NotFound {
                player_id: o.player_id.clone(),
                name: o.name.clone(),
            }),
            Some(p) => {
                report.matched += 1;
                if o.position != Some(p.position) {
                    report.warnings.push(OverrideWarning::PositionMismatch {
                        player_id: o.player_id.clone(),
                        override_pos: o.position,
                        actual: p.position,
                    });
                }
                if !o.team.is_empty() && !o.team.eq_ignore_ascii_case(&p.team) {
                    report.warnings.push(OverrideWarning::TeamMismatch {
                        player_id: o.player_id.clone(),
                        override_team: o.team.clone(),
                        actual: p.team.clone(),
                    });
                }
            }
        }

        if o.points < 0.0 {
            report.warnings.push(OverrideWarning::NegativePoints {
                player_id: o.player_id.clone(),
                points: o.points,
            });
        } else if o.points > MAX_PLAUSIBLE_POINTS {
            report.warnings.push(OverrideWarning::ImplausiblePoints {
                player_id: o.player_id.clone(),
                points: o.points,
            });
        }
    }

    report
}
