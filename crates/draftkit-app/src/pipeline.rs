// Build pipeline: inputs -> projections -> overrides -> VORP -> tiers.
//
// Stages run in strict sequence and hand the player list on by value.

use std::collections::BTreeMap;

use tracing::info;

use draftkit_core::config::{BlendParams, RuleSet};
use draftkit_core::overrides::{apply_overrides, OverrideEntry};
use draftkit_core::player::{ScoredPlayer, TieredPlayer};
use draftkit_core::position::Position;
use draftkit_core::stats::WeeklyStats;
use draftkit_core::valuation::{blend, season, tiers, vor};

use crate::loaders::Inputs;

/// How points are projected for the target season.
#[derive(Debug, Clone, PartialEq)]
pub enum ProjectionMode {
    /// Weighted per-game blend of prior seasons, projected to a full season.
    Blend(BlendParams),
    /// Raw totals of a single season.
    SeasonTotals { season: i32 },
}

impl ProjectionMode {
    pub fn label(&self) -> &'static str {
        match self {
            ProjectionMode::Blend(_) => "blend",
            ProjectionMode::SeasonTotals { .. } => "total",
        }
    }
}

/// Ranked and tiered players plus the baselines used to rank them.
#[derive(Debug, Clone)]
pub struct BuildOutput {
    pub players: Vec<TieredPlayer>,
    pub replacement: BTreeMap<Position, vor::ReplacementLevel>,
}

fn rows_for_season<S: Clone>(rows: &[WeeklyStats<S>], year: i32) -> Vec<WeeklyStats<S>> {
    rows.iter().filter(|r| r.season == year).cloned().collect()
}

/// Score every entity: offense, then defenses, then kickers.
pub fn project(inputs: &Inputs, rules: &RuleSet, mode: &ProjectionMode) -> Vec<ScoredPlayer> {
    let byes = inputs.byes.as_ref();

    let (offense, defense, kickers) = match mode {
        ProjectionMode::Blend(params) => (
            blend::blend_offense(&inputs.offense, &inputs.roster, rules, params, byes),
            blend::blend_defense(&inputs.defense, rules, params, byes),
            blend::blend_kickers(&inputs.kickers, &inputs.roster, rules, params, byes),
        ),
        ProjectionMode::SeasonTotals { season: year } => (
            season::aggregate_offense(
                &rows_for_season(&inputs.offense, *year),
                &inputs.roster,
                rules,
                None,
                byes,
            ),
            season::aggregate_defense(&rows_for_season(&inputs.defense, *year), rules, None, byes),
            season::aggregate_kickers(
                &rows_for_season(&inputs.kickers, *year),
                &inputs.roster,
                rules,
                None,
                byes,
            ),
        ),
    };

    info!(
        "projected {} offense, {} defenses, {} kickers ({})",
        offense.len(),
        defense.len(),
        kickers.len(),
        mode.label()
    );

    let mut players = offense;
    players.extend(defense);
    players.extend(kickers);
    players
}

/// Apply overrides, then rank and tier.
pub fn rank(
    players: Vec<ScoredPlayer>,
    rules: &RuleSet,
    overrides: &[OverrideEntry],
    k_max: usize,
) -> BuildOutput {
    let players = apply_overrides(players, overrides);
    let replacement = vor::determine_replacement_levels(&players, &rules.league);
    let ranked = vor::rank_against_levels(players, &replacement);
    let players = tiers::assign_tiers(ranked, k_max);
    BuildOutput {
        players,
        replacement,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use draftkit_core::player::ProjectionSource;
    use draftkit_core::stats::{DefenseStats, OffenseStats, Roster, RosterEntry};

    fn inputs() -> Inputs {
        let roster = Roster::new(vec![
            RosterEntry {
                player_id: "QB-1".into(),
                name: "Quinn Back".into(),
                position: Some(Position::QB),
                team: "KC".into(),
            },
            RosterEntry {
                player_id: "RB-1".into(),
                name: "Rory Back".into(),
                position: Some(Position::RB),
                team: "KC".into(),
            },
        ]);
        let offense = [2023, 2024]
            .iter()
            .flat_map(|&season| {
                (1..=10).map(move |week| WeeklyStats {
                    entity_id: if week % 2 == 0 { "QB-1" } else { "RB-1" }.to_string(),
                    team: "KC".to_string(),
                    season,
                    week,
                    stats: OffenseStats {
                        passing_yards: if week % 2 == 0 { 250.0 } else { 0.0 },
                        rushing_yards: 80.0,
                        ..Default::default()
                    },
                })
            })
            .collect();
        let defense = vec![WeeklyStats {
            entity_id: "KC".into(),
            team: "KC".into(),
            season: 2024,
            week: 1,
            stats: DefenseStats {
                sacks: 3.0,
                points_allowed: 10.0,
                ..Default::default()
            },
        }];
        Inputs {
            offense,
            defense,
            kickers: Vec::new(),
            roster,
            byes: None,
        }
    }

    #[test]
    fn season_totals_mode_uses_only_that_season() {
        let mode = ProjectionMode::SeasonTotals { season: 2024 };
        let players = project(&inputs(), &RuleSet::default(), &mode);
        let ids: Vec<&str> = players.iter().map(|p| p.player_id.as_str()).collect();
        assert_eq!(ids, vec!["QB-1", "RB-1", "DEF-KC"]);
        // 5 games of 250 passing + 80 rushing yards = 5 * (10 + 8)
        assert_eq!(players[0].points, 90.0);
        assert_eq!(players[0].source, ProjectionSource::Computed);
    }

    #[test]
    fn blend_mode_projects_full_season() {
        let params = BlendParams::for_target(2025, 2, vec![0.5, 0.5], 4, 17).unwrap();
        let players = project(&inputs(), &RuleSet::default(), &ProjectionMode::Blend(params));
        // Defense has one game in 2024, below min_games.
        assert_eq!(players.len(), 2);
        assert_eq!(players[0].ppg, Some(18.0));
        assert_eq!(players[0].points, 306.0);
        assert_eq!(players[1].points, 136.0);
    }

    #[test]
    fn overrides_feed_ranking() {
        let scored = project(
            &inputs(),
            &RuleSet::default(),
            &ProjectionMode::SeasonTotals { season: 2024 },
        );
        let overrides = vec![OverrideEntry {
            player_id: "RB-1".into(),
            name: "Rory Back".into(),
            position: Some(Position::RB),
            team: "KC".into(),
            points: 400.0,
            note: None,
        }];
        let output = rank(scored, &RuleSet::default(), &overrides, tiers::DEFAULT_K_MAX);

        let top = &output.players[0].ranked;
        assert_eq!(top.player.player_id, "RB-1");
        assert_eq!(top.overall_rank, 1);
        assert_eq!(top.player.source, ProjectionSource::Override);
        assert!(output.replacement.contains_key(&Position::RB));
        assert!(output.players.iter().all(|p| p.tier.is_some()));
    }

    #[test]
    fn reported_baselines_match_ranked_players() {
        let scored = project(
            &inputs(),
            &RuleSet::default(),
            &ProjectionMode::SeasonTotals { season: 2024 },
        );
        let output = rank(scored, &RuleSet::default(), &[], tiers::DEFAULT_K_MAX);

        for p in &output.players {
            let level = &output.replacement[&p.position()];
            assert_eq!(p.ranked.repl_pts, level.baseline, "{}", p.ranked.player.player_id);
        }
    }
}
