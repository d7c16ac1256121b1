// JSON output: players.json and meta.json.

use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use draftkit_core::config::RuleSet;
use draftkit_core::player::TieredPlayer;

use crate::pipeline::ProjectionMode;

pub const SCHEMA_VERSION: u32 = 1;

/// Snake-draft slot for an overall rank: (round, pick within round).
pub fn draft_slot(overall_rank: usize, teams: usize) -> (usize, usize) {
    let teams = teams.max(1);
    let i = overall_rank.saturating_sub(1);
    (i / teams + 1, i % teams + 1)
}

/// One players.json record.
#[derive(Debug, Serialize)]
pub struct PlayerRecord<'a> {
    #[serde(flatten)]
    pub player: &'a TieredPlayer,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub round_est: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pick_in_round: Option<usize>,
}

pub fn player_records(
    players: &[TieredPlayer],
    teams: usize,
    draft_slots: bool,
) -> Vec<PlayerRecord<'_>> {
    players
        .iter()
        .map(|player| {
            let slot = draft_slots.then(|| draft_slot(player.ranked.overall_rank, teams));
            PlayerRecord {
                player,
                round_est: slot.map(|s| s.0),
                pick_in_round: slot.map(|s| s.1),
            }
        })
        .collect()
}

/// Build metadata written next to the player list.
#[derive(Debug, Clone, Serialize)]
pub struct BuildMeta {
    pub generated_at: DateTime<Utc>,
    pub target_year: i32,
    pub mode: String,
    pub lookback_years: Vec<i32>,
    pub blend: Vec<f64>,
    pub per_game: bool,
    pub min_games: Option<u32>,
    pub games_in_season: Option<u32>,
    pub rules_name: String,
    pub player_count: usize,
    pub schema_version: u32,
}

impl BuildMeta {
    pub fn new(target_year: i32, mode: &ProjectionMode, rules: &RuleSet, player_count: usize) -> Self {
        let (lookback_years, blend, min_games, games_in_season) = match mode {
            ProjectionMode::Blend(p) => (
                p.years().to_vec(),
                p.weights().to_vec(),
                Some(p.min_games()),
                Some(p.games_in_season()),
            ),
            ProjectionMode::SeasonTotals { season } => (vec![*season], Vec::new(), None, None),
        };
        BuildMeta {
            generated_at: Utc::now(),
            target_year,
            mode: mode.label().to_string(),
            lookback_years,
            blend,
            per_game: matches!(mode, ProjectionMode::Blend(_)),
            min_games,
            games_in_season,
            rules_name: rules.name.clone(),
            player_count,
            schema_version: SCHEMA_VERSION,
        }
    }
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> anyhow::Result<()> {
    let text = serde_json::to_string_pretty(value)
        .with_context(|| format!("failed to serialize {}", path.display()))?;
    std::fs::write(path, text).with_context(|| format!("failed to write {}", path.display()))?;
    info!("wrote {}", path.display());
    Ok(())
}

/// Write players.json and meta.json into `outdir`, creating it if needed.
/// Returns the two paths written.
pub fn write_outputs(
    outdir: &Path,
    players: &[TieredPlayer],
    meta: &BuildMeta,
    teams: usize,
    draft_slots: bool,
) -> anyhow::Result<(PathBuf, PathBuf)> {
    std::fs::create_dir_all(outdir)
        .with_context(|| format!("failed to create output directory {}", outdir.display()))?;

    let players_path = outdir.join("players.json");
    write_json(&players_path, &player_records(players, teams, draft_slots))?;

    let meta_path = outdir.join("meta.json");
    write_json(&meta_path, meta)?;

    Ok((players_path, meta_path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use draftkit_core::config::BlendParams;
    use draftkit_core::player::{ProjectionSource, RankedPlayer, ScoredPlayer};
    use draftkit_core::position::Position;

    fn tiered(rank: usize) -> TieredPlayer {
        TieredPlayer {
            ranked: RankedPlayer {
                player: ScoredPlayer {
                    player_id: format!("P{rank}"),
                    name: format!("Player {rank}"),
                    position: Position::WR,
                    team: "SEA".into(),
                    points: 200.0 - rank as f64,
                    bye: Some(8),
                    ppg: Some(11.2),
                    games: Some(3),
                    source: ProjectionSource::Blend,
                    override_note: None,
                },
                repl_pts: 150.0,
                vorp: 50.0 - rank as f64,
                pos_rank: rank,
                overall_rank: rank,
            },
            tier: Some(1),
        }
    }

    #[test]
    fn draft_slot_math() {
        assert_eq!(draft_slot(1, 12), (1, 1));
        assert_eq!(draft_slot(12, 12), (1, 12));
        assert_eq!(draft_slot(13, 12), (2, 1));
        assert_eq!(draft_slot(30, 10), (3, 10));
    }

    #[test]
    fn records_carry_draft_slots_when_enabled() {
        let players = vec![tiered(1), tiered(14)];
        let with = serde_json::to_value(player_records(&players, 12, true)).unwrap();
        assert_eq!(with[1]["round_est"], 2);
        assert_eq!(with[1]["pick_in_round"], 2);
        assert_eq!(with[0]["pos"], "WR");
        assert_eq!(with[0]["tier"], 1);

        let without = serde_json::to_value(player_records(&players, 12, false)).unwrap();
        assert!(without[0].get("round_est").is_none());
    }

    #[test]
    fn meta_describes_blend() {
        let params = BlendParams::for_target(2025, 3, vec![6.0, 3.0, 1.0], 8, 17).unwrap();
        let meta = BuildMeta::new(2025, &ProjectionMode::Blend(params), &RuleSet::default(), 42);
        let value = serde_json::to_value(&meta).unwrap();
        assert_eq!(value["mode"], "blend");
        assert_eq!(value["lookback_years"], serde_json::json!([2024, 2023, 2022]));
        assert_eq!(value["per_game"], true);
        assert_eq!(value["player_count"], 42);
        assert_eq!(value["schema_version"], SCHEMA_VERSION);
        assert!(value["generated_at"].as_str().unwrap().contains('T'));
    }

    #[test]
    fn write_outputs_creates_both_files() {
        let dir = std::env::temp_dir().join("draftkit_export_test");
        let _ = std::fs::remove_dir_all(&dir);

        let players = vec![tiered(1)];
        let meta = BuildMeta::new(
            2024,
            &ProjectionMode::SeasonTotals { season: 2024 },
            &RuleSet::default(),
            players.len(),
        );
        let (players_path, meta_path) = write_outputs(&dir, &players, &meta, 12, true).unwrap();

        let text = std::fs::read_to_string(&players_path).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed.as_array().unwrap().len(), 1);
        assert_eq!(parsed[0]["player_id"], "P1");
        assert_eq!(parsed[0]["round_est"], 1);

        let meta_text = std::fs::read_to_string(&meta_path).unwrap();
        let meta_json: serde_json::Value = serde_json::from_str(&meta_text).unwrap();
        assert_eq!(meta_json["mode"], "total");
        assert_eq!(meta_json["per_game"], false);

        let _ = std::fs::remove_dir_all(&dir);
    }
}
