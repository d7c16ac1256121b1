// Player records produced by each pipeline stage.
//
// score -> rank -> tier. Each stage takes the previous record by value and
// wraps it, so a later stage can never be handed an earlier stage's output.

use serde::Serialize;

use crate::position::Position;

/// Where a player's `points` came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectionSource {
    /// Weighted multi-season per-game blend.
    Blend,
    /// Single-season totals.
    Computed,
    /// Replaced by a manual override.
    Override,
}

/// One projected player for the target season.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredPlayer {
    pub player_id: String,
    pub name: String,
    #[serde(rename = "pos")]
    pub position: Position,
    #[serde(rename = "tm")]
    pub team: String,
    pub points: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bye: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ppg: Option<f64>,
    /// Games played. In blend mode, summed over the qualifying seasons.
    #[serde(rename = "gp", skip_serializing_if = "Option::is_none")]
    pub games: Option<u32>,
    pub source: ProjectionSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub override_note: Option<String>,
}

/// A scored player with replacement baseline, VORP and ranks.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedPlayer {
    #[serde(flatten)]
    pub player: ScoredPlayer,
    pub repl_pts: f64,
    pub vorp: f64,
    pub pos_rank: usize,
    pub overall_rank: usize,
}

/// A ranked player with its tier within its position. `tier` is `None` when
/// clustering could not be performed for the position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TieredPlayer {
    #[serde(flatten)]
    pub ranked: RankedPlayer,
    pub tier: Option<u32>,
}

impl TieredPlayer {
    pub fn position(&self) -> Position {
        self.ranked.player.position
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiered_player_serializes_flat() {
        let tiered = TieredPlayer {
            ranked: RankedPlayer {
                player: ScoredPlayer {
                    player_id: "00-001".into(),
                    name: "Test Back".into(),
                    position: Position::RB,
                    team: "DET".into(),
                    points: 250.5,
                    bye: Some(5),
                    ppg: None,
                    games: Some(2),
                    source: ProjectionSource::Blend,
                    override_note: None,
                },
                repl_pts: 120.0,
                vorp: 130.5,
                pos_rank: 1,
                overall_rank: 3,
            },
            tier: None,
        };

        let value = serde_json::to_value(&tiered).unwrap();
        assert_eq!(value["pos"], "RB");
        assert_eq!(value["tm"], "DET");
        assert_eq!(value["gp"], 2);
        assert_eq!(value["source"], "blend");
        assert_eq!(value["vorp"], 130.5);
        assert!(value["tier"].is_null());
        assert!(value.get("ppg").is_none());
        assert!(value.get("override_note").is_none());
    }
}
