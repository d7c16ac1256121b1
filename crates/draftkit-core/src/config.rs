// Scoring rule set and blend parameters.
//
// A rule set is read from TOML (rules.toml). Every key is optional and falls
// back to standard full-PPR scoring in a 12-team league. Rule sets and blend
// parameters are validated at construction and immutable afterwards.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::position::Position;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("blend weights ({weights}) must match lookback ({years})")]
    BlendMismatch { weights: usize, years: usize },
}

// ---------------------------------------------------------------------------
// Rule set
// ---------------------------------------------------------------------------

/// Complete scoring and league configuration for one build.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct RuleSet {
    pub name: String,
    pub league: LeagueShape,
    pub offense: OffenseScoring,
    pub defense: DefenseScoring,
    pub kicker: KickerScoring,
}

impl Default for RuleSet {
    fn default() -> Self {
        RuleSet {
            name: "Standard PPR".into(),
            league: LeagueShape::default(),
            offense: OffenseScoring::default(),
            defense: DefenseScoring::default(),
            kicker: KickerScoring::default(),
        }
    }
}

/// League size and starting lineup.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct LeagueShape {
    pub teams: usize,
    pub roster: RosterRequirements,
    pub flex_positions: Vec<Position>,
}

impl Default for LeagueShape {
    fn default() -> Self {
        LeagueShape {
            teams: 12,
            roster: RosterRequirements::default(),
            flex_positions: vec![Position::RB, Position::WR, Position::TE],
        }
    }
}

impl LeagueShape {
    pub fn is_flex_eligible(&self, pos: Position) -> bool {
        self.flex_positions.contains(&pos)
    }

    /// League-wide FLEX starters.
    pub fn flex_slots(&self) -> usize {
        self.roster.flex * self.teams
    }
}

/// Starters required per team at each position. Keys in TOML are the
/// uppercase position abbreviations (`QB`, `RB`, ..., `FLEX`, `K`, `DEF`).
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct RosterRequirements {
    #[serde(rename = "QB")]
    pub qb: usize,
    #[serde(rename = "RB")]
    pub rb: usize,
    #[serde(rename = "WR")]
    pub wr: usize,
    #[serde(rename = "TE")]
    pub te: usize,
    #[serde(rename = "FLEX")]
    pub flex: usize,
    #[serde(rename = "K")]
    pub k: usize,
    #[serde(rename = "DEF", alias = "DST")]
    pub dst: usize,
}

impl Default for RosterRequirements {
    fn default() -> Self {
        RosterRequirements {
            qb: 1,
            rb: 2,
            wr: 2,
            te: 1,
            flex: 1,
            k: 1,
            dst: 1,
        }
    }
}

impl RosterRequirements {
    /// Dedicated starters per team at `pos` (FLEX excluded).
    pub fn starters(&self, pos: Position) -> usize {
        match pos {
            Position::QB => self.qb,
            Position::RB => self.rb,
            Position::WR => self.wr,
            Position::TE => self.te,
            Position::K => self.k,
            Position::Dst => self.dst,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct OffenseScoring {
    pub pass_yds_per_pt: f64,
    pub pass_td: f64,
    pub interceptions: f64,
    pub rush_yds_per_pt: f64,
    pub rush_td: f64,
    pub rec: f64,
    pub rec_yds_per_pt: f64,
    pub rec_td: f64,
    pub two_pt: f64,
    pub fum_lost: f64,
}

impl Default for OffenseScoring {
    fn default() -> Self {
        OffenseScoring {
            pass_yds_per_pt: 25.0,
            pass_td: 4.0,
            interceptions: -2.0,
            rush_yds_per_pt: 10.0,
            rush_td: 6.0,
            rec: 1.0,
            rec_yds_per_pt: 10.0,
            rec_td: 6.0,
            two_pt: 2.0,
            fum_lost: -2.0,
        }
    }
}

/// Defense scoring, including the points-allowed bands.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct DefenseScoring {
    pub sack: f64,
    pub interception: f64,
    pub fumble_recovery: f64,
    pub defensive_td: f64,
    pub safety: f64,
    pub blocked_kick: f64,
    pub pa_0: f64,
    pub pa_1_6: f64,
    pub pa_7_13: f64,
    pub pa_14_20: f64,
    pub pa_21_27: f64,
    pub pa_28_34: f64,
    pub pa_35_plus: f64,
}

impl Default for DefenseScoring {
    fn default() -> Self {
        DefenseScoring {
            sack: 1.0,
            interception: 2.0,
            fumble_recovery: 2.0,
            defensive_td: 6.0,
            safety: 2.0,
            blocked_kick: 2.0,
            pa_0: 10.0,
            pa_1_6: 7.0,
            pa_7_13: 4.0,
            pa_14_20: 1.0,
            pa_21_27: 0.0,
            pa_28_34: -1.0,
            pa_35_plus: -4.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct KickerScoring {
    pub fg_0_39: f64,
    pub fg_40_49: f64,
    pub fg_50_plus: f64,
    /// Applied to field goals reported without a distance.
    pub fg_flat: f64,
    pub xp: f64,
    pub fg_miss: f64,
    pub xp_miss: f64,
}

impl Default for KickerScoring {
    fn default() -> Self {
        KickerScoring {
            fg_0_39: 3.0,
            fg_40_49: 4.0,
            fg_50_plus: 5.0,
            fg_flat: 3.0,
            xp: 1.0,
            fg_miss: 0.0,
            xp_miss: 0.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

impl RuleSet {
    /// Parse and validate a rule set from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Self::parse(text, Path::new("<inline>"))
    }

    /// Read, parse and validate a rule set file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.to_path_buf(),
        })?;
        Self::parse(&text, path)
    }

    fn parse(text: &str, path: &Path) -> Result<Self, ConfigError> {
        let rules: RuleSet = toml::from_str(text).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;
        rules.validate()?;
        Ok(rules)
    }

    /// Check invariants the scoring and VORP stages rely on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.league.teams == 0 {
            return Err(ConfigError::ValidationError {
                field: "league.teams".into(),
                message: "must be greater than 0".into(),
            });
        }

        for pos in &self.league.flex_positions {
            if !pos.is_offense() {
                return Err(ConfigError::ValidationError {
                    field: "league.flex_positions".into(),
                    message: format!("{pos} cannot fill a FLEX slot"),
                });
            }
        }

        let o = &self.offense;
        let divisors: &[(&str, f64)] = &[
            ("offense.pass_yds_per_pt", o.pass_yds_per_pt),
            ("offense.rush_yds_per_pt", o.rush_yds_per_pt),
            ("offense.rec_yds_per_pt", o.rec_yds_per_pt),
        ];
        for (name, val) in divisors {
            if !val.is_finite() || *val <= 0.0 {
                return Err(ConfigError::ValidationError {
                    field: name.to_string(),
                    message: format!("must be > 0, got {val}"),
                });
            }
        }

        let d = &self.defense;
        let k = &self.kicker;
        let multipliers: &[(&str, f64)] = &[
            ("offense.pass_td", o.pass_td),
            ("offense.interceptions", o.interceptions),
            ("offense.rush_td", o.rush_td),
            ("offense.rec", o.rec),
            ("offense.rec_td", o.rec_td),
            ("offense.two_pt", o.two_pt),
            ("offense.fum_lost", o.fum_lost),
            ("defense.sack", d.sack),
            ("defense.interception", d.interception),
            ("defense.fumble_recovery", d.fumble_recovery),
            ("defense.defensive_td", d.defensive_td),
            ("defense.safety", d.safety),
            ("defense.blocked_kick", d.blocked_kick),
            ("defense.pa_0", d.pa_0),
            ("defense.pa_1_6", d.pa_1_6),
            ("defense.pa_7_13", d.pa_7_13),
            ("defense.pa_14_20", d.pa_14_20),
            ("defense.pa_21_27", d.pa_21_27),
            ("defense.pa_28_34", d.pa_28_34),
            ("defense.pa_35_plus", d.pa_35_plus),
            ("kicker.fg_0_39", k.fg_0_39),
            ("kicker.fg_40_49", k.fg_40_49),
            ("kicker.fg_50_plus", k.fg_50_plus),
            ("kicker.fg_flat", k.fg_flat),
            ("kicker.xp", k.xp),
            ("kicker.fg_miss", k.fg_miss),
            ("kicker.xp_miss", k.xp_miss),
        ];
        for (name, val) in multipliers {
            if !val.is_finite() {
                return Err(ConfigError::ValidationError {
                    field: name.to_string(),
                    message: format!("must be finite, got {val}"),
                });
            }
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Blend parameters
// ---------------------------------------------------------------------------

pub const DEFAULT_GAMES_IN_SEASON: u32 = 17;

/// Validated inputs for the blended projector.
///
/// Years and weights are parallel and ordered most-recent-first. Weights are
/// normalized to sum to 1.0 on construction.
#[derive(Debug, Clone, PartialEq)]
pub struct BlendParams {
    years_desc: Vec<i32>,
    weights_desc: Vec<f64>,
    min_games: u32,
    games_in_season: u32,
}

impl BlendParams {
    pub fn new(
        years_desc: Vec<i32>,
        weights_desc: Vec<f64>,
        min_games: u32,
        games_in_season: u32,
    ) -> Result<Self, ConfigError> {
        if weights_desc.len() != years_desc.len() {
            return Err(ConfigError::BlendMismatch {
                weights: weights_desc.len(),
                years: years_desc.len(),
            });
        }
        if years_desc.is_empty() {
            return Err(ConfigError::ValidationError {
                field: "blend.years".into(),
                message: "at least one season is required".into(),
            });
        }
        if let Some(w) = weights_desc.iter().find(|w| !w.is_finite() || **w < 0.0) {
            return Err(ConfigError::ValidationError {
                field: "blend.weights".into(),
                message: format!("weights must be finite and >= 0, got {w}"),
            });
        }
        let total: f64 = weights_desc.iter().sum();
        if total <= 0.0 {
            return Err(ConfigError::ValidationError {
                field: "blend.weights".into(),
                message: "weights must not all be zero".into(),
            });
        }
        if games_in_season == 0 {
            return Err(ConfigError::ValidationError {
                field: "blend.games_in_season".into(),
                message: "must be greater than 0".into(),
            });
        }

        Ok(BlendParams {
            years_desc,
            weights_desc: weights_desc.iter().map(|w| w / total).collect(),
            min_games,
            games_in_season,
        })
    }

    /// Blend the `lookback` seasons immediately before `target_year`.
    pub fn for_target(
        target_year: i32,
        lookback: u32,
        weights_desc: Vec<f64>,
        min_games: u32,
        games_in_season: u32,
    ) -> Result<Self, ConfigError> {
        // Checked before building the year list so lookback is bounded by
        // the weights actually supplied.
        if weights_desc.len() != lookback as usize {
            return Err(ConfigError::BlendMismatch {
                weights: weights_desc.len(),
                years: lookback as usize,
            });
        }
        let years = (1..=lookback as i32).map(|i| target_year - i).collect();
        Self::new(years, weights_desc, min_games, games_in_season)
    }

    pub fn years(&self) -> &[i32] {
        &self.years_desc
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights_desc
    }

    /// (season, normalized weight) pairs, most recent first.
    pub fn year_weights(&self) -> impl Iterator<Item = (i32, f64)> + '_ {
        self.years_desc
            .iter()
            .copied()
            .zip(self.weights_desc.iter().copied())
    }

    pub fn min_games(&self) -> u32 {
        self.min_games
    }

    pub fn games_in_season(&self) -> u32 {
        self.games_in_season
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_yields_defaults() {
        let rules = RuleSet::from_toml_str("").expect("empty rule set is legal");
        assert_eq!(rules, RuleSet::default());
        assert_eq!(rules.league.teams, 12);
        assert_eq!(rules.league.roster.rb, 2);
        assert_eq!(rules.league.roster.flex, 1);
        assert_eq!(
            rules.league.flex_positions,
            vec![Position::RB, Position::WR, Position::TE]
        );
        assert!((rules.offense.pass_yds_per_pt - 25.0).abs() < f64::EPSILON);
        assert!((rules.defense.pa_35_plus + 4.0).abs() < f64::EPSILON);
        assert!((rules.kicker.fg_50_plus - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn partial_toml_overrides_only_given_keys() {
        let text = r#"
name = "Half PPR"

[league]
teams = 10
flex_positions = ["RB", "WR"]

[league.roster]
WR = 3
DST = 2

[offense]
rec = 0.5
"#;
        let rules = RuleSet::from_toml_str(text).unwrap();
        assert_eq!(rules.name, "Half PPR");
        assert_eq!(rules.league.teams, 10);
        assert_eq!(rules.league.roster.wr, 3);
        assert_eq!(rules.league.roster.dst, 2);
        assert_eq!(rules.league.roster.rb, 2);
        assert_eq!(rules.league.flex_positions, vec![Position::RB, Position::WR]);
        assert!((rules.offense.rec - 0.5).abs() < f64::EPSILON);
        assert!((rules.offense.pass_td - 4.0).abs() < f64::EPSILON);
    }

    #[test]
    fn rejects_zero_teams() {
        let err = RuleSet::from_toml_str("[league]\nteams = 0\n").unwrap_err();
        match &err {
            ConfigError::ValidationError { field, .. } => assert_eq!(field, "league.teams"),
            other => panic!("expected ValidationError, got: {other}"),
        }
    }

    #[test]
    fn rejects_zero_yards_per_point() {
        let err = RuleSet::from_toml_str("[offense]\nrush_yds_per_pt = 0.0\n").unwrap_err();
        match &err {
            ConfigError::ValidationError { field, .. } => {
                assert_eq!(field, "offense.rush_yds_per_pt")
            }
            other => panic!("expected ValidationError, got: {other}"),
        }
    }

    #[test]
    fn rejects_non_offense_flex() {
        let err = RuleSet::from_toml_str("[league]\nflex_positions = [\"RB\", \"K\"]\n")
            .unwrap_err();
        match &err {
            ConfigError::ValidationError { field, .. } => {
                assert_eq!(field, "league.flex_positions")
            }
            other => panic!("expected ValidationError, got: {other}"),
        }
    }

    #[test]
    fn parse_error_for_invalid_toml() {
        let err = RuleSet::from_toml_str("this is not valid [[[ toml").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn missing_file_is_reported() {
        let path = std::env::temp_dir().join("draftkit_missing_rules.toml");
        let _ = std::fs::remove_file(&path);
        let err = RuleSet::load(&path).unwrap_err();
        match &err {
            ConfigError::FileNotFound { path: p } => assert_eq!(p, &path),
            other => panic!("expected FileNotFound, got: {other}"),
        }
    }

    #[test]
    fn blend_weights_are_normalized() {
        let params = BlendParams::new(vec![2024, 2023], vec![3.0, 1.0], 8, 17).unwrap();
        assert!((params.weights()[0] - 0.75).abs() < 1e-12);
        assert!((params.weights()[1] - 0.25).abs() < 1e-12);
        let pairs: Vec<(i32, f64)> = params.year_weights().collect();
        assert_eq!(pairs[0].0, 2024);
        assert_eq!(pairs[1].0, 2023);
    }

    #[test]
    fn three_weights_for_two_year_lookback_rejected() {
        let err = BlendParams::for_target(2025, 2, vec![0.6, 0.3, 0.1], 8, 17).unwrap_err();
        match err {
            ConfigError::BlendMismatch { weights, years } => {
                assert_eq!(weights, 3);
                assert_eq!(years, 2);
            }
            other => panic!("expected BlendMismatch, got: {other}"),
        }
    }

    #[test]
    fn for_target_uses_prior_seasons() {
        let params = BlendParams::for_target(2025, 3, vec![0.6, 0.3, 0.1], 8, 17).unwrap();
        assert_eq!(params.years(), &[2024, 2023, 2022]);
    }

    #[test]
    fn for_target_rejects_lookback_without_weights() {
        let err = BlendParams::for_target(2025, u32::MAX, vec![0.6, 0.3, 0.1], 8, 17).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::BlendMismatch { weights: 3, years } if years == u32::MAX as usize
        ));
    }

    #[test]
    fn rejects_negative_and_all_zero_weights() {
        assert!(matches!(
            BlendParams::new(vec![2024, 2023], vec![1.0, -0.5], 8, 17),
            Err(ConfigError::ValidationError { .. })
        ));
        assert!(matches!(
            BlendParams::new(vec![2024], vec![0.0], 8, 17),
            Err(ConfigError::ValidationError { .. })
        ));
        assert!(matches!(
            BlendParams::new(vec![], vec![], 8, 17),
            Err(ConfigError::ValidationError { .. })
        ));
        assert!(matches!(
            BlendParams::new(vec![2024], vec![1.0], 8, 0),
            Err(ConfigError::ValidationError { .. })
        ));
    }
}
