// Fantasy point scoring for a single stat line.
//
// Pure functions of (line, rule set). Non-finite stat values count as 0 so a
// bad input can never turn a projection into NaN.

use crate::config::{DefenseScoring, KickerScoring, OffenseScoring, RuleSet};
use crate::stats::{DefenseStats, KickerStats, OffenseStats};
use crate::valuation::round2;

fn finite(v: f64) -> f64 {
    if v.is_finite() {
        v
    } else {
        0.0
    }
}

// ---------------------------------------------------------------------------
// Offense
// ---------------------------------------------------------------------------

/// Score an offensive stat line, rounded to two decimals.
pub fn score_offense(s: &OffenseStats, r: &OffenseScoring) -> f64 {
    let pts = finite(s.passing_yards) / r.pass_yds_per_pt
        + finite(s.passing_tds) * r.pass_td
        + finite(s.interceptions) * r.interceptions
        + finite(s.rushing_yards) / r.rush_yds_per_pt
        + finite(s.rushing_tds) * r.rush_td
        + finite(s.receptions) * r.rec
        + finite(s.receiving_yards) / r.rec_yds_per_pt
        + finite(s.receiving_tds) * r.rec_td
        + finite(s.two_point_conversions) * r.two_pt
        + finite(s.fumbles_lost) * r.fum_lost;
    round2(pts)
}

pub fn score_offense_line(s: &OffenseStats, rules: &RuleSet) -> f64 {
    score_offense(s, &rules.offense)
}

// ---------------------------------------------------------------------------
// Defense
// ---------------------------------------------------------------------------

/// Points-allowed scoring bands. Exactly one applies to any value; the last
/// band is the catch-all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PointsAllowedBand {
    Shutout,
    Under7,
    Under14,
    Under21,
    Under28,
    Under35,
    ThirtyFivePlus,
}

impl PointsAllowedBand {
    /// Select the band for a points-allowed value. Integer values land in
    /// the inclusive ranges 0, 1-6, 7-13, 14-20, 21-27, 28-34, 35+.
    /// Fractional values use half-open upper bounds; anything at or below 0
    /// is a shutout.
    pub fn from_points(pa: f64) -> Self {
        let pa = finite(pa);
        if pa <= 0.0 {
            PointsAllowedBand::Shutout
        } else if pa < 7.0 {
            PointsAllowedBand::Under7
        } else if pa < 14.0 {
            PointsAllowedBand::Under14
        } else if pa < 21.0 {
            PointsAllowedBand::Under21
        } else if pa < 28.0 {
            PointsAllowedBand::Under28
        } else if pa < 35.0 {
            PointsAllowedBand::Under35
        } else {
            PointsAllowedBand::ThirtyFivePlus
        }
    }

    pub fn points(self, r: &DefenseScoring) -> f64 {
        match self {
            PointsAllowedBand::Shutout => r.pa_0,
            PointsAllowedBand::Under7 => r.pa_1_6,
            PointsAllowedBand::Under14 => r.pa_7_13,
            PointsAllowedBand::Under21 => r.pa_14_20,
            PointsAllowedBand::Under28 => r.pa_21_27,
            PointsAllowedBand::Under35 => r.pa_28_34,
            PointsAllowedBand::ThirtyFivePlus => r.pa_35_plus,
        }
    }
}

/// Score a defense line: counting stats plus one points-allowed band.
pub fn score_defense(s: &DefenseStats, r: &DefenseScoring) -> f64 {
    let pts = finite(s.sacks) * r.sack
        + finite(s.interceptions) * r.interception
        + finite(s.fumble_recoveries) * r.fumble_recovery
        + finite(s.defensive_tds) * r.defensive_td
        + finite(s.safeties) * r.safety
        + finite(s.blocked_kicks) * r.blocked_kick
        + PointsAllowedBand::from_points(s.points_allowed).points(r);
    round2(pts)
}

pub fn score_defense_line(s: &DefenseStats, rules: &RuleSet) -> f64 {
    score_defense(s, &rules.defense)
}

// ---------------------------------------------------------------------------
// Kicker
// ---------------------------------------------------------------------------

pub fn score_kicker(s: &KickerStats, r: &KickerScoring) -> f64 {
    let pts = finite(s.fg_0_39) * r.fg_0_39
        + finite(s.fg_40_49) * r.fg_40_49
        + finite(s.fg_50_plus) * r.fg_50_plus
        + finite(s.fg_made_unbucketed) * r.fg_flat
        + finite(s.xp_made) * r.xp
        + finite(s.fg_miss) * r.fg_miss
        + finite(s.xp_miss) * r.xp_miss;
    round2(pts)
}

pub fn score_kicker_line(s: &KickerStats, rules: &RuleSet) -> f64 {
    score_kicker(s, &rules.kicker)
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
