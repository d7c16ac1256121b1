// Post-build diagnostics: per-position baselines and the top players by VORP.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use tracing::info;

use draftkit_core::player::TieredPlayer;
use draftkit_core::position::Position;
use draftkit_core::valuation::vor::ReplacementLevel;

pub const TOP_N: usize = 12;

#[derive(Debug, Clone, PartialEq)]
pub struct PositionSummary {
    pub position: Position,
    pub count: usize,
    pub replacement_count: usize,
    pub baseline: f64,
    pub top_points: f64,
}

#[derive(Debug, Clone)]
pub struct Diagnostics<'a> {
    pub positions: Vec<PositionSummary>,
    pub top: Vec<&'a TieredPlayer>,
}

/// Summarize a finished build. Positions with no players are omitted.
pub fn summarize<'a>(
    players: &'a [TieredPlayer],
    replacement: &BTreeMap<Position, ReplacementLevel>,
) -> Diagnostics<'a> {
    let mut positions = Vec::new();
    for pos in Position::ALL {
        let at_pos: Vec<&TieredPlayer> = players.iter().filter(|p| p.position() == pos).collect();
        if at_pos.is_empty() {
            continue;
        }
        let top_points = at_pos
            .iter()
            .map(|p| p.ranked.player.points)
            .fold(f64::NEG_INFINITY, f64::max);
        let level = replacement.get(&pos);
        positions.push(PositionSummary {
            position: pos,
            count: at_pos.len(),
            replacement_count: level.map_or(0, |l| l.count()),
            baseline: level.map_or(0.0, |l| l.baseline),
            top_points,
        });
    }

    let mut top: Vec<&TieredPlayer> = players.iter().filter(|p| p.ranked.vorp > 0.0).collect();
    top.sort_by(|a, b| b.ranked.vorp.total_cmp(&a.ranked.vorp));
    top.truncate(TOP_N);

    Diagnostics { positions, top }
}

impl Diagnostics<'_> {
    /// Log each position summary at info level.
    pub fn log(&self) {
        for s in &self.positions {
            info!(
                "{}: {} players, replacement {:.1} pts (#{}), top {:.1} pts",
                s.position, s.count, s.baseline, s.replacement_count, s.top_points
            );
        }
    }

    /// Plain-text table of the top players by VORP.
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Top {} by VORP", TOP_N);
        let _ = writeln!(
            out,
            "{:>4}  {:<26} {:<3} {:>7} {:>7} {:>4} {:>3}",
            "Rank", "Name", "Pos", "Points", "VORP", "Tier", "Bye"
        );
        for (i, p) in self.top.iter().enumerate() {
            let player = &p.ranked.player;
            let tier = p.tier.map_or_else(|| "-".to_string(), |t| t.to_string());
            let bye = player.bye.map_or_else(|| "-".to_string(), |b| b.to_string());
            let _ = writeln!(
                out,
                "{:>4}  {:<26} {:<3} {:>7.1} {:>7.1} {:>4} {:>3}",
                i + 1,
                player.name,
                player.position.display_str(),
                player.points,
                p.ranked.vorp,
                tier,
                bye
            );
        }
        out
    }
}
