// End-to-end valuation over an in-memory 12-team league:
// blend -> replacement levels -> VORP -> tiers.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use draftkit_core::config::{BlendParams, RuleSet};
use draftkit_core::player::{ScoredPlayer, TieredPlayer};
use draftkit_core::position::Position;
use draftkit_core::stats::{
    ByeWeeks, DefenseStats, KickerStats, OffenseStats, Roster, RosterEntry, WeeklyStats,
};
use draftkit_core::valuation::tiers::{assign_tiers, KMeansClusterer, DEFAULT_K_MAX};
use draftkit_core::valuation::vor::{compute_vorp, determine_replacement_levels};
use draftkit_core::valuation::{blend, round2};

// ===========================================================================
// Test helpers
// ===========================================================================

const TEAMS: [&str; 4] = ["NE", "NYJ", "MIA", "BUF"];

/// Player counts per offense position, plus kickers.
const POOL: [(Position, usize); 5] = [
    (Position::QB, 18),
    (Position::RB, 36),
    (Position::WR, 40),
    (Position::TE, 16),
    (Position::K, 14),
];

fn id(pos: Position, i: usize) -> String {
    format!("{}-{i:02}", pos.display_str())
}

fn roster() -> Roster {
    Roster::new(POOL.iter().flat_map(|&(pos, n)| {
        (0..n).map(move |i| RosterEntry {
            player_id: id(pos, i),
            name: format!("{pos} Player {i}"),
            position: Some(pos),
            team: TEAMS[i % TEAMS.len()].to_string(),
        })
    }))
}

/// Per-game line for player `i` at `pos`; lower `i` is better, and the
/// older season is a little weaker so the blend is not a plain copy.
fn offense_line(pos: Position, i: usize, season: i32) -> OffenseStats {
    let f = (60 - i) as f64 * if season == 2024 { 1.0 } else { 0.9 };
    match pos {
        Position::QB => OffenseStats {
            passing_yards: 150.0 + 2.5 * f,
            passing_tds: 1.0 + f / 40.0,
            ..Default::default()
        },
        Position::RB => OffenseStats {
            rushing_yards: 1.5 * f,
            receptions: f / 20.0,
            ..Default::default()
        },
        Position::WR => OffenseStats {
            receptions: f / 10.0,
            receiving_yards: 1.4 * f,
            ..Default::default()
        },
        _ => OffenseStats {
            receptions: f / 15.0,
            receiving_yards: f,
            ..Default::default()
        },
    }
}

fn weekly<S: Clone>(
    entity: &str,
    team: &str,
    season: i32,
    games: u32,
    stats: S,
) -> Vec<WeeklyStats<S>> {
    (1..=games)
        .map(|week| WeeklyStats {
            entity_id: entity.to_string(),
            team: team.to_string(),
            season,
            week,
            stats: stats.clone(),
        })
        .collect()
}

fn offense_rows() -> Vec<WeeklyStats<OffenseStats>> {
    let mut rows = Vec::new();
    for &(pos, n) in POOL.iter().filter(|(p, _)| p.is_offense()) {
        for i in 0..n {
            let team = TEAMS[i % TEAMS.len()];
            for season in [2024, 2023] {
                rows.extend(weekly(&id(pos, i), team, season, 12, offense_line(pos, i, season)));
            }
        }
    }
    rows
}

fn kicker_rows() -> Vec<WeeklyStats<KickerStats>> {
    (0..14)
        .flat_map(|i| {
            let stats = KickerStats {
                fg_0_39: 1.0,
                fg_40_49: 1.0 - i as f64 / 20.0,
                xp_made: 2.5,
                ..Default::default()
            };
            weekly(&id(Position::K, i), TEAMS[i % TEAMS.len()], 2024, 15, stats)
        })
        .collect()
}

fn defense_rows() -> Vec<WeeklyStats<DefenseStats>> {
    TEAMS
        .iter()
        .enumerate()
        .flat_map(|(i, team)| {
            let stats = DefenseStats {
                sacks: 3.0 - i as f64 * 0.5,
                interceptions: 1.0,
                points_allowed: 18.0 + i as f64,
                ..Default::default()
            };
            weekly(team, team, 2024, 16, stats)
        })
        .collect()
}

fn project(rules: &RuleSet) -> Vec<ScoredPlayer> {
    let params = BlendParams::for_target(2025, 3, vec![0.6, 0.3, 0.1], 8, 17).unwrap();
    let byes = ByeWeeks::new(HashMap::from([("NE".to_string(), 11), ("MIA".to_string(), 12)]));
    let roster = roster();

    let mut players = blend::blend_offense(&offense_rows(), &roster, rules, &params, Some(&byes));
    players.extend(blend::blend_defense(&defense_rows(), rules, &params, Some(&byes)));
    players.extend(blend::blend_kickers(&kicker_rows(), &roster, rules, &params, Some(&byes)));
    players
}

fn by_position(players: &[TieredPlayer]) -> BTreeMap<Position, Vec<&TieredPlayer>> {
    let mut map: BTreeMap<Position, Vec<&TieredPlayer>> = BTreeMap::new();
    for p in players {
        map.entry(p.position()).or_default().push(p);
    }
    map
}

// ===========================================================================
// Tests
// ===========================================================================

#[test]
fn every_rostered_player_and_defense_is_projected() {
    let players = project(&RuleSet::default());
    let expected: usize = POOL.iter().map(|(_, n)| n).sum::<usize>() + TEAMS.len();
    assert_eq!(players.len(), expected);

    let ne_qb = players.iter().find(|p| p.player_id == "QB-00").unwrap();
    assert_eq!(ne_qb.bye, Some(11));
    assert_eq!(ne_qb.games, Some(24));
    let nyj_qb = players.iter().find(|p| p.player_id == "QB-01").unwrap();
    assert_eq!(nyj_qb.bye, Some(0));
    assert!(players.iter().any(|p| p.player_id == "DEF-NYJ"));
}

#[test]
fn ranks_follow_points_and_positions() {
    let rules = RuleSet::default();
    let ranked = compute_vorp(project(&rules), &rules);

    for (i, p) in ranked.iter().enumerate() {
        assert_eq!(p.overall_rank, i + 1);
    }
    assert!(ranked
        .windows(2)
        .all(|w| w[0].player.points >= w[1].player.points));

    let mut seen: BTreeMap<Position, usize> = BTreeMap::new();
    for p in &ranked {
        let next = seen.entry(p.player.position).or_insert(0);
        *next += 1;
        assert_eq!(p.pos_rank, *next);
    }
}

#[test]
fn replacement_counts_absorb_flex_exactly() {
    let rules = RuleSet::default();
    let players = project(&rules);
    let levels = determine_replacement_levels(&players, &rules.league);

    let flex_total: usize = levels.values().map(|l| l.flex_share).sum();
    assert_eq!(flex_total, rules.league.flex_slots());
    assert_eq!(levels[&Position::QB].flex_share, 0);
    assert_eq!(levels[&Position::K].count(), 12);
    assert_eq!(levels[&Position::Dst].count(), 12);
    // More starters than teams in the pool: baseline is the worst defense.
    assert_eq!(levels[&Position::Dst].pool_size, TEAMS.len());

    let ranked = compute_vorp(players, &rules);
    for p in &ranked {
        let level = &levels[&p.player.position];
        assert_eq!(p.repl_pts, level.baseline);
        assert_eq!(p.vorp, round2(p.player.points - level.baseline));
        // Distinct points: only players above the replacement slot are positive.
        if level.count() <= level.pool_size {
            assert_eq!(p.vorp > 0.0, p.pos_rank < level.count(), "{}", p.player.player_id);
        }
    }
}

#[test]
fn tiers_are_dense_and_follow_vorp() {
    let rules = RuleSet::default();
    let tiered = assign_tiers(compute_vorp(project(&rules), &rules), DEFAULT_K_MAX);
    assert!(tiered.iter().all(|p| p.tier.is_some()));

    for (pos, group) in by_position(&tiered) {
        let used: BTreeSet<u32> = group.iter().filter_map(|p| p.tier).collect();
        let max = *used.iter().max().unwrap();
        assert_eq!(used, (1..=max).collect::<BTreeSet<u32>>(), "{pos}");

        if group.len() >= 8 {
            assert!(max as usize <= KMeansClusterer::k_for(group.len(), DEFAULT_K_MAX), "{pos}");
        } else {
            assert!(max <= 3, "{pos}");
        }

        for a in &group {
            for b in &group {
                if a.ranked.vorp > b.ranked.vorp {
                    assert!(a.tier <= b.tier, "{pos}");
                }
            }
        }
    }
}
