// CSV input loading and normalization.
//
// Every stat column is optional: a missing column, an empty cell or an
// unparseable value all load as 0. Rows missing an identity column (id,
// season, week) are skipped with a warning.

use std::collections::HashMap;
use std::io::Read;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{info, warn};

use draftkit_core::overrides::OverrideEntry;
use draftkit_core::position::Position;
use draftkit_core::stats::{
    ByeWeeks, DefenseStats, KickerStats, OffenseStats, Roster, RosterEntry, WeeklyStats,
};

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("CSV error in {}: {source}", path.display())]
    Csv { path: PathBuf, source: csv::Error },
}

// ---------------------------------------------------------------------------
// Raw CSV serde structs (private)
// ---------------------------------------------------------------------------

type Num = Option<f64>;

fn num(v: Num) -> f64 {
    v.filter(|x| x.is_finite()).unwrap_or(0.0)
}

#[derive(Debug, Deserialize)]
struct RawOffenseRow {
    player_id: String,
    season: i32,
    week: u32,
    #[serde(default, alias = "team")]
    recent_team: String,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    passing_yards: Num,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    passing_tds: Num,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    interceptions: Num,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    rushing_yards: Num,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    rushing_tds: Num,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    receptions: Num,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    receiving_yards: Num,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    receiving_tds: Num,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    two_point_conversions: Num,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    fumbles_lost: Num,
}

#[derive(Debug, Deserialize)]
struct RawDefenseRow {
    team: String,
    season: i32,
    week: u32,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    points_allowed: Num,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    sacks: Num,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    interceptions: Num,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    fumble_recoveries: Num,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    defensive_tds: Num,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    safeties: Num,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    blocked_kicks: Num,
}

#[derive(Debug, Deserialize)]
struct RawKickerRow {
    player_id: String,
    #[serde(default)]
    team: String,
    season: i32,
    week: u32,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    fg_0_39: Num,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    fg_40_49: Num,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    fg_50_plus: Num,
    /// Total field goals, used only when no distance bucket is present.
    #[serde(default, deserialize_with = "csv::invalid_option")]
    fg_made: Num,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    xp_made: Num,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    fg_miss: Num,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    xp_miss: Num,
}

#[derive(Debug, Deserialize)]
struct RawRosterRow {
    player_id: String,
    #[serde(alias = "name")]
    player_name: String,
    #[serde(default)]
    position: String,
    #[serde(default)]
    team: String,
}

#[derive(Debug, Deserialize)]
struct RawByeRow {
    team: String,
    #[serde(alias = "bye")]
    bye_week: u32,
}

#[derive(Debug, Deserialize)]
struct RawOverrideRow {
    player_id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    pos: String,
    #[serde(default)]
    tm: String,
    points: String,
    #[serde(default)]
    note: String,
}

const OVERRIDE_REQUIRED_COLUMNS: [&str; 5] = ["player_id", "name", "pos", "tm", "points"];

// ---------------------------------------------------------------------------
// Reader-based loaders (enable testing without temp files)
// ---------------------------------------------------------------------------

/// Deserialize every row, skipping malformed ones with a warning.
fn read_rows<R: Read, T: for<'de> Deserialize<'de>>(
    rdr: R,
    kind: &str,
) -> Result<Vec<T>, csv::Error> {
    let mut reader = csv::Reader::from_reader(rdr);
    // Fail early on an unreadable header row.
    reader.headers()?;
    let mut rows = Vec::new();
    for result in reader.deserialize::<T>() {
        match result {
            Ok(raw) => rows.push(raw),
            Err(e) => warn!("skipping malformed {kind} row: {e}"),
        }
    }
    Ok(rows)
}

pub fn offense_from_reader<R: Read>(
    rdr: R,
) -> Result<Vec<WeeklyStats<OffenseStats>>, csv::Error> {
    let rows = read_rows::<_, RawOffenseRow>(rdr, "offense")?;
    Ok(rows
        .into_iter()
        .map(|raw| WeeklyStats {
            entity_id: raw.player_id.trim().to_string(),
            team: raw.recent_team.trim().to_uppercase(),
            season: raw.season,
            week: raw.week,
            stats: OffenseStats {
                passing_yards: num(raw.passing_yards),
                passing_tds: num(raw.passing_tds),
                interceptions: num(raw.interceptions),
                rushing_yards: num(raw.rushing_yards),
                rushing_tds: num(raw.rushing_tds),
                receptions: num(raw.receptions),
                receiving_yards: num(raw.receiving_yards),
                receiving_tds: num(raw.receiving_tds),
                two_point_conversions: num(raw.two_point_conversions),
                fumbles_lost: num(raw.fumbles_lost),
            },
        })
        .collect())
}

pub fn defense_from_reader<R: Read>(
    rdr: R,
) -> Result<Vec<WeeklyStats<DefenseStats>>, csv::Error> {
    let rows = read_rows::<_, RawDefenseRow>(rdr, "defense")?;
    Ok(rows
        .into_iter()
        .map(|raw| {
            let team = raw.team.trim().to_uppercase();
            WeeklyStats {
                entity_id: team.clone(),
                team,
                season: raw.season,
                week: raw.week,
                stats: DefenseStats {
                    sacks: num(raw.sacks),
                    interceptions: num(raw.interceptions),
                    fumble_recoveries: num(raw.fumble_recoveries),
                    defensive_tds: num(raw.defensive_tds),
                    safeties: num(raw.safeties),
                    blocked_kicks: num(raw.blocked_kicks),
                    points_allowed: num(raw.points_allowed),
                },
            }
        })
        .collect())
}

pub fn kickers_from_reader<R: Read>(
    rdr: R,
) -> Result<Vec<WeeklyStats<KickerStats>>, csv::Error> {
    let rows = read_rows::<_, RawKickerRow>(rdr, "kicker")?;
    Ok(rows
        .into_iter()
        .map(|raw| {
            let bucketed =
                raw.fg_0_39.is_some() || raw.fg_40_49.is_some() || raw.fg_50_plus.is_some();
            WeeklyStats {
                entity_id: raw.player_id.trim().to_string(),
                team: raw.team.trim().to_uppercase(),
                season: raw.season,
                week: raw.week,
                stats: KickerStats {
                    fg_0_39: num(raw.fg_0_39),
                    fg_40_49: num(raw.fg_40_49),
                    fg_50_plus: num(raw.fg_50_plus),
                    fg_made_unbucketed: if bucketed { 0.0 } else { num(raw.fg_made) },
                    xp_made: num(raw.xp_made),
                    fg_miss: num(raw.fg_miss),
                    xp_miss: num(raw.xp_miss),
                },
            }
        })
        .collect())
}

pub fn roster_from_reader<R: Read>(rdr: R) -> Result<Roster, csv::Error> {
    let rows = read_rows::<_, RawRosterRow>(rdr, "roster")?;
    Ok(Roster::new(rows.into_iter().map(|raw| RosterEntry {
        player_id: raw.player_id.trim().to_string(),
        name: raw.player_name.trim().to_string(),
        position: Position::from_str_pos(&raw.position),
        team: raw.team.trim().to_uppercase(),
    })))
}

pub fn byes_from_reader<R: Read>(rdr: R) -> Result<ByeWeeks, csv::Error> {
    let rows = read_rows::<_, RawByeRow>(rdr, "bye week")?;
    let mut map = HashMap::new();
    for raw in rows {
        let team = raw.team.trim().to_uppercase();
        if map.insert(team.clone(), raw.bye_week).is_some() {
            warn!("duplicate bye week for '{team}', using latest value");
        }
    }
    Ok(ByeWeeks::new(map))
}

/// Load override rows.
///
/// A header missing any required column yields an empty set with a warning.
/// A row whose points are not a finite number is dropped on its own.
pub fn overrides_from_reader<R: Read>(rdr: R) -> Result<Vec<OverrideEntry>, csv::Error> {
    let mut reader = csv::Reader::from_reader(rdr);
    let headers = reader.headers()?.clone();
    let missing: Vec<&str> = OVERRIDE_REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|col| !headers.iter().any(|h| h.trim() == *col))
        .collect();
    if !missing.is_empty() {
        warn!("override file missing required columns: {missing:?}");
        return Ok(Vec::new());
    }

    let mut entries = Vec::new();
    for result in reader.deserialize::<RawOverrideRow>() {
        let raw = match result {
            Ok(raw) => raw,
            Err(e) => {
                warn!("skipping malformed override row: {e}");
                continue;
            }
        };
        let points = match raw.points.trim().parse::<f64>() {
            Ok(p) if p.is_finite() => p,
            _ => {
                warn!(
                    "dropping override for '{}': invalid points '{}'",
                    raw.player_id.trim(),
                    raw.points
                );
                continue;
            }
        };
        let note = raw.note.trim();
        entries.push(OverrideEntry {
            player_id: raw.player_id.trim().to_string(),
            name: raw.name.trim().to_string(),
            position: Position::from_str_pos(&raw.pos),
            team: raw.tm.trim().to_uppercase(),
            points,
            note: (!note.is_empty()).then(|| note.to_string()),
        });
    }
    Ok(entries)
}

// ---------------------------------------------------------------------------
// Public path-based loaders
// ---------------------------------------------------------------------------

fn open(path: &Path) -> Result<std::fs::File, LoadError> {
    std::fs::File::open(path).map_err(|e| LoadError::Io {
        path: path.to_path_buf(),
        source: e,
    })
}

fn load_with<T>(
    path: &Path,
    parse: impl FnOnce(std::fs::File) -> Result<T, csv::Error>,
) -> Result<T, LoadError> {
    let file = open(path)?;
    parse(file).map_err(|e| LoadError::Csv {
        path: path.to_path_buf(),
        source: e,
    })
}

pub fn load_offense(path: &Path) -> Result<Vec<WeeklyStats<OffenseStats>>, LoadError> {
    load_with(path, offense_from_reader)
}

pub fn load_defense(path: &Path) -> Result<Vec<WeeklyStats<DefenseStats>>, LoadError> {
    load_with(path, defense_from_reader)
}

pub fn load_kickers(path: &Path) -> Result<Vec<WeeklyStats<KickerStats>>, LoadError> {
    load_with(path, kickers_from_reader)
}

pub fn load_roster(path: &Path) -> Result<Roster, LoadError> {
    load_with(path, roster_from_reader)
}

pub fn load_byes(path: &Path) -> Result<ByeWeeks, LoadError> {
    load_with(path, byes_from_reader)
}

/// Load overrides. A missing file is not an error and yields no overrides.
pub fn load_overrides(path: &Path) -> Result<Vec<OverrideEntry>, LoadError> {
    if !path.exists() {
        info!("no override file found at {}", path.display());
        return Ok(Vec::new());
    }
    let entries = load_with(path, overrides_from_reader)?;
    info!("loaded {} overrides from {}", entries.len(), path.display());
    Ok(entries)
}

// ---------------------------------------------------------------------------
// Data directory
// ---------------------------------------------------------------------------

/// File layout of a data directory.
#[derive(Debug, Clone)]
pub struct DataPaths {
    pub offense: PathBuf,
    pub defense: PathBuf,
    pub kickers: PathBuf,
    pub roster: PathBuf,
    pub byes: PathBuf,
    pub overrides: PathBuf,
}

impl DataPaths {
    pub fn in_dir(dir: &Path) -> Self {
        DataPaths {
            offense: dir.join("offense.csv"),
            defense: dir.join("defense.csv"),
            kickers: dir.join("kickers.csv"),
            roster: dir.join("roster.csv"),
            byes: dir.join("byes.csv"),
            overrides: dir.join("overrides.csv"),
        }
    }
}

/// Everything the engine needs, loaded from disk.
#[derive(Debug, Clone, Default)]
pub struct Inputs {
    pub offense: Vec<WeeklyStats<OffenseStats>>,
    pub defense: Vec<WeeklyStats<DefenseStats>>,
    pub kickers: Vec<WeeklyStats<KickerStats>>,
    pub roster: Roster,
    pub byes: Option<ByeWeeks>,
}

fn load_optional<T>(
    path: &Path,
    what: &str,
    load: impl FnOnce(&Path) -> Result<T, LoadError>,
) -> Result<Option<T>, LoadError> {
    if !path.exists() {
        info!("no {what} file at {}, skipping", path.display());
        return Ok(None);
    }
    load(path).map(Some)
}

/// Load all inputs. Offense stats and the roster are required; defense,
/// kicker and bye-week files may be absent.
pub fn load_inputs(paths: &DataPaths) -> Result<Inputs, LoadError> {
    let offense = load_offense(&paths.offense)?;
    let roster = load_roster(&paths.roster)?;
    let defense = load_optional(&paths.defense, "defense", load_defense)?.unwrap_or_default();
    let kickers = load_optional(&paths.kickers, "kicker", load_kickers)?.unwrap_or_default();
    let byes = load_optional(&paths.byes, "bye week", load_byes)?;

    if roster.is_empty() {
        warn!("roster at {} has no usable rows", paths.roster.display());
    }
    info!(
        "loaded {} offense rows, {} defense rows, {} kicker rows, {} rostered players",
        offense.len(),
        defense.len(),
        kickers.len(),
        roster.len()
    );

    Ok(Inputs {
        offense,
        defense,
        kickers,
        roster,
        byes,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
