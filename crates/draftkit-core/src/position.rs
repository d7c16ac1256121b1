// Fantasy football positions.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Draftable positions. Declaration order is the display order used by
/// diagnostics and by every per-position map in the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Position {
    QB,
    RB,
    WR,
    TE,
    #[serde(alias = "PK")]
    K,
    /// Team defense / special teams.
    #[serde(rename = "DEF", alias = "DST", alias = "D/ST")]
    Dst,
}

impl Position {
    pub const ALL: [Position; 6] = [
        Position::QB,
        Position::RB,
        Position::WR,
        Position::TE,
        Position::K,
        Position::Dst,
    ];

    /// Parse a position string as it appears in roster and override files.
    ///
    /// Matching is case-insensitive. Returns `None` for positions this
    /// engine does not rank (OL, LB, CB, ...).
    pub fn from_str_pos(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "QB" => Some(Position::QB),
            "RB" | "HB" | "FB" => Some(Position::RB),
            "WR" => Some(Position::WR),
            "TE" => Some(Position::TE),
            "K" | "PK" => Some(Position::K),
            "DST" | "DEF" | "D/ST" => Some(Position::Dst),
            _ => None,
        }
    }

    /// Return the display string for this position.
    pub fn display_str(&self) -> &'static str {
        match self {
            Position::QB => "QB",
            Position::RB => "RB",
            Position::WR => "WR",
            Position::TE => "TE",
            Position::K => "K",
            Position::Dst => "DEF",
        }
    }

    /// QB, RB, WR and TE. These are scored from individual offensive stat lines.
    pub fn is_offense(&self) -> bool {
        matches!(
            self,
            Position::QB | Position::RB | Position::WR | Position::TE
        )
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_str())
    }
}
