use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "draftkit",
    version,
    about = "Fantasy football projections, VORP rankings and draft tiers"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Build players.json and meta.json for a target season.
    Build(BuildArgs),
    /// Check an override file against the projected player pool.
    ValidateOverrides(ValidateOverridesArgs),
}

/// Inputs shared by every command.
#[derive(Debug, Clone, Args)]
pub struct DataArgs {
    #[arg(short = 'y', long, help = "Target season")]
    pub year: i32,

    #[arg(short = 'c', long, help = "Rule set TOML (built-in defaults when omitted)")]
    pub config: Option<PathBuf>,

    #[arg(
        short = 'd',
        long,
        default_value = "data",
        help = "Directory holding offense.csv, defense.csv, kickers.csv, roster.csv, byes.csv"
    )]
    pub data_dir: PathBuf,

    #[arg(long, default_value_t = 3, help = "Number of prior seasons to blend")]
    pub lookback: u32,

    #[arg(
        long,
        value_delimiter = ',',
        default_values_t = [0.6, 0.3, 0.1],
        help = "Comma-separated blend weights, most recent season first"
    )]
    pub blend: Vec<f64>,

    #[arg(
        long = "per-game",
        overrides_with = "total",
        help = "Blend per-game rates over prior seasons (default)"
    )]
    pub per_game: bool,

    #[arg(
        long,
        overrides_with = "per_game",
        help = "Use raw totals of the target season instead of a blend"
    )]
    pub total: bool,

    #[arg(long, default_value_t = 8, help = "Minimum games for a season to count in a blend")]
    pub min_games: u32,

    #[arg(long, default_value_t = 17)]
    pub games_in_season: u32,

    #[arg(long, help = "Override CSV (defaults to overrides.csv in the data directory)")]
    pub overrides: Option<PathBuf>,
}

impl DataArgs {
    pub fn blend_mode(&self) -> bool {
        !self.total
    }
}

#[derive(Debug, Clone, Args)]
pub struct BuildArgs {
    #[command(flatten)]
    pub data: DataArgs,

    #[arg(short = 'o', long, default_value = "public")]
    pub outdir: PathBuf,

    #[arg(long, default_value_t = false, help = "Omit round/pick estimates")]
    pub no_draft_slots: bool,
}

#[derive(Debug, Clone, Args)]
pub struct ValidateOverridesArgs {
    #[command(flatten)]
    pub data: DataArgs,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_defaults() {
        let cli = Cli::try_parse_from(["draftkit", "build", "-y", "2025"]).unwrap();
        let Commands::Build(args) = cli.command else {
            panic!("expected build");
        };
        assert_eq!(args.data.year, 2025);
        assert_eq!(args.data.lookback, 3);
        assert_eq!(args.data.blend, vec![0.6, 0.3, 0.1]);
        assert_eq!(args.data.min_games, 8);
        assert_eq!(args.data.games_in_season, 17);
        assert!(args.data.blend_mode());
        assert_eq!(args.outdir, PathBuf::from("public"));
        assert!(!args.no_draft_slots);
    }

    #[test]
    fn total_flag_and_custom_blend() {
        let cli = Cli::try_parse_from([
            "draftkit",
            "build",
            "--year",
            "2024",
            "--total",
            "--blend",
            "0.7,0.3",
            "--lookback",
            "2",
            "--no-draft-slots",
        ])
        .unwrap();
        let Commands::Build(args) = cli.command else {
            panic!("expected build");
        };
        assert!(!args.data.blend_mode());
        assert_eq!(args.data.blend, vec![0.7, 0.3]);
        assert!(args.no_draft_slots);
    }

    #[test]
    fn last_mode_flag_wins() {
        let cli = Cli::try_parse_from(["draftkit", "build", "-y", "2025", "--total", "--per-game"])
            .unwrap();
        let Commands::Build(args) = cli.command else {
            panic!("expected build");
        };
        assert!(args.data.blend_mode());
    }

    #[test]
    fn validate_overrides_subcommand() {
        let cli = Cli::try_parse_from([
            "draftkit",
            "validate-overrides",
            "-y",
            "2025",
            "--overrides",
            "my.csv",
        ])
        .unwrap();
        let Commands::ValidateOverrides(args) = cli.command else {
            panic!("expected validate-overrides");
        };
        assert_eq!(args.data.overrides, Some(PathBuf::from("my.csv")));
    }

    #[test]
    fn year_is_required() {
        assert!(Cli::try_parse_from(["draftkit", "build"]).is_err());
    }
}
