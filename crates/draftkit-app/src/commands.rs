// Command implementations behind the CLI.
//
// Each command validates its configuration before touching the data
// directory, so a bad rule set or blend vector fails without any load.

use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::{info, warn};

use draftkit_core::config::{BlendParams, RuleSet};
use draftkit_core::overrides::{validate_overrides, OverrideEntry, OverrideReport};
use draftkit_core::valuation::tiers::DEFAULT_K_MAX;

use crate::cli::{BuildArgs, DataArgs, ValidateOverridesArgs};
use crate::diagnostics;
use crate::export::{self, BuildMeta};
use crate::loaders::{self, DataPaths, Inputs};
use crate::pipeline::{self, BuildOutput, ProjectionMode};

/// Rule set used when no config file is given.
pub const DEFAULT_RULES_TOML: &str = include_str!("../defaults/rules.toml");

pub fn load_rules(path: Option<&Path>) -> anyhow::Result<RuleSet> {
    let rules = match path {
        Some(p) => RuleSet::load(p)
            .with_context(|| format!("failed to load rule set {}", p.display()))?,
        None => RuleSet::from_toml_str(DEFAULT_RULES_TOML)
            .context("built-in rule set is invalid")?,
    };
    info!(
        "rule set '{}': {} teams, FLEX from {:?}",
        rules.name, rules.league.teams, rules.league.flex_positions
    );
    Ok(rules)
}

/// Resolve the projection mode. Blend weights are checked here, before any
/// data is read.
pub fn projection_mode(args: &DataArgs) -> anyhow::Result<ProjectionMode> {
    if !args.blend_mode() {
        return Ok(ProjectionMode::SeasonTotals { season: args.year });
    }
    let params = BlendParams::for_target(
        args.year,
        args.lookback,
        args.blend.clone(),
        args.min_games,
        args.games_in_season,
    )
    .context("invalid blend configuration")?;
    info!(
        "blending seasons {:?} with weights {:?}",
        params.years(),
        params.weights()
    );
    Ok(ProjectionMode::Blend(params))
}

fn overrides_path(args: &DataArgs, paths: &DataPaths) -> PathBuf {
    args.overrides
        .clone()
        .unwrap_or_else(|| paths.overrides.clone())
}

/// Everything a command needs once configuration and data are loaded.
struct Prepared {
    rules: RuleSet,
    mode: ProjectionMode,
    inputs: Inputs,
    overrides: Vec<OverrideEntry>,
}

fn prepare(args: &DataArgs) -> anyhow::Result<Prepared> {
    let rules = load_rules(args.config.as_deref())?;
    let mode = projection_mode(args)?;

    let paths = DataPaths::in_dir(&args.data_dir);
    let inputs = loaders::load_inputs(&paths)
        .with_context(|| format!("failed to load data from {}", args.data_dir.display()))?;
    let overrides = loaders::load_overrides(&overrides_path(args, &paths))
        .context("failed to load overrides")?;

    Ok(Prepared {
        rules,
        mode,
        inputs,
        overrides,
    })
}

/// Result of a build, for the caller to report.
#[derive(Debug)]
pub struct BuildSummary {
    pub output: BuildOutput,
    pub players_path: PathBuf,
    pub meta_path: PathBuf,
}

pub fn build(args: &BuildArgs) -> anyhow::Result<BuildSummary> {
    let Prepared {
        rules,
        mode,
        inputs,
        overrides,
    } = prepare(&args.data)?;

    let scored = pipeline::project(&inputs, &rules, &mode);
    for w in &validate_overrides(&overrides, &scored).warnings {
        warn!("override: {w}");
    }

    let output = pipeline::rank(scored, &rules, &overrides, DEFAULT_K_MAX);
    info!("ranked {} players", output.players.len());
    if output.players.is_empty() {
        warn!("no players survived projection; check the data directory and season");
    }

    let diag = diagnostics::summarize(&output.players, &output.replacement);
    diag.log();
    if matches!(mode, ProjectionMode::Blend(_)) {
        println!("{}", diag.render());
    }

    let meta = BuildMeta::new(args.data.year, &mode, &rules, output.players.len());
    let (players_path, meta_path) = export::write_outputs(
        &args.outdir,
        &output.players,
        &meta,
        rules.league.teams,
        !args.no_draft_slots,
    )?;

    Ok(BuildSummary {
        output,
        players_path,
        meta_path,
    })
}

pub fn validate(args: &ValidateOverridesArgs) -> anyhow::Result<OverrideReport> {
    let Prepared {
        rules,
        mode,
        inputs,
        overrides,
    } = prepare(&args.data)?;
    let scored = pipeline::project(&inputs, &rules, &mode);
    Ok(validate_overrides(&overrides, &scored))
}

/// Human-readable override report.
pub fn render_report(report: &OverrideReport) -> String {
    let mut out = format!(
        "{} overrides, {} matched, {} warnings\n",
        report.override_count,
        report.matched,
        report.warnings.len()
    );
    for w in &report.warnings {
        out.push_str("  - ");
        out.push_str(&w.to_string());
        out.push('\n');
    }
    out
}
