// draftkit entry point.
//
// 1. Initialize tracing (stderr, so stdout stays clean for reports)
// 2. Parse the command line
// 3. Run the command

use anyhow::Context;
use clap::Parser;
use tracing::info;

use draftkit_app::cli::{Cli, Commands};
use draftkit_app::commands;

fn main() -> anyhow::Result<()> {
    init_tracing()?;
    let cli = Cli::parse();

    match cli.command {
        Commands::Build(args) => {
            let summary = commands::build(&args)?;
            info!(
                "build complete: {} players -> {}, {}",
                summary.output.players.len(),
                summary.players_path.display(),
                summary.meta_path.display()
            );
        }
        Commands::ValidateOverrides(args) => {
            let report = commands::validate(&args)?;
            print!("{}", commands::render_report(&report));
        }
    }

    Ok(())
}

fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                EnvFilter::new("draftkit=info,draftkit_app=info,draftkit_core=info,warn")
            }),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
