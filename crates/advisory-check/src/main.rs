//! advisory-check CLI - npm version advisory verification for build CLIs.

use advisory_check_core::{
    DEFAULT_WARNING_TEXT, InvocationRecord, Outcome, ScenarioConfig, ScenarioRunner, gating,
};
use anyhow::Context;
use clap::{Parser, ValueEnum};
use colored::Colorize;
use semver::Version;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "advisory-check")]
#[command(
    version,
    about = "Verify that a build CLI warns about outdated npm versions"
)]
struct Cli {
    /// CLI under test
    #[arg(long, default_value = "ng")]
    cli: PathBuf,

    /// npm binary
    #[arg(long, default_value = "npm")]
    npm: PathBuf,

    /// Existing project the update/build invocations run in
    #[arg(long, default_value = ".")]
    project_dir: PathBuf,

    /// Minimum npm version below which the advisory must fire
    #[arg(long, default_value = "7.5.6")]
    threshold: Version,

    /// Exact npm version installed for the below-threshold regime
    #[arg(long, default_value = "7.4.0")]
    low_version: Version,

    /// Install specifier for the at/above-threshold regime
    #[arg(long, default_value = ">=7.5.6")]
    high_spec: String,

    /// Literal advisory text to look for
    #[arg(long, default_value = DEFAULT_WARNING_TEXT)]
    warning_text: String,

    /// The CLI under test is a prerelease build (adds --next to update)
    #[arg(long)]
    prerelease: bool,

    /// Package manager the surrounding harness runs with
    /// (default: $ADVISORY_CHECK_PACKAGE_MANAGER, falling back to npm)
    #[arg(long)]
    package_manager: Option<String>,

    /// Output format
    #[arg(long, value_enum, default_value = "table")]
    format: Format,

    /// Print nothing on success
    #[arg(long, short = 'q', conflicts_with = "verbose")]
    quiet: bool,

    /// Print each invocation as it completes
    #[arg(long, short = 'v')]
    verbose: bool,
}

#[derive(ValueEnum, Clone, Copy, PartialEq, Eq)]
enum Format {
    Table,
    Json,
}

fn record_line(record: &InvocationRecord) -> String {
    format!("test {} ... {}", record.label, "ok".green())
}

fn print_table(records: &[InvocationRecord], quiet: bool, verbose: bool) {
    if quiet {
        return;
    }
    // Verbose mode already streamed the per-invocation lines.
    if !verbose {
        for record in records {
            println!("{}", record_line(record));
        }
    }
    println!();
    println!(
        "{} {} invocations matched their warning expectations",
        "ok.".green().bold(),
        records.len()
    );
}

fn print_json(records: &[InvocationRecord]) -> anyhow::Result<()> {
    let rendered = serde_json::to_string_pretty(records).context("failed to render JSON report")?;
    println!("{rendered}");
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let package_manager = gating::active_package_manager(cli.package_manager.as_deref());
    let config = ScenarioConfig {
        npm_program: cli.npm,
        cli_program: cli.cli,
        project_dir: cli.project_dir,
        threshold: cli.threshold,
        high_spec: cli.high_spec,
        low_version: cli.low_version,
        warning_text: cli.warning_text,
        prerelease: cli.prerelease,
        package_manager,
        ..ScenarioConfig::default()
    };

    let runner = ScenarioRunner::new(config);

    let outcome = if cli.verbose && cli.format == Format::Table {
        let mut on_step = |record: &InvocationRecord| {
            println!("{}", record_line(record));
        };
        runner.run_with_progress(Some(&mut on_step))
    } else {
        runner.run()
    }
    .context("npm advisory verification failed")?;

    match outcome {
        Outcome::Skipped { reason } => {
            if !cli.quiet {
                println!("{} {reason}", "skipped:".yellow().bold());
            }
        }
        Outcome::Completed { records } => match cli.format {
            Format::Table => print_table(&records, cli.quiet, cli.verbose),
            Format::Json => {
                if !cli.quiet {
                    print_json(&records)?;
                }
            }
        },
    }

    Ok(())
}
