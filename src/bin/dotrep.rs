// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

use dotrep::{
    config::Settings,
    consolidate::Side,
    path::default_config_path,
    pipeline::{run, Output},
    report::export::save_outputs,
    status::{overrides::FixtureMode, unmatched::UnmatchedItem},
};

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::{path::PathBuf, process::exit};
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Debug, Clone, Parser)]
#[command(
    about,
    override_usage = "dotrep [options] <command>",
    subcommand_help_heading = "Commands",
    version
)]
struct Cli {
    /// Path to settings file.
    #[arg(short, long, global = true, value_name = "path")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    fn run(self) -> Result<()> {
        let path = match self.config {
            Some(path) => path,
            None => default_config_path()?,
        };
        let settings = Settings::load(path)?.with_env_overrides();

        match self.command {
            Command::Report(opts) => run_report(settings, opts),
            Command::Status(opts) => run_status(settings, opts),
            Command::Unmatched => run_unmatched(settings),
        }
    }
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// Build report and write it to the output directory.
    #[command(override_usage = "dotrep report [options]")]
    Report(ReportOptions),

    /// Print report rows.
    #[command(override_usage = "dotrep status [options]")]
    Status(StatusOptions),

    /// Print items found only in home or only in the config index.
    #[command(override_usage = "dotrep unmatched")]
    Unmatched,
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct ReportOptions {
    /// Keep enabled test fixtures in the report.
    #[arg(long)]
    pub show_fixtures: bool,

    /// Skip Markdown report.
    #[arg(long)]
    pub no_markdown: bool,

    /// Skip report CSV.
    #[arg(long)]
    pub no_csv: bool,

    /// Also write the full table as CSV.
    #[arg(long)]
    pub full_csv: bool,
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct StatusOptions {
    /// Keep enabled test fixtures in the listing.
    #[arg(long)]
    pub show_fixtures: bool,
}

fn main() {
    let layer = fmt::layer()
        .compact()
        .with_target(false)
        .without_time();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(layer)
        .with(filter)
        .init();

    if let Err(error) = Cli::parse().run() {
        error!("{error:?}");
        exit(1);
    }

    exit(0)
}

fn fixture_mode(show_fixtures: bool) -> FixtureMode {
    if show_fixtures {
        FixtureMode::Show
    } else {
        FixtureMode::from_env()
    }
}

fn run_report(mut settings: Settings, opts: ReportOptions) -> Result<()> {
    settings.report.markdown &= !opts.no_markdown;
    settings.report.csv &= !opts.no_csv;
    settings.report.full_csv |= opts.full_csv;

    let output = run(&settings, fixture_mode(opts.show_fixtures))?;
    let written = save_outputs(&output, &settings.report);
    info!("wrote {} report files", written.len());

    if !output.mismatches.is_empty() {
        warn!(
            "{} fixtures disagree with their expected dot state",
            output.mismatches.len()
        );
    }

    Ok(())
}

fn run_status(settings: Settings, opts: StatusOptions) -> Result<()> {
    let Output { report, .. } = run(&settings, fixture_mode(opts.show_fixtures))?;

    for row in &report.rows {
        let item = &row.item;
        println!(
            "{:>4} {} {:<32} {:<6} {:<8} {:<7} {}",
            row.sort_out,
            row.matching.symbol(),
            row.name(),
            item.item_type.map(|kind| kind.to_string()).unwrap_or_default(),
            row.dot_state.as_str(),
            item.scope().map(|scope| scope.to_string()).unwrap_or_default(),
            row.alert.as_deref().unwrap_or_default(),
        );
        if let (Some(repo), Some(home)) = (item.name_on(Side::Repo), item.name_on(Side::Home)) {
            if repo != home {
                println!("       {repo} -> {home}");
            }
        }
    }

    let counts = report
        .state_counts()
        .iter()
        .map(|(state, count)| format!("{state}: {count}"))
        .collect::<Vec<_>>();
    println!("\n{} items ({})", report.len(), counts.join(", "));

    Ok(())
}

fn run_unmatched(settings: Settings) -> Result<()> {
    let Output { unmatched, .. } = run(&settings, FixtureMode::from_env())?;

    print_unmatched("home items not in config", &unmatched.home_not_in_config);
    println!();
    print_unmatched("config items not in home", &unmatched.config_not_in_home);

    Ok(())
}

fn print_unmatched(heading: &str, items: &[UnmatchedItem]) {
    println!("{heading} ({}):", items.len());
    for item in items {
        let item_type = item.item_type.map(|item_type| item_type.to_string());
        match &item.comment {
            Some(comment) => println!(
                "  {:<32} {:<12} {comment}",
                item.name,
                item_type.unwrap_or_default()
            ),
            None => println!("  {:<32} {}", item.name, item_type.unwrap_or_default()),
        }
    }
}
