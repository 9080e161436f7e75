// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Command-line interface for the orgpulse binary.
//!
//! The CLI exposes subcommands for aggregating an organization into an HTML
//! summary page, re-rendering a stored snapshot, and storing the hosting
//! API credential.

use std::{
    io::{self, Write},
    path::{Path, PathBuf},
    process
};

use clap::{Args, Parser, Subcommand};
use orgpulse::{
    AggregateOptions, ApiClient, DistributionList, Error, Visibility, aggregate_organization,
    load_credential, read_snapshot, render_report, store_credential, write_report, write_snapshot
};
use tracing_subscriber::EnvFilter;

/// Command line interface for generating repository summary pages.
#[derive(Debug, Parser)]
#[command(name = "orgpulse", version, about = "Summarize repository health for an organization")]
struct Cli {
    #[command(subcommand)]
    command: Command
}

/// Supported commands exposed by the CLI.
#[derive(Debug, Subcommand)]
enum Command {
    /// Aggregate organization data and write the HTML summary page.
    Report(ReportArgs),
    /// Rebuild the HTML summary page from a stored snapshot.
    Render(RenderArgs),
    /// Store the hosting API credential in the local key file.
    Auth(AuthArgs)
}

/// Arguments accepted by the `report` subcommand.
#[derive(Debug, Args)]
struct ReportArgs {
    /// Organization whose repositories are summarized.
    #[arg(long = "org", value_name = "NAME")]
    organization: String,

    /// Explicit repository names; skips organization enumeration when given.
    #[arg(long = "repo", value_name = "NAME")]
    repositories: Vec<String>,

    /// Repository visibility included in the enumeration.
    #[arg(long, value_enum, default_value_t = Visibility::Public)]
    visibility: Visibility,

    /// Listing page size, capped at the hosting API maximum of 100.
    #[arg(long = "page-size", value_name = "COUNT", default_value_t = 100)]
    page_size: u8,

    /// Output HTML file; a pre-existing file is replaced.
    #[arg(long, value_name = "PATH", default_value = "repository_summary.html")]
    output: PathBuf,

    /// Named membership lists in label=owner/repo form.
    #[arg(long = "distribution-list", value_name = "LABEL=OWNER/REPO")]
    distribution_lists: Vec<String>,

    /// Optional JSON snapshot of the aggregated data.
    #[arg(long, value_name = "PATH")]
    snapshot: Option<PathBuf>
}

/// Arguments accepted by the `render` subcommand.
#[derive(Debug, Args)]
struct RenderArgs {
    /// Snapshot produced by a previous `report --snapshot` run.
    #[arg(long, value_name = "PATH")]
    snapshot: PathBuf,

    /// Output HTML file; a pre-existing file is replaced.
    #[arg(long, value_name = "PATH", default_value = "repository_summary.html")]
    output: PathBuf
}

/// Arguments accepted by the `auth` subcommand.
#[derive(Debug, Args)]
struct AuthArgs {
    /// Hosting account name stored in the credential.
    #[arg(long, value_name = "NAME")]
    username: String,

    /// Token value; defaults to the GITHUB_TOKEN environment variable and
    /// falls back to a terminal prompt.
    #[arg(long, value_name = "TOKEN", env = "GITHUB_TOKEN", hide_env_values = true)]
    token: Option<String>
}

/// Entry point that reports errors and sets the appropriate exit status.
#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .init();

    if let Err(error) = run().await {
        eprintln!("{}", error.to_display_string());
        process::exit(1);
    }
}

/// Executes the CLI using parsed arguments.
///
/// # Errors
///
/// Propagates errors originating from credential loading, aggregation, and
/// artifact writing.
async fn run() -> Result<(), Error> {
    let cli = Cli::parse();

    match cli.command {
        Command::Report(args) => run_report(args).await,
        Command::Render(args) => run_render(&args),
        Command::Auth(args) => run_auth(&args)
    }
}

async fn run_report(args: ReportArgs) -> Result<(), Error> {
    let options = build_options(&args)?;
    options.validate()?;

    let credential = load_credential(Path::new("."))?;
    let client = ApiClient::new(credential);

    let report = aggregate_organization(&client, &options).await?;

    if let Some(snapshot) = &args.snapshot {
        write_snapshot(snapshot, &report)?;
    }

    write_report(&args.output, &render_report(&report))
}

fn build_options(args: &ReportArgs) -> Result<AggregateOptions, Error> {
    let distribution_lists = args
        .distribution_lists
        .iter()
        .map(|descriptor| DistributionList::parse(descriptor))
        .collect::<Result<Vec<_>, _>>()?;

    let mut options = AggregateOptions::new(args.organization.clone());
    options.visibility = args.visibility;
    options.page_size = args.page_size;
    options.distribution_lists = distribution_lists;
    if !args.repositories.is_empty() {
        options.repositories = Some(args.repositories.clone());
    }

    Ok(options)
}

fn run_render(args: &RenderArgs) -> Result<(), Error> {
    let report = read_snapshot(&args.snapshot)?;
    write_report(&args.output, &render_report(&report))
}

fn run_auth(args: &AuthArgs) -> Result<(), Error> {
    let token = match &args.token {
        Some(token) => token.clone(),
        None => prompt_token()?
    };

    let path = store_credential(Path::new("."), &args.username, &token)?;
    println!("Credential stored at {}", path.display());
    Ok(())
}

fn prompt_token() -> Result<String, Error> {
    print!("Hosting API token: ");
    io::stdout()
        .flush()
        .map_err(|error| Error::service(format!("cannot prompt for token: {error}")))?;

    let mut token = String::new();
    io::stdin()
        .read_line(&mut token)
        .map_err(|error| Error::service(format!("cannot read token: {error}")))?;

    let token = token.trim().to_owned();
    if token.is_empty() {
        return Err(Error::validation("token must not be empty"));
    }
    Ok(token)
}
