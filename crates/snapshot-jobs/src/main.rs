//! snapshot-jobs entry point.

use std::path::PathBuf;

use anyhow::Result;
use clap::error::ErrorKind;
use clap::Parser;

use snapshot_jobs::config::{self, AllowLists, SnapshotConfig};
use snapshot_jobs::jobs::job_config_json;
use snapshot_jobs::output::{self, ActionsOutput, JOB_CONFIG_OUTPUT};
use snapshot_jobs::{pipeline, HttpClient};

#[derive(Parser)]
#[command(
    name = "snapshot-jobs",
    about = "Crawl the OpenWrt snapshot targets and emit a build job matrix",
    version
)]
struct Cli {
    /// Release tag to crawl. Only "SNAPSHOT" is supported.
    tag: Option<String>,

    /// Extra positional arguments are accepted and ignored.
    #[arg(hide = true)]
    rest: Vec<String>,

    /// Root of the target tree (also read from SNAPSHOT_BASE_URL).
    #[arg(long)]
    base_url: Option<String>,

    /// Allowed target; repeat to list several. Replaces the built-in list.
    #[arg(long = "target")]
    targets: Vec<String>,

    /// Allowed subtarget; repeat to list several. Replaces the built-in list.
    #[arg(long = "subtarget")]
    subtargets: Vec<String>,

    /// Only fetch metadata for allowed pairs.
    #[arg(long)]
    listed_only: bool,

    /// File to append step outputs to (defaults to $GITHUB_OUTPUT).
    #[arg(long)]
    output_file: Option<PathBuf>,

    /// Also print the job list as pretty JSON on stdout. Without an output
    /// file it follows the `::set-output` line on the same stream.
    #[arg(long)]
    json: bool,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp
            | ErrorKind::DisplayVersion
            | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => e.exit(),
            _ => {
                eprint!("{e}");
                output::set_failed(&usage_error_message(&e));
                std::process::exit(1);
            }
        },
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = run(cli).await;

    // 0 = job-config written, 1 = any fatal error
    if let Err(e) = &result {
        eprintln!("Error: {e}");
        output::set_failed(&e.to_string());
        std::process::exit(1);
    }

    result
}

/// First line of a clap error, without its `error: ` prefix.
fn usage_error_message(e: &clap::Error) -> String {
    let rendered = e.to_string();
    let first = rendered.lines().next().unwrap_or_default();
    first.strip_prefix("error: ").unwrap_or(first).to_string()
}

async fn run(cli: Cli) -> Result<()> {
    // Checked before anything touches the network.
    let version = config::validate_version(cli.tag.as_deref())?;
    if !cli.rest.is_empty() {
        tracing::debug!("Ignoring extra arguments: {:?}", cli.rest);
    }
    let base_url = config::resolve_base_url(cli.base_url.as_deref())?;
    let allow = AllowLists::with_overrides(&cli.targets, &cli.subtargets);
    let config = SnapshotConfig::new(version, base_url, allow).with_listed_only(cli.listed_only);

    let client = HttpClient::new();
    let jobs = pipeline::run(&client, &config).await?;

    let job_config = job_config_json(&jobs)?;
    ActionsOutput::resolve(cli.output_file.as_deref()).set_output(JOB_CONFIG_OUTPUT, &job_config)?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&jobs)?);
    }

    Ok(())
}
