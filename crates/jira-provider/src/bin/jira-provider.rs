//! Jira provider CLI - manage Jira resources from JSON state documents.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::{Map, Value};
use tracing::info;
use tracing_subscriber::EnvFilter;

use jira_provider::{reconcile, DynResource, Provider, ProviderConfig};

/// Jira provider CLI.
#[derive(Parser)]
#[command(name = "jira-provider")]
#[command(about = "Create, refresh and delete Jira resources declaratively")]
struct Cli {
    /// Jira site URL (or set `JIRA_URL` env var).
    #[arg(long, env = "JIRA_URL")]
    url: Option<String>,

    /// Account email for basic auth (or set `JIRA_USER` env var).
    #[arg(long, env = "JIRA_USER")]
    user: Option<String>,

    /// API token for basic auth (or set `JIRA_PASSWORD` env var).
    #[arg(long, env = "JIRA_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Atlassian Admin API token (or set `JIRA_TOKEN` env var).
    #[arg(long, env = "JIRA_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Enable verbose logging.
    #[arg(short, long, default_value = "false")]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List registered resource types.
    Resources,

    /// Create a resource from a desired-state document.
    Create {
        /// Resource type (e.g., `jira_issue`).
        #[arg(long = "type")]
        resource_type: String,

        /// JSON file with the desired state.
        #[arg(long)]
        config: PathBuf,
    },

    /// Refresh a stored state document from Jira.
    Read {
        /// Resource type.
        #[arg(long = "type")]
        resource_type: String,

        /// JSON file with the current state.
        #[arg(long)]
        state: PathBuf,

        /// Write the refreshed state back to the state file.
        #[arg(long, default_value = "false")]
        write: bool,
    },

    /// Apply changes between stored and desired state.
    Update {
        /// Resource type.
        #[arg(long = "type")]
        resource_type: String,

        /// JSON file with the current state.
        #[arg(long)]
        state: PathBuf,

        /// JSON file with the desired state.
        #[arg(long)]
        config: PathBuf,
    },

    /// Delete the resource described by a state document.
    Delete {
        /// Resource type.
        #[arg(long = "type")]
        resource_type: String,

        /// JSON file with the current state.
        #[arg(long)]
        state: PathBuf,
    },

    /// Import an existing resource by id.
    Import {
        /// Resource type.
        #[arg(long = "type")]
        resource_type: String,

        /// Remote id (issue id, account id or email, group name, `account/group`).
        #[arg(long)]
        id: String,
    },

    /// Reconcile declared custom fields against observed values offline.
    Reconcile {
        /// JSON object of field name to declared string.
        #[arg(long)]
        declared: PathBuf,

        /// JSON object of field name to observed value.
        #[arg(long)]
        observed: PathBuf,
    },
}

fn read_json(path: &Path) -> Result<Value> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Failed to parse {}", path.display()))
}

fn print_json(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn provider(cli: &Cli) -> Result<Provider> {
    let config = ProviderConfig::new(
        cli.url.clone().context("--url or JIRA_URL is required")?,
        cli.user.clone().context("--user or JIRA_USER is required")?,
        cli.password
            .clone()
            .context("--password or JIRA_PASSWORD is required")?,
        cli.token.clone(),
    );
    Provider::configure(&config).context("Failed to configure provider")
}

fn run_reconcile(declared: &Path, observed: &Path) -> Result<()> {
    let declared: BTreeMap<String, String> = serde_json::from_value(read_json(declared)?)
        .context("Declared fields must be an object of strings")?;
    let observed: Map<String, Value> = serde_json::from_value(read_json(observed)?)
        .context("Observed fields must be an object")?;

    let reconciled = reconcile(&declared, &observed)?;
    print_json(&serde_json::to_value(reconciled)?)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match &cli.command {
        Commands::Reconcile { declared, observed } => run_reconcile(declared, observed)?,

        Commands::Resources => {
            let provider = provider(&cli)?;
            for name in provider.resource_types() {
                println!("{name}");
            }
        }

        Commands::Create {
            resource_type,
            config,
        } => {
            let provider = provider(&cli)?;
            let state = provider
                .resource(resource_type)?
                .create(read_json(config)?)
                .await
                .with_context(|| format!("Failed to create {resource_type}"))?;
            print_json(&state)?;
        }

        Commands::Read {
            resource_type,
            state,
            write,
        } => {
            let provider = provider(&cli)?;
            let refreshed = provider
                .resource(resource_type)?
                .read(read_json(state)?)
                .await
                .with_context(|| format!("Failed to read {resource_type}"))?;

            match refreshed {
                Some(refreshed) => {
                    if *write {
                        std::fs::write(state, serde_json::to_string_pretty(&refreshed)?)
                            .with_context(|| format!("Failed to write {}", state.display()))?;
                        info!(path = %state.display(), "State file updated");
                    }
                    print_json(&refreshed)?;
                }
                None => println!("{resource_type} no longer exists"),
            }
        }

        Commands::Update {
            resource_type,
            state,
            config,
        } => {
            let provider = provider(&cli)?;
            let updated = provider
                .resource(resource_type)?
                .update(read_json(state)?, read_json(config)?)
                .await
                .with_context(|| format!("Failed to update {resource_type}"))?;
            print_json(&updated)?;
        }

        Commands::Delete {
            resource_type,
            state,
        } => {
            let provider = provider(&cli)?;
            provider
                .resource(resource_type)?
                .delete(read_json(state)?)
                .await
                .with_context(|| format!("Failed to delete {resource_type}"))?;
            println!("{resource_type} deleted");
        }

        Commands::Import { resource_type, id } => {
            let provider = provider(&cli)?;
            let state = provider
                .resource(resource_type)?
                .import(id)
                .await
                .with_context(|| format!("Failed to import {resource_type} {id}"))?;
            print_json(&state)?;
        }
    }

    Ok(())
}
