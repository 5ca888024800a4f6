// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use artifacts::Format;
use artifacts::catalog::Source;
use clap::{Parser, Subcommand};

use cmd::commands::{
    catalog_command, exists_command, get_command, list_command, publish_command, put_command,
    query_command, remove_command, show_command,
};
use cmd::common::StoreContext;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(name = "dashdata")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// YAML file with bucket credentials; environment variables are used otherwise
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Check whether an object exists (exit status 1 when it does not)
    Exists { key: String },
    /// List keys under a prefix
    Ls {
        #[arg(default_value = "")]
        prefix: String,
    },
    /// Download an object to a local file or directory
    Get { key: String, dest: PathBuf },
    /// Upload a local file
    Put {
        source: PathBuf,
        key: String,
        /// Log when an existing object is replaced
        #[arg(long)]
        overwrite: bool,
    },
    /// Delete an object
    Rm { key: String },
    /// Load an artifact and print it
    Show {
        key: String,
        /// parquet, spreadsheet, json or csv; inferred from the key by default
        #[arg(short, long)]
        format: Option<Format>,
        /// Maximum table rows to print
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Run SQL against a parquet or CSV artifact registered as `artifact`
    Query {
        key: String,
        sql: String,
        #[arg(short, long)]
        format: Option<Format>,
    },
    /// Publish a local .csv or .json file as a model result
    Publish {
        namespace: String,
        kind: String,
        source: PathBuf,
        /// Object name; defaults to <kind>_results_<timestamp>
        #[arg(long)]
        name: Option<String>,
        /// Timestamp used in the default name
        #[arg(long)]
        timestamp: Option<String>,
    },
    /// List the datasets read by the dashboard
    Catalog {
        /// Only show transform outputs from this pipeline (duckdb or pandas)
        #[arg(long)]
        source: Option<Source>,
        /// Probe the bucket for each dataset (exit status 1 if any is missing)
        #[arg(long)]
        check: bool,
    },
}

async fn run(cli: Cli, out: &mut impl Write) -> Result<ExitCode> {
    let ctx = StoreContext::connect(cli.config)?;

    match cli.command {
        Commands::Exists { key } => {
            let found = exists_command(ctx.client(), &key, out).await?;
            return Ok(if found {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            });
        }
        Commands::Ls { prefix } => list_command(ctx.client(), &prefix, out).await?,
        Commands::Get { key, dest } => get_command(ctx.client(), &key, &dest, out).await?,
        Commands::Put {
            source,
            key,
            overwrite,
        } => put_command(ctx.client(), &source, &key, overwrite, out).await?,
        Commands::Rm { key } => remove_command(ctx.client(), &key, out).await?,
        Commands::Show { key, format, limit } => {
            show_command(&ctx.loader(), &key, format, limit, out).await?;
        }
        Commands::Query { key, sql, format } => {
            query_command(&ctx.loader(), &key, &sql, format, out).await?;
        }
        Commands::Publish {
            namespace,
            kind,
            source,
            name,
            timestamp,
        } => {
            publish_command(
                &ctx.publisher(),
                &namespace,
                &kind,
                &source,
                name.as_deref(),
                timestamp.as_deref(),
                out,
            )
            .await?;
        }
        Commands::Catalog { source, check } => {
            let missing = catalog_command(ctx.client(), source, check, out).await?;
            if missing > 0 {
                log::warn!("{} datasets missing from the bucket", missing);
                return Ok(ExitCode::FAILURE);
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    env_logger::init();

    let cli = Cli::parse();
    let stdout = io::stdout();
    let mut out = stdout.lock();
    run(cli, &mut out).await
}
