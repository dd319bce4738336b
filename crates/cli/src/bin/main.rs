// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sqlreview_advisor::RuleRegistry;
use sqlreview_cli::{ReviewConfig, commands};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Debug, Parser)]
#[command(name = "sqlreview", version, about = "Review MySQL change batches before they run")]
struct Cli {
    /// JSON or YAML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Schema unqualified statements run in
    #[arg(short, long, global = true, default_value = "")]
    schema: String,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Review a batch file and print its rollback statements
    Review { file: PathBuf },
    /// Advise indexes for a SELECT
    Optimize { sql: String },
    /// List the built-in rules
    Rules,
}

#[tokio::main]
async fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => ReviewConfig::load(path)?,
        None => ReviewConfig::default(),
    };

    match cli.command {
        Command::Review { file } => {
            let batch = tokio::fs::read_to_string(&file)
                .await
                .with_context(|| format!("failed to read {}", file.display()))?;
            let executor = commands::connect(&config.connection).await?;
            let task = commands::review(executor, &cli.schema, &batch, &config).await?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&task)?);
            } else {
                print!("{}", commands::render_review(&task));
            }
        }
        Command::Optimize { sql } => {
            let executor = commands::connect(&config.connection).await?;
            let advice = commands::optimize(executor, &cli.schema, &sql, &config).await?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&advice)?);
            } else {
                print!("{}", commands::render_advice(&advice));
            }
        }
        Command::Rules => {
            let registry = RuleRegistry::builtin();
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&registry.rules())?);
            } else {
                print!("{}", commands::render_rules(&registry));
            }
        }
    }
    Ok(())
}
