//! CLI module for the S3 document loader
//!
//! Subcommands:
//! - `serve`: HTTP API server
//! - `load`: load one object and print its documents as JSON
//! - `regions`: list the known AWS regions

pub mod load;
pub mod regions;
pub mod serve;

use clap::{Parser, Subcommand};

use crate::config::AppConfig;
use crate::infrastructure::observability::init_tracing;

/// S3 document loader - partitions S3 objects into documents
#[derive(Parser)]
#[command(name = "s3-document-loader")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP API server
    Serve(serve::ServeArgs),

    /// Load one object and print the documents
    Load(Box<load::LoadArgs>),

    /// Print the known AWS regions
    Regions,
}

/// Read `.env`, then the layered configuration
pub(crate) fn load_config() -> anyhow::Result<AppConfig> {
    dotenvy::dotenv().ok();
    Ok(AppConfig::load()?)
}

pub(crate) fn init_observability(config: &AppConfig) {
    init_tracing(&config.logging, &config.observability.tracing);
}
