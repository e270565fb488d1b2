use clap::Parser;
use s3_document_loader::cli::{self, Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Serve(args) => cli::serve::run(args).await,
        Command::Load(args) => cli::load::run(*args).await,
        Command::Regions => cli::regions::run(),
    }
}
