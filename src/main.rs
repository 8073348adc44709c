use std::process::ExitCode;

use anyhow::Context as _;
use clap::Parser as _;

use mangashelf::cli::{Cli, Command};

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(err) = try_main().await {
        eprintln!("{err:#}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

async fn try_main() -> anyhow::Result<()> {
    mangashelf::logging::init().context("init logging")?;

    let cli = Cli::parse();
    tracing::debug!(?cli, "parsed cli");

    match cli.command {
        Command::Serve(args) => mangashelf::app::serve(args).await.context("serve")?,
        Command::Read(args) => mangashelf::commands::read(args).await.context("read")?,
        Command::Chapters(args) => mangashelf::commands::chapters(args)
            .await
            .context("chapters")?,
        Command::Pages(args) => mangashelf::commands::pages(args).context("pages")?,
    }

    Ok(())
}
