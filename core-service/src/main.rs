use anyhow::Context;
use clap::Parser;
use core_runtime::logging::{init_logging, strip_path};
use core_service::cli::{Cli, Commands};
use core_service::{commands_list, CoreDependencies, CoreService};
use std::path::Path;
use tokio::io::AsyncReadExt;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.logging_config()?).context("failed to initialise logging")?;

    match cli.command {
        Commands::Commands => {
            println!("{}", serde_json::to_string_pretty(&commands_list())?);
        }
        Commands::Run { payload } => {
            let raw = read_payload(&payload).await?;
            let service = CoreService::new(CoreDependencies::native()?);

            let result = service
                .dispatch_json(&raw)
                .await
                .context("command failed")?;
            tracing::info!(
                created = result.created,
                updated = result.updated,
                failed = result.failed,
                "command finished"
            );
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
    }

    Ok(())
}

async fn read_payload(path: &Path) -> anyhow::Result<String> {
    tracing::debug!(payload = %strip_path(&path.to_string_lossy()), "Reading command event");

    if path == Path::new("-") {
        let mut raw = String::new();
        tokio::io::stdin()
            .read_to_string(&mut raw)
            .await
            .context("failed to read payload from stdin")?;
        return Ok(raw);
    }

    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read payload {}", path.display()))
}
