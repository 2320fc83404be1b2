use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use tracing::instrument;

use crate::{
    fs::operations::write_atomically,
    grid::calendar::date_key,
    storage::transfer::{apply_import, export_day, parse_import},
    utils::clock::Clock,
};

use super::{parse_date_arg, Workspace};

#[derive(Debug, Parser)]
pub struct ExportCommand {
    #[arg(long, short, help = "Day to export, the current one by default")]
    date: Option<String>,
    #[arg(long, short, help = "File to write")]
    out: PathBuf,
}

#[derive(Debug, Parser)]
pub struct ImportCommand {
    #[arg(help = "File produced by `slotday export`")]
    file: PathBuf,
}

#[instrument(skip(workspace, clock))]
pub async fn process_export_command(
    workspace: &Workspace,
    clock: &impl Clock,
    command: ExportCommand,
) -> Result<()> {
    let slot_clock = workspace.metadata.load_settings().await?.slot_clock();
    let date = parse_date_arg(command.date.as_deref(), clock, &slot_clock)?;
    let exported_at = clock.now().with_timezone(&Utc);

    let payload = export_day(date, exported_at, &workspace.metadata, &workspace.days).await?;
    write_atomically(&command.out, &serde_json::to_vec_pretty(&payload)?).await?;

    println!("Exported {} to {:?}", date_key(date), command.out);
    Ok(())
}

#[instrument(skip(workspace))]
pub async fn process_import_command(workspace: &Workspace, command: ImportCommand) -> Result<()> {
    let contents = tokio::fs::read_to_string(&command.file)
        .await
        .with_context(|| format!("Failed to read {:?}", command.file))?;
    let import = parse_import(&contents)
        .with_context(|| format!("Rejected {:?}, nothing was changed", command.file))?;
    apply_import(&import, &workspace.dir, &workspace.days).await?;

    println!("Imported {}", date_key(import.day.date()));
    Ok(())
}
