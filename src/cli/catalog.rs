use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use tracing::{info, instrument};

use crate::{
    actions::delete_event,
    grid::{calendar::date_key, parse_clock},
    model::{
        catalog::UNCATEGORIZED_LABEL, Catalog, EventTag, RecentEvents, Settings, ThemeMode,
    },
    storage::day_storage::DayLogStorage,
    utils::clock::Clock,
};

use super::{parse_date_arg, Workspace};

#[derive(Debug, Subcommand)]
pub enum CategoryCommand {
    #[command(about = "Add a category. Its id is derived from the name")]
    Add { name: String },
    #[command(about = "Delete a category. Its events are kept and show up as uncategorized")]
    Delete { id: String },
    #[command(about = "List categories with their events")]
    List,
}

#[derive(Debug, Subcommand)]
pub enum EventCommand {
    #[command(about = "Add an event to a category")]
    Add {
        #[arg(long, short, help = "Category id")]
        category: String,
        #[arg(long, short, help = "Without a name the event tags the category itself")]
        name: Option<String>,
        #[arg(long, help = "Carry the event over with `slotday copy-fixed`")]
        fixed: bool,
    },
    #[command(about = "Delete an event and empty its slots in one day")]
    Delete {
        id: String,
        #[arg(long, short, help = "Day whose slots are emptied, the current one by default")]
        date: Option<String>,
    },
    #[command(about = "List categories with their events")]
    List,
}

#[derive(Debug, Parser)]
pub struct SettingsCommand {
    #[arg(long, help = "Start of the night range, HH:MM")]
    night_start: Option<String>,
    #[arg(long, help = "End of the night range, HH:MM")]
    night_end: Option<String>,
    #[arg(long)]
    theme: Option<ThemeMode>,
    #[arg(
        long,
        value_parser = clap::value_parser!(u32).range(0..24),
        help = "Hour at which slot 0 starts"
    )]
    day_start: Option<u32>,
}

fn format_event(event: &EventTag) -> String {
    let name = event.name.as_deref().unwrap_or("(category only)");
    let fixed = if event.fixed { "\tfixed" } else { "" };
    format!("  {}\t{name}{fixed}", event.id)
}

/// Categories in insertion order, each followed by its events. Events of deleted categories
/// are listed last.
pub fn format_catalog(catalog: &Catalog) -> Vec<String> {
    let mut lines = vec![];
    for category in &catalog.categories {
        lines.push(format!("{}\t{}", category.id, category.name));
        lines.extend(catalog.events_in(&category.id).map(format_event));
    }
    let orphans = catalog
        .events
        .iter()
        .filter(|v| catalog.category(&v.category_id).is_none())
        .map(format_event)
        .collect::<Vec<_>>();
    if !orphans.is_empty() {
        lines.push(UNCATEGORIZED_LABEL.to_string());
        lines.extend(orphans);
    }
    lines
}

pub fn format_recent(recent: &RecentEvents, catalog: &Catalog) -> Vec<String> {
    recent
        .iter()
        .map(|v| format!("{v}\t{}", catalog.event_label(v)))
        .collect()
}

pub fn format_settings(settings: &Settings) -> Vec<String> {
    vec![
        format!("night-start\t{}", settings.night_start.format("%H:%M")),
        format!("night-end\t{}", settings.night_end.format("%H:%M")),
        format!("theme\t{}", settings.theme_mode),
        format!("day-start\t{:02}:00", settings.day_start_hour),
    ]
}

/// Returns whether anything changed.
fn apply_settings(settings: &mut Settings, command: &SettingsCommand) -> Result<bool> {
    let before = settings.clone();
    if let Some(value) = &command.night_start {
        settings.night_start = parse_clock(value)?;
    }
    if let Some(value) = &command.night_end {
        settings.night_end = parse_clock(value)?;
    }
    if let Some(theme) = command.theme {
        settings.theme_mode = theme;
    }
    if let Some(hour) = command.day_start {
        settings.day_start_hour = hour;
    }
    Ok(*settings != before)
}

fn print_lines(lines: Vec<String>) {
    for line in lines {
        println!("{line}");
    }
}

#[instrument(skip(workspace))]
pub async fn process_category_command(
    workspace: &Workspace,
    command: CategoryCommand,
) -> Result<()> {
    let mut catalog = workspace.metadata.load_catalog().await?;
    match command {
        CategoryCommand::Add { name } => {
            let id = catalog.add_category(&name)?;
            workspace.metadata.save_catalog(&catalog).await?;
            info!("Added category {id}");
            println!("{id}");
        }
        CategoryCommand::Delete { id } => {
            let removed = catalog
                .delete_category(&id)
                .ok_or_else(|| anyhow!("Unknown category {id}"))?;
            workspace.metadata.save_catalog(&catalog).await?;
            info!("Deleted category {id}");
            println!("Deleted {}", removed.name);
        }
        CategoryCommand::List => print_lines(format_catalog(&catalog)),
    }
    Ok(())
}

#[instrument(skip(workspace, clock))]
pub async fn process_event_command(
    workspace: &Workspace,
    clock: &impl Clock,
    command: EventCommand,
) -> Result<()> {
    let mut catalog = workspace.metadata.load_catalog().await?;
    match command {
        EventCommand::Add {
            category,
            name,
            fixed,
        } => {
            let id = catalog.add_event(&category, name.as_deref(), fixed)?;
            workspace.metadata.save_catalog(&catalog).await?;
            info!("Added event {id}");
            println!("{id}");
        }
        EventCommand::Delete { id, date } => {
            let slot_clock = workspace.metadata.load_settings().await?.slot_clock();
            let date = parse_date_arg(date.as_deref(), clock, &slot_clock)?;
            let mut day = workspace.days.load_day(date).await?;
            let (removed, cleared) = delete_event(&mut catalog, &mut day, &id)
                .ok_or_else(|| anyhow!("Unknown event {id}"))?;

            workspace.metadata.save_catalog(&catalog).await?;
            if cleared > 0 {
                workspace.days.save_day(&day).await?;
            }
            println!(
                "Deleted {}, emptied {cleared} slots on {}",
                removed.id,
                date_key(date)
            );
        }
        EventCommand::List => print_lines(format_catalog(&catalog)),
    }
    Ok(())
}

pub async fn process_recent_command(workspace: &Workspace) -> Result<()> {
    let catalog = workspace.metadata.load_catalog().await?;
    let recent = workspace.metadata.load_recent().await?;
    print_lines(format_recent(&recent, &catalog));
    Ok(())
}

#[instrument(skip(workspace))]
pub async fn process_settings_command(
    workspace: &Workspace,
    command: SettingsCommand,
) -> Result<()> {
    let mut settings = workspace.metadata.load_settings().await?;
    if apply_settings(&mut settings, &command)? {
        workspace.metadata.save_settings(&settings).await?;
        info!("Settings changed to {settings:?}");
    }
    print_lines(format_settings(&settings));
    Ok(())
}
