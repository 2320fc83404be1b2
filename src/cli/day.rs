use std::{ops::Range, path::PathBuf};

use ansi_term::{Colour, Style};
use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use tracing::{instrument, warn};

use crate::{
    actions::{apply_event, clear_slots, copy_fixed_from, fill_night},
    gesture::{GestureRecognizer, GestureState, GridLayout, PointerInput},
    grid::{
        calendar::{add_days, date_key},
        Selection, SlotClock, SLOT_MINUTES,
    },
    model::{Catalog, DayLog, EventId},
    palette::{color_for, Hsl},
    segments::{compress, rows, SegmentPiece},
    storage::day_storage::DayLogStorage,
    utils::clock::{current_slot, operational_day, Clock},
};

use super::{format_minutes, parse_date_arg, validation_error, SlotRangeArgs, Workspace};

/// Slots per printed row, two hours.
pub const ROW_SLOTS: usize = 8;
const CELL_WIDTH: usize = 6;
const EMPTY_CELL: &str = "   .  ";

#[derive(Debug, Parser)]
pub struct ShowCommand {
    #[arg(long, short, help = "Day to show, \"2025-03-14\", \"yesterday\", \"14/03/2025\"")]
    date: Option<String>,
    #[arg(long, help = "Don't use colours")]
    plain: bool,
}

#[derive(Debug, Parser)]
pub struct TagCommand {
    #[arg(long, short, help = "Event id, see `slotday event list`")]
    event: String,
    #[arg(long, short, help = "Day to tag, the current one by default")]
    date: Option<String>,
    #[command(flatten)]
    range: SlotRangeArgs,
    #[arg(
        long,
        conflicts_with_all = ["from", "to", "slots"],
        help = "File with one JSON pointer input per line. The selection it produces is tagged"
    )]
    trace: Option<PathBuf>,
}

#[derive(Debug, Parser)]
pub struct ClearCommand {
    #[arg(long, short)]
    date: Option<String>,
    #[command(flatten)]
    range: SlotRangeArgs,
}

#[derive(Debug, Parser)]
pub struct FillNightCommand {
    #[arg(long, short, help = "Event id used for the night, usually sleep")]
    event: String,
    #[arg(long, short)]
    date: Option<String>,
}

#[derive(Debug, Parser)]
pub struct CopyFixedCommand {
    #[arg(long, short, help = "Day receiving the copy; the day before it is the source")]
    date: Option<String>,
}

fn describe(selection: &Selection, slot_clock: &SlotClock) -> String {
    format!(
        "{}-{} ({})",
        slot_clock.slot_to_time(selection.first()),
        slot_clock.slot_to_time(selection.last() + 1),
        format_minutes(selection.len() as u32 * SLOT_MINUTES)
    )
}

fn known_event(catalog: &Catalog, id: &str) -> Result<EventId> {
    catalog
        .event(id)
        .map(|v| v.id.clone())
        .ok_or_else(|| validation_error(format!("Unknown event {id}, see `slotday event list`")))
}

fn required_selection(range: &SlotRangeArgs, slot_clock: &SlotClock) -> Result<Selection> {
    range.selection(slot_clock)?.ok_or_else(|| {
        validation_error("Pass either --from and --to, or --slots".to_string())
    })
}

/// Feeds a recorded pointer trace through a recognizer and returns what it selected.
pub fn replay_trace(contents: &str, layout: GridLayout) -> Result<Selection> {
    let mut recognizer = GestureRecognizer::new(layout);
    for (index, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let input: PointerInput = serde_json::from_str(line)
            .with_context(|| format!("Line {} of the trace is not a pointer input", index + 1))?;
        recognizer.handle(input);
    }
    if recognizer.state() != GestureState::Idle {
        warn!("Trace ended in {:?} without a release", recognizer.state());
    }
    recognizer
        .selection()
        .ok_or_else(|| anyhow!("Trace didn't select any slot"))
}

fn paint(text: &str, fill: Hsl, accent: Hsl) -> String {
    let (r, g, b) = fill.to_rgb();
    let (ar, ag, ab) = accent.to_rgb();
    Style::new()
        .on(Colour::RGB(r, g, b))
        .fg(Colour::RGB(ar, ag, ab))
        .paint(text)
        .to_string()
}

fn render_piece(piece: &SegmentPiece, catalog: &Catalog, dark: bool, colored: bool) -> String {
    let inner = (piece.end - piece.start) * CELL_WIDTH - 2;
    let left = if piece.is_start_here { '[' } else { ' ' };
    let right = if piece.is_end_here { ']' } else { ' ' };
    let label = if piece.is_start_here {
        catalog
            .event_label(&piece.event_id)
            .chars()
            .take(inner)
            .collect::<String>()
    } else {
        String::new()
    };
    let text = format!("{left}{label:<inner$}{right}");
    if !colored {
        return text;
    }
    let category = catalog.resolve_category(&piece.event_id);
    let color = color_for(&category, Some(&piece.event_id), dark);
    paint(&text, color.fill, color.accent)
}

fn render_row(
    window: Range<usize>,
    pieces: &[SegmentPiece],
    catalog: &Catalog,
    slot_clock: &SlotClock,
    dark: bool,
    colored: bool,
) -> String {
    let mut line = format!("{} ", slot_clock.slot_to_time(window.start));
    let mut cursor = window.start;
    for piece in pieces {
        line.push_str(&EMPTY_CELL.repeat(piece.start - cursor));
        line.push_str(&render_piece(piece, catalog, dark, colored));
        cursor = piece.end;
    }
    line.push_str(&EMPTY_CELL.repeat(window.end - cursor));
    line
}

/// Header plus one line per row of [ROW_SLOTS] slots. `now_slot` marks the row holding the
/// current time.
pub fn render_day(
    day: &DayLog,
    catalog: &Catalog,
    slot_clock: &SlotClock,
    dark: bool,
    colored: bool,
    now_slot: Option<usize>,
) -> Vec<String> {
    let mut lines = vec![format!(
        "{} {}  {} tracked",
        day.date().format("%A"),
        date_key(day.date()),
        format_minutes(day.tracked_minutes())
    )];
    let segments = compress(day.slots());
    for (window, pieces) in rows(&segments, ROW_SLOTS) {
        let mut line = render_row(window.clone(), &pieces, catalog, slot_clock, dark, colored);
        if now_slot.is_some_and(|v| window.contains(&v)) {
            line.push_str("  < now");
        }
        lines.push(line);
    }
    lines
}

#[instrument(skip(workspace, clock))]
pub async fn process_show_command(
    workspace: &Workspace,
    clock: &impl Clock,
    command: ShowCommand,
) -> Result<()> {
    let settings = workspace.metadata.load_settings().await?;
    let slot_clock = settings.slot_clock();
    let date = parse_date_arg(command.date.as_deref(), clock, &slot_clock)?;
    let catalog = workspace.metadata.load_catalog().await?;
    let day = workspace.days.load_day(date).await?;

    let now_slot = (operational_day(clock, &slot_clock) == date)
        .then(|| current_slot(clock, &slot_clock));
    for line in render_day(
        &day,
        &catalog,
        &slot_clock,
        settings.theme_mode.is_dark(),
        !command.plain,
        now_slot,
    ) {
        println!("{line}");
    }
    Ok(())
}

#[instrument(skip(workspace, clock))]
pub async fn process_tag_command(
    workspace: &Workspace,
    clock: &impl Clock,
    command: TagCommand,
) -> Result<()> {
    let settings = workspace.metadata.load_settings().await?;
    let slot_clock = settings.slot_clock();
    let date = parse_date_arg(command.date.as_deref(), clock, &slot_clock)?;
    let catalog = workspace.metadata.load_catalog().await?;
    let event = known_event(&catalog, &command.event)?;

    let selection = match &command.trace {
        Some(path) => {
            let contents = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read trace {path:?}"))?;
            replay_trace(&contents, GridLayout::default())?
        }
        None => required_selection(&command.range, &slot_clock)?,
    };

    let mut day = workspace.days.load_day(date).await?;
    let mut recent = workspace.metadata.load_recent().await?;
    apply_event(&mut day, &selection, &event, &mut recent);
    workspace.days.save_day(&day).await?;
    workspace.metadata.save_recent(&recent).await?;

    println!(
        "Tagged {} on {} with {}",
        describe(&selection, &slot_clock),
        date_key(date),
        catalog.event_label(&event)
    );
    Ok(())
}

#[instrument(skip(workspace, clock))]
pub async fn process_clear_command(
    workspace: &Workspace,
    clock: &impl Clock,
    command: ClearCommand,
) -> Result<()> {
    let slot_clock = workspace.metadata.load_settings().await?.slot_clock();
    let date = parse_date_arg(command.date.as_deref(), clock, &slot_clock)?;
    let selection = required_selection(&command.range, &slot_clock)?;

    let mut day = workspace.days.load_day(date).await?;
    clear_slots(&mut day, &selection);
    workspace.days.save_day(&day).await?;

    println!(
        "Cleared {} on {}",
        describe(&selection, &slot_clock),
        date_key(date)
    );
    Ok(())
}

#[instrument(skip(workspace, clock))]
pub async fn process_fill_night_command(
    workspace: &Workspace,
    clock: &impl Clock,
    command: FillNightCommand,
) -> Result<()> {
    let settings = workspace.metadata.load_settings().await?;
    let date = parse_date_arg(command.date.as_deref(), clock, &settings.slot_clock())?;
    let catalog = workspace.metadata.load_catalog().await?;
    let event = known_event(&catalog, &command.event)?;

    let mut day = workspace.days.load_day(date).await?;
    let filled = fill_night(&mut day, &settings, &event);
    if filled > 0 {
        workspace.days.save_day(&day).await?;
    }

    println!(
        "Filled {} of the night on {} with {}",
        format_minutes(filled as u32 * SLOT_MINUTES),
        date_key(date),
        catalog.event_label(&event)
    );
    Ok(())
}

async fn copy_fixed(workspace: &Workspace, date: NaiveDate) -> Result<usize> {
    let catalog = workspace.metadata.load_catalog().await?;
    let previous = workspace.days.load_day(add_days(date, -1)).await?;
    let mut day = workspace.days.load_day(date).await?;

    let copied = copy_fixed_from(&previous, &mut day, &catalog);
    if copied > 0 {
        workspace.days.save_day(&day).await?;
    }
    Ok(copied)
}

#[instrument(skip(workspace, clock))]
pub async fn process_copy_fixed_command(
    workspace: &Workspace,
    clock: &impl Clock,
    command: CopyFixedCommand,
) -> Result<()> {
    let slot_clock = workspace.metadata.load_settings().await?.slot_clock();
    let date = parse_date_arg(command.date.as_deref(), clock, &slot_clock)?;
    let copied = copy_fixed(workspace, date).await?;
    println!(
        "Copied {} of fixed events into {}",
        format_minutes(copied as u32 * SLOT_MINUTES),
        date_key(date)
    );
    Ok(())
}
