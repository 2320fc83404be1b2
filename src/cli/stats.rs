use std::fmt::Display;

use ansi_term::{Colour, Style};
use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, ValueEnum};
use tracing::instrument;

use crate::{
    analysis::{
        category_rows, event_rows, overview, overview_keys,
        window::{self, DailyTotal},
        Aggregate, RankedRow,
    },
    grid::{
        calendar::{date_key, month_keys, range_keys, week_keys, week_start},
        SLOT_MINUTES,
    },
    model::Catalog,
    storage::day_storage::load_days,
    utils::{clock::Clock, percentage::Percentage},
};

use super::{format_minutes, parse_date_arg, validation_error, Workspace};

/// One `#` in the trend bar per hour.
const TREND_BAR_SLOTS: u32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Period {
    Day,
    Week,
    Month,
    Overview,
    Range,
}

impl Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Period::Day => write!(f, "day"),
            Period::Week => write!(f, "week"),
            Period::Month => write!(f, "month"),
            Period::Overview => write!(f, "overview"),
            Period::Range => write!(f, "range"),
        }
    }
}

#[derive(Debug, Parser)]
pub struct StatsCommand {
    #[arg(long, short, help = "Day the period is anchored on, or the start of a range")]
    date: Option<String>,
    #[arg(long, short, default_value_t = Period::Day)]
    period: Period,
    #[arg(long, help = "Last day of a range period, inclusive")]
    end: Option<String>,
    #[arg(long, short, default_value_t = 5, help = "Number of rows per list")]
    top: usize,
    #[arg(long, help = "Also list events")]
    events: bool,
    #[arg(
        short = 'm',
        long = "min-percentage",
        help = "Hide rows below this share",
        default_value_t = Percentage::zero()
    )]
    min_percentage: Percentage,
    #[arg(long, help = "Don't use colours")]
    plain: bool,
}

/// Options shared by every printed table.
struct PrintOptions {
    top: usize,
    events: bool,
    min_percentage: Percentage,
    dark: bool,
    colored: bool,
}

fn swatch(row: &RankedRow, colored: bool) -> String {
    if !colored {
        return String::new();
    }
    let (r, g, b) = row.color.fill.to_rgb();
    format!("{} ", Style::new().on(Colour::RGB(r, g, b)).paint("  "))
}

fn format_rows(rows: &[RankedRow], options: &PrintOptions) -> Vec<String> {
    rows.iter()
        .filter(|v| v.share >= options.min_percentage)
        .map(|v| {
            format!(
                "{}{}\t{}\t{}",
                swatch(v, options.colored),
                v.share,
                format_minutes(v.minutes),
                v.label
            )
        })
        .collect()
}

/// Lines describing one aggregate: a title with the total, the category table and
/// optionally the event table.
fn format_aggregate(
    title: &str,
    aggregate: &Aggregate,
    catalog: &Catalog,
    options: &PrintOptions,
) -> Vec<String> {
    let mut lines = vec![format!(
        "{title}: {} tracked",
        format_minutes(aggregate.total_minutes)
    )];
    if aggregate.total_minutes == 0 {
        return lines;
    }
    let categories = category_rows(aggregate, catalog, options.top, options.dark);
    lines.extend(format_rows(&categories, options));
    if options.events {
        lines.push(String::new());
        let events = event_rows(aggregate, catalog, options.top, options.dark);
        lines.extend(format_rows(&events, options));
    }
    lines
}

fn format_trend(trend: &[DailyTotal]) -> Vec<String> {
    trend
        .iter()
        .map(|v| {
            let bar = "#".repeat((v.total_minutes / (TREND_BAR_SLOTS * SLOT_MINUTES)) as usize);
            format!(
                "{} {}\t{}\t{bar}",
                v.date.format("%a"),
                date_key(v.date),
                format_minutes(v.total_minutes)
            )
        })
        .collect()
}

/// Dates a period reads, for loading.
fn period_keys(period: Period, anchor: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    match period {
        Period::Day => vec![anchor],
        Period::Week => week_keys(anchor),
        Period::Month => month_keys(anchor),
        Period::Overview => overview_keys(anchor),
        Period::Range => range_keys(anchor, end),
    }
}

#[instrument(skip(workspace, clock))]
pub async fn process_stats_command(
    workspace: &Workspace,
    clock: &impl Clock,
    command: StatsCommand,
) -> Result<()> {
    let settings = workspace.metadata.load_settings().await?;
    let slot_clock = settings.slot_clock();
    let anchor = parse_date_arg(command.date.as_deref(), clock, &slot_clock)?;
    let end = match (&command.end, command.period) {
        (Some(end), Period::Range) => parse_date_arg(Some(end), clock, &slot_clock)?,
        (None, Period::Range) => {
            return Err(validation_error("A range period needs --end".to_string()))
        }
        _ => anchor,
    };
    let (anchor, end) = (anchor.min(end), anchor.max(end));
    let catalog = workspace.metadata.load_catalog().await?;
    let snapshot = load_days(&workspace.days, period_keys(command.period, anchor, end)).await;

    let options = PrintOptions {
        top: command.top,
        events: command.events,
        min_percentage: command.min_percentage,
        dark: settings.theme_mode.is_dark(),
        colored: !command.plain,
    };

    let lines = match command.period {
        Period::Day => format_aggregate(
            &date_key(anchor),
            &window::day(anchor, &snapshot, &catalog),
            &catalog,
            &options,
        ),
        Period::Week => format_aggregate(
            &format!("Week of {}", date_key(week_start(anchor))),
            &window::week(anchor, &snapshot, &catalog),
            &catalog,
            &options,
        ),
        Period::Month => format_aggregate(
            &anchor.format("%B %Y").to_string(),
            &window::month(anchor, &snapshot, &catalog),
            &catalog,
            &options,
        ),
        Period::Range => format_aggregate(
            &format!("{} to {}", date_key(anchor), date_key(end)),
            &window::range(anchor, end, &snapshot, &catalog),
            &catalog,
            &options,
        ),
        Period::Overview => {
            let overview = overview(anchor, &snapshot, &catalog);
            let mut lines = format_aggregate(&date_key(anchor), &overview.day, &catalog, &options);
            lines.push(String::new());
            lines.extend(format_aggregate(
                &format!("Week of {}", date_key(week_start(anchor))),
                &overview.week,
                &catalog,
                &options,
            ));
            lines.push(String::new());
            lines.extend(format_aggregate(
                &anchor.format("%B %Y").to_string(),
                &overview.month,
                &catalog,
                &options,
            ));
            lines.push(String::new());
            lines.push("Last 7 days:".to_string());
            lines.extend(format_trend(&overview.trend));
            lines
        }
    };

    for line in lines {
        println!("{line}");
    }
    Ok(())
}
