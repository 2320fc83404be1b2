pub mod catalog;
pub mod day;
pub mod stats;
pub mod transfer;

use std::path::PathBuf;

use anyhow::{bail, Result};
use catalog::{
    process_category_command, process_event_command, process_recent_command,
    process_settings_command, CategoryCommand, EventCommand, SettingsCommand,
};
use chrono::{Local, NaiveDate};
use chrono_english::{parse_date_string, Dialect};
use clap::{CommandFactory, Parser, Subcommand};
use day::{
    process_clear_command, process_copy_fixed_command, process_fill_night_command,
    process_show_command, process_tag_command, ClearCommand, CopyFixedCommand, FillNightCommand,
    ShowCommand, TagCommand,
};
use stats::{process_stats_command, StatsCommand};
use tracing::{debug, level_filters::LevelFilter};
use transfer::{process_export_command, process_import_command, ExportCommand, ImportCommand};

use crate::{
    grid::{calendar::parse_date_key, Selection, SlotClock, SLOTS_PER_DAY},
    storage::{
        day_storage::{DayLogStorageImpl, DAYS_DIR},
        metadata::MetadataStore,
    },
    utils::{
        clock::{operational_day, Clock, DefaultClock},
        dir::create_application_path,
        logging::enable_logging,
    },
};

#[derive(Parser, Debug)]
#[command(name = "Slotday", version, long_about = None)]
#[command(
    about = "Tag every quarter hour of your day and see where the time went",
    long_about = None
)]
struct Args {
    #[command(subcommand)]
    commands: Commands,
    #[arg(long, global = true, help = "Enable logging")]
    log: bool,
    #[arg(
        long,
        global = true,
        help = "Application directory. By default tries to save into $XDG_STATE_HOME or $HOME/.local/state"
    )]
    dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
#[command(version, about, long_about = None)]
enum Commands {
    #[command(about = "Print the grid of a day")]
    Show {
        #[command(flatten)]
        command: ShowCommand,
    },
    #[command(about = "Tag a range of slots with an event")]
    Tag {
        #[command(flatten)]
        command: TagCommand,
    },
    #[command(about = "Empty a range of slots")]
    Clear {
        #[command(flatten)]
        command: ClearCommand,
    },
    #[command(about = "Tag the empty slots of the night range with an event")]
    FillNight {
        #[command(flatten)]
        command: FillNightCommand,
    },
    #[command(about = "Copy fixed events from the previous day into empty slots")]
    CopyFixed {
        #[command(flatten)]
        command: CopyFixedCommand,
    },
    #[command(about = "Show time spent per category and event")]
    Stats {
        #[command(flatten)]
        command: StatsCommand,
    },
    #[command(about = "Manage categories")]
    Category {
        #[command(subcommand)]
        command: CategoryCommand,
    },
    #[command(about = "Manage events")]
    Event {
        #[command(subcommand)]
        command: EventCommand,
    },
    #[command(about = "List recently used events")]
    Recent,
    #[command(about = "Show or change settings")]
    Settings {
        #[command(flatten)]
        command: SettingsCommand,
    },
    #[command(about = "Export settings, catalog and one day into a file")]
    Export {
        #[command(flatten)]
        command: ExportCommand,
    },
    #[command(about = "Replace settings, catalog and one day from an exported file")]
    Import {
        #[command(flatten)]
        command: ImportCommand,
    },
}

/// Everything a command reads or writes, rooted in the application directory.
pub struct Workspace {
    pub dir: PathBuf,
    pub metadata: MetadataStore,
    pub days: DayLogStorageImpl,
}

impl Workspace {
    pub fn open(dir: PathBuf) -> Result<Self> {
        let days = DayLogStorageImpl::new(dir.join(DAYS_DIR))?;
        Ok(Self {
            metadata: MetadataStore::new(dir.clone()),
            days,
            dir,
        })
    }
}

pub async fn run_cli() -> Result<()> {
    let args = Args::parse();

    let dir = create_application_path(args.dir)?;

    let logging_level = if args.log {
        Some(LevelFilter::TRACE)
    } else {
        None
    };
    enable_logging(&dir, logging_level, args.log)?;
    debug!("Using application directory {dir:?}");

    let workspace = Workspace::open(dir)?;
    let clock = DefaultClock;

    match args.commands {
        Commands::Show { command } => process_show_command(&workspace, &clock, command).await,
        Commands::Tag { command } => process_tag_command(&workspace, &clock, command).await,
        Commands::Clear { command } => process_clear_command(&workspace, &clock, command).await,
        Commands::FillNight { command } => {
            process_fill_night_command(&workspace, &clock, command).await
        }
        Commands::CopyFixed { command } => {
            process_copy_fixed_command(&workspace, &clock, command).await
        }
        Commands::Stats { command } => process_stats_command(&workspace, &clock, command).await,
        Commands::Category { command } => process_category_command(&workspace, command).await,
        Commands::Event { command } => process_event_command(&workspace, &clock, command).await,
        Commands::Recent => process_recent_command(&workspace).await,
        Commands::Settings { command } => process_settings_command(&workspace, command).await,
        Commands::Export { command } => process_export_command(&workspace, &clock, command).await,
        Commands::Import { command } => process_import_command(&workspace, command).await,
    }
}

fn validation_error(message: String) -> anyhow::Error {
    Args::command()
        .error(clap::error::ErrorKind::ValueValidation, message)
        .into()
}

/// Date given on the command line. `YYYY-MM-DD` is tried first, then phrases such as
/// "yesterday" or "15/03/2025". Without a value the operational day is used.
pub fn parse_date_arg(
    value: Option<&str>,
    clock: &impl Clock,
    slot_clock: &SlotClock,
) -> Result<NaiveDate> {
    let Some(value) = value else {
        return Ok(operational_day(clock, slot_clock));
    };
    if let Ok(date) = parse_date_key(value) {
        return Ok(date);
    }
    match parse_date_string(value, clock.now(), Dialect::Uk) {
        Ok(v) => Ok(v.with_timezone(&Local).date_naive()),
        Err(e) => Err(validation_error(format!("Failed to validate date {value}: {e}"))),
    }
}

/// Slot range arguments shared by commands that edit a span of the day.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct SlotRangeArgs {
    #[arg(long, requires = "to", help = "Start time, HH:MM. The slot starting here is included")]
    from: Option<String>,
    #[arg(long, requires = "from", help = "End time, HH:MM. The slot starting here is excluded")]
    to: Option<String>,
    #[arg(
        long,
        conflicts_with_all = ["from", "to"],
        help = "Slot indices as A-B (inclusive) or a single index, 0 is the first slot of the day"
    )]
    slots: Option<String>,
}

impl SlotRangeArgs {
    /// `None` when no range was given at all.
    pub fn selection(&self, slot_clock: &SlotClock) -> Result<Option<Selection>> {
        if let Some(slots) = &self.slots {
            return parse_slot_span(slots).map(Some);
        }
        let (Some(from), Some(to)) = (&self.from, &self.to) else {
            return Ok(None);
        };
        let first = slot_clock.parse_slot(from)?;
        let end = slot_clock.parse_slot(to)?;
        // The end of the day maps back to slot 0
        let last = if end == 0 { SLOTS_PER_DAY - 1 } else { end - 1 };
        if end != 0 && end <= first {
            return Err(validation_error(format!(
                "{to} doesn't come after {from} within the day starting at {:02}:00",
                slot_clock.day_start_hour()
            )));
        }
        Ok(Some(Selection::between(first, last)))
    }
}

fn parse_slot_span(value: &str) -> Result<Selection> {
    let parse = |v: &str| -> Result<usize> {
        let slot = v.trim().parse::<usize>()?;
        if slot >= SLOTS_PER_DAY {
            bail!("Slot {slot} is outside of 0-{}", SLOTS_PER_DAY - 1);
        }
        Ok(slot)
    };
    match value.split_once('-') {
        Some((a, b)) => Ok(Selection::between(parse(a)?, parse(b)?)),
        None => Ok(Selection::single(parse(value)?)),
    }
}

/// `1h15m` style minute formatting.
pub fn format_minutes(minutes: u32) -> String {
    if minutes >= 60 {
        format!("{}h{:02}m", minutes / 60, minutes % 60)
    } else {
        format!("{minutes}m")
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Local, NaiveDate};

    use crate::{
        grid::{Selection, SlotClock},
        utils::clock::MockClock,
    };

    use super::{format_minutes, parse_date_arg, parse_slot_span, SlotRangeArgs};

    fn clock() -> MockClock {
        let now = NaiveDate::from_ymd_opt(2025, 3, 14)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
            .and_local_timezone(Local)
            .earliest()
            .unwrap();
        let mut clock = MockClock::new();
        clock.expect_now().return_const(now);
        clock
    }

    #[test]
    fn test_parse_date_arg() {
        let slot_clock = SlotClock::default();
        let clock = clock();
        let date = |y, m, d| NaiveDate::from_ymd_opt(y, m, d).unwrap();

        assert_eq!(
            parse_date_arg(None, &clock, &slot_clock).unwrap(),
            date(2025, 3, 14)
        );
        assert_eq!(
            parse_date_arg(Some("2024-02-29"), &clock, &slot_clock).unwrap(),
            date(2024, 2, 29)
        );
        assert_eq!(
            parse_date_arg(Some("yesterday"), &clock, &slot_clock).unwrap(),
            date(2025, 3, 13)
        );
        assert_eq!(
            parse_date_arg(Some("15/03/2025"), &clock, &slot_clock).unwrap(),
            date(2025, 3, 15)
        );
        assert!(parse_date_arg(Some("the day after never"), &clock, &slot_clock).is_err());
    }

    #[test]
    fn test_time_range_excludes_end() {
        let slot_clock = SlotClock::default();
        let range = SlotRangeArgs {
            from: Some("09:00".into()),
            to: Some("10:00".into()),
            slots: None,
        };
        assert_eq!(
            range.selection(&slot_clock).unwrap(),
            Some(Selection::between(4, 7))
        );

        let until_day_end = SlotRangeArgs {
            from: Some("07:00".into()),
            to: Some("08:00".into()),
            slots: None,
        };
        assert_eq!(
            until_day_end.selection(&slot_clock).unwrap(),
            Some(Selection::between(92, 95))
        );

        let backwards = SlotRangeArgs {
            from: Some("10:00".into()),
            to: Some("09:00".into()),
            slots: None,
        };
        assert!(backwards.selection(&slot_clock).is_err());
        assert_eq!(SlotRangeArgs::default().selection(&slot_clock).unwrap(), None);
    }

    #[test]
    fn test_parse_slot_span() {
        assert_eq!(parse_slot_span("10-20").unwrap(), Selection::between(10, 20));
        assert_eq!(parse_slot_span("20-10").unwrap(), Selection::between(10, 20));
        assert_eq!(parse_slot_span("7").unwrap(), Selection::single(7));
        assert!(parse_slot_span("90-96").is_err());
        assert!(parse_slot_span("a-b").is_err());
    }

    #[test]
    fn test_format_minutes() {
        assert_eq!(format_minutes(0), "0m");
        assert_eq!(format_minutes(45), "45m");
        assert_eq!(format_minutes(75), "1h15m");
        assert_eq!(format_minutes(600), "10h00m");
    }
}
