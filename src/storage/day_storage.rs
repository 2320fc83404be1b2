use std::{
    future::{self, Future},
    io::ErrorKind,
    ops::Deref,
    path::{Path, PathBuf},
};

use anyhow::Result;
use chrono::NaiveDate;
use fs4::tokio::AsyncFileExt;
use futures::{stream, StreamExt, TryStreamExt};
use tokio::fs::File;
use tokio_stream::wrappers::ReadDirStream;
use tracing::{debug, error, instrument, warn};

use crate::{
    analysis::DaySnapshot,
    fs::operations::write_atomically,
    grid::calendar::{date_key, parse_date_key},
    model::DayLog,
};

/// Directory inside the application directory that holds one file per day.
pub const DAYS_DIR: &str = "days";

const DAY_FILE_EXTENSION: &str = "json";
const LOCK_FILE: &str = ".lock";

/// Interface for abstracting storage of day logs.
pub trait DayLogStorage {
    /// Log stored for `date`. Absent or malformed logs come back as a fresh empty log.
    fn load_day(&self, date: NaiveDate) -> impl Future<Output = Result<DayLog>> + Send;

    /// Overwrites the stored log for the day's date.
    fn save_day(&self, day: &DayLog) -> impl Future<Output = Result<()>> + Send;

    /// Every date with a stored log, oldest first.
    fn stored_dates(&self) -> impl Future<Output = Result<Vec<NaiveDate>>> + Send;
}

impl<T: Deref> DayLogStorage for T
where
    T::Target: DayLogStorage,
{
    fn load_day(&self, date: NaiveDate) -> impl Future<Output = Result<DayLog>> + Send {
        self.deref().load_day(date)
    }

    fn save_day(&self, day: &DayLog) -> impl Future<Output = Result<()>> + Send {
        self.deref().save_day(day)
    }

    fn stored_dates(&self) -> impl Future<Output = Result<Vec<NaiveDate>>> + Send {
        self.deref().stored_dates()
    }
}

/// The main realization of [DayLogStorage]. Days live in `<day_dir>/YYYY-MM-DD.json`.
pub struct DayLogStorageImpl {
    day_dir: PathBuf,
}

impl DayLogStorageImpl {
    pub fn new(day_dir: PathBuf) -> Result<Self, std::io::Error> {
        std::fs::create_dir_all(&day_dir)?;

        Ok(Self { day_dir })
    }

    pub fn day_path(&self, date: NaiveDate) -> PathBuf {
        self.day_dir
            .join(format!("{}.{DAY_FILE_EXTENSION}", date_key(date)))
    }

    /// Day files get replaced by rename, so readers and writers lock this file instead.
    async fn lock_file(&self) -> Result<File, std::io::Error> {
        File::options()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(self.day_dir.join(LOCK_FILE))
            .await
    }

    async fn read_locked(&self, path: &Path) -> Result<Option<Vec<u8>>, std::io::Error> {
        let lock = self.lock_file().await?;
        lock.lock_shared()?;
        let result = tokio::fs::read(path).await;
        lock.unlock_async().await?;
        match result {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub(crate) async fn write_locked(&self, path: &Path, contents: &[u8]) -> Result<()> {
        let lock = self.lock_file().await?;
        lock.lock_exclusive()?;
        let result = write_atomically(path, contents).await;
        lock.unlock_async().await?;
        result
    }
}

/// Date encoded in a day file name, if the file is one.
fn date_from_path(path: &Path) -> Option<NaiveDate> {
    if path.extension()? != DAY_FILE_EXTENSION {
        return None;
    }
    parse_date_key(path.file_stem()?.to_str()?).ok()
}

impl DayLogStorage for DayLogStorageImpl {
    #[instrument(skip(self))]
    async fn load_day(&self, date: NaiveDate) -> Result<DayLog> {
        let path = self.day_path(date);
        let Some(contents) = self.read_locked(&path).await? else {
            debug!("No log stored for {date}");
            return Ok(DayLog::fresh(date));
        };

        match serde_json::from_slice::<DayLog>(&contents) {
            Ok(day) if day.date() == date => Ok(day),
            Ok(day) => {
                warn!(
                    "Log in {path:?} is keyed {} instead of {date}, starting fresh",
                    day.date()
                );
                Ok(DayLog::fresh(date))
            }
            Err(e) => {
                // Wrong slot counts and broken encodings end up here as well
                warn!("Log in {path:?} is malformed, starting fresh: {e}");
                Ok(DayLog::fresh(date))
            }
        }
    }

    #[instrument(skip_all, fields(date = %day.date()))]
    async fn save_day(&self, day: &DayLog) -> Result<()> {
        let buffer = serde_json::to_vec(day)?;
        self.write_locked(&self.day_path(day.date()), &buffer).await?;
        debug!("Saved {} filled slots", day.filled_slots());
        Ok(())
    }

    async fn stored_dates(&self) -> Result<Vec<NaiveDate>> {
        let entries = ReadDirStream::new(tokio::fs::read_dir(&self.day_dir).await?);
        let mut dates = entries
            .try_filter_map(|entry| future::ready(Ok(date_from_path(&entry.path()))))
            .try_collect::<Vec<_>>()
            .await?;
        dates.sort();
        Ok(dates)
    }
}

/// Loads logs for all `dates`, a few files at a time. A date whose load fails is logged and
/// left out of the snapshot, which downstream aggregation treats as a missing day.
pub async fn load_days(
    storage: impl DayLogStorage,
    dates: impl IntoIterator<Item = NaiveDate>,
) -> DaySnapshot {
    let storage = &storage;
    stream::iter(dates)
        .map(|date| async move { (date, storage.load_day(date).await) })
        .buffered(4)
        .filter_map(|(date, day)| {
            future::ready(match day {
                Ok(day) => Some((date, day)),
                Err(e) => {
                    error!("Failed to load day {date} {e}");
                    None
                }
            })
        })
        .collect::<DaySnapshot>()
        .await
}
