//! Single-day export and import. An export bundles the metadata with one day log; an import
//! is checked completely before anything on disk is touched.

use std::path::Path;

use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::{
    fs::operations::write_atomically,
    grid::SLOTS_PER_DAY,
    model::{
        day_log::RawDayLog, Catalog, Category, DayLog, EventId, EventTag, RecentEvents, Settings,
    },
};

use super::{
    day_storage::{DayLogStorage, DayLogStorageImpl},
    metadata::{MetadataStore, CATALOG_FILE, RECENT_FILE, SETTINGS_FILE},
};

pub const EXPORT_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportPayload {
    pub version: u32,
    pub exported_at: DateTime<Utc>,
    pub date_key: NaiveDate,
    pub settings: Settings,
    pub categories: Vec<Category>,
    pub events: Vec<EventTag>,
    pub recent_events: Vec<EventId>,
    pub day: RawDayLog,
}

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("import file is not a valid payload: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("unsupported payload version {0}, expected {EXPORT_VERSION}")]
    UnsupportedVersion(u32),
    #[error("imported day must hold {SLOTS_PER_DAY} slots, found {found}")]
    SlotCount { found: usize },
    #[error("payload is keyed {payload} but its day log is keyed {day}")]
    DateMismatch { payload: NaiveDate, day: NaiveDate },
}

/// Only the version is read first so a newer layout reports its version instead of a parse
/// error.
#[derive(Deserialize)]
struct VersionProbe {
    version: u32,
}

/// Import that passed every check and can be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedImport {
    pub settings: Settings,
    pub catalog: Catalog,
    pub recent: RecentEvents,
    pub day: DayLog,
}

pub async fn export_day(
    date: NaiveDate,
    exported_at: DateTime<Utc>,
    metadata: &MetadataStore,
    storage: impl DayLogStorage,
) -> Result<ExportPayload> {
    let settings = metadata.load_settings().await?;
    let Catalog { categories, events } = metadata.load_catalog().await?;
    let recent = metadata.load_recent().await?;
    let day = storage.load_day(date).await?;

    Ok(ExportPayload {
        version: EXPORT_VERSION,
        exported_at,
        date_key: date,
        settings,
        categories,
        events,
        recent_events: recent.into(),
        day: RawDayLog {
            date_key: day.date(),
            slots: day.slots().to_vec(),
        },
    })
}

pub fn parse_import(contents: &str) -> Result<ValidatedImport, ImportError> {
    let VersionProbe { version } = serde_json::from_str(contents)?;
    if version != EXPORT_VERSION {
        return Err(ImportError::UnsupportedVersion(version));
    }

    let payload: ExportPayload = serde_json::from_str(contents)?;
    let day = DayLog::try_from(payload.day)
        .map_err(|e| ImportError::SlotCount { found: e.found })?;
    if day.date() != payload.date_key {
        return Err(ImportError::DateMismatch {
            payload: payload.date_key,
            day: day.date(),
        });
    }

    Ok(ValidatedImport {
        settings: payload.settings,
        catalog: Catalog::new(payload.categories, payload.events),
        recent: payload.recent_events.into(),
        day,
    })
}

/// Replaces settings, catalog, recent events and the imported day. Every document is
/// serialized before the first write.
pub async fn apply_import(
    import: &ValidatedImport,
    metadata_dir: &Path,
    storage: &DayLogStorageImpl,
) -> Result<()> {
    let writes = [
        (metadata_dir.join(SETTINGS_FILE), serde_json::to_vec_pretty(&import.settings)?),
        (metadata_dir.join(CATALOG_FILE), serde_json::to_vec_pretty(&import.catalog)?),
        (metadata_dir.join(RECENT_FILE), serde_json::to_vec_pretty(&import.recent)?),
    ];
    let day = serde_json::to_vec(&import.day)?;
    for (path, contents) in writes {
        write_atomically(&path, &contents).await?;
    }
    storage
        .write_locked(&storage.day_path(import.day.date()), &day)
        .await?;
    info!(
        "Imported {} with {} categories and {} events",
        import.day.date(),
        import.catalog.categories.len(),
        import.catalog.events.len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use chrono::{NaiveDate, TimeZone, Utc};
    use tempfile::tempdir;

    use crate::{
        grid::Selection,
        model::{Catalog, DayLog, RecentEvents, Settings},
        storage::{
            day_storage::{DayLogStorage, DayLogStorageImpl},
            metadata::MetadataStore,
        },
    };

    use super::{apply_import, export_day, parse_import, ImportError};

    const TEST_DATE: NaiveDate = NaiveDate::from_ymd_opt(2025, 3, 14).unwrap();

    async fn populated(dir: &std::path::Path) -> Result<(MetadataStore, DayLogStorageImpl)> {
        let metadata = MetadataStore::new(dir.to_owned());
        let storage = DayLogStorageImpl::new(dir.join("days"))?;

        let mut catalog = Catalog::default();
        catalog.add_category("Rest")?;
        catalog.add_event("rest", Some("Sleep"), true)?;
        metadata.save_catalog(&catalog).await?;

        let mut recent = RecentEvents::default();
        recent.touch("rest-sleep".into());
        metadata.save_recent(&recent).await?;

        let mut day = DayLog::fresh(TEST_DATE);
        day.fill(&Selection::between(60, 91), Some(&"rest-sleep".into()));
        storage.save_day(&day).await?;

        Ok((metadata, storage))
    }

    #[tokio::test]
    async fn test_export_then_import_into_empty_directory() -> Result<()> {
        let source = tempdir()?;
        let (metadata, storage) = populated(source.path()).await?;
        let exported_at = Utc.with_ymd_and_hms(2025, 3, 15, 9, 0, 0).unwrap();

        let payload = export_day(TEST_DATE, exported_at, &metadata, &storage).await?;
        assert_eq!(payload.version, 1);
        assert_eq!(payload.day.slots.len(), 96);
        let json = serde_json::to_string(&payload)?;
        assert!(json.contains("\"exportedAt\""));
        assert!(json.contains("\"recentEvents\""));

        let target = tempdir()?;
        let target_metadata = MetadataStore::new(target.path().to_owned());
        let target_storage = DayLogStorageImpl::new(target.path().join("days"))?;
        let import = parse_import(&json)?;
        apply_import(&import, target.path(), &target_storage).await?;

        assert_eq!(
            target_storage.load_day(TEST_DATE).await?,
            storage.load_day(TEST_DATE).await?
        );
        assert_eq!(target_metadata.load_catalog().await?, metadata.load_catalog().await?);
        assert_eq!(target_metadata.load_recent().await?, metadata.load_recent().await?);
        assert_eq!(target_metadata.load_settings().await?, Settings::default());
        Ok(())
    }

    #[tokio::test]
    async fn test_parse_import_rejects_invalid_payloads() -> Result<()> {
        let source = tempdir()?;
        let (metadata, storage) = populated(source.path()).await?;
        let payload = export_day(TEST_DATE, Utc::now(), &metadata, &storage).await?;

        let mut short = serde_json::to_value(&payload)?;
        short["day"]["slots"] = serde_json::json!([null, "rest-sleep"]);
        let result = parse_import(&short.to_string());
        assert!(matches!(result, Err(ImportError::SlotCount { found: 2 })));

        let mut newer = serde_json::to_value(&payload)?;
        newer["version"] = serde_json::json!(2);
        assert!(matches!(
            parse_import(&newer.to_string()),
            Err(ImportError::UnsupportedVersion(2))
        ));

        assert!(matches!(
            parse_import("{\"version\": 1}"),
            Err(ImportError::Parse(_))
        ));
        assert!(matches!(parse_import("nope"), Err(ImportError::Parse(_))));

        let mut moved = serde_json::to_value(&payload)?;
        moved["dateKey"] = serde_json::json!("2025-03-15");
        assert!(matches!(
            parse_import(&moved.to_string()),
            Err(ImportError::DateMismatch { payload, day }) if payload != day && day == TEST_DATE
        ));
        Ok(())
    }
}
