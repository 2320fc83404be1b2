use std::{io::ErrorKind, path::PathBuf};

use anyhow::{Context, Result};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, instrument};

use crate::{
    fs::operations::write_atomically,
    model::{Catalog, RecentEvents, Settings},
};

pub const SETTINGS_FILE: &str = "settings.json";
pub const CATALOG_FILE: &str = "catalog.json";
pub const RECENT_FILE: &str = "recent.json";

/// Small JSON documents stored next to the day logs: settings, the category/event catalog
/// and the recent events list.
pub struct MetadataStore {
    dir: PathBuf,
}

impl MetadataStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    async fn read<T: DeserializeOwned + Default>(&self, name: &str) -> Result<T> {
        let path = self.dir.join(name);
        match tokio::fs::read_to_string(&path).await {
            Ok(contents) => serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse {path:?}")),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("{path:?} doesn't exist yet, using defaults");
                Ok(T::default())
            }
            Err(e) => Err(e).with_context(|| format!("Failed to read {path:?}")),
        }
    }

    async fn write<T: Serialize>(&self, name: &str, value: &T) -> Result<()> {
        let buffer = serde_json::to_vec_pretty(value)?;
        write_atomically(&self.dir.join(name), &buffer).await
    }

    pub async fn load_settings(&self) -> Result<Settings> {
        self.read(SETTINGS_FILE).await
    }

    #[instrument(skip_all)]
    pub async fn save_settings(&self, settings: &Settings) -> Result<()> {
        self.write(SETTINGS_FILE, settings).await
    }

    pub async fn load_catalog(&self) -> Result<Catalog> {
        self.read(CATALOG_FILE).await
    }

    #[instrument(skip_all)]
    pub async fn save_catalog(&self, catalog: &Catalog) -> Result<()> {
        self.write(CATALOG_FILE, catalog).await
    }

    pub async fn load_recent(&self) -> Result<RecentEvents> {
        self.read(RECENT_FILE).await
    }

    pub async fn save_recent(&self, recent: &RecentEvents) -> Result<()> {
        self.write(RECENT_FILE, recent).await
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use chrono::NaiveTime;
    use tempfile::tempdir;

    use crate::model::{Catalog, RecentEvents, Settings, ThemeMode};

    use super::{MetadataStore, SETTINGS_FILE};

    #[tokio::test]
    async fn test_missing_files_give_defaults() -> Result<()> {
        let dir = tempdir()?;
        let store = MetadataStore::new(dir.path().to_owned());

        assert_eq!(store.load_settings().await?, Settings::default());
        assert_eq!(store.load_catalog().await?, Catalog::default());
        assert!(store.load_recent().await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_round_trip() -> Result<()> {
        let dir = tempdir()?;
        let store = MetadataStore::new(dir.path().to_owned());

        let settings = Settings {
            night_start: NaiveTime::from_hms_opt(22, 15, 0).unwrap(),
            theme_mode: ThemeMode::Dark,
            ..Default::default()
        };
        store.save_settings(&settings).await?;

        let mut catalog = Catalog::default();
        catalog.add_category("Health")?;
        catalog.add_event("health", Some("Run"), false)?;
        store.save_catalog(&catalog).await?;

        let mut recent = RecentEvents::default();
        recent.touch("health-run".into());
        recent.touch("health".into());
        store.save_recent(&recent).await?;

        assert_eq!(store.load_settings().await?, settings);
        assert_eq!(store.load_catalog().await?, catalog);
        assert_eq!(store.load_recent().await?, recent);
        Ok(())
    }

    #[tokio::test]
    async fn test_malformed_settings_is_an_error() -> Result<()> {
        let dir = tempdir()?;
        std::fs::write(dir.path().join(SETTINGS_FILE), "[1, 2]")?;
        let store = MetadataStore::new(dir.path().to_owned());

        assert!(store.load_settings().await.is_err());
        Ok(())
    }
}
