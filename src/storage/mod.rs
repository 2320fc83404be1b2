//!  Storage is organized through [day_storage::DayLogStorageImpl] and
//!  [metadata::MetadataStore].
//!  The basic idea is:
//!   - The application directory holds `settings.json`, `catalog.json` and `recent.json`.
//!   - Day logs live in `days/`, one `YYYY-MM-DD.json` file per calendar date.
//!   - Nothing is cached. Every command loads what it needs and writes back what it changed.

pub mod day_storage;
pub mod metadata;
pub mod transfer;
