//! In-memory data the core operates on. Nothing in here touches the disk; see
//! [crate::storage] for persistence.

pub mod catalog;
pub mod day_log;
pub mod entities;
pub mod recent;

use std::sync::Arc;

pub use catalog::Catalog;
pub use day_log::DayLog;
pub use entities::{Category, EventTag, Settings, ThemeMode};
pub use recent::RecentEvents;

pub type CategoryId = Arc<str>;
pub type EventId = Arc<str>;
