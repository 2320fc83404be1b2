//! Statistics over day logs: minute totals per category and event, ranking, and calendar
//! windows built on top of single-day aggregation.

pub mod aggregation;
pub mod ranking;
pub mod window;

pub use aggregation::{aggregate, top_n, Aggregate};
pub use ranking::{category_rows, event_rows, RankedRow};
pub use window::{overview, overview_keys, DaySnapshot, Overview};
