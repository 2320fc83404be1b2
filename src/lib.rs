//! Quarter-hour day tracker. Every day is a grid of 96 slots that get tagged with events;
//! the grid can be printed, edited through commands or pointer traces, and summed up into
//! per-category and per-event statistics for days, weeks and months.
//!
//! The core ([grid], [gesture], [segments], [analysis], [palette]) is pure and works on
//! in-memory day logs. [storage] and [cli] do the I/O around it.

pub mod actions;
pub mod analysis;
pub mod cli;
pub mod fs;
pub mod gesture;
pub mod grid;
pub mod model;
pub mod palette;
pub mod segments;
pub mod storage;
pub mod utils;
