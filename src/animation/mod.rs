//! Timing for effects that outlive a single frame
//!
//! Arpeggio periods and per-note delays are scheduled here and fired from
//! the owning tree's frame update.

mod scheduler;

pub use scheduler::{Scheduler, TaskHandle};
