//! Core data structures for appliance power signals.

mod daily_signal;
mod readings;

pub use daily_signal::DailySignal;
pub use readings::PowerReadings;
