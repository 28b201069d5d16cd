//! Coordinator configuration shared by the registry and fight workers.

use std::time::Duration;

/// Pacing and buffer settings for fight workers.
///
/// The worker runs on a single ticker: during countdown every tick emits a
/// countdown event, and once live a round executes every
/// `round_every_ticks` ticks. Round pacing is a presentation choice; tests
/// shrink the tick interval to run fights in milliseconds.
#[derive(Clone, Debug)]
pub struct CoordinatorConfig {
    pub event_buffer_size: usize,
    pub command_buffer_size: usize,
    /// Ticks of countdown between the start signal and the opening bell.
    pub countdown_ticks: u32,
    /// Base ticker period (one countdown step per tick).
    pub tick_interval: Duration,
    /// A live round executes once per this many ticks.
    pub round_every_ticks: u32,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            event_buffer_size: 256,
            command_buffer_size: 32,
            countdown_ticks: 10,
            tick_interval: Duration::from_secs(1),
            round_every_ticks: 2,
        }
    }
}

impl CoordinatorConfig {
    /// Fast pacing for tests: fights resolve in tens of milliseconds.
    pub fn fast() -> Self {
        Self {
            countdown_ticks: 1,
            tick_interval: Duration::from_millis(5),
            round_every_ticks: 1,
            ..Self::default()
        }
    }
}
