use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Trailing window read from the external provider: 30 days.
pub const DEFAULT_EXTERNAL_WINDOW: Duration = Duration::from_secs(30 * 24 * 60 * 60);

/// Upper bound on resolution passes before the engine gives up.
pub const DEFAULT_MAX_RESOLUTION_PASSES: usize = 64;

/// Configuration for the [`MergeEngine`](crate::MergeEngine).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Length of the window, ending now, requested from the external provider.
    pub external_window: Duration,
    /// Maximum number of scan passes one resolution may take, counting the
    /// final pass that finds nothing. Each pass removes at least one record,
    /// so a well-behaved store converges long before this. Values below 2
    /// are treated as 2.
    pub max_resolution_passes: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            external_window: DEFAULT_EXTERNAL_WINDOW,
            max_resolution_passes: DEFAULT_MAX_RESOLUTION_PASSES,
        }
    }
}
