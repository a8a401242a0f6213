//! Timing bookkeeping for the frame scheduler.
//!
//! [`CompositorTimingHistory`] brackets each pipeline phase and turns the measured durations into
//! percentile estimates the scheduler plans deadlines with. [`RollingTimeDeltaHistory`] is the
//! window behind every estimate.

pub(crate) mod rolling;
pub(crate) mod stats;
pub(crate) mod timing;

pub use rolling::RollingTimeDeltaHistory;
pub use stats::{RenderingStats, RenderingStatsInstrumentation, TimingSample};
pub use timing::{Clock, CompositorTimingHistory, ManualClock, SystemClock, TimingEstimates};
