//! Time source for challenge windows and finish timestamps.

use chrono::{DateTime, Utc};

/// Supplies "now" to expiry checks and to the finish times of phases,
/// participants and challenges.
pub trait Clock: Send + Sync {
    /// Current UTC instant.
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock used by the running bot.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
