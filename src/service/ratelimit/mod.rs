mod model;

pub use model::WaitTime;

use chrono::{DateTime, Duration, Utc};

use crate::{config::minutes_span, messenger::UserKey, storage::MemoryCache};

/// Per-user cooldown between accepted download requests.
///
/// One record per user holding the earliest time the next request may start.
/// Records are only superseded, never deleted, unless [`RateLimitService::compact`] runs.
#[derive(Clone)]
pub struct RateLimitService {
    next_allowed: MemoryCache<UserKey, DateTime<Utc>>,
    cooldown: Duration,
}

impl RateLimitService {
    pub fn new(cooldown_minutes: u64) -> Self {
        info!("Initializing rate limit service, cooldown: {} min", cooldown_minutes);
        // a span past the calendar blocks for as long as the clock can express
        Self::with_cooldown(minutes_span(cooldown_minutes).unwrap_or(Duration::MAX))
    }

    pub fn with_cooldown(cooldown: Duration) -> Self {
        Self {
            next_allowed: MemoryCache::new(64),
            cooldown,
        }
    }

    /// `None` when the user may proceed, otherwise the remaining wait.
    pub fn check(&self, user: UserKey) -> Option<WaitTime> {
        self.check_at(user, Utc::now())
    }

    pub fn mark(&self, user: UserKey) {
        self.mark_at(user, Utc::now());
    }

    /// Drops records whose cooldown has already elapsed.
    pub fn compact(&self) -> usize {
        let now = Utc::now();
        self.next_allowed.retain(|_, next| *next > now)
    }

    fn check_at(&self, user: UserKey, now: DateTime<Utc>) -> Option<WaitTime> {
        let next = self.next_allowed.get(&user)?;
        if next <= now {
            return None;
        }

        let remaining = next - now;
        Some(WaitTime::from_seconds(remaining.num_milliseconds() as f64 / 1000.0))
    }

    fn mark_at(&self, user: UserKey, now: DateTime<Utc>) {
        debug!("cooldown started for user {}", user);
        let next = now.checked_add_signed(self.cooldown).unwrap_or(DateTime::<Utc>::MAX_UTC);
        self.next_allowed.set(user, next);
    }
}
