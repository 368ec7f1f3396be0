// Request pacing for the Reddit API.
//
// Reddit's OAuth API allows roughly 100 requests per minute per client. A
// single analysis is one token request plus one listing page per 100 posts,
// so evenly spaced slots keep long paginated fetches inside the budget.
//
// Callers reserve the next free slot under the lock and sleep outside it, so
// concurrent callers queue up in arrival order instead of racing after a
// shared wakeup. A 429 pushes every future slot back by the server's
// Retry-After.

use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::time::{Duration, Instant};
use tracing::{debug, warn};

/// Requests per minute Reddit grants an OAuth client.
pub const REDDIT_REQUESTS_PER_MINUTE: u32 = 100;

/// Longest pause a single back-off can impose.
pub const MAX_BACK_OFF: Duration = Duration::from_secs(3600);

/// Hands out evenly spaced request slots.
#[derive(Clone)]
pub struct RateLimiter {
    interval: Duration,
    next_slot: Arc<Mutex<Option<Instant>>>,
}

impl RateLimiter {
    /// Allow `requests_per_minute` requests per minute. Zero is treated as one.
    pub fn per_minute(requests_per_minute: u32) -> Self {
        Self {
            interval: Duration::from_secs_f64(60.0 / requests_per_minute.max(1) as f64),
            next_slot: Arc::new(Mutex::new(None)),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Wait for this caller's slot.
    pub async fn acquire(&self) {
        let slot = {
            let mut next = self.next_slot.lock().await;
            let now = Instant::now();
            let slot = match *next {
                Some(at) if at > now => at,
                _ => now,
            };
            *next = Some(slot + self.interval);
            slot
        };

        if slot > Instant::now() {
            debug!(wait_ms = (slot - Instant::now()).as_millis() as u64, "Pacing Reddit request");
            tokio::time::sleep_until(slot).await;
        }
    }

    /// Hold off all requests for `delay` (at most `MAX_BACK_OFF`), e.g. after a 429.
    pub async fn back_off(&self, delay: Duration) {
        let delay = delay.min(MAX_BACK_OFF);
        let resume_at = Instant::now() + delay;
        let mut next = self.next_slot.lock().await;
        if (*next).map_or(true, |at| at < resume_at) {
            warn!(delay_secs = delay.as_secs(), "Reddit rate limit hit, backing off");
            *next = Some(resume_at);
        }
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::per_minute(REDDIT_REQUESTS_PER_MINUTE)
    }
}
