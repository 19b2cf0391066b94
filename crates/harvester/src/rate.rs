//! Minimum-interval gate for requests to a rate-limited repository.
//!
//! arXiv's OAI-PMH service enforces a cool-down between requests and answers clients that ignore
//! it with `503 Retry-After`, eventually blocking them. A [`RateLimiter`] spaces out calls by at
//! least a fixed interval. Clones share the same gate, so one limiter handed to several clients
//! (or tasks) paces all of them together.
//!
//! # Examples
//!
//! ```
//! use std::time::Duration;
//!
//! use harvester::rate::RateLimiter;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let limiter = RateLimiter::new(Duration::from_millis(10));
//! limiter.acquire().await; // returns immediately
//! limiter.acquire().await; // waits until 10ms after the first call
//! # }
//! ```

use tokio::{
  sync::Mutex,
  time::{sleep_until, Instant},
};

use super::*;

/// Shared gate that lets one call through per interval.
#[derive(Debug, Clone)]
pub struct RateLimiter {
  /// Minimum time between two calls passing the gate
  min_interval: Duration,
  /// When the last call passed, shared by all clones
  last:         Arc<Mutex<Option<Instant>>>,
}

impl RateLimiter {
  /// Creates a gate with the given minimum interval.
  pub fn new(min_interval: Duration) -> Self {
    Self { min_interval, last: Arc::new(Mutex::new(None)) }
  }

  /// A gate that never waits.
  pub fn unlimited() -> Self { Self::new(Duration::ZERO) }

  /// The configured minimum interval.
  pub fn min_interval(&self) -> Duration { self.min_interval }

  /// Waits until the interval since the previous call has passed, then records this call.
  ///
  /// Callers queue on the shared lock, so concurrent callers pass one at a time.
  pub async fn acquire(&self) {
    let mut last = self.last.lock().await;
    if let Some(previous) = *last {
      let ready_at = previous + self.min_interval;
      if ready_at > Instant::now() {
        debug!("Rate limit: waiting {:?}", ready_at - Instant::now());
        sleep_until(ready_at).await;
      }
    }
    *last = Some(Instant::now());
  }
}

impl Default for RateLimiter {
  fn default() -> Self { Self::new(Duration::from_millis(config::DEFAULT_MIN_INTERVAL_MS)) }
}
