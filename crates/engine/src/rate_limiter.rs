use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, Semaphore};
use tokio::time::{sleep, Instant};
use tracing::debug;

/// Fixed-window limiter applied ahead of every outbound transport call.
#[derive(Debug)]
pub struct RateLimiter {
    semaphore: Arc<Semaphore>,
    permits_per_window: u32,
    window_duration: Duration,
    last_reset: Arc<Mutex<Instant>>,
}

impl RateLimiter {
    pub fn new(permits_per_window: u32, window_duration: Duration) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(permits_per_window as usize)),
            permits_per_window,
            window_duration,
            last_reset: Arc::new(Mutex::new(Instant::now())),
        }
    }

    /// Limiter shaped from an exchange's per-second request budget.
    pub fn per_second(requests_per_second: u32) -> Self {
        Self::new(requests_per_second, Duration::from_secs(1))
    }

    pub async fn acquire(&self) {
        self.maybe_reset_window().await;

        let _permit = self.semaphore.acquire().await.unwrap();
        debug!("Rate limiter permit acquired");

        // Permit is automatically released when dropped
    }

    pub async fn try_acquire(&self) -> bool {
        self.maybe_reset_window().await;

        match self.semaphore.try_acquire() {
            Ok(_permit) => {
                debug!("Rate limiter permit acquired (non-blocking)");
                true
            }
            Err(_) => {
                debug!("Rate limiter permit unavailable");
                false
            }
        }
    }

    pub fn available_permits(&self) -> u32 {
        self.semaphore.available_permits() as u32
    }

    async fn maybe_reset_window(&self) {
        let mut last_reset = self.last_reset.lock().await;
        let now = Instant::now();

        if now.duration_since(*last_reset) >= self.window_duration {
            let used_permits = self.permits_per_window - self.semaphore.available_permits() as u32;
            if used_permits > 0 {
                self.semaphore.add_permits(used_permits as usize);
            }
            *last_reset = now;
            debug!("Rate limiter window reset, {} permits restored", used_permits);
        }
    }
}

/// Token bucket used for weighted endpoints (order placement costs more
/// than a position poll on most exchanges).
#[derive(Debug)]
pub struct TokenBucket {
    tokens: Arc<Mutex<f64>>,
    capacity: f64,
    refill_rate: f64, // tokens per second
    last_refill: Arc<Mutex<Instant>>,
}

impl TokenBucket {
    pub fn new(capacity: f64, refill_rate: f64) -> Self {
        Self {
            tokens: Arc::new(Mutex::new(capacity)),
            capacity,
            refill_rate,
            last_refill: Arc::new(Mutex::new(Instant::now())),
        }
    }

    pub async fn acquire(&self, tokens_needed: f64) -> bool {
        self.refill().await;

        let mut tokens = self.tokens.lock().await;
        if *tokens >= tokens_needed {
            *tokens -= tokens_needed;
            debug!(
                "Token bucket: {} tokens consumed, {} remaining",
                tokens_needed, *tokens
            );
            true
        } else {
            debug!(
                "Token bucket: insufficient tokens ({} needed, {} available)",
                tokens_needed, *tokens
            );
            false
        }
    }

    pub async fn acquire_blocking(&self, tokens_needed: f64) {
        loop {
            if self.acquire(tokens_needed).await {
                break;
            }

            let wait_time = Duration::from_secs_f64(tokens_needed / self.refill_rate);
            debug!("Token bucket: waiting {:?} for tokens", wait_time);
            sleep(wait_time).await;
        }
    }

    pub async fn available_tokens(&self) -> f64 {
        self.refill().await;
        *self.tokens.lock().await
    }

    async fn refill(&self) {
        let mut last_refill = self.last_refill.lock().await;
        let now = Instant::now();
        let elapsed = now.duration_since(*last_refill).as_secs_f64();

        if elapsed > 0.0 {
            let mut tokens = self.tokens.lock().await;
            let new_tokens = elapsed * self.refill_rate;
            *tokens = (*tokens + new_tokens).min(self.capacity);
            *last_refill = now;
        }
    }
}
