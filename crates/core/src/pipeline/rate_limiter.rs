//! Token bucket used to pace outbound deliveries.

use tokio::time::{sleep, Duration, Instant};

/// Token bucket rate limiter.
///
/// Tokens are added at a constant rate up to `burst` and consumed one per
/// delivery. When the bucket is empty the caller waits for the next token.
pub struct TokenBucket {
    /// Max tokens (= allowed burst).
    capacity: f64,
    /// Current available tokens.
    tokens: f64,
    /// Tokens added per second.
    refill_rate: f64,
    /// Last refill time.
    last_refill: Instant,
}

impl TokenBucket {
    /// Create a new token bucket refilling `per_second` tokens, holding at most `burst`.
    ///
    /// The bucket starts full.
    pub fn new(per_second: u32, burst: u32) -> Self {
        let capacity = burst.max(1) as f64;
        Self {
            capacity,
            tokens: capacity,
            refill_rate: per_second.max(1) as f64,
            last_refill: Instant::now(),
        }
    }

    /// Try to take a token.
    ///
    /// Returns `Err(wait)` with the time until one is available.
    pub fn try_acquire(&mut self) -> Result<(), Duration> {
        self.refill();

        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            Ok(())
        } else {
            let tokens_needed = 1.0 - self.tokens;
            Err(Duration::from_secs_f64(tokens_needed / self.refill_rate))
        }
    }

    /// Take a token, sleeping until one is available.
    pub async fn acquire(&mut self) {
        while let Err(wait) = self.try_acquire() {
            sleep(wait).await;
        }
    }

    fn refill(&mut self) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_refill).as_secs_f64();
        self.tokens = (self.tokens + elapsed * self.refill_rate).min(self.capacity);
        self.last_refill = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_bucket_new() {
        let bucket = TokenBucket::new(10, 5);
        assert_eq!(bucket.capacity, 5.0);
        assert_eq!(bucket.tokens, 5.0);
        assert_eq!(bucket.refill_rate, 10.0);
    }

    #[test]
    fn test_zero_values_are_clamped() {
        let bucket = TokenBucket::new(0, 0);
        assert_eq!(bucket.capacity, 1.0);
        assert_eq!(bucket.refill_rate, 1.0);
    }

    #[test]
    fn test_token_bucket_acquire_until_empty() {
        let mut bucket = TokenBucket::new(1, 3);

        for _ in 0..3 {
            assert!(bucket.try_acquire().is_ok());
        }
        assert!(bucket.try_acquire().is_err());
    }

    #[test]
    fn test_token_bucket_returns_wait_time() {
        let mut bucket = TokenBucket::new(2, 1);
        bucket.try_acquire().unwrap();

        let wait = bucket.try_acquire().unwrap_err();
        // At 2 per second a token takes at most 500ms
        assert!(wait <= Duration::from_millis(500));
        assert!(wait > Duration::ZERO);
    }

    #[tokio::test]
    async fn test_acquire_waits_for_refill() {
        let mut bucket = TokenBucket::new(20, 1); // one token per 50ms
        bucket.acquire().await;

        let start = Instant::now();
        bucket.acquire().await;
        let waited = start.elapsed();

        assert!(waited >= Duration::from_millis(30));
        assert!(waited < Duration::from_millis(500));
    }
}
