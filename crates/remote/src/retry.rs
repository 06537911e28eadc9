use std::future::Future;
use std::time::Duration;

#[derive(Debug, Clone, Copy)]
pub struct RetrySettings {
    pub max_retries: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self { max_retries: 3, initial_backoff_ms: 1000, max_backoff_ms: 30_000 }
    }
}

impl RetrySettings {
    fn backoff_for(&self, attempt: u32) -> Duration {
        let scaled = self.initial_backoff_ms.saturating_mul(1u64 << attempt.min(16));
        Duration::from_millis(scaled.min(self.max_backoff_ms))
    }
}

/// Retries `op` up to `settings.max_retries` times with doubling backoff,
/// capped at `max_backoff_ms`. Returns the last error if every attempt fails.
pub async fn retry_with_backoff<T, E, F, Fut>(settings: &RetrySettings, mut op: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut attempt = 0;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if attempt >= settings.max_retries {
                    return Err(err);
                }
                tokio::time::sleep(settings.backoff_for(attempt)).await;
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    #[tokio::test]
    async fn succeeds_immediately_without_sleeping() {
        let settings = RetrySettings { max_retries: 3, initial_backoff_ms: 0, max_backoff_ms: 0 };
        let result: Result<u32, &str> = retry_with_backoff(&settings, || async { Ok(7) }).await;
        assert_eq!(result.unwrap(), 7);
    }

    #[tokio::test]
    async fn retries_until_success() {
        let settings = RetrySettings { max_retries: 3, initial_backoff_ms: 0, max_backoff_ms: 0 };
        let calls = AtomicU32::new(0);
        let result: Result<u32, &str> = retry_with_backoff(&settings, || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move { if n < 2 { Err("not yet") } else { Ok(n) } }
        })
        .await;
        assert_eq!(result.unwrap(), 2);
    }

    #[tokio::test]
    async fn gives_up_after_max_retries() {
        let settings = RetrySettings { max_retries: 2, initial_backoff_ms: 0, max_backoff_ms: 0 };
        let calls = AtomicU32::new(0);
        let result: Result<u32, &str> = retry_with_backoff(&settings, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err("always fails") }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn backoff_doubles_then_caps() {
        let settings = RetrySettings { max_retries: 5, initial_backoff_ms: 1000, max_backoff_ms: 3000 };
        assert_eq!(settings.backoff_for(0), Duration::from_millis(1000));
        assert_eq!(settings.backoff_for(1), Duration::from_millis(2000));
        assert_eq!(settings.backoff_for(2), Duration::from_millis(3000));
        assert_eq!(settings.backoff_for(3), Duration::from_millis(3000));
    }
}
