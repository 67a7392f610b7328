//! Clock seam for break pauses

use async_trait::async_trait;
use std::time::Duration;

/// Sleep source used for break segments, swappable in tests
#[async_trait]
pub trait Timer: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Timer backed by the tokio clock
pub struct TokioTimer;

#[async_trait]
impl Timer for TokioTimer {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
