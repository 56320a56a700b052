use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
};
use std::{
    collections::HashMap,
    net::{IpAddr, SocketAddr},
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::sync::Mutex;

use crate::error::AppError;
use crate::AppState;

/// Fixed window applied to credential endpoints only. Single-instance scope;
/// durable state never lives here.
const MAX_ATTEMPTS: u32 = 10;
const WINDOW: Duration = Duration::from_secs(60);

#[derive(Clone, Default)]
pub struct RateLimitState {
    windows: Arc<Mutex<HashMap<IpAddr, Window>>>,
}

struct Window {
    attempts: u32,
    opened_at: Instant,
}

impl RateLimitState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one attempt for `ip`. Returns `false` once the window is full.
    pub async fn allow(&self, ip: IpAddr) -> bool {
        let mut windows = self.windows.lock().await;
        let now = Instant::now();

        // Drop stale windows while we hold the lock anyway.
        windows.retain(|_, w| now.duration_since(w.opened_at) < WINDOW);

        let window = windows.entry(ip).or_insert(Window {
            attempts: 0,
            opened_at: now,
        });

        if window.attempts >= MAX_ATTEMPTS {
            return false;
        }
        window.attempts += 1;
        true
    }
}

pub async fn rate_limit_auth(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    if !state.rate_limiter.allow(addr.ip()).await {
        tracing::warn!(ip = %addr.ip(), "Auth rate limit exceeded");
        return Err(AppError::RateLimited);
    }
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ip(last: u8) -> IpAddr {
        IpAddr::from([127, 0, 0, last])
    }

    #[tokio::test]
    async fn test_allows_up_to_limit() {
        let limiter = RateLimitState::new();
        for i in 0..MAX_ATTEMPTS {
            assert!(limiter.allow(ip(1)).await, "attempt {} should pass", i + 1);
        }
    }

    #[tokio::test]
    async fn test_blocks_past_limit() {
        let limiter = RateLimitState::new();
        for _ in 0..MAX_ATTEMPTS {
            limiter.allow(ip(1)).await;
        }
        assert!(!limiter.allow(ip(1)).await);
    }

    #[tokio::test]
    async fn test_addresses_are_independent() {
        let limiter = RateLimitState::new();
        for _ in 0..MAX_ATTEMPTS {
            limiter.allow(ip(1)).await;
        }
        assert!(limiter.allow(ip(2)).await);
    }
}
