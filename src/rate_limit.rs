use std::net::{IpAddr, SocketAddr};

use axum::extract::{ConnectInfo, Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use governor::clock::DefaultClock;
use governor::state::keyed::DefaultKeyedStateStore;
use governor::{Quota, RateLimiter};

use crate::routes::ApiError;
use crate::startup::AppState;

/// Per-client-IP request throttle guarding the write-heavy endpoints.
///
/// One shared instance sits behind both rate-limited routes, so a client
/// burning its budget on one of them is throttled on the other as well.
pub struct IpRateLimiter {
    limiter: RateLimiter<IpAddr, DefaultKeyedStateStore<IpAddr>, DefaultClock>,
}

impl IpRateLimiter {
    pub fn new(quota: Quota) -> Self {
        Self {
            limiter: RateLimiter::keyed(quota),
        }
    }

    /// Returns true when the request is within budget for this client.
    pub fn check(&self, client: IpAddr) -> bool {
        self.limiter.check_key(&client).is_ok()
    }
}

/// Axum middleware rejecting over-quota requests before they reach the
/// handler.
pub async fn enforce_rate_limit(
    State(state): State<AppState>,
    ConnectInfo(client): ConnectInfo<SocketAddr>,
    request: Request,
    next: Next,
) -> Response {
    if state.rate_limiter.check(client.ip()) {
        next.run(request).await
    } else {
        tracing::warn!("Rate limit exceeded for {}", client.ip());
        ApiError::RateLimited.into_response()
    }
}
