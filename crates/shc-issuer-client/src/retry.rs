//! Backoff for key set requests.
//!
//! Issuer key sets are usually served from static hosting behind a CDN,
//! where brief gateway errors and rate limiting are common. Transport
//! failures and the transient statuses in [`is_transient`] are retried;
//! any other response is handed back on the first attempt.

use std::time::Duration;

use reqwest::StatusCode;

/// How many times, and how far apart, a request is retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RetryPolicy {
    pub(crate) max_retries: u32,
    pub(crate) base_delay: Duration,
}

impl RetryPolicy {
    /// Delay before retry number `attempt` (zero-based). Doubles each time.
    fn delay(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(2u32.saturating_pow(attempt))
    }
}

/// Statuses worth asking again for.
pub(crate) fn is_transient(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::TOO_MANY_REQUESTS
            | StatusCode::BAD_GATEWAY
            | StatusCode::SERVICE_UNAVAILABLE
            | StatusCode::GATEWAY_TIMEOUT
    )
}

/// Send a request under `policy`.
///
/// The last attempt's result is returned whatever it is, so a status that
/// stays transient reaches the caller as a normal response.
pub(crate) async fn send_with_retry<F, Fut>(
    policy: RetryPolicy,
    url: &str,
    send: F,
) -> Result<reqwest::Response, reqwest::Error>
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = Result<reqwest::Response, reqwest::Error>>,
{
    let mut attempt = 0;
    loop {
        let result = send().await;
        let reason = match &result {
            Ok(resp) if is_transient(resp.status()) => Some(resp.status().to_string()),
            Ok(_) => None,
            Err(e) => Some(e.to_string()),
        };
        let Some(reason) = reason else {
            return result;
        };
        if attempt >= policy.max_retries {
            return result;
        }
        let delay = policy.delay(attempt);
        attempt += 1;
        tracing::warn!(
            url,
            attempt,
            max_retries = policy.max_retries,
            %reason,
            "key set request failed, retrying in {delay:?}"
        );
        tokio::time::sleep(delay).await;
    }
}
