//! Sequential mirror fallback with per-endpoint retry and exponential backoff.
//!
//! A call walks the endpoint list in order. Each endpoint gets up to
//! [`ClientOptions::max_attempts`] requests; transient failures are retried on
//! the same endpoint after a backoff sleep, anything else moves on to the next
//! endpoint. Only the aggregate [`RadioBrowserError::AllEndpointsFailed`]
//! leaves this module.

use std::future::Future;
use std::time::Duration;

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

use crate::{ClientOptions, RadioBrowserError, RequestOptions, Result};

/// Backoff before retrying after the given 1-based attempt.
///
/// `base × 2^(attempt − 1)`, with the exponent clamped at 16.
pub fn backoff_delay(base_ms: u64, attempt: usize) -> Duration {
    let exp = attempt.saturating_sub(1).min(16) as u32;
    let multiplier = 1u64 << exp;
    Duration::from_millis(base_ms.saturating_mul(multiplier))
}

/// Failure of one request, classified for the traversal.
#[derive(Debug)]
enum Failure {
    /// Worth retrying on the same endpoint.
    Transient(RadioBrowserError),
    /// The endpoint is unusable for this call.
    Fatal(RadioBrowserError),
}

impl Failure {
    fn is_transient(&self) -> bool {
        matches!(self, Self::Transient(_))
    }

    fn into_error(self) -> RadioBrowserError {
        match self {
            Self::Transient(err) | Self::Fatal(err) => err,
        }
    }
}

/// Ephemeral bookkeeping for one request of a logical call.
#[cfg_attr(not(feature = "tracing"), allow(dead_code))]
#[derive(Clone, Copy, Debug)]
struct Attempt {
    endpoint_index: usize,
    attempt: usize,
}

/// Executes JSON requests against an ordered list of equivalent endpoints.
#[derive(Clone, Debug)]
pub struct ResilientFetch {
    http: reqwest::Client,
    options: ClientOptions,
}

impl Default for ResilientFetch {
    fn default() -> Self {
        Self::new(ClientOptions::default())
    }
}

impl ResilientFetch {
    pub fn new(options: ClientOptions) -> Self {
        Self::with_http_client(reqwest::Client::new(), options)
    }

    /// Reuses an existing `reqwest` client (and its connection pool).
    pub fn with_http_client(http: reqwest::Client, options: ClientOptions) -> Self {
        Self { http, options }
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Returns the decoded body of the first endpoint that answers with a 2xx
    /// JSON response.
    ///
    /// Fails with [`RadioBrowserError::AllEndpointsFailed`] once every endpoint
    /// has used up its attempts, with [`RadioBrowserError::Cancelled`] when
    /// `cancel` fires, and with [`RadioBrowserError::Config`] for an empty list.
    pub async fn fetch<T: DeserializeOwned>(
        &self,
        urls: &[String],
        request: &RequestOptions,
        cancel: Option<&CancellationToken>,
    ) -> Result<T> {
        if urls.is_empty() {
            return Err(RadioBrowserError::Config(
                "endpoint list must not be empty".to_owned(),
            ));
        }

        let max_attempts = self.options.max_attempts.max(1);
        let mut attempts = 0usize;
        let mut endpoints_tried = 0usize;
        let mut last_error = None;

        for (endpoint_index, url) in urls.iter().enumerate() {
            endpoints_tried += 1;

            for attempt in 1..=max_attempts {
                if cancel.is_some_and(CancellationToken::is_cancelled) {
                    return Err(RadioBrowserError::Cancelled);
                }

                let record = Attempt {
                    endpoint_index,
                    attempt,
                };
                attempts += 1;

                #[cfg(feature = "tracing")]
                tracing::debug!(
                    endpoint = record.endpoint_index,
                    attempt = record.attempt,
                    %url,
                    "fetching endpoint"
                );

                let failure = match with_cancel(cancel, self.send::<T>(url, request)).await? {
                    Ok(value) => {
                        #[cfg(feature = "tracing")]
                        tracing::debug!(
                            endpoint = record.endpoint_index,
                            attempt = record.attempt,
                            "endpoint succeeded"
                        );
                        return Ok(value);
                    }
                    Err(failure) => failure,
                };

                let transient = failure.is_transient();
                let error = failure.into_error();

                #[cfg(feature = "tracing")]
                tracing::warn!(
                    endpoint = record.endpoint_index,
                    attempt = record.attempt,
                    transient,
                    error = %error,
                    "endpoint attempt failed"
                );

                last_error = Some(error);

                if !transient {
                    break;
                }

                let exhausted = endpoint_index + 1 == urls.len() && attempt == max_attempts;
                if exhausted {
                    break;
                }

                let delay = backoff_delay(self.options.retry_backoff_ms, record.attempt);

                #[cfg(feature = "tracing")]
                tracing::debug!(
                    endpoint = record.endpoint_index,
                    attempt = record.attempt,
                    delay_ms = delay.as_millis() as u64,
                    "backing off before next attempt"
                );

                with_cancel(cancel, sleep(delay)).await?;
            }
        }

        let last_error = last_error.unwrap_or_else(|| {
            RadioBrowserError::Config("no request was attempted".to_owned())
        });

        #[cfg(feature = "tracing")]
        tracing::error!(endpoints_tried, attempts, error = %last_error, "all endpoints failed");

        Err(RadioBrowserError::AllEndpointsFailed {
            endpoints_tried,
            attempts,
            last_error: Box::new(last_error),
        })
    }

    async fn send<T: DeserializeOwned>(
        &self,
        url: &str,
        request: &RequestOptions,
    ) -> std::result::Result<T, Failure> {
        let response = self
            .http
            .request(request.method.clone(), url)
            .headers(request.headers.clone())
            .timeout(Duration::from_millis(self.options.timeout_ms))
            .send()
            .await
            .map_err(classify_transport)?;

        let status = response.status();

        if !status.is_success() {
            // Retryability follows the status; an unreadable error body is dropped.
            let body = response.text().await.unwrap_or_default();
            let error = RadioBrowserError::Http {
                status: status.as_u16(),
                body: truncate_body(body),
            };
            return Err(if self.should_retry_status(status) {
                Failure::Transient(error)
            } else {
                Failure::Fatal(error)
            });
        }

        let body = response.text().await.map_err(classify_transport)?;
        serde_json::from_str::<T>(&body).map_err(|err| {
            Failure::Fatal(RadioBrowserError::Decode(format!(
                "invalid JSON response from {url}: {err}"
            )))
        })
    }

    fn should_retry_status(&self, status: StatusCode) -> bool {
        self.options.retry_on_status.contains(&status.as_u16())
    }
}

/// Longest error body kept in [`RadioBrowserError::Http`], in bytes.
pub(crate) const MAX_ERROR_BODY: usize = 1024;

fn truncate_body(mut body: String) -> String {
    if body.len() <= MAX_ERROR_BODY {
        return body;
    }
    let mut end = MAX_ERROR_BODY;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    body.truncate(end);
    body.push_str("...");
    body
}

fn classify_transport(err: reqwest::Error) -> Failure {
    if is_transient_transport(&err) {
        Failure::Transient(RadioBrowserError::Transport(err))
    } else {
        Failure::Fatal(RadioBrowserError::Transport(err))
    }
}

pub(crate) fn is_transient_transport(err: &reqwest::Error) -> bool {
    err.is_timeout() || err.is_connect() || err.is_request() || err.is_body()
}

/// Races `fut` against the cancellation token, dropping `fut` if it fires.
pub(crate) async fn with_cancel<F: Future>(
    cancel: Option<&CancellationToken>,
    fut: F,
) -> Result<F::Output> {
    match cancel {
        Some(token) => tokio::select! {
            biased;
            _ = token.cancelled() => Err(RadioBrowserError::Cancelled),
            output = fut => Ok(output),
        },
        None => Ok(fut.await),
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::{backoff_delay, truncate_body, ResilientFetch, MAX_ERROR_BODY};
    use crate::{RadioBrowserError, RequestOptions};

    #[test]
    fn backoff_doubles_from_base() {
        assert_eq!(backoff_delay(300, 1), Duration::from_millis(300));
        assert_eq!(backoff_delay(300, 2), Duration::from_millis(600));
        assert_eq!(backoff_delay(300, 3), Duration::from_millis(1200));
    }

    #[test]
    fn backoff_saturates_instead_of_overflowing() {
        assert_eq!(backoff_delay(300, 0), Duration::from_millis(300));
        assert_eq!(backoff_delay(u64::MAX, 40), Duration::from_millis(u64::MAX));
        assert_eq!(backoff_delay(1, 40), Duration::from_millis(1 << 16));
    }

    #[test]
    fn error_body_is_cut_at_char_boundary() {
        assert_eq!(truncate_body("short".to_owned()), "short");

        let long = "é".repeat(MAX_ERROR_BODY);
        let cut = truncate_body(long);
        assert!(cut.ends_with("..."));
        assert!(cut.len() <= MAX_ERROR_BODY + 3);
        assert!(cut.trim_end_matches("...").chars().all(|c| c == 'é'));
    }

    #[tokio::test]
    async fn empty_endpoint_list_is_a_config_error() {
        let fetch = ResilientFetch::default();
        let err = fetch
            .fetch::<serde_json::Value>(&[], &RequestOptions::get(), None)
            .await
            .expect_err("empty list must fail");
        assert!(matches!(err, RadioBrowserError::Config(_)));
    }
}
