use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use reqwest::{header, redirect, StatusCode};
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::{
    client::USER_AGENT,
    fetch::{backoff_delay, is_transient_transport, with_cancel},
    RadioBrowserError, Result, ValidateOptions, ValidationCache,
};

/// Resolves station stream URLs to their final location with `HEAD` requests.
///
/// Redirects are followed by hand so that the hop count is bounded by
/// [`ValidateOptions::max_redirects`]; server errors and transient transport
/// failures are retried on the same URL with exponential backoff.
#[derive(Clone)]
pub struct StreamValidator {
    http: reqwest::Client,
    options: ValidateOptions,
    cache: Option<Arc<ValidationCache>>,
    cancel: Option<CancellationToken>,
}

impl fmt::Debug for StreamValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamValidator")
            .field("options", &self.options)
            .field("cache", &self.cache.as_ref().map(|cache| cache.len()))
            .finish()
    }
}

impl StreamValidator {
    /// Creates a validator whose HTTP client never follows redirects itself.
    pub fn new() -> Result<Self> {
        let http = reqwest::Client::builder()
            .redirect(redirect::Policy::none())
            .build()
            .map_err(RadioBrowserError::Transport)?;

        Ok(Self {
            http,
            options: ValidateOptions::default(),
            cache: None,
            cancel: None,
        })
    }

    pub fn with_options(mut self, opts: ValidateOptions) -> Self {
        self.options = opts;
        self
    }

    /// Serves repeated validations from `cache` and stores new results in it.
    pub fn with_cache(mut self, cache: Arc<ValidationCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Aborts pending requests and backoff sleeps once `token` is cancelled.
    pub fn with_cancel_token(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Returns the URL that finally answers with a success status.
    pub async fn validate(&self, url: &str) -> Result<String> {
        if let Some(resolved) = self.cache.as_ref().and_then(|cache| cache.get(url)) {
            #[cfg(feature = "tracing")]
            tracing::debug!(%url, %resolved, "stream url served from cache");
            return Ok(resolved);
        }

        let mut current = Url::parse(url)?;
        let mut redirects = 0usize;
        let mut retries = 0usize;

        loop {
            if self.cancel.as_ref().is_some_and(CancellationToken::is_cancelled) {
                return Err(RadioBrowserError::Cancelled);
            }

            let response = with_cancel(
                self.cancel.as_ref(),
                self.http
                    .head(current.clone())
                    .header(header::USER_AGENT, USER_AGENT)
                    .timeout(Duration::from_millis(self.options.timeout_ms))
                    .send(),
            )
            .await?;

            let failure = match response {
                Ok(response) => {
                    let status = response.status();

                    if status.is_success() {
                        let resolved = String::from(current);
                        if let Some(cache) = &self.cache {
                            cache.insert(url, resolved.clone());
                        }
                        return Ok(resolved);
                    }

                    if is_followed_redirect(status) {
                        let location = response
                            .headers()
                            .get(header::LOCATION)
                            .and_then(|value| value.to_str().ok())
                            .ok_or(RadioBrowserError::MissingLocation {
                                status: status.as_u16(),
                            })?;
                        let next = current.join(location)?;

                        redirects += 1;
                        if redirects > self.options.max_redirects {
                            return Err(RadioBrowserError::TooManyRedirects {
                                limit: self.options.max_redirects,
                            });
                        }

                        #[cfg(feature = "tracing")]
                        tracing::debug!(from = %current, to = %next, redirects, "following redirect");

                        current = next;
                        continue;
                    }

                    let error = RadioBrowserError::Http {
                        status: status.as_u16(),
                        body: String::new(),
                    };
                    if !status.is_server_error() {
                        return Err(error);
                    }
                    error
                }
                Err(err) if is_transient_transport(&err) => RadioBrowserError::Transport(err),
                Err(err) => return Err(RadioBrowserError::Transport(err)),
            };

            if retries >= self.options.max_retries {
                return Err(failure);
            }

            let delay = backoff_delay(self.options.retry_backoff_ms, retries + 1);

            #[cfg(feature = "tracing")]
            tracing::debug!(
                url = %current,
                retry = retries + 1,
                delay_ms = delay.as_millis() as u64,
                error = %failure,
                "retrying stream validation"
            );

            with_cancel(self.cancel.as_ref(), sleep(delay)).await?;
            retries += 1;
        }
    }
}

fn is_followed_redirect(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::MOVED_PERMANENTLY
            | StatusCode::FOUND
            | StatusCode::SEE_OTHER
            | StatusCode::TEMPORARY_REDIRECT
            | StatusCode::PERMANENT_REDIRECT
    )
}
