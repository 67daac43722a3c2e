use reqwest::{header::HeaderMap, Method};

/// Configures per-attempt timeout, retry budget and backoff for directory calls.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ClientOptions {
    /// Per-attempt timeout in milliseconds.
    pub timeout_ms: u64,
    /// Maximum number of attempts against a single endpoint before moving on.
    pub max_attempts: usize,
    /// Base retry backoff in milliseconds, doubled on every attempt.
    pub retry_backoff_ms: u64,
    /// HTTP status codes treated as transient and retried on the same endpoint.
    pub retry_on_status: Vec<u16>,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout_ms: 10_000,
            max_attempts: 3,
            retry_backoff_ms: 300,
            retry_on_status: vec![500, 502, 503, 504],
        }
    }
}

/// Method and headers applied to every attempt of a single logical call.
#[derive(Clone, Debug)]
pub struct RequestOptions {
    pub method: Method,
    pub headers: HeaderMap,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            method: Method::GET,
            headers: HeaderMap::new(),
        }
    }
}

impl RequestOptions {
    /// A plain `GET` with no extra headers.
    pub fn get() -> Self {
        Self::default()
    }

    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }
}

/// Configures the stream URL validator.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ValidateOptions {
    /// Per-request timeout in milliseconds.
    pub timeout_ms: u64,
    /// Redirects followed before giving up.
    pub max_redirects: usize,
    /// Retries after the first failed request to the same URL.
    pub max_retries: usize,
    /// Base retry backoff in milliseconds (exponential strategy).
    pub retry_backoff_ms: u64,
}

impl Default for ValidateOptions {
    fn default() -> Self {
        Self {
            timeout_ms: 10_000,
            max_redirects: 5,
            max_retries: 3,
            retry_backoff_ms: 500,
        }
    }
}
