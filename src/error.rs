/// Error type returned by this crate.
#[derive(Debug, thiserror::Error)]
pub enum RadioBrowserError {
    /// Network or request execution error from `reqwest`.
    #[error("transport error: {0}")]
    Transport(reqwest::Error),
    /// Non-success HTTP status code with raw response body.
    #[error("http error {status}: {body}")]
    Http { status: u16, body: String },
    /// Response body was not the expected JSON shape.
    #[error("decode error: {0}")]
    Decode(String),
    /// A mirror base or stream URL could not be parsed.
    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    /// Invalid client configuration, such as an empty mirror list.
    #[error("configuration error: {0}")]
    Config(String),
    /// Every endpoint exhausted its attempt budget.
    #[error(
        "all {endpoints_tried} endpoint(s) failed after {attempts} attempt(s); last error: {last_error}"
    )]
    AllEndpointsFailed {
        /// Number of endpoints that were contacted.
        endpoints_tried: usize,
        /// Total number of requests issued across all endpoints.
        attempts: usize,
        /// The last failure observed before giving up.
        #[source]
        last_error: Box<RadioBrowserError>,
    },
    /// The caller's cancellation token fired before the call resolved.
    #[error("request cancelled")]
    Cancelled,
    /// Stream validation followed more redirects than allowed.
    #[error("too many redirects (limit {limit})")]
    TooManyRedirects { limit: usize },
    /// A redirect status arrived without a `Location` header.
    #[error("redirect status {status} without Location header")]
    MissingLocation { status: u16 },
}

impl RadioBrowserError {
    /// Returns the last underlying error for aggregate failures, or `self`.
    pub fn last_error(&self) -> &RadioBrowserError {
        match self {
            Self::AllEndpointsFailed { last_error, .. } => &**last_error,
            other => other,
        }
    }
}
