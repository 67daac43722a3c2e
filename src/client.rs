use std::fmt;

use reqwest::header::{self, HeaderValue};
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;

use crate::{
    ClientOptions, Country, MirrorSet, RequestOptions, ResilientFetch, Result, Station,
};

/// `User-Agent` sent with every request; the directory asks clients to identify themselves.
pub(crate) const USER_AGENT: &str = concat!("radiobrowser-http/", env!("CARGO_PKG_VERSION"));

#[derive(Clone)]
/// Client for the radio-browser directory with mirror fallback.
///
/// Clones share the underlying connection pool but no retry state. Give each
/// independent consumer its own clone with [`RadioBrowserClient::with_cancel_token`]
/// to be able to abandon its in-flight calls.
pub struct RadioBrowserClient {
    fetch: ResilientFetch,
    mirrors: MirrorSet,
    cancel: Option<CancellationToken>,
}

impl fmt::Debug for RadioBrowserClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RadioBrowserClient")
            .field("mirrors", &self.mirrors)
            .field("options", self.fetch.options())
            .field("cancellable", &self.cancel.is_some())
            .finish()
    }
}

impl Default for RadioBrowserClient {
    fn default() -> Self {
        Self::new()
    }
}

impl RadioBrowserClient {
    /// Creates a client for the public mirrors in [`crate::DEFAULT_MIRRORS`].
    pub fn new() -> Self {
        Self::with_mirrors(MirrorSet::default())
    }

    /// Creates a client for a custom mirror set.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use radiobrowser_http::{MirrorSet, RadioBrowserClient};
    ///
    /// let mirrors = MirrorSet::new(["https://de1.api.radio-browser.info"])?;
    /// let client = RadioBrowserClient::with_mirrors(mirrors);
    /// # Ok::<(), radiobrowser_http::RadioBrowserError>(())
    /// ```
    pub fn with_mirrors(mirrors: MirrorSet) -> Self {
        Self {
            fetch: ResilientFetch::default(),
            mirrors,
            cancel: None,
        }
    }

    /// Creates a client from the `RADIO_BROWSER_MIRRORS` environment variable.
    ///
    /// See [`MirrorSet::from_env`].
    pub fn from_env() -> Result<Self> {
        Ok(Self::with_mirrors(MirrorSet::from_env()?))
    }

    /// Applies timeout and retry options; the connection pool is kept.
    pub fn with_options(mut self, opts: ClientOptions) -> Self {
        self.fetch = ResilientFetch::with_http_client(self.http().clone(), opts);
        self
    }

    /// Makes every call of this client abortable through `token`.
    pub fn with_cancel_token(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn mirrors(&self) -> &MirrorSet {
        &self.mirrors
    }

    pub fn options(&self) -> &ClientOptions {
        self.fetch.options()
    }

    /// Lists countries with their station counts.
    pub async fn countries(&self) -> Result<Vec<Country>> {
        self.fetch_json("/json/countries", "").await
    }

    /// Lists stations registered for `country` (matched by exact name).
    pub async fn stations_by_country(&self, country: &str) -> Result<Vec<Station>> {
        let urls = self
            .mirrors
            .segment_urls(&["json", "stations", "bycountry", country]);
        self.fetch_urls(&urls).await
    }

    /// Looks up a single station; `None` when the directory does not know it.
    pub async fn station_by_uuid(&self, stationuuid: &str) -> Result<Option<Station>> {
        let urls = self
            .mirrors
            .segment_urls(&["json", "stations", "byuuid", stationuuid.trim()]);
        let stations: Vec<Station> = self.fetch_urls(&urls).await?;
        Ok(stations.into_iter().next())
    }

    /// Fetches any directory endpoint, e.g. `("/json/tags", "")`.
    ///
    /// `endpoint` and `suffix` are appended to each mirror verbatim.
    pub async fn fetch_json<T: DeserializeOwned>(&self, endpoint: &str, suffix: &str) -> Result<T> {
        let urls = self.mirrors.api_urls(endpoint, suffix);
        self.fetch_urls(&urls).await
    }

    async fn fetch_urls<T: DeserializeOwned>(&self, urls: &[String]) -> Result<T> {
        let mut request = RequestOptions::get();
        request
            .headers
            .insert(header::USER_AGENT, HeaderValue::from_static(USER_AGENT));
        request
            .headers
            .insert(header::ACCEPT, HeaderValue::from_static("application/json"));

        self.fetch.fetch(urls, &request, self.cancel.as_ref()).await
    }

    fn http(&self) -> &reqwest::Client {
        self.fetch.http()
    }
}
