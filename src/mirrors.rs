use std::env::VarError;
use std::fmt;

use url::Url;

use crate::{RadioBrowserError, Result};

/// Mirror hosts of the radio-browser directory API, in priority order.
pub const DEFAULT_MIRRORS: [&str; 3] = [
    "https://de1.api.radio-browser.info",
    "https://at1.api.radio-browser.info",
    "https://nl1.api.radio-browser.info",
];

/// Environment variable holding a comma-separated mirror list.
pub const MIRRORS_ENV: &str = "RADIO_BROWSER_MIRRORS";

/// Ordered, non-empty set of interchangeable API base URLs.
///
/// Order defines priority: the first mirror is always tried first.
#[derive(Clone, PartialEq, Eq)]
pub struct MirrorSet {
    bases: Vec<Url>,
}

impl fmt::Debug for MirrorSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.bases.iter().map(Url::as_str))
            .finish()
    }
}

impl Default for MirrorSet {
    fn default() -> Self {
        Self {
            bases: DEFAULT_MIRRORS
                .iter()
                .filter_map(|base| Url::parse(base).ok())
                .collect(),
        }
    }
}

impl MirrorSet {
    /// Builds a mirror set from base URLs.
    ///
    /// Fails when the list is empty or any base is not an `http`/`https` URL.
    pub fn new<I, S>(bases: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let bases = bases
            .into_iter()
            .map(|base| parse_base(base.as_ref()))
            .collect::<Result<Vec<_>>>()?;

        if bases.is_empty() {
            return Err(RadioBrowserError::Config(
                "mirror list must not be empty".to_owned(),
            ));
        }

        Ok(Self { bases })
    }

    /// Reads mirrors from `RADIO_BROWSER_MIRRORS`.
    ///
    /// Falls back to [`DEFAULT_MIRRORS`] when the variable is unset. A variable
    /// that is set but lists no mirrors is a configuration error.
    pub fn from_env() -> Result<Self> {
        Self::from_env_value(std::env::var(MIRRORS_ENV))
    }

    fn from_env_value(value: std::result::Result<String, VarError>) -> Result<Self> {
        let raw = match value {
            Ok(raw) => raw,
            Err(VarError::NotPresent) => return Ok(Self::default()),
            Err(VarError::NotUnicode(_)) => {
                return Err(RadioBrowserError::Config(format!(
                    "{MIRRORS_ENV} is not valid unicode"
                )))
            }
        };

        let bases: Vec<&str> = raw
            .split(',')
            .map(str::trim)
            .filter(|base| !base.is_empty())
            .collect();
        if bases.is_empty() {
            return Err(RadioBrowserError::Config(format!(
                "{MIRRORS_ENV} is set but empty"
            )));
        }
        Self::new(bases)
    }

    pub fn len(&self) -> usize {
        self.bases.len()
    }

    /// Never true for a set built through [`MirrorSet::new`].
    pub fn is_empty(&self) -> bool {
        self.bases.is_empty()
    }

    pub fn bases(&self) -> impl Iterator<Item = &str> {
        self.bases.iter().map(Url::as_str)
    }

    /// Produces one URL per mirror by appending `endpoint` and `suffix` verbatim.
    ///
    /// Example: `("/json/countries", "")` →
    /// `["https://de1.api.radio-browser.info/json/countries", ...]`
    pub fn api_urls(&self, endpoint: &str, suffix: &str) -> Vec<String> {
        self.bases
            .iter()
            .map(|base| format!("{}{endpoint}{suffix}", base.as_str().trim_end_matches('/')))
            .collect()
    }

    /// Produces one URL per mirror by appending percent-encoded path segments.
    pub fn segment_urls(&self, segments: &[&str]) -> Vec<String> {
        self.bases
            .iter()
            .map(|base| {
                let mut url = base.clone();
                if let Ok(mut path) = url.path_segments_mut() {
                    path.pop_if_empty().extend(segments);
                }
                String::from(url)
            })
            .collect()
    }
}

fn parse_base(base: &str) -> Result<Url> {
    let url = Url::parse(base.trim())?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(RadioBrowserError::Config(format!(
            "unsupported mirror scheme '{other}' in {base}"
        ))),
    }
}
