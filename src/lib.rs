//! `radiobrowser-http` is an async client for the radio-browser station directory.
//!
//! Every directory call goes through [`ResilientFetch`], which tries an ordered
//! list of mirrors, retries transient failures with exponential backoff and
//! only fails once every mirror has been exhausted:
//! - [`RadioBrowserClient::countries`]
//! - [`RadioBrowserClient::stations_by_country`]
//! - [`RadioBrowserClient::station_by_uuid`]
//!
//! [`StreamValidator`] resolves station stream URLs through redirects.

mod cache;
mod client;
mod error;
mod fetch;
mod mirrors;
mod options;
mod types;
mod validate;

pub use cache::ValidationCache;
pub use client::RadioBrowserClient;
pub use error::RadioBrowserError;
pub use fetch::{backoff_delay, ResilientFetch};
pub use mirrors::{MirrorSet, DEFAULT_MIRRORS, MIRRORS_ENV};
pub use options::{ClientOptions, RequestOptions, ValidateOptions};
pub use types::{Country, Page, Station};
pub use validate::StreamValidator;

pub use tokio_util::sync::CancellationToken;

pub type Result<T> = std::result::Result<T, RadioBrowserError>;
