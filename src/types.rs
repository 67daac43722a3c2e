use serde::{Deserialize, Deserializer};

/// Country entry from `/json/countries`.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Country {
    pub name: String,
    #[serde(default)]
    pub iso_3166_1: Option<String>,
    #[serde(default)]
    pub stationcount: u32,
}

/// Station entry from the `/json/stations/*` endpoints.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Station {
    pub stationuuid: String,
    pub name: String,
    /// Stream URL as submitted; may redirect or point at a playlist.
    #[serde(default)]
    pub url: String,
    /// Stream URL after the directory's own resolution.
    #[serde(default)]
    pub url_resolved: String,
    #[serde(default)]
    pub homepage: String,
    #[serde(default)]
    pub favicon: String,
    /// Comma-separated tag list.
    #[serde(default)]
    pub tags: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub countrycode: String,
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub codec: String,
    /// Kbit/s; 0 when unknown.
    #[serde(default)]
    pub bitrate: u32,
    #[serde(default, deserialize_with = "flag")]
    pub hls: bool,
    #[serde(default, deserialize_with = "flag")]
    pub lastcheckok: bool,
}

impl Station {
    /// Preferred URL for playback: the resolved one when present.
    pub fn stream_url(&self) -> &str {
        if self.url_resolved.is_empty() {
            &self.url
        } else {
            &self.url_resolved
        }
    }

    pub fn tag_list(&self) -> impl Iterator<Item = &str> {
        self.tags
            .split(',')
            .map(str::trim)
            .filter(|tag| !tag.is_empty())
    }
}

// The directory encodes booleans as 0/1.
fn flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
    }

    Ok(match Flag::deserialize(deserializer)? {
        Flag::Bool(value) => value,
        Flag::Int(value) => value != 0,
    })
}

/// One 1-based page of an owned list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub per_page: usize,
    pub total_items: usize,
    pub total_pages: usize,
}

impl<T> Page<T> {
    /// Page size used by the station list.
    pub const STATIONS_PER_PAGE: usize = 16;

    /// Cuts page `page` out of `items`.
    ///
    /// Page 0 is read as page 1; pages past the end are empty. A `per_page`
    /// of 0 is treated as 1.
    pub fn of(items: Vec<T>, page: usize, per_page: usize) -> Self {
        let per_page = per_page.max(1);
        let page = page.max(1);
        let total_items = items.len();
        let total_pages = total_items.div_ceil(per_page);
        let start = (page - 1).saturating_mul(per_page).min(total_items);
        let end = start.saturating_add(per_page).min(total_items);

        Self {
            items: items.into_iter().skip(start).take(end - start).collect(),
            page,
            per_page,
            total_items,
            total_pages,
        }
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }
}
