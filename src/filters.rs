//! Search filters read from the page and the request they produce.

use serde::Serialize;

use crate::{
    Error,
    page::{CATEGORY_FILTER_ID, Page, YEAR_FILTER_ID},
};

/// The category and year selected in the search controls.
///
/// Read from the page each time a search runs, never cached.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    /// The selected category, `None` for all categories.
    pub category: Option<String>,
    /// The selected year, `None` for the backend's default.
    pub year: Option<String>,
}

impl FilterState {
    /// Read the filter controls from `page`.
    ///
    /// Blank values are treated as unset.
    ///
    /// # Errors
    ///
    /// Returns [Error::MissingElement] if either control is not on the page.
    pub fn read<P: Page>(page: &P) -> Result<Self, Error> {
        let read_control = |id: &str| {
            page.control_value(id)
                .map(non_blank)
                .ok_or_else(|| Error::MissingElement(id.to_owned()))
        };

        Ok(Self {
            category: read_control(CATEGORY_FILTER_ID)?,
            year: read_control(YEAR_FILTER_ID)?,
        })
    }
}

fn non_blank(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

/// The query string of a chart search.
#[derive(Serialize)]
struct SearchQuery<'a> {
    #[serde(rename = "type")]
    category: &'a str,
    year: &'a str,
}

/// A chart search against one domain's endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    url: String,
}

impl SearchRequest {
    /// Build the search URL `{prefix}/chart/search?type={category}&year={year}`.
    ///
    /// Both parameters are always sent, unset filters as empty values.
    ///
    /// # Errors
    ///
    /// Returns [Error::InvalidPayload] if the query string cannot be encoded.
    pub fn new(endpoint_prefix: &str, filters: &FilterState) -> Result<Self, Error> {
        let query = serde_urlencoded::to_string(SearchQuery {
            category: filters.category.as_deref().unwrap_or_default(),
            year: filters.year.as_deref().unwrap_or_default(),
        })
        .map_err(|error| Error::InvalidPayload(error.to_string()))?;

        Ok(Self {
            url: format!("{endpoint_prefix}/chart/search?{query}"),
        })
    }

    /// The URL relative to the page's base URL.
    pub fn url(&self) -> &str {
        &self.url
    }
}
