//! Expense charts for a personal expense tracker.
//!
//! This library turns chart search results from the tracker's backend into
//! ECharts bar or pie charts of expenses per category, or per day within one
//! category. It covers the whole client-side flow for one domain
//! (household utilities, car costs, ...):
//!
//! 1. read the category and year filters from the page,
//! 2. fetch `{prefix}/chart/search` from the backend,
//! 3. group the returned records into a labelled, coloured series,
//! 4. update the chart in place, including its "No Results!" state,
//! 5. rebind the search button whenever a partial page update replaces it.
//!
//! The page itself is abstracted behind [page::Page]. The `web` feature
//! provides the browser implementation, and the `cli` feature (on by
//! default) provides a headless one for rendering charts from saved search
//! results.

#![warn(missing_docs)]

pub mod aggregation;
pub mod app;
pub mod chart;
pub mod color;
pub mod domain;
pub mod expense;
pub mod filters;
#[cfg(feature = "cli")]
pub mod headless;
pub mod navigation;
pub mod page;
pub mod query;
pub mod theme;
#[cfg(feature = "web")]
pub mod web;

#[cfg(test)]
mod test_utils;

pub use aggregation::{AggregationMode, ChartSeries, ExpenseAggregator};
pub use app::{ChartApp, SwapAction};
pub use chart::{ChartConfig, ChartHandle, ChartKind, ChartState, LegendEntry};
pub use color::CategoryColorMap;
pub use domain::DomainConfig;
pub use expense::{ExpenseRecord, FieldNames};
pub use filters::{FilterState, SearchRequest};
pub use query::{ExpenseSource, QueryController, RefreshOutcome};
pub use theme::Theme;

/// The errors that may occur while producing a chart.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// An element the chart needs is not on the page.
    ///
    /// The chart surface must exist before a chart is created, and the filter
    /// controls must exist before a search runs.
    #[error("the page has no element with the ID \"{0}\"")]
    MissingElement(String),

    /// The search request could not be completed.
    ///
    /// Covers network errors and error responses from the backend.
    #[error("could not fetch chart data: {0}")]
    Fetch(String),

    /// The search response is not a JSON array of records.
    #[error("the chart data is not a JSON array: {0}")]
    InvalidPayload(String),

    /// A record in the search response is missing a field or a field has the
    /// wrong type.
    #[error("expense record {index} is invalid: {reason}")]
    InvalidRecord {
        /// The position of the record in the response.
        index: usize,
        /// What is wrong with the record.
        reason: String,
    },

    /// A record's date is not a `YYYY-MM-DD` date or RFC 3339 timestamp.
    #[error("could not parse the date \"{0}\"")]
    InvalidDate(String),

    /// A domain configuration could not be loaded.
    #[error("{0}")]
    Config(String),

    /// A rendered chart could not be written out.
    #[error("could not write {path}: {reason}")]
    Io {
        /// Where the chart was being written.
        path: String,
        /// The underlying I/O error.
        reason: String,
    },
}
