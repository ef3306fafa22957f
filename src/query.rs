//! Running a chart search and pushing the results into the chart.

use crate::{
    Error,
    aggregation::{AggregationMode, ChartSeries, ExpenseAggregator},
    chart::ChartHandle,
    domain::DomainConfig,
    expense::parse_payload,
    filters::{FilterState, SearchRequest},
    page::Page,
};

/// Where search results come from.
///
/// Implementations perform the request and hand back the raw response body,
/// decoding is left to the caller.
#[allow(async_fn_in_trait)]
pub trait ExpenseSource {
    /// Fetch the response body for `request`.
    ///
    /// # Errors
    ///
    /// Returns [Error::Fetch] if the request could not be completed.
    async fn fetch(&self, request: &SearchRequest) -> Result<String, Error>;
}

/// What a refresh did to the chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The chart now shows this many points.
    Populated(usize),
    /// The search had no results and the chart was cleared.
    Empty,
    /// A required element was missing, nothing was fetched.
    Skipped,
    /// The request or its response failed, the chart was left as it was.
    Failed,
}

/// Reads the filters, runs the search and updates the chart for one domain.
pub struct QueryController<S> {
    domain: DomainConfig,
    aggregator: ExpenseAggregator,
    source: S,
}

impl<S: ExpenseSource> QueryController<S> {
    /// Create a controller for `domain` that fetches from `source`.
    pub fn new(domain: DomainConfig, source: S) -> Self {
        let aggregator = ExpenseAggregator::new(domain.color_map());

        Self {
            domain,
            aggregator,
            source,
        }
    }

    /// The domain this controller searches.
    pub fn domain(&self) -> &DomainConfig {
        &self.domain
    }

    /// Run a search with the page's current filters and show the result.
    ///
    /// Failures never reach the caller. A missing control skips the search,
    /// and a failed request or an unreadable response is logged and leaves the
    /// chart showing its previous results.
    ///
    /// Concurrent refreshes are not coordinated: the response that arrives
    /// last is the one left on the chart.
    pub async fn refresh<P: Page>(&self, page: &P, chart: &ChartHandle<P::Surface>) -> RefreshOutcome {
        let (filters, request) = match self.prepare(page) {
            Ok(prepared) => prepared,
            Err(error) => {
                tracing::warn!("Skipping chart refresh: {error}");
                return RefreshOutcome::Skipped;
            }
        };

        tracing::debug!("Fetching chart data from {}", request.url());

        let series = match self.fetch_series(&filters, &request).await {
            Ok(series) => series,
            Err(error) => {
                tracing::error!("Error fetching chart data from {}: {error}", request.url());
                return RefreshOutcome::Failed;
            }
        };

        let outcome = if series.is_empty() {
            RefreshOutcome::Empty
        } else {
            RefreshOutcome::Populated(series.len())
        };

        chart.update(series, None);

        outcome
    }

    fn prepare<P: Page>(&self, page: &P) -> Result<(FilterState, SearchRequest), Error> {
        let filters = FilterState::read(page)?;
        let request = SearchRequest::new(&self.domain.endpoint_prefix, &filters)?;

        Ok((filters, request))
    }

    async fn fetch_series(
        &self,
        filters: &FilterState,
        request: &SearchRequest,
    ) -> Result<ChartSeries, Error> {
        let body = self.source.fetch(request).await?;
        let records = parse_payload(&body, &self.domain.fields)?;

        Ok(self.aggregator.aggregate(&records, aggregation_mode(filters)))
    }
}

/// Totals per category across all categories, or per day when the search is
/// narrowed to one category.
pub fn aggregation_mode(filters: &FilterState) -> AggregationMode {
    match filters.category {
        None => AggregationMode::ByCategory,
        Some(_) => AggregationMode::ByDate,
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        Error,
        aggregation::AggregationMode,
        chart::{ChartState, NO_RESULTS_TITLE, create},
        domain::DomainConfig,
        filters::FilterState,
        page::{CATEGORY_FILTER_ID, CHART_SURFACE_ID, YEAR_FILTER_ID},
        query::{QueryController, RefreshOutcome, aggregation_mode},
        test_utils::{FakePage, StaticSource},
    };

    const UTILITY_PAYLOAD: &str = r#"[
        {"UtilityType": "Water", "Amount": 30, "ExpenseDate": "2024-01-05T00:00:00Z"},
        {"UtilityType": "Water", "Amount": 20, "ExpenseDate": "2024-01-06T00:00:00Z"},
        {"UtilityType": "Gas", "Amount": 15, "ExpenseDate": "2024-01-05T00:00:00Z"}
    ]"#;

    const WATER_PAYLOAD: &str = r#"[
        {"UtilityType": "Water", "Amount": 30, "ExpenseDate": "2024-01-05T00:00:00Z"},
        {"UtilityType": "Water", "Amount": 20, "ExpenseDate": "2024-01-06T00:00:00Z"}
    ]"#;

    #[test]
    fn mode_depends_on_category_filter() {
        assert_eq!(
            aggregation_mode(&FilterState::default()),
            AggregationMode::ByCategory
        );
        assert_eq!(
            aggregation_mode(&FilterState {
                category: Some("1".to_owned()),
                year: None,
            }),
            AggregationMode::ByDate
        );
    }

    #[tokio::test]
    async fn unfiltered_search_groups_by_category() {
        let page = FakePage::new();
        page.set_control(YEAR_FILTER_ID, "2024");
        let source = StaticSource::new([Ok(UTILITY_PAYLOAD.to_owned())]);
        let controller = QueryController::new(DomainConfig::house(), source);
        let chart = create(&page, CHART_SURFACE_ID, DomainConfig::house().chart_config()).unwrap();

        let outcome = controller.refresh(&page, &chart).await;

        assert_eq!(outcome, RefreshOutcome::Populated(2));
        let snapshot = chart.snapshot();
        let colors = DomainConfig::house().color_map();
        assert_eq!(snapshot.series.labels(), ["Water", "Gas"]);
        assert_eq!(snapshot.series.amounts(), [50.0, 15.0]);
        assert_eq!(
            snapshot.series.colors(),
            [colors.resolve("Water"), colors.resolve("Gas")]
        );
        assert_eq!(snapshot.title, "Home Expenses by Utility Type");
        assert_eq!(
            controller.source.requests(),
            ["house/chart/search?type=&year=2024"]
        );
    }

    #[tokio::test]
    async fn category_search_groups_by_date() {
        let page = FakePage::new();
        page.set_control(CATEGORY_FILTER_ID, "1");
        let source = StaticSource::new([Ok(WATER_PAYLOAD.to_owned())]);
        let controller = QueryController::new(DomainConfig::house(), source);
        let chart = create(&page, CHART_SURFACE_ID, DomainConfig::house().chart_config()).unwrap();

        let outcome = controller.refresh(&page, &chart).await;

        assert_eq!(outcome, RefreshOutcome::Populated(2));
        let snapshot = chart.snapshot();
        assert_eq!(snapshot.series.labels(), ["5 January", "6 January"]);
        assert_eq!(snapshot.series.amounts(), [30.0, 20.0]);
    }

    #[tokio::test]
    async fn empty_payload_clears_chart() {
        let page = FakePage::new();
        let source = StaticSource::new([Ok(UTILITY_PAYLOAD.to_owned()), Ok("null".to_owned())]);
        let controller = QueryController::new(DomainConfig::house(), source);
        let chart = create(&page, CHART_SURFACE_ID, DomainConfig::house().chart_config()).unwrap();
        controller.refresh(&page, &chart).await;

        let outcome = controller.refresh(&page, &chart).await;

        assert_eq!(outcome, RefreshOutcome::Empty);
        let snapshot = chart.snapshot();
        assert_eq!(snapshot.state, ChartState::Empty);
        assert_eq!(snapshot.title, NO_RESULTS_TITLE);
        assert!(snapshot.series.is_empty());
    }

    #[tokio::test]
    async fn transport_failure_keeps_last_good_chart() {
        let page = FakePage::new();
        let source = StaticSource::new([
            Ok(UTILITY_PAYLOAD.to_owned()),
            Err(Error::Fetch("connection refused".to_owned())),
        ]);
        let controller = QueryController::new(DomainConfig::house(), source);
        let chart = create(&page, CHART_SURFACE_ID, DomainConfig::house().chart_config()).unwrap();
        controller.refresh(&page, &chart).await;
        let before = chart.snapshot();
        let frames_before = page.frames().len();

        let outcome = controller.refresh(&page, &chart).await;

        assert_eq!(outcome, RefreshOutcome::Failed);
        assert_eq!(chart.snapshot(), before);
        assert_eq!(page.frames().len(), frames_before);
    }

    #[tokio::test]
    async fn unreadable_payload_keeps_last_good_chart() {
        let page = FakePage::new();
        let source = StaticSource::new([
            Ok(UTILITY_PAYLOAD.to_owned()),
            Ok("<h1>502 Bad Gateway</h1>".to_owned()),
        ]);
        let controller = QueryController::new(DomainConfig::house(), source);
        let chart = create(&page, CHART_SURFACE_ID, DomainConfig::house().chart_config()).unwrap();
        controller.refresh(&page, &chart).await;
        let before = chart.snapshot();

        let outcome = controller.refresh(&page, &chart).await;

        assert_eq!(outcome, RefreshOutcome::Failed);
        assert_eq!(chart.snapshot(), before);
    }

    #[tokio::test]
    async fn missing_filter_control_skips_fetch() {
        let page = FakePage::new();
        page.remove_element(CATEGORY_FILTER_ID);
        let source = StaticSource::new([Ok(UTILITY_PAYLOAD.to_owned())]);
        let controller = QueryController::new(DomainConfig::house(), source);
        let chart = create(&page, CHART_SURFACE_ID, DomainConfig::house().chart_config()).unwrap();

        let outcome = controller.refresh(&page, &chart).await;

        assert_eq!(outcome, RefreshOutcome::Skipped);
        assert!(controller.source.requests().is_empty());
        assert_eq!(chart.state(), ChartState::Empty);
    }

    #[tokio::test]
    async fn car_domain_reads_car_fields() {
        let page = FakePage::new();
        let source = StaticSource::new([Ok(r#"[
            {"Type": "Fuel", "Amount": 60, "Date": "2024-03-01T00:00:00Z"},
            {"Type": "Car Wash", "Amount": 12, "Date": "2024-03-02T00:00:00Z"}
        ]"#
        .to_owned())]);
        let controller = QueryController::new(DomainConfig::car(), source);
        let chart = create(&page, CHART_SURFACE_ID, DomainConfig::car().chart_config()).unwrap();

        controller.refresh(&page, &chart).await;

        let snapshot = chart.snapshot();
        assert_eq!(snapshot.series.labels(), ["Fuel", "Car Wash"]);
        assert_eq!(snapshot.series.colors()[1], "rgb(255 255 255 / 80%)");
        assert_eq!(snapshot.title, "Car Expenses by Type");
        assert_eq!(snapshot.dataset_label, "Total Amount (Car)");
        assert_eq!(
            controller.source.requests(),
            ["car/chart/search?type=&year="]
        );
    }
}
