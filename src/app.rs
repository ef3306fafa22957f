//! The chart of one expense domain on one page view.

use std::cell::RefCell;

use crate::{
    Error,
    chart::{self, ChartHandle},
    domain::DomainConfig,
    navigation::{NavigationRefreshHook, SwapOutcome},
    page::{CHART_SURFACE_ID, Page},
    query::{ExpenseSource, QueryController, RefreshOutcome},
};

/// Ties the query controller, the chart and the navigation hook together for
/// one domain.
///
/// The page backend drives it: [ChartApp::start] on load,
/// [ChartApp::handle_fragment_swap] after every partial page update, and
/// [ChartApp::refresh] whenever the search trigger is clicked.
pub struct ChartApp<P: Page, S> {
    controller: QueryController<S>,
    chart: RefCell<Option<ChartHandle<P::Surface>>>,
    hook: RefCell<NavigationRefreshHook<P::Listener>>,
}

/// What the page backend should do after a fragment swap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapAction {
    /// What happened to the search trigger.
    pub trigger: SwapOutcome,
    /// Whether a new chart was created and needs its first refresh.
    pub initial_refresh: bool,
}

impl<P: Page, S: ExpenseSource> ChartApp<P, S> {
    /// Create the app for `domain`, fetching results from `source`.
    pub fn new(domain: DomainConfig, source: S) -> Self {
        let hook = NavigationRefreshHook::new(domain.search_trigger_id());

        Self {
            controller: QueryController::new(domain, source),
            chart: RefCell::new(None),
            hook: RefCell::new(hook),
        }
    }

    /// The domain shown by this app.
    pub fn domain(&self) -> &DomainConfig {
        self.controller.domain()
    }

    /// Create the chart and bind the search trigger if it is on the page.
    ///
    /// The caller should follow up with [ChartApp::refresh] to show the first
    /// results.
    ///
    /// # Errors
    ///
    /// Returns [Error::MissingElement] if the page has no chart surface.
    pub fn start<F>(&self, page: &P, make_listener: F) -> Result<SwapOutcome, Error>
    where
        F: FnOnce() -> P::Listener,
    {
        self.create_chart(page)?;

        Ok(self.hook.borrow_mut().on_fragment_swap(page, make_listener))
    }

    /// Rebind the search trigger after part of the page was replaced, and
    /// create a new chart if the page has none. An existing chart picks up
    /// the page's current theme.
    pub fn handle_fragment_swap<F>(&self, page: &P, make_listener: F) -> SwapAction
    where
        F: FnOnce() -> P::Listener,
    {
        let trigger = self.hook.borrow_mut().on_fragment_swap(page, make_listener);

        let connected_chart = self
            .chart()
            .filter(|chart| page.is_connected(chart.element()));

        if let Some(chart) = connected_chart {
            chart.set_theme(page.theme());

            return SwapAction {
                trigger,
                initial_refresh: false,
            };
        }

        if trigger == SwapOutcome::NoTrigger {
            return SwapAction {
                trigger,
                initial_refresh: false,
            };
        }

        let initial_refresh = match self.create_chart(page) {
            Ok(()) => true,
            Err(error) => {
                tracing::warn!("Could not create chart after swap: {error}");
                false
            }
        };

        SwapAction {
            trigger,
            initial_refresh,
        }
    }

    /// Run a search with the current filters and update the chart.
    ///
    /// Returns [RefreshOutcome::Skipped] if no chart has been created.
    pub async fn refresh(&self, page: &P) -> RefreshOutcome {
        // Clone the handle so no borrow is held while the request is pending.
        let chart = self.chart.borrow().clone();

        match chart {
            Some(chart) => self.controller.refresh(page, &chart).await,
            None => {
                tracing::warn!("Skipping chart refresh: no chart on the page");
                RefreshOutcome::Skipped
            }
        }
    }

    /// The current chart, if one has been created.
    pub fn chart(&self) -> Option<ChartHandle<P::Surface>> {
        self.chart.borrow().clone()
    }

    /// Whether a chart exists and is still on the page.
    pub fn has_chart(&self, page: &P) -> bool {
        self.chart
            .borrow()
            .as_ref()
            .is_some_and(|chart| page.is_connected(chart.element()))
    }

    fn create_chart(&self, page: &P) -> Result<(), Error> {
        let handle = chart::create(
            page,
            CHART_SURFACE_ID,
            self.controller.domain().chart_config(),
        )?;

        *self.chart.borrow_mut() = Some(handle);

        Ok(())
    }
}
