//! A page without a browser, for rendering charts from saved search results.
//!
//! [HeadlessPage] holds fixed filter values and keeps the last drawn chart,
//! and [FileSource] answers every search with the contents of one file.

use std::{
    cell::RefCell,
    path::{Path, PathBuf},
    rc::Rc,
};

use charming::Chart;

use crate::{
    Error,
    filters::{FilterState, SearchRequest},
    page::{
        CATEGORY_FILTER_ID, CHART_SURFACE_ID, ChartSurface, ElementRef, Page, YEAR_FILTER_ID,
    },
    query::ExpenseSource,
    theme::Theme,
};

const SURFACE_ELEMENT: ElementRef = ElementRef(1);

/// A page with the chart surface and filter controls set from the command
/// line. It has no search trigger, so nothing is ever clicked.
pub struct HeadlessPage {
    filters: FilterState,
    theme: Theme,
    last_frame: Rc<RefCell<Option<String>>>,
}

impl HeadlessPage {
    /// A page whose filter controls hold `filters`.
    pub fn new(filters: FilterState, theme: Theme) -> Self {
        Self {
            filters,
            theme,
            last_frame: Rc::default(),
        }
    }

    /// The ECharts options of the most recent draw.
    pub fn last_frame(&self) -> Option<String> {
        self.last_frame.borrow().clone()
    }
}

impl Page for HeadlessPage {
    type Listener = ();
    type Surface = FrameSurface;

    fn element(&self, id: &str) -> Option<ElementRef> {
        (id == CHART_SURFACE_ID).then_some(SURFACE_ELEMENT)
    }

    fn is_connected(&self, element: ElementRef) -> bool {
        element == SURFACE_ELEMENT
    }

    fn control_value(&self, id: &str) -> Option<String> {
        let value = match id {
            CATEGORY_FILTER_ID => &self.filters.category,
            YEAR_FILTER_ID => &self.filters.year,
            _ => return None,
        };

        Some(value.clone().unwrap_or_default())
    }

    fn surface(&self, id: &str) -> Option<FrameSurface> {
        self.element(id).map(|element| FrameSurface {
            element,
            last_frame: Rc::clone(&self.last_frame),
        })
    }

    fn add_click_listener(&self, _element: ElementRef, _listener: &()) {}

    fn remove_click_listener(&self, _element: ElementRef, _listener: &()) {}

    fn theme(&self) -> Theme {
        self.theme
    }
}

/// Keeps the most recently drawn chart for its [HeadlessPage].
pub struct FrameSurface {
    element: ElementRef,
    last_frame: Rc<RefCell<Option<String>>>,
}

impl ChartSurface for FrameSurface {
    fn element(&self) -> ElementRef {
        self.element
    }

    fn draw(&mut self, chart: &Chart) {
        *self.last_frame.borrow_mut() = Some(chart.to_string());
    }
}

/// Answers every search with a saved response body.
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    /// A source that reads `path` for each search.
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_owned(),
        }
    }
}

impl ExpenseSource for FileSource {
    async fn fetch(&self, request: &SearchRequest) -> Result<String, Error> {
        tracing::debug!(
            "Answering {} from {}",
            request.url(),
            self.path.display()
        );

        tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|error| Error::Fetch(format!("{}: {error}", self.path.display())))
    }
}
