//! The page the charts live on.
//!
//! Everything the chart pipeline needs from the surrounding document goes
//! through [Page], which keeps the pipeline free of any particular DOM
//! binding. The browser implementation lives in `web`; tests use an in-memory
//! page.

use charming::Chart;

use crate::theme::Theme;

/// ID of the element the chart is drawn on.
pub const CHART_SURFACE_ID: &str = "chart";

/// ID of the category filter control.
pub const CATEGORY_FILTER_ID: &str = "type";

/// ID of the year filter control.
pub const YEAR_FILTER_ID: &str = "year";

/// ID of the control that triggers a chart search for the domain with
/// `endpoint_prefix`, e.g. `house-chart-search`.
pub fn search_trigger_id(endpoint_prefix: &str) -> String {
    format!("{endpoint_prefix}-chart-search")
}

/// Identity of one element instance on the page.
///
/// Two lookups of the same ID give the same reference until a fragment swap
/// replaces the element, after which the new element gets a new reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementRef(pub u64);

/// A drawing target for one chart.
pub trait ChartSurface {
    /// The element the surface draws on.
    fn element(&self) -> ElementRef;

    /// Replace whatever is drawn with `chart`.
    fn draw(&mut self, chart: &Chart);
}

/// Access to the document hosting the charts.
pub trait Page {
    /// A click listener as attached to page elements.
    type Listener;

    /// The surface type handed out by [Page::surface].
    type Surface: ChartSurface;

    /// Look up the element with `id`.
    fn element(&self, id: &str) -> Option<ElementRef>;

    /// Whether `element` is still part of the document.
    fn is_connected(&self, element: ElementRef) -> bool;

    /// The current value of the input or select with `id`, or `None` if there
    /// is no such control.
    fn control_value(&self, id: &str) -> Option<String>;

    /// A drawing surface for the element with `id`.
    fn surface(&self, id: &str) -> Option<Self::Surface>;

    /// Attach `listener` to the click event of `element`.
    fn add_click_listener(&self, element: ElementRef, listener: &Self::Listener);

    /// Detach a listener previously attached with [Page::add_click_listener].
    fn remove_click_listener(&self, element: ElementRef, listener: &Self::Listener);

    /// The theme the page is displayed in.
    fn theme(&self) -> Theme;
}
