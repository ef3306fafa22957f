//! The expense chart widget.
//!
//! A chart is created once per page view with [create] and then updated in
//! place through its [ChartHandle] whenever a search completes. The widget is
//! in one of two states:
//! - **Empty**: initially, and after an update with an empty series. The
//!   title reads [NO_RESULTS_TITLE] and the dataset label is blank.
//! - **Populated**: after an update with at least one point. The configured
//!   title is applied when leaving the empty state and kept until the chart
//!   becomes empty again.
//!
//! Each redraw produces a fresh set of ECharts options, including the legend,
//! so the drawn chart always reflects the current series and visibility.

use std::{cell::RefCell, rc::Rc};

use charming::{
    Chart,
    component::{Axis, Grid, Legend, Title},
    datatype::DataPointItem,
    element::{AxisLabel, AxisType, ItemStyle, JsFunction, TextStyle, Tooltip, Trigger},
    series::{Bar, Pie},
};
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    aggregation::ChartSeries,
    page::{ChartSurface, ElementRef, Page},
    theme::Theme,
};

/// Title shown while the chart has no data.
pub const NO_RESULTS_TITLE: &str = "No Results!";

/// Dataset label used when a domain does not configure one.
pub const DEFAULT_DATASET_LABEL: &str = "Total Amount ($)";

/// The chart type used to draw a series.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    /// One bar per point on a category axis.
    #[default]
    Bar,
    /// One slice per point.
    Pie,
}

/// Static settings for one chart.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartConfig {
    /// How points are drawn.
    pub kind: ChartKind,
    /// The title shown once the chart has data.
    pub title: Option<String>,
    /// The name of the single dataset.
    pub dataset_label: String,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            kind: ChartKind::default(),
            title: None,
            dataset_label: DEFAULT_DATASET_LABEL.to_owned(),
        }
    }
}

/// Whether the chart currently shows data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartState {
    /// No data, the title reads [NO_RESULTS_TITLE].
    Empty,
    /// At least one point is shown.
    Populated,
}

/// One legend item, derived from the current series on every call.
#[derive(Debug, Clone, PartialEq)]
pub struct LegendEntry {
    /// The point label.
    pub text: String,
    /// The text colour, which follows the page theme.
    pub font_color: String,
    /// The fill colour of the legend box.
    pub fill: String,
    /// The border colour of the legend box.
    pub stroke: String,
    /// The border width of the legend box.
    pub line_width: u32,
    /// Whether the point has been hidden through the legend.
    pub hidden: bool,
}

/// The observable state of a chart at one point in time.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSnapshot {
    /// Empty or populated.
    pub state: ChartState,
    /// The displayed title.
    pub title: String,
    /// The displayed dataset label.
    pub dataset_label: String,
    /// The displayed series.
    pub series: ChartSeries,
}

/// A chart bound to one drawing surface.
pub struct ChartWidget<S> {
    surface: S,
    config: ChartConfig,
    state: ChartState,
    title: String,
    dataset_label: String,
    series: ChartSeries,
    hidden: Vec<bool>,
    theme: Theme,
}

impl<S: ChartSurface> ChartWidget<S> {
    fn new(surface: S, config: ChartConfig, theme: Theme) -> Self {
        Self {
            surface,
            config,
            state: ChartState::Empty,
            title: NO_RESULTS_TITLE.to_owned(),
            dataset_label: String::new(),
            series: ChartSeries::empty(),
            hidden: Vec::new(),
            theme,
        }
    }

    fn apply(&mut self, series: ChartSeries, title: Option<&str>) {
        if series.is_empty() {
            if self.state == ChartState::Populated {
                tracing::info!("Chart has no results, clearing it.");
            }

            self.state = ChartState::Empty;
            self.title = NO_RESULTS_TITLE.to_owned();
            self.dataset_label.clear();
            self.series = series;
            self.hidden.clear();
            return;
        }

        if self.state == ChartState::Empty {
            if let Some(title) = title.or(self.config.title.as_deref()) {
                self.title = title.to_owned();
            }
            self.dataset_label = self.config.dataset_label.clone();
            self.state = ChartState::Populated;
            tracing::info!("Chart populated with {} points.", series.len());
        }

        // Visibility belongs to the position in the legend, so it carries over
        // to the next series.
        self.hidden.resize(series.len(), false);
        self.series = series;
    }

    fn redraw(&mut self) {
        let chart = self.to_chart();
        self.surface.draw(&chart);
    }

    fn legend_entries(&self) -> Vec<LegendEntry> {
        let font_color = self.theme.legend_text_color();

        self.series
            .labels()
            .iter()
            .zip(self.series.colors())
            .zip(&self.hidden)
            .map(|((label, color), &hidden)| LegendEntry {
                text: label.clone(),
                font_color: font_color.to_owned(),
                fill: color.clone(),
                stroke: color.clone(),
                line_width: 1,
                hidden,
            })
            .collect()
    }

    fn snapshot(&self) -> ChartSnapshot {
        ChartSnapshot {
            state: self.state,
            title: self.title.clone(),
            dataset_label: self.dataset_label.clone(),
            series: self.series.clone(),
        }
    }

    /// The ECharts options for the current state.
    ///
    /// Legend names must match series names (or pie slice names) for ECharts
    /// to draw them, so bar charts get one stacked series per legend entry.
    fn to_chart(&self) -> Chart {
        let legend_entries = self.legend_entries();

        let chart = Chart::new()
            .title(Title::new().text(self.title.as_str()).left("center"))
            .legend(
                Legend::new()
                    .bottom(0)
                    .data(self.series.labels().iter().map(String::as_str).collect())
                    .text_style(TextStyle::new().color(self.theme.legend_text_color())),
            );

        match self.config.kind {
            ChartKind::Bar => self.bar_chart(chart, &legend_entries),
            ChartKind::Pie => self.pie_chart(chart, &legend_entries),
        }
    }

    fn bar_chart(&self, chart: Chart, legend_entries: &[LegendEntry]) -> Chart {
        let visible: Vec<(&LegendEntry, f64)> = legend_entries
            .iter()
            .zip(self.series.amounts())
            .filter(|(entry, _)| !entry.hidden)
            .map(|(entry, amount)| (entry, *amount))
            .collect();
        let labels: Vec<String> = visible.iter().map(|(entry, _)| entry.text.clone()).collect();

        let mut chart = chart
            .tooltip(currency_tooltip(Trigger::Axis))
            .grid(
                Grid::new()
                    .left("3%")
                    .right("4%")
                    .bottom(40)
                    .contain_label(true),
            )
            .x_axis(Axis::new().type_(AxisType::Category).data(labels))
            .y_axis(
                Axis::new()
                    .type_(AxisType::Value)
                    .name(self.dataset_label.as_str())
                    .axis_label(AxisLabel::new().formatter(currency_formatter())),
            );

        // Each series holds one bar in its own column. A hidden entry keeps an
        // empty series so that its legend item is still drawn.
        let mut column = 0;
        for entry in legend_entries {
            let mut data: Vec<Option<f64>> = vec![None; visible.len()];
            if !entry.hidden {
                data[column] = Some(visible[column].1);
                column += 1;
            }

            chart = chart.series(
                Bar::new()
                    .name(entry.text.as_str())
                    .stack(self.dataset_label.as_str())
                    .item_style(entry_style(entry))
                    .data(data),
            );
        }

        chart
    }

    fn pie_chart(&self, chart: Chart, legend_entries: &[LegendEntry]) -> Chart {
        let data: Vec<DataPointItem> = legend_entries
            .iter()
            .zip(self.series.amounts())
            .filter(|(entry, _)| !entry.hidden)
            .map(|(entry, amount)| {
                DataPointItem::new(*amount)
                    .name(entry.text.as_str())
                    .item_style(entry_style(entry))
            })
            .collect();

        chart.tooltip(currency_tooltip(Trigger::Item)).series(
            Pie::new()
                .name(self.dataset_label.as_str())
                .radius("60%")
                .data(data),
        )
    }
}

fn entry_style(entry: &LegendEntry) -> ItemStyle {
    ItemStyle::new()
        .color(entry.fill.as_str())
        .border_color(entry.stroke.as_str())
        .border_width(f64::from(entry.line_width))
}

/// A shared reference to the one chart on a page.
///
/// Cloning the handle does not create a new chart, all clones update the same
/// widget.
pub struct ChartHandle<S>(Rc<RefCell<ChartWidget<S>>>);

impl<S> Clone for ChartHandle<S> {
    fn clone(&self) -> Self {
        Self(Rc::clone(&self.0))
    }
}

/// Create the chart on the page's chart surface and draw its empty state.
///
/// # Errors
///
/// Returns [Error::MissingElement] if the page has no element with
/// `surface_id`.
pub fn create<P: Page>(
    page: &P,
    surface_id: &str,
    config: ChartConfig,
) -> Result<ChartHandle<P::Surface>, Error> {
    let surface = page
        .surface(surface_id)
        .ok_or_else(|| Error::MissingElement(surface_id.to_owned()))?;

    tracing::debug!("Creating {:?} chart on #{surface_id}.", config.kind);

    let mut widget = ChartWidget::new(surface, config, page.theme());
    widget.redraw();

    Ok(ChartHandle(Rc::new(RefCell::new(widget))))
}

impl<S: ChartSurface> ChartHandle<S> {
    /// Show `series` and redraw.
    ///
    /// An empty series puts the chart in the empty state. Otherwise, if the
    /// chart was empty, its title becomes `title`, or the configured title
    /// when `title` is `None`. A populated chart keeps its current title.
    ///
    /// Updating twice with the same series leaves the chart as it was after
    /// the first update.
    pub fn update(&self, series: ChartSeries, title: Option<&str>) {
        let mut widget = self.0.borrow_mut();
        widget.apply(series, title);
        widget.redraw();
    }

    /// Flip the visibility of the legend entry at `index` and redraw.
    ///
    /// Returns whether the entry is now hidden, or `None` if there is no entry
    /// at `index`.
    pub fn toggle_legend_entry(&self, index: usize) -> Option<bool> {
        let mut widget = self.0.borrow_mut();
        let hidden = widget.hidden.get_mut(index)?;
        *hidden = !*hidden;
        let now_hidden = *hidden;

        widget.redraw();
        Some(now_hidden)
    }

    /// Redraw with the legend text in `theme`'s colour.
    ///
    /// Nothing is redrawn if the chart already uses `theme`.
    pub fn set_theme(&self, theme: Theme) {
        let mut widget = self.0.borrow_mut();
        if widget.theme == theme {
            return;
        }
        widget.theme = theme;
        widget.redraw();
    }

    /// The legend items for the current series and visibility.
    pub fn legend_entries(&self) -> Vec<LegendEntry> {
        self.0.borrow().legend_entries()
    }

    /// The ECharts options for the current state.
    pub fn to_chart(&self) -> Chart {
        self.0.borrow().to_chart()
    }

    /// The current state, title, dataset label and series.
    pub fn snapshot(&self) -> ChartSnapshot {
        self.0.borrow().snapshot()
    }

    /// Empty or populated.
    pub fn state(&self) -> ChartState {
        self.0.borrow().state
    }

    /// The element the chart is drawn on.
    pub fn element(&self) -> ElementRef {
        self.0.borrow().surface.element()
    }
}

#[inline]
fn currency_formatter() -> JsFunction {
    JsFunction::new_with_args(
        "number",
        "const currencyFormatter = new Intl.NumberFormat('en-US', {
              style: 'currency',
              currency: 'USD'
            });
            return (number) ? currencyFormatter.format(number) : \"-\";",
    )
}

fn currency_tooltip(trigger: Trigger) -> Tooltip {
    Tooltip::new()
        .trigger(trigger)
        .value_formatter(currency_formatter())
}
