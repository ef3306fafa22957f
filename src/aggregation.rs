//! Grouping of expense records into chart series.
//!
//! Provides the two groupings used by the expense charts: totals per category
//! when no category filter is set, and totals per day within one category
//! when it is.

use std::collections::HashMap;

use time::{Date, macros::format_description};

use crate::{color::CategoryColorMap, expense::ExpenseRecord};

/// How records are grouped into chart points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregationMode {
    /// One point per category, labelled with the category name.
    ByCategory,
    /// One point per calendar date, labelled like "5 January".
    ByDate,
}

/// Labels, amounts and colours for one chart render.
///
/// The three sequences are index-aligned and always the same length.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChartSeries {
    labels: Vec<String>,
    amounts: Vec<f64>,
    colors: Vec<String>,
}

impl ChartSeries {
    /// A series with no points, the "no data" state.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Append one point.
    pub fn push(&mut self, label: String, amount: f64, color: String) {
        self.labels.push(label);
        self.amounts.push(amount);
        self.colors.push(color);
    }

    /// The point labels in display order.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// The point amounts, aligned with [ChartSeries::labels].
    pub fn amounts(&self) -> &[f64] {
        &self.amounts
    }

    /// The point colours, aligned with [ChartSeries::labels].
    pub fn colors(&self) -> &[String] {
        &self.colors
    }

    /// The number of points.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Whether the series has no points.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// The sum of all amounts.
    pub fn total(&self) -> f64 {
        self.amounts.iter().sum()
    }
}

/// Groups expense records into a [ChartSeries], colouring each point by
/// category.
#[derive(Debug, Clone)]
pub struct ExpenseAggregator {
    colors: CategoryColorMap,
}

impl ExpenseAggregator {
    /// Create an aggregator that colours points with `colors`.
    pub fn new(colors: CategoryColorMap) -> Self {
        Self { colors }
    }

    /// The colours used for points.
    pub fn colors(&self) -> &CategoryColorMap {
        &self.colors
    }

    /// Group `records` according to `mode`.
    ///
    /// Points appear in the order their key is first seen in `records`.
    /// Amounts are summed with plain `f64` addition, so totals carry the usual
    /// floating point rounding.
    ///
    /// # Arguments
    /// * `records` - The expenses to group
    /// * `mode` - Whether to group by category or by date
    ///
    /// # Returns
    /// A series with one point per distinct key, or an empty series when
    /// `records` is empty.
    pub fn aggregate(&self, records: &[ExpenseRecord], mode: AggregationMode) -> ChartSeries {
        match mode {
            AggregationMode::ByCategory => self.aggregate_by_category(records),
            AggregationMode::ByDate => self.aggregate_by_date(records),
        }
    }

    fn aggregate_by_category(&self, records: &[ExpenseRecord]) -> ChartSeries {
        let totals = group_in_first_seen_order(records, |record| record.category.as_str());

        let mut series = ChartSeries::empty();
        for group in totals {
            series.push(
                group.key.to_owned(),
                group.amount,
                self.colors.resolve(group.key).to_owned(),
            );
        }

        series
    }

    /// Grouping uses the date itself rather than its label, so the same day
    /// in different years stays two points.
    ///
    /// A date that has records from several categories is coloured by the
    /// category of the first of those records.
    fn aggregate_by_date(&self, records: &[ExpenseRecord]) -> ChartSeries {
        let totals = group_in_first_seen_order(records, |record| record.date);

        let mut series = ChartSeries::empty();
        for group in totals {
            series.push(
                format_day_label(group.key),
                group.amount,
                self.colors.resolve(&group.first.category).to_owned(),
            );
        }

        series
    }
}

struct Group<'a, K> {
    key: K,
    amount: f64,
    first: &'a ExpenseRecord,
}

fn group_in_first_seen_order<'a, K, F>(records: &'a [ExpenseRecord], key_of: F) -> Vec<Group<'a, K>>
where
    K: Copy + Eq + std::hash::Hash,
    F: Fn(&'a ExpenseRecord) -> K,
{
    let mut groups: Vec<Group<'a, K>> = Vec::new();
    let mut index_by_key: HashMap<K, usize> = HashMap::new();

    for record in records {
        let key = key_of(record);

        match index_by_key.get(&key) {
            Some(&index) => groups[index].amount += record.amount,
            None => {
                index_by_key.insert(key, groups.len());
                groups.push(Group {
                    key,
                    amount: record.amount,
                    first: record,
                });
            }
        }
    }

    groups
}

/// Formats a date as the day without padding and the full month name,
/// e.g. "5 January".
pub fn format_day_label(date: Date) -> String {
    let format = format_description!("[day padding:none] [month repr:long]");

    date.format(format)
        .unwrap_or_else(|_| format!("{} {}", date.day(), date.month()))
}
