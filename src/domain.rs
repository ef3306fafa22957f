//! Per-domain chart settings.
//!
//! A domain is a separately tracked group of expenses, such as household
//! utilities or car costs. Each has its own search endpoint, record field
//! names, colours and titles.

use std::{collections::HashMap, fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::{
    Error,
    chart::{ChartConfig, ChartKind, DEFAULT_DATASET_LABEL},
    color::{CategoryColorMap, FALLBACK_CATEGORY},
    expense::FieldNames,
    page::search_trigger_id,
};

/// Colours that car expenses use in place of the defaults.
const CAR_COLORS: [(&str, &str); 8] = [
    ("Fuel", "rgba(255, 0, 0, 0.8)"),
    ("Insurance", "rgba(0, 100, 255, 0.8)"),
    ("Maintenance/Repair", "rgba(0, 255, 0, 0.8)"),
    ("Parking/Tolls", "rgba(255, 165, 0, 0.8)"),
    ("Tires", "rgb(0 0 0 / 80%)"),
    ("Oil", "rgb(170 75 0 / 71%)"),
    (FALLBACK_CATEGORY, "rgb(51 51 51 / 90%)"),
    ("Car Wash", "rgb(255 255 255 / 80%)"),
];

/// Everything that differs between expense domains.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainConfig {
    /// Path prefix of the domain's endpoints, e.g. `house`.
    pub endpoint_prefix: String,
    /// The chart title once results are shown.
    #[serde(default)]
    pub title: Option<String>,
    /// The name of the chart's dataset.
    #[serde(default = "default_dataset_label")]
    pub dataset_label: String,
    /// The JSON keys of each expense record.
    pub fields: FieldNames,
    /// Colours that replace or extend the default category colours.
    #[serde(default)]
    pub colors: HashMap<String, String>,
    /// How the chart is drawn.
    #[serde(default)]
    pub chart_kind: ChartKind,
}

fn default_dataset_label() -> String {
    DEFAULT_DATASET_LABEL.to_owned()
}

impl DomainConfig {
    /// Household utility expenses.
    pub fn house() -> Self {
        Self {
            endpoint_prefix: "house".to_owned(),
            title: Some("Home Expenses by Utility Type".to_owned()),
            dataset_label: default_dataset_label(),
            fields: FieldNames::new("UtilityType", "ExpenseDate"),
            colors: HashMap::new(),
            chart_kind: ChartKind::Bar,
        }
    }

    /// Car running costs.
    pub fn car() -> Self {
        Self {
            endpoint_prefix: "car".to_owned(),
            title: Some("Car Expenses by Type".to_owned()),
            dataset_label: "Total Amount (Car)".to_owned(),
            fields: FieldNames::new("Type", "Date"),
            colors: CAR_COLORS
                .iter()
                .map(|(category, color)| (category.to_string(), color.to_string()))
                .collect(),
            chart_kind: ChartKind::Bar,
        }
    }

    /// Look up a built-in domain by its endpoint prefix.
    pub fn builtin(endpoint_prefix: &str) -> Option<Self> {
        match endpoint_prefix {
            "house" => Some(Self::house()),
            "car" => Some(Self::car()),
            _ => None,
        }
    }

    /// Load a domain from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [Error::Config] if the file cannot be read or does not describe
    /// a domain.
    pub fn from_json_file(path: &Path) -> Result<Self, Error> {
        let text = fs::read_to_string(path)
            .map_err(|error| Error::Config(format!("could not read {}: {error}", path.display())))?;

        Self::from_json(&text)
    }

    /// Parse a domain from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [Error::Config] if `text` does not describe a domain or the
    /// endpoint prefix is blank.
    pub fn from_json(text: &str) -> Result<Self, Error> {
        let config: Self = serde_json::from_str(text)
            .map_err(|error| Error::Config(format!("invalid domain config: {error}")))?;

        if config.endpoint_prefix.trim().is_empty() {
            return Err(Error::Config("endpoint prefix cannot be empty".to_owned()));
        }

        Ok(config)
    }

    /// The default colours merged with this domain's colours.
    pub fn color_map(&self) -> CategoryColorMap {
        CategoryColorMap::with_overrides(&self.colors)
    }

    /// The settings for this domain's chart.
    pub fn chart_config(&self) -> ChartConfig {
        ChartConfig {
            kind: self.chart_kind,
            title: self.title.clone(),
            dataset_label: self.dataset_label.clone(),
        }
    }

    /// ID of the control that starts a search in this domain.
    pub fn search_trigger_id(&self) -> String {
        search_trigger_id(&self.endpoint_prefix)
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        Error,
        chart::{ChartKind, DEFAULT_DATASET_LABEL},
        color::DEFAULT_COLORS,
        domain::DomainConfig,
    };

    #[test]
    fn house_uses_utility_field_names_and_default_colors() {
        let house = DomainConfig::house();

        assert_eq!(house.fields.category, "UtilityType");
        assert_eq!(house.fields.date, "ExpenseDate");
        assert_eq!(house.fields.amount, "Amount");
        assert_eq!(house.dataset_label, DEFAULT_DATASET_LABEL);
        assert_eq!(house.search_trigger_id(), "house-chart-search");

        let colors = house.color_map();
        for (category, color) in DEFAULT_COLORS {
            assert_eq!(colors.resolve(category), color);
        }
    }

    #[test]
    fn car_overrides_colors_and_fallback() {
        let car = DomainConfig::car();
        let colors = car.color_map();

        assert_eq!(car.fields.category, "Type");
        assert_eq!(car.fields.date, "Date");
        assert_eq!(colors.resolve("Fuel"), "rgba(255, 0, 0, 0.8)");
        assert_eq!(colors.resolve("Water"), "rgba(54, 162, 235, 0.6)");
        assert_eq!(colors.resolve("Towing"), "rgb(51 51 51 / 90%)");
    }

    #[test]
    fn chart_config_carries_title_and_label() {
        let config = DomainConfig::car().chart_config();

        assert_eq!(config.title.as_deref(), Some("Car Expenses by Type"));
        assert_eq!(config.dataset_label, "Total Amount (Car)");
        assert_eq!(config.kind, ChartKind::Bar);
    }

    #[test]
    fn builtin_lookup() {
        assert_eq!(DomainConfig::builtin("car"), Some(DomainConfig::car()));
        assert_eq!(DomainConfig::builtin("boat"), None);
    }

    #[test]
    fn parses_minimal_json_config_with_defaults() {
        let config = DomainConfig::from_json(
            r#"{"endpoint_prefix": "boat", "fields": {"category": "Kind", "date": "When"}}"#,
        )
        .unwrap();

        assert_eq!(config.endpoint_prefix, "boat");
        assert_eq!(config.title, None);
        assert_eq!(config.dataset_label, DEFAULT_DATASET_LABEL);
        assert_eq!(config.fields.amount, "Amount");
        assert_eq!(config.chart_kind, ChartKind::Bar);
        assert!(config.colors.is_empty());
    }

    #[test]
    fn parses_full_json_config() {
        let config = DomainConfig::from_json(
            r#"{
                "endpoint_prefix": "boat",
                "title": "Boat Costs",
                "dataset_label": "Total (Boat)",
                "fields": {"category": "Kind", "date": "When", "amount": "Cost"},
                "colors": {"Mooring": "navy"},
                "chart_kind": "pie"
            }"#,
        )
        .unwrap();

        assert_eq!(config.title.as_deref(), Some("Boat Costs"));
        assert_eq!(config.fields.amount, "Cost");
        assert_eq!(config.chart_kind, ChartKind::Pie);
        assert_eq!(config.color_map().resolve("Mooring"), "navy");
    }

    #[test]
    fn rejects_blank_prefix_and_bad_json() {
        let blank = DomainConfig::from_json(
            r#"{"endpoint_prefix": " ", "fields": {"category": "Kind", "date": "When"}}"#,
        );
        assert!(matches!(blank, Err(Error::Config(_))));

        let missing_fields = DomainConfig::from_json(r#"{"endpoint_prefix": "boat"}"#);
        assert!(matches!(missing_fields, Err(Error::Config(_))));
    }
}
