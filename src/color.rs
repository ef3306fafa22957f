//! Display colours for expense categories.
//!
//! Every domain starts from [DEFAULT_COLORS] and may override any entry,
//! including the fallback used for categories without a colour of their own.

use std::collections::HashMap;

/// The category whose colour is used for every unmapped category.
pub const FALLBACK_CATEGORY: &str = "Other";

/// Colours shared by all domains, keyed by category name.
pub const DEFAULT_COLORS: [(&str, &str); 7] = [
    ("Water", "rgba(54, 162, 235, 0.6)"),
    ("TV", "rgba(153, 102, 255, 0.6)"),
    ("Electricity", "rgba(255, 206, 86, 0.6)"),
    ("Gas", "rgba(255, 99, 132, 0.6)"),
    ("Internet", "rgba(75, 192, 192, 0.6)"),
    ("Waste", "rgba(255, 159, 64, 0.6)"),
    (FALLBACK_CATEGORY, "rgba(51, 77, 51, 0.2)"),
];

/// Maps category names to colour tokens (any CSS colour string).
///
/// The map always contains [FALLBACK_CATEGORY], so [CategoryColorMap::resolve]
/// cannot fail.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryColorMap {
    colors: HashMap<String, String>,
}

impl CategoryColorMap {
    /// The default colours merged with `overrides`, where `overrides` wins on
    /// conflicting categories.
    pub fn with_overrides<'a, I>(overrides: I) -> Self
    where
        I: IntoIterator<Item = (&'a String, &'a String)>,
    {
        let mut map = Self::default();

        for (category, color) in overrides {
            map.colors.insert(category.clone(), color.clone());
        }

        map
    }

    /// The colour for `category`, or the fallback colour if the category has
    /// no entry.
    pub fn resolve(&self, category: &str) -> &str {
        self.colors
            .get(category)
            .unwrap_or_else(|| self.fallback_entry())
    }

    /// The colour used for unmapped categories.
    pub fn fallback(&self) -> &str {
        self.fallback_entry()
    }

    /// Whether `category` has an entry of its own.
    pub fn contains(&self, category: &str) -> bool {
        self.colors.contains_key(category)
    }

    fn fallback_entry(&self) -> &String {
        // Present from construction: `Default` inserts it and overrides can
        // only replace it.
        &self.colors[FALLBACK_CATEGORY]
    }
}

impl Default for CategoryColorMap {
    fn default() -> Self {
        let colors = DEFAULT_COLORS
            .iter()
            .map(|(category, color)| (category.to_string(), color.to_string()))
            .collect();

        Self { colors }
    }
}
