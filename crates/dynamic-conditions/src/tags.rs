//! Dynamic tags contributed by the engine.

use crate::context::Host;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Post type filter meaning "every type".
pub const ANY_POST_TYPE: &str = "any";

/// A content-item count query.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ItemQuery {
    /// Category ids; empty means every category.
    #[serde(default)]
    pub categories: Vec<u64>,
    /// Post types; empty means [`ANY_POST_TYPE`].
    #[serde(default)]
    pub post_types: Vec<String>,
}

impl ItemQuery {
    /// Post types to query, `["any"]` when none are selected.
    pub fn post_type_filter(&self) -> Vec<&str> {
        if self.post_types.is_empty() {
            vec![ANY_POST_TYPE]
        } else {
            self.post_types.iter().map(String::as_str).collect()
        }
    }

    /// Category filter as a comma-joined list.
    pub fn category_filter(&self) -> String {
        self.categories
            .iter()
            .map(u64::to_string)
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// A value provider selectable as a dynamic tag.
pub trait DynamicTagProvider {
    /// Tag name used in binding markup.
    fn name(&self) -> &str;

    /// Human readable title.
    fn title(&self) -> &str;

    /// Renders the tag value for the given tag settings.
    fn render(&self, settings: &serde_json::Value, host: &dyn Host) -> String;
}

/// Counts content items in the selected categories and post types.
#[derive(Debug, Clone, Copy, Default)]
pub struct NumberPostsTag;

impl NumberPostsTag {
    /// Builds the query from tag settings (`category`, `posttypes`).
    ///
    /// Ids may arrive as numbers or numeric strings; anything else is dropped.
    pub fn query(settings: &serde_json::Value) -> ItemQuery {
        let categories = settings
            .get("category")
            .and_then(serde_json::Value::as_array)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| id.as_u64().or_else(|| id.as_str()?.trim().parse().ok()))
                    .collect()
            })
            .unwrap_or_default();

        let post_types = settings
            .get("posttypes")
            .and_then(serde_json::Value::as_array)
            .map(|types| {
                types
                    .iter()
                    .filter_map(serde_json::Value::as_str)
                    .filter(|t| !t.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        ItemQuery { categories, post_types }
    }
}

impl DynamicTagProvider for NumberPostsTag {
    fn name(&self) -> &str {
        "numberposts"
    }

    fn title(&self) -> &str {
        "Number posts"
    }

    fn render(&self, settings: &serde_json::Value, host: &dyn Host) -> String {
        let query = Self::query(settings);
        let count = host.count_items(&query);
        tracing::trace!(categories = %query.category_filter(), count, "counted items");
        count.to_string()
    }
}

/// Registered dynamic tags, by name.
#[derive(Default)]
pub struct TagRegistry {
    providers: BTreeMap<String, Box<dyn DynamicTagProvider>>,
}

impl TagRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with the engine's own tags.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(NumberPostsTag));
        registry
    }

    /// Registers a provider, replacing one with the same name.
    pub fn register(&mut self, provider: Box<dyn DynamicTagProvider>) {
        self.providers.insert(provider.name().to_string(), provider);
    }

    pub fn get(&self, name: &str) -> Option<&dyn DynamicTagProvider> {
        self.providers.get(name).map(|p| p.as_ref())
    }

    /// Names of all registered tags.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.providers.keys().map(String::as_str)
    }

    /// Renders a tag by name; `None` if it is not registered.
    pub fn render(&self, name: &str, settings: &serde_json::Value, host: &dyn Host) -> Option<String> {
        self.get(name).map(|provider| provider.render(settings, host))
    }
}
