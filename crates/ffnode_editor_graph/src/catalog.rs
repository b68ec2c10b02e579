// SPDX-License-Identifier: MIT OR Apache-2.0
//! Filter catalog: the immutable list of filter definitions nodes are placed from.
//!
//! The catalog is produced outside the editor (scraped once from the
//! transcoder's help output) and cached as JSON. Once loaded it is never
//! mutated; nodes hold shared [`Arc<Filter>`] handles into it.

use crate::socket::Socket;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

/// Name of the synthetic source filter
pub const INPUT_FILTER_NAME: &str = "input";

/// Name of the synthetic sink filter
pub const OUTPUT_FILTER_NAME: &str = "output";

/// Option holding the media path on the source/sink filters
pub const FILENAME_OPTION: &str = "filename";

/// Option type category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKind {
    /// Free-form text
    String,
    /// On/off switch
    Boolean,
    /// Color name or hex value
    Color,
    /// Integer, floating point, rational or duration value
    Numeric,
    /// One (or a set) of the allowed values
    Enumerated,
    /// Any other transcoder-specific type
    Other,
}

impl OptionKind {
    /// Map a transcoder type tag (`int`, `string`, `flags`, ...) to a kind
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "string" => Self::String,
            "boolean" | "bool" => Self::Boolean,
            "color" => Self::Color,
            "int" | "int64" | "uint64" | "float" | "double" | "rational" | "duration" => {
                Self::Numeric
            }
            "flags" | "enumerated" => Self::Enumerated,
            _ => Self::Other,
        }
    }
}

/// One of the values an enumerated option accepts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllowedValue {
    /// Machine value written into the filter expression
    pub value: String,
    /// Display description
    #[serde(rename = "desc", default)]
    pub description: String,
}

/// A configurable option of a filter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterOption {
    /// Option name (the key in `key=value`)
    pub name: String,
    /// Description
    #[serde(rename = "desc", default)]
    pub description: String,
    /// Raw type tag as reported by the transcoder
    #[serde(rename = "type", default)]
    pub type_tag: String,
    /// Default value (empty when the transcoder reports none)
    #[serde(default)]
    pub default_value: String,
    /// Lower bound, if any
    #[serde(default)]
    pub min: String,
    /// Upper bound, if any
    #[serde(default)]
    pub max: String,
    /// Allowed values for enumerated options
    #[serde(default)]
    pub allowed: Vec<AllowedValue>,
}

impl FilterOption {
    /// Create a new option with no default, bounds or allowed values
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        type_tag: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            type_tag: type_tag.into(),
            default_value: String::new(),
            min: String::new(),
            max: String::new(),
            allowed: Vec::new(),
        }
    }

    /// Set the default value
    pub fn with_default(mut self, value: impl Into<String>) -> Self {
        self.default_value = value.into();
        self
    }

    /// Set the numeric bounds
    pub fn with_range(mut self, min: impl Into<String>, max: impl Into<String>) -> Self {
        self.min = min.into();
        self.max = max.into();
        self
    }

    /// Add an allowed value
    pub fn with_allowed(mut self, value: impl Into<String>, description: impl Into<String>) -> Self {
        self.allowed.push(AllowedValue {
            value: value.into(),
            description: description.into(),
        });
        self
    }

    /// Type category of this option
    pub fn kind(&self) -> OptionKind {
        if !self.allowed.is_empty() {
            return OptionKind::Enumerated;
        }
        OptionKind::from_tag(&self.type_tag)
    }
}

/// A filter definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Filter {
    /// Filter name as understood by the transcoder
    pub name: String,
    /// Description
    #[serde(rename = "desc", default)]
    pub description: String,
    /// Static input sockets
    #[serde(rename = "input", default)]
    pub inputs: Vec<Socket>,
    /// Static output sockets
    #[serde(rename = "output", default)]
    pub outputs: Vec<Socket>,
    /// Options
    #[serde(default)]
    pub options: Vec<FilterOption>,
    /// Inputs are computed from the options rather than fixed
    #[serde(default)]
    pub dynamic_input: bool,
    /// Outputs are computed from the options rather than fixed
    #[serde(default)]
    pub dynamic_output: bool,
}

impl Filter {
    /// Create a filter with fixed sockets and no options
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            options: Vec::new(),
            dynamic_input: false,
            dynamic_output: false,
        }
    }

    /// The synthetic source: one filename option, outputs derived from the media
    pub fn input_source() -> Self {
        let mut filter = Self::new(INPUT_FILTER_NAME, "Load from path");
        filter.options.push(FilterOption::new(FILENAME_OPTION, "path to input", "string"));
        filter.dynamic_output = true;
        filter
    }

    /// The synthetic sink: one filename option, inputs supplied by the graph
    pub fn output_sink() -> Self {
        let mut filter = Self::new(OUTPUT_FILTER_NAME, "Write to path");
        filter.options.push(FilterOption::new(FILENAME_OPTION, "path to output", "string"));
        filter.dynamic_input = true;
        filter
    }

    /// Find an option by name
    pub fn option_index(&self, name: &str) -> Option<usize> {
        self.options.iter().position(|o| o.name == name)
    }

    /// Get an option by index
    pub fn option(&self, index: usize) -> Option<&FilterOption> {
        self.options.get(index)
    }

    /// Index of the option that carries the filter's own name, if any
    pub fn self_named_option(&self) -> Option<usize> {
        self.option_index(&self.name)
    }

    /// Check if this is the synthetic source
    pub fn is_input(&self) -> bool {
        self.name == INPUT_FILTER_NAME
    }

    /// Check if this is the synthetic sink
    pub fn is_output(&self) -> bool {
        self.name == OUTPUT_FILTER_NAME
    }

    fn dedup_options(&mut self) {
        let mut seen = HashSet::new();
        self.options.retain(|o| seen.insert(o.name.clone()));
    }
}

/// The loaded catalog
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    filters: IndexMap<String, Arc<Filter>>,
}

impl Catalog {
    /// Build a catalog, appending the source/sink sentinels when absent
    pub fn from_filters(filters: impl IntoIterator<Item = Filter>) -> Self {
        let mut map = IndexMap::new();
        let sentinels = [Filter::input_source(), Filter::output_sink()];
        for mut filter in filters.into_iter().chain(sentinels) {
            filter.dedup_options();
            map.entry(filter.name.clone()).or_insert_with(|| Arc::new(filter));
        }
        Self { filters: map }
    }

    /// Load the cached filter list
    pub fn load_json(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path)?;
        let filters: Vec<Filter> = serde_json::from_str(&content)?;
        let catalog = Self::from_filters(filters);
        tracing::info!("Loaded {} filters from {:?}", catalog.len(), path);
        Ok(catalog)
    }

    /// Write the filter list as JSON
    pub fn save_json(&self, path: &Path) -> Result<(), CatalogError> {
        let filters: Vec<&Filter> = self.filters.values().map(AsRef::as_ref).collect();
        let content = serde_json::to_string_pretty(&filters)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get a filter by name
    pub fn get(&self, name: &str) -> Option<&Arc<Filter>> {
        self.filters.get(name)
    }

    /// Get all filters in catalog order
    pub fn filters(&self) -> impl Iterator<Item = &Arc<Filter>> {
        self.filters.values()
    }

    /// Number of filters
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    /// Check if the catalog is empty
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Case-insensitive name search, at most `limit` hits in catalog order
    pub fn search<'a>(&'a self, query: &str, limit: usize) -> impl Iterator<Item = &'a Arc<Filter>> {
        let query = query.to_lowercase();
        self.filters
            .values()
            .filter(move |f| f.name.to_lowercase().contains(&query))
            .take(limit)
    }
}

/// Error when loading or saving the catalog
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// File could not be read or written
    #[error("Catalog I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// File is not a valid filter list
    #[error("Malformed catalog: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::socket::MediaKind;

    fn scale() -> Filter {
        let mut filter = Filter::new("scale", "Scale the input video size");
        filter.inputs.push(Socket::new("default", MediaKind::Video));
        filter.outputs.push(Socket::new("default", MediaKind::Video));
        filter.options.push(FilterOption::new("width", "Output video width", "string"));
        filter.options.push(FilterOption::new("width", "duplicate", "int"));
        filter
    }

    #[test]
    fn test_sentinels_appended() {
        let catalog = Catalog::from_filters(vec![scale()]);
        assert_eq!(catalog.len(), 3);
        assert!(catalog.get(INPUT_FILTER_NAME).unwrap().dynamic_output);
        assert!(catalog.get(OUTPUT_FILTER_NAME).unwrap().dynamic_input);
        assert_eq!(
            catalog.get("input").unwrap().option_index(FILENAME_OPTION),
            Some(0)
        );
    }

    #[test]
    fn test_duplicate_options_dropped() {
        let catalog = Catalog::from_filters(vec![scale()]);
        let filter = catalog.get("scale").unwrap();
        assert_eq!(filter.options.len(), 1);
        assert_eq!(filter.options[0].type_tag, "string");
    }

    #[test]
    fn test_search() {
        let catalog = Catalog::from_filters(vec![scale(), Filter::new("ascale", "")]);
        let hits: Vec<_> = catalog.search("SCA", 6).map(|f| f.name.as_str()).collect();
        assert_eq!(hits, vec!["scale", "ascale"]);
        assert_eq!(catalog.search("", 2).count(), 2);
        // Descriptions are not searched
        assert_eq!(catalog.search("video size", 6).count(), 0);
    }

    #[test]
    fn test_option_kind() {
        assert_eq!(FilterOption::new("n", "", "int").kind(), OptionKind::Numeric);
        assert_eq!(FilterOption::new("c", "", "color").kind(), OptionKind::Color);
        assert_eq!(
            FilterOption::new("mode", "", "int").with_allowed("fast", "").kind(),
            OptionKind::Enumerated
        );
        assert_eq!(FilterOption::new("x", "", "image_size").kind(), OptionKind::Other);
    }

    #[test]
    fn test_json_round_trip_shape() {
        let json = r#"[{"name":"anull","desc":"Pass the source unchanged",
            "input":[{"name":"default","type":"audio"}],
            "output":[{"name":"default","type":"audio"}],
            "options":[{"name":"n","desc":"","type":"int","defaultValue":"2","min":"1","max":"8","allowed":[]}]}]"#;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("filters.json");
        std::fs::write(&path, json).unwrap();

        let catalog = Catalog::load_json(&path).unwrap();
        let anull = catalog.get("anull").unwrap();
        assert_eq!(anull.inputs[0].kind, MediaKind::Audio);
        assert_eq!(anull.options[0].default_value, "2");

        let copy = dir.path().join("copy.json");
        catalog.save_json(&copy).unwrap();
        let reloaded = Catalog::load_json(&copy).unwrap();
        assert_eq!(reloaded.len(), catalog.len());
    }
}
