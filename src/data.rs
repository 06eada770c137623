//! The payload the loader ingests: `GraphData`, a map of typed vertex/edge
//! lists, each element an order-preserving `PropertyBag`.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// An ordered dictionary of JSON-compatible values.
///
/// Backed by [`IndexMap`] so that `serde_json::to_value` of a bag preserves
/// the original key order - required for the staged JSONB array to reflect
/// the payload's own property order, not an alphabetized one.
pub type PropertyBag = IndexMap<String, JsonValue>;

/// The top-level payload: `{vertices, edges}`, each a map from type name to
/// a list of property bags. Either map may be absent or empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphData {
    #[serde(default)]
    pub vertices: IndexMap<String, Vec<PropertyBag>>,
    #[serde(default)]
    pub edges: IndexMap<String, Vec<PropertyBag>>,
}

impl GraphData {
    pub fn is_empty(&self) -> bool {
        self.vertices.values().all(|v| v.is_empty())
            && self.edges.values().all(|v| v.is_empty())
    }

    /// Total element count across every vertex and edge type.
    pub fn len(&self) -> usize {
        self.vertices.values().map(|v| v.len()).sum::<usize>()
            + self.edges.values().map(|v| v.len()).sum::<usize>()
    }
}

/// Reads a property bag's `id` field as a string, the join key used for
/// both duplicate-id detection and edge endpoint matching.
pub fn bag_id(bag: &PropertyBag) -> Option<&str> {
    bag.get("id").and_then(|v| v.as_str())
}

/// Reads a property bag's `from`/`to` fields as strings.
pub fn bag_endpoint(bag: &PropertyBag, field: &str) -> Option<&str> {
    bag.get(field).and_then(|v| v.as_str())
}
