//! Typed schema model: the dependency-free leaf that the Validator, Cypher
//! Generator, Staging Manager, and Loader Orchestrator are all built against.

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

/// A property's declared runtime type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropType {
    String,
    Integer,
    Float,
    Boolean,
    Date,
    Array,
    Object,
}

/// Optional value constraints layered on top of a [`PropType`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Constraints {
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
    pub format: Option<String>,
}

/// The declared shape of a single property.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropSpec {
    #[serde(rename = "type")]
    pub prop_type: PropType,
    #[serde(flatten, default)]
    pub constraints: Constraints,
}

impl PropSpec {
    pub fn new(prop_type: PropType) -> Self {
        Self {
            prop_type,
            constraints: Constraints::default(),
        }
    }
}

/// Declared shape of a vertex type: its properties (in declaration order)
/// and which of them are required.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VertexDef {
    pub properties: IndexMap<String, PropSpec>,
    pub required: IndexSet<String>,
}

/// Declared shape of an edge type: properties plus the vertex types its
/// endpoints must belong to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgeDef {
    pub properties: IndexMap<String, PropSpec>,
    pub required: IndexSet<String>,
    pub from: String,
    pub to: String,
}

/// A schema error raised while constructing a [`Schema`], not while
/// validating a payload against one (that's the Validator's job).
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("edge type '{edge}' references undefined vertex type '{vertex}' as '{role}'")]
    UndefinedEndpointType {
        edge: String,
        vertex: String,
        role: &'static str,
    },
    #[error("vertex type '{vertex_type}' lists '{prop}' as required but it has no PropSpec")]
    RequiredPropertyUndeclared { vertex_type: String, prop: String },
}

/// Typed definition of the graph the loader targets: vertex/edge type
/// declarations plus a capability interface used uniformly by the
/// Validator, Cypher Generator, and Loader Orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Schema {
    pub version: u32,
    pub vertices: IndexMap<String, VertexDef>,
    pub edges: IndexMap<String, EdgeDef>,
}

impl Schema {
    /// Builds a schema, checking the invariants from the data model:
    /// every edge's `from`/`to` names a declared vertex type, and every
    /// `required` property is itself declared in `properties`.
    pub fn new(
        version: u32,
        vertices: IndexMap<String, VertexDef>,
        edges: IndexMap<String, EdgeDef>,
    ) -> Result<Self, SchemaError> {
        for (vertex_type, def) in &vertices {
            for prop in &def.required {
                if !def.properties.contains_key(prop) {
                    return Err(SchemaError::RequiredPropertyUndeclared {
                        vertex_type: vertex_type.clone(),
                        prop: prop.clone(),
                    });
                }
            }
        }

        for (edge_type, def) in &edges {
            if !vertices.contains_key(&def.from) {
                return Err(SchemaError::UndefinedEndpointType {
                    edge: edge_type.clone(),
                    vertex: def.from.clone(),
                    role: "from",
                });
            }
            if !vertices.contains_key(&def.to) {
                return Err(SchemaError::UndefinedEndpointType {
                    edge: edge_type.clone(),
                    vertex: def.to.clone(),
                    role: "to",
                });
            }
            for prop in &def.required {
                if !def.properties.contains_key(prop) {
                    return Err(SchemaError::RequiredPropertyUndeclared {
                        vertex_type: edge_type.clone(),
                        prop: prop.clone(),
                    });
                }
            }
        }

        Ok(Self {
            version,
            vertices,
            edges,
        })
    }

    /// Vertex types known to this schema, in declaration order.
    pub fn vertex_types(&self) -> impl Iterator<Item = &str> {
        self.vertices.keys().map(|s| s.as_str())
    }

    /// Edge types known to this schema, in declaration order.
    pub fn edge_types(&self) -> impl Iterator<Item = &str> {
        self.edges.keys().map(|s| s.as_str())
    }

    pub fn is_vertex_type(&self, name: &str) -> bool {
        self.vertices.contains_key(name)
    }

    pub fn is_edge_type(&self, name: &str) -> bool {
        self.edges.contains_key(name)
    }

    /// Required property names for a vertex or edge type.
    pub fn required_of(&self, type_name: &str) -> Option<&IndexSet<String>> {
        self.vertices
            .get(type_name)
            .map(|d| &d.required)
            .or_else(|| self.edges.get(type_name).map(|d| &d.required))
    }

    /// Declared properties (in order) for a vertex or edge type.
    pub fn properties_of(&self, type_name: &str) -> Option<&IndexMap<String, PropSpec>> {
        self.vertices
            .get(type_name)
            .map(|d| &d.properties)
            .or_else(|| self.edges.get(type_name).map(|d| &d.properties))
    }

    /// `(from, to)` vertex types for an edge type.
    pub fn endpoint_types_of(&self, edge_type: &str) -> Option<(&str, &str)> {
        self.edges
            .get(edge_type)
            .map(|d| (d.from.as_str(), d.to.as_str()))
    }
}
