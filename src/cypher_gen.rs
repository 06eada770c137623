//! Schema-typed Cypher Generator (spec §4.2).
//!
//! Produces the small, templated family of Cypher strings the Loader
//! Orchestrator executes: one `UNWIND ... CREATE` body per vertex type and
//! one per edge type. No payload data ever enters these strings - the only
//! things interpolated are the graph's own schema-declared identifiers
//! (schema namespace, type names, property names), each whitelisted against
//! both the schema and an identifier regex before use. Payload data flows
//! through `age_params` instead (see [`crate::staging`] and
//! [`crate::helpers`]).
//!
//! The generated body omits the outer `SELECT * FROM cypher('<graph>', $$ ...
//! $$) AS (...)` wrapper from spec §4.2 - that wrapper, and the RETURN-column
//! declaration it requires, are produced uniformly for every Cypher string by
//! [`crate::graph::backends::postgres`] from the body's own `RETURN` clause.
//! The generator's job ends at producing a valid Cypher body; which graph it
//! runs against is a property of the executor it's handed to, not of the
//! string itself.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::schema::Schema;

static IDENTIFIER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap());

/// Failure modes specific to Cypher generation.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum CypherGenError {
    #[error("'{0}' is not a valid identifier (expected [A-Za-z_][A-Za-z0-9_]*)")]
    InvalidIdentifier(String),
    #[error("schema has no vertex type '{0}'")]
    UnknownVertexType(String),
    #[error("schema has no edge type '{0}'")]
    UnknownEdgeType(String),
}

/// Checks a name against the identifier whitelist used for every
/// interpolated fragment (schema namespace, type names, property names).
pub fn validate_identifier(name: &str) -> Result<(), CypherGenError> {
    if IDENTIFIER_RE.is_match(name) {
        Ok(())
    } else {
        Err(CypherGenError::InvalidIdentifier(name.to_string()))
    }
}

/// Generates vertex/edge create-Cypher bodies for a given [`Schema`].
pub struct CypherGenerator<'s> {
    schema: &'s Schema,
    schema_namespace: String,
}

impl<'s> CypherGenerator<'s> {
    pub fn new(schema: &'s Schema, schema_namespace: impl Into<String>) -> Result<Self, CypherGenError> {
        let schema_namespace = schema_namespace.into();
        validate_identifier(&schema_namespace)?;
        Ok(Self {
            schema,
            schema_namespace,
        })
    }

    /// The Cypher body for creating one batch of vertices of `type_name`,
    /// consuming whatever is currently staged at `vertex_<type_name>`.
    pub fn vertex_create(&self, type_name: &str) -> Result<String, CypherGenError> {
        validate_identifier(type_name)?;
        let def = self
            .schema
            .vertices
            .get(type_name)
            .ok_or_else(|| CypherGenError::UnknownVertexType(type_name.to_string()))?;

        let mut assignments = Vec::new();
        for prop in def.properties.keys() {
            if prop == "id" {
                continue;
            }
            validate_identifier(prop)?;
            assignments.push(format!(
                "{prop}: CASE WHEN v.{prop} IS NOT NULL THEN v.{prop} ELSE NULL END"
            ));
        }

        let props_block = if assignments.is_empty() {
            String::new()
        } else {
            format!(", {}", assignments.join(", "))
        };

        Ok(format!(
            "UNWIND {ns}.get_vertices('{t}') AS v\n\
             CREATE (n:{t} {{ id: v.id{props} }})\n\
             RETURN count(n) AS created_vertices",
            ns = self.schema_namespace,
            t = type_name,
            props = props_block,
        ))
    }

    /// The Cypher body for creating one batch of edges of `type_name`,
    /// consuming `edge_<type_name>`. Endpoints that don't `MATCH` are
    /// silently dropped by the engine (dangling references, spec §4.5).
    pub fn edge_create(&self, type_name: &str) -> Result<String, CypherGenError> {
        validate_identifier(type_name)?;
        let def = self
            .schema
            .edges
            .get(type_name)
            .ok_or_else(|| CypherGenError::UnknownEdgeType(type_name.to_string()))?;
        validate_identifier(&def.from)?;
        validate_identifier(&def.to)?;

        let mut assignments = Vec::new();
        for prop in def.properties.keys() {
            if prop == "from" || prop == "to" {
                continue;
            }
            validate_identifier(prop)?;
            assignments.push(format!(
                "{prop}: CASE WHEN e.{prop} IS NOT NULL THEN e.{prop} ELSE NULL END"
            ));
        }

        let props_block = if assignments.is_empty() {
            String::new()
        } else {
            format!(" {{ {} }}", assignments.join(", "))
        };

        Ok(format!(
            "UNWIND {ns}.get_edges('{t}') AS e\n\
             MATCH (a:{from} {{ id: e.from }})\n\
             MATCH (b:{to} {{ id: e.to }})\n\
             CREATE (a)-[r:{t}{props}]->(b)\n\
             RETURN count(r) AS created_edges",
            ns = self.schema_namespace,
            t = type_name,
            from = def.from,
            to = def.to,
            props = props_block,
        ))
    }
}
