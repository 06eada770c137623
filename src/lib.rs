//! batch-loader - transactional bulk ingestion of schema-validated graph
//! payloads into PostgreSQL + Apache AGE.
//!
//! A [`crate::schema::Schema`] declares the vertex/edge types a graph
//! accepts; [`crate::loader::Loader`] takes a [`crate::data::GraphData`]
//! payload conforming to it and loads the whole thing in one transaction,
//! batch by batch, reporting progress as it goes.

pub mod config;
pub mod cypher_gen;
pub mod data;
pub mod error;
pub mod graph;
pub mod helpers;
pub mod loader;
pub mod progress;
pub mod schema;
pub mod staging;
pub mod telemetry;
pub mod validator;
