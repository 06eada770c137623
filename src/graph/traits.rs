//! Core traits for graph database abstraction.
//!
//! This module defines the trait hierarchy that backends must implement:
//!
//! - [`CypherExecutor`] - Required for all graph backends
//! - [`SqlExecutor`] - Optional, for backends that support SQL
//! - [`Transaction`] - Transaction lifecycle management
//! - [`GraphClient`] - Connection pool and transaction creation

use async_trait::async_trait;
use serde_json::Value as JsonValue;

use crate::config::IsolationLevel;
use crate::error::AppError;
use crate::graph::row::{Params, RowStream};

/// Executes Cypher queries against a graph database.
///
/// This is the core trait that all graph backends must implement.
/// It provides methods for executing queries that return results
/// and queries that don't (mutations).
#[async_trait]
pub trait CypherExecutor: Send + Sync {
    /// Executes a Cypher query and returns a stream of result rows.
    ///
    /// Use this for queries that return data (MATCH, RETURN).
    ///
    /// # Arguments
    ///
    /// * `cypher` - The Cypher query string
    /// * `params` - Parameters to bind to the query
    ///
    /// # Returns
    ///
    /// A stream of rows that can be iterated asynchronously.
    async fn execute_cypher(&self, cypher: &str, params: Params)
        -> Result<RowStream<'_>, AppError>;

    /// Executes a Cypher query without returning results.
    ///
    /// Use this for mutations (CREATE, MERGE, DELETE, SET).
    ///
    /// # Arguments
    ///
    /// * `cypher` - The Cypher query string
    /// * `params` - Parameters to bind to the query
    async fn run_cypher(&self, cypher: &str, params: Params) -> Result<(), AppError>;
}

/// Executes SQL queries against the database.
///
/// This trait is optional - only backends that support SQL (like PostgreSQL)
/// need to implement it. It's useful for DDL operations and backend-specific
/// functionality that can't be expressed in Cypher.
#[async_trait]
pub trait SqlExecutor: Send + Sync {
    /// Executes a SQL statement without returning results.
    ///
    /// Use this for DDL (CREATE TABLE, CREATE INDEX) and other
    /// non-query operations.
    async fn execute_sql(&self, sql: &str) -> Result<(), AppError>;

    /// Executes a SQL query and returns a stream of result rows.
    async fn query_sql(&self, sql: &str) -> Result<RowStream<'_>, AppError>;

    /// Upserts a JSON value into the connection-local `age_params` staging
    /// table under `key`, using an ordinary bound SQL parameter (not Cypher).
    async fn stage_put(&self, key: &str, value: &JsonValue) -> Result<(), AppError>;

    /// Reads a staged value back, if present. Used only for diagnostics and
    /// isolation tests - the Cypher-side consumption goes through the helper
    /// UDFs, not this method.
    async fn stage_get(&self, key: &str) -> Result<Option<JsonValue>, AppError>;

    /// Deletes a single staged row.
    async fn stage_clear(&self, key: &str) -> Result<(), AppError>;

    /// Deletes every staged row on this connection.
    async fn stage_clear_all(&self) -> Result<(), AppError>;
}

/// Transaction lifecycle management.
///
/// This trait handles committing or rolling back a transaction.
/// It's separate from the executor traits to allow flexibility
/// in how transactions are composed.
#[async_trait]
pub trait Transaction: Send + Sync {
    /// Commits the transaction, making all changes permanent.
    ///
    /// Consumes the transaction - it cannot be used after commit.
    async fn commit(self) -> Result<(), AppError>;

    /// Rolls back the transaction, discarding all changes.
    ///
    /// Consumes the transaction - it cannot be used after rollback.
    async fn rollback(self) -> Result<(), AppError>;
}

/// A graph database client that can begin transactions.
///
/// This trait extends [`CypherExecutor`] to add transaction support.
/// Implementations typically wrap a connection pool and provide
/// auto-commit queries via the executor methods, plus explicit
/// transactions via [`begin`](GraphClient::begin).
#[async_trait]
pub trait GraphClient: CypherExecutor {
    /// The transaction type returned by this client.
    ///
    /// Bounded by [`SqlExecutor`] as well as [`CypherExecutor`]: the Loader
    /// Orchestrator drives both the `age_params` staging protocol (SQL side)
    /// and the generated Cypher on the very same pinned transaction, so any
    /// backend this crate targets must offer both on its transaction type.
    type Tx<'a>: Transaction + CypherExecutor + SqlExecutor
    where
        Self: 'a;

    /// Begins a new transaction with an explicit isolation level and
    /// statement timeout (`0` means no timeout).
    ///
    /// The returned transaction can be used to execute queries,
    /// then must be either committed or rolled back.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let txn = client.begin_with(IsolationLevel::ReadCommitted, 60_000).await?;
    /// txn.run_cypher("CREATE (n:Node {id: $id})", params).await?;
    /// txn.commit().await?;
    /// ```
    async fn begin_with(
        &self,
        isolation: IsolationLevel,
        timeout_ms: u32,
    ) -> Result<Self::Tx<'_>, AppError>;

    /// Begins a transaction with the default isolation level and no timeout.
    async fn begin(&self) -> Result<Self::Tx<'_>, AppError> {
        self.begin_with(IsolationLevel::default(), 0).await
    }
}
