//! Staging Manager: moves a JSON-serializable list into the connection-local
//! `age_params` table under a well-known key, then clears it.
//!
//! `age_params` is how payload data reaches Cypher despite the platform's
//! lack of ordinary bound Cypher parameters - see the helper UDFs in
//! [`crate::helpers`] for the other half of the smuggling protocol.

use futures::TryStreamExt;
use serde::Serialize;

use crate::error::AppError;
use crate::graph::SqlExecutor;

/// Well-known key prefix for a vertex type's staged batch.
pub fn vertex_key(type_name: &str) -> String {
    format!("vertex_{type_name}")
}

/// Well-known key prefix for an edge type's staged batch.
pub fn edge_key(type_name: &str) -> String {
    format!("edge_{type_name}")
}

/// Owns writes to `age_params` on a single connection/transaction.
///
/// Borrows its executor rather than owning a connection handle: two
/// `StagingManager`s must never be constructed over the same connection at
/// once, since `age_params` visibility is connection-local and concurrent
/// writers on one connection would stomp on each other's keys.
pub struct StagingManager<'a, E: SqlExecutor + ?Sized> {
    executor: &'a E,
}

impl<'a, E: SqlExecutor + ?Sized> StagingManager<'a, E> {
    pub fn new(executor: &'a E) -> Self {
        Self { executor }
    }

    /// Upserts `(key, jsonb)` where the JSONB value is a JSON array of
    /// `items`, preserving each element's original property order.
    pub async fn store<T: Serialize>(&self, key: &str, items: &[T]) -> Result<(), AppError> {
        let value = serde_json::to_value(items)
            .map_err(|e| AppError::Staging(format!("failed to encode batch for '{key}': {e}")))?;
        self.executor.stage_put(key, &value).await
    }

    /// Deletes a single staged row.
    pub async fn clear(&self, key: &str) -> Result<(), AppError> {
        self.executor.stage_clear(key).await
    }

    /// Deletes every staged row on this connection.
    pub async fn clear_all(&self) -> Result<(), AppError> {
        self.executor.stage_clear_all().await
    }

    /// Diagnostic: true when `age_params` currently has no rows, which is
    /// the expected state of a freshly acquired, never-used connection.
    pub async fn isolated(&self) -> Result<bool, AppError> {
        let mut stream = self
            .executor
            .query_sql("SELECT 1 FROM age_params LIMIT 1")
            .await?;
        Ok(stream.try_next().await?.is_none())
    }
}
