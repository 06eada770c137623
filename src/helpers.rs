//! Helper-Function Installer (spec §4.4).
//!
//! Ensures `get_vertices`/`get_edges` exist in the configured helper
//! namespace. Both functions read `age_params` (the staging table written by
//! [`crate::staging::StagingManager`]) and return the matching batch as
//! `agtype`, swallowing any lookup failure into an empty array so a type
//! with nothing staged produces zero creates rather than aborting the
//! transaction.

use std::collections::HashSet;
use std::sync::Mutex;

use once_cell::sync::Lazy;

use crate::cypher_gen::validate_identifier;
use crate::error::AppError;
use crate::graph::SqlExecutor;

/// Process-wide record of which helper namespaces have already been
/// installed, so repeated `loadGraphData` calls against the same database
/// don't re-run `CREATE OR REPLACE` on every transaction. Installation is
/// idempotent regardless, so a stale or cold cache (new process, different
/// database) only costs a redundant `CREATE OR REPLACE`, never incorrect
/// behavior.
static INSTALLED_NAMESPACES: Lazy<Mutex<HashSet<String>>> = Lazy::new(|| Mutex::new(HashSet::new()));

/// Installs and caches the `get_vertices`/`get_edges` helper UDFs for a
/// single schema namespace.
pub struct HelperInstaller {
    namespace: String,
}

impl HelperInstaller {
    pub fn new(namespace: impl Into<String>) -> Result<Self, AppError> {
        let namespace = namespace.into();
        validate_identifier(&namespace)
            .map_err(|e| AppError::Configuration(e.to_string()))?;
        Ok(Self { namespace })
    }

    /// Installs the helper UDFs on `executor` if this process hasn't done so
    /// for this namespace yet. Safe to call on every `loadGraphData` call;
    /// `CREATE OR REPLACE` makes repeated installation a no-op in practice.
    pub async fn ensure_installed<E: SqlExecutor + ?Sized>(&self, executor: &E) -> Result<(), AppError> {
        if INSTALLED_NAMESPACES.lock().unwrap().contains(&self.namespace) {
            return Ok(());
        }
        executor.execute_sql(&self.install_sql()).await?;
        INSTALLED_NAMESPACES
            .lock()
            .unwrap()
            .insert(self.namespace.clone());
        Ok(())
    }

    /// The install-time SQL text: schema creation plus both UDFs, matching
    /// the semantics of spec §4.4 exactly (quote-stripped lookup key,
    /// exception-swallowing empty-array fallback, `::text::agtype` cast).
    fn install_sql(&self) -> String {
        let ns = &self.namespace;
        format!(
            r#"
CREATE SCHEMA IF NOT EXISTS {ns};

CREATE OR REPLACE FUNCTION {ns}.get_vertices(type_name agtype)
RETURNS agtype AS $func$
DECLARE
    lookup_key TEXT;
    staged JSONB;
BEGIN
    lookup_key := 'vertex_' || trim(both '"' from type_name::text);
    BEGIN
        SELECT value INTO staged FROM age_params WHERE key = lookup_key;
    EXCEPTION WHEN OTHERS THEN
        staged := NULL;
    END;
    RETURN COALESCE(staged, '[]'::jsonb)::text::agtype;
END;
$func$ LANGUAGE plpgsql;

CREATE OR REPLACE FUNCTION {ns}.get_edges(type_name agtype)
RETURNS agtype AS $func$
DECLARE
    lookup_key TEXT;
    staged JSONB;
BEGIN
    lookup_key := 'edge_' || trim(both '"' from type_name::text);
    BEGIN
        SELECT value INTO staged FROM age_params WHERE key = lookup_key;
    EXCEPTION WHEN OTHERS THEN
        staged := NULL;
    END;
    RETURN COALESCE(staged, '[]'::jsonb)::text::agtype;
END;
$func$ LANGUAGE plpgsql;
"#,
            ns = ns,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{CypherExecutor, Params, Row, RowStream};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingExecutor {
        calls: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl CypherExecutor for CountingExecutor {
        async fn execute_cypher(&self, _: &str, _: Params) -> Result<RowStream<'_>, AppError> {
            Ok(Box::pin(futures::stream::empty()))
        }
        async fn run_cypher(&self, _: &str, _: Params) -> Result<(), AppError> {
            Ok(())
        }
    }

    #[async_trait::async_trait]
    impl SqlExecutor for CountingExecutor {
        async fn execute_sql(&self, sql: &str) -> Result<(), AppError> {
            assert!(sql.contains("get_vertices"));
            assert!(sql.contains("get_edges"));
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
        async fn query_sql(&self, _: &str) -> Result<RowStream<'_>, AppError> {
            Ok(Box::pin(futures::stream::empty::<Result<Row, AppError>>()))
        }
        async fn stage_put(&self, _: &str, _: &serde_json::Value) -> Result<(), AppError> {
            Ok(())
        }
        async fn stage_get(&self, _: &str) -> Result<Option<serde_json::Value>, AppError> {
            Ok(None)
        }
        async fn stage_clear(&self, _: &str) -> Result<(), AppError> {
            Ok(())
        }
        async fn stage_clear_all(&self) -> Result<(), AppError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn rejects_non_identifier_namespace() {
        assert!(HelperInstaller::new("bad ns").is_err());
    }

    #[tokio::test]
    async fn install_sql_names_both_udfs() {
        let installer = HelperInstaller::new("unique_test_namespace_for_helpers").unwrap();
        let executor = CountingExecutor::default();
        installer.ensure_installed(&executor).await.unwrap();
        assert_eq!(executor.calls.load(Ordering::SeqCst), 1);

        // Second call against the same namespace hits the process cache.
        installer.ensure_installed(&executor).await.unwrap();
        assert_eq!(executor.calls.load(Ordering::SeqCst), 1);
    }
}
