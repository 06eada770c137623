//! Macro for convenient Cypher query construction.

/// Macro for inline Cypher queries with optional parameters.
///
/// This macro provides a shorthand for creating and parameterizing queries.
///
/// # Usage
///
/// ```ignore
/// use batch_loader::graph::cypher;
///
/// // Query without parameters
/// let query = cypher!(graph, "MATCH (n) RETURN n");
///
/// // Query with parameters
/// let query = cypher!(graph, "MATCH (n) WHERE n.id = $id RETURN n", id = entity_id);
///
/// // Multiple parameters
/// let query = cypher!(
///     graph,
///     "MATCH (n) WHERE n.id = $id AND n.name = $name RETURN n",
///     id = entity_id,
///     name = entity_name
/// );
///
/// // Execute the query
/// let rows = query.fetch_all().await?;
/// ```
#[macro_export]
macro_rules! cypher {
    // Query without parameters
    ($graph:expr, $query:expr) => {
        $graph.query($query)
    };
    // Query with parameters
    ($graph:expr, $query:expr, $($name:ident = $value:expr),+ $(,)?) => {
        $graph.query($query)$(.param(stringify!($name), $value))+
    };
}
