//! Extraction of `RETURN` clause column names from a Cypher string.
//!
//! Apache AGE requires the SQL wrapper around `cypher()` to declare a column
//! for every value the query returns (`... AS (col1 agtype, col2 agtype)`).
//! This module recovers those column names from the query text itself so the
//! backend doesn't need them supplied separately.

/// Failure modes when locating/parsing a `RETURN` clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The query has no top-level `RETURN` clause (a write-only statement).
    NoReturnClause,
    /// `RETURN *` has no fixed column list and isn't supported.
    ReturnStarNotSupported,
    /// The clause couldn't be split into columns.
    InvalidSyntax(String),
}

/// Extracts column names from a Cypher query's `RETURN` clause.
///
/// Each returned expression becomes a column named after its `AS` alias, or
/// the raw expression text when there is no alias (e.g. `n` or `n.name`).
pub fn extract_return_columns(cypher: &str) -> Result<Vec<String>, ParseError> {
    let clause = match find_return_clause(cypher) {
        Some(c) => c,
        None => return Err(ParseError::NoReturnClause),
    };

    let clause = clause.trim();
    let clause = strip_leading_distinct(clause);

    if clause == "*" {
        return Err(ParseError::ReturnStarNotSupported);
    }

    let parts = split_top_level_commas(clause);
    if parts.is_empty() {
        return Err(ParseError::InvalidSyntax(
            "empty RETURN clause".to_string(),
        ));
    }

    let mut columns = Vec::with_capacity(parts.len());
    for part in parts {
        let part = part.trim();
        if part.is_empty() {
            return Err(ParseError::InvalidSyntax(
                "empty column expression in RETURN clause".to_string(),
            ));
        }
        columns.push(column_name(part));
    }

    Ok(columns)
}

/// Finds the text following the last top-level `RETURN` keyword, up to the
/// next clause-terminating keyword (`ORDER BY`, `SKIP`, `LIMIT`) or the end
/// of the string. Ignores occurrences inside string/quote literals.
fn find_return_clause(cypher: &str) -> Option<&str> {
    let bytes = cypher.as_bytes();
    let upper = cypher.to_uppercase();
    let mut in_quote: Option<u8> = None;
    let mut return_start = None;

    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        match in_quote {
            Some(q) if b == q => in_quote = None,
            Some(_) => {}
            None if b == b'\'' || b == b'"' => in_quote = Some(b),
            None if is_word_at(&upper, i, "RETURN") => {
                return_start = Some(i + "RETURN".len());
            }
            _ => {}
        }
        i += 1;
    }

    let start = return_start?;
    let rest = &cypher[start..];
    let rest_upper = &upper[start..];

    let mut end = rest.len();
    for terminator in ["ORDER BY", "SKIP", "LIMIT"] {
        if let Some(pos) = find_word(rest_upper, terminator) {
            if pos < end {
                end = pos;
            }
        }
    }

    Some(&rest[..end])
}

fn is_word_at(haystack: &str, pos: usize, word: &str) -> bool {
    let bytes = haystack.as_bytes();
    if pos + word.len() > bytes.len() {
        return false;
    }
    if &haystack[pos..pos + word.len()] != word {
        return false;
    }
    let before_ok = pos == 0 || !is_ident_byte(bytes[pos - 1]);
    let after_ok = pos + word.len() == bytes.len() || !is_ident_byte(bytes[pos + word.len()]);
    before_ok && after_ok
}

fn find_word(haystack: &str, word: &str) -> Option<usize> {
    (0..haystack.len()).find(|&i| is_word_at(haystack, i, word))
}

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

fn strip_leading_distinct(clause: &str) -> &str {
    let upper = clause.to_uppercase();
    if is_word_at(&upper, 0, "DISTINCT") {
        clause["DISTINCT".len()..].trim_start()
    } else {
        clause
    }
}

/// Splits a comma-separated expression list, ignoring commas nested inside
/// `()`, `[]`, or `{}`.
fn split_top_level_commas(s: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut current = String::new();
    let mut in_quote: Option<char> = None;

    for c in s.chars() {
        match in_quote {
            Some(q) if c == q => {
                in_quote = None;
                current.push(c);
            }
            Some(_) => current.push(c),
            None => match c {
                '\'' | '"' => {
                    in_quote = Some(c);
                    current.push(c);
                }
                '(' | '[' | '{' => {
                    depth += 1;
                    current.push(c);
                }
                ')' | ']' | '}' => {
                    depth -= 1;
                    current.push(c);
                }
                ',' if depth == 0 => {
                    parts.push(std::mem::take(&mut current));
                }
                _ => current.push(c),
            },
        }
    }
    if !current.trim().is_empty() {
        parts.push(current);
    }
    parts
}

/// Derives a column name from one `RETURN` expression: the `AS` alias if
/// present, otherwise the expression text verbatim (e.g. `n`, `n.name`,
/// `count(n)`).
fn column_name(expr: &str) -> String {
    let upper = expr.to_uppercase();
    if let Some(pos) = find_word(&upper, "AS") {
        let alias = expr[pos + 2..].trim();
        if !alias.is_empty() {
            return alias.to_string();
        }
    }
    expr.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_column_no_alias() {
        let cols = extract_return_columns("MATCH (n) RETURN n").unwrap();
        assert_eq!(cols, vec!["n"]);
    }

    #[test]
    fn multiple_columns_with_alias() {
        let cols =
            extract_return_columns("MATCH (a)-[r]->(b) RETURN a, r AS rel, b").unwrap();
        assert_eq!(cols, vec!["a", "rel", "b"]);
    }

    #[test]
    fn property_access_columns() {
        let cols = extract_return_columns("MATCH (n) RETURN n.name, n.age AS age").unwrap();
        assert_eq!(cols, vec!["n.name", "age"]);
    }

    #[test]
    fn no_return_clause() {
        let err = extract_return_columns("CREATE (n:Test {id: 1})").unwrap_err();
        assert_eq!(err, ParseError::NoReturnClause);
    }

    #[test]
    fn return_star_rejected() {
        let err = extract_return_columns("MATCH (n) RETURN *").unwrap_err();
        assert_eq!(err, ParseError::ReturnStarNotSupported);
    }

    #[test]
    fn ignores_return_word_inside_string_literal() {
        let err = extract_return_columns("CREATE (n:Test {note: 'please RETURN this'})")
            .unwrap_err();
        assert_eq!(err, ParseError::NoReturnClause);
    }

    #[test]
    fn count_aggregate_column() {
        let cols = extract_return_columns(
            "UNWIND batch_loader.get_vertices('Person') AS v CREATE (n:Person) RETURN count(n) AS created_vertices",
        )
        .unwrap();
        assert_eq!(cols, vec!["created_vertices"]);
    }

    #[test]
    fn strips_order_by_and_limit() {
        let cols =
            extract_return_columns("MATCH (n) RETURN n.name AS name ORDER BY name LIMIT 10")
                .unwrap();
        assert_eq!(cols, vec!["name"]);
    }
}
