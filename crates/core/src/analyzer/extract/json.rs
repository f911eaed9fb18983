//! Table extraction over JSON-shaped parse trees.
//!
//! Nodes are plain JSON objects. The fields that matter are `variant`,
//! `format`, `type`, `name` and `target.name`:
//!
//! ```json
//! { "type": "expression", "format": "table", "variant": "common",
//!   "target": { "type": "identifier", "variant": "table", "name": "cte_table" } }
//! ```
//!
//! A common/recursive table expression contributes its `target.name` to the
//! exclusion set; any other node with `variant == "table"` is a reference.

use serde_json::{Map, Value};

use super::TableCollector;
use crate::analyzer::error::{AnalyzerError, AnalyzerResult};

/// Deepest nesting the walker will follow before giving up.
pub const MAX_AST_DEPTH: usize = 512;

/// Returns the tables referenced by `ast`, minus CTE names.
///
/// `null` is treated as an empty tree. Any other scalar root is rejected.
pub fn extract_tables(ast: &Value) -> AnalyzerResult<Vec<String>> {
    match ast {
        Value::Null => return Ok(Vec::new()),
        Value::Object(_) | Value::Array(_) => {}
        other => {
            return Err(AnalyzerError::InvalidAst(format!(
                "expected an object or array at the root, found {}",
                other
            )))
        }
    }

    let mut collector = TableCollector::default();
    walk(ast, 0, &mut collector)?;
    let tables = collector.finish();
    tracing::debug!(?tables, "extracted table references");
    Ok(tables)
}

fn walk(value: &Value, depth: usize, collector: &mut TableCollector) -> AnalyzerResult<()> {
    if depth > MAX_AST_DEPTH {
        return Err(AnalyzerError::AstTooDeep {
            limit: MAX_AST_DEPTH,
        });
    }

    match value {
        Value::Object(node) => {
            visit_node(node, collector);
            for child in node.values() {
                walk(child, depth + 1, collector)?;
            }
        }
        Value::Array(items) => {
            for item in items {
                walk(item, depth + 1, collector)?;
            }
        }
        _ => {}
    }
    Ok(())
}

fn visit_node(node: &Map<String, Value>, collector: &mut TableCollector) {
    let field = |key: &str| node.get(key).and_then(Value::as_str);

    let variant = field("variant");
    if matches!(variant, Some("common" | "recursive"))
        && field("format") == Some("table")
        && field("type") == Some("expression")
    {
        if let Some(name) = node
            .get("target")
            .and_then(|target| target.get("name"))
            .and_then(Value::as_str)
        {
            collector.cte(name.to_string());
        }
    } else if variant == Some("table") {
        if let Some(name) = field("name") {
            collector.table(name.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn table(name: &str) -> Value {
        json!({ "type": "identifier", "variant": "table", "name": name })
    }

    fn select_from(from: Value) -> Value {
        json!({
            "type": "statement",
            "variant": "select",
            "result": [{ "type": "identifier", "variant": "star", "name": "*" }],
            "from": from
        })
    }

    #[test]
    fn collects_tables_in_preorder() {
        let ast = json!({
            "type": "statement",
            "variant": "list",
            "statement": [select_from(json!({
                "type": "map",
                "variant": "join",
                "source": table("users"),
                "map": [{ "type": "join", "variant": "join", "source": table("user_groups") }]
            }))]
        });

        assert_eq!(extract_tables(&ast).unwrap(), vec!["users", "user_groups"]);
    }

    #[test]
    fn excludes_common_table_expressions() {
        let mut statement = select_from(table("cte_table"));
        statement["with"] = json!([{
            "type": "expression",
            "format": "table",
            "variant": "common",
            "target": table("cte_table"),
            "expression": select_from(table("real_table"))
        }]);
        let ast = json!({ "type": "statement", "variant": "list", "statement": [statement] });

        assert_eq!(extract_tables(&ast).unwrap(), vec!["real_table"]);
    }

    #[test]
    fn recursive_expression_target_is_not_a_reference() {
        let ast = json!([{
            "type": "expression",
            "format": "table",
            "variant": "recursive",
            "target": { "variant": "table", "name": "counter" }
        }, table("counter"), table("uptime")]);

        assert_eq!(extract_tables(&ast).unwrap(), vec!["uptime"]);
    }

    #[test]
    fn null_is_an_empty_tree() {
        assert!(extract_tables(&Value::Null).unwrap().is_empty());
        assert!(extract_tables(&json!({ "type": "statement", "variant": "select" }))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn scalar_root_is_invalid() {
        let err = extract_tables(&json!("SELECT 1")).unwrap_err();
        assert!(matches!(err, AnalyzerError::InvalidAst(_)));
    }

    #[test]
    fn depth_is_capped() {
        let mut ast = table("users");
        for _ in 0..=MAX_AST_DEPTH {
            ast = json!({ "child": ast });
        }

        let err = extract_tables(&ast).unwrap_err();
        assert!(matches!(err, AnalyzerError::AstTooDeep { limit: MAX_AST_DEPTH }));
    }
}
