//! Extraction of referenced table names from a parsed query.
//!
//! Both front ends make a single pre-order pass that collects real table
//! references and CTE names side by side, then drop every reference that
//! names a CTE declared anywhere in the query. Order and duplicates of the
//! remaining references are preserved.
//!
//! - [`sql`]: walks a `sqlparser` AST using its visitor
//! - [`json`]: walks a JSON-shaped AST produced by an external parser

pub mod json;
pub mod sql;

use std::collections::HashSet;

/// Accumulates table references and CTE names during a walk.
#[derive(Debug, Default)]
pub(crate) struct TableCollector {
    tables: Vec<String>,
    cte_names: HashSet<String>,
}

impl TableCollector {
    pub(crate) fn table(&mut self, name: String) {
        self.tables.push(name);
    }

    pub(crate) fn cte(&mut self, name: String) {
        self.cte_names.insert(name);
    }

    /// Finishes the walk, removing references to CTE-defined names.
    pub(crate) fn finish(self) -> Vec<String> {
        let Self { tables, cte_names } = self;
        if !cte_names.is_empty() {
            tracing::debug!(ctes = ?cte_names, "excluding CTE names from table references");
        }
        tables
            .into_iter()
            .filter(|table| !cte_names.contains(table))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cte_names_declared_after_use_are_still_excluded() {
        let mut collector = TableCollector::default();
        collector.table("cte".into());
        collector.table("users".into());
        collector.table("users".into());
        collector.cte("cte".into());

        assert_eq!(collector.finish(), vec!["users", "users"]);
    }
}
