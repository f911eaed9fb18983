use std::ops::ControlFlow;

use serde::Deserialize;
use sqlparser::ast::{Ident, Query, Statement, TableFactor, Visit, Visitor};
use sqlparser::dialect::{Dialect, GenericDialect, SQLiteDialect};
use sqlparser::parser::Parser;

use super::TableCollector;
use crate::analyzer::error::AnalyzerResult;

/// SQL grammar used to parse queries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SqlDialect {
    /// osquery runs on SQLite, so this is the default.
    #[default]
    Sqlite,
    Generic,
}

impl SqlDialect {
    fn dialect(self) -> Box<dyn Dialect> {
        match self {
            Self::Sqlite => Box::new(SQLiteDialect {}),
            Self::Generic => Box::new(GenericDialect {}),
        }
    }
}

/// Parses `sql` into statements. Empty input yields no statements.
pub fn parse(sql: &str, dialect: SqlDialect) -> AnalyzerResult<Vec<Statement>> {
    let dialect = dialect.dialect();
    let statements = Parser::parse_sql(dialect.as_ref(), sql)?;
    Ok(statements)
}

/// Returns the tables referenced by `statements`, minus CTE names.
pub fn extract_tables(statements: &[Statement]) -> Vec<String> {
    let mut visitor = TableRefVisitor::default();
    for statement in statements {
        match statement.visit(&mut visitor) {
            ControlFlow::Continue(()) => {}
            ControlFlow::Break(()) => break,
        }
    }
    let tables = visitor.collector.finish();
    tracing::debug!(?tables, "extracted table references");
    tables
}

/// Visitor that records CTE aliases and table names in one pass.
#[derive(Default)]
struct TableRefVisitor {
    collector: TableCollector,
}

impl Visitor for TableRefVisitor {
    type Break = ();

    fn pre_visit_query(&mut self, query: &Query) -> ControlFlow<Self::Break> {
        if let Some(with) = &query.with {
            for cte in &with.cte_tables {
                self.collector.cte(normalize(&cte.alias.name));
            }
        }
        ControlFlow::Continue(())
    }

    fn pre_visit_table_factor(&mut self, factor: &TableFactor) -> ControlFlow<Self::Break> {
        // `json_each(...)` and `pragma_table_info(...)` carry args and are
        // table-valued functions, not tables.
        if let TableFactor::Table { name, args: None, .. } = factor {
            // `main.users` names the table `users`
            if let Some(ident) = name.0.last() {
                self.collector.table(normalize(ident));
            }
        }
        ControlFlow::Continue(())
    }
}

/// SQLite matches identifiers case-insensitively, quoted or not.
fn normalize(ident: &Ident) -> String {
    ident.value.to_ascii_lowercase()
}
