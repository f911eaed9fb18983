//! Platform compatibility resolution: parse, extract, intersect.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize, Serializer};

use crate::analyzer::error::AnalyzerResult;
use crate::analyzer::extract::{self, sql::SqlDialect};
use crate::analyzer::index::TableCompatibilityIndex;

pub const NO_COMMON_PLATFORM: &str = "None";
pub const NO_TABLES: &str = "No tables in query AST";
pub const INVALID_QUERY: &str = "Invalid query";
pub const UNKNOWN_TABLE: &str = "Unknown table";

/// Outcome of resolving a query.
///
/// Every variant maps onto the label list consumers render directly; see
/// [`Compatibility::labels`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Compatibility {
    /// Platforms every referenced table supports
    Platforms(Vec<String>),
    /// Tables were found but share no platform
    NoCommonPlatform,
    /// The query references no tables once CTE names are removed
    NoTables,
    /// The query could not be parsed
    InvalidQuery,
    /// Tables missing from the schema dataset, under [`UnknownTablePolicy::Sentinel`]
    UnknownTables(Vec<String>),
}

impl Compatibility {
    pub fn labels(&self) -> Vec<String> {
        match self {
            Self::Platforms(platforms) => platforms.clone(),
            Self::NoCommonPlatform => vec![NO_COMMON_PLATFORM.to_string()],
            Self::NoTables => vec![NO_TABLES.to_string()],
            Self::InvalidQuery => vec![INVALID_QUERY.to_string()],
            Self::UnknownTables(_) => vec![UNKNOWN_TABLE.to_string()],
        }
    }

    pub fn platforms(&self) -> Option<&[String]> {
        match self {
            Self::Platforms(platforms) => Some(platforms.as_slice()),
            _ => None,
        }
    }

    /// Returns true if the query runs on at least one platform
    pub fn is_compatible(&self) -> bool {
        matches!(self, Self::Platforms(_))
    }
}

impl fmt::Display for Compatibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.labels().join(", "))
    }
}

impl Serialize for Compatibility {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.labels().serialize(serializer)
    }
}

/// How tables missing from the schema dataset affect the intersection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UnknownTablePolicy {
    /// An unknown table supports no platform, forcing `["None"]`
    #[default]
    NoPlatforms,
    /// Unknown tables are left out of the intersection
    Skip,
    /// Any unknown table yields [`Compatibility::UnknownTables`]
    Sentinel,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ResolverOptions {
    pub dialect: SqlDialect,
    pub unknown_tables: UnknownTablePolicy,
}

/// Resolves queries against a shared, read-only [`TableCompatibilityIndex`].
#[derive(Debug, Clone)]
pub struct CompatibilityResolver {
    index: Arc<TableCompatibilityIndex>,
    options: ResolverOptions,
}

impl CompatibilityResolver {
    pub fn new(index: Arc<TableCompatibilityIndex>, options: ResolverOptions) -> Self {
        Self { index, options }
    }

    pub fn index(&self) -> &TableCompatibilityIndex {
        &self.index
    }

    pub fn options(&self) -> ResolverOptions {
        self.options
    }

    /// Resolves `sql`, turning parse failures into [`Compatibility::InvalidQuery`].
    pub fn resolve(&self, sql: &str) -> Compatibility {
        match self.analyze(sql) {
            Ok(compatibility) => compatibility,
            Err(err) => {
                tracing::warn!(error = %err, "query failed to parse");
                Compatibility::InvalidQuery
            }
        }
    }

    /// Like [`resolve`](Self::resolve), but returns the parse error to the caller.
    pub fn analyze(&self, sql: &str) -> AnalyzerResult<Compatibility> {
        let statements = extract::sql::parse(sql, self.options.dialect)?;
        let tables = extract::sql::extract_tables(&statements);
        Ok(self.resolve_tables(&tables))
    }

    /// Resolves an AST produced by an external parser.
    pub fn resolve_ast(&self, ast: &serde_json::Value) -> Compatibility {
        match extract::json::extract_tables(ast) {
            Ok(tables) => self.resolve_tables(&tables),
            Err(err) => {
                tracing::warn!(error = %err, "query AST could not be walked");
                Compatibility::InvalidQuery
            }
        }
    }

    /// Intersects the platform sets of `tables`.
    ///
    /// Output order follows the declared order of the first table that
    /// contributes to the intersection.
    pub fn resolve_tables(&self, tables: &[String]) -> Compatibility {
        if tables.is_empty() {
            return Compatibility::NoTables;
        }

        let mut common: Option<Vec<String>> = None;
        let mut unknown: Vec<String> = Vec::new();

        for table in tables {
            let platforms: &[String] = match self.index.lookup(table) {
                Some(platforms) => platforms,
                None => {
                    if !unknown.contains(table) {
                        unknown.push(table.clone());
                    }
                    match self.options.unknown_tables {
                        UnknownTablePolicy::NoPlatforms => &[],
                        UnknownTablePolicy::Skip | UnknownTablePolicy::Sentinel => continue,
                    }
                }
            };

            common = Some(match common.take() {
                None => {
                    let mut first: Vec<String> = Vec::with_capacity(platforms.len());
                    for platform in platforms {
                        if !first.contains(platform) {
                            first.push(platform.clone());
                        }
                    }
                    first
                }
                Some(mut acc) => {
                    acc.retain(|platform| platforms.contains(platform));
                    acc
                }
            });
        }

        if !unknown.is_empty() {
            tracing::debug!(tables = ?unknown, policy = ?self.options.unknown_tables, "query references unknown tables");
            if self.options.unknown_tables == UnknownTablePolicy::Sentinel {
                return Compatibility::UnknownTables(unknown);
            }
        }

        match common {
            Some(platforms) if !platforms.is_empty() => Compatibility::Platforms(platforms),
            _ => Compatibility::NoCommonPlatform,
        }
    }
}
