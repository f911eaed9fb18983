//! Table name to supported-platform lookup, built once from a schema dataset.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::Deserialize;

use crate::analyzer::error::AnalyzerResult;

/// One entry of the schema dataset.
///
/// Datasets usually carry more per-table metadata (description, columns, ...);
/// only the name and platform list are kept.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TableDefinition {
    pub name: String,
    #[serde(default)]
    pub platforms: Vec<String>,
}

impl TableDefinition {
    pub fn new<I, S>(name: impl Into<String>, platforms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            platforms: platforms.into_iter().map(Into::into).collect(),
        }
    }
}

/// Immutable mapping from table name to the platforms that table can be queried on.
#[derive(Debug, Default, Clone)]
pub struct TableCompatibilityIndex {
    tables: HashMap<String, Vec<String>>,
}

impl TableCompatibilityIndex {
    /// Builds the index. Names are case-folded and duplicates resolve
    /// last-write-wins.
    pub fn from_definitions(definitions: impl IntoIterator<Item = TableDefinition>) -> Self {
        let mut tables = HashMap::new();
        for def in definitions {
            if tables.insert(def.name.to_ascii_lowercase(), def.platforms).is_some() {
                tracing::warn!(table = %def.name, "duplicate table in schema dataset, keeping last definition");
            }
        }
        Self { tables }
    }

    pub fn from_json_str(json: &str) -> AnalyzerResult<Self> {
        let definitions: Vec<TableDefinition> = serde_json::from_str(json)?;
        Ok(Self::from_definitions(definitions))
    }

    pub fn from_reader(reader: impl Read) -> AnalyzerResult<Self> {
        let definitions: Vec<TableDefinition> = serde_json::from_reader(reader)?;
        Ok(Self::from_definitions(definitions))
    }

    pub fn from_path(path: impl AsRef<Path>) -> AnalyzerResult<Self> {
        let file = File::open(path.as_ref())?;
        let index = Self::from_reader(BufReader::new(file))?;
        tracing::debug!(path = %path.as_ref().display(), tables = index.len(), "loaded schema dataset");
        Ok(index)
    }

    /// Returns the declared platforms of `table`.
    ///
    /// `None` means the table is unknown, which is not the same as
    /// `Some(&[])` (a known table supported nowhere). Matching ignores ASCII
    /// case.
    pub fn lookup(&self, table: &str) -> Option<&[String]> {
        self.tables.get(&table.to_ascii_lowercase()).map(Vec::as_slice)
    }

    pub fn contains(&self, table: &str) -> bool {
        self.tables.contains_key(&table.to_ascii_lowercase())
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// All known table names, sorted.
    pub fn table_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tables.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Tables that declare support for `platform`, sorted.
    pub fn tables_for_platform(&self, platform: &str) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .tables
            .iter()
            .filter(|(_, platforms)| platforms.iter().any(|p| p == platform))
            .map(|(name, _)| name.as_str())
            .collect();
        names.sort_unstable();
        names
    }
}
