use crate::config::Config;
use crate::error::{CheckError, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tablecompat_core::analyzer::{index::TableCompatibilityIndex, Compatibility, CompatibilityResolver};
use walkdir::WalkDir;

pub struct Checker {
    resolver: CompatibilityResolver,
    reports: BTreeMap<String, QueryReport>,
}

#[derive(Debug, Clone, Serialize)]
pub struct QueryReport {
    /// Path of the query file relative to the queries root, without extension
    pub name: String,
    pub path: PathBuf,
    /// The SQL query text
    pub query: String,
    pub platforms: Compatibility,
}

impl Checker {
    pub fn new(resolver: CompatibilityResolver) -> Self {
        Self {
            resolver,
            reports: BTreeMap::new(),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let index = Self::load_schema(&config.schema.path)?;
        Ok(Self::new(CompatibilityResolver::new(Arc::new(index), config.resolver)))
    }

    pub fn load_schema(path: &Path) -> Result<TableCompatibilityIndex> {
        let index = TableCompatibilityIndex::from_path(path)?;
        tracing::info!(path = %path.display(), tables = index.len(), "schema dataset loaded");
        Ok(index)
    }

    pub fn process_queries(&mut self, path: &Path) -> Result<()> {
        if path.is_dir() {
            for entry in WalkDir::new(path).sort_by_file_name() {
                let entry = entry.map_err(|_| CheckError::InvalidPath(path.to_path_buf()))?;
                if entry.path().extension().map_or(false, |ext| ext == "sql") {
                    self.process_query_file(path, entry.path())?;
                }
            }
        } else {
            let root = path.parent().unwrap_or(Path::new(""));
            self.process_query_file(root, path)?;
        }
        Ok(())
    }

    fn process_query_file(&mut self, root: &Path, path: &Path) -> Result<()> {
        let content = fs::read_to_string(path)?;
        let name = path
            .strip_prefix(root)
            .unwrap_or(path)
            .with_extension("")
            .to_string_lossy()
            .replace('\\', "/");
        tracing::info!(query = %name, "checking query");
        self.analyze_query(name, path.to_path_buf(), content);
        Ok(())
    }

    pub fn analyze_query(&mut self, name: String, path: PathBuf, query: String) -> &QueryReport {
        let platforms = self.resolver.resolve(&query);
        self.reports.insert(
            name.clone(),
            QueryReport {
                name: name.clone(),
                path,
                query,
                platforms,
            },
        );
        &self.reports[&name]
    }

    /// Reports ordered by query name.
    pub fn reports(&self) -> impl Iterator<Item = &QueryReport> {
        self.reports.values()
    }

    pub fn into_reports(self) -> Vec<QueryReport> {
        self.reports.into_values().collect()
    }

    /// Names of queries that failed to parse.
    pub fn invalid_queries(&self) -> Vec<String> {
        self.reports
            .values()
            .filter(|report| report.platforms == Compatibility::InvalidQuery)
            .map(|report| report.name.clone())
            .collect()
    }

    /// Writes `{ "<query name>": [labels...] }` to `path`.
    pub fn write_report(&self, path: &Path, pretty: bool) -> Result<()> {
        let summary: BTreeMap<&str, &Compatibility> = self
            .reports
            .iter()
            .map(|(name, report)| (name.as_str(), &report.platforms))
            .collect();

        let json = if pretty {
            serde_json::to_string_pretty(&summary)?
        } else {
            serde_json::to_string(&summary)?
        };
        fs::write(path, json)?;
        tracing::info!(path = %path.display(), queries = summary.len(), "report written");
        Ok(())
    }
}
