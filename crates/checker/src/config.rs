use serde::Deserialize;
use std::path::{Path, PathBuf};
use tablecompat_core::analyzer::ResolverOptions;
use crate::error::{CheckError, Result};

pub const CONFIG_FILE: &str = "tablecompat.toml";

#[derive(Debug, Deserialize)]
pub struct Config {
    pub version: String,
    pub schema: SchemaConfig,
    pub queries: QueriesConfig,
    #[serde(default)]
    pub resolver: ResolverOptions,
    pub output: Option<OutputConfig>,
}

#[derive(Debug, Deserialize)]
pub struct SchemaConfig {
    /// JSON schema dataset: an array of `{ name, platforms }` objects
    pub path: PathBuf,
}

#[derive(Debug, Deserialize)]
pub struct QueriesConfig {
    /// A `.sql` file or a directory searched recursively for them
    pub path: PathBuf,
}

#[derive(Debug, Deserialize)]
pub struct OutputConfig {
    pub path: PathBuf,
    #[serde(default)]
    pub pretty: bool,
}

impl Config {
    pub fn find_and_load(start_dir: &Path) -> Result<(Self, PathBuf)> {
        let config_path = find(start_dir)
            .ok_or_else(|| CheckError::ConfigNotFound(start_dir.to_path_buf()))?;
        let config = Self::load(&config_path)?;
        let config_dir = config_path.parent().map(Path::to_path_buf).unwrap_or_default();
        Ok((config, config_dir))
    }

    /// Resolver options of the nearest config, or the defaults when there is
    /// none. The config's paths are not validated, so this works alongside an
    /// explicit `--schema`.
    pub fn find_resolver_options(start_dir: &Path) -> Result<ResolverOptions> {
        match find(start_dir) {
            Some(config_path) => {
                let content = std::fs::read_to_string(&config_path)?;
                Ok(Self::from_toml(&content)?.resolver)
            }
            None => Ok(ResolverOptions::default()),
        }
    }

    /// Loads and validates a config. Relative paths resolve against the
    /// directory holding the config file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut config = Self::from_toml(&content)?;
        if let Some(base) = path.parent() {
            config.rebase(base);
        }
        config.validate()?;
        Ok(config)
    }

    fn rebase(&mut self, base: &Path) {
        let rebase = |path: &mut PathBuf| {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        };
        rebase(&mut self.schema.path);
        rebase(&mut self.queries.path);
        if let Some(output) = &mut self.output {
            rebase(&mut output.path);
        }
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.schema.path.exists() {
            return Err(CheckError::InvalidPath(self.schema.path.clone()));
        }

        if !self.queries.path.exists() {
            return Err(CheckError::InvalidPath(self.queries.path.clone()));
        }

        if let Some(output) = &self.output {
            if let Some(parent) = output.path.parent() {
                if !parent.as_os_str().is_empty() && !parent.exists() {
                    return Err(CheckError::InvalidPath(parent.to_path_buf()));
                }
            }
        }

        Ok(())
    }
}

fn find(start_dir: &Path) -> Option<PathBuf> {
    start_dir
        .ancestors()
        .map(|dir| dir.join(CONFIG_FILE))
        .find(|path| path.exists())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tablecompat_core::analyzer::{extract::sql::SqlDialect, UnknownTablePolicy};

    #[test]
    fn resolver_section_is_optional() {
        let config = Config::from_toml(
            r#"
            version = "1.0"

            [schema]
            path = "schema.json"

            [queries]
            path = "queries/"
            "#,
        )
        .expect("config should parse");

        assert_eq!(config.resolver, ResolverOptions::default());
        assert!(config.output.is_none());
    }

    #[test]
    fn reads_resolver_options() {
        let config = Config::from_toml(
            r#"
            version = "1.0"

            [schema]
            path = "schema.json"

            [queries]
            path = "queries/"

            [resolver]
            dialect = "generic"
            unknown_tables = "skip"

            [output]
            path = "compat.json"
            pretty = true
            "#,
        )
        .expect("config should parse");

        assert_eq!(config.resolver.dialect, SqlDialect::Generic);
        assert_eq!(config.resolver.unknown_tables, UnknownTablePolicy::Skip);
        assert!(config.output.map_or(false, |output| output.pretty));
    }

    #[test]
    fn rejects_unknown_policy() {
        let err = Config::from_toml(
            r#"
            version = "1.0"
            [schema]
            path = "schema.json"
            [queries]
            path = "queries/"
            [resolver]
            unknown_tables = "ignore"
            "#,
        )
        .unwrap_err();

        assert!(matches!(err, CheckError::Toml(_)));
    }
}
