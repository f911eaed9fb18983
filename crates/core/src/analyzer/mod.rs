// analyzer/mod.rs
//! Static platform-compatibility analysis for SQL queries.
//!
//! The analyzer decides, before a query is sent anywhere, which host platforms
//! can run it: every table the query reads from must be collectable on a
//! platform for that platform to be in the result.
//!
//! # Architecture
//!
//! - [`index`]: Table name to supported-platform lookup built from a schema dataset
//! - [`extract`]: Table reference extraction with CTE exclusion
//! - [`resolver`]: Parse, extract and intersect, yielding a [`Compatibility`]
//! - [`error`]: Error types specific to analysis failures

pub mod error;
pub mod extract;
pub mod index;
pub mod resolver;

pub use resolver::{Compatibility, CompatibilityResolver, ResolverOptions, UnknownTablePolicy};

/// Resolves `sql` and returns the label list consumers render directly.
///
/// This is either the compatible platform identifiers or one of the
/// sentinel lists (`["None"]`, `["No tables in query AST"]`,
/// `["Invalid query"]`, `["Unknown table"]`).
pub fn compatible_platforms(resolver: &CompatibilityResolver, sql: &str) -> Vec<String> {
    resolver.resolve(sql).labels()
}
