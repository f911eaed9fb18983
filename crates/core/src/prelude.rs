pub use crate::analyzer::{
    compatible_platforms,
    error::{AnalyzerError, AnalyzerResult},
    extract::sql::SqlDialect,
    index::{TableCompatibilityIndex, TableDefinition},
    resolver::{Compatibility, CompatibilityResolver, ResolverOptions, UnknownTablePolicy},
};
