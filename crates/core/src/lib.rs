//! tablecompat is a static analyzer that works out which host platforms can
//! run an osquery-style SQL query.
//!
//! # Overview
//!
//! Each queryable table is only available on some platforms (`darwin`,
//! `windows`, `linux`, `chrome`, ...). Given a schema dataset listing those
//! platforms per table, this crate parses a query, finds the tables it reads
//! from (ignoring names defined by common table expressions) and intersects
//! their platform sets.
//!
//! # Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use tablecompat_core::prelude::*;
//!
//! let index = TableCompatibilityIndex::from_json_str(r#"[
//!     { "name": "users", "platforms": ["darwin", "linux", "windows"] },
//!     { "name": "deb_packages", "platforms": ["linux"] }
//! ]"#).expect("Schema dataset should load");
//!
//! let resolver = CompatibilityResolver::new(Arc::new(index), ResolverOptions::default());
//! let result = resolver.resolve("SELECT * FROM users JOIN deb_packages USING (uid);");
//! assert_eq!(result.labels(), vec!["linux"]);
//! ```

pub mod analyzer;
pub mod prelude;
