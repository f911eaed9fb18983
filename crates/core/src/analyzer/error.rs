use sqlparser::parser::ParserError;
use thiserror::Error;

/// Result type for analyzer operations
pub type AnalyzerResult<T> = Result<T, AnalyzerError>;

/// Errors that can occur while loading a schema dataset or analyzing a query
#[derive(Debug, Error)]
pub enum AnalyzerError {
    /// The SQL text was rejected by the parser
    #[error("SQL parse error: {0}")]
    Parse(#[from] ParserError),

    /// The schema dataset is not a valid list of table definitions
    #[error("Schema dataset error: {0}")]
    Schema(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A JSON-shaped AST nests deeper than the walker allows
    #[error("AST exceeds maximum depth of {limit}")]
    AstTooDeep { limit: usize },

    /// A JSON-shaped AST does not follow the node shape contract
    #[error("Invalid AST: {0}")]
    InvalidAst(String),
}

impl AnalyzerError {
    pub fn report(&self) -> String {
        match self {
            Self::Parse(err) => {
                format!(
                    "SQL parse error: {}\n\
                         Suggestion: Check the query syntax against the SQLite grammar.",
                    err
                )
            }
            Self::Schema(err) => {
                format!(
                    "Schema dataset error: {}\n\
                         Suggestion: The dataset must be a JSON array of {{ \"name\", \"platforms\" }} objects.",
                    err
                )
            }
            Self::Io(err) => format!("IO error: {}", err),
            Self::AstTooDeep { limit } => {
                format!(
                    "AST exceeds maximum depth of {}\n\
                         Suggestion: The parser output is likely malformed or self-referential.",
                    limit
                )
            }
            Self::InvalidAst(message) => {
                format!(
                    "Invalid AST: {}\n\
                         Suggestion: Nodes need `variant`, `name` and `target` fields as produced by the SQL parser.",
                    message
                )
            }
        }
    }

    /// Returns true if the query itself could not be turned into a table list
    pub fn is_parse_error(&self) -> bool {
        matches!(
            self,
            Self::Parse(_) | Self::AstTooDeep { .. } | Self::InvalidAst(_)
        )
    }
}
