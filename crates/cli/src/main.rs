use clap::{Parser, Subcommand};
use console::style;
use std::env;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tablecompat_checker::{self, CheckError, Checker, Config, QueryReport, CONFIG_FILE};
use tablecompat_core::analyzer::{
    index::TableCompatibilityIndex, Compatibility, CompatibilityResolver, ResolverOptions,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    /// Log debug output to stderr (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new tablecompat.toml config file
    Init,

    /// Resolve every configured query, failing on invalid SQL
    Check,

    /// Resolve every configured query and write the JSON report
    Run,

    /// Write the report and rewrite it whenever queries or schema change
    Watch,

    /// Resolve a single query
    Query {
        /// SQL text; read from stdin when omitted
        sql: Option<String>,

        /// Schema dataset to use instead of the configured one
        #[arg(long)]
        schema: Option<PathBuf>,

        /// Read a JSON-shaped AST from this file instead of SQL
        #[arg(long, conflicts_with = "sql")]
        ast: Option<PathBuf>,

        /// Print the result as a JSON array
        #[arg(long)]
        json: bool,
    },

    /// List known tables
    Tables {
        /// Schema dataset to use instead of the configured one
        #[arg(long)]
        schema: Option<PathBuf>,

        /// Only list tables available on this platform
        #[arg(long)]
        platform: Option<String>,
    },
}

const EXAMPLE_CONFIG: &str = r#"version = "1.0"

[schema]
path = "schema/osquery_schema.json"

[queries]
path = "queries/"

[resolver]
dialect = "sqlite"
unknown_tables = "no-platforms"

[output]
path = "compat.json"
pretty = true
"#;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Init => {
            let config_path = env::current_dir()?.join(CONFIG_FILE);
            if config_path.exists() {
                println!("Config file already exists at {}", config_path.display());
                return Ok(());
            }

            fs::write(&config_path, EXAMPLE_CONFIG)?;
            println!("Created {}", CONFIG_FILE);
            Ok(())
        }
        Commands::Query { sql, schema, ast, json } => {
            let (index, options) = load_index(schema)?;
            let resolver = CompatibilityResolver::new(Arc::new(index), options);

            let result = match ast {
                Some(path) => {
                    let ast: serde_json::Value = serde_json::from_str(&fs::read_to_string(path)?)?;
                    resolver.resolve_ast(&ast)
                }
                None => {
                    let sql = match sql {
                        Some(sql) => sql,
                        None => std::io::read_to_string(std::io::stdin())?,
                    };
                    resolver.analyze(&sql).unwrap_or_else(|err| {
                        eprintln!("{}", style(err.report()).dim());
                        Compatibility::InvalidQuery
                    })
                }
            };

            if json {
                println!("{}", serde_json::to_string(&result)?);
            } else {
                println!("{}", styled(&result));
            }
            Ok(())
        }
        Commands::Tables { schema, platform } => {
            let (index, _) = load_index(schema)?;
            let tables = match &platform {
                Some(platform) => index.tables_for_platform(platform),
                None => index.table_names(),
            };
            for table in tables {
                let platforms = index.lookup(table).unwrap_or_default().join(", ");
                println!("{} {}", style(table).bold(), style(platforms).dim());
            }
            Ok(())
        }
        cmd => {
            let (config, config_dir) = match Config::find_and_load(&env::current_dir()?) {
                Ok(found) => found,
                Err(CheckError::ConfigNotFound(_)) => {
                    eprintln!("Error: No {} found in current directory or parent directories", CONFIG_FILE);
                    eprintln!("Run 'tablecompat init' to create a new config file");
                    std::process::exit(1);
                }
                Err(e) => return Err(e.into()),
            };
            env::set_current_dir(&config_dir)?;
            println!("Using configuration from: {}", config_dir.display());

            match cmd {
                Commands::Check => {
                    println!("Checking queries...");
                    match tablecompat_checker::check(&config) {
                        Ok(reports) => {
                            print_reports(&reports);
                            println!("All checks passed!");
                        }
                        Err(CheckError::InvalidQueries(invalid)) => {
                            for name in &invalid {
                                eprintln!("  {} {}", style(name).cyan(), style(Compatibility::InvalidQuery).red());
                            }
                            eprintln!("{} {} invalid queries", style("✖").red(), invalid.len());
                            std::process::exit(1);
                        }
                        Err(e) => return Err(e.into()),
                    }
                }
                Commands::Run => {
                    println!("Writing report...");
                    let reports = tablecompat_checker::run(&config)?;
                    println!("Done! {} queries checked.", reports.len());
                }
                Commands::Watch => {
                    println!("Starting watch mode...");
                    tablecompat_checker::watch(&config)?;
                }
                Commands::Init | Commands::Query { .. } | Commands::Tables { .. } => unreachable!(),
            }
            Ok(())
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Uses `--schema` when given, otherwise the schema of the discovered config
/// file. Resolver options come from the config either way.
fn load_index(
    schema: Option<PathBuf>,
) -> Result<(TableCompatibilityIndex, ResolverOptions), Box<dyn std::error::Error>> {
    match schema {
        Some(path) => {
            let options = Config::find_resolver_options(&env::current_dir()?)?;
            Ok((TableCompatibilityIndex::from_path(path)?, options))
        }
        None => {
            let (config, _) = Config::find_and_load(&env::current_dir()?)?;
            let index = Checker::load_schema(&config.schema.path)?;
            Ok((index, config.resolver))
        }
    }
}

fn print_reports(reports: &[QueryReport]) {
    for report in reports {
        println!("  {} {}", style(&report.name).cyan(), styled(&report.platforms));
    }
}

fn styled(result: &Compatibility) -> String {
    match result {
        Compatibility::Platforms(_) => style(result).green().to_string(),
        Compatibility::InvalidQuery => style(result).red().to_string(),
        _ => style(result).yellow().to_string(),
    }
}
