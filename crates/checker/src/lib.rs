mod config;
mod error;
mod report;

pub use config::{Config, OutputConfig, CONFIG_FILE};
pub use error::{CheckError, Result};
pub use report::{Checker, QueryReport};

/// Resolves every configured query, failing if any of them is invalid SQL.
pub fn check(config: &Config) -> Result<Vec<QueryReport>> {
    let mut checker = Checker::from_config(config)?;
    checker.process_queries(&config.queries.path)?;

    let invalid = checker.invalid_queries();
    if invalid.is_empty() {
        Ok(checker.into_reports())
    } else {
        Err(CheckError::InvalidQueries(invalid))
    }
}

/// Resolves every configured query and writes the JSON report.
///
/// Invalid queries are recorded in the report rather than failing the run.
pub fn run(config: &Config) -> Result<Vec<QueryReport>> {
    let output = config.output.as_ref().ok_or(CheckError::MissingOutput)?;

    let mut checker = Checker::from_config(config)?;
    checker.process_queries(&config.queries.path)?;
    checker.write_report(&output.path, output.pretty)?;
    Ok(checker.into_reports())
}

pub fn watch(config: &Config) -> Result<()> {
    use notify::{RecommendedWatcher, RecursiveMode, Watcher, Config as NotifyConfig, event::EventKind};
    use console::style;

    println!("{}", style("tablecompat").green().bold());
    println!("  {} Initial run...", style("➜").green());
    run(config)?;

    println!("  {} Watching for changes...", style("➜").cyan());
    let (tx, rx) = std::sync::mpsc::channel();

    let mut watcher = RecommendedWatcher::new(tx, NotifyConfig::default())?;
    watcher.watch(&config.schema.path, RecursiveMode::Recursive)?;
    watcher.watch(&config.queries.path, RecursiveMode::Recursive)?;

    let output_path = config
        .output
        .as_ref()
        .map(|output| output.path.canonicalize().unwrap_or_else(|_| output.path.clone()));
    let cwd = std::env::current_dir()?;

    for res in rx {
        match res {
            Ok(event) => {
                if output_path.as_ref().map_or(false, |out| event.paths.contains(out)) {
                    continue;
                }

                if !matches!(event.kind, EventKind::Modify(notify::event::ModifyKind::Data(_))) {
                    continue;
                }

                if let Some(changed_path) = event.paths.first() {
                    let relative_path = changed_path
                        .strip_prefix(&cwd)
                        .unwrap_or(changed_path)
                        .display();

                    println!("\n{} Changed: {}",
                        style("[CHECK]").yellow().bold(),
                        style(relative_path).cyan()
                    );
                }

                match run(config) {
                    Ok(reports) => println!("  {} {} queries re-checked",
                        style("➜").green(),
                        reports.len()
                    ),
                    Err(e) => println!("  {} Check failed: {}",
                        style("✖").red(),
                        style(e).red()
                    ),
                }
            }
            Err(e) => println!("  {} Watch error: {}",
                style("✖").red(),
                style(e).red()
            ),
        }
    }

    Ok(())
}
