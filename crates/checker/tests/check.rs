use std::fs;
use std::path::Path;

use tablecompat_checker::{check, run, CheckError, Config, CONFIG_FILE};
use tablecompat_core::analyzer::{ResolverOptions, UnknownTablePolicy};
use tempfile::TempDir;

const SCHEMA: &str = r#"[
    { "name": "users", "platforms": ["darwin", "linux", "windows", "chrome"] },
    { "name": "deb_packages", "platforms": ["linux"] },
    { "name": "windows_crashes", "platforms": ["windows"] }
]"#;

fn project(queries: &[(&str, &str)]) -> TempDir {
    let dir = TempDir::new().expect("temp dir");
    fs::write(dir.path().join("schema.json"), SCHEMA).unwrap();
    fs::create_dir_all(dir.path().join("queries/nested")).unwrap();
    for (name, sql) in queries {
        fs::write(dir.path().join("queries").join(name), sql).unwrap();
    }
    dir
}

fn config(root: &Path, output: bool) -> Config {
    let mut toml = format!(
        r#"
        version = "1.0"

        [schema]
        path = "{}"

        [queries]
        path = "{}"
        "#,
        root.join("schema.json").display(),
        root.join("queries").display(),
    );
    if output {
        toml.push_str(&format!(
            "\n[output]\npath = \"{}\"\npretty = true\n",
            root.join("compat.json").display()
        ));
    }
    let config = Config::from_toml(&toml).expect("config should parse");
    config.validate().expect("config should validate");
    config
}

#[test]
fn check_resolves_every_query_file() {
    let dir = project(&[
        ("packages.sql", "SELECT * FROM deb_packages JOIN users;"),
        ("nested/crashes.sql", "SELECT * FROM windows_crashes;"),
        ("notes.txt", "SELECT * FROM"),
    ]);

    let reports = check(&config(dir.path(), false)).expect("check should pass");

    let summary: Vec<(String, Vec<String>)> = reports
        .iter()
        .map(|report| (report.name.clone(), report.platforms.labels()))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("nested/crashes".to_string(), vec!["windows".to_string()]),
            ("packages".to_string(), vec!["linux".to_string()]),
        ]
    );
}

#[test]
fn check_fails_on_invalid_queries() {
    let dir = project(&[
        ("ok.sql", "SELECT * FROM users;"),
        ("broken.sql", "SELECT * FROM"),
    ]);

    let err = check(&config(dir.path(), false)).unwrap_err();
    match err {
        CheckError::InvalidQueries(names) => assert_eq!(names, vec!["broken"]),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn run_writes_report_including_invalid_queries() {
    let dir = project(&[
        ("ok.sql", "SELECT * FROM users;"),
        ("broken.sql", "SELECT * FROM"),
        ("constant.sql", "SELECT 1;"),
    ]);

    run(&config(dir.path(), true)).expect("run should succeed");

    let written = fs::read_to_string(dir.path().join("compat.json")).unwrap();
    let report: serde_json::Value = serde_json::from_str(&written).unwrap();
    assert_eq!(
        report,
        serde_json::json!({
            "broken": ["Invalid query"],
            "constant": ["No tables in query AST"],
            "ok": ["darwin", "linux", "windows", "chrome"]
        })
    );
}

#[test]
fn run_requires_output_section() {
    let dir = project(&[("ok.sql", "SELECT * FROM users;")]);
    let err = run(&config(dir.path(), false)).unwrap_err();
    assert!(matches!(err, CheckError::MissingOutput));
}

#[test]
fn config_is_found_in_parent_directories() {
    let dir = project(&[]);
    fs::write(
        dir.path().join(CONFIG_FILE),
        "version = \"1.0\"\n[schema]\npath = \"schema.json\"\n[queries]\npath = \"queries\"\n",
    )
    .unwrap();

    let nested = dir.path().join("queries/nested");
    let (config, root) = Config::find_and_load(&nested).expect("config should be found");

    assert_eq!(root, dir.path());
    assert_eq!(config.schema.path, dir.path().join("schema.json"));
    assert_eq!(config.queries.path, dir.path().join("queries"));
}

#[test]
fn missing_config_is_reported() {
    let dir = TempDir::new().unwrap();
    let err = Config::find_and_load(dir.path()).unwrap_err();
    assert!(matches!(err, CheckError::ConfigNotFound(_)));
}

#[test]
fn resolver_options_come_from_nearest_config() {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join("adhoc")).unwrap();
    // Paths are not checked; only `[resolver]` is read.
    fs::write(
        dir.path().join(CONFIG_FILE),
        "version = \"1.0\"\n[schema]\npath = \"missing.json\"\n[queries]\npath = \"queries\"\n\
         [resolver]\nunknown_tables = \"sentinel\"\n",
    )
    .unwrap();

    let options = Config::find_resolver_options(&dir.path().join("adhoc")).expect("options");
    assert_eq!(options.unknown_tables, UnknownTablePolicy::Sentinel);

    let bare = TempDir::new().unwrap();
    let options = Config::find_resolver_options(bare.path()).expect("options");
    assert_eq!(options, ResolverOptions::default());
}
