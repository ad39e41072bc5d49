use staffbook_core::{
    bootstrap, default_log_level, ConfigError, CoreConfig, Repository,
    SqliteDepartmentRepository,
};
use std::io::Write;

#[test]
fn empty_document_yields_defaults() {
    let config = CoreConfig::from_json_str("{}").unwrap();

    assert_eq!(config, CoreConfig::default());
    assert!(config.database.path.is_none());
    assert_eq!(config.database.busy_timeout_ms, 5_000);
    assert_eq!(config.logging.level, default_log_level());
    assert!(config.logging.dir.is_none());
    assert!(config.seed_departments);
}

#[test]
fn partial_document_overrides_only_named_fields() {
    let config = CoreConfig::from_json_str(
        r#"{ "database": { "busy_timeout_ms": 250 }, "seed_departments": false }"#,
    )
    .unwrap();

    assert_eq!(config.database.busy_timeout_ms, 250);
    assert!(config.database.path.is_none());
    assert!(!config.seed_departments);
}

#[test]
fn unknown_keys_are_rejected() {
    let err = CoreConfig::from_json_str(r#"{ "databse": {} }"#).unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));

    let err = CoreConfig::from_json_str(r#"{ "logging": { "lvl": "info" } }"#).unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
}

#[test]
fn load_reads_file_and_reports_missing_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("staffbook.json");
    let db_path = dir.path().join("staffbook.db");

    let mut file = std::fs::File::create(&path).unwrap();
    write!(
        file,
        r#"{{ "database": {{ "path": {} }} }}"#,
        serde_json::to_string(&db_path).unwrap()
    )
    .unwrap();
    drop(file);

    let config = CoreConfig::load(&path).unwrap();
    assert_eq!(config.database.path.as_deref(), Some(db_path.as_path()));

    let err = CoreConfig::load(dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, ConfigError::Read { .. }));
}

#[test]
fn bootstrap_seeds_in_memory_store_when_enabled() {
    let conn = bootstrap(&CoreConfig::default()).unwrap();
    let repo = SqliteDepartmentRepository::try_new(&conn).unwrap();
    assert_eq!(repo.get_all().count().unwrap(), 3);
}

#[test]
fn bootstrap_skips_seeding_when_disabled() {
    let config = CoreConfig {
        seed_departments: false,
        ..CoreConfig::default()
    };
    let conn = bootstrap(&config).unwrap();
    let repo = SqliteDepartmentRepository::try_new(&conn).unwrap();
    assert_eq!(repo.get_all().count().unwrap(), 0);
}

#[test]
fn bootstrap_on_file_store_seeds_once() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = CoreConfig::default();
    config.database.path = Some(dir.path().join("staffbook.db"));

    drop(bootstrap(&config).unwrap());
    let conn = bootstrap(&config).unwrap();

    let repo = SqliteDepartmentRepository::try_new(&conn).unwrap();
    assert_eq!(repo.get_all().count().unwrap(), 3);
}

#[test]
fn bootstrap_rejects_invalid_log_level() {
    let mut config = CoreConfig::default();
    config.logging.level = "chatty".to_string();

    assert!(bootstrap(&config).is_err());
}
