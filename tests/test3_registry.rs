#![cfg(feature = "sqlite")]
use db_facade::prelude::*;

#[test]
fn one_connection_per_key() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("registry.db");
    let config = DbConfig::new().with_connection(
        DEFAULT_KEY,
        ConnectionOptions::sqlite(path.to_string_lossy().into_owned()),
    );
    let mut registry = ConnectionRegistry::new(config);
    assert!(!registry.is_connected(DEFAULT_KEY));

    registry
        .master()?
        .execute("CREATE TABLE notes (body TEXT)", &[])?;
    registry
        .get(DEFAULT_KEY)?
        .execute("INSERT INTO notes VALUES (?)", &["hello".into()])?;
    assert!(registry.is_connected(DEFAULT_KEY));

    // Same executor: the state from the previous call is still there.
    assert_eq!(
        registry.master()?.last_sql(),
        Some("INSERT INTO notes VALUES (?)")
    );

    assert!(registry.close(DEFAULT_KEY)?);
    assert!(!registry.close(DEFAULT_KEY)?);
    assert!(!registry.is_connected(DEFAULT_KEY));

    // Reconnects and sees the data written through the first connection.
    let body = registry.master()?.fetch_scalar("SELECT body FROM notes", &[])?;
    assert_eq!(body, Some(RowValues::Text("hello".into())));
    registry.close_all()?;
    Ok(())
}

#[test]
fn executor_closed_directly_is_replaced() -> Result<(), Box<dyn std::error::Error>> {
    let config = DbConfig::new()
        .with_connection(DEFAULT_KEY, ConnectionOptions::sqlite(":memory:".to_string()));
    let mut registry = ConnectionRegistry::new(config);

    registry.master()?.fetch_scalar("SELECT 1", &[])?;
    registry.master()?.close()?;
    assert!(!registry.is_connected(DEFAULT_KEY));
    assert!(!registry.close(DEFAULT_KEY)?);

    let one = registry.master()?.fetch_scalar("SELECT 1", &[])?;
    assert_eq!(one, Some(RowValues::Int(1)));
    assert!(registry.is_connected(DEFAULT_KEY));
    registry.close_all()?;
    Ok(())
}

#[test]
fn unknown_key_is_a_config_error() {
    let mut registry = ConnectionRegistry::new(DbConfig::new());
    let err = registry.master().unwrap_err();
    assert!(matches!(err, DbError::ConfigError(ref m) if m.contains("master")));
}

#[test]
fn failed_connect_is_not_cached() {
    let config = DbConfig::new().with_connection(
        "broken",
        ConnectionOptions::sqlite("/nonexistent-dir/for/sure/db.sqlite".to_string()),
    );
    let mut registry = ConnectionRegistry::new(config);
    let err = registry.get("broken").unwrap_err();
    assert!(matches!(err, DbError::ConnectionError(_)));
    assert!(!registry.is_connected("broken"));
}

#[test]
fn registry_from_json_file() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let db_path = dir.path().join("app.db");
    let config_path = dir.path().join("db.json");
    let document = serde_json::json!({
        "master": { "backend": "sqlite", "database": db_path.to_string_lossy() },
        "reports": { "backend": "sqlite", "name": ":memory:" }
    });
    std::fs::write(&config_path, document.to_string())?;

    let mut registry = ConnectionRegistry::new(DbConfig::from_file(&config_path)?);
    assert_eq!(registry.config().keys().count(), 2);
    assert_eq!(
        registry.get("reports")?.fetch_scalar("SELECT 40 + 2", &[])?,
        Some(RowValues::Int(42))
    );
    assert_eq!(
        registry.master()?.database_type(),
        Some(DatabaseType::Sqlite)
    );
    registry.close_all()?;
    assert!(!registry.is_connected("reports"));
    Ok(())
}
