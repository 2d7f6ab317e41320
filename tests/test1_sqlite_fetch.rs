#![cfg(feature = "sqlite")]
use db_facade::prelude::*;

fn memory_db() -> Result<QueryExecutor, DbError> {
    let mut db = QueryExecutor::connect(&ConnectionOptions::sqlite(":memory:".to_string()))?;
    db.execute(
        "CREATE TABLE people (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            team TEXT,
            score REAL,
            avatar BLOB
        )",
        &[],
    )?;
    let seed: [(&str, Option<&str>, f64); 4] = [
        ("alice", Some("red"), 9.5),
        ("bob", Some("blue"), 7.0),
        ("carol", Some("red"), 8.25),
        ("dave", None, 6.0),
    ];
    for (name, team, score) in seed {
        db.execute(
            "INSERT INTO people (name, team, score) VALUES (?, ?, ?)",
            &[name.into(), team.into(), score.into()],
        )?;
    }
    Ok(db)
}

#[test]
fn scalar_and_empty_row() -> Result<(), Box<dyn std::error::Error>> {
    let mut db = memory_db()?;
    assert_eq!(db.fetch_scalar("SELECT 1", &[])?, Some(RowValues::Int(1)));
    assert_eq!(db.fetch_row("SELECT 1 WHERE 1=0", &[])?, None);
    assert_eq!(db.fetch_scalar("SELECT 1 WHERE 1=0", &[])?, None);
    Ok(())
}

#[test]
fn rows_keep_driver_order_and_columns() -> Result<(), Box<dyn std::error::Error>> {
    let mut db = memory_db()?;
    let rows = db.fetch_rows("SELECT id, name, team FROM people ORDER BY id", &[])?;
    assert_eq!(rows.len(), 4);

    let names: Vec<&str> = rows
        .iter()
        .filter_map(|r| r.get("name").and_then(RowValues::as_text))
        .collect();
    assert_eq!(names, ["alice", "bob", "carol", "dave"]);

    let columns: Vec<&str> = rows[0].iter().map(|(c, _)| c).collect();
    assert_eq!(columns, ["id", "name", "team"]);
    assert_eq!(rows[3].get("team"), Some(&RowValues::Null));

    let none = db.fetch_rows("SELECT * FROM people WHERE name = ?", &["zed".into()])?;
    assert!(none.is_empty());
    Ok(())
}

#[test]
fn prepared_and_direct_paths_agree() -> Result<(), Box<dyn std::error::Error>> {
    let mut db = memory_db()?;
    let direct = db.fetch_rows("SELECT id, score FROM people WHERE id > 2 ORDER BY id", &[])?;
    assert!(!db.state().is_statement);
    let bound = db.fetch_rows(
        "SELECT id, score FROM people WHERE id > ? ORDER BY id",
        &[2.into()],
    )?;
    assert!(db.state().is_statement);
    assert_eq!(direct, bound);
    assert_eq!(bound[0].get("score"), Some(&RowValues::Float(8.25)));
    Ok(())
}

#[test]
fn map_is_last_write_wins() -> Result<(), Box<dyn std::error::Error>> {
    let mut db = memory_db()?;
    let map = db.fetch_map(
        "SELECT id, name, team FROM people WHERE team IS NOT NULL ORDER BY id",
        "team",
        &[],
    )?;
    assert_eq!(map.len(), 2);
    assert_eq!(map.keys().collect::<Vec<_>>(), ["red", "blue"]);
    assert_eq!(map["red"].get("name"), Some(&RowValues::Text("carol".into())));

    let by_id = db.fetch_map("SELECT id, name FROM people", "id", &[])?;
    assert_eq!(by_id["2"].get("name"), Some(&RowValues::Text("bob".into())));

    let err = db
        .fetch_map("SELECT id FROM people", "nickname", &[])
        .unwrap_err();
    assert!(matches!(err, DbError::ExecutionError(ref m) if m.contains("nickname")));
    Ok(())
}

#[test]
fn column_returns_first_field() -> Result<(), Box<dyn std::error::Error>> {
    let mut db = memory_db()?;
    let ids = db.fetch_column("SELECT id, name FROM people WHERE team = ? ORDER BY id", &["red".into()])?;
    assert_eq!(ids, vec![RowValues::Int(1), RowValues::Int(3)]);
    Ok(())
}

#[test]
fn execute_reports_whether_rows_changed() -> Result<(), Box<dyn std::error::Error>> {
    let mut db = memory_db()?;

    assert!(db.execute("UPDATE people SET score = score + 1 WHERE team = 'red'", &[])?);
    assert_eq!(db.affected_rows(), Some(2));

    assert!(!db.execute("UPDATE people SET score = 0 WHERE id = ?", &[999.into()])?);
    assert_eq!(db.affected_rows(), Some(0));
    assert_eq!(db.last_error(), None);

    assert!(db.execute("DELETE FROM people WHERE name = ?", &["dave".into()])?);
    assert_eq!(db.affected_rows(), Some(1));

    assert!(db.execute("INSERT INTO people (name) VALUES (?)", &["erin".into()])?);
    assert_eq!(db.last_insert_id(), Some(5));

    assert!(db.execute("UPDATE people SET score = 7 WHERE name = ?", &["erin".into()])?);
    assert_eq!(db.last_insert_id(), None);
    assert!(db.execute("DELETE FROM people WHERE name = ?", &["erin".into()])?);
    assert_eq!(db.last_insert_id(), None);
    Ok(())
}

#[test]
fn blobs_and_nulls_round_trip() -> Result<(), Box<dyn std::error::Error>> {
    let mut db = memory_db()?;
    let avatar: Vec<u8> = vec![0, 159, 146, 150];
    db.execute(
        "UPDATE people SET avatar = ? WHERE name = ?",
        &[avatar.clone().into(), "bob".into()],
    )?;
    let stored = db.fetch_scalar("SELECT avatar FROM people WHERE name = 'bob'", &[])?;
    assert_eq!(stored, Some(RowValues::Blob(avatar)));

    db.execute(
        "UPDATE people SET team = ? WHERE name = ?",
        &[QueryParam::Null, "bob".into()],
    )?;
    let team = db.fetch_scalar("SELECT team FROM people WHERE name = ?", &["bob".into()])?;
    assert_eq!(team, Some(RowValues::Null));
    Ok(())
}

#[test]
fn driver_errors_reset_state() -> Result<(), Box<dyn std::error::Error>> {
    let mut db = memory_db()?;
    db.execute("UPDATE people SET score = 1", &[])?;
    assert_eq!(db.affected_rows(), Some(4));

    let err = db.fetch_rows("SELECT * FROM missing_table", &[]).unwrap_err();
    assert!(matches!(err, DbError::ExecutionError(_)));
    assert_eq!(db.affected_rows(), None);
    assert!(db.last_error().is_some_and(|m| m.contains("missing_table")));
    assert_eq!(db.last_sql(), Some("SELECT * FROM missing_table"));

    // The next successful call clears the error.
    db.fetch_scalar("SELECT 1", &[])?;
    assert_eq!(db.last_error(), None);
    Ok(())
}

#[test]
fn time_zone_and_close() -> Result<(), Box<dyn std::error::Error>> {
    let mut db = memory_db()?;
    assert_eq!(db.time_zone(), "+0:00");
    db.set_time_zone_offset(90)?;
    assert_eq!(db.time_zone(), "-1:30");
    db.set_time_zone_offset(-90)?;
    assert_eq!(db.time_zone(), "+1:30");

    assert_eq!(db.database_type(), Some(DatabaseType::Sqlite));
    db.close()?;
    assert!(db.is_closed());
    db.close()?;
    let err = db.fetch_scalar("SELECT 1", &[]).unwrap_err();
    assert!(matches!(err, DbError::ConnectionError(_)));
    Ok(())
}
