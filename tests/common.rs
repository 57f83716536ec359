#![allow(dead_code)]
use assert_cmd::{Command, cargo_bin_cmd};
use std::env;
use std::fs;
use std::path::PathBuf;

/// Command for the binary, isolated from the user's home and position.
pub fn pw(home: &str) -> Command {
    let mut cmd = cargo_bin_cmd!("parkwatch");
    cmd.env("HOME", home)
        .env("APPDATA", home)
        .env_remove("PARKWATCH_POSITION")
        .env_remove("PARKWATCH_LOG");
    cmd
}

/// Fresh scratch directory plus a DB path inside it.
pub fn setup_test_db(name: &str) -> (String, String) {
    let mut dir: PathBuf = env::temp_dir();
    dir.push(format!("parkwatch_test_{}", name));
    fs::remove_dir_all(&dir).ok();
    fs::create_dir_all(&dir).expect("create test dir");

    let db = dir.join("parkwatch.sqlite");
    (
        dir.to_string_lossy().to_string(),
        db.to_string_lossy().to_string(),
    )
}

/// Initialize a DB (schema + seed districts) in test mode.
pub fn init_db(home: &str, db_path: &str) {
    pw(home)
        .args(["--db", db_path, "--test", "init"])
        .assert()
        .success();
}

/// Overwrite a raw kv_store value, bypassing the application.
pub fn write_raw(db_path: &str, key: &str, value: &str) {
    let conn = rusqlite::Connection::open(db_path).expect("open db");
    conn.execute(
        "INSERT INTO kv_store (key, value, updated_at) VALUES (?1, ?2, datetime('now'))
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        [key, value],
    )
    .expect("write raw value");
}
