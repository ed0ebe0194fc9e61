// Minimal integration test that drives the compiled binary through a PTY.
// This exercises the real event loop and crossterm input handling across
// the main boundaries without relying on internal modules.
//
// Notes:
// - Requires a TTY; uses expectrl which allocates a pseudo terminal.
// - Marked Unix-only and ignored by default to avoid CI/platform issues.
// - Run manually via: `cargo test --test integration_min_session -- --ignored`.

#![cfg(unix)]

use std::time::Duration;

use expectrl::{spawn, Eof};

#[test]
#[ignore]
fn minimal_session_times_and_exits() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let db = dir.path().join("stats.db");

    let bin = assert_cmd::cargo::cargo_bin("cubit");
    let cmd = format!("{} --db {}", bin.display(), db.display());

    let mut p = spawn(cmd)?;
    std::thread::sleep(Duration::from_millis(300));

    // a PTY reports no key releases: each space is a tap, which arms and starts
    p.send(" ")?;
    std::thread::sleep(Duration::from_millis(400));
    p.send(" ")?;
    std::thread::sleep(Duration::from_millis(300));
    // clear the finished time, then quit
    p.send(" ")?;
    std::thread::sleep(Duration::from_millis(300));
    p.send("q")?;

    p.expect(Eof)?;
    Ok(())
}

#[test]
fn export_writes_csv_without_a_tty() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let db = dir.path().join("stats.db");
    let out = dir.path().join("solves.csv");

    assert_cmd::Command::cargo_bin("cubit")?
        .arg("--db")
        .arg(&db)
        .arg("--export")
        .arg(&out)
        .assert()
        .success();

    // no solves yet: an empty file
    assert_eq!(std::fs::read_to_string(&out)?, "");
    Ok(())
}

#[test]
fn reset_sessions_recreates_defaults() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let db = dir.path().join("stats.db");

    let output = assert_cmd::Command::cargo_bin("cubit")?
        .arg("--db")
        .arg(&db)
        .arg("--reset-sessions")
        .output()?;
    assert!(output.status.success());
    assert!(String::from_utf8(output.stdout)?.contains("2 sessions recreated"));
    Ok(())
}
