use crate::session::{DEFAULT_SESSION, PLAYGROUND_SESSION};
use crate::solve::{NewSolve, Penalty, PuzzleType, Session, SessionId, Solve, SolveId};
use chrono::{DateTime, Local};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("failed to prepare database location: {0}")]
    Io(#[from] std::io::Error),
    #[error("session {0} not found")]
    SessionNotFound(SessionId),
    #[error("solve {0} not found")]
    SolveNotFound(SolveId),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence for sessions and solves. The store assigns ids and timestamps.
pub trait SolveStore {
    fn load_sessions(&self) -> StoreResult<Vec<Session>>;
    fn create_session(&mut self, name: &str, puzzle_type: PuzzleType) -> StoreResult<Session>;
    fn rename_session(&mut self, id: SessionId, name: &str) -> StoreResult<()>;
    fn retype_session(&mut self, id: SessionId, puzzle_type: PuzzleType) -> StoreResult<()>;
    /// Removes the session together with all of its solves.
    fn delete_session(&mut self, id: SessionId) -> StoreResult<()>;
    fn append_solve(&mut self, solve: &NewSolve) -> StoreResult<Solve>;
    fn update_penalty(&mut self, id: SolveId, penalty: Option<Penalty>) -> StoreResult<Solve>;
    fn delete_solve(&mut self, id: SolveId) -> StoreResult<()>;
    /// Drops everything and recreates the default sessions.
    fn reset_sessions(&mut self) -> StoreResult<Vec<Session>>;

    /// Creates the default and playground sessions when missing and returns
    /// the full session list.
    fn ensure_default_sessions(&mut self) -> StoreResult<Vec<Session>> {
        let existing = self.load_sessions()?;
        for name in [DEFAULT_SESSION, PLAYGROUND_SESSION] {
            if !existing.iter().any(|s| s.name == name) {
                info!(name, "creating missing session");
                self.create_session(name, PuzzleType::ThreeByThree)?;
            }
        }
        self.load_sessions()
    }
}

const SCHEMA: &str = r#"
    PRAGMA foreign_keys = ON;

    CREATE TABLE IF NOT EXISTS sessions (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        puzzle_type TEXT NOT NULL,
        created_at TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS solves (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        session_id INTEGER NOT NULL REFERENCES sessions(id) ON DELETE CASCADE,
        time_ms INTEGER NOT NULL,
        scramble TEXT NOT NULL,
        puzzle_type TEXT NOT NULL,
        penalty TEXT,
        timestamp TEXT NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_solves_session ON solves(session_id, id);
"#;

const SOLVE_COLUMNS: &str = "id, time_ms, scramble, puzzle_type, session_id, timestamp, penalty";

/// SQLite-backed store
#[derive(Debug)]
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Opens (creating if needed) the database at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        debug!(path = %path.display(), "opening solve database");
        Self::init(Connection::open(path)?)
    }

    pub fn in_memory() -> StoreResult<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> StoreResult<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(SqliteStore { conn })
    }

    /// Solves of a session in append order. Timestamps carry local offsets,
    /// so their text does not sort chronologically across a DST change.
    fn solves_for(&self, session_id: SessionId) -> StoreResult<Vec<Solve>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {SOLVE_COLUMNS} FROM solves WHERE session_id = ?1 ORDER BY id"
        ))?;

        let solves = stmt
            .query_map([session_id], solve_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(solves)
    }

    fn solve(&self, id: SolveId) -> StoreResult<Solve> {
        self.conn
            .query_row(
                &format!("SELECT {SOLVE_COLUMNS} FROM solves WHERE id = ?1"),
                [id],
                solve_from_row,
            )
            .optional()?
            .ok_or(StoreError::SolveNotFound(id))
    }

    fn session_exists(&self, id: SessionId) -> StoreResult<bool> {
        let found: Option<i64> = self
            .conn
            .query_row("SELECT id FROM sessions WHERE id = ?1", [id], |row| row.get(0))
            .optional()?;
        Ok(found.is_some())
    }
}

impl SolveStore for SqliteStore {
    fn load_sessions(&self) -> StoreResult<Vec<Session>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, puzzle_type, created_at FROM sessions ORDER BY id")?;

        let headers = stmt
            .query_map([], |row| {
                Ok(Session {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    puzzle_type: puzzle_from_row(row, 2)?,
                    created_at: timestamp_from_row(row, 3)?,
                    solves: vec![],
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        headers
            .into_iter()
            .map(|mut session| {
                session.solves = self.solves_for(session.id)?;
                Ok(session)
            })
            .collect()
    }

    fn create_session(&mut self, name: &str, puzzle_type: PuzzleType) -> StoreResult<Session> {
        let created_at = Local::now();
        self.conn.execute(
            "INSERT INTO sessions (name, puzzle_type, created_at) VALUES (?1, ?2, ?3)",
            params![name, puzzle_type.to_string(), created_at.to_rfc3339()],
        )?;

        Ok(Session {
            id: self.conn.last_insert_rowid(),
            name: name.to_string(),
            puzzle_type,
            created_at,
            solves: vec![],
        })
    }

    fn rename_session(&mut self, id: SessionId, name: &str) -> StoreResult<()> {
        match self
            .conn
            .execute("UPDATE sessions SET name = ?1 WHERE id = ?2", params![name, id])?
        {
            0 => Err(StoreError::SessionNotFound(id)),
            _ => Ok(()),
        }
    }

    fn retype_session(&mut self, id: SessionId, puzzle_type: PuzzleType) -> StoreResult<()> {
        match self.conn.execute(
            "UPDATE sessions SET puzzle_type = ?1 WHERE id = ?2",
            params![puzzle_type.to_string(), id],
        )? {
            0 => Err(StoreError::SessionNotFound(id)),
            _ => Ok(()),
        }
    }

    fn delete_session(&mut self, id: SessionId) -> StoreResult<()> {
        match self.conn.execute("DELETE FROM sessions WHERE id = ?1", [id])? {
            0 => Err(StoreError::SessionNotFound(id)),
            _ => Ok(()),
        }
    }

    fn append_solve(&mut self, solve: &NewSolve) -> StoreResult<Solve> {
        if !self.session_exists(solve.session_id)? {
            return Err(StoreError::SessionNotFound(solve.session_id));
        }

        let timestamp = Local::now();
        self.conn.execute(
            r#"
            INSERT INTO solves (session_id, time_ms, scramble, puzzle_type, penalty, timestamp)
            VALUES (?1, ?2, ?3, ?4, NULL, ?5)
            "#,
            params![
                solve.session_id,
                solve.time_ms,
                solve.scramble,
                solve.puzzle_type.to_string(),
                timestamp.to_rfc3339(),
            ],
        )?;

        Ok(Solve {
            id: self.conn.last_insert_rowid(),
            time_ms: solve.time_ms,
            scramble: solve.scramble.clone(),
            puzzle_type: solve.puzzle_type,
            session_id: solve.session_id,
            timestamp,
            penalty: None,
        })
    }

    fn update_penalty(&mut self, id: SolveId, penalty: Option<Penalty>) -> StoreResult<Solve> {
        let changed = self.conn.execute(
            "UPDATE solves SET penalty = ?1 WHERE id = ?2",
            params![penalty.map(|p| p.to_string()), id],
        )?;
        if changed == 0 {
            return Err(StoreError::SolveNotFound(id));
        }
        self.solve(id)
    }

    fn delete_solve(&mut self, id: SolveId) -> StoreResult<()> {
        match self.conn.execute("DELETE FROM solves WHERE id = ?1", [id])? {
            0 => Err(StoreError::SolveNotFound(id)),
            _ => Ok(()),
        }
    }

    fn reset_sessions(&mut self) -> StoreResult<Vec<Session>> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM solves", [])?;
        tx.execute("DELETE FROM sessions", [])?;
        tx.commit()?;

        info!("all sessions reset");
        self.ensure_default_sessions()
    }
}

fn solve_from_row(row: &Row<'_>) -> rusqlite::Result<Solve> {
    let penalty: Option<String> = row.get(6)?;
    Ok(Solve {
        id: row.get(0)?,
        time_ms: row.get(1)?,
        scramble: row.get(2)?,
        puzzle_type: puzzle_from_row(row, 3)?,
        session_id: row.get(4)?,
        timestamp: timestamp_from_row(row, 5)?,
        penalty: penalty.as_deref().and_then(Penalty::parse),
    })
}

fn puzzle_from_row(row: &Row<'_>, idx: usize) -> rusqlite::Result<PuzzleType> {
    let label: String = row.get(idx)?;
    label.parse().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

fn timestamp_from_row(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Local>> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|t| t.with_timezone(&Local))
        .map_err(|_| {
            rusqlite::Error::InvalidColumnType(idx, "timestamp".to_string(), rusqlite::types::Type::Text)
        })
}
