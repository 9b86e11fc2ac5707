use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};

/// Durable best-score store: a single-row SQLite database, consulted only
/// when a game ends.
///
/// Schema: best_score(id INTEGER PRIMARY KEY CHECK (id = 0), score INTEGER)
pub struct Leaderboard {
    conn: Connection,
}

impl Leaderboard {
    /// Open or create the store at `path`, ensuring the schema exists.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
        }
        let conn = Connection::open(path)
            .with_context(|| format!("failed to open {}", path.display()))?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS best_score (
                id INTEGER PRIMARY KEY CHECK (id = 0),
                score INTEGER NOT NULL
            );",
        )?;
        Ok(Self { conn })
    }

    /// The stored maximum. A missing or corrupt record reads as zero; this
    /// never propagates an error.
    pub fn best(&self) -> u64 {
        let stored: Option<i64> = self
            .conn
            .query_row("SELECT score FROM best_score WHERE id = 0", [], |row| {
                row.get(0)
            })
            .optional()
            .unwrap_or(None);
        stored.map_or(0, |score| score.max(0) as u64)
    }

    /// Record `score` iff it exceeds the stored maximum. Returns whether a
    /// new best was written.
    pub fn record(&mut self, score: u64) -> Result<bool, rusqlite::Error> {
        if score <= self.best() {
            return Ok(false);
        }
        self.conn.execute(
            "INSERT INTO best_score (id, score) VALUES (0, ?1)
             ON CONFLICT(id) DO UPDATE SET score = excluded.score",
            params![score as i64],
        )?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn fresh_store_reports_zero() {
        let td = tempdir().unwrap();
        let lb = Leaderboard::open(td.path().join("leaderboard.db")).unwrap();
        assert_eq!(lb.best(), 0);
    }

    #[test]
    fn record_keeps_the_maximum() {
        let td = tempdir().unwrap();
        // Parent directories are created on demand.
        let mut lb = Leaderboard::open(td.path().join("scores/leaderboard.db")).unwrap();
        assert!(lb.record(128).unwrap());
        assert_eq!(lb.best(), 128);
        assert!(!lb.record(64).unwrap());
        assert_eq!(lb.best(), 128);
        assert!(lb.record(256).unwrap());
        assert_eq!(lb.best(), 256);
    }

    #[test]
    fn zero_scores_are_never_a_new_best() {
        let td = tempdir().unwrap();
        let mut lb = Leaderboard::open(td.path().join("leaderboard.db")).unwrap();
        assert!(!lb.record(0).unwrap());
        assert_eq!(lb.best(), 0);
    }

    #[test]
    fn best_survives_reopen() {
        let td = tempdir().unwrap();
        let path = td.path().join("leaderboard.db");
        {
            let mut lb = Leaderboard::open(&path).unwrap();
            lb.record(512).unwrap();
        }
        let lb = Leaderboard::open(&path).unwrap();
        assert_eq!(lb.best(), 512);
    }

    #[test]
    fn corrupt_record_reads_as_zero() {
        let td = tempdir().unwrap();
        let path = td.path().join("leaderboard.db");
        let lb = Leaderboard::open(&path).unwrap();
        lb.conn
            .execute("INSERT INTO best_score (id, score) VALUES (0, -5)", [])
            .unwrap();
        assert_eq!(lb.best(), 0);
    }
}
