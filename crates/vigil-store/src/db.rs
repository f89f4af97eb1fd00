use rusqlite::Connection;

use crate::error::Result;

/// Initialise the vigil schema in `conn`. Safe to call on every startup
/// (idempotent).
pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS scheduled_jobs (
            job_id      TEXT    NOT NULL PRIMARY KEY,
            asset       TEXT    NOT NULL,
            hour        INTEGER NOT NULL,
            minute      INTEGER NOT NULL,
            timezone    TEXT    NOT NULL DEFAULT 'Asia/Baghdad',
            created_at  TEXT    NOT NULL
        ) STRICT;

        CREATE TABLE IF NOT EXISTS price_alerts (
            id           INTEGER PRIMARY KEY AUTOINCREMENT,
            owner_id     INTEGER NOT NULL,
            asset        TEXT    NOT NULL,
            target_price REAL    NOT NULL,
            direction    TEXT    NOT NULL,       -- 'above' | 'below'
            is_active    INTEGER NOT NULL DEFAULT 1,
            is_one_time  INTEGER NOT NULL DEFAULT 1,
            created_at   TEXT    NOT NULL,
            triggered_at TEXT
        ) STRICT;

        -- The evaluator reads by (is_active, asset) every tick.
        CREATE INDEX IF NOT EXISTS idx_alerts_active
            ON price_alerts (is_active, asset);
        CREATE INDEX IF NOT EXISTS idx_alerts_owner
            ON price_alerts (owner_id);

        CREATE TABLE IF NOT EXISTS recipients (
            id         INTEGER NOT NULL PRIMARY KEY,  -- chat id
            is_vip     INTEGER NOT NULL DEFAULT 0,
            joined_at  TEXT    NOT NULL
        ) STRICT;
        ",
    )?;
    Ok(())
}
