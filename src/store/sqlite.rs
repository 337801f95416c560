use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use rusqlite_migration::{Migrations, M};

use crate::app::{Result, StorylineError};
use crate::domain::{Story, StoryRecord};
use crate::store::{RecordUpdate, Store};

const SELECT_COLUMNS: &str =
    "SELECT id, name, description, photo_url, lat, lon, created_at, is_bookmarked FROM stories";

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.run_migrations()?;
        Ok(store)
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.run_migrations()?;
        Ok(store)
    }

    fn run_migrations(&self) -> Result<()> {
        let migrations = Migrations::new(vec![M::up(include_str!(
            "../../migrations/001-initial/up.sql"
        ))]);

        let mut conn = self.conn()?;
        migrations.to_latest(&mut conn).map_err(|e| {
            tracing::error!("Failed to migrate story database: {}", e);
            StorylineError::Migration(e)
        })?;

        Ok(())
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|e| {
            StorylineError::Database(rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error::new(1),
                Some(e.to_string()),
            ))
        })
    }

    fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
            .or_else(|| s.parse::<DateTime<Utc>>().ok())
    }

    fn row_to_record(row: &Row<'_>) -> rusqlite::Result<StoryRecord> {
        Ok(StoryRecord {
            story: Story {
                id: row.get(0)?,
                name: row.get(1)?,
                description: row.get(2)?,
                photo_url: row.get(3)?,
                lat: row.get(4)?,
                lon: row.get(5)?,
                created_at: row
                    .get::<_, Option<String>>(6)?
                    .and_then(|s| Self::parse_datetime(&s)),
            },
            is_bookmarked: row.get::<_, i32>(7)? != 0,
        })
    }

    fn select_one(conn: &Connection, id: &str) -> Result<Option<StoryRecord>> {
        let record = conn
            .query_row(
                &format!("{} WHERE id = ?1", SELECT_COLUMNS),
                params![id],
                Self::row_to_record,
            )
            .optional()?;
        Ok(record)
    }

    // ON CONFLICT keeps the rowid, so enumeration order stays stable
    // across refreshes.
    fn upsert(conn: &Connection, record: &StoryRecord) -> Result<()> {
        let story = &record.story;
        conn.execute(
            "INSERT INTO stories (id, name, description, photo_url, lat, lon, created_at, is_bookmarked)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             ON CONFLICT(id) DO UPDATE SET
                name = ?2, description = ?3, photo_url = ?4, lat = ?5, lon = ?6,
                created_at = ?7, is_bookmarked = ?8",
            params![
                story.id,
                story.name,
                story.description,
                story.photo_url,
                story.lat.filter(|v| v.is_finite()),
                story.lon.filter(|v| v.is_finite()),
                story.created_at.map(|dt| dt.to_rfc3339()),
                record.is_bookmarked as i32
            ],
        )?;
        Ok(())
    }

    fn select_many(&self, filter: &str) -> Result<Vec<StoryRecord>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!("{} {} ORDER BY rowid", SELECT_COLUMNS, filter))?;
        let records = stmt
            .query_map([], Self::row_to_record)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(records)
    }
}

impl Store for SqliteStore {
    fn get(&self, id: &str) -> Result<Option<StoryRecord>> {
        let conn = self.conn()?;
        Self::select_one(&conn, id)
    }

    fn put(&self, record: &StoryRecord) -> Result<()> {
        let conn = self.conn()?;
        Self::upsert(&conn, record)
    }

    fn get_all(&self) -> Result<Vec<StoryRecord>> {
        self.select_many("")
    }

    fn get_all_bookmarked(&self) -> Result<Vec<StoryRecord>> {
        self.select_many("WHERE is_bookmarked = 1")
    }

    fn count(&self) -> Result<usize> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM stories", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn clear(&self) -> Result<()> {
        let conn = self.conn()?;
        conn.execute("DELETE FROM stories", [])?;
        Ok(())
    }

    fn clear_non_bookmarked(&self) -> Result<usize> {
        let conn = self.conn()?;
        let deleted = conn.execute("DELETE FROM stories WHERE is_bookmarked = 0", [])?;
        Ok(deleted)
    }

    fn update_with(&self, id: &str, update: &mut RecordUpdate<'_>) -> Result<Option<StoryRecord>> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        let current = Self::select_one(&tx, id)?;
        let next = update(current);
        if let Some(ref record) = next {
            Self::upsert(&tx, record)?;
        }

        tx.commit()?;
        Ok(next)
    }
}
