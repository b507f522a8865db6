//! SQLite storage implementation

use crate::storage::schema::{initialize_schema, schema_version};
use crate::storage::traits::{ListingStore, PageRegistry, RunLog, StorageError, StorageResult};
use crate::storage::{CareerPage, JobListing, RunRecord, RunStatus};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Opens or creates the database at `path`, creating parent directories
    pub fn new(path: &Path) -> StorageResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Schema version stamped on the database
    pub fn schema_version(&self) -> StorageResult<u32> {
        Ok(schema_version(&self.conn)?)
    }
}

/// Timestamps are stored as fixed-width UTC RFC 3339 so text order is time order
fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(index: usize, raw: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|timestamp| timestamp.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(index, Type::Text, Box::new(e)))
}

fn listing_from_row(row: &Row<'_>) -> rusqlite::Result<JobListing> {
    Ok(JobListing {
        id: row.get(0)?,
        title: row.get(1)?,
        company: row.get(2)?,
        location: row.get(3)?,
        url: row.get(4)?,
        source: row.get(5)?,
        scraped_at: parse_timestamp(6, &row.get::<_, String>(6)?)?,
    })
}

fn run_from_row(row: &Row<'_>) -> rusqlite::Result<RunRecord> {
    Ok(RunRecord {
        id: row.get(0)?,
        started_at: row.get(1)?,
        finished_at: row.get(2)?,
        config_hash: row.get(3)?,
        status: RunStatus::from_db_string(&row.get::<_, String>(4)?)
            .unwrap_or(RunStatus::Running),
        pages_visited: row.get(5)?,
        new_listings: row.get(6)?,
    })
}

impl ListingStore for SqliteStorage {
    fn contains_listing(&self, id: &str) -> StorageResult<bool> {
        let found: Option<i64> = self
            .conn
            .query_row(
                "SELECT 1 FROM job_listings WHERE id = ?1",
                params![id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    fn append_listing(&mut self, listing: &JobListing) -> StorageResult<()> {
        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO job_listings (id, title, company, location, url, source, scraped_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                listing.id,
                listing.title,
                listing.company,
                listing.location,
                listing.url,
                listing.source,
                format_timestamp(&listing.scraped_at),
            ],
        )?;

        if inserted == 0 {
            return Err(StorageError::ConstraintViolation(format!(
                "listing '{}' already stored",
                listing.id
            )));
        }

        Ok(())
    }

    fn list_listings(&self) -> StorageResult<Vec<JobListing>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, title, company, location, url, source, scraped_at
             FROM job_listings ORDER BY scraped_at DESC, rowid DESC",
        )?;

        let listings = stmt
            .query_map([], listing_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(listings)
    }
}

impl PageRegistry for SqliteStorage {
    fn list_pages(&self) -> StorageResult<Vec<CareerPage>> {
        let mut stmt = self
            .conn
            .prepare("SELECT url, name FROM career_pages ORDER BY id")?;

        let pages = stmt
            .query_map([], |row| {
                Ok(CareerPage {
                    url: row.get(0)?,
                    name: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(pages)
    }

    fn get_page(&self, url: &str) -> StorageResult<Option<CareerPage>> {
        let page = self
            .conn
            .query_row(
                "SELECT url, name FROM career_pages WHERE url = ?1",
                params![url],
                |row| {
                    Ok(CareerPage {
                        url: row.get(0)?,
                        name: row.get(1)?,
                    })
                },
            )
            .optional()?;
        Ok(page)
    }

    fn add_page(&mut self, page: &CareerPage) -> StorageResult<bool> {
        let now = format_timestamp(&Utc::now());
        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO career_pages (url, name, added_at) VALUES (?1, ?2, ?3)",
            params![page.url, page.name, now],
        )?;
        Ok(inserted > 0)
    }

    fn remove_page(&mut self, url: &str) -> StorageResult<bool> {
        let removed = self
            .conn
            .execute("DELETE FROM career_pages WHERE url = ?1", params![url])?;
        Ok(removed > 0)
    }
}

impl RunLog for SqliteStorage {
    fn start_run(&mut self, config_hash: &str) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO runs (started_at, config_hash, status) VALUES (?1, ?2, ?3)",
            params![now, config_hash, RunStatus::Running.to_db_string()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn finish_run(
        &mut self,
        run_id: i64,
        status: RunStatus,
        pages_visited: u32,
        new_listings: u32,
    ) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "UPDATE runs SET status = ?1, finished_at = ?2, pages_visited = ?3, new_listings = ?4
             WHERE id = ?5",
            params![status.to_db_string(), now, pages_visited, new_listings, run_id],
        )?;
        Ok(())
    }

    fn latest_run(&self) -> StorageResult<Option<RunRecord>> {
        let run = self
            .conn
            .query_row(
                "SELECT id, started_at, finished_at, config_hash, status, pages_visited, new_listings
                 FROM runs ORDER BY id DESC LIMIT 1",
                [],
                run_from_row,
            )
            .optional()?;
        Ok(run)
    }
}
