use crate::error::{Error, Result};
use crate::host::{render_ial, Attrs, Block, Host, Query, TIMESTAMP_FORMAT};
use async_trait::async_trait;
use rand::distributions::Alphanumeric;
use rand::Rng;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS blocks (
    id TEXT PRIMARY KEY,
    type TEXT NOT NULL DEFAULT 'd',
    hpath TEXT NOT NULL,
    content TEXT NOT NULL,
    markdown TEXT NOT NULL,
    ial TEXT NOT NULL,
    created TEXT NOT NULL,
    updated TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS attributes (
    block_id TEXT NOT NULL,
    name TEXT NOT NULL,
    value TEXT NOT NULL,
    PRIMARY KEY (block_id, name),
    FOREIGN KEY (block_id) REFERENCES blocks(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_blocks_hpath ON blocks(hpath);
CREATE INDEX IF NOT EXISTS idx_attributes_name_value ON attributes(name, value);
"#;

/// Host backed by a SQLite file laid out like SiYuan's block tables
pub struct LocalHost {
    conn: Mutex<Connection>,
}

impl LocalHost {
    /// Open or create the local database
    pub fn open(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(db_path)?;
        conn.execute_batch(SCHEMA)?;
        log::debug!("Opened local store at {}", db_path.display());
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    #[cfg(test)]
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Stored markdown of a document
    #[cfg(test)]
    pub fn markdown(&self, block_id: &str) -> Result<Option<String>> {
        let markdown = self
            .conn()
            .query_row(
                "SELECT markdown FROM blocks WHERE id = ?1",
                params![block_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(markdown)
    }

    fn new_block_id() -> String {
        let suffix: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(7)
            .map(|c| (c as char).to_ascii_lowercase())
            .collect();
        format!("{}-{}", now_stamp(), suffix)
    }

    fn base_attrs(block_id: &str, title: &str, updated: &str) -> Attrs {
        let mut attrs = Attrs::new();
        attrs.insert("id".to_string(), block_id.to_string());
        attrs.insert("title".to_string(), title.to_string());
        attrs.insert("type".to_string(), "doc".to_string());
        attrs.insert("updated".to_string(), updated.to_string());
        attrs
    }
}

fn now_stamp() -> String {
    chrono::Local::now().format(TIMESTAMP_FORMAT).to_string()
}

#[async_trait]
impl Host for LocalHost {
    async fn create_document(&self, hpath: &str, markdown: &str) -> Result<String> {
        let block_id = Self::new_block_id();
        let title = hpath.trim_end_matches('/').rsplit('/').next().unwrap_or(hpath);
        let now = now_stamp();
        let ial = render_ial(&Self::base_attrs(&block_id, title, &now));

        self.conn().execute(
            "INSERT INTO blocks (id, type, hpath, content, markdown, ial, created, updated)
             VALUES (?1, 'd', ?2, ?3, ?4, ?5, ?6, ?6)",
            params![block_id, hpath, title, markdown, ial, now],
        )?;

        log::debug!("Created local document {} at {}", block_id, hpath);
        Ok(block_id)
    }

    async fn set_block_attrs(&self, block_id: &str, attrs: &Attrs) -> Result<()> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;

        let title: Option<String> = tx
            .query_row(
                "SELECT content FROM blocks WHERE id = ?1",
                params![block_id],
                |row| row.get(0),
            )
            .optional()?;
        let title = title.ok_or_else(|| Error::not_found("block", block_id))?;

        // An empty value removes the attribute, as SiYuan does
        for (name, value) in attrs {
            if value.is_empty() {
                tx.execute(
                    "DELETE FROM attributes WHERE block_id = ?1 AND name = ?2",
                    params![block_id, name],
                )?;
            } else {
                tx.execute(
                    "INSERT INTO attributes (block_id, name, value) VALUES (?1, ?2, ?3)
                     ON CONFLICT(block_id, name) DO UPDATE SET value = excluded.value",
                    params![block_id, name, value],
                )?;
            }
        }

        let now = now_stamp();
        let mut merged = Self::base_attrs(block_id, &title, &now);
        {
            let mut stmt =
                tx.prepare("SELECT name, value FROM attributes WHERE block_id = ?1")?;
            let mut rows = stmt.query(params![block_id])?;
            while let Some(row) = rows.next()? {
                merged.insert(row.get(0)?, row.get(1)?);
            }
        }

        tx.execute(
            "UPDATE blocks SET ial = ?1, updated = ?2 WHERE id = ?3",
            params![render_ial(&merged), now, block_id],
        )?;
        tx.commit()?;

        Ok(())
    }

    async fn query(&self, query: &Query) -> Result<Vec<Block>> {
        let (sql, values) = query.to_bound_sql();
        let conn = self.conn();
        let mut stmt = conn.prepare(&sql)?;

        let mut results = Vec::new();
        let mut rows = stmt.query(params_from_iter(values.iter()))?;

        while let Some(row) = rows.next()? {
            results.push(Block {
                id: row.get(0)?,
                kind: row.get(1)?,
                hpath: row.get(2)?,
                content: row.get(3)?,
                ial: row.get(4)?,
                created: row.get(5)?,
                updated: row.get(6)?,
            });
        }

        Ok(results)
    }
}
