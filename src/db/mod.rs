pub mod schema;
pub mod rows;
pub mod install;
pub use install::{install_content_db, InstallOutcome};

use rusqlite::{Connection, OpenFlags, Result};
use std::path::Path;

pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        Ok(Self { conn })
    }

    /// Open an installed content database without write access.
    pub fn open_read_only(path: &Path) -> Result<Self> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        Ok(Self { conn })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Create the content tables if they are missing. Used when authoring content.
    pub fn create_content_schema(&self) -> Result<()> {
        self.conn.execute_batch(schema::CONTENT_SCHEMA)
    }
}
