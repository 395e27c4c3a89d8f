// src/db/rows.rs
//
// Raw rows of the content tables. NULL integers read as 0 and NULL text as
// an empty string, matching how the content was authored.

use rusqlite::{Connection, Result, Row};

fn text(row: &Row<'_>, idx: usize) -> Result<String> {
    Ok(row.get::<_, Option<String>>(idx)?.unwrap_or_default())
}

fn int(row: &Row<'_>, idx: usize) -> Result<i64> {
    Ok(row.get::<_, Option<i64>>(idx)?.unwrap_or(0))
}

pub fn find_categories(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt = conn.prepare("SELECT * FROM Categories")?;
    let rows = stmt.query_map([], |row| text(row, 0))?;
    rows.collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct DifficultyNameRow {
    pub difficulty: i64,
    pub name: String,
}

impl DifficultyNameRow {
    pub fn find_all(conn: &Connection) -> Result<Vec<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM DifficultyNames")?;
        let rows = stmt.query_map([], |row| {
            Ok(Self {
                difficulty: int(row, 0)?,
                name: text(row, 1)?,
            })
        })?;

        rows.collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrickRow {
    pub name: String,
    pub secondary_name: String,
    /// Comma-separated category list.
    pub categories: String,
    /// Difficulties for regular, fakie, switch and nollie; 0 means the stance is absent.
    pub difficulties: [i64; 4],
    pub cannot_be_rolled: bool,
}

impl TrickRow {
    pub fn find_all(conn: &Connection) -> Result<Vec<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM Tricks")?;
        let rows = stmt.query_map([], |row| {
            Ok(Self {
                name: text(row, 0)?,
                secondary_name: text(row, 1)?,
                categories: text(row, 2)?,
                difficulties: [int(row, 3)?, int(row, 4)?, int(row, 5)?, int(row, 6)?],
                cannot_be_rolled: int(row, 7)? != 0,
            })
        })?;

        rows.collect()
    }

    pub fn category_list(&self) -> impl Iterator<Item = &str> {
        self.categories.split(',').map(str::trim).filter(|c| !c.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShortNameRow {
    pub name: String,
    pub short_name: String,
}

impl ShortNameRow {
    pub fn find_all(conn: &Connection) -> Result<Vec<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM ShortTrickNames")?;
        let rows = stmt.query_map([], |row| {
            Ok(Self {
                name: text(row, 0)?,
                short_name: text(row, 1)?,
            })
        })?;

        rows.collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChallengeRow {
    pub name: String,
    pub difficulty: i64,
    /// Trick names separated by `", "`.
    pub tricks: String,
    pub person: String,
    pub category: String,
}

impl ChallengeRow {
    pub fn find_all(conn: &Connection) -> Result<Vec<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM Challenges")?;
        let rows = stmt.query_map([], |row| {
            Ok(Self {
                name: text(row, 0)?,
                difficulty: int(row, 1)?,
                tricks: text(row, 2)?,
                person: text(row, 3)?,
                category: text(row, 4)?,
            })
        })?;

        rows.collect()
    }

    pub fn trick_list(&self) -> impl Iterator<Item = &str> {
        self.tricks.split(", ").filter(|t| !t.is_empty())
    }
}
