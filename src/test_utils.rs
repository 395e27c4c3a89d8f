//! Shared test utilities for SkateSpin.
//!
//! This module provides a small content database used across test modules.
//!
//! Fixture layout (14 trick entries):
//! - Flat Ground: Ollie (1), Fakie Ollie (2), Switch Ollie (4), Kickflip (2),
//!   Fakie Kickflip (4), Switch Kickflip (5), Nollie Kickflip (5),
//!   Heelflip (3), Switch Heelflip (6)
//! - Mini Ramp: Ollie (1), Fakie Ollie (2), Switch Ollie (4)
//! - Ledge: 50-50 Grind (2), Boardslide (3)
//! - Challenges: "Flip Line" defended by Alice and Bob, "Ledge Basics" by Carol

#![cfg(test)]

use crate::catalog::TrickCatalog;
use crate::db::Database;
use tempfile::{tempdir, TempDir};

pub const FIXTURE_SQL: &str = r#"
INSERT INTO Categories VALUES ('Flat Ground'), ('Ledge'), ('Mini Ramp');

INSERT INTO DifficultyNames VALUES
    (1, 'Beginner'), (2, 'Easy'), (3, 'Novice'), (4, 'Intermediate'), (5, 'Skilled'),
    (6, 'Advanced'), (7, 'Expert'), (8, 'Pro'), (9, 'Elite'), (10, 'Legendary');

INSERT INTO Tricks VALUES
    ('Ollie', NULL, 'Flat Ground, Mini Ramp', 1, 2, 4, NULL, 0),
    ('Kickflip', 'Flip', 'Flat Ground', 2, 4, 5, 5, 0),
    ('Heelflip', NULL, 'Flat Ground', 3, NULL, 6, NULL, 0),
    ('50-50 Grind', NULL, 'Ledge', 2, NULL, NULL, NULL, 1),
    ('Boardslide', NULL, 'Ledge, Skatepark', 3, NULL, NULL, NULL, 1);

INSERT INTO ShortTrickNames VALUES ('Kickflip', 'Kf'), ('Switch', 'Sw');

INSERT INTO Challenges VALUES
    ('Flip Line', 2, 'Ollie, Kickflip, Fakie Kickflip', 'Alice', 'Flat Ground'),
    ('Flip Line', 3, 'Kickflip, Heelflip, Impossible', 'Bob', 'Flat Ground'),
    ('Ledge Basics', 1, '50-50 Grind, Boardslide', 'Carol', 'Ledge');
"#;

/// Create a temporary content database filled with the fixture rows.
///
/// Returns a tuple of (Database, TempDir). The TempDir must be kept alive
/// for the duration of the test to prevent the database file from being deleted.
pub fn setup_content_db() -> (Database, TempDir) {
    setup_content_db_with(FIXTURE_SQL)
}

/// Create a temporary content database filled by `sql`.
pub fn setup_content_db_with(sql: &str) -> (Database, TempDir) {
    let dir = tempdir().expect("Failed to create temp directory for test DB");
    let db_path = dir.path().join(crate::constants::CONTENT_DB_NAME);
    let db = Database::open(&db_path).expect("Failed to open test database");
    db.create_content_schema().expect("Failed to create content schema");
    db.connection().execute_batch(sql).expect("Failed to insert fixture rows");
    (db, dir)
}

/// Load the fixture catalog.
pub fn setup_catalog() -> (TrickCatalog, TempDir) {
    setup_catalog_with(FIXTURE_SQL)
}

/// Load a catalog from a content database filled by `sql`.
pub fn setup_catalog_with(sql: &str) -> (TrickCatalog, TempDir) {
    let (db, dir) = setup_content_db_with(sql);
    let catalog = TrickCatalog::load(db.connection()).expect("Failed to load fixture catalog");
    (catalog, dir)
}
