/// Layout of the bundled content database.
///
/// The loader reads every table with `SELECT *` and addresses columns by
/// position, so column order here is part of the content format.
pub const CONTENT_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS Categories (
    Name TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS DifficultyNames (
    Difficulty INTEGER NOT NULL,
    Name TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS Tricks (
    Name TEXT NOT NULL,
    SecondaryName TEXT,
    Category TEXT NOT NULL,
    Difficulty INTEGER,
    FakieDifficulty INTEGER,
    SwitchDifficulty INTEGER,
    NollieDifficulty INTEGER,
    CannotBeRolled INTEGER DEFAULT 0
);

CREATE TABLE IF NOT EXISTS ShortTrickNames (
    Name TEXT NOT NULL,
    ShortName TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS Challenges (
    Name TEXT NOT NULL,
    Difficulty INTEGER NOT NULL,
    Tricks TEXT NOT NULL,
    Person TEXT NOT NULL,
    Category TEXT NOT NULL
);
"#;

pub const CONTENT_TABLES: &[&str] = &["Categories", "DifficultyNames", "Tricks", "ShortTrickNames", "Challenges"];
