// src/constants.rs

use std::time::Duration;

/// Lowest difficulty a trick can be rated.
pub const MIN_DIFFICULTY: u8 = 1;

/// Highest difficulty a trick can be rated.
pub const MAX_DIFFICULTY: u8 = 10;

/// Delay between the last change and the debounced autosave.
pub const AUTOSAVE_DELAY: Duration = Duration::from_secs(3);

/// Save file format version written by this build.
pub const SAVE_VERSION: u32 = 1;

/// File name of the bundled content database.
pub const CONTENT_DB_NAME: &str = "Database.db";

/// File name of the binary save file.
pub const SAVE_FILE_NAME: &str = "Data.sav";

/// Width of the per-challenge landed bitset.
pub const MAX_CHALLENGE_TRICKS: usize = 64;

/// Letters handed out for each miss in a game of S-K-A-T-E.
pub const SKATE_LETTERS: &str = "SKATE";

/// Lives in a full game of S-K-A-T-E.
pub const SKATE_LIVES: u8 = 5;

/// Category selected after a reset.
pub const DEFAULT_CATEGORY: &str = "Flat Ground";

/// Maximum length of a single string in the save file.
pub const MAX_SAVE_STRING_LEN: usize = 1024;

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "SKATESPIN_DATA_DIR";
