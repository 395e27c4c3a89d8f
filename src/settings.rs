use serde::{Deserialize, Serialize};

/// Display preferences persisted in the save file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppSettings {
    /// Abbreviate trick names using the `ShortTrickNames` table.
    pub use_short_trick_names: bool,
    /// Prefer a trick's secondary name when it has one.
    pub alternate_trick_names_enabled: bool,
}

impl AppSettings {
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
