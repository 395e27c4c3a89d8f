use std::fmt;

/// Index of a trick in the catalog arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TrickId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TrickStatus {
    #[default]
    Default,
    Landed,
    Banned,
}

impl TrickStatus {
    /// Next status in the Default → Landed → Banned cycle.
    pub fn next(self) -> Self {
        match self {
            TrickStatus::Default => TrickStatus::Landed,
            TrickStatus::Landed => TrickStatus::Banned,
            TrickStatus::Banned => TrickStatus::Default,
        }
    }

    pub fn as_u8(self) -> u8 {
        match self {
            TrickStatus::Default => 0,
            TrickStatus::Landed => 1,
            TrickStatus::Banned => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TrickStatus::Default => "default",
            TrickStatus::Landed => "landed",
            TrickStatus::Banned => "banned",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "default" | "none" => Some(TrickStatus::Default),
            "landed" => Some(TrickStatus::Landed),
            "banned" => Some(TrickStatus::Banned),
            _ => None,
        }
    }
}

impl TryFrom<u8> for TrickStatus {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(TrickStatus::Default),
            1 => Ok(TrickStatus::Landed),
            2 => Ok(TrickStatus::Banned),
            other => Err(other),
        }
    }
}

impl fmt::Display for TrickStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stance variants, one per difficulty column of the `Tricks` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stance {
    Regular,
    Fakie,
    Switch,
    Nollie,
}

impl Stance {
    pub const ALL: [Stance; 4] = [Stance::Regular, Stance::Fakie, Stance::Switch, Stance::Nollie];

    pub fn prefix(self) -> &'static str {
        match self {
            Stance::Regular => "",
            Stance::Fakie => "Fakie ",
            Stance::Switch => "Switch ",
            Stance::Nollie => "Nollie ",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrickEntry {
    pub id: TrickId,
    /// Display name including the stance prefix.
    pub name: String,
    /// Alternate name, prefixed like `name`; empty when the row has none.
    pub secondary_name: String,
    pub category: String,
    pub difficulty: u8,
    /// Difficulty as shipped in the content database.
    pub base_difficulty: u8,
    pub hash: u32,
    pub can_be_rolled: bool,
    pub status: TrickStatus,
    pub lands: u32,
}

impl TrickEntry {
    pub fn is_landed(&self) -> bool {
        self.status == TrickStatus::Landed
    }

    pub fn is_banned(&self) -> bool {
        self.status == TrickStatus::Banned
    }

    /// The user-chosen difficulty, if it differs from the shipped one.
    pub fn difficulty_override(&self) -> Option<u8> {
        (self.difficulty != self.base_difficulty).then_some(self.difficulty)
    }

    /// Whether anything about this trick needs to be persisted.
    pub fn has_progress(&self) -> bool {
        self.status != TrickStatus::Default || self.lands > 0 || self.difficulty_override().is_some()
    }
}
