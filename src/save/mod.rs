//! Persisted user state.
//!
//! The save file holds only what differs from the shipped content: trick
//! statuses, land counts and re-ratings, challenge progress, display
//! settings and the picker filter. Records are keyed by content hash so a
//! content update that reorders rows does not scramble progress.

mod codec;

pub use codec::{SaveReader, SaveWriter};

use crate::catalog::TrickCatalog;
use crate::constants::SAVE_VERSION;
use crate::error::AppError;
use crate::models::{LandedSet, TrickStatus};
use crate::selector::TrickSelector;
use crate::settings::AppSettings;
use log::{debug, error, info, warn};
use std::fs;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SavedTrick {
    pub hash: u32,
    /// Raw status byte; validated when applied.
    pub status: u8,
    pub lands: u32,
    pub difficulty_override: Option<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SavedChallenge {
    pub hash: u32,
    pub index: u8,
    pub completed: bool,
    pub landed: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedSelector {
    pub allow_landed: bool,
    pub min_difficulty: u8,
    pub max_difficulty: u8,
    pub categories: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveData {
    pub tricks: Vec<SavedTrick>,
    pub challenges: Vec<SavedChallenge>,
    pub settings: AppSettings,
    pub selector: SavedSelector,
}

/// What `SaveData::apply` restored and what it had to drop.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ApplySummary {
    pub tricks: usize,
    pub challenges: usize,
    pub skipped: usize,
}

impl SaveData {
    /// Snapshot the state worth persisting.
    pub fn capture(catalog: &TrickCatalog, settings: &AppSettings, selector: &TrickSelector) -> Self {
        let tricks = catalog
            .tricks()
            .filter(|t| t.has_progress())
            .map(|t| SavedTrick {
                hash: t.hash,
                status: t.status.as_u8(),
                lands: t.lands,
                difficulty_override: t.difficulty_override(),
            })
            .collect();

        let challenges = catalog
            .challenges()
            .iter()
            .filter(|c| c.has_progress())
            .map(|c| SavedChallenge {
                hash: c.hash,
                index: c.index,
                completed: c.completed,
                landed: c.landed.bits(),
            })
            .collect();

        let (min_difficulty, max_difficulty) = selector.difficulty_range();
        Self {
            tricks,
            challenges,
            settings: *settings,
            selector: SavedSelector {
                allow_landed: selector.allow_landed(),
                min_difficulty,
                max_difficulty,
                categories: selector.categories().to_vec(),
            },
        }
    }

    /// Restore saved state onto freshly loaded content. Records that no
    /// longer match anything are logged and skipped.
    pub fn apply(&self, catalog: &mut TrickCatalog, settings: &mut AppSettings, selector: &mut TrickSelector) -> ApplySummary {
        let mut summary = ApplySummary::default();

        for saved in &self.tricks {
            let Some(id) = catalog.find_by_hash(saved.hash) else {
                error!("Saved trick hash {:#010x} matches no trick, skipping", saved.hash);
                summary.skipped += 1;
                continue;
            };
            let status = match TrickStatus::try_from(saved.status) {
                Ok(status) => status,
                Err(byte) => {
                    error!("Saved trick {:#010x} has invalid status {byte}, skipping", saved.hash);
                    summary.skipped += 1;
                    continue;
                }
            };
            if let Some(difficulty) = saved.difficulty_override {
                if let Err(e) = catalog.set_difficulty(id, difficulty) {
                    warn!("Saved difficulty for trick {:#010x} ignored: {e}", saved.hash);
                }
            }
            let restored = catalog.set_lands(id, saved.lands).and_then(|()| catalog.set_status(id, status));
            match restored {
                Ok(_) => summary.tricks += 1,
                Err(e) => {
                    error!("Failed to restore trick {:#010x}: {e}", saved.hash);
                    summary.skipped += 1;
                }
            }
        }

        for saved in &self.challenges {
            let Some(id) = catalog.find_challenge(saved.hash, saved.index) else {
                error!(
                    "Saved challenge {:#010x}/{} matches no challenge, skipping",
                    saved.hash, saved.index
                );
                summary.skipped += 1;
                continue;
            };
            let restored = catalog
                .set_challenge_completed(id, saved.completed)
                .and_then(|()| catalog.set_challenge_landed(id, LandedSet::from_bits(saved.landed)));
            match restored {
                Ok(()) => summary.challenges += 1,
                Err(e) => {
                    error!("Failed to restore challenge {:#010x}: {e}", saved.hash);
                    summary.skipped += 1;
                }
            }
        }

        *settings = self.settings;

        selector.set_allow_landed(self.selector.allow_landed);
        if let Err(e) = selector.set_difficulty_range(self.selector.min_difficulty, self.selector.max_difficulty) {
            warn!("Saved difficulty range ignored: {e}");
        }
        selector.set_categories(catalog, &self.selector.categories);

        debug!(
            "Applied save: {} tricks, {} challenges, {} skipped",
            summary.tricks, summary.challenges, summary.skipped
        );
        summary
    }

    pub fn write_to<W: Write>(&self, writer: W) -> Result<W, AppError> {
        let mut w = SaveWriter::new(writer);
        w.write_u32(SAVE_VERSION)?;

        w.write_count(self.tricks.len())?;
        for trick in &self.tricks {
            w.write_u32(trick.hash)?;
            w.write_u8(trick.status)?;
            w.write_u32(trick.lands)?;
            w.write_u8(trick.difficulty_override.unwrap_or(0))?;
        }

        w.write_count(self.challenges.len())?;
        for challenge in &self.challenges {
            w.write_u32(challenge.hash)?;
            w.write_u8(challenge.index)?;
            w.write_bool(challenge.completed)?;
            w.write_u64(challenge.landed)?;
        }

        w.write_bool(self.settings.use_short_trick_names)?;
        w.write_bool(self.settings.alternate_trick_names_enabled)?;

        w.write_bool(self.selector.allow_landed)?;
        w.write_u8(self.selector.min_difficulty)?;
        w.write_u8(self.selector.max_difficulty)?;
        w.write_count(self.selector.categories.len())?;
        for category in &self.selector.categories {
            w.write_string(category)?;
        }

        Ok(w.into_inner())
    }

    pub fn read_from<R: Read>(reader: R) -> Result<Self, AppError> {
        let mut r = SaveReader::new(reader);

        let version = r.read_u32()?;
        if version == 0 {
            return Err(AppError::save_format("version 0 is not a valid save"));
        }
        if version > SAVE_VERSION {
            return Err(AppError::UnsupportedSaveVersion {
                found: version,
                supported: SAVE_VERSION,
            });
        }

        let count = r.read_count()?;
        let mut tricks = Vec::new();
        for _ in 0..count {
            let hash = r.read_u32()?;
            let status = r.read_u8()?;
            let lands = r.read_u32()?;
            let difficulty_override = Some(r.read_u8()?).filter(|&d| d != 0);
            tricks.push(SavedTrick {
                hash,
                status,
                lands,
                difficulty_override,
            });
        }

        let count = r.read_count()?;
        let mut challenges = Vec::new();
        for _ in 0..count {
            challenges.push(SavedChallenge {
                hash: r.read_u32()?,
                index: r.read_u8()?,
                completed: r.read_bool()?,
                landed: r.read_u64()?,
            });
        }

        let settings = AppSettings {
            use_short_trick_names: r.read_bool()?,
            alternate_trick_names_enabled: r.read_bool()?,
        };

        let allow_landed = r.read_bool()?;
        let min_difficulty = r.read_u8()?;
        let max_difficulty = r.read_u8()?;
        let count = r.read_count()?;
        let mut categories = Vec::new();
        for _ in 0..count {
            categories.push(r.read_string()?);
        }

        Ok(Self {
            tricks,
            challenges,
            settings,
            selector: SavedSelector {
                allow_landed,
                min_difficulty,
                max_difficulty,
                categories,
            },
        })
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Write the save next to `path` and move it into place, so a crash mid-write
/// leaves the previous save intact.
pub fn save_to_path(data: &SaveData, path: &Path) -> Result<(), AppError> {
    let tmp = temp_path(path);
    let file = fs::File::create(&tmp)?;
    let mut writer = data.write_to(BufWriter::new(file))?;
    writer.flush()?;
    drop(writer);
    fs::rename(&tmp, path)?;
    info!(
        "Saved {} tricks and {} challenges to {}",
        data.tricks.len(),
        data.challenges.len(),
        path.display()
    );
    Ok(())
}

/// Read a save file. A missing file is not an error: it means a fresh start.
pub fn load_from_path(path: &Path) -> Result<Option<SaveData>, AppError> {
    if !path.exists() {
        debug!("No save file at {}", path.display());
        return Ok(None);
    }
    let file = fs::File::open(path)?;
    let data = SaveData::read_from(BufReader::new(file))?;
    info!(
        "Loaded save with {} tricks and {} challenges from {}",
        data.tricks.len(),
        data.challenges.len(),
        path.display()
    );
    Ok(Some(data))
}
