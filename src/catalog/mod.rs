//! In-memory trick and challenge tables.
//!
//! The catalog is loaded once from the content database and then mutated
//! in place. Tricks and challenges live in arenas addressed by
//! [`TrickId`]/[`ChallengeId`]; the content hash is the identity used by
//! save files.

mod loader;

use crate::error::AppError;
use crate::hash::trick_hash;
use crate::models::{ChallengeData, ChallengeId, LandedSet, TrickEntry, TrickId, TrickStatus};
use crate::progress::Progress;
use crate::settings::AppSettings;
use crate::validation::validate_difficulty;
use log::{debug, warn};
use rusqlite::Connection;
use std::collections::{BTreeMap, HashMap};

/// Challenges sharing a name, one member per defender.
#[derive(Debug, Clone, PartialEq)]
pub struct ChallengeGroup {
    pub hash: u32,
    pub name: String,
    pub category: String,
    pub members: Vec<ChallengeId>,
}

#[derive(Debug, Default)]
pub struct TrickCatalog {
    categories: Vec<String>,
    difficulty_names: BTreeMap<u8, String>,
    tricks: Vec<TrickEntry>,
    buckets: HashMap<String, BTreeMap<u8, Vec<TrickId>>>,
    by_hash: HashMap<u32, TrickId>,
    short_names: Vec<(String, String)>,
    challenges: Vec<ChallengeData>,
    challenge_groups: Vec<ChallengeGroup>,
    group_index: HashMap<u32, usize>,
    progress: Progress,
}

impl TrickCatalog {
    pub fn load(conn: &Connection) -> Result<Self, AppError> {
        loader::load(conn)
    }

    // ── Queries ────────────────────────────────────────────────────

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn has_category(&self, category: &str) -> bool {
        self.categories.iter().any(|c| c == category)
    }

    pub fn difficulty_names(&self) -> &BTreeMap<u8, String> {
        &self.difficulty_names
    }

    pub fn difficulty_name(&self, difficulty: u8) -> Option<&str> {
        self.difficulty_names.get(&difficulty).map(String::as_str)
    }

    pub fn short_names(&self) -> &[(String, String)] {
        &self.short_names
    }

    pub fn len(&self) -> usize {
        self.tricks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tricks.is_empty()
    }

    /// All tricks by category order, then difficulty, then bucket order.
    pub fn tricks(&self) -> impl Iterator<Item = &TrickEntry> + '_ {
        self.categories.iter().flat_map(move |category| {
            self.buckets
                .get(category)
                .into_iter()
                .flat_map(|buckets| buckets.values().flatten())
                .filter_map(move |id| self.tricks.get(id.0))
        })
    }

    pub fn tricks_in(&self, category: &str, difficulty: u8) -> impl Iterator<Item = &TrickEntry> + '_ {
        self.buckets
            .get(category)
            .and_then(|b| b.get(&difficulty))
            .into_iter()
            .flatten()
            .filter_map(move |id| self.tricks.get(id.0))
    }

    pub fn trick(&self, id: TrickId) -> Option<&TrickEntry> {
        self.tricks.get(id.0)
    }

    pub fn find_by_hash(&self, hash: u32) -> Option<TrickId> {
        self.by_hash.get(&hash).copied()
    }

    /// Look a trick up by name within a category, ignoring case. Secondary
    /// names match too.
    pub fn find_by_name(&self, category: &str, name: &str) -> Option<TrickId> {
        if let Some(id) = self.find_by_hash(trick_hash(category, name)) {
            return Some(id);
        }
        let needle = name.to_lowercase();
        self.tricks
            .iter()
            .filter(|t| t.category == category)
            .find(|t| t.name.to_lowercase() == needle || (!t.secondary_name.is_empty() && t.secondary_name.to_lowercase() == needle))
            .map(|t| t.id)
    }

    /// Look a trick up by name in any category. Returns every match.
    pub fn find_all_by_name(&self, name: &str) -> Vec<TrickId> {
        self.categories
            .iter()
            .filter_map(|category| self.find_by_name(category, name))
            .collect()
    }

    /// Name to show for a trick under the given preferences.
    pub fn display_name(&self, id: TrickId, settings: &AppSettings) -> Option<String> {
        let trick = self.trick(id)?;
        let mut name = if settings.alternate_trick_names_enabled && !trick.secondary_name.is_empty() {
            trick.secondary_name.clone()
        } else {
            trick.name.clone()
        };
        if settings.use_short_trick_names {
            for (from, to) in &self.short_names {
                name = name.replace(from.as_str(), to);
            }
        }
        Some(name)
    }

    pub fn challenges(&self) -> &[ChallengeData] {
        &self.challenges
    }

    pub fn challenge(&self, id: ChallengeId) -> Option<&ChallengeData> {
        self.challenges.get(id.0)
    }

    pub fn challenge_groups(&self) -> &[ChallengeGroup] {
        &self.challenge_groups
    }

    pub fn find_challenge(&self, hash: u32, index: u8) -> Option<ChallengeId> {
        let group = self.group_index.get(&hash).and_then(|&idx| self.challenge_groups.get(idx))?;
        group.members.get(usize::from(index)).copied()
    }

    /// Find a challenge by name (ignoring case) and, optionally, defender.
    pub fn find_challenge_by_name(&self, name: &str, person: Option<&str>) -> Option<ChallengeId> {
        let name = name.to_lowercase();
        let person = person.map(str::to_lowercase);
        self.challenges
            .iter()
            .filter(|c| c.name.to_lowercase() == name)
            .find(|c| person.as_ref().map_or(true, |p| c.person.to_lowercase() == *p))
            .map(|c| c.id)
    }

    pub fn progress(&self) -> &Progress {
        &self.progress
    }

    // ── Mutations ──────────────────────────────────────────────────

    fn trick_mut(&mut self, id: TrickId) -> Result<&mut TrickEntry, AppError> {
        self.tricks
            .get_mut(id.0)
            .ok_or_else(|| AppError::not_found(format!("Trick #{}", id.0)))
    }

    fn challenge_mut(&mut self, id: ChallengeId) -> Result<&mut ChallengeData, AppError> {
        self.challenges
            .get_mut(id.0)
            .ok_or_else(|| AppError::not_found(format!("Challenge #{}", id.0)))
    }

    /// Set a trick's status. Returns the previous status.
    pub fn set_status(&mut self, id: TrickId, status: TrickStatus) -> Result<TrickStatus, AppError> {
        let trick = self.trick_mut(id)?;
        let previous = trick.status;
        trick.status = status;
        let (category, difficulty) = (trick.category.clone(), trick.difficulty);

        self.progress.status_changed(
            &category,
            difficulty,
            previous == TrickStatus::Landed,
            status == TrickStatus::Landed,
        );
        debug!("Trick #{} status {previous} -> {status}", id.0);
        Ok(previous)
    }

    /// Advance a trick through Default → Landed → Banned → Default.
    pub fn cycle_status(&mut self, id: TrickId) -> Result<TrickStatus, AppError> {
        let next = self.trick(id).map(|t| t.status.next()).ok_or_else(|| AppError::not_found(format!("Trick #{}", id.0)))?;
        self.set_status(id, next)?;
        Ok(next)
    }

    /// Count a land and mark the trick as landed.
    pub fn record_land(&mut self, id: TrickId) -> Result<u32, AppError> {
        let trick = self.trick_mut(id)?;
        trick.lands = trick.lands.saturating_add(1);
        let lands = trick.lands;
        self.set_status(id, TrickStatus::Landed)?;
        Ok(lands)
    }

    /// Re-rate a trick, moving it to the matching difficulty bucket.
    /// Returns the previous difficulty.
    pub fn set_difficulty(&mut self, id: TrickId, difficulty: u8) -> Result<u8, AppError> {
        validate_difficulty(difficulty)?;
        if !self.difficulty_names.contains_key(&difficulty) {
            return Err(AppError::InvalidInput {
                field: "difficulty",
                reason: format!("no difficulty named for level {difficulty}"),
            });
        }

        let trick = self.trick_mut(id)?;
        let previous = trick.difficulty;
        if previous == difficulty {
            return Ok(previous);
        }
        trick.difficulty = difficulty;
        let category = trick.category.clone();
        let landed = trick.is_landed();

        if let Some(buckets) = self.buckets.get_mut(&category) {
            if let Some(old) = buckets.get_mut(&previous) {
                old.retain(|&t| t != id);
            }
            // Ids are assigned in load order, so sorted insertion keeps it
            let bucket = buckets.entry(difficulty).or_default();
            let pos = bucket.partition_point(|t| t.0 < id.0);
            bucket.insert(pos, id);
        }
        self.progress.difficulty_changed(&category, previous, difficulty, landed);
        debug!("Trick #{} difficulty {previous} -> {difficulty}", id.0);
        Ok(previous)
    }

    /// Overwrite a trick's land count, used when restoring saved state.
    pub fn set_lands(&mut self, id: TrickId, lands: u32) -> Result<(), AppError> {
        self.trick_mut(id)?.lands = lands;
        Ok(())
    }

    pub fn set_challenge_completed(&mut self, id: ChallengeId, completed: bool) -> Result<(), AppError> {
        self.challenge_mut(id)?.completed = completed;
        Ok(())
    }

    pub fn set_challenge_landed(&mut self, id: ChallengeId, landed: LandedSet) -> Result<(), AppError> {
        self.challenge_mut(id)?.landed = landed;
        Ok(())
    }

    /// Forget all user progress: statuses, lands, re-ratings and challenges.
    pub fn reset_progress(&mut self) {
        let ids: Vec<TrickId> = self.tricks.iter().map(|t| t.id).collect();
        for id in ids {
            let base = self.trick(id).map(|t| t.base_difficulty);
            if let Some(base) = base {
                if let Err(e) = self.set_difficulty(id, base) {
                    warn!("Failed to restore difficulty of trick #{}: {e}", id.0);
                }
            }
            if let Err(e) = self.set_status(id, TrickStatus::Default) {
                warn!("Failed to reset status of trick #{}: {e}", id.0);
            }
            if let Err(e) = self.set_lands(id, 0) {
                warn!("Failed to reset lands of trick #{}: {e}", id.0);
            }
        }
        for challenge in &mut self.challenges {
            challenge.completed = false;
            challenge.landed.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::challenge_hash;
    use crate::test_utils::setup_catalog;

    fn rebuilt(catalog: &TrickCatalog) -> Progress {
        let difficulties: Vec<u8> = catalog.difficulty_names().keys().copied().collect();
        Progress::build(catalog.categories().iter().map(String::as_str), &difficulties, catalog.tricks())
    }

    #[test]
    fn test_load_fixture_counts() {
        let (catalog, _dir) = setup_catalog();
        assert_eq!(catalog.categories(), ["Flat Ground", "Ledge", "Mini Ramp"]);
        assert_eq!(catalog.difficulty_names().len(), 10);
        assert_eq!(catalog.difficulty_name(1), Some("Beginner"));
        assert_eq!(catalog.len(), 14);
        assert_eq!(catalog.tricks().count(), 14);
    }

    #[test]
    fn test_unknown_category_is_skipped() {
        let (catalog, _dir) = setup_catalog();
        assert!(catalog.tricks().all(|t| t.category != "Skatepark"));
        assert!(catalog.find_by_name("Ledge", "Boardslide").is_some());
    }

    #[test]
    fn test_stance_prefixes_and_hashes() {
        let (catalog, _dir) = setup_catalog();
        let id = catalog.find_by_hash(trick_hash("Flat Ground", "Fakie Kickflip")).unwrap();
        let trick = catalog.trick(id).unwrap();
        assert_eq!(trick.name, "Fakie Kickflip");
        assert_eq!(trick.secondary_name, "Fakie Flip");
        assert_eq!(trick.difficulty, 4);
        assert!(trick.can_be_rolled);

        // Null stance columns produce no entry
        assert!(catalog.find_by_hash(trick_hash("Flat Ground", "Nollie Heelflip")).is_none());

        let grind = catalog.find_by_name("Ledge", "50-50 grind").unwrap();
        assert!(!catalog.trick(grind).unwrap().can_be_rolled);
    }

    #[test]
    fn test_tricks_ordered_by_category_then_difficulty() {
        let (catalog, _dir) = setup_catalog();
        let flat: Vec<u8> = catalog
            .tricks()
            .filter(|t| t.category == "Flat Ground")
            .map(|t| t.difficulty)
            .collect();
        let mut sorted = flat.clone();
        sorted.sort_unstable();
        assert_eq!(flat, sorted);

        let first_categories: Vec<&str> = catalog.tricks().map(|t| t.category.as_str()).collect();
        let ledge_pos = first_categories.iter().position(|c| *c == "Ledge").unwrap();
        let ramp_pos = first_categories.iter().position(|c| *c == "Mini Ramp").unwrap();
        assert!(ledge_pos < ramp_pos);
    }

    #[test]
    fn test_tricks_in_bucket() {
        let (catalog, _dir) = setup_catalog();
        let names: Vec<&str> = catalog.tricks_in("Flat Ground", 5).map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Switch Kickflip", "Nollie Kickflip"]);
        assert_eq!(catalog.tricks_in("Vert", 1).count(), 0);
    }

    #[test]
    fn test_find_by_name_matches_secondary_name() {
        let (catalog, _dir) = setup_catalog();
        let by_secondary = catalog.find_by_name("Flat Ground", "switch flip").unwrap();
        assert_eq!(catalog.trick(by_secondary).unwrap().name, "Switch Kickflip");
        assert_eq!(catalog.find_all_by_name("Ollie").len(), 2);
    }

    #[test]
    fn test_display_name_preferences() {
        let (catalog, _dir) = setup_catalog();
        let id = catalog.find_by_name("Flat Ground", "Switch Kickflip").unwrap();

        let mut settings = AppSettings::default();
        assert_eq!(catalog.display_name(id, &settings).unwrap(), "Switch Kickflip");

        settings.use_short_trick_names = true;
        assert_eq!(catalog.display_name(id, &settings).unwrap(), "Sw Kf");

        settings.alternate_trick_names_enabled = true;
        assert_eq!(catalog.display_name(id, &settings).unwrap(), "Sw Flip");

        settings.use_short_trick_names = false;
        assert_eq!(catalog.display_name(id, &settings).unwrap(), "Switch Flip");
    }

    #[test]
    fn test_challenges_grouped_by_name() {
        let (catalog, _dir) = setup_catalog();
        let groups = catalog.challenge_groups();
        assert_eq!(groups.len(), 2);

        let flip_line = &groups[0];
        assert_eq!(flip_line.name, "Flip Line");
        assert_eq!(flip_line.hash, challenge_hash("Flip Line"));
        assert_eq!(flip_line.members.len(), 2);

        let bob = catalog.find_challenge(flip_line.hash, 1).unwrap();
        let bob = catalog.challenge(bob).unwrap();
        assert_eq!(bob.person, "Bob");
        assert_eq!(bob.index, 1);
        // "Impossible" is not in the trick table
        assert_eq!(bob.tricks.len(), 2);

        assert!(catalog.find_challenge(flip_line.hash, 2).is_none());
        assert!(catalog.find_challenge(0xDEAD_BEEF, 0).is_none());
    }

    #[test]
    fn test_challenge_tricks_resolve_with_prefix() {
        let (catalog, _dir) = setup_catalog();
        let alice = catalog.find_challenge_by_name("flip line", Some("alice")).unwrap();
        let names: Vec<&str> = catalog
            .challenge(alice)
            .unwrap()
            .tricks
            .iter()
            .map(|&id| catalog.trick(id).unwrap().name.as_str())
            .collect();
        assert_eq!(names, vec!["Ollie", "Kickflip", "Fakie Kickflip"]);
    }

    #[test]
    fn test_status_changes_keep_progress_in_sync() {
        let (mut catalog, _dir) = setup_catalog();
        let ollie = catalog.find_by_name("Flat Ground", "Ollie").unwrap();
        let heelflip = catalog.find_by_name("Flat Ground", "Heelflip").unwrap();

        assert_eq!(catalog.set_status(ollie, TrickStatus::Landed).unwrap(), TrickStatus::Default);
        assert_eq!(catalog.cycle_status(heelflip).unwrap(), TrickStatus::Landed);
        assert_eq!(catalog.cycle_status(heelflip).unwrap(), TrickStatus::Banned);

        let flat = catalog.progress().category("Flat Ground").unwrap();
        assert_eq!(flat.landed, 1);
        assert_eq!(flat.total, 9);
        assert_eq!(catalog.progress(), &rebuilt(&catalog));
    }

    #[test]
    fn test_record_land_counts_and_marks_landed() {
        let (mut catalog, _dir) = setup_catalog();
        let id = catalog.find_by_name("Ledge", "Boardslide").unwrap();
        assert_eq!(catalog.record_land(id).unwrap(), 1);
        assert_eq!(catalog.record_land(id).unwrap(), 2);
        let trick = catalog.trick(id).unwrap();
        assert!(trick.is_landed());
        assert_eq!(trick.lands, 2);
        assert_eq!(catalog.progress().category("Ledge").unwrap().landed, 1);
    }

    #[test]
    fn test_set_difficulty_moves_bucket_and_progress() {
        let (mut catalog, _dir) = setup_catalog();
        let id = catalog.find_by_name("Flat Ground", "Heelflip").unwrap();
        catalog.record_land(id).unwrap();

        assert_eq!(catalog.set_difficulty(id, 7).unwrap(), 3);
        assert!(catalog.tricks_in("Flat Ground", 3).all(|t| t.id != id));
        assert!(catalog.tricks_in("Flat Ground", 7).any(|t| t.id == id));
        assert_eq!(catalog.trick(id).unwrap().difficulty_override(), Some(7));

        let tally = catalog.progress().category("Flat Ground").unwrap().per_difficulty[&7];
        assert_eq!((tally.landed, tally.total), (1, 1));
        assert_eq!(catalog.progress(), &rebuilt(&catalog));
    }

    #[test]
    fn test_set_difficulty_back_keeps_load_order() {
        let (mut catalog, _dir) = setup_catalog();
        let names = |catalog: &TrickCatalog| -> Vec<String> {
            catalog.tricks_in("Flat Ground", 2).map(|t| t.name.clone()).collect()
        };
        let before = names(&catalog);
        assert_eq!(before, vec!["Fakie Ollie", "Kickflip"]);

        let id = catalog.find_by_name("Flat Ground", "Fakie Ollie").unwrap();
        catalog.set_difficulty(id, 7).unwrap();
        catalog.set_difficulty(id, 2).unwrap();
        assert_eq!(names(&catalog), before);

        catalog.set_difficulty(id, 7).unwrap();
        catalog.reset_progress();
        assert_eq!(names(&catalog), before);
    }

    #[test]
    fn test_set_difficulty_rejects_out_of_range() {
        let (mut catalog, _dir) = setup_catalog();
        let id = catalog.find_by_name("Flat Ground", "Ollie").unwrap();
        assert!(catalog.set_difficulty(id, 0).is_err());
        assert!(catalog.set_difficulty(id, 11).is_err());
        assert!(catalog.set_difficulty(TrickId(999), 2).is_err());
    }

    #[test]
    fn test_reset_progress_restores_everything() {
        let (mut catalog, _dir) = setup_catalog();
        let id = catalog.find_by_name("Flat Ground", "Kickflip").unwrap();
        catalog.record_land(id).unwrap();
        catalog.set_difficulty(id, 9).unwrap();
        let challenge = ChallengeId(0);
        catalog.set_challenge_completed(challenge, true).unwrap();
        catalog.set_challenge_landed(challenge, LandedSet::from_bits(0b11)).unwrap();

        catalog.reset_progress();

        let trick = catalog.trick(id).unwrap();
        assert_eq!(trick.status, TrickStatus::Default);
        assert_eq!(trick.lands, 0);
        assert_eq!(trick.difficulty, trick.base_difficulty);
        assert!(!catalog.challenge(challenge).unwrap().has_progress());
        assert_eq!(catalog.progress().overall().landed, 0);
        assert_eq!(catalog.progress(), &rebuilt(&catalog));
    }
}
