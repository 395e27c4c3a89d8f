//! Random trick picker.
//!
//! Holds the user's filter (categories, difficulty range, whether landed
//! tricks may come up) and a shuffled pool of matching tricks with a cursor.

use crate::catalog::TrickCatalog;
use crate::constants::{DEFAULT_CATEGORY, MAX_DIFFICULTY, MIN_DIFFICULTY};
use crate::error::AppError;
use crate::models::{TrickEntry, TrickId, TrickStatus};
use crate::validation::validate_difficulty_range;
use log::{debug, warn};
use rand::seq::SliceRandom;
use rand::Rng;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrickSelector {
    categories: Vec<String>,
    min_difficulty: u8,
    max_difficulty: u8,
    allow_landed: bool,
    pool: Vec<TrickId>,
    cursor: usize,
}

impl TrickSelector {
    pub fn new(catalog: &TrickCatalog) -> Self {
        let mut selector = Self {
            categories: Vec::new(),
            min_difficulty: MIN_DIFFICULTY,
            max_difficulty: MAX_DIFFICULTY,
            allow_landed: false,
            pool: Vec::new(),
            cursor: 0,
        };
        selector.reset(catalog);
        selector
    }

    /// Back to defaults: only the default category, full range, landed tricks hidden.
    pub fn reset(&mut self, catalog: &TrickCatalog) {
        self.allow_landed = false;
        self.min_difficulty = MIN_DIFFICULTY;
        self.max_difficulty = MAX_DIFFICULTY;
        self.categories = if catalog.has_category(DEFAULT_CATEGORY) {
            vec![DEFAULT_CATEGORY.to_string()]
        } else {
            catalog.categories().first().cloned().into_iter().collect()
        };
        self.pool.clear();
        self.cursor = 0;
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn difficulty_range(&self) -> (u8, u8) {
        (self.min_difficulty, self.max_difficulty)
    }

    pub fn allow_landed(&self) -> bool {
        self.allow_landed
    }

    pub fn pool(&self) -> &[TrickId] {
        &self.pool
    }

    /// Whether a trick passes the current filter.
    pub fn matches(&self, trick: &TrickEntry) -> bool {
        (self.min_difficulty..=self.max_difficulty).contains(&trick.difficulty)
            && self.categories.iter().any(|c| *c == trick.category)
            && !trick.is_banned()
            && (self.allow_landed || !trick.is_landed())
    }

    /// Rebuild the pool from the catalog and shuffle it.
    pub fn recalculate<R: Rng + ?Sized>(&mut self, catalog: &TrickCatalog, rng: &mut R) {
        self.pool = catalog.tricks().filter(|t| self.matches(t)).map(|t| t.id).collect();
        self.shuffle(rng);
        debug!("Trick pool rebuilt with {} tricks", self.pool.len());
    }

    /// Drop tricks that no longer pass the filter, keeping the order and
    /// the current trick when it survives.
    pub fn prune(&mut self, catalog: &TrickCatalog) {
        let current = self.current();
        let kept: Vec<TrickId> = self
            .pool
            .iter()
            .copied()
            .filter(|&id| catalog.trick(id).is_some_and(|t| self.matches(t)))
            .collect();
        self.pool = kept;
        self.cursor = current
            .and_then(|id| self.pool.iter().position(|&p| p == id))
            .unwrap_or(0);
    }

    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.pool.shuffle(rng);
        self.cursor = 0;
    }

    pub fn current(&self) -> Option<TrickId> {
        self.pool.get(self.cursor).copied()
    }

    pub fn next(&mut self) -> Option<TrickId> {
        if self.pool.is_empty() {
            return None;
        }
        self.cursor = (self.cursor + 1) % self.pool.len();
        self.current()
    }

    pub fn previous(&mut self) -> Option<TrickId> {
        if self.pool.is_empty() {
            return None;
        }
        self.cursor = (self.cursor + self.pool.len() - 1) % self.pool.len();
        self.current()
    }

    /// Drop the current trick from the pool; the cursor then points at the
    /// trick that followed it.
    fn remove_current(&mut self) {
        if self.cursor < self.pool.len() {
            self.pool.remove(self.cursor);
        }
        if self.cursor >= self.pool.len() {
            self.cursor = 0;
        }
    }

    /// Record a land on the current trick and move on. Returns the landed trick.
    pub fn land_current(&mut self, catalog: &mut TrickCatalog) -> Result<Option<TrickId>, AppError> {
        let Some(id) = self.current() else {
            return Ok(None);
        };
        catalog.record_land(id)?;
        if self.allow_landed {
            self.next();
        } else {
            self.remove_current();
        }
        Ok(Some(id))
    }

    /// Ban the current trick and move on. Returns the banned trick.
    pub fn ban_current(&mut self, catalog: &mut TrickCatalog) -> Result<Option<TrickId>, AppError> {
        let Some(id) = self.current() else {
            return Ok(None);
        };
        catalog.set_status(id, TrickStatus::Banned)?;
        self.remove_current();
        Ok(Some(id))
    }

    /// Turn a category on or off. Returns false when the change was refused
    /// because it would leave no category selected.
    pub fn toggle_category(&mut self, catalog: &TrickCatalog, category: &str, on: bool) -> Result<bool, AppError> {
        if !catalog.has_category(category) {
            return Err(AppError::InvalidInput {
                field: "category",
                reason: format!("unknown category '{category}'"),
            });
        }

        let selected = self.categories.iter().any(|c| c == category);
        if on && !selected {
            self.categories.push(category.to_string());
        } else if !on && selected {
            if self.categories.len() == 1 {
                return Ok(false);
            }
            self.categories.retain(|c| c != category);
        }
        Ok(true)
    }

    /// Replace the selected categories, e.g. from a save file. Unknown names
    /// are skipped; an empty result keeps the current selection.
    pub fn set_categories<I, S>(&mut self, catalog: &TrickCatalog, categories: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut chosen: Vec<String> = Vec::new();
        for category in categories {
            let category = category.as_ref();
            if !catalog.has_category(category) {
                warn!("Ignoring unknown selected category '{category}'");
                continue;
            }
            if !chosen.iter().any(|c| c == category) {
                chosen.push(category.to_string());
            }
        }
        if chosen.is_empty() {
            warn!("No valid selected categories, keeping {:?}", self.categories);
            return;
        }
        self.categories = chosen;
    }

    pub fn set_difficulty_range(&mut self, min: u8, max: u8) -> Result<(), AppError> {
        let (min, max) = validate_difficulty_range(min, max)?;
        self.min_difficulty = min;
        self.max_difficulty = max;
        Ok(())
    }

    pub fn set_allow_landed(&mut self, allow: bool) {
        self.allow_landed = allow;
    }
}
