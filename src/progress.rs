//! Completion aggregates: how many tricks are landed per category and per
//! difficulty. The catalog keeps these in sync on every mutation so the
//! progress views never rescan the trick table.

use crate::models::TrickEntry;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// `landed / total`, with an empty total counting as no progress.
pub fn safe_fraction(landed: u32, total: u32) -> f32 {
    if total == 0 {
        return 0.0;
    }
    let landed = f64::from(landed);
    let total = f64::from(total);
    #[allow(clippy::as_conversions, clippy::cast_possible_truncation, reason = "ratio is within 0.0..=1.0")]
    let fraction = (landed / total) as f32;
    fraction
}

/// Whole-number percentage. Halves round to the even neighbour, so 1 of 8
/// shows as 12%.
pub fn safe_percent(landed: u32, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    let percent = (f64::from(landed.min(total)) * 100.0 / f64::from(total)).round_ties_even();
    #[allow(
        clippy::as_conversions,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "percent is within 0.0..=100.0"
    )]
    let percent = percent as u32;
    percent.min(100)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Tally {
    pub landed: u32,
    pub total: u32,
}

impl Tally {
    pub fn fraction(self) -> f32 {
        safe_fraction(self.landed, self.total)
    }

    pub fn percent(self) -> u32 {
        safe_percent(self.landed, self.total)
    }

    fn add(&mut self, landed: bool) {
        self.total += 1;
        if landed {
            self.landed += 1;
        }
    }

    fn remove(&mut self, landed: bool) {
        self.total = self.total.saturating_sub(1);
        if landed {
            self.landed = self.landed.saturating_sub(1);
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LandData {
    pub landed: u32,
    pub total: u32,
    pub per_difficulty: BTreeMap<u8, Tally>,
}

impl LandData {
    pub fn tally(&self) -> Tally {
        Tally { landed: self.landed, total: self.total }
    }

    fn add(&mut self, difficulty: u8, landed: bool) {
        self.total += 1;
        if landed {
            self.landed += 1;
        }
        if let Some(tally) = self.per_difficulty.get_mut(&difficulty) {
            tally.add(landed);
        }
    }

    fn remove(&mut self, difficulty: u8, landed: bool) {
        self.total = self.total.saturating_sub(1);
        if landed {
            self.landed = self.landed.saturating_sub(1);
        }
        if let Some(tally) = self.per_difficulty.get_mut(&difficulty) {
            tally.remove(landed);
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Progress {
    by_category: HashMap<String, LandData>,
}

impl Progress {
    /// Empty aggregate with a zeroed entry for every category and difficulty.
    pub fn new<'a>(categories: impl IntoIterator<Item = &'a str>, difficulties: &[u8]) -> Self {
        let by_category = categories
            .into_iter()
            .map(|category| {
                let per_difficulty = difficulties.iter().map(|&d| (d, Tally::default())).collect();
                (category.to_string(), LandData { landed: 0, total: 0, per_difficulty })
            })
            .collect();
        Self { by_category }
    }

    /// Full recompute over `tricks`. Tricks in unknown categories are ignored.
    pub fn build<'a>(
        categories: impl IntoIterator<Item = &'a str>,
        difficulties: &[u8],
        tricks: impl IntoIterator<Item = &'a TrickEntry>,
    ) -> Self {
        let mut progress = Self::new(categories, difficulties);
        for trick in tricks {
            progress.add_trick(&trick.category, trick.difficulty, trick.is_landed());
        }
        progress
    }

    pub fn add_trick(&mut self, category: &str, difficulty: u8, landed: bool) {
        if let Some(data) = self.by_category.get_mut(category) {
            data.add(difficulty, landed);
        }
    }

    pub fn status_changed(&mut self, category: &str, difficulty: u8, was_landed: bool, now_landed: bool) {
        if was_landed == now_landed {
            return;
        }
        if let Some(data) = self.by_category.get_mut(category) {
            data.remove(difficulty, was_landed);
            data.add(difficulty, now_landed);
        }
    }

    pub fn difficulty_changed(&mut self, category: &str, from: u8, to: u8, landed: bool) {
        if from == to {
            return;
        }
        if let Some(data) = self.by_category.get_mut(category) {
            data.remove(from, landed);
            data.add(to, landed);
        }
    }

    pub fn category(&self, category: &str) -> Option<&LandData> {
        self.by_category.get(category)
    }

    pub fn completion(&self, category: &str) -> f32 {
        self.category(category).map_or(0.0, |d| d.tally().fraction())
    }

    pub fn completion_at(&self, category: &str, difficulty: u8) -> f32 {
        self.category(category)
            .and_then(|d| d.per_difficulty.get(&difficulty))
            .map_or(0.0, |t| t.fraction())
    }

    pub fn overall(&self) -> Tally {
        self.by_category.values().fold(Tally::default(), |acc, d| Tally {
            landed: acc.landed + d.landed,
            total: acc.total + d.total,
        })
    }
}
