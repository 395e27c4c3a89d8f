// src/catalog/loader.rs
//
// Builds a TrickCatalog from the content tables. Bad rows are logged and
// skipped; only database failures abort the load.

use super::{ChallengeGroup, TrickCatalog};
use crate::constants::{MAX_CHALLENGE_TRICKS, MAX_DIFFICULTY, MIN_DIFFICULTY};
use crate::db::rows::{self, ChallengeRow, DifficultyNameRow, ShortNameRow, TrickRow};
use crate::error::AppError;
use crate::hash::{challenge_hash, trick_hash};
use crate::models::{ChallengeData, ChallengeId, LandedSet, Stance, TrickEntry, TrickId, TrickStatus};
use crate::progress::Progress;
use log::{error, info, warn};
use rusqlite::Connection;
use std::collections::BTreeMap;

fn to_difficulty(value: i64) -> Option<u8> {
    u8::try_from(value)
        .ok()
        .filter(|d| (MIN_DIFFICULTY..=MAX_DIFFICULTY).contains(d))
}

pub(super) fn load(conn: &Connection) -> Result<TrickCatalog, AppError> {
    let mut catalog = TrickCatalog::default();

    for category in rows::find_categories(conn)? {
        if category.is_empty() || catalog.categories.contains(&category) {
            warn!("Skipping empty or duplicate category '{category}'");
            continue;
        }
        catalog.categories.push(category);
    }

    for row in DifficultyNameRow::find_all(conn)? {
        match to_difficulty(row.difficulty) {
            Some(d) => {
                catalog.difficulty_names.insert(d, row.name);
            }
            None => error!("Difficulty name '{}' has out of range difficulty {}", row.name, row.difficulty),
        }
    }

    let difficulties: Vec<u8> = catalog.difficulty_names.keys().copied().collect();
    for category in &catalog.categories {
        let buckets: BTreeMap<u8, Vec<TrickId>> = difficulties.iter().map(|&d| (d, Vec::new())).collect();
        catalog.buckets.insert(category.clone(), buckets);
    }

    for row in TrickRow::find_all(conn)? {
        load_trick_row(&mut catalog, &row);
    }

    catalog.short_names = ShortNameRow::find_all(conn)?
        .into_iter()
        .filter(|r| !r.name.is_empty())
        .map(|r| (r.name, r.short_name))
        .collect();

    for row in ChallengeRow::find_all(conn)? {
        load_challenge_row(&mut catalog, row);
    }

    catalog.progress = Progress::build(
        catalog.categories.iter().map(String::as_str),
        &difficulties,
        &catalog.tricks,
    );

    info!(
        "Loaded {} tricks in {} categories and {} challenges",
        catalog.tricks.len(),
        catalog.categories.len(),
        catalog.challenges.len()
    );

    Ok(catalog)
}

fn load_trick_row(catalog: &mut TrickCatalog, row: &TrickRow) {
    for category in row.category_list() {
        if !catalog.categories.iter().any(|c| c == category) {
            error!("{} row from content database contains an invalid category: {category}", row.name);
            continue;
        }

        for (stance, &raw_difficulty) in Stance::ALL.iter().zip(row.difficulties.iter()) {
            if raw_difficulty <= 0 {
                continue;
            }

            let prefix = stance.prefix();
            let name = format!("{prefix}{}", row.name);

            let Some(difficulty) = to_difficulty(raw_difficulty).filter(|d| catalog.difficulty_names.contains_key(d)) else {
                error!("Trick '{name}' in {category} has unknown difficulty {raw_difficulty}");
                continue;
            };

            let hash = trick_hash(category, &name);
            if let Some(existing) = catalog.by_hash.get(&hash).and_then(|id| catalog.tricks.get(id.0)) {
                error!(
                    "Trick data hash collision {hash} from ({category}, {prefix}, {}) with ({}, {})",
                    row.name, existing.category, existing.name
                );
                continue;
            }

            let secondary_name = if row.secondary_name.is_empty() {
                String::new()
            } else {
                format!("{prefix}{}", row.secondary_name)
            };

            let id = TrickId(catalog.tricks.len());
            catalog.tricks.push(TrickEntry {
                id,
                name,
                secondary_name,
                category: category.to_string(),
                difficulty,
                base_difficulty: difficulty,
                hash,
                can_be_rolled: !row.cannot_be_rolled,
                status: TrickStatus::Default,
                lands: 0,
            });
            catalog.by_hash.insert(hash, id);
            if let Some(bucket) = catalog.buckets.get_mut(category).and_then(|b| b.get_mut(&difficulty)) {
                bucket.push(id);
            }
        }
    }
}

fn load_challenge_row(catalog: &mut TrickCatalog, row: ChallengeRow) {
    let hash = challenge_hash(&row.name);

    let mut tricks = Vec::new();
    for trick in row.trick_list() {
        match catalog.by_hash.get(&trick_hash(&row.category, trick)) {
            Some(&id) => tricks.push(id),
            None => error!(
                "Failed to find trick entry from hash for challenge {} - {} from ({}, {trick})",
                row.name, row.person, row.category
            ),
        }
    }

    if tricks.len() > MAX_CHALLENGE_TRICKS {
        warn!(
            "Challenge {} - {} has {} tricks, keeping the first {MAX_CHALLENGE_TRICKS}",
            row.name,
            row.person,
            tricks.len()
        );
        tricks.truncate(MAX_CHALLENGE_TRICKS);
    }

    let group_idx = match catalog.group_index.get(&hash) {
        Some(&idx) => idx,
        None => {
            catalog.challenge_groups.push(ChallengeGroup {
                hash,
                name: row.name.clone(),
                category: row.category.clone(),
                members: Vec::new(),
            });
            let idx = catalog.challenge_groups.len() - 1;
            catalog.group_index.insert(hash, idx);
            idx
        }
    };

    let Some(group) = catalog.challenge_groups.get_mut(group_idx) else {
        return;
    };

    let Ok(index) = u8::try_from(group.members.len()) else {
        error!("Too many defenders for challenge {}, skipping {}", row.name, row.person);
        return;
    };

    let id = ChallengeId(catalog.challenges.len());
    group.members.push(id);
    catalog.challenges.push(ChallengeData {
        id,
        name: row.name,
        person: row.person,
        category: row.category,
        difficulty: i32::try_from(row.difficulty).unwrap_or(0),
        tricks,
        hash,
        index,
        completed: false,
        landed: LandedSet::default(),
    });
}
