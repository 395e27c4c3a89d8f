// src/dto.rs

use crate::catalog::TrickCatalog;
use crate::challenge::{ChallengeListing, ChallengeRun, RunOutcome};
use crate::models::{ChallengeData, TrickEntry};
use crate::progress::{safe_percent, Tally};
use crate::selector::TrickSelector;
use crate::settings::AppSettings;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct TrickResponse {
    pub id: usize,
    pub name: String,
    pub category: String,
    pub difficulty: u8,
    pub difficulty_name: String,
    pub status: &'static str,
    pub lands: u32,
    pub hash: u32,
}

impl TrickResponse {
    pub fn new(catalog: &TrickCatalog, trick: &TrickEntry, settings: &AppSettings) -> Self {
        Self {
            id: trick.id.0,
            name: catalog.display_name(trick.id, settings).unwrap_or_else(|| trick.name.clone()),
            category: trick.category.clone(),
            difficulty: trick.difficulty,
            difficulty_name: catalog.difficulty_name(trick.difficulty).unwrap_or_default().to_string(),
            status: trick.status.as_str(),
            lands: trick.lands,
            hash: trick.hash,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DifficultyGroupResponse {
    pub difficulty: u8,
    pub name: String,
    pub percent: u32,
    pub tricks: Vec<TrickResponse>,
}

/// One category's tricks, grouped by difficulty. Empty difficulties are left out.
pub fn category_tricks(catalog: &TrickCatalog, category: &str, settings: &AppSettings) -> Vec<DifficultyGroupResponse> {
    let per_difficulty = catalog.progress().category(category).map(|d| &d.per_difficulty);
    catalog
        .difficulty_names()
        .iter()
        .filter_map(|(&difficulty, name)| {
            let tricks: Vec<TrickResponse> = catalog
                .tricks_in(category, difficulty)
                .map(|t| TrickResponse::new(catalog, t, settings))
                .collect();
            if tricks.is_empty() {
                return None;
            }
            let percent = per_difficulty
                .and_then(|p| p.get(&difficulty))
                .map_or(0, |t| t.percent());
            Some(DifficultyGroupResponse {
                difficulty,
                name: name.clone(),
                percent,
                tricks,
            })
        })
        .collect()
}

#[derive(Debug, Serialize)]
pub struct TallyResponse {
    pub landed: u32,
    pub total: u32,
    pub percent: u32,
}

impl From<Tally> for TallyResponse {
    fn from(tally: Tally) -> Self {
        Self {
            landed: tally.landed,
            total: tally.total,
            percent: tally.percent(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CategoryProgressResponse {
    pub category: String,
    #[serde(flatten)]
    pub tally: TallyResponse,
    pub per_difficulty: Vec<(u8, TallyResponse)>,
}

#[derive(Debug, Serialize)]
pub struct ProgressResponse {
    pub overall: TallyResponse,
    pub categories: Vec<CategoryProgressResponse>,
}

impl ProgressResponse {
    pub fn new(catalog: &TrickCatalog) -> Self {
        let progress = catalog.progress();
        let categories = catalog
            .categories()
            .iter()
            .filter_map(|category| {
                let data = progress.category(category)?;
                Some(CategoryProgressResponse {
                    category: category.clone(),
                    tally: data.tally().into(),
                    per_difficulty: data
                        .per_difficulty
                        .iter()
                        .filter(|(_, t)| t.total > 0)
                        .map(|(&d, &t)| (d, t.into()))
                        .collect(),
                })
            })
            .collect();
        Self {
            overall: progress.overall().into(),
            categories,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ChallengeTrickResponse {
    pub name: String,
    pub landed: bool,
}

#[derive(Debug, Serialize)]
pub struct ChallengeResponse {
    pub id: usize,
    pub name: String,
    pub person: String,
    pub category: String,
    pub difficulty: i32,
    pub completed: bool,
    pub percent: u32,
    pub tricks: Vec<ChallengeTrickResponse>,
}

impl ChallengeResponse {
    pub fn new(catalog: &TrickCatalog, challenge: &ChallengeData, settings: &AppSettings) -> Self {
        let tricks = challenge
            .tricks
            .iter()
            .enumerate()
            .map(|(position, &id)| ChallengeTrickResponse {
                name: catalog.display_name(id, settings).unwrap_or_default(),
                landed: challenge.completed || challenge.landed.contains(position),
            })
            .collect();
        let total = u32::try_from(challenge.tricks.len()).unwrap_or(u32::MAX);
        let landed = if challenge.completed { total } else { challenge.landed.count() };
        Self {
            id: challenge.id.0,
            name: challenge.name.clone(),
            person: challenge.person.clone(),
            category: challenge.category.clone(),
            difficulty: challenge.difficulty,
            completed: challenge.completed,
            percent: safe_percent(landed, total),
            tricks,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ChallengeGroupResponse {
    pub category: String,
    pub name: String,
    pub defenders: Vec<ChallengeResponse>,
}

pub fn challenge_groups(
    catalog: &TrickCatalog,
    listing: &[(&str, Vec<ChallengeListing<'_>>)],
    settings: &AppSettings,
) -> Vec<ChallengeGroupResponse> {
    listing
        .iter()
        .flat_map(|(category, groups)| {
            groups.iter().map(move |group| ChallengeGroupResponse {
                category: (*category).to_string(),
                name: group.name.to_string(),
                defenders: group
                    .defenders
                    .iter()
                    .map(|c| ChallengeResponse::new(catalog, c, settings))
                    .collect(),
            })
        })
        .collect()
}

#[derive(Debug, Serialize)]
pub struct RunResponse {
    pub challenge: Option<ChallengeResponse>,
    pub outcome: &'static str,
    pub lives: Option<u8>,
    pub letters: &'static str,
    pub next_trick: Option<String>,
}

impl RunResponse {
    pub fn new(catalog: &TrickCatalog, run: &ChallengeRun, settings: &AppSettings) -> Self {
        let outcome = match run.outcome() {
            RunOutcome::InProgress => "in progress",
            RunOutcome::Completed => "completed",
            RunOutcome::Failed => "failed",
        };
        Self {
            challenge: catalog
                .challenge(run.challenge())
                .map(|c| ChallengeResponse::new(catalog, c, settings)),
            outcome,
            lives: run.lives(),
            letters: run.letters(),
            next_trick: run
                .current_trick(catalog)
                .and_then(|(_, id)| catalog.display_name(id, settings)),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SettingsResponse {
    #[serde(flatten)]
    pub settings: AppSettings,
    pub categories: Vec<String>,
    pub min_difficulty: u8,
    pub max_difficulty: u8,
    pub allow_landed: bool,
}

impl SettingsResponse {
    pub fn new(settings: &AppSettings, selector: &TrickSelector) -> Self {
        let (min_difficulty, max_difficulty) = selector.difficulty_range();
        Self {
            settings: *settings,
            categories: selector.categories().to_vec(),
            min_difficulty,
            max_difficulty,
            allow_landed: selector.allow_landed(),
        }
    }
}
