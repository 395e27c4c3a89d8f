//! Challenge browsing and attempts.

use crate::catalog::TrickCatalog;
use crate::constants::{SKATE_LETTERS, SKATE_LIVES};
use crate::error::AppError;
use crate::models::{ChallengeData, ChallengeId, LandedSet, TrickId};
use crate::validation::validate_lives;
use log::{debug, info};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Restriction {
    #[default]
    All,
    Complete,
    Incomplete,
}

impl Restriction {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "all" => Some(Restriction::All),
            "complete" | "completed" => Some(Restriction::Complete),
            "incomplete" => Some(Restriction::Incomplete),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChallengeFilter {
    pub restriction: Restriction,
    pub text: String,
}

impl ChallengeFilter {
    pub fn matches(&self, challenge: &ChallengeData) -> bool {
        let restriction_ok = match self.restriction {
            Restriction::All => true,
            Restriction::Complete => challenge.completed,
            Restriction::Incomplete => !challenge.completed,
        };
        if !restriction_ok {
            return false;
        }
        if self.text.is_empty() {
            return true;
        }
        let needle = self.text.to_lowercase();
        challenge.name.to_lowercase().contains(&needle) || challenge.person.to_lowercase().contains(&needle)
    }
}

/// Challenges matching a filter, grouped by challenge name.
#[derive(Debug, Clone, PartialEq)]
pub struct ChallengeListing<'a> {
    pub name: &'a str,
    pub defenders: Vec<&'a ChallengeData>,
}

/// Matching challenges grouped by category, in first-seen order. Categories
/// and groups with nothing visible are left out.
pub fn list_by_category<'a>(catalog: &'a TrickCatalog, filter: &ChallengeFilter) -> Vec<(&'a str, Vec<ChallengeListing<'a>>)> {
    let mut listing: Vec<(&'a str, Vec<ChallengeListing<'a>>)> = Vec::new();

    for group in catalog.challenge_groups() {
        let defenders: Vec<&ChallengeData> = group
            .members
            .iter()
            .filter_map(|&id| catalog.challenge(id))
            .filter(|c| filter.matches(c))
            .collect();
        if defenders.is_empty() {
            continue;
        }

        let entry = ChallengeListing { name: group.name.as_str(), defenders };
        match listing.iter_mut().find(|(category, _)| *category == group.category) {
            Some((_, groups)) => groups.push(entry),
            None => listing.push((group.category.as_str(), vec![entry])),
        }
    }

    listing
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    InProgress,
    Completed,
    Failed,
}

/// One attempt at a challenge. Landed tricks are stored on the challenge
/// itself so an unfinished attempt survives a restart; lives do not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChallengeRun {
    challenge: ChallengeId,
    lives: Option<u8>,
    max_lives: u8,
    outcome: RunOutcome,
}

impl ChallengeRun {
    /// Begin or resume an attempt. `lives` of `None` means unlimited tries.
    pub fn start(catalog: &TrickCatalog, id: ChallengeId, lives: Option<u8>) -> Result<Self, AppError> {
        let challenge = catalog
            .challenge(id)
            .ok_or_else(|| AppError::not_found(format!("Challenge #{}", id.0)))?;
        if challenge.completed {
            return Err(AppError::InvalidInput {
                field: "challenge",
                reason: format!("'{}' against {} is already complete", challenge.name, challenge.person),
            });
        }
        if let Some(lives) = lives {
            validate_lives(lives)?;
        }

        info!("Starting challenge '{}' against {}", challenge.name, challenge.person);
        Ok(Self {
            challenge: id,
            lives,
            max_lives: lives.unwrap_or(SKATE_LIVES),
            outcome: RunOutcome::InProgress,
        })
    }

    pub fn challenge(&self) -> ChallengeId {
        self.challenge
    }

    pub fn outcome(&self) -> RunOutcome {
        self.outcome
    }

    pub fn lives(&self) -> Option<u8> {
        self.lives
    }

    /// Letters earned so far, e.g. `"SK"` after two misses.
    pub fn letters(&self) -> &'static str {
        let Some(lives) = self.lives else {
            return "";
        };
        let earned = usize::from(self.max_lives.saturating_sub(lives));
        SKATE_LETTERS.get(..earned).unwrap_or(SKATE_LETTERS)
    }

    /// Position and id of the next trick to land.
    pub fn current_trick(&self, catalog: &TrickCatalog) -> Option<(usize, TrickId)> {
        let challenge = catalog.challenge(self.challenge)?;
        let position = challenge.landed.first_unset(challenge.tricks.len())?;
        challenge.tricks.get(position).map(|&id| (position, id))
    }

    /// Land the current trick. Completes the challenge once every trick is landed.
    pub fn land(&mut self, catalog: &mut TrickCatalog) -> Result<RunOutcome, AppError> {
        if self.outcome != RunOutcome::InProgress {
            return Ok(self.outcome);
        }
        let Some((position, trick)) = self.current_trick(catalog) else {
            return self.finish(catalog);
        };

        catalog.record_land(trick)?;
        let mut landed = catalog
            .challenge(self.challenge)
            .map(|c| c.landed)
            .unwrap_or_default();
        landed.set(position);
        catalog.set_challenge_landed(self.challenge, landed)?;
        debug!("Challenge #{} landed trick {position}", self.challenge.0);

        if self.current_trick(catalog).is_none() {
            return self.finish(catalog);
        }
        Ok(self.outcome)
    }

    /// Miss the current trick. Costs a life when playing with lives.
    pub fn miss(&mut self, catalog: &mut TrickCatalog) -> Result<RunOutcome, AppError> {
        if self.outcome != RunOutcome::InProgress {
            return Ok(self.outcome);
        }
        if let Some(lives) = self.lives.as_mut() {
            *lives = lives.saturating_sub(1);
            if *lives == 0 {
                info!("Challenge #{} failed", self.challenge.0);
                self.outcome = RunOutcome::Failed;
                self.clear_attempt(catalog)?;
            }
        }
        Ok(self.outcome)
    }

    /// Give up, forgetting the tricks landed in this attempt.
    pub fn abandon(self, catalog: &mut TrickCatalog) -> Result<(), AppError> {
        info!("Challenge #{} abandoned", self.challenge.0);
        self.clear_attempt(catalog)
    }

    fn clear_attempt(&self, catalog: &mut TrickCatalog) -> Result<(), AppError> {
        catalog.set_challenge_landed(self.challenge, LandedSet::default())
    }

    fn finish(&mut self, catalog: &mut TrickCatalog) -> Result<RunOutcome, AppError> {
        catalog.set_challenge_completed(self.challenge, true)?;
        self.outcome = RunOutcome::Completed;
        info!("Challenge #{} completed", self.challenge.0);
        Ok(self.outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TrickStatus;
    use crate::test_utils::setup_catalog;

    fn alice(catalog: &TrickCatalog) -> ChallengeId {
        catalog.find_challenge_by_name("Flip Line", Some("Alice")).unwrap()
    }

    #[test]
    fn test_filter_by_restriction_and_text() {
        let (mut catalog, _dir) = setup_catalog();
        let id = alice(&catalog);
        catalog.set_challenge_completed(id, true).unwrap();
        let challenge = catalog.challenge(id).unwrap();

        let mut filter = ChallengeFilter::default();
        assert!(filter.matches(challenge));

        filter.restriction = Restriction::Incomplete;
        assert!(!filter.matches(challenge));

        filter.restriction = Restriction::Complete;
        filter.text = "ALI".into();
        assert!(filter.matches(challenge));

        filter.text = "line".into();
        assert!(filter.matches(challenge));

        filter.text = "carol".into();
        assert!(!filter.matches(challenge));
    }

    #[test]
    fn test_restriction_parse() {
        assert_eq!(Restriction::parse("Complete"), Some(Restriction::Complete));
        assert_eq!(Restriction::parse("incomplete"), Some(Restriction::Incomplete));
        assert_eq!(Restriction::parse("all"), Some(Restriction::All));
        assert_eq!(Restriction::parse("some"), None);
    }

    #[test]
    fn test_list_by_category_omits_empty() {
        let (catalog, _dir) = setup_catalog();

        let all = list_by_category(&catalog, &ChallengeFilter::default());
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].0, "Flat Ground");
        assert_eq!(all[0].1[0].defenders.len(), 2);

        let filter = ChallengeFilter { restriction: Restriction::All, text: "carol".into() };
        let carol = list_by_category(&catalog, &filter);
        assert_eq!(carol.len(), 1);
        assert_eq!(carol[0].0, "Ledge");
        assert_eq!(carol[0].1[0].name, "Ledge Basics");

        let none = list_by_category(&catalog, &ChallengeFilter { restriction: Restriction::Complete, text: String::new() });
        assert!(none.is_empty());
    }

    #[test]
    fn test_run_lands_tricks_in_order_and_completes() {
        let (mut catalog, _dir) = setup_catalog();
        let id = alice(&catalog);
        let mut run = ChallengeRun::start(&catalog, id, None).unwrap();

        let (pos, first) = run.current_trick(&catalog).unwrap();
        assert_eq!(pos, 0);
        assert_eq!(catalog.trick(first).unwrap().name, "Ollie");

        assert_eq!(run.land(&mut catalog).unwrap(), RunOutcome::InProgress);
        assert_eq!(run.land(&mut catalog).unwrap(), RunOutcome::InProgress);
        assert_eq!(catalog.challenge(id).unwrap().landed.count(), 2);
        assert_eq!(run.land(&mut catalog).unwrap(), RunOutcome::Completed);

        let challenge = catalog.challenge(id).unwrap();
        assert!(challenge.completed);
        assert_eq!(catalog.trick(first).unwrap().status, TrickStatus::Landed);
        assert!(ChallengeRun::start(&catalog, id, None).is_err());
    }

    #[test]
    fn test_run_resumes_persisted_attempt() {
        let (mut catalog, _dir) = setup_catalog();
        let id = alice(&catalog);
        let mut run = ChallengeRun::start(&catalog, id, None).unwrap();
        run.land(&mut catalog).unwrap();

        let resumed = ChallengeRun::start(&catalog, id, Some(3)).unwrap();
        assert_eq!(resumed.current_trick(&catalog).unwrap().0, 1);
    }

    #[test]
    fn test_game_of_skate_fails_after_all_letters() {
        let (mut catalog, _dir) = setup_catalog();
        let id = alice(&catalog);
        let mut run = ChallengeRun::start(&catalog, id, Some(SKATE_LIVES)).unwrap();
        run.land(&mut catalog).unwrap();

        for expected in ["S", "SK", "SKA", "SKAT"] {
            assert_eq!(run.miss(&mut catalog).unwrap(), RunOutcome::InProgress);
            assert_eq!(run.letters(), expected);
        }
        assert_eq!(run.miss(&mut catalog).unwrap(), RunOutcome::Failed);
        assert_eq!(run.letters(), "SKATE");
        assert!(catalog.challenge(id).unwrap().landed.is_empty());
        assert!(!catalog.challenge(id).unwrap().completed);

        // Once over, further actions change nothing
        assert_eq!(run.land(&mut catalog).unwrap(), RunOutcome::Failed);
    }

    #[test]
    fn test_short_game_letters() {
        let (mut catalog, _dir) = setup_catalog();
        let mut run = ChallengeRun::start(&catalog, alice(&catalog), Some(2)).unwrap();
        assert_eq!(run.letters(), "");
        run.miss(&mut catalog).unwrap();
        assert_eq!(run.letters(), "S");
        run.miss(&mut catalog).unwrap();
        assert_eq!(run.outcome(), RunOutcome::Failed);
        assert_eq!(run.letters(), "SK");
    }

    #[test]
    fn test_unlimited_lives_never_fail() {
        let (mut catalog, _dir) = setup_catalog();
        let mut run = ChallengeRun::start(&catalog, alice(&catalog), None).unwrap();
        for _ in 0..20 {
            assert_eq!(run.miss(&mut catalog).unwrap(), RunOutcome::InProgress);
        }
        assert_eq!(run.letters(), "");
    }

    #[test]
    fn test_abandon_clears_attempt() {
        let (mut catalog, _dir) = setup_catalog();
        let id = alice(&catalog);
        let mut run = ChallengeRun::start(&catalog, id, None).unwrap();
        run.land(&mut catalog).unwrap();
        run.abandon(&mut catalog).unwrap();
        assert!(catalog.challenge(id).unwrap().landed.is_empty());
    }

    #[test]
    fn test_start_rejects_bad_lives() {
        let (catalog, _dir) = setup_catalog();
        assert!(ChallengeRun::start(&catalog, alice(&catalog), Some(0)).is_err());
        assert!(ChallengeRun::start(&catalog, ChallengeId(99), None).is_err());
    }
}
