//! Application facade.
//!
//! Owns the loaded content, the user's preferences, the trick picker and
//! any challenge attempt, and keeps the save file in step with them. Every
//! mutation schedules a debounced save; the owner drives it with `tick`.

use crate::autosave::Debouncer;
use crate::catalog::TrickCatalog;
use crate::challenge::{ChallengeRun, RunOutcome};
use crate::config::AppConfig;
use crate::db::{install_content_db, Database};
use crate::error::AppError;
use crate::models::{ChallengeId, TrickId, TrickStatus};
use crate::save::{load_from_path, save_to_path, SaveData};
use crate::selector::TrickSelector;
use crate::settings::AppSettings;
use log::{error, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::Instant;

pub struct SkateSpin {
    config: AppConfig,
    catalog: TrickCatalog,
    settings: AppSettings,
    selector: TrickSelector,
    run: Option<ChallengeRun>,
    autosave: Debouncer,
    rng: StdRng,
}

impl SkateSpin {
    pub fn open(config: AppConfig) -> Result<Self, AppError> {
        Self::open_with_rng(config, StdRng::from_entropy())
    }

    /// Install the content, load it and restore the save file.
    pub fn open_with_rng(config: AppConfig, rng: StdRng) -> Result<Self, AppError> {
        let content_db = config.content_db_path();
        install_content_db(&config.content_source, &content_db)?;
        let db = Database::open_read_only(&content_db)?;
        let catalog = TrickCatalog::load(db.connection())?;
        drop(db);

        let selector = TrickSelector::new(&catalog);
        let mut app = Self {
            autosave: Debouncer::new(config.autosave_delay),
            config,
            catalog,
            settings: AppSettings::default(),
            selector,
            run: None,
            rng,
        };

        match load_from_path(&app.config.save_path()) {
            Ok(Some(data)) => {
                let summary = data.apply(&mut app.catalog, &mut app.settings, &mut app.selector);
                if summary.skipped > 0 {
                    warn!("{} saved records no longer match the content", summary.skipped);
                }
            }
            Ok(None) => info!("Starting without saved progress"),
            // Refuse to run, and later overwrite, a save from a newer build
            Err(e @ AppError::UnsupportedSaveVersion { .. }) => return Err(e),
            Err(e) => error!("Ignoring unreadable save file: {e}"),
        }

        app.selector.recalculate(&app.catalog, &mut app.rng);
        Ok(app)
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn catalog(&self) -> &TrickCatalog {
        &self.catalog
    }

    pub fn settings(&self) -> &AppSettings {
        &self.settings
    }

    pub fn selector(&self) -> &TrickSelector {
        &self.selector
    }

    pub fn active_run(&self) -> Option<&ChallengeRun> {
        self.run.as_ref()
    }

    pub fn save_pending(&self) -> bool {
        self.autosave.is_pending()
    }

    fn changed(&mut self, now: Instant) {
        self.autosave.request(now);
    }

    // ── Tricks ─────────────────────────────────────────────────────

    /// Count a land on a trick. Returns the new land count.
    pub fn land_trick(&mut self, id: TrickId, now: Instant) -> Result<u32, AppError> {
        let lands = self.catalog.record_land(id)?;
        self.selector.prune(&self.catalog);
        self.changed(now);
        Ok(lands)
    }

    /// Returns the previous status.
    pub fn set_status(&mut self, id: TrickId, status: TrickStatus, now: Instant) -> Result<TrickStatus, AppError> {
        let previous = self.catalog.set_status(id, status)?;
        self.selector.prune(&self.catalog);
        self.changed(now);
        Ok(previous)
    }

    /// Returns the new status.
    pub fn cycle_status(&mut self, id: TrickId, now: Instant) -> Result<TrickStatus, AppError> {
        let status = self.catalog.cycle_status(id)?;
        self.selector.prune(&self.catalog);
        self.changed(now);
        Ok(status)
    }

    /// Returns the previous difficulty.
    pub fn set_difficulty(&mut self, id: TrickId, difficulty: u8, now: Instant) -> Result<u8, AppError> {
        let previous = self.catalog.set_difficulty(id, difficulty)?;
        self.selector.prune(&self.catalog);
        self.changed(now);
        Ok(previous)
    }

    // ── Picker ─────────────────────────────────────────────────────

    pub fn suggestion(&self) -> Option<TrickId> {
        self.selector.current()
    }

    pub fn next_suggestion(&mut self) -> Option<TrickId> {
        self.selector.next()
    }

    pub fn previous_suggestion(&mut self) -> Option<TrickId> {
        self.selector.previous()
    }

    pub fn reshuffle(&mut self) {
        self.selector.recalculate(&self.catalog, &mut self.rng);
    }

    pub fn land_suggestion(&mut self, now: Instant) -> Result<Option<TrickId>, AppError> {
        let landed = self.selector.land_current(&mut self.catalog)?;
        if landed.is_some() {
            self.changed(now);
        }
        Ok(landed)
    }

    pub fn ban_suggestion(&mut self, now: Instant) -> Result<Option<TrickId>, AppError> {
        let banned = self.selector.ban_current(&mut self.catalog)?;
        if banned.is_some() {
            self.changed(now);
        }
        Ok(banned)
    }

    /// Returns false when the change was refused.
    pub fn toggle_category(&mut self, category: &str, on: bool, now: Instant) -> Result<bool, AppError> {
        let applied = self.selector.toggle_category(&self.catalog, category, on)?;
        if applied {
            self.reshuffle();
            self.changed(now);
        }
        Ok(applied)
    }

    pub fn set_difficulty_range(&mut self, min: u8, max: u8, now: Instant) -> Result<(), AppError> {
        self.selector.set_difficulty_range(min, max)?;
        self.reshuffle();
        self.changed(now);
        Ok(())
    }

    pub fn set_allow_landed(&mut self, allow: bool, now: Instant) {
        self.selector.set_allow_landed(allow);
        self.reshuffle();
        self.changed(now);
    }

    // ── Display settings ───────────────────────────────────────────

    pub fn set_use_short_trick_names(&mut self, on: bool, now: Instant) {
        self.settings.use_short_trick_names = on;
        self.changed(now);
    }

    pub fn set_alternate_trick_names(&mut self, on: bool, now: Instant) {
        self.settings.alternate_trick_names_enabled = on;
        self.changed(now);
    }

    // ── Challenges ─────────────────────────────────────────────────

    /// Start or resume an attempt, replacing any active one. A replaced
    /// attempt keeps its landed tricks.
    pub fn start_challenge(&mut self, id: ChallengeId, lives: Option<u8>) -> Result<&ChallengeRun, AppError> {
        let run = ChallengeRun::start(&self.catalog, id, lives)?;
        Ok(&*self.run.insert(run))
    }

    fn active_run_mut(&mut self) -> Result<&mut ChallengeRun, AppError> {
        self.run.as_mut().ok_or_else(|| AppError::not_found("Active challenge"))
    }

    pub fn land_challenge_trick(&mut self, now: Instant) -> Result<RunOutcome, AppError> {
        let mut run = self.active_run_mut()?.clone();
        let outcome = run.land(&mut self.catalog)?;
        self.finish_step(run, outcome, now);
        Ok(outcome)
    }

    pub fn miss_challenge_trick(&mut self, now: Instant) -> Result<RunOutcome, AppError> {
        let mut run = self.active_run_mut()?.clone();
        let outcome = run.miss(&mut self.catalog)?;
        self.finish_step(run, outcome, now);
        Ok(outcome)
    }

    fn finish_step(&mut self, run: ChallengeRun, outcome: RunOutcome, now: Instant) {
        self.selector.prune(&self.catalog);
        self.run = (outcome == RunOutcome::InProgress).then_some(run);
        self.changed(now);
    }

    /// Give up the active attempt, forgetting its landed tricks.
    pub fn abandon_challenge(&mut self, now: Instant) -> Result<(), AppError> {
        let run = self.run.take().ok_or_else(|| AppError::not_found("Active challenge"))?;
        run.abandon(&mut self.catalog)?;
        self.changed(now);
        Ok(())
    }

    // ── Persistence ────────────────────────────────────────────────

    /// Save if the debounce delay has run out. Returns whether a save happened.
    pub fn tick(&mut self, now: Instant) -> Result<bool, AppError> {
        if !self.autosave.poll(now) {
            return Ok(false);
        }
        self.write_save()?;
        Ok(true)
    }

    /// Save now, dropping any pending debounce.
    pub fn flush(&mut self) -> Result<(), AppError> {
        self.autosave.cancel();
        self.write_save()
    }

    fn write_save(&self) -> Result<(), AppError> {
        let data = SaveData::capture(&self.catalog, &self.settings, &self.selector);
        save_to_path(&data, &self.config.save_path())
    }

    /// Forget all progress and preferences, and save the empty state at once.
    pub fn clear_saved_data(&mut self) -> Result<(), AppError> {
        info!("Clearing saved data");
        self.run = None;
        self.catalog.reset_progress();
        self.settings.reset();
        self.selector.reset(&self.catalog);
        self.selector.recalculate(&self.catalog, &mut self.rng);
        self.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::CONTENT_DB_NAME;
    use crate::test_utils::setup_content_db;
    use std::time::Duration;
    use tempfile::TempDir;

    fn open_app() -> (SkateSpin, TempDir) {
        let (db, dir) = setup_content_db();
        drop(db);
        let config = AppConfig::new(dir.path().join(CONTENT_DB_NAME), dir.path().join("data")).unwrap();
        let app = SkateSpin::open_with_rng(config, StdRng::seed_from_u64(11)).unwrap();
        (app, dir)
    }

    fn reopen(app: &SkateSpin) -> SkateSpin {
        SkateSpin::open_with_rng(app.config().clone(), StdRng::seed_from_u64(11)).unwrap()
    }

    #[test]
    fn test_open_installs_content() {
        let (app, _dir) = open_app();
        assert!(app.config().content_db_path().exists());
        assert_eq!(app.catalog().len(), 14);
        assert_eq!(app.selector().pool().len(), 9);
        assert!(!app.save_pending());
    }

    #[test]
    fn test_mutations_debounce_save() {
        let (mut app, _dir) = open_app();
        let start = Instant::now();
        let ollie = app.catalog().find_by_name("Flat Ground", "Ollie").unwrap();

        app.land_trick(ollie, start).unwrap();
        assert!(app.save_pending());
        assert!(!app.tick(start + Duration::from_secs(1)).unwrap());
        assert!(!app.config().save_path().exists());

        app.set_difficulty(ollie, 2, start + Duration::from_secs(2)).unwrap();
        assert!(!app.tick(start + Duration::from_secs(4)).unwrap());
        assert!(app.tick(start + Duration::from_secs(5)).unwrap());
        assert!(app.config().save_path().exists());
        assert!(!app.selector().pool().contains(&ollie));

        let reopened = reopen(&app);
        let trick = reopened.catalog().trick(ollie).unwrap();
        assert!(trick.is_landed());
        assert_eq!(trick.lands, 1);
        assert_eq!(trick.difficulty, 2);
    }

    #[test]
    fn test_selector_settings_persist() {
        let (mut app, _dir) = open_app();
        let now = Instant::now();
        assert!(app.toggle_category("Ledge", true, now).unwrap());
        app.set_difficulty_range(2, 3, now).unwrap();
        app.set_allow_landed(true, now);
        app.set_use_short_trick_names(true, now);
        app.flush().unwrap();
        assert!(!app.save_pending());

        let reopened = reopen(&app);
        assert_eq!(reopened.selector().categories(), ["Flat Ground", "Ledge"]);
        assert_eq!(reopened.selector().difficulty_range(), (2, 3));
        assert!(reopened.selector().allow_landed());
        assert!(reopened.settings().use_short_trick_names);
        assert_eq!(reopened.selector().pool().len(), 5);
    }

    #[test]
    fn test_challenge_attempt_survives_restart() {
        let (mut app, _dir) = open_app();
        let now = Instant::now();
        let alice = app.catalog().find_challenge_by_name("Flip Line", Some("Alice")).unwrap();

        app.start_challenge(alice, Some(3)).unwrap();
        assert_eq!(app.land_challenge_trick(now).unwrap(), RunOutcome::InProgress);
        assert_eq!(app.miss_challenge_trick(now).unwrap(), RunOutcome::InProgress);
        assert_eq!(app.active_run().unwrap().letters(), "S");
        app.flush().unwrap();

        let mut reopened = reopen(&app);
        assert!(reopened.active_run().is_none());
        assert!(reopened.catalog().challenge(alice).unwrap().landed.contains(0));

        reopened.start_challenge(alice, None).unwrap();
        reopened.land_challenge_trick(now).unwrap();
        assert_eq!(reopened.land_challenge_trick(now).unwrap(), RunOutcome::Completed);
        assert!(reopened.active_run().is_none());
        assert!(reopened.catalog().challenge(alice).unwrap().completed);
    }

    #[test]
    fn test_abandon_without_run_is_an_error() {
        let (mut app, _dir) = open_app();
        assert!(matches!(app.abandon_challenge(Instant::now()), Err(AppError::NotFound { .. })));
        assert!(app.land_challenge_trick(Instant::now()).is_err());
    }

    #[test]
    fn test_clear_saved_data() {
        let (mut app, _dir) = open_app();
        let now = Instant::now();
        app.land_suggestion(now).unwrap().unwrap();
        app.set_alternate_trick_names(true, now);
        app.clear_saved_data().unwrap();

        assert!(!app.save_pending());
        assert_eq!(app.catalog().progress().overall().landed, 0);
        assert_eq!(*app.settings(), AppSettings::default());

        let reopened = reopen(&app);
        assert!(reopened.catalog().tricks().all(|t| !t.has_progress()));
    }

    #[test]
    fn test_newer_save_version_refuses_to_open() {
        let (app, _dir) = open_app();
        std::fs::write(app.config().save_path(), 99u32.to_le_bytes()).unwrap();
        let result = SkateSpin::open_with_rng(app.config().clone(), StdRng::seed_from_u64(1));
        assert!(matches!(result, Err(AppError::UnsupportedSaveVersion { found: 99, .. })));
    }

    #[test]
    fn test_corrupt_save_starts_fresh() {
        let (app, _dir) = open_app();
        std::fs::write(app.config().save_path(), [1u8, 0]).unwrap();
        let reopened = reopen(&app);
        assert_eq!(reopened.catalog().progress().overall().landed, 0);
    }
}
