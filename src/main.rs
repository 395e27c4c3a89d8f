//! Command-line front end for SkateSpin.
//!
//! Every command opens the data directory, does its work and, when it
//! changed anything, writes the save file before exiting.

#![allow(clippy::print_stdout, reason = "command-line output goes to stdout")]
#![allow(clippy::print_stderr, reason = "fatal errors are reported on stderr")]

use clap::builder::BoolishValueParser;
use clap::{ArgAction, Parser, Subcommand};
use serde::Serialize;
use skatespin::catalog::TrickCatalog;
use skatespin::challenge::{list_by_category, ChallengeFilter, Restriction, RunOutcome};
use skatespin::constants::{DATA_DIR_ENV, SKATE_LIVES};
use skatespin::dto::{
    category_tricks, challenge_groups, ChallengeResponse, ProgressResponse, RunResponse, SettingsResponse,
    TrickResponse,
};
use skatespin::models::{ChallengeId, TrickId, TrickStatus};
use skatespin::validation::parse_difficulty_range;
use skatespin::{AppConfig, AppError, SkateSpin};
use std::io::BufRead;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "skatespin")]
#[command(about = "Track landed skateboarding tricks, pick new ones and play challenges")]
#[command(version)]
struct Cli {
    /// Directory holding the installed content and the save file
    #[arg(long, global = true, env = DATA_DIR_ENV)]
    data_dir: Option<PathBuf>,

    /// Bundled content database to install from
    #[arg(long, global = true)]
    content: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Print machine-readable JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List tricks grouped by difficulty
    Tricks {
        /// Only this category (defaults to every category)
        #[arg(long)]
        category: Option<String>,
    },

    /// Show completion per category and difficulty
    Progress,

    /// Count a land on a trick
    Land {
        name: String,
        #[arg(long)]
        category: Option<String>,
    },

    /// Ban a trick so it is never suggested
    Ban {
        name: String,
        #[arg(long)]
        category: Option<String>,
    },

    /// Set a trick's status, or cycle it when no status is given
    Status {
        name: String,
        /// default, landed or banned
        status: Option<String>,
        #[arg(long)]
        category: Option<String>,
    },

    /// Re-rate a trick
    Difficulty {
        name: String,
        difficulty: u8,
        #[arg(long)]
        category: Option<String>,
    },

    /// Suggest random tricks from the selected categories and range
    Suggest {
        #[arg(short = 'n', long, default_value_t = 1)]
        count: usize,
    },

    /// Turn a category on or off for suggestions
    SelectCategory {
        category: String,
        #[arg(long)]
        off: bool,
    },

    /// Set the suggestion difficulty range, e.g. `2-5` or `4`
    Range { range: String },

    /// Whether landed tricks may be suggested
    AllowLanded {
        #[arg(action = ArgAction::Set, value_parser = BoolishValueParser::new())]
        allow: bool,
    },

    /// List challenges by category
    Challenges {
        /// Match challenge name or defender
        #[arg(long)]
        filter: Option<String>,
        /// all, complete or incomplete
        #[arg(long, default_value = "all")]
        restriction: String,
    },

    /// Work on a single challenge
    Challenge {
        name: String,
        /// Defender, when several people defend the same challenge
        #[arg(long)]
        person: Option<String>,
        #[command(subcommand)]
        action: Option<ChallengeAction>,
    },

    /// Show or change display settings
    Settings {
        #[arg(long, value_parser = BoolishValueParser::new())]
        short_names: Option<bool>,
        #[arg(long, value_parser = BoolishValueParser::new())]
        alternate_names: Option<bool>,
    },

    /// Forget all progress and settings
    Reset {
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand, Clone, Copy)]
enum ChallengeAction {
    /// Show the saved attempt
    Show,
    /// Land the next trick of the attempt
    Land,
    /// Forget the tricks landed in the attempt
    Abandon,
    /// Play a game of S-K-A-T-E on stdin: `l` to land, `m` to miss, `q` to quit
    Play {
        #[arg(long, default_value_t = SKATE_LIVES)]
        lives: u8,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), AppError> {
    let config = AppConfig::resolve(cli.data_dir, cli.content)?;
    let mut app = SkateSpin::open(config)?;
    let json = cli.json;

    let mutated = match cli.command {
        Commands::Tricks { category } => {
            show_tricks(&app, category.as_deref(), json)?;
            false
        }
        Commands::Progress => {
            show_progress(&app, json)?;
            false
        }
        Commands::Land { name, category } => {
            let id = resolve_trick(app.catalog(), &name, category.as_deref())?;
            app.land_trick(id, Instant::now())?;
            show_trick(&app, id, json)?;
            true
        }
        Commands::Ban { name, category } => {
            let id = resolve_trick(app.catalog(), &name, category.as_deref())?;
            app.set_status(id, TrickStatus::Banned, Instant::now())?;
            show_trick(&app, id, json)?;
            true
        }
        Commands::Status { name, status, category } => {
            let id = resolve_trick(app.catalog(), &name, category.as_deref())?;
            match status {
                Some(status) => {
                    let status = TrickStatus::parse(&status).ok_or_else(|| AppError::InvalidInput {
                        field: "status",
                        reason: format!("expected default, landed or banned, got '{status}'"),
                    })?;
                    app.set_status(id, status, Instant::now())?;
                }
                None => {
                    app.cycle_status(id, Instant::now())?;
                }
            }
            show_trick(&app, id, json)?;
            true
        }
        Commands::Difficulty { name, difficulty, category } => {
            let id = resolve_trick(app.catalog(), &name, category.as_deref())?;
            app.set_difficulty(id, difficulty, Instant::now())?;
            show_trick(&app, id, json)?;
            true
        }
        Commands::Suggest { count } => {
            suggest(&mut app, count, json)?;
            false
        }
        Commands::SelectCategory { category, off } => {
            if !app.toggle_category(&category, !off, Instant::now())? {
                log::warn!("At least one category must stay selected");
            }
            show_settings(&app, json)?;
            true
        }
        Commands::Range { range } => {
            let (min, max) = parse_difficulty_range(&range)?;
            app.set_difficulty_range(min, max, Instant::now())?;
            show_settings(&app, json)?;
            true
        }
        Commands::AllowLanded { allow } => {
            app.set_allow_landed(allow, Instant::now());
            show_settings(&app, json)?;
            true
        }
        Commands::Challenges { filter, restriction } => {
            let restriction = Restriction::parse(&restriction).ok_or_else(|| AppError::InvalidInput {
                field: "restriction",
                reason: format!("expected all, complete or incomplete, got '{restriction}'"),
            })?;
            let filter = ChallengeFilter {
                restriction,
                text: filter.unwrap_or_default(),
            };
            show_challenges(&app, &filter, json)?;
            false
        }
        Commands::Challenge { name, person, action } => {
            let id = app
                .catalog()
                .find_challenge_by_name(&name, person.as_deref())
                .ok_or_else(|| AppError::not_found(format!("Challenge '{name}'")))?;
            challenge(&mut app, id, action.unwrap_or(ChallengeAction::Show), json)?
        }
        Commands::Settings { short_names, alternate_names } => {
            let now = Instant::now();
            if let Some(on) = short_names {
                app.set_use_short_trick_names(on, now);
            }
            if let Some(on) = alternate_names {
                app.set_alternate_trick_names(on, now);
            }
            show_settings(&app, json)?;
            short_names.is_some() || alternate_names.is_some()
        }
        Commands::Reset { yes } => {
            if !yes {
                return Err(AppError::InvalidInput {
                    field: "reset",
                    reason: "pass --yes to erase all progress".into(),
                });
            }
            app.clear_saved_data()?;
            if json {
                show_settings(&app, json)?;
            } else {
                println!("All progress cleared");
            }
            false
        }
    };

    if mutated {
        app.flush()?;
    }
    Ok(())
}

/// Find a trick by name, in one category or across all of them.
fn resolve_trick(catalog: &TrickCatalog, name: &str, category: Option<&str>) -> Result<TrickId, AppError> {
    if let Some(category) = category {
        return catalog
            .find_by_name(category, name)
            .ok_or_else(|| AppError::not_found(format!("Trick '{name}' in {category}")));
    }
    match catalog.find_all_by_name(name).as_slice() {
        [] => Err(AppError::not_found(format!("Trick '{name}'"))),
        [id] => Ok(*id),
        ids => {
            let categories: Vec<&str> = ids
                .iter()
                .filter_map(|&id| catalog.trick(id))
                .map(|t| t.category.as_str())
                .collect();
            Err(AppError::InvalidInput {
                field: "trick",
                reason: format!("'{name}' exists in {}; pass --category", categories.join(", ")),
            })
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), AppError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn status_marker(status: &str) -> &'static str {
    match status {
        "landed" => "[x]",
        "banned" => "[-]",
        _ => "[ ]",
    }
}

fn show_trick(app: &SkateSpin, id: TrickId, json: bool) -> Result<(), AppError> {
    let trick = app
        .catalog()
        .trick(id)
        .ok_or_else(|| AppError::not_found(format!("Trick #{}", id.0)))?;
    let response = TrickResponse::new(app.catalog(), trick, app.settings());
    if json {
        return print_json(&response);
    }
    println!(
        "{} {} ({}, {} {}) lands: {}",
        status_marker(response.status),
        response.name,
        response.category,
        response.difficulty,
        response.difficulty_name,
        response.lands
    );
    Ok(())
}

fn show_tricks(app: &SkateSpin, category: Option<&str>, json: bool) -> Result<(), AppError> {
    let catalog = app.catalog();
    let categories: Vec<&str> = match category {
        Some(category) if catalog.has_category(category) => vec![category],
        Some(category) => return Err(AppError::not_found(format!("Category '{category}'"))),
        None => catalog.categories().iter().map(String::as_str).collect(),
    };

    if json {
        let listing: Vec<(&str, _)> = categories
            .iter()
            .map(|&c| (c, category_tricks(catalog, c, app.settings())))
            .collect();
        return print_json(&listing);
    }

    for category in categories {
        let percent = catalog.progress().category(category).map_or(0, |d| d.tally().percent());
        println!("{category} ({percent}%)");
        for group in category_tricks(catalog, category, app.settings()) {
            println!("  {} {} ({}%)", group.difficulty, group.name, group.percent);
            for trick in group.tricks {
                let lands = if trick.lands > 0 { format!("  x{}", trick.lands) } else { String::new() };
                println!("    {} {}{lands}", status_marker(trick.status), trick.name);
            }
        }
    }
    Ok(())
}

fn show_progress(app: &SkateSpin, json: bool) -> Result<(), AppError> {
    let response = ProgressResponse::new(app.catalog());
    if json {
        return print_json(&response);
    }
    println!(
        "Overall: {}/{} ({}%)",
        response.overall.landed, response.overall.total, response.overall.percent
    );
    for category in &response.categories {
        println!(
            "{}: {}/{} ({}%)",
            category.category, category.tally.landed, category.tally.total, category.tally.percent
        );
        for (difficulty, tally) in &category.per_difficulty {
            let name = app.catalog().difficulty_name(*difficulty).unwrap_or_default();
            println!("  {difficulty} {name}: {}/{} ({}%)", tally.landed, tally.total, tally.percent);
        }
    }
    Ok(())
}

fn suggest(app: &mut SkateSpin, count: usize, json: bool) -> Result<(), AppError> {
    let mut picks = Vec::new();
    let mut next = app.suggestion();
    while let Some(id) = next {
        if picks.len() >= count || picks.contains(&id) {
            break;
        }
        picks.push(id);
        next = app.next_suggestion();
    }

    let catalog = app.catalog();
    let responses: Vec<TrickResponse> = picks
        .iter()
        .filter_map(|&id| catalog.trick(id))
        .map(|t| TrickResponse::new(catalog, t, app.settings()))
        .collect();
    if json {
        return print_json(&responses);
    }
    if responses.is_empty() {
        println!("No tricks match the current selection");
    }
    for trick in responses {
        println!("{} ({}, {})", trick.name, trick.category, trick.difficulty_name);
    }
    Ok(())
}

fn show_challenges(app: &SkateSpin, filter: &ChallengeFilter, json: bool) -> Result<(), AppError> {
    let listing = list_by_category(app.catalog(), filter);
    let groups = challenge_groups(app.catalog(), &listing, app.settings());
    if json {
        return print_json(&groups);
    }
    let mut last_category = "";
    for group in &groups {
        if group.category != last_category {
            println!("{}", group.category);
            last_category = group.category.as_str();
        }
        println!("  {}", group.name);
        for defender in &group.defenders {
            let state = if defender.completed { "done".to_string() } else { format!("{}%", defender.percent) };
            println!("    vs {} ({state})", defender.person);
        }
    }
    Ok(())
}

fn print_challenge(response: &ChallengeResponse) {
    println!("{} vs {} ({})", response.name, response.person, response.category);
    for trick in &response.tricks {
        println!("  {} {}", if trick.landed { "[x]" } else { "[ ]" }, trick.name);
    }
}

fn print_run(response: &RunResponse) {
    if let Some(challenge) = &response.challenge {
        print_challenge(challenge);
    }
    if let Some(lives) = response.lives {
        println!("Letters: {}  lives left: {lives}", response.letters);
    }
    match &response.next_trick {
        Some(trick) if response.outcome == "in progress" => println!("Next: {trick}"),
        _ => println!("Challenge {}", response.outcome),
    }
}

/// Returns whether anything changed.
fn challenge(app: &mut SkateSpin, id: ChallengeId, action: ChallengeAction, json: bool) -> Result<bool, AppError> {
    let now = Instant::now();
    match action {
        ChallengeAction::Show => {
            let challenge = app
                .catalog()
                .challenge(id)
                .ok_or_else(|| AppError::not_found(format!("Challenge #{}", id.0)))?;
            let response = ChallengeResponse::new(app.catalog(), challenge, app.settings());
            if json {
                print_json(&response)?;
            } else {
                print_challenge(&response);
            }
            Ok(false)
        }
        ChallengeAction::Land => {
            app.start_challenge(id, None)?;
            app.land_challenge_trick(now)?;
            report_run(app, id, json)?;
            Ok(true)
        }
        ChallengeAction::Abandon => {
            app.start_challenge(id, None)?;
            app.abandon_challenge(now)?;
            report_run(app, id, json)?;
            Ok(true)
        }
        ChallengeAction::Play { lives } => {
            app.start_challenge(id, Some(lives))?;
            report_run(app, id, json)?;
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                let outcome = match line?.trim() {
                    "l" | "land" => app.land_challenge_trick(Instant::now())?,
                    "m" | "miss" => app.miss_challenge_trick(Instant::now())?,
                    "q" | "quit" => break,
                    other => {
                        log::warn!("Unknown input '{other}': use l, m or q");
                        continue;
                    }
                };
                report_run(app, id, json)?;
                if outcome != RunOutcome::InProgress {
                    break;
                }
                // Keep progress on disk between throws
                app.tick(Instant::now())?;
            }
            Ok(true)
        }
    }
}

/// Print the active run, or the challenge itself once the run has ended.
fn report_run(app: &SkateSpin, id: ChallengeId, json: bool) -> Result<(), AppError> {
    if let Some(run) = app.active_run() {
        let response = RunResponse::new(app.catalog(), run, app.settings());
        if json {
            return print_json(&response);
        }
        print_run(&response);
        return Ok(());
    }
    challenge_summary(app, id, json)
}

fn challenge_summary(app: &SkateSpin, id: ChallengeId, json: bool) -> Result<(), AppError> {
    let challenge = app
        .catalog()
        .challenge(id)
        .ok_or_else(|| AppError::not_found(format!("Challenge #{}", id.0)))?;
    let response = ChallengeResponse::new(app.catalog(), challenge, app.settings());
    if json {
        return print_json(&response);
    }
    print_challenge(&response);
    if response.completed {
        println!("Challenge completed");
    }
    Ok(())
}

fn show_settings(app: &SkateSpin, json: bool) -> Result<(), AppError> {
    let response = SettingsResponse::new(app.settings(), app.selector());
    if json {
        return print_json(&response);
    }
    println!("Categories: {}", response.categories.join(", "));
    println!("Difficulty: {}-{}", response.min_difficulty, response.max_difficulty);
    println!("Allow landed: {}", response.allow_landed);
    println!("Short trick names: {}", response.settings.use_short_trick_names);
    println!("Alternate trick names: {}", response.settings.alternate_trick_names_enabled);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use skatespin::constants::{CONTENT_DB_NAME, SAVE_FILE_NAME};
    use skatespin::db::Database;
    use tempfile::tempdir;

    #[test]
    fn test_reset_with_json_flag() {
        let dir = tempdir().unwrap();
        let content = dir.path().join(CONTENT_DB_NAME);
        let db = Database::open(&content).unwrap();
        db.create_content_schema().unwrap();
        db.connection()
            .execute_batch(
                "INSERT INTO Categories VALUES ('Flat Ground');
                 INSERT INTO DifficultyNames VALUES (1, 'Beginner');
                 INSERT INTO Tricks VALUES ('Ollie', NULL, 'Flat Ground', 1, NULL, NULL, NULL, 0);",
            )
            .unwrap();
        drop(db);

        let data_dir = dir.path().join("data");
        let cli = Cli::try_parse_from([
            "skatespin",
            "--json",
            "--data-dir",
            data_dir.to_str().unwrap(),
            "--content",
            content.to_str().unwrap(),
            "reset",
            "--yes",
        ])
        .unwrap();
        assert!(cli.json);
        assert!(matches!(cli.command, Commands::Reset { yes: true }));

        run(cli).unwrap();
        assert!(data_dir.join(SAVE_FILE_NAME).exists());
    }

    #[test]
    fn test_reset_requires_confirmation() {
        let cli = Cli::try_parse_from(["skatespin", "reset"]).unwrap();
        assert!(matches!(cli.command, Commands::Reset { yes: false }));
    }
}
