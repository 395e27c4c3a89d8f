use crate::constants::*;
use crate::error::AppError;

/// Validate a trick difficulty (1-10).
pub fn validate_difficulty(difficulty: u8) -> Result<u8, AppError> {
    if !(MIN_DIFFICULTY..=MAX_DIFFICULTY).contains(&difficulty) {
        return Err(AppError::InvalidInput {
            field: "difficulty",
            reason: format!("must be {MIN_DIFFICULTY}-{MAX_DIFFICULTY}, got {difficulty}"),
        });
    }
    Ok(difficulty)
}

/// Validate a difficulty range; both ends inclusive.
pub fn validate_difficulty_range(min: u8, max: u8) -> Result<(u8, u8), AppError> {
    validate_difficulty(min)?;
    validate_difficulty(max)?;
    if min > max {
        return Err(AppError::InvalidInput {
            field: "difficulty range",
            reason: format!("minimum {min} is above maximum {max}"),
        });
    }
    Ok((min, max))
}

/// Validate a difficulty range written as `MIN-MAX` or a single `N`.
pub fn parse_difficulty_range(range: &str) -> Result<(u8, u8), AppError> {
    let err = |reason: &str| AppError::InvalidInput {
        field: "difficulty range",
        reason: reason.into(),
    };

    let (min, max) = match range.split_once('-') {
        Some((min, max)) => (min.trim(), max.trim()),
        None => (range.trim(), range.trim()),
    };
    let min: u8 = min.parse().map_err(|_| err("invalid minimum"))?;
    let max: u8 = max.parse().map_err(|_| err("invalid maximum"))?;
    validate_difficulty_range(min, max)
}

/// Validate the number of lives for a challenge run.
pub fn validate_lives(lives: u8) -> Result<u8, AppError> {
    if lives == 0 || lives > SKATE_LIVES {
        return Err(AppError::InvalidInput {
            field: "lives",
            reason: format!("must be 1-{SKATE_LIVES}"),
        });
    }
    Ok(lives)
}
