// src/db/install.rs

use crate::error::AppError;
use log::{debug, error, info, warn};
use std::fs;
use std::path::Path;
use std::time::SystemTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallOutcome {
    /// The bundled file was copied into writable storage.
    Copied,
    /// The writable copy is at least as new as the bundled file.
    UpToDate,
    /// No bundled file; the existing writable copy is used as-is.
    SourceMissing,
}

fn modified(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|m| m.modified()).ok()
}

/// Copy the bundled content database to `dest` when `dest` does not exist or
/// `source` has been modified more recently.
pub fn install_content_db(source: &Path, dest: &Path) -> Result<InstallOutcome, AppError> {
    debug!("Installing content database {} -> {}", source.display(), dest.display());

    if !source.exists() {
        if dest.exists() {
            warn!(
                "Bundled content database {} is missing, using existing copy at {}",
                source.display(),
                dest.display()
            );
            return Ok(InstallOutcome::SourceMissing);
        }
        error!("Bundled content database {} does not exist", source.display());
        return Err(AppError::not_found(format!("Content database '{}'", source.display())));
    }

    let needs_copy = match (dest.exists(), modified(source), modified(dest)) {
        (false, _, _) => true,
        (true, Some(src), Some(dst)) => src > dst,
        (true, _, _) => false,
    };

    if !needs_copy {
        return Ok(InstallOutcome::UpToDate);
    }

    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::copy(source, dest)?;
    info!("Copied content database to {}", dest.display());
    Ok(InstallOutcome::Copied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::tempdir;

    #[test]
    fn test_copies_when_destination_missing() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("bundle").join("Database.db");
        let dest = dir.path().join("data").join("Database.db");
        fs::create_dir_all(source.parent().unwrap()).unwrap();
        fs::write(&source, b"content").unwrap();

        let outcome = install_content_db(&source, &dest).unwrap();
        assert_eq!(outcome, InstallOutcome::Copied);
        assert_eq!(fs::read(&dest).unwrap(), b"content");
    }

    #[test]
    fn test_up_to_date_copy_is_kept() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("src.db");
        let dest = dir.path().join("dest.db");
        fs::write(&source, b"new").unwrap();
        fs::write(&dest, b"local").unwrap();

        // Make the destination strictly newer than the source
        let later = SystemTime::now() + Duration::from_secs(60);
        fs::File::options().write(true).open(&dest).unwrap().set_modified(later).unwrap();

        let outcome = install_content_db(&source, &dest).unwrap();
        assert_eq!(outcome, InstallOutcome::UpToDate);
        assert_eq!(fs::read(&dest).unwrap(), b"local");
    }

    #[test]
    fn test_newer_source_replaces_copy() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("src.db");
        let dest = dir.path().join("dest.db");
        fs::write(&dest, b"old").unwrap();
        fs::write(&source, b"updated").unwrap();

        let later = SystemTime::now() + Duration::from_secs(60);
        fs::File::options().write(true).open(&source).unwrap().set_modified(later).unwrap();

        let outcome = install_content_db(&source, &dest).unwrap();
        assert_eq!(outcome, InstallOutcome::Copied);
        assert_eq!(fs::read(&dest).unwrap(), b"updated");
    }

    #[test]
    fn test_missing_source_with_existing_copy() {
        let dir = tempdir().unwrap();
        let dest = dir.path().join("dest.db");
        fs::write(&dest, b"local").unwrap();

        let outcome = install_content_db(&dir.path().join("nope.db"), &dest).unwrap();
        assert_eq!(outcome, InstallOutcome::SourceMissing);
    }

    #[test]
    fn test_missing_source_and_copy_is_an_error() {
        let dir = tempdir().unwrap();
        let result = install_content_db(&dir.path().join("nope.db"), &dir.path().join("dest.db"));
        assert!(matches!(result, Err(AppError::NotFound { .. })));
    }
}
