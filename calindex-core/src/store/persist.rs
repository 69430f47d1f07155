//! Backup-then-rewrite of calendar files.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::CalIndexResult;
use crate::ics::Document;
use crate::source::Source;

/// Sibling path a file is copied to before every rewrite.
pub fn backup_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".backup");
    PathBuf::from(name)
}

/// Copy `path` to its backup, overwriting any previous one.
///
/// Failure is logged and reported as `false`; callers go on with the rewrite.
pub fn create_backup(path: &Path) -> bool {
    let backup = backup_path(path);
    match std::fs::copy(path, &backup) {
        Ok(_) => {
            debug!(path = %path.display(), backup = %backup.display(), "Created backup");
            true
        }
        Err(err) => {
            warn!(path = %path.display(), error = %err, "Could not create backup");
            false
        }
    }
}

/// Back up `path`, decode it fresh from disk, apply `mutate` and write it back.
///
/// Returns the document as written.
pub fn rewrite<F>(path: &Path, mutate: F) -> CalIndexResult<Document>
where
    F: FnOnce(&mut Document) -> CalIndexResult<()>,
{
    create_backup(path);

    let mut document = Source::read_document(path)?;
    mutate(&mut document)?;
    std::fs::write(path, document.to_ics())?;

    Ok(document)
}
