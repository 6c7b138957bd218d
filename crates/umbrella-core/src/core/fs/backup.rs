use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Number of existing numbered backups above which a warning is emitted.
const BACKUP_WARN_THRESHOLD: u32 = 10;

/// Moves an existing file or directory out of the way before it is recreated.
///
/// The first free name of the form `#<basename>.<n>#` (with `n` counting up from 1) in
/// the same parent directory is chosen, and `path` is renamed to it. Dangling symlinks
/// count as existing.
///
/// # Return
///
/// `Ok(None)` when `path` does not exist, otherwise the path it was moved to.
///
/// # Errors
///
/// Returns an error if `path` has no file name component or the rename fails.
pub fn backup(path: &Path) -> io::Result<Option<PathBuf>> {
    if !exists_no_follow(path) {
        debug!("Nothing to back up at {:?}", path);
        return Ok(None);
    }

    let base_name = path.file_name().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("Cannot back up a path without a file name: {}", path.display()),
        )
    })?;
    let base_name = base_name.to_string_lossy();
    let parent = path.parent().unwrap_or_else(|| Path::new(""));

    let mut n: u32 = 1;
    let mut warned = false;
    let target = loop {
        let candidate = parent.join(backup_name(&base_name, n));
        if !exists_no_follow(&candidate) {
            break candidate;
        }
        // `#name.1#` through `#name.n#` all exist at this point.
        if n > BACKUP_WARN_THRESHOLD && !warned {
            warn!(
                "More than {} backups of {:?} exist; consider cleaning up.",
                BACKUP_WARN_THRESHOLD, path
            );
            warned = true;
        }
        n += 1;
    };

    fs::rename(path, &target)?;
    info!("Backed up {:?} to {:?}", path, target);
    Ok(Some(target))
}

/// Formats the `n`-th backup name for `base_name`.
pub fn backup_name(base_name: &str, n: u32) -> String {
    format!("#{}.{}#", base_name, n)
}

fn exists_no_follow(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}
