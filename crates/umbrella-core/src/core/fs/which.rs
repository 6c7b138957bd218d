use std::env;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::trace;

/// Locates an executable the way a shell would.
///
/// A `program` with a directory component is checked as-is. A bare name is looked up in
/// every entry of the `PATH` environment variable, in order.
pub fn which(program: &str) -> Option<PathBuf> {
    which_in(program, env::var_os("PATH").as_deref())
}

/// Same as [`which`], but searches the given `PATH`-style value instead of the process
/// environment.
pub fn which_in(program: &str, search_path: Option<&OsStr>) -> Option<PathBuf> {
    if program.is_empty() {
        return None;
    }

    let candidate = Path::new(program);
    let has_dir = candidate
        .parent()
        .is_some_and(|p| !p.as_os_str().is_empty());
    if has_dir {
        return is_executable(candidate).then(|| candidate.to_path_buf());
    }

    env::split_paths(search_path?)
        .map(|dir| dir.join(program))
        .inspect(|p| trace!("Probing {:?}", p))
        .find(|p| is_executable(p))
}

/// Returns `true` if `path` is a regular file the current user may execute.
pub fn is_executable(path: &Path) -> bool {
    let Ok(meta) = fs::metadata(path) else {
        return false;
    };
    if !meta.is_file() {
        return false;
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        meta.permissions().mode() & 0o111 != 0
    }

    #[cfg(not(unix))]
    {
        true
    }
}
