use std::fs;
use std::io;
use std::path::Path;

/// Returns the names of the entries in `dir`, sorted.
pub fn list_directory(dir: &Path) -> io::Result<Vec<String>> {
    let mut names = fs::read_dir(dir)?
        .map(|entry| entry.map(|e| e.file_name().to_string_lossy().into_owned()))
        .collect::<io::Result<Vec<_>>>()?;
    names.sort();
    Ok(names)
}
