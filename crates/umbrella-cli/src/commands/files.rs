use crate::error::{CliError, Result};
use std::path::Path;
use umbrella::core::fs::{backup::backup, listing::list_directory, which::which};

pub fn which_command(program: &str) -> Result<()> {
    let path = which(program)
        .ok_or_else(|| CliError::Argument(format!("'{}' was not found on PATH", program)))?;
    println!("{}", path.display());
    Ok(())
}

pub fn backup_command(path: &Path) -> Result<()> {
    match backup(path)? {
        Some(moved) => println!("{} -> {}", path.display(), moved.display()),
        None => println!("Nothing to back up: {} does not exist", path.display()),
    }
    Ok(())
}

pub fn ls_command(dir: &Path) -> Result<()> {
    for entry in list_directory(dir)? {
        println!("{}", entry);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn which_reports_missing_programs() {
        let err = which_command("surely-not-an-installed-program-42").unwrap_err();
        assert!(matches!(err, CliError::Argument(_)));
    }

    #[test]
    fn backup_of_missing_path_succeeds() {
        let dir = tempdir().unwrap();
        backup_command(&dir.path().join("absent")).unwrap();
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn backup_moves_existing_path() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("run-0");
        fs::create_dir(&target).unwrap();

        backup_command(&target).unwrap();

        assert!(!target.exists());
        assert!(dir.path().join("#run-0.1#").is_dir());
    }

    #[test]
    fn ls_of_missing_directory_fails() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            ls_command(&dir.path().join("absent")),
            Err(CliError::Io(_))
        ));
    }
}
