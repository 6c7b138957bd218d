use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const DEFAULT_TOPOLOGY_NAME: &str = "topol.top";

/// Hand-made topology for the two-pyrimidine system in TIP4P water with OPLS-AA.
///
/// Only the directory prefix of the `#include` lines is configurable; the rest of the
/// system definition is fixed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TopologyFile {
    /// Directory containing `0-files/`; prepended to every include path.
    pub include_root: String,
}

impl TopologyFile {
    pub fn new(include_root: impl Into<String>) -> Self {
        Self {
            include_root: include_root.into(),
        }
    }

    fn include(&self, relative: &str) -> String {
        format!("#include \"{}/0-files/{}\"", self.include_root, relative)
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str(";\n;\tHand made topology files\n;\n\n");

        out.push_str("; Include forcefield parameters\n");
        let _ = writeln!(out, "{}", self.include("oplsaa.ff/forcefield.itp"));

        out.push_str("\n; Include water topology\n");
        let _ = writeln!(out, "{}", self.include("oplsaa.ff/tip4p.itp"));

        out.push_str(
            "\n#ifdef POSRES_WATER\n\
             ; Position restraint for each water oxygen\n\
             [ position_restraints ]\n\
             ;  i funct       fcx        fcy        fcz\n   \
             1    1       1000       1000       1000\n\
             #endif\n",
        );

        out.push_str("\n; Include topology for ions\n");
        let _ = writeln!(out, "{}", self.include("oplsaa.ff/ions.itp"));

        out.push_str("\n; Include topology for pyrimidine\n");
        let _ = writeln!(out, "{}", self.include("pyrimidine.itp"));

        out.push_str(
            "\n[ system ]\n\
             ; Name\n\
             2 Pyrimidine molecules\n\
             \n\
             [ molecules ]\n\
             ; Compound        #mols\n\
             pyrimidine 2\n",
        );
        out
    }

    /// Writes the topology to `path`, replacing any existing file.
    pub fn write_to_path(&self, path: &Path) -> io::Result<PathBuf> {
        fs::write(path, self.render())?;
        debug!("Wrote topology to {:?}", path);
        Ok(path.to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn includes_use_the_given_root() {
        let text = TopologyFile::new("/home/user/tutorial").render();

        assert!(text.contains("#include \"/home/user/tutorial/0-files/oplsaa.ff/forcefield.itp\""));
        assert!(text.contains("#include \"/home/user/tutorial/0-files/oplsaa.ff/tip4p.itp\""));
        assert!(text.contains("#include \"/home/user/tutorial/0-files/oplsaa.ff/ions.itp\""));
        assert!(text.contains("#include \"/home/user/tutorial/0-files/pyrimidine.itp\""));
    }

    #[test]
    fn declares_two_pyrimidines_and_guards_water_restraints() {
        let text = TopologyFile::default().render();

        assert!(text.contains("#include \"/0-files/oplsaa.ff/forcefield.itp\""));
        assert!(text.contains("2 Pyrimidine molecules"));
        assert!(text.trim_end().ends_with("pyrimidine 2"));
        assert!(text.contains("#ifdef POSRES_WATER\n"));
        assert!(text.contains("   1    1       1000       1000       1000\n#endif"));

        let ff = text.find("forcefield.itp").unwrap();
        let water = text.find("tip4p.itp").unwrap();
        let ions = text.find("ions.itp").unwrap();
        assert!(ff < water && water < ions);
    }

    #[test]
    fn write_replaces_existing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(DEFAULT_TOPOLOGY_NAME);
        fs::write(&path, "old").unwrap();

        TopologyFile::new("..").write_to_path(&path).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.starts_with(";\n;\tHand made topology files"));
        assert!(text.contains("\"../0-files/pyrimidine.itp\""));
    }
}
