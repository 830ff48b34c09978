use super::error::Error;
use log::{debug, info, warn};
use std::env;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Runs a tleap script.
///
/// `workdir` holds the script and every file it loads; the runner must leave
/// the tool's console output in `log`.
pub trait LeapRunner {
    fn run(&mut self, workdir: &Path, script: &str, log: &Path) -> Result<(), Error>;
}

/// The real tleap, started as a child process.
#[derive(Debug, Clone)]
pub struct TleapProcess {
    executable: PathBuf,
}

impl TleapProcess {
    /// Finds `name` on `PATH` (or checks it directly when it is a path).
    pub fn locate(name: impl AsRef<Path>) -> Result<Self, Error> {
        let name = name.as_ref();
        let executable = which::which(name).map_err(|_| Error::ToolNotFound {
            name: name.display().to_string(),
        })?;
        debug!("Using tleap at {}", executable.display());
        Ok(Self { executable })
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }
}

impl LeapRunner for TleapProcess {
    fn run(&mut self, workdir: &Path, script: &str, log: &Path) -> Result<(), Error> {
        let log_file = File::create(log).map_err(|e| Error::io(log, e))?;

        info!("Starting the build");
        let status = Command::new(&self.executable)
            .arg("-f")
            .arg(format!("./{script}"))
            .current_dir(workdir)
            .stdin(Stdio::null())
            .stdout(log_file)
            .status()
            .map_err(|source| Error::ToolLaunch { source })?;

        if !status.success() {
            warn!("tleap exited with {status}; see {}", log.display());
        }
        info!("Finished building");
        Ok(())
    }
}

/// Removes outputs of an earlier build: `<prefix>.*`, `log.*` and `*.log`.
pub fn clean_outdir(outdir: &Path, prefix: &str) -> Result<usize, Error> {
    let stem = format!("{prefix}.");
    let mut removed = 0;

    let entries = fs::read_dir(outdir).map_err(|e| Error::io(outdir, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| Error::io(outdir, e))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let name = entry.file_name();
        let name = name.to_string_lossy();
        let stale = name.starts_with(&stem) || name.starts_with("log.") || name.ends_with(".log");
        if stale {
            fs::remove_file(&path).map_err(|e| Error::io(&path, e))?;
            removed += 1;
        }
    }

    if removed > 0 {
        debug!("Removed {removed} stale file(s) from {}", outdir.display());
    }
    Ok(removed)
}

/// Environment variable naming the AmberTools installation.
pub const AMBERHOME: &str = "AMBERHOME";

/// The AmberTools installation named by `$AMBERHOME`.
pub fn amber_home() -> Result<PathBuf, Error> {
    env::var_os(AMBERHOME)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
        .ok_or(Error::AmberHomeUnset)
}

/// Directory holding the leaprc files of an AmberTools installation.
pub fn forcefield_dir(amberhome: &Path) -> PathBuf {
    amberhome.join("dat").join("leap").join("cmd")
}

/// Names of the force field files under `<amberhome>/dat/leap/cmd`, sorted.
///
/// Subdirectories are skipped.
pub fn list_forcefields(amberhome: &Path) -> Result<Vec<String>, Error> {
    let dir = forcefield_dir(amberhome);
    let entries = fs::read_dir(&dir).map_err(|e| Error::io(&dir, e))?;

    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| Error::io(&dir, e))?;
        if entry.path().is_file() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    names.sort();
    debug!("Found {} force field file(s) in {}", names.len(), dir.display());
    Ok(names)
}

/// A non-empty file, or `None`.
pub(crate) fn non_empty(path: &Path) -> Option<&Path> {
    fs::metadata(path)
        .ok()
        .filter(|meta| meta.is_file() && meta.len() > 0)
        .map(|_| path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_removes_only_stale_outputs() {
        let dir = tempfile::tempdir().unwrap();
        for name in [
            "structure.prmtop",
            "structure.crd",
            "log.txt",
            "leap.log",
            "input.pdb",
            "lig.frcmod",
        ] {
            fs::write(dir.path().join(name), "x").unwrap();
        }

        let removed = clean_outdir(dir.path(), "structure").unwrap();
        assert_eq!(removed, 4);

        let mut left: Vec<String> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        left.sort();
        assert_eq!(left, vec!["input.pdb", "lig.frcmod"]);
    }

    #[test]
    fn missing_executable_is_a_configuration_error() {
        let err = TleapProcess::locate("definitely-not-a-real-tleap-binary").unwrap_err();
        assert!(matches!(err, Error::ToolNotFound { .. }));
    }

    #[test]
    fn lists_forcefield_files_sorted() {
        let home = tempfile::tempdir().unwrap();
        let dir = forcefield_dir(home.path());
        fs::create_dir_all(dir.join("oldff")).unwrap();
        for name in ["leaprc.water.tip3p", "leaprc.lipid21", "leaprc.protein.ff14SB"] {
            fs::write(dir.join(name), "source").unwrap();
        }

        let names = list_forcefields(home.path()).unwrap();
        assert_eq!(
            names,
            vec!["leaprc.lipid21", "leaprc.protein.ff14SB", "leaprc.water.tip3p"]
        );
    }

    #[test]
    fn listing_without_leap_directory_fails() {
        let home = tempfile::tempdir().unwrap();
        let err = list_forcefields(home.path()).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
        assert!(err.to_string().contains("cmd"));
    }

    #[test]
    fn empty_files_do_not_count_as_products() {
        let dir = tempfile::tempdir().unwrap();
        let empty = dir.path().join("a.crd");
        let full = dir.path().join("a.prmtop");
        fs::write(&empty, "").unwrap();
        fs::write(&full, "%VERSION").unwrap();

        assert!(non_empty(&empty).is_none());
        assert!(non_empty(&full).is_some());
        assert!(non_empty(&dir.path().join("missing")).is_none());
    }
}
