use std::ffi::OsStr;
use std::fs;
use std::io;
use std::ops::Deref;
use std::path::{Component, Path, PathBuf};

use tempfile::TempDir;

use crate::launcher::{CONFIG_FILE, Launcher};
use crate::result::Flake8Result;

/// Contents written to `setup.cfg` when the directory is created.
pub const DEFAULT_CONFIG: &str = "[flake8]\n";

const DIR_PREFIX: &str = "flake8_path";

// Conventional shell status for a command that could not be found or started.
const SPAWN_FAILURE_EXIT_CODE: i32 = 127;

/// A temporary directory seeded with an empty `[flake8]` config.
///
/// The directory and everything written into it is removed when the value is
/// dropped, so each test gets its own isolated tree.
#[derive(Debug)]
pub struct Flake8Path {
    dir: TempDir,
    launcher: Launcher,
}

impl Flake8Path {
    /// Create a directory that runs `python3 -m flake8`.
    ///
    /// # Errors
    /// Returns an error when the directory or its config cannot be created.
    pub fn new() -> Result<Self, String> {
        Self::with_launcher(Launcher::default())
    }

    /// Create a directory that starts the tool with `launcher`.
    ///
    /// # Errors
    /// Returns an error when the directory or its config cannot be created.
    pub fn with_launcher(launcher: Launcher) -> Result<Self, String> {
        let dir = tempfile::Builder::new()
            .prefix(DIR_PREFIX)
            .tempdir()
            .map_err(|e| format!("failed to create temporary directory: {e}"))?;
        let path = Self { dir, launcher };
        path.write_config(DEFAULT_CONFIG)?;
        tracing::debug!(dir = %path.path().display(), "created flake8 path");
        Ok(path)
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    #[must_use]
    pub fn join(&self, name: impl AsRef<Path>) -> PathBuf {
        self.path().join(name)
    }

    #[must_use]
    pub const fn launcher(&self) -> &Launcher {
        &self.launcher
    }

    #[must_use]
    pub fn config_path(&self) -> PathBuf {
        self.join(CONFIG_FILE)
    }

    /// Replace the contents of `setup.cfg`.
    ///
    /// # Errors
    /// Returns an error when the file cannot be written.
    pub fn write_config(&self, contents: &str) -> Result<PathBuf, String> {
        self.write_file(CONFIG_FILE, contents)
    }

    /// Write `contents` to `name` relative to the directory, creating parents.
    ///
    /// # Errors
    /// Returns an error when `name` is absolute or climbs out with `..`, or
    /// when a parent directory or the file cannot be written.
    pub fn write_file(&self, name: impl AsRef<Path>, contents: &str) -> Result<PathBuf, String> {
        let name = name.as_ref();
        if !stays_inside(name) {
            return Err(format!(
                "invalid file name {}: must be relative to the directory",
                name.display()
            ));
        }
        let target = self.join(name);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("failed to create {}: {e}", parent.display()))?;
        }
        fs::write(&target, contents)
            .map_err(|e| format!("failed to write {}: {e}", target.display()))?;
        Ok(target)
    }

    /// Run the tool against the directory and capture its output.
    ///
    /// `extra_args` are appended after `--jobs 1 --config setup.cfg .`. Tool
    /// failures are reported through the returned exit code and stderr; a
    /// program that cannot be started yields exit code 127.
    #[must_use]
    pub fn run_flake8<I, S>(&self, extra_args: I) -> Flake8Result
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let mut cmd = self.launcher.command(self.path(), extra_args);
        tracing::debug!(dir = %self.path().display(), command = ?cmd, "running flake8");
        match cmd.output() {
            Ok(output) => {
                let result = Flake8Result::new(
                    String::from_utf8_lossy(&output.stdout),
                    String::from_utf8_lossy(&output.stderr),
                    output.status.code().unwrap_or(-1),
                );
                tracing::debug!(
                    exit_code = result.exit_code,
                    out_lines = result.out_lines.len(),
                    err_lines = result.err_lines.len(),
                    "flake8 finished"
                );
                result
            }
            Err(e) => {
                tracing::warn!(program = ?self.launcher.program(), error = %e, "failed to start flake8");
                Flake8Result::new(
                    String::new(),
                    spawn_failure_message(self.launcher.program(), &e),
                    SPAWN_FAILURE_EXIT_CODE,
                )
            }
        }
    }

    /// Run the tool with no extra arguments.
    #[must_use]
    pub fn run_flake8_default(&self) -> Flake8Result {
        self.run_flake8(std::iter::empty::<&OsStr>())
    }
}

// Only plain names and `.` keep a joined path under the directory.
fn stays_inside(name: &Path) -> bool {
    name.components().next().is_some()
        && name
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

fn spawn_failure_message(program: &OsStr, err: &io::Error) -> String {
    format!("failed to run {}: {err}\n", program.to_string_lossy())
}

impl Deref for Flake8Path {
    type Target = Path;

    fn deref(&self) -> &Path {
        self.path()
    }
}

impl AsRef<Path> for Flake8Path {
    fn as_ref(&self) -> &Path {
        self.path()
    }
}

/// Fixture-style constructor for tests.
///
/// # Panics
/// Panics when the temporary directory cannot be set up, failing the test
/// before any assertion runs.
#[must_use]
#[track_caller]
pub fn flake8_path() -> Flake8Path {
    Flake8Path::new().unwrap_or_else(|e| panic!("flake8_path fixture setup failed: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeds_default_config() {
        let path = flake8_path();
        assert_eq!(fs::read_to_string(path.config_path()).unwrap(), "[flake8]\n");
        assert!(
            path.file_name()
                .unwrap()
                .to_string_lossy()
                .starts_with("flake8_path")
        );
    }

    #[test]
    fn write_file_creates_parents() {
        let path = flake8_path();
        let written = path.write_file("pkg/sub/mod.py", "x = 1\n").unwrap();
        assert_eq!(written, path.join("pkg/sub/mod.py"));
        assert_eq!(fs::read_to_string(written).unwrap(), "x = 1\n");
    }

    #[test]
    fn write_file_rejects_absolute_names() {
        let path = flake8_path();
        let outside = tempfile::tempdir().unwrap();
        let target = outside.path().join("escape.py");

        let err = path.write_file(&target, "x = 1\n").unwrap_err();

        assert!(err.contains("must be relative"), "{err}");
        assert!(!target.exists());
    }

    #[test]
    fn write_file_rejects_parent_components() {
        let path = flake8_path();
        let sibling = path.path().parent().unwrap().join("dotdot.py");

        let err = path.write_file("../dotdot.py", "x = 1\n").unwrap_err();
        assert!(err.contains("must be relative"), "{err}");
        assert!(path.write_file("pkg/../../dotdot.py", "x = 1\n").is_err());
        assert!(path.write_file("", "x = 1\n").is_err());
        assert!(!sibling.exists());
    }

    #[test]
    fn write_file_accepts_current_dir_prefix() {
        let path = flake8_path();
        let written = path.write_file("./example.py", "x = 1\n").unwrap();
        assert!(written.starts_with(path.path()));
        assert!(path.join("example.py").is_file());
    }

    #[test]
    fn directory_is_removed_on_drop() {
        let path = flake8_path();
        let dir = path.to_path_buf();
        assert!(dir.is_dir());
        drop(path);
        assert!(!dir.exists());
    }

    #[test]
    fn missing_program_reports_exit_127() {
        let path =
            Flake8Path::with_launcher(Launcher::new("definitely-not-a-real-flake8-binary")).unwrap();
        let result = path.run_flake8_default();
        assert_eq!(result.exit_code, 127);
        assert!(result.out_lines.is_empty());
        assert!(
            result.err_lines[0].starts_with("failed to run definitely-not-a-real-flake8-binary"),
            "{:?}",
            result.err_lines
        );
    }
}
