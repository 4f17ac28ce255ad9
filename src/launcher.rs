use std::ffi::{OsStr, OsString};
use std::path::Path;
use std::process::Command;

/// Name of the configuration file seeded into every scoped directory.
pub const CONFIG_FILE: &str = "setup.cfg";

const DEFAULT_PROGRAM: &str = "python3";
const DEFAULT_MODULE_ARGS: [&str; 2] = ["-m", "flake8"];

// Developer mode makes flake8 emit extra warnings on stderr.
const DEFAULT_ENV_REMOVE: [&str; 1] = ["PYTHONDEVMODE"];

/// How the analysis tool is started.
///
/// The default runs `python3 -m flake8`. Tests that need a deterministic tool
/// can point [`Launcher::new`] at any executable accepting flake8's options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Launcher {
    program: OsString,
    leading_args: Vec<OsString>,
    env_remove: Vec<OsString>,
}

impl Default for Launcher {
    fn default() -> Self {
        let mut launcher = Self::new(DEFAULT_PROGRAM).args(DEFAULT_MODULE_ARGS);
        for key in DEFAULT_ENV_REMOVE {
            launcher = launcher.env_remove(key);
        }
        launcher
    }
}

impl Launcher {
    /// Run `program` directly, with no leading arguments.
    #[must_use]
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            leading_args: Vec::new(),
            env_remove: Vec::new(),
        }
    }

    /// Run `python -m flake8` with the given interpreter.
    #[must_use]
    pub fn python(interpreter: impl Into<OsString>) -> Self {
        Self {
            program: interpreter.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.leading_args.push(arg.into());
        self
    }

    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.leading_args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Strip `key` from the child's environment.
    #[must_use]
    pub fn env_remove(mut self, key: impl Into<OsString>) -> Self {
        self.env_remove.push(key.into());
        self
    }

    #[must_use]
    pub fn program(&self) -> &OsStr {
        &self.program
    }

    #[must_use]
    pub fn leading_args(&self) -> &[OsString] {
        &self.leading_args
    }

    /// Arguments every invocation gets: one worker, the seeded config, current dir.
    #[must_use]
    pub const fn default_args() -> [&'static str; 5] {
        ["--jobs", "1", "--config", CONFIG_FILE, "."]
    }

    /// Build the full command for a run inside `dir`.
    #[must_use]
    pub fn command<I, S>(&self, dir: &Path, extra_args: I) -> Command
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.leading_args)
            .args(Self::default_args())
            .args(extra_args)
            .current_dir(dir);
        for key in &self.env_remove {
            cmd.env_remove(key);
        }
        cmd
    }
}
