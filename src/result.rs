use serde::Serialize;

use crate::report::{Violation, parse_violation};

/// Captured output of one flake8 invocation.
///
/// `out_lines` carries stdout with Windows path separators normalized in the
/// filename part of each line, so assertions can be written once for every
/// platform. `err_lines` is stderr split as-is.
///
/// Lines break on `\n` and `\r\n` only; a lone `\r` stays inside its line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Flake8Result {
    pub out: String,
    pub out_lines: Vec<String>,
    pub err: String,
    pub err_lines: Vec<String>,
    pub exit_code: i32,
}

impl Flake8Result {
    #[must_use]
    pub fn new(out: impl Into<String>, err: impl Into<String>, exit_code: i32) -> Self {
        let out = out.into();
        let err = err.into();
        let out_lines = out.trim().lines().map(normalize_line).collect();
        let err_lines = err.trim().lines().map(str::to_owned).collect();
        Self {
            out,
            out_lines,
            err,
            err_lines,
            exit_code,
        }
    }

    /// True when the tool exited 0.
    #[must_use]
    pub const fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Stdout lines that parse as `path:line:col: CODE message`.
    #[must_use]
    pub fn violations(&self) -> Vec<Violation> {
        self.out_lines
            .iter()
            .filter_map(|line| parse_violation(line))
            .collect()
    }
}

/// Rewrite backslashes to forward slashes before the first colon.
///
/// Lines without a colon are returned unchanged.
#[must_use]
pub fn normalize_line(line: &str) -> String {
    match line.split_once(':') {
        Some((filename, rest)) => format!("{}:{rest}", filename.replace('\\', "/")),
        None => line.to_owned(),
    }
}
