use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

static DEFAULT_FORMAT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<path>[^:]+):(?P<line>\d+):(?P<column>\d+): (?P<code>[A-Z]+[0-9]+) (?P<message>.*)$")
        .expect("default format pattern must compile")
});

/// One diagnostic in flake8's default `%(path)s:%(row)d:%(col)d: %(code)s %(text)s` format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub path: String,
    pub line: usize,
    pub column: usize,
    pub code: String,
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}: {} {}",
            self.path, self.line, self.column, self.code, self.message
        )
    }
}

/// Parse a normalized stdout line into a [`Violation`].
///
/// Returns `None` for lines in any other shape (statistics, `--version`
/// output, custom `--format` strings).
#[must_use]
pub fn parse_violation(line: &str) -> Option<Violation> {
    let caps = DEFAULT_FORMAT.captures(line)?;
    Some(Violation {
        path: caps["path"].to_owned(),
        line: caps["line"].parse().ok()?,
        column: caps["column"].parse().ok()?,
        code: caps["code"].to_owned(),
        message: caps["message"].to_owned(),
    })
}
