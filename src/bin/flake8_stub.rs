#![forbid(unsafe_code)]
#![deny(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]

// Deterministic stand-in for flake8 used by the integration tests. Accepts the
// options the fixture passes and reports E221 only.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::LazyLock;

use ignore::WalkBuilder;
use regex::Regex;

const VERSION: &str = "7.0.0";
const E221: &str = "E221";
const E221_MESSAGE: &str = "multiple spaces before operator";

static SPACES_BEFORE_OPERATOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\S( {2,})(?:==|!=|<=|>=|[-+*/%<>=])").expect("E221 pattern must compile")
});

#[derive(Debug, Default)]
struct Args {
    config: Option<PathBuf>,
    ignore: Vec<String>,
    paths: Vec<PathBuf>,
    version: bool,
}

fn split_codes(raw: &str) -> impl Iterator<Item = String> + '_ {
    raw.split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_owned)
}

fn parse_args(mut raw: impl Iterator<Item = String>) -> Result<Args, String> {
    let mut args = Args::default();
    while let Some(arg) = raw.next() {
        let (flag, inline) = match arg.split_once('=') {
            Some((flag, value)) if flag.starts_with("--") => (flag.to_owned(), Some(value.to_owned())),
            _ => (arg.clone(), None),
        };
        let mut value = |name: &str| {
            inline
                .clone()
                .or_else(|| raw.next())
                .ok_or_else(|| format!("flake8: error: argument {name}: expected one argument"))
        };
        match flag.as_str() {
            "--version" => args.version = true,
            "--jobs" | "-j" => {
                value("--jobs")?;
            }
            "--config" => args.config = Some(PathBuf::from(value("--config")?)),
            "--ignore" | "--extend-ignore" => args.ignore.extend(split_codes(&value(&flag)?)),
            other if other.starts_with('-') => {
                return Err(format!("flake8: error: unrecognized arguments: {other}"));
            }
            _ => args.paths.push(PathBuf::from(arg)),
        }
    }
    Ok(args)
}

/// Codes listed under `ignore`/`extend-ignore` in the `[flake8]` section.
fn ignored_codes(config: &str) -> Vec<String> {
    let mut in_section = false;
    let mut codes = Vec::new();
    for line in config.lines() {
        let line = line.trim();
        if line.starts_with('[') {
            in_section = line == "[flake8]";
            continue;
        }
        if !in_section {
            continue;
        }
        if let Some((key, value)) = line.split_once('=')
            && matches!(key.trim(), "ignore" | "extend-ignore")
        {
            codes.extend(split_codes(value));
        }
    }
    codes
}

fn python_files(root: &Path) -> Vec<PathBuf> {
    if root.is_file() {
        return vec![root.to_path_buf()];
    }
    let walker = WalkBuilder::new(root)
        .hidden(false)
        .sort_by_file_name(|a, b| a.cmp(b))
        .build();
    walker
        .flatten()
        .map(|e| e.path().to_path_buf())
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "py"))
        .collect()
}

fn check(path: &Path, content: &str) -> Vec<String> {
    let mut out = Vec::new();
    for (idx, line) in content.lines().enumerate() {
        for caps in SPACES_BEFORE_OPERATOR.captures_iter(line) {
            let column = caps.get(1).map_or(0, |m| m.start()) + 1;
            out.push(format!(
                "{}:{}:{column}: {E221} {E221_MESSAGE}",
                path.display(),
                idx + 1
            ));
        }
    }
    out
}

fn main() -> ExitCode {
    let args = match parse_args(env::args().skip(1)) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::from(2);
        }
    };

    if args.version {
        println!("{VERSION} (flake8_stub: {}) Rust", env!("CARGO_PKG_VERSION"));
        return ExitCode::SUCCESS;
    }

    let mut ignore = args.ignore;
    if let Some(config) = &args.config {
        match fs::read_to_string(config) {
            Ok(text) => ignore.extend(ignored_codes(&text)),
            Err(e) => {
                eprintln!("The specified config file does not exist: {} ({e})", config.display());
                return ExitCode::from(1);
            }
        }
    }

    let roots = if args.paths.is_empty() {
        vec![PathBuf::from(".")]
    } else {
        args.paths
    };

    let mut reported = 0usize;
    if !ignore.iter().any(|c| E221.starts_with(c.as_str())) {
        for root in &roots {
            for file in python_files(root) {
                let Ok(content) = fs::read_to_string(&file) else {
                    eprintln!("{}: could not read file", file.display());
                    continue;
                };
                for line in check(&file, &content) {
                    println!("{line}");
                    reported += 1;
                }
            }
        }
    }

    if reported > 0 {
        ExitCode::from(1)
    } else {
        ExitCode::SUCCESS
    }
}
