#![forbid(unsafe_code)]
#![deny(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]

pub mod launcher;
pub mod path;
pub mod report;
pub mod result;

pub use launcher::{CONFIG_FILE, Launcher};
pub use path::{DEFAULT_CONFIG, Flake8Path, flake8_path};
pub use report::{Violation, parse_violation};
pub use result::{Flake8Result, normalize_line};
