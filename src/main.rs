#![forbid(unsafe_code)]
#![deny(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]

use std::collections::HashSet;
use std::ffi::OsString;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use flake8_path::{Flake8Path, Flake8Result, Launcher};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Parser, Debug)]
#[command(
    name = "flake8-path",
    version,
    about = "Run flake8 over files staged in a throwaway directory"
)]
struct Cli {
    /// Files copied (by file name) into the directory before the run
    #[arg(value_name = "FILE")]
    files: Vec<PathBuf>,

    /// Inline source file, written before the run
    #[arg(short = 's', long = "source", value_name = "NAME=TEXT", value_parser = parse_source)]
    sources: Vec<(String, String)>,

    /// File whose contents replace the default setup.cfg
    #[arg(
        short = 'c',
        long = "config-file",
        value_name = "FILE",
        conflicts_with = "config_data"
    )]
    config_file: Option<PathBuf>,

    /// Inline contents for setup.cfg
    #[arg(short = 'd', long = "config-data", value_name = "INI")]
    config_data: Option<String>,

    /// Interpreter (or, with --no-module, executable) used to start flake8
    #[arg(long = "program", value_name = "PROG", default_value = "python3")]
    program: String,

    /// Run PROG directly instead of `PROG -m flake8`
    #[arg(long = "no-module", default_value_t = false)]
    no_module: bool,

    /// Output format
    #[arg(short = 'f', long = "format", value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Extra flake8 arguments, given after `--`
    #[arg(last = true, value_name = "EXTRA_ARGS")]
    extra_args: Vec<String>,
}

fn parse_source(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((name, text)) if !name.is_empty() => Ok((name.to_owned(), text.to_owned())),
        _ => Err(format!("expected NAME=TEXT, got '{raw}'")),
    }
}

fn launcher(cli: &Cli) -> Launcher {
    if cli.no_module {
        Launcher::new(&cli.program).env_remove("PYTHONDEVMODE")
    } else {
        Launcher::python(&cli.program)
    }
}

fn stage(cli: &Cli) -> Result<Flake8Path, String> {
    let path = Flake8Path::with_launcher(launcher(cli))?;

    if let Some(file) = &cli.config_file {
        let data = fs::read_to_string(file)
            .map_err(|e| format!("failed to read config file {}: {e}", file.display()))?;
        path.write_config(&data)?;
    } else if let Some(data) = &cli.config_data {
        path.write_config(data)?;
    }

    let mut staged: HashSet<OsString> = HashSet::new();
    for file in &cli.files {
        let Some(name) = file.file_name() else {
            return Err(format!("not a file: {}", file.display()));
        };
        if !staged.insert(name.to_os_string()) {
            return Err(format!(
                "duplicate file name {}: {} would overwrite an earlier file",
                name.to_string_lossy(),
                file.display()
            ));
        }
        let data = fs::read_to_string(file)
            .map_err(|e| format!("failed to read {}: {e}", file.display()))?;
        path.write_file(name, &data)?;
    }

    for (name, text) in &cli.sources {
        if !staged.insert(OsString::from(name)) {
            return Err(format!(
                "duplicate file name {name}: would overwrite an earlier file"
            ));
        }
        path.write_file(name, text)?;
    }

    Ok(path)
}

fn report(result: &Flake8Result, format: OutputFormat) -> Result<(), String> {
    match format {
        OutputFormat::Text => {
            for line in &result.out_lines {
                println!("{line}");
            }
            for line in &result.err_lines {
                eprintln!("{line}");
            }
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(result)
                .map_err(|e| format!("failed to serialize result: {e}"))?;
            println!("{json}");
        }
    }
    Ok(())
}

fn exit_code(code: i32) -> ExitCode {
    u8::try_from(code).map_or(ExitCode::FAILURE, ExitCode::from)
}

fn main() -> ExitCode {
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .try_init();

    let cli = Cli::parse();

    let path = match stage(&cli) {
        Ok(path) => path,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::from(2);
        }
    };
    tracing::info!(dir = %path.display(), "staged files");

    let result = path.run_flake8(&cli.extra_args);
    if let Err(e) = report(&result, cli.format) {
        eprintln!("{e}");
        return ExitCode::from(2);
    }
    exit_code(result.exit_code)
}
