use std::fs;

use flake8_path::{Flake8Path, Launcher};
use tempfile::tempdir;

fn stub_path() -> Flake8Path {
    Flake8Path::with_launcher(Launcher::new(env!("CARGO_BIN_EXE_flake8_stub")))
        .expect("create flake8 path")
}

#[test]
fn simple_run() {
    let path = stub_path();
    path.write_file("example.py", "x  = 1\n").unwrap();

    let result = path.run_flake8_default();

    assert_eq!(
        result.out_lines,
        vec!["./example.py:1:2: E221 multiple spaces before operator"]
    );
    assert!(result.err_lines.is_empty(), "{:?}", result.err_lines);
    assert_eq!(result.exit_code, 1);
}

#[test]
fn multi_line() {
    let path = stub_path();
    fs::write(path.join("example.py"), "x  = 1\ny  = 2\n").unwrap();

    let result = path.run_flake8_default();

    assert_eq!(
        result.out_lines,
        vec![
            "./example.py:1:2: E221 multiple spaces before operator",
            "./example.py:2:2: E221 multiple spaces before operator",
        ]
    );
    assert!(result.err_lines.is_empty());
    assert_eq!(result.exit_code, 1);
}

#[test]
fn with_setup_cfg() {
    let path = stub_path();
    path.write_config("[flake8]\nignore = E221\n").unwrap();
    path.write_file("example.py", "x  = 1\n").unwrap();

    let result = path.run_flake8_default();

    assert!(result.out_lines.is_empty(), "{:?}", result.out_lines);
    assert!(result.err_lines.is_empty());
    assert_eq!(result.exit_code, 0);
}

#[test]
fn extra_args() {
    let path = stub_path();
    path.write_file("example.py", "x  = 1\n").unwrap();

    let result = path.run_flake8(["--ignore", "E221"]);

    assert!(result.out_lines.is_empty(), "{:?}", result.out_lines);
    assert!(result.err_lines.is_empty());
    assert_eq!(result.exit_code, 0);
}

#[test]
fn extra_args_match_config() {
    let by_config = stub_path();
    by_config.write_config("[flake8]\nignore = E2\n").unwrap();
    by_config.write_file("example.py", "x  = 1\n").unwrap();

    let by_args = stub_path();
    by_args.write_file("example.py", "x  = 1\n").unwrap();

    let from_config = by_config.run_flake8_default();
    let from_args = by_args.run_flake8(["--ignore=E2"]);
    assert_eq!(from_config.out_lines, from_args.out_lines);
    assert_eq!(from_config.exit_code, from_args.exit_code);
}

#[test]
fn extra_args_version() {
    let path = stub_path();
    let result = path.run_flake8(["--version"]);

    let first = result.out.split_whitespace().next().unwrap_or_default();
    let version = semver::Version::parse(first).expect("version prefix");
    assert_eq!(version.major, 7);
    assert!(result.out.starts_with(&format!("{version} ")));
}

#[test]
fn nested_packages_are_reported_with_forward_slashes() {
    let path = stub_path();
    path.write_file("pkg/mod.py", "value  = 1\n").unwrap();

    let result = path.run_flake8_default();

    assert_eq!(
        result.out_lines,
        vec!["./pkg/mod.py:1:6: E221 multiple spaces before operator"]
    );
    let violations = result.violations();
    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].path, "./pkg/mod.py");
    assert_eq!((violations[0].line, violations[0].column), (1, 6));
}

#[test]
fn missing_config_surfaces_on_stderr() {
    let path = stub_path();
    fs::remove_file(path.config_path()).unwrap();
    path.write_file("example.py", "x = 1\n").unwrap();

    let result = path.run_flake8_default();

    assert_ne!(result.exit_code, 0);
    assert!(result.out_lines.is_empty());
    assert!(
        result.err_lines[0].contains("setup.cfg"),
        "{:?}",
        result.err_lines
    );
}

#[test]
fn separate_tmp_path() {
    let path = stub_path();
    path.write_file("example.py", "x  = 1\n").unwrap();

    let other = tempdir().unwrap();
    assert!(!other.path().join("example.py").exists());

    let second = stub_path();
    assert_ne!(path.path(), second.path());
    assert!(!second.join("example.py").exists());
    let result = second.run_flake8_default();
    assert!(result.out_lines.is_empty());
    assert_eq!(result.exit_code, 0);
}
