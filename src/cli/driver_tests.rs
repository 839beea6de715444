use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;

use super::args::CliArgs;
use super::driver;
use jaz_common::codes;

fn args_for(files: Vec<PathBuf>) -> CliArgs {
    CliArgs {
        files,
        sourcepath: Vec::new(),
        pass: 2,
        emit: false,
        dump_decls: false,
        check_imports: false,
        no_color: true,
    }
}

fn write(dir: &TempDir, rel: &str, source: &str) -> PathBuf {
    let path = dir.path().join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, source).unwrap();
    path
}

#[test]
fn resolves_a_directory_recursively() {
    let dir = TempDir::new().unwrap();
    write(&dir, "pkg/A.jav", "package pkg;\npublic class A {}\n");
    write(&dir, "B.jav", "class B {}\n");
    write(&dir, "notes.txt", "not a source file\n");

    let result = driver::run(&args_for(vec![dir.path().to_path_buf()])).unwrap();
    assert!(result.diagnostics.is_empty());
    assert_eq!(result.sources.len(), 2);
}

#[test]
fn batch_continues_past_a_failing_unit() {
    let dir = TempDir::new().unwrap();
    let bad = write(&dir, "Bad.jav", "class Bad { Unknown u; }\n");
    let good = write(&dir, "Good.jav", "class Good {}\n");

    let mut args = args_for(vec![bad, good]);
    args.emit = true;
    let result = driver::run(&args).unwrap();

    assert_eq!(result.error_count(), 1);
    assert_eq!(result.diagnostics[0].code, codes::UNRESOLVED_NAME);
    // The failing unit emitted nothing; the good one still did.
    assert_eq!(result.emitted_sources.len(), 1);
    assert!(result.emitted_sources[0].0.ends_with("Good.jav"));
}

#[test]
fn missing_file_is_an_error() {
    let result = driver::run(&args_for(vec![PathBuf::from("/nonexistent/Main.jav")]));
    assert!(result.is_err());
}

#[test]
fn dump_decls_requires_the_name_pass() {
    let dir = TempDir::new().unwrap();
    let file = write(&dir, "A.jav", "class A {}\n");
    let mut args = args_for(vec![file]);
    args.pass = 1;
    args.dump_decls = true;
    assert!(driver::run(&args).is_err());
}

#[test]
fn unused_imports_reported_as_warnings() {
    let dir = TempDir::new().unwrap();
    write(&dir, "lib/Util.jav", "package lib;\npublic class Util {}\n");
    let main = write(&dir, "Main.jav", "import lib.Util;\nclass Main {}\n");

    let mut args = args_for(vec![main]);
    args.sourcepath = vec![dir.path().to_path_buf()];
    args.check_imports = true;
    let result = driver::run(&args).unwrap();

    assert_eq!(result.error_count(), 0);
    assert_eq!(result.diagnostics.len(), 1);
    assert_eq!(result.diagnostics[0].code, codes::UNUSED_IMPORT);
}

#[test]
fn declaration_dump_covers_synthesized_members() {
    let dir = TempDir::new().unwrap();
    let file = write(&dir, "Empty.jav", "class Empty {}\n");
    let mut args = args_for(vec![file]);
    args.dump_decls = true;
    let result = driver::run(&args).unwrap();

    assert_eq!(result.declaration_dumps.len(), 1);
    let decls = &result.declaration_dumps[0].1;
    assert!(decls.iter().any(|d| d.category == "constructor"));
    assert!(decls.iter().any(|d| d.name == "Empty" && d.category == "class"));
}
