use anyhow::Error;
use clap::Parser;
use pretty_assertions::assert_eq;
use tempfile::TempDir;

use hazmat_rust::tools::*;
use hazmat_rust::{exit_code, Opt, Tool};

mod common;
use common::{script, setup, write, TEST_CONFIG};

/// A directory with the test configuration in `hazmat.json`.
struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Workspace {
        setup();
        let dir = TempDir::new().unwrap();
        write(dir.path(), "hazmat.json", TEST_CONFIG);
        Workspace { dir }
    }

    fn path(&self, name: &str) -> String {
        self.dir.path().join(name).display().to_string()
    }

    /// Parse a command line, with the configuration of the workspace, and run it.
    fn run(&self, args: &[&str]) -> Result<(), Error> {
        let config = self.path("hazmat.json");
        let mut argv = vec!["hazmat", "--config", config.as_str()];
        argv.extend_from_slice(args);
        let opt = Opt::try_parse_from(argv)?;
        let config = opt.config.as_deref();
        match opt.tool {
            Tool::Build(opt) => main_build(opt, config),
            Tool::Run(opt) => main_run(opt, config),
            Tool::Test(opt) => main_test(opt, config),
            Tool::Live(opt) => main_live(opt, config),
            Tool::Generate(opt) => main_generate(opt, config),
            Tool::Merge(opt) => main_merge(opt, config),
            Tool::Init(opt) => main_init(opt, config),
            Tool::GenAutocompletion(opt) => main_gen_autocompletion(opt),
        }
    }

    fn code(&self, args: &[&str]) -> i32 {
        match self.run(args) {
            Ok(()) => 0,
            Err(e) => exit_code(&e),
        }
    }
}

#[test]
fn test_run_accepted() {
    let ws = Workspace::new();
    script(ws.dir.path(), "sol.sh", "cat");
    write(ws.dir.path(), "a.in", "1 2\n");
    write(ws.dir.path(), "a.out", "1 2\n");
    assert_eq!(ws.code(&["run", &ws.path("sol.sh"), &ws.path("a.in")]), 0);
}

#[test]
fn test_run_without_expected_output() {
    let ws = Workspace::new();
    script(ws.dir.path(), "sol.sh", "cat");
    write(ws.dir.path(), "a.in", "1 2\n");
    assert_eq!(
        ws.code(&["run", &ws.path("sol.sh"), &ws.path("a.in"), "--show-output"]),
        0
    );
}

#[test]
fn test_run_missing_input() {
    let ws = Workspace::new();
    script(ws.dir.path(), "sol.sh", "cat");
    assert_eq!(ws.code(&["run", &ws.path("sol.sh"), &ws.path("none.in")]), 102);
}

#[test]
fn test_run_failing_solution() {
    let ws = Workspace::new();
    script(ws.dir.path(), "sol.sh", "exit 4");
    write(ws.dir.path(), "a.in", "1\n");
    assert_eq!(ws.code(&["run", &ws.path("sol.sh"), &ws.path("a.in")]), 1);
}

#[test]
fn test_missing_solution() {
    let ws = Workspace::new();
    write(ws.dir.path(), "a.in", "1\n");
    assert_eq!(ws.code(&["run", &ws.path("none.sh"), &ws.path("a.in")]), 141);
}

#[test]
fn test_unknown_extension() {
    let ws = Workspace::new();
    write(ws.dir.path(), "sol.xyz", "");
    assert_eq!(ws.code(&["build", &ws.path("sol.xyz")]), 110);
}

#[test]
fn test_build() {
    let ws = Workspace::new();
    script(ws.dir.path(), "sol.src", "cat");
    assert_eq!(ws.code(&["build", &ws.path("sol.src")]), 0);
    assert!(ws.dir.path().join("sol.bin").is_file());
    assert_eq!(ws.code(&["build", &ws.path("sol.sh2")]), 110);
}

#[test]
fn test_build_failure() {
    let ws = Workspace::new();
    write(ws.dir.path(), "sol.bad", "");
    assert_eq!(ws.code(&["build", &ws.path("sol.bad")]), 103);
}

#[test]
fn test_test_missing_save_dir() {
    let ws = Workspace::new();
    script(ws.dir.path(), "sol.sh", "cat");
    std::fs::create_dir(ws.dir.path().join("Tests")).unwrap();
    let code = ws.code(&[
        "test",
        &ws.path("sol.sh"),
        "-i",
        &ws.path("Tests"),
        "--save",
        &ws.path("missing"),
    ]);
    assert_eq!(code, 101);
}

#[test]
fn test_test_directory() {
    let ws = Workspace::new();
    script(ws.dir.path(), "sol.sh", "cat");
    write(ws.dir.path(), "Tests/a.in", "1\n");
    write(ws.dir.path(), "Tests/a.out", "1\n");
    write(ws.dir.path(), "Tests/b.in", "2\n");
    write(ws.dir.path(), "Tests/b.out", "3\n");
    let code = ws.code(&["check", &ws.path("sol.sh"), "-i", &ws.path("Tests"), "-s", "3"]);
    assert_eq!(code, 0);
}

#[test]
fn test_generate() {
    let ws = Workspace::new();
    script(ws.dir.path(), "sol.sh", "cat");
    script(ws.dir.path(), "gen.sh", "echo $1");
    std::fs::create_dir(ws.dir.path().join("Tests")).unwrap();
    let code = ws.code(&[
        "generate",
        &ws.path("sol.sh"),
        "-g",
        &ws.path("gen.sh"),
        "--prefix",
        "g",
        "--range",
        "1",
        "3",
        "--dir",
        &ws.path("Tests"),
        "{}",
    ]);
    assert_eq!(code, 0);
    let input = std::fs::read_to_string(ws.dir.path().join("Tests/g1.in")).unwrap();
    let output = std::fs::read_to_string(ws.dir.path().join("Tests/g1.out")).unwrap();
    assert_eq!(input, output);
    assert!(input.trim().parse::<u64>().is_ok());
    assert!(ws.dir.path().join("Tests/g2.in").is_file());
    assert!(!ws.dir.path().join("Tests/g3.in").exists());
}

#[test]
fn test_generate_invalid_range() {
    let ws = Workspace::new();
    script(ws.dir.path(), "sol.sh", "cat");
    script(ws.dir.path(), "gen.sh", "echo 1");
    let code = ws.code(&[
        "generate",
        &ws.path("sol.sh"),
        "-g",
        &ws.path("gen.sh"),
        "--prefix",
        "g",
        "--range",
        "5",
        "5",
        "--dir",
        &ws.path("."),
    ]);
    assert_eq!(code, 1);
}

#[test]
fn test_live() {
    let ws = Workspace::new();
    script(ws.dir.path(), "sol.sh", "cat");
    script(ws.dir.path(), "ref.sh", "cat");
    script(ws.dir.path(), "gen.sh", "echo $1 $2");
    let code = ws.code(&[
        "live",
        &ws.path("sol.sh"),
        &ws.path("ref.sh"),
        "-g",
        &ws.path("gen.sh"),
        "-n",
        "3",
        "--",
        "10",
        "{}",
    ]);
    assert_eq!(code, 0);
}

#[test]
fn test_merge() {
    let ws = Workspace::new();
    write(ws.dir.path(), "sol.src", "int main() {}\n");
    let code = ws.code(&["merge", &ws.path("sol.src"), &ws.path("merged.src")]);
    assert_eq!(code, 0);
    assert_eq!(
        std::fs::read_to_string(ws.dir.path().join("merged.src")).unwrap(),
        "int main() {}\n"
    );
    let code = ws.code(&["merge", &ws.path("sol.src"), &ws.path("merged.src")]);
    assert_eq!(code, 106);
    let code = ws.code(&["merge", &ws.path("sol.src"), &ws.path("merged.src"), "-f"]);
    assert_eq!(code, 0);
}

#[test]
fn test_merge_errors() {
    let ws = Workspace::new();
    script(ws.dir.path(), "sol.sh", "cat");
    assert_eq!(ws.code(&["merge", &ws.path("sol.sh"), &ws.path("out.sh")]), 104);
    assert_eq!(ws.code(&["merge", &ws.path("none.src"), &ws.path("out.src")]), 102);
}

#[test]
fn test_init() {
    let ws = Workspace::new();
    write(ws.dir.path(), "template.sh", "#!/bin/sh\ncat\n");
    std::fs::create_dir(ws.dir.path().join("work")).unwrap();
    let code = ws.code(&["init", "lis.sh", "--path", &ws.path("work")]);
    assert_eq!(code, 0);
    let work = ws.dir.path().join("work");
    assert!(work.join("Tests").is_dir());
    assert!(work.join("lis-gen").is_dir());
    assert_eq!(
        std::fs::read_to_string(work.join("lis.sh")).unwrap(),
        "#!/bin/sh\ncat\n"
    );

    assert_eq!(ws.code(&["init", "lis.src", "--path", &ws.path("work")]), 104);
    assert_eq!(
        ws.code(&["init", "lis.sh", "-t", "fancy", "--path", &ws.path("work")]),
        104
    );
}
