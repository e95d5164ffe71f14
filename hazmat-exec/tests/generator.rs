use std::time::Duration;

use hazmat_exec::{Generator, GeneratorError, TerminationStatus};

mod common;
use common::{script, setup};

#[test]
fn test_message_on_stdin() {
    let runner = setup();
    let tmpdir = tempfile::TempDir::new().unwrap();
    let gen = script(tmpdir.path(), "gen.sh", "read n\necho \"$n $1\"\necho noise >&2");
    let output = tmpdir.path().join("input");
    let mut generator = Generator::new(&gen, "7\n");
    generator.args = vec!["fixed".into()];
    let seed = generator.generate(&runner, &output).unwrap();
    assert_eq!(seed, None);
    assert_eq!(std::fs::read_to_string(&output).unwrap(), "7 fixed\n");
}

#[test]
fn test_seed_argument() {
    let runner = setup();
    let tmpdir = tempfile::TempDir::new().unwrap();
    let gen = script(tmpdir.path(), "gen.sh", "echo \"$1\"");
    let output = tmpdir.path().join("input");
    let mut generator = Generator::new(&gen, "");
    generator.args = vec!["{}".into()];
    let seed = generator.generate(&runner, &output).unwrap().unwrap();
    assert_eq!(
        std::fs::read_to_string(&output).unwrap(),
        format!("{}\n", seed)
    );
}

#[test]
fn test_crashed_generator() {
    let runner = setup();
    let tmpdir = tempfile::TempDir::new().unwrap();
    let gen = script(tmpdir.path(), "gen.sh", "exit 2");
    let output = tmpdir.path().join("input");
    let err = Generator::new(&gen, "msg")
        .generate(&runner, &output)
        .unwrap_err();
    match err {
        GeneratorError::Crashed {
            status, message, ..
        } => {
            assert_eq!(status, TerminationStatus::Unknown);
            assert_eq!(message, "msg");
        }
        other => panic!("Unexpected error {:?}", other),
    }
}

#[test]
fn test_generator_timeout() {
    let runner = setup();
    let tmpdir = tempfile::TempDir::new().unwrap();
    let gen = script(tmpdir.path(), "gen.sh", "sleep 10");
    let mut generator = Generator::new(&gen, "");
    generator.timeout = Some(Duration::from_millis(200));
    let err = generator
        .generate(&runner, &tmpdir.path().join("input"))
        .unwrap_err();
    assert!(matches!(
        err,
        GeneratorError::Crashed {
            status: TerminationStatus::Timeout,
            ..
        }
    ));
}
