#![allow(dead_code)]

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use hazmat_exec::{Interrupt, ProcessRunner};
use hazmat_lang::LanguageConfig;

/// Shell scripts are run directly; `.src` files are "compiled" by copying them; `.bad` files never
/// compile; `.slow` files take forever to compile.
pub const TEST_CONFIG: &str = r#"{
    "languages": [
        {"name": "Shell", "extension": ".sh"},
        {"name": "Copy", "extension": ".src",
         "compile": {"compiler": "cp", "format": "{0} {1} {2} {3}", "default-flags": []}},
        {"name": "Broken", "extension": ".bad",
         "compile": {"compiler": "false", "format": "{0}", "default-flags": []}},
        {"name": "Slow", "extension": ".slow",
         "compile": {"compiler": "sleep", "format": "{0} 20", "default-flags": []}}
    ]
}"#;

pub fn setup() -> (ProcessRunner, LanguageConfig) {
    let _ = env_logger::Builder::from_default_env()
        .format_timestamp_nanos()
        .is_test(true)
        .try_init();
    (
        ProcessRunner::new(Interrupt::new()),
        LanguageConfig::parse(TEST_CONFIG).unwrap(),
    )
}

/// Write an executable shell script.
pub fn script<P: AsRef<Path>>(dir: P, name: &str, body: &str) -> PathBuf {
    let path = dir.as_ref().join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
    let mut perm = std::fs::metadata(&path).unwrap().permissions();
    perm.set_mode(0o755);
    std::fs::set_permissions(&path, perm).unwrap();
    path
}
