#![allow(dead_code)]

pub use test_interface::*;

mod test_interface;

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

/// `.sh` solutions run as they are, `.src` ones are "compiled" by copying them and `.bad` ones
/// never compile.
pub const TEST_CONFIG: &str = r#"{
    "languages": [
        {"name": "Shell", "extension": ".sh",
         "init": {"default": {"dirs": ["Tests", "{}-gen"], "files": [{"src": "template.sh", "dest": "{}.sh"}]}}},
        {"name": "Copy", "extension": ".src",
         "compile": {"compiler": "cp", "format": "{0} {1} {2} {3}", "default-flags": []},
         "merge": "cp {} {}"},
        {"name": "Broken", "extension": ".bad",
         "compile": {"compiler": "false", "format": "{0}", "default-flags": []}}
    ]
}"#;

pub fn setup() {
    let _ = env_logger::Builder::from_default_env()
        .format_timestamp_nanos()
        .is_test(true)
        .try_init();
}

/// Write an executable shell script.
pub fn script<P: AsRef<Path>>(dir: P, name: &str, body: &str) -> PathBuf {
    let path = write(dir, name, &format!("#!/bin/sh\n{}\n", body));
    let mut perm = std::fs::metadata(&path).unwrap().permissions();
    perm.set_mode(0o755);
    std::fs::set_permissions(&path, perm).unwrap();
    path
}

/// Write a file, creating its directory.
pub fn write<P: AsRef<Path>>(dir: P, name: &str, content: &str) -> PathBuf {
    let path = dir.as_ref().join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, content).unwrap();
    path
}
