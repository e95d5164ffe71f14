#![allow(dead_code)]

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use hazmat_exec::{Interrupt, ProcessRunner};

pub fn setup() -> ProcessRunner {
    let _ = env_logger::Builder::from_default_env()
        .format_timestamp_nanos()
        .is_test(true)
        .try_init();
    ProcessRunner::new(Interrupt::new())
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
