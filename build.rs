use std::path::PathBuf;
use std::process::Command;

/// The version shown by `hazmat --version`: the crate version, followed by the git revision when
/// building from a checkout.
fn long_version() -> String {
    let version = env!("CARGO_PKG_VERSION").to_string();
    let revision = Command::new("git")
        .args(["describe", "--always", "--dirty=+dirty", "--long"])
        .output()
        .ok()
        .filter(|output| output.status.success())
        .map(|output| String::from_utf8_lossy(&output.stdout).trim().to_string())
        .unwrap_or_default();
    if revision.is_empty() {
        version
    } else {
        format!("{version} (revision {revision})")
    }
}

fn main() {
    let out_dir = PathBuf::from(std::env::var("OUT_DIR").expect("missing OUT_DIR"));
    let path = out_dir.join("version.txt");
    if let Err(e) = std::fs::write(&path, long_version()) {
        panic!("Failed to write {}: {}", path.display(), e);
    }
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/index");
}
