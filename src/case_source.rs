//! Where the test cases come from: the `*.in`/`*.out` pairs of a directory, a numbered range of
//! files to generate, or the directories of a subtree.

use std::ops::Range;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Error};
use walkdir::WalkDir;

/// Extension of the input files.
pub const INPUT_EXTENSION: &str = "in";
/// Extension of the expected output files.
pub const OUTPUT_EXTENSION: &str = "out";

/// A test case: an input file and its expected output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Case {
    /// The name shown in the reports.
    pub name: String,
    /// The input file.
    pub input: PathBuf,
    /// The expected output file.
    pub output: PathBuf,
}

impl Case {
    /// The case with input `<in_dir>/<stem>.in` and output `<out_dir>/<stem>.out`.
    pub fn from_stem(stem: &str, in_dir: &Path, out_dir: &Path) -> Case {
        let input = in_dir.join(format!("{stem}.{INPUT_EXTENSION}"));
        let output = out_dir.join(format!("{stem}.{OUTPUT_EXTENSION}"));
        Case {
            name: input.display().to_string(),
            input,
            output,
        }
    }
}

/// The cases of a directory: every `*.in` file of `in_dir` with a `*.out` file with the same stem
/// in `out_dir`, sorted by input path. Inputs without an output are ignored.
pub fn scan_directory(in_dir: &Path, out_dir: &Path) -> Result<Vec<Case>, Error> {
    let entries = std::fs::read_dir(in_dir)
        .with_context(|| format!("Failed to list the tests in {}", in_dir.display()))?;
    let mut cases = vec![];
    for entry in entries {
        let path = entry
            .with_context(|| format!("Failed to list the tests in {}", in_dir.display()))?
            .path();
        if !path.is_file() || path.extension().map_or(true, |ext| ext != INPUT_EXTENSION) {
            continue;
        }
        let Some(stem) = path.file_stem() else {
            continue;
        };
        let mut output_name = stem.to_os_string();
        output_name.push(format!(".{OUTPUT_EXTENSION}"));
        let output = out_dir.join(output_name);
        if output.is_file() {
            cases.push(Case {
                name: path.display().to_string(),
                input: path,
                output,
            });
        } else {
            trace!("Skipping {}: {} is missing", path.display(), output.display());
        }
    }
    cases.sort_by(|a, b| a.input.cmp(&b.input));
    Ok(cases)
}

/// The cases `<prefix><n>` for every `n` in `range` (end excluded), with `n` padded with zeros to
/// `zero_fill` digits.
pub fn numeric_range(
    prefix: &str,
    range: Range<u64>,
    zero_fill: usize,
    in_dir: &Path,
    out_dir: &Path,
) -> Vec<Case> {
    range
        .map(|n| {
            let stem = format!("{prefix}{n:0zero_fill$}");
            Case::from_stem(&stem, in_dir, out_dir)
        })
        .collect()
}

/// The default zero padding of a range ending at `end`: the number of digits of `end`.
pub fn default_zero_fill(end: u64) -> usize {
    end.to_string().len()
}

/// All the directories of the subtree rooted in `root`, root included, in lexicographic order.
pub fn subtree_dirs(root: &Path) -> Result<Vec<PathBuf>, Error> {
    if !root.is_dir() {
        bail!("Directory {} does not exist", root.display());
    }
    let mut dirs = vec![];
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.with_context(|| format!("Failed to walk {}", root.display()))?;
        if entry.file_type().is_dir() {
            dirs.push(entry.into_path());
        }
    }
    Ok(dirs)
}

/// The directory of the outputs of `dir`, a subdirectory of `in_root`, when the outputs are in a
/// tree rooted in `out_root` with the same shape.
pub fn mirror_dir(dir: &Path, in_root: &Path, out_root: &Path) -> PathBuf {
    match dir.strip_prefix(in_root) {
        Ok(relative) if relative.as_os_str().is_empty() => out_root.to_owned(),
        Ok(relative) => out_root.join(relative),
        Err(_) => dir.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use speculoos::prelude::*;
    use tempfile::TempDir;

    use super::*;

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, "").unwrap();
    }

    #[test]
    fn test_scan_directory() {
        let tmpdir = TempDir::new().unwrap();
        let dir = tmpdir.path();
        for name in ["b.in", "b.out", "a.in", "a.out", "c.in", "notes.txt", "d.out"] {
            touch(&dir.join(name));
        }
        let cases = scan_directory(dir, dir).unwrap();
        let names: Vec<_> = cases
            .iter()
            .map(|c| c.input.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.in", "b.in"]);
        assert_eq!(cases[0].output, dir.join("a.out"));
        assert_eq!(cases[0].name, dir.join("a.in").display().to_string());
    }

    #[test]
    fn test_scan_directory_separate_outputs() {
        let tmpdir = TempDir::new().unwrap();
        let inputs = tmpdir.path().join("in");
        let outputs = tmpdir.path().join("out");
        touch(&inputs.join("x.in"));
        touch(&inputs.join("y.in"));
        touch(&outputs.join("y.out"));
        let cases = scan_directory(&inputs, &outputs).unwrap();
        assert_that!(cases.len()).is_equal_to(1);
        assert_eq!(cases[0].output, outputs.join("y.out"));
    }

    #[test]
    fn test_scan_missing_directory() {
        let tmpdir = TempDir::new().unwrap();
        let missing = tmpdir.path().join("missing");
        assert!(scan_directory(&missing, &missing).is_err());
    }

    #[test]
    fn test_numeric_range() {
        let cases = numeric_range("t", 8..11, 2, Path::new("in"), Path::new("out"));
        let inputs: Vec<_> = cases.iter().map(|c| c.input.clone()).collect();
        assert_eq!(
            inputs,
            vec![
                PathBuf::from("in/t08.in"),
                PathBuf::from("in/t09.in"),
                PathBuf::from("in/t10.in")
            ]
        );
        assert_eq!(cases[2].output, PathBuf::from("out/t10.out"));
    }

    #[test]
    fn test_numeric_range_empty() {
        assert!(numeric_range("t", 5..5, 1, Path::new("."), Path::new(".")).is_empty());
    }

    #[test]
    fn test_default_zero_fill() {
        assert_eq!(default_zero_fill(9), 1);
        assert_eq!(default_zero_fill(10), 2);
        assert_eq!(default_zero_fill(100), 3);
    }

    #[test]
    fn test_subtree_dirs() {
        let tmpdir = TempDir::new().unwrap();
        let root = tmpdir.path();
        std::fs::create_dir_all(root.join("b/inner")).unwrap();
        std::fs::create_dir_all(root.join("a")).unwrap();
        touch(&root.join("a/1.in"));
        let dirs = subtree_dirs(root).unwrap();
        assert_eq!(
            dirs,
            vec![
                root.to_owned(),
                root.join("a"),
                root.join("b"),
                root.join("b/inner")
            ]
        );
    }

    #[test]
    fn test_mirror_dir() {
        let root = Path::new("Tests");
        let out = Path::new("Outputs");
        assert_eq!(mirror_dir(root, root, out), PathBuf::from("Outputs"));
        assert_eq!(
            mirror_dir(Path::new("Tests/sub/x"), root, out),
            PathBuf::from("Outputs/sub/x")
        );
    }
}
