use std::path::{Path, PathBuf};
use std::time::Duration;

use tempfile::TempDir;
use termcolor::Buffer;

use hazmat_exec::{Interrupt, ProcessRunner, Validator};
use hazmat_format::ui::Reporter;
use hazmat_lang::{LanguageConfig, Solution};
use hazmat_rust::orchestrator::TestOrchestrator;

use super::{script, setup, write, TEST_CONFIG};

/// A temporary workspace with the test languages, where the files of a scenario are written.
pub struct TestInterface {
    pub config: LanguageConfig,
    pub interrupt: Interrupt,
    tempdir: TempDir,
}

impl TestInterface {
    pub fn new() -> TestInterface {
        setup();
        TestInterface {
            config: LanguageConfig::parse(TEST_CONFIG).unwrap(),
            interrupt: Interrupt::new(),
            tempdir: TempDir::new().expect("Cannot create tempdir"),
        }
    }

    /// Forget a triggered ^C: the orchestrators made from now on can run again.
    pub fn reset_interrupt(&mut self) {
        self.interrupt = Interrupt::new();
    }

    /// The root of the workspace.
    pub fn path(&self) -> &Path {
        self.tempdir.path()
    }

    /// Write an executable shell script in the workspace.
    pub fn script(&self, name: &str, body: &str) -> PathBuf {
        script(self.path(), name, body)
    }

    /// Write a file in the workspace.
    pub fn file(&self, name: &str, content: &str) -> PathBuf {
        write(self.path(), name, content)
    }

    /// Write the case `<dir>/<stem>.in` and `<dir>/<stem>.out`.
    pub fn case(&self, dir: &str, stem: &str, input: &str, output: &str) {
        self.file(&format!("{dir}/{stem}.in"), input);
        self.file(&format!("{dir}/{stem}.out"), output);
    }

    /// A solution with the given time limit.
    pub fn solution(&self, path: &Path, timeout: Duration) -> Solution {
        Solution::new(path, &self.config, timeout).unwrap()
    }

    /// An orchestrator with the `diff` validator, printing everything into a buffer.
    pub fn orchestrator(&self) -> TestOrchestrator<Buffer> {
        TestOrchestrator::with_reporter(
            ProcessRunner::new(self.interrupt.clone()),
            Validator::default(),
            Reporter::with_stream(Buffer::no_color(), 3),
        )
    }
}

/// What the orchestrator printed.
pub fn printed(orchestrator: TestOrchestrator<Buffer>) -> String {
    String::from_utf8(orchestrator.reporter.into_inner().into_inner()).unwrap()
}
