use std::ffi::{OsStr, OsString};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use thiserror::Error;

use crate::{Interrupt, TerminationStatus};

/// How often the runner checks whether the child exited, timed out or got interrupted.
const POLL_INTERVAL: Duration = Duration::from_millis(5);

/// Where the standard input of a child comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StdinSource {
    /// `/dev/null`.
    Null,
    /// The content of a file, e.g. the input of a case.
    File(PathBuf),
    /// A buffer written to a pipe, e.g. the message for a generator.
    Bytes(Vec<u8>),
}

/// Where a standard output stream of a child goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    /// `/dev/null`.
    Discard,
    /// The same stream of hazmat.
    Inherit,
    /// A file, truncated before the child starts.
    File(PathBuf),
}

/// A program to start, with its arguments, redirections and limits.
///
/// ```
/// use std::time::Duration;
/// use hazmat_exec::{Invocation, OutputTarget, StdinSource};
///
/// let mut invocation = Invocation::new("./solution");
/// invocation
///     .stdin(StdinSource::File("input.txt".into()))
///     .stdout(OutputTarget::File("output.txt".into()))
///     .timeout(Duration::from_secs(2));
/// assert!(invocation.args.is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct Invocation {
    /// The program to execute. Bare names are searched in `$PATH` by the OS.
    pub program: PathBuf,
    /// The command line arguments.
    pub args: Vec<OsString>,
    /// The standard input of the program.
    pub stdin: StdinSource,
    /// The standard output of the program.
    pub stdout: OutputTarget,
    /// The standard error of the program.
    pub stderr: OutputTarget,
    /// Wall-clock time limit. `None` waits forever.
    pub timeout: Option<Duration>,
}

/// The outcome of a child that has been waited for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunOutcome {
    /// How the child ended.
    pub status: TerminationStatus,
    /// Wall-clock seconds, rounded to the hundredth. Zero when the child timed out.
    pub duration: f64,
}

/// The reasons why a child could not be run to completion.
#[derive(Debug, Error)]
pub enum RunError {
    /// The process could not be started.
    #[error("Failed to start {program}")]
    Spawn {
        /// The program that failed to start.
        program: String,
        /// The error from the OS.
        #[source]
        source: std::io::Error,
    },
    /// A redirection or the wait failed.
    #[error("{context}")]
    Io {
        /// What was being done.
        context: String,
        /// The error from the OS.
        #[source]
        source: std::io::Error,
    },
    /// The run has been cancelled with ^C while the child was running. The child has been killed.
    #[error("Execution cancelled by the user")]
    Interrupted,
}

/// Starts external programs one at a time, enforcing the timeouts and honouring the `Interrupt`.
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    interrupt: Interrupt,
    poll_interval: Duration,
}

impl Invocation {
    /// Invocation of `program` without arguments, with no stdin, discarding the outputs and without
    /// time limit.
    pub fn new<P: Into<PathBuf>>(program: P) -> Invocation {
        Invocation {
            program: program.into(),
            args: vec![],
            stdin: StdinSource::Null,
            stdout: OutputTarget::Discard,
            stderr: OutputTarget::Discard,
            timeout: None,
        }
    }

    /// Append an argument.
    pub fn arg<S: AsRef<OsStr>>(&mut self, arg: S) -> &mut Self {
        self.args.push(arg.as_ref().to_owned());
        self
    }

    /// Append some arguments.
    pub fn args<I, S>(&mut self, args: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|a| a.as_ref().to_owned()));
        self
    }

    /// Set the standard input.
    pub fn stdin(&mut self, stdin: StdinSource) -> &mut Self {
        self.stdin = stdin;
        self
    }

    /// Set the standard output.
    pub fn stdout(&mut self, stdout: OutputTarget) -> &mut Self {
        self.stdout = stdout;
        self
    }

    /// Set the standard error.
    pub fn stderr(&mut self, stderr: OutputTarget) -> &mut Self {
        self.stderr = stderr;
        self
    }

    /// Set the wall-clock time limit.
    pub fn timeout(&mut self, timeout: Duration) -> &mut Self {
        self.timeout = Some(timeout);
        self
    }
}

impl RunError {
    fn io<S: Into<String>>(context: S, source: std::io::Error) -> RunError {
        RunError::Io {
            context: context.into(),
            source,
        }
    }
}

impl ProcessRunner {
    /// Make a runner that stops as soon as `interrupt` is triggered.
    pub fn new(interrupt: Interrupt) -> ProcessRunner {
        ProcessRunner {
            interrupt,
            poll_interval: POLL_INTERVAL,
        }
    }

    /// The token this runner listens to.
    pub fn interrupt(&self) -> &Interrupt {
        &self.interrupt
    }

    /// Start the program and block until it exits, times out or the run is interrupted.
    ///
    /// - A timed out child is killed (with its process group) and `Timeout` is returned with a
    ///   duration of zero. Its partial output is left where it is.
    /// - If the `Interrupt` is triggered while waiting, the child is killed and
    ///   `RunError::Interrupted` is returned, whatever the child did.
    pub fn run(&self, invocation: &Invocation) -> Result<RunOutcome, RunError> {
        if self.interrupt.is_triggered() {
            return Err(RunError::Interrupted);
        }
        let mut command = Command::new(&invocation.program);
        command.args(&invocation.args);
        command.stdin(match &invocation.stdin {
            StdinSource::Null => Stdio::null(),
            StdinSource::Bytes(_) => Stdio::piped(),
            StdinSource::File(path) => Stdio::from(File::open(path).map_err(|e| {
                RunError::io(format!("Failed to open stdin {}", path.display()), e)
            })?),
        });
        command.stdout(output_stdio(&invocation.stdout)?);
        command.stderr(output_stdio(&invocation.stderr)?);
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            // a group of its own, so that a timeout kills the grandchildren too
            command.process_group(0);
        }

        trace!("Running {:?}", command);
        let child = command.spawn().map_err(|source| RunError::Spawn {
            program: invocation.program.display().to_string(),
            source,
        })?;
        let start = Instant::now();
        let mut child = scopeguard::guard(child, |mut child| {
            if let Ok(None) = child.try_wait() {
                kill_tree(&mut child);
                let _ = child.wait();
            }
        });
        let writer = match &invocation.stdin {
            StdinSource::Bytes(bytes) => Some(feed_stdin(&mut child, bytes.clone())?),
            _ => None,
        };

        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) => {}
                Err(e) => {
                    return Err(RunError::io(
                        format!("Failed to wait for {}", invocation.program.display()),
                        e,
                    ))
                }
            }
            if self.interrupt.is_triggered() {
                debug!("Killing {} after ^C", invocation.program.display());
                kill_tree(&mut child);
                let _ = child.wait();
                return Err(RunError::Interrupted);
            }
            if let Some(timeout) = invocation.timeout {
                if start.elapsed() >= timeout {
                    debug!(
                        "{} exceeded the timeout of {:?}",
                        invocation.program.display(),
                        timeout
                    );
                    kill_tree(&mut child);
                    let _ = child.wait();
                    join_writer(writer);
                    return Ok(RunOutcome {
                        status: TerminationStatus::Timeout,
                        duration: 0.0,
                    });
                }
            }
            std::thread::sleep(self.poll_interval);
        };
        let duration = round_duration(start.elapsed());
        join_writer(writer);
        // the child may have died because of the same ^C
        if self.interrupt.is_triggered() {
            return Err(RunError::Interrupted);
        }
        let status = TerminationStatus::from_exit_status(&status);
        trace!(
            "{} ended with {:?} in {:.2}s",
            invocation.program.display(),
            status,
            duration
        );
        Ok(RunOutcome { status, duration })
    }
}

fn output_stdio(target: &OutputTarget) -> Result<Stdio, RunError> {
    Ok(match target {
        OutputTarget::Discard => Stdio::null(),
        OutputTarget::Inherit => Stdio::inherit(),
        OutputTarget::File(path) => Stdio::from(File::create(path).map_err(|e| {
            RunError::io(format!("Failed to create output {}", path.display()), e)
        })?),
    })
}

/// Write `bytes` to the stdin of the child from another thread, so that a child that does not read
/// its input cannot block the runner.
fn feed_stdin(child: &mut Child, bytes: Vec<u8>) -> Result<JoinHandle<()>, RunError> {
    let mut stdin = child.stdin.take().ok_or_else(|| {
        RunError::io(
            "Stdin of the child is not piped",
            std::io::Error::from(std::io::ErrorKind::BrokenPipe),
        )
    })?;
    std::thread::Builder::new()
        .name("stdin writer".into())
        .spawn(move || {
            if let Err(e) = stdin.write_all(&bytes) {
                if e.kind() != std::io::ErrorKind::BrokenPipe {
                    warn!("Failed to write to the stdin of the child: {}", e);
                }
            }
        })
        .map_err(|e| RunError::io("Failed to spawn the stdin writer thread", e))
}

fn join_writer(writer: Option<JoinHandle<()>>) {
    if let Some(writer) = writer {
        if writer.join().is_err() {
            warn!("The stdin writer thread panicked");
        }
    }
}

fn kill_tree(child: &mut Child) {
    #[cfg(unix)]
    {
        use nix::sys::signal::{killpg, Signal};
        use nix::unistd::Pid;
        if let Err(e) = killpg(Pid::from_raw(child.id() as i32), Signal::SIGKILL) {
            debug!("killpg of {} failed: {}", child.id(), e);
        }
    }
    let _ = child.kill();
}

fn round_duration(elapsed: Duration) -> f64 {
    (elapsed.as_secs_f64() * 100.0).round() / 100.0
}

/// Find the path of a program to execute.
///
/// Paths with a directory component are kept as they are. Bare names are searched in `$PATH`
/// first, then in the current directory.
pub fn resolve_program<P: AsRef<Path>>(program: P) -> PathBuf {
    let program = program.as_ref();
    if program.is_absolute() || program.components().count() > 1 {
        return program.to_owned();
    }
    match which::which(program) {
        Ok(path) => path,
        Err(_) if program.is_file() => Path::new(".").join(program),
        Err(_) => program.to_owned(),
    }
}

/// The absolute version of `path`, resolving the symlinks when the file exists.
pub fn absolute_path<P: AsRef<Path>>(path: P) -> std::io::Result<PathBuf> {
    let path = path.as_ref();
    match std::fs::canonicalize(path) {
        Ok(path) => Ok(path),
        Err(_) if path.is_absolute() => Ok(path.to_owned()),
        Err(_) => Ok(std::env::current_dir()?.join(path)),
    }
}
