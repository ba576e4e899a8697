//! Boundary for producing expected outputs from a reference solution.
//!
//! The engine never runs solutions itself; callers plug a [`SolutionRunner`]
//! in and map every data group through it. [`CommandRunner`] runs an
//! external program with the group on stdin. It applies no sandboxing.

use std::io::{Read, Write};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::errors::GenerationError;

/// Default wall-clock budget for one solution run.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
const POLL_INTERVAL: Duration = Duration::from_millis(5);

/// Produces the expected output for one data group.
pub trait SolutionRunner {
    fn run(&self, input: &str) -> Result<String, GenerationError>;
}

impl<F> SolutionRunner for F
where
    F: Fn(&str) -> Result<String, GenerationError>,
{
    fn run(&self, input: &str) -> Result<String, GenerationError> {
        self(input)
    }
}

/// Runs an external program, feeding the input on stdin and returning
/// trimmed stdout.
#[derive(Debug, Clone)]
pub struct CommandRunner {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl CommandRunner {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

impl SolutionRunner for CommandRunner {
    fn run(&self, input: &str) -> Result<String, GenerationError> {
        let start = Instant::now();
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let mut child = command.spawn().map_err(|err| {
            GenerationError::Execution(format!("failed to start '{}': {err}", self.program))
        })?;

        let stdin = child.stdin.take();
        let payload = input.as_bytes().to_vec();
        let writer = thread::spawn(move || {
            if let Some(mut stdin) = stdin {
                // A solution may exit without reading all of its input.
                let _ = stdin.write_all(&payload);
            }
        });
        let stdout = spawn_reader(child.stdout.take());
        let stderr = spawn_reader(child.stderr.take());

        let status = wait_with_timeout(&mut child, self.timeout);
        let _ = writer.join();
        let stdout = stdout.join().unwrap_or_default();
        let stderr = stderr.join().unwrap_or_default();

        let status = status.map_err(|err| match err {
            WaitError::TimedOut => GenerationError::Execution(format!(
                "'{}' timed out after {} ms",
                self.program,
                self.timeout.as_millis()
            )),
            WaitError::Io(err) => GenerationError::Execution(format!(
                "failed waiting for '{}': {err}",
                self.program
            )),
        })?;

        if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr);
            return Err(GenerationError::Execution(format!(
                "'{}' exited with {}: {}",
                self.program,
                status
                    .code()
                    .map_or_else(|| "a signal".to_string(), |code| format!("status {code}")),
                stderr.trim()
            )));
        }

        debug!(
            program = %self.program,
            duration_ms = start.elapsed().as_millis() as u64,
            "solution finished"
        );
        Ok(String::from_utf8_lossy(&stdout).trim().to_string())
    }
}

/// Run every group through `runner`, stopping at the first failure.
pub fn solve_all(
    runner: &dyn SolutionRunner,
    groups: &[String],
) -> Result<Vec<String>, GenerationError> {
    info!(cases = groups.len(), "computing expected outputs");
    groups
        .iter()
        .enumerate()
        .map(|(idx, group)| {
            runner.run(group).map_err(|err| {
                GenerationError::Execution(format!("case {}: {err}", idx + 1))
            })
        })
        .collect()
}

enum WaitError {
    TimedOut,
    Io(std::io::Error),
}

fn spawn_reader<R: Read + Send + 'static>(handle: Option<R>) -> thread::JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut handle) = handle {
            let _ = handle.read_to_end(&mut buf);
        }
        buf
    })
}

/// Poll the child until it exits; kill and reap it once `timeout` elapses.
fn wait_with_timeout(child: &mut Child, timeout: Duration) -> Result<ExitStatus, WaitError> {
    let deadline = Instant::now() + timeout;
    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Ok(status),
            Ok(None) if Instant::now() >= deadline => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(WaitError::TimedOut);
            }
            Ok(None) => thread::sleep(POLL_INTERVAL),
            Err(err) => return Err(WaitError::Io(err)),
        }
    }
}
