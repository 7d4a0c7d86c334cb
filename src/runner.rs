// src/runner.rs

use crate::error::RunnerError;
use crate::model::AnalysisOutput;
use std::fs;
use std::io::{self, ErrorKind, Read};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::mpsc;
use std::thread;

/// Something that inspects a checked-out working tree and reports on it
pub trait Analyzer {
    fn analyze(&self, workdir: &Path) -> Result<AnalysisOutput, RunnerError>;
}

/// Runs a user-supplied script with the working tree as its current directory.
///
/// The script gets no arguments and no stdin. There is no timeout, so a script
/// that never exits stalls the whole run.
#[derive(Debug, Clone)]
pub struct ScriptRunner {
    script: PathBuf,
    interpreter: Option<PathBuf>,
}

impl ScriptRunner {
    /// Validates the script up front. The path is made absolute because the
    /// script runs from inside the repository, not from the caller's directory.
    pub fn new(script: &Path, interpreter: Option<&Path>) -> Result<Self, RunnerError> {
        let metadata = fs::metadata(script).map_err(|e| match e.kind() {
            ErrorKind::NotFound => RunnerError::NotFound(script.to_path_buf()),
            _ => RunnerError::Io(e),
        })?;
        if !metadata.is_file() {
            return Err(RunnerError::NotAFile(script.to_path_buf()));
        }
        if interpreter.is_none() && !is_executable(&metadata) {
            return Err(RunnerError::NotExecutable(script.to_path_buf()));
        }

        let script = fs::canonicalize(script)?;
        tracing::debug!("Using analysis script {}", script.display());

        Ok(Self {
            script,
            interpreter: interpreter.map(Path::to_path_buf),
        })
    }

    pub fn script(&self) -> &Path {
        &self.script
    }

    fn command(&self) -> Command {
        match &self.interpreter {
            Some(interpreter) => {
                let mut command = Command::new(interpreter);
                command.arg(&self.script);
                command
            }
            None => Command::new(&self.script),
        }
    }
}

impl Analyzer for ScriptRunner {
    fn analyze(&self, workdir: &Path) -> Result<AnalysisOutput, RunnerError> {
        let mut child = self
            .command()
            .current_dir(workdir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| RunnerError::Spawn {
                program: self
                    .interpreter
                    .clone()
                    .unwrap_or_else(|| self.script.clone()),
                source,
            })?;

        let (tx, rx) = mpsc::channel();
        let mut readers = Vec::with_capacity(2);
        if let Some(stdout) = child.stdout.take() {
            readers.push(forward_chunks(stdout, Stream::Stdout, tx.clone()));
        }
        if let Some(stderr) = child.stderr.take() {
            readers.push(forward_chunks(stderr, Stream::Stderr, tx.clone()));
        }
        drop(tx);

        let mut output = AnalysisOutput::default();
        for (stream, chunk) in rx {
            output.combined.extend_from_slice(&chunk);
            if stream == Stream::Stderr {
                output.stderr.extend_from_slice(&chunk);
            }
        }
        for reader in readers {
            reader
                .join()
                .map_err(|_| io::Error::new(io::ErrorKind::Other, "output reader panicked"))??;
        }

        let status = child.wait()?;
        output.success = status.success();
        output.exit_code = status.code();
        Ok(output)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stream {
    Stdout,
    Stderr,
}

/// Reads `source` until EOF on its own thread, sending each chunk as soon as
/// it arrives. Chunks from both streams meet in one channel, so the receiver
/// sees them in arrival order. That order is what the script wrote as long as
/// it does not write to both streams within the same instant.
fn forward_chunks<R>(
    mut source: R,
    stream: Stream,
    tx: mpsc::Sender<(Stream, Vec<u8>)>,
) -> thread::JoinHandle<io::Result<()>>
where
    R: Read + Send + 'static,
{
    thread::spawn(move || {
        let mut buf = [0u8; 8192];
        loop {
            match source.read(&mut buf) {
                Ok(0) => return Ok(()),
                Ok(n) => {
                    // The receiver only goes away once every sender is done.
                    let _ = tx.send((stream, buf[..n].to_vec()));
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    })
}

#[cfg(unix)]
fn is_executable(metadata: &fs::Metadata) -> bool {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode() & 0o111 != 0
}

#[cfg(not(unix))]
fn is_executable(_metadata: &fs::Metadata) -> bool {
    true
}
