//! External program execution.
//!
//! The runtime itself never spawns processes. Fixtures and the `capture`
//! command that need "run this program on this input and give me what it
//! printed" go through [`ProgramRunner`], so tests can substitute a
//! scripted runner for the real subprocess one.

use std::ffi::{OsStr, OsString};
use std::io::{self, Write};
use std::process::{ExitStatus, Stdio};
use std::string::FromUtf8Error;

use thiserror::Error;

/// Program plus arguments, without any process state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Command {
    program: OsString,
    args: Vec<OsString>,
}

impl Command {
    pub fn new(program: impl AsRef<OsStr>) -> Self {
        Command {
            program: program.as_ref().to_owned(),
            args: Vec::new(),
        }
    }

    #[must_use]
    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_owned());
        self
    }

    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|a| a.as_ref().to_owned()));
        self
    }

    pub fn program(&self) -> &OsStr {
        &self.program
    }

    pub fn get_args(&self) -> &[OsString] {
        &self.args
    }

    /// Program name for messages.
    pub fn display_name(&self) -> String {
        self.program.to_string_lossy().into_owned()
    }
}

/// Failure to run a program or read its output.
#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("failed to start `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("I/O error talking to `{program}`: {source}")]
    Io {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("`{program}` exited with {status}")]
    Failed {
        program: String,
        status: ExitStatus,
        stderr: String,
    },
    #[error("`{program}` printed invalid UTF-8: {source}")]
    InvalidOutput {
        program: String,
        #[source]
        source: FromUtf8Error,
    },
}

/// Run a program with `input` on stdin and return its stdout.
pub trait ProgramRunner {
    fn run(&self, command: &Command, input: &str) -> Result<String, RunnerError>;
}

/// Runs programs as child processes with piped stdin and stdout.
#[derive(Clone, Copy, Debug, Default)]
pub struct SubprocessRunner;

impl ProgramRunner for SubprocessRunner {
    #[tracing::instrument(level = "debug", skip_all, fields(program = %command.display_name()))]
    fn run(&self, command: &Command, input: &str) -> Result<String, RunnerError> {
        let program = command.display_name();
        let mut child = std::process::Command::new(command.program())
            .args(command.get_args())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| RunnerError::Spawn {
                program: program.clone(),
                source,
            })?;

        let io_error = |source| RunnerError::Io {
            program: program.clone(),
            source,
        };

        // Stdin is written while stdout drains.
        let stdin = child.stdin.take();
        let output = std::thread::scope(|scope| {
            let writer = scope.spawn(move || -> io::Result<()> {
                if let Some(mut stdin) = stdin {
                    stdin.write_all(input.as_bytes())?;
                }
                Ok(())
            });
            let output = child.wait_with_output();
            let written = writer
                .join()
                .unwrap_or_else(|_| Err(io::Error::other("stdin writer panicked")));
            output.and_then(|out| match written {
                // A child that exits without reading all input is not an error.
                Err(e) if e.kind() != io::ErrorKind::BrokenPipe => Err(e),
                _ => Ok(out),
            })
        })
        .map_err(io_error)?;

        if !output.status.success() {
            tracing::debug!(status = %output.status, "program failed");
            return Err(RunnerError::Failed {
                program,
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }
        String::from_utf8(output.stdout)
            .map_err(|source| RunnerError::InvalidOutput { program, source })
    }
}
