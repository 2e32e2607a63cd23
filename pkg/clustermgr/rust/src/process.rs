// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

use crate::errors::Error;
use log::{info, warn};
use std::future::Future;
use std::io::{self, Write};
use std::path::Path;
use std::process::Stdio;
use std::sync::{Mutex, PoisonError};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{ChildStdout, Command};

/// Launches external programs on behalf of the menu.
pub trait ScriptRunner {
    /// Run a script to completion, relaying its stdout line by line.
    /// A non-zero exit is an error.
    fn run_script(&self, path: &Path) -> impl Future<Output = Result<(), Error>>;

    /// Run `program` to completion and return its stdout. Stderr is inherited.
    fn capture(&self, program: &str, args: &[String]) -> impl Future<Output = Result<String, Error>>;
}

/// Runs scripts through an interpreter, copying child stdout to `sink`
/// as each line arrives. Child stderr goes straight to our stderr.
pub struct ProcessRunner<W = io::Stdout> {
    interpreter: String,
    sink: Mutex<W>,
}

impl ProcessRunner<io::Stdout> {
    pub fn new(interpreter: impl Into<String>) -> Self {
        Self::with_sink(interpreter, io::stdout())
    }
}

impl<W: Write> ProcessRunner<W> {
    pub fn with_sink(interpreter: impl Into<String>, sink: W) -> Self {
        Self {
            interpreter: interpreter.into(),
            sink: Mutex::new(sink),
        }
    }

    pub fn into_sink(self) -> W {
        self.sink.into_inner().unwrap_or_else(PoisonError::into_inner)
    }

    /// Copy child stdout to the sink line by line. Stops at the first error,
    /// dropping the pipe.
    async fn relay(&self, stdout: ChildStdout) -> io::Result<()> {
        let mut reader = BufReader::new(stdout);
        let mut buf = Vec::new();
        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf).await? == 0 {
                return Ok(());
            }
            self.emit(trim_newline(&buf))?;
        }
    }

    fn emit(&self, line: &[u8]) -> io::Result<()> {
        let mut sink = self.sink.lock().unwrap_or_else(PoisonError::into_inner);
        sink.write_all(line)?;
        sink.write_all(b"\n")?;
        sink.flush()
    }
}

fn trim_newline(buf: &[u8]) -> &[u8] {
    let buf = buf.strip_suffix(b"\n").unwrap_or(buf);
    buf.strip_suffix(b"\r").unwrap_or(buf)
}

impl<W: Write> ScriptRunner for ProcessRunner<W> {
    async fn run_script(&self, path: &Path) -> Result<(), Error> {
        let mut child = Command::new(&self.interpreter)
            .arg(path)
            .stdin(Stdio::inherit())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|source| Error::Spawn {
                program: format!("{} {}", self.interpreter, path.display()),
                source,
            })?;

        let name = path.display();
        info!("[{name}] spawned (pid={})", child.id().unwrap_or(0));

        // Even if relaying fails, the child is always waited on.
        let relayed = match child.stdout.take() {
            Some(stdout) => self.relay(stdout).await,
            None => Ok(()),
        };

        let status = child.wait().await?;
        if !status.success() {
            warn!("[{name}] exited with {status}");
            return Err(Error::ScriptFailed {
                script: path.to_path_buf(),
                status,
            });
        }
        info!("[{name}] exited with {status}");
        if let Err(e) = relayed {
            warn!("[{name}] output relay failed: {e}");
            return Err(e.into());
        }
        Ok(())
    }

    async fn capture(&self, program: &str, args: &[String]) -> Result<String, Error> {
        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stderr(Stdio::inherit())
            .output()
            .await
            .map_err(|source| Error::Spawn {
                program: program.to_string(),
                source,
            })?;

        if !output.status.success() {
            warn!("[{program}] exited with {}", output.status);
            return Err(Error::CommandFailed {
                command: std::iter::once(program)
                    .chain(args.iter().map(String::as_str))
                    .collect::<Vec<_>>()
                    .join(" "),
                status: output.status,
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
