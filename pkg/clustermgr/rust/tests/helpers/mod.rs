// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Output, Stdio};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

pub const RUNNING: &str = "1718000000,master-1,state,running";
pub const POWEROFF: &str = "1718000000,master-1,state,poweroff";

/// A scratch workspace: a scripts directory, a config file pointing at it,
/// and a fake `vagrant status` that prints a fixed machine-readable record.
pub struct Fixture {
    pub dir: tempfile::TempDir,
}

impl Fixture {
    pub fn new(status_line: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("status-ran");
        Self::in_dir(dir, &format!("touch {}; echo {status_line}", marker.display()))
    }

    /// Like [`Fixture::new`], but the status command exits non-zero.
    pub fn with_failing_status() -> Self {
        Self::with_status_command("exit 1")
    }

    /// Use `script` (run by `/bin/sh -c`) as the status command.
    pub fn with_status_command(script: &str) -> Self {
        Self::in_dir(tempfile::tempdir().unwrap(), script)
    }

    fn in_dir(dir: tempfile::TempDir, status_script: &str) -> Self {
        std::fs::create_dir(dir.path().join("scripts")).unwrap();
        let fixture = Self { dir };
        fixture.write_config(&format!(
            "status_command:\n  - /bin/sh\n  - -c\n  - \"{status_script}\"\n"
        ));
        fixture
    }

    fn write_config(&self, status_yaml: &str) {
        let yaml = format!(
            "scripts_dir: {}\nlog_file: {}\ninterpreter: /bin/sh\n{status_yaml}",
            self.scripts_dir().display(),
            self.log_file().display(),
        );
        std::fs::write(self.config_path(), yaml).unwrap();
    }

    pub fn config_path(&self) -> PathBuf {
        self.dir.path().join("clustermgr.yaml")
    }

    pub fn scripts_dir(&self) -> PathBuf {
        self.dir.path().join("scripts")
    }

    pub fn log_file(&self) -> PathBuf {
        self.dir.path().join("cluster-manager.log")
    }

    /// Created every time the status command runs.
    pub fn status_marker(&self) -> PathBuf {
        self.dir.path().join("status-ran")
    }

    /// Write a script that also drops `<name>.ran` next to the scripts dir.
    pub fn write_script(&self, name: &str, body: &str) {
        let marker = self.ran_marker(name);
        let script = format!("touch {}\n{body}", marker.display());
        std::fs::write(self.scripts_dir().join(name), script).unwrap();
    }

    pub fn ran_marker(&self, name: &str) -> PathBuf {
        self.dir.path().join(format!("{name}.ran"))
    }

    pub fn script_ran(&self, name: &str) -> bool {
        self.ran_marker(name).exists()
    }

    /// Run the menu with the fixture's config, feeding `input` on stdin.
    pub fn run(&self, input: &str) -> Session {
        self.run_with_args(&[], input)
    }

    pub fn run_with_args(&self, extra: &[&str], input: &str) -> Session {
        let config = self.config_path();
        let mut args = vec!["--config", config.to_str().unwrap()];
        args.extend_from_slice(extra);
        run_menu(&args, input)
    }

    /// Start the menu with stdin held open, for driving it interactively.
    pub fn spawn(&self) -> MenuHandle {
        MenuHandle::start(&self.config_path())
    }
}

/// Handle to a running menu whose stdin stays open until dropped.
pub struct MenuHandle {
    child: Child,
    output: Arc<Mutex<Vec<u8>>>,
    _reader_thread: std::thread::JoinHandle<()>,
}

impl MenuHandle {
    fn start(config: &Path) -> Self {
        let mut child = menu_command(&["--config", config.to_str().unwrap()])
            .spawn()
            .expect("failed to start clustermgr");

        let mut stdout = child.stdout.take().expect("failed to capture stdout");
        let output = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&output);
        // The prompt has no trailing newline, so read raw chunks, not lines.
        let reader_thread = std::thread::spawn(move || {
            let mut chunk = [0u8; 1024];
            loop {
                match stdout.read(&mut chunk) {
                    Ok(0) | Err(_) => break,
                    Ok(n) => sink.lock().unwrap().extend_from_slice(&chunk[..n]),
                }
            }
        });

        Self {
            child,
            output,
            _reader_thread: reader_thread,
        }
    }

    pub fn stdout(&self) -> String {
        String::from_utf8_lossy(&self.output.lock().unwrap()).into_owned()
    }

    /// Wait until stdout contains `pattern`, or timeout.
    pub fn wait_for_output(&self, pattern: &str, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            if self.stdout().contains(pattern) {
                return true;
            }
            if Instant::now() >= deadline {
                return false;
            }
            std::thread::sleep(Duration::from_millis(50));
        }
    }

    pub fn send_signal(&self, sig: Signal) {
        let pid = self.child.id() as i32;
        signal::kill(Pid::from_raw(pid), sig).expect("failed to send signal to clustermgr");
    }

    /// Wait for the menu to exit within `timeout`; kill it otherwise.
    pub fn wait_with_timeout(&mut self, timeout: Duration) -> ExitStatus {
        let deadline = Instant::now() + timeout;
        loop {
            match self.child.try_wait().expect("failed to check clustermgr status") {
                Some(status) => return status,
                None => {
                    if Instant::now() >= deadline {
                        self.child.kill().ok();
                        return self.child.wait().expect("failed to wait on killed clustermgr");
                    }
                    std::thread::sleep(Duration::from_millis(50));
                }
            }
        }
    }
}

impl Drop for MenuHandle {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

fn menu_command(args: &[&str]) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_clustermgr"));
    cmd.args(args)
        .env("NO_COLOR", "1")
        .env_remove("CLUSTERMGR_CONFIG")
        .env_remove("CLUSTERMGR_SCRIPTS_DIR")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    cmd
}

pub struct Session {
    pub output: Output,
}

impl Session {
    pub fn code(&self) -> Option<i32> {
        self.output.status.code()
    }

    pub fn stdout(&self) -> String {
        String::from_utf8_lossy(&self.output.stdout).into_owned()
    }

    pub fn stderr(&self) -> String {
        String::from_utf8_lossy(&self.output.stderr).into_owned()
    }
}

/// Start the binary, write all of `input` to its stdin, close it and wait.
pub fn run_menu(args: &[&str], input: &str) -> Session {
    let mut child = menu_command(args)
        .spawn()
        .expect("failed to start clustermgr");

    {
        let mut stdin = child.stdin.take().expect("failed to open stdin");
        // The binary may exit before reading everything; a broken pipe is fine.
        let _ = stdin.write_all(input.as_bytes());
    }

    let output = child.wait_with_output().expect("failed to wait on clustermgr");
    Session { output }
}

pub fn read_log(path: &Path) -> String {
    std::fs::read_to_string(path).unwrap_or_default()
}
