use std::io::Read;
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

#[cfg(unix)]
use std::os::unix::process::CommandExt;

use tracing::debug;

use crate::errors::BenchError;

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Runs one command and reports its wall-clock duration in seconds.
pub trait Timer {
    fn time(&mut self, command: &str) -> Result<f64, BenchError>;
}

/// Times commands with the shell's `time` keyword.
///
/// The command's stdout goes to `/dev/null`. The shell's stderr, which carries
/// both the timing line and anything the command complains about, is merged
/// into the captured stream, so a noisy or missing command fails the parse.
#[derive(Debug, Clone)]
pub struct ShellTimer {
    shell: String,
    timeout: Option<Duration>,
}

impl ShellTimer {
    pub fn new(timeout: Option<Duration>) -> Self {
        Self {
            shell: "bash".to_string(),
            timeout,
        }
    }

    pub fn with_shell(mut self, shell: &str) -> Self {
        self.shell = shell.to_string();
        self
    }

    fn wait_for_exit(&self, child: &mut Child, command: &str) -> Result<(), BenchError> {
        let Some(timeout) = self.timeout else {
            child.wait().map_err(|source| BenchError::SpawnError {
                command: command.to_string(),
                source,
            })?;
            return Ok(());
        };

        let start = Instant::now();
        loop {
            match child.try_wait() {
                Ok(Some(_)) => return Ok(()),
                Ok(None) => {}
                Err(source) => return Err(abandon(child, command, source)),
            }
            if start.elapsed() >= timeout {
                debug!(command, ?timeout, "timeout exceeded, killing process group");
                kill_process_group(child);
                return Err(BenchError::Timeout {
                    command: command.to_string(),
                    timeout,
                });
            }
            thread::sleep(POLL_INTERVAL);
        }
    }
}

impl Timer for ShellTimer {
    fn time(&mut self, command: &str) -> Result<f64, BenchError> {
        let mut cmd = Command::new(&self.shell);
        cmd.arg("-c")
            .arg(wrap_command(command))
            .env("LC_ALL", "C")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null());

        // Own process group so a timeout can take down grandchildren too.
        #[cfg(unix)]
        cmd.process_group(0);

        let mut child = cmd.spawn().map_err(|source| BenchError::SpawnError {
            command: command.to_string(),
            source,
        })?;

        let mut stdout = child.stdout.take();
        let reader = thread::spawn(move || {
            let mut buf = String::new();
            if let Some(out) = stdout.as_mut() {
                let _ = out.read_to_string(&mut buf);
            }
            buf
        });

        let waited = self.wait_for_exit(&mut child, command);
        let output = reader.join().unwrap_or_default();
        waited?;

        debug!(command, output = output.trim(), "command finished");
        parse_timing(command, &output)
    }
}

/// Kill and reap a child we can no longer poll.
fn abandon(child: &mut Child, command: &str, source: std::io::Error) -> BenchError {
    debug!(command, %source, "lost track of child, killing process group");
    kill_process_group(child);
    BenchError::SpawnError {
        command: command.to_string(),
        source,
    }
}

/// Shell script that prints the elapsed seconds of `command` with three decimals.
pub fn wrap_command(command: &str) -> String {
    format!("exec 2>&1; TIMEFORMAT=%3R; time {{ {command}; }} > /dev/null")
}

/// Parse the captured output of a wrapped command into seconds.
pub fn parse_timing(command: &str, output: &str) -> Result<f64, BenchError> {
    let parse_error = || BenchError::ParseError {
        command: command.to_string(),
        output: output.to_string(),
    };
    let secs: f64 = output.trim().parse().map_err(|_| parse_error())?;
    if !secs.is_finite() || secs < 0.0 {
        return Err(parse_error());
    }
    Ok(secs)
}

#[cfg(unix)]
fn kill_process_group(child: &mut Child) {
    use nix::sys::signal::{Signal, killpg};
    use nix::unistd::Pid;

    let pgid = Pid::from_raw(child.id() as i32);
    if let Err(err) = killpg(pgid, Signal::SIGKILL) {
        debug!(%err, "killpg failed, falling back to killing the child");
        let _ = child.kill();
    }
    let _ = child.wait();
}

#[cfg(not(unix))]
fn kill_process_group(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}
