//! Spawns the build command and streams its output line by line.
//!
//! stdout and stderr are each read on their own thread and merged through a
//! channel, so lines arrive in the order the readers saw them.

use anyhow::{Context, Result};
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputStream {
    Stdout,
    Stderr,
}

/// One line of output, newline stripped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLine {
    pub stream: OutputStream,
    pub text: String,
}

pub enum Received {
    Line(OutputLine),
    /// Nothing arrived within the poll interval.
    Idle,
    /// Both streams are closed.
    Closed,
}

pub struct RunningCommand {
    child: Child,
    receiver: Receiver<OutputLine>,
    readers: Vec<JoinHandle<()>>,
}

/// Starts `program args...` in `cwd` with both output streams captured.
pub fn spawn_command(program: &str, args: &[String], cwd: &Path) -> Result<RunningCommand> {
    let mut child = Command::new(program)
        .args(args)
        .current_dir(cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .with_context(|| format!("failed to spawn `{}` in {}", program, cwd.display()))?;
    log::debug!("spawned `{}` {:?} as pid {}", program, args, child.id());

    let (sender, receiver) = mpsc::channel();
    let mut readers = Vec::new();
    if let Some(stdout) = child.stdout.take() {
        readers.push(spawn_reader(stdout, OutputStream::Stdout, sender.clone()));
    }
    if let Some(stderr) = child.stderr.take() {
        readers.push(spawn_reader(stderr, OutputStream::Stderr, sender));
    }
    Ok(RunningCommand {
        child,
        receiver,
        readers,
    })
}

fn spawn_reader<R: Read + Send + 'static>(
    source: R,
    stream: OutputStream,
    sender: Sender<OutputLine>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let mut reader = BufReader::new(source);
        let mut buf = Vec::new();
        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf) {
                Ok(0) => break,
                Ok(_) => {
                    let text = String::from_utf8_lossy(&buf)
                        .trim_end_matches(&['\n', '\r'][..])
                        .to_string();
                    if sender.send(OutputLine { stream, text }).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    log::warn!("error reading {:?}: {}", stream, e);
                    break;
                }
            }
        }
    })
}

impl RunningCommand {
    pub fn pid(&self) -> u32 {
        self.child.id()
    }

    /// Waits up to `timeout` for the next line.
    pub fn recv_timeout(&self, timeout: Duration) -> Received {
        match self.receiver.recv_timeout(timeout) {
            Ok(line) => Received::Line(line),
            Err(RecvTimeoutError::Timeout) => Received::Idle,
            Err(RecvTimeoutError::Disconnected) => Received::Closed,
        }
    }

    pub fn kill(&mut self) -> std::io::Result<()> {
        self.child.kill()
    }

    /// Reaps the process. Termination by signal is reported as -1.
    pub fn wait(mut self) -> Result<i32> {
        for reader in self.readers.drain(..) {
            if reader.join().is_err() {
                log::warn!("output reader thread panicked");
            }
        }
        let status = self.child.wait().context("failed to wait for the build command")?;
        Ok(status.code().unwrap_or(-1))
    }
}
