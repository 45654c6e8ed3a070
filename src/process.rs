//! Blocking execution of external tools, bound to a cancellation token.

use std::io::Read;
use std::process::{Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use crate::{OutlineError, OutlineResult};

const POLL_INTERVAL: Duration = Duration::from_millis(10);
/// How long stderr may stay open after the tool itself has exited.
const STDERR_GRACE: Duration = Duration::from_millis(500);

/// Shared flag used to abandon an in-flight outline run.
///
/// Clones observe the same flag, so one can be handed to another thread and
/// cancelled from there. A cancelled run kills any child process it started.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Fail with [`OutlineError::Cancelled`] once the token has been cancelled.
    pub fn check(&self) -> OutlineResult<()> {
        if self.is_cancelled() {
            Err(OutlineError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Run `command` to completion, killing it if `cancel` fires first.
///
/// Stdout is discarded and stderr is captured for the error message.
pub fn run_tool(command: &mut Command, cancel: &CancelToken) -> OutlineResult<()> {
    let program = command.get_program().to_string_lossy().into_owned();
    cancel.check()?;

    tracing::debug!(command = ?command, "running external tool");
    let mut child = command
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|source| OutlineError::ToolSpawn {
            program: program.clone(),
            source,
        })?;

    let captured = Arc::new(Mutex::new(Vec::new()));
    let (done_tx, done_rx) = mpsc::channel();
    if let Some(stderr) = child.stderr.take() {
        let sink = Arc::clone(&captured);
        thread::spawn(move || {
            drain(stderr, &sink);
            let _ = done_tx.send(());
        });
    }

    let status = loop {
        if cancel.is_cancelled() {
            let _ = child.kill();
            let _ = child.wait();
            tracing::warn!(%program, "external tool cancelled");
            return Err(OutlineError::Cancelled);
        }
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) => thread::sleep(POLL_INTERVAL),
            Err(source) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(OutlineError::ToolSpawn { program, source });
            }
        }
    };

    // A grandchild may inherit stderr and keep it open long after the tool exits.
    if matches!(done_rx.recv_timeout(STDERR_GRACE), Err(RecvTimeoutError::Timeout)) {
        tracing::debug!(%program, "stderr still open after exit, not waiting for it");
    }
    let stderr = captured
        .lock()
        .map(|buf| String::from_utf8_lossy(&buf).into_owned())
        .unwrap_or_default();

    if status.success() {
        Ok(())
    } else {
        Err(OutlineError::ToolFailed {
            program,
            status,
            stderr,
        })
    }
}

/// Copy `source` into `sink` chunk by chunk until EOF or a read error.
fn drain(mut source: impl Read, sink: &Mutex<Vec<u8>>) {
    let mut chunk = [0u8; 4096];
    loop {
        match source.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => match sink.lock() {
                Ok(mut buf) => buf.extend_from_slice(&chunk[..n]),
                Err(_) => break,
            },
            Err(err) if err.kind() == std::io::ErrorKind::Interrupted => {}
            Err(_) => break,
        }
    }
}
