//! Tokio process based runner implementation.

use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio::sync::mpsc;

use super::error::RunnerError;
use super::traits::JobRunner;
use super::types::{ProcessExit, RunnerEvent};
use crate::command::MuxCommand;

const READ_CHUNK: usize = 8 * 1024;

/// Runs muxers as child processes.
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner;

impl ProcessRunner {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl JobRunner for ProcessRunner {
    fn name(&self) -> &str {
        "process"
    }

    async fn run(
        &self,
        program: &Path,
        command: &MuxCommand,
        events: mpsc::Sender<RunnerEvent>,
    ) -> Result<ProcessExit, RunnerError> {
        let mut child = Command::new(program)
            .args(command.argv())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| RunnerError::from_spawn(program, e))?;

        let _ = events.send(RunnerEvent::Spawned { pid: child.id() }).await;

        let stdout = child.stdout.take().ok_or_else(|| {
            RunnerError::Io(std::io::Error::other("stdout was not captured"))
        })?;
        let stderr = child.stderr.take().ok_or_else(|| {
            RunnerError::Io(std::io::Error::other("stderr was not captured"))
        })?;

        let (out, err, status) = tokio::join!(
            forward_lines(stdout, &events),
            forward_lines(stderr, &events),
            child.wait()
        );
        out?;
        err?;

        Ok(ProcessExit::from(status?))
    }
}

/// Reads `reader` to the end, sending every non-empty line.
///
/// Lines end at `\n` or `\r`; muxers redraw their progress line with bare
/// carriage returns. Bytes are decoded lossily. Keeps draining after the
/// receiver is gone so the child never blocks on a full pipe.
pub async fn forward_lines<R>(
    mut reader: R,
    events: &mpsc::Sender<RunnerEvent>,
) -> std::io::Result<()>
where
    R: AsyncRead + Unpin,
{
    let mut chunk = vec![0u8; READ_CHUNK];
    let mut pending: Vec<u8> = Vec::new();

    loop {
        let n = reader.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        for &byte in &chunk[..n] {
            if byte == b'\n' || byte == b'\r' {
                flush_line(&mut pending, events).await;
            } else {
                pending.push(byte);
            }
        }
    }
    flush_line(&mut pending, events).await;

    Ok(())
}

async fn flush_line(pending: &mut Vec<u8>, events: &mpsc::Sender<RunnerEvent>) {
    if pending.is_empty() {
        return;
    }
    let line = String::from_utf8_lossy(pending).into_owned();
    pending.clear();
    if !events.is_closed() {
        let _ = events.send(RunnerEvent::Output(line)).await;
    }
}
