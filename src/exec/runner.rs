// src/exec/runner.rs

//! Runs a single build command and streams its output.

use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tracing::{debug, error, info, warn};

use crate::exec::output::OutputSink;
use crate::types::{BuildResult, BuildTarget};

/// A shell command bound to a working directory.
#[derive(Debug, Clone)]
pub struct CommandSpec {
    pub cmd: String,
    pub cwd: PathBuf,
    pub target: BuildTarget,
}

/// Run `spec` to completion, forwarding stdout and stderr to `output`.
///
/// Never fails: spawn or wait errors are written to `output` and reported
/// as [`BuildResult::Failed`].
pub async fn run_command(spec: CommandSpec, output: Arc<dyn OutputSink>) -> BuildResult {
    match run_command_inner(&spec, &output).await {
        Ok(result) => result,
        Err(err) => {
            error!(
                target_kind = %spec.target,
                cmd = %spec.cmd,
                error = %err,
                "build command error"
            );
            output.write_line(&format!("error: {err:#}"));
            BuildResult::Failed
        }
    }
}

async fn run_command_inner(spec: &CommandSpec, output: &Arc<dyn OutputSink>) -> Result<BuildResult> {
    info!(
        target_kind = %spec.target,
        cmd = %spec.cmd,
        cwd = ?spec.cwd,
        "starting build command"
    );

    // Build a shell command appropriate for the platform.
    let mut cmd = if cfg!(windows) {
        let mut c = Command::new("cmd");
        c.arg("/C").arg(&spec.cmd);
        c
    } else {
        let mut c = Command::new("sh");
        c.arg("-c").arg(&spec.cmd);
        c
    };

    cmd.current_dir(&spec.cwd)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = cmd
        .spawn()
        .with_context(|| format!("spawning {} command '{}'", spec.target, spec.cmd))?;

    let stdout = child.stdout.take().map(|s| forward_lines(s, Arc::clone(output)));
    let stderr = child.stderr.take().map(|s| forward_lines(s, Arc::clone(output)));

    let status = child
        .wait()
        .await
        .with_context(|| format!("waiting for {} command '{}'", spec.target, spec.cmd))?;

    // Drain both pipes before reporting so no output lands after completion.
    for reader in [stdout, stderr].into_iter().flatten() {
        let _ = reader.await;
    }

    let code = status.code().unwrap_or(-1);
    info!(
        target_kind = %spec.target,
        exit_code = code,
        success = status.success(),
        "build command exited"
    );

    Ok(if status.success() {
        BuildResult::Successful
    } else {
        output.write_line(&format!("{} exited with code {code}", spec.target));
        BuildResult::Failed
    })
}

/// Forward `stream` to `output` line by line until EOF.
///
/// Lines are decoded lossily. The pipe is drained to EOF even when the
/// command prints bytes that are not UTF-8.
fn forward_lines<R>(stream: R, output: Arc<dyn OutputSink>) -> tokio::task::JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut reader = BufReader::new(stream);
        let mut buf = Vec::new();
        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf).await {
                Ok(0) => break,
                Ok(_) => {
                    let text = String::from_utf8_lossy(&buf);
                    let line = text.trim_end_matches(['\n', '\r']);
                    debug!("build output: {}", line);
                    output.write_line(line);
                }
                Err(err) => {
                    warn!(error = %err, "reading build output failed");
                    break;
                }
            }
        }
    })
}
