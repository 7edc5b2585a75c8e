use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use super::DeployAction;
use crate::config::DeployConfig;
use crate::error::{Error, Result};

/// Responses carry at most this many bytes per output stream; older output
/// is dropped, not the whole buffer
pub const OUTPUT_TAIL_BYTES: usize = 1000;

/// Outcome of one script invocation. Produced once per request, converted to
/// an HTTP response, and discarded.
#[derive(Debug)]
pub struct ExecutionResult {
    pub exit_code: Option<i32>,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    pub timed_out: bool,
}

impl ExecutionResult {
    pub fn success(&self) -> bool {
        !self.timed_out && self.exit_code == Some(0)
    }
}

/// Runs the deploy script as a child process with a hard wall-clock timeout.
///
/// Execution blocks the handling task for its full duration. Concurrent
/// requests each get their own child process; nothing here coordinates or
/// queues them.
#[derive(Debug, Clone)]
pub struct ScriptRunner {
    config: DeployConfig,
}

impl ScriptRunner {
    pub fn new(config: DeployConfig) -> Self {
        Self { config }
    }

    /// Invoke the deploy script for `action` and wait for completion or
    /// timeout. The script is invoked at most once; on timeout the child is
    /// killed before this returns.
    pub async fn run(&self, action: DeployAction) -> Result<ExecutionResult> {
        let script_path = self.config.script_path();

        // Checked before spawning so a missing script never launches anything
        if !script_path.exists() {
            warn!(script = %script_path.display(), "Deploy script not found");
            return Err(Error::ScriptMissing {
                path: script_path.display().to_string(),
            });
        }

        let timeout_secs = action.timeout_secs(&self.config);

        debug!(
            script = %script_path.display(),
            arg = action.script_arg(),
            working_dir = %self.config.root.display(),
            timeout_secs,
            "Executing deploy script"
        );

        let start_time = Instant::now();

        let mut cmd = Command::new(&script_path);
        cmd.arg(action.script_arg())
            .current_dir(&self.config.root)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .stdin(Stdio::null())
            // Dropping the in-flight wait on timeout must kill the child so
            // no orphaned process outlives the HTTP response
            .kill_on_drop(true);

        match timeout(Duration::from_secs(timeout_secs), cmd.output()).await {
            Ok(Ok(output)) => {
                let result = ExecutionResult {
                    exit_code: output.status.code(),
                    stdout: output.stdout,
                    stderr: output.stderr,
                    timed_out: false,
                };

                info!(
                    action = action.as_str(),
                    exit_code = ?result.exit_code,
                    duration_ms = start_time.elapsed().as_millis() as u64,
                    stdout_len = result.stdout.len(),
                    stderr_len = result.stderr.len(),
                    "Deploy script completed"
                );

                Ok(result)
            }
            Ok(Err(io_error)) => {
                warn!(
                    script = %script_path.display(),
                    error = %io_error,
                    "Failed to start deploy script"
                );
                Err(crate::error::ExecutionError::StartFailed {
                    script: script_path.display().to_string(),
                    source: io_error,
                }
                .into())
            }
            Err(_elapsed) => {
                warn!(
                    action = action.as_str(),
                    timeout_secs, "Deploy script timed out, child killed"
                );
                Ok(ExecutionResult {
                    exit_code: None,
                    stdout: Vec::new(),
                    stderr: Vec::new(),
                    timed_out: true,
                })
            }
        }
    }
}

/// Last `limit` bytes of an output stream as lossy UTF-8
pub fn tail(output: &[u8], limit: usize) -> String {
    let start = output.len().saturating_sub(limit);
    String::from_utf8_lossy(&output[start..]).to_string()
}
