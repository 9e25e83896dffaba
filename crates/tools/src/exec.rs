//! exec tool — run a shell command with a wall-clock timeout.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use ferroclaw_core::error::ToolError;
use ferroclaw_core::tool::Tool;
use tokio::process::Command;
use tracing::{debug, warn};

const DEFAULT_TIMEOUT_SECS: u64 = 60;

pub struct ExecTool {
    workspace: PathBuf,
    timeout: Duration,
}

impl ExecTool {
    pub fn new(workspace: impl Into<PathBuf>) -> Self {
        Self {
            workspace: workspace.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl Tool for ExecTool {
    fn name(&self) -> &str {
        "exec"
    }

    fn description(&self) -> &str {
        "Execute a shell command and return its output. Use with caution."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "command": {
                    "type": "string",
                    "description": "The shell command to execute"
                },
                "working_dir": {
                    "type": "string",
                    "description": "Optional working directory for the command"
                }
            },
            "required": ["command"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<String, ToolError> {
        let command = arguments["command"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("'command' must be a string".into()))?;
        let cwd = match arguments["working_dir"].as_str() {
            Some(dir) => crate::read_file::resolve(&self.workspace, dir),
            None => self.workspace.clone(),
        };

        debug!(command = %command, cwd = %cwd.display(), "executing command");

        let child = if cfg!(target_os = "windows") {
            Command::new("cmd")
                .args(["/C", command])
                .current_dir(&cwd)
                .kill_on_drop(true)
                .output()
        } else {
            Command::new("sh")
                .args(["-c", command])
                .current_dir(&cwd)
                .kill_on_drop(true)
                .output()
        };

        let output = match tokio::time::timeout(self.timeout, child).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                return Err(ToolError::ExecutionFailed {
                    tool_name: "exec".into(),
                    reason: e.to_string(),
                })
            }
            Err(_) => {
                warn!(command = %command, "command timed out");
                return Err(ToolError::Timeout {
                    tool_name: "exec".into(),
                    timeout_secs: self.timeout.as_secs(),
                });
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        if !output.status.success() {
            let code = output.status.code().unwrap_or(-1);
            return Err(ToolError::ExecutionFailed {
                tool_name: "exec".into(),
                reason: format!("exit code {code}: {}", if stderr.is_empty() { &stdout } else { &stderr }),
            });
        }

        let mut result = String::new();
        if !stdout.is_empty() {
            result.push_str(&stdout);
        }
        if !stderr.is_empty() {
            result.push_str(&format!("\n[stderr]\n{stderr}"));
        }
        if result.is_empty() {
            return Ok("(no output)".to_string());
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn captures_stdout() {
        let tool = ExecTool::new("/tmp");
        let out = tool
            .execute(serde_json::json!({"command": "echo hello"}))
            .await
            .unwrap();
        assert!(out.contains("hello"));
    }

    #[tokio::test]
    async fn silent_command_reports_no_output() {
        let tool = ExecTool::new("/tmp");
        let out = tool.execute(serde_json::json!({"command": "true"})).await.unwrap();
        assert_eq!(out, "(no output)");
    }

    #[tokio::test]
    async fn failing_command_is_execution_error() {
        let tool = ExecTool::new("/tmp");
        let result = tool.execute(serde_json::json!({"command": "exit 3"})).await;
        match result {
            Err(ToolError::ExecutionFailed { reason, .. }) => assert!(reason.contains("exit code 3")),
            other => panic!("expected ExecutionFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn timeout_kills_the_command() {
        let tool = ExecTool::new("/tmp").with_timeout(Duration::from_millis(100));
        let result = tool.execute(serde_json::json!({"command": "sleep 5"})).await;
        assert!(matches!(result, Err(ToolError::Timeout { .. })));
    }

    #[tokio::test]
    async fn working_dir_is_honored() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("inner")).unwrap();

        let tool = ExecTool::new(dir.path());
        let out = tool
            .execute(serde_json::json!({"command": "pwd", "working_dir": "inner"}))
            .await
            .unwrap();
        assert!(out.trim().ends_with("inner"));
    }
}
