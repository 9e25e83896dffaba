//! write_file tool — write content to a file, creating parent directories.

use std::path::PathBuf;

use async_trait::async_trait;
use ferroclaw_core::error::ToolError;
use ferroclaw_core::tool::Tool;

use crate::read_file::resolve;

pub struct WriteFileTool {
    workspace: PathBuf,
}

impl WriteFileTool {
    pub fn new(workspace: impl Into<PathBuf>) -> Self {
        Self {
            workspace: workspace.into(),
        }
    }
}

#[async_trait]
impl Tool for WriteFileTool {
    fn name(&self) -> &str {
        "write_file"
    }

    fn description(&self) -> &str {
        "Write content to a file at the given path."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "The file path to write to"
                },
                "content": {
                    "type": "string",
                    "description": "The content to write"
                }
            },
            "required": ["path", "content"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<String, ToolError> {
        let path = arguments["path"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("'path' must be a string".into()))?;
        let content = arguments["content"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("'content' must be a string".into()))?;

        let resolved = resolve(&self.workspace, path);
        if let Some(parent) = resolved.parent() {
            if let Err(e) = tokio::fs::create_dir_all(parent).await {
                return Ok(format!("Error writing file: {e}"));
            }
        }
        match tokio::fs::write(&resolved, content).await {
            Ok(()) => Ok(format!(
                "Successfully wrote {} bytes to {}",
                content.len(),
                resolved.display()
            )),
            Err(e) => Ok(format!("Error writing file: {e}")),
        }
    }
}
