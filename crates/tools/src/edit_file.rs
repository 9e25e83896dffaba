//! edit_file tool — exact-match text replacement in a file.

use std::path::PathBuf;

use async_trait::async_trait;
use ferroclaw_core::error::ToolError;
use ferroclaw_core::tool::Tool;

use crate::read_file::resolve;

pub struct EditFileTool {
    workspace: PathBuf,
}

impl EditFileTool {
    pub fn new(workspace: impl Into<PathBuf>) -> Self {
        Self {
            workspace: workspace.into(),
        }
    }
}

#[async_trait]
impl Tool for EditFileTool {
    fn name(&self) -> &str {
        "edit_file"
    }

    fn description(&self) -> &str {
        "Edit a file by replacing old_text with new_text. The old_text must exist exactly in the file."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "The file path to edit"
                },
                "old_text": {
                    "type": "string",
                    "description": "The exact text to find and replace"
                },
                "new_text": {
                    "type": "string",
                    "description": "The text to replace with"
                }
            },
            "required": ["path", "old_text", "new_text"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<String, ToolError> {
        let path = arguments["path"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("'path' must be a string".into()))?;
        let old_text = arguments["old_text"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("'old_text' must be a string".into()))?;
        let new_text = arguments["new_text"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("'new_text' must be a string".into()))?;

        let resolved = resolve(&self.workspace, path);
        let content = match tokio::fs::read_to_string(&resolved).await {
            Ok(c) => c,
            Err(e) => return Ok(format!("Error editing file: {e}")),
        };

        if !content.contains(old_text) {
            return Ok(
                "Error: old_text not found in file. The exact text must exist to perform replacement."
                    .to_string(),
            );
        }

        // First occurrence only, like a careful manual edit.
        let new_content = content.replacen(old_text, new_text, 1);
        match tokio::fs::write(&resolved, new_content).await {
            Ok(()) => Ok(format!("Successfully replaced text in {}", resolved.display())),
            Err(e) => Ok(format!("Error editing file: {e}")),
        }
    }
}
