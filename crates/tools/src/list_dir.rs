//! list_dir tool — directory listing with `[FILE]`/`[DIR]` markers.

use std::path::PathBuf;

use async_trait::async_trait;
use ferroclaw_core::error::ToolError;
use ferroclaw_core::tool::Tool;

use crate::read_file::resolve;

pub struct ListDirTool {
    workspace: PathBuf,
}

impl ListDirTool {
    pub fn new(workspace: impl Into<PathBuf>) -> Self {
        Self {
            workspace: workspace.into(),
        }
    }
}

#[async_trait]
impl Tool for ListDirTool {
    fn name(&self) -> &str {
        "list_dir"
    }

    fn description(&self) -> &str {
        "List the contents of a directory."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "The directory path to list"
                }
            },
            "required": ["path"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<String, ToolError> {
        let path = arguments["path"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("'path' must be a string".into()))?;

        let resolved = resolve(&self.workspace, path);
        let mut reader = match tokio::fs::read_dir(&resolved).await {
            Ok(r) => r,
            Err(e) => return Ok(format!("Error listing directory: {e}")),
        };

        let mut lines = Vec::new();
        loop {
            match reader.next_entry().await {
                Ok(Some(entry)) => {
                    let marker = match entry.file_type().await {
                        Ok(ft) if ft.is_dir() => "[DIR]",
                        _ => "[FILE]",
                    };
                    lines.push(format!("{} {}", marker, entry.file_name().to_string_lossy()));
                }
                Ok(None) => break,
                Err(e) => return Ok(format!("Error listing directory: {e}")),
            }
        }

        if lines.is_empty() {
            return Ok("(empty directory)".to_string());
        }
        lines.sort();
        Ok(lines.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn lists_files_and_dirs_with_markers() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), "x").unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();

        let tool = ListDirTool::new(dir.path());
        let out = tool.execute(serde_json::json!({"path": "."})).await.unwrap();
        assert!(out.contains("[FILE] a.txt"));
        assert!(out.contains("[DIR] sub"));
    }

    #[tokio::test]
    async fn empty_directory_marker() {
        let dir = tempfile::tempdir().unwrap();
        let tool = ListDirTool::new(dir.path());
        let out = tool.execute(serde_json::json!({"path": "."})).await.unwrap();
        assert_eq!(out, "(empty directory)");
    }

    #[tokio::test]
    async fn missing_directory_is_error_text() {
        let dir = tempfile::tempdir().unwrap();
        let tool = ListDirTool::new(dir.path());
        let out = tool
            .execute(serde_json::json!({"path": "missing"}))
            .await
            .unwrap();
        assert!(out.starts_with("Error listing directory:"));
    }
}
