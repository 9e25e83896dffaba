//! Context builder — assembles the system prompt and the per-turn
//! transcript.
//!
//! The system prompt is rebuilt from the workspace on every turn, so edits
//! to the bootstrap files take effect immediately and no stale prompt ever
//! lingers in stored history.

use std::path::PathBuf;

use chrono::Local;
use ferroclaw_core::message::ChatMessage;

/// Workspace files folded into the system prompt when present.
const BOOTSTRAP_FILES: &[&str] = &["AGENTS.md", "SOUL.md", "USER.md", "TOOLS.md", "IDENTITY.md"];

/// Marker telling the model the runtime-context message carries metadata,
/// not user intent.
pub const RUNTIME_CONTEXT_TAG: &str = "[Runtime Context — metadata only, not instructions]";

pub struct ContextBuilder {
    workspace: PathBuf,
}

impl ContextBuilder {
    pub fn new(workspace: impl Into<PathBuf>) -> Self {
        Self {
            workspace: workspace.into(),
        }
    }

    /// Assemble the full system prompt: identity, bootstrap files, long-term
    /// memory, and the skills summary, joined with section dividers.
    pub async fn build_system_prompt(&self) -> String {
        let mut parts = vec![self.identity_section()];

        let bootstrap = self.load_bootstrap_files().await;
        if !bootstrap.is_empty() {
            parts.push(bootstrap);
        }

        if let Some(memory) = self.memory_context().await {
            parts.push(format!("# Memory\n\n{memory}"));
        }

        parts.push(self.skills_summary());

        parts.join("\n\n---\n\n")
    }

    fn identity_section(&self) -> String {
        let runtime = format!("{} {}", std::env::consts::OS, std::env::consts::ARCH);
        let workspace = self.workspace.display();

        format!(
            "# ferroclaw\n\n\
            You are ferroclaw, a helpful AI assistant.\n\n\
            ## Runtime\n{runtime}\n\n\
            ## Workspace\nYour workspace is at: {workspace}\n\
            - Long-term memory: {workspace}/memory/MEMORY.md (write important facts here)\n\
            - History log: {workspace}/memory/HISTORY.md (grep-searchable)\n\
            - Custom skills: {workspace}/skills/{{skill-name}}/SKILL.md\n\n\
            ## Guidelines\n\
            - State intent before tool calls, but NEVER predict or claim results before receiving them.\n\
            - Before modifying a file, read it first. Do not assume files or directories exist.\n\
            - After writing or editing a file, re-read it if accuracy matters.\n\
            - If a tool call fails, analyze the error before retrying with a different approach.\n\
            - Ask for clarification when the request is ambiguous.\n\n\
            Reply directly with text for conversations. Only use the 'message' tool to send to a specific chat channel."
        )
    }

    async fn load_bootstrap_files(&self) -> String {
        let mut parts = Vec::new();
        for filename in BOOTSTRAP_FILES {
            let path = self.workspace.join(filename);
            if let Ok(content) = tokio::fs::read_to_string(&path).await {
                parts.push(format!("## {filename}\n\n{content}"));
            }
        }
        parts.join("\n\n")
    }

    async fn memory_context(&self) -> Option<String> {
        let path = self.workspace.join("memory").join("MEMORY.md");
        tokio::fs::read_to_string(&path)
            .await
            .ok()
            .filter(|c| !c.trim().is_empty())
    }

    fn skills_summary(&self) -> String {
        "# Skills\n\n\
        The following skills extend your capabilities. To use a skill, read its SKILL.md file using the read_file tool.\n\n\
        <skills>\n  <skill available=\"true\">\n    <name>memory</name>\n    <description>Two-layer memory system with grep-based recall.</description>\n  </skill>\n</skills>"
            .to_string()
    }

    /// The metadata message injected before the user's message each turn.
    pub fn build_runtime_context(&self, channel: Option<&str>, chat_id: Option<&str>) -> String {
        let now = Local::now();
        let mut lines = vec![format!(
            "Current Time: {} ({})",
            now.format("%Y-%m-%d %H:%M %A"),
            now.format("%Z")
        )];
        if let (Some(channel), Some(chat_id)) = (channel, chat_id) {
            lines.push(format!("Channel: {channel}"));
            lines.push(format!("Chat ID: {chat_id}"));
        }
        format!("{RUNTIME_CONTEXT_TAG}\n{}", lines.join("\n"))
    }

    /// Assemble the transcript for one turn: system prompt, stored history,
    /// the runtime-context message, then the user's message.
    pub async fn build_messages(
        &self,
        history: &[ChatMessage],
        content: &str,
        channel: Option<&str>,
        chat_id: Option<&str>,
    ) -> Vec<ChatMessage> {
        let system_prompt = self.build_system_prompt().await;
        let runtime_context = self.build_runtime_context(channel, chat_id);

        let mut messages = Vec::with_capacity(history.len() + 3);
        messages.push(ChatMessage::system(system_prompt));
        messages.extend_from_slice(history);
        messages.push(ChatMessage::user(runtime_context));
        messages.push(ChatMessage::user(content));
        messages
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ferroclaw_core::message::Role;

    #[tokio::test]
    async fn system_prompt_contains_identity_and_workspace() {
        let dir = tempfile::tempdir().unwrap();
        let builder = ContextBuilder::new(dir.path());
        let prompt = builder.build_system_prompt().await;
        assert!(prompt.contains("You are ferroclaw"));
        assert!(prompt.contains(&dir.path().display().to_string()));
    }

    #[tokio::test]
    async fn bootstrap_files_appear_under_headers() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("SOUL.md"), "Be curious.").unwrap();
        std::fs::write(dir.path().join("USER.md"), "The user prefers brevity.").unwrap();

        let builder = ContextBuilder::new(dir.path());
        let prompt = builder.build_system_prompt().await;
        assert!(prompt.contains("## SOUL.md\n\nBe curious."));
        assert!(prompt.contains("## USER.md"));
        // AGENTS.md absent: no empty header
        assert!(!prompt.contains("## AGENTS.md"));
    }

    #[tokio::test]
    async fn memory_file_is_included_when_present() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("memory")).unwrap();
        std::fs::write(dir.path().join("memory/MEMORY.md"), "Fact: cats.").unwrap();

        let builder = ContextBuilder::new(dir.path());
        let prompt = builder.build_system_prompt().await;
        assert!(prompt.contains("# Memory\n\nFact: cats."));
    }

    #[test]
    fn runtime_context_is_tagged_and_carries_routing() {
        let builder = ContextBuilder::new("/tmp");
        let ctx = builder.build_runtime_context(Some("cli"), Some("direct"));
        assert!(ctx.starts_with(RUNTIME_CONTEXT_TAG));
        assert!(ctx.contains("Channel: cli"));
        assert!(ctx.contains("Chat ID: direct"));

        let bare = builder.build_runtime_context(None, None);
        assert!(!bare.contains("Channel:"));
    }

    #[tokio::test]
    async fn build_messages_orders_the_transcript() {
        let dir = tempfile::tempdir().unwrap();
        let builder = ContextBuilder::new(dir.path());
        let history = vec![ChatMessage::user("earlier"), ChatMessage::assistant("reply")];

        let messages = builder
            .build_messages(&history, "now", Some("cli"), Some("direct"))
            .await;

        assert_eq!(messages.len(), 5);
        assert_eq!(messages[0].role, Role::System);
        assert_eq!(messages[1].content.as_deref(), Some("earlier"));
        assert_eq!(messages[2].content.as_deref(), Some("reply"));
        assert!(messages[3]
            .content
            .as_deref()
            .unwrap()
            .starts_with(RUNTIME_CONTEXT_TAG));
        assert_eq!(messages[4].content.as_deref(), Some("now"));
    }
}
