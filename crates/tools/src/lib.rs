//! Built-in tool implementations for Ferroclaw.
//!
//! Tools give the agent the ability to interact with the world: read and
//! write workspace files, run shell commands, and push messages back over
//! the bus.

pub mod edit_file;
pub mod exec;
pub mod list_dir;
pub mod message;
pub mod read_file;
pub mod write_file;

use std::path::Path;
use std::sync::Arc;

use ferroclaw_core::bus::MessageBus;
use ferroclaw_core::tool::ToolRegistry;

pub use edit_file::EditFileTool;
pub use exec::ExecTool;
pub use list_dir::ListDirTool;
pub use message::MessageTool;
pub use read_file::ReadFileTool;
pub use write_file::WriteFileTool;

/// Create the default tool registry: filesystem tools scoped to the
/// workspace, exec with a wall-clock timeout, and the message tool wired to
/// the outbound queue.
pub fn default_registry(workspace: &Path, bus: Arc<MessageBus>) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Arc::new(ReadFileTool::new(workspace)));
    registry.register(Arc::new(WriteFileTool::new(workspace)));
    registry.register(Arc::new(EditFileTool::new(workspace)));
    registry.register(Arc::new(ListDirTool::new(workspace)));
    registry.register(Arc::new(ExecTool::new(workspace)));
    registry.register(Arc::new(MessageTool::new(bus, "cli", "direct")));
    registry
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_registry_has_all_builtins() {
        let bus = Arc::new(MessageBus::new());
        let registry = default_registry(Path::new("/tmp"), bus);
        assert_eq!(
            registry.names(),
            vec!["edit_file", "exec", "list_dir", "message", "read_file", "write_file"]
        );
    }
}
