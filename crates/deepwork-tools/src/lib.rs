// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
mod builtin;
mod registry;
mod state;
mod tool;
pub mod vfs;

pub use builtin::{
    builtin_tools, edit_file::EditFileTool, ls::LsTool, read_file::ReadFileTool,
    write_file::WriteFileTool, write_todos::WriteTodosTool,
};
pub use registry::{ToolRegistry, UnknownTool};
pub use state::{
    merge_files, merge_messages, merge_todos, AgentState, FileMap, StateUpdate, Todo, TodoStatus,
};
pub use tool::{Tool, ToolCall, ToolContext, ToolError, ToolOutput};
pub use vfs::VfsError;
