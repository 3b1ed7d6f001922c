// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
pub mod edit_file;
pub mod ls;
pub mod read_file;
pub mod write_file;
pub mod write_todos;

use std::sync::Arc;

use crate::state::FileMap;
use crate::tool::{Tool, ToolContext};

/// The built-in tools, in the order they are offered to an agent.
pub fn builtin_tools() -> Vec<Arc<dyn Tool>> {
    vec![
        Arc::new(write_todos::WriteTodosTool),
        Arc::new(write_file::WriteFileTool),
        Arc::new(read_file::ReadFileTool),
        Arc::new(ls::LsTool),
        Arc::new(edit_file::EditFileTool),
    ]
}

/// File mapping visible to a read-only tool; empty without shared state.
pub(crate) fn visible_files<'a>(ctx: &'a ToolContext, empty: &'a FileMap) -> &'a FileMap {
    ctx.state.as_deref().map(|s| &s.files).unwrap_or(empty)
}
