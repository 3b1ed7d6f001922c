// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::state::{FileMap, StateUpdate};
use crate::tool::{Tool, ToolCall, ToolContext, ToolError, ToolOutput};
use crate::vfs;

pub struct WriteFileTool;

#[derive(Debug, Deserialize)]
struct Args {
    file_path: String,
    content: String,
}

#[async_trait]
impl Tool for WriteFileTool {
    fn name(&self) -> &str {
        "write_file"
    }

    fn description(&self) -> &str {
        "Write to a file."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "file_path": {
                    "type": "string",
                    "description": "Path of the file to create or overwrite"
                },
                "content": {
                    "type": "string",
                    "description": "Full content of the file"
                }
            },
            "required": ["file_path", "content"]
        })
    }

    async fn execute(&self, call: &ToolCall, ctx: &ToolContext) -> Result<ToolOutput, ToolError> {
        let state = ctx.require_state(self.name())?;
        let args: Args = call.parse_args()?;
        debug!(path = %args.file_path, bytes = args.content.len(), "write_file tool");

        let written = vfs::write(&state.files, &args.file_path, &args.content);
        let delta: FileMap = written.changed_since(&state.files);

        Ok(ToolOutput::ok(&call.id, format!("Updated file {}", args.file_path))
            .with_update(StateUpdate::files(delta)))
    }
}
