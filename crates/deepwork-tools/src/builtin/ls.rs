// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use crate::state::FileMap;
use crate::tool::{Tool, ToolCall, ToolContext, ToolError, ToolOutput};
use crate::vfs;

pub struct LsTool;

#[async_trait]
impl Tool for LsTool {
    fn name(&self) -> &str {
        "ls"
    }

    fn description(&self) -> &str {
        "List all files"
    }

    fn parameters_schema(&self) -> Value {
        json!({ "type": "object", "properties": {} })
    }

    async fn execute(&self, call: &ToolCall, ctx: &ToolContext) -> Result<ToolOutput, ToolError> {
        let empty = FileMap::new();
        let paths = vfs::list(super::visible_files(ctx, &empty));
        debug!(count = paths.len(), "ls tool");
        Ok(ToolOutput::ok(&call.id, json!(paths).to_string()))
    }
}
