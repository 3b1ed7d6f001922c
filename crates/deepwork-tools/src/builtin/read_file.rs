// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::state::FileMap;
use crate::tool::{Tool, ToolCall, ToolContext, ToolError, ToolOutput};
use crate::vfs::{self, DEFAULT_READ_LIMIT};

pub struct ReadFileTool;

#[derive(Debug, Deserialize)]
struct Args {
    file_path: String,
    #[serde(default)]
    offset: usize,
    #[serde(default = "default_limit")]
    limit: usize,
}

fn default_limit() -> usize {
    DEFAULT_READ_LIMIT
}

#[async_trait]
impl Tool for ReadFileTool {
    fn name(&self) -> &str {
        "read_file"
    }

    fn description(&self) -> &str {
        "Reads a file from the shared virtual file system. It is okay to read a file that \
         does not exist; an error will be returned.\n\n\
         Usage:\n\
         - By default, it reads up to 2000 lines starting from the beginning of the file\n\
         - You can optionally specify a line offset (0-based) and limit, but it is \
         recommended to read the whole file by not providing these parameters\n\
         - Any lines longer than 2000 characters will be truncated\n\
         - Results are returned in cat -n format, with line numbers starting at 1\n\
         - Reading several files in a single response is encouraged\n\
         - If a file exists but has empty contents you will receive a system reminder \
         instead of file contents"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "file_path": {
                    "type": "string",
                    "description": "Path of the file to read"
                },
                "offset": {
                    "type": "integer",
                    "description": "0-based line to start reading from (default 0)"
                },
                "limit": {
                    "type": "integer",
                    "description": "Maximum number of lines to return (default 2000)"
                }
            },
            "required": ["file_path"]
        })
    }

    async fn execute(&self, call: &ToolCall, ctx: &ToolContext) -> Result<ToolOutput, ToolError> {
        let args: Args = call.parse_args()?;
        debug!(path = %args.file_path, offset = args.offset, limit = args.limit, "read_file tool");

        let empty = FileMap::new();
        let files = super::visible_files(ctx, &empty);
        Ok(match vfs::read(files, &args.file_path, args.offset, args.limit) {
            Ok(text) => ToolOutput::ok(&call.id, text),
            Err(e) => ToolOutput::err(&call.id, e.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::builtin::test_support::{call, ctx_with_files};

    #[tokio::test]
    async fn reads_with_line_numbers() {
        let ctx = ctx_with_files(&[("notes.txt", "alpha\nbeta")]);
        let out = ReadFileTool
            .execute(&call("read_file", json!({"file_path": "notes.txt"})), &ctx)
            .await
            .unwrap();
        assert!(!out.is_error);
        assert_eq!(out.content, "     1\talpha\n     2\tbeta");
    }

    #[tokio::test]
    async fn honours_offset_and_limit() {
        let ctx = ctx_with_files(&[("f", "a\nb\nc\nd")]);
        let out = ReadFileTool
            .execute(&call("read_file", json!({"file_path": "f", "offset": 1, "limit": 2})), &ctx)
            .await
            .unwrap();
        assert_eq!(out.content, "     2\tb\n     3\tc");
    }

    #[tokio::test]
    async fn missing_file_is_error_output() {
        let ctx = ctx_with_files(&[]);
        let out = ReadFileTool
            .execute(&call("read_file", json!({"file_path": "ghost"})), &ctx)
            .await
            .unwrap();
        assert!(out.is_error);
        assert_eq!(out.content, "Error: File 'ghost' not found");
    }

    #[tokio::test]
    async fn offset_past_end_is_error_output() {
        let ctx = ctx_with_files(&[("f", "only")]);
        let out = ReadFileTool
            .execute(&call("read_file", json!({"file_path": "f", "offset": 5})), &ctx)
            .await
            .unwrap();
        assert!(out.is_error);
        assert!(out.content.contains("Line offset 5 exceeds file length (1 lines)"));
    }

    #[tokio::test]
    async fn missing_path_argument_is_invalid() {
        let ctx = ctx_with_files(&[]);
        let err = ReadFileTool.execute(&call("read_file", json!({})), &ctx).await.unwrap_err();
        assert!(matches!(err, ToolError::InvalidArgument { .. }));
    }
}
