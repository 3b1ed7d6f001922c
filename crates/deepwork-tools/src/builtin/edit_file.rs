// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::state::StateUpdate;
use crate::tool::{Tool, ToolCall, ToolContext, ToolError, ToolOutput};
use crate::vfs;

pub struct EditFileTool;

#[derive(Debug, Deserialize)]
struct Args {
    file_path: String,
    old_string: String,
    new_string: String,
    #[serde(default)]
    replace_all: bool,
}

#[async_trait]
impl Tool for EditFileTool {
    fn name(&self) -> &str {
        "edit_file"
    }

    fn description(&self) -> &str {
        "Performs exact string replacements in files.\n\n\
         Usage:\n\
         - Read the file with read_file at least once before editing it.\n\
         - When copying text from read_file output, preserve the exact indentation that \
         follows the line number prefix (spaces, line number, tab). Never include any part \
         of that prefix in old_string or new_string.\n\
         - Prefer editing existing files over writing new ones.\n\
         - The edit FAILS if old_string is not unique in the file. Either provide a larger \
         string with more surrounding context to make it unique, or set replace_all to \
         change every instance.\n\
         - Use replace_all for renaming a string across the whole file.\n\
         - old_string is matched literally; no character has special meaning."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "file_path": {
                    "type": "string",
                    "description": "Path of the file to modify"
                },
                "old_string": {
                    "type": "string",
                    "description": "Exact text to replace"
                },
                "new_string": {
                    "type": "string",
                    "description": "Replacement text"
                },
                "replace_all": {
                    "type": "boolean",
                    "description": "Replace every occurrence of old_string (default false)"
                }
            },
            "required": ["file_path", "old_string", "new_string"]
        })
    }

    async fn execute(&self, call: &ToolCall, ctx: &ToolContext) -> Result<ToolOutput, ToolError> {
        let state = ctx.require_state(self.name())?;
        let args: Args = call.parse_args()?;
        debug!(path = %args.file_path, replace_all = args.replace_all, "edit_file tool");

        let edited = match vfs::edit(
            &state.files,
            &args.file_path,
            &args.old_string,
            &args.new_string,
            args.replace_all,
        ) {
            Ok(edited) => edited,
            Err(e) => return Ok(ToolOutput::err(&call.id, e.to_string())),
        };

        if args.replace_all {
            info!(
                path = %args.file_path,
                replacements = edited.replacements,
                "replaced every occurrence of the string"
            );
        }

        let delta = edited.files.changed_since(&state.files);
        Ok(ToolOutput::ok(&call.id, format!("Updated file {}", args.file_path))
            .with_update(StateUpdate::files(delta)))
    }
}
