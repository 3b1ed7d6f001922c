// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::state::{StateUpdate, Todo, TodoStatus};
use crate::tool::{Tool, ToolCall, ToolContext, ToolError, ToolOutput};

pub struct WriteTodosTool;

#[derive(Debug, Deserialize)]
struct Args {
    todos: Vec<Todo>,
}

#[async_trait]
impl Tool for WriteTodosTool {
    fn name(&self) -> &str {
        "write_todos"
    }

    fn description(&self) -> &str {
        "Create and manage a structured task list for the current work session. It helps \
         track progress, organize complex tasks and shows the user how the work is going.\n\n\
         ## When to Use\n\
         - Complex multi-step tasks (3 or more distinct steps)\n\
         - Non-trivial tasks that need careful planning\n\
         - The user asks for a todo list, or provides several tasks at once\n\
         - Right after receiving new instructions, to capture requirements\n\
         - When starting a task: mark it in_progress BEFORE beginning work\n\
         - After finishing a task: mark it completed and add follow-ups discovered on the way\n\n\
         ## When NOT to Use\n\
         - A single, straightforward task\n\
         - Trivial work completable in fewer than 3 steps\n\
         - Purely conversational or informational requests\n\n\
         ## Task States\n\
         - pending: not yet started\n\
         - in_progress: currently being worked on (keep ONE at a time)\n\
         - completed: finished successfully\n\n\
         ## Rules\n\
         - Update statuses in real time; mark tasks completed IMMEDIATELY after finishing\n\
         - Only mark a task completed when it is FULLY done; if blocked, keep it in_progress \
         and add a task describing the blocker\n\
         - Remove tasks that are no longer relevant\n\
         - Every call replaces the entire list"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "todos": {
                    "type": "array",
                    "description": "The complete new task list",
                    "items": {
                        "type": "object",
                        "properties": {
                            "content": { "type": "string" },
                            "status": {
                                "type": "string",
                                "enum": ["pending", "in_progress", "completed"]
                            }
                        },
                        "required": ["content", "status"]
                    }
                }
            },
            "required": ["todos"]
        })
    }

    async fn execute(&self, call: &ToolCall, ctx: &ToolContext) -> Result<ToolOutput, ToolError> {
        ctx.require_state(self.name())?;
        let args: Args = call.parse_args()?;

        let in_progress = args.todos.iter().filter(|t| t.status == TodoStatus::InProgress).count();
        if in_progress > 1 {
            warn!(in_progress, "more than one todo is in_progress");
        }
        debug!(count = args.todos.len(), "write_todos tool");

        let rendered = serde_json::to_string(&args.todos)
            .map_err(|e| ToolError::Runtime(anyhow::Error::new(e)))?;
        Ok(ToolOutput::ok(&call.id, format!("Updated todo list to {rendered}"))
            .with_update(StateUpdate::todos(args.todos)))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::builtin::test_support::{call, ctx_with_files};

    #[tokio::test]
    async fn replaces_list_and_confirms_with_json() {
        let ctx = ctx_with_files(&[]);
        let out = WriteTodosTool
            .execute(
                &call("write_todos", json!({"todos": [{"content": "research", "status": "in_progress"}]})),
                &ctx,
            )
            .await
            .unwrap();
        assert_eq!(
            out.content,
            r#"Updated todo list to [{"content":"research","status":"in_progress"}]"#
        );
        let todos = out.update.unwrap().todos.unwrap();
        assert_eq!(todos, vec![Todo::new("research", TodoStatus::InProgress)]);
    }

    #[tokio::test]
    async fn second_call_leaves_no_residue() {
        let ctx = ctx_with_files(&[]);
        let mut state = ctx.state.as_deref().unwrap().clone();
        for todos in [
            json!([{"content": "a", "status": "pending"}, {"content": "b", "status": "pending"}]),
            json!([{"content": "c", "status": "completed"}]),
        ] {
            let out = WriteTodosTool
                .execute(&call("write_todos", json!({ "todos": todos })), &ctx)
                .await
                .unwrap();
            state = state.apply(out.update.unwrap());
        }
        assert_eq!(state.todos, vec![Todo::new("c", TodoStatus::Completed)]);
    }

    #[tokio::test]
    async fn multiple_in_progress_is_accepted() {
        let ctx = ctx_with_files(&[]);
        let out = WriteTodosTool
            .execute(
                &call(
                    "write_todos",
                    json!({"todos": [
                        {"content": "a", "status": "in_progress"},
                        {"content": "b", "status": "in_progress"}
                    ]}),
                ),
                &ctx,
            )
            .await
            .unwrap();
        assert!(!out.is_error);
        assert_eq!(out.update.unwrap().todos.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn unknown_status_is_invalid_argument() {
        let ctx = ctx_with_files(&[]);
        let err = WriteTodosTool
            .execute(
                &call("write_todos", json!({"todos": [{"content": "a", "status": "cancelled"}]})),
                &ctx,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidArgument { .. }));
    }

    #[tokio::test]
    async fn fails_without_state() {
        let err = WriteTodosTool
            .execute(&call("write_todos", json!({"todos": []})), &ToolContext::detached("c"))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::MissingState { .. }));
    }
}
