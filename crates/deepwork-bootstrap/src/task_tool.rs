// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! TaskTool: delegates a task description to a named sub-agent.
//!
//! The sub-agent starts from a fresh log holding only the description, plus
//! snapshots of the caller's files and todos.  Only its final message and
//! the files it changed come back; its todo list and intermediate messages
//! are dropped.

use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info};

use deepwork_core::task_description;
use deepwork_model::{Message, Role};
use deepwork_tools::{
    AgentState, StateUpdate, Tool, ToolCall, ToolContext, ToolError, ToolOutput,
};

use crate::registry::AgentRegistry;

/// Name the dispatcher is registered under.
pub const TASK_TOOL_NAME: &str = "task";

const NO_REPORT: &str = "(sub-agent produced no text output)";

pub struct TaskTool {
    agents: Arc<AgentRegistry>,
    description: String,
}

#[derive(Debug, Deserialize)]
struct Args {
    description: String,
    subagent_type: String,
}

impl TaskTool {
    pub fn new(agents: Arc<AgentRegistry>) -> Self {
        let description = task_description(agents.catalogue());
        Self { agents, description }
    }

    fn unknown_type(&self, requested: &str) -> String {
        let allowed = self
            .agents
            .names()
            .iter()
            .map(|n| format!("`{n}`"))
            .collect::<Vec<_>>()
            .join(", ");
        format!("Error: invoked agent of type {requested}, the only allowed types are [{allowed}]")
    }
}

#[async_trait]
impl Tool for TaskTool {
    fn name(&self) -> &str {
        TASK_TOOL_NAME
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "description": {
                    "type": "string",
                    "description": "Detailed, self-contained task for the sub-agent"
                },
                "subagent_type": {
                    "type": "string",
                    "enum": self.agents.names(),
                    "description": "Which sub-agent to run"
                }
            },
            "required": ["description", "subagent_type"]
        })
    }

    async fn execute(&self, call: &ToolCall, ctx: &ToolContext) -> Result<ToolOutput, ToolError> {
        let args: Args = call.parse_args()?;

        let Some(runtime) = self.agents.get(&args.subagent_type) else {
            debug!(requested = %args.subagent_type, "task: unknown sub-agent type");
            return Ok(ToolOutput::err(&call.id, self.unknown_type(&args.subagent_type)));
        };

        let state = ctx.require_state(self.name())?;
        let seeded = AgentState {
            messages: vec![Message::user(&args.description)],
            todos: state.todos.clone(),
            files: state.files.clone(),
        };

        info!(subagent = %args.subagent_type, call_id = %call.id, "task: dispatching sub-agent");
        let result = runtime
            .invoke(seeded)
            .await
            .with_context(|| format!("sub-agent `{}` failed", args.subagent_type))?;

        // A run that ends on the budget wrap-up prompt has no report.
        let report = result
            .last_message()
            .filter(|m| m.role == Role::Assistant)
            .and_then(Message::as_text)
            .filter(|t| !t.is_empty())
            .unwrap_or(NO_REPORT)
            .to_string();
        let changed = result.files.changed_since(&state.files);
        info!(
            subagent = %args.subagent_type,
            files_changed = changed.len(),
            "task: sub-agent finished"
        );

        Ok(ToolOutput::ok(&call.id, report).with_update(StateUpdate::files(changed)))
    }
}
