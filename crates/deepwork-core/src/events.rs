// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use deepwork_tools::{Todo, ToolCall};

/// Events emitted by an agent while it runs.
/// Consumers (the CLI) subscribe to these to drive their output.
#[derive(Debug, Clone)]
pub enum AgentEvent {
    /// A text chunk streamed from the model
    TextDelta { agent: String, text: String },
    /// A complete text response from the model (after streaming finishes)
    TextComplete { agent: String, text: String },
    /// The model has requested a tool call
    ToolCallStarted { agent: String, call: ToolCall },
    /// A tool call finished
    ToolCallFinished {
        agent: String,
        call_id: String,
        tool_name: String,
        output: String,
        is_error: bool,
    },
    /// Token usage reported by the provider for one completion
    TokenUsage { agent: String, input: u32, output: u32 },
    /// The task list was replaced
    TodoUpdate { agent: String, todos: Vec<Todo> },
    /// The agent has run to completion
    TurnComplete { agent: String },
    /// A recoverable error occurred
    Error { agent: String, message: String },
}

impl AgentEvent {
    /// Name of the agent that emitted the event.
    pub fn agent(&self) -> &str {
        match self {
            AgentEvent::TextDelta { agent, .. }
            | AgentEvent::TextComplete { agent, .. }
            | AgentEvent::ToolCallStarted { agent, .. }
            | AgentEvent::ToolCallFinished { agent, .. }
            | AgentEvent::TokenUsage { agent, .. }
            | AgentEvent::TodoUpdate { agent, .. }
            | AgentEvent::TurnComplete { agent }
            | AgentEvent::Error { agent, .. } => agent,
        }
    }
}
