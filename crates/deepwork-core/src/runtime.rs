// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use std::sync::Arc;

use async_trait::async_trait;

use deepwork_tools::{AgentState, ToolRegistry};

/// Drives one agent's reasoning and tool-call loop to completion.
#[async_trait]
pub trait AgentRuntime: Send + Sync {
    fn name(&self) -> &str;

    /// Tools this runtime may call, in the order they are offered.
    fn tool_names(&self) -> Vec<String>;

    /// Run against `state` until the agent stops calling tools and return
    /// the final state.  The returned log extends the input log.
    async fn invoke(&self, state: AgentState) -> anyhow::Result<AgentState>;
}

/// Builds runtimes bound to a prompt and a tool set.  The model is chosen
/// by the factory.
pub trait RuntimeFactory: Send + Sync {
    fn build(&self, name: &str, prompt: &str, tools: ToolRegistry) -> Arc<dyn AgentRuntime>;
}
