// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! [`DeepAgentBuilder`]: single entry point for constructing a fully wired
//! deep agent.
//!
//! 1. Sub-agents are bound to `user tools ++ built-ins` (or the subset they
//!    name) through the [`AgentRegistry`].
//! 2. The `task` tool is created over that registry.
//! 3. The primary loop receives `task ++ built-ins ++ user tools` and the
//!    instructions followed by the built-in tool guidance.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::info;

use deepwork_config::{AgentConfig, AgentDefinition, Config};
use deepwork_core::{system_prompt, AgentEvent, AgentRuntime, ReactAgentFactory, RuntimeFactory};
use deepwork_model::ModelProvider;
use deepwork_tools::{builtin_tools, AgentState, Tool, ToolRegistry};

use crate::registry::{AgentRegistry, RegistryError};
use crate::task_tool::{TaskTool, TASK_TOOL_NAME};

/// Name the primary loop reports in logs and events.
pub const PRIMARY_AGENT_NAME: &str = "main";

pub struct DeepAgentBuilder {
    model: Arc<dyn ModelProvider>,
    instructions: String,
    tools: Vec<Arc<dyn Tool>>,
    subagents: Vec<AgentDefinition>,
    max_tool_rounds: u32,
    events: Option<mpsc::Sender<AgentEvent>>,
    factory: Option<Arc<dyn RuntimeFactory>>,
}

impl DeepAgentBuilder {
    pub fn new(model: Arc<dyn ModelProvider>) -> Self {
        Self {
            model,
            instructions: String::new(),
            tools: Vec::new(),
            subagents: Vec::new(),
            max_tool_rounds: AgentConfig::default().max_tool_rounds,
            events: None,
            factory: None,
        }
    }

    /// Builder pre-populated from `[agent]`, `[[subagents]]` and `agents_dir`.
    pub fn from_config(model: Arc<dyn ModelProvider>, config: &Config) -> Self {
        Self::new(model)
            .instructions(config.agent.instructions.clone())
            .max_tool_rounds(config.agent.max_tool_rounds)
            .subagents(config.subagent_definitions())
    }

    pub fn instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = instructions.into();
        self
    }

    pub fn tool(mut self, tool: impl Tool + 'static) -> Self {
        self.tools.push(Arc::new(tool));
        self
    }

    pub fn tools(mut self, tools: impl IntoIterator<Item = Arc<dyn Tool>>) -> Self {
        self.tools.extend(tools);
        self
    }

    pub fn subagent(mut self, def: AgentDefinition) -> Self {
        self.subagents.push(def);
        self
    }

    pub fn subagents(mut self, defs: impl IntoIterator<Item = AgentDefinition>) -> Self {
        self.subagents.extend(defs);
        self
    }

    pub fn max_tool_rounds(mut self, rounds: u32) -> Self {
        self.max_tool_rounds = rounds;
        self
    }

    /// Progress events of the primary loop and every sub-agent.
    pub fn events(mut self, tx: mpsc::Sender<AgentEvent>) -> Self {
        self.events = Some(tx);
        self
    }

    /// Replace the default [`ReactAgentFactory`].  `max_tool_rounds` and
    /// `events` are then the factory's concern.
    pub fn runtime_factory(mut self, factory: Arc<dyn RuntimeFactory>) -> Self {
        self.factory = Some(factory);
        self
    }

    pub fn build(self) -> Result<DeepAgent, RegistryError> {
        let factory = match self.factory {
            Some(f) => f,
            None => {
                let mut f = ReactAgentFactory::new(Arc::clone(&self.model))
                    .with_max_tool_rounds(self.max_tool_rounds);
                if let Some(tx) = self.events {
                    f = f.with_events(tx);
                }
                Arc::new(f) as Arc<dyn RuntimeFactory>
            }
        };

        let mut base = ToolRegistry::new();
        base.extend(self.tools.iter().cloned());
        if base.contains(TASK_TOOL_NAME) {
            return Err(RegistryError::ReservedTool(TASK_TOOL_NAME.to_string()));
        }
        base.extend(builtin_tools());

        let agents = Arc::new(AgentRegistry::build(
            &base,
            &self.instructions,
            &self.subagents,
            factory.as_ref(),
        )?);

        let mut primary = ToolRegistry::new();
        primary.register(TaskTool::new(Arc::clone(&agents)));
        primary.extend(builtin_tools());
        primary.extend(self.tools);

        info!(tools = ?primary.names(), subagents = ?agents.names(), "deep agent assembled");
        let runtime = factory.build(PRIMARY_AGENT_NAME, &system_prompt(&self.instructions), primary);
        Ok(DeepAgent { runtime, agents })
    }
}

/// The assembled primary loop plus the sub-agents it can delegate to.
pub struct DeepAgent {
    runtime: Arc<dyn AgentRuntime>,
    agents: Arc<AgentRegistry>,
}

impl DeepAgent {
    /// Run to completion on a fresh state holding `input` as the only
    /// message.
    pub async fn run(&self, input: impl Into<String>) -> anyhow::Result<AgentState> {
        self.run_with_state(AgentState::from_input(input)).await
    }

    /// Run to completion on caller-supplied state, e.g. with pre-seeded files.
    pub async fn run_with_state(&self, state: AgentState) -> anyhow::Result<AgentState> {
        self.runtime.invoke(state).await
    }

    pub fn agents(&self) -> &AgentRegistry {
        &self.agents
    }

    pub fn tool_names(&self) -> Vec<String> {
        self.runtime.tool_names()
    }
}
