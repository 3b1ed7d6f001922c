// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! Sub-agent registry.
//!
//! Built once from the base tool set and the sub-agent definitions; every
//! entry is bound to a tool subset that is resolved and validated here, so
//! a definition naming a tool that does not exist fails the build.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info};

use deepwork_config::AgentDefinition;
use deepwork_core::{AgentRuntime, RuntimeFactory};
use deepwork_tools::ToolRegistry;

/// Name of the always-present default delegation target.
pub const GENERAL_PURPOSE: &str = "general-purpose";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("sub-agent `{agent}` requests unknown tool `{tool}`")]
    UnknownTool { agent: String, tool: String },

    #[error("sub-agent `{0}` is defined more than once")]
    DuplicateAgent(String),

    #[error("tool name `{0}` is reserved")]
    ReservedTool(String),
}

/// Name-keyed collection of ready-to-invoke sub-agent runtimes.
pub struct AgentRegistry {
    /// Registration order; `general-purpose` first.
    agents: Vec<(String, Arc<dyn AgentRuntime>)>,
    catalogue: String,
}

impl AgentRegistry {
    /// Build the registry.
    ///
    /// `general-purpose` gets the full `base_tools` and `instructions` as its
    /// prompt.  Each definition gets the tools it names, in that order, or
    /// the full set when it names none.
    pub fn build(
        base_tools: &ToolRegistry,
        instructions: &str,
        subagents: &[AgentDefinition],
        factory: &dyn RuntimeFactory,
    ) -> Result<Self, RegistryError> {
        let mut agents: Vec<(String, Arc<dyn AgentRuntime>)> = vec![(
            GENERAL_PURPOSE.to_string(),
            factory.build(GENERAL_PURPOSE, instructions, base_tools.clone()),
        )];

        for def in subagents {
            if agents.iter().any(|(name, _)| name == &def.name) {
                return Err(RegistryError::DuplicateAgent(def.name.clone()));
            }
            let tools = match &def.tools {
                Some(names) => base_tools.subset(names.as_slice()).map_err(|e| RegistryError::UnknownTool {
                    agent: def.name.clone(),
                    tool: e.0,
                })?,
                None => base_tools.clone(),
            };
            debug!(agent = %def.name, tools = ?tools.names(), "binding sub-agent");
            agents.push((def.name.clone(), factory.build(&def.name, &def.prompt, tools)));
        }

        let catalogue = subagents
            .iter()
            .map(|d| format!("- {}: {}", d.name, d.description))
            .collect::<Vec<_>>()
            .join("\n");

        info!(count = agents.len(), "sub-agent registry built");
        Ok(Self { agents, catalogue })
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn AgentRuntime>> {
        self.agents.iter().find(|(n, _)| n == name).map(|(_, rt)| Arc::clone(rt))
    }

    /// Every registered name, `general-purpose` first.
    pub fn names(&self) -> Vec<String> {
        self.agents.iter().map(|(n, _)| n.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// One `- name: description` line per user-defined sub-agent.
    pub fn catalogue(&self) -> &str {
        &self.catalogue
    }
}
