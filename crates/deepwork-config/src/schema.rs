// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub agent: AgentConfig,
    #[serde(default)]
    pub model: ModelConfig,
    /// Sub-agents declared inline.
    ///
    /// ```toml
    /// [[subagents]]
    /// name = "research-agent"
    /// description = "Used to research more in depth questions."
    /// prompt = "You are a dedicated researcher."
    /// tools = ["internet_search"]
    /// ```
    #[serde(default)]
    pub subagents: Vec<AgentDefinition>,
    /// Directory of markdown sub-agent definitions (YAML frontmatter + prompt body).
    /// Inline `subagents` entries win over files that declare the same name.
    #[serde(default)]
    pub agents_dir: Option<PathBuf>,
}

fn default_max_tool_rounds() -> u32 {
    50
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Top-level instructions.  The primary loop receives these followed by
    /// the built-in tool guidance; the `general-purpose` sub-agent receives
    /// them verbatim.
    pub instructions: String,
    /// Maximum number of tool-call rounds before the loop is asked for a
    /// final summary and stopped.
    pub max_tool_rounds: u32,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            instructions: String::new(),
            max_tool_rounds: default_max_tool_rounds(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Model name reported by the provider.
    pub name: String,
    /// Path to a YAML mock-responses file.
    /// Can also be set via the DEEPWORK_MOCK_RESPONSES environment variable.
    pub mock_responses_file: Option<String>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: "mock-model".into(),
            mock_responses_file: None,
        }
    }
}

/// Static description of a delegatable sub-agent.
///
/// `tools` lists the names of the capabilities the sub-agent may use.  When
/// absent the sub-agent receives the full tool set of the primary loop
/// (minus `task`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentDefinition {
    pub name: String,
    pub description: String,
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<String>>,
}

impl AgentDefinition {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        prompt: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            prompt: prompt.into(),
            tools: None,
        }
    }

    /// Restrict the sub-agent to the named tools.
    pub fn with_tools<I, S>(mut self, tools: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tools = Some(tools.into_iter().map(Into::into).collect());
        self
    }
}
