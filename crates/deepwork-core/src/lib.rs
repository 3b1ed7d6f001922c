// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
mod agent;
mod events;
mod prompts;
mod runtime;

pub use agent::{ReactAgent, ReactAgentFactory};
pub use events::AgentEvent;
pub use prompts::{
    system_prompt, task_description, BASE_PROMPT, TASK_DESCRIPTION_PREFIX, TASK_DESCRIPTION_SUFFIX,
};
pub use runtime::{AgentRuntime, RuntimeFactory};
