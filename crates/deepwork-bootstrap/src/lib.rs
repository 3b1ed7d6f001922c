//! Deep-agent construction.
//!
//! This crate wires the pieces of the other crates together:
//! - the sub-agent registry ([`AgentRegistry`]), each entry bound to a
//!   validated subset of the base tools
//! - the [`TaskTool`] dispatcher the primary loop uses to delegate
//! - [`DeepAgentBuilder`], which assembles the primary loop
//!
//! Frontends depend on this crate instead of assembling agents themselves.

pub mod agent;
pub mod registry;
pub mod task_tool;
#[cfg(test)]
mod test_support;

pub use agent::{DeepAgent, DeepAgentBuilder, PRIMARY_AGENT_NAME};
pub use registry::{AgentRegistry, RegistryError, GENERAL_PURPOSE};
pub use task_tool::{TaskTool, TASK_TOOL_NAME};
