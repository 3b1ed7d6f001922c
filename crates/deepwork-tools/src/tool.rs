use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use crate::state::{AgentState, StateUpdate};

/// A single tool invocation requested by the model.
#[derive(Debug, Clone)]
pub struct ToolCall {
    /// Opaque identifier returned by the model (forwarded verbatim)
    pub id: String,
    pub name: String,
    /// Parsed JSON arguments
    pub args: Value,
}

impl ToolCall {
    /// Deserialize the arguments into a typed struct.
    pub fn parse_args<T: DeserializeOwned>(&self) -> Result<T, ToolError> {
        serde_json::from_value(self.args.clone()).map_err(|e| ToolError::InvalidArgument {
            tool: self.name.clone(),
            reason: e.to_string(),
        })
    }
}

/// Invocation context handed to every tool alongside its arguments.
#[derive(Debug, Clone)]
pub struct ToolContext {
    /// Snapshot of shared state taken when the call was issued.  `None`
    /// when the tool runs outside an agent loop.
    pub state: Option<Arc<AgentState>>,
    /// Identifier the result message is addressed to.
    pub call_id: String,
}

impl ToolContext {
    pub fn new(state: Arc<AgentState>, call_id: impl Into<String>) -> Self {
        Self { state: Some(state), call_id: call_id.into() }
    }

    /// Context with no reachable state.
    pub fn detached(call_id: impl Into<String>) -> Self {
        Self { state: None, call_id: call_id.into() }
    }

    /// The state snapshot, or [`ToolError::MissingState`].
    pub fn require_state(&self, tool: &str) -> Result<&AgentState, ToolError> {
        self.state.as_deref().ok_or_else(|| ToolError::MissingState { tool: tool.to_string() })
    }
}

/// The result of executing a tool.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    pub call_id: String,
    /// Text of the tool-result message.
    pub content: String,
    /// If true, the tool execution failed non-fatally (returned error message).
    pub is_error: bool,
    /// Partial state update to fold through the reducers.  Error outputs
    /// never carry one.
    pub update: Option<StateUpdate>,
}

impl ToolOutput {
    /// Successful plain-text result.
    pub fn ok(call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self { call_id: call_id.into(), content: content.into(), is_error: false, update: None }
    }

    /// Error result containing a plain-text error message.
    pub fn err(call_id: impl Into<String>, msg: impl Into<String>) -> Self {
        Self { call_id: call_id.into(), content: msg.into(), is_error: true, update: None }
    }

    pub fn with_update(mut self, update: StateUpdate) -> Self {
        self.update = Some(update);
        self
    }
}

/// Failures that abort a tool call instead of being reported to the model.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Wiring defect: a tool that needs shared state ran without it.
    #[error("state not available in execution of tool `{tool}`")]
    MissingState { tool: String },

    /// Malformed arguments.  [`crate::ToolRegistry::execute`] turns this
    /// into an error output the model can read.
    #[error("invalid arguments for `{tool}`: {reason}")]
    InvalidArgument { tool: String, reason: String },

    #[error(transparent)]
    Runtime(#[from] anyhow::Error),
}

/// Trait that every built-in and user-defined tool must implement.
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    /// JSON Schema for parameters
    fn parameters_schema(&self) -> Value;
    /// Execute the tool against the state snapshot in `ctx`.
    ///
    /// Recoverable failures go in [`ToolOutput::err`]; `Err` aborts the call.
    async fn execute(&self, call: &ToolCall, ctx: &ToolContext) -> Result<ToolOutput, ToolError>;
}
