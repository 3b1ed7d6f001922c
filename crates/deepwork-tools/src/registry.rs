// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use deepwork_model::ToolSchema;

use crate::{Tool, ToolCall, ToolContext, ToolError, ToolOutput};

/// A requested tool name with no registered counterpart.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown tool: {0}")]
pub struct UnknownTool(pub String);

/// Ordered collection of tools, keyed by name.
///
/// Iteration follows registration order; registering an existing name
/// replaces that tool in place.
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self { tools: Vec::new() }
    }

    pub fn register(&mut self, tool: impl Tool + 'static) {
        self.register_arc(Arc::new(tool));
    }

    pub fn register_arc(&mut self, tool: Arc<dyn Tool>) {
        match self.tools.iter_mut().find(|t| t.name() == tool.name()) {
            Some(slot) => *slot = tool,
            None => self.tools.push(tool),
        }
    }

    pub fn extend(&mut self, tools: impl IntoIterator<Item = Arc<dyn Tool>>) {
        for tool in tools {
            self.register_arc(tool);
        }
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.iter().find(|t| t.name() == name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.iter().any(|t| t.name() == name)
    }

    pub fn names(&self) -> Vec<String> {
        self.tools.iter().map(|t| t.name().to_string()).collect()
    }

    /// Schemas for every registered tool, in registration order.
    pub fn schemas(&self) -> Vec<ToolSchema> {
        self.tools
            .iter()
            .map(|t| ToolSchema {
                name: t.name().to_string(),
                description: t.description().to_string(),
                parameters: t.parameters_schema(),
            })
            .collect()
    }

    /// A new registry holding exactly `names`, in the order given.
    /// Fails on the first name that is not registered here.
    pub fn subset<S: AsRef<str>>(&self, names: &[S]) -> Result<ToolRegistry, UnknownTool> {
        let mut out = ToolRegistry::new();
        for name in names {
            let name = name.as_ref();
            let tool = self.get(name).ok_or_else(|| UnknownTool(name.to_string()))?;
            out.register_arc(tool);
        }
        Ok(out)
    }

    /// Dispatch `call` to the named tool.
    ///
    /// Unknown names and malformed arguments come back as error outputs;
    /// only precondition and runtime failures are returned as `Err`.
    pub async fn execute(&self, call: &ToolCall, ctx: &ToolContext) -> Result<ToolOutput, ToolError> {
        let Some(tool) = self.get(&call.name) else {
            return Ok(ToolOutput::err(&call.id, format!("Error: unknown tool: {}", call.name)));
        };
        debug!(tool = %call.name, call_id = %call.id, "executing tool");
        match tool.execute(call, ctx).await {
            Err(e @ ToolError::InvalidArgument { .. }) => Ok(ToolOutput::err(&call.id, format!("Error: {e}"))),
            other => other,
        }
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.tools.iter().map(|t| t.name())).finish()
    }
}

// ─── Unit tests ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use serde::Deserialize;
    use serde_json::{json, Value};

    use super::*;

    /// Minimal tool for registry tests.
    struct EchoTool {
        name: &'static str,
    }

    #[derive(Deserialize)]
    struct EchoArgs {
        text: String,
    }

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &str {
            self.name
        }
        fn description(&self) -> &str {
            "echoes its input"
        }
        fn parameters_schema(&self) -> Value {
            json!({ "type": "object" })
        }
        async fn execute(&self, call: &ToolCall, _ctx: &ToolContext) -> Result<ToolOutput, ToolError> {
            let args: EchoArgs = call.parse_args()?;
            Ok(ToolOutput::ok(&call.id, format!("echo:{}", args.text)))
        }
    }

    fn call(name: &str, args: Value) -> ToolCall {
        ToolCall { id: "1".into(), name: name.into(), args }
    }

    #[test]
    fn register_and_get() {
        let mut reg = ToolRegistry::new();
        reg.register(EchoTool { name: "echo" });
        assert!(reg.get("echo").is_some());
        assert!(reg.get("nope").is_none());
    }

    #[test]
    fn names_follow_registration_order() {
        let mut reg = ToolRegistry::new();
        reg.register(EchoTool { name: "b" });
        reg.register(EchoTool { name: "a" });
        assert_eq!(reg.names(), vec!["b", "a"]);
    }

    #[test]
    fn registering_same_name_twice_replaces_in_place() {
        let mut reg = ToolRegistry::new();
        reg.register(EchoTool { name: "t" });
        reg.register(EchoTool { name: "u" });
        reg.register(EchoTool { name: "t" });
        assert_eq!(reg.names(), vec!["t", "u"]);
    }

    #[test]
    fn schemas_include_description() {
        let mut reg = ToolRegistry::new();
        reg.register(EchoTool { name: "t" });
        let schemas = reg.schemas();
        assert_eq!(schemas[0].name, "t");
        assert_eq!(schemas[0].description, "echoes its input");
    }

    #[test]
    fn subset_resolves_in_requested_order() {
        let mut reg = ToolRegistry::new();
        for name in ["a", "b", "c"] {
            reg.register(EchoTool { name });
        }
        let sub = reg.subset(&["c", "a"]).unwrap();
        assert_eq!(sub.names(), vec!["c", "a"]);
    }

    #[test]
    fn subset_rejects_unknown_name() {
        let mut reg = ToolRegistry::new();
        reg.register(EchoTool { name: "a" });
        let err = reg.subset(&["a", "internet_search"]).unwrap_err();
        assert_eq!(err, UnknownTool("internet_search".into()));
    }

    #[tokio::test]
    async fn execute_known_tool_succeeds() {
        let mut reg = ToolRegistry::new();
        reg.register(EchoTool { name: "echo" });
        let out = reg
            .execute(&call("echo", json!({"text": "hi"})), &ToolContext::detached("1"))
            .await
            .unwrap();
        assert!(!out.is_error);
        assert_eq!(out.content, "echo:hi");
    }

    #[tokio::test]
    async fn execute_unknown_tool_returns_error_output() {
        let reg = ToolRegistry::new();
        let out = reg.execute(&call("missing", json!({})), &ToolContext::detached("x")).await.unwrap();
        assert!(out.is_error);
        assert!(out.content.contains("unknown tool"));
    }

    #[tokio::test]
    async fn invalid_arguments_become_error_output() {
        let mut reg = ToolRegistry::new();
        reg.register(EchoTool { name: "echo" });
        let out = reg
            .execute(&call("echo", json!({"wrong": 1})), &ToolContext::detached("1"))
            .await
            .unwrap();
        assert!(out.is_error);
        assert!(out.content.contains("invalid arguments for `echo`"));
        assert!(out.update.is_none());
    }
}
