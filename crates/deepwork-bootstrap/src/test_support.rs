//! Test doubles shared by the unit tests of this crate.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use deepwork_core::{AgentRuntime, ReactAgent, RuntimeFactory};
use deepwork_model::{Message, ModelProvider};
use deepwork_tools::{AgentState, FileMap, StateUpdate, Todo, TodoStatus, ToolRegistry};

use crate::PRIMARY_AGENT_NAME;

/// What a factory was asked to build.
#[derive(Debug, Clone)]
pub struct Built {
    pub name: String,
    pub prompt: String,
    pub tools: Vec<String>,
}

/// Runtime that performs one deterministic step instead of calling a model.
///
/// It writes `<name>.md` holding the task description, replaces the todo
/// list, and answers with `report from <name>: <description>`.  A
/// description containing `fail` makes the run return an error.
pub struct StubRuntime {
    name: String,
    tools: Vec<String>,
    seen: Arc<Mutex<Vec<(String, AgentState)>>>,
}

#[async_trait]
impl AgentRuntime for StubRuntime {
    fn name(&self) -> &str {
        &self.name
    }

    fn tool_names(&self) -> Vec<String> {
        self.tools.clone()
    }

    async fn invoke(&self, state: AgentState) -> anyhow::Result<AgentState> {
        self.seen.lock().unwrap().push((self.name.clone(), state.clone()));
        let description = state
            .messages
            .first()
            .and_then(|m| m.as_text())
            .unwrap_or_default()
            .to_string();
        if description.contains("fail") {
            anyhow::bail!("{} could not finish", self.name);
        }
        tokio::task::yield_now().await;

        let mut files = FileMap::new();
        files.insert(format!("{}.md", self.name), description.clone());
        Ok(state.apply(StateUpdate {
            messages: vec![
                Message::assistant("working on it"),
                Message::assistant(format!("report from {}: {description}", self.name)),
            ],
            todos: Some(vec![Todo::new("sub-agent private plan", TodoStatus::InProgress)]),
            files: Some(files),
        }))
    }
}

/// Factory building [`StubRuntime`]s, or a real [`ReactAgent`] for the
/// primary loop when a model is supplied.
#[derive(Default)]
pub struct StubFactory {
    pub built: Mutex<Vec<Built>>,
    pub seen: Arc<Mutex<Vec<(String, AgentState)>>>,
    primary_model: Option<Arc<dyn ModelProvider>>,
}

impl StubFactory {
    pub fn with_primary_model(model: Arc<dyn ModelProvider>) -> Self {
        Self { primary_model: Some(model), ..Default::default() }
    }

    pub fn built(&self, name: &str) -> Option<Built> {
        self.built.lock().unwrap().iter().find(|b| b.name == name).cloned()
    }

    pub fn seen_by(&self, name: &str) -> Vec<AgentState> {
        self.seen
            .lock()
            .unwrap()
            .iter()
            .filter(|(n, _)| n == name)
            .map(|(_, s)| s.clone())
            .collect()
    }
}

impl RuntimeFactory for StubFactory {
    fn build(&self, name: &str, prompt: &str, tools: ToolRegistry) -> Arc<dyn AgentRuntime> {
        self.built.lock().unwrap().push(Built {
            name: name.to_string(),
            prompt: prompt.to_string(),
            tools: tools.names(),
        });
        match (&self.primary_model, name) {
            (Some(model), PRIMARY_AGENT_NAME) => {
                Arc::new(ReactAgent::new(name, Arc::clone(model), prompt, tools))
            }
            _ => Arc::new(StubRuntime {
                name: name.to_string(),
                tools: tools.names(),
                seen: Arc::clone(&self.seen),
            }),
        }
    }
}
