// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use futures::StreamExt;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use deepwork_config::AgentConfig;
use deepwork_model::{CompletionRequest, Message, ModelProvider, ResponseEvent};
use deepwork_tools::{
    AgentState, ToolCall, ToolContext, ToolError, ToolOutput, ToolRegistry,
};

use crate::{
    events::AgentEvent,
    prompts::wrap_up_prompt,
    runtime::{AgentRuntime, RuntimeFactory},
};

/// Reference tool-calling loop: model call → parallel tool calls → repeat.
pub struct ReactAgent {
    name: String,
    model: Arc<dyn ModelProvider>,
    prompt: String,
    tools: Arc<ToolRegistry>,
    max_tool_rounds: u32,
    events: Option<mpsc::Sender<AgentEvent>>,
}

/// Output of one model completion.
struct Turn {
    text: String,
    tool_calls: Vec<ToolCall>,
}

impl ReactAgent {
    pub fn new(
        name: impl Into<String>,
        model: Arc<dyn ModelProvider>,
        prompt: impl Into<String>,
        tools: ToolRegistry,
    ) -> Self {
        Self {
            name: name.into(),
            model,
            prompt: prompt.into(),
            tools: Arc::new(tools),
            max_tool_rounds: AgentConfig::default().max_tool_rounds,
            events: None,
        }
    }

    pub fn with_max_tool_rounds(mut self, rounds: u32) -> Self {
        self.max_tool_rounds = rounds;
        self
    }

    /// Report progress on `tx`.  Send failures are ignored.
    pub fn with_events(mut self, tx: mpsc::Sender<AgentEvent>) -> Self {
        self.events = Some(tx);
        self
    }

    async fn emit(&self, event: AgentEvent) {
        if let Some(tx) = &self.events {
            let _ = tx.send(event).await;
        }
    }

    /// Stream one completion.  The system prompt is sent with every request
    /// but never stored in the conversation log.
    async fn complete_turn(&self, log: &[Message], with_tools: bool) -> anyhow::Result<Turn> {
        let mut messages = Vec::with_capacity(log.len() + 1);
        if !self.prompt.is_empty() {
            messages.push(Message::system(&self.prompt));
        }
        messages.extend_from_slice(log);
        let req = CompletionRequest {
            messages,
            tools: if with_tools { self.tools.schemas() } else { Vec::new() },
        };

        let mut stream = self
            .model
            .complete(req)
            .await
            .context("model completion failed")?;

        let mut text = String::new();
        let mut tool_calls = Vec::new();
        while let Some(event) = stream.next().await {
            match event? {
                ResponseEvent::TextDelta(delta) if !delta.is_empty() => {
                    text.push_str(&delta);
                    self.emit(AgentEvent::TextDelta { agent: self.name.clone(), text: delta })
                        .await;
                }
                ResponseEvent::ToolCall { id, name, arguments } => {
                    if !with_tools {
                        warn!(agent = %self.name, tool = %name, "ignoring tool call on a tool-free turn");
                        continue;
                    }
                    if name.is_empty() {
                        warn!(tool_call_id = %id, "dropping tool call with empty name from model");
                        continue;
                    }
                    let id = if id.is_empty() {
                        format!("tc_synthetic_{}", tool_calls.len())
                    } else {
                        id
                    };
                    tool_calls.push(ToolCall { args: parse_arguments(&name, &arguments), id, name });
                }
                ResponseEvent::Usage { input_tokens, output_tokens } => {
                    self.emit(AgentEvent::TokenUsage {
                        agent: self.name.clone(),
                        input: input_tokens,
                        output: output_tokens,
                    })
                    .await;
                }
                ResponseEvent::Done => break,
                ResponseEvent::Error(e) => {
                    warn!(agent = %self.name, "model stream error: {e}");
                    self.emit(AgentEvent::Error { agent: self.name.clone(), message: e }).await;
                }
                _ => {}
            }
        }

        if !text.is_empty() {
            self.emit(AgentEvent::TextComplete { agent: self.name.clone(), text: text.clone() })
                .await;
        }
        Ok(Turn { text, tool_calls })
    }

    /// Execute one round of tool calls.
    ///
    /// Every call runs as its own task against the same pre-round snapshot.
    /// Results are folded through the reducers in call order, so when two
    /// calls write the same path the later call wins.
    async fn run_tool_round(&self, state: &mut AgentState, calls: Vec<ToolCall>) -> anyhow::Result<()> {
        // Phase 1: record the assistant's tool-call requests.
        for tc in &calls {
            self.emit(AgentEvent::ToolCallStarted { agent: self.name.clone(), call: tc.clone() })
                .await;
            state.messages.push(Message::tool_call(&tc.id, &tc.name, tc.args.to_string()));
        }

        // Phase 2: execute in parallel.
        let snapshot = Arc::new(state.clone());
        let mut tasks = Vec::with_capacity(calls.len());
        for tc in calls.iter().cloned() {
            let registry = Arc::clone(&self.tools);
            let ctx = ToolContext::new(Arc::clone(&snapshot), tc.id.clone());
            tasks.push(tokio::spawn(async move { registry.execute(&tc, &ctx).await }));
        }

        let mut outputs: Vec<Result<ToolOutput, ToolError>> = Vec::with_capacity(calls.len());
        for (tc, task) in calls.iter().zip(tasks) {
            outputs.push(match task.await {
                Ok(result) => result,
                Err(e) => Ok(ToolOutput::err(&tc.id, format!("tool panicked: {e}"))),
            });
        }

        // Phase 3: fold results and deltas back into shared state.
        for (tc, output) in calls.iter().zip(outputs) {
            let output = output
                .map_err(anyhow::Error::from)
                .with_context(|| format!("tool `{}` failed in agent `{}`", tc.name, self.name))?;
            debug!(
                agent = %self.name,
                tool = %tc.name,
                is_error = output.is_error,
                "tool call finished"
            );
            self.emit(AgentEvent::ToolCallFinished {
                agent: self.name.clone(),
                call_id: tc.id.clone(),
                tool_name: tc.name.clone(),
                output: output.content.clone(),
                is_error: output.is_error,
            })
            .await;

            let mut update = output.update.unwrap_or_default();
            update.messages.insert(0, Message::tool_result(&tc.id, output.content));
            if let Some(todos) = &update.todos {
                self.emit(AgentEvent::TodoUpdate { agent: self.name.clone(), todos: todos.clone() })
                    .await;
            }
            state.apply_mut(update);
        }
        Ok(())
    }
}

/// Resolve raw argument text to a JSON value.  Malformed text is passed on
/// as a JSON string so the tool reports it as an invalid argument.
fn parse_arguments(tool: &str, raw: &str) -> serde_json::Value {
    if raw.trim().is_empty() {
        return serde_json::Value::Object(Default::default());
    }
    serde_json::from_str(raw).unwrap_or_else(|e| {
        warn!(tool, "model sent invalid JSON arguments: {e}");
        serde_json::Value::String(raw.to_string())
    })
}

#[async_trait]
impl AgentRuntime for ReactAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn tool_names(&self) -> Vec<String> {
        self.tools.names()
    }

    async fn invoke(&self, mut state: AgentState) -> anyhow::Result<AgentState> {
        let mut rounds = 0u32;
        loop {
            rounds += 1;
            if rounds > self.max_tool_rounds {
                // One final tool-free turn so the model can summarise.
                warn!(agent = %self.name, max = self.max_tool_rounds, "tool-round budget exhausted");
                state.messages.push(Message::user(wrap_up_prompt(self.max_tool_rounds)));
                let turn = self.complete_turn(&state.messages, false).await?;
                if !turn.text.is_empty() {
                    state.messages.push(Message::assistant(turn.text));
                }
                break;
            }

            let turn = self.complete_turn(&state.messages, true).await?;
            if !turn.text.is_empty() {
                state.messages.push(Message::assistant(turn.text));
            }
            if turn.tool_calls.is_empty() {
                break;
            }
            self.run_tool_round(&mut state, turn.tool_calls).await?;
        }

        self.emit(AgentEvent::TurnComplete { agent: self.name.clone() }).await;
        Ok(state)
    }
}

/// Builds [`ReactAgent`]s that share one model provider.
pub struct ReactAgentFactory {
    model: Arc<dyn ModelProvider>,
    max_tool_rounds: u32,
    events: Option<mpsc::Sender<AgentEvent>>,
}

impl ReactAgentFactory {
    pub fn new(model: Arc<dyn ModelProvider>) -> Self {
        Self { model, max_tool_rounds: AgentConfig::default().max_tool_rounds, events: None }
    }

    pub fn with_max_tool_rounds(mut self, rounds: u32) -> Self {
        self.max_tool_rounds = rounds;
        self
    }

    pub fn with_events(mut self, tx: mpsc::Sender<AgentEvent>) -> Self {
        self.events = Some(tx);
        self
    }
}

impl RuntimeFactory for ReactAgentFactory {
    fn build(&self, name: &str, prompt: &str, tools: ToolRegistry) -> Arc<dyn AgentRuntime> {
        let mut agent = ReactAgent::new(name, Arc::clone(&self.model), prompt, tools)
            .with_max_tool_rounds(self.max_tool_rounds);
        if let Some(tx) = &self.events {
            agent = agent.with_events(tx.clone());
        }
        Arc::new(agent)
    }
}
