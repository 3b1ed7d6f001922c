// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
/// YAML-configured mock model provider for end-to-end runs without a
/// hosted model.
///
/// The provider reads a YAML file that maps input patterns to canned
/// responses: a text reply, or one or more rounds of tool calls followed
/// by a final text reply.  Rules are matched against the last user message
/// of the request, so a primary agent and the sub-agents it dispatches
/// (whose conversation starts from the task description) can be scripted
/// from the same file.
///
/// # YAML format
///
/// ```yaml
/// responses:
///   - match_type: contains       # contains | equals | starts_with | regex | default
///     pattern: "ping"
///     reply: "pong"
///
///   - match_type: contains
///     pattern: "write a file"
///     tool_calls:
///       - id: tc-1
///         tool: write_file
///         args:
///           file_path: notes.txt
///           content: "hello"
///     follow_up:
///       - tool_calls:
///           - id: tc-2
///             tool: read_file
///             args: { file_path: notes.txt }
///     after_tool_reply: "File written."
///
///   - match_type: default
///     reply: "I understand your request."
/// ```
use std::path::Path;
use std::sync::atomic::{AtomicU32, Ordering};

use anyhow::Context;
use async_trait::async_trait;
use futures::stream;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{provider::ResponseStream, CompletionRequest, Message, ResponseEvent, Role};

// ─── YAML schema ─────────────────────────────────────────────────────────────

/// Root document.
#[derive(Debug, Deserialize)]
pub struct MockConfig {
    pub responses: Vec<ResponseRule>,
}

/// One entry in the responses list.
#[derive(Debug, Deserialize)]
pub struct ResponseRule {
    /// How to match the last user message.
    pub match_type: MatchType,
    /// Pattern string (ignored for `default` match type).
    #[serde(default)]
    pub pattern: String,
    /// Simple text reply (used when there are no tool_calls, or as the
    /// after-tool reply when `after_tool_reply` is unset).
    pub reply: Option<String>,
    /// Tool calls to emit in the first round.
    #[serde(default)]
    pub tool_calls: Vec<ToolCallDef>,
    /// Further rounds, one per batch of tool results received.
    #[serde(default)]
    pub follow_up: Vec<FollowUp>,
    /// Text reply once every tool round has completed.
    pub after_tool_reply: Option<String>,
}

/// A subsequent round: more tool calls, or a text reply.
#[derive(Debug, Deserialize)]
pub struct FollowUp {
    #[serde(default)]
    pub tool_calls: Vec<ToolCallDef>,
    pub reply: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchType {
    Contains,
    Equals,
    StartsWith,
    Regex,
    Default,
}

/// A single tool call defined in the YAML.
#[derive(Debug, Deserialize)]
pub struct ToolCallDef {
    pub id: String,
    pub tool: String,
    /// YAML map that is serialized to a JSON string for the tool arguments.
    #[serde(default = "empty_args")]
    pub args: serde_json::Value,
}

fn empty_args() -> serde_json::Value {
    serde_json::json!({})
}

// ─── Provider ────────────────────────────────────────────────────────────────

/// A model provider whose responses are driven by a YAML configuration file.
pub struct YamlMockProvider {
    config: MockConfig,
    call_count: AtomicU32,
    model: String,
}

impl YamlMockProvider {
    /// Load a provider from a YAML file at `path`.
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading mock responses file: {}", path.display()))?;
        Self::load(&text)
    }

    /// Load a provider from a YAML string.
    pub fn load(yaml: &str) -> anyhow::Result<Self> {
        let config: MockConfig =
            serde_yaml::from_str(yaml).context("parsing mock responses YAML")?;
        for rule in &config.responses {
            if rule.match_type == MatchType::Regex {
                regex::Regex::new(&rule.pattern)
                    .with_context(|| format!("invalid regex in mock rule: {}", rule.pattern))?;
            }
        }
        Ok(Self {
            config,
            call_count: AtomicU32::new(0),
            model: "yaml-mock-model".into(),
        })
    }

    /// Override the model identifier reported by [`ModelProvider::model_name`].
    ///
    /// [`ModelProvider::model_name`]: crate::ModelProvider::model_name
    pub fn with_model_name(mut self, name: impl Into<String>) -> Self {
        self.model = name.into();
        self
    }

    fn find_rule<'a>(&'a self, user_text: &str) -> Option<&'a ResponseRule> {
        let lower = user_text.to_lowercase();
        let mut default_rule = None;

        for rule in &self.config.responses {
            let hit = match rule.match_type {
                MatchType::Default => {
                    default_rule.get_or_insert(rule);
                    false
                }
                MatchType::Contains => lower.contains(&rule.pattern.to_lowercase()),
                MatchType::Equals => lower == rule.pattern.to_lowercase(),
                MatchType::StartsWith => lower.starts_with(&rule.pattern.to_lowercase()),
                MatchType::Regex => regex::Regex::new(&rule.pattern)
                    .map(|re| re.is_match(user_text))
                    .unwrap_or(false),
            };
            if hit {
                return Some(rule);
            }
        }

        default_rule
    }
}

/// Number of tool-result batches since the last user message.  Each batch
/// is a contiguous run of `Tool` messages.
fn tool_rounds_since_user(messages: &[Message]) -> usize {
    let start = messages
        .iter()
        .rposition(|m| m.role == Role::User)
        .map(|i| i + 1)
        .unwrap_or(0);
    let mut rounds = 0;
    let mut in_batch = false;
    for m in &messages[start..] {
        let is_tool = m.role == Role::Tool;
        if is_tool && !in_batch {
            rounds += 1;
        }
        in_batch = is_tool;
    }
    rounds
}

#[async_trait]
impl crate::ModelProvider for YamlMockProvider {
    fn name(&self) -> &str {
        "yaml-mock"
    }
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn complete(&self, req: CompletionRequest) -> anyhow::Result<ResponseStream> {
        let call_num = self.call_count.fetch_add(1, Ordering::SeqCst) + 1;

        let last_user_text = req
            .messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .and_then(|m| m.as_text())
            .unwrap_or("[no user message]")
            .to_string();
        let round = tool_rounds_since_user(&req.messages);

        debug!(call_num, round, last_user = %last_user_text, "yaml mock complete()");

        let events = match self.find_rule(&last_user_text) {
            None => text_events("[no mock rule matched]"),
            Some(r) if round == 0 => {
                if r.tool_calls.is_empty() {
                    text_events(r.reply.as_deref().unwrap_or("[no reply configured]"))
                } else {
                    tool_call_events(&r.tool_calls)
                }
            }
            Some(r) => match r.follow_up.get(round - 1) {
                Some(step) if !step.tool_calls.is_empty() => tool_call_events(&step.tool_calls),
                Some(step) => {
                    text_events(step.reply.as_deref().unwrap_or("[no reply configured]"))
                }
                None => text_events(
                    r.after_tool_reply
                        .as_deref()
                        .or(r.reply.as_deref())
                        .unwrap_or("[no after-tool reply configured]"),
                ),
            },
        };

        Ok(Box::pin(stream::iter(events)))
    }
}

// ─── Event constructors ───────────────────────────────────────────────────────

fn text_events(text: &str) -> Vec<anyhow::Result<ResponseEvent>> {
    vec![
        Ok(ResponseEvent::TextDelta(text.to_string())),
        Ok(ResponseEvent::Usage { input_tokens: 5, output_tokens: text.len() as u32 / 4 + 1 }),
        Ok(ResponseEvent::Done),
    ]
}

fn tool_call_events(tool_calls: &[ToolCallDef]) -> Vec<anyhow::Result<ResponseEvent>> {
    let mut events: Vec<anyhow::Result<ResponseEvent>> = tool_calls
        .iter()
        .map(|tc| {
            Ok(ResponseEvent::ToolCall {
                id: tc.id.clone(),
                name: tc.tool.clone(),
                arguments: tc.args.to_string(),
            })
        })
        .collect();
    events.push(Ok(ResponseEvent::Done));
    events
}

// ─── Unit tests ──────────────────────────────────────────────────────────────
