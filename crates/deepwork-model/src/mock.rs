// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use futures::stream;

use crate::{provider::ResponseStream, CompletionRequest, ModelProvider, ResponseEvent, Role};

fn into_stream(events: Vec<ResponseEvent>) -> ResponseStream {
    Box::pin(stream::iter(events.into_iter().map(Ok)))
}

/// Fallback provider when no responses file is configured.  Replies with
/// the latest user message prefixed by `MOCK: `.
#[derive(Default)]
pub struct MockProvider;

#[async_trait]
impl ModelProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }
    fn model_name(&self) -> &str {
        "mock-model"
    }

    async fn complete(&self, req: CompletionRequest) -> anyhow::Result<ResponseStream> {
        let input = req
            .messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .and_then(|m| m.as_text())
            .unwrap_or("[no input]");
        Ok(into_stream(vec![
            ResponseEvent::TextDelta(format!("MOCK: {input}")),
            ResponseEvent::Done,
        ]))
    }
}

/// Serves one queued event script per `complete` call and records every
/// request it receives.  Once the queue is empty it answers with
/// `[no more scripts]`.
pub struct ScriptedMockProvider {
    scripts: Mutex<VecDeque<Vec<ResponseEvent>>>,
    pub requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedMockProvider {
    pub fn new(scripts: Vec<Vec<ResponseEvent>>) -> Self {
        Self { scripts: Mutex::new(scripts.into()), requests: Mutex::new(Vec::new()) }
    }

    pub fn always_text(reply: impl Into<String>) -> Self {
        Self::new(vec![vec![ResponseEvent::TextDelta(reply.into()), ResponseEvent::Done]])
    }

    /// One turn calling `tool` with `args`, then a turn answering `reply`.
    pub fn tool_then_text(
        id: impl Into<String>,
        tool: impl Into<String>,
        args: impl Into<String>,
        reply: impl Into<String>,
    ) -> Self {
        Self::new(vec![
            vec![
                ResponseEvent::ToolCall { id: id.into(), name: tool.into(), arguments: args.into() },
                ResponseEvent::Done,
            ],
            vec![ResponseEvent::TextDelta(reply.into()), ResponseEvent::Done],
        ])
    }
}

#[async_trait]
impl ModelProvider for ScriptedMockProvider {
    fn name(&self) -> &str {
        "scripted-mock"
    }
    fn model_name(&self) -> &str {
        "scripted-mock-model"
    }

    async fn complete(&self, req: CompletionRequest) -> anyhow::Result<ResponseStream> {
        self.requests
            .lock()
            .map_err(|_| anyhow::anyhow!("scripted mock request log poisoned"))?
            .push(req);
        let next = self
            .scripts
            .lock()
            .map_err(|_| anyhow::anyhow!("scripted mock queue poisoned"))?
            .pop_front();
        let events = next.unwrap_or_else(|| {
            vec![ResponseEvent::TextDelta("[no more scripts]".into()), ResponseEvent::Done]
        });
        Ok(into_stream(events))
    }
}
