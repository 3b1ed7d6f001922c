// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! Shared state threaded through one top-level invocation, and the
//! per-field reducers that fold partial updates back into it.

use std::collections::HashMap;
use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use deepwork_model::Message;

// ─── Todo ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TodoStatus {
    Pending,
    InProgress,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub content: String,
    pub status: TodoStatus,
}

impl Todo {
    pub fn new(content: impl Into<String>, status: TodoStatus) -> Self {
        Self { content: content.into(), status }
    }
}

// ─── FileMap ──────────────────────────────────────────────────────────────────

/// Path → content mapping that iterates in insertion order.
///
/// Overwriting an existing path keeps its original position.
#[derive(Debug, Clone, Default)]
pub struct FileMap {
    order: Vec<String>,
    entries: HashMap<String, String>,
}

impl FileMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn get(&self, path: &str) -> Option<&str> {
        self.entries.get(path).map(String::as_str)
    }

    pub fn contains_key(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    /// Upsert `path`, returning the previous content if any.
    pub fn insert(&mut self, path: impl Into<String>, content: impl Into<String>) -> Option<String> {
        let path = path.into();
        let previous = self.entries.insert(path.clone(), content.into());
        if previous.is_none() {
            self.order.push(path);
        }
        previous
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.order
            .iter()
            .filter_map(|k| self.entries.get(k).map(|v| (k.as_str(), v.as_str())))
    }

    /// Shallow key-wise overlay: keys in `other` overwrite, keys only in
    /// `self` persist.
    pub fn overlay(&mut self, other: &FileMap) {
        for (path, content) in other.iter() {
            self.insert(path, content);
        }
    }

    /// Entries of `self` that are absent from `base` or whose content
    /// differs from it.
    pub fn changed_since(&self, base: &FileMap) -> FileMap {
        self.iter()
            .filter(|(path, content)| base.get(path) != Some(*content))
            .collect()
    }
}

impl PartialEq for FileMap {
    /// Order-insensitive, like the mapping it models.
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl Eq for FileMap {}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FileMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = FileMap::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

impl Serialize for FileMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (k, v) in self.iter() {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for FileMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct FileMapVisitor;

        impl<'de> Visitor<'de> for FileMapVisitor {
            type Value = FileMap;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of file paths to contents")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<FileMap, A::Error> {
                let mut map = FileMap::new();
                while let Some((k, v)) = access.next_entry::<String, String>()? {
                    map.insert(k, v);
                }
                Ok(map)
            }
        }

        deserializer.deserialize_map(FileMapVisitor)
    }
}

// ─── Reducers ─────────────────────────────────────────────────────────────────

/// Conversation log: append.
pub fn merge_messages(mut current: Vec<Message>, update: Vec<Message>) -> Vec<Message> {
    current.extend(update);
    current
}

/// Task list: wholesale replace when present.
pub fn merge_todos(current: Vec<Todo>, update: Option<Vec<Todo>>) -> Vec<Todo> {
    update.unwrap_or(current)
}

/// File mapping: shallow key-wise overlay.
pub fn merge_files(mut current: FileMap, update: Option<FileMap>) -> FileMap {
    if let Some(update) = update {
        current.overlay(&update);
    }
    current
}

// ─── AgentState / StateUpdate ─────────────────────────────────────────────────

/// The (conversation log, task list, file mapping) tuple.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentState {
    pub messages: Vec<Message>,
    pub todos: Vec<Todo>,
    pub files: FileMap,
}

impl AgentState {
    /// Fresh state whose log holds a single user message.
    pub fn from_input(input: impl Into<String>) -> Self {
        Self { messages: vec![Message::user(input)], ..Default::default() }
    }

    pub fn with_files(mut self, files: FileMap) -> Self {
        self.files = files;
        self
    }

    pub fn with_todos(mut self, todos: Vec<Todo>) -> Self {
        self.todos = todos;
        self
    }

    /// Fold a partial update through the three field reducers.
    pub fn apply(self, update: StateUpdate) -> Self {
        Self {
            messages: merge_messages(self.messages, update.messages),
            todos: merge_todos(self.todos, update.todos),
            files: merge_files(self.files, update.files),
        }
    }

    /// In-place variant of [`AgentState::apply`].
    pub fn apply_mut(&mut self, update: StateUpdate) {
        let current = std::mem::take(self);
        *self = current.apply(update);
    }

    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }
}

/// Partial update returned by a tool.  Absent fields leave state untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StateUpdate {
    pub messages: Vec<Message>,
    pub todos: Option<Vec<Todo>>,
    pub files: Option<FileMap>,
}

impl StateUpdate {
    pub fn files(files: FileMap) -> Self {
        Self { files: Some(files), ..Default::default() }
    }

    pub fn todos(todos: Vec<Todo>) -> Self {
        Self { todos: Some(todos), ..Default::default() }
    }
}
