// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! Sub-agent definitions stored as markdown files.
//!
//! Each file in `agents_dir` describes one sub-agent:
//!
//! ```markdown
//! ---
//! name: critique-agent
//! description: Used to critique the final report.
//! tools: [read_file, ls]
//! ---
//!
//! You are a dedicated editor. You are being tasked to critique a report.
//! ```
//!
//! | Field         | Required | Description                                             |
//! |:--------------|:---------|:--------------------------------------------------------|
//! | `name`        | No       | Unique identifier. Defaults to filename stem.           |
//! | `description` | No       | When to delegate. Defaults to first body line.          |
//! | `tools`       | No       | Allowed tool names. Absent means the full tool set.     |

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use tracing::warn;

use crate::{AgentDefinition, Config};

/// Files larger than this are skipped during discovery.
pub const MAX_AGENT_FILE_BYTES: u64 = 256 * 1024;

#[derive(Debug, Default, Deserialize)]
struct AgentFrontmatter {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    tools: Option<Vec<String>>,
}

/// Parse a raw agent markdown file into an [`AgentDefinition`].
///
/// If the file has no YAML frontmatter the whole body is used as the prompt
/// and the description is synthesised from the first non-empty line.
pub fn parse_agent_file(raw: &str, stem: &str) -> Option<AgentDefinition> {
    let rest = raw.trim_start_matches('\n');

    let (fm, prompt) = if let Some(after_open) = rest.strip_prefix("---") {
        let close = after_open.find("\n---")?;
        let yaml_block = &after_open[..close];
        let body = after_open[close + 4..].trim_start_matches('\n').to_string();

        let fm: AgentFrontmatter = match serde_yaml::from_str(yaml_block) {
            Ok(f) => f,
            Err(e) => {
                warn!(agent = stem, error = %e, "failed to parse agent frontmatter, skipping");
                return None;
            }
        };
        (fm, body)
    } else {
        (AgentFrontmatter::default(), rest.to_string())
    };

    let description = fm
        .description
        .filter(|d| !d.trim().is_empty())
        .unwrap_or_else(|| {
            prompt
                .lines()
                .find(|l| !l.trim().is_empty())
                .unwrap_or(stem)
                .trim_start_matches('#')
                .trim()
                .to_string()
        });

    let name = fm
        .name
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| stem.to_string());

    Some(AgentDefinition {
        name,
        description,
        prompt: prompt.trim_end().to_string(),
        tools: fm.tools,
    })
}

fn try_load_agent(path: &Path) -> Option<AgentDefinition> {
    let size = path.metadata().map(|m| m.len()).unwrap_or(0);
    if size > MAX_AGENT_FILE_BYTES {
        warn!(path = %path.display(), size, max = MAX_AGENT_FILE_BYTES, "skipping oversized agent file");
        return None;
    }

    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("agent");

    let raw = match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to read agent file");
            return None;
        }
    };

    if raw.trim().is_empty() {
        return None;
    }

    parse_agent_file(&raw, stem)
}

/// Load every `*.md` definition directly inside `dir`, sorted by name.
///
/// A missing directory yields an empty list.
#[must_use]
pub fn discover_agent_definitions(dir: &Path) -> Vec<AgentDefinition> {
    let entries = match std::fs::read_dir(dir) {
        Ok(e) => e,
        Err(_) => return Vec::new(),
    };

    let mut by_name: BTreeMap<String, AgentDefinition> = BTreeMap::new();
    for entry in entries.flatten() {
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("md") || !path.is_file() {
            continue;
        }
        if let Some(def) = try_load_agent(&path) {
            by_name.insert(def.name.clone(), def);
        }
    }
    by_name.into_values().collect()
}

impl Config {
    /// All sub-agent definitions: files from `agents_dir` first, then inline
    /// entries, which replace file entries of the same name.
    pub fn subagent_definitions(&self) -> Vec<AgentDefinition> {
        let mut defs = self
            .agents_dir
            .as_deref()
            .map(discover_agent_definitions)
            .unwrap_or_default();

        for inline in &self.subagents {
            match defs.iter_mut().find(|d| d.name == inline.name) {
                Some(slot) => *slot = inline.clone(),
                None => defs.push(inline.clone()),
            }
        }
        defs
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
