// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! Virtual file system operations.
//!
//! Every operation is a pure function of a [`FileMap`] snapshot plus its
//! explicit arguments.  Nothing here touches the real filesystem.

use thiserror::Error;

use crate::state::FileMap;

/// Rows returned by [`read`] when no limit is given.
pub const DEFAULT_READ_LIMIT: usize = 2000;

/// Lines longer than this many characters are truncated by [`read`].
pub const MAX_LINE_CHARS: usize = 2000;

/// Returned by [`read`] instead of rows when the content is empty or
/// whitespace only.
pub const EMPTY_FILE_NOTICE: &str = "System reminder: File exists but has empty contents";

/// Tool-visible failures.  The `Display` text is what the calling agent sees.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VfsError {
    #[error("Error: File '{0}' not found")]
    NotFound(String),

    #[error("Error: String not found in file: '{0}'")]
    NoMatch(String),

    #[error(
        "Error: String '{needle}' appears {count} times in file. Use replace_all=true to \
         replace all instances, or provide a more specific string with surrounding context."
    )]
    Conflict { needle: String, count: usize },

    #[error("Error: Line offset {offset} exceeds file length ({total} lines)")]
    OutOfRange { offset: usize, total: usize },
}

/// Result of a successful [`edit`].
#[derive(Debug, Clone, PartialEq)]
pub struct Edited {
    /// The full mapping with the edited path replaced.
    pub files: FileMap,
    /// Occurrences replaced.
    pub replacements: usize,
}

/// Every path, in insertion order.
pub fn list(files: &FileMap) -> Vec<String> {
    files.keys().map(str::to_string).collect()
}

/// Render rows `[offset, offset + limit)` of `path` in `cat -n` style.
///
/// Line numbers are 1-based and reflect the position in the file, not in
/// the returned window.
pub fn read(files: &FileMap, path: &str, offset: usize, limit: usize) -> Result<String, VfsError> {
    let content = files.get(path).ok_or_else(|| VfsError::NotFound(path.to_string()))?;

    if content.trim().is_empty() {
        return Ok(EMPTY_FILE_NOTICE.to_string());
    }

    let lines: Vec<&str> = content.split('\n').collect();
    let total = lines.len();
    if offset >= total {
        return Err(VfsError::OutOfRange { offset, total });
    }
    let end = offset.saturating_add(limit).min(total);

    let rows: Vec<String> = lines[offset..end]
        .iter()
        .enumerate()
        .map(|(i, line)| format!("{:>6}\t{}", offset + i + 1, truncate_chars(line, MAX_LINE_CHARS)))
        .collect();
    Ok(rows.join("\n"))
}

/// Unconditional upsert.  Returns the full updated mapping.
pub fn write(files: &FileMap, path: &str, content: &str) -> FileMap {
    let mut next = files.clone();
    next.insert(path, content);
    next
}

/// Literal string replacement inside `path`.
///
/// Without `replace_all` the needle must occur exactly once.  Matching is
/// plain substring comparison; no character in `old` has special meaning.
pub fn edit(
    files: &FileMap,
    path: &str,
    old: &str,
    new: &str,
    replace_all: bool,
) -> Result<Edited, VfsError> {
    let content = files.get(path).ok_or_else(|| VfsError::NotFound(path.to_string()))?;

    if !content.contains(old) {
        return Err(VfsError::NoMatch(old.to_string()));
    }

    let count = content.matches(old).count();
    let updated = if replace_all {
        content.replace(old, new)
    } else {
        match count {
            0 => return Err(VfsError::NoMatch(old.to_string())),
            1 => content.replacen(old, new, 1),
            n => return Err(VfsError::Conflict { needle: old.to_string(), count: n }),
        }
    };

    let mut next = files.clone();
    next.insert(path, updated);
    Ok(Edited { files: next, replacements: count })
}

fn truncate_chars(line: &str, max: usize) -> &str {
    match line.char_indices().nth(max) {
        Some((idx, _)) => &line[..idx],
        None => line,
    }
}
