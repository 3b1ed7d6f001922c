// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
mod schema;
mod loader;
mod agents;

pub use schema::*;
pub use loader::load;
pub use agents::{discover_agent_definitions, parse_agent_file, MAX_AGENT_FILE_BYTES};
