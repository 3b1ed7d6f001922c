// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
mod types;
mod provider;
mod mock;
mod yaml_mock;

pub use types::*;
pub use provider::{ModelProvider, ResponseStream};
pub use mock::{MockProvider, ScriptedMockProvider};
pub use yaml_mock::YamlMockProvider;

use deepwork_config::ModelConfig;

/// Construct a boxed [`ModelProvider`] from configuration.
///
/// - a responses file (env `DEEPWORK_MOCK_RESPONSES`, then
///   `model.mock_responses_file`) → [`YamlMockProvider`]
/// - otherwise → [`MockProvider`] (echo-back)
pub fn from_config(cfg: &ModelConfig) -> anyhow::Result<Box<dyn ModelProvider>> {
    let responses_path = std::env::var("DEEPWORK_MOCK_RESPONSES")
        .ok()
        .or_else(|| cfg.mock_responses_file.clone());
    match responses_path {
        Some(path) => Ok(Box::new(
            YamlMockProvider::from_file(&path)?.with_model_name(cfg.name.clone()),
        )),
        None => Ok(Box::new(MockProvider)),
    }
}
