// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
mod cli;

use std::io::{self, Read};
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::Parser;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

use cli::{Cli, Commands};
use deepwork_bootstrap::DeepAgentBuilder;
use deepwork_config::Config;
use deepwork_core::AgentEvent;
use deepwork_model::{ModelProvider, YamlMockProvider};
use deepwork_tools::{AgentState, FileMap};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    match cli.command {
        Commands::Completions { shell } => {
            cli::print_completions(shell);
            Ok(())
        }
        Commands::ShowConfig => {
            let config = deepwork_config::load(cli.config.as_deref())?;
            println!("{}", serde_yaml::to_string(&config)?);
            Ok(())
        }
        Commands::Agents => {
            let config = deepwork_config::load(cli.config.as_deref())?;
            list_agents(&config)
        }
        Commands::Run { responses, files, output_dir, prompt } => {
            let config = deepwork_config::load(cli.config.as_deref())?;
            let prompt = match prompt {
                Some(p) => p,
                None => read_stdin_prompt()?,
            };
            run(&config, responses.as_deref(), &files, output_dir.as_deref(), prompt).await
        }
    }
}

fn build_model(config: &Config, responses: Option<&Path>) -> anyhow::Result<Arc<dyn ModelProvider>> {
    match responses {
        Some(path) => Ok(Arc::new(
            YamlMockProvider::from_file(path)?.with_model_name(config.model.name.clone()),
        )),
        None => Ok(Arc::from(deepwork_model::from_config(&config.model)?)),
    }
}

fn list_agents(config: &Config) -> anyhow::Result<()> {
    let model = deepwork_model::from_config(&config.model)?;
    let agent = DeepAgentBuilder::from_config(Arc::from(model), config)
        .build()
        .context("invalid sub-agent configuration")?;

    for name in agent.agents().names() {
        let tools = agent
            .agents()
            .get(&name)
            .map(|rt| rt.tool_names().join(", "))
            .unwrap_or_default();
        println!("{name}\t[{tools}]");
    }
    let catalogue = agent.agents().catalogue();
    if !catalogue.is_empty() {
        println!();
        println!("{catalogue}");
    }
    Ok(())
}

async fn run(
    config: &Config,
    responses: Option<&Path>,
    seed: &[(String, PathBuf)],
    output_dir: Option<&Path>,
    prompt: String,
) -> anyhow::Result<()> {
    let model = build_model(config, responses)?;

    let mut files = FileMap::new();
    for (path, local) in seed {
        let content = std::fs::read_to_string(local)
            .with_context(|| format!("reading seed file {}", local.display()))?;
        files.insert(path.clone(), content);
    }

    let (tx, rx) = mpsc::channel::<AgentEvent>(256);
    let progress = tokio::spawn(log_events(rx));

    let agent = DeepAgentBuilder::from_config(model, config)
        .events(tx)
        .build()
        .context("invalid sub-agent configuration")?;
    info!(model = %config.model.name, seeded = files.len(), "starting run");
    let result = agent.run_with_state(AgentState::from_input(prompt).with_files(files)).await;

    // Every sender lives inside the agent; dropping it ends the event stream.
    drop(agent);
    let _ = progress.await;
    let state = result?;

    match state.last_message().and_then(|m| m.text_content()) {
        Some(text) => println!("{text}"),
        None => warn!("run finished without a final message"),
    }
    print_summary(&state);

    if let Some(dir) = output_dir {
        write_files(dir, &state.files)?;
    }
    Ok(())
}

/// Forward agent progress to the log.
async fn log_events(mut rx: mpsc::Receiver<AgentEvent>) {
    while let Some(event) = rx.recv().await {
        match event {
            AgentEvent::ToolCallStarted { agent, call } => {
                info!(%agent, tool = %call.name, call_id = %call.id, "tool call");
            }
            AgentEvent::ToolCallFinished { agent, tool_name, is_error: true, output, .. } => {
                warn!(%agent, tool = %tool_name, "{output}");
            }
            AgentEvent::TodoUpdate { agent, todos } => {
                debug!(%agent, count = todos.len(), "todo list replaced");
            }
            AgentEvent::TokenUsage { agent, input, output } => {
                debug!(%agent, input, output, "token usage");
            }
            AgentEvent::Error { agent, message } => warn!(%agent, "{message}"),
            AgentEvent::TurnComplete { agent } => debug!(%agent, "finished"),
            _ => {}
        }
    }
}

fn print_summary(state: &AgentState) {
    if !state.todos.is_empty() {
        eprintln!("todos:");
        for todo in &state.todos {
            let status = serde_json::to_value(todo.status)
                .ok()
                .and_then(|v| v.as_str().map(str::to_string))
                .unwrap_or_default();
            eprintln!("  [{status}] {}", todo.content);
        }
    }
    if !state.files.is_empty() {
        eprintln!("files:");
        for (path, content) in state.files.iter() {
            eprintln!("  {path} ({} bytes)", content.len());
        }
    }
}

/// Write every virtual file below `dir`.  Paths that would escape `dir`
/// are skipped.
fn write_files(dir: &Path, files: &FileMap) -> anyhow::Result<()> {
    for (path, content) in files.iter() {
        let Some(rel) = relative_target(path) else {
            warn!(path, "skipping virtual file outside the output directory");
            continue;
        };
        let target = dir.join(rel);
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        std::fs::write(&target, content)
            .with_context(|| format!("writing {}", target.display()))?;
        debug!(path = %target.display(), "wrote virtual file");
    }
    Ok(())
}

fn relative_target(path: &str) -> Option<PathBuf> {
    let mut out = PathBuf::new();
    for component in Path::new(path).components() {
        match component {
            Component::Normal(part) => out.push(part),
            Component::RootDir | Component::CurDir => {}
            Component::ParentDir | Component::Prefix(_) => return None,
        }
    }
    (!out.as_os_str().is_empty()).then_some(out)
}

fn read_stdin_prompt() -> anyhow::Result<String> {
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf).context("reading prompt from stdin")?;
    let prompt = buf.trim();
    if prompt.is_empty() {
        bail!("no prompt given on the command line or stdin");
    }
    Ok(prompt.to_string())
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}
