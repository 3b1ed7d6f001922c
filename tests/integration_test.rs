//! End-to-end runs of the deep agent against the YAML mock provider.
//!
//! The primary agent plans with `write_todos`, records the question, fans
//! out two research tasks in one turn, writes a report, has it critiqued
//! and then revises it.  The research sub-agent can only search.
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::mpsc;

use deepwork_bootstrap::{DeepAgentBuilder, PRIMARY_AGENT_NAME};
use deepwork_config::AgentDefinition;
use deepwork_core::AgentEvent;
use deepwork_model::{Role, YamlMockProvider};
use deepwork_tools::{Todo, TodoStatus, Tool, ToolCall, ToolContext, ToolError, ToolOutput};

const RESEARCH_SCRIPT: &str = r##"
responses:
  - match_type: starts_with
    pattern: "research:"
    tool_calls:
      - id: search-1
        tool: internet_search
        args: { query: "LangGraph" }
    after_tool_reply: "LangGraph is a library for building stateful multi-actor agents."

  - match_type: starts_with
    pattern: "critique:"
    tool_calls:
      - id: crit-read
        tool: read_file
        args: { file_path: final_report.md }
    follow_up:
      - tool_calls:
          - id: crit-write
            tool: write_file
            args: { file_path: critique.md, content: "Title says draft." }
    after_tool_reply: "The title still says draft."

  - match_type: starts_with
    pattern: "write a report"
    tool_calls:
      - id: plan
        tool: write_todos
        args:
          todos:
            - { content: "Research LangGraph", status: in_progress }
            - { content: "Write the report", status: pending }
      - id: save-question
        tool: write_file
        args: { file_path: question.txt, content: "What is LangGraph?" }
    follow_up:
      - tool_calls:
          - id: research-history
            tool: task
            args: { description: "RESEARCH: history of LangGraph", subagent_type: research-agent }
          - id: research-usage
            tool: task
            args: { description: "RESEARCH: typical uses of LangGraph", subagent_type: research-agent }
      - tool_calls:
          - id: draft
            tool: write_file
            args:
              file_path: final_report.md
              content: "# Draft report\nLangGraph is a library for building stateful multi-actor agents."
      - tool_calls:
          - id: review
            tool: task
            args: { description: "CRITIQUE: review final_report.md", subagent_type: critique-agent }
      - tool_calls:
          - id: revise
            tool: edit_file
            args: { file_path: final_report.md, old_string: "Draft report", new_string: "LangGraph" }
          - id: done
            tool: write_todos
            args:
              todos:
                - { content: "Research LangGraph", status: completed }
                - { content: "Write the report", status: completed }
    after_tool_reply: "The report is in final_report.md."

  - match_type: default
    reply: "I understand your request."
"##;

/// Stand-in for a web search integration.
#[derive(Default)]
struct InternetSearch {
    queries: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl Tool for InternetSearch {
    fn name(&self) -> &str {
        "internet_search"
    }

    fn description(&self) -> &str {
        "Run a web search"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": { "query": { "type": "string" } },
            "required": ["query"]
        })
    }

    async fn execute(&self, call: &ToolCall, _ctx: &ToolContext) -> Result<ToolOutput, ToolError> {
        let query = call.args["query"].as_str().unwrap_or_default().to_string();
        self.queries.lock().unwrap().push(query.clone());
        Ok(ToolOutput::ok(&call.id, format!("1 result for {query}: langchain-ai/langgraph")))
    }
}

fn research_agent() -> AgentDefinition {
    AgentDefinition::new(
        "research-agent",
        "Used to research more in depth questions. Only give this researcher one topic at a time.",
        "You are a dedicated researcher. Only your final answer will be passed on to the user.",
    )
    .with_tools(["internet_search"])
}

fn critique_agent() -> AgentDefinition {
    AgentDefinition::new(
        "critique-agent",
        "Used to critique the final report.",
        "You are a dedicated editor. Read final_report.md and critique it.",
    )
}

#[tokio::test]
async fn research_scenario_runs_end_to_end() {
    let queries = Arc::new(Mutex::new(Vec::new()));
    let search = InternetSearch { queries: Arc::clone(&queries) };
    let (tx, mut rx) = mpsc::channel(1024);

    let agent = DeepAgentBuilder::new(Arc::new(YamlMockProvider::load(RESEARCH_SCRIPT).unwrap()))
        .instructions("You are an expert researcher.\n\n")
        .tool(search)
        .subagents([research_agent(), critique_agent()])
        .events(tx)
        .build()
        .unwrap();

    let state = agent.run("Write a report on LangGraph").await.unwrap();
    drop(agent);

    let last = state.last_message().unwrap();
    assert_eq!(last.role, Role::Assistant);
    assert_eq!(last.text_content(), Some("The report is in final_report.md."));

    assert_eq!(
        state.files.keys().collect::<Vec<_>>(),
        vec!["question.txt", "final_report.md", "critique.md"]
    );
    assert_eq!(
        state.files.get("final_report.md"),
        Some("# LangGraph\nLangGraph is a library for building stateful multi-actor agents.")
    );
    assert_eq!(state.files.get("critique.md"), Some("Title says draft."));

    assert_eq!(
        state.todos,
        vec![
            Todo::new("Research LangGraph", TodoStatus::Completed),
            Todo::new("Write the report", TodoStatus::Completed),
        ]
    );

    assert_eq!(queries.lock().unwrap().len(), 2);

    let task_reports: Vec<&str> = state
        .messages
        .iter()
        .filter(|m| m.role == Role::Tool)
        .filter(|m| matches!(m.tool_call_id(), Some("research-history" | "research-usage" | "review")))
        .filter_map(|m| m.text_content())
        .collect();
    assert_eq!(
        task_reports,
        vec![
            "LangGraph is a library for building stateful multi-actor agents.",
            "LangGraph is a library for building stateful multi-actor agents.",
            "The title still says draft.",
        ]
    );

    let mut finished = Vec::new();
    while let Ok(event) = rx.try_recv() {
        if let AgentEvent::TurnComplete { agent } = event {
            finished.push(agent);
        }
    }
    finished.sort();
    assert_eq!(
        finished,
        vec!["critique-agent", PRIMARY_AGENT_NAME, "research-agent", "research-agent"]
    );
}

#[tokio::test]
async fn restricted_sub_agent_cannot_write_files() {
    let script = r#"
responses:
  - match_type: starts_with
    pattern: "research:"
    tool_calls:
      - id: sneaky
        tool: write_file
        args: { file_path: notes.md, content: "should not land" }
    after_tool_reply: "I could not write notes."

  - match_type: default
    tool_calls:
      - id: delegate
        tool: task
        args: { description: "RESEARCH: anything", subagent_type: research-agent }
    after_tool_reply: "Done."
"#;
    let agent = DeepAgentBuilder::new(Arc::new(YamlMockProvider::load(script).unwrap()))
        .tool(InternetSearch::default())
        .subagent(research_agent())
        .build()
        .unwrap();

    let state = agent.run("Look something up").await.unwrap();

    assert!(state.files.is_empty());
    let report = state
        .messages
        .iter()
        .find(|m| m.tool_call_id() == Some("delegate") && m.role == Role::Tool)
        .and_then(|m| m.text_content());
    assert_eq!(report, Some("I could not write notes."));
}

#[tokio::test]
async fn sub_agents_load_from_config_file_and_agents_dir() {
    let dir = tempfile::tempdir().unwrap();
    let agents_dir = dir.path().join("agents");
    std::fs::create_dir_all(&agents_dir).unwrap();
    std::fs::write(
        agents_dir.join("research-agent.md"),
        "---\ndescription: Researches one topic.\ntools: [internet_search]\n---\nYou research.\n",
    )
    .unwrap();
    let config_path = dir.path().join("deepwork.toml");
    std::fs::write(
        &config_path,
        format!(
            "agents_dir = {:?}\n\n[agent]\ninstructions = \"Be brief.\"\nmax_tool_rounds = 5\n\n\
             [[subagents]]\nname = \"critique-agent\"\ndescription = \"Critiques.\"\nprompt = \"Be critical.\"\n",
            agents_dir.display().to_string()
        ),
    )
    .unwrap();

    let config = deepwork_config::load(Some(&config_path)).unwrap();
    assert_eq!(config.agent.max_tool_rounds, 5);

    let agent = DeepAgentBuilder::from_config(
        Arc::new(YamlMockProvider::load("responses:\n  - match_type: default\n    reply: ok\n").unwrap()),
        &config,
    )
    .tool(InternetSearch::default())
    .build()
    .unwrap();

    let names = agent.agents().names();
    assert_eq!(names[0], "general-purpose");
    assert!(names.contains(&"research-agent".to_string()));
    assert!(names.contains(&"critique-agent".to_string()));
    assert_eq!(
        agent.agents().get("research-agent").unwrap().tool_names(),
        vec!["internet_search"]
    );

    let state = agent.run("hello").await.unwrap();
    assert_eq!(state.last_message().and_then(|m| m.text_content()), Some("ok"));
}
