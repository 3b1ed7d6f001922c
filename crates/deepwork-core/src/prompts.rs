// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! Prompt text shared by the primary agent and the `task` tool.

/// Appended to the caller's instructions to form the primary agent prompt.
pub const BASE_PROMPT: &str = "You have access to a number of standard tools

## `write_todos`

You have access to the `write_todos` tool to help you manage and plan tasks. Use it VERY \
frequently to track your tasks and give the user visibility into your progress.
It is also EXTREMELY helpful for planning, and for breaking larger complex tasks into smaller \
steps. If you do not use it when planning, you may forget to do important tasks, and that is \
unacceptable.

Mark todos as completed as soon as you are done with a task. Do not batch up several tasks \
before marking them as completed.

## `task`

- When doing web search, prefer the `task` tool in order to reduce context usage.";

/// First half of the `task` tool description.  `{other_agents}` is
/// replaced with the sub-agent catalogue.
pub const TASK_DESCRIPTION_PREFIX: &str = "Launch a new agent to handle complex, multi-step tasks autonomously.

Available agent types and the tools they have access to:
- general-purpose: General-purpose agent for researching complex questions, searching for files \
and content, and executing multi-step tasks. When you are searching for a keyword or file and \
are not confident that you will find the right match in the first few tries use this agent to \
perform the search for you. (Tools: *)
{other_agents}
";

pub const TASK_DESCRIPTION_SUFFIX: &str = "When using the task tool, you must specify a subagent_type parameter to select which agent type to use.

When NOT to use the task tool:
- If you want to read a specific file path, use read_file or ls instead, to find the match more quickly
- If you are searching for content within a specific file or set of 2-3 files, use read_file instead
- Other tasks that are not related to the agent descriptions above

Usage notes:
1. Launch multiple agents concurrently whenever possible, to maximize performance; to do that, use a single message with multiple tool uses
2. When the agent is done, it will return a single message back to you. The result returned by the agent is not visible to the user. To show the user the result, send a text message back to the user with a concise summary of the result.
3. Each agent invocation is stateless. You will not be able to send additional messages to the agent, nor will the agent be able to communicate with you outside of its final report. Your description should therefore contain a highly detailed task for the agent to perform autonomously, and specify exactly what information the agent should return in its final and only message to you.
4. The agent's outputs should generally be trusted
5. Clearly tell the agent whether you expect it to create content, perform analysis, or just do research, since it is not aware of the user's intent
6. If the agent description says it should be used proactively, try your best to use it without the user having to ask for it first. Use your judgement.
7. Agents share your files: anything an agent writes with write_file or edit_file is visible to you afterwards. Its todo list is not.";

/// Primary agent prompt: the caller's instructions followed by [`BASE_PROMPT`].
pub fn system_prompt(instructions: &str) -> String {
    format!("{instructions}{BASE_PROMPT}")
}

/// Full `task` tool description for the given sub-agent catalogue.
pub fn task_description(catalogue: &str) -> String {
    format!(
        "{}{}",
        TASK_DESCRIPTION_PREFIX.replace("{other_agents}", catalogue),
        TASK_DESCRIPTION_SUFFIX
    )
}

/// Injected once the tool-round budget is exhausted.
pub(crate) fn wrap_up_prompt(max_tool_rounds: u32) -> String {
    format!(
        "You have reached the maximum tool-call budget ({max_tool_rounds} rounds). \
         Do not call any more tools. \
         Write a concise summary of: (1) what has been completed, \
         (2) what still remains to be done, and (3) how to continue."
    )
}
