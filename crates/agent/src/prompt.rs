//! The ReAct prompt the model sees on every iteration.

use dossier_core::tool::ToolRegistry;

const HEADER: &str = "You are a research assistant agent. Complete tasks efficiently with minimal steps.";

const FORMAT_AND_RULES: &str = r#"FORMAT (use exactly):
Thought: [brief reasoning]
Action: [tool_name]
Action Input: [input - use JSON for multi-param tools: {"key": "value"}]

For final response:
Thought: I have all the information needed.
Final Answer: [complete answer]

EFFICIENCY RULES:
- Use ONLY 1 action per response, then STOP
- Aim to complete in 2-4 steps total
- For company briefings: 1) get_company_info 2) generate_document or translate_document 3) Final Answer
- For translations: Pass full document content to translate_document
- When you have enough info, immediately give Final Answer

EXAMPLE - "Generate a briefing on Tesla":
Thought: I need company info first.
Action: get_company_info
Action Input: Tesla

[After receiving observation]
Thought: I have the info. Now I'll create the briefing document.
Action: generate_document
Action Input: {"template": "briefing", "content_dict": {"company_name": "Tesla", "industry": "EVs"}}

[After receiving observation]
Thought: I have all the information needed.
Final Answer: [the generated briefing]"#;

/// Tool lines as they appear under `AVAILABLE TOOLS:`.
pub fn tools_section(registry: &ToolRegistry) -> String {
    registry
        .list_descriptions()
        .iter()
        .map(|line| format!("- {line}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// The fixed part of the prompt, ending with the `Thought:` cue. The
/// rendered transcript is appended to this each iteration.
pub fn base_prompt(instruction: &str, registry: &ToolRegistry) -> String {
    format!(
        "{HEADER}\n\nAVAILABLE TOOLS:\n{}\n\n{FORMAT_AND_RULES}\n\nQuestion: {instruction}\nThought:",
        tools_section(registry)
    )
}
