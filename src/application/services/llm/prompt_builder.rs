//! Prompt building functions for LLM requests

use serde_json::Value;

use crate::application::ports::outbound::{ChatMessage, LlmRequest};

/// Name the response schema is registered under
pub const RESPONSE_SCHEMA_NAME: &str = "dcc_record";

/// Build the system prompt that sets the extraction rules
pub fn build_system_prompt() -> String {
    let mut prompt = String::new();

    prompt.push_str("You are an information extractor. ");
    prompt.push_str("Return ONLY JSON that validates against the provided schema.\n");
    prompt.push_str("Rules:\n");
    prompt.push_str("- Do not invent facts.\n");
    prompt.push_str("- If a field is unknown, set null or use empty arrays/objects.\n");
    prompt.push_str("- Put short canonical text into notes (no long quotes).\n");
    prompt.push_str("- Express stat bonuses as modifiers using STR, DEX, CON, INT, WIS or CHA.\n");
    prompt.push_str("- Set provenance.source_type='wiki'; extraction_method='llm'.\n");
    prompt.push_str(
        "- Fill metadata timestamps in ISO 8601 UTC; version='1.0.0'; license='TBD'.",
    );

    prompt
}

/// Build the page context message
pub fn build_page_message(title: &str, url: &str, source_text: &str) -> String {
    format!("TITLE: {}\nURL: {}\nWIKITEXT:\n{}", title, url, source_text)
}

/// Build the full extraction request for one page
pub fn build_extraction_request(
    schema: &Value,
    title: &str,
    url: &str,
    source_text: &str,
) -> LlmRequest {
    let messages = vec![
        ChatMessage::user("Return JSON that conforms to this JSON Schema:"),
        ChatMessage::user(schema.to_string()),
        ChatMessage::user(build_page_message(title, url, source_text)),
    ];

    LlmRequest::new(messages)
        .with_system_prompt(build_system_prompt())
        .with_json_schema(RESPONSE_SCHEMA_NAME, schema.clone())
}
