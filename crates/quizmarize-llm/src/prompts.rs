//! Prompt templates.

pub const SUMMARY_SYSTEM: &str = "You are a helpful assistant that summarizes documents.";

pub const TASKS_SYSTEM: &str =
    "You are an experienced teacher who writes quiz tasks. You reply with a single JSON object and nothing else.";

pub fn summary_prompt(text: &str) -> String {
    format!(
        r#"Please provide a concise, clear, and easy-to-understand summary of the following text.
The summary should capture the main points and key takeaways.

Text to summarize:
---
{}
---"#,
        text
    )
}

pub fn tasks_prompt(text: &str) -> String {
    format!(
        r#"Create 6 to 7 learning tasks that test understanding of the text below.
Use all three task types: "multiple_choice", "open_question" and "matching".

Respond with a JSON object of exactly this form:
{{
  "tasks": [
    {{"task_type": "multiple_choice", "task_data": {{"question": "...", "options": ["...", "...", "...", "..."], "correct_answer": "..."}}}},
    {{"task_type": "open_question", "task_data": {{"question": "..."}}}},
    {{"task_type": "matching", "task_data": {{"pairs": [{{"key": "...", "value": "..."}}]}}}}
  ]
}}

Rules:
- "correct_answer" must be copied exactly from "options".
- Every matching task has at least three pairs.
- Ask only about facts stated in the text.

Text:
---
{}
---"#,
        text
    )
}
