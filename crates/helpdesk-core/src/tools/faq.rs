//! `getFAQ`: the helpdesk's canned question/answer pairs.

use serde_json::{Value, json};

use helpdesk_types::tool::ToolOutcome;

/// Static FAQ entries as `(question, answer)`.
pub const FAQ_ENTRIES: &[(&str, &str)] = &[
    (
        "What can this assistant do?",
        "It answers questions, reads pages from a small set of trusted documentation sites, \
         and remembers facts you ask it to keep for this session.",
    ),
    (
        "How do I start over?",
        "Use the reset action. It erases this session's conversation history and saved memory.",
    ),
    (
        "Does the assistant remember me between visits?",
        "Memory is tied to your session cookie. It lasts until you reset the session \
         or the cookie expires after seven days.",
    ),
    (
        "Which websites can the assistant read?",
        "Only pages on its allowed domains, such as wikipedia.org and developer.mozilla.org.",
    ),
    (
        "Is my data shared with other users?",
        "No. Each session has its own history and memory, and sessions never see each other's data.",
    ),
];

pub fn parameters() -> Value {
    json!({
        "type": "object",
        "properties": {}
    })
}

pub fn invoke() -> ToolOutcome {
    let faqs: Vec<Value> = FAQ_ENTRIES
        .iter()
        .map(|(question, answer)| json!({"question": question, "answer": answer}))
        .collect();
    ToolOutcome::ok(json!({ "faqs": faqs }))
}
