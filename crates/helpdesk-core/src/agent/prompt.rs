//! System prompt for the helpdesk agent.

/// Base instructions sent ahead of every conversation.
pub const BASE_PROMPT: &str =
    "You are a helpful AI assistant. Be concise and helpful. Keep responses under 6 sentences.";

/// Builds the system prompt.
///
/// Layout:
/// ```text
/// {BASE_PROMPT}
/// <tools>how and when to use each tool</tools>
/// ```
pub struct SystemPromptBuilder;

impl SystemPromptBuilder {
    /// Build the prompt. `allowed_domains` is listed so the model does not
    /// waste a tool call on a site it cannot reach.
    pub fn build(allowed_domains: &[String]) -> String {
        let mut prompt = String::from(BASE_PROMPT);
        prompt.push_str("\n\n<tools>\n");
        prompt.push_str(
            "- When the user tells you something about themselves worth keeping \
             (name, preferences, account details), call saveMemory with a short key.\n",
        );
        prompt.push_str(
            "- When you need a fact the user shared earlier, call recallMemory with its key.\n",
        );
        prompt.push_str("- For common helpdesk questions, call getFAQ.\n");
        if domains_listed(allowed_domains) {
            prompt.push_str(&format!(
                "- To read a web page, call searchSite with a full URL. Only these domains \
                 (and their subdomains) can be fetched: {}.\n",
                allowed_domains.join(", ")
            ));
        }
        prompt.push_str("</tools>");
        prompt
    }
}

fn domains_listed(domains: &[String]) -> bool {
    domains.iter().any(|d| !d.trim().is_empty())
}
