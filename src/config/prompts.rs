//! Prompt templates for podcast-rag.
//!
//! Prompts can be customized by placing a `rag.toml` file in the custom prompts directory.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Prompts {
    pub rag: RagPrompts,
    /// Custom variables from config, available in all prompts.
    #[serde(skip)]
    pub variables: HashMap<String, String>,
}

/// Prompts for RAG answer generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RagPrompts {
    /// System instruction sent with every completion.
    pub system: String,
    /// User message template. Receives `{{context}}` and `{{query}}`.
    pub user: String,
    /// Answer returned when retrieval finds nothing.
    pub no_results: String,
}

impl Default for RagPrompts {
    fn default() -> Self {
        Self {
            system: "You are a helpful AI assistant that answers questions based on podcast content."
                .to_string(),

            user: r#"You are an AI assistant helping users understand podcast content. Use the provided context to answer the user's question accurately and comprehensively.

Context from podcast transcripts:
{{context}}

User Question: {{query}}

Instructions:
- Base your answer primarily on the provided context
- If the context doesn't contain enough information, clearly state this
- Provide a comprehensive and helpful answer
- If the context is in Chinese, you can respond in both Chinese and English as appropriate
- Be conversational and engaging

Answer:"#
                .to_string(),

            no_results: "I couldn't find any relevant content to answer your question. Please try rephrasing your question or asking about a different topic."
                .to_string(),
        }
    }
}

impl Prompts {
    /// Load prompts, with an optional custom directory and variables.
    pub fn load(
        custom_dir: Option<&str>,
        custom_variables: Option<&HashMap<String, String>>,
    ) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(vars) = custom_variables {
            prompts.variables = vars.clone();
        }

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            let rag_path = custom_path.join("rag.toml");
            if rag_path.exists() {
                let content = std::fs::read_to_string(&rag_path)?;
                prompts.rag = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }

    /// Render a template in a single left-to-right pass.
    ///
    /// Substituted values are never re-scanned, so a value containing
    /// `{{name}}` is emitted literally. Unknown placeholders are left intact.
    pub fn render(template: &str, vars: &HashMap<String, String>) -> String {
        let mut out = String::with_capacity(template.len());
        let mut rest = template;

        while let Some(start) = rest.find("{{") {
            out.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            match after.find("}}") {
                Some(end) => {
                    let key = &after[..end];
                    match vars.get(key.trim()) {
                        Some(value) => out.push_str(value),
                        None => {
                            out.push_str("{{");
                            out.push_str(key);
                            out.push_str("}}");
                        }
                    }
                    rest = &after[end + 2..];
                }
                None => {
                    out.push_str(&rest[start..]);
                    rest = "";
                }
            }
        }
        out.push_str(rest);
        out
    }

    /// Render with both provided variables and custom config variables.
    /// Provided variables take precedence.
    pub fn render_with_custom(&self, template: &str, vars: &HashMap<String, String>) -> String {
        let mut merged = self.variables.clone();
        for (key, value) in vars {
            merged.insert(key.clone(), value.clone());
        }
        Self::render(template, &merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_prompts() {
        let prompts = Prompts::default();
        assert!(!prompts.rag.system.is_empty());
        assert!(prompts.rag.user.contains("{{context}}"));
        assert!(prompts.rag.user.contains("{{query}}"));
    }

    #[test]
    fn test_render_template() {
        let template = "Hello {{name}}, you have {{count}} messages.";
        let mut vars = HashMap::new();
        vars.insert("name".to_string(), "Alice".to_string());
        vars.insert("count".to_string(), "5".to_string());

        let result = Prompts::render(template, &vars);
        assert_eq!(result, "Hello Alice, you have 5 messages.");
    }

    #[test]
    fn test_render_does_not_rescan_values() {
        let mut vars = HashMap::new();
        vars.insert("context".to_string(), "quoting {{query}} literally".to_string());
        vars.insert("query".to_string(), "why?".to_string());

        let result = Prompts::render("{{context}} / {{query}}", &vars);
        assert_eq!(result, "quoting {{query}} literally / why?");
    }

    #[test]
    fn test_render_keeps_unknown_and_unclosed() {
        let vars = HashMap::new();
        assert_eq!(Prompts::render("a {{missing}} b {{open", &vars), "a {{missing}} b {{open");
    }

    #[test]
    fn test_custom_variables_yield_to_provided() {
        let mut prompts = Prompts::default();
        prompts.variables.insert("show".to_string(), "Default Show".to_string());
        prompts.variables.insert("query".to_string(), "ignored".to_string());

        let mut vars = HashMap::new();
        vars.insert("query".to_string(), "real".to_string());
        let out = prompts.render_with_custom("{{show}}: {{query}}", &vars);
        assert_eq!(out, "Default Show: real");
    }

    #[test]
    fn test_load_from_custom_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("rag.toml"),
            "system = \"Custom system\"\nuser = \"Q: {{query}}\\n{{context}}\"\n",
        )
        .unwrap();

        let prompts = Prompts::load(dir.path().to_str(), None).unwrap();
        assert_eq!(prompts.rag.system, "Custom system");
        assert_eq!(prompts.rag.user, "Q: {{query}}\n{{context}}");
        // Unspecified fields keep their defaults.
        assert!(prompts.rag.no_results.starts_with("I couldn't find"));
    }
}
