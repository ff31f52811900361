//! Prompt assembly for answer generation.

use super::SearchResult;
use crate::config::Prompts;
use std::collections::HashMap;
use std::fmt::Write;

/// Format search results as labeled source blocks, in input order.
pub fn format_context(results: &[SearchResult]) -> String {
    let mut context = String::new();
    for (i, result) in results.iter().enumerate() {
        // Writing to a String cannot fail.
        let _ = write!(
            context,
            "[Source {}] Title: '{}', Tag: '{}'\nContent: {}\n\n",
            i + 1,
            result.podcast_title,
            result.podcast_tag,
            result.content
        );
    }
    context.trim().to_string()
}

/// Build the user prompt for `query` from the RAG user template.
pub fn build_prompt(prompts: &Prompts, query: &str, results: &[SearchResult]) -> String {
    let mut vars = HashMap::new();
    vars.insert("context".to_string(), format_context(results));
    vars.insert("query".to_string(), query.to_string());
    prompts.render_with_custom(&prompts.rag.user, &vars)
}
