//! CLI output formatting utilities.

use crate::rag::{SearchResult, SourceInfo};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

/// Output helper for CLI formatting.
pub struct Output;

impl Output {
    /// Print an info message.
    pub fn info(msg: &str) {
        println!("{} {}", style(">>").cyan().bold(), msg);
    }

    /// Print a success message.
    pub fn success(msg: &str) {
        println!("{} {}", style(">>").green().bold(), msg);
    }

    /// Print a warning message.
    pub fn warning(msg: &str) {
        eprintln!("{} {}", style(">>").yellow().bold(), msg);
    }

    /// Print an error message.
    pub fn error(msg: &str) {
        eprintln!("{} {}", style(">>").red().bold(), msg);
    }

    /// Print a header.
    pub fn header(msg: &str) {
        println!("\n{}", style(msg).bold().underlined());
    }

    /// Print a key-value pair.
    pub fn kv(key: &str, value: &str) {
        println!("  {}: {}", style(key).dim(), value);
    }

    /// Print one ranked search hit.
    pub fn search_result(rank: usize, result: &SearchResult) {
        println!(
            "\n{} {} {} (score: {:.3})",
            style(format!("{}.", rank)).green(),
            style(&result.podcast_title).bold(),
            style(format!("[{}]", result.podcast_tag)).cyan(),
            result.score
        );
        println!("   {}", single_line(&crate::rag::content_preview(&result.content)));
    }

    /// Print a source cited by an answer.
    pub fn source(source: &SourceInfo) {
        println!(
            "\n{} {} {} (score: {:.3})",
            style(">>").green(),
            style(&source.title).bold(),
            style(format!("[{}]", source.tag)).cyan(),
            source.score
        );
        println!("   {}", style(single_line(&source.content_preview)).dim());
    }

    /// Create a spinner.
    pub fn spinner(msg: &str) -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        if let Ok(spinner_style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
            pb.set_style(spinner_style);
        }
        pb.set_message(msg.to_string());
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        pb
    }
}

/// Collapse newlines so a preview stays on one terminal line.
fn single_line(content: &str) -> String {
    content.replace(['\n', '\r'], " ")
}
