//! Word count command.

use std::path::PathBuf;

use anyhow::Result;
use console::style;

use bandscore_core::word_count::check_word_count;
use bandscore_types::task::{TaskVariant, WordCountPolicy};

use crate::cli::read_text_arg;

pub async fn count(
    task: TaskVariant,
    text: Option<String>,
    file: Option<PathBuf>,
    policy: WordCountPolicy,
    json: bool,
) -> Result<()> {
    let text = read_text_arg(text, file.as_deref(), "text").await?;
    let check = check_word_count(&text, task);

    if json {
        let out = serde_json::json!({
            "task": task,
            "count": check.count,
            "minimum": check.minimum,
            "meets_minimum": check.meets_minimum,
            "policy": policy,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    let mark = if check.meets_minimum {
        style("✓").green().bold()
    } else if policy == WordCountPolicy::Blocking {
        style("✗").red().bold()
    } else {
        style("!").yellow().bold()
    };
    println!(
        "  {mark} {} words ({} minimum for {})",
        style(check.count).bold(),
        check.minimum,
        task.label()
    );

    Ok(())
}
