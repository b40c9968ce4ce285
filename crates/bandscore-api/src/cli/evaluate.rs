//! One-shot evaluation from the terminal.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use termimad::MadSkin;

use bandscore_core::document::{REPORT_TITLE, feedback_report};
use bandscore_core::word_count::{WordCountGate, check_word_count};
use bandscore_types::error::EvaluationError;
use bandscore_types::task::{TaskVariant, WordCountCheck, WordCountPolicy};

use crate::cli::read_text_arg;
use crate::state::AppState;

/// Inputs for `bandscore evaluate`, as given on the command line.
pub struct EvaluateArgs {
    pub task: TaskVariant,
    pub question: Option<String>,
    pub question_file: Option<PathBuf>,
    pub response: Option<String>,
    pub response_file: Option<PathBuf>,
    pub save: Option<PathBuf>,
}

pub async fn evaluate(state: &AppState, args: EvaluateArgs, json: bool, quiet: bool) -> Result<()> {
    let question = read_text_arg(args.question, args.question_file.as_deref(), "question").await?;
    let response = read_text_arg(args.response, args.response_file.as_deref(), "response").await?;

    let check = precheck(&question, &response, args.task, state.config.word_count_policy)?;
    if !check.meets_minimum && !json && !quiet {
        eprintln!(
            "  {} {} words; {} expects at least {}",
            style("!").yellow().bold(),
            check.count,
            args.task.label(),
            check.minimum
        );
    }

    let spinner = if json || quiet {
        ProgressBar::hidden()
    } else {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}")?);
        spinner.set_message(format!("Evaluating {} response...", args.task.label()));
        spinner.enable_steady_tick(Duration::from_millis(80));
        spinner
    };

    let result = state
        .evaluation_service
        .evaluate(args.task, &question, &response)
        .await;
    spinner.finish_and_clear();
    let evaluation = result?;

    if let Some(path) = &args.save {
        save_report(path, &evaluation.feedback, args.task, evaluation.word_count).await?;
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&evaluation)?);
        return Ok(());
    }

    println!();
    println!(
        "  {} {} ({} words, {})",
        style("IELTS feedback").bold(),
        style(args.task.label()).cyan(),
        evaluation.word_count,
        style(&evaluation.model).dim()
    );
    if let Some(band) = evaluation.band_score {
        println!("  Overall band: {}", style(band).green().bold());
    }
    println!();

    let skin = MadSkin::default_dark();
    println!("{}", skin.term_text(&evaluation.feedback));

    if let Some(path) = &args.save {
        println!(
            "  {} Report saved to {}",
            style("✓").green().bold(),
            style(path.display()).dim()
        );
    }

    Ok(())
}

/// Reject blank input before the word-count policy gets a say.
fn precheck(
    question: &str,
    response: &str,
    task: TaskVariant,
    policy: WordCountPolicy,
) -> Result<WordCountCheck> {
    if question.trim().is_empty() || response.trim().is_empty() {
        return Err(EvaluationError::MissingInput.into());
    }
    let check = check_word_count(response, task);
    check.gate(policy)?;
    Ok(check)
}

async fn save_report(path: &Path, feedback: &str, task: TaskVariant, word_count: usize) -> Result<()> {
    let html = feedback_report(task, word_count, feedback).to_html(REPORT_TITLE);
    tokio::fs::write(path, html)
        .await
        .map_err(|e| anyhow::anyhow!("failed to write report to {}: {e}", path.display()))
}
