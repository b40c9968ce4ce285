//! `criteria show`: print descriptor text after decryption.

use anyhow::Result;
use console::style;

use bandscore_core::repository::criteria::CriteriaStore;
use bandscore_types::task::TaskVariant;

use crate::state::AppState;

pub async fn show_criteria(state: &AppState, task: TaskVariant, json: bool) -> Result<()> {
    let store = state.evaluation_service.criteria();
    let source = store.locate(task)?;
    let text = store.load(task).await?;

    if json {
        let out = serde_json::json!({
            "task": task,
            "path": source.path.display().to_string(),
            "encrypted": source.encrypted,
            "text": text,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    eprintln!(
        "  {} {} ({})",
        style(task.label()).cyan().bold(),
        style(source.path.display()).dim(),
        if source.encrypted { "decrypted" } else { "plain" }
    );
    println!("{text}");

    Ok(())
}
