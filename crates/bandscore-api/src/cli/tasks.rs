//! Task variant listing.

use anyhow::Result;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};

use bandscore_core::repository::criteria::CriteriaStore;
use bandscore_infra::criteria::FsCriteriaStore;
use bandscore_types::error::CriteriaError;
use bandscore_types::task::TaskVariant;

use crate::state::LoadedConfig;

/// How a variant's descriptor is stored on disk.
fn storage_label(store: &FsCriteriaStore, variant: TaskVariant) -> &'static str {
    match store.locate(variant) {
        Ok(source) if source.encrypted => "encrypted",
        Ok(_) => "plain",
        Err(CriteriaError::NotFound(_)) => "missing",
        Err(_) => "unreadable",
    }
}

pub fn list_tasks(loaded: &LoadedConfig, json: bool) -> Result<()> {
    // Only file presence matters here, so no cipher is needed.
    let store = FsCriteriaStore::new(loaded.config.criteria_dir.clone(), None);

    if json {
        let rows: Vec<_> = TaskVariant::ALL
            .iter()
            .map(|variant| {
                serde_json::json!({
                    "task": variant,
                    "label": variant.label(),
                    "minimum_words": variant.minimum_words(),
                    "descriptor_file": variant.descriptor_file(),
                    "storage": storage_label(&store, *variant),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Task").fg(Color::White),
        Cell::new("Label").fg(Color::White),
        Cell::new("Min words").fg(Color::White),
        Cell::new("Descriptor file").fg(Color::White),
        Cell::new("Stored").fg(Color::White),
    ]);

    for variant in TaskVariant::ALL {
        let stored = storage_label(&store, variant);
        let stored_color = match stored {
            "encrypted" => Color::Green,
            "plain" => Color::Yellow,
            _ => Color::Red,
        };
        table.add_row(vec![
            Cell::new(variant.tag()).fg(Color::Cyan),
            Cell::new(variant.label()),
            Cell::new(variant.minimum_words()),
            Cell::new(variant.descriptor_file()).fg(Color::DarkGrey),
            Cell::new(stored).fg(stored_color),
        ]);
    }

    println!();
    println!("{table}");
    println!();
    println!(
        "  Descriptors in {}",
        console::style(store.dir().display()).dim()
    );
    println!();

    Ok(())
}
