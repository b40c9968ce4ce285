//! System status dashboard command.

use anyhow::Result;
use console::style;

use bandscore_core::repository::criteria::CriteriaStore;
use bandscore_core::service::secret::SecretService;
use bandscore_infra::criteria::FsCriteriaStore;
use bandscore_infra::crypto::criteria_cipher::CriteriaCipher;
use bandscore_types::secret::{CRITERIA_ENCRYPTION_KEY, KNOWN_SECRETS};
use bandscore_types::task::TaskVariant;

use crate::state::LoadedConfig;

/// Display configuration, secret sources and descriptor files.
///
/// Works without a valid encryption key so a broken setup can be diagnosed.
pub async fn status(loaded: &LoadedConfig, json: bool) -> Result<()> {
    let secrets = loaded.secret_service();

    let mut secret_rows = Vec::new();
    let mut key_fingerprint: Option<Result<String, String>> = None;
    for key in KNOWN_SECRETS {
        let resolved = secrets.resolve_with_backend(key).await?;
        if key == CRITERIA_ENCRYPTION_KEY {
            key_fingerprint = resolved.as_ref().map(|(value, _)| {
                CriteriaCipher::from_encoded_key(value)
                    .map(|cipher| cipher.fingerprint().to_string())
                    .map_err(|e| e.to_string())
            });
        }
        secret_rows.push((key, resolved));
    }

    let store = FsCriteriaStore::new(loaded.config.criteria_dir.clone(), None);
    let criteria_rows: Vec<_> = TaskVariant::ALL
        .iter()
        .map(|variant| (*variant, store.locate(*variant)))
        .collect();

    if json {
        let secrets_json: Vec<_> = secret_rows
            .iter()
            .map(|(key, resolved)| {
                serde_json::json!({
                    "key": key,
                    "backend": resolved.as_ref().map(|(_, backend)| backend),
                    "masked": resolved.as_ref().map(|(value, _)| SecretService::mask_secret(value)),
                })
            })
            .collect();
        let criteria_json: Vec<_> = criteria_rows
            .iter()
            .map(|(variant, located)| {
                serde_json::json!({
                    "task": variant,
                    "path": located.as_ref().ok().map(|s| s.path.display().to_string()),
                    "encrypted": located.as_ref().ok().map(|s| s.encrypted),
                })
            })
            .collect();
        let status = serde_json::json!({
            "version": env!("CARGO_PKG_VERSION"),
            "data_dir": loaded.data_dir.display().to_string(),
            "config_path": loaded.config_path.display().to_string(),
            "config_found": loaded.config_path.is_file(),
            "model": loaded.config.model.name,
            "word_count_policy": loaded.config.word_count_policy,
            "secret_backends": secrets.backends(),
            "secrets": secrets_json,
            "encryption_key": match &key_fingerprint {
                Some(Ok(fp)) => serde_json::json!({"valid": true, "fingerprint": fp}),
                Some(Err(e)) => serde_json::json!({"valid": false, "error": e}),
                None => serde_json::Value::Null,
            },
            "criteria_dir": loaded.config.criteria_dir.display().to_string(),
            "criteria": criteria_json,
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    println!();
    println!("  {} Bandscore v{}", style("✎").bold(), env!("CARGO_PKG_VERSION"));
    println!();

    println!("  {}", style("── Config ──").dim());
    println!("  Data dir: {}", style(loaded.data_dir.display()).dim());
    println!(
        "  Config:   {} {}",
        style(loaded.config_path.display()).dim(),
        if loaded.config_path.is_file() {
            style("").dim()
        } else {
            style("(not found, defaults)").yellow()
        }
    );
    println!("  Model:    {}", style(&loaded.config.model.name).cyan());
    println!("  Minimum word count: {}", loaded.config.word_count_policy);
    println!();

    println!("  {}", style("── Secrets ──").dim());
    for (key, resolved) in &secret_rows {
        match resolved {
            Some((value, backend)) => println!(
                "  {} {key}: {} ({backend})",
                style("✓").green(),
                SecretService::mask_secret(value)
            ),
            None => println!("  {} {key}: {}", style("✗").red(), style("not set").dim()),
        }
    }
    match &key_fingerprint {
        Some(Ok(fp)) => println!("  Key fingerprint: {}", style(fp).bold()),
        Some(Err(e)) => println!("  {} {CRITERIA_ENCRYPTION_KEY}: {e}", style("✗").red().bold()),
        None => {}
    }
    println!();

    println!("  {}", style("── Criteria ──").dim());
    println!("  Dir: {}", style(loaded.config.criteria_dir.display()).dim());
    for (variant, located) in &criteria_rows {
        match located {
            Ok(source) => println!(
                "  {} {}: {}{}",
                style("✓").green(),
                variant.label(),
                style(source.path.display()).dim(),
                if source.encrypted { " (encrypted)" } else { "" }
            ),
            Err(e) => println!("  {} {}: {e}", style("✗").red(), variant.label()),
        }
    }
    println!();

    Ok(())
}
