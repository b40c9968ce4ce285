//! Key generation and offline descriptor encryption.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use console::style;
use dialoguer::Confirm;

use bandscore_infra::crypto::criteria_cipher::{
    CriteriaCipher, encrypt_descriptor_files, existing_encrypted_files,
};
use bandscore_types::secret::CRITERIA_ENCRYPTION_KEY;

use crate::state::LoadedConfig;

/// Print a fresh key. Nothing is stored.
pub fn keygen(json: bool) -> Result<()> {
    let key = CriteriaCipher::generate_key();
    let cipher = CriteriaCipher::from_encoded_key(&key)?;

    if json {
        println!(
            "{}",
            serde_json::json!({"key": key, "fingerprint": cipher.fingerprint()})
        );
    } else {
        println!("{key}");
        eprintln!(
            "  {} Set it as {} (fingerprint {})",
            style("i").blue().bold(),
            style(CRITERIA_ENCRYPTION_KEY).yellow(),
            cipher.fingerprint()
        );
    }
    Ok(())
}

pub struct EncryptArgs {
    pub dir: Option<PathBuf>,
    pub key: Option<String>,
    pub key_file: Option<PathBuf>,
    pub write_key: Option<PathBuf>,
    pub force: bool,
}

/// Where the encryption key came from.
enum KeySource {
    Argument,
    File,
    Configured,
    Generated,
}

async fn resolve_key(loaded: &LoadedConfig, args: &EncryptArgs) -> Result<(String, KeySource)> {
    if let Some(key) = &args.key {
        return Ok((key.trim().to_string(), KeySource::Argument));
    }
    if let Some(path) = &args.key_file {
        let key = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read key file {}", path.display()))?;
        return Ok((key.trim().to_string(), KeySource::File));
    }
    if let Some(key) = loaded
        .secret_service()
        .get_secret(CRITERIA_ENCRYPTION_KEY)
        .await?
    {
        return Ok((key.trim().to_string(), KeySource::Configured));
    }
    Ok((CriteriaCipher::generate_key(), KeySource::Generated))
}

async fn write_key_file(path: &Path, key: &str, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!(
            "{} already exists; pass --force to replace it",
            path.display()
        );
    }
    tokio::fs::write(path, format!("{key}\n"))
        .await
        .with_context(|| format!("failed to write key file {}", path.display()))
}

fn display_paths(paths: &[PathBuf]) -> Vec<String> {
    paths.iter().map(|p| p.display().to_string()).collect()
}

pub async fn encrypt(loaded: &LoadedConfig, args: EncryptArgs, json: bool) -> Result<()> {
    let dir = args
        .dir
        .clone()
        .unwrap_or_else(|| loaded.config.criteria_dir.clone());
    if !dir.is_dir() {
        bail!("descriptor directory {} does not exist", dir.display());
    }

    let (key, source) = resolve_key(loaded, &args).await?;
    let cipher = CriteriaCipher::from_encoded_key(&key)?;

    let existing = existing_encrypted_files(&dir);
    let overwrite = if args.force || existing.is_empty() {
        true
    } else if json {
        false
    } else {
        Confirm::new()
            .with_prompt(format!(
                "Replace {} existing encrypted file{}?",
                style(existing.len()).yellow().bold(),
                if existing.len() == 1 { "" } else { "s" }
            ))
            .default(false)
            .interact()?
    };

    // Persist the key before any file depends on it.
    if let Some(path) = &args.write_key {
        write_key_file(path, &key, args.force).await?;
    }

    let report = encrypt_descriptor_files(&dir, &cipher, overwrite)?;

    if json {
        let mut out = serde_json::json!({
            "dir": dir.display().to_string(),
            "fingerprint": cipher.fingerprint(),
            "written": display_paths(&report.written),
            "skipped": display_paths(&report.skipped),
            "missing": display_paths(&report.missing),
        });
        if matches!(source, KeySource::Generated) {
            out["key"] = serde_json::Value::String(key);
        }
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!();
    for path in &report.written {
        println!("  {} {}", style("✓").green().bold(), path.display());
    }
    for path in &report.skipped {
        println!("  {} {} (kept)", style("-").dim(), style(path.display()).dim());
    }
    for path in &report.missing {
        println!("  {} {} not found", style("!").yellow().bold(), path.display());
    }
    println!();

    let origin = match source {
        KeySource::Argument => "--key",
        KeySource::File => "--key-file",
        KeySource::Configured => CRITERIA_ENCRYPTION_KEY,
        KeySource::Generated => "a new key",
    };
    println!(
        "  Encrypted with {} (fingerprint {})",
        style(origin).bold(),
        cipher.fingerprint()
    );

    if let KeySource::Generated = source {
        println!();
        println!(
            "  {} Generated key (save this -- it won't be shown again):",
            style("!").yellow().bold()
        );
        println!();
        println!("  {}", style(&key).yellow().bold());
    }
    if let Some(path) = &args.write_key {
        println!("  Key written to {}", style(path.display()).dim());
    }
    println!();

    Ok(())
}
