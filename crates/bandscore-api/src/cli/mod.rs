//! CLI command definitions and dispatch for the `bandscore` binary.
//!
//! Uses clap derive macros for argument parsing. `serve` starts the web
//! wizard; the remaining commands run one evaluation or manage the
//! band-descriptor files from the terminal.

pub mod count;
pub mod criteria;
pub mod evaluate;
pub mod keys;
pub mod status;
pub mod tasks;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

use bandscore_types::task::TaskVariant;

/// AI feedback on IELTS writing responses.
#[derive(Parser)]
#[command(name = "bandscore", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to bandscore.toml (default: <data dir>/bandscore.toml).
    #[arg(long, global = true, env = "BANDSCORE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Export spans to stdout through OpenTelemetry.
    ///
    /// The exporter always writes to stdout, so it cannot be combined with
    /// `--json`.
    #[arg(long, global = true, conflicts_with = "json")]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the web wizard and REST API.
    Serve {
        /// Port to listen on (default from config).
        #[arg(long)]
        port: Option<u16>,

        /// Host to bind to (default from config).
        #[arg(long)]
        host: Option<String>,
    },

    /// Evaluate one response against the band descriptors.
    #[command(alias = "eval")]
    Evaluate {
        /// Task variant (task1-academic, task1-general, task2).
        #[arg(short, long)]
        task: TaskVariant,

        /// Question text.
        #[arg(short, long, conflicts_with = "question_file", required_unless_present = "question_file")]
        question: Option<String>,

        /// Read the question from a file.
        #[arg(long)]
        question_file: Option<PathBuf>,

        /// Response text (read from stdin when neither this nor --response-file is given).
        #[arg(short, long, conflicts_with = "response_file")]
        response: Option<String>,

        /// Read the response from a file.
        #[arg(long)]
        response_file: Option<PathBuf>,

        /// Also write the feedback as an HTML report.
        #[arg(long)]
        save: Option<PathBuf>,
    },

    /// Count the words of a response and check the task minimum.
    Count {
        /// Task variant whose minimum applies.
        #[arg(short, long)]
        task: TaskVariant,

        /// Text to count (read from stdin when neither this nor --file is given).
        #[arg(conflicts_with = "file")]
        text: Option<String>,

        /// Read the text from a file.
        #[arg(long)]
        file: Option<PathBuf>,
    },

    /// List task variants and their descriptor files.
    Tasks,

    /// Inspect band-descriptor files.
    Criteria {
        #[command(subcommand)]
        action: CriteriaAction,
    },

    /// Print a fresh criteria encryption key.
    Keygen,

    /// Encrypt the descriptor files in place (writes `.enc` siblings).
    Encrypt {
        /// Descriptor directory (default: criteria_dir from config).
        #[arg(long)]
        dir: Option<PathBuf>,

        /// Encryption key as URL-safe base64.
        #[arg(long, conflicts_with = "key_file")]
        key: Option<String>,

        /// Read the encryption key from a file.
        #[arg(long)]
        key_file: Option<PathBuf>,

        /// Write the key used to this file.
        #[arg(long)]
        write_key: Option<PathBuf>,

        /// Replace existing `.enc` files and key files without asking.
        #[arg(long)]
        force: bool,
    },

    /// Show configuration, secrets and descriptor files.
    Status,

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum CriteriaAction {
    /// Print the (decrypted) descriptor text for a task.
    Show {
        #[arg(short, long)]
        task: TaskVariant,
    },
}

/// Read a value given inline, from a file, or from stdin, in that order.
pub(crate) async fn read_text_arg(
    inline: Option<String>,
    file: Option<&std::path::Path>,
    what: &str,
) -> anyhow::Result<String> {
    if let Some(text) = inline {
        return Ok(text);
    }
    if let Some(path) = file {
        return tokio::fs::read_to_string(path)
            .await
            .map_err(|e| anyhow::anyhow!("failed to read {what} from {}: {e}", path.display()));
    }

    let mut buf = String::new();
    tokio::io::AsyncReadExt::read_to_string(&mut tokio::io::stdin(), &mut buf).await?;
    Ok(buf)
}
