use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

use crate::profile::profile_model::ApplicationStatus;

pub const DEFAULT_CONFIG_PATH: &str = "apply-copilot.yaml";

// ============================================================================
// CLI Argument Parsing (clap derive)
// ============================================================================

#[derive(Parser, Debug)]
#[command(
    name = "apply-copilot",
    version,
    about = "Autofill job application forms from a stored profile"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to config file (default: apply-copilot.yaml in current dir)
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Path to the JSON record store
    #[arg(long, global = true)]
    pub store: Option<String>,

    /// Append fill decisions to this JSONL file
    #[arg(long, global = true)]
    pub trace: Option<String>,
}

/// Where the page operations run: a JSON page file or a live driver session.
#[derive(Args, Debug, Clone)]
#[group(required = true, multiple = false)]
pub struct PageTarget {
    /// JSON page description; written back after a fill or undo
    #[arg(long)]
    pub page: Option<PathBuf>,

    /// Open this URL in the page driver
    #[arg(long)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Console,
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the inferred employer, role and page flags
    Context {
        #[command(flatten)]
        target: PageTarget,

        #[arg(long, value_enum, default_value = "console")]
        format: OutputFormat,
    },

    /// List the fields that would be filled, without writing anything
    Preview {
        #[command(flatten)]
        target: PageTarget,

        #[arg(long, value_enum, default_value = "console")]
        format: OutputFormat,
    },

    /// Fill every matched field from the stored profile
    Fill {
        #[command(flatten)]
        target: PageTarget,

        /// Overwrite fields that already have a value (default: stored setting)
        #[arg(long, action = clap::ArgAction::Set)]
        overwrite: Option<bool>,

        #[arg(long, value_enum, default_value = "console")]
        format: OutputFormat,
    },

    /// Restore the values from before the last fill
    Undo {
        #[command(flatten)]
        target: PageTarget,

        #[arg(long, value_enum, default_value = "console")]
        format: OutputFormat,
    },

    /// Report whether the page is an application confirmation page
    CheckConfirmation {
        #[command(flatten)]
        target: PageTarget,

        #[arg(long, value_enum, default_value = "console")]
        format: OutputFormat,
    },

    /// Record the current page in the application history
    MarkApplied {
        #[command(flatten)]
        target: PageTarget,

        #[arg(long, value_enum, default_value = "console")]
        format: OutputFormat,
    },

    /// Show or replace the stored profile
    Profile {
        #[command(subcommand)]
        action: ProfileCommand,
    },

    /// Show or change fill settings
    Settings {
        #[arg(long, action = clap::ArgAction::Set)]
        overwrite_existing: Option<bool>,

        #[arg(long, action = clap::ArgAction::Set)]
        preview_before_fill: Option<bool>,
    },

    /// Inspect and edit the application history
    History {
        #[command(subcommand)]
        action: HistoryCommand,
    },

    /// Export profile, settings and history as one JSON document
    Export {
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Restore profile, settings and history from an export
    Import {
        #[arg(short, long)]
        input: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum ProfileCommand {
    Show,
    /// Load a profile JSON document and save it
    Load {
        #[arg(long)]
        file: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum HistoryCommand {
    List,
    SetStatus {
        #[arg(long)]
        id: String,

        #[arg(long, value_enum)]
        status: ApplicationStatus,

        #[arg(long)]
        notes: Option<String>,
    },
    Delete {
        #[arg(long)]
        id: String,
    },
    /// Write the history as CSV
    Csv {
        #[arg(short, long)]
        output: Option<String>,
    },
}

// ============================================================================
// Config File Model (optional YAML)
// ============================================================================

/// Optional YAML config file: `apply-copilot.yaml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub trace: TraceConfig,
    #[serde(default)]
    pub driver: DriverConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_store_path")]
    pub path: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TraceConfig {
    pub path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriverConfig {
    #[serde(default = "default_driver_command")]
    pub command: String,

    #[serde(default = "default_driver_script")]
    pub script: String,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            command: default_driver_command(),
            script: default_driver_script(),
        }
    }
}

fn default_store_path() -> String { "apply-copilot-store.json".to_string() }
fn default_driver_command() -> String { "node".to_string() }
fn default_driver_script() -> String { "page_driver.js".to_string() }

// ============================================================================
// Config File Loading
// ============================================================================

/// Load config from a YAML file. Returns defaults if file is missing or malformed.
pub fn load_config(path: Option<&str>) -> AppConfig {
    let config_path = path.unwrap_or(DEFAULT_CONFIG_PATH);
    match std::fs::read_to_string(config_path) {
        Ok(content) => serde_yaml::from_str(&content).unwrap_or_default(),
        Err(_) => AppConfig::default(),
    }
}

/// Settings every subcommand needs, after CLI > config > defaults.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub store_path: String,
    pub trace_path: Option<String>,
    pub driver: DriverConfig,
}

pub fn resolve_config(cli: &Cli, config: AppConfig) -> ResolvedConfig {
    ResolvedConfig {
        store_path: cli.store.clone().unwrap_or(config.store.path),
        trace_path: cli.trace.clone().or(config.trace.path),
        driver: config.driver,
    }
}
