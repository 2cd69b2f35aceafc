use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use crate::browser::session::BrowserSession;
use crate::cli::config::{OutputFormat, PageTarget, ResolvedConfig};
use crate::copilot::controller::Copilot;
use crate::copilot::protocol::{Message, Response};
use crate::dom::host::MemoryPage;
use crate::profile::profile_model::{ApplicationStatus, HistoryUpdate, Settings, UserProfile};
use crate::report::console::{format_history, format_response};
use crate::storage::export::{export_all_data, history_to_csv, import_all_data};
use crate::storage::records::Storage;
use crate::storage::store::JsonFileStore;
use crate::trace::logger::TraceLogger;

type CmdResult<T> = Result<T, Box<dyn std::error::Error>>;

pub fn open_storage(config: &ResolvedConfig) -> Storage<Arc<JsonFileStore>> {
    Storage::new(Arc::new(JsonFileStore::open(&config.store_path)))
}

fn build_copilot(config: &ResolvedConfig) -> Copilot<Arc<JsonFileStore>> {
    let tracer = match &config.trace_path {
        Some(path) => TraceLogger::new(path),
        None => TraceLogger::disabled(),
    };
    Copilot::new(Arc::new(JsonFileStore::open(&config.store_path))).with_tracer(tracer)
}

// ============================================================================
// Page operations (context, preview, fill, undo, check-confirmation, mark-applied)
// ============================================================================

/// Run one control-protocol request against the target page and render the
/// response.
pub fn cmd_page(
    message: &Message,
    target: &PageTarget,
    format: OutputFormat,
    config: &ResolvedConfig,
) -> CmdResult<String> {
    let response = run_on_target(message, target, config)?;
    render(&response, format)
}

pub fn cmd_fill(
    target: &PageTarget,
    overwrite: Option<bool>,
    format: OutputFormat,
    config: &ResolvedConfig,
) -> CmdResult<String> {
    let overwrite_existing = match overwrite {
        Some(flag) => flag,
        None => open_storage(config).get_settings()?.overwrite_existing,
    };
    cmd_page(&Message::FillFields { overwrite_existing }, target, format, config)
}

pub fn run_on_target(message: &Message, target: &PageTarget, config: &ResolvedConfig) -> CmdResult<Response> {
    let mut copilot = build_copilot(config);

    match (&target.page, &target.url) {
        (Some(path), _) => {
            let json = std::fs::read_to_string(path)?;
            let mut host = MemoryPage::from_json(&json)?;
            let response = copilot.handle(message, &mut host)?;
            if mutates_page(message) {
                write_page(path, &host)?;
            }
            Ok(response)
        }
        (None, Some(url)) => {
            let mut session = BrowserSession::launch(&config.driver.command, &config.driver.script)?;
            session.navigate(url)?;
            let response = copilot.handle(message, &mut session)?;
            session.quit()?;
            Ok(response)
        }
        (None, None) => Err("either --page or --url is required".into()),
    }
}

fn mutates_page(message: &Message) -> bool {
    matches!(message, Message::FillFields { .. } | Message::UndoLastFill)
}

fn write_page(path: &Path, host: &MemoryPage) -> CmdResult<()> {
    let json = serde_json::to_string_pretty(host.page())?;
    std::fs::write(path, json)?;
    info!(path = %path.display(), "page written back");
    Ok(())
}

fn render(response: &Response, format: OutputFormat) -> CmdResult<String> {
    match format {
        OutputFormat::Console => Ok(format_response(response)),
        OutputFormat::Json => Ok(format!("{}\n", serde_json::to_string_pretty(response)?)),
    }
}

// ============================================================================
// profile / settings subcommands
// ============================================================================

pub fn cmd_profile_show(config: &ResolvedConfig) -> CmdResult<String> {
    let profile = open_storage(config).get_profile()?;
    Ok(format!("{}\n", serde_json::to_string_pretty(&profile)?))
}

pub fn cmd_profile_load(file: &str, config: &ResolvedConfig) -> CmdResult<String> {
    let content = std::fs::read_to_string(file)?;
    let mut profile: UserProfile = serde_json::from_str(&content)?;
    open_storage(config).save_profile(&mut profile)?;
    Ok(format!("Profile saved from {}\n", file))
}

pub fn cmd_settings(
    overwrite_existing: Option<bool>,
    preview_before_fill: Option<bool>,
    config: &ResolvedConfig,
) -> CmdResult<String> {
    let storage = open_storage(config);
    let current = storage.get_settings()?;
    let updated = Settings {
        overwrite_existing: overwrite_existing.unwrap_or(current.overwrite_existing),
        preview_before_fill: preview_before_fill.unwrap_or(current.preview_before_fill),
    };
    if updated != current {
        storage.save_settings(&updated)?;
    }
    Ok(format!("{}\n", serde_json::to_string_pretty(&updated)?))
}

// ============================================================================
// history subcommands
// ============================================================================

pub fn cmd_history_list(config: &ResolvedConfig) -> CmdResult<String> {
    let history = open_storage(config).get_history()?;
    Ok(format_history(&history))
}

pub fn cmd_history_set_status(
    id: &str,
    status: ApplicationStatus,
    notes: Option<String>,
    config: &ResolvedConfig,
) -> CmdResult<String> {
    let update = HistoryUpdate {
        status: Some(status),
        notes,
        ..HistoryUpdate::default()
    };
    if !open_storage(config).update_history_entry(id, update)? {
        return Err(format!("no application with id {}", id).into());
    }
    Ok(format!("Application {} marked {}\n", id, status.as_str()))
}

pub fn cmd_history_delete(id: &str, config: &ResolvedConfig) -> CmdResult<String> {
    if !open_storage(config).delete_history_entry(id)? {
        return Err(format!("no application with id {}", id).into());
    }
    Ok(format!("Application {} deleted\n", id))
}

pub fn cmd_history_csv(output: Option<&str>, config: &ResolvedConfig) -> CmdResult<String> {
    let history = open_storage(config).get_history()?;
    let csv = history_to_csv(&history);
    emit(csv, output)
}

// ============================================================================
// export / import
// ============================================================================

pub fn cmd_export(output: Option<&str>, config: &ResolvedConfig) -> CmdResult<String> {
    let json = export_all_data(&open_storage(config), Utc::now())?;
    emit(json, output)
}

pub fn cmd_import(input: &str, config: &ResolvedConfig) -> CmdResult<String> {
    let content = std::fs::read_to_string(input)?;
    let snapshot = import_all_data(&open_storage(config), &content)?;
    Ok(format!(
        "Imported profile, settings and {} applications (export version {})\n",
        snapshot.history.len(),
        snapshot.version
    ))
}

/// Write to `output` if given, else hand the content back for stdout.
fn emit(content: String, output: Option<&str>) -> CmdResult<String> {
    match output {
        Some(path) => {
            std::fs::write(path, &content)?;
            Ok(format!("Wrote {}\n", path))
        }
        None => Ok(content),
    }
}
