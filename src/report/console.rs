use chrono::{TimeZone, Utc};

use crate::copilot::page_context::PageContext;
use crate::copilot::protocol::Response;
use crate::fill::fill_model::{FillReport, PreviewResult};
use crate::matching::field_model::Confidence;
use crate::profile::profile_model::ApplicationHistoryEntry;

// ============================================================================
// Console reporter: formatted terminal output
// ============================================================================

pub fn format_response(response: &Response) -> String {
    match response {
        Response::PageContext(context) => format_page_context(context),
        Response::Preview(preview) => format_preview(preview),
        Response::Fill(report) => format_fill_report(report),
        Response::Undo { success } => format_undo(*success),
        Response::Confirmation { is_confirmation } => {
            if *is_confirmation {
                "Confirmation page: yes\n".to_string()
            } else {
                "Confirmation page: no\n".to_string()
            }
        }
        Response::Applied { entry } => format!(
            "Recorded application: {} at {} ({})\n",
            entry.role, entry.company, entry.id
        ),
    }
}

pub fn format_page_context(context: &PageContext) -> String {
    let mut out = String::new();
    out.push_str(&format!("URL:          {}\n", context.url));
    out.push_str(&format!("Title:        {}\n", context.title));
    out.push_str(&format!("Company:      {}\n", context.company));
    out.push_str(&format!("Role:         {}\n", context.role));
    out.push_str(&format!("Workday:      {}\n", yes_no(context.is_workday)));
    out.push_str(&format!(
        "Confirmation: {}\n",
        yes_no(context.is_confirmation_page)
    ));
    out
}

/// Format a preview for terminal output.
///
/// Produces output like:
/// ```text
/// === Preview: 2 fields ===
///
/// ✓ First Name          firstName        "Ada"
/// ? Your name           firstName        "Ada"
/// ```
pub fn format_preview(preview: &PreviewResult) -> String {
    let mut out = String::new();
    out.push_str(&format!("=== Preview: {} fields ===\n\n", preview.total_found));

    for field in &preview.fields {
        out.push_str(&format!(
            "{} {:<20} {:<16} \"{}\"\n",
            confidence_marker(field.confidence),
            field.label,
            field.profile_key,
            field.suggested_value
        ));
    }

    out
}

pub fn format_fill_report(report: &FillReport) -> String {
    let mut out = String::new();

    for field in &report.review_fields {
        out.push_str(&format!(
            "    [REVIEW] {} ({})\n",
            field.label, field.profile_key
        ));
    }

    out.push_str(&format!(
        "\n=== Filled: {}, needs review: {}, skipped: {} ===\n",
        report.filled, report.needs_review, report.skipped
    ));
    out
}

pub fn format_undo(success: bool) -> String {
    if success {
        "Restored values from the last fill.\n".to_string()
    } else {
        "Nothing to undo, or some fields could not be restored.\n".to_string()
    }
}

pub fn format_history(history: &[ApplicationHistoryEntry]) -> String {
    if history.is_empty() {
        return "No applications recorded.\n".to_string();
    }

    let mut out = String::new();
    for entry in history {
        let date = Utc
            .timestamp_millis_opt(entry.applied_date)
            .single()
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default();
        out.push_str(&format!(
            "{}  {:<12} {:<24} {:<32} {}\n",
            date,
            entry.status.as_str(),
            entry.company,
            entry.role,
            entry.id
        ));
    }
    out.push_str(&format!("\n=== {} applications ===\n", history.len()));
    out
}

fn confidence_marker(confidence: Confidence) -> &'static str {
    match confidence {
        Confidence::High => "\u{2713}",
        Confidence::Medium => "?",
        Confidence::None => " ",
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag { "yes" } else { "no" }
}
