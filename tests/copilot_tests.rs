use std::sync::Arc;

use apply_copilot::copilot::controller::Copilot;
use apply_copilot::copilot::error::CopilotError;
use apply_copilot::copilot::page_context::{
    company_from_url, detect_page_context, is_confirmation_page, is_workday_url, portal_domain,
    role_from_title,
};
use apply_copilot::copilot::protocol::{Message, Response};
use apply_copilot::dom::host::{FillMarker, HostError, MemoryPage};
use apply_copilot::dom::selector::SelectorHint;
use apply_copilot::fill::undo::{LAST_FILL_RUN_KEY, UndoLog};
use apply_copilot::matching::field_model::Confidence;
use apply_copilot::profile::profile_model::ApplicationStatus;
use apply_copilot::storage::records::Storage;
use apply_copilot::storage::store::{KeyValueStore, MemoryStore};
use apply_copilot::trace::logger::TraceLogger;
use serde_json::{Value, json};

use crate::common::hosts::FlakyPage;
use crate::common::pages::{FORM_URL, application_page, node, page_at, page_with, text};
use crate::common::utils::sample_profile;

mod common;

// ============================================================================
// Helpers
// ============================================================================

fn copilot() -> Copilot<Arc<MemoryStore>> {
    let copilot = Copilot::new(Arc::new(MemoryStore::new()));
    copilot.storage().put_profile(&sample_profile()).unwrap();
    copilot
}

fn value_of(host: &MemoryPage, html_id: &str) -> String {
    host.page().value(node(host.page(), html_id))
}

// ============================================================================
// Preview
// ============================================================================

#[test]
fn preview_lists_matches_without_writing() {
    let mut copilot = copilot();
    let mut host = application_page();

    let preview = copilot.preview(&mut host).unwrap();

    assert_eq!(preview.total_found, 8);
    assert_eq!(preview.fields.len(), 8);
    let first = &preview.fields[0];
    assert_eq!(first.label, "First Name");
    assert_eq!(first.profile_key, "personal.firstName");
    assert_eq!(first.suggested_value, "Ada");
    assert_eq!(first.confidence, Confidence::High);

    assert!(host.notifications().is_empty());
    assert_eq!(copilot.undo_log().load().unwrap(), None);
}

// ============================================================================
// Fill
// ============================================================================

#[test]
fn fill_reports_filled_review_and_skipped() {
    let mut copilot = copilot();
    let mut host = application_page();

    let report = copilot.fill(&mut host, false).unwrap();

    assert_eq!(report.filled, 6);
    assert_eq!(report.needs_review, 1);
    // cover letter has no mapping, linkedin already has a value
    assert_eq!(report.skipped, 2);
    assert_eq!(report.review_fields.len(), 1);
    assert_eq!(report.review_fields[0].profile_key, "workAuth.authorizedToWork");
    assert_eq!(
        report.review_fields[0].label,
        "Are you legally authorized to work for us?"
    );

    assert_eq!(value_of(&host, "first"), "Ada");
    assert_eq!(value_of(&host, "last"), "Lovelace");
    assert_eq!(value_of(&host, "email"), "ada@example.com");
    assert_eq!(value_of(&host, "authorized"), "yes");
    assert_eq!(value_of(&host, "linkedin"), "https://linkedin.com/in/existing");
    assert_eq!(value_of(&host, "cover"), "");
}

#[test]
fn fill_without_overwrite_records_no_kept_fields() {
    let mut copilot = copilot();
    let mut host = application_page();

    copilot.fill(&mut host, false).unwrap();

    let run = copilot.undo_log().load().unwrap().unwrap();
    assert_eq!(run.url, FORM_URL);
    assert_eq!(run.touched_fields.len(), 7);
    assert!(
        run.touched_fields
            .iter()
            .all(|t| t.selector_hint.to_string() != "#linkedin")
    );
    assert_eq!(run.run_id.len(), 40);
}

#[test]
fn fill_with_overwrite_replaces_existing_values() {
    let mut copilot = copilot();
    let mut host = application_page();

    let report = copilot.fill(&mut host, true).unwrap();

    assert_eq!(report.filled, 7);
    assert_eq!(report.skipped, 1);
    assert_eq!(value_of(&host, "linkedin"), "https://linkedin.com/in/ada");
}

#[test]
fn fill_with_empty_profile_touches_nothing() {
    let mut copilot = Copilot::new(Arc::new(MemoryStore::new()));
    let mut host = application_page();

    let report = copilot.fill(&mut host, false).unwrap();

    assert_eq!(report.filled, 0);
    assert_eq!(report.skipped, 9);
    assert!(host.notifications().is_empty());
    assert_eq!(copilot.undo_log().load().unwrap(), None);
}

// ============================================================================
// Undo
// ============================================================================

#[test]
fn undo_restores_the_page_once() {
    let mut copilot = copilot();
    let mut host = application_page();
    let before = host.page().clone();

    copilot.fill(&mut host, false).unwrap();
    let first = node(host.page(), "first");
    assert_eq!(host.markers(first), vec![FillMarker::Filled]);

    let response = copilot.handle(&Message::UndoLastFill, &mut host).unwrap();
    assert_eq!(response, Response::Undo { success: true });

    for id in ["first", "last", "email", "authorized", "linkedin"] {
        assert_eq!(value_of(&host, id), before.value(node(&before, id)), "{}", id);
    }
    assert!(host.markers(first).is_empty());

    let response = copilot.handle(&Message::UndoLastFill, &mut host).unwrap();
    assert_eq!(response, Response::Undo { success: false });
}

#[test]
fn undo_with_no_recorded_fill_fails_softly() {
    let mut copilot = copilot();
    let mut host = application_page();

    let report = copilot.undo(&mut host).unwrap();
    assert!(!report.success());
    assert!(host.notifications().is_empty());
}

#[test]
fn host_failure_mid_fill_keeps_written_fields_undoable() {
    let mut copilot = copilot();
    // first and last commit, email is the third write
    let mut host = FlakyPage::new(application_page()).failing_commit(3);

    let err = copilot.fill(&mut host, false).unwrap_err();
    assert!(matches!(err, CopilotError::Host(HostError::DriverIo(_))));
    assert_eq!(value_of(&host.inner, "first"), "Ada");
    assert_eq!(value_of(&host.inner, "last"), "Lovelace");

    let run = copilot.undo_log().load().unwrap().unwrap();
    let selectors: Vec<String> = run
        .touched_fields
        .iter()
        .map(|t| t.selector_hint.to_string())
        .collect();
    assert_eq!(selectors, vec!["#first", "#last"]);

    host.fail_commit_from = None;
    let report = copilot.undo(&mut host).unwrap();
    assert_eq!(report.restored, 2);
    assert_eq!(value_of(&host.inner, "first"), "");
    assert_eq!(value_of(&host.inner, "last"), "");
}

#[test]
fn host_failure_on_first_write_records_nothing() {
    let mut copilot = copilot();
    let mut host = FlakyPage::new(application_page()).failing_commit(1);

    assert!(copilot.fill(&mut host, false).is_err());
    assert_eq!(copilot.undo_log().load().unwrap(), None);
    assert_eq!(value_of(&host.inner, "first"), "");
}

#[test]
fn undo_skips_fields_whose_lookup_errors() {
    let mut copilot = copilot();
    let mut host = FlakyPage::new(application_page());
    copilot.fill(&mut host, false).unwrap();

    host.broken_hints.push(SelectorHint::Id("first".into()));
    let report = copilot.undo(&mut host).unwrap();

    assert!(report.success());
    assert_eq!(report.missed, vec![SelectorHint::Id("first".into())]);
    assert_eq!(value_of(&host.inner, "first"), "Ada");
    assert_eq!(value_of(&host.inner, "last"), "");
    assert_eq!(copilot.undo_log().load().unwrap(), None);
}

#[test]
fn undo_slot_can_live_under_its_own_key() {
    let store = Arc::new(MemoryStore::new());
    let mut copilot = Copilot::with_parts(
        Storage::new(store.clone()),
        UndoLog::with_key(store.clone(), "copilot_last_fill_secondary"),
    );
    copilot.storage().put_profile(&sample_profile()).unwrap();
    let mut host = application_page();

    copilot.fill(&mut host, false).unwrap();
    assert!(store.get("copilot_last_fill_secondary").unwrap().is_some());
    assert_eq!(store.get(LAST_FILL_RUN_KEY).unwrap(), None);

    assert!(copilot.undo(&mut host).unwrap().success());
    assert_eq!(value_of(&host, "first"), "");
}

// ============================================================================
// Control protocol
// ============================================================================

#[test]
fn messages_use_screaming_type_tags() {
    let msg: Message = serde_json::from_value(json!({ "type": "FILL_FIELDS", "overwriteExisting": true })).unwrap();
    assert_eq!(msg, Message::FillFields { overwrite_existing: true });

    let msg: Message = serde_json::from_str(r#"{"type":"GET_PAGE_CONTEXT"}"#).unwrap();
    assert_eq!(msg, Message::GetPageContext);

    assert_eq!(
        serde_json::to_value(&Message::UndoLastFill).unwrap(),
        json!({ "type": "UNDO_LAST_FILL" })
    );
    assert!(serde_json::from_str::<Message>(r#"{"type":"SUBMIT"}"#).is_err());
}

#[test]
fn responses_serialize_to_their_payload() {
    assert_eq!(
        serde_json::to_value(Response::Undo { success: true }).unwrap(),
        json!({ "success": true })
    );
    assert_eq!(
        serde_json::to_value(Response::Confirmation { is_confirmation: false }).unwrap(),
        json!({ "isConfirmation": false })
    );
}

#[test]
fn fill_response_uses_camel_case_fields() {
    let mut copilot = copilot();
    let mut host = application_page();

    let response = copilot
        .handle(&Message::FillFields { overwrite_existing: false }, &mut host)
        .unwrap();
    let value = serde_json::to_value(&response).unwrap();

    assert_eq!(value["filled"], 6);
    assert_eq!(value["needsReview"], 1);
    assert_eq!(value["reviewFields"][0]["profileKey"], "workAuth.authorizedToWork");
    assert_eq!(value["reviewFields"][0]["confidence"], "medium");
}

#[test]
fn page_context_request_describes_the_page() {
    let mut copilot = copilot();
    let mut host = application_page();

    let Response::PageContext(context) = copilot.handle(&Message::GetPageContext, &mut host).unwrap() else {
        panic!("expected page context");
    };

    assert_eq!(context.company, "Acme");
    assert_eq!(context.role, "Senior Engineer");
    assert!(context.is_workday);
    assert!(!context.is_confirmation_page);
}

#[test]
fn mark_as_applied_prepends_history() {
    let mut copilot = copilot();
    let mut host = application_page();

    copilot.handle(&Message::MarkAsApplied, &mut host).unwrap();
    let Response::Applied { entry } = copilot.handle(&Message::MarkAsApplied, &mut host).unwrap() else {
        panic!("expected applied entry");
    };

    assert_eq!(entry.company, "Acme");
    assert_eq!(entry.role, "Senior Engineer");
    assert_eq!(entry.status, ApplicationStatus::Applied);
    assert_eq!(entry.portal_domain, "acme.myworkdayjobs.com");
    assert_eq!(entry.url, FORM_URL);

    let history = copilot.storage().get_history().unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0], entry);
}

// ============================================================================
// Page context
// ============================================================================

#[test]
fn company_comes_from_workday_tenant() {
    assert_eq!(company_from_url("https://acme.myworkdayjobs.com/careers"), "Acme");
    assert_eq!(company_from_url("https://myworkdayjobs.com/en-US/jobs"), "Unknown Company");
    assert_eq!(company_from_url("https://jobs.lever.co/initech"), "Unknown Company");
    assert_eq!(company_from_url("not a url"), "Unknown Company");
}

#[test]
fn role_is_first_title_segment() {
    assert_eq!(role_from_title("Data Analyst | Globex"), "Data Analyst");
    assert_eq!(role_from_title("  Backend Engineer - Remote - Acme"), "Backend Engineer");
    assert_eq!(role_from_title(""), "Job Application");
    assert_eq!(role_from_title(" | Careers"), "Job Application");
}

#[test]
fn workday_detection_and_portal_domain() {
    assert!(is_workday_url("https://acme.myworkdayjobs.com/x"));
    assert!(!is_workday_url("https://myworkdayjobs.com.evil.example/x"));
    assert_eq!(portal_domain("https://boards.greenhouse.io/acme/jobs/1"), "boards.greenhouse.io");
    assert_eq!(portal_domain("garbage"), "");
}

#[test]
fn confirmation_detected_from_url_or_text() {
    let by_url = page_with(json!([]));
    assert!(!is_confirmation_page(&by_url));

    let by_url = page_at("https://acme.myworkdayjobs.com/job/Thank-You", "Done", json!([]));
    assert!(is_confirmation_page(&by_url));

    let by_text = page_with(json!([
        { "tag": "h2", "children": [text("Thank you for applying to Acme!")] }
    ]));
    assert!(is_confirmation_page(&by_text));
    assert!(detect_page_context(&by_text).is_confirmation_page);
}

#[test]
fn check_confirmation_request() {
    let mut copilot = copilot();
    let mut host = MemoryPage::new(page_at(
        "https://acme.myworkdayjobs.com/job/application/confirmation",
        "Submitted",
        json!([]),
    ));

    let response = copilot.handle(&Message::CheckConfirmation, &mut host).unwrap();
    assert_eq!(response, Response::Confirmation { is_confirmation: true });
}

// ============================================================================
// Fill trace
// ============================================================================

#[test]
fn trace_logger_records_every_decision() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fill_trace.jsonl");
    let mut copilot = copilot().with_tracer(TraceLogger::new(&path));
    let mut host = application_page();

    copilot.fill(&mut host, false).unwrap();
    copilot.undo(&mut host).unwrap();

    let lines: Vec<Value> = std::fs::read_to_string(&path)
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    let count = |op: &str, outcome: &str| {
        lines
            .iter()
            .filter(|l| l["operation"] == op && l["outcome"] == outcome)
            .count()
    };

    assert_eq!(count("fill", "matched"), 8);
    assert_eq!(count("fill", "no_match"), 1);
    assert_eq!(count("fill", "filled"), 6);
    assert_eq!(count("fill", "needs_review"), 1);
    assert_eq!(count("fill", "kept_existing"), 1);
    assert_eq!(count("undo", "restored"), 1);

    let filled = lines.iter().find(|l| l["outcome"] == "filled").unwrap();
    assert_eq!(filled["selector"], "#first");
    assert_eq!(filled["profile_key"], "personal.firstName");
    assert_eq!(filled["confidence"], "high");
}

#[test]
fn disabled_trace_logger_is_a_no_op() {
    let tracer = TraceLogger::disabled();
    assert!(!tracer.is_enabled());

    let mut copilot = copilot().with_tracer(tracer);
    let mut host = application_page();
    assert!(copilot.fill(&mut host, false).is_ok());
}
