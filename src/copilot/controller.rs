use chrono::Utc;
use tracing::{info, warn};

use crate::copilot::error::CopilotError;
use crate::copilot::page_context::{detect_page_context, is_confirmation_page, portal_domain};
use crate::copilot::protocol::{Message, Response};
use crate::dom::host::PageHost;
use crate::fill::executor::{FillOutcome, fill_field};
use crate::fill::fill_model::{
    FillReport, FillRun, PreviewField, PreviewResult, ReviewField, TouchedField,
};
use crate::fill::undo::{UndoLog, UndoReport};
use crate::matching::field_model::{Confidence, MatchedField};
use crate::matching::matcher::match_field_to_profile;
use crate::matching::scanner::scan_form_fields;
use crate::profile::profile_model::{ApplicationHistoryEntry, ApplicationStatus, UserProfile};
use crate::storage::ids::fingerprint_id;
use crate::storage::records::Storage;
use crate::storage::store::KeyValueStore;
use crate::trace::logger::TraceLogger;
use crate::trace::trace::{FillTraceEvent, TraceOperation, TraceOutcome};

/// Dispatches control-protocol requests against a page.
///
/// Owns the undo slot; `&mut self` on every operation serializes
/// preview, fill and undo for a given controller.
pub struct Copilot<S> {
    storage: Storage<S>,
    undo: UndoLog<S>,
    tracer: TraceLogger,
}

impl<S: KeyValueStore + Clone> Copilot<S> {
    /// Records and the undo slot share one store.
    pub fn new(store: S) -> Self {
        Self {
            storage: Storage::new(store.clone()),
            undo: UndoLog::new(store),
            tracer: TraceLogger::disabled(),
        }
    }
}

impl<S: KeyValueStore> Copilot<S> {
    pub fn with_parts(storage: Storage<S>, undo: UndoLog<S>) -> Self {
        Self {
            storage,
            undo,
            tracer: TraceLogger::disabled(),
        }
    }

    pub fn with_tracer(mut self, tracer: TraceLogger) -> Self {
        self.tracer = tracer;
        self
    }

    pub fn storage(&self) -> &Storage<S> {
        &self.storage
    }

    pub fn undo_log(&self) -> &UndoLog<S> {
        &self.undo
    }

    pub fn handle(&mut self, message: &Message, host: &mut dyn PageHost) -> Result<Response, CopilotError> {
        match message {
            Message::GetPageContext => {
                let page = host.snapshot()?;
                Ok(Response::PageContext(detect_page_context(&page)))
            }
            Message::PreviewFields => Ok(Response::Preview(self.preview(host)?)),
            Message::FillFields { overwrite_existing } => {
                Ok(Response::Fill(self.fill(host, *overwrite_existing)?))
            }
            Message::UndoLastFill => Ok(Response::Undo {
                success: self.undo(host)?.success(),
            }),
            Message::CheckConfirmation => {
                let page = host.snapshot()?;
                Ok(Response::Confirmation {
                    is_confirmation: is_confirmation_page(&page),
                })
            }
            Message::MarkAsApplied => Ok(Response::Applied {
                entry: self.mark_as_applied(host)?,
            }),
        }
    }

    /// Read-only: scan and match, write nothing.
    pub fn preview(&mut self, host: &mut dyn PageHost) -> Result<PreviewResult, CopilotError> {
        let profile = self.storage.get_profile()?;
        let matched = self.scan_and_match(host, &profile, TraceOperation::Preview)?.0;

        let fields: Vec<PreviewField> = matched
            .into_iter()
            .map(|m| PreviewField {
                label: m.label_text,
                profile_key: m.profile_key.to_string(),
                suggested_value: m.suggested_value,
                confidence: m.confidence,
            })
            .collect();

        Ok(PreviewResult {
            total_found: fields.len(),
            fields,
        })
    }

    /// Scan once, fill every match, record the run for undo.
    ///
    /// A host failure stops the fill; fields written before it are still
    /// recorded so the partial run can be undone.
    pub fn fill(&mut self, host: &mut dyn PageHost, overwrite_existing: bool) -> Result<FillReport, CopilotError> {
        let profile = self.storage.get_profile()?;
        let (matched, unmatched, url) = self.scan_and_match(host, &profile, TraceOperation::Fill)?;

        let mut report = FillReport {
            skipped: unmatched,
            ..FillReport::default()
        };
        let mut touched_fields: Vec<TouchedField> = Vec::new();

        let mut failure = None;
        for field in &matched {
            let outcome = match fill_field(host, field, overwrite_existing) {
                Ok(outcome) => outcome,
                Err(e) => {
                    warn!(selector = %field.selector, error = %e, "fill aborted");
                    self.tracer.log(
                        &FillTraceEvent::now(TraceOperation::Fill, TraceOutcome::Failed)
                            .with_selector(&field.selector)
                            .with_profile_key(field.profile_key),
                    );
                    failure = Some(e);
                    break;
                }
            };
            self.trace_fill(field, &outcome);

            let Some(touched) = outcome.into_touched() else {
                report.skipped += 1;
                continue;
            };
            if touched.confidence == Confidence::Medium {
                report.review_fields.push(ReviewField {
                    label: field.label_text.clone(),
                    profile_key: touched.profile_key.clone(),
                    confidence: touched.confidence,
                });
            }
            touched_fields.push(touched);
        }

        report.filled = touched_fields
            .iter()
            .filter(|t| t.confidence == Confidence::High)
            .count();
        report.needs_review = report.review_fields.len();

        if !touched_fields.is_empty() {
            let timestamp = Utc::now().timestamp_millis();
            let run = FillRun {
                run_id: fingerprint_id(&[
                    url.as_str(),
                    timestamp.to_string().as_str(),
                    touched_fields.len().to_string().as_str(),
                ]),
                timestamp,
                url,
                touched_fields,
            };
            self.undo.record(&run)?;
            info!(
                run_id = %run.run_id,
                filled = report.filled,
                needs_review = report.needs_review,
                skipped = report.skipped,
                "fill run recorded"
            );
        }

        match failure {
            Some(e) => Err(e.into()),
            None => Ok(report),
        }
    }

    pub fn undo(&mut self, host: &mut dyn PageHost) -> Result<UndoReport, CopilotError> {
        let run_id = self.undo.load()?.map(|r| r.run_id);
        let report = self.undo.revert(host)?;

        if let Some(run_id) = run_id {
            for missed in &report.missed {
                self.tracer.log(
                    &FillTraceEvent::now(TraceOperation::Undo, TraceOutcome::NotRestored)
                        .with_selector(missed)
                        .with_run_id(&run_id),
                );
            }
            let outcome = if report.success() {
                TraceOutcome::Restored
            } else {
                TraceOutcome::NotRestored
            };
            self.tracer
                .log(&FillTraceEvent::now(TraceOperation::Undo, outcome).with_run_id(&run_id));
        }

        Ok(report)
    }

    /// Append the current page to the application history.
    pub fn mark_as_applied(&mut self, host: &mut dyn PageHost) -> Result<ApplicationHistoryEntry, CopilotError> {
        let page = host.snapshot()?;
        let context = detect_page_context(&page);
        let applied_date = Utc::now().timestamp_millis();

        let entry = ApplicationHistoryEntry {
            id: fingerprint_id(&[
                context.url.as_str(),
                applied_date.to_string().as_str(),
                "applied",
            ]),
            company: context.company,
            role: context.role,
            portal_domain: portal_domain(&context.url),
            url: context.url,
            applied_date,
            status: ApplicationStatus::Applied,
            notes: String::new(),
        };

        self.storage.add_history_entry(entry.clone())?;
        Ok(entry)
    }

    /// Snapshot once and match every scanned field. Returns matches, the
    /// count of fields with no usable match, and the page URL.
    fn scan_and_match(
        &self,
        host: &mut dyn PageHost,
        profile: &UserProfile,
        operation: TraceOperation,
    ) -> Result<(Vec<MatchedField>, usize, String), CopilotError> {
        let page = host.snapshot()?;
        let scanned = scan_form_fields(&page);

        let mut matched = Vec::new();
        let mut unmatched = 0;
        for field in &scanned {
            match match_field_to_profile(field, profile) {
                Some(m) => {
                    self.tracer.log(
                        &FillTraceEvent::now(operation, TraceOutcome::Matched)
                            .with_selector(&m.selector)
                            .with_profile_key(m.profile_key)
                            .with_confidence(m.confidence),
                    );
                    matched.push(m);
                }
                None => {
                    self.tracer.log(
                        &FillTraceEvent::now(operation, TraceOutcome::NoMatch)
                            .with_selector(&field.selector),
                    );
                    unmatched += 1;
                }
            }
        }

        Ok((matched, unmatched, page.url))
    }

    fn trace_fill(&self, field: &MatchedField, outcome: &FillOutcome) {
        let result = match outcome {
            FillOutcome::Skipped => TraceOutcome::KeptExisting,
            FillOutcome::Unsafe(_) => TraceOutcome::UnsafeOption,
            FillOutcome::Written(t) if t.confidence == Confidence::High => TraceOutcome::Filled,
            FillOutcome::Written(_) => TraceOutcome::NeedsReview,
        };
        self.tracer.log(
            &FillTraceEvent::now(TraceOperation::Fill, result)
                .with_selector(&field.selector)
                .with_profile_key(field.profile_key)
                .with_confidence(field.confidence),
        );
    }
}
