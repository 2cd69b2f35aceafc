use serde::{Deserialize, Serialize};
use url::Url;

use crate::dom::dom_model::PageSnapshot;

pub const UNKNOWN_COMPANY: &str = "Unknown Company";
pub const DEFAULT_ROLE: &str = "Job Application";
pub const WORKDAY_DOMAIN: &str = "myworkdayjobs.com";

const CONFIRMATION_URL_PATTERNS: &[&str] = &[
    "/confirmation",
    "/applied",
    "/thankyou",
    "/thank-you",
    "/success",
];

const CONFIRMATION_TEXT_PATTERNS: &[&str] = &[
    "thank you for applying",
    "application submitted",
    "application received",
    "successfully submitted",
    "we received your application",
    "thanks for your interest",
    "application complete",
];

/// What the controlling surface needs to know about the current page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageContext {
    pub url: String,
    pub title: String,
    pub company: String,
    pub role: String,
    pub is_workday: bool,
    pub is_confirmation_page: bool,
}

pub fn detect_page_context(page: &PageSnapshot) -> PageContext {
    PageContext {
        url: page.url.clone(),
        title: page.title.clone(),
        company: company_from_url(&page.url),
        role: role_from_title(&page.title),
        is_workday: is_workday_url(&page.url),
        is_confirmation_page: is_confirmation_page(page),
    }
}

fn host_of(url: &str) -> Option<String> {
    Url::parse(url).ok()?.host_str().map(str::to_string)
}

/// `acme.myworkdayjobs.com` -> `Acme`.
pub fn company_from_url(url: &str) -> String {
    let Some(host) = host_of(url) else {
        return UNKNOWN_COMPANY.to_string();
    };
    let Some((tenant, rest)) = host.split_once('.') else {
        return UNKNOWN_COMPANY.to_string();
    };
    if tenant.is_empty() || !rest.starts_with(WORKDAY_DOMAIN) {
        return UNKNOWN_COMPANY.to_string();
    }

    let mut chars = tenant.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => UNKNOWN_COMPANY.to_string(),
    }
}

/// Title segment before the first `-` or `|`.
pub fn role_from_title(title: &str) -> String {
    let role = title.split(['-', '|']).next().unwrap_or_default().trim();
    if role.is_empty() {
        DEFAULT_ROLE.to_string()
    } else {
        role.to_string()
    }
}

pub fn is_workday_url(url: &str) -> bool {
    host_of(url).is_some_and(|h| h == WORKDAY_DOMAIN || h.ends_with(&format!(".{}", WORKDAY_DOMAIN)))
}

/// Host name used as the portal domain of a history entry.
pub fn portal_domain(url: &str) -> String {
    host_of(url).unwrap_or_default()
}

pub fn is_confirmation_page(page: &PageSnapshot) -> bool {
    let url = page.url.to_lowercase();
    if CONFIRMATION_URL_PATTERNS.iter().any(|p| url.contains(p)) {
        return true;
    }

    let body = page.body_text().to_lowercase();
    CONFIRMATION_TEXT_PATTERNS.iter().any(|p| body.contains(p))
}
