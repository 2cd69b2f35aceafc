use apply_copilot::dom::dom_model::{NodeId, PageSnapshot};
use apply_copilot::dom::host::MemoryPage;
use serde_json::{Value, json};

use super::utils::fixture;

pub const FORM_URL: &str = "https://acme.myworkdayjobs.com/en-US/careers/job/Senior-Engineer/apply";

/// The full application form in `tests/fixtures/application_form.json`.
pub fn application_page() -> MemoryPage {
    MemoryPage::from_json(&fixture("application_form.json")).unwrap()
}

/// A page whose `body` holds `children`.
pub fn page_with(children: Value) -> PageSnapshot {
    page_at("https://jobs.example.com/apply", "Apply", children)
}

pub fn page_at(url: &str, title: &str, children: Value) -> PageSnapshot {
    serde_json::from_value(json!({
        "url": url,
        "title": title,
        "body": { "tag": "body", "children": children }
    }))
    .unwrap()
}

pub fn text(s: &str) -> Value {
    json!({ "text": s })
}

pub fn label_for(id: &str, label: &str) -> Value {
    json!({ "tag": "label", "attrs": { "for": id }, "children": [text(label)] })
}

pub fn input(attrs: Value) -> Value {
    json!({ "tag": "input", "attrs": attrs })
}

pub fn select(attrs: Value, options: &[(&str, &str)]) -> Value {
    let children: Vec<Value> = options
        .iter()
        .map(|(value, label)| {
            json!({ "tag": "option", "attrs": { "value": value }, "children": [text(label)] })
        })
        .collect();
    json!({ "tag": "select", "attrs": attrs, "children": children })
}

/// Node carrying `id="<html_id>"`.
pub fn node(page: &PageSnapshot, html_id: &str) -> NodeId {
    page.find_by_html_id(html_id)
        .unwrap_or_else(|| panic!("no element with id {}", html_id))
}
