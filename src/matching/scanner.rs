use crate::dom::dom_model::{ElementData, NodeId, PageSnapshot};
use crate::dom::selector::SelectorHint;
use crate::matching::field_model::{FieldKind, ScannedField};

// ============================================================================
// Field Scanner
// ============================================================================

/// Every eligible fill target in `page`, in document order.
///
/// Eligible: free-text inputs (`text`, `email`, `tel`, `url`, untyped),
/// `select` and `textarea` that are enabled, writable and visible.
pub fn scan_form_fields(page: &PageSnapshot) -> Vec<ScannedField> {
    page.form_controls()
        .into_iter()
        .filter_map(|node| scan_field(page, node))
        .collect()
}

fn scan_field(page: &PageSnapshot, node: NodeId) -> Option<ScannedField> {
    let el = page.element(node)?;
    let kind = field_kind(el)?;

    // browsers ignore readonly on <select>
    let read_only = kind != FieldKind::Select && el.has_attr("readonly");
    if el.has_attr("disabled") || read_only || !is_visible(page, node) {
        return None;
    }

    let attr = |name: &str| el.attr(name).unwrap_or_default().to_string();
    let placeholder = match kind {
        FieldKind::Select => String::new(),
        _ => attr("placeholder"),
    };
    let options = match kind {
        FieldKind::Select => page.options(node),
        _ => vec![],
    };

    Some(ScannedField {
        node,
        selector: SelectorHint::for_element(page, node),
        label_text: find_label_text(page, node),
        aria_label: attr("aria-label"),
        name: attr("name"),
        id: attr("id"),
        placeholder,
        kind,
        current_value: page.value(node),
        options,
    })
}

fn field_kind(el: &ElementData) -> Option<FieldKind> {
    match el.tag.as_str() {
        "select" => Some(FieldKind::Select),
        "textarea" => Some(FieldKind::Textarea),
        "input" => FieldKind::from_input_type(el.attr("type")),
        _ => None,
    }
}

/// Not `display:none`, not `visibility:hidden`, non-zero opacity, and has a
/// layout box. A `display:none` ancestor removes the layout box.
pub fn is_visible(page: &PageSnapshot, node: NodeId) -> bool {
    let Some(el) = page.element(node) else {
        return false;
    };
    let style = &el.style;
    if style.display.as_deref() == Some("none")
        || style.visibility.as_deref() == Some("hidden")
        || style.opacity == Some(0.0)
        || !el.has_layout_box
    {
        return false;
    }

    page.ancestors(node).all(|a| {
        page.element(a)
            .is_none_or(|p| p.style.display.as_deref() != Some("none"))
    })
}

// ============================================================================
// Label resolution
// ============================================================================

/// Best-effort human-readable label. Stages, first hit wins:
/// 1. `label[for=id]`
/// 2. ancestor `label`, without its controls' text
/// 3. `aria-labelledby` target
/// 4. preceding `label`/`span`/`div` sibling of the field or its parent
/// 5. `data-automation-id` / `data-uxi-widget-type`
///
/// A stage that finds its element wins even when that element's text is
/// empty.
pub fn find_label_text(page: &PageSnapshot, node: NodeId) -> String {
    let Some(el) = page.element(node) else {
        return String::new();
    };

    if let Some(id) = el.attr("id").filter(|v| !v.is_empty()) {
        if let Some(label) = page.find_label_for(id) {
            return page.text_content(label).trim().to_string();
        }
    }

    if let Some(label) = page.closest(node, "label") {
        return page.text_content_without_controls(label).trim().to_string();
    }

    if let Some(labelled_by) = el.attr("aria-labelledby").filter(|v| !v.is_empty()) {
        if let Some(target) = page.find_by_html_id(labelled_by) {
            return page.text_content(target).trim().to_string();
        }
    }

    let prev = page
        .previous_element_sibling(node)
        .or_else(|| page.parent(node).and_then(|p| page.previous_element_sibling(p)));
    if let Some(prev) = prev {
        let is_text_container = page
            .element(prev)
            .is_some_and(|p| matches!(p.tag.as_str(), "label" | "span" | "div"));
        if is_text_container {
            return page.text_content(prev).trim().to_string();
        }
    }

    el.attr("data-automation-id")
        .filter(|v| !v.is_empty())
        .or_else(|| el.attr("data-uxi-widget-type"))
        .unwrap_or_default()
        .to_string()
}
