use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::dom::dom_model::{NodeId, PageSnapshot};

/// A string-serializable locator that can re-find a form element later,
/// typically for undo. Round-trips through its CSS-like string form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum SelectorHint {
    /// `#id`
    Id(String),
    /// `[name="..."]`
    Name(String),
    /// `[data-automation-id="..."]`
    AutomationId(String),
    /// `a > b:nth-of-type(2) > input`
    Path(Vec<PathStep>),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathStep {
    Id(String),
    Tag {
        tag: String,
        nth_of_type: Option<usize>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unparseable selector hint: {0:?}")]
pub struct SelectorParseError(pub String);

// ============================================================================
// Generation
// ============================================================================

impl SelectorHint {
    /// Build the most specific hint available for `node`.
    pub fn for_element(page: &PageSnapshot, node: NodeId) -> SelectorHint {
        if let Some(el) = page.element(node) {
            if let Some(id) = el.attr("id").filter(|v| !v.is_empty()) {
                return SelectorHint::Id(id.to_string());
            }
            if let Some(name) = el.attr("name").filter(|v| !v.is_empty()) {
                return SelectorHint::Name(name.to_string());
            }
            if let Some(auto) = el.attr("data-automation-id").filter(|v| !v.is_empty()) {
                return SelectorHint::AutomationId(auto.to_string());
            }
        }
        SelectorHint::Path(path_to(page, node))
    }

    /// Re-locate the element this hint names. First match in document order.
    pub fn resolve(&self, page: &PageSnapshot) -> Option<NodeId> {
        match self {
            SelectorHint::Id(id) => page.find_by_html_id(id),
            SelectorHint::Name(name) => find_by_attr(page, "name", name),
            SelectorHint::AutomationId(auto) => find_by_attr(page, "data-automation-id", auto),
            SelectorHint::Path(steps) => page
                .elements()
                .find(|n| matches_path(page, *n, steps)),
        }
    }
}

fn find_by_attr(page: &PageSnapshot, attr: &str, value: &str) -> Option<NodeId> {
    page.elements()
        .find(|n| page.element(*n).and_then(|el| el.attr(attr)) == Some(value))
}

fn path_to(page: &PageSnapshot, node: NodeId) -> Vec<PathStep> {
    let mut steps = Vec::new();
    let mut current = Some(node);

    while let Some(id) = current {
        let Some(el) = page.element(id) else {
            break;
        };
        if el.tag == "body" || el.tag == "html" {
            break;
        }
        if let Some(html_id) = el.attr("id").filter(|v| !v.is_empty()) {
            steps.push(PathStep::Id(html_id.to_string()));
            break;
        }

        let parent = page.parent(id);
        let nth_of_type = parent.and_then(|p| {
            let same_tag: Vec<NodeId> = page
                .element_children(p)
                .into_iter()
                .filter(|s| page.element(*s).is_some_and(|e| e.tag == el.tag))
                .collect();
            if same_tag.len() > 1 {
                same_tag.iter().position(|s| *s == id).map(|i| i + 1)
            } else {
                None
            }
        });

        steps.push(PathStep::Tag {
            tag: el.tag.clone(),
            nth_of_type,
        });
        current = parent;
    }

    steps.reverse();
    steps
}

// ============================================================================
// Resolution (child-combinator semantics, rightmost step first)
// ============================================================================

fn matches_path(page: &PageSnapshot, node: NodeId, steps: &[PathStep]) -> bool {
    let Some((last, rest)) = steps.split_last() else {
        return false;
    };
    if !matches_step(page, node, last) {
        return false;
    }
    if rest.is_empty() {
        return true;
    }
    match page.parent(node) {
        Some(parent) => matches_path(page, parent, rest),
        None => false,
    }
}

fn matches_step(page: &PageSnapshot, node: NodeId, step: &PathStep) -> bool {
    let Some(el) = page.element(node) else {
        return false;
    };
    match step {
        PathStep::Id(id) => el.attr("id") == Some(id.as_str()),
        PathStep::Tag { tag, nth_of_type } => {
            if &el.tag != tag {
                return false;
            }
            match (nth_of_type, page.parent(node)) {
                (None, _) => true,
                (Some(n), Some(parent)) => page
                    .element_children(parent)
                    .into_iter()
                    .filter(|s| page.element(*s).is_some_and(|e| &e.tag == tag))
                    .position(|s| s == node)
                    .is_some_and(|i| i + 1 == *n),
                (Some(n), None) => *n == 1,
            }
        }
    }
}

// ============================================================================
// String form
// ============================================================================

impl fmt::Display for PathStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathStep::Id(id) => write!(f, "#{}", escape_id(id)),
            PathStep::Tag {
                tag,
                nth_of_type: Some(n),
            } => write!(f, "{}:nth-of-type({})", tag, n),
            PathStep::Tag {
                tag,
                nth_of_type: None,
            } => write!(f, "{}", tag),
        }
    }
}

impl fmt::Display for SelectorHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectorHint::Id(id) => write!(f, "#{}", escape_id(id)),
            SelectorHint::Name(name) => write!(f, "[name=\"{}\"]", name),
            SelectorHint::AutomationId(auto) => write!(f, "[data-automation-id=\"{}\"]", auto),
            SelectorHint::Path(steps) => {
                let parts: Vec<String> = steps.iter().map(ToString::to_string).collect();
                write!(f, "{}", parts.join(" > "))
            }
        }
    }
}

/// Backslash-escape whitespace, `>` and `\` so an id never contains the
/// ` > ` step separator.
fn escape_id(id: &str) -> String {
    let mut out = String::with_capacity(id.len());
    for c in id.chars() {
        if c.is_whitespace() || c == '>' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn unescape_id(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => out.extend(chars.next()),
            _ => out.push(c),
        }
    }
    out
}

fn attr_selector<'a>(s: &'a str, attr: &str) -> Option<&'a str> {
    s.strip_prefix('[')?
        .strip_prefix(attr)?
        .strip_prefix("=\"")?
        .strip_suffix("\"]")
}

fn parse_step(s: &str) -> Result<PathStep, SelectorParseError> {
    let err = || SelectorParseError(s.to_string());
    if let Some(id) = s.strip_prefix('#') {
        if id.is_empty() {
            return Err(err());
        }
        return Ok(PathStep::Id(unescape_id(id)));
    }
    if let Some((tag, rest)) = s.split_once(":nth-of-type(") {
        let n = rest
            .strip_suffix(')')
            .and_then(|n| n.parse::<usize>().ok())
            .ok_or_else(err)?;
        return Ok(PathStep::Tag {
            tag: tag.to_string(),
            nth_of_type: Some(n),
        });
    }
    if s.is_empty() || !s.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return Err(err());
    }
    Ok(PathStep::Tag {
        tag: s.to_string(),
        nth_of_type: None,
    })
}

impl FromStr for SelectorHint {
    type Err = SelectorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim_start();
        if let Some(name) = attr_selector(s, "name") {
            return Ok(SelectorHint::Name(name.to_string()));
        }
        if let Some(auto) = attr_selector(s, "data-automation-id") {
            return Ok(SelectorHint::AutomationId(auto.to_string()));
        }
        if !s.contains(" > ") {
            if let Some(id) = s.strip_prefix('#').filter(|id| !id.is_empty()) {
                return Ok(SelectorHint::Id(unescape_id(id)));
            }
        }
        let steps = s
            .split(" > ")
            .map(parse_step)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(SelectorHint::Path(steps))
    }
}

impl TryFrom<String> for SelectorHint {
    type Error = SelectorParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SelectorHint> for String {
    fn from(hint: SelectorHint) -> Self {
        hint.to_string()
    }
}
