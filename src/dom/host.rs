use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::dom::dom_model::{NodeId, PageSnapshot};
use crate::dom::selector::SelectorHint;

// ============================================================================
// Host boundary
// ============================================================================

/// Visual marker left on a field after a fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FillMarker {
    Filled,
    NeedsReview,
}

impl FillMarker {
    pub const ALL: [FillMarker; 2] = [FillMarker::Filled, FillMarker::NeedsReview];

    pub fn class_name(self) -> &'static str {
        match self {
            FillMarker::Filled => "copilot-filled",
            FillMarker::NeedsReview => "copilot-review",
        }
    }
}

#[derive(Debug, Error)]
pub enum HostError {
    #[error("failed to spawn page driver {script}: {source}")]
    DriverSpawn {
        script: String,
        #[source]
        source: std::io::Error,
    },

    #[error("page driver I/O: {0}")]
    DriverIo(String),

    #[error("page driver rejected '{command}': {error}")]
    DriverProtocol { command: String, error: String },

    #[error("malformed driver message ({context}): {source}")]
    Json {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("no element for node {0:?}")]
    UnknownNode(NodeId),
}

/// The environment a fill runs against.
///
/// Everything above this trait is pure and operates on `PageSnapshot`s and
/// `NodeId`s; everything below it touches a real (or simulated) document.
pub trait PageHost {
    /// Enumerate the document once. Node ids stay valid until the next call.
    fn snapshot(&mut self) -> Result<PageSnapshot, HostError>;

    /// Locate an element in the document as it is now.
    fn resolve(&mut self, hint: &SelectorHint) -> Result<Option<NodeId>, HostError>;

    fn read_value(&mut self, node: NodeId) -> Result<String, HostError>;

    /// Write `value` so that any listener bound to the field observes it:
    /// input/change/blur notifications plus a re-assert through the native
    /// value setter, for frameworks that cache the previous value.
    fn commit_value(&mut self, node: NodeId, value: &str) -> Result<(), HostError>;

    fn set_marker(&mut self, node: NodeId, marker: FillMarker) -> Result<(), HostError>;

    fn clear_markers(&mut self, node: NodeId) -> Result<(), HostError>;
}

// ============================================================================
// MemoryPage: in-process document, used by file-backed runs and tests
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Input,
    Change,
    Blur,
}

/// What a listener bound to a field would have observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub node: NodeId,
    pub kind: NotificationKind,
    pub value: String,
}

#[derive(Debug, Clone)]
pub struct MemoryPage {
    page: PageSnapshot,
    notifications: Vec<Notification>,
    /// Values a framework would have cached on its side, keyed by node.
    framework_state: BTreeMap<NodeId, String>,
}

impl MemoryPage {
    pub fn new(page: PageSnapshot) -> Self {
        Self {
            page,
            notifications: Vec::new(),
            framework_state: BTreeMap::new(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let page: PageSnapshot = serde_json::from_str(json)?;
        Ok(Self::new(page))
    }

    pub fn page(&self) -> &PageSnapshot {
        &self.page
    }

    pub fn into_page(self) -> PageSnapshot {
        self.page
    }

    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    /// Last value seen by listeners on `node`, if any commit happened.
    pub fn observed_value(&self, node: NodeId) -> Option<&str> {
        self.framework_state.get(&node).map(String::as_str)
    }

    pub fn markers(&self, node: NodeId) -> Vec<FillMarker> {
        let classes = self
            .page
            .element(node)
            .and_then(|el| el.attr("class"))
            .unwrap_or_default();
        FillMarker::ALL
            .into_iter()
            .filter(|m| classes.split_whitespace().any(|c| c == m.class_name()))
            .collect()
    }

    /// Simulate an out-of-band DOM mutation (e.g. a framework re-render).
    pub fn page_mut(&mut self) -> &mut PageSnapshot {
        &mut self.page
    }

    fn notify(&mut self, node: NodeId, kind: NotificationKind) {
        let value = self.page.value(node);
        self.framework_state.insert(node, value.clone());
        self.notifications.push(Notification { node, kind, value });
    }

    fn edit_classes(&mut self, node: NodeId, edit: impl FnOnce(&mut Vec<String>)) -> Result<(), HostError> {
        let el = self
            .page
            .element_mut(node)
            .ok_or(HostError::UnknownNode(node))?;
        let mut classes: Vec<String> = el
            .attr("class")
            .unwrap_or_default()
            .split_whitespace()
            .map(str::to_string)
            .collect();
        edit(&mut classes);
        if classes.is_empty() {
            el.attrs.remove("class");
        } else {
            el.attrs.insert("class".into(), classes.join(" "));
        }
        Ok(())
    }
}

impl PageHost for MemoryPage {
    fn snapshot(&mut self) -> Result<PageSnapshot, HostError> {
        Ok(self.page.clone())
    }

    fn resolve(&mut self, hint: &SelectorHint) -> Result<Option<NodeId>, HostError> {
        Ok(hint.resolve(&self.page))
    }

    fn read_value(&mut self, node: NodeId) -> Result<String, HostError> {
        if self.page.element(node).is_none() {
            return Err(HostError::UnknownNode(node));
        }
        Ok(self.page.value(node))
    }

    fn commit_value(&mut self, node: NodeId, value: &str) -> Result<(), HostError> {
        if !self.page.set_value(node, value) {
            return Err(HostError::UnknownNode(node));
        }
        self.notify(node, NotificationKind::Input);
        self.notify(node, NotificationKind::Change);
        self.notify(node, NotificationKind::Blur);
        // native setter re-assert
        self.notify(node, NotificationKind::Input);
        Ok(())
    }

    fn set_marker(&mut self, node: NodeId, marker: FillMarker) -> Result<(), HostError> {
        self.edit_classes(node, |classes| {
            let name = marker.class_name();
            if !classes.iter().any(|c| c == name) {
                classes.push(name.to_string());
            }
        })
    }

    fn clear_markers(&mut self, node: NodeId) -> Result<(), HostError> {
        self.edit_classes(node, |classes| {
            classes.retain(|c| FillMarker::ALL.iter().all(|m| m.class_name() != c));
        })
    }
}
