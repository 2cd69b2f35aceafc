use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// ============================================================================
// Page description as exchanged with page drivers and fixture files
// ============================================================================

/// Nested page description: one object per element, `{ "text": ... }` for
/// text nodes. Drivers emit this shape; `PageSnapshot` flattens it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawPage {
    pub url: String,
    #[serde(default)]
    pub title: String,
    pub body: RawNode,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawNode {
    Element {
        tag: String,
        #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
        attrs: BTreeMap<String, String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<String>,
        #[serde(default, skip_serializing_if = "ComputedStyle::is_default")]
        style: ComputedStyle,
        #[serde(rename = "hasLayoutBox", default = "default_true", skip_serializing_if = "is_true")]
        has_layout_box: bool,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        children: Vec<RawNode>,
    },
    Text {
        text: String,
    },
}

/// The subset of computed style that decides visibility.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComputedStyle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f32>,
}

impl ComputedStyle {
    fn is_default(&self) -> bool {
        self == &ComputedStyle::default()
    }
}

fn default_true() -> bool {
    true
}

fn is_true(b: &bool) -> bool {
    *b
}

// ============================================================================
// Flattened arena
// ============================================================================

/// Opaque handle to a node: its pre-order position in the page description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub usize);

#[derive(Debug, Clone, PartialEq)]
pub struct ElementData {
    /// Lowercased tag name.
    pub tag: String,
    pub attrs: BTreeMap<String, String>,
    /// Live value of a form control, when it differs from markup.
    pub value: Option<String>,
    pub style: ComputedStyle,
    pub has_layout_box: bool,
}

impl ElementData {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attrs.contains_key(name)
    }

    pub fn is_form_control(&self) -> bool {
        matches!(self.tag.as_str(), "input" | "select" | "textarea")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Element(ElementData),
    Text(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct DomNode {
    pub kind: NodeKind,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

/// One `<option>` of a selection list, in document order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    pub value: String,
    pub text: String,
}

/// A read-only capture of a document, taken once per operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawPage", into = "RawPage")]
pub struct PageSnapshot {
    pub url: String,
    pub title: String,
    nodes: Vec<DomNode>,
}

impl From<RawPage> for PageSnapshot {
    fn from(raw: RawPage) -> Self {
        let mut nodes = Vec::new();
        flatten(raw.body, None, &mut nodes);
        PageSnapshot {
            url: raw.url,
            title: raw.title,
            nodes,
        }
    }
}

fn flatten(raw: RawNode, parent: Option<NodeId>, nodes: &mut Vec<DomNode>) -> NodeId {
    let id = NodeId(nodes.len());
    match raw {
        RawNode::Text { text } => {
            nodes.push(DomNode {
                kind: NodeKind::Text(text),
                parent,
                children: vec![],
            });
        }
        RawNode::Element {
            tag,
            attrs,
            value,
            style,
            has_layout_box,
            children,
        } => {
            nodes.push(DomNode {
                kind: NodeKind::Element(ElementData {
                    tag: tag.to_lowercase(),
                    attrs,
                    value,
                    style,
                    has_layout_box,
                }),
                parent,
                children: vec![],
            });
            for child in children {
                let child_id = flatten(child, Some(id), nodes);
                nodes[id.0].children.push(child_id);
            }
        }
    }
    id
}

impl From<PageSnapshot> for RawPage {
    fn from(page: PageSnapshot) -> Self {
        let body = page.to_raw(NodeId(0));
        RawPage {
            url: page.url,
            title: page.title,
            body,
        }
    }
}

impl PageSnapshot {
    fn to_raw(&self, id: NodeId) -> RawNode {
        let node = &self.nodes[id.0];
        match &node.kind {
            NodeKind::Text(text) => RawNode::Text { text: text.clone() },
            NodeKind::Element(el) => RawNode::Element {
                tag: el.tag.clone(),
                attrs: el.attrs.clone(),
                value: el.value.clone(),
                style: el.style.clone(),
                has_layout_box: el.has_layout_box,
                children: node.children.iter().map(|c| self.to_raw(*c)).collect(),
            },
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn node(&self, id: NodeId) -> Option<&DomNode> {
        self.nodes.get(id.0)
    }

    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        match &self.nodes.get(id.0)?.kind {
            NodeKind::Element(el) => Some(el),
            NodeKind::Text(_) => None,
        }
    }

    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        match &mut self.nodes.get_mut(id.0)?.kind {
            NodeKind::Element(el) => Some(el),
            NodeKind::Text(_) => None,
        }
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id.0)?.parent
    }

    /// Element ids in document order.
    pub fn elements(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| matches!(n.kind, NodeKind::Element(_)))
            .map(|(i, _)| NodeId(i))
    }

    /// Every `input`, `select` and `textarea` in document order.
    pub fn form_controls(&self) -> Vec<NodeId> {
        self.elements()
            .filter(|id| self.element(*id).is_some_and(ElementData::is_form_control))
            .collect()
    }

    /// Parent chain, nearest first, excluding `id` itself.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |p| self.parent(*p))
    }

    /// Nearest element (inclusive) with the given tag.
    pub fn closest(&self, id: NodeId, tag: &str) -> Option<NodeId> {
        std::iter::once(id)
            .chain(self.ancestors(id))
            .find(|n| self.element(*n).is_some_and(|el| el.tag == tag))
    }

    pub fn element_children(&self, id: NodeId) -> Vec<NodeId> {
        self.nodes
            .get(id.0)
            .map(|n| {
                n.children
                    .iter()
                    .copied()
                    .filter(|c| self.element(*c).is_some())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn previous_element_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let siblings = self.element_children(parent);
        let pos = siblings.iter().position(|s| *s == id)?;
        pos.checked_sub(1).map(|p| siblings[p])
    }

    pub fn find_by_html_id(&self, html_id: &str) -> Option<NodeId> {
        self.elements()
            .find(|n| self.element(*n).and_then(|el| el.attr("id")) == Some(html_id))
    }

    /// `label[for="<html_id>"]`, first in document order.
    pub fn find_label_for(&self, html_id: &str) -> Option<NodeId> {
        self.elements().find(|n| {
            self.element(*n)
                .is_some_and(|el| el.tag == "label" && el.attr("for") == Some(html_id))
        })
    }

    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, false, &mut out);
        out
    }

    /// Text content with every form-control subtree removed.
    pub fn text_content_without_controls(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, true, &mut out);
        out
    }

    fn collect_text(&self, id: NodeId, skip_controls: bool, out: &mut String) {
        let Some(node) = self.nodes.get(id.0) else {
            return;
        };
        match &node.kind {
            NodeKind::Text(text) => out.push_str(text),
            NodeKind::Element(el) => {
                if skip_controls && el.is_form_control() {
                    return;
                }
                for child in &node.children {
                    self.collect_text(*child, skip_controls, out);
                }
            }
        }
    }

    pub fn body_text(&self) -> String {
        self.text_content(self.root())
    }

    pub fn options(&self, id: NodeId) -> Vec<SelectOption> {
        let Some(node) = self.nodes.get(id.0) else {
            return vec![];
        };
        let mut options = Vec::new();
        let mut stack: Vec<NodeId> = node.children.iter().rev().copied().collect();
        while let Some(child) = stack.pop() {
            let Some(el) = self.element(child) else {
                continue;
            };
            if el.tag == "option" {
                let text = self.text_content(child);
                let value = el
                    .attr("value")
                    .map(str::to_string)
                    .unwrap_or_else(|| text.trim().to_string());
                options.push(SelectOption { value, text });
            } else if el.tag == "optgroup" {
                stack.extend(self.nodes[child.0].children.iter().rev().copied());
            }
        }
        options
    }

    /// Current value of a form control, as a browser would report it.
    pub fn value(&self, id: NodeId) -> String {
        let Some(el) = self.element(id) else {
            return String::new();
        };
        if let Some(v) = &el.value {
            return v.clone();
        }
        match el.tag.as_str() {
            "select" => {
                let selected = self
                    .nodes[id.0]
                    .children
                    .iter()
                    .find(|c| {
                        self.element(**c)
                            .is_some_and(|o| o.tag == "option" && o.has_attr("selected"))
                    })
                    .map(|c| self.options_value(*c));
                selected
                    .or_else(|| self.options(id).first().map(|o| o.value.clone()))
                    .unwrap_or_default()
            }
            "textarea" => self.text_content(id),
            _ => el.attr("value").unwrap_or_default().to_string(),
        }
    }

    fn options_value(&self, option: NodeId) -> String {
        self.element(option)
            .and_then(|o| o.attr("value").map(str::to_string))
            .unwrap_or_else(|| self.text_content(option).trim().to_string())
    }

    pub fn set_value(&mut self, id: NodeId, value: &str) -> bool {
        match self.element_mut(id) {
            Some(el) => {
                el.value = Some(value.to_string());
                true
            }
            None => false,
        }
    }
}
