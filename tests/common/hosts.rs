use apply_copilot::dom::dom_model::{NodeId, PageSnapshot};
use apply_copilot::dom::host::{FillMarker, HostError, MemoryPage, PageHost};
use apply_copilot::dom::selector::SelectorHint;

/// A `MemoryPage` whose driver starts failing on demand, the way a live
/// page does when a framework re-renders and detaches an element.
pub struct FlakyPage {
    pub inner: MemoryPage,
    commits: usize,
    /// 1-based commit that fails; later commits fail too.
    pub fail_commit_from: Option<usize>,
    /// Hints whose `resolve` returns an error instead of a node.
    pub broken_hints: Vec<SelectorHint>,
    pub fail_markers: bool,
}

impl FlakyPage {
    pub fn new(inner: MemoryPage) -> Self {
        Self {
            inner,
            commits: 0,
            fail_commit_from: None,
            broken_hints: vec![],
            fail_markers: false,
        }
    }

    pub fn failing_commit(mut self, n: usize) -> Self {
        self.fail_commit_from = Some(n);
        self
    }

    pub fn breaking(mut self, hint: SelectorHint) -> Self {
        self.broken_hints.push(hint);
        self
    }
}

impl PageHost for FlakyPage {
    fn snapshot(&mut self) -> Result<PageSnapshot, HostError> {
        self.inner.snapshot()
    }

    fn resolve(&mut self, hint: &SelectorHint) -> Result<Option<NodeId>, HostError> {
        if self.broken_hints.contains(hint) {
            return Err(HostError::DriverProtocol {
                command: "resolve".into(),
                error: "execution context was destroyed".into(),
            });
        }
        self.inner.resolve(hint)
    }

    fn read_value(&mut self, node: NodeId) -> Result<String, HostError> {
        self.inner.read_value(node)
    }

    fn commit_value(&mut self, node: NodeId, value: &str) -> Result<(), HostError> {
        self.commits += 1;
        if self.fail_commit_from.is_some_and(|n| self.commits >= n) {
            return Err(HostError::DriverIo("element detached".into()));
        }
        self.inner.commit_value(node, value)
    }

    fn set_marker(&mut self, node: NodeId, marker: FillMarker) -> Result<(), HostError> {
        if self.fail_markers {
            return Err(HostError::DriverProtocol {
                command: "mark".into(),
                error: "element detached".into(),
            });
        }
        self.inner.set_marker(node, marker)
    }

    fn clear_markers(&mut self, node: NodeId) -> Result<(), HostError> {
        self.inner.clear_markers(node)
    }
}
