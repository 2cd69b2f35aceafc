use apply_copilot::browser::session::{BrowserSession, DriverRequest, parse_response};
use apply_copilot::dom::dom_model::NodeId;
use apply_copilot::dom::host::{FillMarker, HostError, PageHost};
use apply_copilot::dom::selector::SelectorHint;
use serde_json::json;

// ============================================================================
// Wire format
// ============================================================================

#[test]
fn requests_are_tagged_by_cmd() {
    let commit = DriverRequest::Commit {
        node: NodeId(7),
        value: "Ada".into(),
    };
    assert_eq!(
        serde_json::to_value(&commit).unwrap(),
        json!({ "cmd": "commit", "node": 7, "value": "Ada" })
    );

    let resolve = DriverRequest::Resolve {
        selector: SelectorHint::Name("phone".into()),
    };
    assert_eq!(
        serde_json::to_value(&resolve).unwrap(),
        json!({ "cmd": "resolve", "selector": "[name=\"phone\"]" })
    );

    let mark = DriverRequest::Mark {
        node: NodeId(3),
        marker: FillMarker::NeedsReview,
    };
    assert_eq!(
        serde_json::to_value(&mark).unwrap(),
        json!({ "cmd": "mark", "node": 3, "marker": "needs_review" })
    );
    assert_eq!(
        serde_json::to_value(&DriverRequest::ClearMarks { node: NodeId(3) }).unwrap(),
        json!({ "cmd": "clear_marks", "node": 3 })
    );
    assert_eq!(DriverRequest::Snapshot.name(), "snapshot");
}

#[test]
fn responses_tolerate_missing_fields() {
    let r = parse_response("{\"ok\":true}\n", "test").unwrap();
    assert!(r.ok);
    assert!(r.node.is_none() && r.value.is_none() && r.data.is_none());

    let r = parse_response("{\"ok\":true,\"node\":4,\"value\":\"x\"}", "test").unwrap();
    assert_eq!(r.node, Some(NodeId(4)));
    assert_eq!(r.value.as_deref(), Some("x"));

    assert!(matches!(
        parse_response("not json", "test"),
        Err(HostError::Json { .. })
    ));
}

#[test]
fn launch_fails_for_missing_driver() {
    let result = BrowserSession::launch("/nonexistent/apply-copilot-driver", "driver.js");
    assert!(matches!(result, Err(HostError::DriverSpawn { .. })));
}

// ============================================================================
// Session against a scripted driver
// ============================================================================

#[cfg(unix)]
const FAKE_DRIVER: &str = r#"
echo '{"ok":true,"ready":true}'
while IFS= read -r line; do
  case "$line" in
    *'"cmd":"navigate"'*) echo '{"ok":true}' ;;
    *'"cmd":"snapshot"'*) echo '{"ok":true,"data":{"url":"https://acme.myworkdayjobs.com/job","title":"Engineer","body":{"tag":"body","children":[{"tag":"input","attrs":{"id":"first"}}]}}}' ;;
    *'"cmd":"resolve"'*) echo '{"ok":true,"node":1}' ;;
    *'"cmd":"read_value"'*) echo '{"ok":true,"value":"Ada"}' ;;
    *'"cmd":"commit"'*) echo '{"ok":true}' ;;
    *'"cmd":"mark"'*) echo '{"ok":false,"error":"element detached"}' ;;
    *'"cmd":"quit"'*) echo '{"ok":true}'; exit 0 ;;
    *) echo '{"ok":false,"error":"unknown command"}' ;;
  esac
done
"#;

#[cfg(unix)]
#[test]
fn session_speaks_the_driver_protocol() {
    let dir = tempfile::tempdir().unwrap();
    let script = dir.path().join("driver.sh");
    std::fs::write(&script, FAKE_DRIVER).unwrap();

    let mut session = BrowserSession::launch("sh", script.to_str().unwrap()).unwrap();
    session.navigate("https://acme.myworkdayjobs.com/job").unwrap();

    let page = session.snapshot().unwrap();
    assert_eq!(page.url, "https://acme.myworkdayjobs.com/job");
    assert_eq!(page.find_by_html_id("first"), Some(NodeId(1)));

    assert_eq!(
        session.resolve(&SelectorHint::Id("first".into())).unwrap(),
        Some(NodeId(1))
    );
    assert_eq!(session.read_value(NodeId(1)).unwrap(), "Ada");
    session.commit_value(NodeId(1), "Grace").unwrap();

    let err = session.set_marker(NodeId(1), FillMarker::Filled).unwrap_err();
    assert!(matches!(
        err,
        HostError::DriverProtocol { ref command, ref error } if command == "mark" && error == "element detached"
    ));

    session.quit().unwrap();
}
