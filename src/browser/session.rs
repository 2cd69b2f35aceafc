use std::io::{BufRead, BufReader, Write};
use std::process::{Child, Command, Stdio};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::dom::dom_model::{NodeId, PageSnapshot};
use crate::dom::host::{FillMarker, HostError, PageHost};
use crate::dom::selector::SelectorHint;

/// Request sent to the page driver over stdin (one JSON line).
#[derive(Debug, Serialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum DriverRequest {
    Navigate { url: String },
    Snapshot,
    Resolve { selector: SelectorHint },
    ReadValue { node: NodeId },
    Commit { node: NodeId, value: String },
    Mark { node: NodeId, marker: FillMarker },
    ClearMarks { node: NodeId },
    Quit,
}

impl DriverRequest {
    pub fn name(&self) -> &'static str {
        match self {
            DriverRequest::Navigate { .. } => "navigate",
            DriverRequest::Snapshot => "snapshot",
            DriverRequest::Resolve { .. } => "resolve",
            DriverRequest::ReadValue { .. } => "read_value",
            DriverRequest::Commit { .. } => "commit",
            DriverRequest::Mark { .. } => "mark",
            DriverRequest::ClearMarks { .. } => "clear_marks",
            DriverRequest::Quit => "quit",
        }
    }
}

/// Response received from the page driver over stdout (one JSON line).
#[derive(Debug, Deserialize)]
pub struct DriverResponse {
    pub ok: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub node: Option<NodeId>,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub ready: Option<bool>,
}

/// A live page behind a long-running driver process.
///
/// The driver keeps a browser open and answers one JSON line per request.
/// `snapshot` returns the page in `RawPage` form; node ids it hands out
/// are pre-order positions in that snapshot and stay valid until the next
/// `snapshot`. `commit` must fire input/change/blur and re-assert the
/// value through the native setter.
pub struct BrowserSession {
    child: Child,
    stdin: std::process::ChildStdin,
    reader: BufReader<std::process::ChildStdout>,
}

impl BrowserSession {
    /// Spawn `command script` and wait for its ready line.
    pub fn launch(command: &str, script: &str) -> Result<Self, HostError> {
        let mut child = Command::new(command)
            .arg(script)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| HostError::DriverSpawn {
                script: script.to_string(),
                source: e,
            })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| HostError::DriverIo(format!("failed to capture stdin of {}", script)))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| HostError::DriverIo(format!("failed to capture stdout of {}", script)))?;

        let mut reader = BufReader::new(stdout);

        let mut line = String::new();
        reader
            .read_line(&mut line)
            .map_err(|e| HostError::DriverIo(format!("failed to read ready signal: {}", e)))?;

        let response = parse_response(&line, "ready signal")?;
        if !response.ok || response.ready != Some(true) {
            return Err(HostError::DriverProtocol {
                command: "launch".into(),
                error: format!("no ready signal from {}", script),
            });
        }

        Ok(BrowserSession {
            child,
            stdin,
            reader,
        })
    }

    fn send(&mut self, request: &DriverRequest) -> Result<DriverResponse, HostError> {
        let json = serde_json::to_string(request).map_err(|e| HostError::Json {
            context: format!("{} request", request.name()),
            source: e,
        })?;
        debug!(cmd = request.name(), "driver request");

        writeln!(self.stdin, "{}", json)
            .and_then(|_| self.stdin.flush())
            .map_err(|e| HostError::DriverIo(format!("failed to write to driver: {}", e)))?;

        let mut line = String::new();
        self.reader
            .read_line(&mut line)
            .map_err(|e| HostError::DriverIo(format!("failed to read from driver: {}", e)))?;

        if line.trim().is_empty() {
            return Err(HostError::DriverIo(
                "empty response from driver (process may have died)".into(),
            ));
        }

        parse_response(&line, request.name())
    }

    /// Send a request and verify it succeeded.
    fn send_ok(&mut self, request: &DriverRequest) -> Result<DriverResponse, HostError> {
        let response = self.send(request)?;
        if !response.ok {
            return Err(HostError::DriverProtocol {
                command: request.name().into(),
                error: response.error.unwrap_or_else(|| "unknown error".into()),
            });
        }
        Ok(response)
    }

    pub fn navigate(&mut self, url: &str) -> Result<(), HostError> {
        self.send_ok(&DriverRequest::Navigate {
            url: url.to_string(),
        })?;
        Ok(())
    }

    pub fn quit(&mut self) -> Result<(), HostError> {
        // process may already be gone
        let _ = self.send(&DriverRequest::Quit);
        let _ = self.child.wait();
        Ok(())
    }
}

pub fn parse_response(line: &str, context: &str) -> Result<DriverResponse, HostError> {
    serde_json::from_str(line.trim()).map_err(|e| HostError::Json {
        context: format!("driver {}", context),
        source: e,
    })
}

impl PageHost for BrowserSession {
    fn snapshot(&mut self) -> Result<PageSnapshot, HostError> {
        let response = self.send_ok(&DriverRequest::Snapshot)?;
        let data = response.data.ok_or_else(|| HostError::DriverProtocol {
            command: "snapshot".into(),
            error: "no data in snapshot response".into(),
        })?;
        serde_json::from_value(data).map_err(|e| HostError::Json {
            context: "snapshot data".into(),
            source: e,
        })
    }

    fn resolve(&mut self, hint: &SelectorHint) -> Result<Option<NodeId>, HostError> {
        let response = self.send_ok(&DriverRequest::Resolve {
            selector: hint.clone(),
        })?;
        Ok(response.node)
    }

    fn read_value(&mut self, node: NodeId) -> Result<String, HostError> {
        let response = self.send_ok(&DriverRequest::ReadValue { node })?;
        Ok(response.value.unwrap_or_default())
    }

    fn commit_value(&mut self, node: NodeId, value: &str) -> Result<(), HostError> {
        self.send_ok(&DriverRequest::Commit {
            node,
            value: value.to_string(),
        })?;
        Ok(())
    }

    fn set_marker(&mut self, node: NodeId, marker: FillMarker) -> Result<(), HostError> {
        self.send_ok(&DriverRequest::Mark { node, marker })?;
        Ok(())
    }

    fn clear_markers(&mut self, node: NodeId) -> Result<(), HostError> {
        self.send_ok(&DriverRequest::ClearMarks { node })?;
        Ok(())
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        let _ = self.quit();
    }
}
