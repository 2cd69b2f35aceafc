use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::warn;

use crate::trace::trace::FillTraceEvent;

/// Appends `FillTraceEvent`s to a JSONL file. Never fails the caller:
/// open and write errors are reported through `tracing` and dropped.
pub struct TraceLogger {
    sink: Option<(PathBuf, Mutex<File>)>,
}

impl TraceLogger {
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        match OpenOptions::new().create(true).append(true).open(&path) {
            Ok(file) => Self {
                sink: Some((path, Mutex::new(file))),
            },
            Err(e) => {
                warn!(path = %path.display(), error = %e, "could not open trace file, fill trace disabled");
                Self::disabled()
            }
        }
    }

    pub fn disabled() -> Self {
        Self { sink: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.sink.is_some()
    }

    pub fn log(&self, event: &FillTraceEvent) {
        let Some((path, file)) = &self.sink else {
            return;
        };
        if let Err(e) = append_line(file, event) {
            warn!(path = %path.display(), error = %e, "failed to write trace event");
        }
    }
}

fn append_line(file: &Mutex<File>, event: &FillTraceEvent) -> Result<(), Box<dyn std::error::Error>> {
    let json = serde_json::to_string(event)?;
    let mut file = file.lock().map_err(|e| e.to_string())?;
    writeln!(file, "{}", json)?;
    Ok(())
}
