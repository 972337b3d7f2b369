//! External layout engine boundary.

use std::io::{self, ErrorKind, Write};
use std::process::{Command, Stdio};
use std::thread;

use crate::error::LayoutEngineError;
use crate::model::OutputFormat;

pub const DEFAULT_PROGRAM: &str = "dot";

/// Turns a DOT description into rendered image bytes.
pub trait LayoutEngine {
    fn layout(&self, description: &str, format: OutputFormat) -> Result<Vec<u8>, LayoutEngineError>;
}

/// Graphviz run as a subprocess: `<program> -T<format>`, DOT on stdin,
/// image on stdout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Graphviz {
    program: String,
}

impl Graphviz {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

impl Default for Graphviz {
    fn default() -> Self {
        Self::new(DEFAULT_PROGRAM)
    }
}

impl LayoutEngine for Graphviz {
    fn layout(&self, description: &str, format: OutputFormat) -> Result<Vec<u8>, LayoutEngineError> {
        tracing::debug!(program = %self.program, %format, bytes = description.len(), "running layout engine");

        let mut child = Command::new(&self.program)
            .arg(format!("-T{}", format.extension()))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => LayoutEngineError::NotInstalled {
                    program: self.program.clone(),
                },
                _ => LayoutEngineError::Spawn {
                    program: self.program.clone(),
                    source: e,
                },
            })?;

        // Feed stdin from a scoped thread while the pipes are drained, so an
        // engine that writes before it finishes reading cannot stall us. The
        // writer drops stdin when done, which is the engine's EOF.
        let stdin = child.stdin.take();
        let (write_result, output) = thread::scope(|scope| {
            let writer = scope.spawn(move || match stdin {
                Some(mut stdin) => stdin.write_all(description.as_bytes()),
                None => Ok(()),
            });
            let output = child.wait_with_output();
            let written = writer
                .join()
                .unwrap_or_else(|_| Err(io::Error::other("stdin writer panicked")));
            (written, output)
        });
        let output = output.map_err(|e| LayoutEngineError::Spawn {
            program: self.program.clone(),
            source: e,
        })?;

        if !output.status.success() {
            return Err(LayoutEngineError::Failed {
                program: self.program.clone(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        // An engine that exits without reading all of stdin is judged by its
        // status and output alone.
        if let Err(e) = write_result.or_else(ignore_broken_pipe) {
            return Err(LayoutEngineError::Spawn {
                program: self.program.clone(),
                source: e,
            });
        }
        if output.stdout.is_empty() {
            return Err(LayoutEngineError::EmptyOutput {
                program: self.program.clone(),
            });
        }

        tracing::debug!(program = %self.program, bytes = output.stdout.len(), "layout engine finished");
        Ok(output.stdout)
    }
}

fn ignore_broken_pipe(e: io::Error) -> io::Result<()> {
    if e.kind() == ErrorKind::BrokenPipe {
        Ok(())
    } else {
        Err(e)
    }
}
