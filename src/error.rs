use std::path::PathBuf;
use std::process::ExitStatus;

#[derive(Debug, thiserror::Error)]
pub enum DiagramError {
    #[error("duplicate node name: {0}")]
    DuplicateNode(String),
    #[error("edge references undeclared node: {0}")]
    UnknownEndpoint(String),
    #[error(transparent)]
    LayoutEngine(#[from] LayoutEngineError),
    #[error("cannot write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{0}")]
    Syntax(String),
    #[error("unknown output format: {0}")]
    UnknownFormat(String),
}

#[derive(Debug, thiserror::Error)]
pub enum LayoutEngineError {
    #[error("layout engine `{program}` is not installed")]
    NotInstalled { program: String },
    #[error("failed to run layout engine `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("layout engine `{program}` exited with {status}: {stderr}")]
    Failed {
        program: String,
        status: ExitStatus,
        stderr: String,
    },
    #[error("layout engine `{program}` produced no output")]
    EmptyOutput { program: String },
}

impl DiagramError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
