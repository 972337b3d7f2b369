//! Engine and output settings resolved from flags and the environment.

use std::path::Path;

use crate::engine::{DEFAULT_PROGRAM, Graphviz};
use crate::error::DiagramError;
use crate::model::OutputFormat;

pub const ENGINE_ENV: &str = "TOPO_LAYOUT_ENGINE";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub program: String,
}

impl EngineConfig {
    /// Read `TOPO_LAYOUT_ENGINE` (program name or path), default `dot`.
    pub fn from_env() -> Self {
        Self::from_value(std::env::var(ENGINE_ENV).ok().as_deref())
    }

    fn from_value(raw: Option<&str>) -> Self {
        let program = raw
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .unwrap_or(DEFAULT_PROGRAM)
            .to_string();
        Self { program }
    }

    /// A flag given on the command line wins over the environment.
    pub fn with_override(self, program: Option<String>) -> Self {
        match program {
            Some(program) => Self { program },
            None => self,
        }
    }

    pub fn engine(&self) -> Graphviz {
        Graphviz::new(self.program.clone())
    }
}

/// Pick the output format: explicit flag, then the output extension, then png.
pub fn resolve_format(explicit: Option<&str>, output: Option<&Path>) -> Result<OutputFormat, DiagramError> {
    if let Some(name) = explicit {
        return name.parse();
    }
    Ok(output.and_then(OutputFormat::from_path).unwrap_or_default())
}
