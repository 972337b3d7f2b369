pub mod ast;
pub mod attrs;
pub mod builder;
pub mod config;
pub mod display_width;
pub mod dot;
pub mod engine;
pub mod error;
pub mod homelab;
pub mod loader;
pub mod model;
pub mod parser;
pub mod render;
pub mod style;

pub use builder::DiagramBuilder;
pub use engine::{Graphviz, LayoutEngine};
pub use error::{DiagramError, LayoutEngineError};
pub use model::{CanvasConfig, Diagram, Direction, NodeRef, OutputFormat};
pub use render::{RenderOptions, RenderedFile};

/// Parse a declaration file into a diagram.
pub fn parse(source: &str) -> Result<Diagram, DiagramError> {
    let document = parser::parse_document(source)?;
    loader::load(&document)
}

/// Parse a declaration file and return its DOT description.
pub fn describe(source: &str) -> Result<String, DiagramError> {
    let diagram = parse(source)?;
    Ok(dot::write_dot(&diagram, &diagram.canvas))
}
