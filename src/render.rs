//! Terminal render step: DOT text through the layout engine into one file.

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::dot::write_dot;
use crate::engine::LayoutEngine;
use crate::error::DiagramError;
use crate::model::{CanvasConfig, Diagram, OutputFormat};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderOptions {
    /// Also write the DOT description next to the output as `<stem>.dot`.
    pub keep_source: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedFile {
    pub path: PathBuf,
    pub format: OutputFormat,
    pub bytes: u64,
    pub source: Option<PathBuf>,
}

impl Diagram {
    /// Serialise, lay out and write the image to `output`.
    ///
    /// The image is written to a temporary file in the destination directory
    /// and moved into place only once the engine returned non-empty output,
    /// so a failed render leaves no file behind.
    pub fn render<E: LayoutEngine>(
        &self,
        engine: &E,
        output: &Path,
        canvas: &CanvasConfig,
    ) -> Result<RenderedFile, DiagramError> {
        self.render_with(engine, output, canvas, RenderOptions::default())
    }

    pub fn render_with<E: LayoutEngine>(
        &self,
        engine: &E,
        output: &Path,
        canvas: &CanvasConfig,
        options: RenderOptions,
    ) -> Result<RenderedFile, DiagramError> {
        let description = write_dot(self, canvas);
        tracing::debug!(
            nodes = self.nodes.len(),
            edges = self.edges.len(),
            bytes = description.len(),
            "graph description ready"
        );

        let image = match canvas.format {
            OutputFormat::Dot => description.clone().into_bytes(),
            format => engine.layout(&description, format)?,
        };

        let source = (options.keep_source && canvas.format != OutputFormat::Dot).then(|| source_path(output));

        // Both files are staged before either is moved into place.
        let staged_image = stage(output, &image)?;
        if let Some(path) = &source {
            stage(path, description.as_bytes())?
                .persist(path)
                .map_err(|e| DiagramError::io(path, e.error))?;
        }
        if let Err(e) = staged_image.persist(output) {
            if let Some(path) = &source {
                remove_leftover(path);
            }
            return Err(DiagramError::io(output, e.error));
        }

        tracing::info!(path = %output.display(), format = %canvas.format, bytes = image.len(), "diagram rendered");
        Ok(RenderedFile {
            path: output.to_path_buf(),
            format: canvas.format,
            bytes: image.len() as u64,
            source,
        })
    }

    /// Render with the diagram's own canvas to `<dir>/<filename>.<ext>`.
    pub fn render_default<E: LayoutEngine>(
        &self,
        engine: &E,
        dir: &Path,
    ) -> Result<RenderedFile, DiagramError> {
        let path = dir.join(format!("{}.{}", self.filename, self.canvas.format.extension()));
        self.render(engine, &path, &self.canvas)
    }
}

/// `<stem>.dot` beside the output, or `<stem>.gv` when the output itself
/// ends in `.dot`.
fn source_path(output: &Path) -> PathBuf {
    let path = output.with_extension(OutputFormat::Dot.extension());
    if path == output {
        output.with_extension("gv")
    } else {
        path
    }
}

/// Write `bytes` to a temporary file in the directory `path` will live in.
fn stage(path: &Path, bytes: &[u8]) -> Result<NamedTempFile, DiagramError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| DiagramError::io(path, e))?;
    tmp.write_all(bytes).map_err(|e| DiagramError::io(path, e))?;
    Ok(tmp)
}

fn remove_leftover(path: &Path) {
    if let Err(e) = std::fs::remove_file(path) {
        tracing::warn!(path = %path.display(), error = %e, "could not remove partial output");
    }
}
