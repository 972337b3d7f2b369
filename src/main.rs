use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};

use topo::config::{EngineConfig, resolve_format};
use topo::{CanvasConfig, Diagram, RenderOptions};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Preset {
    HomeLab,
}

#[derive(Parser)]
#[command(name = "topo", version, about = "Render declarative architecture diagrams through Graphviz")]
struct Cli {
    /// Declaration file (reads from stdin if not provided)
    file: Option<PathBuf>,

    /// Render a built-in diagram instead of a file
    #[arg(long, value_enum, conflicts_with = "file")]
    preset: Option<Preset>,

    /// Output image path (defaults to the diagram's file name)
    #[arg(long, short = 'o')]
    output: Option<PathBuf>,

    /// Output format: png, jpg, svg, pdf or dot (defaults to the output extension)
    #[arg(long, short = 'f')]
    format: Option<String>,

    /// Layout engine program (overrides TOPO_LAYOUT_ENGINE)
    #[arg(long)]
    engine: Option<String>,

    /// Override the canvas resolution
    #[arg(long)]
    dpi: Option<u32>,

    /// Also write the DOT description next to the image
    #[arg(long)]
    keep_source: bool,

    /// Print the DOT description to stdout and exit
    #[arg(long)]
    emit_dot: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(long, short = 'v', action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("ERROR: {e:#}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        _ => tracing::Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let diagram = load_diagram(&cli)?;
    let canvas = canvas(&cli, &diagram)?;

    if cli.emit_dot {
        print!("{}", topo::dot::write_dot(&diagram, &canvas));
        return Ok(());
    }

    let format = canvas.format;
    let output = cli
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(format!("{}.{}", diagram.filename, format.extension())));

    let engine = EngineConfig::from_env().with_override(cli.engine.clone()).engine();
    let options = RenderOptions {
        keep_source: cli.keep_source,
    };
    let rendered = diagram
        .render_with(&engine, &output, &canvas, options)
        .with_context(|| format!("failed to render {}", output.display()))?;

    tracing::info!(path = %rendered.path.display(), bytes = rendered.bytes, "done");
    Ok(())
}

/// The diagram's canvas with command-line overrides applied.
fn canvas(cli: &Cli, diagram: &Diagram) -> Result<CanvasConfig> {
    let format = match (&cli.format, &cli.output) {
        (None, None) => diagram.canvas.format,
        (explicit, output) => resolve_format(explicit.as_deref(), output.as_deref())?,
    };
    Ok(CanvasConfig {
        format,
        dpi: cli.dpi.or(diagram.canvas.dpi),
        ..diagram.canvas.clone()
    })
}

fn load_diagram(cli: &Cli) -> Result<Diagram> {
    if let Some(Preset::HomeLab) = cli.preset {
        return Ok(topo::homelab::diagram()?);
    }

    let source = match &cli.file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read stdin")?;
            buf
        }
    };
    Ok(topo::parse(&source)?)
}
