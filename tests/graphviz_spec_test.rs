//! Renders through the real `dot` binary. Each test returns early when
//! Graphviz is not installed.

use std::process::Command;

use topo::style::{EdgeStyle, NodeStyle};
use topo::{CanvasConfig, DiagramBuilder, DiagramError, Graphviz, LayoutEngineError, OutputFormat};

fn graphviz_installed() -> bool {
    Command::new("dot")
        .arg("-V")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

fn link_diagram() -> topo::Diagram {
    let mut b = DiagramBuilder::new("Link");
    let a = b.declare_node("A", "A", NodeStyle::default()).unwrap();
    let c = b.declare_node("B", "B", NodeStyle::default()).unwrap();
    b.declare_edge(&a, &c, "LINK", EdgeStyle::default()).unwrap();
    b.finish()
}

#[test]
fn spec_png_is_written() {
    if !graphviz_installed() {
        eprintln!("skipping: dot not installed");
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out.png");
    let d = link_diagram();
    let rendered = d.render(&Graphviz::default(), &out, &d.canvas).unwrap();

    let bytes = std::fs::read(&out).unwrap();
    assert!(!bytes.is_empty());
    assert_eq!(&bytes[..4], b"\x89PNG");
    assert_eq!(rendered.bytes, bytes.len() as u64);
}

#[test]
fn spec_svg_contains_labels() {
    if !graphviz_installed() {
        eprintln!("skipping: dot not installed");
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out.svg");
    let d = link_diagram();
    let canvas = CanvasConfig {
        format: OutputFormat::Svg,
        ..d.canvas.clone()
    };
    d.render(&Graphviz::default(), &out, &canvas).unwrap();

    let svg = std::fs::read_to_string(&out).unwrap();
    assert!(svg.contains("<svg"));
    assert!(svg.contains("LINK"));
}

#[test]
fn spec_home_lab_preset_renders() {
    if !graphviz_installed() {
        eprintln!("skipping: dot not installed");
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let d = topo::homelab::diagram().unwrap();
    let canvas = CanvasConfig {
        format: OutputFormat::Svg,
        dpi: None,
        ..d.canvas.clone()
    };
    let out = dir.path().join("home_lab.svg");
    d.render(&Graphviz::default(), &out, &canvas).unwrap();
    assert!(std::fs::metadata(&out).unwrap().len() > 0);
}

#[test]
fn spec_missing_engine_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out.png");
    let d = link_diagram();
    let err = d
        .render(&Graphviz::new("topo-missing-layout-engine"), &out, &d.canvas)
        .unwrap_err();

    assert!(matches!(
        err,
        DiagramError::LayoutEngine(LayoutEngineError::NotInstalled { .. })
    ));
    assert!(!out.exists());
}

#[test]
fn spec_engine_rejects_bad_description() {
    if !graphviz_installed() {
        eprintln!("skipping: dot not installed");
        return;
    }
    let err = topo::LayoutEngine::layout(&Graphviz::default(), "digraph {", OutputFormat::Png).unwrap_err();
    match err {
        LayoutEngineError::Failed { stderr, .. } => assert!(!stderr.is_empty()),
        other => panic!("expected Failed, got {other}"),
    }
}
