//! Built-in home lab topology, rendered with `topo --preset home-lab`.
//!
//! Three layers left to right: client access, the external network, and the
//! lab infrastructure with its gateway/monitoring and core service groups.

use crate::attrs::Attrs;
use crate::builder::DiagramBuilder;
use crate::error::DiagramError;
use crate::model::{CanvasConfig, Diagram, Direction, OutputFormat};
use crate::style::{ClusterStyle, EdgeStyle, Font, LineStyle, NodeKind, NodeStyle};

pub const TITLE: &str = "ANNONΑΣ HOME LAB ARCHITECTURE";

const BLACK: &str = "Helvetica Neue Black";
const BOLD: &str = "Helvetica Neue Bold";

pub fn canvas() -> CanvasConfig {
    CanvasConfig {
        direction: Direction::LeftRight,
        format: OutputFormat::Png,
        size: Some((40.0, 22.5)),
        fill: true,
        dpi: Some(300),
        pad: Some(3.0),
        node_sep: Some(5.0),
        rank_sep: Some(8.0),
        splines: Some("ortho".to_string()),
    }
}

fn graph_attrs() -> Attrs {
    [
        ("fontsize", "72"),
        ("fontname", BLACK),
        ("bgcolor", "#ffffff"),
        ("compound", "true"),
        ("overlap", "false"),
        ("sep", "+50"),
        ("resolution", "300"),
    ]
    .into_iter()
    .collect()
}

fn node_attrs() -> Attrs {
    [
        ("fontsize", "28"),
        ("fontname", BOLD),
        ("fontcolor", "#ffffff"),
        ("width", "6.0"),
        ("height", "4.5"),
        ("style", "filled,rounded"),
        ("fillcolor", "#2c3e50"),
        ("color", "#34495e"),
        ("penwidth", "4"),
        ("margin", "0.5"),
        ("fixedsize", "true"),
    ]
    .into_iter()
    .collect()
}

fn edge_attrs() -> Attrs {
    [
        ("fontsize", "20"),
        ("fontname", BOLD),
        ("fontcolor", "#1a1a1a"),
        ("color", "#2c3e50"),
        ("penwidth", "6.0"),
        ("arrowsize", "2.0"),
        ("arrowhead", "vee"),
        ("minlen", "3"),
    ]
    .into_iter()
    .collect()
}

fn layer(background: &str, border: &str, pen: f32, font: (&str, f32, &str), margin: f32) -> ClusterStyle {
    ClusterStyle::default()
        .background(background)
        .rounded_filled()
        .border(border, pen)
        .font(Font {
            name: Some(font.0.to_string()),
            size: Some(font.1),
            color: Some(font.2.to_string()),
        })
        .margin(margin)
        .label_top()
}

fn flow(color: &str, pen: f32, line: LineStyle, font_color: &str, font_size: f32) -> EdgeStyle {
    EdgeStyle::default()
        .color(color)
        .pen_width(pen)
        .line(line)
        .font(Font {
            name: None,
            size: Some(font_size),
            color: Some(font_color.to_string()),
        })
}

fn device(kind: NodeKind) -> NodeStyle {
    NodeStyle::default().kind(kind)
}

pub fn diagram() -> Result<Diagram, DiagramError> {
    let mut b = DiagramBuilder::new(TITLE)
        .filename("home_lab_architecture")
        .canvas(canvas())
        .graph_attrs(graph_attrs())
        .node_attrs(node_attrs())
        .edge_attrs(edge_attrs());

    b.declare_cluster(
        "CLIENT ACCESS LAYER",
        layer("#e3f2fd", "#0d47a1", 5.0, (BLACK, 36.0, "#0d47a1"), 60.0),
        |b| {
            b.declare_node("mobile", "MOBILE\nDEVICES", device(NodeKind::Mobile))?;
            b.declare_node("desktop", "DESKTOP\n& LAPTOP", device(NodeKind::Server))?;
            Ok(())
        },
    )?;

    b.declare_cluster(
        "EXTERNAL NETWORK",
        layer("#f5f5f5", "#424242", 5.0, (BLACK, 36.0, "#212121"), 60.0),
        |b| {
            b.declare_node("internet", "INTERNET\nWAN", device(NodeKind::Internet))?;
            Ok(())
        },
    )?;

    b.declare_cluster(
        "ANNONΑΣ INFRASTRUCTURE",
        layer("#e8f5e8", "#1b5e20", 6.0, (BLACK, 42.0, "#1b5e20"), 80.0),
        |b| {
            b.declare_cluster(
                "GATEWAY & MONITORING",
                layer("#fff8e1", "#e65100", 4.0, (BOLD, 28.0, "#bf360c"), 50.0),
                |b| {
                    b.declare_node("gateway", "GATEWAY\nRPi 3B+\nanno-gw-mon", device(NodeKind::Server))?;
                    b.declare_node("prometheus", "PROMETHEUS\nMETRICS", device(NodeKind::Monitoring))?;
                    b.declare_node("grafana", "GRAFANA\nDASHBOARDS", device(NodeKind::Dashboard))?;
                    Ok(())
                },
            )?;
            b.declare_cluster(
                "CORE SERVICES",
                layer("#fce4ec", "#880e4f", 4.0, (BOLD, 28.0, "#880e4f"), 50.0),
                |b| {
                    b.declare_node("nas", "NAS STORAGE\nRPi 3B+\nanno-nas", device(NodeKind::Server))?;
                    b.declare_node("app_server", "APP SERVER\nOrange Pi 3B\nanno-app", device(NodeKind::Server))?;
                    Ok(())
                },
            )?;
            Ok(())
        },
    )?;

    // Client access
    let web = flow("#1976d2", 8.0, LineStyle::Bold, "#0d47a1", 18.0);
    b.declare_edge("mobile", "internet", "HTTPS\nACCESS", web.clone())?;
    b.declare_edge("desktop", "internet", "SECURE\nWEB ACCESS", web)?;

    // WAN
    b.declare_edge(
        "internet",
        "gateway",
        "WAN\nCONNECTION",
        flow("#d32f2f", 10.0, LineStyle::Bold, "#b71c1c", 22.0),
    )?;

    // Internal routing
    b.declare_edge(
        "gateway",
        "nas",
        "REVERSE\nPROXY",
        flow("#388e3c", 8.0, LineStyle::Dashed, "#1b5e20", 18.0),
    )?;
    b.declare_edge(
        "gateway",
        "app_server",
        "LOAD\nBALANCE",
        flow("#7b1fa2", 8.0, LineStyle::Dashed, "#4a148c", 18.0),
    )?;

    // Storage
    b.declare_edge(
        "app_server",
        "nas",
        "DATA\nSTORAGE",
        flow("#f57c00", 6.0, LineStyle::Dotted, "#e65100", 16.0),
    )?;

    // Observability
    let metrics = flow("#00acc1", 5.0, LineStyle::Dotted, "#006064", 14.0);
    b.declare_edge("nas", "prometheus", "METRICS", metrics.clone())?;
    b.declare_edge("app_server", "prometheus", "METRICS", metrics)?;
    b.declare_edge(
        "prometheus",
        "grafana",
        "DASHBOARD\nDATA",
        flow("#8e24aa", 5.0, LineStyle::Dotted, "#4a148c", 14.0),
    )?;

    Ok(b.finish())
}
