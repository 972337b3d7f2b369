//! Graphviz DOT serialisation of a built diagram.

use crate::attrs::Attrs;
use crate::display_width::{estimated_inches, line_count};
use crate::model::{CanvasConfig, Cluster, Diagram, Edge, Member, Node};

const FONT: &str = "Sans-Serif";
const FONT_COLOR: &str = "#2D3436";
const DEFAULT_NODE_SIZE: f32 = 1.4;
const DEFAULT_NODE_FONT_SIZE: f32 = 13.0;
const HEIGHT_PER_EXTRA_LINE: f32 = 0.4;
const CLUSTER_BACKGROUNDS: [&str; 4] = ["#E5F5FD", "#EBF3E7", "#ECE8F6", "#FDF7E3"];
const INDENT: &str = "    ";

pub fn default_graph_attrs() -> Attrs {
    [
        ("fontname", FONT),
        ("fontsize", "15"),
        ("fontcolor", FONT_COLOR),
        ("pad", "2.0"),
        ("splines", "ortho"),
        ("nodesep", "0.60"),
        ("ranksep", "0.75"),
    ]
    .into_iter()
    .collect()
}

pub fn default_node_attrs() -> Attrs {
    [
        ("shape", "box"),
        ("style", "rounded"),
        ("fixedsize", "true"),
        ("width", "1.4"),
        ("height", "1.4"),
        ("fontname", FONT),
        ("fontsize", "13"),
        ("fontcolor", FONT_COLOR),
    ]
    .into_iter()
    .collect()
}

pub fn default_edge_attrs() -> Attrs {
    [("color", "#7B8894")].into_iter().collect()
}

fn default_cluster_attrs() -> Attrs {
    [
        ("shape", "box"),
        ("style", "rounded"),
        ("labeljust", "l"),
        ("pencolor", "#AEB6BE"),
        ("fontname", FONT),
        ("fontsize", "12"),
    ]
    .into_iter()
    .collect()
}

/// Render `diagram` as DOT text. Identical input gives identical output.
pub fn write_dot(diagram: &Diagram, canvas: &CanvasConfig) -> String {
    let mut graph = default_graph_attrs();
    graph.merge(&diagram.graph_attrs);
    graph.merge(&canvas.to_attrs());
    graph.set("label", diagram.title.as_str());

    let mut node_defaults = default_node_attrs();
    node_defaults.merge(&diagram.node_attrs);

    let mut edge_defaults = default_edge_attrs();
    edge_defaults.merge(&diagram.edge_attrs);

    let mut lines = vec![
        format!("digraph {} {{", quote(&diagram.title)),
        format!("{INDENT}graph {}", attr_list(&graph)),
        format!("{INDENT}node {}", attr_list(&node_defaults)),
        format!("{INDENT}edge {}", attr_list(&edge_defaults)),
    ];

    let writer = DotWriter {
        diagram,
        node_defaults: &node_defaults,
    };
    if !diagram.members.is_empty() {
        lines.push(String::new());
    }
    writer.members(&mut lines, &diagram.members, 1);

    if !diagram.edges.is_empty() {
        lines.push(String::new());
    }
    lines.extend(diagram.edges.iter().map(edge_line));
    lines.push("}".to_string());

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

struct DotWriter<'a> {
    diagram: &'a Diagram,
    node_defaults: &'a Attrs,
}

impl DotWriter<'_> {
    fn members(&self, lines: &mut Vec<String>, members: &[Member], depth: usize) {
        for member in members {
            match member {
                Member::Node(index) => lines.push(self.node(&self.diagram.nodes[*index], depth)),
                Member::Cluster(cluster) => self.cluster(lines, cluster, depth),
            }
        }
    }

    fn cluster(&self, lines: &mut Vec<String>, cluster: &Cluster, depth: usize) {
        let pad = INDENT.repeat(depth);
        let mut attrs = default_cluster_attrs();
        attrs.set("label", cluster.label.as_str());
        let nesting = cluster.id.depth();
        attrs.set("bgcolor", CLUSTER_BACKGROUNDS[nesting % CLUSTER_BACKGROUNDS.len()]);
        attrs.merge(&cluster.style.to_attrs());

        lines.push(format!("{pad}subgraph {} {{", quote(&cluster.id.dot_id())));
        lines.push(format!("{pad}{INDENT}graph {}", attr_list(&attrs)));
        self.members(lines, &cluster.members, depth + 1);
        lines.push(format!("{pad}}}"));
    }

    fn node(&self, node: &Node, depth: usize) -> String {
        let pad = INDENT.repeat(depth);
        let mut attrs = Attrs::new().with("label", node.label.as_str());
        attrs.merge(&node.style.to_attrs());

        if attrs.contains("fillcolor") {
            let current = attrs.get("style").or_else(|| self.node_defaults.get("style"));
            if let Some(style) = with_filled(current) {
                attrs.set("style", style);
            }
        }

        let lines = line_count(&node.label);
        if lines > 1 && !attrs.contains("height") {
            let base = number(self.node_defaults.get("height")).unwrap_or(DEFAULT_NODE_SIZE);
            let grown = base + HEIGHT_PER_EXTRA_LINE * (lines - 1) as f32;
            attrs.set("height", format_inches(grown));
        }

        if label_overflows(&attrs, self.node_defaults, &node.label) {
            tracing::warn!(node = %node.name, "label is wider than its fixed-size node");
        }

        format!("{pad}{} {}", quote(&node.name), attr_list(&attrs))
    }
}

/// Graphviz ignores `fillcolor` unless the style includes `filled`. Returns
/// the style to set, or `None` when it already fills.
fn with_filled(style: Option<&str>) -> Option<String> {
    match style.map(str::trim).filter(|s| !s.is_empty()) {
        None => Some("filled".to_string()),
        Some(s) if s.split(',').any(|part| part.trim() == "filled") => None,
        Some(s) => Some(format!("filled,{s}")),
    }
}

fn edge_line(edge: &Edge) -> String {
    let mut attrs = Attrs::new();
    if let Some(label) = &edge.label {
        attrs.set("label", label.as_str());
    }
    attrs.merge(&edge.style.to_attrs());

    let line = format!("{INDENT}{} -> {}", quote(&edge.from), quote(&edge.to));
    if attrs.is_empty() {
        line
    } else {
        format!("{line} {}", attr_list(&attrs))
    }
}

/// Whether a fixed-size node's label is estimated wider than the node.
fn label_overflows(node: &Attrs, defaults: &Attrs, label: &str) -> bool {
    let lookup = |key: &str| node.get(key).or_else(|| defaults.get(key));
    if lookup("fixedsize") != Some("true") {
        return false;
    }
    let width = number(lookup("width")).unwrap_or(DEFAULT_NODE_SIZE);
    let font_size = number(lookup("fontsize")).unwrap_or(DEFAULT_NODE_FONT_SIZE);
    estimated_inches(label, font_size) > width
}

fn number(value: Option<&str>) -> Option<f32> {
    value.and_then(|v| v.parse().ok())
}

fn format_inches(value: f32) -> String {
    let s = format!("{value:.2}");
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}

fn attr_list(attrs: &Attrs) -> String {
    let body: Vec<String> = attrs
        .iter()
        .map(|(k, v)| format!("{k}={}", quote(v)))
        .collect();
    format!("[{}]", body.join(", "))
}

/// Double-quote a DOT identifier or value.
pub fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for ch in s.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => {}
            _ => out.push(ch),
        }
    }
    out.push('"');
    out
}
