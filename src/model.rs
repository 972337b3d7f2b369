use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::attrs::Attrs;
use crate::error::DiagramError;
use crate::style::{ClusterStyle, EdgeStyle, NodeStyle, parse_into};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    TopBottom,
    BottomTop,
    LeftRight,
    RightLeft,
}

impl Direction {
    pub fn rankdir(self) -> &'static str {
        match self {
            Direction::TopBottom => "TB",
            Direction::BottomTop => "BT",
            Direction::LeftRight => "LR",
            Direction::RightLeft => "RL",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Png,
    Jpg,
    Svg,
    Pdf,
    Dot,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Jpg => "jpg",
            OutputFormat::Svg => "svg",
            OutputFormat::Pdf => "pdf",
            OutputFormat::Dot => "dot",
        }
    }

    /// Guess the format from a file extension, if it names one.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| ext.parse().ok())
    }
}

impl FromStr for OutputFormat {
    type Err = DiagramError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "png" => Ok(OutputFormat::Png),
            "jpg" | "jpeg" => Ok(OutputFormat::Jpg),
            "svg" => Ok(OutputFormat::Svg),
            "pdf" => Ok(OutputFormat::Pdf),
            "dot" | "gv" => Ok(OutputFormat::Dot),
            _ => Err(DiagramError::UnknownFormat(s.to_string())),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Global rendering attributes: orientation, canvas size, resolution.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CanvasConfig {
    pub direction: Direction,
    pub format: OutputFormat,
    /// Width and height in inches.
    pub size: Option<(f32, f32)>,
    /// Force the drawing to fill `size` exactly (`size="W,H!"`).
    pub fill: bool,
    pub dpi: Option<u32>,
    pub pad: Option<f32>,
    pub node_sep: Option<f32>,
    pub rank_sep: Option<f32>,
    pub splines: Option<String>,
}

impl CanvasConfig {
    pub fn to_attrs(&self) -> Attrs {
        let mut attrs = Attrs::new();
        attrs.set("rankdir", self.direction.rankdir());
        attrs.set_opt("pad", self.pad);
        attrs.set_opt("splines", self.splines.as_ref());
        attrs.set_opt("nodesep", self.node_sep);
        attrs.set_opt("ranksep", self.rank_sep);
        if let Some((w, h)) = self.size {
            let bang = if self.fill { "!" } else { "" };
            attrs.set("size", format!("{w},{h}{bang}"));
        }
        if self.fill {
            attrs.set("ratio", "fill");
        }
        attrs.set_opt("dpi", self.dpi);
        attrs
    }

    /// Take the canvas keys (`size`, `ratio=fill`, `dpi`, `pad`, `nodesep`,
    /// `ranksep`, `splines`) out of a raw graph attribute list. Everything
    /// else is returned untouched.
    pub fn absorb(&mut self, raw: &Attrs) -> Attrs {
        let mut rest = Attrs::new();
        for (key, value) in raw.iter() {
            let known = match key {
                "size" => self.absorb_size(value),
                "ratio" if value == "fill" => {
                    self.fill = true;
                    true
                }
                "dpi" => parse_into(&mut self.dpi, value),
                "pad" => parse_into(&mut self.pad, value),
                "nodesep" => parse_into(&mut self.node_sep, value),
                "ranksep" => parse_into(&mut self.rank_sep, value),
                "splines" => {
                    self.splines = Some(value.to_string());
                    true
                }
                _ => false,
            };
            if !known {
                rest.set(key, value);
            }
        }
        rest
    }

    fn absorb_size(&mut self, value: &str) -> bool {
        let (dims, bang) = match value.strip_suffix('!') {
            Some(dims) => (dims, true),
            None => (value, false),
        };
        let Some((w, h)) = dims.split_once(',') else {
            return false;
        };
        match (w.trim().parse(), h.trim().parse()) {
            (Ok(w), Ok(h)) => {
                self.size = Some((w, h));
                self.fill |= bang;
                true
            }
            _ => false,
        }
    }
}

/// Handle to a declared node. Edges reference nodes by name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NodeRef(pub(crate) String);

impl NodeRef {
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl From<&str> for NodeRef {
    fn from(name: &str) -> Self {
        NodeRef(name.to_string())
    }
}

impl From<&NodeRef> for NodeRef {
    fn from(node: &NodeRef) -> Self {
        node.clone()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClusterRef {
    pub(crate) index: usize,
    pub(crate) depth: usize,
}

impl ClusterRef {
    /// Graphviz subgraph id; the `cluster_` prefix is what makes it framed.
    pub fn dot_id(&self) -> String {
        format!("cluster_{}", self.index)
    }

    pub fn depth(&self) -> usize {
        self.depth
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub name: String,
    pub label: String,
    pub style: NodeStyle,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cluster {
    pub id: ClusterRef,
    pub label: String,
    pub style: ClusterStyle,
    pub members: Vec<Member>,
}

/// Child of a cluster or of the diagram root. Nodes are stored once in
/// `Diagram::nodes`; members refer to them by index.
#[derive(Debug, Clone, PartialEq)]
pub enum Member {
    Node(usize),
    Cluster(Cluster),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub from: String,
    pub to: String,
    pub label: Option<String>,
    pub style: EdgeStyle,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Diagram {
    pub title: String,
    pub filename: String,
    pub canvas: CanvasConfig,
    pub graph_attrs: Attrs,
    pub node_attrs: Attrs,
    pub edge_attrs: Attrs,
    pub nodes: Vec<Node>,
    pub members: Vec<Member>,
    pub edges: Vec<Edge>,
}

impl Diagram {
    pub fn node(&self, name: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.name == name)
    }

    pub fn cluster_count(&self) -> usize {
        fn count(members: &[Member]) -> usize {
            members
                .iter()
                .map(|m| match m {
                    Member::Node(_) => 0,
                    Member::Cluster(c) => 1 + count(&c.members),
                })
                .sum()
        }
        count(&self.members)
    }
}

/// Output file name derived from a diagram title.
pub fn default_filename(title: &str) -> String {
    let name = title.trim().to_lowercase().replace(' ', "_");
    if name.is_empty() {
        "diagram".to_string()
    } else {
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn filename_from_title() {
        assert_eq!(default_filename("Home Lab Architecture"), "home_lab_architecture");
        assert_eq!(default_filename("   "), "diagram");
    }

    #[test]
    fn format_from_path() {
        assert_eq!(OutputFormat::from_path(Path::new("out.PNG")), Some(OutputFormat::Png));
        assert_eq!(OutputFormat::from_path(Path::new("out.jpeg")), Some(OutputFormat::Jpg));
        assert_eq!(OutputFormat::from_path(Path::new("out")), None);
        assert_eq!(OutputFormat::from_path(Path::new("out.bmp")), None);
    }

    #[test]
    fn unknown_format_is_error() {
        let err = "tiff".parse::<OutputFormat>().unwrap_err();
        assert_eq!(err.to_string(), "unknown output format: tiff");
    }

    #[test]
    fn canvas_absorbs_its_keys() {
        let raw: Attrs = [
            ("fontsize", "72"),
            ("size", "40,22.5!"),
            ("dpi", "300"),
            ("pad", "3.0"),
            ("splines", "ortho"),
            ("nodesep", "5"),
            ("ranksep", "8"),
            ("ratio", "fill"),
            ("compound", "true"),
        ]
        .into_iter()
        .collect();
        let mut canvas = CanvasConfig::default();
        let rest = canvas.absorb(&raw);

        assert_eq!(canvas.size, Some((40.0, 22.5)));
        assert!(canvas.fill);
        assert_eq!(canvas.dpi, Some(300));
        assert_eq!(canvas.pad, Some(3.0));
        assert_eq!(canvas.splines.as_deref(), Some("ortho"));
        let keys: Vec<_> = rest.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["fontsize", "compound"]);
    }

    #[test]
    fn canvas_leaves_unparsable_values() {
        let raw: Attrs = [("size", "big"), ("dpi", "high"), ("ratio", "compress")].into_iter().collect();
        let mut canvas = CanvasConfig::default();
        let rest = canvas.absorb(&raw);
        assert_eq!(canvas, CanvasConfig::default());
        assert_eq!(rest.len(), 3);
    }

    #[test]
    fn canvas_fill_size() {
        let canvas = CanvasConfig {
            direction: Direction::LeftRight,
            size: Some((40.0, 22.5)),
            fill: true,
            dpi: Some(300),
            ..CanvasConfig::default()
        };
        let attrs = canvas.to_attrs();
        assert_eq!(attrs.get("rankdir"), Some("LR"));
        assert_eq!(attrs.get("size"), Some("40,22.5!"));
        assert_eq!(attrs.get("ratio"), Some("fill"));
        assert_eq!(attrs.get("dpi"), Some("300"));
    }
}
