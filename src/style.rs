use std::fmt;
use std::str::FromStr;

use crate::attrs::Attrs;

/// Device class a node depicts. Mapped onto a Graphviz shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NodeKind {
    #[default]
    Generic,
    Server,
    Mobile,
    Internet,
    Database,
    Monitoring,
    Dashboard,
}

impl NodeKind {
    pub fn shape(self) -> Option<&'static str> {
        match self {
            NodeKind::Generic => None,
            NodeKind::Server => Some("box3d"),
            NodeKind::Mobile => Some("rect"),
            NodeKind::Internet => Some("ellipse"),
            NodeKind::Database => Some("cylinder"),
            NodeKind::Monitoring => Some("component"),
            NodeKind::Dashboard => Some("tab"),
        }
    }
}

impl FromStr for NodeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "generic" => Ok(NodeKind::Generic),
            "server" => Ok(NodeKind::Server),
            "mobile" => Ok(NodeKind::Mobile),
            "internet" => Ok(NodeKind::Internet),
            "database" | "db" => Ok(NodeKind::Database),
            "monitoring" | "prometheus" => Ok(NodeKind::Monitoring),
            "dashboard" | "grafana" => Ok(NodeKind::Dashboard),
            other => Err(format!("unknown node kind: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStyle {
    Solid,
    Dashed,
    Dotted,
    Bold,
}

impl LineStyle {
    pub fn as_str(self) -> &'static str {
        match self {
            LineStyle::Solid => "solid",
            LineStyle::Dashed => "dashed",
            LineStyle::Dotted => "dotted",
            LineStyle::Bold => "bold",
        }
    }
}

impl FromStr for LineStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "solid" => Ok(LineStyle::Solid),
            "dashed" => Ok(LineStyle::Dashed),
            "dotted" => Ok(LineStyle::Dotted),
            "bold" => Ok(LineStyle::Bold),
            other => Err(format!("unknown line style: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrowShape {
    Normal,
    Vee,
    Dot,
    Diamond,
    Box,
    Inv,
    Tee,
    None,
}

impl ArrowShape {
    pub fn as_str(self) -> &'static str {
        match self {
            ArrowShape::Normal => "normal",
            ArrowShape::Vee => "vee",
            ArrowShape::Dot => "dot",
            ArrowShape::Diamond => "diamond",
            ArrowShape::Box => "box",
            ArrowShape::Inv => "inv",
            ArrowShape::Tee => "tee",
            ArrowShape::None => "none",
        }
    }
}

impl FromStr for ArrowShape {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "normal" => Ok(ArrowShape::Normal),
            "vee" => Ok(ArrowShape::Vee),
            "dot" => Ok(ArrowShape::Dot),
            "diamond" => Ok(ArrowShape::Diamond),
            "box" => Ok(ArrowShape::Box),
            "inv" => Ok(ArrowShape::Inv),
            "tee" => Ok(ArrowShape::Tee),
            "none" => Ok(ArrowShape::None),
            other => Err(format!("unknown arrow shape: {other}")),
        }
    }
}

/// Which ends of an edge carry an arrow head.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EdgeDirection {
    #[default]
    Forward,
    Back,
    Both,
    None,
}

impl EdgeDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            EdgeDirection::Forward => "forward",
            EdgeDirection::Back => "back",
            EdgeDirection::Both => "both",
            EdgeDirection::None => "none",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Font {
    pub name: Option<String>,
    pub size: Option<f32>,
    pub color: Option<String>,
}

impl Font {
    fn write(&self, attrs: &mut Attrs) {
        attrs.set_opt("fontname", self.name.as_ref());
        attrs.set_opt("fontsize", self.size);
        attrs.set_opt("fontcolor", self.color.as_ref());
    }

    fn absorb(&mut self, key: &str, value: &str) -> bool {
        match key {
            "fontname" => self.name = Some(value.to_string()),
            "fontcolor" => self.color = Some(value.to_string()),
            "fontsize" => match value.parse() {
                Ok(v) => self.size = Some(v),
                Err(_) => return false,
            },
            _ => return false,
        }
        true
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeStyle {
    pub kind: NodeKind,
    pub fill_color: Option<String>,
    pub border_color: Option<String>,
    pub font: Font,
    pub width: Option<f32>,
    pub height: Option<f32>,
    pub pen_width: Option<f32>,
    pub extra: Attrs,
}

impl NodeStyle {
    pub fn kind(mut self, kind: NodeKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn fill(mut self, color: impl Into<String>) -> Self {
        self.fill_color = Some(color.into());
        self
    }

    pub fn border(mut self, color: impl Into<String>) -> Self {
        self.border_color = Some(color.into());
        self
    }

    pub fn font(mut self, font: Font) -> Self {
        self.font = font;
        self
    }

    pub fn size(mut self, width: f32, height: f32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.set(key, value);
        self
    }

    /// Split a raw attribute list into typed fields, leaving unknown keys in `extra`.
    pub fn from_attrs(raw: &Attrs) -> Self {
        let mut style = NodeStyle::default();
        for (key, value) in raw.iter() {
            let known = match key {
                "fillcolor" => {
                    style.fill_color = Some(value.to_string());
                    true
                }
                "color" => {
                    style.border_color = Some(value.to_string());
                    true
                }
                "width" => parse_into(&mut style.width, value),
                "height" => parse_into(&mut style.height, value),
                "penwidth" => parse_into(&mut style.pen_width, value),
                _ => style.font.absorb(key, value),
            };
            if !known {
                style.extra.set(key, value);
            }
        }
        style
    }

    pub fn to_attrs(&self) -> Attrs {
        let mut attrs = Attrs::new();
        attrs.set_opt("shape", self.kind.shape());
        attrs.set_opt("fillcolor", self.fill_color.as_ref());
        attrs.set_opt("color", self.border_color.as_ref());
        self.font.write(&mut attrs);
        attrs.set_opt("width", self.width);
        attrs.set_opt("height", self.height);
        attrs.set_opt("penwidth", self.pen_width);
        attrs.merge(&self.extra);
        attrs
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelLoc {
    Top,
    Bottom,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClusterStyle {
    pub background: Option<String>,
    pub border_color: Option<String>,
    pub pen_width: Option<f32>,
    pub font: Font,
    pub margin: Option<f32>,
    pub label_loc: Option<LabelLoc>,
    pub rounded: bool,
    pub filled: bool,
    pub extra: Attrs,
}

impl ClusterStyle {
    pub fn background(mut self, color: impl Into<String>) -> Self {
        self.background = Some(color.into());
        self
    }

    pub fn border(mut self, color: impl Into<String>, pen_width: f32) -> Self {
        self.border_color = Some(color.into());
        self.pen_width = Some(pen_width);
        self
    }

    pub fn font(mut self, font: Font) -> Self {
        self.font = font;
        self
    }

    pub fn margin(mut self, margin: f32) -> Self {
        self.margin = Some(margin);
        self
    }

    pub fn label_top(mut self) -> Self {
        self.label_loc = Some(LabelLoc::Top);
        self
    }

    pub fn rounded_filled(mut self) -> Self {
        self.rounded = true;
        self.filled = true;
        self
    }

    pub fn from_attrs(raw: &Attrs) -> Self {
        let mut style = ClusterStyle::default();
        for (key, value) in raw.iter() {
            let known = match key {
                "bgcolor" => {
                    style.background = Some(value.to_string());
                    true
                }
                "color" | "pencolor" => {
                    style.border_color = Some(value.to_string());
                    true
                }
                "penwidth" => parse_into(&mut style.pen_width, value),
                "margin" => parse_into(&mut style.margin, value),
                "labelloc" => match value {
                    "t" => {
                        style.label_loc = Some(LabelLoc::Top);
                        true
                    }
                    "b" => {
                        style.label_loc = Some(LabelLoc::Bottom);
                        true
                    }
                    _ => false,
                },
                "style" => {
                    let parts: Vec<&str> = value.split(',').map(str::trim).collect();
                    if parts.iter().all(|p| *p == "rounded" || *p == "filled") {
                        style.rounded = parts.contains(&"rounded");
                        style.filled = parts.contains(&"filled");
                        true
                    } else {
                        false
                    }
                }
                _ => style.font.absorb(key, value),
            };
            if !known {
                style.extra.set(key, value);
            }
        }
        style
    }

    pub fn to_attrs(&self) -> Attrs {
        let mut attrs = Attrs::new();
        attrs.set_opt("bgcolor", self.background.as_ref());
        let flags: Vec<&str> = [(self.rounded, "rounded"), (self.filled, "filled")]
            .into_iter()
            .filter_map(|(on, name)| on.then_some(name))
            .collect();
        if !flags.is_empty() {
            attrs.set("style", flags.join(","));
        }
        attrs.set_opt("penwidth", self.pen_width);
        attrs.set_opt("color", self.border_color.as_ref());
        self.font.write(&mut attrs);
        attrs.set_opt("margin", self.margin);
        attrs.set_opt(
            "labelloc",
            self.label_loc.map(|loc| match loc {
                LabelLoc::Top => "t",
                LabelLoc::Bottom => "b",
            }),
        );
        attrs.merge(&self.extra);
        attrs
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EdgeStyle {
    pub color: Option<String>,
    pub line: Option<LineStyle>,
    pub arrow_head: Option<ArrowShape>,
    pub arrow_size: Option<f32>,
    pub pen_width: Option<f32>,
    pub min_len: Option<u32>,
    pub font: Font,
    pub direction: EdgeDirection,
    pub extra: Attrs,
}

impl EdgeStyle {
    pub fn color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn line(mut self, line: LineStyle) -> Self {
        self.line = Some(line);
        self
    }

    pub fn arrow(mut self, head: ArrowShape) -> Self {
        self.arrow_head = Some(head);
        self
    }

    pub fn pen_width(mut self, width: f32) -> Self {
        self.pen_width = Some(width);
        self
    }

    pub fn min_len(mut self, len: u32) -> Self {
        self.min_len = Some(len);
        self
    }

    pub fn font(mut self, font: Font) -> Self {
        self.font = font;
        self
    }

    pub fn direction(mut self, direction: EdgeDirection) -> Self {
        self.direction = direction;
        self
    }

    pub fn from_attrs(raw: &Attrs) -> Self {
        let mut style = EdgeStyle::default();
        for (key, value) in raw.iter() {
            let known = match key {
                "color" => {
                    style.color = Some(value.to_string());
                    true
                }
                "style" => parse_into(&mut style.line, value),
                "arrowhead" => parse_into(&mut style.arrow_head, value),
                "arrowsize" => parse_into(&mut style.arrow_size, value),
                "penwidth" => parse_into(&mut style.pen_width, value),
                "minlen" => parse_into(&mut style.min_len, value),
                _ => style.font.absorb(key, value),
            };
            if !known {
                style.extra.set(key, value);
            }
        }
        style
    }

    pub fn to_attrs(&self) -> Attrs {
        let mut attrs = Attrs::new();
        attrs.set_opt("color", self.color.as_ref());
        attrs.set_opt("style", self.line.map(LineStyle::as_str));
        attrs.set_opt("arrowhead", self.arrow_head.map(ArrowShape::as_str));
        attrs.set_opt("arrowsize", self.arrow_size);
        attrs.set_opt("penwidth", self.pen_width);
        attrs.set_opt("minlen", self.min_len);
        self.font.write(&mut attrs);
        if self.direction != EdgeDirection::Forward {
            attrs.set("dir", self.direction.as_str());
        }
        attrs.merge(&self.extra);
        attrs
    }
}

pub(crate) fn parse_into<T: FromStr>(slot: &mut Option<T>, value: &str) -> bool {
    match value.parse() {
        Ok(v) => {
            *slot = Some(v);
            true
        }
        Err(_) => false,
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NodeKind::Generic => "generic",
            NodeKind::Server => "server",
            NodeKind::Mobile => "mobile",
            NodeKind::Internet => "internet",
            NodeKind::Database => "database",
            NodeKind::Monitoring => "monitoring",
            NodeKind::Dashboard => "dashboard",
        };
        f.write_str(name)
    }
}
