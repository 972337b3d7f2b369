//! Single-pass diagram construction.
//!
//! Nodes, clusters and edges are declared once, in order. Clusters nest by
//! running a closure: everything declared inside it lands in that cluster.
//! Node names are unique across the whole diagram, and an edge may only
//! reference nodes declared before it.

use std::collections::HashMap;

use crate::attrs::Attrs;
use crate::error::DiagramError;
use crate::model::{
    CanvasConfig, Cluster, ClusterRef, Diagram, Direction, Edge, Member, Node, NodeRef,
    default_filename,
};
use crate::style::{ClusterStyle, EdgeStyle, NodeStyle};

#[derive(Debug, Default)]
pub struct DiagramBuilder {
    title: String,
    filename: Option<String>,
    canvas: CanvasConfig,
    graph_attrs: Attrs,
    node_attrs: Attrs,
    edge_attrs: Attrs,
    nodes: Vec<Node>,
    by_name: HashMap<String, usize>,
    root: Vec<Member>,
    open: Vec<Cluster>,
    next_cluster: usize,
    edges: Vec<Edge>,
}

impl DiagramBuilder {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn direction(mut self, direction: Direction) -> Self {
        self.canvas.direction = direction;
        self
    }

    pub fn canvas(mut self, canvas: CanvasConfig) -> Self {
        self.canvas = canvas;
        self
    }

    pub fn filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    pub fn graph_attrs(mut self, attrs: Attrs) -> Self {
        self.graph_attrs.merge(&attrs);
        self
    }

    pub fn node_attrs(mut self, attrs: Attrs) -> Self {
        self.node_attrs.merge(&attrs);
        self
    }

    pub fn edge_attrs(mut self, attrs: Attrs) -> Self {
        self.edge_attrs.merge(&attrs);
        self
    }

    pub fn set_canvas(&mut self, canvas: CanvasConfig) {
        self.canvas = canvas;
    }

    /// Merge graph attributes; canvas keys such as `size` and `dpi` update
    /// the canvas instead.
    pub fn merge_graph_attrs(&mut self, attrs: &Attrs) {
        let rest = self.canvas.absorb(attrs);
        self.graph_attrs.merge(&rest);
    }

    pub fn merge_node_attrs(&mut self, attrs: &Attrs) {
        self.node_attrs.merge(attrs);
    }

    pub fn merge_edge_attrs(&mut self, attrs: &Attrs) {
        self.edge_attrs.merge(attrs);
    }

    pub fn declare_node(
        &mut self,
        name: impl Into<String>,
        label: impl Into<String>,
        style: NodeStyle,
    ) -> Result<NodeRef, DiagramError> {
        let name = name.into();
        if self.by_name.contains_key(&name) {
            return Err(DiagramError::DuplicateNode(name));
        }

        let index = self.nodes.len();
        self.nodes.push(Node {
            name: name.clone(),
            label: label.into(),
            style,
        });
        self.by_name.insert(name.clone(), index);
        self.members_mut().push(Member::Node(index));
        tracing::trace!(node = %name, depth = self.open.len(), "declared node");
        Ok(NodeRef(name))
    }

    /// Declare a cluster whose contents are whatever `children` declares.
    ///
    /// The cluster is attached to its parent even when `children` fails, and
    /// the error is returned unchanged.
    pub fn declare_cluster<F>(
        &mut self,
        name: impl Into<String>,
        style: ClusterStyle,
        children: F,
    ) -> Result<ClusterRef, DiagramError>
    where
        F: FnOnce(&mut Self) -> Result<(), DiagramError>,
    {
        let id = ClusterRef {
            index: self.next_cluster,
            depth: self.open.len(),
        };
        self.next_cluster += 1;
        self.open.push(Cluster {
            id,
            label: name.into(),
            style,
            members: Vec::new(),
        });

        let result = children(self);

        if let Some(cluster) = self.open.pop() {
            tracing::trace!(cluster = %cluster.label, members = cluster.members.len(), "closed cluster");
            self.members_mut().push(Member::Cluster(cluster));
        }
        result.map(|()| id)
    }

    /// Append a directed edge. An empty `label` means no label.
    pub fn declare_edge(
        &mut self,
        from: impl Into<NodeRef>,
        to: impl Into<NodeRef>,
        label: &str,
        style: EdgeStyle,
    ) -> Result<(), DiagramError> {
        let from = from.into();
        let to = to.into();
        self.check_endpoint(&from)?;
        self.check_endpoint(&to)?;
        self.edges.push(Edge {
            from: from.0,
            to: to.0,
            label: (!label.is_empty()).then(|| label.to_string()),
            style,
        });
        Ok(())
    }

    /// One edge from `from` to each target, sharing label and style.
    /// Nothing is appended if any endpoint is unknown.
    pub fn fan_out<T>(
        &mut self,
        from: impl Into<NodeRef>,
        targets: impl IntoIterator<Item = T>,
        label: &str,
        style: EdgeStyle,
    ) -> Result<(), DiagramError>
    where
        T: Into<NodeRef>,
    {
        let from = from.into();
        let targets: Vec<NodeRef> = targets.into_iter().map(Into::into).collect();
        self.check_endpoint(&from)?;
        for target in &targets {
            self.check_endpoint(target)?;
        }
        for target in targets {
            self.declare_edge(&from, target, label, style.clone())?;
        }
        Ok(())
    }

    pub fn contains_node(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn finish(self) -> Diagram {
        let filename = self
            .filename
            .unwrap_or_else(|| default_filename(&self.title));
        tracing::debug!(
            nodes = self.nodes.len(),
            edges = self.edges.len(),
            clusters = self.next_cluster,
            "diagram built"
        );
        Diagram {
            title: self.title,
            filename,
            canvas: self.canvas,
            graph_attrs: self.graph_attrs,
            node_attrs: self.node_attrs,
            edge_attrs: self.edge_attrs,
            nodes: self.nodes,
            members: self.root,
            edges: self.edges,
        }
    }

    fn check_endpoint(&self, node: &NodeRef) -> Result<(), DiagramError> {
        if self.by_name.contains_key(node.name()) {
            Ok(())
        } else {
            Err(DiagramError::UnknownEndpoint(node.name().to_string()))
        }
    }

    fn members_mut(&mut self) -> &mut Vec<Member> {
        match self.open.last_mut() {
            Some(cluster) => &mut cluster.members,
            None => &mut self.root,
        }
    }
}
