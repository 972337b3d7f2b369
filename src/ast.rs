use crate::attrs::Attrs;
use crate::model::Direction;
use crate::style::{EdgeDirection, NodeKind};

#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub direction: Direction,
    pub title: Option<String>,
    pub statements: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Defaults(DefaultsTarget, Attrs),
    Cluster(ClusterDecl),
    Node(NodeDecl),
    Edge(EdgeDecl),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultsTarget {
    Graph,
    Node,
    Edge,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClusterDecl {
    pub label: String,
    pub attrs: Attrs,
    pub statements: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NodeDecl {
    pub id: String,
    pub label: Option<String>,
    pub kind: Option<NodeKind>,
    pub attrs: Attrs,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EdgeDecl {
    pub from: String,
    pub targets: Vec<String>,
    pub direction: EdgeDirection,
    pub label: Option<String>,
    pub attrs: Attrs,
}
