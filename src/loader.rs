//! Replays a parsed declaration file through the builder.

use crate::ast::{DefaultsTarget, Document, Statement};
use crate::builder::DiagramBuilder;
use crate::error::DiagramError;
use crate::model::Diagram;
use crate::style::{ClusterStyle, EdgeStyle, NodeStyle};

pub fn load(doc: &Document) -> Result<Diagram, DiagramError> {
    let title = doc.title.clone().unwrap_or_default();
    let mut builder = DiagramBuilder::new(title).direction(doc.direction);
    declare_all(&mut builder, &doc.statements)?;
    Ok(builder.finish())
}

fn declare_all(builder: &mut DiagramBuilder, statements: &[Statement]) -> Result<(), DiagramError> {
    for statement in statements {
        match statement {
            Statement::Defaults(DefaultsTarget::Graph, attrs) => builder.merge_graph_attrs(attrs),
            Statement::Defaults(DefaultsTarget::Node, attrs) => builder.merge_node_attrs(attrs),
            Statement::Defaults(DefaultsTarget::Edge, attrs) => builder.merge_edge_attrs(attrs),
            Statement::Cluster(cluster) => {
                builder.declare_cluster(
                    cluster.label.as_str(),
                    ClusterStyle::from_attrs(&cluster.attrs),
                    |inner| declare_all(inner, &cluster.statements),
                )?;
            }
            Statement::Node(node) => {
                let mut style = NodeStyle::from_attrs(&node.attrs);
                if let Some(kind) = node.kind {
                    style.kind = kind;
                }
                let label = node.label.clone().unwrap_or_else(|| node.id.clone());
                builder.declare_node(node.id.as_str(), label, style)?;
            }
            Statement::Edge(edge) => {
                let style = EdgeStyle::from_attrs(&edge.attrs).direction(edge.direction);
                builder.fan_out(
                    edge.from.as_str(),
                    edge.targets.iter().map(String::as_str),
                    edge.label.as_deref().unwrap_or(""),
                    style,
                )?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Direction, Member};
    use crate::parser::parse_document;
    use crate::style::{EdgeDirection, LineStyle, NodeKind};
    use pretty_assertions::assert_eq;

    fn load_str(source: &str) -> Result<Diagram, DiagramError> {
        load(&parse_document(source)?)
    }

    #[test]
    fn implicit_label_is_id() {
        let d = load_str("diagram TB\n    nas\n").unwrap();
        assert_eq!(d.nodes[0].label, "nas");
    }

    #[test]
    fn duplicate_across_clusters() {
        let err = load_str("diagram TB\ncluster A\n    x\nend\ncluster B\n    x\nend\n").unwrap_err();
        assert!(matches!(err, DiagramError::DuplicateNode(ref n) if n == "x"));
    }

    #[test]
    fn edge_never_declares_nodes() {
        let err = load_str("diagram TB\n    a\n    a --> b\n").unwrap_err();
        assert!(matches!(err, DiagramError::UnknownEndpoint(ref n) if n == "b"));
    }

    #[test]
    fn styles_are_typed() {
        let d = load_str(
            "diagram LR \"Lab\"\n    a @database [fillcolor=\"#fff\"]\n    b\n    a <--> b |SYNC| [style=dotted, minlen=3]\n",
        )
        .unwrap();
        assert_eq!(d.canvas.direction, Direction::LeftRight);
        assert_eq!(d.nodes[0].style.kind, NodeKind::Database);
        assert_eq!(d.nodes[0].style.fill_color.as_deref(), Some("#fff"));
        let edge = &d.edges[0];
        assert_eq!(edge.label.as_deref(), Some("SYNC"));
        assert_eq!(edge.style.direction, EdgeDirection::Both);
        assert_eq!(edge.style.line, Some(LineStyle::Dotted));
        assert_eq!(edge.style.min_len, Some(3));
    }

    #[test]
    fn defaults_are_merged() {
        let d = load_str("diagram TB\nnode [fontsize=28]\nnode [fontcolor=\"#fff\"]\n").unwrap();
        assert_eq!(d.node_attrs.get("fontsize"), Some("28"));
        assert_eq!(d.node_attrs.get("fontcolor"), Some("#fff"));
    }

    #[test]
    fn graph_defaults_configure_the_canvas() {
        let d = load_str("diagram LR\ngraph [size=\"40,22.5!\", dpi=300, bgcolor=\"#ffffff\"]\n").unwrap();
        assert_eq!(d.canvas.size, Some((40.0, 22.5)));
        assert!(d.canvas.fill);
        assert_eq!(d.canvas.dpi, Some(300));
        assert_eq!(d.graph_attrs.get("dpi"), None);
        assert_eq!(d.graph_attrs.get("bgcolor"), Some("#ffffff"));
    }

    #[test]
    fn clusters_keep_their_members() {
        let d = load_str("diagram TB\ncluster \"CORE\" [penwidth=4]\n    nas\n    app\nend\n").unwrap();
        let Member::Cluster(core) = &d.members[0] else {
            panic!("expected cluster");
        };
        assert_eq!(core.label, "CORE");
        assert_eq!(core.style.pen_width, Some(4.0));
        assert_eq!(core.members, vec![Member::Node(0), Member::Node(1)]);
    }
}
