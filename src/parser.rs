use winnow::ascii::{line_ending, space0, space1, till_line_ending};
use winnow::combinator::{alt, opt, preceded, repeat, separated};
use winnow::error::ParserError;
use winnow::prelude::*;
use winnow::token::{any, take_while};

use crate::ast::*;
use crate::attrs::Attrs;
use crate::error::DiagramError;
use crate::model::Direction;
use crate::style::{EdgeDirection, NodeKind};

pub fn parse_document(source: &str) -> Result<Document, DiagramError> {
    let mut input = source;
    match document(&mut input) {
        Ok(doc) if input.trim().is_empty() => Ok(doc),
        _ => Err(syntax_error(source, input)),
    }
}

fn syntax_error(source: &str, rest: &str) -> DiagramError {
    let consumed = &source[..source.len() - rest.len()];
    let line_no = consumed.matches('\n').count() + 1;
    let context = rest.trim_start_matches([' ', '\t']).lines().next().unwrap_or("").trim();
    if context.is_empty() {
        return DiagramError::Syntax(format!("syntax error at line {line_no}: unexpected end of input"));
    }
    let context_display = if context.chars().count() > 40 {
        format!("{}...", context.chars().take(40).collect::<String>())
    } else {
        context.to_string()
    };
    DiagramError::Syntax(format!("syntax error at line {line_no}: unexpected `{context_display}`"))
}

fn document(input: &mut &str) -> winnow::Result<Document> {
    let _: Vec<()> = repeat(0.., preceded(space0, alt((comment_line, blank_line)))).parse_next(input)?;
    space0.parse_next(input)?;
    "diagram".parse_next(input)?;
    space1.parse_next(input)?;
    let direction = direction.parse_next(input)?;
    let title = opt(preceded(space1, quoted_string)).parse_next(input)?;
    line_end.parse_next(input)?;

    let mut statements = Vec::new();
    while !input.is_empty() {
        if let Some(statement) = statement_line(input)? {
            statements.push(statement);
        }
    }

    Ok(Document {
        direction,
        title,
        statements,
    })
}

/// One statement, or `None` for comments, blank lines and trailing blanks.
///
/// On failure `input` is left at the start of the offending line, which for
/// a cluster is the nested line that failed rather than the cluster header.
fn statement_line(input: &mut &str) -> winnow::Result<Option<Statement>> {
    space0.parse_next(input)?;
    if input.is_empty() {
        return Ok(None);
    }

    let line = *input;
    if is_keyword(line, "cluster") {
        let header = cluster_header.parse_next(input);
        let (label, attrs) = header.inspect_err(|_| *input = line)?;
        return cluster_body(input, label, attrs).map(Some);
    }

    let result = alt((
        comment_line.map(|_| None),
        blank_line.map(|_| None),
        defaults_line.map(Some),
        edge_line.map(Some),
        node_line.map(Some),
    ))
    .parse_next(input);
    if result.is_err() {
        *input = line;
    }
    result
}

fn comment_line(input: &mut &str) -> winnow::Result<()> {
    "%%".parse_next(input)?;
    till_line_ending.parse_next(input)?;
    line_end.parse_next(input)
}

fn blank_line(input: &mut &str) -> winnow::Result<()> {
    line_ending.void().parse_next(input)
}

/// Trailing blanks, then a newline or end of input.
fn line_end(input: &mut &str) -> winnow::Result<()> {
    space0.parse_next(input)?;
    if input.is_empty() {
        return Ok(());
    }
    line_ending.void().parse_next(input)
}

fn direction(input: &mut &str) -> winnow::Result<Direction> {
    alt((
        "TB".value(Direction::TopBottom),
        "TD".value(Direction::TopBottom),
        "BT".value(Direction::BottomTop),
        "LR".value(Direction::LeftRight),
        "RL".value(Direction::RightLeft),
    ))
    .parse_next(input)
}

fn identifier<'s>(input: &mut &'s str) -> winnow::Result<&'s str> {
    take_while(1.., |c: char| c.is_alphanumeric() || c == '_' || c == '.').parse_next(input)
}

fn quoted_string(input: &mut &str) -> winnow::Result<String> {
    '"'.parse_next(input)?;
    let mut out = String::new();
    loop {
        match any.parse_next(input)? {
            '"' => return Ok(out),
            '\\' => match any.parse_next(input)? {
                'n' => out.push('\n'),
                other => out.push(other),
            },
            '\n' | '\r' => return Err(ParserError::from_input(input)),
            c => out.push(c),
        }
    }
}

/// Turn the two-character `\n` escape into a line break.
fn unescape(text: &str) -> String {
    text.trim().replace("\\n", "\n")
}

fn defaults_line(input: &mut &str) -> winnow::Result<Statement> {
    let target = alt((
        "graph".value(DefaultsTarget::Graph),
        "node".value(DefaultsTarget::Node),
        "edge".value(DefaultsTarget::Edge),
    ))
    .parse_next(input)?;
    space0.parse_next(input)?;
    let attrs = attr_list.parse_next(input)?;
    line_end.parse_next(input)?;
    Ok(Statement::Defaults(target, attrs))
}

fn attr_list(input: &mut &str) -> winnow::Result<Attrs> {
    '['.parse_next(input)?;
    space0.parse_next(input)?;
    let pairs: Vec<(String, String)> =
        separated(0.., attr_pair, (space0, ',', space0)).parse_next(input)?;
    opt((space0, ',')).parse_next(input)?;
    space0.parse_next(input)?;
    ']'.parse_next(input)?;
    Ok(pairs.into_iter().collect())
}

fn attr_pair(input: &mut &str) -> winnow::Result<(String, String)> {
    let key = identifier.parse_next(input)?;
    space0.parse_next(input)?;
    '='.parse_next(input)?;
    space0.parse_next(input)?;
    let value = alt((
        quoted_string,
        take_while(1.., |c: char| !matches!(c, ',' | ']' | ' ' | '\t' | '\n' | '\r'))
            .map(|s: &str| s.to_string()),
    ))
    .parse_next(input)?;
    Ok((key.to_string(), value))
}

fn cluster_header(input: &mut &str) -> winnow::Result<(String, Attrs)> {
    "cluster".parse_next(input)?;
    space1.parse_next(input)?;
    let label = alt((
        quoted_string,
        take_while(1.., |c: char| !matches!(c, '[' | '\n' | '\r')).map(unescape),
    ))
    .parse_next(input)?;
    let attrs = opt(preceded(space0, attr_list)).parse_next(input)?;
    line_end.parse_next(input)?;
    Ok((label, attrs.unwrap_or_default()))
}

fn cluster_body(input: &mut &str, label: String, attrs: Attrs) -> winnow::Result<Statement> {
    let mut statements = Vec::new();
    loop {
        space0.parse_next(input)?;
        if input.is_empty() {
            // Unterminated cluster.
            return Err(ParserError::from_input(input));
        }
        if is_end_keyword(input) {
            let line = *input;
            let end = ("end", line_end).void().parse_next(input);
            end.inspect_err(|_| *input = line)?;
            break;
        }
        if let Some(statement) = statement_line(input)? {
            statements.push(statement);
        }
    }

    Ok(Statement::Cluster(ClusterDecl {
        label,
        attrs,
        statements,
    }))
}

fn is_end_keyword(input: &str) -> bool {
    input
        .strip_prefix("end")
        .is_some_and(|rest| !rest.starts_with(|c: char| c.is_alphanumeric() || c == '_' || c == '.'))
}

/// `keyword` followed by blanks; `cluster` on its own is still a node name.
fn is_keyword(input: &str, keyword: &str) -> bool {
    input
        .strip_prefix(keyword)
        .is_some_and(|rest| rest.starts_with([' ', '\t']))
}

fn node_line(input: &mut &str) -> winnow::Result<Statement> {
    let id = identifier.verify(|id: &str| id != "end").parse_next(input)?;
    let label = opt(node_label).parse_next(input)?;
    let kind = opt(preceded(space0, node_kind)).parse_next(input)?;
    let attrs = opt(preceded(space0, attr_list)).parse_next(input)?;
    line_end.parse_next(input)?;

    Ok(Statement::Node(NodeDecl {
        id: id.to_string(),
        label,
        kind,
        attrs: attrs.unwrap_or_default(),
    }))
}

fn node_label(input: &mut &str) -> winnow::Result<String> {
    '['.parse_next(input)?;
    let text = alt((
        quoted_string,
        take_while(1.., |c: char| !matches!(c, ']' | '\n' | '\r')).map(unescape),
    ))
    .parse_next(input)?;
    ']'.parse_next(input)?;
    Ok(text)
}

fn node_kind(input: &mut &str) -> winnow::Result<NodeKind> {
    preceded('@', identifier)
        .verify_map(|name: &str| name.parse::<NodeKind>().ok())
        .parse_next(input)
}

fn arrow(input: &mut &str) -> winnow::Result<EdgeDirection> {
    alt((
        "<-->".value(EdgeDirection::Both),
        "<--".value(EdgeDirection::Back),
        "-->".value(EdgeDirection::Forward),
        "---".value(EdgeDirection::None),
    ))
    .parse_next(input)
}

fn edge_label(input: &mut &str) -> winnow::Result<String> {
    '|'.parse_next(input)?;
    let text = take_while(1.., |c: char| !matches!(c, '|' | '\n' | '\r')).parse_next(input)?;
    '|'.parse_next(input)?;
    Ok(unescape(text))
}

fn edge_line(input: &mut &str) -> winnow::Result<Statement> {
    let from = identifier.parse_next(input)?;
    space0.parse_next(input)?;
    let direction = arrow.parse_next(input)?;
    let mut label = opt(edge_label).parse_next(input)?;
    space0.parse_next(input)?;
    let targets: Vec<&str> = separated(1.., identifier, (space0, '&', space0)).parse_next(input)?;
    if label.is_none() {
        label = opt(preceded(space0, edge_label)).parse_next(input)?;
    }
    let attrs = opt(preceded(space0, attr_list)).parse_next(input)?;
    line_end.parse_next(input)?;

    Ok(Statement::Edge(EdgeDecl {
        from: from.to_string(),
        targets: targets.into_iter().map(str::to_string).collect(),
        direction,
        label,
        attrs: attrs.unwrap_or_default(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parse_direction_td_is_tb() {
        let mut input = "TD";
        assert_eq!(direction(&mut input).unwrap(), Direction::TopBottom);
    }

    #[test]
    fn parse_direction_rl() {
        let mut input = "RL";
        assert_eq!(direction(&mut input).unwrap(), Direction::RightLeft);
    }

    #[test]
    fn parse_quoted_string_escapes() {
        let mut input = r#""MOBILE\nDEVICES \"x\"" rest"#;
        assert_eq!(quoted_string(&mut input).unwrap(), "MOBILE\nDEVICES \"x\"");
        assert_eq!(input, " rest");
    }

    #[test]
    fn parse_quoted_string_unterminated() {
        let mut input = "\"open\nnext";
        assert!(quoted_string(&mut input).is_err());
    }

    #[test]
    fn parse_attr_list_mixed_values() {
        let mut input = r##"[color="#1976d2", penwidth=8 , style=bold,]"##;
        let attrs = attr_list(&mut input).unwrap();
        let pairs: Vec<_> = attrs.iter().collect();
        assert_eq!(pairs, vec![("color", "#1976d2"), ("penwidth", "8"), ("style", "bold")]);
    }

    #[test]
    fn parse_empty_attr_list() {
        let mut input = "[ ]";
        assert!(attr_list(&mut input).unwrap().is_empty());
    }

    #[test]
    fn parse_arrows() {
        for (text, expected) in [
            ("-->", EdgeDirection::Forward),
            ("<--", EdgeDirection::Back),
            ("<-->", EdgeDirection::Both),
            ("---", EdgeDirection::None),
        ] {
            let mut input = text;
            assert_eq!(arrow(&mut input).unwrap(), expected, "{text}");
        }
    }

    #[test]
    fn parse_header_and_title() {
        let doc = parse_document("diagram LR \"HOME LAB\"\n").unwrap();
        assert_eq!(doc.direction, Direction::LeftRight);
        assert_eq!(doc.title.as_deref(), Some("HOME LAB"));
        assert!(doc.statements.is_empty());
    }

    #[test]
    fn parse_leading_comments() {
        let doc = parse_document("%% home lab\n\n  diagram TB\n    A\n").unwrap();
        assert_eq!(doc.title, None);
        assert_eq!(doc.statements.len(), 1);
    }

    #[test]
    fn parse_node_with_label_kind_and_attrs() {
        let doc = parse_document(
            "diagram TB\n    gw[\"GATEWAY\\nRPi 3B+\"] @server [fillcolor=\"#2c3e50\"]\n",
        )
        .unwrap();
        let Statement::Node(node) = &doc.statements[0] else {
            panic!("expected node, got {:?}", doc.statements[0]);
        };
        assert_eq!(node.id, "gw");
        assert_eq!(node.label.as_deref(), Some("GATEWAY\nRPi 3B+"));
        assert_eq!(node.kind, Some(NodeKind::Server));
        assert_eq!(node.attrs.get("fillcolor"), Some("#2c3e50"));
    }

    #[test]
    fn parse_unquoted_label_unescapes_newline() {
        let doc = parse_document("diagram TB\n    nas[NAS STORAGE\\nanno-nas]\n").unwrap();
        let Statement::Node(node) = &doc.statements[0] else {
            panic!("expected node");
        };
        assert_eq!(node.label.as_deref(), Some("NAS STORAGE\nanno-nas"));
        assert_eq!(node.kind, None);
    }

    #[test]
    fn parse_unknown_kind_is_error() {
        let err = parse_document("diagram TB\n    a @toaster\n").unwrap_err();
        assert!(err.to_string().contains("line 2"), "got: {err}");
    }

    #[test]
    fn parse_edge_label_positions() {
        let doc = parse_document("diagram TB\n    a -->|one| b\n    a --> b |two| [color=red]\n").unwrap();
        let labels: Vec<_> = doc
            .statements
            .iter()
            .map(|s| match s {
                Statement::Edge(e) => e.label.clone(),
                other => panic!("unexpected {other:?}"),
            })
            .collect();
        assert_eq!(labels, vec![Some("one".to_string()), Some("two".to_string())]);
    }

    #[test]
    fn parse_edge_fan_out() {
        let doc = parse_document("diagram TB\n    gw --> nas & app |PROXY|\n").unwrap();
        let Statement::Edge(edge) = &doc.statements[0] else {
            panic!("expected edge");
        };
        assert_eq!(edge.from, "gw");
        assert_eq!(edge.targets, vec!["nas", "app"]);
        assert_eq!(edge.label.as_deref(), Some("PROXY"));
        assert_eq!(edge.direction, EdgeDirection::Forward);
    }

    #[test]
    fn parse_defaults() {
        let doc = parse_document("diagram TB\ngraph [dpi=300]\nnode [fontsize=28]\nedge [minlen=3]\n").unwrap();
        let targets: Vec<_> = doc
            .statements
            .iter()
            .map(|s| match s {
                Statement::Defaults(t, _) => *t,
                other => panic!("unexpected {other:?}"),
            })
            .collect();
        assert_eq!(targets, vec![DefaultsTarget::Graph, DefaultsTarget::Node, DefaultsTarget::Edge]);
    }

    #[test]
    fn parse_nested_clusters() {
        let input = "\
diagram LR
cluster \"INFRA\" [bgcolor=\"#e8f5e8\"]
    cluster GATEWAY & MONITORING
        gw
    end
    nas
end
";
        let doc = parse_document(input).unwrap();
        assert_eq!(doc.statements.len(), 1);
        let Statement::Cluster(infra) = &doc.statements[0] else {
            panic!("expected cluster");
        };
        assert_eq!(infra.label, "INFRA");
        assert_eq!(infra.attrs.get("bgcolor"), Some("#e8f5e8"));
        assert_eq!(infra.statements.len(), 2);
        let Statement::Cluster(gateway) = &infra.statements[0] else {
            panic!("expected nested cluster");
        };
        assert_eq!(gateway.label, "GATEWAY & MONITORING");
    }

    #[test]
    fn node_named_like_end_prefix() {
        let doc = parse_document("diagram TB\ncluster C\n    endpoint\nend\n").unwrap();
        let Statement::Cluster(c) = &doc.statements[0] else {
            panic!("expected cluster");
        };
        assert_eq!(c.statements.len(), 1);
    }

    #[test]
    fn unterminated_cluster_is_error() {
        let err = parse_document("diagram TB\ncluster C\n    a\n").unwrap_err();
        assert!(matches!(err, DiagramError::Syntax(_)));
    }

    #[test]
    fn stray_end_is_error() {
        let err = parse_document("diagram TB\n    a\nend\n").unwrap_err();
        assert_eq!(err.to_string(), "syntax error at line 3: unexpected `end`");
    }

    #[test]
    fn error_inside_cluster_names_the_nested_line() {
        let err = parse_document("diagram TB\ncluster A\n    a\n    a ==> b\nend\n").unwrap_err();
        assert_eq!(err.to_string(), "syntax error at line 4: unexpected `a ==> b`");
    }

    #[test]
    fn error_two_clusters_deep() {
        let input = "\
diagram LR
cluster OUTER
    cluster INNER
        gw
        gw -> nas
    end
end
";
        let err = parse_document(input).unwrap_err();
        assert_eq!(err.to_string(), "syntax error at line 5: unexpected `gw -> nas`");
    }

    #[test]
    fn bad_cluster_header_names_the_header() {
        let err = parse_document("diagram TB\n    a\ncluster \"X\" [bad\n    b\nend\n").unwrap_err();
        assert_eq!(err.to_string(), "syntax error at line 3: unexpected `cluster \"X\" [bad`");
    }

    #[test]
    fn trailing_garbage_is_error() {
        let err = parse_document("diagram TB\n    a --> b garbage\n").unwrap_err();
        assert_eq!(err.to_string(), "syntax error at line 2: unexpected `a --> b garbage`");
    }

    #[test]
    fn missing_header_is_error() {
        let err = parse_document("a --> b\n").unwrap_err();
        assert!(matches!(err, DiagramError::Syntax(_)));
    }

    #[test]
    fn long_context_is_truncated() {
        let long = "x".repeat(60);
        let err = parse_document(&format!("diagram TB\n{long} ???\n")).unwrap_err();
        assert!(err.to_string().ends_with("...`"), "got: {err}");
    }
}
