//! GraphViz DOT output
//!
//! The only place where structured port references become `node:port:compass`
//! text. Node labels are written as HTML-like tables.

use std::fmt::Write;

use crate::entities::mate::ArrowDirection;
use crate::graph::{Cell, Edge, Graph, Node, PortRef, Row};

/// Escape text for an HTML-like label
fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\n' => out.push_str("<br/>"),
            c => out.push(c),
        }
    }
    out
}

/// Quote an identifier for DOT
fn quote(id: &str) -> String {
    format!("\"{}\"", id.replace('\\', "\\\\").replace('"', "\\\""))
}

/// `"X1":"p1r":e` style endpoint
pub fn endpoint(port: &PortRef) -> String {
    match &port.port {
        Some(p) => format!(
            "{}:{}:{}",
            quote(&port.node),
            quote(&p.port_id()),
            port.compass.as_str()
        ),
        None => format!("{}:{}", quote(&port.node), port.compass.as_str()),
    }
}

fn cell_html(cell: &Cell) -> String {
    let mut attrs = String::new();
    if let Some(port) = &cell.port {
        let _ = write!(attrs, " port=\"{}\"", port.port_id());
    }
    if let Some(bgcolor) = &cell.bgcolor {
        let _ = write!(attrs, " bgcolor=\"{}\"", bgcolor);
    }
    format!("<td{}>{}</td>", attrs, escape(&cell.text))
}

fn cells_table(cells: &[Cell]) -> String {
    let inner: String = cells.iter().map(cell_html).collect();
    format!(
        "<table border=\"0\" cellspacing=\"0\" cellpadding=\"3\" cellborder=\"1\"><tr>{}</tr></table>",
        inner
    )
}

fn node_label(node: &Node) -> String {
    let mut html = String::from("<table border=\"0\" cellspacing=\"0\" cellpadding=\"0\">");
    for row in &node.rows {
        match row {
            Row::Cells { cells } => {
                let _ = write!(html, "<tr><td>{}</td></tr>", cells_table(cells));
            }
            Row::Wire {
                port,
                colors,
                cells,
            } => {
                let _ = write!(html, "<tr><td>{}</td></tr>", cells_table(cells));
                let bands: String = colors
                    .iter()
                    .map(|c| format!("<tr><td bgcolor=\"{}\" height=\"2\"></td></tr>", c))
                    .collect();
                let _ = write!(
                    html,
                    "<tr><td port=\"{}\" height=\"{}\"><table border=\"0\" cellspacing=\"0\" cellborder=\"0\">{}</table></td></tr>",
                    port.port_id(),
                    2 * colors.len().max(1),
                    bands
                );
            }
        }
    }
    html.push_str("</table>");
    html
}

fn edge_attrs(edge: &Edge) -> String {
    let mut attrs = format!("color=\"{}\"", edge.color);
    if edge.style.as_str() != "bold" {
        let _ = write!(attrs, " style=\"{}\"", edge.style.as_str());
    }
    if edge.direction != ArrowDirection::None {
        let _ = write!(attrs, " dir=\"{}\"", edge.direction);
    }
    attrs
}

/// Render a graph as DOT text for the layout engine
pub fn to_dot(graph: &Graph) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "graph {{");
    let _ = writeln!(
        out,
        "  // Graph generated by {} {}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    );
    let _ = writeln!(
        out,
        "  graph [rankdir=\"LR\" ranksep=\"2\" bgcolor=\"{}\" nodesep=\"0.33\" fontname=\"{}\"]",
        graph.bgcolor, graph.fontname
    );
    let _ = writeln!(
        out,
        "  node [shape=\"none\" width=\"0\" height=\"0\" margin=\"0\" style=\"filled\" fontname=\"{}\"]",
        graph.fontname
    );
    let _ = writeln!(out, "  edge [style=\"bold\" fontname=\"{}\"]", graph.fontname);

    for node in &graph.nodes {
        let _ = writeln!(
            out,
            "  {} [label=<{}> fillcolor=\"{}\"]",
            quote(&node.id),
            node_label(node),
            node.fillcolor
        );
    }

    for edge in &graph.edges {
        let attrs = edge_attrs(edge);
        for (tail, head) in edge.segments() {
            let _ = writeln!(out, "  {} -- {} [{}]", endpoint(tail), endpoint(head), attrs);
        }
    }
    out.push_str("}\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::builder::{build_harness, HarnessDocument};
    use crate::entities::cable::WireId;
    use crate::graph::{assemble, Compass, Port};

    #[test]
    fn test_endpoint_text() {
        let port = PortRef::new("X1", Some(Port::Wire(WireId::Shield)), Compass::East);
        assert_eq!(endpoint(&port), "\"X1\":\"ws\":e");
        let whole = PortRef::new("F1", None, Compass::West);
        assert_eq!(endpoint(&whole), "\"F1\":w");
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape("A<B> & \"C\""), "A&lt;B&gt; &amp; &quot;C&quot;");
    }

    #[test]
    fn test_dot_output() {
        let yaml = r#"
connectors:
  X1:
    pincount: 2
    pinlabels: [GND, "<SIG>"]
  X2:
    pincount: 2
cables:
  W1:
    colors: [RD, BK]
connections:
  - - X1: [1, 2]
    - W1: [1, 2]
    - X2: [1, 2]
  - - X1: [1]
    - '-->'
    - X2: [2]
"#;
        let document = HarnessDocument::from_value(serde_yml::from_str(yaml).unwrap()).unwrap();
        let graph = assemble(&build_harness(&document).unwrap()).unwrap();
        let dot = to_dot(&graph);

        assert!(dot.starts_with("graph {"));
        assert!(dot.contains("\"X1\":\"p1r\":e -- \"W1\":\"w1\":w [color=\"#000000:#FF0000:#000000\"]"));
        assert!(dot.contains("\"W1\":\"w1\":e -- \"X2\":\"p1l\":w"));
        assert!(dot.contains("&lt;SIG&gt;"));
        assert!(dot.contains("style=\"dashed\" dir=\"forward\""));
        assert!(dot.trim_end().ends_with('}'));
    }
}
