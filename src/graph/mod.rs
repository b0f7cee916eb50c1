//! Abstract diagram graph
//!
//! The graph is what the layout engine receives: nodes with structured
//! labels and named ports, and edges between port references. No coordinates
//! are computed here. [`dot`] turns the graph into layout-engine input text.

pub mod assembler;
pub mod dot;

use serde::Serialize;
use std::fmt;

use crate::entities::cable::WireId;
use crate::entities::connector::Side;
use crate::entities::mate::ArrowDirection;

pub use assembler::assemble;

/// A named attachment point on a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Port {
    /// One side of a connector pin
    Pin { pin: u32, side: Side },
    /// A cable wire or the shield
    Wire(WireId),
}

impl Port {
    /// Port name used in the node label, e.g. `p1r`, `w3` or `ws`
    pub fn port_id(&self) -> String {
        match self {
            Port::Pin { pin, side: Side::Left } => format!("p{}l", pin),
            Port::Pin { pin, side: Side::Right } => format!("p{}r", pin),
            Port::Wire(wire) => format!("w{}", wire),
        }
    }
}

/// Side of a node an edge enters or leaves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Compass {
    East,
    West,
}

impl Compass {
    pub fn as_str(&self) -> &'static str {
        match self {
            Compass::East => "e",
            Compass::West => "w",
        }
    }
}

/// Structured edge endpoint; a node without a port is addressed as a whole
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct PortRef {
    pub node: String,
    pub port: Option<Port>,
    pub compass: Compass,
}

impl PortRef {
    pub fn new(node: impl Into<String>, port: Option<Port>, compass: Compass) -> Self {
        Self {
            node: node.into(),
            port,
            compass,
        }
    }
}

/// Colon-separated color list, outermost band first
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ColorSpec(pub Vec<String>);

impl ColorSpec {
    pub fn new<I, S>(colors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(colors.into_iter().map(Into::into).collect())
    }
}

impl fmt::Display for ColorSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join(":"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Connector,
    Cable,
    Bundle,
}

/// One cell of a label row
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Cell {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<Port>,
    /// Background color spec (hex codes joined by `:`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bgcolor: Option<String>,
}

impl Cell {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn with_port(mut self, port: Port) -> Self {
        self.port = Some(port);
        self
    }

    pub fn with_bgcolor(mut self, bgcolor: impl Into<String>) -> Self {
        self.bgcolor = Some(bgcolor.into());
        self
    }
}

/// A row of a node label
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "row", rename_all = "snake_case")]
pub enum Row {
    /// Plain cells side by side
    Cells { cells: Vec<Cell> },
    /// A wire: descriptive cells above a colored line carrying the port
    Wire {
        port: Port,
        colors: Vec<String>,
        cells: Vec<Cell>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Node {
    pub id: String,
    pub kind: NodeKind,
    /// Fill color as a hex code
    pub fillcolor: String,
    pub rows: Vec<Row>,
}

impl Node {
    /// Every port named in the label, in row order
    pub fn ports(&self) -> Vec<Port> {
        let mut ports = Vec::new();
        for row in &self.rows {
            match row {
                Row::Cells { cells } => ports.extend(cells.iter().filter_map(|c| c.port)),
                Row::Wire { port, cells, .. } => {
                    ports.extend(cells.iter().filter_map(|c| c.port));
                    ports.push(*port);
                }
            }
        }
        ports
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind {
    /// A connection through a cable wire
    Wire,
    /// A connector loop bridging two pins
    Loop,
    /// A mate between pins or connectors
    Mate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeStyle {
    Bold,
    Dashed,
}

impl EdgeStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeStyle::Bold => "bold",
            EdgeStyle::Dashed => "dashed",
        }
    }
}

/// One logical edge
///
/// Wire edges pass through the cable node: `tail -> via.0` and `via.1 -> head`.
/// Either end may be missing for open wires. Loops and mates join `tail` and
/// `head` directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Edge {
    pub kind: EdgeKind,
    pub tail: Option<PortRef>,
    pub via: Option<(PortRef, PortRef)>,
    pub head: Option<PortRef>,
    pub color: ColorSpec,
    pub direction: ArrowDirection,
    pub style: EdgeStyle,
}

impl Edge {
    /// The drawable segments of this edge
    pub fn segments(&self) -> Vec<(&PortRef, &PortRef)> {
        match &self.via {
            Some((enter, leave)) => {
                let mut segments = Vec::with_capacity(2);
                if let Some(tail) = &self.tail {
                    segments.push((tail, enter));
                }
                if let Some(head) = &self.head {
                    segments.push((leave, head));
                }
                segments
            }
            None => match (&self.tail, &self.head) {
                (Some(tail), Some(head)) => vec![(tail, head)],
                _ => Vec::new(),
            },
        }
    }
}

/// The full diagram of one harness
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Graph {
    pub fontname: String,
    /// Page background as a hex code
    pub bgcolor: String,
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

impl Graph {
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn edges_of(&self, kind: EdgeKind) -> impl Iterator<Item = &Edge> {
        self.edges.iter().filter(move |e| e.kind == kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_ids() {
        assert_eq!(Port::Pin { pin: 3, side: Side::Left }.port_id(), "p3l");
        assert_eq!(Port::Pin { pin: 3, side: Side::Right }.port_id(), "p3r");
        assert_eq!(Port::Wire(WireId::Wire(2)).port_id(), "w2");
        assert_eq!(Port::Wire(WireId::Shield).port_id(), "ws");
    }

    #[test]
    fn test_open_wire_segments() {
        let enter = PortRef::new("W1", Some(Port::Wire(WireId::Wire(1))), Compass::West);
        let leave = PortRef::new("W1", Some(Port::Wire(WireId::Wire(1))), Compass::East);
        let edge = Edge {
            kind: EdgeKind::Wire,
            tail: Some(PortRef::new("X1", None, Compass::East)),
            via: Some((enter, leave)),
            head: None,
            color: ColorSpec::new(["#000000"]),
            direction: ArrowDirection::None,
            style: EdgeStyle::Bold,
        };
        let segments = edge.segments();
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].0.node, "X1");
        assert_eq!(segments[0].1.compass, Compass::West);
    }

    #[test]
    fn test_color_spec_display() {
        let spec = ColorSpec::new(["#000000", "#FF0000", "#000000"]);
        assert_eq!(spec.to_string(), "#000000:#FF0000:#000000");
    }
}
