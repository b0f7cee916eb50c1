//! Graph assembler - lays out nodes, ports and edges for a validated harness

use crate::core::colors::{self, ColorMode, BLACK, WHITE};
use crate::core::designator::is_generated;
use crate::core::error::{HarnessError, Result};
use crate::entities::cable::{Cable, WireId};
use crate::entities::connection::PinRef;
use crate::entities::connector::{Connector, Side};
use crate::entities::harness::Harness;
use crate::entities::mate::{ArrowDirection, ArrowWeight, Mate};
use crate::entities::options::Options;
use crate::graph::{
    Cell, ColorSpec, Compass, Edge, EdgeKind, EdgeStyle, Graph, Node, NodeKind, Port, PortRef,
    Row,
};

/// Hex spec for a color code, e.g. `GNYE` as `#00FF00:#FFFF00`
fn hex(color: &str) -> Result<String> {
    Ok(colors::hex_codes(color, false)?.join(":"))
}

fn part_row(part: &crate::entities::common::PartInfo) -> Option<Row> {
    let mut cells = Vec::new();
    if let Some(pn) = &part.pn {
        cells.push(Cell::text(format!("P/N: {}", pn)));
    }
    match (&part.manufacturer, &part.mpn) {
        (Some(m), Some(mpn)) => cells.push(Cell::text(format!("{}: {}", m, mpn))),
        (Some(m), None) => cells.push(Cell::text(m.clone())),
        (None, Some(mpn)) => cells.push(Cell::text(format!("MPN: {}", mpn))),
        (None, None) => {}
    }
    match (&part.supplier, &part.spn) {
        (Some(s), Some(spn)) => cells.push(Cell::text(format!("{}: {}", s, spn))),
        (Some(s), None) => cells.push(Cell::text(s.clone())),
        (None, Some(spn)) => cells.push(Cell::text(format!("SPN: {}", spn))),
        (None, None) => {}
    }
    (!cells.is_empty()).then_some(Row::Cells { cells })
}

fn notes_row(notes: &Option<String>) -> Option<Row> {
    notes.as_ref().map(|n| Row::Cells {
        cells: vec![Cell::text(n.clone())],
    })
}

fn color_cell(color: &str, mode: ColorMode) -> Result<Cell> {
    Ok(Cell::text(colors::translate(color, mode)?).with_bgcolor(hex(color)?))
}

fn connector_node(connector: &Connector, options: &Options) -> Result<Node> {
    let mode = options.color_mode;
    let mut rows = Vec::new();

    if connector.shows_name() {
        rows.push(Row::Cells {
            cells: vec![Cell::text(connector.designator.clone())],
        });
    }

    let mut info: Vec<Cell> = connector
        .kind
        .iter()
        .chain(connector.subtype.iter())
        .map(|s| Cell::text(s.clone()))
        .collect();
    if connector.shows_pincount() {
        info.push(Cell::text(format!("{}-pin", connector.pincount())));
    }
    if let Some(color) = &connector.color {
        info.push(color_cell(color, mode)?);
    }
    if !info.is_empty() {
        rows.push(Row::Cells { cells: info });
    }
    rows.extend(part_row(&connector.part));

    if !connector.is_simple() {
        for pin in connector.visible_pins() {
            let mut cells = Vec::new();
            if connector.ports_left {
                cells.push(Cell::text(pin.to_string()).with_port(Port::Pin {
                    pin,
                    side: Side::Left,
                }));
            }
            if let Some(label) = connector.label_of(pin) {
                cells.push(Cell::text(label));
            }
            if let Some(color) = connector.color_of(pin) {
                cells.push(color_cell(color, mode)?);
            }
            if connector.ports_right {
                cells.push(Cell::text(pin.to_string()).with_port(Port::Pin {
                    pin,
                    side: Side::Right,
                }));
            }
            if !connector.ports_left && !connector.ports_right {
                cells.insert(0, Cell::text(pin.to_string()));
            }
            rows.push(Row::Cells { cells });
        }
    }
    rows.extend(notes_row(&connector.notes));

    Ok(Node {
        id: connector.designator.clone(),
        kind: NodeKind::Connector,
        fillcolor: hex(options.connector_bgcolor())?,
        rows,
    })
}

/// `X1:3:GND` style text for the pin at one end of a wire
fn pin_text(harness: &Harness, pin: &PinRef) -> String {
    let Some(connector) = harness.connector(&pin.connector) else {
        return pin.to_string();
    };
    let mut parts = Vec::new();
    if !is_generated(&connector.designator) {
        parts.push(connector.designator.clone());
    }
    if !connector.is_simple() {
        parts.push(pin.pin.to_string());
        if let Some(label) = connector.label_of(pin.pin) {
            parts.push(label.to_string());
        }
    }
    parts.join(":")
}

fn cable_node(harness: &Harness, cable: &Cable, pad: bool) -> Result<Node> {
    let options = &harness.options;
    let mode = options.color_mode;
    let mut rows = Vec::new();

    if cable.shows_name() {
        rows.push(Row::Cells {
            cells: vec![Cell::text(cable.designator.clone())],
        });
    }

    let mut info: Vec<Cell> = cable.kind.iter().map(|s| Cell::text(s.clone())).collect();
    if cable.shows_wirecount() {
        info.push(Cell::text(format!("{}x", cable.wirecount)));
    }
    if let Some(gauge) = &cable.gauge {
        let text = match cable.show_equiv.then(|| gauge.equivalent()).flatten() {
            Some(equiv) => format!("{} ({})", gauge, equiv),
            None => gauge.to_string(),
        };
        info.push(Cell::text(text));
    }
    if cable.shield.is_present() {
        info.push(Cell::text("+ S"));
    }
    if cable.length > 0.0 {
        info.push(Cell::text(format!(
            "{} {}",
            crate::bom::entry::format_qty(cable.length),
            cable.length_unit
        )));
    }
    if let Some(color) = &cable.color {
        info.push(color_cell(color, mode)?);
    }
    if !info.is_empty() {
        rows.push(Row::Cells { cells: info });
    }
    rows.extend(part_row(&cable.part));

    for wire in cable.wires() {
        let mut from = Vec::new();
        let mut to = Vec::new();
        for connection in harness
            .connections()
            .iter()
            .filter(|c| c.via.cable == cable.designator && c.via.wire == wire)
        {
            from.extend(connection.from.as_ref().map(|p| pin_text(harness, p)));
            to.extend(connection.to.as_ref().map(|p| pin_text(harness, p)));
        }

        let mut middle = Vec::new();
        match wire {
            WireId::Wire(n) => {
                if cable.shows_wirenumbers() {
                    middle.push(n.to_string());
                }
                if let Some(color) = cable.wire_color(wire) {
                    middle.push(colors::translate(color, mode)?);
                }
                if let Some(label) = cable.wire_label(wire) {
                    middle.push(label.to_string());
                }
            }
            WireId::Shield => middle.push("Shield".to_string()),
        }

        let colors = match cable.wire_color(wire) {
            Some(color) => colors::hex_codes(color, pad)?
                .into_iter()
                .map(str::to_string)
                .collect(),
            None => vec![BLACK.to_string()],
        };
        rows.push(Row::Wire {
            port: Port::Wire(wire),
            colors,
            cells: vec![
                Cell::text(from.join(", ")),
                Cell::text(middle.join(":")),
                Cell::text(to.join(", ")),
            ],
        });
    }
    rows.extend(notes_row(&cable.notes));

    let (kind, fill) = if cable.is_bundle() {
        (NodeKind::Bundle, options.bundle_bgcolor())
    } else {
        (NodeKind::Cable, options.cable_bgcolor())
    };
    Ok(Node {
        id: cable.designator.clone(),
        kind,
        fillcolor: hex(fill)?,
        rows,
    })
}

fn loop_edges(connector: &Connector) -> Result<Vec<Edge>> {
    if connector.loops.is_empty() {
        return Ok(Vec::new());
    }
    let side = connector.loop_side()?;
    let compass = match side {
        Side::Left => Compass::West,
        Side::Right => Compass::East,
    };
    let end = |pin: u32| {
        PortRef::new(
            connector.designator.as_str(),
            Some(Port::Pin { pin, side }),
            compass,
        )
    };
    Ok(connector
        .loops
        .iter()
        .map(|&(a, b)| Edge {
            kind: EdgeKind::Loop,
            tail: Some(end(a)),
            via: None,
            head: Some(end(b)),
            color: ColorSpec::new([BLACK, WHITE, BLACK]),
            direction: ArrowDirection::None,
            style: EdgeStyle::Bold,
        })
        .collect())
}

/// Port reference for a connector pin; simple connectors are addressed as a whole
fn pin_port(harness: &Harness, pin: &PinRef, side: Side, compass: Compass) -> PortRef {
    let simple = harness
        .connector(&pin.connector)
        .is_some_and(Connector::is_simple);
    let port = (!simple).then_some(Port::Pin { pin: pin.pin, side });
    PortRef::new(pin.connector.as_str(), port, compass)
}

fn wire_color(cable: &Cable, wire: WireId, pad: bool) -> Result<ColorSpec> {
    match cable.wire_color(wire) {
        Some(color) => {
            let mut bands = vec![BLACK];
            bands.extend(colors::hex_codes(color, pad)?);
            bands.push(BLACK);
            Ok(ColorSpec::new(bands))
        }
        None => Ok(ColorSpec::new([BLACK])),
    }
}

fn mate_edge(harness: &Harness, mate: &Mate) -> Edge {
    let arrow = mate.arrow();
    let (tail, head) = match mate {
        Mate::Pin { from, to, .. } => (
            pin_port(harness, from, Side::Right, Compass::East),
            pin_port(harness, to, Side::Left, Compass::West),
        ),
        Mate::Component { from, to, .. } => (
            PortRef::new(from.as_str(), None, Compass::East),
            PortRef::new(to.as_str(), None, Compass::West),
        ),
    };
    let color = match arrow.weight {
        ArrowWeight::Single => ColorSpec::new([BLACK]),
        ArrowWeight::Double => ColorSpec::new([BLACK, BLACK]),
    };
    Edge {
        kind: EdgeKind::Mate,
        tail: Some(tail),
        via: None,
        head: Some(head),
        color,
        direction: arrow.direction,
        style: EdgeStyle::Dashed,
    }
}

/// Build the diagram graph of a harness
pub fn assemble(harness: &Harness) -> Result<Graph> {
    let options = &harness.options;
    let pad = harness.has_multicolor_wires();

    let mut nodes = Vec::new();
    let mut edges = Vec::new();

    for connector in harness.connectors() {
        nodes.push(connector_node(connector, options)?);
        edges.extend(loop_edges(connector)?);
    }
    for cable in harness.cables() {
        nodes.push(cable_node(harness, cable, pad)?);
    }

    for connection in harness.connections() {
        let via = &connection.via;
        let cable = harness
            .cable(&via.cable)
            .ok_or_else(|| HarnessError::unresolved(format!("cable {}", via.cable)))?;
        let wire_port = Some(Port::Wire(via.wire));
        edges.push(Edge {
            kind: EdgeKind::Wire,
            tail: connection
                .from
                .as_ref()
                .map(|p| pin_port(harness, p, Side::Right, Compass::East)),
            via: Some((
                PortRef::new(via.cable.as_str(), wire_port, Compass::West),
                PortRef::new(via.cable.as_str(), wire_port, Compass::East),
            )),
            head: connection
                .to
                .as_ref()
                .map(|p| pin_port(harness, p, Side::Left, Compass::West)),
            color: wire_color(cable, via.wire, pad)?,
            direction: ArrowDirection::None,
            style: EdgeStyle::Bold,
        });
    }

    for mate in harness.mates() {
        edges.push(mate_edge(harness, mate));
    }

    log::debug!("graph has {} nodes and {} edges", nodes.len(), edges.len());
    Ok(Graph {
        fontname: options.fontname.clone(),
        bgcolor: hex(&options.bgcolor)?,
        nodes,
        edges,
    })
}
