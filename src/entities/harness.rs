//! Harness aggregate - owns every connector, cable, connection and mate of one file

use std::collections::HashMap;

use crate::core::error::{HarnessError, Result};
use crate::entities::cable::Cable;
use crate::entities::common::AdditionalBomItem;
use crate::entities::connection::{Connection, PinRef, WireRef};
use crate::entities::connector::{Connector, Side};
use crate::entities::mate::Mate;
use crate::entities::options::{Metadata, Options};

/// Which end of a wire a pin is attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum WireEnd {
    From,
    To,
}

/// A complete, validated harness
///
/// Connectors and cables keep insertion order. Every connection and mate
/// added through [`Harness::connect`] and [`Harness::add_mate`] is checked
/// against the components already present.
#[derive(Debug, Clone, Default)]
pub struct Harness {
    pub metadata: Metadata,
    pub options: Options,
    connectors: Vec<Connector>,
    connector_index: HashMap<String, usize>,
    cables: Vec<Cable>,
    cable_index: HashMap<String, usize>,
    connections: Vec<Connection>,
    mates: Vec<Mate>,
    additional_bom_items: Vec<AdditionalBomItem>,
    pin_claims: HashMap<(PinRef, Side), WireRef>,
    wire_claims: HashMap<(WireRef, WireEnd), PinRef>,
}

impl Harness {
    pub fn new(metadata: Metadata, options: Options) -> Self {
        Self {
            metadata,
            options,
            ..Default::default()
        }
    }

    pub fn add_connector(&mut self, connector: Connector) -> Result<()> {
        if self.connector_index.contains_key(&connector.designator) {
            return Err(HarnessError::configuration(format!(
                "connector {} is defined more than once",
                connector.designator
            )));
        }
        self.connector_index
            .insert(connector.designator.clone(), self.connectors.len());
        self.connectors.push(connector);
        Ok(())
    }

    pub fn add_cable(&mut self, cable: Cable) -> Result<()> {
        if self.cable_index.contains_key(&cable.designator) {
            return Err(HarnessError::configuration(format!(
                "cable {} is defined more than once",
                cable.designator
            )));
        }
        self.cable_index
            .insert(cable.designator.clone(), self.cables.len());
        self.cables.push(cable);
        Ok(())
    }

    pub fn add_bom_item(&mut self, item: AdditionalBomItem) {
        self.additional_bom_items.push(item);
    }

    pub fn connectors(&self) -> &[Connector] {
        &self.connectors
    }

    pub fn cables(&self) -> &[Cable] {
        &self.cables
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    pub fn mates(&self) -> &[Mate] {
        &self.mates
    }

    pub fn additional_bom_items(&self) -> &[AdditionalBomItem] {
        &self.additional_bom_items
    }

    pub fn connector(&self, designator: &str) -> Option<&Connector> {
        self.connector_index
            .get(designator)
            .map(|&i| &self.connectors[i])
    }

    pub fn cable(&self, designator: &str) -> Option<&Cable> {
        self.cable_index.get(designator).map(|&i| &self.cables[i])
    }

    pub fn has_connector(&self, designator: &str) -> bool {
        self.connector_index.contains_key(designator)
    }

    pub fn has_cable(&self, designator: &str) -> bool {
        self.cable_index.contains_key(designator)
    }

    /// Cables connected to the given connector pin, in connection order
    pub fn wires_at(&self, pin: &PinRef) -> Vec<&WireRef> {
        self.connections
            .iter()
            .filter(|c| c.from.as_ref() == Some(pin) || c.to.as_ref() == Some(pin))
            .map(|c| &c.via)
            .collect()
    }

    /// Whether any wire in the harness is striped
    pub fn has_multicolor_wires(&self) -> bool {
        self.cables.iter().any(|c| c.has_multicolor_wire())
    }

    fn connector_mut(&mut self, designator: &str) -> Option<&mut Connector> {
        match self.connector_index.get(designator) {
            Some(&i) => Some(&mut self.connectors[i]),
            None => None,
        }
    }

    fn cable_mut(&mut self, designator: &str) -> Option<&mut Cable> {
        match self.cable_index.get(designator) {
            Some(&i) => Some(&mut self.cables[i]),
            None => None,
        }
    }

    fn check_pin(&self, pin: &PinRef) -> Result<()> {
        let connector = self
            .connector(&pin.connector)
            .ok_or_else(|| HarnessError::unresolved(format!("connector {}", pin.connector)))?;
        if !connector.has_pin(pin.pin) {
            return Err(HarnessError::unresolved(pin.to_string()));
        }
        Ok(())
    }

    fn claim_pin(&self, pin: &PinRef, side: Side, wire: &WireRef) -> Result<()> {
        // a pin side takes one claim, even from the same wire
        match self.pin_claims.get(&(pin.clone(), side)) {
            Some(existing) => Err(HarnessError::Conflict {
                target: format!("{} ({} side)", pin, side),
                first: existing.to_string(),
                second: wire.to_string(),
            }),
            None => Ok(()),
        }
    }

    fn claim_wire_end(&self, wire: &WireRef, end: WireEnd, pin: &PinRef) -> Result<()> {
        match self.wire_claims.get(&(wire.clone(), end)) {
            Some(existing) => Err(HarnessError::Conflict {
                target: wire.to_string(),
                first: existing.to_string(),
                second: pin.to_string(),
            }),
            None => Ok(()),
        }
    }

    /// Add a connection after checking its references and pin claims
    ///
    /// The `from` pin is reached from the connector's right side, the `to`
    /// pin from its left side.
    pub fn connect(&mut self, connection: Connection) -> Result<()> {
        let cable = self
            .cable(&connection.via.cable)
            .ok_or_else(|| HarnessError::unresolved(format!("cable {}", connection.via.cable)))?;
        if !cable.has_wire(connection.via.wire) {
            return Err(HarnessError::unresolved(connection.via.to_string()));
        }

        let ends = [
            (connection.from.as_ref(), Side::Right, WireEnd::From),
            (connection.to.as_ref(), Side::Left, WireEnd::To),
        ];
        for (pin, side, end) in ends {
            if let Some(pin) = pin {
                self.check_pin(pin)?;
                self.claim_pin(pin, side, &connection.via)?;
                self.claim_wire_end(&connection.via, end, pin)?;
            }
        }

        for (pin, side, end) in ends {
            if let Some(pin) = pin {
                self.pin_claims
                    .insert((pin.clone(), side), connection.via.clone());
                self.wire_claims
                    .insert((connection.via.clone(), end), pin.clone());
                if let Some(connector) = self.connector_mut(&pin.connector) {
                    connector.activate_pin(pin.pin, side);
                }
                if let Some(cable) = self.cable_mut(&connection.via.cable) {
                    cable.add_termination();
                }
            }
        }

        log::debug!("connected {}", connection);
        self.connections.push(connection);
        Ok(())
    }

    /// Activate loop pins once every connection and mate is in place
    pub fn activate_loops(&mut self) -> Result<()> {
        for connector in &mut self.connectors {
            connector.activate_loops()?;
        }
        Ok(())
    }

    /// Add a mate after checking that both ends exist
    pub fn add_mate(&mut self, mate: Mate) -> Result<()> {
        match &mate {
            Mate::Pin { from, to, .. } => {
                self.check_pin(from)?;
                self.check_pin(to)?;
                let (from, to) = (from.clone(), to.clone());
                if let Some(connector) = self.connector_mut(&from.connector) {
                    connector.activate_pin(from.pin, Side::Right);
                }
                if let Some(connector) = self.connector_mut(&to.connector) {
                    connector.activate_pin(to.pin, Side::Left);
                }
            }
            Mate::Component { from, to, .. } => {
                for designator in [from, to] {
                    if !self.has_connector(designator) {
                        return Err(HarnessError::unresolved(format!("connector {}", designator)));
                    }
                }
            }
        }
        self.mates.push(mate);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::cable::{CableSpec, WireId};
    use crate::entities::connector::ConnectorSpec;
    use crate::entities::mate::Arrow;

    fn harness() -> Harness {
        let mut harness = Harness::default();
        let x: ConnectorSpec = serde_yml::from_str("pincount: 3").unwrap();
        harness.add_connector(Connector::from_spec("X1", x.clone()).unwrap()).unwrap();
        harness.add_connector(Connector::from_spec("X2", x).unwrap()).unwrap();
        let w: CableSpec = serde_yml::from_str("colors: [RD, BK, GN]").unwrap();
        harness.add_cable(Cable::from_spec("W1", w).unwrap()).unwrap();
        harness
    }

    fn conn(from: Option<u32>, wire: u32, to: Option<u32>) -> Connection {
        Connection::new(
            from.map(|p| PinRef::new("X1", p)),
            WireRef::new("W1", WireId::Wire(wire)),
            to.map(|p| PinRef::new("X2", p)),
        )
        .unwrap()
    }

    #[test]
    fn test_connect_activates_sides() {
        let mut h = harness();
        h.connect(conn(Some(1), 1, Some(1))).unwrap();
        let x1 = h.connector("X1").unwrap();
        let x2 = h.connector("X2").unwrap();
        assert!(x1.ports_right && !x1.ports_left);
        assert!(x2.ports_left && !x2.ports_right);
        assert_eq!(h.cable("W1").unwrap().terminations(), 2);
    }

    #[test]
    fn test_duplicate_designator() {
        let mut h = harness();
        let x: ConnectorSpec = serde_yml::from_str("pincount: 2").unwrap();
        let err = h.add_connector(Connector::from_spec("X1", x).unwrap()).unwrap_err();
        assert_eq!(err.kind(), "ConfigurationError");
    }

    #[test]
    fn test_unresolved_references() {
        let mut h = harness();
        let err = h.connect(conn(Some(7), 1, None)).unwrap_err();
        assert_eq!(err.kind(), "UnresolvedReferenceError");

        let err = h.connect(conn(Some(1), 9, None)).unwrap_err();
        assert_eq!(err.kind(), "UnresolvedReferenceError");
        assert!(h.connections().is_empty());
    }

    #[test]
    fn test_pin_conflict() {
        let mut h = harness();
        h.connect(conn(Some(1), 1, None)).unwrap();
        let err = h.connect(conn(Some(1), 2, None)).unwrap_err();
        assert_eq!(err.kind(), "ConflictError");
        assert!(err.to_string().contains("X1:1"));
    }

    #[test]
    fn test_wire_end_conflict() {
        let mut h = harness();
        h.connect(conn(Some(1), 1, None)).unwrap();
        let err = h.connect(conn(Some(2), 1, None)).unwrap_err();
        assert_eq!(err.kind(), "ConflictError");
        assert!(err.to_string().contains("W1:1"));

        // the other end of the same wire is free
        h.connect(conn(None, 1, Some(3))).unwrap();
        assert_eq!(h.connections().len(), 2);
    }

    #[test]
    fn test_repeated_connection_conflicts() {
        let mut h = harness();
        h.connect(conn(Some(1), 1, Some(1))).unwrap();
        let err = h.connect(conn(Some(1), 1, Some(1))).unwrap_err();
        assert_eq!(err.kind(), "ConflictError");
        assert_eq!(h.connections().len(), 1);
        assert_eq!(h.cable("W1").unwrap().terminations(), 2);

        // same wire end, same pin, other end left open
        let err = h.connect(conn(None, 1, Some(1))).unwrap_err();
        assert_eq!(err.kind(), "ConflictError");
    }

    #[test]
    fn test_mates() {
        let mut h = harness();
        let arrow: Arrow = "-->".parse().unwrap();
        h.add_mate(Mate::Pin {
            from: PinRef::new("X1", 2),
            to: PinRef::new("X2", 2),
            arrow,
        })
        .unwrap();
        assert!(h.connector("X1").unwrap().is_active(2));

        let err = h
            .add_mate(Mate::Component {
                from: "X1".to_string(),
                to: "X9".to_string(),
                arrow,
            })
            .unwrap_err();
        assert_eq!(err.kind(), "UnresolvedReferenceError");
    }
}
