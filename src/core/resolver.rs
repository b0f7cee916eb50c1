//! Connection resolver - turns symbolic connection sets into concrete connections and mates
//!
//! A connection set is a row of entries read left to right, e.g.
//!
//! ```yaml
//! - - X1: [1, 2, 3]
//!   - W1: [RD, BK, GN]
//!   - X2: "3-1"
//! ```
//!
//! Every entry contributes one column of pins or wires. All columns must have
//! the same length; the resolver then walks the rows and wires up each cable
//! column to the connector columns on either side of it. Arrow entries between
//! two connector columns declare mates instead of connections.

use serde_yml::Value;

use crate::core::designator::{self, DesignatorRegistry, Token};
use crate::core::error::{HarnessError, Result};
use crate::entities::cable::{Cable, WireId};
use crate::entities::common::scalar_to_string;
use crate::entities::connection::{Connection, PinRef, WireRef};
use crate::entities::connector::Connector;
use crate::entities::harness::Harness;
use crate::entities::mate::{Arrow, ArrowWeight, Mate, MateEndpoint, MateSpec};

/// Connector and cable definitions, in document order
///
/// Every definition is a template: it can be used directly under its own
/// name or instantiated under other designators.
#[derive(Debug, Clone, Default)]
pub struct Templates {
    connectors: Vec<Connector>,
    cables: Vec<Cable>,
}

impl Templates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_connector(&mut self, connector: Connector) -> Result<()> {
        self.check_unique(&connector.designator)?;
        self.connectors.push(connector);
        Ok(())
    }

    pub fn add_cable(&mut self, cable: Cable) -> Result<()> {
        self.check_unique(&cable.designator)?;
        self.cables.push(cable);
        Ok(())
    }

    fn check_unique(&self, name: &str) -> Result<()> {
        if self.connector(name).is_some() || self.cable(name).is_some() {
            return Err(HarnessError::configuration(format!(
                "{} is defined more than once",
                name
            )));
        }
        Ok(())
    }

    pub fn connector(&self, name: &str) -> Option<&Connector> {
        self.connectors.iter().find(|c| c.designator == name)
    }

    pub fn cable(&self, name: &str) -> Option<&Cable> {
        self.cables.iter().find(|c| c.designator == name)
    }

    pub fn connectors(&self) -> &[Connector] {
        &self.connectors
    }

    pub fn cables(&self) -> &[Cable] {
        &self.cables
    }

    fn contains(&self, name: &str) -> bool {
        self.connector(name).is_some() || self.cable(name).is_some()
    }
}

/// One entry of a connection set, before designators are resolved
#[derive(Debug, Clone, PartialEq)]
enum Entry {
    /// `X1`, `{X1: [1, 2]}` or `[X1, 1]`
    Single { name: String, spec: Option<Value> },
    /// `[F., F., F.]` - one instance per row
    Parallel(Vec<String>),
    Arrow(Arrow),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Connector,
    Cable,
}

/// An entry after its designators have been resolved and instantiated
#[derive(Debug, Clone)]
enum Slot {
    Single {
        kind: Kind,
        designator: String,
        tokens: Option<Vec<Token>>,
    },
    Parallel {
        kind: Kind,
        designators: Vec<String>,
    },
    Arrow(Arrow),
}

impl Slot {
    fn label(&self) -> String {
        match self {
            Slot::Single { designator, .. } => designator.clone(),
            Slot::Parallel { designators, .. } => format!("[{}]", designators.join(", ")),
            Slot::Arrow(_) => "arrow".to_string(),
        }
    }
}

/// A resolved column of a connection set
#[derive(Debug, Clone)]
enum Column {
    Pins(Vec<PinRef>),
    Wires(Vec<WireRef>),
    Arrow(Arrow),
}

/// Wires a bare cable entry expands to
fn bare_wires(cable: &Cable) -> Vec<WireId> {
    if cable.wirecount == 0 {
        cable.wires().collect()
    } else {
        (1..=cable.wirecount).map(WireId::Wire).collect()
    }
}

/// Resolves connection sets and mates into a [`Harness`]
#[derive(Debug)]
pub struct Resolver<'a> {
    templates: &'a Templates,
    registry: DesignatorRegistry,
}

impl<'a> Resolver<'a> {
    pub fn new(templates: &'a Templates, separator: &str) -> Self {
        Self {
            templates,
            registry: DesignatorRegistry::new(separator),
        }
    }

    /// Whether a string names a template, an existing instance or a template instantiation
    fn is_component_name(&self, harness: &Harness, name: &str) -> bool {
        if self.templates.contains(name)
            || harness.has_connector(name)
            || harness.has_cable(name)
        {
            return true;
        }
        let separator = self.registry.separator();
        !separator.is_empty()
            && name
                .split_once(separator)
                .is_some_and(|(template, _)| self.templates.contains(template))
    }

    fn parse_entry(&self, harness: &Harness, value: &Value) -> Result<Entry> {
        match value {
            Value::String(s) => {
                if let Ok(arrow) = s.parse::<Arrow>() {
                    Ok(Entry::Arrow(arrow))
                } else {
                    Ok(Entry::Single {
                        name: s.trim().to_string(),
                        spec: None,
                    })
                }
            }
            Value::Mapping(map) => {
                let mut iter = map.iter();
                match (iter.next(), iter.next()) {
                    (Some((key, spec)), None) => {
                        let name = scalar_to_string(key).ok_or_else(|| {
                            HarnessError::validation(format!(
                                "connection entry key must be a designator: {:?}",
                                key
                            ))
                        })?;
                        Ok(Entry::Single {
                            name,
                            spec: Some(spec.clone()),
                        })
                    }
                    _ => Err(HarnessError::validation(format!(
                        "connection entry must have exactly one designator, found {}",
                        map.len()
                    ))),
                }
            }
            Value::Sequence(items) => {
                let names: Vec<&str> = items.iter().filter_map(Value::as_str).collect();
                if !names.is_empty()
                    && names.len() == items.len()
                    && names.iter().all(|n| self.is_component_name(harness, n))
                {
                    return Ok(Entry::Parallel(
                        names.iter().map(|n| n.to_string()).collect(),
                    ));
                }
                match items.as_slice() {
                    [Value::String(name), spec] => Ok(Entry::Single {
                        name: name.clone(),
                        spec: Some(spec.clone()),
                    }),
                    _ => Err(HarnessError::validation(format!(
                        "connection entry {:?} is neither a list of designators nor a [designator, pins] pair",
                        value
                    ))),
                }
            }
            Value::Tagged(tagged) => self.parse_entry(harness, &tagged.value),
            other => Err(HarnessError::validation(format!(
                "invalid connection entry: {:?}",
                other
            ))),
        }
    }

    /// Resolve a name to a designator, creating the instance on first use
    fn instance(&mut self, harness: &mut Harness, name: &str) -> Result<(Kind, String)> {
        let resolved = self.registry.resolve(name)?;
        let designator = resolved.designator;

        if let Some(template) = self.templates.connector(&resolved.template) {
            if harness.has_cable(&designator) {
                return Err(HarnessError::configuration(format!(
                    "{} is used both as a connector and as a cable",
                    designator
                )));
            }
            if !harness.has_connector(&designator) {
                log::debug!("instantiating connector {} from {}", designator, resolved.template);
                harness.add_connector(template.instantiate(&designator))?;
            }
            Ok((Kind::Connector, designator))
        } else if let Some(template) = self.templates.cable(&resolved.template) {
            if harness.has_connector(&designator) {
                return Err(HarnessError::configuration(format!(
                    "{} is used both as a connector and as a cable",
                    designator
                )));
            }
            if !harness.has_cable(&designator) {
                log::debug!("instantiating cable {} from {}", designator, resolved.template);
                harness.add_cable(template.instantiate(&designator))?;
            }
            Ok((Kind::Cable, designator))
        } else {
            Err(HarnessError::unresolved(format!("component {}", resolved.template)))
        }
    }

    fn slot(&mut self, harness: &mut Harness, entry: Entry) -> Result<Slot> {
        match entry {
            Entry::Arrow(arrow) => Ok(Slot::Arrow(arrow)),
            Entry::Single { name, spec } => {
                let (kind, designator) = self.instance(harness, &name)?;
                let tokens = spec.as_ref().map(designator::expand).transpose()?;
                Ok(Slot::Single {
                    kind,
                    designator,
                    tokens,
                })
            }
            Entry::Parallel(names) => {
                let mut kind = None;
                let mut designators = Vec::with_capacity(names.len());
                for name in &names {
                    let (k, designator) = self.instance(harness, name)?;
                    match kind {
                        Some(existing) if existing != k => {
                            return Err(HarnessError::validation(format!(
                                "[{}] mixes connectors and cables",
                                names.join(", ")
                            )));
                        }
                        _ => kind = Some(k),
                    }
                    designators.push(designator);
                }
                let kind = kind.ok_or_else(|| {
                    HarnessError::validation("empty list of designators in connection set")
                })?;
                Ok(Slot::Parallel { kind, designators })
            }
        }
    }

    /// Number of rows a slot asks for; `None` when it adapts to the others
    fn count_hint(harness: &Harness, slot: &Slot) -> Option<usize> {
        match slot {
            Slot::Arrow(_) => None,
            Slot::Parallel { designators, .. } => Some(designators.len()),
            Slot::Single {
                tokens: Some(tokens),
                ..
            } => Some(tokens.len()),
            Slot::Single {
                kind: Kind::Connector,
                designator,
                tokens: None,
            } => harness
                .connector(designator)
                .filter(|c| !c.is_simple())
                .map(Connector::pincount),
            Slot::Single {
                kind: Kind::Cable,
                designator,
                tokens: None,
            } => harness.cable(designator).map(|c| bare_wires(c).len()),
        }
    }

    fn column(harness: &Harness, slot: &Slot, rows: usize) -> Result<Column> {
        let connector = |d: &str| {
            harness
                .connector(d)
                .ok_or_else(|| HarnessError::unresolved(format!("connector {}", d)))
        };
        let cable = |d: &str| {
            harness
                .cable(d)
                .ok_or_else(|| HarnessError::unresolved(format!("cable {}", d)))
        };

        let column = match slot {
            Slot::Arrow(arrow) => Column::Arrow(*arrow),
            Slot::Parallel {
                kind: Kind::Connector,
                designators,
            } => {
                let mut pins = Vec::with_capacity(designators.len());
                for d in designators {
                    let first = connector(d)?.resolve_pin(&Token::Number(1))?;
                    pins.push(PinRef::new(d.as_str(), first));
                }
                Column::Pins(pins)
            }
            Slot::Parallel {
                kind: Kind::Cable,
                designators,
            } => {
                let mut wires = Vec::with_capacity(designators.len());
                for d in designators {
                    let first = bare_wires(cable(d)?).first().copied().ok_or_else(|| {
                        HarnessError::validation(format!("cable {} has no wires", d))
                    })?;
                    wires.push(WireRef::new(d.as_str(), first));
                }
                Column::Wires(wires)
            }
            Slot::Single {
                kind: Kind::Connector,
                designator,
                tokens,
            } => {
                let c = connector(designator)?;
                let pins: Vec<u32> = match tokens {
                    Some(tokens) => tokens
                        .iter()
                        .map(|t| c.resolve_pin(t))
                        .collect::<Result<_>>()?,
                    None if c.is_simple() => vec![c.pins[0]; rows],
                    None => c.pins.clone(),
                };
                Column::Pins(
                    pins.into_iter()
                        .map(|p| PinRef::new(designator.as_str(), p))
                        .collect(),
                )
            }
            Slot::Single {
                kind: Kind::Cable,
                designator,
                tokens,
            } => {
                let c = cable(designator)?;
                let wires: Vec<WireId> = match tokens {
                    Some(tokens) => tokens
                        .iter()
                        .map(|t| c.resolve_wire(t))
                        .collect::<Result<_>>()?,
                    None => bare_wires(c),
                };
                Column::Wires(
                    wires
                        .into_iter()
                        .map(|w| WireRef::new(designator.as_str(), w))
                        .collect(),
                )
            }
        };
        Ok(column)
    }

    /// Resolve one connection set and add its connections and mates to the harness
    pub fn resolve_set(&mut self, harness: &mut Harness, set: &Value) -> Result<()> {
        let values: Vec<Value> = match set {
            Value::Sequence(items) => items.clone(),
            Value::Tagged(tagged) => return self.resolve_set(harness, &tagged.value),
            other => vec![other.clone()],
        };

        let mut slots = Vec::with_capacity(values.len());
        for value in &values {
            let entry = self.parse_entry(harness, value)?;
            slots.push(self.slot(harness, entry)?);
        }

        let mut rows: Option<(usize, String)> = None;
        for slot in &slots {
            if let Some(count) = Self::count_hint(harness, slot) {
                match &rows {
                    Some((expected, first)) if *expected != count => {
                        return Err(HarnessError::validation(format!(
                            "connection set has mismatched counts: {} has {} but {} has {}",
                            first,
                            expected,
                            slot.label(),
                            count
                        )));
                    }
                    Some(_) => {}
                    None => rows = Some((count, slot.label())),
                }
            }
        }
        let rows = rows.map_or(1, |(count, _)| count);

        let columns = slots
            .iter()
            .map(|slot| Self::column(harness, slot, rows))
            .collect::<Result<Vec<_>>>()?;

        check_adjacency(&slots, &columns)?;

        // a lone entry only instantiates its component
        if columns.len() == 1 {
            return Ok(());
        }

        for row in 0..rows {
            for (i, column) in columns.iter().enumerate() {
                let pin_at = |j: Option<usize>| match j.and_then(|j| columns.get(j)) {
                    Some(Column::Pins(pins)) => pins.get(row).cloned(),
                    _ => None,
                };
                match column {
                    Column::Wires(wires) => {
                        let from = pin_at(i.checked_sub(1));
                        let to = pin_at(Some(i + 1));
                        harness.connect(Connection::new(from, wires[row].clone(), to)?)?;
                    }
                    Column::Arrow(arrow) => {
                        let (Some(from), Some(to)) = (pin_at(i.checked_sub(1)), pin_at(Some(i + 1)))
                        else {
                            continue;
                        };
                        match arrow.weight {
                            ArrowWeight::Single => harness.add_mate(Mate::Pin {
                                from,
                                to,
                                arrow: *arrow,
                            })?,
                            ArrowWeight::Double => {
                                let exists = harness.mates().iter().any(|m| {
                                    matches!(m, Mate::Component { from: f, to: t, .. }
                                        if *f == from.connector && *t == to.connector)
                                });
                                if !exists {
                                    harness.add_mate(Mate::Component {
                                        from: from.connector,
                                        to: to.connector,
                                        arrow: *arrow,
                                    })?;
                                }
                            }
                        }
                    }
                    Column::Pins(_) => {}
                }
            }
        }
        Ok(())
    }

    /// Resolve one entry of the `mates:` section
    pub fn resolve_mate(&mut self, harness: &mut Harness, spec: &MateSpec) -> Result<()> {
        let arrow = spec.arrow()?;
        let mate = match (&spec.from, &spec.to) {
            (MateEndpoint::Component(from), MateEndpoint::Component(to)) => {
                let from = self.connector_instance(harness, from)?;
                let to = self.connector_instance(harness, to)?;
                Mate::Component { from, to, arrow }
            }
            (MateEndpoint::Pin(from, from_pin), MateEndpoint::Pin(to, to_pin)) => Mate::Pin {
                from: self.mate_pin(harness, from, from_pin)?,
                to: self.mate_pin(harness, to, to_pin)?,
                arrow,
            },
            _ => {
                return Err(HarnessError::configuration(
                    "a mate must join two pins or two connectors, not one of each",
                ));
            }
        };
        harness.add_mate(mate)
    }

    fn connector_instance(&mut self, harness: &mut Harness, name: &str) -> Result<String> {
        match self.instance(harness, name)? {
            (Kind::Connector, designator) => Ok(designator),
            (Kind::Cable, designator) => Err(HarnessError::configuration(format!(
                "{} is a cable and cannot be mated",
                designator
            ))),
        }
    }

    fn mate_pin(&mut self, harness: &mut Harness, name: &str, pin: &Value) -> Result<PinRef> {
        let designator = self.connector_instance(harness, name)?;
        let tokens = designator::expand(pin)?;
        let [token] = tokens.as_slice() else {
            return Err(HarnessError::configuration(format!(
                "mate end {} must name exactly one pin",
                designator
            )));
        };
        let connector = harness
            .connector(&designator)
            .ok_or_else(|| HarnessError::unresolved(format!("connector {}", designator)))?;
        Ok(PinRef::new(designator.as_str(), connector.resolve_pin(token)?))
    }

    /// Add every template that was never instantiated nor referenced under its own name
    pub fn finish(self, harness: &mut Harness) -> Result<()> {
        for template in self.templates.connectors() {
            let name = &template.designator;
            if !harness.has_connector(name) && !self.registry.is_used_as_template(name) {
                harness.add_connector(template.instantiate(name))?;
            }
        }
        for template in self.templates.cables() {
            let name = &template.designator;
            if !harness.has_cable(name) && !self.registry.is_used_as_template(name) {
                harness.add_cable(template.instantiate(name))?;
            }
        }
        Ok(())
    }
}

/// Cables must sit between connectors (or at a row end), arrows between two connectors
fn check_adjacency(slots: &[Slot], columns: &[Column]) -> Result<()> {
    for (i, pair) in columns.windows(2).enumerate() {
        let (a, b) = (&slots[i], &slots[i + 1]);
        match pair {
            [Column::Wires(_), Column::Wires(_)] => {
                return Err(HarnessError::validation(format!(
                    "cables {} and {} are adjacent in a connection set",
                    a.label(),
                    b.label()
                )));
            }
            [Column::Pins(_), Column::Pins(_)] => {
                return Err(HarnessError::validation(format!(
                    "connectors {} and {} are adjacent without a cable or arrow between them",
                    a.label(),
                    b.label()
                )));
            }
            [Column::Arrow(_), Column::Arrow(_)]
            | [Column::Arrow(_), Column::Wires(_)]
            | [Column::Wires(_), Column::Arrow(_)] => {
                return Err(HarnessError::validation(
                    "an arrow must be placed between two connectors",
                ));
            }
            _ => {}
        }
    }
    if matches!(columns.first(), Some(Column::Arrow(_)))
        || matches!(columns.last(), Some(Column::Arrow(_)))
    {
        return Err(HarnessError::validation(
            "an arrow must be placed between two connectors",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::cable::CableSpec;
    use crate::entities::connector::ConnectorSpec;
    use crate::entities::mate::ArrowDirection;

    fn templates(connectors: &[(&str, &str)], cables: &[(&str, &str)]) -> Templates {
        let mut templates = Templates::new();
        for (name, yaml) in connectors {
            let spec: ConnectorSpec = serde_yml::from_str(yaml).unwrap();
            templates
                .add_connector(Connector::from_spec(name, spec).unwrap())
                .unwrap();
        }
        for (name, yaml) in cables {
            let spec: CableSpec = serde_yml::from_str(yaml).unwrap();
            templates.add_cable(Cable::from_spec(name, spec).unwrap()).unwrap();
        }
        templates
    }

    fn resolve(templates: &Templates, sets: &str) -> Result<Harness> {
        let sets: Vec<Value> = serde_yml::from_str(sets).unwrap();
        let mut harness = Harness::default();
        let mut resolver = Resolver::new(templates, ".");
        for set in &sets {
            resolver.resolve_set(&mut harness, set)?;
        }
        resolver.finish(&mut harness)?;
        Ok(harness)
    }

    fn basic() -> Templates {
        templates(
            &[("X1", "pincount: 3"), ("X2", "pincount: 3")],
            &[("W1", "colors: [RD, BK, GN]")],
        )
    }

    #[test]
    fn test_simple_row() {
        let harness = resolve(
            &basic(),
            "- - X1: [1, 2, 3]\n  - W1: [1, 2, 3]\n  - X2: [1, 2, 3]\n",
        )
        .unwrap();
        let connections = harness.connections();
        assert_eq!(connections.len(), 3);
        assert_eq!(connections[0].to_string(), "X1:1 -> W1:1 -> X2:1");
        assert_eq!(connections[2].to_string(), "X1:3 -> W1:3 -> X2:3");
        assert!(harness.connector("X1").unwrap().ports_right);
        assert!(harness.connector("X2").unwrap().ports_left);
    }

    #[test]
    fn test_bare_entries_expand() {
        let harness = resolve(&basic(), "- [X1, W1, X2]\n").unwrap();
        assert_eq!(harness.connections().len(), 3);

        let harness = resolve(&basic(), "- - X1\n  - W1\n  - X2: '3-1'\n").unwrap();
        let connections = harness.connections();
        assert_eq!(connections.len(), 3);
        assert_eq!(connections[0].to_string(), "X1:1 -> W1:1 -> X2:3");
        assert_eq!(connections[2].to_string(), "X1:3 -> W1:3 -> X2:1");
    }

    #[test]
    fn test_lone_entry_only_instantiates() {
        let harness = resolve(&basic(), "- W1\n- [X1]\n- - W1: [1, 2]\n").unwrap();
        assert!(harness.has_cable("W1"));
        assert!(harness.has_connector("X1"));
        assert!(harness.connections().is_empty());
    }

    #[test]
    fn test_names_and_colors() {
        let t = templates(
            &[("X1", "pinlabels: [GND, VCC, TX]")],
            &[("W1", "colors: [RD, BK, GN]\nshield: true")],
        );
        let harness = resolve(&t, "- - X1: [TX, GND]\n  - W1: [GN, s]\n").unwrap();
        let connections = harness.connections();
        assert_eq!(connections[0].to_string(), "X1:3 -> W1:3 -> -");
        assert_eq!(connections[1].to_string(), "X1:1 -> W1:s -> -");
    }

    #[test]
    fn test_pair_entry() {
        let harness = resolve(&basic(), "- - [X1, 2]\n  - [W1, 2]\n  - [X2, 1]\n").unwrap();
        assert_eq!(harness.connections()[0].to_string(), "X1:2 -> W1:2 -> X2:1");
    }

    #[test]
    fn test_count_mismatch() {
        let err = resolve(&basic(), "- - X1: [1, 2]\n  - W1: [1, 2, 3]\n").unwrap_err();
        assert_eq!(err.kind(), "ValidationError");
        assert!(err.to_string().contains("mismatched"));
    }

    #[test]
    fn test_adjacent_cables_rejected() {
        let t = templates(&[], &[("W1", "wirecount: 1"), ("W2", "wirecount: 1")]);
        let err = resolve(&t, "- [W1, W2]\n").unwrap_err();
        assert_eq!(err.kind(), "ValidationError");
        assert!(err.to_string().contains("adjacent"));
    }

    #[test]
    fn test_adjacent_connectors_rejected() {
        let err = resolve(&basic(), "- - X1\n  - X2\n").unwrap_err();
        assert_eq!(err.kind(), "ValidationError");
    }

    #[test]
    fn test_templates_and_parallel_ferrules() {
        let t = templates(
            &[("X", "pincount: 2"), ("F", "style: simple\ntype: Ferrule")],
            &[("W", "wirecount: 2")],
        );
        let harness = resolve(
            &t,
            "- - X.X1: [1, 2]\n  - W.W1: [1, 2]\n  - [F., F.]\n",
        )
        .unwrap();
        let designators: Vec<&str> = harness
            .connectors()
            .iter()
            .map(|c| c.designator.as_str())
            .collect();
        assert_eq!(designators, vec!["X1", "__F_1", "__F_2"]);
        assert_eq!(harness.connections()[1].to_string(), "X1:2 -> W1:2 -> __F_2:1");
        // templates used through the separator are not instantiated on their own
        assert!(harness.connector("X").is_none());
        assert!(harness.cable("W").is_none());
    }

    #[test]
    fn test_unconnected_templates_instantiated() {
        let t = templates(&[("X1", "pincount: 2"), ("X9", "pincount: 1")], &[("W1", "wirecount: 1")]);
        let harness = resolve(&t, "- - X1: [1]\n  - W1: [1]\n").unwrap();
        assert!(harness.has_connector("X9"));
        assert_eq!(harness.connectors().len(), 2);
    }

    #[test]
    fn test_simple_connector_row() {
        let t = templates(&[("S", "style: simple")], &[("W1", "wirecount: 3")]);
        let err = resolve(&t, "- - S\n  - W1\n").unwrap_err();
        // a simple connector side takes only one wire
        assert_eq!(err.kind(), "ConflictError");

        let harness = resolve(&t, "- - W1: [1]\n  - S\n").unwrap();
        assert_eq!(harness.connections()[0].to_string(), "- -> W1:1 -> S:1");
    }

    #[test]
    fn test_unknown_component() {
        let err = resolve(&basic(), "- - X7\n  - W1\n").unwrap_err();
        assert_eq!(err.kind(), "UnresolvedReferenceError");
    }

    #[test]
    fn test_arrow_mates() {
        let harness = resolve(&basic(), "- - X1: [1, 2]\n  - '-->'\n  - X2: [1, 2]\n").unwrap();
        assert_eq!(harness.mates().len(), 2);
        assert!(matches!(&harness.mates()[0], Mate::Pin { from, .. } if from.pin == 1));
        assert!(harness.connector("X2").unwrap().ports_left);

        let harness = resolve(&basic(), "- - X1\n  - '<=>'\n  - X2\n").unwrap();
        assert_eq!(harness.mates().len(), 1);
        let mate = &harness.mates()[0];
        assert_eq!(mate.connectors(), ("X1", "X2"));
        assert_eq!(mate.arrow().direction, ArrowDirection::Both);

        let err = resolve(&basic(), "- - '-->'\n  - X1\n").unwrap_err();
        assert_eq!(err.kind(), "ValidationError");
    }

    #[test]
    fn test_mates_section() {
        let t = basic();
        let mut harness = Harness::default();
        let mut resolver = Resolver::new(&t, ".");
        let spec: MateSpec = serde_yml::from_str("from: [X1, 2]\nto: [X2, 3]").unwrap();
        resolver.resolve_mate(&mut harness, &spec).unwrap();
        assert!(harness.connector("X1").unwrap().is_active(2));

        let spec: MateSpec = serde_yml::from_str("from: X1\nto: [X2, 3]").unwrap();
        let err = resolver.resolve_mate(&mut harness, &spec).unwrap_err();
        assert_eq!(err.kind(), "ConfigurationError");

        let spec: MateSpec = serde_yml::from_str("from: X1\nto: X2\narrow: '~~>'").unwrap();
        let err = resolver.resolve_mate(&mut harness, &spec).unwrap_err();
        assert_eq!(err.kind(), "ConfigurationError");
    }

    #[test]
    fn test_deterministic_resolution() {
        let sets = "- - X1\n  - W1\n  - X2\n";
        let a = resolve(&basic(), sets).unwrap();
        let b = resolve(&basic(), sets).unwrap();
        assert_eq!(a.connections(), b.connections());
        let x2 = a.connector("X2").unwrap();
        assert!(x2.is_active(3));
        assert!(!x2.ports_right);
    }
}
