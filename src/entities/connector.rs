//! Connector entity - a plug, socket, ferrule or splice with addressable pins

use serde::{Deserialize, Serialize};
use serde_yml::{Mapping, Value};
use std::collections::BTreeSet;

use crate::core::colors;
use crate::core::designator::{self, Token};
use crate::core::error::{HarnessError, Result};
use crate::entities::common::{
    opt_string, string_list, AdditionalComponent, PartInfo, QtyMultiplier,
};

/// Connector drawing style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectorStyle {
    /// Single implicit pin, drawn without a pin table
    Simple,
    /// Pin table with per-pin ports
    Full,
}

impl std::fmt::Display for ConnectorStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConnectorStyle::Simple => write!(f, "simple"),
            ConnectorStyle::Full => write!(f, "full"),
        }
    }
}

/// Side of a connector on which a pin is exposed
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Left => write!(f, "left"),
            Side::Right => write!(f, "right"),
        }
    }
}

/// Connector as written in the harness document
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ConnectorSpec {
    #[serde(rename = "type", deserialize_with = "opt_string")]
    pub kind: Option<String>,
    #[serde(deserialize_with = "opt_string")]
    pub subtype: Option<String>,
    #[serde(deserialize_with = "opt_string")]
    pub color: Option<String>,
    #[serde(deserialize_with = "opt_string")]
    pub notes: Option<String>,
    pub style: Option<ConnectorStyle>,
    pub pincount: Option<u32>,
    pub pins: Option<Vec<u32>>,
    #[serde(deserialize_with = "string_list")]
    pub pinlabels: Vec<String>,
    #[serde(deserialize_with = "string_list")]
    pub pincolors: Vec<String>,
    pub loops: Vec<Value>,
    pub show_name: Option<bool>,
    pub show_pincount: Option<bool>,
    pub hide_disconnected_pins: bool,
    pub ignore_in_bom: bool,
    pub additional_components: Vec<AdditionalComponent>,
    #[serde(deserialize_with = "opt_string")]
    pub manufacturer: Option<String>,
    #[serde(deserialize_with = "opt_string")]
    pub mpn: Option<String>,
    #[serde(deserialize_with = "opt_string")]
    pub pn: Option<String>,
    #[serde(deserialize_with = "opt_string")]
    pub supplier: Option<String>,
    #[serde(deserialize_with = "opt_string")]
    pub spn: Option<String>,
    /// Keys not recognized above, passed through to rendering
    #[serde(flatten)]
    pub extra: Mapping,
}

/// A validated connector
#[derive(Debug, Clone, PartialEq)]
pub struct Connector {
    pub designator: String,
    pub style: ConnectorStyle,
    pub kind: Option<String>,
    pub subtype: Option<String>,
    pub color: Option<String>,
    pub notes: Option<String>,
    pub pins: Vec<u32>,
    pub pinlabels: Vec<String>,
    pub pincolors: Vec<String>,
    pub loops: Vec<(u32, u32)>,
    pub ports_left: bool,
    pub ports_right: bool,
    pub hide_disconnected_pins: bool,
    pub ignore_in_bom: bool,
    pub part: PartInfo,
    pub additional_components: Vec<AdditionalComponent>,
    pub extra: Mapping,
    show_name: Option<bool>,
    show_pincount: Option<bool>,
    active_pins: BTreeSet<u32>,
}

impl Connector {
    /// Validate a connector spec and fill in implicit pins and style
    pub fn from_spec(designator: &str, spec: ConnectorSpec) -> Result<Self> {
        let schema = |message: String| HarnessError::schema(designator, message);

        if let Some(count) = spec.pincount.filter(|&c| c > designator::MAX_PORTS) {
            return Err(schema(format!(
                "pincount {} exceeds the limit of {}",
                count,
                designator::MAX_PORTS
            )));
        }
        if let (Some(count), Some(pins)) = (spec.pincount, &spec.pins) {
            if pins.len() != count as usize {
                return Err(schema(format!(
                    "pincount {} does not match the {} listed pins",
                    count,
                    pins.len()
                )));
            }
        }
        if !spec.pinlabels.is_empty() {
            let declared = spec
                .pins
                .as_ref()
                .map(|p| p.len())
                .or(spec.pincount.map(|c| c as usize));
            if let Some(declared) = declared {
                if declared != spec.pinlabels.len() {
                    return Err(schema(format!(
                        "{} pin labels given for {} pins",
                        spec.pinlabels.len(),
                        declared
                    )));
                }
            }
        }

        let count = match (spec.pincount, &spec.pins) {
            (Some(count), _) => count as usize,
            (None, Some(pins)) => pins.len(),
            (None, None) => spec.pinlabels.len().max(spec.pincolors.len()),
        };
        let count = if count == 0 && spec.style == Some(ConnectorStyle::Simple) {
            1
        } else {
            count
        };
        if count == 0 {
            return Err(schema(
                "must set pincount, or list pins, pinlabels or pincolors".to_string(),
            ));
        }
        if spec.style == Some(ConnectorStyle::Simple) && count > 1 {
            return Err(schema(format!(
                "style simple allows a single pin, but {} pins are declared",
                count
            )));
        }

        let pins: Vec<u32> = spec
            .pins
            .unwrap_or_else(|| (1..=count as u32).collect());
        let unique: BTreeSet<u32> = pins.iter().copied().collect();
        if unique.len() != pins.len() {
            return Err(schema("pins are not unique".to_string()));
        }
        if spec.pincolors.len() > pins.len() {
            return Err(schema(format!(
                "{} pin colors given for {} pins",
                spec.pincolors.len(),
                pins.len()
            )));
        }
        for color in spec.pincolors.iter().chain(spec.color.iter()) {
            colors::validate(color)?;
        }

        let style = spec.style.unwrap_or(if pins.len() == 1 {
            ConnectorStyle::Simple
        } else {
            ConnectorStyle::Full
        });

        let mut connector = Connector {
            designator: designator.to_string(),
            style,
            kind: spec.kind,
            subtype: spec.subtype,
            color: spec.color,
            notes: spec.notes,
            pins,
            pinlabels: spec.pinlabels,
            pincolors: spec.pincolors,
            loops: Vec::new(),
            ports_left: false,
            ports_right: false,
            hide_disconnected_pins: spec.hide_disconnected_pins,
            ignore_in_bom: spec.ignore_in_bom,
            part: PartInfo {
                manufacturer: spec.manufacturer,
                mpn: spec.mpn,
                pn: spec.pn,
                supplier: spec.supplier,
                spn: spec.spn,
            },
            additional_components: spec.additional_components,
            extra: spec.extra,
            show_name: spec.show_name,
            show_pincount: spec.show_pincount,
            active_pins: BTreeSet::new(),
        };

        for value in &spec.loops {
            let tokens = designator::expand(value)?;
            if tokens.len() != 2 {
                return Err(HarnessError::configuration(format!(
                    "{}: loops must be between exactly two pins",
                    designator
                )));
            }
            let a = connector.resolve_pin(&tokens[0])?;
            let b = connector.resolve_pin(&tokens[1])?;
            connector.loops.push((a, b));
        }

        for part in &connector.additional_components {
            if let Some(multiplier) = part.qty_multiplier {
                connector.qty_multiplier(multiplier)?;
            }
        }

        Ok(connector)
    }

    /// A copy of this connector under another designator, with no pins in use
    pub fn instantiate(&self, designator: &str) -> Self {
        let mut instance = self.clone();
        instance.designator = designator.to_string();
        instance.active_pins.clear();
        instance.ports_left = false;
        instance.ports_right = false;
        instance
    }

    pub fn pincount(&self) -> usize {
        self.pins.len()
    }

    pub fn is_simple(&self) -> bool {
        self.style == ConnectorStyle::Simple
    }

    /// Whether the designator is printed; hidden for simple and auto-named connectors by default
    pub fn shows_name(&self) -> bool {
        self.show_name
            .unwrap_or(!self.is_simple() && !designator::is_generated(&self.designator))
    }

    pub fn shows_pincount(&self) -> bool {
        self.show_pincount.unwrap_or(!self.is_simple())
    }

    pub fn has_pin(&self, pin: u32) -> bool {
        self.pins.contains(&pin)
    }

    fn index_of(&self, pin: u32) -> Option<usize> {
        self.pins.iter().position(|p| *p == pin)
    }

    pub fn label_of(&self, pin: u32) -> Option<&str> {
        self.index_of(pin)
            .and_then(|i| self.pinlabels.get(i))
            .map(|s| s.as_str())
            .filter(|s| !s.is_empty())
    }

    pub fn color_of(&self, pin: u32) -> Option<&str> {
        self.index_of(pin)
            .and_then(|i| self.pincolors.get(i))
            .map(|s| s.as_str())
            .filter(|s| !s.is_empty())
    }

    /// Map a pin number or pin label to a pin number
    pub fn resolve_pin(&self, token: &Token) -> Result<u32> {
        let by_label = |label: &str| -> Result<Option<u32>> {
            let hits: Vec<usize> = self
                .pinlabels
                .iter()
                .enumerate()
                .filter(|(_, l)| l.as_str() == label)
                .map(|(i, _)| i)
                .collect();
            match hits.as_slice() {
                [] => Ok(None),
                [i] => Ok(self.pins.get(*i).copied()),
                _ => Err(HarnessError::configuration(format!(
                    "{}:{} is defined more than once",
                    self.designator, label
                ))),
            }
        };

        match token {
            Token::Number(n) => {
                if self.has_pin(*n) {
                    if let Some(labelled) = by_label(&n.to_string())? {
                        if labelled != *n {
                            return Err(HarnessError::configuration(format!(
                                "{}:{} is both a pin number and the label of pin {}",
                                self.designator, n, labelled
                            )));
                        }
                    }
                    Ok(*n)
                } else {
                    by_label(&n.to_string())?.ok_or_else(|| {
                        HarnessError::unresolved(format!("{}:{}", self.designator, n))
                    })
                }
            }
            Token::Name(name) => by_label(name)?
                .ok_or_else(|| HarnessError::unresolved(format!("{}:{}", self.designator, name))),
        }
    }

    /// Mark a pin as in use and expose the side it is reached from
    pub fn activate_pin(&mut self, pin: u32, side: Side) {
        self.active_pins.insert(pin);
        match side {
            Side::Left => self.ports_left = true,
            Side::Right => self.ports_right = true,
        }
    }

    /// Side the loops are drawn on: left when it has ports, else right
    pub fn loop_side(&self) -> Result<Side> {
        if self.ports_left {
            Ok(Side::Left)
        } else if self.ports_right {
            Ok(Side::Right)
        } else {
            Err(HarnessError::configuration(format!(
                "No side for loops on {}",
                self.designator
            )))
        }
    }

    /// Mark both pins of every loop as in use on the loop side
    ///
    /// Runs once all connections and mates are known, since they decide the side.
    pub fn activate_loops(&mut self) -> Result<()> {
        if self.loops.is_empty() {
            return Ok(());
        }
        let side = self.loop_side()?;
        let pins: Vec<u32> = self.loops.iter().flat_map(|&(a, b)| [a, b]).collect();
        for pin in pins {
            self.activate_pin(pin, side);
        }
        Ok(())
    }

    pub fn is_active(&self, pin: u32) -> bool {
        self.active_pins.contains(&pin)
    }

    /// Pins drawn in the pin table
    pub fn visible_pins(&self) -> impl Iterator<Item = u32> + '_ {
        self.pins
            .iter()
            .copied()
            .filter(move |p| !self.hide_disconnected_pins || self.active_pins.contains(p))
    }

    /// Factor applied to an additional component's quantity
    pub fn qty_multiplier(&self, multiplier: QtyMultiplier) -> Result<f64> {
        match multiplier {
            QtyMultiplier::Pincount => Ok(self.pincount() as f64),
            QtyMultiplier::Populated => Ok(self.active_pins.len() as f64),
            other => Err(HarnessError::configuration(format!(
                "{}: quantity multiplier '{}' does not apply to connectors",
                self.designator, other
            ))),
        }
    }
}
