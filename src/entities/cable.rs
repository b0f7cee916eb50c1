//! Cable entity - a bundle of individually addressable wires, optionally shielded

use serde::{Deserialize, Serialize};
use serde_yml::{Mapping, Value};
use std::fmt;

use crate::core::colors::{self, ColorCode};
use crate::core::designator::{self, Token};
use crate::core::error::{HarnessError, Result};
use crate::entities::common::{
    opt_string, scalar_to_string, string_list, AdditionalComponent, PartInfo, QtyMultiplier,
};

/// Cable category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CableCategory {
    /// A jacketed cable bought as one part
    #[default]
    Cable,
    /// Loose wires; each wire is its own BOM line
    Bundle,
}

/// Address of a conductor inside a cable
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WireId {
    /// 1-based wire number
    Wire(u32),
    /// The shield, addressed as `s`
    Shield,
}

impl fmt::Display for WireId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WireId::Wire(n) => write!(f, "{}", n),
            WireId::Shield => write!(f, "s"),
        }
    }
}

/// Cable shield
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Shield {
    #[default]
    None,
    /// Shield drawn as a plain black line
    Plain,
    /// Shield drawn in a color (e.g. `SN` for tinned copper)
    Colored(String),
}

impl Shield {
    pub fn is_present(&self) -> bool {
        !matches!(self, Shield::None)
    }

    pub fn color(&self) -> Option<&str> {
        match self {
            Shield::Colored(c) => Some(c),
            _ => None,
        }
    }
}

/// Conductor cross section, e.g. `0.25 mm²` or `20 AWG`
#[derive(Debug, Clone, PartialEq)]
pub struct Gauge {
    pub value: f64,
    pub unit: String,
}

const MM2: &str = "mm\u{b2}";

/// (mm², AWG) pairs for `show_equiv`
const AWG_EQUIV: &[(&str, &str)] = &[
    ("0.09", "28"),
    ("0.14", "26"),
    ("0.25", "24"),
    ("0.34", "22"),
    ("0.5", "21"),
    ("0.75", "20"),
    ("1", "18"),
    ("1.5", "16"),
    ("2.5", "14"),
    ("4", "12"),
    ("6", "10"),
    ("10", "8"),
    ("16", "6"),
    ("25", "4"),
    ("35", "2"),
    ("50", "1"),
];

impl Gauge {
    /// The gauge in the other unit system, if it is a standard size
    pub fn equivalent(&self) -> Option<String> {
        let value = self.value.to_string();
        if self.unit == "AWG" {
            AWG_EQUIV
                .iter()
                .find(|(_, awg)| *awg == value)
                .map(|(mm2, _)| format!("{} {}", mm2, MM2))
        } else if self.unit == MM2 {
            AWG_EQUIV
                .iter()
                .find(|(mm2, _)| *mm2 == value)
                .map(|(_, awg)| format!("{} AWG", awg))
        } else {
            None
        }
    }
}

impl fmt::Display for Gauge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.value, self.unit)
    }
}

fn normalize_unit(unit: &str) -> String {
    match unit {
        "mm2" => MM2.to_string(),
        "awg" => "AWG".to_string(),
        other => other.to_string(),
    }
}

/// Split `"0.25 mm2"` into (0.25, Some("mm2"))
fn parse_quantity(designator: &str, field: &str, value: &Value) -> Result<(f64, Option<String>)> {
    let text = scalar_to_string(value).ok_or_else(|| {
        HarnessError::schema(designator, format!("{} must be a number or '<number> <unit>'", field))
    })?;
    let mut parts = text.split_whitespace();
    let number = parts
        .next()
        .and_then(|n| n.parse::<f64>().ok())
        .filter(|n| n.is_finite() && *n >= 0.0)
        .ok_or_else(|| HarnessError::schema(designator, format!("invalid {}: {}", field, text)))?;
    let unit: Vec<&str> = parts.collect();
    let unit = if unit.is_empty() {
        None
    } else {
        Some(unit.join(" "))
    };
    Ok((number, unit))
}

/// Cable as written in the harness document
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CableSpec {
    pub category: Option<CableCategory>,
    #[serde(rename = "type", deserialize_with = "opt_string")]
    pub kind: Option<String>,
    #[serde(deserialize_with = "opt_string")]
    pub color: Option<String>,
    #[serde(deserialize_with = "opt_string")]
    pub notes: Option<String>,
    pub gauge: Option<Value>,
    #[serde(deserialize_with = "opt_string")]
    pub gauge_unit: Option<String>,
    pub show_equiv: bool,
    pub length: Option<Value>,
    #[serde(deserialize_with = "opt_string")]
    pub length_unit: Option<String>,
    pub wirecount: Option<u32>,
    pub shield: Option<Value>,
    #[serde(deserialize_with = "string_list")]
    pub colors: Vec<String>,
    #[serde(deserialize_with = "string_list")]
    pub wirelabels: Vec<String>,
    #[serde(deserialize_with = "opt_string")]
    pub color_code: Option<String>,
    pub show_name: Option<bool>,
    pub show_wirecount: Option<bool>,
    pub show_wirenumbers: Option<bool>,
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
    #[serde(flatten)]
    pub extra: Mapping,
}

/// A validated cable
#[derive(Debug, Clone, PartialEq)]
pub struct Cable {
    pub designator: String,
    pub category: CableCategory,
    pub kind: Option<String>,
    pub color: Option<String>,
    pub notes: Option<String>,
    pub gauge: Option<Gauge>,
    pub show_equiv: bool,
    pub length: f64,
    pub length_unit: String,
    pub wirecount: u32,
    pub shield: Shield,
    /// One entry per wire; empty string means uncolored
    pub colors: Vec<String>,
    pub wirelabels: Vec<String>,
    pub color_code: Option<ColorCode>,
    pub ignore_in_bom: bool,
    pub part: PartInfo,
    pub additional_components: Vec<AdditionalComponent>,
    pub extra: Mapping,
    show_name: Option<bool>,
    show_wirecount: Option<bool>,
    show_wirenumbers: Option<bool>,
    terminations: usize,
}

impl Cable {
    /// Validate a cable spec and synthesize wire colors
    pub fn from_spec(designator: &str, spec: CableSpec) -> Result<Self> {
        let schema = |message: String| HarnessError::schema(designator, message);

        let color_code = spec
            .color_code
            .as_deref()
            .map(str::parse::<ColorCode>)
            .transpose()?;

        if let Some(count) = spec.wirecount.filter(|&c| c > designator::MAX_PORTS) {
            return Err(schema(format!(
                "wirecount {} exceeds the limit of {}",
                count,
                designator::MAX_PORTS
            )));
        }
        let (wirecount, colors) = match (spec.wirecount, spec.colors.is_empty()) {
            (Some(count), false) => {
                if spec.colors.len() != count as usize {
                    return Err(schema(format!(
                        "wirecount {} does not match the {} listed colors",
                        count,
                        spec.colors.len()
                    )));
                }
                if color_code.is_some() {
                    log::warn!("{}: explicit colors override color_code", designator);
                }
                (count, spec.colors)
            }
            (Some(count), true) => match color_code {
                Some(code) => (count, code.colors_for(count as usize)),
                None => (count, vec![String::new(); count as usize]),
            },
            (None, false) => (spec.colors.len() as u32, spec.colors),
            (None, true) => {
                return Err(schema(
                    "unknown number of wires: set wirecount or list colors".to_string(),
                ));
            }
        };

        let shield = match &spec.shield {
            None | Some(Value::Null) | Some(Value::Bool(false)) => Shield::None,
            Some(Value::Bool(true)) => Shield::Plain,
            Some(Value::String(color)) => {
                colors::validate(color)?;
                Shield::Colored(color.clone())
            }
            Some(other) => {
                return Err(schema(format!("invalid shield value: {:?}", other)));
            }
        };

        if wirecount == 0 && !shield.is_present() {
            return Err(schema("a cable needs at least one wire or a shield".to_string()));
        }
        if !spec.wirelabels.is_empty() && spec.wirelabels.len() != wirecount as usize {
            return Err(schema(format!(
                "{} wire labels given for {} wires",
                spec.wirelabels.len(),
                wirecount
            )));
        }
        if shield.is_present() && spec.wirelabels.iter().any(|l| l == "s") {
            return Err(HarnessError::configuration(format!(
                "{}: 's' is reserved for the shield and cannot label a wire",
                designator
            )));
        }
        for color in colors.iter().chain(spec.color.iter()) {
            colors::validate(color)?;
        }

        let gauge = match &spec.gauge {
            None | Some(Value::Null) => None,
            Some(value) => {
                let (value, inline_unit) = parse_quantity(designator, "gauge", value)?;
                let unit = match (inline_unit, spec.gauge_unit.clone()) {
                    (Some(_), Some(_)) => {
                        return Err(schema("gauge unit specified twice".to_string()));
                    }
                    (Some(unit), None) | (None, Some(unit)) => normalize_unit(unit.as_str()),
                    (None, None) => MM2.to_string(),
                };
                Some(Gauge { value, unit })
            }
        };

        let (length, length_unit) = match &spec.length {
            None | Some(Value::Null) => (0.0, None),
            Some(value) => parse_quantity(designator, "length", value)?,
        };
        let length_unit = match (length_unit, spec.length_unit) {
            (Some(_), Some(_)) => {
                return Err(schema("length unit specified twice".to_string()));
            }
            (Some(unit), None) | (None, Some(unit)) => unit,
            (None, None) => "m".to_string(),
        };

        let cable = Cable {
            designator: designator.to_string(),
            category: spec.category.unwrap_or_default(),
            kind: spec.kind,
            color: spec.color,
            notes: spec.notes,
            gauge,
            show_equiv: spec.show_equiv,
            length,
            length_unit,
            wirecount,
            shield,
            colors,
            wirelabels: spec.wirelabels,
            color_code,
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
            show_wirecount: spec.show_wirecount,
            show_wirenumbers: spec.show_wirenumbers,
            terminations: 0,
        };

        for part in &cable.additional_components {
            if let Some(multiplier) = part.qty_multiplier {
                cable.qty_multiplier(multiplier)?;
            }
        }

        Ok(cable)
    }

    /// A copy of this cable under another designator, with no wires terminated
    pub fn instantiate(&self, designator: &str) -> Self {
        let mut instance = self.clone();
        instance.designator = designator.to_string();
        instance.terminations = 0;
        instance
    }

    pub fn is_bundle(&self) -> bool {
        self.category == CableCategory::Bundle
    }

    pub fn shows_name(&self) -> bool {
        self.show_name
            .unwrap_or(!designator::is_generated(&self.designator))
    }

    pub fn shows_wirecount(&self) -> bool {
        self.show_wirecount.unwrap_or(true)
    }

    pub fn shows_wirenumbers(&self) -> bool {
        self.show_wirenumbers.unwrap_or(!self.is_bundle())
    }

    /// Wires in drawing order, shield last
    pub fn wires(&self) -> impl Iterator<Item = WireId> + '_ {
        (1..=self.wirecount)
            .map(WireId::Wire)
            .chain(self.shield.is_present().then_some(WireId::Shield))
    }

    pub fn has_wire(&self, wire: WireId) -> bool {
        match wire {
            WireId::Wire(n) => n >= 1 && n <= self.wirecount,
            WireId::Shield => self.shield.is_present(),
        }
    }

    /// Color code of a wire; `None` for uncolored wires and plain shields
    pub fn wire_color(&self, wire: WireId) -> Option<&str> {
        match wire {
            WireId::Wire(n) => self
                .colors
                .get((n as usize).wrapping_sub(1))
                .map(|s| s.as_str())
                .filter(|s| !s.is_empty()),
            WireId::Shield => self.shield.color(),
        }
    }

    pub fn wire_label(&self, wire: WireId) -> Option<&str> {
        match wire {
            WireId::Wire(n) => self
                .wirelabels
                .get((n as usize).wrapping_sub(1))
                .map(|s| s.as_str())
                .filter(|s| !s.is_empty()),
            WireId::Shield => None,
        }
    }

    /// Whether any wire is striped, which switches the harness to padded edge colors
    pub fn has_multicolor_wire(&self) -> bool {
        self.colors.iter().any(|c| colors::is_multicolor(c))
    }

    /// Map a wire number, range member, color, wire label or `s` to a wire
    pub fn resolve_wire(&self, token: &Token) -> Result<WireId> {
        let unresolved = || HarnessError::unresolved(format!("{}:{}", self.designator, token));
        match token {
            Token::Number(n) => {
                let wire = WireId::Wire(*n);
                if self.has_wire(wire) {
                    Ok(wire)
                } else {
                    Err(unresolved())
                }
            }
            Token::Name(name) if name == "s" => {
                if self.shield.is_present() {
                    Ok(WireId::Shield)
                } else {
                    Err(unresolved())
                }
            }
            Token::Name(name) => {
                let by_color: Vec<usize> = positions(&self.colors, name);
                let by_label: Vec<usize> = positions(&self.wirelabels, name);
                match (by_color.as_slice(), by_label.as_slice()) {
                    ([], []) => Err(unresolved()),
                    ([_, ..], [_, ..]) => Err(HarnessError::configuration(format!(
                        "{}:{} is both a wire color and a wire label",
                        self.designator, name
                    ))),
                    ([i], []) | ([], [i]) => Ok(WireId::Wire(*i as u32 + 1)),
                    _ => Err(HarnessError::configuration(format!(
                        "{}:{} is used for more than one wire; use the wire number instead",
                        self.designator, name
                    ))),
                }
            }
        }
    }

    /// Record a wire end terminated on a connector
    pub fn add_termination(&mut self) {
        self.terminations += 1;
    }

    pub fn terminations(&self) -> usize {
        self.terminations
    }

    /// Factor applied to an additional component's quantity
    pub fn qty_multiplier(&self, multiplier: QtyMultiplier) -> Result<f64> {
        match multiplier {
            QtyMultiplier::Wirecount => Ok(self.wirecount as f64),
            QtyMultiplier::Terminations => Ok(self.terminations as f64),
            QtyMultiplier::Length => Ok(self.length),
            QtyMultiplier::TotalLength => Ok(self.length * self.wirecount as f64),
            other => Err(HarnessError::configuration(format!(
                "{}: quantity multiplier '{}' does not apply to cables",
                self.designator, other
            ))),
        }
    }
}

fn positions(list: &[String], name: &str) -> Vec<usize> {
    list.iter()
        .enumerate()
        .filter(|(_, v)| v.as_str() == name)
        .map(|(i, _)| i)
        .collect()
}
