//! Attributes shared by connectors, cables and harness-level BOM items

use serde::{Deserialize, Deserializer, Serialize};
use serde_yml::Value;

/// Render a YAML scalar as text; part numbers and labels are often written as numbers
pub fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Tagged(tagged) => scalar_to_string(&tagged.value),
        _ => None,
    }
}

/// Deserialize an optional scalar as a string
pub fn opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(v) => scalar_to_string(&v)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom("expected a scalar value")),
    }
}

/// Deserialize a list of scalars as strings
pub fn string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Vec<Value>>::deserialize(deserializer)?;
    value
        .unwrap_or_default()
        .iter()
        .map(|v| match v {
            Value::Null => Ok(String::new()),
            v => scalar_to_string(v).ok_or_else(|| serde::de::Error::custom("expected a scalar value")),
        })
        .collect()
}

/// Collapse line breaks and runs of whitespace
pub fn clean_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Purchasing information attached to a BOM line
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PartInfo {
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "opt_string")]
    pub manufacturer: Option<String>,

    /// Manufacturer part number
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "opt_string")]
    pub mpn: Option<String>,

    /// Internal part number
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "opt_string")]
    pub pn: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "opt_string")]
    pub supplier: Option<String>,

    /// Supplier part number
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "opt_string")]
    pub spn: Option<String>,
}

impl PartInfo {
    pub fn is_empty(&self) -> bool {
        self.manufacturer.is_none()
            && self.mpn.is_none()
            && self.pn.is_none()
            && self.supplier.is_none()
            && self.spn.is_none()
    }

    /// Same part info with every field whitespace-normalized and blanks dropped
    pub fn normalized(&self) -> PartInfo {
        let norm = |v: &Option<String>| {
            v.as_deref()
                .map(clean_whitespace)
                .filter(|s| !s.is_empty())
        };
        PartInfo {
            manufacturer: norm(&self.manufacturer),
            mpn: norm(&self.mpn),
            pn: norm(&self.pn),
            supplier: norm(&self.supplier),
            spn: norm(&self.spn),
        }
    }
}

/// What an additional component's quantity is multiplied by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QtyMultiplier {
    /// Connector pin count
    Pincount,
    /// Number of connector pins with a wire or mate attached
    Populated,
    /// Cable wire count
    Wirecount,
    /// Number of wire ends terminated on connectors
    Terminations,
    /// Cable length
    Length,
    /// Cable length times wire count
    TotalLength,
}

impl std::fmt::Display for QtyMultiplier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QtyMultiplier::Pincount => write!(f, "pincount"),
            QtyMultiplier::Populated => write!(f, "populated"),
            QtyMultiplier::Wirecount => write!(f, "wirecount"),
            QtyMultiplier::Terminations => write!(f, "terminations"),
            QtyMultiplier::Length => write!(f, "length"),
            QtyMultiplier::TotalLength => write!(f, "total_length"),
        }
    }
}

fn default_qty() -> f64 {
    1.0
}

/// A part that travels with a connector or cable (housings, seals, sleeves...)
///
/// Additional components appear in the BOM only; they are not part of the
/// electrical graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdditionalComponent {
    #[serde(rename = "type")]
    pub kind: String,

    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "opt_string")]
    pub subtype: Option<String>,

    #[serde(default = "default_qty")]
    pub qty: f64,

    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "opt_string")]
    pub unit: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qty_multiplier: Option<QtyMultiplier>,

    #[serde(flatten)]
    pub part: PartInfo,
}

impl AdditionalComponent {
    /// BOM description: type, optionally followed by subtype
    pub fn description(&self) -> String {
        match &self.subtype {
            Some(subtype) => format!("{}, {}", self.kind, subtype),
            None => self.kind.clone(),
        }
    }
}

/// A free-standing BOM line declared at harness level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdditionalBomItem {
    pub description: String,

    #[serde(default = "default_qty")]
    pub qty: f64,

    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "opt_string")]
    pub unit: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty", deserialize_with = "string_list")]
    pub designators: Vec<String>,

    #[serde(flatten)]
    pub part: PartInfo,
}
