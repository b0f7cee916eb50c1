//! Mate entity - a mechanical pairing between two pins or two connectors
//!
//! A mate is drawn as a dashed edge with no cable in between. It is not an
//! electrical connection and never contributes to the BOM.

use serde::{Deserialize, Serialize};
use serde_yml::Value;

use crate::core::error::{HarnessError, Result};
use crate::entities::connection::PinRef;

/// Arrow heads on a mate edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArrowDirection {
    None,
    Forward,
    Back,
    Both,
}

impl std::fmt::Display for ArrowDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArrowDirection::None => write!(f, "none"),
            ArrowDirection::Forward => write!(f, "forward"),
            ArrowDirection::Back => write!(f, "back"),
            ArrowDirection::Both => write!(f, "both"),
        }
    }
}

/// Line weight of a mate edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArrowWeight {
    /// Drawn with `-`, one line
    Single,
    /// Drawn with `=`, two lines
    Double,
}

/// A parsed arrow such as `-->`, `<==` or `<->`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Arrow {
    pub direction: ArrowDirection,
    pub weight: ArrowWeight,
}

impl Arrow {
    pub fn new(direction: ArrowDirection, weight: ArrowWeight) -> Self {
        Self { direction, weight }
    }

    /// Whether a string looks like an arrow (used to tell arrows from designators)
    pub fn is_arrow(s: &str) -> bool {
        s.parse::<Arrow>().is_ok()
    }
}

impl std::str::FromStr for Arrow {
    type Err = HarnessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let back = trimmed.starts_with('<');
        let forward = trimmed.ends_with('>');
        let body = trimmed.trim_start_matches('<').trim_end_matches('>');
        // Strip at most one head on each side
        let stripped = usize::from(back) + usize::from(forward);
        if trimmed.len() != body.len() + stripped || body.is_empty() {
            return Err(HarnessError::configuration(format!("'{}' is not a mate arrow", s)));
        }
        let weight = if body.chars().all(|c| c == '-') {
            ArrowWeight::Single
        } else if body.chars().all(|c| c == '=') {
            ArrowWeight::Double
        } else {
            return Err(HarnessError::configuration(format!("'{}' is not a mate arrow", s)));
        };
        let direction = match (back, forward) {
            (true, true) => ArrowDirection::Both,
            (true, false) => ArrowDirection::Back,
            (false, true) => ArrowDirection::Forward,
            (false, false) => ArrowDirection::None,
        };
        Ok(Arrow { direction, weight })
    }
}

/// A mate between two pins or between two whole connectors
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "variant", rename_all = "snake_case")]
pub enum Mate {
    Pin { from: PinRef, to: PinRef, arrow: Arrow },
    Component { from: String, to: String, arrow: Arrow },
}

impl Mate {
    pub fn arrow(&self) -> Arrow {
        match self {
            Mate::Pin { arrow, .. } | Mate::Component { arrow, .. } => *arrow,
        }
    }

    /// Designators of the two mated connectors
    pub fn connectors(&self) -> (&str, &str) {
        match self {
            Mate::Pin { from, to, .. } => (&from.connector, &to.connector),
            Mate::Component { from, to, .. } => (from, to),
        }
    }
}

/// One end of a mate in the `mates:` section: a designator or `[designator, pin]`
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum MateEndpoint {
    Component(String),
    Pin(String, Value),
}

/// A mate as written in the `mates:` section
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MateSpec {
    pub from: MateEndpoint,
    pub to: MateEndpoint,
    #[serde(default)]
    pub arrow: Option<String>,
}

impl MateSpec {
    /// Arrow for this mate; defaults to a forward arrow of the variant's usual weight
    pub fn arrow(&self) -> Result<Arrow> {
        match &self.arrow {
            Some(s) => s.parse(),
            None => {
                let weight = match (&self.from, &self.to) {
                    (MateEndpoint::Component(_), MateEndpoint::Component(_)) => ArrowWeight::Double,
                    _ => ArrowWeight::Single,
                };
                Ok(Arrow::new(ArrowDirection::Forward, weight))
            }
        }
    }
}
