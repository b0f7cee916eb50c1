//! Connections - one wire of a cable and the connector pins at its ends

use serde::Serialize;
use std::fmt;

use crate::core::error::{HarnessError, Result};
use crate::entities::cable::WireId;

/// A connector pin
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct PinRef {
    pub connector: String,
    pub pin: u32,
}

impl PinRef {
    pub fn new(connector: impl Into<String>, pin: u32) -> Self {
        Self {
            connector: connector.into(),
            pin,
        }
    }
}

impl fmt::Display for PinRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.connector, self.pin)
    }
}

/// A wire (or the shield) of a cable
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct WireRef {
    pub cable: String,
    pub wire: WireId,
}

impl WireRef {
    pub fn new(cable: impl Into<String>, wire: WireId) -> Self {
        Self {
            cable: cable.into(),
            wire,
        }
    }

    pub fn is_shield(&self) -> bool {
        self.wire == WireId::Shield
    }
}

impl fmt::Display for WireRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.cable, self.wire)
    }
}

/// A resolved connection: one physical wire and up to two pins
///
/// A missing end is an open wire (pigtail). At least one end is always present.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Connection {
    pub from: Option<PinRef>,
    pub via: WireRef,
    pub to: Option<PinRef>,
}

impl Connection {
    pub fn new(from: Option<PinRef>, via: WireRef, to: Option<PinRef>) -> Result<Self> {
        if from.is_none() && to.is_none() {
            return Err(HarnessError::validation(format!(
                "connection through {} has neither a from nor a to pin",
                via
            )));
        }
        Ok(Self { from, via, to })
    }

    pub fn is_open_ended(&self) -> bool {
        self.from.is_none() || self.to.is_none()
    }
}

impl fmt::Display for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let end = |p: &Option<PinRef>| p.as_ref().map_or("-".to_string(), |p| p.to_string());
        write!(f, "{} -> {} -> {}", end(&self.from), self.via, end(&self.to))
    }
}
