//! Per-harness BOM aggregation

use serde::Serialize;
use std::collections::HashMap;

use crate::bom::entry::{format_qty, BomCategory, BomEntry, BomKey, BomTable};
use crate::core::colors::{self, ColorMode};
use crate::core::error::{HarnessError, Result};
use crate::entities::cable::{Cable, WireId};
use crate::entities::common::AdditionalComponent;
use crate::entities::connector::Connector;
use crate::entities::harness::Harness;

/// BOM of one harness, in first-seen order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Bom {
    entries: Vec<BomEntry>,
    #[serde(skip)]
    index: HashMap<BomKey, usize>,
}

impl Bom {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a line, merging it into an existing entry with the same key
    pub fn add(
        &mut self,
        key: BomKey,
        qty: f64,
        unit: Option<String>,
        designators: &[String],
    ) -> Result<()> {
        match self.index.get(&key) {
            Some(&i) => {
                let entry = &mut self.entries[i];
                if entry.unit != unit {
                    return Err(HarnessError::UnitMismatch {
                        item: entry.key.description.clone(),
                        first: entry.unit.clone().unwrap_or_else(|| "(none)".to_string()),
                        second: unit.unwrap_or_else(|| "(none)".to_string()),
                    });
                }
                entry.qty += qty;
                entry.add_designators(designators);
            }
            None => {
                self.index.insert(key.clone(), self.entries.len());
                let mut entry = BomEntry {
                    key,
                    qty,
                    unit,
                    designators: Vec::new(),
                };
                entry.add_designators(designators);
                self.entries.push(entry);
            }
        }
        Ok(())
    }

    /// Collect every BOM line of a harness
    pub fn from_harness(harness: &Harness) -> Result<Self> {
        let mode = harness.options.color_mode;
        let mut bom = Bom::new();

        for connector in harness.connectors() {
            let designators = [connector.designator.clone()];
            if !connector.ignore_in_bom {
                let description = connector_description(connector, mode)?;
                bom.add(
                    BomKey::new(BomCategory::Connector, &description, &connector.part),
                    1.0,
                    None,
                    &designators,
                )?;
            }
            for part in &connector.additional_components {
                let factor = match part.qty_multiplier {
                    Some(multiplier) => connector.qty_multiplier(multiplier)?,
                    None => 1.0,
                };
                bom.add_component(part, factor, &designators)?;
            }
        }

        for cable in harness.cables() {
            let designators = [cable.designator.clone()];
            if !cable.ignore_in_bom {
                if cable.is_bundle() {
                    for wire in cable.wires() {
                        let description = wire_description(cable, wire, mode)?;
                        bom.add(
                            BomKey::new(BomCategory::Wire, &description, &cable.part),
                            cable.length,
                            Some(cable.length_unit.clone()),
                            &designators,
                        )?;
                    }
                } else {
                    let description = cable_description(cable, mode)?;
                    bom.add(
                        BomKey::new(BomCategory::Cable, &description, &cable.part),
                        cable.length,
                        Some(cable.length_unit.clone()),
                        &designators,
                    )?;
                }
            }
            for part in &cable.additional_components {
                let factor = match part.qty_multiplier {
                    Some(multiplier) => cable.qty_multiplier(multiplier)?,
                    None => 1.0,
                };
                bom.add_component(part, factor, &designators)?;
            }
        }

        for item in harness.additional_bom_items() {
            bom.add(
                BomKey::new(BomCategory::Additional, &item.description, &item.part),
                item.qty,
                item.unit.clone(),
                &item.designators,
            )?;
        }

        log::debug!("BOM has {} lines", bom.entries.len());
        Ok(bom)
    }

    fn add_component(
        &mut self,
        part: &AdditionalComponent,
        factor: f64,
        designators: &[String],
    ) -> Result<()> {
        self.add(
            BomKey::new(BomCategory::Additional, &part.description(), &part.part),
            part.qty * factor,
            part.unit.clone(),
            designators,
        )
    }

    pub fn entries(&self) -> &[BomEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Quantity of the line with this description, if any
    pub fn qty_of(&self, description: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|e| e.key.description == description)
            .map(|e| e.qty)
    }

    /// Table with `Id, Description, Qty, Unit, Designators` and any used part columns
    pub fn table(&self) -> BomTable {
        BomTable::build(
            &["Id", "Description", "Qty", "Unit", "Designators"],
            self.entries.iter().enumerate().map(|(i, entry)| {
                let designators: Vec<&str> = entry
                    .designators
                    .iter()
                    .map(String::as_str)
                    .filter(|d| !crate::core::designator::is_generated(d))
                    .collect();
                let cells = vec![
                    Some((i + 1).to_string()),
                    Some(entry.key.description.clone()),
                    Some(format_qty(entry.qty)),
                    entry.unit.clone(),
                    (!designators.is_empty()).then(|| designators.join(", ")),
                ];
                (cells, &entry.key.part)
            }),
        )
    }
}

fn push_color(parts: &mut Vec<String>, color: Option<&str>, mode: ColorMode) -> Result<()> {
    if let Some(color) = color.filter(|c| !c.is_empty()) {
        parts.push(colors::translate(color, mode)?);
    }
    Ok(())
}

fn connector_description(connector: &Connector, mode: ColorMode) -> Result<String> {
    let mut parts = vec!["Connector".to_string()];
    parts.extend(connector.kind.iter().cloned());
    parts.extend(connector.subtype.iter().cloned());
    if connector.shows_pincount() {
        parts.push(format!("{} pins", connector.pincount()));
    }
    push_color(&mut parts, connector.color.as_deref(), mode)?;
    Ok(parts.join(", "))
}

fn gauge_text(cable: &Cable) -> Option<String> {
    cable.gauge.as_ref().map(|g| g.to_string())
}

fn cable_description(cable: &Cable, mode: ColorMode) -> Result<String> {
    let mut parts = vec!["Cable".to_string()];
    parts.extend(cable.kind.iter().cloned());
    let mut size = match gauge_text(cable) {
        Some(gauge) => format!("{} x {}", cable.wirecount, gauge),
        None => format!("{} wires", cable.wirecount),
    };
    if cable.shield.is_present() {
        size.push_str(" shielded");
    }
    parts.push(size);
    push_color(&mut parts, cable.color.as_deref(), mode)?;
    Ok(parts.join(", "))
}

fn wire_description(cable: &Cable, wire: WireId, mode: ColorMode) -> Result<String> {
    let mut parts = vec![if wire == WireId::Shield {
        "Shield".to_string()
    } else {
        "Wire".to_string()
    }];
    parts.extend(cable.kind.iter().cloned());
    parts.extend(gauge_text(cable));
    push_color(&mut parts, cable.wire_color(wire), mode)?;
    Ok(parts.join(", "))
}
