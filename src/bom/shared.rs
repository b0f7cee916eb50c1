//! Shared BOM across several harness files

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::bom::aggregator::Bom;
use crate::bom::entry::{format_qty, BomKey, BomTable};
use crate::core::error::{HarnessError, Result};

/// One line of the shared BOM
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SharedEntry {
    pub qty: f64,
    pub unit: Option<String>,
    /// Scaled quantity contributed by each harness, in merge order
    pub contributions: Vec<(String, f64)>,
}

/// Accumulates per-harness BOMs, ordered by key
///
/// Owned by the caller and threaded through the pipeline. A merge either
/// applies completely or leaves the accumulator untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SharedBom {
    entries: BTreeMap<BomKey, SharedEntry>,
}

impl SharedBom {
    pub fn new() -> Self {
        Self::default()
    }

    fn check_unit(&self, key: &BomKey, unit: &Option<String>) -> Result<()> {
        match self.entries.get(key) {
            Some(existing) if existing.unit != *unit => Err(HarnessError::UnitMismatch {
                item: key.description.clone(),
                first: existing.unit.clone().unwrap_or_else(|| "(none)".to_string()),
                second: unit.clone().unwrap_or_else(|| "(none)".to_string()),
            }),
            _ => Ok(()),
        }
    }

    fn add(&mut self, key: &BomKey, harness: &str, qty: f64, unit: &Option<String>) {
        let entry = self.entries.entry(key.clone()).or_insert_with(|| SharedEntry {
            qty: 0.0,
            unit: unit.clone(),
            contributions: Vec::new(),
        });
        entry.qty += qty;
        entry.contributions.push((harness.to_string(), qty));
    }

    /// Merge one harness BOM with every quantity scaled by `factor`
    pub fn merge(&mut self, harness: &str, bom: &Bom, factor: f64) -> Result<()> {
        for entry in bom.entries() {
            self.check_unit(&entry.key, &entry.unit)?;
        }
        for entry in bom.entries() {
            self.add(&entry.key, harness, entry.qty * factor, &entry.unit);
        }
        log::debug!(
            "merged {} BOM lines from {} (x{})",
            bom.len(),
            harness,
            format_qty(factor)
        );
        Ok(())
    }

    /// Fold another accumulator into this one, e.g. after processing in parallel
    pub fn absorb(&mut self, other: SharedBom) -> Result<()> {
        for (key, entry) in &other.entries {
            self.check_unit(key, &entry.unit)?;
        }
        for (key, entry) in other.entries {
            for (harness, qty) in entry.contributions {
                self.add(&key, &harness, qty, &entry.unit);
            }
        }
        Ok(())
    }

    pub fn get(&self, key: &BomKey) -> Option<&SharedEntry> {
        self.entries.get(key)
    }

    /// Total quantity of the line with this description, if any
    pub fn qty_of(&self, description: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(key, _)| key.description == description)
            .map(|(_, entry)| entry.qty)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&BomKey, &SharedEntry)> {
        self.entries.iter()
    }

    /// Table with `Id, Description, Qty, Unit, Harnesses` and any used part columns
    pub fn table(&self) -> BomTable {
        BomTable::build(
            &["Id", "Description", "Qty", "Unit", "Harnesses"],
            self.entries.iter().enumerate().map(|(i, (key, entry))| {
                let mut harnesses: Vec<&str> = Vec::new();
                for (name, _) in &entry.contributions {
                    if !harnesses.contains(&name.as_str()) {
                        harnesses.push(name);
                    }
                }
                let cells = vec![
                    Some((i + 1).to_string()),
                    Some(key.description.clone()),
                    Some(format_qty(entry.qty)),
                    entry.unit.clone(),
                    Some(harnesses.join(", ")),
                ];
                (cells, &key.part)
            }),
        )
    }
}

/// Per-harness quantity multipliers for the shared BOM
///
/// Disabled by default. When enabled, every harness merged into the shared
/// BOM must have an entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuantityMultipliers {
    table: Option<BTreeMap<String, f64>>,
}

impl QuantityMultipliers {
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn from_table(table: BTreeMap<String, f64>) -> Self {
        Self { table: Some(table) }
    }

    /// Parse a `name: factor` YAML mapping
    pub fn from_yaml(text: &str) -> Result<Self> {
        let table: BTreeMap<String, f64> = serde_yml::from_str(text).map_err(|e| {
            HarnessError::configuration(format!("invalid quantity multiplier table: {}", e))
        })?;
        if let Some((name, factor)) = table.iter().find(|(_, f)| !f.is_finite() || **f < 0.0) {
            return Err(HarnessError::configuration(format!(
                "invalid quantity multiplier {} for {}",
                factor, name
            )));
        }
        Ok(Self::from_table(table))
    }

    pub fn is_enabled(&self) -> bool {
        self.table.is_some()
    }

    /// Factor for a harness; 1 when multipliers are disabled
    pub fn factor_for(&self, harness: &str) -> Result<f64> {
        match &self.table {
            None => Ok(1.0),
            Some(table) => table.get(harness).copied().ok_or_else(|| {
                HarnessError::configuration(format!(
                    "no quantity multiplier for harness {}",
                    harness
                ))
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bom::entry::BomCategory;
    use crate::entities::common::PartInfo;

    fn screws(qty: f64, unit: Option<&str>) -> Bom {
        let mut bom = Bom::new();
        bom.add(
            BomKey::new(BomCategory::Additional, "M3x10 screw", &PartInfo::default()),
            qty,
            unit.map(str::to_string),
            &[],
        )
        .unwrap();
        bom
    }

    #[test]
    fn test_two_files_accumulate() {
        let mut shared = SharedBom::new();
        shared.merge("a", &screws(4.0, None), 1.0).unwrap();
        shared.merge("b", &screws(4.0, None), 1.0).unwrap();
        assert_eq!(shared.qty_of("M3x10 screw"), Some(8.0));

        let table = shared.table();
        assert_eq!(table.rows[0][4].as_deref(), Some("a, b"));
    }

    #[test]
    fn test_multiplied_merge() {
        let multipliers = QuantityMultipliers::from_yaml("a: 3\nb: 0.5\n").unwrap();
        let mut shared = SharedBom::new();
        for name in ["a", "b"] {
            let factor = multipliers.factor_for(name).unwrap();
            shared.merge(name, &screws(4.0, None), factor).unwrap();
        }
        assert_eq!(shared.qty_of("M3x10 screw"), Some(14.0));

        let err = multipliers.factor_for("c").unwrap_err();
        assert_eq!(err.kind(), "ConfigurationError");
        assert_eq!(QuantityMultipliers::disabled().factor_for("c").unwrap(), 1.0);
    }

    #[test]
    fn test_failed_merge_is_atomic() {
        let mut shared = SharedBom::new();
        shared.merge("a", &screws(4.0, None), 1.0).unwrap();

        let mut bad = screws(4.0, Some("kg"));
        bad.add(
            BomKey::new(BomCategory::Additional, "Washer", &PartInfo::default()),
            2.0,
            None,
            &[],
        )
        .unwrap();
        let before = shared.clone();
        let err = shared.merge("b", &bad, 1.0).unwrap_err();
        assert_eq!(err.kind(), "UnitMismatchError");
        assert_eq!(shared, before);
    }

    #[test]
    fn test_absorb() {
        let mut left = SharedBom::new();
        left.merge("a", &screws(1.0, None), 1.0).unwrap();
        let mut right = SharedBom::new();
        right.merge("b", &screws(2.0, None), 1.0).unwrap();
        left.absorb(right).unwrap();
        assert_eq!(left.qty_of("M3x10 screw"), Some(3.0));
        assert_eq!(left.len(), 1);
    }

    #[test]
    fn test_invalid_multiplier_table() {
        assert!(QuantityMultipliers::from_yaml("a: lots").is_err());
        assert!(QuantityMultipliers::from_yaml("a: -1").is_err());
    }
}
