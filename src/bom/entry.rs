//! BOM entry identity

use serde::Serialize;
use std::fmt;

use crate::entities::common::{clean_whitespace, PartInfo};

/// Kind of BOM line; the shared BOM is ordered by category first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BomCategory {
    Connector,
    Cable,
    Wire,
    Additional,
}

impl fmt::Display for BomCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BomCategory::Connector => write!(f, "connector"),
            BomCategory::Cable => write!(f, "cable"),
            BomCategory::Wire => write!(f, "wire"),
            BomCategory::Additional => write!(f, "additional"),
        }
    }
}

/// Normalized identity of a BOM line
///
/// Two lines with equal keys describe the same purchasable item. Notes and
/// other free text never take part in the key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct BomKey {
    pub category: BomCategory,
    pub description: String,
    #[serde(flatten)]
    pub part: PartInfo,
}

impl BomKey {
    pub fn new(category: BomCategory, description: &str, part: &PartInfo) -> Self {
        Self {
            category,
            description: clean_whitespace(description),
            part: part.normalized(),
        }
    }
}

/// One line of a BOM
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BomEntry {
    #[serde(flatten)]
    pub key: BomKey,
    pub qty: f64,
    pub unit: Option<String>,
    pub designators: Vec<String>,
}

impl BomEntry {
    /// Record more designators, keeping first-seen order without repeats
    pub fn add_designators<'a>(&mut self, designators: impl IntoIterator<Item = &'a String>) {
        for designator in designators {
            if !self.designators.contains(designator) {
                self.designators.push(designator.clone());
            }
        }
    }
}

/// Format a quantity without trailing zeros (`2`, `0.5`, `1.25`)
pub fn format_qty(qty: f64) -> String {
    if qty.fract() == 0.0 && qty.abs() < 1e15 {
        format!("{}", qty as i64)
    } else {
        let text = format!("{:.6}", qty);
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

/// Tabular BOM handed to output drivers: a header row and rows of optional cells
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BomTable {
    pub header: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl BomTable {
    /// Build a table from fixed leading columns plus the part columns that some row fills
    pub(crate) fn build<'a>(
        leading: &[&str],
        lines: impl IntoIterator<Item = (Vec<Option<String>>, &'a PartInfo)>,
    ) -> Self {
        let lines: Vec<(Vec<Option<String>>, &PartInfo)> = lines.into_iter().collect();
        let part_columns: [(&str, fn(&PartInfo) -> &Option<String>); 5] = [
            ("Manufacturer", |p| &p.manufacturer),
            ("MPN", |p| &p.mpn),
            ("P/N", |p| &p.pn),
            ("Supplier", |p| &p.supplier),
            ("SPN", |p| &p.spn),
        ];
        let used: Vec<_> = part_columns
            .iter()
            .filter(|(_, get)| lines.iter().any(|(_, part)| get(*part).is_some()))
            .collect();

        let mut header: Vec<String> = leading.iter().map(|s| s.to_string()).collect();
        header.extend(used.iter().map(|(name, _)| name.to_string()));

        let rows = lines
            .into_iter()
            .map(|(mut cells, part)| {
                cells.extend(used.iter().map(|(_, get)| get(part).clone()));
                cells
            })
            .collect();
        Self { header, rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_normalization() {
        let part = PartInfo {
            mpn: Some(" 123\n 456 ".to_string()),
            ..Default::default()
        };
        let a = BomKey::new(BomCategory::Connector, "Connector,  Molex\n KK", &part);
        let b = BomKey::new(
            BomCategory::Connector,
            "Connector, Molex KK",
            &PartInfo {
                mpn: Some("123 456".to_string()),
                ..Default::default()
            },
        );
        assert_eq!(a, b);
        assert_ne!(a, BomKey::new(BomCategory::Cable, "Connector, Molex KK", &b.part));
    }

    #[test]
    fn test_format_qty() {
        assert_eq!(format_qty(2.0), "2");
        assert_eq!(format_qty(0.5), "0.5");
        assert_eq!(format_qty(1.25), "1.25");
    }

    #[test]
    fn test_table_part_columns() {
        let with_pn = PartInfo {
            pn: Some("P-1".to_string()),
            ..Default::default()
        };
        let blank = PartInfo::default();
        let table = BomTable::build(
            &["Id", "Description"],
            vec![
                (vec![Some("1".to_string()), Some("A".to_string())], &with_pn),
                (vec![Some("2".to_string()), Some("B".to_string())], &blank),
            ],
        );
        assert_eq!(table.header, vec!["Id", "Description", "P/N"]);
        assert_eq!(table.rows[0][2].as_deref(), Some("P-1"));
        assert_eq!(table.rows[1][2], None);
    }
}
