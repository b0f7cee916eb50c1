//! Harness processing pipeline
//!
//! One harness file goes through: fragment merge, entity build, connection
//! resolution, graph assembly and BOM aggregation. The shared BOM is owned by
//! the caller and only touched once a harness has been fully processed.

use serde_yml::Value;

use crate::bom::{Bom, QuantityMultipliers, SharedBom};
use crate::core::builder::{build_harness, merge_documents, HarnessDocument};
use crate::core::error::{HarnessError, Result};
use crate::entities::{Harness, Metadata};
use crate::graph::{assemble, Graph};

/// One harness to process
#[derive(Debug, Clone, PartialEq)]
pub struct HarnessInput {
    /// Harness name, used for the multiplier lookup and in reports
    pub name: String,
    /// The main document
    pub document: Value,
    /// Prepended fragments, in order; later fragments win over earlier ones
    pub prepend: Vec<Value>,
    /// `(current, total)` sheet numbering, used when the metadata has none
    pub sheet: Option<(u32, u32)>,
}

impl HarnessInput {
    pub fn new(name: impl Into<String>, document: Value) -> Self {
        Self {
            name: name.into(),
            document,
            prepend: Vec::new(),
            sheet: None,
        }
    }

    pub fn with_prepend(mut self, prepend: Vec<Value>) -> Self {
        self.prepend = prepend;
        self
    }

    pub fn with_sheet(mut self, current: u32, total: u32) -> Self {
        self.sheet = Some((current, total));
        self
    }
}

/// Everything the output drivers need for one harness
#[derive(Debug, Clone)]
pub struct HarnessOutput {
    pub name: String,
    pub harness: Harness,
    pub graph: Graph,
    pub bom: Bom,
    pub metadata: Metadata,
    /// Factor applied when merging into the shared BOM
    pub multiplier: f64,
}

/// Process one harness and merge its BOM into `shared`
///
/// `shared` is left untouched when any step fails.
pub fn process_harness(
    input: &HarnessInput,
    shared: &mut SharedBom,
    multipliers: &QuantityMultipliers,
) -> Result<HarnessOutput> {
    log::debug!("processing harness {}", input.name);

    let fragments = input
        .prepend
        .iter()
        .cloned()
        .map(HarnessDocument::from_value)
        .collect::<Result<Vec<_>>>()?;
    let main = HarnessDocument::from_value(input.document.clone())?;
    let document = merge_documents(fragments, main);

    let harness = build_harness(&document)?;
    let graph = assemble(&harness)?;
    let bom = Bom::from_harness(&harness)?;

    let multiplier = multipliers.factor_for(&input.name)?;
    shared.merge(&input.name, &bom, multiplier)?;

    let mut metadata = harness.metadata.clone();
    if let Some((current, total)) = input.sheet {
        metadata.sheet_current.get_or_insert(current);
        metadata.sheet_total.get_or_insert(total);
    }

    log::debug!(
        "harness {}: {} nodes, {} edges, {} BOM lines",
        input.name,
        graph.nodes.len(),
        graph.edges.len(),
        bom.len()
    );

    Ok(HarnessOutput {
        name: input.name.clone(),
        harness,
        graph,
        bom,
        metadata,
        multiplier,
    })
}

/// Result of processing several harnesses in order
#[derive(Debug, Clone)]
pub struct BatchReport {
    /// Harnesses processed before the first failure
    pub outputs: Vec<HarnessOutput>,
    /// Contributions of every completed harness
    pub shared: SharedBom,
    /// The harness that aborted the batch, with its error
    pub failure: Option<(String, HarnessError)>,
}

impl BatchReport {
    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }

    pub fn completed(&self) -> impl Iterator<Item = &str> {
        self.outputs.iter().map(|o| o.name.as_str())
    }
}

/// Process harnesses in order, stopping at the first failure
pub fn process_batch(inputs: &[HarnessInput], multipliers: &QuantityMultipliers) -> BatchReport {
    let mut report = BatchReport {
        outputs: Vec::with_capacity(inputs.len()),
        shared: SharedBom::new(),
        failure: None,
    };

    for input in inputs {
        match process_harness(input, &mut report.shared, multipliers) {
            Ok(output) => report.outputs.push(output),
            Err(e) => {
                log::warn!("{} failed: {}", input.name, e);
                report.failure = Some((input.name.clone(), e));
                break;
            }
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn doc(yaml: &str) -> Value {
        serde_yml::from_str(yaml).unwrap()
    }

    const SCREWS: &str = r#"
connectors:
  X1:
    pincount: 1
additional_bom_items:
  - description: M3x10 screw
    qty: 4
"#;

    #[test]
    fn test_two_files_share_screws() {
        let inputs = vec![
            HarnessInput::new("a", doc(SCREWS)),
            HarnessInput::new("b", doc(SCREWS)),
        ];
        let report = process_batch(&inputs, &QuantityMultipliers::disabled());
        assert!(report.is_success());
        assert_eq!(report.completed().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(report.shared.qty_of("M3x10 screw"), Some(8.0));
    }

    #[test]
    fn test_multipliers_scale_shared_bom() {
        let mut table = BTreeMap::new();
        table.insert("a".to_string(), 2.0);
        table.insert("b".to_string(), 1.0);
        let multipliers = QuantityMultipliers::from_table(table);
        let inputs = vec![
            HarnessInput::new("a", doc(SCREWS)),
            HarnessInput::new("b", doc(SCREWS)),
        ];
        let report = process_batch(&inputs, &multipliers);
        assert_eq!(report.shared.qty_of("M3x10 screw"), Some(12.0));
        // the per-harness BOM is never scaled
        assert_eq!(report.outputs[0].bom.qty_of("M3x10 screw"), Some(4.0));
    }

    #[test]
    fn test_failure_keeps_earlier_contributions() {
        let broken = r#"
connectors:
  X1:
    pincount: 1
connections:
  - - X9: [1]
"#;
        let inputs = vec![
            HarnessInput::new("a", doc(SCREWS)),
            HarnessInput::new("broken", doc(broken)),
            HarnessInput::new("c", doc(SCREWS)),
        ];
        let report = process_batch(&inputs, &QuantityMultipliers::disabled());
        let (name, err) = report.failure.clone().unwrap();
        assert_eq!(name, "broken");
        assert_eq!(err.kind(), "UnresolvedReferenceError");
        assert_eq!(report.outputs.len(), 1);
        assert_eq!(report.shared.qty_of("M3x10 screw"), Some(4.0));
    }

    #[test]
    fn test_missing_multiplier_leaves_shared_untouched() {
        let multipliers = QuantityMultipliers::from_table(BTreeMap::new());
        let mut shared = SharedBom::new();
        let err = process_harness(&HarnessInput::new("a", doc(SCREWS)), &mut shared, &multipliers)
            .unwrap_err();
        assert_eq!(err.kind(), "ConfigurationError");
        assert!(shared.is_empty());
    }

    #[test]
    fn test_prepend_and_sheet() {
        let fragment = doc(
            r#"
connectors:
  X1:
    pincount: 2
metadata:
  title: From fragment
"#,
        );
        let main = doc(
            r#"
connections:
  - - X1: [1, 2]
"#,
        );
        let input = HarnessInput::new("main", main)
            .with_prepend(vec![fragment])
            .with_sheet(2, 3);
        let mut shared = SharedBom::new();
        let output =
            process_harness(&input, &mut shared, &QuantityMultipliers::disabled()).unwrap();
        assert_eq!(output.metadata.title.as_deref(), Some("From fragment"));
        assert_eq!(output.metadata.sheet_current, Some(2));
        assert_eq!(output.metadata.sheet_total, Some(3));
        assert!(output.graph.node("X1").is_some());
    }
}
