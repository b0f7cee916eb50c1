//! Harness builder - validates a parsed document and assembles the [`Harness`]

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_yml::{Mapping, Value};

use crate::core::error::{HarnessError, Result};
use crate::core::resolver::{Resolver, Templates};
use crate::entities::cable::{Cable, CableSpec};
use crate::entities::common::{scalar_to_string, AdditionalBomItem};
use crate::entities::connector::{Connector, ConnectorSpec};
use crate::entities::harness::Harness;
use crate::entities::mate::MateSpec;
use crate::entities::options::{Metadata, Options};

/// Top-level sections of a harness document
///
/// Sections stay untyped until [`build_harness`] so that prepended fragments
/// can be merged key by key first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessDocument {
    pub metadata: Mapping,
    pub options: Mapping,
    pub connectors: Mapping,
    pub cables: Mapping,
    pub connections: Vec<Value>,
    pub mates: Vec<Value>,
    pub additional_bom_items: Vec<Value>,
    #[serde(flatten)]
    pub extra: Mapping,
}

impl HarnessDocument {
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Null => Ok(Self::default()),
            value => serde_yml::from_value(value)
                .map_err(|e| HarnessError::schema("document", e.to_string())),
        }
    }

    /// Merge a prepended fragment under this document
    ///
    /// Mapping sections merge key-wise with `self` winning; list sections are
    /// concatenated with the fragment's entries first.
    pub fn merge_fragment(&mut self, fragment: HarnessDocument) {
        fn merge_map(target: &mut Mapping, fragment: Mapping) {
            let mut merged = fragment;
            for (key, value) in std::mem::take(target) {
                merged.insert(key, value);
            }
            *target = merged;
        }
        fn merge_list(target: &mut Vec<Value>, mut fragment: Vec<Value>) {
            fragment.append(target);
            *target = fragment;
        }

        merge_map(&mut self.metadata, fragment.metadata);
        merge_map(&mut self.options, fragment.options);
        merge_map(&mut self.connectors, fragment.connectors);
        merge_map(&mut self.cables, fragment.cables);
        merge_map(&mut self.extra, fragment.extra);
        merge_list(&mut self.connections, fragment.connections);
        merge_list(&mut self.mates, fragment.mates);
        merge_list(&mut self.additional_bom_items, fragment.additional_bom_items);
    }
}

/// Merge prepended fragments (in order) beneath the main document
///
/// Later fragments override earlier ones; the main document overrides all.
pub fn merge_documents(fragments: Vec<HarnessDocument>, main: HarnessDocument) -> HarnessDocument {
    let mut base = HarnessDocument::default();
    for fragment in fragments {
        let mut next = fragment;
        next.merge_fragment(base);
        base = next;
    }
    let mut document = main;
    document.merge_fragment(base);
    document
}

fn section<T: DeserializeOwned>(entity: &str, value: Value) -> Result<T> {
    serde_yml::from_value(value).map_err(|e| HarnessError::schema(entity, e.to_string()))
}

fn key_name(key: &Value) -> Result<String> {
    scalar_to_string(key)
        .ok_or_else(|| HarnessError::schema("document", format!("invalid designator {:?}", key)))
}

fn templates(document: &HarnessDocument) -> Result<Templates> {
    let mut templates = Templates::new();
    for (key, value) in &document.connectors {
        let name = key_name(key)?;
        let spec: ConnectorSpec = match value {
            Value::Null => ConnectorSpec::default(),
            value => section(&name, value.clone())?,
        };
        templates.add_connector(Connector::from_spec(&name, spec)?)?;
    }
    for (key, value) in &document.cables {
        let name = key_name(key)?;
        let spec: CableSpec = match value {
            Value::Null => CableSpec::default(),
            value => section(&name, value.clone())?,
        };
        templates.add_cable(Cable::from_spec(&name, spec)?)?;
    }
    Ok(templates)
}

/// Validate a document and resolve it into a harness
pub fn build_harness(document: &HarnessDocument) -> Result<Harness> {
    for key in document.extra.keys() {
        log::warn!("ignoring unknown section {:?}", key);
    }

    let options: Options = section("options", Value::Mapping(document.options.clone()))?;
    options.validate()?;
    let metadata: Metadata = section("metadata", Value::Mapping(document.metadata.clone()))?;

    let templates = templates(document)?;
    log::debug!(
        "{} connector and {} cable templates",
        templates.connectors().len(),
        templates.cables().len()
    );

    let separator = options.template_separator.clone();
    let mut harness = Harness::new(metadata, options);
    let mut resolver = Resolver::new(&templates, &separator);

    for set in &document.connections {
        resolver.resolve_set(&mut harness, set)?;
    }
    for value in &document.mates {
        let spec: MateSpec = serde_yml::from_value(value.clone())
            .map_err(|e| HarnessError::configuration(format!("invalid mate: {}", e)))?;
        resolver.resolve_mate(&mut harness, &spec)?;
    }
    resolver.finish(&mut harness)?;
    harness.activate_loops()?;

    for value in &document.additional_bom_items {
        let item: AdditionalBomItem = section("additional_bom_items", value.clone())?;
        harness.add_bom_item(item);
    }

    for cable in harness.cables() {
        if cable.length == 0.0 && !cable.ignore_in_bom {
            log::warn!("cable {} has no length", cable.designator);
        }
    }

    log::debug!(
        "built harness: {} connectors, {} cables, {} connections, {} mates",
        harness.connectors().len(),
        harness.cables().len(),
        harness.connections().len(),
        harness.mates().len()
    );
    Ok(harness)
}
