//! Harness-level options and metadata

use serde::{Deserialize, Serialize};
use serde_yml::Mapping;

use crate::core::colors::{self, ColorMode};
use crate::core::error::Result;
use crate::entities::common::opt_string;

fn default_fontname() -> String {
    "arial".to_string()
}

fn default_bgcolor() -> String {
    "WH".to_string()
}

fn default_separator() -> String {
    ".".to_string()
}

/// Drawing options from the `options:` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Options {
    #[serde(default = "default_fontname")]
    pub fontname: String,

    /// Page background color code
    #[serde(default = "default_bgcolor")]
    pub bgcolor: String,

    /// Node background; falls back to `bgcolor`
    #[serde(default, deserialize_with = "opt_string")]
    pub bgcolor_node: Option<String>,

    /// Connector background; falls back to `bgcolor_node`
    #[serde(default, deserialize_with = "opt_string")]
    pub bgcolor_connector: Option<String>,

    /// Cable background; falls back to `bgcolor_node`
    #[serde(default, deserialize_with = "opt_string")]
    pub bgcolor_cable: Option<String>,

    /// Bundle background; falls back to `bgcolor_cable`
    #[serde(default, deserialize_with = "opt_string")]
    pub bgcolor_bundle: Option<String>,

    #[serde(default)]
    pub color_mode: ColorMode,

    /// Separator between template name and designator (`CONN.X1`)
    #[serde(default = "default_separator")]
    pub template_separator: String,

    #[serde(flatten)]
    pub extra: Mapping,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            fontname: default_fontname(),
            bgcolor: default_bgcolor(),
            bgcolor_node: None,
            bgcolor_connector: None,
            bgcolor_cable: None,
            bgcolor_bundle: None,
            color_mode: ColorMode::default(),
            template_separator: default_separator(),
            extra: Mapping::new(),
        }
    }
}

impl Options {
    /// Check that every background is a known color code
    pub fn validate(&self) -> Result<()> {
        colors::validate(&self.bgcolor)?;
        for color in [
            &self.bgcolor_node,
            &self.bgcolor_connector,
            &self.bgcolor_cable,
            &self.bgcolor_bundle,
        ]
        .into_iter()
        .flatten()
        {
            colors::validate(color)?;
        }
        Ok(())
    }

    pub fn node_bgcolor(&self) -> &str {
        self.bgcolor_node.as_deref().unwrap_or(&self.bgcolor)
    }

    pub fn connector_bgcolor(&self) -> &str {
        self.bgcolor_connector
            .as_deref()
            .unwrap_or_else(|| self.node_bgcolor())
    }

    pub fn cable_bgcolor(&self) -> &str {
        self.bgcolor_cable
            .as_deref()
            .unwrap_or_else(|| self.node_bgcolor())
    }

    pub fn bundle_bgcolor(&self) -> &str {
        self.bgcolor_bundle
            .as_deref()
            .unwrap_or_else(|| self.cable_bgcolor())
    }
}

/// Document metadata handed through to output templates
///
/// Sheet numbering is supplied by the caller; the core never computes it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Metadata {
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "opt_string")]
    pub title: Option<String>,

    /// Part number prefix of the harness
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "opt_string")]
    pub pn: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "opt_string")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "opt_string")]
    pub notes: Option<String>,

    /// Role → {name, date}
    #[serde(skip_serializing_if = "Mapping::is_empty")]
    pub authors: Mapping,

    /// Revision → {changelog, name, date}
    #[serde(skip_serializing_if = "Mapping::is_empty")]
    pub revisions: Mapping,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub sheet_current: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub sheet_total: Option<u32>,

    #[serde(flatten)]
    pub extra: Mapping,
}
