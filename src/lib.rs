//! harnessviz: wiring harness diagrams and bills of materials
//!
//! Declarative YAML harness descriptions are validated into an entity model,
//! resolved into pin-to-wire connections, assembled into a layout-engine
//! graph and aggregated into per-harness and shared BOMs.

pub mod bom;
pub mod cli;
pub mod core;
pub mod entities;
pub mod graph;
pub mod yaml;
