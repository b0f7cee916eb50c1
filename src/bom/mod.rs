//! Bill of materials
//!
//! [`Bom`] collects the lines of one harness; [`SharedBom`] accumulates the
//! BOMs of several harnesses, optionally scaled by [`QuantityMultipliers`].

pub mod aggregator;
pub mod entry;
pub mod shared;

pub use aggregator::Bom;
pub use entry::{BomCategory, BomEntry, BomKey, BomTable};
pub use shared::{QuantityMultipliers, SharedBom, SharedEntry};
