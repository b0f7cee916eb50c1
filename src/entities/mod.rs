//! Entity type definitions
//!
//! A harness is built from the following entities:
//!
//! **Components:**
//! - [`Connector`] - Plugs, sockets, ferrules and splices with addressable pins
//! - [`Cable`] - Jacketed cables and loose bundles of wires, optionally shielded
//!
//! **Topology:**
//! - [`Connection`] - One wire and the pins at its ends
//! - [`Mate`] - Mechanical pairing of two pins or two connectors
//!
//! **Document:**
//! - [`Options`] / [`Metadata`] - Drawing options and title block data
//! - [`Harness`] - The validated aggregate of all of the above

pub mod cable;
pub mod common;
pub mod connection;
pub mod connector;
pub mod harness;
pub mod mate;
pub mod options;

pub use cable::{Cable, CableCategory, CableSpec, Gauge, Shield, WireId};
pub use common::{AdditionalBomItem, AdditionalComponent, PartInfo, QtyMultiplier};
pub use connection::{Connection, PinRef, WireRef};
pub use connector::{Connector, ConnectorSpec, ConnectorStyle, Side};
pub use harness::Harness;
pub use mate::{Arrow, ArrowDirection, ArrowWeight, Mate, MateEndpoint, MateSpec};
pub use options::{Metadata, Options};
