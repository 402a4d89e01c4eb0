//! Serial number and variant allocation for repeated sub-circuit placements.
//!
//! Sub-circuit instances that share a label prefix are numbered together:
//! instances of one type share a serial number and are told apart by a
//! variant suffix (`U1a`, `U1b`, `U2a`, ...). Existing numbers are kept,
//! spare variants are reused before new serial numbers are opened, and
//! whatever is left unused is reported.
//!
//! The allocator itself ([`Numberer`]) works on [`InstanceInfo`] snapshots and
//! writes its decisions through an [`AttributeSink`], so it can drive any
//! circuit model. [`Circuit`] is the serialisable model used by the `lcad`
//! command-line tool:
//!
//! ```rust
//! use lcad_numbering::*;
//!
//! let mut circuit = Circuit::new("alu");
//! for x in [0, 40] {
//!     circuit.add_component(
//!         Component::subcircuit("Adder", Location::new(x, 0))
//!             .with_prefix("U")
//!             .with_variants(["a", "b", "c"]),
//!     );
//! }
//!
//! let run = number_circuit(&circuit, &NumberingConfig::default());
//! circuit.apply_edits(&run.edits).unwrap();
//! assert_eq!(circuit.components[1].serial_no, "1");
//! assert_eq!(circuit.components[1].variant, "b");
//! assert_eq!(run.report.to_string(), "Unused in alu\n   Adder\n      U1c");
//! ```

pub mod circuit;
pub mod config;
pub mod edit;
pub mod instance;
pub mod location;
pub mod numberer;
pub mod placeholder;
pub mod prefix;
pub mod report;
pub mod scan;
pub mod variant_set;

pub use circuit::{Circuit, CircuitError, Component, ComponentId, ComponentKind};
pub use config::{ConfigError, LcadToml, NumberingConfig};
pub use edit::{AttributeEdit, AttributeEdits};
pub use instance::{AttributeSink, InstanceInfo, NumberingAttr, SerialNo, parse_serial_no};
pub use location::{Bounds, Location};
pub use numberer::{Numberer, UnusedSlot};
pub use placeholder::{Placeholder, plan_placeholders};
pub use prefix::LabelPrefix;
pub use report::NumberingReport;
pub use scan::{NumberingRun, PrefixMap, number_circuit, scan_circuit};
pub use variant_set::{VariantSet, VariantSetMap};
