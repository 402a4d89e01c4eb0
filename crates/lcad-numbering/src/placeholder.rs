//! Layout of placeholder components for unused variant slots.
//!
//! Placeholders are packed left to right in rows below the circuit, wrapping
//! at the circuit's right edge. Everything is snapped to the grid; positions
//! saturate at the edge of the `i32` canvas.

use serde::{Deserialize, Serialize};

use crate::config::NumberingConfig;
use crate::instance::SerialNo;
use crate::location::{Bounds, Location, snap_down, snap_up};
use crate::scan::PrefixMap;

/// A component to be added for one unused `(serial, variant)` slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placeholder {
    pub prefix: String,
    pub type_name: String,
    pub serial_no: SerialNo,
    pub variant: String,
    pub variant_list: Vec<String>,
    pub location: Location,
    pub offset_bounds: Bounds,
}

impl Placeholder {
    /// Designator shown in reports, e.g. `U3b`.
    pub fn designator(&self) -> String {
        format!("{}{}{}", self.prefix, self.serial_no, self.variant)
    }
}

/// Plan one placeholder per unused slot of every prefix in `prefixes`.
///
/// `footprint` yields the offset bounds of a type.
pub fn plan_placeholders<K>(
    prefixes: &PrefixMap<K>,
    circuit_bounds: Bounds,
    footprint: impl Fn(&str) -> Bounds,
    config: &NumberingConfig,
) -> Vec<Placeholder> {
    let grid = config.grid;
    let spacing = config.placeholder_spacing;

    let x0 = snap_down(circuit_bounds.x, grid);
    let x1 = snap_up(circuit_bounds.right(), grid);
    let mut x = x0;
    let mut y = snap_up(circuit_bounds.bottom(), grid).saturating_add(spacing);
    let mut row_height = 0;

    let mut placed = Vec::new();
    for numberer in prefixes.iter() {
        for slot in numberer.unused_slots() {
            let fbounds = footprint(slot.type_name);
            let l = snap_down(fbounds.x, grid);
            let r = snap_up(fbounds.right(), grid);
            let t = snap_down(fbounds.y, grid);
            let b = snap_up(fbounds.bottom(), grid);
            let (w, h) = (r.saturating_sub(l), b.saturating_sub(t));

            if x.saturating_add(w) > x1 {
                x = x0;
                y = y.saturating_add(row_height).saturating_add(spacing);
                row_height = 0;
            }

            let location = Location::new(x.saturating_sub(l), y.saturating_sub(t));
            log::debug!(
                "Placeholder {}{}{} ({}) at {}",
                numberer.prefix(),
                slot.serial_no,
                slot.variant,
                slot.type_name,
                location
            );
            placed.push(Placeholder {
                prefix: numberer.prefix().to_string(),
                type_name: slot.type_name.to_string(),
                serial_no: slot.serial_no,
                variant: slot.variant.to_string(),
                variant_list: slot.variant_list.to_vec(),
                location,
                offset_bounds: fbounds,
            });

            x = x.saturating_add(w).saturating_add(spacing);
            row_height = row_height.max(h);
        }
    }
    placed
}
