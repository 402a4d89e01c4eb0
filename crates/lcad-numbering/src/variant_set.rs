//! Groups of same-type instances sharing one serial number.

use std::collections::BTreeMap;

use crate::instance::{InstanceInfo, SerialNo};
use crate::location::Location;

/// One serial number and the variants handed out under it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantSet {
    serial_no: SerialNo,
    type_name: String,
    variant_list: Vec<String>,
    /// Used variants and where the instance holding each one sits.
    used: BTreeMap<String, Location>,
}

impl VariantSet {
    /// Empty group taking its type and variant list from `inst`.
    pub fn new<K>(inst: &InstanceInfo<K>, serial_no: SerialNo) -> Self {
        Self {
            serial_no,
            type_name: inst.type_name.clone(),
            variant_list: inst.variant_list.clone(),
            used: BTreeMap::new(),
        }
    }

    pub fn serial_no(&self) -> SerialNo {
        self.serial_no
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn variant_list(&self) -> &[String] {
        &self.variant_list
    }

    pub fn is_used(&self, variant: &str) -> bool {
        self.used.contains_key(variant)
    }

    pub fn used_variants(&self) -> impl Iterator<Item = (&str, Location)> {
        self.used.iter().map(|(v, loc)| (v.as_str(), *loc))
    }

    /// Absorb an already-numbered instance, keeping its current variant.
    ///
    /// Fails when the type differs or the variant is taken.
    pub fn add<K>(&mut self, inst: &InstanceInfo<K>) -> bool {
        if self.type_name != inst.type_name || self.is_used(&inst.variant) {
            return false;
        }
        self.mark_used(inst.variant.clone(), inst.location);
        true
    }

    /// Record `variant` as held by an instance at `location`.
    pub fn mark_used(&mut self, variant: String, location: Location) {
        self.used.insert(variant, location);
    }

    /// First declared variant nobody holds yet.
    pub fn pick_unused_variant(&self) -> Option<&str> {
        self.variant_list
            .iter()
            .map(String::as_str)
            .find(|v| !self.is_used(v))
    }

    pub fn unused_variants(&self) -> impl Iterator<Item = &str> {
        self.variant_list
            .iter()
            .map(String::as_str)
            .filter(|v| !self.is_used(v))
    }

    pub fn has_unused(&self) -> bool {
        self.pick_unused_variant().is_some()
    }
}

/// Group table indexed by serial number and by type.
///
/// `by_type` holds serial numbers in insertion order; every entry there is a
/// key of `by_serial` and vice versa.
#[derive(Debug, Clone, Default)]
pub struct VariantSetMap {
    by_serial: BTreeMap<SerialNo, VariantSet>,
    by_type: BTreeMap<String, Vec<SerialNo>>,
}

impl VariantSetMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, serial_no: SerialNo) -> Option<&VariantSet> {
        self.by_serial.get(&serial_no)
    }

    pub fn get_mut(&mut self, serial_no: SerialNo) -> Option<&mut VariantSet> {
        self.by_serial.get_mut(&serial_no)
    }

    pub fn contains(&self, serial_no: SerialNo) -> bool {
        self.by_serial.contains_key(&serial_no)
    }

    pub fn len(&self) -> usize {
        self.by_serial.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_serial.is_empty()
    }

    /// Groups in ascending serial order.
    pub fn values(&self) -> impl Iterator<Item = &VariantSet> {
        self.by_serial.values()
    }

    /// Type names in ascending order.
    pub fn types(&self) -> impl Iterator<Item = &str> {
        self.by_type.keys().map(String::as_str)
    }

    /// Groups of `type_name` in the order they were created.
    pub fn of_type<'a>(
        &'a self,
        type_name: &str,
    ) -> impl Iterator<Item = &'a VariantSet> + use<'a> {
        self.by_type
            .get(type_name)
            .into_iter()
            .flatten()
            .filter_map(|serial_no| self.by_serial.get(serial_no))
    }

    /// Create an empty group for `inst` under a serial number not yet in use.
    pub fn add_entry<K>(&mut self, inst: &InstanceInfo<K>, serial_no: SerialNo) -> &mut VariantSet {
        debug_assert!(!self.contains(serial_no));
        self.by_type
            .entry(inst.type_name.clone())
            .or_default()
            .push(serial_no);
        self.by_serial
            .entry(serial_no)
            .or_insert_with(|| VariantSet::new(inst, serial_no))
    }

    /// Put a numbered instance into its group, creating the group if needed.
    pub fn add<K>(&mut self, inst: &InstanceInfo<K>, serial_no: SerialNo) -> bool {
        match self.by_serial.get_mut(&serial_no) {
            Some(vset) => vset.add(inst),
            None => self.add_entry(inst, serial_no).add(inst),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inst(type_name: &str, variant: &str, x: i32, y: i32) -> InstanceInfo<usize> {
        InstanceInfo::new(0, type_name, Location::new(x, y))
            .with_variant(variant)
            .with_variants(["a", "b", "c"])
    }

    #[test]
    fn add_rejects_other_type_and_duplicate_variant() {
        let mut map = VariantSetMap::new();
        assert!(map.add(&inst("T", "a", 0, 0), 5));
        assert!(!map.add(&inst("T", "a", 10, 0), 5));
        assert!(!map.add(&inst("U", "b", 10, 0), 5));
        assert!(map.add(&inst("T", "b", 10, 0), 5));

        let vset = map.get(5).unwrap();
        assert_eq!(vset.type_name(), "T");
        assert_eq!(vset.pick_unused_variant(), Some("c"));
        assert_eq!(vset.unused_variants().collect::<Vec<_>>(), vec!["c"]);
    }

    #[test]
    fn indices_agree() {
        let mut map = VariantSetMap::new();
        map.add(&inst("T", "a", 0, 0), 3);
        map.add(&inst("U", "a", 0, 0), 1);
        map.add(&inst("T", "a", 0, 0), 2);

        assert_eq!(map.len(), 3);
        assert_eq!(map.types().collect::<Vec<_>>(), vec!["T", "U"]);
        let t_serials: Vec<_> = map.of_type("T").map(VariantSet::serial_no).collect();
        assert_eq!(t_serials, vec![3, 2]);
        let all: Vec<_> = map.values().map(VariantSet::serial_no).collect();
        assert_eq!(all, vec![1, 2, 3]);
        assert_eq!(map.of_type("missing").count(), 0);
    }

    #[test]
    fn add_entry_starts_empty() {
        let mut map = VariantSetMap::new();
        let vset = map.add_entry(&inst("T", "b", 0, 0), 9);
        assert_eq!(vset.used_variants().count(), 0);
        assert_eq!(vset.pick_unused_variant(), Some("a"));
    }

    #[test]
    fn variant_outside_list_still_occupies_a_slot() {
        let mut map = VariantSetMap::new();
        assert!(map.add(&inst("T", "", 0, 0), 1));
        assert!(!map.add(&inst("T", "", 5, 5), 1));
        let vset = map.get(1).unwrap();
        assert_eq!(vset.unused_variants().count(), 3);
    }
}
