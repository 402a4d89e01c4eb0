//! Serial number and variant allocation for one label prefix.
//!
//! Instances that already carry a usable serial number are grouped into
//! [`VariantSet`]s. Everything else lands on a worklist that
//! [`Numberer::number_all`] drains in reading order:
//!
//! 1. an instance whose manual serial number was rejected first tries to take a
//!    spare variant in that serial's group,
//! 2. then joins the same-type group with a spare variant whose nearest member
//!    is closest to it,
//! 3. and otherwise opens a group under the next free serial number.

use tracing::Span;

use crate::instance::{AttributeSink, InstanceInfo, NumberingAttr, SerialNo};
use crate::variant_set::{VariantSet, VariantSetMap};

/// A variant slot nobody holds after numbering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnusedSlot<'a> {
    pub type_name: &'a str,
    pub serial_no: SerialNo,
    pub variant: &'a str,
    pub variant_list: &'a [String],
}

#[derive(Debug, Clone)]
struct Pending<K> {
    inst: InstanceInfo<K>,
    serial_no: SerialNo,
}

/// Allocation context for one `(circuit, prefix)` pair.
#[derive(Debug)]
pub struct Numberer<K> {
    prefix: String,
    starting_serial_no: SerialNo,
    unnumbered: Vec<Pending<K>>,
    dropped: Vec<K>,
    variant_sets: VariantSetMap,
    span: Span,
}

impl<K> Numberer<K> {
    pub fn new(prefix: impl Into<String>, starting_serial_no: SerialNo) -> Self {
        Self {
            prefix: prefix.into(),
            starting_serial_no,
            unnumbered: Vec::new(),
            dropped: Vec::new(),
            variant_sets: VariantSetMap::new(),
            span: Span::none(),
        }
    }

    /// Parent span for every event this context emits.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn variant_sets(&self) -> &VariantSetMap {
        &self.variant_sets
    }

    /// Instances still waiting for a number, in insertion order.
    ///
    /// Empty after [`Numberer::number_all`] unless the serial number space
    /// ran out.
    pub fn unnumbered(&self) -> impl Iterator<Item = &InstanceInfo<K>> {
        self.unnumbered.iter().map(|p| &p.inst)
    }

    /// Keys of instances skipped because their serial text is not a number.
    pub fn dropped(&self) -> &[K] {
        &self.dropped
    }

    pub fn add(&mut self, inst: InstanceInfo<K>) {
        let Some(serial_no) = inst.parsed_serial_no() else {
            tracing::debug!(
                parent: &self.span,
                instance = %inst.ident(),
                serial_no = %inst.serial_no,
                "skipping instance with unparseable serial number"
            );
            self.dropped.push(inst.key);
            return;
        };
        if serial_no == 0 || !self.variant_sets.add(&inst, serial_no) {
            self.unnumbered.push(Pending { inst, serial_no });
        }
    }

    /// Number every instance on the worklist, reporting each decision to `sink`.
    ///
    /// The worklist is drained, so calling this again only numbers instances
    /// added since.
    pub fn number_all(&mut self, sink: &mut dyn AttributeSink<K>) {
        let mut candidate = Some(self.starting_serial_no.max(1));
        let mut pending = std::mem::take(&mut self.unnumbered);
        pending.sort_by(|a, b| a.inst.location.reading_order(&b.inst.location));

        for p in pending {
            if self.number_using_spare(&p, sink) {
                continue;
            }
            while let Some(serial_no) = candidate
                && self.variant_sets.contains(serial_no)
            {
                candidate = serial_no.checked_add(1);
            }
            match candidate {
                Some(serial_no) => self.number_using_serial(&p.inst, serial_no, sink),
                None => {
                    tracing::warn!(
                        parent: &self.span,
                        instance = %p.inst.ident(),
                        "no serial number left above the starting serial number"
                    );
                    self.unnumbered.push(p);
                }
            }
        }
    }

    fn number_using_spare(&mut self, p: &Pending<K>, sink: &mut dyn AttributeSink<K>) -> bool {
        let inst = &p.inst;
        let span = self.span.clone();

        if p.serial_no != 0
            && let Some(vset) = self.variant_sets.get_mut(p.serial_no)
            && vset.type_name() == inst.type_name
            && let Some(variant) = vset.pick_unused_variant().map(str::to_owned)
        {
            tracing::debug!(
                parent: &span,
                instance = %inst.ident(),
                serial_no = p.serial_no,
                variant = %variant,
                "reusing spare variant of manual serial number"
            );
            assign_variant(vset, inst, variant, sink);
            return true;
        }

        let best = self
            .variant_sets
            .of_type(&inst.type_name)
            .filter(|vset| vset.has_unused())
            .flat_map(|vset| {
                vset.used_variants().map(move |(_, loc)| {
                    (vset.serial_no(), inst.location.manhattan_distance_to(loc))
                })
            })
            .fold(None, |best: Option<(SerialNo, u64)>, (serial_no, dist)| match best {
                Some((_, best_dist)) if best_dist <= dist => best,
                _ => Some((serial_no, dist)),
            });

        let Some((serial_no, dist)) = best else {
            return false;
        };
        let Some(vset) = self.variant_sets.get_mut(serial_no) else {
            return false;
        };
        let Some(variant) = vset.pick_unused_variant().map(str::to_owned) else {
            return false;
        };
        tracing::debug!(
            parent: &span,
            instance = %inst.ident(),
            serial_no,
            variant = %variant,
            distance = dist,
            "joining nearest group"
        );
        sink.set(&inst.key, NumberingAttr::SerialNo, serial_no.to_string());
        assign_variant(vset, inst, variant, sink);
        true
    }

    fn number_using_serial(
        &mut self,
        inst: &InstanceInfo<K>,
        serial_no: SerialNo,
        sink: &mut dyn AttributeSink<K>,
    ) {
        tracing::debug!(
            parent: &self.span,
            instance = %inst.ident(),
            serial_no,
            "opening new serial number"
        );
        sink.set(&inst.key, NumberingAttr::SerialNo, serial_no.to_string());
        let vset = self.variant_sets.add_entry(inst, serial_no);
        if let Some(variant) = vset.pick_unused_variant().map(str::to_owned) {
            assign_variant(vset, inst, variant, sink);
        }
    }

    /// Every unused variant slot, by type name, then group creation order,
    /// then declared variant order.
    pub fn unused_slots(&self) -> impl Iterator<Item = UnusedSlot<'_>> {
        self.variant_sets.types().flat_map(move |type_name| {
            self.variant_sets.of_type(type_name).flat_map(|vset| {
                vset.unused_variants().map(move |variant| UnusedSlot {
                    type_name: vset.type_name(),
                    serial_no: vset.serial_no(),
                    variant,
                    variant_list: vset.variant_list(),
                })
            })
        })
    }

    /// Report lines for the unused slots of this prefix.
    ///
    /// Each type with spare slots gets a heading followed by one line per
    /// group listing `prefix + serial + variant` for each free variant.
    pub fn report_unused(&self) -> Vec<String> {
        let mut report = Vec::new();
        for type_name in self.variant_sets.types() {
            let lines: Vec<String> = self
                .variant_sets
                .of_type(type_name)
                .filter_map(|vset| self.unused_line(vset))
                .collect();
            if !lines.is_empty() {
                report.push(format!("   {type_name}"));
                report.extend(lines);
            }
        }
        report
    }

    fn unused_line(&self, vset: &VariantSet) -> Option<String> {
        let unused: Vec<String> = vset
            .unused_variants()
            .map(|variant| format!("{}{}{}", self.prefix, vset.serial_no(), variant))
            .collect();
        (!unused.is_empty()).then(|| format!("      {}", unused.join(", ")))
    }

    /// Multi-line summary of the worklist and groups, for debug output.
    pub fn dump(&self) -> String {
        let mut out = String::from("Unnumbered:\n");
        for inst in self.unnumbered() {
            out.push_str(&format!("   {}\n", inst.ident()));
        }
        for vset in self.variant_sets.values() {
            let used: Vec<&str> = vset.used_variants().map(|(v, _)| v).collect();
            out.push_str(&format!("Serial No. {}:\n", vset.serial_no()));
            out.push_str(&format!("   Variants: {:?}\n", vset.variant_list()));
            out.push_str(&format!("   Used: {used:?}\n"));
        }
        out
    }
}

fn assign_variant<K>(
    vset: &mut VariantSet,
    inst: &InstanceInfo<K>,
    variant: String,
    sink: &mut dyn AttributeSink<K>,
) {
    sink.set(&inst.key, NumberingAttr::Variant, variant.clone());
    vset.mark_used(variant, inst.location);
}
