//! Circuit scan, per-prefix routing and the top-level numbering run.

use std::collections::BTreeMap;

use tracing::{Span, instrument};

use crate::circuit::{Circuit, Component, ComponentId, ComponentKind};
use crate::config::NumberingConfig;
use crate::edit::AttributeEdits;
use crate::instance::{AttributeSink, SerialNo};
use crate::numberer::Numberer;
use crate::prefix::LabelPrefix;
use crate::report::NumberingReport;

pub const NUMBERING_ACTION: &str = "Number Components";

/// One [`Numberer`] per label prefix found in a circuit.
#[derive(Debug)]
pub struct PrefixMap<K> {
    starting_serial_no: SerialNo,
    numberers: BTreeMap<LabelPrefix, Numberer<K>>,
    span: Span,
}

impl<K> PrefixMap<K> {
    pub fn new(starting_serial_no: SerialNo) -> Self {
        Self {
            starting_serial_no,
            numberers: BTreeMap::new(),
            span: Span::none(),
        }
    }

    /// Span under which every per-prefix context logs.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn get_or_create(&mut self, prefix: &str) -> &mut Numberer<K> {
        let starting_serial_no = self.starting_serial_no;
        let parent = &self.span;
        self.numberers
            .entry(LabelPrefix::from(prefix))
            .or_insert_with(|| {
                let span = tracing::debug_span!(parent: parent, "numberer", prefix = %prefix);
                Numberer::new(prefix, starting_serial_no).with_span(span)
            })
    }

    pub fn get(&self, prefix: &str) -> Option<&Numberer<K>> {
        self.numberers.get(&LabelPrefix::from(prefix))
    }

    pub fn len(&self) -> usize {
        self.numberers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.numberers.is_empty()
    }

    /// Contexts in natural prefix order.
    pub fn iter(&self) -> impl Iterator<Item = &Numberer<K>> {
        self.numberers.values()
    }

    /// Number every prefix and collect the unused-variant report.
    pub fn number_and_report(
        &mut self,
        circuit_name: &str,
        sink: &mut dyn AttributeSink<K>,
    ) -> NumberingReport {
        let mut report = NumberingReport::new(circuit_name);
        let span = self.span.clone();
        for numberer in self.numberers.values_mut() {
            tracing::trace!(
                parent: &span,
                prefix = numberer.prefix(),
                state = %numberer.dump(),
                "before numbering"
            );
            numberer.number_all(sink);
            report.extend(numberer.report_unused());
        }
        report
    }
}

/// Whether a component takes part in numbering: a sub-circuit placement
/// without a manual label but with a label prefix.
pub fn wants_numbering(component: &Component) -> bool {
    component.kind == ComponentKind::Subcircuit
        && component.label.is_empty()
        && !component.prefix.is_empty()
}

/// Route every numberable component of `circuit` into its prefix context.
pub fn scan_circuit(circuit: &Circuit, starting_serial_no: SerialNo) -> PrefixMap<ComponentId> {
    let mut prefixes = PrefixMap::new(starting_serial_no).with_span(Span::current());
    for (id, component) in circuit.non_wires() {
        log::trace!(
            "{} '{}' at {}, label '{}', prefix '{}'",
            id,
            component.factory,
            component.location,
            component.label,
            component.prefix
        );
        if wants_numbering(component) {
            prefixes
                .get_or_create(&component.prefix)
                .add(component.instance_info(id));
        }
    }
    prefixes
}

/// Everything a numbering run produced.
#[derive(Debug)]
pub struct NumberingRun {
    pub prefixes: PrefixMap<ComponentId>,
    pub edits: AttributeEdits<ComponentId>,
    pub report: NumberingReport,
}

impl NumberingRun {
    /// Components skipped because their serial number text is not numeric.
    pub fn dropped(&self) -> impl Iterator<Item = ComponentId> + '_ {
        self.prefixes.iter().flat_map(|n| n.dropped().iter().copied())
    }

    /// Components that could not be given a serial number.
    pub fn unnumbered(&self) -> impl Iterator<Item = ComponentId> + '_ {
        self.prefixes.iter().flat_map(|n| n.unnumbered().map(|i| i.key))
    }
}

/// Scan `circuit`, number it, and report unused variants.
///
/// The circuit itself is not modified; apply [`NumberingRun::edits`] to
/// persist the result.
#[instrument(name = "number_circuit", skip_all, fields(circuit = %circuit.name))]
pub fn number_circuit(circuit: &Circuit, config: &NumberingConfig) -> NumberingRun {
    let mut prefixes = scan_circuit(circuit, config.starting_serial_no_for(circuit));
    let mut edits = AttributeEdits::new(NUMBERING_ACTION);
    let report = prefixes.number_and_report(&circuit.name, &mut edits);
    log::debug!(
        "Numbered '{}': {} prefixes, {} edits",
        circuit.name,
        prefixes.len(),
        edits.len()
    );
    NumberingRun {
        prefixes,
        edits,
        report,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::Location;

    fn sub(factory: &str, prefix: &str, x: i32, y: i32) -> Component {
        Component::subcircuit(factory, Location::new(x, y))
            .with_prefix(prefix)
            .with_variants(["a", "b"])
    }

    #[test]
    fn scan_filters_components() {
        let mut circuit = Circuit::new("main");
        circuit.add_component(Component::new(ComponentKind::Wire, "Wire", Location::new(0, 0)));
        circuit.add_component(Component::new(
            ComponentKind::Primitive,
            "AND Gate",
            Location::new(0, 0),
        ));
        circuit.add_component(sub("Adder", "U", 0, 0).with_label("manual"));
        circuit.add_component(sub("Adder", "", 0, 0));
        let wanted = circuit.add_component(sub("Adder", "U", 0, 0));
        circuit.add_component(sub("Mux", "X", 0, 0));

        let prefixes = scan_circuit(&circuit, 1);
        assert_eq!(prefixes.len(), 2);
        let u: Vec<ComponentId> = prefixes
            .get("U")
            .unwrap()
            .unnumbered()
            .map(|i| i.key)
            .collect();
        assert_eq!(u, vec![wanted]);
    }

    #[test]
    fn prefixes_number_independently() {
        let mut circuit = Circuit::new("main");
        let u = circuit.add_component(sub("Adder", "U", 0, 0));
        let x = circuit.add_component(sub("Adder", "X", 0, 10));

        let run = number_circuit(&circuit, &NumberingConfig::default());
        let serials: Vec<(ComponentId, &str)> = run
            .edits
            .iter()
            .filter(|e| e.attr == crate::NumberingAttr::SerialNo)
            .map(|e| (e.key, e.value.as_str()))
            .collect();
        assert_eq!(serials, vec![(u, "1"), (x, "1")]);
        assert_eq!(
            run.report.lines(),
            &[
                "Unused in main",
                "   Adder",
                "      U1b",
                "   Adder",
                "      X1b",
            ]
        );
    }

    #[test]
    fn prefixes_are_visited_in_natural_order() {
        let mut circuit = Circuit::new("main");
        circuit.add_component(sub("Adder", "X10", 0, 0));
        circuit.add_component(sub("Adder", "X2", 0, 0));
        let run = number_circuit(&circuit, &NumberingConfig::default());
        let order: Vec<&str> = run.prefixes.iter().map(Numberer::prefix).collect();
        assert_eq!(order, vec!["X2", "X10"]);
        assert_eq!(run.report.lines()[2], "      X21b");
    }

    #[test]
    fn config_override_sets_the_cursor() {
        let mut circuit = Circuit::new("main");
        circuit.starting_serial_no = 7;
        let id = circuit.add_component(sub("Adder", "U", 0, 0));

        let run = number_circuit(&circuit, &NumberingConfig::default());
        assert_eq!(run.edits.iter().next().map(|e| (e.key, e.value.as_str())), Some((id, "7")));

        let config = NumberingConfig {
            starting_serial_no: Some(100),
            ..NumberingConfig::default()
        };
        let run = number_circuit(&circuit, &config);
        assert_eq!(run.edits.iter().next().map(|e| e.value.as_str()), Some("100"));
    }

    #[test]
    fn dropped_components_are_reported_by_the_run() {
        let mut circuit = Circuit::new("main");
        let bad = circuit.add_component(sub("Adder", "U", 0, 0).with_serial_no("abc"));
        let run = number_circuit(&circuit, &NumberingConfig::default());
        assert_eq!(run.dropped().collect::<Vec<_>>(), vec![bad]);
        assert!(run.edits.is_empty());
        assert!(!run.report.has_unused());
    }

    #[test]
    fn second_pass_over_the_same_prefixes_is_a_no_op() {
        let mut circuit = Circuit::new("main");
        circuit.add_component(sub("Adder", "U", 0, 0).with_variants(["a", "b", "c"]));
        let mut prefixes = scan_circuit(&circuit, 1);

        let mut first = AttributeEdits::new(NUMBERING_ACTION);
        let report = prefixes.number_and_report("main", &mut first);
        assert_eq!(first.len(), 2);

        let mut second = AttributeEdits::new(NUMBERING_ACTION);
        assert_eq!(prefixes.number_and_report("main", &mut second), report);
        assert!(second.is_empty());
    }

    #[test]
    fn run_lists_components_left_without_a_serial() {
        let mut circuit = Circuit::new("main");
        circuit.starting_serial_no = SerialNo::MAX;
        let first = circuit.add_component(sub("Adder", "U", 0, 0).with_variants(["a"]));
        let second = circuit.add_component(sub("Adder", "U", 0, 10).with_variants(["a"]));

        let run = number_circuit(&circuit, &NumberingConfig::default());
        assert_eq!(run.unnumbered().collect::<Vec<_>>(), vec![second]);
        let serials: Vec<(ComponentId, &str)> = run
            .edits
            .iter()
            .filter(|e| e.attr == crate::NumberingAttr::SerialNo)
            .map(|e| (e.key, e.value.as_str()))
            .collect();
        assert_eq!(serials, vec![(first, "18446744073709551615")]);
    }
}
