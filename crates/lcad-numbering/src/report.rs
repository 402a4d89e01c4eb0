use serde::{Deserialize, Serialize};

/// Ordered, human-readable outcome of a numbering run.
///
/// The first line is always the circuit heading; per-prefix sections follow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumberingReport {
    pub circuit_name: String,
    lines: Vec<String>,
}

impl NumberingReport {
    pub fn new(circuit_name: impl Into<String>) -> Self {
        let circuit_name = circuit_name.into();
        let lines = vec![format!("Unused in {circuit_name}")];
        Self {
            circuit_name,
            lines,
        }
    }

    pub fn extend(&mut self, lines: impl IntoIterator<Item = String>) {
        self.lines.extend(lines);
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// `true` if anything beyond the heading was reported.
    pub fn has_unused(&self) -> bool {
        self.lines.len() > 1
    }
}

impl std::fmt::Display for NumberingReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.lines.join("\n"))
    }
}
