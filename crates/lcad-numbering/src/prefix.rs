use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Label prefix of a numbering namespace (`U`, `IC`, `X2`, ...).
///
/// Orders naturally so `X2` sorts before `X10` in maps and reports.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelPrefix(String);

impl LabelPrefix {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self(prefix.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for LabelPrefix {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl std::fmt::Display for LabelPrefix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialOrd for LabelPrefix {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for LabelPrefix {
    fn cmp(&self, other: &Self) -> Ordering {
        // natord ranks "X01" and "X1" equal; they are distinct prefixes
        natord::compare(&self.0, &other.0).then_with(|| self.0.cmp(&other.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn natural_order() {
        let set: BTreeSet<LabelPrefix> = ["X10", "U", "X2", "IC"]
            .into_iter()
            .map(LabelPrefix::from)
            .collect();
        let ordered: Vec<&str> = set.iter().map(LabelPrefix::as_str).collect();
        assert_eq!(ordered, vec!["IC", "U", "X2", "X10"]);
    }

    #[test]
    fn zero_padded_prefixes_stay_distinct() {
        let set: BTreeSet<LabelPrefix> = ["X1", "X01"].into_iter().map(LabelPrefix::from).collect();
        assert_eq!(set.len(), 2);
    }
}
