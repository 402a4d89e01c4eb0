use serde::{Deserialize, Serialize};

use crate::location::Location;

/// Serial numbers are unbounded for all practical purposes; `0` means
/// "not yet numbered".
pub type SerialNo = u64;

/// The two attributes a numbering run writes back to an instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumberingAttr {
    SerialNo,
    Variant,
}

impl NumberingAttr {
    pub const fn as_str(&self) -> &'static str {
        match self {
            NumberingAttr::SerialNo => "serial_no",
            NumberingAttr::Variant => "variant",
        }
    }
}

impl std::fmt::Display for NumberingAttr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Capability used by the allocator to persist its decisions.
///
/// Implementations decide how edits are batched (e.g. into one undoable
/// action); the allocator only ever calls [`AttributeSink::set`].
pub trait AttributeSink<K> {
    fn set(&mut self, key: &K, attr: NumberingAttr, value: String);
}

impl<K, F> AttributeSink<K> for F
where
    F: FnMut(&K, NumberingAttr, String),
{
    fn set(&mut self, key: &K, attr: NumberingAttr, value: String) {
        self(key, attr, value)
    }
}

/// Snapshot of an external instance taken when it enters a numbering run.
///
/// `K` identifies the instance in the caller's model and is handed back
/// through the [`AttributeSink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceInfo<K> {
    pub key: K,
    pub type_name: String,
    pub location: Location,
    pub serial_no: String,
    pub variant: String,
    pub variant_list: Vec<String>,
}

impl<K> InstanceInfo<K> {
    pub fn new(key: K, type_name: impl Into<String>, location: Location) -> Self {
        Self {
            key,
            type_name: type_name.into(),
            location,
            serial_no: String::new(),
            variant: String::new(),
            variant_list: Vec::new(),
        }
    }

    pub fn with_serial_no(mut self, serial_no: impl Into<String>) -> Self {
        self.serial_no = serial_no.into();
        self
    }

    pub fn with_variant(mut self, variant: impl Into<String>) -> Self {
        self.variant = variant.into();
        self
    }

    pub fn with_variants<I, S>(mut self, variants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.variant_list = variants.into_iter().map(Into::into).collect();
        self
    }

    /// Parsed serial number, `None` when the text is not a number at all.
    pub fn parsed_serial_no(&self) -> Option<SerialNo> {
        parse_serial_no(&self.serial_no)
    }

    pub fn ident(&self) -> String {
        format!("'{}' at {}", self.type_name, self.location)
    }
}

/// Empty text is an unassigned serial (`0`); anything that is not a
/// non-negative integer yields `None`.
pub fn parse_serial_no(text: &str) -> Option<SerialNo> {
    if text.is_empty() {
        return Some(0);
    }
    text.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_serial_no_cases() {
        assert_eq!(parse_serial_no(""), Some(0));
        assert_eq!(parse_serial_no("0"), Some(0));
        assert_eq!(parse_serial_no("42"), Some(42));
        assert_eq!(parse_serial_no("+7"), Some(7));
        assert_eq!(parse_serial_no("abc"), None);
        assert_eq!(parse_serial_no("-3"), None);
        assert_eq!(parse_serial_no(" 5"), None);
    }

    #[test]
    fn closures_are_attribute_sinks() {
        let mut seen = Vec::new();
        let mut sink = |key: &usize, attr: NumberingAttr, value: String| {
            seen.push((*key, attr, value));
        };
        sink.set(&3, NumberingAttr::Variant, "b".to_string());
        assert_eq!(seen, vec![(3, NumberingAttr::Variant, "b".to_string())]);
    }

    #[test]
    fn ident_mentions_type_and_location() {
        let inst = InstanceInfo::new(0usize, "Adder", Location::new(30, 40));
        assert_eq!(inst.ident(), "'Adder' at (30,40)");
    }
}
