use serde::{Deserialize, Serialize};

use crate::instance::{AttributeSink, NumberingAttr};

/// One recorded attribute change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeEdit<K> {
    pub key: K,
    pub attr: NumberingAttr,
    pub value: String,
}

/// Ordered batch of attribute changes that is applied (and undone) as a
/// single action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeEdits<K> {
    pub description: String,
    edits: Vec<AttributeEdit<K>>,
}

impl<K> AttributeEdits<K> {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            edits: Vec::new(),
        }
    }

    pub fn push(&mut self, key: K, attr: NumberingAttr, value: impl Into<String>) {
        self.edits.push(AttributeEdit {
            key,
            attr,
            value: value.into(),
        });
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AttributeEdit<K>> {
        self.edits.iter()
    }

    pub fn len(&self) -> usize {
        self.edits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }
}

impl<K: Clone> AttributeSink<K> for AttributeEdits<K> {
    fn set(&mut self, key: &K, attr: NumberingAttr, value: String) {
        self.push(key.clone(), attr, value);
    }
}

impl<'a, K> IntoIterator for &'a AttributeEdits<K> {
    type Item = &'a AttributeEdit<K>;
    type IntoIter = std::slice::Iter<'a, AttributeEdit<K>>;

    fn into_iter(self) -> Self::IntoIter {
        self.edits.iter()
    }
}
