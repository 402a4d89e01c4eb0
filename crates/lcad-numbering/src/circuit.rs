//! Serialisable circuit model consumed by the numbering pass.
//!
//! A [`Circuit`] is a flat list of placed [`Component`]s. Components are
//! addressed by their index ([`ComponentId`]), which is also the key carried
//! through an [`AttributeEdits`] batch.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::edit::AttributeEdits;
use crate::instance::{InstanceInfo, NumberingAttr, SerialNo};
use crate::location::{Bounds, Location};
use crate::placeholder::Placeholder;

#[derive(Error, Debug)]
pub enum CircuitError {
    #[error("Failed to read circuit file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse circuit JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Edit refers to unknown component #{0}")]
    UnknownComponent(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComponentId(pub usize);

impl std::fmt::Display for ComponentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentKind {
    Wire,
    /// Placement of another circuit; the only kind that gets numbered.
    Subcircuit,
    Primitive,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Component {
    pub kind: ComponentKind,
    /// Factory name, i.e. the instance type.
    pub factory: String,
    pub location: Location,
    /// Extent relative to `location`.
    #[serde(default)]
    pub offset_bounds: Bounds,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub prefix: String,
    #[serde(default)]
    pub serial_no: String,
    #[serde(default)]
    pub variant: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub variant_list: Vec<String>,
}

impl Component {
    pub fn new(kind: ComponentKind, factory: impl Into<String>, location: Location) -> Self {
        Self {
            kind,
            factory: factory.into(),
            location,
            offset_bounds: Bounds::default(),
            label: String::new(),
            prefix: String::new(),
            serial_no: String::new(),
            variant: String::new(),
            variant_list: Vec::new(),
        }
    }

    pub fn subcircuit(factory: impl Into<String>, location: Location) -> Self {
        Self::new(ComponentKind::Subcircuit, factory, location)
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
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

    pub fn with_offset_bounds(mut self, bounds: Bounds) -> Self {
        self.offset_bounds = bounds;
        self
    }

    pub fn is_wire(&self) -> bool {
        self.kind == ComponentKind::Wire
    }

    /// Absolute extent on the canvas.
    pub fn bounds(&self) -> Bounds {
        self.offset_bounds.translate(self.location)
    }

    pub fn instance_info(&self, id: ComponentId) -> InstanceInfo<ComponentId> {
        InstanceInfo::new(id, self.factory.clone(), self.location)
            .with_serial_no(self.serial_no.clone())
            .with_variant(self.variant.clone())
            .with_variants(self.variant_list.iter().cloned())
    }

    fn attr_mut(&mut self, attr: NumberingAttr) -> &mut String {
        match attr {
            NumberingAttr::SerialNo => &mut self.serial_no,
            NumberingAttr::Variant => &mut self.variant,
        }
    }
}

fn default_starting_serial_no() -> SerialNo {
    1
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Circuit {
    pub name: String,
    /// First serial number handed out to new groups.
    #[serde(default = "default_starting_serial_no")]
    pub starting_serial_no: SerialNo,
    #[serde(default)]
    pub components: Vec<Component>,
}

impl Circuit {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            starting_serial_no: default_starting_serial_no(),
            components: Vec::new(),
        }
    }

    pub fn from_json(content: &str) -> Result<Self, CircuitError> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, CircuitError> {
        let path = path.as_ref();
        log::debug!("Loading circuit from {}", path.display());
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn to_json(&self) -> Result<String, CircuitError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn add_component(&mut self, component: Component) -> ComponentId {
        self.components.push(component);
        ComponentId(self.components.len() - 1)
    }

    pub fn component(&self, id: ComponentId) -> Option<&Component> {
        self.components.get(id.0)
    }

    pub fn non_wires(&self) -> impl Iterator<Item = (ComponentId, &Component)> {
        self.components
            .iter()
            .enumerate()
            .filter(|(_, c)| !c.is_wire())
            .map(|(i, c)| (ComponentId(i), c))
    }

    /// Extent of all components, or an empty rectangle at the origin.
    pub fn bounds(&self) -> Bounds {
        self.components
            .iter()
            .map(Component::bounds)
            .reduce(|acc, b| acc.union(&b))
            .unwrap_or_default()
    }

    /// Offset bounds of the first placement of `factory`.
    pub fn offset_bounds_of(&self, factory: &str) -> Option<Bounds> {
        self.components
            .iter()
            .find(|c| c.kind == ComponentKind::Subcircuit && c.factory == factory)
            .map(|c| c.offset_bounds)
    }

    /// Apply a batch of edits and return the batch that undoes it.
    ///
    /// Nothing is changed if any edit names a component that does not exist.
    pub fn apply_edits(
        &mut self,
        edits: &AttributeEdits<ComponentId>,
    ) -> Result<AttributeEdits<ComponentId>, CircuitError> {
        if let Some(bad) = edits.iter().find(|e| e.key.0 >= self.components.len()) {
            return Err(CircuitError::UnknownComponent(bad.key.0));
        }

        let mut previous = Vec::with_capacity(edits.len());
        for edit in edits {
            let slot = self.components[edit.key.0].attr_mut(edit.attr);
            let old = std::mem::replace(slot, edit.value.clone());
            previous.push((edit.key, edit.attr, old));
        }

        let mut undo = AttributeEdits::new(format!("Undo {}", edits.description));
        for (key, attr, old) in previous.into_iter().rev() {
            undo.push(key, attr, old);
        }
        log::debug!("Applied {} attribute edits to '{}'", edits.len(), self.name);
        Ok(undo)
    }

    /// Place one sub-circuit per planned placeholder; returns the new ids.
    pub fn add_placeholders(&mut self, placeholders: &[Placeholder]) -> Vec<ComponentId> {
        placeholders
            .iter()
            .map(|p| {
                let component = Component::subcircuit(p.type_name.clone(), p.location)
                    .with_offset_bounds(p.offset_bounds)
                    .with_prefix(p.prefix.clone())
                    .with_serial_no(p.serial_no.to_string())
                    .with_variant(p.variant.clone())
                    .with_variants(p.variant_list.iter().cloned());
                self.add_component(component)
            })
            .collect()
    }
}
