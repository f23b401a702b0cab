//! Declared metadata for proxied types and methods.
//!
//! These are the inputs to marker extraction: the markers declared directly on a
//! type and the markers declared directly on one of its methods. Inherited or
//! otherwise derived markers are the metadata source's business and must already
//! be folded in by the time a [`TypeMetadata`] is built.

use serde::{Deserialize, Serialize};

use crate::tag::Tag;

/// A proxied type and the markers declared directly on it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeMetadata {
    pub name: String,
    #[serde(default)]
    pub markers: Vec<Tag>,
}

impl TypeMetadata {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            markers: Vec::new(),
        }
    }

    /// Declare a marker on the type.
    pub fn with_marker(mut self, tag: Tag) -> Self {
        self.markers.push(tag);
        self
    }
}

/// A method on a proxied type and the markers declared directly on it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodMetadata {
    pub name: String,
    #[serde(default)]
    pub markers: Vec<Tag>,
}

impl MethodMetadata {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            markers: Vec::new(),
        }
    }

    pub fn with_marker(mut self, tag: Tag) -> Self {
        self.markers.push(tag);
        self
    }
}

/// The (type markers, method markers) pair scanned during extraction.
///
/// Type markers are scanned first, then method markers.
#[derive(Debug, Clone, Copy)]
pub struct TargetDescriptor<'a> {
    pub type_markers: &'a [Tag],
    pub method_markers: &'a [Tag],
}

impl<'a> TargetDescriptor<'a> {
    pub fn new(target_type: &'a TypeMetadata, method: &'a MethodMetadata) -> Self {
        Self {
            type_markers: &target_type.markers,
            method_markers: &method.markers,
        }
    }

    /// Both marker slices in scan order.
    pub fn sources(&self) -> [&'a [Tag]; 2] {
        [self.type_markers, self.method_markers]
    }
}

/// Implemented by proxy targets that know their own declared type metadata.
pub trait DeclaresMarkers {
    fn type_metadata(&self) -> &TypeMetadata;
}
