// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Typed objects held by the versioned store
//!
//! Every object carries [`ObjectMeta`], whose `resource_version` is the
//! opaque token the store uses for optimistic concurrency.

mod configmap;
mod endpoints;
mod lease;

pub use configmap::ConfigMap;
pub use endpoints::{EndpointAddress, EndpointPort, EndpointSubset, Endpoints, Protocol};
pub use lease::{Lease, LeaseSpec};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Kind and API version as reported by the store
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeMeta {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub api_version: String,
}

impl TypeMeta {
    pub fn new(kind: impl Into<String>, api_version: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            api_version: api_version.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.kind.is_empty() || self.api_version.is_empty()
    }
}

/// Metadata common to every stored object
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMeta {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub namespace: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub uid: String,
    /// Version token assigned by the store on every successful write
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub resource_version: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
    /// `None` until something writes an annotation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotations: Option<BTreeMap<String, String>>,
}

impl ObjectMeta {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            ..Default::default()
        }
    }

    /// Identifying part of the metadata, without store-assigned fields
    pub fn key(&self) -> ObjectKey {
        ObjectKey {
            namespace: self.namespace.clone(),
            name: self.name.clone(),
        }
    }

    pub fn annotation(&self, key: &str) -> Option<&str> {
        self.annotations.as_ref()?.get(key).map(String::as_str)
    }

    /// Set an annotation, creating the annotation map if absent
    pub fn set_annotation(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.annotations
            .get_or_insert_with(BTreeMap::new)
            .insert(key.into(), value.into());
    }
}

/// Namespace and name of one object in the store
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectKey {
    pub namespace: String,
    pub name: String,
}

impl ObjectKey {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

/// An object type the versioned store can hold
pub trait StoredObject: Clone + fmt::Debug + Send + Sync + 'static {
    /// Kind used when the object itself does not carry type metadata
    const KIND: &'static str;
    const API_VERSION: &'static str;

    /// Build an otherwise empty object around the given metadata
    fn from_meta(meta: ObjectMeta) -> Self;

    fn meta(&self) -> &ObjectMeta;

    fn meta_mut(&mut self) -> &mut ObjectMeta;

    fn type_meta(&self) -> &TypeMeta;

    /// Type metadata, falling back to the registered kind when unset
    fn resolved_type_meta(&self) -> TypeMeta {
        let own = self.type_meta();
        if own.is_empty() {
            TypeMeta::new(Self::KIND, Self::API_VERSION)
        } else {
            own.clone()
        }
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
