// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::{ObjectMeta, StoredObject, TypeMeta};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Configuration data object; the lock only touches one annotation on it
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigMap {
    #[serde(flatten)]
    pub type_meta: TypeMeta,
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub immutable: Option<bool>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub data: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub binary_data: BTreeMap<String, Vec<u8>>,
}

impl StoredObject for ConfigMap {
    const KIND: &'static str = "ConfigMap";
    const API_VERSION: &'static str = "v1";

    fn from_meta(meta: ObjectMeta) -> Self {
        Self {
            metadata: meta,
            ..Default::default()
        }
    }

    fn meta(&self) -> &ObjectMeta {
        &self.metadata
    }

    fn meta_mut(&mut self) -> &mut ObjectMeta {
        &mut self.metadata
    }

    fn type_meta(&self) -> &TypeMeta {
        &self.type_meta
    }
}
