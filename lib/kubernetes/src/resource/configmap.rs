use std::collections::BTreeMap;

use serde::Deserialize;

use super::{ObjectMeta, Resource};

/// ConfigMap holds configuration data for pods to consume.
///
/// See https://kubernetes.io/docs/reference/generated/kubernetes-api/v1.31/#configmap-v1-core
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct ConfigMap {
    pub metadata: ObjectMeta,

    /// Data contains the configuration data. Each key must consist of alphanumeric
    /// characters, '-', '_' or '.'.
    #[serde(default)]
    pub data: BTreeMap<String, String>,
}

impl Resource for ConfigMap {
    const KIND: &'static str = "ConfigMap";

    fn metadata(&self) -> &ObjectMeta {
        &self.metadata
    }
}
