use std::collections::BTreeMap;

use serde::Deserialize;

/// OwnerReference contains enough information to let you identify an owning
/// object. An owning object must be in the same namespace as the dependent,
/// or be cluster-scoped, so there is no namespace field.
///
/// See https://kubernetes.io/docs/reference/generated/kubernetes-api/v1.31/#ownerreference-v1-meta
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct OwnerReference {
    /// API version of the referent.
    #[serde(default, rename = "apiVersion")]
    pub api_version: String,

    /// Kind of the referent.
    pub kind: String,

    /// Name of the referent.
    pub name: String,

    /// UID of the referent.
    #[serde(default)]
    pub uid: String,

    /// If true, this reference points to the managing controller.
    pub controller: Option<bool>,
}

/// The managing controller of an object, taken from its owner references.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Controller {
    pub name: String,
    pub kind: String,
}

/// ObjectMeta is metadata that all persisted resources must have, which
/// includes all objects users must create.
///
/// See https://kubernetes.io/docs/reference/generated/kubernetes-api/v1.31/#objectmeta-v1-meta
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct ObjectMeta {
    /// Name must be unique within a namespace.
    pub name: String,

    /// Namespace defines the space within which each name must be unique. An
    /// empty namespace is equivalent to the "default" namespace, but "default"
    /// is the canonical representation.
    #[serde(default)]
    pub namespace: String,

    /// UID is the unique in time and space value for this object.
    #[serde(default)]
    pub uid: String,

    #[serde(default)]
    pub labels: BTreeMap<String, String>,

    #[serde(default)]
    pub annotations: BTreeMap<String, String>,

    /// List of objects depended by this object.
    #[serde(default, rename = "ownerReferences")]
    pub owner_references: Vec<OwnerReference>,
}

impl ObjectMeta {
    /// The cache key of the object, `<namespace>/<name>`, or just the name for
    /// cluster-scoped objects.
    pub fn key(&self) -> String {
        object_key(&self.namespace, &self.name)
    }

    /// Returns the first owner reference flagged as the managing controller.
    pub fn controller(&self) -> Option<Controller> {
        self.owner_references
            .iter()
            .find(|owner| owner.controller == Some(true))
            .map(|owner| Controller {
                name: owner.name.clone(),
                kind: owner.kind.clone(),
            })
    }
}

#[inline]
pub fn object_key(namespace: &str, name: &str) -> String {
    if namespace.is_empty() {
        name.to_string()
    } else {
        format!("{namespace}/{name}")
    }
}
