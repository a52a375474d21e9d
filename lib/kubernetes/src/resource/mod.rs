mod configmap;
mod metadata;
mod pod;
mod secret;

pub use configmap::ConfigMap;
pub use metadata::{Controller, ObjectMeta, OwnerReference, object_key};
pub use pod::{
    ConfigMapEnvSource, ConfigMapKeySelector, Container, ContainerPort, EnvFromSource, EnvVar,
    EnvVarSource, Pod, PodSpec, PodStatus, SecretEnvSource, SecretKeySelector,
};
pub use secret::Secret;

use serde::de::DeserializeOwned;

/// An accessor trait for a kubernetes Resource.
pub trait Resource: DeserializeOwned {
    /// The kind of the resource.
    const KIND: &'static str;

    /// Standard object's metadata.
    fn metadata(&self) -> &ObjectMeta;
}
