use serde::Deserialize;

use super::{ObjectMeta, Resource};

fn default_protocol() -> String {
    String::from("TCP")
}

/// containerPort represents a network port in a single container.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct ContainerPort {
    /// If specified, this must be an IANA_SVC_NAME and unique within the pod.
    /// Each named port in a pod must have a unique name. Name for the port
    /// that can be referred to by services.
    #[serde(default)]
    pub name: String,

    /// Number of port to expose on the pod's IP address. This must be a valid port
    /// number, 0 < x < 65536.
    #[serde(rename = "containerPort")]
    pub container_port: i32,

    /// Protocol for port. Must be UDP, TCP, or SCTP. Defaults to "TCP".
    #[serde(default = "default_protocol")]
    pub protocol: String,
}

impl Default for ContainerPort {
    fn default() -> Self {
        ContainerPort {
            name: String::new(),
            container_port: 0,
            protocol: default_protocol(),
        }
    }
}

/// Selects a key from a ConfigMap.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct ConfigMapKeySelector {
    /// Name of the referent.
    #[serde(default)]
    pub name: String,

    /// The key to select.
    pub key: String,

    /// Specify whether the ConfigMap or its key must be defined
    pub optional: Option<bool>,
}

/// SecretKeySelector selects a key of a Secret.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct SecretKeySelector {
    /// Name of the referent.
    #[serde(default)]
    pub name: String,

    /// The key of the secret to select from. Must be a valid secret key.
    pub key: String,

    /// Specify whether the Secret or its key must be defined
    pub optional: Option<bool>,
}

/// EnvVarSource represents a source for the value of an EnvVar.
///
/// Only the config map and secret selectors are modeled, `fieldRef` and
/// `resourceFieldRef` are dropped while deserializing.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct EnvVarSource {
    /// Selects a key of a ConfigMap.
    #[serde(rename = "configMapKeyRef")]
    pub config_map_key_ref: Option<ConfigMapKeySelector>,

    /// Selects a key of a secret in the pod's namespace
    #[serde(rename = "secretKeyRef")]
    pub secret_key_ref: Option<SecretKeySelector>,
}

/// EnvVar represents an environment variable present in a Container.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct EnvVar {
    /// Name of the environment variable. Must be a C_IDENTIFIER.
    pub name: String,

    /// Variable references $(VAR_NAME) are expanded using the previously defined
    /// environment variables in the container and any service environment
    /// variables. Defaults to "".
    #[serde(default)]
    pub value: String,

    /// Source for the environment variable's value. Cannot be used if value is
    /// not empty.
    #[serde(rename = "valueFrom")]
    pub value_from: Option<EnvVarSource>,
}

/// ConfigMapEnvSource selects a ConfigMap to populate the environment variables with.
///
/// The contents of the target ConfigMap's Data field will represent the
/// key-value pairs as environment variables.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct ConfigMapEnvSource {
    #[serde(default)]
    pub name: String,

    pub optional: Option<bool>,
}

/// SecretEnvSource selects a Secret to populate the environment variables with.
///
/// The contents of the target Secret's Data field will represent the key-value
/// pairs as environment variables.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct SecretEnvSource {
    #[serde(default)]
    pub name: String,

    pub optional: Option<bool>,
}

/// EnvFromSource represents the source of a set of ConfigMaps or Secrets
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct EnvFromSource {
    /// An optional identifier to prepend to each key in the ConfigMap. Must be
    /// a C_IDENTIFIER.
    #[serde(default)]
    pub prefix: String,

    /// The ConfigMap to select from
    #[serde(rename = "configMapRef")]
    pub config_map_ref: Option<ConfigMapEnvSource>,

    /// The Secret to select from
    #[serde(rename = "secretRef")]
    pub secret_ref: Option<SecretEnvSource>,
}

/// A single application container that you want to run within a pod.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct Container {
    /// Name of the container specified as a DNS_LABEL. Each container in a pod
    /// must have a unique name (DNS_LABEL). Cannot be updated.
    pub name: String,

    /// Container image name.
    ///
    /// More info: https://kubernetes.io/docs/concepts/containers/images
    #[serde(default)]
    pub image: String,

    /// List of ports to expose from the container. Not specifying a port here
    /// DOES NOT prevent that port from being exposed.
    #[serde(default)]
    pub ports: Vec<ContainerPort>,

    /// List of environment variables to set in the container. Cannot be updated.
    #[serde(default)]
    pub env: Vec<EnvVar>,

    /// List of sources to populate environment variables in the container. The
    /// keys defined within a source must be a C_IDENTIFIER. All invalid keys will
    /// be reported as an event when the container is starting. When a key exists
    /// in multiple sources, the value associated with the last source will take
    /// precedence. Values defined by an Env with a duplicate key will take
    /// precedence. Cannot be updated.
    #[serde(default, rename = "envFrom")]
    pub env_from: Vec<EnvFromSource>,
}

/// PodSpec implements k8s pod spec.
///
/// See https://kubernetes.io/docs/reference/generated/kubernetes-api/v1.31/#podspec-v1-core
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct PodSpec {
    /// NodeName is a request to schedule this pod onto a specific node. If it
    /// is non-empty, the scheduler simply schedules this pod onto that node,
    /// assuming that it fits resource requirements.
    #[serde(default, rename = "nodeName")]
    pub node_name: String,

    /// List of containers belonging to the pod. Containers cannot currently be
    /// added or removed. There must be at least one container in a Pod. Cannot
    /// be updated.
    #[serde(default)]
    pub containers: Vec<Container>,
}

/// PodStatus represents information about the status of a pod. Status may trail
/// the actual state of a system, especially if the node that hosts the pod cannot
/// contact the control plane.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct PodStatus {
    /// IP address allocated to the pod. Routable at least within the cluster. Empty if not
    /// yet allocated.
    #[serde(default, rename = "podIP")]
    pub pod_ip: String,
}

/// Pod is a collection of containers that can run on a host. This resource
/// is created by clients and scheduled onto hosts.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct Pod {
    /// Standard object's metadata.
    pub metadata: ObjectMeta,

    /// Specification of the desired behavior of the pod.
    #[serde(default)]
    pub spec: PodSpec,

    /// Most recently observed status of the pod. This data may not be up to date. Populated
    /// by the system. Read-only.
    #[serde(default)]
    pub status: PodStatus,
}

impl Resource for Pod {
    const KIND: &'static str = "Pod";

    fn metadata(&self) -> &ObjectMeta {
        &self.metadata
    }
}
