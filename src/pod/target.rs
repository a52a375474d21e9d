use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};

use kubernetes::Pod;
use serde_json::{Value, json};
use twox_hash::XxHash64;

use super::env::EnvResolver;
use crate::model::{Tags, Target};

/// A scrape endpoint derived from one port of one container of a pod.
///
/// Targets are rebuilt from scratch whenever their pod changes, the hash is
/// computed once at that time.
#[derive(Clone, Debug, PartialEq)]
pub struct PodTarget {
    tuid: String,
    hash: u64,
    tags: Tags,

    /// `<pod ip>:<port>`
    pub address: String,
    pub namespace: String,
    pub name: String,
    pub annotations: BTreeMap<String, String>,
    pub labels: BTreeMap<String, String>,
    pub node_name: String,
    pub pod_ip: String,
    /// Name of the managing controller, empty if the pod has none.
    pub controller_name: String,
    pub controller_kind: String,
    pub container_name: String,
    pub image: String,
    /// Resolved environment of the container, `None` if empty.
    pub env: Option<BTreeMap<String, String>>,
    pub port: String,
    pub port_name: String,
    pub port_protocol: String,
}

impl Target for PodTarget {
    fn tuid(&self) -> &str {
        &self.tuid
    }

    fn hash(&self) -> u64 {
        self.hash
    }

    fn tags(&self) -> &Tags {
        &self.tags
    }
}

impl PodTarget {
    fn calc_hash(&self) -> u64 {
        let mut hasher = XxHash64::with_seed(0);

        self.tuid.hash(&mut hasher);
        self.address.hash(&mut hasher);
        self.namespace.hash(&mut hasher);
        self.name.hash(&mut hasher);
        // BTreeMap hashes its entries in key order
        self.annotations.hash(&mut hasher);
        self.labels.hash(&mut hasher);
        self.node_name.hash(&mut hasher);
        self.pod_ip.hash(&mut hasher);
        self.controller_name.hash(&mut hasher);
        self.controller_kind.hash(&mut hasher);
        self.container_name.hash(&mut hasher);
        self.image.hash(&mut hasher);
        self.env.hash(&mut hasher);
        self.port.hash(&mut hasher);
        self.port_name.hash(&mut hasher);
        self.port_protocol.hash(&mut hasher);
        self.tags.hash(&mut hasher);

        hasher.finish()
    }

    /// Key/value view of all fields, for templating into scrape configs.
    pub fn to_value(&self) -> Value {
        json!({
            "tuid": self.tuid,
            "address": self.address,
            "namespace": self.namespace,
            "name": self.name,
            "annotations": self.annotations,
            "labels": self.labels,
            "node_name": self.node_name,
            "pod_ip": self.pod_ip,
            "controller_name": self.controller_name,
            "controller_kind": self.controller_kind,
            "container_name": self.container_name,
            "image": self.image,
            "env": self.env,
            "port": self.port,
            "port_name": self.port_name,
            "port_protocol": self.port_protocol,
            "tags": self.tags.to_string(),
        })
    }

    /// Looks up a field by a dotted path, e.g. `address` or `labels.app`.
    /// Everything after the first dot is the key of a map field, so label
    /// keys like `app.kubernetes.io/name` work as is.
    pub fn get(&self, path: &str) -> Option<Value> {
        let (field, key) = match path.split_once('.') {
            Some((field, key)) => (field, Some(key)),
            None => (path, None),
        };

        let map = match field {
            "labels" => &self.labels,
            "annotations" => &self.annotations,
            "env" => self.env.as_ref()?,
            _ => {
                if key.is_some() {
                    return None;
                }

                return match self.to_value() {
                    Value::Object(mut fields) => fields.remove(field),
                    _ => None,
                };
            }
        };

        match key {
            Some(key) => map.get(key).map(|value| Value::String(value.clone())),
            None => Some(json!(map)),
        }
    }
}

/// `<namespace>_<pod>_<container>_<protocol>_<port>`, protocol in lower case.
pub fn tuid(namespace: &str, name: &str, container: &str, protocol: &str, port: &str) -> String {
    format!(
        "{namespace}_{name}_{container}_{}_{port}",
        protocol.to_lowercase()
    )
}

fn join_host_port(host: &str, port: &str) -> String {
    if host.contains(':') {
        format!("[{host}]:{port}")
    } else {
        format!("{host}:{port}")
    }
}

/// Builds one target per declared port, containers and ports in declaration
/// order. Pods without an IP or without any port yield nothing.
pub fn build_targets(pod: &Pod, resolver: &EnvResolver<'_>, tags: &Tags) -> Vec<PodTarget> {
    let pod_ip = &pod.status.pod_ip;
    if pod_ip.is_empty() {
        return vec![];
    }

    let meta = &pod.metadata;
    let controller = meta.controller().unwrap_or_default();
    let mut targets = Vec::new();

    for container in &pod.spec.containers {
        if container.ports.is_empty() {
            continue;
        }

        let env = resolver.resolve(&meta.namespace, container);

        for port in &container.ports {
            let port_num = port.container_port.to_string();

            let mut target = PodTarget {
                tuid: tuid(
                    &meta.namespace,
                    &meta.name,
                    &container.name,
                    &port.protocol,
                    &port_num,
                ),
                hash: 0,
                tags: tags.clone(),
                address: join_host_port(pod_ip, &port_num),
                namespace: meta.namespace.clone(),
                name: meta.name.clone(),
                annotations: meta.annotations.clone(),
                labels: meta.labels.clone(),
                node_name: pod.spec.node_name.clone(),
                pod_ip: pod_ip.clone(),
                controller_name: controller.name.clone(),
                controller_kind: controller.kind.clone(),
                container_name: container.name.clone(),
                image: container.image.clone(),
                env: env.clone(),
                port: port_num,
                port_name: port.name.clone(),
                port_protocol: port.protocol.clone(),
            };
            target.hash = target.calc_hash();

            targets.push(target);
        }
    }

    targets
}
