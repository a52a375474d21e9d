use std::collections::BTreeMap;

use kubernetes::{
    ConfigMap, Container, ContainerPort, Event, ObjectMeta, OwnerReference, Pod, PodSpec,
    PodStatus, Resource, Secret, Store,
};

fn pod(name: &str, uid: &str, container: &str, ip: &str) -> Pod {
    let ports = vec![
        ContainerPort {
            name: "http".into(),
            container_port: 80,
            protocol: "TCP".into(),
        },
        ContainerPort {
            name: "https".into(),
            container_port: 443,
            protocol: "TCP".into(),
        },
    ];

    Pod {
        metadata: ObjectMeta {
            name: name.into(),
            namespace: "default".into(),
            uid: uid.into(),
            annotations: BTreeMap::from([("phase".into(), "prod".into())]),
            labels: BTreeMap::from([
                ("app".into(), container.into()),
                ("tier".into(), "frontend".into()),
            ]),
            owner_references: vec![OwnerReference {
                name: "netdata-test".into(),
                kind: "DaemonSet".into(),
                controller: Some(true),
                ..Default::default()
            }],
            ..Default::default()
        },
        spec: PodSpec {
            node_name: "m01".into(),
            containers: vec![Container {
                name: container.into(),
                image: container.into(),
                ports,
                ..Default::default()
            }],
        },
        status: PodStatus { pod_ip: ip.into() },
    }
}

pub fn httpd_pod() -> Pod {
    pod(
        "httpd-dd95c4d68-5bkwl",
        "1cebb6eb-0c1e-495b-8131-8fa3e6668dc8",
        "httpd",
        "172.17.0.1",
    )
}

pub fn nginx_pod() -> Pod {
    pod(
        "nginx-7cfd77469b-q6kxj",
        "09e883f2-d740-4c5f-970d-02cf02876522",
        "nginx",
        "172.17.0.2",
    )
}

fn meta(name: &str) -> ObjectMeta {
    ObjectMeta {
        name: name.into(),
        namespace: "default".into(),
        ..Default::default()
    }
}

pub fn config_map(name: &str, data: &[(&str, &str)]) -> ConfigMap {
    ConfigMap {
        metadata: meta(name),
        data: data
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect(),
    }
}

pub fn secret(name: &str, data: &[(&str, &str)]) -> Secret {
    Secret {
        metadata: meta(name),
        data: data
            .iter()
            .map(|(key, value)| (key.to_string(), value.as_bytes().to_vec()))
            .collect(),
        string_data: BTreeMap::new(),
    }
}

/// A store which already holds `objects` and is synced.
pub fn store<R>(objects: Vec<R>) -> Store<R>
where
    R: Resource + Send + Sync + 'static,
{
    let (store, _tx) = Store::channel();
    for event in Event::listing(objects) {
        store.apply(event);
    }

    store
}
