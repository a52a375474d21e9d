use kubernetes::ObjectMeta;

use super::target::PodTarget;
use crate::model::TargetGroup;

pub const PROVIDER: &str = "sd:k8s:pod";

/// `pod(<namespace>/<name>)`
pub fn pod_source(namespace: &str, name: &str) -> String {
    format!("pod({namespace}/{name})")
}

/// Targets of one pod. The source only depends on the pod's identity, so a
/// deleted pod can still be addressed.
#[derive(Clone, Debug, PartialEq)]
pub struct PodGroup {
    source: String,
    targets: Vec<PodTarget>,
}

impl PodGroup {
    pub fn new(meta: &ObjectMeta, targets: Vec<PodTarget>) -> Self {
        PodGroup {
            source: pod_source(&meta.namespace, &meta.name),
            targets,
        }
    }

    /// A group without targets, it retracts everything published before for
    /// the same pod.
    pub fn empty(meta: &ObjectMeta) -> Self {
        PodGroup::new(meta, vec![])
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

impl TargetGroup for PodGroup {
    type Target = PodTarget;

    fn provider(&self) -> &str {
        PROVIDER
    }

    fn source(&self) -> &str {
        &self.source
    }

    fn targets(&self) -> &[PodTarget] {
        &self.targets
    }
}
