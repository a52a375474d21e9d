mod env;
mod group;
mod selector;
mod target;

pub use env::EnvResolver;
pub use group::{PROVIDER, PodGroup, pod_source};
pub use selector::{InvalidSelector, LabelSelector};
pub use target::{PodTarget, build_targets, tuid};

use std::fmt::{Display, Formatter};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use kubernetes::{Cache, Change, ConfigMap, Notification, Pod, Secret};
use parking_lot::Mutex;
use tokio::sync::mpsc::{self, Sender, UnboundedReceiver};
use tokio::task::JoinSet;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::config::{Config, NODE_NAME_ENV};
use crate::model::{Discoverer, Tags};
use crate::{Error, Result};

const SYNC_POLL_PERIOD: Duration = Duration::from_millis(100);

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum State {
    /// Holds the caches, nothing is running yet.
    Created,
    /// Subscribed to pod changes, watch loops running, waiting for the
    /// initial sync.
    Started,
    /// Caches are synced, groups are published.
    Running,
    Stopped,
}

/// Which pods are discovered.
#[derive(Clone, Debug, Default)]
struct PodFilter {
    namespaces: Vec<String>,
    label_selector: LabelSelector,
    node_name: Option<String>,
}

impl PodFilter {
    fn matches(&self, pod: &Pod) -> bool {
        if !self.namespaces.is_empty() && !self.namespaces.contains(&pod.metadata.namespace) {
            return false;
        }

        if !self.label_selector.matches(&pod.metadata.labels) {
            return false;
        }

        match &self.node_name {
            Some(node_name) => pod.spec.node_name == *node_name,
            None => true,
        }
    }
}

#[derive(Default)]
pub struct Builder {
    config: Config,
    node_name: Option<String>,
    pods: Option<Arc<dyn Cache<Pod>>>,
    config_maps: Option<Arc<dyn Cache<ConfigMap>>>,
    secrets: Option<Arc<dyn Cache<Secret>>>,
}

impl Builder {
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Overrides the node name used in local mode, `MY_NODE_NAME` is used if
    /// not set.
    pub fn node_name(mut self, node_name: impl Into<String>) -> Self {
        self.node_name = Some(node_name.into());
        self
    }

    pub fn pods(mut self, cache: Arc<dyn Cache<Pod>>) -> Self {
        self.pods = Some(cache);
        self
    }

    pub fn config_maps(mut self, cache: Arc<dyn Cache<ConfigMap>>) -> Self {
        self.config_maps = Some(cache);
        self
    }

    pub fn secrets(mut self, cache: Arc<dyn Cache<Secret>>) -> Self {
        self.secrets = Some(cache);
        self
    }

    pub fn build(self) -> Result<PodDiscoverer> {
        let pods = self.pods.ok_or(Error::MissingCache("pod"))?;
        let config_maps = self.config_maps.ok_or(Error::MissingCache("config map"))?;
        let secrets = self.secrets.ok_or(Error::MissingCache("secret"))?;

        let node_name = if self.config.pod.local_mode {
            let node_name = self
                .node_name
                .or_else(|| std::env::var(NODE_NAME_ENV).ok())
                .filter(|name| !name.is_empty())
                .ok_or(Error::MissingNodeName)?;

            Some(node_name)
        } else {
            None
        };

        Ok(PodDiscoverer {
            pods,
            config_maps,
            secrets,
            tags: self.config.tags,
            filter: PodFilter {
                namespaces: self.config.namespaces,
                label_selector: self.config.label_selector,
                node_name,
            },
            sync_timeout: self.config.sync_timeout,
            state: Mutex::new(State::Created),
        })
    }
}

/// Turns pods into groups of scrape targets.
///
/// Changes of config maps and secrets do not republish the pods referencing
/// them, a pod picks them up the next time the pod itself changes.
pub struct PodDiscoverer {
    pods: Arc<dyn Cache<Pod>>,
    config_maps: Arc<dyn Cache<ConfigMap>>,
    secrets: Arc<dyn Cache<Secret>>,

    tags: Tags,
    filter: PodFilter,
    sync_timeout: Option<Duration>,

    state: Mutex<State>,
}

impl Display for PodDiscoverer {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(PROVIDER)
    }
}

impl PodDiscoverer {
    pub fn builder() -> Builder {
        Builder::default()
    }

    #[inline]
    pub fn state(&self) -> State {
        *self.state.lock()
    }

    fn set_state(&self, state: State) {
        debug!(message = "pod discoverer state changed", ?state);
        *self.state.lock() = state;
    }

    /// Builds the group of `pod` with its current targets.
    pub fn build_group(&self, pod: &Pod) -> PodGroup {
        let resolver = EnvResolver::new(self.config_maps.as_ref(), self.secrets.as_ref());
        let targets = build_targets(pod, &resolver, &self.tags);

        PodGroup::new(&pod.metadata, targets)
    }

    fn synced(&self) -> bool {
        self.pods.has_synced() && self.config_maps.has_synced() && self.secrets.has_synced()
    }

    /// Returns false if cancelled before the caches are synced.
    async fn wait_for_sync(&self, shutdown: &CancellationToken) -> Result<bool> {
        let deadline = self.sync_timeout.map(|timeout| Instant::now() + timeout);
        let mut ticker = tokio::time::interval(SYNC_POLL_PERIOD);

        loop {
            tokio::select! {
                biased;

                _ = shutdown.cancelled() => return Ok(false),
                _ = ticker.tick() => {}
            }

            if self.synced() {
                return Ok(true);
            }

            if let Some(deadline) = deadline {
                if Instant::now() >= deadline {
                    let timeout = self.sync_timeout.unwrap_or_default();
                    warn!(message = "caches not synced in time", ?timeout);

                    return Err(Error::SyncTimeout(timeout));
                }
            }
        }
    }

    async fn run(
        &self,
        shutdown: &CancellationToken,
        mut notifications: UnboundedReceiver<Notification<Pod>>,
        output: &Sender<Vec<PodGroup>>,
    ) -> Result<()> {
        if !self.wait_for_sync(shutdown).await? {
            return Ok(());
        }

        self.set_state(State::Running);

        let snapshot = self.pods.list();
        let groups = snapshot
            .objects
            .iter()
            .filter(|pod| self.filter.matches(pod))
            .map(|pod| self.build_group(pod))
            .collect::<Vec<_>>();

        info!(
            message = "caches synced, publish initial groups",
            groups = groups.len()
        );

        if !groups.is_empty() && !send(shutdown, output, groups).await {
            return Ok(());
        }

        loop {
            let notification = tokio::select! {
                biased;

                _ = shutdown.cancelled() => break,
                notification = notifications.recv() => match notification {
                    Some(notification) => notification,
                    None => break,
                }
            };

            // already part of the initial groups
            if notification.revision <= snapshot.revision {
                continue;
            }

            let group = match notification.change {
                Change::Added(pod) | Change::Updated { new: pod, .. } => {
                    if !self.filter.matches(&pod) {
                        continue;
                    }

                    self.build_group(&pod)
                }
                Change::Deleted(pod) => {
                    if !self.filter.matches(&pod) {
                        continue;
                    }

                    PodGroup::empty(&pod.metadata)
                }
            };

            if !send(shutdown, output, vec![group]).await {
                break;
            }
        }

        Ok(())
    }
}

/// Returns false if cancelled or the receiver is gone.
async fn send(
    shutdown: &CancellationToken,
    output: &Sender<Vec<PodGroup>>,
    groups: Vec<PodGroup>,
) -> bool {
    tokio::select! {
        biased;

        _ = shutdown.cancelled() => false,
        result = output.send(groups) => match result {
            Ok(()) => true,
            Err(_) => {
                debug!(message = "output channel closed");
                false
            }
        }
    }
}

#[async_trait]
impl Discoverer for PodDiscoverer {
    type Group = PodGroup;

    async fn discover(
        &self,
        shutdown: CancellationToken,
        output: Sender<Vec<PodGroup>>,
    ) -> Result<()> {
        {
            let mut state = self.state.lock();
            if *state != State::Created {
                return Err(Error::AlreadyStarted);
            }

            *state = State::Started;
        }

        debug!(message = "start discovering", discoverer = %self);

        let (tx, rx) = mpsc::unbounded_channel();
        let subscription = self.pods.subscribe(Box::new(move |notification| {
            // the receiver is gone once the discoverer stopped
            let _ = tx.send(notification);
        }));

        let watch = shutdown.child_token();
        let mut tasks = JoinSet::new();
        tasks.spawn(self.pods.run(watch.clone()));
        tasks.spawn(self.config_maps.run(watch.clone()));
        tasks.spawn(self.secrets.run(watch.clone()));

        let result = self.run(&shutdown, rx, &output).await;

        drop(subscription);
        watch.cancel();
        while tasks.join_next().await.is_some() {}

        self.set_state(State::Stopped);

        result
    }
}
