mod tags;

pub use tags::Tags;

use async_trait::async_trait;
use tokio::sync::mpsc::Sender;
use tokio_util::sync::CancellationToken;

/// One discovered endpoint.
pub trait Target {
    /// Transient unique identifier, stable across re-derivations of the same
    /// logical target.
    fn tuid(&self) -> &str;

    /// Content hash, it changes whenever any observable field changes.
    fn hash(&self) -> u64;

    fn tags(&self) -> &Tags;
}

/// All targets currently derived from one source. An empty group retracts
/// whatever was published for the source before.
pub trait TargetGroup {
    type Target: Target;

    /// The kind of discoverer that produced this group.
    fn provider(&self) -> &str;

    /// Stable key of the object the targets were derived from.
    fn source(&self) -> &str;

    fn targets(&self) -> &[Self::Target];
}

#[async_trait]
pub trait Discoverer: Send + Sync {
    type Group: TargetGroup + Send;

    /// Publishes groups into `output` until `shutdown` is cancelled or the
    /// receiving side goes away.
    async fn discover(
        &self,
        shutdown: CancellationToken,
        output: Sender<Vec<Self::Group>>,
    ) -> crate::Result<()>;
}
