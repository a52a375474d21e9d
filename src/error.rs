use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A required cache adapter was not provided, the discoverer cannot work
    /// without all of them.
    #[error("{0} cache is required")]
    MissingCache(&'static str),

    #[error("caches not synced within {}", humanize::duration::duration(.0))]
    SyncTimeout(Duration),

    #[error("discoverer is already started")]
    AlreadyStarted,

    #[error("local mode requires the node name, set it with MY_NODE_NAME")]
    MissingNodeName,

    #[error("invalid config, {0}")]
    Config(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
