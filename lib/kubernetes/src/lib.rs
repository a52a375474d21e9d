mod cache;
mod resource;
mod watch;

pub use cache::{Cache, Change, Handler, Notification, Snapshot, Store, Subscription};
pub use resource::*;
pub use watch::Event;
